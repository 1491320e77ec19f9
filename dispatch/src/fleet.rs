use schema::{FleetError, Flight, ZipId};

/// A single vehicle slot, remembering only its most recent flight
#[derive(Clone, Debug)]
pub struct Zip {
    pub id: ZipId,
    flight: Option<Flight>,
}

impl Zip {
    /// Time at which the zip is back at the depot, if it has ever flown
    pub fn available_at(&self, speed_mps: u64) -> Option<u64> {
        self.flight
            .as_ref()
            .map(|flight| flight.end_time(speed_mps))
    }

    /// A zip never flies twice in one tick, even when its last flight took no time at all
    pub fn is_available(&self, current_time: u64, speed_mps: u64) -> bool {
        self.flight.as_ref().map_or(true, |flight| {
            flight.launch_time < current_time && flight.end_time(speed_mps) <= current_time
        })
    }

    pub fn flight(&self) -> Option<&Flight> {
        self.flight.as_ref()
    }
}

/// The fixed set of zips operated from the depot
#[derive(Clone, Debug)]
pub struct FleetRegistry {
    zips: Vec<Zip>,
    /// Number of zips, counted from the highest id, kept out of pure resupply work
    reserved: usize,
    speed_mps: u64,
}

impl FleetRegistry {
    pub fn new(count: usize, reserved: usize, speed_mps: u64) -> Self {
        Self {
            zips: (1..=count)
                .map(|id| Zip {
                    id: ZipId(id),
                    flight: None,
                })
                .collect(),
            reserved: reserved.min(count),
            speed_mps,
        }
    }

    pub fn len(&self) -> usize {
        self.zips.len()
    }

    pub fn is_reserved(&self, zip: ZipId) -> bool {
        zip.0 > self.zips.len() - self.reserved
    }

    pub fn zip(&self, zip: ZipId) -> Option<&Zip> {
        zip.0.checked_sub(1).and_then(|i| self.zips.get(i))
    }

    pub fn flight(&self, zip: ZipId) -> Option<&Flight> {
        self.zip(zip).and_then(Zip::flight)
    }

    /// Zips on the ground at `current_time`, in id order
    pub fn available_zips(&self, current_time: u64) -> impl Iterator<Item = ZipId> + '_ {
        self.zips
            .iter()
            .filter(move |zip| zip.is_available(current_time, self.speed_mps))
            .map(|zip| zip.id)
    }

    /// Zips on the ground at `current_time` which may fly resupply-only routes, in id order
    pub fn available_resupply_zips(&self, current_time: u64) -> impl Iterator<Item = ZipId> + '_ {
        self.available_zips(current_time)
            .filter(move |&zip| !self.is_reserved(zip))
    }

    /// Zip to send on the next emergency: reserved zips go first so the resupply pool lasts longer
    pub fn next_emergency_zip(&self, current_time: u64) -> Option<ZipId> {
        self.available_zips(current_time)
            .find(|&zip| self.is_reserved(zip))
            .or_else(|| self.available_zips(current_time).next())
    }

    /// Flights still in the air at `current_time`
    pub fn active_flights(&self, current_time: u64) -> impl Iterator<Item = &Flight> + '_ {
        self.zips
            .iter()
            .filter(move |zip| !zip.is_available(current_time, self.speed_mps))
            .filter_map(Zip::flight)
    }

    /// Hands `flight` to its zip, replacing the zip's previous flight
    pub fn assign(&mut self, flight: Flight) -> Result<(), FleetError> {
        let speed_mps = self.speed_mps;
        let zip = flight
            .zip
            .0
            .checked_sub(1)
            .and_then(|i| self.zips.get_mut(i))
            .ok_or(FleetError::UnknownZip(flight.zip))?;

        if !zip.is_available(flight.launch_time, speed_mps) {
            return Err(FleetError::VehicleUnavailable {
                zip: zip.id,
                busy_until: zip.available_at(speed_mps).unwrap_or_default(),
                launch_time: flight.launch_time,
            });
        }

        zip.flight = Some(flight);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use schema::{Hospital, Order};

    use super::*;

    fn flight(zip: usize, launch_time: u64, distance_km: f64) -> Flight {
        let order = Order::new(0, Hospital::new("A", 0, 1000), "Resupply").expect("order");
        Flight::new(ZipId(zip), launch_time, vec![order], distance_km)
    }

    #[test]
    fn test_all_available_initially() {
        let fleet = FleetRegistry::new(4, 1, 30);
        assert_eq!(
            fleet.available_zips(0).collect::<Vec<_>>(),
            vec![ZipId(1), ZipId(2), ZipId(3), ZipId(4)]
        );
        assert_eq!(
            fleet.available_resupply_zips(0).collect::<Vec<_>>(),
            vec![ZipId(1), ZipId(2), ZipId(3)]
        );
        assert!(fleet.is_reserved(ZipId(4)));
        assert!(!fleet.is_reserved(ZipId(3)));
    }

    #[test]
    fn test_assign_until_landing() -> Result<(), FleetError> {
        let mut fleet = FleetRegistry::new(2, 0, 30);

        // 3 km at 30 m/s lands 100 s after launch
        fleet.assign(flight(1, 60, 3.0))?;
        assert_eq!(fleet.available_zips(60).collect::<Vec<_>>(), vec![ZipId(2)]);
        assert_eq!(fleet.active_flights(159).count(), 1);
        assert_eq!(fleet.available_zips(160).count(), 2);
        assert_eq!(fleet.active_flights(160).count(), 0);

        // The landed flight is replaced, not accumulated
        fleet.assign(flight(1, 160, 3.0))?;
        assert_eq!(fleet.flight(ZipId(1)).map(|f| f.launch_time), Some(160));

        Ok(())
    }

    #[test]
    fn test_assign_busy_zip_fails() -> Result<(), FleetError> {
        let mut fleet = FleetRegistry::new(1, 0, 30);
        fleet.assign(flight(1, 0, 3.0))?;

        assert_eq!(
            fleet.assign(flight(1, 50, 3.0)),
            Err(FleetError::VehicleUnavailable {
                zip: ZipId(1),
                busy_until: 100,
                launch_time: 50,
            })
        );
        assert_eq!(
            fleet.assign(flight(2, 50, 3.0)),
            Err(FleetError::UnknownZip(ZipId(2)))
        );
        assert_eq!(
            fleet.assign(flight(0, 50, 3.0)),
            Err(FleetError::UnknownZip(ZipId(0)))
        );

        Ok(())
    }

    #[test]
    fn test_zero_length_flight_keeps_zip_busy_for_the_tick() -> Result<(), FleetError> {
        let mut fleet = FleetRegistry::new(1, 0, 30);
        fleet.assign(flight(1, 10, 0.0))?;

        assert_eq!(fleet.available_zips(10).count(), 0);
        assert!(matches!(
            fleet.assign(flight(1, 10, 0.0)),
            Err(FleetError::VehicleUnavailable { .. })
        ));
        assert_eq!(fleet.available_zips(11).collect::<Vec<_>>(), vec![ZipId(1)]);

        Ok(())
    }

    #[test]
    fn test_emergencies_use_reserved_zips_first() -> Result<(), FleetError> {
        let mut fleet = FleetRegistry::new(4, 2, 30);
        assert_eq!(fleet.next_emergency_zip(0), Some(ZipId(3)));

        fleet.assign(flight(3, 0, 3.0))?;
        fleet.assign(flight(4, 0, 3.0))?;
        assert_eq!(fleet.next_emergency_zip(0), Some(ZipId(1)));

        fleet.assign(flight(1, 0, 3.0))?;
        fleet.assign(flight(2, 0, 3.0))?;
        assert_eq!(fleet.next_emergency_zip(0), None);
        assert_eq!(fleet.next_emergency_zip(100), Some(ZipId(3)));

        Ok(())
    }
}
