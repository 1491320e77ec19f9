use std::{collections::HashMap, iter, slice};

use schema::{
    FleetConfig, Flight, Hospital, HospitalName, Order, OrderError, OrderRequest, Priority,
    Scheduler, ZipId,
};

use crate::composer::{Composition, PermutationComposer, RouteComposer};
use crate::fleet::FleetRegistry;
use crate::queue::OrderQueue;

/// Scheduler which flies emergencies first, letting each one pick up a single
/// resupply stop when that keeps the trip within range, then batches the
/// remaining resupply orders into multi-stop flights on the non-reserved zips.
pub struct ZipScheduler<C = PermutationComposer> {
    config: FleetConfig,
    /// `Hospital`s serviced by this `Scheduler`
    hospitals: HashMap<HospitalName, Hospital>,
    /// Orders that have not yet been assigned to a flight
    queue: OrderQueue,
    fleet: FleetRegistry,
    composer: C,
    /// Zips launched by the most recent call to `launch_flights`
    launched: Vec<ZipId>,
}

impl ZipScheduler<PermutationComposer> {
    pub fn new(config: FleetConfig, hospitals: impl IntoIterator<Item = Hospital>) -> Self {
        Self::with_composer(config, hospitals, PermutationComposer::new(config))
    }
}

impl<C: RouteComposer> ZipScheduler<C> {
    pub fn with_composer(
        config: FleetConfig,
        hospitals: impl IntoIterator<Item = Hospital>,
        composer: C,
    ) -> Self {
        Self {
            config,
            hospitals: hospitals
                .into_iter()
                .map(|hospital| (hospital.name.clone(), hospital))
                .collect(),
            queue: OrderQueue::new(),
            fleet: FleetRegistry::new(
                config.number_of_zips,
                config.emergency_only_zips,
                config.max_speed_mps,
            ),
            composer,
            launched: Vec::new(),
        }
    }

    /// Makes a hospital known to the scheduler; orders for it are rejected until then
    pub fn register_hospital(&mut self, hospital: Hospital) {
        self.hospitals.insert(hospital.name.clone(), hospital);
    }

    /// Replaces the fleet with `count` idle zips, the last `reserved` of which only fly emergencies
    pub fn init_fleet(&mut self, count: usize, reserved: usize) {
        self.config.number_of_zips = count;
        self.config.emergency_only_zips = reserved.min(count);
        self.fleet = FleetRegistry::new(count, reserved, self.config.max_speed_mps);
        self.launched.clear();
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    pub fn hospital(&self, name: &str) -> Option<&Hospital> {
        self.hospitals.get(&HospitalName::new(name))
    }

    pub fn queue(&self) -> &OrderQueue {
        &self.queue
    }

    pub fn fleet(&self) -> &FleetRegistry {
        &self.fleet
    }

    pub fn active_flights(&self, current_time: u64) -> impl Iterator<Item = &Flight> + '_ {
        self.fleet.active_flights(current_time)
    }

    /// Converts an incoming request into a queued order
    fn resolve(&self, request: OrderRequest) -> Result<Order, OrderError> {
        let priority = request.priority.parse::<Priority>()?;
        let hospital = self
            .hospital(&request.hospital)
            .cloned()
            .ok_or(OrderError::UnknownHospital(request.hospital))?;

        Ok(Order::queued(request.received_time, hospital, priority))
    }

    fn launch(&mut self, flight: Flight) {
        let zip = flight.zip;
        let description = flight.to_string();

        // Zips are only ever taken from the available iterators, so a failure here is a bug
        match self.fleet.assign(flight) {
            Ok(()) => {
                log::info!("launched {}", description);
                self.launched.push(zip);
            }
            Err(e) => log::error!("dropped flight {}: {}", description, e),
        }
    }

    fn launch_emergencies(&mut self, current_time: u64) {
        while !self.queue.emergencies().is_empty() {
            let Some(zip) = self.fleet.next_emergency_zip(current_time) else {
                log::debug!(
                    "{} emergencies waiting for a zip at {}",
                    self.queue.emergencies().len(),
                    current_time
                );
                break;
            };
            let Some(emergency) = self.queue.pop_emergency() else {
                break;
            };

            let route = self
                .composer
                .merge_with_emergency(&emergency, self.queue.resupplies());
            if route.distance_km > self.config.max_range_km {
                log::warn!(
                    "{} needs {:.1} km, beyond the {:.1} km range",
                    emergency,
                    route.distance_km,
                    self.config.max_range_km
                );
            }

            let mut orders = vec![emergency];
            if let Some(resupply) = route.resupply {
                orders.extend(self.queue.take_resupplies(&[resupply]));
            }

            self.launch(Flight::new(zip, current_time, orders, route.distance_km));
        }
    }

    fn launch_resupplies(&mut self, current_time: u64) {
        loop {
            let Some(zip) = self.fleet.available_resupply_zips(current_time).next() else {
                break;
            };

            match self.composer.compose(self.queue.resupplies(), current_time) {
                Composition::Launch(route) => {
                    let orders = self.queue.take_resupplies(&route.stops);
                    self.launch(Flight::new(zip, current_time, orders, route.distance_km));
                }
                Composition::Defer(route) => {
                    log::debug!(
                        "holding {} resupply orders, shortest flight is only {:.1} km",
                        self.queue.resupplies().len(),
                        route.distance_km
                    );
                    break;
                }
                Composition::Nothing => break,
            }
        }
    }
}

impl<C: RouteComposer> Scheduler for ZipScheduler<C> {
    type UnfulfilledOrders<'a> = iter::Chain<slice::Iter<'a, Order>, slice::Iter<'a, Order>>
    where
        Self: 'a;
    type LaunchedFlights<'a> = LaunchedFlights<'a>
    where
        Self: 'a;

    fn unfulfilled_orders(&self) -> Self::UnfulfilledOrders<'_> {
        self.queue.iter()
    }

    fn queue_order(&mut self, request: OrderRequest) -> Result<(), OrderError> {
        let order = self.resolve(request).map_err(|e| {
            log::warn!("rejected order: {}", e);
            e
        })?;
        self.queue.enqueue(order);

        Ok(())
    }

    fn launch_flights(&mut self, current_time: u64) -> LaunchedFlights<'_> {
        self.launched.clear();

        if !self.queue.is_empty() {
            self.launch_emergencies(current_time);
            self.launch_resupplies(current_time);
        }

        LaunchedFlights {
            fleet: &self.fleet,
            zips: self.launched.iter(),
        }
    }
}

/// Flights launched by a single call to `launch_flights`
pub struct LaunchedFlights<'a> {
    fleet: &'a FleetRegistry,
    zips: slice::Iter<'a, ZipId>,
}

impl<'a> Iterator for LaunchedFlights<'a> {
    type Item = &'a Flight;

    fn next(&mut self) -> Option<Self::Item> {
        let fleet = self.fleet;
        self.zips.by_ref().find_map(|&zip| fleet.flight(zip))
    }
}
