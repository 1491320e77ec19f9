use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use itertools::Itertools;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::{LoadError, OrderError};

/// The nest every flight launches from and lands back at
pub static DEPOT: Lazy<Hospital> = Lazy::new(|| Hospital {
    name: HospitalName("Depot".to_string()),
    north_m: 0,
    east_m: 0,
});

/// Returns the straight-line distance between two points given in meters, in kilometers
pub fn distance_km((north_a, east_a): (i64, i64), (north_b, east_b): (i64, i64)) -> f64 {
    let north = (north_a - north_b) as f64;
    let east = (east_a - east_b) as f64;
    north.hypot(east) / 1000.0
}

/// Returns the length in kilometers of a round trip from the depot through each stop in turn
pub fn route_distance_km<'a>(stops: impl IntoIterator<Item = &'a Hospital>) -> f64 {
    let depot = Lazy::force(&DEPOT);
    stops
        .into_iter()
        .chain(std::iter::once(depot))
        .fold((0.0, depot), |(traveled, prev), cur| {
            (traveled + cur.distance_km(prev), cur)
        })
        .0
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Priority {
    Emergency,
    #[default]
    Resupply,
}

impl FromStr for Priority {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Emergency" => Ok(Self::Emergency),
            "Resupply" => Ok(Self::Resupply),
            other => Err(OrderError::InvalidPriority(other.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Emergency => f.write_str("Emergency"),
            Self::Resupply => f.write_str("Resupply"),
        }
    }
}

#[derive(Default, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct HospitalName(String);

impl HospitalName {
    pub fn new(s: &str) -> Self {
        Self(s.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HospitalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `Hospital` to which zips will deliver orders
#[derive(Default, Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Hospital {
    /// The name of the hospital
    pub name: HospitalName,
    /// Hospital's y-offset from the depot in meters
    pub north_m: i64,
    /// Hospital's x-offset from the depot in meters
    pub east_m: i64,
}

impl Hospital {
    pub fn new(name: &str, north_m: i64, east_m: i64) -> Self {
        Self {
            name: HospitalName::new(name),
            north_m,
            east_m,
        }
    }

    /// Reads hospitals from a headerless `name, north_m, east_m` CSV
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Vec<Self>, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(File::open(path)?);

        reader
            .deserialize()
            .collect::<Result<Vec<Self>, _>>()
            .map_err(LoadError::from)
    }

    pub fn position(&self) -> (i64, i64) {
        (self.north_m, self.east_m)
    }

    /// Returns the hospital's distance from another hospital in kilometers
    pub fn distance_km(&self, other: &Self) -> f64 {
        distance_km(self.position(), other.position())
    }

    /// Returns the hospital's distance from the depot in kilometers
    pub fn distance_from_depot_km(&self) -> f64 {
        self.distance_km(&DEPOT)
    }
}

impl fmt::Display for Hospital {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ ({}, {})", self.name, self.north_m, self.east_m)
    }
}

/// An order as it arrives from outside, before its priority and hospital have been checked
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct OrderRequest {
    /// Time in __seconds__ _since midnight_ that the order was placed
    pub received_time: u64,
    pub hospital: String,
    pub priority: String,
}

impl OrderRequest {
    pub fn new(received_time: u64, hospital: &str, priority: &str) -> Self {
        Self {
            received_time,
            hospital: hospital.to_string(),
            priority: priority.to_string(),
        }
    }

    /// Reads requests from a headerless `received_time, hospital, priority` CSV
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Vec<Self>, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(File::open(path)?);

        reader
            .deserialize()
            .collect::<Result<Vec<Self>, _>>()
            .map_err(LoadError::from)
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderStatus {
    #[default]
    Queued,
    Assigned,
}

/// An `Order` is a request for delivery of _something_ to a particular `Hospital`
#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    /// Time in __seconds__ _since midnight_ that the order was placed
    pub received_time: u64,
    pub hospital: Hospital,
    /// Priority of the order, used by scheduling logic
    pub priority: Priority,
    pub status: OrderStatus,
}

impl Order {
    /// Builds a queued order, failing if `priority` is not a recognized priority
    pub fn new(received_time: u64, hospital: Hospital, priority: &str) -> Result<Self, OrderError> {
        Ok(Self::queued(received_time, hospital, priority.parse()?))
    }

    pub fn queued(received_time: u64, hospital: Hospital, priority: Priority) -> Self {
        Self {
            received_time,
            hospital,
            priority,
            status: OrderStatus::Queued,
        }
    }

    /// Ticks elapsed since the order was received
    pub fn age(&self, current_time: u64) -> u64 {
        current_time.saturating_sub(self.received_time)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Order for {}, {}",
            self.priority, self.hospital.name, self.received_time
        )
    }
}

/// Identity of a zip, numbered from 1
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZipId(pub usize);

impl fmt::Display for ZipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Flight {
    /// Zip flying this route
    pub zip: ZipId,
    /// Time in __seconds__ _since midnight_ that the flight was launched
    pub launch_time: u64,
    /// Orders carried by the flight, in delivery order
    pub orders: Vec<Order>,
    /// Planned round trip in kilometers
    pub distance_km: f64,
}

impl Flight {
    pub fn new(zip: ZipId, launch_time: u64, orders: Vec<Order>, distance_km: f64) -> Self {
        let orders = orders
            .into_iter()
            .map(|order| Order {
                status: OrderStatus::Assigned,
                ..order
            })
            .collect();

        Self {
            zip,
            launch_time,
            orders,
            distance_km,
        }
    }

    /// Names of the hospitals visited, in order
    pub fn stops(&self) -> impl Iterator<Item = &HospitalName> {
        self.orders.iter().map(|order| &order.hospital.name)
    }

    /// Distance of depot -> stops -> depot recomputed from the carried orders
    pub fn route_distance_km(&self) -> f64 {
        route_distance_km(self.orders.iter().map(|order| &order.hospital))
    }

    /// Returns the time that the flight will arrive back at the depot
    pub fn end_time(&self, speed_mps: u64) -> u64 {
        let seconds = (self.distance_km * 1000.0 / speed_mps as f64).ceil();
        self.launch_time + seconds as u64
    }

    pub fn is_emergency(&self) -> bool {
        self.orders
            .iter()
            .any(|order| order.priority == Priority::Emergency)
    }
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zip {}, {} Orders, Start Time: {}, Stops: {} ({:.1} km)",
            self.zip,
            self.orders.len(),
            self.launch_time,
            self.stops().join(" -> "),
            self.distance_km
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_distance_is_kilometers() {
        assert_eq!(distance_km((0, 0), (3000, 4000)), 5.0);
        assert_eq!(distance_km((-3000, 0), (0, 4000)), 5.0);
        assert_eq!(Hospital::new("A", 4000, 3000).distance_from_depot_km(), 5.0);
    }

    #[test]
    fn test_route_distance() {
        let a = Hospital::new("A", 0, 3000);
        let b = Hospital::new("B", 4000, 3000);

        assert_eq!(route_distance_km([&a]), 6.0);
        assert_eq!(route_distance_km([&a, &b]), 12.0);
        assert_eq!(route_distance_km(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_missing_csv_is_io_error() {
        assert!(matches!(
            Hospital::from_csv("./no/such/hospitals.csv"),
            Err(LoadError::Io(_))
        ));
        assert!(matches!(
            OrderRequest::from_csv("./no/such/orders.csv"),
            Err(LoadError::Io(_))
        ));
    }

    #[test]
    fn test_priority_parsing() {
        assert_eq!("Emergency".parse::<Priority>(), Ok(Priority::Emergency));
        assert_eq!(" Resupply".parse::<Priority>(), Ok(Priority::Resupply));
        assert_eq!(
            "Urgent".parse::<Priority>(),
            Err(OrderError::InvalidPriority("Urgent".to_string()))
        );
    }

    #[test]
    fn test_order_construction() {
        let hospital = Hospital::new("A", 0, 3000);
        let order = Order::new(10, hospital.clone(), "Resupply").expect("order");
        assert_eq!(order.status, OrderStatus::Queued);
        assert_eq!(order.age(70), 60);
        assert_eq!(order.age(5), 0);

        assert!(Order::new(10, hospital, "resupply").is_err());
    }

    #[test]
    fn test_flight_end_time_and_status() {
        let hospital = Hospital::new("A", 0, 3000);
        let order = Order::new(0, hospital, "Emergency").expect("order");
        let flight = Flight::new(ZipId(1), 100, vec![order], 6.0);

        // 6000 m at 30 m/s
        assert_eq!(flight.end_time(30), 300);
        assert_eq!(flight.route_distance_km(), 6.0);
        assert!(flight.orders.iter().all(|o| o.status == OrderStatus::Assigned));
        assert!(flight.is_emergency());
        assert_eq!(
            flight.to_string(),
            "Zip #1, 1 Orders, Start Time: 100, Stops: A (6.0 km)"
        );
    }
}
