mod config;
mod entities;
mod error;
mod runner;
mod scheduler;

pub use config::{FleetConfig, MIN_RANGE_FRACTION};
pub use entities::{
    distance_km, route_distance_km, Flight, Hospital, HospitalName, Order, OrderRequest,
    OrderStatus, Priority, ZipId, DEPOT,
};
pub use error::{ConfigError, FleetError, LoadError, OrderError};
pub use runner::{Runner, Speed};
pub use scheduler::Scheduler;

pub const SAMPLE_HOSPITALS_CSV_PATH: &'static str = "./test_data/hospitals.csv";
pub const SAMPLE_ORDERS_CSV_PATH: &'static str = "./test_data/orders.csv";

/// Snapshot of the fleet published by a `Runner` as the simulation advances
#[derive(Clone, Debug)]
pub struct StatusUpdate {
    pub time: u64,
    /// Flights still in the air at `time`
    pub flights: Vec<Flight>,
    /// Orders waiting for a zip at `time`
    pub pending_orders: usize,
    pub speed: runner::Speed,
}
