mod composer;
mod fleet;
mod queue;
mod runner;
mod scheduler;

pub use composer::{Composition, EmergencyRoute, PermutationComposer, Route, RouteComposer};
pub use fleet::{FleetRegistry, Zip};
pub use queue::OrderQueue;
pub use runner::{CsvRunner, RunSummary, RunnerError};
pub use scheduler::{LaunchedFlights, ZipScheduler};
