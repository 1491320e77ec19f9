use thiserror::Error;

use crate::ZipId;

/// Reasons an incoming order is turned away before it reaches a queue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("invalid order priority `{0}`")]
    InvalidPriority(String),
    #[error("unknown hospital `{0}`")]
    UnknownHospital(String),
}

/// Broken contracts between the scheduler and its fleet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FleetError {
    #[error("zip {zip} is still flying until {busy_until}, cannot launch at {launch_time}")]
    VehicleUnavailable {
        zip: ZipId,
        busy_until: u64,
        launch_time: u64,
    },
    #[error("zip {0} is not part of the fleet")]
    UnknownZip(ZipId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("could not parse {var}=`{value}`")]
    Parse { var: &'static str, value: String },
    #[error("invalid fleet configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
}
