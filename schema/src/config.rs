use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

/// Fraction of the maximum range a lone order has to cover before it is worth a flight of its own
pub const MIN_RANGE_FRACTION: f64 = 0.85;

/// Operating limits of the zips and of the fleet as a whole
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FleetConfig {
    /// Cruise speed of every zip in meters per second
    pub max_speed_mps: u64,
    /// Max orders carried by a single resupply flight
    pub max_deliveries: usize,
    /// Max round trip of a single flight in kilometers
    pub max_range_km: f64,
    /// Age in ticks after which a lone order flies no matter how short the trip
    pub max_time_order: u64,
    /// Number of zips in the fleet
    pub number_of_zips: usize,
    /// Number of zips (the highest ids) held back from pure resupply work
    pub emergency_only_zips: usize,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            max_speed_mps: 30,
            max_deliveries: 3,
            max_range_km: 160.0,
            max_time_order: 18_000,
            number_of_zips: 10,
            emergency_only_zips: 2,
        }
    }
}

impl FleetConfig {
    /// Round trip below which a lone resupply order is deferred
    pub fn min_range_km(&self) -> f64 {
        self.max_range_km * MIN_RANGE_FRACTION
    }

    /// Starts from the defaults and applies any `ZIP_*` overrides found in the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            max_speed_mps: var_or("ZIP_MAX_SPEED_MPS", defaults.max_speed_mps)?,
            max_deliveries: var_or("ZIP_MAX_DELIVERIES", defaults.max_deliveries)?,
            max_range_km: var_or("ZIP_MAX_RANGE_KM", defaults.max_range_km)?,
            max_time_order: var_or("ZIP_MAX_TIME_ORDER", defaults.max_time_order)?,
            number_of_zips: var_or("ZIP_NUMBER_OF_ZIPS", defaults.number_of_zips)?,
            emergency_only_zips: var_or("ZIP_EMERGENCY_ONLY_ZIPS", defaults.emergency_only_zips)?,
        };
        config.validate()?;
        log::debug!("fleet configuration: {:?}", config);

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_speed_mps == 0 {
            return Err(ConfigError::Invalid("max speed must be positive".to_string()));
        }
        if self.max_deliveries == 0 {
            return Err(ConfigError::Invalid(
                "zips must carry at least one order".to_string(),
            ));
        }
        if !(self.max_range_km > 0.0) {
            return Err(ConfigError::Invalid("max range must be positive".to_string()));
        }
        if self.emergency_only_zips > self.number_of_zips {
            return Err(ConfigError::Invalid(format!(
                "{} emergency-only zips in a fleet of {}",
                self.emergency_only_zips, self.number_of_zips
            )));
        }

        Ok(())
    }
}

fn var_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Parse { var, value }),
        Err(_) => Ok(default),
    }
}
