use serde::{Deserialize, Serialize};

use super::DemixError;
use crate::calibration::{DEFAULT_TOLERANCE_CAP_PPM, DEFAULT_TOLERANCE_SIGMAS};
use crate::features::DEFAULT_MIN_CHARGE;
use crate::identification::DEFAULT_Q_VALUE_MAX;
use crate::matcher::{DEFAULT_ISOLATION_WIDTH, DEFAULT_MS1_PRECISION};

/// Default number of scans between progress lines
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

/// Default number of scans per parallel batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Settings for a demixing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemixConfig {
    /// Full isolation window width in Th
    pub isolation_width: f64,
    /// q-value ceiling for calibration matches (exclusive)
    pub q_value_max: f64,
    /// Minimum charge kept from Dinosaur feature tables
    pub min_charge: i32,
    /// Relative m/z tolerance of an exact precursor-to-feature match
    pub ms1_precision: f64,
    /// Upper bound of the suggested search tolerance, in ppm
    pub tolerance_cap_ppm: f64,
    /// Standard deviations of the residuals in the suggested search tolerance
    pub tolerance_sigmas: f64,
    /// Log progress on scan indices divisible by this, 0 to disable
    pub progress_interval: u64,
    /// Scans per batch when splitting in parallel
    pub batch_size: usize,
    /// Split scans on a rayon thread pool
    pub parallel: bool,
}

impl Default for DemixConfig {
    fn default() -> Self {
        Self {
            isolation_width: DEFAULT_ISOLATION_WIDTH,
            q_value_max: DEFAULT_Q_VALUE_MAX,
            min_charge: DEFAULT_MIN_CHARGE,
            ms1_precision: DEFAULT_MS1_PRECISION,
            tolerance_cap_ppm: DEFAULT_TOLERANCE_CAP_PPM,
            tolerance_sigmas: DEFAULT_TOLERANCE_SIGMAS,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
            parallel: false,
        }
    }
}

impl DemixConfig {
    /// Reject settings the matcher cannot work with
    pub fn validate(&self) -> Result<(), DemixError> {
        if !(self.isolation_width.is_finite() && self.isolation_width > 0.0) {
            return Err(DemixError::InvalidConfig(format!(
                "isolation_width must be positive, got {}",
                self.isolation_width
            )));
        }
        if !(self.q_value_max > 0.0 && self.q_value_max <= 1.0) {
            return Err(DemixError::InvalidConfig(format!(
                "q_value_max must be in (0, 1], got {}",
                self.q_value_max
            )));
        }
        if !(self.ms1_precision >= 0.0) {
            return Err(DemixError::InvalidConfig(format!(
                "ms1_precision must not be negative, got {}",
                self.ms1_precision
            )));
        }
        if self.batch_size == 0 {
            return Err(DemixError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
