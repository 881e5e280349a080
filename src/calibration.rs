//! Systematic precursor mass calibration
//!
//! The mean ppm residual of confident identifications is taken as the
//! instrument's mass offset and subtracted from every precursor m/z before
//! matching. The spread of the residuals bounds the tolerance suggested for a
//! second search.

use std::fmt;

use serde::Serialize;

/// Default number of standard deviations in the search tolerance
pub const DEFAULT_TOLERANCE_SIGMAS: f64 = 3.0;

/// Default ceiling on the search tolerance, in ppm
pub const DEFAULT_TOLERANCE_CAP_PPM: f64 = 10.0;

/// Errors from calibration estimation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    /// No residuals were available
    #[error("no confident identifications to calibrate from")]
    EmptyInput,
}

/// Mass offset and spread estimated from identification residuals
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MassCalibration {
    /// Mean residual in ppm
    pub offset_ppm: f64,
    /// Population standard deviation of the residuals in ppm
    pub std_ppm: f64,
    /// Number of residuals used
    pub count: usize,
}

impl MassCalibration {
    /// Estimate the calibration from ppm residuals
    pub fn estimate(residuals_ppm: &[f64]) -> Result<Self, CalibrationError> {
        if residuals_ppm.is_empty() {
            return Err(CalibrationError::EmptyInput);
        }

        let n = residuals_ppm.len() as f64;
        let mean = residuals_ppm.iter().sum::<f64>() / n;
        let variance = residuals_ppm
            .iter()
            .map(|r| (r - mean) * (r - mean))
            .sum::<f64>()
            / n;

        Ok(Self {
            offset_ppm: mean,
            std_ppm: variance.sqrt(),
            count: residuals_ppm.len(),
        })
    }

    /// Search tolerance `min(std * sigmas, cap)` in ppm
    pub fn search_tolerance_ppm(&self, sigmas: f64, cap_ppm: f64) -> f64 {
        (self.std_ppm * sigmas).min(cap_ppm)
    }

    /// Search tolerance as a search-engine argument, e.g. `7.5ppm`
    pub fn tolerance_argument(&self, sigmas: f64, cap_ppm: f64) -> String {
        format!("{:.1}ppm", self.search_tolerance_ppm(sigmas, cap_ppm))
    }
}

impl fmt::Display for MassCalibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mass offset {:.2} ppm (std {:.2} ppm, n={})",
            self.offset_ppm, self.std_ppm, self.count
        )
    }
}

/// `mz - mz * offset_ppm * 1e-6`
#[inline]
pub fn correct_mz(mz: f64, offset_ppm: f64) -> f64 {
    mz - mz * offset_ppm * 1e-6
}
