use std::path::PathBuf;

use crate::calibration::CalibrationError;
use crate::features::FeatureError;
use crate::identification::IdentificationError;
use crate::mgf::MgfError;
use crate::mzml::MzMLError;

/// Errors that abort a demixing run
///
/// Stream corruption found while matching is not among them: it ends the
/// run early and is reported in [`super::DemixOutcome::truncation`].
#[derive(Debug, thiserror::Error)]
pub enum DemixError {
    /// Reading the identification table failed
    #[error("identification table: {0}")]
    Identification(#[from] IdentificationError),

    /// No usable calibration could be derived
    #[error("calibration: {0}")]
    Calibration(#[from] CalibrationError),

    /// Reading the feature table failed
    #[error("feature table: {0}")]
    Features(#[from] FeatureError),

    /// The spectra file could not be opened
    #[error("cannot open spectra {}: {source}", path.display())]
    Spectra {
        /// Spectra path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: MzMLError,
    },

    /// Writing the output failed
    #[error("output: {0}")]
    Output(#[from] MgfError),

    /// Settings out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
