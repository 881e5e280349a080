//! # demix - Chimeric MS2 spectrum demixing
//!
//! `demix` assigns fragmentation (MS2) spectra to precursor features detected
//! independently in the same LC-MS run. A spectrum whose isolation window
//! caught several co-eluting precursors is split into one pseudo-spectrum per
//! feature, each with a mass-corrected precursor m/z and charge, ready for a
//! second database search.
//!
//! ## Workflow
//!
//! ```text
//! run.mzid ──► identification ──► calibration ──(offset ppm)──┐
//! run.csv  ──► features (FeatureTable, m/z index) ────────────┼─► matcher ──► mgf ──► run.mzML.demix.mgf
//! run.mzML ──► mzml ──► scan (ScanReader) ────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use demix::pipeline::{run_demix, DemixConfig};
//!
//! let outcome = run_demix(
//!     "run.features.csv",
//!     "run.mzML",
//!     "run.mzid",
//!     &DemixConfig::default(),
//! )?;
//!
//! println!("{}", outcome.stats);
//! println!("wrote {}", outcome.output_path.display());
//! if let Some(reason) = &outcome.truncation {
//!     eprintln!("spectra ended early: {reason}");
//! }
//! # Ok::<(), demix::pipeline::DemixError>(())
//! ```
//!
//! ## Using the pieces directly
//!
//! ```rust,no_run
//! use demix::prelude::*;
//!
//! let summary = read_identifications("run.mzid", 0.005)?;
//! let calibration = MassCalibration::estimate(&summary.residuals_ppm)?;
//! let table = FeatureTable::load("run.features.csv", 2)?;
//! let matcher = FeatureMatcher::new(&table, calibration.offset_ppm, 4.0);
//!
//! let mut writer = MgfWriter::create("run.demix.mgf")?;
//! for scan in ScanReader::open("run.mzML")? {
//!     let Ok(scan) = scan else { continue };
//!     writer.write_all(&matcher.split_scan(&scan).spectra)?;
//! }
//! writer.finish()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`features`]: feature table dialects and the m/z-indexed [`features::FeatureTable`]
//! - [`identification`]: streaming mzIdentML reader reduced to ppm residuals
//! - [`calibration`]: mass offset and search tolerance estimation
//! - [`mzml`]: low-level streaming mzML parser
//! - [`scan`]: validated, time-normalised scans with soft/fatal failure classes
//! - [`matcher`]: feature matching and chimeric splitting
//! - [`mgf`]: MGF record writer
//! - [`pipeline`]: the end-to-end run and its configuration

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod calibration;
pub mod features;
pub mod identification;
pub mod input;
pub mod matcher;
pub mod mgf;
pub mod mzml;
pub mod pipeline;
pub mod scan;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::calibration::{CalibrationError, MassCalibration};
    pub use crate::features::{Feature, FeatureDialect, FeatureError, FeatureId, FeatureTable};
    pub use crate::identification::{
        read_identifications, IdentificationError, IdentificationSummary, MzIdentMLReader,
    };
    pub use crate::matcher::{Assignment, DemixStats, FeatureMatcher, PseudoSpectrum, ScanSplit};
    pub use crate::mgf::{output_path_for, MgfError, MgfWriter};
    pub use crate::pipeline::{run_demix, DemixConfig, DemixError, DemixOutcome};
    pub use crate::scan::{Peak, Scan, ScanError, ScanPrecursor, ScanReader, TimeScale};
}
