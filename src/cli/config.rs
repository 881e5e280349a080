//! TOML configuration file support.
//!
//! Settings that rarely change between runs can live in a config file:
//!
//! ```toml
//! # demix.toml
//! [demix]
//! isolation_width = 2.0
//! q_value_max = 0.01
//! min_charge = 2
//! tolerance_cap_ppm = 10.0
//! parallel = true
//! batch_size = 2000
//! ```
//!
//! Command-line flags take precedence over the file, which takes precedence
//! over the built-in defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use demix::pipeline::DemixConfig;

/// Root configuration structure for demix.toml files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Demixing settings.
    #[serde(default)]
    pub demix: DemixSection,
}

/// The `[demix]` table; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemixSection {
    /// Full isolation window width in Th.
    pub isolation_width: Option<f64>,

    /// q-value ceiling for calibration matches.
    pub q_value_max: Option<f64>,

    /// Minimum charge kept from Dinosaur feature tables.
    pub min_charge: Option<i32>,

    /// Relative tolerance of an exact precursor-to-feature match.
    pub ms1_precision: Option<f64>,

    /// Ceiling of the suggested second-search tolerance (ppm).
    pub tolerance_cap_ppm: Option<f64>,

    /// Standard deviations in the suggested second-search tolerance.
    pub tolerance_sigmas: Option<f64>,

    /// Scan-index interval between progress lines.
    pub progress_interval: Option<u64>,

    /// Scans per parallel batch.
    pub batch_size: Option<usize>,

    /// Split scans in parallel (requires the parallel feature).
    pub parallel: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Defaults overlaid with the file at `path`, if one is given.
    pub fn resolve(path: Option<&Path>) -> Result<DemixConfig> {
        Ok(match path {
            Some(path) => Self::from_file(path)?.apply(DemixConfig::default()),
            None => DemixConfig::default(),
        })
    }

    /// Overlay the file's settings on `base`.
    pub fn apply(&self, mut base: DemixConfig) -> DemixConfig {
        let s = &self.demix;
        if let Some(v) = s.isolation_width {
            base.isolation_width = v;
        }
        if let Some(v) = s.q_value_max {
            base.q_value_max = v;
        }
        if let Some(v) = s.min_charge {
            base.min_charge = v;
        }
        if let Some(v) = s.ms1_precision {
            base.ms1_precision = v;
        }
        if let Some(v) = s.tolerance_cap_ppm {
            base.tolerance_cap_ppm = v;
        }
        if let Some(v) = s.tolerance_sigmas {
            base.tolerance_sigmas = v;
        }
        if let Some(v) = s.progress_interval {
            base.progress_interval = v;
        }
        if let Some(v) = s.batch_size {
            base.batch_size = v;
        }
        if let Some(v) = s.parallel {
            base.parallel = v;
        }
        base
    }
}
