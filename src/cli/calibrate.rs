use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use demix::calibration::MassCalibration;
use demix::identification::read_identifications;
use demix::pipeline::DemixConfig;

use super::config::Config;

#[derive(Debug, Serialize)]
struct CalibrationReport {
    #[serde(flatten)]
    calibration: MassCalibration,
    search_tolerance_ppm: f64,
    tolerance_argument: String,
    max_scan_index: u64,
    spectrum_results: usize,
}

/// Print the mass calibration of an identification file
pub fn run(
    mzid: PathBuf,
    q_value_max: Option<f64>,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    if !mzid.exists() {
        anyhow::bail!("File does not exist: {}", mzid.display());
    }

    let mut config = Config::resolve(config_path.as_deref())?;
    if let Some(q) = q_value_max {
        config.q_value_max = q;
    }
    let report = calibrate(&mzid, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Mass Calibration");
    println!("================");
    println!("File: {}", mzid.display());
    println!("  Spectrum results:  {}", report.spectrum_results);
    println!("  Confident matches: {}", report.calibration.count);
    println!("  Offset:            {:.3} ppm", report.calibration.offset_ppm);
    println!("  Std deviation:     {:.3} ppm", report.calibration.std_ppm);
    println!("  Search tolerance:  {}", report.tolerance_argument);
    println!("  Max scan index:    {}", report.max_scan_index);
    Ok(())
}

fn calibrate(mzid: &Path, config: &DemixConfig) -> Result<CalibrationReport> {
    config.validate()?;
    let summary = read_identifications(mzid, config.q_value_max)
        .with_context(|| format!("Failed to read {}", mzid.display()))?;
    let calibration = MassCalibration::estimate(&summary.residuals_ppm)
        .with_context(|| format!("Cannot calibrate {}", mzid.display()))?;

    Ok(CalibrationReport {
        calibration,
        search_tolerance_ppm: calibration
            .search_tolerance_ppm(config.tolerance_sigmas, config.tolerance_cap_ppm),
        tolerance_argument: calibration
            .tolerance_argument(config.tolerance_sigmas, config.tolerance_cap_ppm),
        max_scan_index: summary.max_scan_index,
        spectrum_results: summary.results,
    })
}
