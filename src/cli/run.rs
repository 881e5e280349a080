use anyhow::{Context, Result};
use log::{info, warn};
use std::path::PathBuf;

use demix::pipeline::run_demix;

use super::config::Config;

/// Arguments of the `run` command
pub struct RunArgs {
    pub features: PathBuf,
    pub spectra: PathBuf,
    pub mzid: PathBuf,
    pub isolation_width: Option<f64>,
    pub q_value_max: Option<f64>,
    pub min_charge: Option<i32>,
    pub config: Option<PathBuf>,
    pub parallel: bool,
}

/// Demix a spectra file and print the output path
pub fn run(args: RunArgs) -> Result<()> {
    for (label, path) in [
        ("Feature table", &args.features),
        ("Spectra file", &args.spectra),
        ("Identification file", &args.mzid),
    ] {
        if !path.exists() {
            anyhow::bail!("{} does not exist: {}", label, path.display());
        }
    }

    let mut config = Config::resolve(args.config.as_deref())?;
    if let Some(v) = args.isolation_width {
        config.isolation_width = v;
    }
    if let Some(v) = args.q_value_max {
        config.q_value_max = v;
    }
    if let Some(v) = args.min_charge {
        config.min_charge = v;
    }
    if args.parallel {
        config.parallel = true;
    }

    info!("DeMix");
    info!("=====");
    info!("Features:        {}", args.features.display());
    info!("Spectra:         {}", args.spectra.display());
    info!("Identifications: {}", args.mzid.display());
    info!("Isolation width: {} Th", config.isolation_width);
    info!("q-value ceiling: {}", config.q_value_max);

    let outcome = run_demix(&args.features, &args.spectra, &args.mzid, &config)
        .context("Demixing failed")?;

    if let Some(reason) = &outcome.truncation {
        warn!(
            "Spectra stream ended early, {} holds the scans read before: {}",
            outcome.output_path.display(),
            reason
        );
    }

    println!("{}", outcome.output_path.display());
    println!(
        "Second search tolerance: {}",
        outcome
            .calibration
            .tolerance_argument(config.tolerance_sigmas, config.tolerance_cap_ppm)
    );
    Ok(())
}
