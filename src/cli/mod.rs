use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod calibrate;
mod config;
mod run;

/// DeMix - split chimeric MS2 spectra by precursor feature
#[derive(Parser)]
#[command(name = "demix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign MS2 scans to features and write <SPECTRA>.demix.mgf
    Run {
        /// Feature table (*.features.csv for Dinosaur, anything else for FEATURE rows)
        #[arg(value_name = "FEATURES")]
        features: PathBuf,

        /// mzML spectra file, optionally gzip-compressed
        #[arg(value_name = "SPECTRA")]
        spectra: PathBuf,

        /// mzIdentML file from a first-pass search
        #[arg(value_name = "MZID")]
        mzid: PathBuf,

        /// Full isolation window width in Th (default: 4.0)
        #[arg(short = 'w', long, value_name = "WIDTH")]
        isolation_width: Option<f64>,

        /// q-value ceiling for calibration matches (default: 0.005)
        #[arg(short = 'q', long = "q-value", value_name = "Q")]
        q_value_max: Option<f64>,

        /// Minimum charge kept from Dinosaur feature tables (default: 2)
        #[arg(long, value_name = "Z")]
        min_charge: Option<i32>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Split scans in parallel (requires the parallel feature)
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },

    /// Estimate the precursor mass calibration from an mzIdentML file
    Calibrate {
        /// mzIdentML file from a first-pass search
        #[arg(value_name = "MZID")]
        mzid: PathBuf,

        /// q-value ceiling for calibration matches (default: 0.005)
        #[arg(short = 'q', long = "q-value", value_name = "Q")]
        q_value_max: Option<f64>,

        /// Load tolerance and q-value settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            features,
            spectra,
            mzid,
            isolation_width,
            q_value_max,
            min_charge,
            config,
            parallel,
        } => run::run(run::RunArgs {
            features,
            spectra,
            mzid,
            isolation_width,
            q_value_max,
            min_charge,
            config,
            parallel,
        }),
        Commands::Calibrate {
            mzid,
            q_value_max,
            config,
            json,
        } => calibrate::run(mzid, q_value_max, config, json),
    }
}
