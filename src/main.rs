//! # DeMix
//!
//! Command-line front end for the `demix` library.
//!
//! ## Usage
//!
//! ```bash
//! # Split chimeric spectra into run.mzML.demix.mgf
//! demix run run.features.csv run.mzML run.mzid
//!
//! # Inspect the mass calibration of a first-pass search
//! demix calibrate run.mzid --json
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
