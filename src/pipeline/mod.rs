//! End-to-end demixing run
//!
//! [`run_demix`] sequences the whole job:
//!
//! 1. Read the identification table and estimate the mass calibration.
//!    Nothing else is touched if this fails.
//! 2. Load the feature table.
//! 3. Stream the spectra, split every MS2 scan and append the records to
//!    `<spectra>.demix.mgf` as they are produced.
//!
//! Scans with a local defect are skipped. Corruption of the spectra stream
//! stops the run but keeps everything already written; the error comes back
//! in [`DemixOutcome::truncation`] instead of failing the call.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::calibration::MassCalibration;
use crate::features::FeatureTable;
use crate::identification::read_identifications;
use crate::matcher::{DemixStats, FeatureMatcher};
use crate::mgf::{output_path_for, MgfWriter};
use crate::scan::{Scan, ScanError, ScanReader};

mod config;
mod error;

pub use config::{DemixConfig, DEFAULT_BATCH_SIZE, DEFAULT_PROGRESS_INTERVAL};
pub use error::DemixError;


/// Result of a completed (possibly truncated) run
#[derive(Debug)]
pub struct DemixOutcome {
    /// Path of the MGF file written
    pub output_path: PathBuf,
    /// Calibration applied to every precursor
    pub calibration: MassCalibration,
    /// Suggested tolerance for a second search, in ppm
    pub search_tolerance_ppm: f64,
    /// Highest scan index referenced by the identifications
    pub max_scan_index: u64,
    /// Run counters
    pub stats: DemixStats,
    /// Stream failure that ended the run early, if any
    pub truncation: Option<ScanError>,
}

impl DemixOutcome {
    /// Whether every scan of the spectra file was processed
    pub fn is_complete(&self) -> bool {
        self.truncation.is_none()
    }
}

/// Run the full demixing job; the output lands next to the spectra file
pub fn run_demix<P, Q, R>(
    features_path: P,
    spectra_path: Q,
    mzid_path: R,
    config: &DemixConfig,
) -> Result<DemixOutcome, DemixError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    config.validate()?;
    let spectra_path = spectra_path.as_ref();

    let identifications = read_identifications(mzid_path, config.q_value_max)?;
    let calibration = MassCalibration::estimate(&identifications.residuals_ppm)?;
    let search_tolerance_ppm =
        calibration.search_tolerance_ppm(config.tolerance_sigmas, config.tolerance_cap_ppm);
    info!(
        "Calibration: {}; second search tolerance {}",
        calibration,
        calibration.tolerance_argument(config.tolerance_sigmas, config.tolerance_cap_ppm)
    );

    let table = FeatureTable::load(features_path, config.min_charge)?;
    info!("Loaded {} features", table.len());

    let scans = ScanReader::open(spectra_path).map_err(|source| DemixError::Spectra {
        path: spectra_path.to_path_buf(),
        source,
    })?;

    let output_path = output_path_for(spectra_path);
    info!("Writing {}", output_path.display());
    let mut writer = MgfWriter::create(&output_path)?;

    let matcher = FeatureMatcher::new(&table, calibration.offset_ppm, config.isolation_width)
        .with_ms1_precision(config.ms1_precision);
    info!("Auto correct precursor m/z offset: {:.2} ppm", matcher.offset_ppm());

    let run = demix_scans(
        scans,
        &matcher,
        &mut writer,
        identifications.max_scan_index,
        config,
    )?;
    writer.finish()?;

    info!("{}", run.stats);
    Ok(DemixOutcome {
        output_path,
        calibration,
        search_tolerance_ppm,
        max_scan_index: identifications.max_scan_index,
        stats: run.stats,
        truncation: run.truncation,
    })
}

/// Counters and early-stop reason of one pass over a scan stream
#[derive(Debug, Default)]
pub struct ScanRun {
    /// Run counters
    pub stats: DemixStats,
    /// Stream failure that ended the pass early, if any
    pub truncation: Option<ScanError>,
}

/// Split a scan stream and write every record in scan order
///
/// Honours `config.parallel` when built with the `parallel` feature; the
/// output is the same either way.
pub fn demix_scans<I, W>(
    scans: I,
    matcher: &FeatureMatcher<'_>,
    writer: &mut MgfWriter<W>,
    max_scan_index: u64,
    config: &DemixConfig,
) -> Result<ScanRun, DemixError>
where
    I: IntoIterator<Item = Result<Scan, ScanError>>,
    W: Write,
{
    let progress = Progress::new(max_scan_index, config.progress_interval);

    #[cfg(feature = "parallel")]
    {
        if config.parallel {
            return parallel::demix_batched(scans, matcher, writer, &progress, config.batch_size);
        }
    }
    #[cfg(not(feature = "parallel"))]
    {
        if config.parallel {
            warn!("Parallel splitting requested but built without the parallel feature; running sequentially.");
        }
    }

    let mut run = ScanRun::default();
    for item in scans {
        let Some(scan) = run.accept(item) else {
            if run.truncation.is_some() {
                break;
            }
            continue;
        };
        progress.observe(scan.index);
        let split = matcher.split_scan(&scan);
        writer.write_all(&split.spectra)?;
        run.stats.record_scan(scan.is_ms2(), &split);
    }
    Ok(run)
}

impl ScanRun {
    /// Triage one item from the scan stream
    ///
    /// Soft failures are counted and dropped; a fatal one is stored as the
    /// truncation reason.
    fn accept(&mut self, item: Result<Scan, ScanError>) -> Option<Scan> {
        match item {
            Ok(scan) => Some(scan),
            Err(e) if e.is_fatal() => {
                warn!("Stopping early, output is partial: {}", e);
                self.truncation = Some(e);
                None
            }
            Err(e) => {
                debug!("Skipping scan: {}", e);
                self.stats.record_skip(&e);
                None
            }
        }
    }
}

/// Progress lines keyed on scan index
#[derive(Debug, Clone, Copy)]
struct Progress {
    max_scan_index: u64,
    interval: u64,
}

impl Progress {
    fn new(max_scan_index: u64, interval: u64) -> Self {
        Self {
            max_scan_index,
            interval,
        }
    }

    fn observe(&self, scan_index: u64) {
        if self.max_scan_index > 0 && self.interval > 0 && scan_index % self.interval == 0 {
            info!(
                "DeMix {} MS/MS (~{:.1}%)",
                scan_index,
                scan_index as f64 * 100.0 / self.max_scan_index as f64
            );
        }
    }
}

#[cfg(feature = "parallel")]
mod parallel {
    use std::io::Write;

    use rayon::prelude::*;

    use super::{DemixError, Progress, ScanRun};
    use crate::matcher::{FeatureMatcher, ScanSplit};
    use crate::mgf::MgfWriter;
    use crate::scan::{Scan, ScanError};

    /// Read scans in file-order batches and split each batch on the rayon pool
    pub(super) fn demix_batched<I, W>(
        scans: I,
        matcher: &FeatureMatcher<'_>,
        writer: &mut MgfWriter<W>,
        progress: &Progress,
        batch_size: usize,
    ) -> Result<ScanRun, DemixError>
    where
        I: IntoIterator<Item = Result<Scan, ScanError>>,
        W: Write,
    {
        let mut run = ScanRun::default();
        let mut scans = scans.into_iter();
        let mut batch: Vec<Scan> = Vec::with_capacity(batch_size);

        loop {
            batch.clear();
            for item in scans.by_ref() {
                if let Some(scan) = run.accept(item) {
                    progress.observe(scan.index);
                    batch.push(scan);
                    if batch.len() >= batch_size {
                        break;
                    }
                } else if run.truncation.is_some() {
                    break;
                }
            }

            let splits: Vec<ScanSplit<'_>> = batch
                .par_iter()
                .map(|scan| matcher.split_scan(scan))
                .collect();
            for (scan, split) in batch.iter().zip(&splits) {
                writer.write_all(&split.spectra)?;
                run.stats.record_scan(scan.is_ms2(), split);
            }

            if run.truncation.is_some() || batch.len() < batch_size {
                return Ok(run);
            }
        }
    }
}
