//! Scan-level view of an mzML run
//!
//! [`ScanReader`] wraps the low-level [`MzMLStreamer`] and yields validated
//! [`Scan`]s in file order. Retention times are normalised to seconds with a
//! single [`TimeScale`] detected from the first unit-annotated scan time.
//!
//! The reader is forward-only. Once the underlying document fails, or a scan
//! fails in a way that signals a corrupt run, the error is yielded once and
//! the iterator is exhausted for good.

use std::fmt;
use std::io::BufRead;
use std::path::Path;

use log::info;

use crate::mzml::{terms, MzMLError, MzMLSpectrum, MzMLStreamer, TimeUnitAnnotation};

mod error;

pub use error::ScanError;

#[cfg(test)]
mod tests;

/// A single centroided peak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Mass-to-charge ratio
    pub mz: f64,
    /// Signal intensity
    pub intensity: f64,
}

/// Precursor ion selected for fragmentation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanPrecursor {
    /// Observed precursor m/z
    pub mz: f64,
    /// Assigned charge, `None` when the file does not state one
    pub charge: Option<i32>,
}

impl ScanPrecursor {
    /// Charge with unknown mapped to 0
    pub fn charge_or_zero(&self) -> i32 {
        self.charge.unwrap_or(0)
    }
}

/// One spectrum from the run, validated and normalised
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    /// Acquisition index parsed from the native ID (`scan=N`)
    pub index: u64,
    /// Native spectrum ID, used as the raw-file title in output records
    pub id: String,
    /// MS level
    pub ms_level: i16,
    /// Retention time in seconds
    pub retention_time: f64,
    /// Precursor ions, empty for MS1
    pub precursors: Vec<ScanPrecursor>,
    /// Nonzero-intensity peaks sorted ascending by m/z
    pub peaks: Vec<Peak>,
}

impl Scan {
    /// Whether this is a fragmentation (MS2) scan
    pub fn is_ms2(&self) -> bool {
        self.ms_level == 2
    }
}

/// Unit of the scan times in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeScale {
    /// Scan times are already in seconds
    Seconds,
    /// Scan times are in minutes
    Minutes,
}

impl TimeScale {
    /// Derive the scale from a unit annotation
    ///
    /// Anything that is not explicitly "second" is taken as minutes, the same
    /// assumption made for feature table retention times.
    pub fn from_annotation(unit: &TimeUnitAnnotation) -> Self {
        let is_second = unit.name.as_deref() == Some("second")
            || unit.accession.as_deref() == Some(terms::UNIT_SECOND);
        if is_second {
            TimeScale::Seconds
        } else {
            TimeScale::Minutes
        }
    }

    /// Multiplier converting a raw scan time to seconds
    pub fn factor(&self) -> f64 {
        match self {
            TimeScale::Seconds => 1.0,
            TimeScale::Minutes => 60.0,
        }
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeScale::Seconds => write!(f, "seconds"),
            TimeScale::Minutes => write!(f, "minutes"),
        }
    }
}

/// Forward-only iterator of [`Scan`]s over an mzML stream
pub struct ScanReader<R: BufRead> {
    streamer: MzMLStreamer<R>,
    time_scale: Option<TimeScale>,
    exhausted: bool,
}

impl ScanReader<Box<dyn BufRead>> {
    /// Open an mzML (or `.mzML.gz`) file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MzMLError> {
        Ok(Self::new(MzMLStreamer::open(path)?))
    }
}

impl<R: BufRead> ScanReader<R> {
    /// Wrap an existing streamer
    pub fn new(streamer: MzMLStreamer<R>) -> Self {
        Self {
            streamer,
            time_scale: None,
            exhausted: false,
        }
    }

    /// Time scale in effect, once detected
    pub fn time_scale(&self) -> Option<TimeScale> {
        self.time_scale
    }

    /// Whether the reader has reached its terminal state
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn convert(&mut self, spectrum: MzMLSpectrum) -> Result<Scan, ScanError> {
        if self.time_scale.is_none() {
            if let Some(unit) = &spectrum.scan_time_unit {
                let scale = TimeScale::from_annotation(unit);
                info!("Scan times are in {}", scale);
                self.time_scale = Some(scale);
            }
        }

        let index = spectrum
            .scan_number()
            .ok_or_else(|| ScanError::MissingScanIndex {
                id: spectrum.id.clone(),
            })?;
        let ms_level = spectrum.ms_level.ok_or_else(|| ScanError::MissingMsLevel {
            id: spectrum.id.clone(),
        })?;
        // Profile points are not peaks; an undeclared spectrum is taken as centroided
        if ms_level == 2 && spectrum.centroided == Some(false) {
            return Err(ScanError::ProfileSpectrum { id: spectrum.id });
        }

        let scale = self.time_scale.unwrap_or(TimeScale::Minutes);
        let retention_time = spectrum
            .scan_time
            .map(|t| t * scale.factor())
            .ok_or_else(|| ScanError::MissingScanTime {
                id: spectrum.id.clone(),
            })?;

        let precursors = spectrum
            .precursors
            .iter()
            .map(|p| {
                let mz = p
                    .selected_ion_mz
                    .or(p.isolation_window_target)
                    .ok_or_else(|| ScanError::MalformedPrecursor {
                        id: spectrum.id.clone(),
                    })?;
                let charge = p
                    .selected_ion_charge
                    .as_deref()
                    .and_then(|z| z.trim().parse::<i32>().ok());
                Ok(ScanPrecursor { mz, charge })
            })
            .collect::<Result<Vec<_>, ScanError>>()?;

        if ms_level == 2 && precursors.is_empty() {
            return Err(ScanError::MissingPrecursor { id: spectrum.id });
        }

        let mut peaks: Vec<Peak> = spectrum
            .mz_array
            .iter()
            .zip(&spectrum.intensity_array)
            .filter(|(_, intensity)| **intensity != 0.0)
            .map(|(&mz, &intensity)| Peak { mz, intensity })
            .collect();
        peaks.sort_by(|a, b| a.mz.total_cmp(&b.mz));

        Ok(Scan {
            index,
            id: spectrum.id,
            ms_level,
            retention_time,
            precursors,
            peaks,
        })
    }
}

impl<R: BufRead> Iterator for ScanReader<R> {
    type Item = Result<Scan, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        match self.streamer.next_spectrum() {
            Ok(Some(spectrum)) => {
                let result = self.convert(spectrum);
                if matches!(&result, Err(e) if e.is_fatal()) {
                    self.exhausted = true;
                }
                Some(result)
            }
            Ok(None) => {
                self.exhausted = true;
                None
            }
            Err(source) => {
                self.exhausted = true;
                Some(Err(ScanError::Stream {
                    position: self.streamer.position(),
                    spectra_read: self.streamer.spectra_read(),
                    source,
                }))
            }
        }
    }
}
