//! Mascot Generic Format output for pseudo-spectra
//!
//! Each [`PseudoSpectrum`] becomes one `BEGIN IONS` ... `END IONS` block:
//!
//! ```text
//! BEGIN IONS
//! TITLE=1523[87:500.250000:151.200000]
//! RTINSECONDS=150.000000
//! PEPMASS=500.249000
//! CHARGE=2+
//! RAWFILE=controllerType=0 controllerNumber=1 scan=1523 [500.250500:2] diff:-0.000500
//! 175.119 1200
//! END IONS
//!
//! ```
//!
//! Fallback records use `-` as the feature label, the scan's own m/z and
//! retention time in the title, and a bare `RAWFILE` line. A record is
//! formatted in full before any byte of it reaches the output, so a run
//! that stops early leaves only whole records behind.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::matcher::{Assignment, PseudoSpectrum};

mod error;

pub use error::MgfError;

#[cfg(test)]
mod tests;

/// Suffix appended to the spectra path to name the output
pub const OUTPUT_SUFFIX: &str = ".demix.mgf";

/// Output path for a spectra file: `<spectra path>.demix.mgf`
pub fn output_path_for<P: AsRef<Path>>(spectra: P) -> PathBuf {
    let mut path = spectra.as_ref().as_os_str().to_owned();
    path.push(OUTPUT_SUFFIX);
    PathBuf::from(path)
}

/// Streaming MGF writer
pub struct MgfWriter<W: Write> {
    writer: W,
    buffer: String,
    records_written: usize,
}

impl MgfWriter<BufWriter<File>> {
    /// Create (or truncate) an MGF file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, MgfError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| MgfError::CreateError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> MgfWriter<W> {
    /// Wrap any writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: String::with_capacity(4096),
            records_written: 0,
        }
    }

    /// Number of records written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Write one record
    pub fn write_spectrum(&mut self, spectrum: &PseudoSpectrum<'_>) -> Result<(), MgfError> {
        self.buffer.clear();
        format_record(&mut self.buffer, spectrum);
        self.writer.write_all(self.buffer.as_bytes())?;
        self.records_written += 1;
        Ok(())
    }

    /// Write records in order
    pub fn write_all<'a, 's: 'a, I>(&mut self, spectra: I) -> Result<(), MgfError>
    where
        I: IntoIterator<Item = &'a PseudoSpectrum<'s>>,
    {
        for spectrum in spectra {
            self.write_spectrum(spectrum)?;
        }
        Ok(())
    }

    /// Flush and return the inner writer
    pub fn finish(mut self) -> Result<W, MgfError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Render one record, including its trailing blank line
pub fn format_record(out: &mut String, spectrum: &PseudoSpectrum<'_>) {
    // Writing into a String cannot fail
    let _ = write_record(out, spectrum);
}

fn write_record(out: &mut String, s: &PseudoSpectrum<'_>) -> std::fmt::Result {
    out.push_str("BEGIN IONS\n");
    match s.assignment {
        Assignment::Feature { id, mz, rt_apex } => {
            writeln!(out, "TITLE={}[{}:{:.6}:{:.6}]", s.scan_index, id, mz, rt_apex)?;
        }
        Assignment::Unmatched => {
            writeln!(
                out,
                "TITLE={}[-:{:.6}:{:.6}]",
                s.scan_index, s.precursor.mz, s.retention_time
            )?;
        }
    }
    writeln!(out, "RTINSECONDS={:.6}", s.retention_time)?;
    writeln!(out, "PEPMASS={:.6}", s.corrected_mz)?;
    writeln!(out, "CHARGE={}+", s.charge)?;
    match s.assignment {
        Assignment::Feature { mz, .. } => writeln!(
            out,
            "RAWFILE={} [{:.6}:{}] diff:{:.6}",
            s.scan_title,
            s.precursor.mz,
            s.precursor.charge_or_zero(),
            mz - s.precursor.mz
        )?,
        Assignment::Unmatched => writeln!(out, "RAWFILE={}", s.scan_title)?,
    }
    // Shortest round-trip form; whole numbers keep their `.0` (`1200.0`)
    for peak in s.peaks {
        writeln!(out, "{:?} {:?}", peak.mz, peak.intensity)?;
    }
    out.push_str("END IONS\n\n");
    Ok(())
}
