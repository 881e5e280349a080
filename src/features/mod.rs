//! Precursor feature tables
//!
//! A feature is one precursor ion traced across retention time. Two table
//! dialects are read, chosen purely by file name:
//!
//! | Dialect | File name | Delimiter | Columns used | RT unit |
//! |---------|-----------|-----------|--------------|---------|
//! | [`FeatureDialect::TextExporter`] | anything else | `,` | `FEATURE` rows: 1=rt, 2=mz, 4=charge, 9=rt_left, 10=rt_right | seconds |
//! | [`FeatureDialect::Dinosaur`] | `*.features.csv` | `\t` | 0=mz, 2=charge, 3=rt_left, 4=rt, 5=rt_right | minutes |
//!
//! Loaded features live in a [`FeatureTable`]: the canonical store is sorted
//! by `rt_right` and a feature's position in it is its stable [`FeatureId`].
//! A second, m/z-sorted index answers isolation-window queries by binary
//! search.

use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;

mod error;

pub use error::FeatureError;

#[cfg(test)]
mod tests;

/// Default minimum charge kept from Dinosaur tables
pub const DEFAULT_MIN_CHARGE: i32 = 2;

/// File name suffix selecting the Dinosaur dialect
pub const DINOSAUR_SUFFIX: &str = ".features.csv";

/// Stable feature identifier: position in the `rt_right`-sorted store
pub type FeatureId = usize;

/// One detected precursor ion across time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feature {
    /// Monoisotopic (or apex) m/z
    pub mz: f64,
    /// Charge state
    pub charge: i32,
    /// Apex retention time in seconds
    pub rt_apex: f64,
    /// Start of the elution window in seconds
    pub rt_left: f64,
    /// End of the elution window in seconds
    pub rt_right: f64,
}

impl Feature {
    /// Strict containment of a retention time in the elution window
    pub fn elutes_at(&self, retention_time: f64) -> bool {
        self.rt_left < retention_time && retention_time < self.rt_right
    }
}

/// Feature table flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureDialect {
    /// Comma-separated export with tagged `FEATURE` rows, times in seconds
    TextExporter,
    /// Tab-separated Dinosaur table with an `mz` header, times in minutes
    Dinosaur,
}

impl FeatureDialect {
    /// Pick the dialect from the file name
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let name = path.as_ref().to_string_lossy();
        if name.ends_with(DINOSAUR_SUFFIX) {
            FeatureDialect::Dinosaur
        } else {
            FeatureDialect::TextExporter
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MzIndexEntry {
    mz: f64,
    id: FeatureId,
}

/// Immutable feature store with an m/z index
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    features: Vec<Feature>,
    mz_index: Vec<MzIndexEntry>,
}

impl FeatureTable {
    /// Build a table, sorting by `rt_right` and indexing by m/z
    ///
    /// Both sorts are stable, so ties keep their input order.
    pub fn new(mut features: Vec<Feature>) -> Self {
        features.sort_by(|a, b| a.rt_right.total_cmp(&b.rt_right));

        let mut mz_index: Vec<MzIndexEntry> = features
            .iter()
            .enumerate()
            .map(|(id, f)| MzIndexEntry { mz: f.mz, id })
            .collect();
        mz_index.sort_by(|a, b| a.mz.total_cmp(&b.mz));

        Self { features, mz_index }
    }

    /// Load a table, choosing the dialect from the file name
    pub fn load<P: AsRef<Path>>(path: P, min_charge: i32) -> Result<Self, FeatureError> {
        let path = path.as_ref();
        let dialect = FeatureDialect::from_path(path);
        let file = File::open(path).map_err(|source| FeatureError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let source_name = path.display().to_string();

        debug!("Reading {} as {:?} feature table", source_name, dialect);
        let features = match dialect {
            FeatureDialect::TextExporter => read_text_exporter(BufReader::new(file), &source_name)?,
            FeatureDialect::Dinosaur => {
                read_dinosaur(BufReader::new(file), &source_name, min_charge)?
            }
        };
        Ok(Self::new(features))
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the table holds no features
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features in `rt_right` order, with their ids
    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &Feature)> {
        self.features.iter().enumerate()
    }

    /// Range into the m/z index covering `lo <= mz <= hi`
    ///
    /// Leftmost insertion point of `lo`, rightmost insertion point of `hi`.
    pub fn candidate_range(&self, lo: f64, hi: f64) -> Range<usize> {
        let left = self.mz_index.partition_point(|e| e.mz < lo);
        let right = self.mz_index.partition_point(|e| e.mz <= hi);
        left..right.max(left)
    }

    /// Features with `lo <= mz <= hi`, ascending by m/z
    pub fn candidates(&self, lo: f64, hi: f64) -> impl Iterator<Item = (FeatureId, &Feature)> {
        self.mz_index[self.candidate_range(lo, hi)]
            .iter()
            .map(move |entry| (entry.id, &self.features[entry.id]))
    }
}

/// Read a comma-separated `FEATURE` table (times in seconds)
pub fn read_text_exporter<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<Vec<Feature>, FeatureError> {
    let mut features = Vec::new();
    for record in records(reader, b',', source_name) {
        let (line, record) = record?;
        if record.get(0) != Some("FEATURE") {
            continue;
        }
        let row = Row::new(&record, line, source_name, 11)?;
        features.push(Feature {
            rt_apex: row.parse(1, "rt")?,
            mz: row.parse(2, "mz")?,
            charge: row.parse(4, "charge")?,
            rt_left: row.parse(9, "rt_left")?,
            rt_right: row.parse(10, "rt_right")?,
        });
    }
    Ok(features)
}

/// Read a tab-separated Dinosaur table (times in minutes)
///
/// Rows below `min_charge` are dropped.
pub fn read_dinosaur<R: Read>(
    reader: R,
    source_name: &str,
    min_charge: i32,
) -> Result<Vec<Feature>, FeatureError> {
    let mut features = Vec::new();
    let mut dropped = 0usize;
    for record in records(reader, b'\t', source_name) {
        let (line, record) = record?;
        if record.get(0) == Some("mz") {
            continue;
        }
        let row = Row::new(&record, line, source_name, 6)?;
        let charge: i32 = row.parse(2, "charge")?;
        if charge < min_charge {
            dropped += 1;
            continue;
        }
        features.push(Feature {
            mz: row.parse(0, "mz")?,
            charge,
            rt_left: row.parse::<f64>(3, "rt_left")? * 60.0,
            rt_apex: row.parse::<f64>(4, "rt")? * 60.0,
            rt_right: row.parse::<f64>(5, "rt_right")? * 60.0,
        });
    }
    debug!(
        "{}: kept {} features, dropped {} below charge {}",
        source_name,
        features.len(),
        dropped,
        min_charge
    );
    Ok(features)
}

fn records<'a, R: Read + 'a>(
    reader: R,
    delimiter: u8,
    source_name: &'a str,
) -> impl Iterator<Item = Result<(u64, StringRecord), FeatureError>> + 'a {
    let csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    csv_reader.into_records().map(move |record| {
        let record = record.map_err(|source| FeatureError::CsvError {
            source_name: source_name.to_string(),
            source,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        Ok((line, record))
    })
}

/// A data row with enough context to report parse failures
struct Row<'a> {
    record: &'a StringRecord,
    line: u64,
    source_name: &'a str,
}

impl<'a> Row<'a> {
    fn new(
        record: &'a StringRecord,
        line: u64,
        source_name: &'a str,
        expected: usize,
    ) -> Result<Self, FeatureError> {
        if record.len() < expected {
            return Err(FeatureError::MissingColumn {
                source_name: source_name.to_string(),
                line,
                expected,
                found: record.len(),
            });
        }
        Ok(Self {
            record,
            line,
            source_name,
        })
    }

    fn parse<T: FromStr>(&self, column: usize, field: &'static str) -> Result<T, FeatureError> {
        let value = self.record.get(column).unwrap_or_default();
        value.parse().map_err(|_| FeatureError::InvalidValue {
            source_name: self.source_name.to_string(),
            line: self.line,
            field,
            value: value.to_string(),
        })
    }
}
