//! First-pass peptide identifications (mzIdentML)
//!
//! Only the mass accuracy of confident matches matters downstream, so the
//! reader keeps one [`SpectrumResult`] at a time and reduces the stream to an
//! [`IdentificationSummary`]: the ppm residuals of accepted matches plus the
//! highest scan index seen.
//!
//! ## Elements read
//!
//! ```text
//! SpectrumIdentificationResult  @spectrumID
//! ├── SpectrumIdentificationItem*  @calculatedMassToCharge @experimentalMassToCharge
//! │   │                            @chargeState @rank
//! │   ├── cvParam  MS-GF:QValue (MS:1002054)
//! │   └── userParam  IsotopeError
//! └── cvParam  scan number(s) (MS:1001115)
//! ```

use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use log::{debug, info};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::input::open_input;

mod error;

pub use error::IdentificationError;


/// Default q-value ceiling for calibration matches
pub const DEFAULT_Q_VALUE_MAX: f64 = 0.005;

/// CV accession of the MS-GF+ q-value
pub const MSGF_QVALUE_ACCESSION: &str = "MS:1002054";

/// CV accession of the scan number(s) term
pub const SCAN_NUMBERS_ACCESSION: &str = "MS:1001115";

/// One candidate peptide match for a spectrum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumMatch {
    /// Theoretical precursor m/z of the peptide
    pub calculated_mz: f64,
    /// Observed precursor m/z
    pub experimental_mz: f64,
    /// Precursor charge used for the match
    pub charge: i32,
    /// Rank among the candidates of the spectrum (1 = best)
    pub rank: u32,
    /// Target-decoy q-value
    pub q_value: f64,
    /// Isotope peak picked as monoisotopic, 0 when correct
    pub isotope_error: i32,
}

impl SpectrumMatch {
    /// Whether the match is trusted for mass calibration
    pub fn is_confident(&self, q_value_max: f64) -> bool {
        self.q_value < q_value_max
            && self.rank == 1
            && self.isotope_error == 0
            && (2..=4).contains(&self.charge)
    }

    /// Relative mass error in parts per million
    pub fn residual_ppm(&self) -> f64 {
        (self.experimental_mz - self.calculated_mz) * 1e6 / self.calculated_mz
    }
}

/// All candidate matches reported for one spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumResult {
    /// `spectrumID` attribute, e.g. `controllerType=0 controllerNumber=1 scan=42`
    pub spectrum_id: String,
    /// Value of the `scan number(s)` term, if present and numeric
    pub scan_number: Option<u64>,
    /// Candidate matches, at least one
    pub matches: Vec<SpectrumMatch>,
}

impl SpectrumResult {
    /// Scan index of the spectrum
    ///
    /// Prefers the explicit scan number and falls back to the integer after
    /// the last `=` of the spectrum reference.
    pub fn scan_index(&self) -> Option<u64> {
        self.scan_number.or_else(|| {
            self.spectrum_id
                .rsplit('=')
                .next()
                .and_then(|token| token.trim().parse().ok())
        })
    }
}

/// Streaming reader over `SpectrumIdentificationResult` elements
pub struct MzIdentMLReader<R: BufRead> {
    reader: Reader<R>,
    source_name: String,
}

impl MzIdentMLReader<Box<dyn BufRead>> {
    /// Open an mzIdentML file, inflating it if the name ends in `.gz`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IdentificationError> {
        let path = path.as_ref();
        let input = open_input(path).map_err(|source| IdentificationError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(input, path.display().to_string()))
    }
}

impl<R: BufRead> MzIdentMLReader<R> {
    /// Wrap a buffered source; `source_name` labels errors
    pub fn new(reader: R, source_name: impl Into<String>) -> Self {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);
        Self {
            reader: xml_reader,
            source_name: source_name.into(),
        }
    }

    /// Read the next result that carries at least one match
    pub fn next_result(&mut self) -> Result<Option<SpectrumResult>, IdentificationError> {
        let mut buf = Vec::new();
        let mut result: Option<SpectrumResult> = None;
        let mut item: Option<PendingMatch> = None;

        loop {
            let event = self
                .reader
                .read_event_into(&mut buf)
                .map_err(|source| self.xml_error(source))?;

            match event {
                Event::Start(ref e) => self.open_element(e, false, &mut result, &mut item)?,
                Event::Empty(ref e) => self.open_element(e, true, &mut result, &mut item)?,
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"SpectrumIdentificationItem" => {
                        if let (Some(result), Some(pending)) = (result.as_mut(), item.take()) {
                            let matched = pending.finish(&self.source_name, &result.spectrum_id)?;
                            result.matches.push(matched);
                        }
                    }
                    b"SpectrumIdentificationResult" => match result.take() {
                        Some(done) if !done.matches.is_empty() => return Ok(Some(done)),
                        Some(done) => debug!("{}: no matches, skipped", done.spectrum_id),
                        None => {}
                    },
                    _ => {}
                },
                Event::Eof => {
                    if let Some(open) = result {
                        return Err(IdentificationError::Truncated {
                            source_name: self.source_name.clone(),
                            spectrum_id: open.spectrum_id,
                        });
                    }
                    return Ok(None);
                }
                _ => {}
            }
            buf.clear();
        }
    }

    fn open_element(
        &self,
        e: &BytesStart,
        is_empty: bool,
        result: &mut Option<SpectrumResult>,
        item: &mut Option<PendingMatch>,
    ) -> Result<(), IdentificationError> {
        match e.local_name().as_ref() {
            b"SpectrumIdentificationResult" if !is_empty => {
                *result = Some(SpectrumResult {
                    spectrum_id: attribute(e, "spectrumID").unwrap_or_default(),
                    scan_number: None,
                    matches: Vec::new(),
                });
            }
            b"SpectrumIdentificationItem" => {
                let Some(result) = result.as_mut() else {
                    return Ok(());
                };
                let pending = PendingMatch {
                    calculated_mz: attribute(e, "calculatedMassToCharge"),
                    experimental_mz: attribute(e, "experimentalMassToCharge"),
                    charge: attribute(e, "chargeState"),
                    rank: attribute(e, "rank"),
                    ..Default::default()
                };
                if is_empty {
                    let matched = pending.finish(&self.source_name, &result.spectrum_id)?;
                    result.matches.push(matched);
                } else {
                    *item = Some(pending);
                }
            }
            b"cvParam" | b"userParam" => {
                let name = attribute(e, "name").unwrap_or_default();
                let accession = attribute(e, "accession").unwrap_or_default();
                let value = attribute(e, "value");
                if let Some(pending) = item.as_mut() {
                    pending.apply_param(&name, &accession, value);
                } else if let Some(result) = result.as_mut() {
                    if accession == SCAN_NUMBERS_ACCESSION || name == "scan number(s)" {
                        result.scan_number = value.and_then(|v| v.trim().parse().ok());
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn xml_error(&self, source: quick_xml::Error) -> IdentificationError {
        IdentificationError::XmlError {
            source_name: self.source_name.clone(),
            position: self.reader.buffer_position(),
            source,
        }
    }
}

impl<R: BufRead> Iterator for MzIdentMLReader<R> {
    type Item = Result<SpectrumResult, IdentificationError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_result().transpose()
    }
}

/// Attribute value by name, lossily decoded
fn attribute(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name.as_bytes())
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Raw fields of a `SpectrumIdentificationItem` collected until its end tag
#[derive(Debug, Default)]
struct PendingMatch {
    calculated_mz: Option<String>,
    experimental_mz: Option<String>,
    charge: Option<String>,
    rank: Option<String>,
    q_value: Option<String>,
    isotope_error: Option<String>,
}

impl PendingMatch {
    fn apply_param(&mut self, name: &str, accession: &str, value: Option<String>) {
        if accession == MSGF_QVALUE_ACCESSION || name == "MS-GF:QValue" {
            self.q_value = value;
        } else if name == "IsotopeError" {
            self.isotope_error = value;
        }
    }

    fn finish(
        self,
        source_name: &str,
        spectrum_id: &str,
    ) -> Result<SpectrumMatch, IdentificationError> {
        let ctx = FieldContext {
            source_name,
            spectrum_id,
        };
        Ok(SpectrumMatch {
            calculated_mz: ctx.parse(self.calculated_mz, "calculatedMassToCharge")?,
            experimental_mz: ctx.parse(self.experimental_mz, "experimentalMassToCharge")?,
            charge: ctx.parse(self.charge, "chargeState")?,
            rank: ctx.parse(self.rank, "rank")?,
            q_value: ctx.parse(self.q_value, "MS-GF:QValue")?,
            isotope_error: ctx.parse(self.isotope_error, "IsotopeError")?,
        })
    }
}

struct FieldContext<'a> {
    source_name: &'a str,
    spectrum_id: &'a str,
}

impl FieldContext<'_> {
    fn parse<T: FromStr>(
        &self,
        value: Option<String>,
        field: &'static str,
    ) -> Result<T, IdentificationError> {
        let value = value.ok_or_else(|| IdentificationError::MissingField {
            source_name: self.source_name.to_string(),
            spectrum_id: self.spectrum_id.to_string(),
            field,
        })?;
        value
            .trim()
            .parse()
            .map_err(|_| IdentificationError::InvalidValue {
                source_name: self.source_name.to_string(),
                spectrum_id: self.spectrum_id.to_string(),
                field,
                value,
            })
    }
}

/// Calibration-relevant digest of an identification file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentificationSummary {
    /// ppm residuals of the confident matches, in file order
    pub residuals_ppm: Vec<f64>,
    /// Highest scan index referenced by any result, 0 if none
    pub max_scan_index: u64,
    /// Results carrying at least one match
    pub results: usize,
}

impl IdentificationSummary {
    /// Reduce a stream of results, keeping matches that pass `q_value_max`
    pub fn collect<I>(results: I, q_value_max: f64) -> Result<Self, IdentificationError>
    where
        I: IntoIterator<Item = Result<SpectrumResult, IdentificationError>>,
    {
        let mut summary = Self::default();
        for result in results {
            let result = result?;
            summary.results += 1;
            match result.scan_index() {
                Some(scan) => summary.max_scan_index = summary.max_scan_index.max(scan),
                None => debug!("{}: no scan index", result.spectrum_id),
            }
            summary.residuals_ppm.extend(
                result
                    .matches
                    .iter()
                    .filter(|m| m.is_confident(q_value_max))
                    .map(SpectrumMatch::residual_ppm),
            );
        }
        Ok(summary)
    }

    /// Number of confident matches
    pub fn accepted(&self) -> usize {
        self.residuals_ppm.len()
    }
}

impl fmt::Display for IdentificationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} confident matches in {} spectrum results (max scan {})",
            self.accepted(),
            self.results,
            self.max_scan_index
        )
    }
}

/// Read an mzIdentML file and summarise it for calibration
pub fn read_identifications<P: AsRef<Path>>(
    path: P,
    q_value_max: f64,
) -> Result<IdentificationSummary, IdentificationError> {
    let path = path.as_ref();
    info!("Reading identifications from {}", path.display());
    let summary = IdentificationSummary::collect(MzIdentMLReader::open(path)?, q_value_max)?;
    info!("{}", summary);
    Ok(summary)
}
