use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};

use super::helpers::{get_attribute, parse_cv_param};
use super::{MzMLError, MzMLStreamer};
use crate::mzml::binary::{ArrayDescriptor, ArrayKind};
use crate::mzml::cv_params::{terms, CvParam};
use crate::mzml::models::{MzMLPrecursor, MzMLSpectrum};

impl<R: BufRead> MzMLStreamer<R> {
    /// Read the next spectrum from the stream
    ///
    /// Anything outside `<spectrum>` elements (header lists, chromatograms,
    /// the index) is skipped.
    pub fn next_spectrum(&mut self) -> Result<Option<MzMLSpectrum>, MzMLError> {
        let mut buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    if e.name().as_ref() == b"spectrum" {
                        let spectrum = self.parse_spectrum(&e)?;
                        self.current_spectrum_index += 1;
                        return Ok(Some(spectrum));
                    }
                }
                Ok(Event::Eof) => return Ok(None),
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }
    }

    /// Parse a single spectrum element
    fn parse_spectrum(&mut self, start_event: &BytesStart) -> Result<MzMLSpectrum, MzMLError> {
        let mut spectrum = MzMLSpectrum {
            id: get_attribute(start_event, "id")?.unwrap_or_default(),
            default_array_length: get_attribute(start_event, "defaultArrayLength")?
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            ..Default::default()
        };

        let mut depth = 1;
        let mut in_scan_list = false;
        let mut in_precursor_list = false;
        let mut in_binary_data_array_list = false;
        let mut current_precursor: Option<MzMLPrecursor> = None;
        let mut current_binary_array: Option<BinaryArrayContext> = None;
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    match e.name().as_ref() {
                        b"cvParam" => {
                            let cv_param = parse_cv_param(e)?;
                            Self::route_cv_param(
                                &mut spectrum,
                                &mut current_precursor,
                                &mut current_binary_array,
                                (in_scan_list, in_precursor_list, in_binary_data_array_list),
                                cv_param,
                            );
                        }
                        b"scanList" => in_scan_list = true,
                        b"precursorList" => in_precursor_list = true,
                        b"precursor" => current_precursor = Some(MzMLPrecursor::default()),
                        b"binaryDataArrayList" => in_binary_data_array_list = true,
                        b"binaryDataArray" => {
                            current_binary_array = Some(BinaryArrayContext::default());
                        }
                        _ => {}
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == b"cvParam" {
                        let cv_param = parse_cv_param(e)?;
                        Self::route_cv_param(
                            &mut spectrum,
                            &mut current_precursor,
                            &mut current_binary_array,
                            (in_scan_list, in_precursor_list, in_binary_data_array_list),
                            cv_param,
                        );
                    }
                }
                Ok(Event::Text(ref t)) => {
                    if let Some(ref mut ctx) = current_binary_array {
                        // Base64 may be wrapped over several lines
                        ctx.base64_data.push_str(&t.unescape()?);
                    }
                }
                Ok(Event::End(ref e)) => {
                    depth -= 1;
                    match e.name().as_ref() {
                        b"spectrum" => {
                            if depth == 0 {
                                break;
                            }
                        }
                        b"scanList" => in_scan_list = false,
                        b"precursorList" => in_precursor_list = false,
                        b"precursor" => {
                            if let Some(prec) = current_precursor.take() {
                                spectrum.precursors.push(prec);
                            }
                        }
                        b"binaryDataArrayList" => in_binary_data_array_list = false,
                        b"binaryDataArray" => {
                            if let Some(ctx) = current_binary_array.take() {
                                Self::decode_binary_array(&mut spectrum, ctx)?;
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => {
                    return Err(MzMLError::InvalidStructure(format!(
                        "Unexpected EOF in spectrum {}",
                        spectrum.id
                    )));
                }
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(spectrum)
    }

    /// Send a cvParam to the element it describes
    fn route_cv_param(
        spectrum: &mut MzMLSpectrum,
        current_precursor: &mut Option<MzMLPrecursor>,
        current_binary_array: &mut Option<BinaryArrayContext>,
        (in_scan_list, in_precursor_list, in_binary_data_array_list): (bool, bool, bool),
        cv_param: CvParam,
    ) {
        if in_binary_data_array_list {
            if let Some(ctx) = current_binary_array {
                ctx.descriptor.observe(&cv_param.accession);
            }
        } else if in_precursor_list {
            if let Some(prec) = current_precursor {
                Self::apply_precursor_cv_param(prec, &cv_param);
            }
        } else if in_scan_list {
            Self::apply_scan_cv_param(spectrum, &cv_param);
        } else {
            Self::apply_spectrum_cv_param(spectrum, &cv_param);
        }
    }

    /// Apply CV param to spectrum properties
    fn apply_spectrum_cv_param(spectrum: &mut MzMLSpectrum, cv: &CvParam) {
        match cv.accession.as_str() {
            terms::MS_LEVEL => {
                spectrum.ms_level = cv.parse_value();
            }
            terms::CENTROID_SPECTRUM => spectrum.centroided = Some(true),
            terms::PROFILE_SPECTRUM => spectrum.centroided = Some(false),
            _ => {}
        }
    }

    /// Apply CV param to scan properties
    fn apply_scan_cv_param(spectrum: &mut MzMLSpectrum, cv: &CvParam) {
        match cv.accession.as_str() {
            terms::SCAN_START_TIME => {
                spectrum.scan_time = cv.parse_value();
                if cv.unit.is_some() {
                    spectrum.scan_time_unit = cv.unit.clone();
                }
            }
            _ => Self::apply_spectrum_cv_param(spectrum, cv),
        }
    }

    /// Apply CV param to precursor properties
    fn apply_precursor_cv_param(precursor: &mut MzMLPrecursor, cv: &CvParam) {
        match cv.accession.as_str() {
            terms::ISOLATION_WINDOW_TARGET_MZ => {
                precursor.isolation_window_target = cv.parse_value();
            }
            terms::SELECTED_ION_MZ => {
                precursor.selected_ion_mz = cv.parse_value();
            }
            terms::CHARGE_STATE => {
                precursor.selected_ion_charge = cv.value.clone();
            }
            _ => {}
        }
    }

    /// Decode a closed `<binaryDataArray>` into the spectrum
    ///
    /// Arrays other than m/z and intensity are dropped undecoded.
    fn decode_binary_array(
        spectrum: &mut MzMLSpectrum,
        ctx: BinaryArrayContext,
    ) -> Result<(), MzMLError> {
        let Some(kind) = ctx.descriptor.kind else {
            return Ok(());
        };
        let values = ctx
            .descriptor
            .decode(&ctx.base64_data, spectrum.default_array_length)
            .map_err(|source| MzMLError::BinaryError {
                id: spectrum.id.clone(),
                source,
            })?;

        match kind {
            ArrayKind::Mz => spectrum.mz_array = values,
            ArrayKind::Intensity => spectrum.intensity_array = values,
        }
        Ok(())
    }
}

/// A `<binaryDataArray>` being read
#[derive(Debug, Default)]
struct BinaryArrayContext {
    descriptor: ArrayDescriptor,
    base64_data: String,
}
