//! Data models for mzML structures
//!
//! These hold what the streamer pulls out of one `<spectrum>` element before
//! the scan reader validates it into a [`crate::scan::Scan`].

/// Represents a single spectrum from an mzML file
#[derive(Debug, Clone, Default)]
pub struct MzMLSpectrum {
    /// Native spectrum ID from the file
    pub id: String,

    /// Default array length (number of peaks)
    pub default_array_length: usize,

    /// MS level (1 for MS1, 2 for MS2, etc.); `None` if the term is absent
    pub ms_level: Option<i16>,

    /// `Some(true)` for a centroid spectrum, `Some(false)` for profile,
    /// `None` when the spectrum declares neither
    pub centroided: Option<bool>,

    /// Raw scan start time, in whatever unit the file uses
    pub scan_time: Option<f64>,

    /// Unit annotation on the scan start time, if any
    pub scan_time_unit: Option<TimeUnitAnnotation>,

    /// Precursor information (for MS2+ spectra)
    pub precursors: Vec<MzMLPrecursor>,

    /// m/z array (decoded)
    pub mz_array: Vec<f64>,

    /// Intensity array (decoded)
    pub intensity_array: Vec<f64>,
}

impl MzMLSpectrum {
    /// Get the scan number from the native ID
    ///
    /// Reads the digits following the last `scan=` token. IDs without the
    /// token are accepted only when the whole ID is a number.
    pub fn scan_number(&self) -> Option<u64> {
        match self.id.rfind("scan=") {
            Some(pos) => {
                let start = pos + 5;
                let end = self.id[start..]
                    .find(|c: char| !c.is_ascii_digit())
                    .map(|i| start + i)
                    .unwrap_or(self.id.len());
                self.id[start..end].parse().ok()
            }
            None => self.id.trim().parse().ok(),
        }
    }
}

/// Unit attributes attached to a scan start time cvParam
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeUnitAnnotation {
    /// Unit accession, e.g. `UO:0000010`
    pub accession: Option<String>,
    /// Unit name, e.g. `second`
    pub name: Option<String>,
}

/// Precursor ion information for MS2+ spectra
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MzMLPrecursor {
    /// Isolation window target m/z
    pub isolation_window_target: Option<f64>,

    /// Selected ion m/z
    pub selected_ion_mz: Option<f64>,

    /// Raw charge state value as written in the file
    pub selected_ion_charge: Option<String>,
}
