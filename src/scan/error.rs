use crate::mzml::MzMLError;

/// Per-scan failures raised while turning mzML spectra into [`super::Scan`]s
///
/// Soft failures drop one scan and let the stream continue; fatal ones end
/// the stream.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The spectrum carries no scan start time
    #[error("spectrum {id}: missing scan start time")]
    MissingScanTime {
        /// Native spectrum ID
        id: String,
    },

    /// An MS2 spectrum without any precursor
    #[error("spectrum {id}: MS2 spectrum without precursor")]
    MissingPrecursor {
        /// Native spectrum ID
        id: String,
    },

    /// A precursor without a usable m/z value
    #[error("spectrum {id}: precursor has no m/z")]
    MalformedPrecursor {
        /// Native spectrum ID
        id: String,
    },

    /// An MS2 spectrum stored in profile mode
    #[error("spectrum {id}: MS2 spectrum is profile mode, not centroided")]
    ProfileSpectrum {
        /// Native spectrum ID
        id: String,
    },

    /// The native ID does not yield a scan index
    #[error("spectrum {id}: cannot parse scan index from native ID")]
    MissingScanIndex {
        /// Native spectrum ID
        id: String,
    },

    /// The spectrum carries no MS level
    #[error("spectrum {id}: missing MS level")]
    MissingMsLevel {
        /// Native spectrum ID
        id: String,
    },

    /// The underlying mzML stream is corrupt
    #[error("spectrum stream corrupted near byte {position} after {spectra_read} spectra: {source}")]
    Stream {
        /// Approximate byte offset in the decompressed stream
        position: u64,
        /// Number of spectra successfully read before the failure
        spectra_read: i64,
        /// Underlying parser error
        #[source]
        source: MzMLError,
    },
}

impl ScanError {
    /// Whether the failure ends the scan stream
    ///
    /// Missing scan time, malformed precursor headers and profile-mode MS2
    /// data are local to one scan. An unparsable scan index, a missing MS level or a broken
    /// document are treated as corruption of the run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::MissingScanIndex { .. }
                | ScanError::MissingMsLevel { .. }
                | ScanError::Stream { .. }
        )
    }
}
