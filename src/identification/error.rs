use std::path::PathBuf;

/// Errors raised while reading an mzIdentML file
#[derive(Debug, thiserror::Error)]
pub enum IdentificationError {
    /// The file could not be opened
    #[error("cannot open {}: {source}", path.display())]
    IoError {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The document is not well-formed XML
    #[error("{source_name}: XML error near byte {position}: {source}")]
    XmlError {
        /// File name (or other label) of the input
        source_name: String,
        /// Approximate byte offset of the failure
        position: u64,
        /// Underlying parser error
        #[source]
        source: quick_xml::Error,
    },

    /// The document ends inside a `SpectrumIdentificationResult`
    #[error("{source_name}: document ends inside result for spectrum {spectrum_id}")]
    Truncated {
        /// File name (or other label) of the input
        source_name: String,
        /// `spectrumID` of the unfinished result
        spectrum_id: String,
    },

    /// A required attribute or parameter is absent from a match
    #[error("{source_name}: spectrum {spectrum_id}: missing {field}")]
    MissingField {
        /// File name (or other label) of the input
        source_name: String,
        /// `spectrumID` of the enclosing result
        spectrum_id: String,
        /// Name of the missing field
        field: &'static str,
    },

    /// A required field does not parse as a number
    #[error("{source_name}: spectrum {spectrum_id}: invalid {field} value {value:?}")]
    InvalidValue {
        /// File name (or other label) of the input
        source_name: String,
        /// `spectrumID` of the enclosing result
        spectrum_id: String,
        /// Name of the offending field
        field: &'static str,
        /// Raw text of the field
        value: String,
    },
}
