use std::path::PathBuf;

/// Errors that can occur while loading a feature table
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// I/O error opening the table
    #[error("Failed to read feature table {path}: {source}")]
    IoError {
        /// Table path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// CSV/TSV tokenizer error
    #[error("CSV parsing error in {source_name}: {source}")]
    CsvError {
        /// Table name used in messages
        source_name: String,
        /// Underlying csv error
        #[source]
        source: csv::Error,
    },

    /// A data row is shorter than the dialect requires
    #[error("{source_name} line {line}: expected at least {expected} columns, found {found}")]
    MissingColumn {
        /// Table name used in messages
        source_name: String,
        /// 1-based line number
        line: u64,
        /// Columns the dialect needs
        expected: usize,
        /// Columns present on the row
        found: usize,
    },

    /// A numeric field could not be parsed
    #[error("{source_name} line {line}: invalid {field} value {value:?}")]
    InvalidValue {
        /// Table name used in messages
        source_name: String,
        /// 1-based line number
        line: u64,
        /// Field name
        field: &'static str,
        /// Offending text
        value: String,
    },
}
