/// Errors that can occur while writing MGF output
#[derive(Debug, thiserror::Error)]
pub enum MgfError {
    /// I/O error on the output
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The output file could not be created
    #[error("cannot create {}: {source}", path.display())]
    CreateError {
        /// Output path
        path: std::path::PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}
