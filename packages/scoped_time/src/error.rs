use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when writing reports to files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A report file could not be created or written.
    #[error("failed to write report to '{}'", path.display())]
    Io {
        /// The file that was being written.
        path: PathBuf,

        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// A specialized `Result` type for report file operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
