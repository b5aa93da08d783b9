use std::path::{Path, PathBuf};

use thiserror::Error;

/// The primary error type for all repackaging operations.
///
/// Every variant names the path (or entry) it failed on, so callers can report
/// the failure without extra bookkeeping.
#[derive(Debug, Error)]
pub enum RepackError {
    /// An I/O error occurred while opening, reading, creating or writing a file or directory.
    #[error("I/O error on path '{}': {source}", .path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// The archive container could not be read or written.
    #[error("archive error on '{}': {source}", .path.display())]
    Zip {
        #[source]
        source: zip::result::ZipError,
        path: PathBuf,
    },

    /// Walking a source tree failed part way through.
    #[error("error walking '{}': {source}", .path.display())]
    Walk {
        #[source]
        source: walkdir::Error,
        path: PathBuf,
    },

    /// A walked path was not located under the walk root.
    #[error("could not strip prefix '{}' from path '{}'", .prefix.display(), .path.display())]
    StripPrefix { prefix: PathBuf, path: PathBuf },

    /// A path supplied as a directory is something else.
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// An archive entry would be written outside of the working directory.
    #[error("archive entry '{0}' escapes the extraction directory")]
    UnsafeEntry(String),

    /// A required parameter was missing or empty.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RepackError {
    /// Returns a closure that attaches `path` to an `io::Error`, for use with `map_err`.
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> RepackError + '_ {
        move |source| RepackError::Io { source, path: path.to_path_buf() }
    }

    pub(crate) fn zip(path: &Path) -> impl FnOnce(zip::result::ZipError) -> RepackError + '_ {
        move |source| RepackError::Zip { source, path: path.to_path_buf() }
    }
}

pub type Result<T> = std::result::Result<T, RepackError>;
