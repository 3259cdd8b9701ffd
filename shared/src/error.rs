//! Errors raised by content sources.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while reading content sources.
///
/// The repository never lets these escape its public operations; they are
/// logged and turned into "not found" or a skipped file.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The content type directory does not exist.
    #[error("content directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),
    /// The requested file does not exist.
    #[error("content file does not exist: {}", .0.display())]
    NotFound(PathBuf),
    /// Any other I/O failure, including non UTF-8 file contents.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File or directory being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A content type name that is not one of the known verticals.
    #[error("unknown content type: {0}")]
    UnknownContentType(String),
}

impl ContentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound(path);
        }
        Self::Io { path, source }
    }

    /// Whether the error only means "nothing there".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MissingDirectory(_) | Self::NotFound(_))
    }
}
