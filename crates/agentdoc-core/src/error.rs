//! Error types for scanning operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during a folder scan.
///
/// Every variant is fatal to the scan that produced it; no partial
/// manifest accompanies an error.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied while enumerating a directory.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path did not exist at read time.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Any other I/O failure during traversal.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The scan was cancelled before it completed.
    #[error("Scan interrupted")]
    Interrupted,

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    ///
    /// Permission and not-found failures are lifted into their own variants.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// The path the error refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::NotADirectory { path } => Some(path),
            Self::Interrupted | Self::InvalidConfig { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_io_permission() {
        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ScanError::PermissionDenied { .. }));
    }

    #[test]
    fn test_scan_error_io_not_found() {
        let err = ScanError::io(
            "/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ScanError::NotFound { .. }));
        assert_eq!(err.path(), Some(std::path::Path::new("/missing")));
    }

    #[test]
    fn test_scan_error_io_other() {
        let err = ScanError::io("/dev/odd", std::io::Error::other("boom"));
        assert!(matches!(err, ScanError::Io { .. }));
        assert!(err.to_string().contains("boom"));
        assert!(ScanError::Interrupted.path().is_none());
    }
}
