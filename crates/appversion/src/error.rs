//! Error types for application version provisioning.
//!
//! Every failure during reconciliation is terminal for the current attempt.
//! Errors are categorized so the caller can report them with useful advice;
//! nothing here retries.

use std::path::PathBuf;
use thiserror::Error;

/// Categories of provisioning errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The local bundle could not be read
    Io,
    /// Uploading the bundle to the artifact store failed
    Storage,
    /// Looking up or creating the version in the registry failed
    Registry,
    /// The desired configuration was rejected at the boundary
    Config,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Io => "Bundle could not be read",
            Self::Storage => "Bundle upload failed",
            Self::Registry => "Version registry request failed",
            Self::Config => "Invalid resource configuration",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Io => "Check that application_version_filename points to a readable file",
            Self::Storage => "Check the bucket name and that the store is reachable, then apply again",
            Self::Registry => {
                "Check that the application exists in the registry, then apply again \
                 (an uploaded bundle is overwritten on retry)"
            }
            Self::Config => "Fix the resource block in the project file",
        }
    }
}

/// Errors that can occur while provisioning an application version.
#[derive(Debug, Error)]
pub enum Error {
    /// The bundle file could not be opened or read
    #[error("failed to read bundle {}", path.display())]
    Io {
        /// Path of the bundle
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Upload to the artifact store failed
    #[error("failed to upload s3://{bucket}/{key}: {message}")]
    Storage {
        /// Target bucket
        bucket: String,
        /// Target object key
        key: String,
        /// Details from the store
        message: String,
    },

    /// Lookup or creation in the version registry failed
    #[error("registry error for {application}/{label}: {message}")]
    Registry {
        /// Application name
        application: String,
        /// Version label
        label: String,
        /// Details from the registry
        message: String,
    },

    /// A configuration field failed boundary validation
    #[error("invalid {field}: {message}")]
    InvalidConfig {
        /// Engine-visible field name
        field: &'static str,
        /// What is wrong with it
        message: String,
    },
}

impl Error {
    /// Get the error category for reporting.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Io { .. } => ErrorCategory::Io,
            Error::Storage { .. } => ErrorCategory::Storage,
            Error::Registry { .. } => ErrorCategory::Registry,
            Error::InvalidConfig { .. } => ErrorCategory::Config,
        }
    }

    /// Build a storage error.
    pub fn storage(bucket: &str, key: &str, message: impl Into<String>) -> Self {
        Error::Storage {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Build a registry error.
    pub fn registry(application: &str, label: &str, message: impl Into<String>) -> Self {
        Error::Registry {
            application: application.to_string(),
            label: label.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for provisioning operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let err = Error::storage("builds", "shop/x.zip", "access denied");
        assert_eq!(err.category(), ErrorCategory::Storage);

        let err = Error::registry("shop", "x", "application not found");
        assert_eq!(err.category(), ErrorCategory::Registry);

        let err = Error::Io {
            path: PathBuf::from("missing.zip"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.category(), ErrorCategory::Io);
    }

    #[test]
    fn test_error_display() {
        let err = Error::storage("builds", "shop/bundles/a.zip", "timeout");
        assert_eq!(
            err.to_string(),
            "failed to upload s3://builds/shop/bundles/a.zip: timeout"
        );

        let err = Error::InvalidConfig {
            field: "application_name",
            message: "must not be empty".to_string(),
        };
        assert_eq!(err.to_string(), "invalid application_name: must not be empty");
    }

    #[test]
    fn test_io_error_names_cause_once() {
        let err = anyhow::Error::new(Error::Io {
            path: PathBuf::from("missing.zip"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
        assert_eq!(err.to_string(), "failed to read bundle missing.zip");
        assert_eq!(
            format!("{err:#}"),
            "failed to read bundle missing.zip: no such file"
        );
    }
}
