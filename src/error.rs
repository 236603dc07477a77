//! Error types for the package stager
//!
//! Every failure is fatal to a run; the variants carry enough context
//! (path, marker, manifest line) to tell the user what to fix.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the package stager
#[derive(Error, Debug)]
pub enum StagerError {
    /// A declaration marker is absent from the declarations file
    #[error("Missing metadata: no value for {marker} in {path}")]
    MissingMetadata { marker: String, path: PathBuf },

    /// A manifest source is neither a regular file nor a directory
    #[error("Could not copy file or directory \"{path}\" (manifest line {line})")]
    MissingSource { path: PathBuf, line: usize },

    /// A manifest line that cannot be split into source and destination
    #[error("Malformed manifest entry at {path}:{line}: {content:?}")]
    MalformedEntry {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// The control template references a key that is never substituted
    #[error("Unknown placeholder {placeholder} in control template {path}")]
    UnknownPlaceholder { placeholder: String, path: PathBuf },

    /// The external packaging tool failed
    #[error("Packaging failed for {artifact}: {message}")]
    Packaging {
        artifact: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// File system operation errors
    #[error("File system error: {operation} failed on {path}")]
    FileSystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Process execution errors
    #[error("Process error: {command} failed")]
    Process {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl StagerError {
    /// Create a new missing metadata error
    pub fn missing_metadata<P: Into<PathBuf>>(marker: impl Into<String>, path: P) -> Self {
        Self::MissingMetadata {
            marker: marker.into(),
            path: path.into(),
        }
    }

    /// Create a new missing source error
    pub fn missing_source<P: Into<PathBuf>>(path: P, line: usize) -> Self {
        Self::MissingSource {
            path: path.into(),
            line,
        }
    }

    /// Create a new malformed manifest entry error
    pub fn malformed_entry<P: Into<PathBuf>>(
        path: P,
        line: usize,
        content: impl Into<String>,
    ) -> Self {
        Self::MalformedEntry {
            path: path.into(),
            line,
            content: content.into(),
        }
    }

    /// Create a new unknown placeholder error
    pub fn unknown_placeholder<P: Into<PathBuf>>(placeholder: impl Into<String>, path: P) -> Self {
        Self::UnknownPlaceholder {
            placeholder: placeholder.into(),
            path: path.into(),
        }
    }

    /// Create a new packaging error wrapping the underlying failure
    pub fn packaging<P: Into<PathBuf>>(
        artifact: P,
        message: impl Into<String>,
        source: Option<StagerError>,
    ) -> Self {
        Self::Packaging {
            artifact: artifact.into(),
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Create a new file system error
    pub fn file_system<P: Into<PathBuf>>(
        operation: impl Into<String>,
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a new process error
    pub fn process(
        command: impl Into<String>,
        exit_code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Process {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, StagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_message_names_path() {
        let err = StagerError::missing_source("/proj/bin/app", 3);
        let message = err.to_string();
        assert!(message.contains("/proj/bin/app"));
        assert!(message.contains("line 3"));
    }

    #[test]
    fn test_packaging_error_keeps_source() {
        let inner = StagerError::process("dpkg-deb --build", Some(2), "");
        let err = StagerError::packaging("out/evi_0.0.1_amd64.deb", "exit code 2", Some(inner));
        assert!(std::error::Error::source(&err).is_some());
    }
}
