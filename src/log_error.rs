//! Errors returned by registry and dispatch operations.

use std::fmt;
use std::io;

use thiserror::Error;

/// Which registry map a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Stamp,
    OutputHandle,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::Stamp => write!(f, "Stamp"),
            NameKind::OutputHandle => write!(f, "Output Handle"),
        }
    }
}

/// Failures returned by registry and dispatch operations.
#[derive(Debug, Error)]
pub enum LogError {
    /// A stamp or output handle with this name is already registered.
    #[error("{kind} named \"{name}\" already exists")]
    DuplicateName { kind: NameKind, name: String },

    #[error("Stamp named \"{name}\" does not exist")]
    UnknownStamp { name: String },

    #[error("Stamp named \"{name}\" is not active")]
    InactiveStamp { name: String },

    /// A stamp routes to a handle that was never registered.
    #[error("Output Handle named \"{name}\" not found")]
    UnknownHandle { name: String },

    /// An activate/deactivate call named no stamps.
    #[error("No Stamp names provided")]
    EmptyBatch,

    /// An activate/deactivate batch named an unknown stamp; nothing was changed.
    #[error("Nothing done. Stamp named \"{name}\" does not exist")]
    PartialNameNotFound { name: String },

    #[error("Failed to write to Output Handle \"{handle}\"")]
    Write {
        handle: String,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_display() {
        let err = LogError::DuplicateName {
            kind: NameKind::Stamp,
            name: "audit".to_string(),
        };
        assert_eq!(err.to_string(), "Stamp named \"audit\" already exists");

        let err = LogError::DuplicateName {
            kind: NameKind::OutputHandle,
            name: "out".to_string(),
        };
        assert_eq!(err.to_string(), "Output Handle named \"out\" already exists");
    }

    #[test]
    fn test_stamp_errors_display() {
        let err = LogError::UnknownStamp {
            name: "S".to_string(),
        };
        assert_eq!(err.to_string(), "Stamp named \"S\" does not exist");

        let err = LogError::InactiveStamp {
            name: "S".to_string(),
        };
        assert_eq!(err.to_string(), "Stamp named \"S\" is not active");
    }

    #[test]
    fn test_batch_errors_display() {
        assert_eq!(LogError::EmptyBatch.to_string(), "No Stamp names provided");

        let err = LogError::PartialNameNotFound {
            name: "ghost".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Nothing done. Stamp named \"ghost\" does not exist"
        );
    }

    #[test]
    fn test_write_error_exposes_source() {
        let err = LogError::Write {
            handle: "file".to_string(),
            source: io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"),
        };
        let source = std::error::Error::source(&err).expect("source is kept");
        assert_eq!(source.to_string(), "pipe closed");
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", LogError::EmptyBatch), "EmptyBatch");
    }
}
