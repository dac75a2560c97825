//! Error types for the charger engine.

use crate::ExternalId;
use thiserror::Error;

/// All possible errors from the charger engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Caller input errors
    #[error("cannot use before and after in the same query")]
    ConflictingCursors,

    #[error("cannot use first and last in the same query")]
    ConflictingBounds,

    #[error("malformed cursor: {0}")]
    MalformedCursor(String),

    // Collaborator failures
    #[error("remote fetch failed: {0}")]
    RemoteFetchFailed(String),

    #[error("store failure: {0}")]
    Store(String),

    // Programming errors
    #[error("comparison between mismatched locations: nid {persisted} vs nid {remote}")]
    ComparisonMismatch {
        persisted: ExternalId,
        remote: ExternalId,
    },
}

impl Error {
    /// Whether the error was caused by caller-supplied arguments.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::ConflictingCursors | Error::ConflictingBounds | Error::MalformedCursor(_)
        )
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::ConflictingCursors;
        assert_eq!(
            err.to_string(),
            "cannot use before and after in the same query"
        );

        let err = Error::MalformedCursor("!!".into());
        assert_eq!(err.to_string(), "malformed cursor: !!");

        let err = Error::ComparisonMismatch {
            persisted: 1,
            remote: 2,
        };
        assert_eq!(
            err.to_string(),
            "comparison between mismatched locations: nid 1 vs nid 2"
        );
    }

    #[test]
    fn caller_errors() {
        assert!(Error::ConflictingBounds.is_caller_error());
        assert!(Error::MalformedCursor(String::new()).is_caller_error());
        assert!(!Error::Store("down".into()).is_caller_error());
        assert!(!Error::RemoteFetchFailed("timeout".into()).is_caller_error());
    }
}
