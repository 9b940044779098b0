//! Error types for board engine operations

use thiserror::Error;

use crate::record::RecordId;

/// Errors raised by a data source while fetching a page.
///
/// Fetch failures never corrupt partition state: items and cursor are left
/// unchanged and the operation is safely retryable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Data source unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Fetch rejected for partition {partition}: {reason}")]
    Rejected { partition: String, reason: String },

    #[error("Malformed page response: {reason}")]
    MalformedPage { reason: String },
}

/// Errors raised by a mutation service while committing.
///
/// A failed commit rolls the record back to its pre-mutation snapshot,
/// including partition placement if the mutation moved it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommitError {
    #[error("Commit rejected ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("Connection lost: {reason}")]
    ConnectionLost { reason: String },

    #[error("Record {id} no longer exists upstream")]
    Gone { id: RecordId },
}

/// Master error type for board engine operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Record not found: {id}")]
    RecordNotFound { id: RecordId },

    #[error("Unknown partition: {key}")]
    UnknownPartition { key: String },

    #[error("Engine misconfigured: {reason}")]
    Misconfigured { reason: String },

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Commit error: {0}")]
    Commit(#[from] CommitError),
}

/// Result type alias for board engine operations.
pub type BoardResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_fetch_error_display_rejected() {
        let err = FetchError::Rejected {
            partition: "Warm".to_string(),
            reason: "index rebuilding".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Fetch rejected"));
        assert!(msg.contains("Warm"));
        assert!(msg.contains("index rebuilding"));
    }

    #[test]
    fn test_commit_error_display_rejected() {
        let err = CommitError::Rejected {
            code: "validation".to_string(),
            message: "stage transition not allowed".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("validation"));
        assert!(msg.contains("stage transition not allowed"));
    }

    #[test]
    fn test_engine_error_display_record_not_found() {
        let err = EngineError::RecordNotFound {
            id: RecordId::from_uuid(Uuid::nil()),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Record not found"));
        assert!(msg.contains("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_engine_error_from_variants() {
        let fetch = EngineError::from(FetchError::Unavailable {
            reason: "timeout".to_string(),
        });
        assert!(matches!(fetch, EngineError::Fetch(_)));

        let commit = EngineError::from(CommitError::ConnectionLost {
            reason: "reset by peer".to_string(),
        });
        assert!(matches!(commit, EngineError::Commit(_)));
    }
}
