//! Error types for roulette-core

use std::fmt;

use thiserror::Error;

use crate::types::FilterKey;

/// Remote operations the engine performs through its collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientOperation {
    FetchPool,
    FetchHistory,
    CommitSelection,
    RequestReset,
}

impl ClientOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchPool => "fetch_pool",
            Self::FetchHistory => "fetch_history",
            Self::CommitSelection => "commit_selection",
            Self::RequestReset => "request_reset",
        }
    }
}

impl fmt::Display for ClientOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors for engine operations
#[derive(Error, Debug)]
pub enum SelectionError {
    /// Nothing left to draw under the filter. Callers should start a reset.
    #[error("No eligible participants left under filter '{filter}'")]
    EmptyPool { filter: FilterKey },

    #[error("A draw is already awaiting confirmation")]
    ConcurrentDraw,

    /// A refresh was deferred behind a decision. Flush it before drawing again.
    #[error("A deferred refresh must run before the next draw")]
    RefreshPending,

    #[error("Remote {operation} failed: {source}")]
    Collaborator {
        operation: ClientOperation,
        #[source]
        source: ClientError,
    },

    #[error("Unknown filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    #[error("Preference error: {0}")]
    Preferences(#[from] PreferenceError),
}

impl SelectionError {
    pub(crate) fn collaborator(operation: ClientOperation, source: ClientError) -> Self {
        Self::Collaborator { operation, source }
    }

    /// The remote operation that failed, if this is a collaborator error
    pub fn operation(&self) -> Option<ClientOperation> {
        match self {
            Self::Collaborator { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::EmptyPool { .. })
    }
}

/// Failures reported by a `ReconciliationClient` implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Errors reading or writing the persisted filter preference
#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pool_displays_filter() {
        let error = SelectionError::EmptyPool {
            filter: FilterKey::category("web"),
        };
        assert!(error.to_string().contains("'web'"));
        assert!(error.is_exhausted());
    }

    #[test]
    fn collaborator_error_names_operation() {
        let error = SelectionError::collaborator(
            ClientOperation::CommitSelection,
            ClientError::Transport("connection refused".to_string()),
        );
        assert_eq!(error.operation(), Some(ClientOperation::CommitSelection));
        assert!(error.to_string().contains("commit_selection"));
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn rejected_displays_status() {
        let error = ClientError::Rejected {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert!(error.to_string().contains("503"));
    }

    #[test]
    fn preference_error_converts_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: SelectionError = PreferenceError::from(io).into();
        assert!(matches!(error, SelectionError::Preferences(_)));
    }
}
