use serde::Serialize;
use thiserror::Error;

/// Error codes for hosts that surface history failures as structured responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    LedgerUnavailable,
    LedgerCorrupt,
    LedgerInconsistent,
    InternalError,
}

/// Failure reported by a [`Ledger`](crate::ledger::Ledger) implementation
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt ledger data: {0}")]
    Corrupt(String),

    #[error("Inconsistent ledger state: {0}")]
    Inconsistent(String),

    #[error("Internal ledger error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::Inconsistent(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Unavailable(_) => ErrorCode::LedgerUnavailable,
            Self::Corrupt(_) => ErrorCode::LedgerCorrupt,
            Self::Inconsistent(_) => ErrorCode::LedgerInconsistent,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl From<anyhow::Error> for LedgerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Error returned by history rebuilds and the background refresher
#[derive(Debug, Error)]
pub enum HistoryError {
    /// A ledger query failed; the previous snapshot is still the visible one.
    #[error("Ledger query `{query}` failed: {source}")]
    LedgerQuery {
        query: &'static str,
        #[source]
        source: LedgerError,
    },

    #[error("Refresh task failed: {0}")]
    RefreshTask(String),
}

impl HistoryError {
    pub fn ledger_query(query: &'static str, source: LedgerError) -> Self {
        Self::LedgerQuery { query, source }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::LedgerQuery { source, .. } => source.error_code(),
            Self::RefreshTask(_) => ErrorCode::InternalError,
        }
    }

    /// Whether retrying the same rebuild later can reasonably succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LedgerQuery {
                source: LedgerError::Unavailable(_),
                ..
            } | Self::RefreshTask(_)
        )
    }
}
