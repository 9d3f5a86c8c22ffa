use std::time::Duration;
use thiserror::Error;

/// Why the reasoning service produced no report.
///
/// Never shown to the user: the session substitutes a fallback report instead.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("reasoning service unreachable: {0}")]
    Network(String),

    #[error("reasoning service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("reasoning service returned status {status}")]
    Service { status: u16 },

    #[error("reasoning service sent an unreadable report: {0}")]
    Malformed(String),
}

impl Failure {
    /// Coarse class used in logs: `network` or `service`
    pub fn kind(&self) -> &'static str {
        match self {
            Failure::Network(_) | Failure::Timeout(_) => "network",
            Failure::Service { .. } | Failure::Malformed(_) => "service",
        }
    }
}

/// Errors from the durable history store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("history store is corrupted: {0}")]
    Corruption(String),

    #[error("history database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("history store IO error: {0}")]
    Io(#[from] std::io::Error),
}
