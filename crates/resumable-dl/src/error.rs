//! Transfer error kinds and cause reporting

use serde::Serialize;
use std::error::Error as StdError;

pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Errors produced while transferring an object.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("network error: {context}")]
    Network {
        context: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("remote object not found: {0}")]
    NotFound(String),

    #[error("disk error: {0}")]
    Disk(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("transfer cancelled")]
    Cancelled,
}

/// Discriminant of [`TransferError`], cheap to copy into events and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    NotFound,
    Disk,
    Config,
    Cancelled,
}

impl TransferError {
    /// Network failure caused by an underlying error.
    pub fn network(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        TransferError::Network {
            context: context.into(),
            source: Some(source.into()),
        }
    }

    /// Network failure with no underlying error (bad status, short body).
    pub fn network_msg(context: impl Into<String>) -> Self {
        TransferError::Network {
            context: context.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::Network { .. } => ErrorKind::Network,
            TransferError::NotFound(_) => ErrorKind::NotFound,
            TransferError::Disk(_) => ErrorKind::Disk,
            TransferError::Config(_) => ErrorKind::Config,
            TransferError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether an outer retry could change the outcome.
    ///
    /// Configuration problems and operator shutdown are final; every other
    /// kind is retried uniformly.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransferError::Config(_) | TransferError::Cancelled)
    }
}

/// Message of the innermost error in the `source()` chain.
pub fn deepest_cause(err: &(dyn StdError + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
