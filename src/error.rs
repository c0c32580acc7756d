//! Error types for ledger operations
//!
//! `StorageError` covers the persisted address registry, `LedgerError` is
//! what every engine component returns. `ErrorCode` is the stable integer
//! reported through the result envelope.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// Remote node or explorer call failed (network, auth, remote side)
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Address, channel or account absent
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown address type: {0}")]
    UnknownAddressType(String),

    /// A listing that must be nonempty came back empty
    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A reconciliation pass could not confirm a write
    #[error("Reconciliation failed at {step}: {reason}")]
    Reconciliation { step: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Timed out after {waited:?} waiting for store lock on {path}")]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("No such address: {0}")]
    AddressNotFound(String),

    #[error("Addresses is empty or could not be read")]
    EmptyOrUnavailable,
}

/// Integer codes carried by failed envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum ErrorCode {
    Success,
    Transport,
    Storage,
    NotFound,
    EmptyResult,
    Validation,
    Reconciliation,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        match self {
            ErrorCode::Success => 200,
            ErrorCode::Transport => 1001,
            ErrorCode::Storage => 1002,
            ErrorCode::NotFound => 1003,
            ErrorCode::EmptyResult => 1004,
            ErrorCode::Validation => 1005,
            ErrorCode::Reconciliation => 1006,
        }
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.as_i32()
    }
}

impl TryFrom<i32> for ErrorCode {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            200 => Ok(ErrorCode::Success),
            1001 => Ok(ErrorCode::Transport),
            1002 => Ok(ErrorCode::Storage),
            1003 => Ok(ErrorCode::NotFound),
            1004 => Ok(ErrorCode::EmptyResult),
            1005 => Ok(ErrorCode::Validation),
            1006 => Ok(ErrorCode::Reconciliation),
            other => Err(format!("unknown error code {}", other)),
        }
    }
}

impl LedgerError {
    /// Classify this error for the result envelope
    pub fn code(&self) -> ErrorCode {
        match self {
            LedgerError::Transport(_) => ErrorCode::Transport,
            LedgerError::Storage(StorageError::AddressNotFound(_)) => ErrorCode::NotFound,
            LedgerError::Storage(StorageError::EmptyOrUnavailable) => ErrorCode::EmptyResult,
            LedgerError::Storage(_) => ErrorCode::Storage,
            LedgerError::NotFound(_) | LedgerError::UnknownAddressType(_) => ErrorCode::NotFound,
            LedgerError::EmptyResult(_) => ErrorCode::EmptyResult,
            LedgerError::Validation(_) => ErrorCode::Validation,
            LedgerError::Reconciliation { .. } => ErrorCode::Reconciliation,
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn reconciliation(step: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Reconciliation {
            step: step.into(),
            reason: reason.into(),
        }
    }
}
