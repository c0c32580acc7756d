//! Uniform outcome of every public ledger operation
//!
//! Internally a tagged value; on the wire the familiar
//! `{"success", "error", "code", "data"}` object, with `data: null` on
//! failure.

use serde::ser::{Serialize, Serializer};

use crate::error::{ErrorCode, LedgerError};

#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(T),
    Failure { code: ErrorCode, message: String },
}

impl<T> Envelope<T> {
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Failure {
            code,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Envelope::Success(_) => ErrorCode::Success,
            Envelope::Failure { code, .. } => *code,
        }
    }

    /// Error message; empty on success
    pub fn error(&self) -> &str {
        match self {
            Envelope::Success(_) => "",
            Envelope::Failure { message, .. } => message,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Envelope::Success(data) => Some(data),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Envelope::Success(data) => Some(data),
            Envelope::Failure { .. } => None,
        }
    }

    /// Back to a `Result`, keeping the failure code and message
    pub fn into_result(self) -> Result<T, (ErrorCode, String)> {
        match self {
            Envelope::Success(data) => Ok(data),
            Envelope::Failure { code, message } => Err((code, message)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        match self {
            Envelope::Success(data) => Envelope::Success(f(data)),
            Envelope::Failure { code, message } => Envelope::Failure { code, message },
        }
    }
}

impl<T> From<Result<T, LedgerError>> for Envelope<T> {
    fn from(result: Result<T, LedgerError>) -> Self {
        match result {
            Ok(data) => Envelope::Success(data),
            Err(e) => {
                log::debug!("Operation failed ({:?}): {}", e.code(), e);
                Envelope::Failure {
                    code: e.code(),
                    message: e.to_string(),
                }
            }
        }
    }
}

#[derive(serde::Serialize)]
struct WireEnvelope<'a, T> {
    success: bool,
    error: &'a str,
    code: i32,
    data: Option<&'a T>,
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireEnvelope {
            success: self.is_success(),
            error: self.error(),
            code: self.code().as_i32(),
            data: self.data(),
        }
        .serialize(serializer)
    }
}

impl<T: Serialize> Envelope<T> {
    /// JSON form for callers outside the crate
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
