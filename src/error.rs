//! Errors surfaced by the transport layer.
//!
//! `Display` renders only the human-readable message so callers can show
//! `format!("Error: {}", err)` directly.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("{0}")]
    Transport(String),

    /// A 2xx response whose body was not the JSON we expected.
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl HttpError {
    /// Build the error for a non-2xx response.
    ///
    /// Prefers the `detail` field of a JSON body, then the raw body text,
    /// then a generic `HTTP <code>` message.
    pub fn from_response(status: u16, body: &str) -> Self {
        HttpError::Status {
            status,
            message: error_message(status, body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(detail) if is_present(detail) => match detail {
                Value::String(text) => text.clone(),
                // FastAPI validation errors put an array here
                other => other.to_string(),
            },
            _ => format!("HTTP {}", status),
        },
        Err(_) => {
            let text = body.trim();
            if text.is_empty() {
                format!("HTTP {}", status)
            } else {
                text.to_string()
            }
        }
    }
}

/// A `detail` worth showing: not null, false, zero or blank.
fn is_present(detail: &Value) -> bool {
    match detail {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
