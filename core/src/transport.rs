//! The seam between commands and whatever talks to the server.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::request::Request;

/// Field-level error reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub messages: Vec<String>,
}

/// Request failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The server rejected the request.
    #[error("{message}{}", render_field_errors(.field_errors))]
    Api {
        message: String,
        field_errors: Vec<FieldError>,
    },
}

fn render_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("\n  {}: {}", e.field, e.messages.join(", ")))
        .collect()
}

/// Issues requests and returns the raw response body.
///
/// Each call is a single attempt; retries are the implementor's business.
pub trait Transport {
    fn issue(&self, request: &Request) -> Result<Value, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn issue(&self, request: &Request) -> Result<Value, TransportError> {
        (**self).issue(request)
    }
}
