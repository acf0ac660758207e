//! The uniform response envelope.
//!
//! Success: `{"error": false, "content": {"data": [...], "meta": {...},
//! "filter": {...}}}`. Failure: `{"error": true, "errorCode": "...",
//! "errorMessage": "...", "errorBag": {...}}` with stable machine-readable
//! codes from the compile-error taxonomy.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CompileError;
use crate::pagination::PageMeta;

/// Content of a paginated list response.
#[derive(Debug, Clone, Serialize)]
pub struct ListContent<T: Serialize> {
    /// The page of records.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
    /// Echo of the applied filter map.
    pub filter: serde_json::Value,
}

/// Success envelope around arbitrary content.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessEnvelope<T: Serialize> {
    /// Always `false`.
    pub error: bool,
    /// The response payload.
    pub content: T,
}

impl<T: Serialize> SuccessEnvelope<T> {
    /// Wrap content in a success envelope.
    pub fn new(content: T) -> Self {
        Self {
            error: false,
            content,
        }
    }
}

/// Build the envelope for a paginated list result.
pub fn paginated<T: Serialize>(
    data: Vec<T>,
    meta: PageMeta,
    filter: serde_json::Value,
) -> SuccessEnvelope<ListContent<T>> {
    SuccessEnvelope::new(ListContent { data, meta, filter })
}

/// Failure envelope with a stable error code.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    /// Always `true`.
    pub error: bool,
    /// Machine-readable error code.
    #[serde(rename = "errorCode")]
    pub error_code: String,
    /// Human-readable message.
    #[serde(rename = "errorMessage")]
    pub error_message: String,
    /// Field-level messages, when the error carries them.
    #[serde(rename = "errorBag", skip_serializing_if = "Option::is_none")]
    pub error_bag: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorEnvelope {
    /// Build the envelope for a compile error.
    pub fn from_error(error: &CompileError) -> Self {
        Self {
            error: true,
            error_code: error.code().to_string(),
            error_message: error.to_string(),
            error_bag: error.bag().cloned(),
        }
    }
}

impl From<&CompileError> for ErrorEnvelope {
    fn from(error: &CompileError) -> Self {
        Self::from_error(error)
    }
}
