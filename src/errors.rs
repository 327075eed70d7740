use serde_json::Value;
use thiserror::Error;

use crate::store::{FieldFailure, RecordFailure};

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents a failure to reach the record store at all.
    #[error("could not reach the record store: {message}")]
    StoreUnreachable { message: String },

    /// Represents a transport-level failure while talking to the record
    /// store.
    #[error("record store request failed")]
    Transport { source: reqwest::Error },

    /// Represents a failure reported by the record store itself.
    #[error("record store rejected the request: {message}")]
    StoreRejected { message: String },

    /// Represents a store response this client could not decode.
    #[error("malformed record store response")]
    MalformedStoreResponse { source: serde_json::Error },

    /// Represents a batch write the store applied only partially. The
    /// outcomes of the records that did succeed travel alongside the
    /// failures so the caller still sees them.
    #[error("store failed to apply {} of {} record(s)", .failed.len(), .attempted)]
    RecordsFailed {
        attempted: usize,
        succeeded: Vec<Value>,
        failed: Vec<RecordFailure>,
    },

    /// Represents required fields submitted without a value.
    #[error("missing required fields: {}", .fields.join(", "))]
    FieldsMissing { fields: Vec<&'static str> },
}

/// Renders field-level failures on one line for logging.
pub fn describe_field_failures(failures: &[FieldFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{}: {}", failure.field, failure.message))
        .collect::<Vec<_>>()
        .join("; ")
}
