//! A2UI Error Types
//!
//! Errors are grouped by the layer that raises them. The processor converts
//! everything it sees into [`A2uiError`] before returning to the caller.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::path::PathError;

/// Failures of the protocol message decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("message is empty")]
    Empty,

    #[error("message is {len} bytes, limit is {max}")]
    TooLarge { len: usize, max: usize },

    #[error("malformed JSON: {0}")]
    Json(String),

    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("message carries none of createSurface, updateComponents, updateDataModel, deleteSurface")]
    UnknownMessage,

    #[error("message carries more than one operation: {}", .0.join(", "))]
    AmbiguousMessage(Vec<&'static str>),

    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: &'static str, reason: String },
}

/// Failures of a data model write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataModelError {
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("data model is at its limit of {max} entries")]
    CapacityExceeded { max: usize },

    #[error("root replace requires an object value")]
    RootNotObject,

    #[error("index out of bounds at '{path}'")]
    IndexOutOfBounds { path: String },
}

/// What kind of identifier failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Surface,
    Component,
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdKind::Surface => f.write_str("surface"),
            IdKind::Component => f.write_str("component"),
        }
    }
}

/// Error taxonomy surfaced by the message processor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum A2uiError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("surface limit of {max} reached, cannot create '{surface_id}'")]
    SurfaceCapExceeded { surface_id: String, max: usize },

    #[error(
        "component limit of {max} exceeded on surface '{surface_id}' ({existing} existing + {incoming} new)"
    )]
    ComponentCapExceeded {
        surface_id: String,
        existing: usize,
        incoming: usize,
        max: usize,
    },

    #[error("invalid {kind} id '{id}'")]
    InvalidId { kind: IdKind, id: String },

    #[error("surface '{0}' not found")]
    SurfaceNotFound(String),

    #[error("data model update on '{surface_id}' failed: {source}")]
    DataModel {
        surface_id: String,
        #[source]
        source: DataModelError,
    },

    #[error("restore failed: {0}")]
    Restore(Box<A2uiError>),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl A2uiError {
    /// Surface the error is attributed to, when there is one.
    pub fn surface_id(&self) -> Option<&str> {
        match self {
            A2uiError::SurfaceCapExceeded { surface_id, .. }
            | A2uiError::ComponentCapExceeded { surface_id, .. }
            | A2uiError::DataModel { surface_id, .. } => Some(surface_id),
            A2uiError::InvalidId {
                kind: IdKind::Surface,
                id,
            } => Some(id),
            A2uiError::SurfaceNotFound(id) => Some(id),
            A2uiError::Restore(inner) => inner.surface_id(),
            _ => None,
        }
    }
}

/// Diagnostic record kept for the most recent failed message.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    pub error: A2uiError,
    pub surface_id: Option<String>,
    pub at: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(error: A2uiError) -> Self {
        let surface_id = error.surface_id().map(str::to_string);
        ErrorRecord {
            error,
            surface_id,
            at: Utc::now(),
        }
    }
}
