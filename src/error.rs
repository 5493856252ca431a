// src/error.rs
//! Error taxonomy for a single analysis call.
//!
//! Every variant ends up as a `status: "failed"` envelope at the dispatcher
//! boundary, except `BackendUnavailable`, which the ranking backend converts
//! into a Mock retry before it can reach the caller.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    /// Missing, mistyped or out-of-range request field.
    #[error("{0}")]
    Validation(String),

    /// A structured sub-field arrived as text and could not be parsed.
    #[error("Invalid JSON in '{field}' field")]
    Parse { field: &'static str, detail: String },

    /// A mode outside the closed set reached the dispatcher.
    #[error("Invalid analysis_type '{0}'")]
    UnsupportedMode(String),

    /// The learned-model backend cannot serve this call.
    #[error("model backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Anything else raised while analyzing.
    #[error("{0}")]
    Unexpected(String),
}

impl AnalysisError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Short label used for the `kind` metric dimension and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::Parse { .. } | Self::UnsupportedMode(_) => "validation",
            Self::BackendUnavailable(_) => "backend",
            Self::Unexpected(_) => "unexpected",
        }
    }
}
