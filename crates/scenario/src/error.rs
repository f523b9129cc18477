use crate::ast::Span;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a scenario.
///
/// Every error is surfaced at load time; a [`crate::SimulationConfig`]
/// that made it out of the loader is always valid.
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("{span}: unrecognized input {found:?}")]
    Lex { span: Span, found: String },

    #[error("{span}: {message}")]
    Parse { span: Span, message: String },

    #[error("{span}: unknown controller variant `{name}`")]
    UnknownControllerVariant { name: String, span: Span },

    #[error("invalid value for `{option}`: {message}")]
    InvalidParameter { option: String, message: String },

    #[error("{span}: unknown option `{name}`")]
    UnknownOption { name: String, span: Span },

    #[error("{span}: option `{name}` is assigned more than once")]
    DuplicateOption { name: String, span: Span },

    #[error("required option `{0}` is not set")]
    MissingOption(&'static str),

    #[error("{span}: `{name}` is not defined")]
    UndefinedReference { name: String, span: Span },

    #[error("{span}: `{constructor}` takes {expected} argument(s), got {found}")]
    Arity {
        constructor: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("{span}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        span: Span,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON scenario: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScenarioError {
    pub(crate) fn invalid(option: impl Into<String>, message: impl Into<String>) -> Self {
        ScenarioError::InvalidParameter {
            option: option.into(),
            message: message.into(),
        }
    }
}

/// Convenience Result type for scenario loading
pub type Result<T> = std::result::Result<T, ScenarioError>;
