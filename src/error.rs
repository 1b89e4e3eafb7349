//! Error types for trigger selection

use thiserror::Error;

/// Error raised while compiling a condition string into an expression tree.
///
/// Parse errors are fatal to engine construction: no event is processed
/// if any configured condition fails to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The condition text was empty after trimming
    #[error("empty trigger condition")]
    EmptyExpression,

    /// The condition text does not conform to the grammar
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
}

impl ParseError {
    /// Create a syntax error with source location
    pub fn syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Violation of the event binding protocol.
///
/// These indicate caller bugs, not data problems. A correct caller issues
/// `begin_event` before binding a new event and never sees this error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A different event was bound without an intervening `begin_event`
    #[error("cache already bound to event {bound}, refusing to bind event {requested}")]
    WrongEvent { bound: u64, requested: u64 },
}

/// Error raised while evaluating a compiled expression against one event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A pattern matched no path in the current menu (strict policy only)
    #[error("no trigger path matches pattern '{0}' in the current menu")]
    UnknownPath(String),

    /// A resolved index fell outside the event's result vector.
    /// Indices only come from the table of the bound menu, so this means
    /// a menu change went undetected; treat it as a defect.
    #[error("path index {index} out of range for result vector of size {size}")]
    IndexOutOfRange { index: usize, size: usize },
}

/// Error returned by a full engine decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecideError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Error raised while loading or compiling a filter configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The configuration asked for an overall prescale of zero
    #[error("overall prescale factor must be at least 1")]
    InvalidOverallPrescale,
}
