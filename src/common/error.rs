//! Error types for the caseflow engine
//!
//! The taxonomy distinguishes expected comparison mismatches (which mark a
//! case Failed and are the only retryable condition) from unexpected
//! execution faults (which escalate the case to Errored).

use std::io;

use serde_json::Value;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the caseflow engine
#[derive(Error, Debug)]
pub enum Error {
    // === Suite Schema Errors ===
    #[error("Invalid test suite: {0}")]
    Schema(String),

    // === Registry Errors ===
    #[error("Function '{0}' is not registered. Use 'caseflow functions' to list available names")]
    UnregisteredFunction(String),

    // === Variable Resolution Errors ===
    #[error("Variable '{0}' is not bound in the case namespace")]
    UnboundVariable(String),

    #[error("Path '{path}' did not resolve: {reason}")]
    Extraction { path: String, reason: String },

    // === Assertion Errors ===
    #[error("Unknown assertion type '{0}'")]
    UnknownAssertionType(String),

    #[error("Assertion '{assertion}' failed: expected {expected}, got {actual}")]
    AssertionFailed {
        assertion: String,
        expected: Value,
        actual: Value,
    },

    // === Function Faults ===
    #[error("Function '{function}' failed: {message}")]
    FunctionFault { function: String, message: String },

    // === Suite Outcome ===
    #[error("{failed} of {total} test case(s) did not pass")]
    SuiteFailed { failed: usize, total: usize },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === HTTP Errors ===
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether the retry controller may consume an attempt on this error.
    ///
    /// Only assertion mismatches are retryable; everything else propagates
    /// immediately so a typo in a suite never retries against a dispatch
    /// error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::AssertionFailed { .. })
    }

    /// Whether this error marks the case `Failed` rather than `Errored`.
    ///
    /// Step failures are the expected ways a declared step can go wrong:
    /// mismatched assertions, unknown names, dead extraction paths. Anything
    /// else is an unexpected fault and escalates the case to `Errored`.
    pub fn is_step_failure(&self) -> bool {
        matches!(
            self,
            Error::AssertionFailed { .. }
                | Error::UnregisteredFunction(_)
                | Error::UnboundVariable(_)
                | Error::UnknownAssertionType(_)
                | Error::Extraction { .. }
        )
    }

    /// Create an extraction error for a path query
    pub fn extraction(path: &str, reason: impl Into<String>) -> Self {
        Self::Extraction {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a function fault error
    pub fn function_fault(function: &str, message: impl Into<String>) -> Self {
        Self::FunctionFault {
            function: function.to_string(),
            message: message.into(),
        }
    }
}
