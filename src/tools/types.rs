//! Tool invocation and outcome types.

use serde_json::Value;

/// A tool call as received from the voice service.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Correlation id to echo back in the response frame.
    pub id: String,
    /// Tool name, e.g. `generate_image`.
    pub name: String,
    /// JSON document encoded as a string.
    pub parameters: String,
}

/// Machine-readable failure category reported back to the voice service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCode {
    ParseError,
    MissingParam,
    MissingParams,
    ToolNotFound,
    GenerationFailed,
    QueryFailed,
    UnexpectedError,
    ConnectionFailed,
}

impl FailureCode {
    /// Wire spelling of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParseError => "PARSE_ERROR",
            Self::MissingParam => "MISSING_PARAM",
            Self::MissingParams => "MISSING_PARAMS",
            Self::ToolNotFound => "TOOL_NOT_FOUND",
            Self::GenerationFailed => "GENERATION_FAILED",
            Self::QueryFailed => "QUERY_FAILED",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
            Self::ConnectionFailed => "CONNECTION_FAILED",
        }
    }
}

/// How seriously a failure should be treated downstream.
///
/// Recoverable input problems the model can correct are `Warn`; everything
/// else is `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

impl Severity {
    /// Wire spelling of the level.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// The result of dispatching one tool call. Dispatch itself never fails;
/// every problem becomes a `Failure` outcome.
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    /// The tool ran and produced a result.
    Success {
        /// Structured result delivered to the voice service.
        payload: Value,
        /// One-line summary of what happened.
        message: String,
    },
    /// The tool could not run or the backend reported a failure.
    Failure {
        code: FailureCode,
        level: Severity,
        /// Never empty; shown to the model so it can react.
        message: String,
    },
}

impl ToolOutcome {
    pub fn failure(code: FailureCode, level: Severity, message: impl Into<String>) -> Self {
        Self::Failure {
            code,
            level,
            message: message.into(),
        }
    }

    /// Whether the tool call produced a usable result.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
