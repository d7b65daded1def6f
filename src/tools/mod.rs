//! Tool-call dispatch.

pub mod router;
pub mod types;

pub use router::ToolRouter;
pub use types::{FailureCode, Severity, ToolInvocation, ToolOutcome};
