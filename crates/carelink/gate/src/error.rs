//! Error types for the route authorization gate.

use thiserror::Error;

/// Errors from building a route policy. Authorization itself never
/// fails — it decides.
#[derive(Debug, Error)]
pub enum GateError {
    /// A route pattern did not compile.
    #[error("invalid route pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;
