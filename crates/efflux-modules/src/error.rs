//! Error types for module operations.

use efflux_core::GraphError;

/// Errors that can occur while building or rewiring voice modules.
///
/// Graph errors from module operations are caller invariant violations
/// (a destroyed node, a restarted oscillator). They are surfaced as-is and
/// never retried.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// A graph operation failed.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// An automation target name did not match any target.
    #[error("unknown automation target: {0}")]
    UnknownTarget(String),
}

/// Result type for module operations.
pub type Result<T> = std::result::Result<T, ModuleError>;
