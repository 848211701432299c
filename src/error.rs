//! Error types for the kinematic-factors library.
//!
//! Recoverable conditions (invalid construction parameters, unknown graph
//! handles, malformed diagnostic streams) travel through [`KinematicsResult`].
//! The fatal precondition classes -- evaluating a term with no bound
//! configuration, or a residual coming out non-finite -- are graph-assembly
//! programming errors and panic with diagnostic context instead.

use thiserror::Error;

/// Result type used throughout the kinematic-factors library.
pub type KinematicsResult<T> = Result<T, KinematicsError>;

/// Main error type for the kinematic-factors library.
#[derive(Debug, Clone, Error)]
pub enum KinematicsError {
    /// Invalid input parameters (e.g. non-positive turning radius)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Graph bookkeeping errors (unknown ids, dangling references)
    #[error("Graph error: {0}")]
    Graph(String),

    /// Stream read/write errors for the diagnostic hooks
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for KinematicsError {
    fn from(err: std::io::Error) -> Self {
        KinematicsError::Io(err.to_string())
    }
}

impl From<std::num::ParseFloatError> for KinematicsError {
    fn from(err: std::num::ParseFloatError) -> Self {
        KinematicsError::Io(format!("Failed to parse float: {err}"))
    }
}
