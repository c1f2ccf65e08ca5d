//! Error types for network construction and inference.

use thiserror::Error;

/// Result alias used throughout the engine.
pub type BayesResult<T> = std::result::Result<T, BayesError>;

/// Errors that can occur while building, baking, or querying a network.
///
/// This enum is marked `#[non_exhaustive]` so new variants can be added
/// without breaking callers that match on it.
///
/// Every public API returns `Result<T, BayesError>`; library code does not
/// panic on bad input. A failed operation leaves the network untouched.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BayesError {
    /// Malformed or incomplete probability table, out-of-domain value, or
    /// evidence referencing an unknown variable or value.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Variable name or edge registered twice.
    #[error("duplicate error: {0}")]
    DuplicateError(String),

    /// Reference to a variable, edge, or table row that does not exist.
    #[error("lookup error: {0}")]
    LookupError(String),

    /// Structural mutation after bake, querying before bake, or a mismatch
    /// between a node's graph parents and its table parents.
    #[error("structure error: {0}")]
    StructureError(String),

    /// The graph is not acyclic.
    #[error("cycle error: {0}")]
    CycleError(String),

    /// Conditioning on evidence with zero probability.
    #[error("arithmetic error: {0}")]
    ArithmeticError(String),

    /// Query could not run within the configured limits.
    #[error("execution error: {0}")]
    Execution(String),

    /// Internal engine error (programmer error, not user error).
    #[error("internal error: {0}")]
    Internal(String),
}

impl BayesError {
    /// Short stable name of the error kind, used by the CLI and in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BayesError::ValidationError(_) => "ValidationError",
            BayesError::DuplicateError(_) => "DuplicateError",
            BayesError::LookupError(_) => "LookupError",
            BayesError::StructureError(_) => "StructureError",
            BayesError::CycleError(_) => "CycleError",
            BayesError::ArithmeticError(_) => "ArithmeticError",
            BayesError::Execution(_) => "Execution",
            BayesError::Internal(_) => "Internal",
        }
    }
}
