//! Error types for network construction, query parsing and inference.
//!
//! A missing row in the direct CPT lookup is not an error: `Network::query`
//! returns `Ok(None)` so callers can fall back to full inference.

use thiserror::Error;

/// Raised while registering a node. The node being built is retracted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("variable '{0}' is already registered")]
    DuplicateVariable(String),

    #[error("value '{value}' is declared twice for variable '{variable}'")]
    DuplicateValue { variable: String, value: String },

    #[error("variable '{0}' has an empty domain")]
    EmptyDomain(String),

    #[error("parent '{parent}' of '{variable}' is not registered")]
    UnknownParent { variable: String, parent: String },

    #[error("parent '{parent}' is listed twice for '{variable}'")]
    DuplicateParent { variable: String, parent: String },

    #[error("malformed probability row '{row}' for '{variable}': {reason}")]
    MalformedRow {
        variable: String,
        row: String,
        reason: String,
    },

    #[error("the sampler needs at least one iteration")]
    InvalidIterations,
}

/// Raised while parsing a query or an observation. Network state is unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("malformed query '{query}': {reason}")]
    MalformedQuery { query: String, reason: String },

    #[error("no such variable <{0}>")]
    UnknownVariable(String),

    #[error("variable '{variable}' does not contain the value '{value}'")]
    UnknownValue { variable: String, value: String },

    #[error("target variable '{0}' also appears in the evidence")]
    TargetInEvidence(String),

    #[error("evidence binds '{0}' to more than one value")]
    ConflictingEvidence(String),
}

/// A structural assumption of the inference algorithms does not hold.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("probabilities of '{variable}' given [{assignment}] sum to {total}, not 1")]
    UnnormalizedCpt {
        variable: String,
        assignment: String,
        total: f64,
    },

    #[error("'{variable}' is eliminated after its parent '{parent}'")]
    NotTopological { variable: String, parent: String },

    #[error("elimination order must name every variable exactly once")]
    IncompleteOrder,

    #[error("factor does not contain the variable <{0}> to eliminate")]
    MissingDimension(String),

    #[error("the evidence has probability zero")]
    ImpossibleEvidence,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
