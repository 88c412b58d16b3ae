//! Error types returned by the optimizer.

use std::fmt;

use crate::problem::ZoneId;

/// Every failure the optimizer can report.
///
/// Configuration and validation errors are raised before the first
/// generation runs. Evaluation and decoding errors mean a route lost the
/// permutation property somewhere inside the search and abort the run.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizerError {
    /// Invalid population, generation or rate parameters.
    Configuration { reason: String },
    /// Malformed input: empty zone list, duplicate ids, unknown references.
    Validation { reason: String },
    /// A route handed to the evaluator is not a permutation of the scope.
    Evaluation { reason: String },
    /// A chromosome could not be decoded back into a route.
    Decoding { reason: String },
    /// Reading an input or writing a result failed.
    Io { path: String, reason: String },
    /// Input data could not be parsed.
    Parse { path: String, reason: String },
}

impl OptimizerError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        OptimizerError::Configuration {
            reason: reason.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        OptimizerError::Validation {
            reason: reason.into(),
        }
    }

    pub fn evaluation(reason: impl Into<String>) -> Self {
        OptimizerError::Evaluation {
            reason: reason.into(),
        }
    }

    pub fn decoding(reason: impl Into<String>) -> Self {
        OptimizerError::Decoding {
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_zone(context: &str, zone: ZoneId) -> Self {
        OptimizerError::validation(format!("{} references unknown zone id {}", context, zone))
    }

    /// True for errors caused by the caller's input rather than an internal fault.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            OptimizerError::Configuration { .. }
                | OptimizerError::Validation { .. }
                | OptimizerError::Io { .. }
                | OptimizerError::Parse { .. }
        )
    }
}

impl fmt::Display for OptimizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerError::Configuration { reason } => {
                write!(f, "invalid configuration: {}", reason)
            }
            OptimizerError::Validation { reason } => write!(f, "invalid input: {}", reason),
            OptimizerError::Evaluation { reason } => {
                write!(f, "route evaluation failed: {}", reason)
            }
            OptimizerError::Decoding { reason } => {
                write!(f, "chromosome decoding failed: {}", reason)
            }
            OptimizerError::Io { path, reason } => write!(f, "'{}': {}", path, reason),
            OptimizerError::Parse { path, reason } => {
                write!(f, "could not parse '{}': {}", path, reason)
            }
        }
    }
}

impl std::error::Error for OptimizerError {}

pub type Result<T> = std::result::Result<T, OptimizerError>;
