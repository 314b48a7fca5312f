//! Calculation error types.

use std::error::Error;
use std::fmt;

/// Failure of a single calculation call.
///
/// Every variant is a validation failure detected before any division or
/// sizing arithmetic runs. The engine performs no I/O, so a failed call has
/// no partial effects to undo; callers correct the input and retry at their
/// own discretion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    /// A required parameter key was absent from the input map.
    MissingParameter {
        /// Name of the absent key (e.g. `"num_units"`).
        field: String,
    },
    /// A parameter value violates its constraint.
    InvalidParameter {
        /// Name of the offending field.
        field: String,
        /// Human-readable constraint description.
        message: String,
    },
    /// The scenario type is not one the engine knows.
    UnsupportedScenario {
        /// The unrecognized type string as given by the caller.
        given: String,
    },
}

impl CalcError {
    /// Shorthand for an [`CalcError::InvalidParameter`] with owned strings.
    pub fn invalid(field: &str, message: &str) -> Self {
        Self::InvalidParameter {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Shorthand for a [`CalcError::MissingParameter`].
    pub fn missing(field: &str) -> Self {
        Self::MissingParameter {
            field: field.to_string(),
        }
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParameter { field } => {
                write!(f, "missing parameter `{field}`")
            }
            Self::InvalidParameter { field, message } => {
                write!(f, "invalid parameter `{field}` — {message}")
            }
            Self::UnsupportedScenario { given } => {
                write!(f, "unsupported scenario type \"{given}\"")
            }
        }
    }
}

impl Error for CalcError {}
