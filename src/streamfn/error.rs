//! Error types for the function catalog.
//!
//! Everything in this crate reports recoverable errors through a single
//! [`FunctionError`] enum. Registration conflicts leave the registry
//! untouched, arity and type failures are reported from `validate`/`execute`,
//! and accumulator `add` never errors (null or unconvertible input is a
//! silent no-op, see the aggregate protocol documentation).

use crate::streamfn::registry::FunctionMeta;

/// Error type for registry, validation, execution, and adapter operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FunctionError {
    /// A name or alias is already taken by another registered function.
    #[error("function '{name}' is already registered")]
    RegistrationConflict { name: String },

    /// Argument count outside the function's declared arity bounds.
    #[error("function '{function}' expects {expected} argument(s), got {actual}")]
    InvalidArgumentCount {
        function: String,
        /// Human-readable arity description ("exactly 2", "at least 1", ...).
        expected: String,
        actual: usize,
    },

    /// An argument could not be coerced to the expected type.
    #[error("function '{function}' expected {expected}, got {actual}")]
    TypeMismatch {
        function: String,
        expected: String,
        actual: String,
    },

    /// Lookup of an unregistered name.
    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    /// A legacy adapter was asked to wrap a non-aggregate function.
    #[error("function '{name}' is not an aggregate function")]
    NotAggregate { name: String },

    /// A legacy adapter was asked to wrap a non-analytical function.
    #[error("function '{name}' is not an analytical function")]
    NotAnalytic { name: String },

    /// Runtime failure inside a function body (domain errors such as the
    /// square root of a negative number, division by zero, ...).
    #[error("function '{function}' failed: {message}")]
    ExecutionError { function: String, message: String },
}

impl FunctionError {
    /// Build an arity error from a function's metadata and the actual count.
    pub fn arity(meta: &FunctionMeta, actual: usize) -> Self {
        let expected = match (meta.min_args, meta.max_args) {
            (min, Some(max)) if min == max => format!("exactly {}", min),
            (min, Some(max)) => format!("between {} and {}", min, max),
            (min, None) => format!("at least {}", min),
        };
        FunctionError::InvalidArgumentCount {
            function: meta.name.clone(),
            expected,
            actual,
        }
    }

    /// Build a type mismatch error.
    pub fn type_mismatch(
        function: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        FunctionError::TypeMismatch {
            function: function.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Build an execution (domain) error.
    pub fn execution(function: impl Into<String>, message: impl Into<String>) -> Self {
        FunctionError::ExecutionError {
            function: function.into(),
            message: message.into(),
        }
    }
}

/// Result type for function catalog operations.
pub type FunctionResult<T> = Result<T, FunctionError>;
