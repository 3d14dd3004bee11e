//! Runtime function catalog for streaming query evaluation.
//!
//! The catalog is organized around a small set of traits:
//!
//! - [`function::Function`] — uniform metadata + execution surface
//! - [`function::AggregateFunction`] — incremental reducers (fresh / add /
//!   result / reset / snapshot)
//! - [`function::AnalyticFunction`] — per-row stateful functions that also
//!   speak the aggregation protocol
//!
//! Functions are resolved by name or alias through a
//! [`registry::FunctionRegistry`]; the process-wide instance returned by
//! [`registry::global()`] ships with the full built-in catalog and keeps the
//! legacy adapter constructors in sync through registry events.

pub mod adapter;
pub mod aggregate;
pub mod analytic;
pub mod builtin;
pub mod error;
pub mod function;
pub mod registry;
pub mod types;

pub use error::{FunctionError, FunctionResult};
pub use function::{AggregateFunction, AnalyticFunction, Function, ScalarFunction};
pub use registry::metadata::{FunctionMeta, FunctionType};
pub use registry::{FunctionRegistry, RegistryEvent};
pub use types::{FieldValue, FunctionContext, WindowInfo};
