//! # streamfn
//!
//! Runtime function catalog for a streaming query engine: name and alias
//! resolution, incremental aggregation, analytical per-row functions, and
//! adapters bridging the catalog into the legacy operator graph.
//!
//! ## Quick Start
//!
//! ```rust
//! use streamfn::streamfn::registry;
//! use streamfn::streamfn::types::{FieldValue, FunctionContext};
//! use streamfn::streamfn::{AggregateFunction, Function};
//!
//! let catalog = registry::global();
//! let sum = catalog.get("SUM").unwrap();
//!
//! // Aggregation: take a fresh accumulator from the registered template.
//! let mut acc = sum.as_aggregate().unwrap().fresh();
//! acc.add(&FieldValue::Integer(10));
//! acc.add(&FieldValue::Integer(32));
//! assert_eq!(acc.result(), FieldValue::Integer(42));
//!
//! // Scalar evaluation goes through the uniform execute surface.
//! let upper = catalog.get("upper").unwrap();
//! let ctx = FunctionContext::new();
//! let out = upper.execute(&ctx, &[FieldValue::String("abc".into())]).unwrap();
//! assert_eq!(out, FieldValue::String("ABC".into()));
//! ```

pub mod streamfn;

pub use streamfn::{
    AggregateFunction, AnalyticFunction, FieldValue, Function, FunctionContext, FunctionError,
    FunctionMeta, FunctionRegistry, FunctionResult, FunctionType, RegistryEvent, ScalarFunction,
    WindowInfo,
};
