//! Capability traits implemented by every registered function.
//!
//! Everything the registry stores is a [`Function`]: a named, validated,
//! executable unit. Stateful reducers additionally implement
//! [`AggregateFunction`] (the incremental aggregation protocol), and
//! per-row stateful functions implement [`AnalyticFunction`] on top of that.

use crate::streamfn::error::{FunctionError, FunctionResult};
use crate::streamfn::registry::FunctionMeta;
use crate::streamfn::types::{FieldValue, FunctionContext};
use std::sync::Arc;

/// The universal capability every registered entity exposes.
///
/// The engine calls `validate` before `execute` in normal operation.
/// Implementations must be safe to share across threads; any per-row or
/// per-group state belongs in accumulator instances obtained through
/// [`AggregateFunction::fresh`], never in the registered template.
pub trait Function: Send + Sync {
    /// Immutable metadata: name, type, aliases, arity bounds.
    fn meta(&self) -> &FunctionMeta;

    /// Check the argument list without executing. The default checks arity
    /// against the metadata bounds.
    fn validate(&self, args: &[FieldValue]) -> FunctionResult<()> {
        self.meta().check_arity(args.len())
    }

    /// Evaluate the function over already-validated arguments.
    fn execute(&self, ctx: &FunctionContext, args: &[FieldValue])
        -> FunctionResult<FieldValue>;

    /// Downcast to the aggregate capability, if this function has one.
    fn as_aggregate(&self) -> Option<&dyn AggregateFunction> {
        None
    }

    /// Downcast to the analytical capability, if this function has one.
    fn as_analytic(&self) -> Option<&dyn AnalyticFunction> {
        None
    }
}

/// The incremental aggregation protocol.
///
/// An implementor is a live accumulator with internal mutable state. Its
/// lifecycle is a small state machine: `Fresh` (post-`fresh`/`reset`, no
/// values contributed) moves to `Accumulating` on the first effective `add`,
/// and back to `Fresh` via `reset`.
///
/// Contracts:
/// - `fresh()` returns state fully independent from its origin and from any
///   other `fresh()`/`snapshot()` result - no shared mutable substructures.
/// - `add(value)` with a null or unconvertible value is a silent no-op;
///   upstream rows may carry missing fields.
/// - `result()` is a pure read: repeated calls without an intervening
///   `add`/`reset` return equal values. A fresh numeric reducer yields
///   `Null` per SQL aggregate semantics; COUNT is the exception and yields
///   `Integer(0)`.
/// - `reset()` makes the state observationally identical to `fresh()`.
/// - `snapshot()` deep-copies all mutable substructures, so subsequent
///   `add`s on either side never cross-affect the other's `result()`.
///
/// Instances are not safe for concurrent `add` from multiple threads; the
/// engine must guarantee single-writer access per instance.
pub trait AggregateFunction: Function {
    /// Create a new, independent accumulator in the `Fresh` state.
    fn fresh(&self) -> Box<dyn AggregateFunction>;

    /// Contribute one value. Null or unconvertible input is ignored.
    fn add(&mut self, value: &FieldValue);

    /// Read the current reduction without consuming state.
    fn result(&self) -> FieldValue;

    /// Return to the `Fresh` state.
    fn reset(&mut self);

    /// Duplicate this accumulator in its current state.
    fn snapshot(&self) -> Box<dyn AggregateFunction>;
}

/// A function whose result depends on prior rows it has seen (lag, latest,
/// change detection), as opposed to a pure reduction.
///
/// Analytical functions share the accumulator lifecycle so the engine can
/// drive them per group/key, but `add`/`result` are reinterpreted per
/// function: `add` feeds the row history, `result` reads the remembered
/// state. The per-row path is [`execute_row`](Self::execute_row), which both
/// returns a value and updates the instance.
pub trait AnalyticFunction: AggregateFunction {
    /// Evaluate for one row, updating internal state as a side effect.
    fn execute_row(
        &mut self,
        ctx: &FunctionContext,
        args: &[FieldValue],
    ) -> FunctionResult<FieldValue>;

    /// Uniform accessor for the remembered state, used by the aggregating
    /// adapter instead of per-kind special cases.
    fn peek_state(&self) -> FieldValue;

    /// Create a new, independent instance in the `Fresh` state.
    fn fresh_analytic(&self) -> Box<dyn AnalyticFunction>;

    /// Duplicate this instance in its current state.
    fn snapshot_analytic(&self) -> Box<dyn AnalyticFunction>;
}

/// Handler signature for stateless (scalar) function bodies.
pub type ScalarHandler =
    Arc<dyn Fn(&FunctionContext, &[FieldValue]) -> FunctionResult<FieldValue> + Send + Sync>;

/// A stateless function: metadata plus a pure body over validated arguments.
///
/// Built-in leaf functions and ad-hoc custom functions both use this shape.
pub struct ScalarFunction {
    meta: FunctionMeta,
    handler: ScalarHandler,
}

impl ScalarFunction {
    /// Wrap a closure as a registered function.
    pub fn new(
        meta: FunctionMeta,
        handler: impl Fn(&FunctionContext, &[FieldValue]) -> FunctionResult<FieldValue>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            meta,
            handler: Arc::new(handler),
        }
    }
}

impl Function for ScalarFunction {
    fn meta(&self) -> &FunctionMeta {
        &self.meta
    }

    fn execute(
        &self,
        ctx: &FunctionContext,
        args: &[FieldValue],
    ) -> FunctionResult<FieldValue> {
        self.validate(args)?;
        (self.handler)(ctx, args)
    }
}

impl std::fmt::Debug for ScalarFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScalarFunction")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// One-shot evaluation of an aggregate over its arguments.
///
/// Drives a fresh accumulator through the protocol: an `Array` first
/// argument is reduced element-by-element, a single scalar contributes one
/// value. This is the non-incremental `execute` path shared by every
/// aggregate template.
pub fn execute_aggregate(
    agg: &dyn AggregateFunction,
    args: &[FieldValue],
) -> FunctionResult<FieldValue> {
    let mut acc = agg.fresh();
    match args.first() {
        Some(FieldValue::Array(items)) => {
            for item in items {
                acc.add(item);
            }
        }
        Some(value) => acc.add(value),
        None => {}
    }
    Ok(acc.result())
}

/// Helper for numeric scalar bodies: coerce an argument to `f64` or report
/// a type mismatch. Null propagates as `None` and the caller returns `Null`.
pub fn numeric_arg(
    function: &str,
    value: &FieldValue,
) -> FunctionResult<Option<f64>> {
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_f64()
        .map(Some)
        .ok_or_else(|| FunctionError::type_mismatch(function, "a numeric value", value.type_name()))
}

/// Implement [`Function`] for an accumulator type with a static metadata
/// entry. The `analytic` form additionally exposes the analytical capability
/// and routes one-shot execution through `execute_row` on a disposable
/// snapshot.
macro_rules! impl_function_entry {
    ($ty:ty, $meta:ident) => {
        impl $crate::streamfn::function::Function for $ty {
            fn meta(&self) -> &$crate::streamfn::registry::FunctionMeta {
                std::sync::LazyLock::force(&$meta)
            }

            fn execute(
                &self,
                _ctx: &$crate::streamfn::types::FunctionContext,
                args: &[$crate::streamfn::types::FieldValue],
            ) -> $crate::streamfn::error::FunctionResult<$crate::streamfn::types::FieldValue>
            {
                self.validate(args)?;
                $crate::streamfn::function::execute_aggregate(self, args)
            }

            fn as_aggregate(
                &self,
            ) -> Option<&dyn $crate::streamfn::function::AggregateFunction> {
                Some(self)
            }
        }
    };
    (analytic $ty:ty, $meta:ident) => {
        impl $crate::streamfn::function::Function for $ty {
            fn meta(&self) -> &$crate::streamfn::registry::FunctionMeta {
                std::sync::LazyLock::force(&$meta)
            }

            fn execute(
                &self,
                ctx: &$crate::streamfn::types::FunctionContext,
                args: &[$crate::streamfn::types::FieldValue],
            ) -> $crate::streamfn::error::FunctionResult<$crate::streamfn::types::FieldValue>
            {
                self.validate(args)?;
                self.snapshot_analytic().execute_row(ctx, args)
            }

            fn as_aggregate(
                &self,
            ) -> Option<&dyn $crate::streamfn::function::AggregateFunction> {
                Some(self)
            }

            fn as_analytic(
                &self,
            ) -> Option<&dyn $crate::streamfn::function::AnalyticFunction> {
                Some(self)
            }
        }
    };
}

pub(crate) use impl_function_entry;
