//! Analytical (stateful per-row) functions.
//!
//! These remember something about previous rows instead of reducing a set:
//! [`Lag`] returns the value from N rows ago, [`Latest`] echoes the most
//! recent non-null value, [`HadChanged`] reports whether the value differs
//! from the last one seen. They implement the full accumulator capability
//! set so the engine can drive them through the same lifecycle as reducers,
//! with `add`/`result` reinterpreted per function.
//!
//! [`WindowPosition`] covers `window_start`/`window_end`: the value comes
//! from the supplied context's window descriptor when present, falling back
//! to an internally stored value - some call paths run outside windowed
//! execution.

use crate::streamfn::error::{FunctionError, FunctionResult};
use crate::streamfn::function::{
    impl_function_entry, AggregateFunction, AnalyticFunction, Function,
};
use crate::streamfn::registry::{FunctionMeta, FunctionType};
use crate::streamfn::types::{FieldValue, FunctionContext};
use std::collections::VecDeque;
use std::sync::LazyLock;

static LAG_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "lag",
        FunctionType::Analytical,
        "analytical",
        "Value from N rows ago, or a default while the history is shorter",
    )
    .with_arity(1, Some(3))
});

static LATEST_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "latest",
        FunctionType::Analytical,
        "analytical",
        "Most recent non-null value seen",
    )
    .with_arity(1, Some(2))
});

static HAD_CHANGED_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "had_changed",
        FunctionType::Analytical,
        "analytical",
        "Whether the value differs from the previous one seen",
    )
    .with_arity(1, None)
});

static WINDOW_START_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "window_start",
        FunctionType::Window,
        "window",
        "Start of the current window (milliseconds since epoch)",
    )
    .with_arity(0, Some(0))
});

static WINDOW_END_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "window_end",
        FunctionType::Window,
        "window",
        "End of the current window (milliseconds since epoch)",
    )
    .with_arity(0, Some(0))
});

/// LAG: bounded history buffer, reads `offset` rows behind the latest.
#[derive(Debug, Clone)]
pub struct Lag {
    offset: usize,
    default: FieldValue,
    history: VecDeque<FieldValue>,
}

impl Lag {
    pub fn new(offset: usize, default: FieldValue) -> Self {
        Self {
            offset: offset.max(1),
            default,
            history: VecDeque::with_capacity(offset.max(1) + 1),
        }
    }

    /// Apply optional `offset` / `default` arguments from the per-row call.
    fn configure(&mut self, args: &[FieldValue]) -> FunctionResult<()> {
        if let Some(offset_arg) = args.get(1) {
            let offset = offset_arg.as_i64().filter(|o| *o >= 1).ok_or_else(|| {
                FunctionError::type_mismatch("lag", "a positive integer offset", offset_arg.type_name())
            })?;
            self.offset = offset as usize;
        }
        if let Some(default_arg) = args.get(2) {
            self.default = default_arg.clone();
        }
        Ok(())
    }
}

impl Default for Lag {
    fn default() -> Self {
        Self::new(1, FieldValue::Null)
    }
}

impl AggregateFunction for Lag {
    fn fresh(&self) -> Box<dyn AggregateFunction> {
        Box::new(Lag::new(self.offset, self.default.clone()))
    }

    fn add(&mut self, value: &FieldValue) {
        if value.is_null() {
            return;
        }
        self.history.push_back(value.clone());
        while self.history.len() > self.offset + 1 {
            self.history.pop_front();
        }
    }

    fn result(&self) -> FieldValue {
        if self.history.len() > self.offset {
            self.history[self.history.len() - 1 - self.offset].clone()
        } else {
            self.default.clone()
        }
    }

    fn reset(&mut self) {
        self.history.clear();
    }

    fn snapshot(&self) -> Box<dyn AggregateFunction> {
        Box::new(self.clone())
    }
}

impl AnalyticFunction for Lag {
    fn execute_row(
        &mut self,
        _ctx: &FunctionContext,
        args: &[FieldValue],
    ) -> FunctionResult<FieldValue> {
        self.configure(args)?;
        // The lagged value is read before the current row is recorded.
        let out = if self.history.len() >= self.offset {
            self.history[self.history.len() - self.offset].clone()
        } else {
            self.default.clone()
        };
        self.add(&args[0]);
        Ok(out)
    }

    fn peek_state(&self) -> FieldValue {
        self.result()
    }

    fn fresh_analytic(&self) -> Box<dyn AnalyticFunction> {
        Box::new(Lag::new(self.offset, self.default.clone()))
    }

    fn snapshot_analytic(&self) -> Box<dyn AnalyticFunction> {
        Box::new(self.clone())
    }
}

impl_function_entry!(analytic Lag, LAG_META);

/// LATEST: remembers the most recent non-null value.
#[derive(Debug, Clone, Default)]
pub struct Latest {
    value: Option<FieldValue>,
}

impl AggregateFunction for Latest {
    fn fresh(&self) -> Box<dyn AggregateFunction> {
        Box::new(Latest::default())
    }

    fn add(&mut self, value: &FieldValue) {
        if !value.is_null() {
            self.value = Some(value.clone());
        }
    }

    fn result(&self) -> FieldValue {
        self.value.clone().unwrap_or(FieldValue::Null)
    }

    fn reset(&mut self) {
        self.value = None;
    }

    fn snapshot(&self) -> Box<dyn AggregateFunction> {
        Box::new(self.clone())
    }
}

impl AnalyticFunction for Latest {
    fn execute_row(
        &mut self,
        _ctx: &FunctionContext,
        args: &[FieldValue],
    ) -> FunctionResult<FieldValue> {
        self.add(&args[0]);
        match &self.value {
            Some(v) => Ok(v.clone()),
            // No non-null value seen yet: the optional second argument is
            // the caller-supplied default.
            None => Ok(args.get(1).cloned().unwrap_or(FieldValue::Null)),
        }
    }

    fn peek_state(&self) -> FieldValue {
        self.result()
    }

    fn fresh_analytic(&self) -> Box<dyn AnalyticFunction> {
        Box::new(Latest::default())
    }

    fn snapshot_analytic(&self) -> Box<dyn AnalyticFunction> {
        Box::new(self.clone())
    }
}

impl_function_entry!(analytic Latest, LATEST_META);

/// HAD_CHANGED: compares each value against the previous one, remembering
/// the new value as a side effect. The first value counts as changed.
#[derive(Debug, Clone, Default)]
pub struct HadChanged {
    last: Option<FieldValue>,
    changed: Option<bool>,
}

impl HadChanged {
    fn observe(&mut self, value: &FieldValue) {
        if value.is_null() {
            return;
        }
        self.changed = Some(match &self.last {
            None => true,
            Some(prev) => !prev.values_equal(value),
        });
        self.last = Some(value.clone());
    }
}

impl AggregateFunction for HadChanged {
    fn fresh(&self) -> Box<dyn AggregateFunction> {
        Box::new(HadChanged::default())
    }

    fn add(&mut self, value: &FieldValue) {
        self.observe(value);
    }

    fn result(&self) -> FieldValue {
        match self.changed {
            Some(changed) => FieldValue::Boolean(changed),
            None => FieldValue::Null,
        }
    }

    fn reset(&mut self) {
        self.last = None;
        self.changed = None;
    }

    fn snapshot(&self) -> Box<dyn AggregateFunction> {
        Box::new(self.clone())
    }
}

impl AnalyticFunction for HadChanged {
    fn execute_row(
        &mut self,
        _ctx: &FunctionContext,
        args: &[FieldValue],
    ) -> FunctionResult<FieldValue> {
        // Multiple columns are tracked as one tuple.
        let value = if args.len() == 1 {
            args[0].clone()
        } else {
            FieldValue::Array(args.to_vec())
        };
        self.observe(&value);
        Ok(self.result())
    }

    fn peek_state(&self) -> FieldValue {
        self.result()
    }

    fn fresh_analytic(&self) -> Box<dyn AnalyticFunction> {
        Box::new(HadChanged::default())
    }

    fn snapshot_analytic(&self) -> Box<dyn AnalyticFunction> {
        Box::new(self.clone())
    }
}

impl_function_entry!(analytic HadChanged, HAD_CHANGED_META);

/// Which bound a [`WindowPosition`] instance reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowBound {
    Start,
    End,
}

/// WINDOW_START / WINDOW_END.
///
/// Reads the bound from the context's window descriptor when present,
/// falling back to the internally stored value set via `add`. Both sources
/// must stay supported: some call paths invoke these outside windowed
/// execution.
#[derive(Debug, Clone)]
pub struct WindowPosition {
    bound: WindowBound,
    stored: Option<i64>,
}

impl WindowPosition {
    pub fn new(bound: WindowBound) -> Self {
        Self {
            bound,
            stored: None,
        }
    }

    pub fn start() -> Self {
        Self::new(WindowBound::Start)
    }

    pub fn end() -> Self {
        Self::new(WindowBound::End)
    }
}

impl Function for WindowPosition {
    fn meta(&self) -> &FunctionMeta {
        let meta = match self.bound {
            WindowBound::Start => &WINDOW_START_META,
            WindowBound::End => &WINDOW_END_META,
        };
        LazyLock::force(meta)
    }

    fn execute(
        &self,
        ctx: &FunctionContext,
        args: &[FieldValue],
    ) -> FunctionResult<FieldValue> {
        self.validate(args)?;
        self.snapshot_analytic().execute_row(ctx, args)
    }

    fn as_aggregate(&self) -> Option<&dyn AggregateFunction> {
        Some(self)
    }

    fn as_analytic(&self) -> Option<&dyn AnalyticFunction> {
        Some(self)
    }
}

impl AggregateFunction for WindowPosition {
    fn fresh(&self) -> Box<dyn AggregateFunction> {
        Box::new(WindowPosition::new(self.bound))
    }

    fn add(&mut self, value: &FieldValue) {
        if let Some(ts) = value.as_i64() {
            self.stored = Some(ts);
        }
    }

    fn result(&self) -> FieldValue {
        match self.stored {
            Some(ts) => FieldValue::Integer(ts),
            None => FieldValue::Null,
        }
    }

    fn reset(&mut self) {
        self.stored = None;
    }

    fn snapshot(&self) -> Box<dyn AggregateFunction> {
        Box::new(self.clone())
    }
}

impl AnalyticFunction for WindowPosition {
    fn execute_row(
        &mut self,
        ctx: &FunctionContext,
        _args: &[FieldValue],
    ) -> FunctionResult<FieldValue> {
        if let Some(window) = &ctx.window {
            let ts = match self.bound {
                WindowBound::Start => window.window_start,
                WindowBound::End => window.window_end,
            };
            self.stored = Some(ts);
            return Ok(FieldValue::Integer(ts));
        }
        Ok(self.result())
    }

    fn peek_state(&self) -> FieldValue {
        self.result()
    }

    fn fresh_analytic(&self) -> Box<dyn AnalyticFunction> {
        Box::new(WindowPosition::new(self.bound))
    }

    fn snapshot_analytic(&self) -> Box<dyn AnalyticFunction> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streamfn::types::WindowInfo;

    #[test]
    fn test_lag_one_step_behind() {
        let mut lag = Lag::default();
        lag.add(&FieldValue::Integer(10));
        assert_eq!(lag.result(), FieldValue::Null);
        lag.add(&FieldValue::Integer(20));
        assert_eq!(lag.result(), FieldValue::Integer(10));
        lag.add(&FieldValue::Integer(30));
        assert_eq!(lag.result(), FieldValue::Integer(20));
    }

    #[test]
    fn test_lag_execute_row_with_offset_and_default() {
        let mut lag = Lag::default();
        let ctx = FunctionContext::new();
        let args = |v: i64| {
            vec![
                FieldValue::Integer(v),
                FieldValue::Integer(2),
                FieldValue::String("n/a".to_string()),
            ]
        };

        assert_eq!(
            lag.execute_row(&ctx, &args(1)).unwrap(),
            FieldValue::String("n/a".to_string())
        );
        assert_eq!(
            lag.execute_row(&ctx, &args(2)).unwrap(),
            FieldValue::String("n/a".to_string())
        );
        assert_eq!(lag.execute_row(&ctx, &args(3)).unwrap(), FieldValue::Integer(1));
        assert_eq!(lag.execute_row(&ctx, &args(4)).unwrap(), FieldValue::Integer(2));
    }

    #[test]
    fn test_latest_overwrites_and_skips_nulls() {
        let mut latest = Latest::default();
        latest.add(&FieldValue::Integer(1));
        latest.add(&FieldValue::Null);
        latest.add(&FieldValue::Integer(2));
        assert_eq!(latest.result(), FieldValue::Integer(2));
    }

    #[test]
    fn test_had_changed_sequence() {
        let mut hc = HadChanged::default();
        assert_eq!(hc.result(), FieldValue::Null);
        hc.add(&FieldValue::Integer(1));
        assert_eq!(hc.result(), FieldValue::Boolean(true));
        hc.add(&FieldValue::Integer(1));
        assert_eq!(hc.result(), FieldValue::Boolean(false));
        hc.add(&FieldValue::Integer(2));
        assert_eq!(hc.result(), FieldValue::Boolean(true));
    }

    #[test]
    fn test_window_position_dual_source() {
        let mut ws = WindowPosition::start();

        // Outside windowed execution: falls back to the stored value.
        let bare = FunctionContext::new();
        assert_eq!(ws.execute_row(&bare, &[]).unwrap(), FieldValue::Null);
        ws.add(&FieldValue::Integer(1_000));
        assert_eq!(ws.execute_row(&bare, &[]).unwrap(), FieldValue::Integer(1_000));

        // Window descriptor wins when present, and refreshes the fallback.
        let windowed = FunctionContext::with_window(WindowInfo {
            window_start: 5_000,
            window_end: 6_000,
            row_count: 42,
        });
        assert_eq!(ws.execute_row(&windowed, &[]).unwrap(), FieldValue::Integer(5_000));
        assert_eq!(ws.execute_row(&bare, &[]).unwrap(), FieldValue::Integer(5_000));
    }

    #[test]
    fn test_analytic_reset_and_clone() {
        let mut lag = Lag::default();
        lag.add(&FieldValue::Integer(1));
        lag.add(&FieldValue::Integer(2));

        let clone = lag.snapshot_analytic();
        lag.add(&FieldValue::Integer(3));
        assert_eq!(clone.peek_state(), FieldValue::Integer(1));
        assert_eq!(lag.peek_state(), FieldValue::Integer(2));

        lag.reset();
        assert_eq!(lag.result(), FieldValue::Null);
    }
}
