//! Basic reducers: COUNT, SUM, AVG, MIN, MAX.
//!
//! All follow SQL aggregate semantics: the reduction of zero rows (or only
//! null rows) is NULL, except COUNT which is 0. Null and unconvertible
//! values are ignored by `add`.

use crate::streamfn::function::{impl_function_entry, AggregateFunction};
use crate::streamfn::registry::{FunctionMeta, FunctionType};
use crate::streamfn::types::FieldValue;
use std::cmp::Ordering;
use std::sync::LazyLock;

static COUNT_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "count",
        FunctionType::Aggregation,
        "basic",
        "Number of non-null values contributed",
    )
    .with_arity(0, Some(1))
});

static SUM_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "sum",
        FunctionType::Aggregation,
        "basic",
        "Sum of numeric values; integer-preserving when all inputs are integers",
    )
});

static AVG_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "avg",
        FunctionType::Aggregation,
        "basic",
        "Arithmetic mean of numeric values",
    )
    .with_aliases(&["mean"])
});

static MIN_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "min",
        FunctionType::Aggregation,
        "basic",
        "Smallest value seen, with numeric type coercion",
    )
});

static MAX_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "max",
        FunctionType::Aggregation,
        "basic",
        "Largest value seen, with numeric type coercion",
    )
});

/// COUNT accumulator. The one numeric reducer whose fresh result is `0`,
/// not NULL.
#[derive(Debug, Clone, Default)]
pub struct CountAccumulator {
    count: i64,
}

impl AggregateFunction for CountAccumulator {
    fn fresh(&self) -> Box<dyn AggregateFunction> {
        Box::new(CountAccumulator::default())
    }

    fn add(&mut self, value: &FieldValue) {
        if !value.is_null() {
            self.count += 1;
        }
    }

    fn result(&self) -> FieldValue {
        FieldValue::Integer(self.count)
    }

    fn reset(&mut self) {
        self.count = 0;
    }

    fn snapshot(&self) -> Box<dyn AggregateFunction> {
        Box::new(self.clone())
    }
}

impl_function_entry!(CountAccumulator, COUNT_META);

/// SUM accumulator. Tracks whether every contributed value was an integer so
/// the result can stay `Integer` for all-integer input.
#[derive(Debug, Clone)]
pub struct SumAccumulator {
    sum: f64,
    all_integer: bool,
    has_values: bool,
}

impl Default for SumAccumulator {
    fn default() -> Self {
        Self {
            sum: 0.0,
            all_integer: true,
            has_values: false,
        }
    }
}

impl AggregateFunction for SumAccumulator {
    fn fresh(&self) -> Box<dyn AggregateFunction> {
        Box::new(SumAccumulator::default())
    }

    fn add(&mut self, value: &FieldValue) {
        if let Some(f) = value.as_f64() {
            self.sum += f;
            self.all_integer &= matches!(value, FieldValue::Integer(_));
            self.has_values = true;
        }
    }

    fn result(&self) -> FieldValue {
        if !self.has_values {
            return FieldValue::Null;
        }
        if self.all_integer && self.sum.fract() == 0.0 {
            FieldValue::Integer(self.sum as i64)
        } else {
            FieldValue::Float(self.sum)
        }
    }

    fn reset(&mut self) {
        *self = SumAccumulator::default();
    }

    fn snapshot(&self) -> Box<dyn AggregateFunction> {
        Box::new(self.clone())
    }
}

impl_function_entry!(SumAccumulator, SUM_META);

/// AVG accumulator: running sum and count, mean on read.
#[derive(Debug, Clone, Default)]
pub struct AvgAccumulator {
    sum: f64,
    count: u64,
}

impl AggregateFunction for AvgAccumulator {
    fn fresh(&self) -> Box<dyn AggregateFunction> {
        Box::new(AvgAccumulator::default())
    }

    fn add(&mut self, value: &FieldValue) {
        if let Some(f) = value.as_f64() {
            self.sum += f;
            self.count += 1;
        }
    }

    fn result(&self) -> FieldValue {
        if self.count == 0 {
            FieldValue::Null
        } else {
            FieldValue::Float(self.sum / self.count as f64)
        }
    }

    fn reset(&mut self) {
        *self = AvgAccumulator::default();
    }

    fn snapshot(&self) -> Box<dyn AggregateFunction> {
        Box::new(self.clone())
    }
}

impl_function_entry!(AvgAccumulator, AVG_META);

/// MIN accumulator. Values that cannot be ordered against the current
/// extreme (cross-type, NaN) leave it unchanged.
#[derive(Debug, Clone, Default)]
pub struct MinAccumulator {
    current: Option<FieldValue>,
}

impl AggregateFunction for MinAccumulator {
    fn fresh(&self) -> Box<dyn AggregateFunction> {
        Box::new(MinAccumulator::default())
    }

    fn add(&mut self, value: &FieldValue) {
        if value.is_null() {
            return;
        }
        match &self.current {
            None => self.current = Some(value.clone()),
            Some(cur) => {
                if value.compare(cur) == Some(Ordering::Less) {
                    self.current = Some(value.clone());
                }
            }
        }
    }

    fn result(&self) -> FieldValue {
        self.current.clone().unwrap_or(FieldValue::Null)
    }

    fn reset(&mut self) {
        self.current = None;
    }

    fn snapshot(&self) -> Box<dyn AggregateFunction> {
        Box::new(self.clone())
    }
}

impl_function_entry!(MinAccumulator, MIN_META);

/// MAX accumulator, the mirror of [`MinAccumulator`].
#[derive(Debug, Clone, Default)]
pub struct MaxAccumulator {
    current: Option<FieldValue>,
}

impl AggregateFunction for MaxAccumulator {
    fn fresh(&self) -> Box<dyn AggregateFunction> {
        Box::new(MaxAccumulator::default())
    }

    fn add(&mut self, value: &FieldValue) {
        if value.is_null() {
            return;
        }
        match &self.current {
            None => self.current = Some(value.clone()),
            Some(cur) => {
                if value.compare(cur) == Some(Ordering::Greater) {
                    self.current = Some(value.clone());
                }
            }
        }
    }

    fn result(&self) -> FieldValue {
        self.current.clone().unwrap_or(FieldValue::Null)
    }

    fn reset(&mut self) {
        self.current = None;
    }

    fn snapshot(&self) -> Box<dyn AggregateFunction> {
        Box::new(self.clone())
    }
}

impl_function_entry!(MaxAccumulator, MAX_META);
