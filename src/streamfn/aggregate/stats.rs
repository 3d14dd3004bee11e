//! Streaming statistical accumulators.
//!
//! Variance and standard deviation use Welford's online algorithm: O(1)
//! memory, numerically stable for large streams (no summing of squares of
//! large values). Median/percentile are the documented non-streaming
//! exception: exact order statistics need the full value set, so they buffer
//! every value and sort on read.

use crate::streamfn::error::{FunctionError, FunctionResult};
use crate::streamfn::function::{execute_aggregate, AggregateFunction, Function};
use crate::streamfn::registry::{FunctionMeta, FunctionType};
use crate::streamfn::types::{FieldValue, FunctionContext};
use std::sync::LazyLock;

/// Welford's online algorithm state for running mean/variance.
///
/// Reference: Welford, B.P. (1962). "Note on a method for calculating
/// corrected sums of squares and products". Technometrics. 4 (3): 419-420.
#[derive(Debug, Clone, Default)]
pub struct WelfordState {
    pub count: u64,
    pub mean: f64,
    pub m2: f64,
}

impl WelfordState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incorporate a new value using Welford's online update.
    pub fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    /// Population variance: `M2 / count`, 0 when count < 1.
    pub fn variance_pop(&self) -> f64 {
        if self.count < 1 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Sample variance: `M2 / (count - 1)`, 0 when count < 2.
    pub fn variance_samp(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn stddev_pop(&self) -> f64 {
        self.variance_pop().sqrt()
    }

    pub fn stddev_samp(&self) -> f64 {
        self.variance_samp().sqrt()
    }
}

/// Which statistic a [`WelfordAccumulator`] reads out of the shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    VarPop,
    VarSamp,
    StddevPop,
    StddevSamp,
}

static VAR_POP_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "var",
        FunctionType::Aggregation,
        "statistical",
        "Population variance (Welford online algorithm)",
    )
    .with_aliases(&["var_pop"])
});

static VAR_SAMP_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "vars",
        FunctionType::Aggregation,
        "statistical",
        "Sample variance (Welford online algorithm)",
    )
    .with_aliases(&["var_samp", "variance"])
});

static STDDEV_POP_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "stddev",
        FunctionType::Aggregation,
        "statistical",
        "Population standard deviation (Welford online algorithm)",
    )
    .with_aliases(&["stddev_pop"])
});

static STDDEV_SAMP_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "stddevs",
        FunctionType::Aggregation,
        "statistical",
        "Sample standard deviation (Welford online algorithm)",
    )
    .with_aliases(&["stddev_samp"])
});

/// Single-pass variance/standard deviation accumulator.
///
/// One struct backs all four registered statistics; the kind selects which
/// readout `result()` performs on the shared `(count, mean, M2)` state.
#[derive(Debug, Clone)]
pub struct WelfordAccumulator {
    kind: StatKind,
    state: WelfordState,
}

impl WelfordAccumulator {
    pub fn new(kind: StatKind) -> Self {
        Self {
            kind,
            state: WelfordState::new(),
        }
    }

    pub fn var_pop() -> Self {
        Self::new(StatKind::VarPop)
    }

    pub fn var_samp() -> Self {
        Self::new(StatKind::VarSamp)
    }

    pub fn stddev_pop() -> Self {
        Self::new(StatKind::StddevPop)
    }

    pub fn stddev_samp() -> Self {
        Self::new(StatKind::StddevSamp)
    }
}

impl Function for WelfordAccumulator {
    fn meta(&self) -> &FunctionMeta {
        let meta = match self.kind {
            StatKind::VarPop => &VAR_POP_META,
            StatKind::VarSamp => &VAR_SAMP_META,
            StatKind::StddevPop => &STDDEV_POP_META,
            StatKind::StddevSamp => &STDDEV_SAMP_META,
        };
        LazyLock::force(meta)
    }

    fn execute(
        &self,
        _ctx: &FunctionContext,
        args: &[FieldValue],
    ) -> FunctionResult<FieldValue> {
        self.validate(args)?;
        execute_aggregate(self, args)
    }

    fn as_aggregate(&self) -> Option<&dyn AggregateFunction> {
        Some(self)
    }
}

impl AggregateFunction for WelfordAccumulator {
    fn fresh(&self) -> Box<dyn AggregateFunction> {
        Box::new(WelfordAccumulator::new(self.kind))
    }

    fn add(&mut self, value: &FieldValue) {
        if let Some(f) = value.as_f64() {
            self.state.update(f);
        }
    }

    fn result(&self) -> FieldValue {
        FieldValue::Float(match self.kind {
            StatKind::VarPop => self.state.variance_pop(),
            StatKind::VarSamp => self.state.variance_samp(),
            StatKind::StddevPop => self.state.stddev_pop(),
            StatKind::StddevSamp => self.state.stddev_samp(),
        })
    }

    fn reset(&mut self) {
        self.state = WelfordState::new();
    }

    fn snapshot(&self) -> Box<dyn AggregateFunction> {
        Box::new(self.clone())
    }
}

static MEDIAN_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "median",
        FunctionType::Aggregation,
        "statistical",
        "Exact median; buffers all values and sorts on read",
    )
});

static PERCENTILE_META: LazyLock<FunctionMeta> = LazyLock::new(|| {
    FunctionMeta::new(
        "percentile_cont",
        FunctionType::Aggregation,
        "statistical",
        "Interpolated percentile; buffers all values and sorts on read",
    )
    .with_arity(1, Some(2))
});

/// Exact order-statistic accumulator.
///
/// Buffers every contributed value and computes the interpolated percentile
/// at `result()` time - O(n log n) on read. Median is the 0.5 fraction.
#[derive(Debug, Clone)]
pub struct PercentileAccumulator {
    fraction: f64,
    values: Vec<f64>,
    named_median: bool,
}

impl PercentileAccumulator {
    /// The `median` builtin: fraction pinned at 0.5.
    pub fn median() -> Self {
        Self {
            fraction: 0.5,
            values: Vec::new(),
            named_median: true,
        }
    }

    /// The `percentile_cont` builtin with a configured fraction.
    pub fn percentile(fraction: f64) -> Self {
        Self {
            fraction,
            values: Vec::new(),
            named_median: false,
        }
    }

    fn compute(&self) -> FieldValue {
        if self.values.is_empty() {
            return FieldValue::Null;
        }
        let mut sorted = self.values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let rank = self.fraction.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        if lower == upper {
            FieldValue::Float(sorted[lower])
        } else {
            let weight = rank - lower as f64;
            FieldValue::Float(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
        }
    }
}

impl Function for PercentileAccumulator {
    fn meta(&self) -> &FunctionMeta {
        if self.named_median {
            LazyLock::force(&MEDIAN_META)
        } else {
            LazyLock::force(&PERCENTILE_META)
        }
    }

    fn execute(
        &self,
        _ctx: &FunctionContext,
        args: &[FieldValue],
    ) -> FunctionResult<FieldValue> {
        self.validate(args)?;
        // percentile_cont(value, fraction): the fraction rides in as the
        // second argument on the one-shot path.
        let acc = if let Some(frac_arg) = args.get(1) {
            let fraction = frac_arg.as_f64().ok_or_else(|| {
                FunctionError::type_mismatch(
                    &self.meta().name,
                    "a numeric fraction",
                    frac_arg.type_name(),
                )
            })?;
            if !(0.0..=1.0).contains(&fraction) {
                return Err(FunctionError::execution(
                    &self.meta().name,
                    format!("fraction {} outside [0, 1]", fraction),
                ));
            }
            PercentileAccumulator::percentile(fraction)
        } else {
            PercentileAccumulator {
                fraction: self.fraction,
                values: Vec::new(),
                named_median: self.named_median,
            }
        };
        execute_aggregate(&acc, &args[..1])
    }

    fn as_aggregate(&self) -> Option<&dyn AggregateFunction> {
        Some(self)
    }
}

impl AggregateFunction for PercentileAccumulator {
    fn fresh(&self) -> Box<dyn AggregateFunction> {
        Box::new(PercentileAccumulator {
            fraction: self.fraction,
            values: Vec::new(),
            named_median: self.named_median,
        })
    }

    fn add(&mut self, value: &FieldValue) {
        if let Some(f) = value.as_f64() {
            self.values.push(f);
        }
    }

    fn result(&self) -> FieldValue {
        self.compute()
    }

    fn reset(&mut self) {
        self.values.clear();
    }

    fn snapshot(&self) -> Box<dyn AggregateFunction> {
        // Vec clone is a deep copy; the buffers never alias.
        Box::new(self.clone())
    }
}
