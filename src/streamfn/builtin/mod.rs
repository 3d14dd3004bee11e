//! Built-in function inventory.
//!
//! Every built-in declares itself through `register_builtin_function!`; the
//! global registry collects the inventory on first access. The leaf modules
//! ([`math`], [`string`], [`conversion`]) carry a representative slice of
//! the stateless catalog; the aggregation and analytical templates live in
//! [`crate::streamfn::aggregate`] and [`crate::streamfn::analytic`] and are
//! given constructors here.

pub mod conversion;
pub mod math;
pub mod string;

use crate::register_builtin_function;
use crate::streamfn::aggregate::{
    AvgAccumulator, CountAccumulator, MaxAccumulator, MinAccumulator, PercentileAccumulator,
    SumAccumulator, WelfordAccumulator,
};
use crate::streamfn::analytic::{HadChanged, Lag, Latest, WindowPosition};
use crate::streamfn::function::Function;
use std::sync::Arc;

// Aggregation templates.

fn count() -> Arc<dyn Function> {
    Arc::new(CountAccumulator::default())
}

fn sum() -> Arc<dyn Function> {
    Arc::new(SumAccumulator::default())
}

fn avg() -> Arc<dyn Function> {
    Arc::new(AvgAccumulator::default())
}

fn min() -> Arc<dyn Function> {
    Arc::new(MinAccumulator::default())
}

fn max() -> Arc<dyn Function> {
    Arc::new(MaxAccumulator::default())
}

fn var_pop() -> Arc<dyn Function> {
    Arc::new(WelfordAccumulator::var_pop())
}

fn var_samp() -> Arc<dyn Function> {
    Arc::new(WelfordAccumulator::var_samp())
}

fn stddev_pop() -> Arc<dyn Function> {
    Arc::new(WelfordAccumulator::stddev_pop())
}

fn stddev_samp() -> Arc<dyn Function> {
    Arc::new(WelfordAccumulator::stddev_samp())
}

fn median() -> Arc<dyn Function> {
    Arc::new(PercentileAccumulator::median())
}

/// The registered template pins fraction 0.5; only the one-shot `execute`
/// path reads a fraction argument. Callers needing another fraction on the
/// incremental path construct [`PercentileAccumulator::percentile`]
/// directly.
fn percentile_cont() -> Arc<dyn Function> {
    Arc::new(PercentileAccumulator::percentile(0.5))
}

// Analytical and window templates.

fn lag() -> Arc<dyn Function> {
    Arc::new(Lag::default())
}

fn latest() -> Arc<dyn Function> {
    Arc::new(Latest::default())
}

fn had_changed() -> Arc<dyn Function> {
    Arc::new(HadChanged::default())
}

fn window_start() -> Arc<dyn Function> {
    Arc::new(WindowPosition::start())
}

fn window_end() -> Arc<dyn Function> {
    Arc::new(WindowPosition::end())
}

register_builtin_function!(name: "count", ctor: crate::streamfn::builtin::count);
register_builtin_function!(name: "sum", ctor: crate::streamfn::builtin::sum);
register_builtin_function!(name: "avg", ctor: crate::streamfn::builtin::avg);
register_builtin_function!(name: "min", ctor: crate::streamfn::builtin::min);
register_builtin_function!(name: "max", ctor: crate::streamfn::builtin::max);
register_builtin_function!(name: "var", ctor: crate::streamfn::builtin::var_pop);
register_builtin_function!(name: "vars", ctor: crate::streamfn::builtin::var_samp);
register_builtin_function!(name: "stddev", ctor: crate::streamfn::builtin::stddev_pop);
register_builtin_function!(name: "stddevs", ctor: crate::streamfn::builtin::stddev_samp);
register_builtin_function!(name: "median", ctor: crate::streamfn::builtin::median);
register_builtin_function!(name: "percentile_cont", ctor: crate::streamfn::builtin::percentile_cont);

register_builtin_function!(name: "lag", ctor: crate::streamfn::builtin::lag);
register_builtin_function!(name: "latest", ctor: crate::streamfn::builtin::latest);
register_builtin_function!(name: "had_changed", ctor: crate::streamfn::builtin::had_changed);
register_builtin_function!(name: "window_start", ctor: crate::streamfn::builtin::window_start);
register_builtin_function!(name: "window_end", ctor: crate::streamfn::builtin::window_end);

register_builtin_function!(name: "abs", ctor: crate::streamfn::builtin::math::abs);
register_builtin_function!(name: "sqrt", ctor: crate::streamfn::builtin::math::sqrt);
register_builtin_function!(name: "ln", ctor: crate::streamfn::builtin::math::ln);
register_builtin_function!(name: "log", ctor: crate::streamfn::builtin::math::log);
register_builtin_function!(name: "power", ctor: crate::streamfn::builtin::math::power);
register_builtin_function!(name: "mod", ctor: crate::streamfn::builtin::math::modulo);
register_builtin_function!(name: "round", ctor: crate::streamfn::builtin::math::round);
register_builtin_function!(name: "floor", ctor: crate::streamfn::builtin::math::floor);
register_builtin_function!(name: "ceil", ctor: crate::streamfn::builtin::math::ceil);

register_builtin_function!(name: "upper", ctor: crate::streamfn::builtin::string::upper);
register_builtin_function!(name: "lower", ctor: crate::streamfn::builtin::string::lower);
register_builtin_function!(name: "length", ctor: crate::streamfn::builtin::string::length);
register_builtin_function!(name: "trim", ctor: crate::streamfn::builtin::string::trim);
register_builtin_function!(name: "concat", ctor: crate::streamfn::builtin::string::concat);

register_builtin_function!(name: "to_string", ctor: crate::streamfn::builtin::conversion::to_string_fn);
register_builtin_function!(name: "to_int", ctor: crate::streamfn::builtin::conversion::to_int);
register_builtin_function!(name: "to_float", ctor: crate::streamfn::builtin::conversion::to_float);
