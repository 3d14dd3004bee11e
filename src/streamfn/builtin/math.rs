//! Built-in math functions.
//!
//! A representative slice of the leaf catalog: pure transforms over
//! already-validated arguments. Domain violations (square root of a
//! negative, logarithm of a non-positive, zero divisor) are reported as
//! errors from `execute`, never as silent nulls. A null argument propagates
//! as null.

use crate::streamfn::error::{FunctionError, FunctionResult};
use crate::streamfn::function::{numeric_arg, Function, ScalarFunction};
use crate::streamfn::registry::{FunctionMeta, FunctionType};
use crate::streamfn::types::{FieldValue, FunctionContext};
use std::sync::Arc;

pub fn abs() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new("abs", FunctionType::Math, "math", "Absolute value"),
        |_, args| match &args[0] {
            FieldValue::Integer(i) => Ok(FieldValue::Integer(i.wrapping_abs())),
            FieldValue::Float(f) => Ok(FieldValue::Float(f.abs())),
            FieldValue::Null => Ok(FieldValue::Null),
            other => Err(FunctionError::type_mismatch(
                "abs",
                "a numeric value",
                other.type_name(),
            )),
        },
    ))
}

pub fn sqrt() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new("sqrt", FunctionType::Math, "math", "Square root"),
        |_, args| match numeric_arg("sqrt", &args[0])? {
            None => Ok(FieldValue::Null),
            Some(f) if f < 0.0 => Err(FunctionError::execution(
                "sqrt",
                format!("square root of negative number {}", f),
            )),
            Some(f) => Ok(FieldValue::Float(f.sqrt())),
        },
    ))
}

pub fn ln() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new("ln", FunctionType::Math, "math", "Natural logarithm"),
        |_, args| log_impl("ln", &args[0], f64::ln),
    ))
}

pub fn log() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new("log", FunctionType::Math, "math", "Base-10 logarithm"),
        |_, args| log_impl("log", &args[0], f64::log10),
    ))
}

fn log_impl(
    name: &str,
    value: &FieldValue,
    op: fn(f64) -> f64,
) -> FunctionResult<FieldValue> {
    match numeric_arg(name, value)? {
        None => Ok(FieldValue::Null),
        Some(f) if f <= 0.0 => Err(FunctionError::execution(
            name,
            format!("logarithm of non-positive number {}", f),
        )),
        Some(f) => Ok(FieldValue::Float(op(f))),
    }
}

pub fn power() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new("power", FunctionType::Math, "math", "x raised to the power y")
            .with_aliases(&["pow"])
            .with_arity(2, Some(2)),
        |_, args| {
            match (numeric_arg("power", &args[0])?, numeric_arg("power", &args[1])?) {
                (Some(base), Some(exp)) => Ok(FieldValue::Float(base.powf(exp))),
                _ => Ok(FieldValue::Null),
            }
        },
    ))
}

pub fn modulo() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new("mod", FunctionType::Math, "math", "Remainder of x / y")
            .with_arity(2, Some(2)),
        |_, args| match (&args[0], &args[1]) {
            (FieldValue::Null, _) | (_, FieldValue::Null) => Ok(FieldValue::Null),
            (FieldValue::Integer(_), FieldValue::Integer(0)) => {
                Err(FunctionError::execution("mod", "division by zero"))
            }
            (FieldValue::Integer(a), FieldValue::Integer(b)) => {
                Ok(FieldValue::Integer(a % b))
            }
            (a, b) => {
                let (x, y) = (
                    numeric_arg("mod", a)?.unwrap_or(0.0),
                    numeric_arg("mod", b)?.unwrap_or(0.0),
                );
                if y == 0.0 {
                    Err(FunctionError::execution("mod", "division by zero"))
                } else {
                    Ok(FieldValue::Float(x % y))
                }
            }
        },
    ))
}

pub fn round() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new("round", FunctionType::Math, "math", "Round to nearest integer"),
        |_, args| rounding_impl("round", &args[0], f64::round),
    ))
}

pub fn floor() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new("floor", FunctionType::Math, "math", "Round down"),
        |_, args| rounding_impl("floor", &args[0], f64::floor),
    ))
}

pub fn ceil() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new("ceil", FunctionType::Math, "math", "Round up")
            .with_aliases(&["ceiling"]),
        |_, args| rounding_impl("ceil", &args[0], f64::ceil),
    ))
}

fn rounding_impl(
    name: &str,
    value: &FieldValue,
    op: fn(f64) -> f64,
) -> FunctionResult<FieldValue> {
    match value {
        FieldValue::Integer(i) => Ok(FieldValue::Integer(*i)),
        FieldValue::Null => Ok(FieldValue::Null),
        other => match numeric_arg(name, other)? {
            Some(f) => Ok(FieldValue::Integer(op(f) as i64)),
            None => Ok(FieldValue::Null),
        },
    }
}
