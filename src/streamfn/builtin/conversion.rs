//! Built-in type conversion functions.

use crate::streamfn::error::{FunctionError, FunctionResult};
use crate::streamfn::function::{Function, ScalarFunction};
use crate::streamfn::registry::{FunctionMeta, FunctionType};
use crate::streamfn::types::{FieldValue, FunctionContext};
use std::sync::Arc;

pub fn to_string_fn() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new(
            "to_string",
            FunctionType::Conversion,
            "conversion",
            "Render any value as a string",
        ),
        |_, args| {
            Ok(match &args[0] {
                FieldValue::Null => FieldValue::Null,
                other => FieldValue::String(other.to_string()),
            })
        },
    ))
}

pub fn to_int() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new(
            "to_int",
            FunctionType::Conversion,
            "conversion",
            "Convert to a 64-bit integer",
        ),
        |_, args| match &args[0] {
            FieldValue::Integer(i) => Ok(FieldValue::Integer(*i)),
            FieldValue::Float(f) => Ok(FieldValue::Integer(*f as i64)),
            FieldValue::Boolean(b) => Ok(FieldValue::Integer(*b as i64)),
            FieldValue::String(s) => s.trim().parse::<i64>().map(FieldValue::Integer).map_err(
                |_| FunctionError::type_mismatch("to_int", "an integer string", format!("'{}'", s)),
            ),
            FieldValue::Null => Ok(FieldValue::Null),
            other => Err(FunctionError::type_mismatch(
                "to_int",
                "a convertible value",
                other.type_name(),
            )),
        },
    ))
}

pub fn to_float() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new(
            "to_float",
            FunctionType::Conversion,
            "conversion",
            "Convert to a 64-bit float",
        ),
        |_, args| match &args[0] {
            FieldValue::Integer(i) => Ok(FieldValue::Float(*i as f64)),
            FieldValue::Float(f) => Ok(FieldValue::Float(*f)),
            FieldValue::String(s) => s.trim().parse::<f64>().map(FieldValue::Float).map_err(
                |_| FunctionError::type_mismatch("to_float", "a numeric string", format!("'{}'", s)),
            ),
            FieldValue::Null => Ok(FieldValue::Null),
            other => Err(FunctionError::type_mismatch(
                "to_float",
                "a convertible value",
                other.type_name(),
            )),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec(f: &Arc<dyn Function>, args: &[FieldValue]) -> FunctionResult<FieldValue> {
        f.execute(&FunctionContext::new(), args)
    }

    #[test]
    fn test_to_int_paths() {
        let f = to_int();
        assert_eq!(
            exec(&f, &[FieldValue::String(" 42 ".to_string())]).unwrap(),
            FieldValue::Integer(42)
        );
        assert_eq!(
            exec(&f, &[FieldValue::Float(3.9)]).unwrap(),
            FieldValue::Integer(3)
        );
        assert!(exec(&f, &[FieldValue::String("abc".to_string())]).is_err());
        assert_eq!(exec(&f, &[FieldValue::Null]).unwrap(), FieldValue::Null);
    }

    #[test]
    fn test_to_float_and_to_string() {
        assert_eq!(
            exec(&to_float(), &[FieldValue::String("2.5".to_string())]).unwrap(),
            FieldValue::Float(2.5)
        );
        assert_eq!(
            exec(&to_string_fn(), &[FieldValue::Integer(7)]).unwrap(),
            FieldValue::String("7".to_string())
        );
    }
}
