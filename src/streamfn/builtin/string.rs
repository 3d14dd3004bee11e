//! Built-in string functions.

use crate::streamfn::error::{FunctionError, FunctionResult};
use crate::streamfn::function::{Function, ScalarFunction};
use crate::streamfn::registry::{FunctionMeta, FunctionType};
use crate::streamfn::types::{FieldValue, FunctionContext};
use std::sync::Arc;

fn string_arg<'a>(name: &str, value: &'a FieldValue) -> FunctionResult<Option<&'a str>> {
    match value {
        FieldValue::String(s) => Ok(Some(s)),
        FieldValue::Null => Ok(None),
        other => Err(FunctionError::type_mismatch(
            name,
            "a string",
            other.type_name(),
        )),
    }
}

pub fn upper() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new("upper", FunctionType::String, "string", "Uppercase a string")
            .with_aliases(&["ucase"]),
        |_, args| {
            Ok(match string_arg("upper", &args[0])? {
                Some(s) => FieldValue::String(s.to_uppercase()),
                None => FieldValue::Null,
            })
        },
    ))
}

pub fn lower() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new("lower", FunctionType::String, "string", "Lowercase a string")
            .with_aliases(&["lcase"]),
        |_, args| {
            Ok(match string_arg("lower", &args[0])? {
                Some(s) => FieldValue::String(s.to_lowercase()),
                None => FieldValue::Null,
            })
        },
    ))
}

pub fn length() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new(
            "length",
            FunctionType::String,
            "string",
            "Number of characters in a string",
        )
        .with_aliases(&["len"]),
        |_, args| {
            Ok(match string_arg("length", &args[0])? {
                Some(s) => FieldValue::Integer(s.chars().count() as i64),
                None => FieldValue::Null,
            })
        },
    ))
}

pub fn trim() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new(
            "trim",
            FunctionType::String,
            "string",
            "Strip leading and trailing whitespace",
        ),
        |_, args| {
            Ok(match string_arg("trim", &args[0])? {
                Some(s) => FieldValue::String(s.trim().to_string()),
                None => FieldValue::Null,
            })
        },
    ))
}

pub fn concat() -> Arc<dyn Function> {
    Arc::new(ScalarFunction::new(
        FunctionMeta::new(
            "concat",
            FunctionType::String,
            "string",
            "Concatenate all arguments; null if any argument is null",
        )
        .with_arity(1, None),
        |_, args| {
            let mut out = String::new();
            for arg in args {
                if arg.is_null() {
                    return Ok(FieldValue::Null);
                }
                out.push_str(&arg.to_string());
            }
            Ok(FieldValue::String(out))
        },
    ))
}
