//! Legacy adapter graph integration tests: wrapping registered functions
//! for the narrower new/add/result consumer contract.

use streamfn::streamfn::adapter::{
    create_aggregator_from_functions, create_analytic_from_functions, LegacyValue,
};
use streamfn::streamfn::registry;
use streamfn::streamfn::types::FieldValue;
use streamfn::streamfn::{FunctionError, FunctionType};

#[test]
fn test_aggregator_adapter_for_builtin_reducer() {
    let adapter = create_aggregator_from_functions("SUM").unwrap();
    assert_eq!(adapter.function_name(), "sum");

    let mut instance = adapter.new_instance();
    instance.add(&FieldValue::Integer(2));
    instance.add(&FieldValue::Integer(40));
    assert_eq!(instance.result(), FieldValue::Integer(42));

    instance.reset();
    assert_eq!(instance.result(), FieldValue::Null);
}

#[test]
fn test_aggregator_adapter_over_analytic_keeps_lag_semantics() {
    let adapter = create_aggregator_from_functions("lag").unwrap();
    let mut instance = adapter.new_instance();
    assert!(matches!(instance, LegacyValue::Analytic(_)));

    instance.add(&FieldValue::Integer(10));
    instance.add(&FieldValue::Integer(20));
    // Reading stays one step behind the newest input.
    assert_eq!(instance.result(), FieldValue::Integer(10));
    instance.add(&FieldValue::Integer(30));
    assert_eq!(instance.result(), FieldValue::Integer(20));
}

#[test]
fn test_analytic_adapter_row_at_a_time() {
    let mut latest = create_analytic_from_functions("latest").unwrap();
    assert_eq!(
        latest.execute(&[FieldValue::Integer(7)]).unwrap(),
        FieldValue::Integer(7)
    );
    assert_eq!(
        latest.execute(&[FieldValue::Null]).unwrap(),
        FieldValue::Integer(7)
    );

    latest.reset();
    assert_eq!(
        latest.execute(&[FieldValue::Null]).unwrap(),
        FieldValue::Null
    );
}

#[test]
fn test_analytic_adapter_clone_is_independent() {
    let mut original = create_analytic_from_functions("had_changed").unwrap();
    original.execute(&[FieldValue::Integer(1)]).unwrap();

    let mut clone = original.clone();
    // Same remembered state at the point of cloning.
    assert_eq!(
        clone.execute(&[FieldValue::Integer(1)]).unwrap(),
        FieldValue::Boolean(false)
    );
    // Diverging afterwards.
    assert_eq!(
        original.execute(&[FieldValue::Integer(2)]).unwrap(),
        FieldValue::Boolean(true)
    );
    assert_eq!(
        clone.execute(&[FieldValue::Integer(1)]).unwrap(),
        FieldValue::Boolean(false)
    );
}

#[test]
fn test_unknown_name_is_a_typed_error() {
    let err = create_aggregator_from_functions("no_such_function").unwrap_err();
    assert!(matches!(err, FunctionError::UnknownFunction { .. }));
}

#[test]
fn test_scalar_function_is_not_aggregate() {
    let err = create_aggregator_from_functions("upper").unwrap_err();
    assert!(matches!(err, FunctionError::NotAggregate { .. }));
}

#[test]
fn test_reducer_is_not_analytic() {
    let err = create_analytic_from_functions("sum").unwrap_err();
    assert!(matches!(err, FunctionError::NotAnalytic { .. }));
}

#[test]
fn test_factories_follow_custom_analytic_lifecycle() {
    let registry = registry::global();
    registry
        .register_custom(
            "adapter_it_marker",
            FunctionType::Aggregation,
            "custom",
            "",
            1,
            Some(1),
            |_, _| Ok(FieldValue::Null),
        )
        .unwrap();

    // Registration installed a factory, but register_custom produces a
    // stateless function; invoking the factory reports the capability gap.
    let err = create_aggregator_from_functions("adapter_it_marker").unwrap_err();
    assert!(matches!(err, FunctionError::NotAggregate { .. }));

    // Unregistration removes the factory and the name.
    registry.unregister("adapter_it_marker");
    let err = create_aggregator_from_functions("adapter_it_marker").unwrap_err();
    assert!(matches!(err, FunctionError::UnknownFunction { .. }));
}
