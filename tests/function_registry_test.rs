//! Registry-level integration tests: resolution, catalog output, events and
//! the legacy constructor registry staying in sync.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use streamfn::streamfn::adapter;
use streamfn::streamfn::registry::{self, catalog, FunctionRegistry};
use streamfn::streamfn::types::{FieldValue, FunctionContext};
use streamfn::streamfn::{Function, FunctionError, FunctionType, RegistryEvent};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_builtin_resolution_is_case_insensitive() {
    init();
    let registry = registry::global();
    for name in ["sum", "SUM", "Sum", "sUm"] {
        let function = registry.get(name).unwrap();
        assert_eq!(function.meta().name, "sum");
    }
}

#[test]
fn test_aliases_resolve_to_the_same_function() {
    let registry = registry::global();
    let pairs = [
        ("avg", "mean"),
        ("ceil", "ceiling"),
        ("upper", "ucase"),
        ("lower", "lcase"),
        ("length", "len"),
        ("power", "pow"),
        ("var", "var_pop"),
        ("vars", "var_samp"),
        ("vars", "variance"),
        ("stddev", "stddev_pop"),
        ("stddevs", "stddev_samp"),
    ];
    for (primary, alias) in pairs {
        let a = registry.get(primary).unwrap();
        let b = registry.get(alias).unwrap();
        assert!(
            Arc::ptr_eq(&a, &b),
            "'{}' and '{}' should resolve to the same entry",
            primary,
            alias
        );
    }
}

#[test]
fn test_unknown_name_is_absent_not_fatal() {
    let registry = registry::global();
    assert!(registry.get("no_such_function").is_none());
    assert!(!registry.contains("no_such_function"));
    assert!(!catalog::is_valid_function("no_such_function"));
}

#[test]
fn test_capability_probes() {
    assert!(catalog::is_aggregate_function("sum"));
    assert!(!catalog::is_aggregate_function("upper"));
    // The predicate reads the type tag; lag is Analytical even though it
    // also speaks the aggregation protocol.
    assert!(!catalog::is_aggregate_function("lag"));
    assert!(registry::global()
        .get("lag")
        .unwrap()
        .as_aggregate()
        .is_some());

    assert!(catalog::is_analytic_function("lag"));
    assert!(catalog::is_analytic_function("latest"));
    assert!(!catalog::is_analytic_function("count"));
}

#[test]
fn test_catalog_markdown_lists_every_type_section() {
    let markdown = catalog::generate_function_catalog();
    for section in [
        "## Aggregation Functions",
        "## Analytical Functions",
        "## Window Functions",
        "## Math Functions",
        "## String Functions",
        "## Conversion Functions",
    ] {
        assert!(
            markdown.contains(section),
            "catalog is missing '{}'",
            section
        );
    }
    assert!(markdown.contains("sum"));
    assert!(markdown.contains("lag"));
}

#[test]
fn test_prefix_search_includes_aliases() {
    let names = catalog::find_functions_by_prefix("var");
    assert!(names.contains(&"var".to_string()));
    assert!(names.contains(&"var_pop".to_string()));
    assert!(names.contains(&"var_samp".to_string()));
    assert!(names.contains(&"variance".to_string()));
}

#[test]
fn test_register_custom_scalar_round_trip() {
    let registry = registry::global();
    registry
        .register_custom(
            "registry_it_double",
            FunctionType::Custom,
            "custom",
            "Doubles a numeric argument",
            1,
            Some(1),
            |_ctx, args| match args[0].as_f64() {
                Some(v) => Ok(FieldValue::Float(v * 2.0)),
                None => Ok(FieldValue::Null),
            },
        )
        .unwrap();

    let function = registry.get("REGISTRY_IT_DOUBLE").unwrap();
    let ctx = FunctionContext::new();
    assert_eq!(
        function.execute(&ctx, &[FieldValue::Integer(21)]).unwrap(),
        FieldValue::Float(42.0)
    );

    assert!(registry.unregister("registry_it_double"));
    assert!(registry.get("registry_it_double").is_none());
}

#[test]
fn test_conflicting_registration_is_all_or_nothing() {
    let registry = FunctionRegistry::new();
    registry
        .register_custom(
            "first",
            FunctionType::Custom,
            "custom",
            "",
            1,
            Some(1),
            |_, _| Ok(FieldValue::Null),
        )
        .unwrap();

    // Second registration collides on an alias; neither its primary name nor
    // the non-conflicting alias may land.
    let meta = streamfn::streamfn::FunctionMeta::new(
        "second",
        FunctionType::Custom,
        "custom",
        "",
    )
    .with_aliases(&["second_alias", "first"]);
    let err = registry
        .register(Arc::new(streamfn::streamfn::ScalarFunction::new(
            meta,
            |_, _| Ok(FieldValue::Null),
        )))
        .unwrap_err();
    assert!(matches!(err, FunctionError::RegistrationConflict { .. }));
    assert!(registry.get("second").is_none());
    assert!(registry.get("second_alias").is_none());
}

#[test]
fn test_unregister_removes_aliases_and_type_bucket() {
    let registry = FunctionRegistry::new();
    let meta = streamfn::streamfn::FunctionMeta::new(
        "gone",
        FunctionType::Custom,
        "custom",
        "",
    )
    .with_aliases(&["gone_alias"]);
    registry
        .register(Arc::new(streamfn::streamfn::ScalarFunction::new(
            meta,
            |_, _| Ok(FieldValue::Null),
        )))
        .unwrap();

    assert!(registry.unregister("gone_alias"));
    assert!(registry.get("gone").is_none());
    assert!(registry.get("gone_alias").is_none());
    assert!(registry.get_by_type(FunctionType::Custom).is_empty());
    assert!(!registry.unregister("gone"));
}

#[test]
fn test_events_fire_for_register_and_unregister() {
    let registry = FunctionRegistry::new();
    static REGISTERED: AtomicUsize = AtomicUsize::new(0);
    static UNREGISTERED: AtomicUsize = AtomicUsize::new(0);
    registry.subscribe(Box::new(|event| match event {
        RegistryEvent::Registered { .. } => {
            REGISTERED.fetch_add(1, Ordering::SeqCst);
        }
        RegistryEvent::Unregistered { .. } => {
            UNREGISTERED.fetch_add(1, Ordering::SeqCst);
        }
    }));

    registry
        .register_custom(
            "observed",
            FunctionType::Custom,
            "custom",
            "",
            1,
            Some(1),
            |_, _| Ok(FieldValue::Null),
        )
        .unwrap();
    registry.unregister("observed");

    assert_eq!(REGISTERED.load(Ordering::SeqCst), 1);
    assert_eq!(UNREGISTERED.load(Ordering::SeqCst), 1);
}

#[test]
fn test_global_registry_installs_adapter_factories() {
    // Touch the global registry first so the built-in inventory has been
    // collected and the adapter listener attached.
    let _ = registry::global();

    let sum = adapter::get_aggregator_adapter("sum").unwrap();
    assert_eq!(sum.function_name(), "sum");

    // Analytical functions get both factory kinds.
    assert!(adapter::get_analytic_adapter("lag").is_some());
    assert!(adapter::get_aggregator_adapter("lag").is_some());

    // Scalar functions get none.
    assert!(adapter::get_aggregator_adapter("upper").is_none());
}
