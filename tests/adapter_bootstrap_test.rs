//! Adapter factory installation ordering.
//!
//! Installing a factory before the global function registry has ever been
//! touched, then invoking it, is the legacy consumer's natural startup
//! sequence: the first invocation triggers registry initialization, whose
//! registration events re-enter the adapter constructor registry. Kept as
//! its own test binary so the global registry is still cold here.

use streamfn::streamfn::adapter::{
    get_aggregator_adapter, get_analytic_adapter, register_aggregator_adapter,
    register_analytic_adapter,
};
use streamfn::streamfn::types::FieldValue;

#[test]
fn test_factory_installed_before_first_registry_access() {
    register_aggregator_adapter("sum");
    register_analytic_adapter("lag");

    let adapter = get_aggregator_adapter("sum").expect("sum factory should resolve");
    let mut instance = adapter.new_instance();
    instance.add(&FieldValue::Integer(1));
    instance.add(&FieldValue::Integer(2));
    assert_eq!(instance.result(), FieldValue::Integer(3));

    let mut lag = get_analytic_adapter("lag").expect("lag factory should resolve");
    assert_eq!(lag.execute(&[FieldValue::Integer(7)]).unwrap(), FieldValue::Null);
    assert_eq!(
        lag.execute(&[FieldValue::Integer(8)]).unwrap(),
        FieldValue::Integer(7)
    );
}
