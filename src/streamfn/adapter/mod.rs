//! Legacy adapter graph.
//!
//! Bridges the rich [`Function`]-based catalog to an older, narrower
//! consumer contract (`new/add/result` with a dynamically-dispatched value).
//! Three adapter kinds exist:
//!
//! - [`AggregatorAdapter`] - wraps any aggregate-capable function; its
//!   instances come back as [`LegacyValue`], a closed sum type enumerating
//!   every legacy-compatible shape instead of an open dynamic type.
//! - [`AnalyticAdapter`] - wraps an analytical function behind a row-at-a-
//!   time `execute/reset/clone` contract with a private per-instance
//!   context.
//! - [`AnalyticAggregatorAdapter`] - adapts an analytical function into the
//!   accumulate/reduce shape; its `result` reads the uniform
//!   [`AnalyticFunction::peek_state`] accessor, so no per-function special
//!   cases are needed.
//!
//! A process-wide, lock-protected constructor registry associates names with
//! zero-argument adapter factories. The function registry's event stream
//! installs a factory for every aggregation/analytical function as it is
//! registered (see [`registry_listener`]), so legacy consumers never depend
//! on the richer interface.

use crate::streamfn::error::{FunctionError, FunctionResult};
use crate::streamfn::function::{AggregateFunction, AnalyticFunction, Function};
use crate::streamfn::registry::{self, FunctionType, RegistryEvent, RegistryListener};
use crate::streamfn::types::{FieldValue, FunctionContext};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

/// The closed set of value shapes the legacy consumer can receive from
/// [`AggregatorAdapter::new_instance`]. Matching on this enum replaces the
/// old dynamic type assertions.
pub enum LegacyValue {
    /// A live reducer instance.
    Aggregate(Box<dyn AggregateFunction>),
    /// A live analytical instance (lag/latest/... driven as an accumulator).
    Analytic(Box<dyn AnalyticFunction>),
}

impl LegacyValue {
    /// Contribute one value (`Add` in the legacy contract).
    pub fn add(&mut self, value: &FieldValue) {
        match self {
            LegacyValue::Aggregate(acc) => acc.add(value),
            LegacyValue::Analytic(inst) => inst.add(value),
        }
    }

    /// Read the current value (`Result` in the legacy contract).
    pub fn result(&self) -> FieldValue {
        match self {
            LegacyValue::Aggregate(acc) => acc.result(),
            LegacyValue::Analytic(inst) => inst.peek_state(),
        }
    }

    /// Return to the fresh state.
    pub fn reset(&mut self) {
        match self {
            LegacyValue::Aggregate(acc) => acc.reset(),
            LegacyValue::Analytic(inst) => inst.reset(),
        }
    }
}

impl std::fmt::Debug for LegacyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LegacyValue::Aggregate(_) => f.write_str("LegacyValue::Aggregate"),
            LegacyValue::Analytic(_) => f.write_str("LegacyValue::Analytic"),
        }
    }
}

/// Wraps an aggregate-capable function for the legacy `new/add/result`
/// consumer.
pub struct AggregatorAdapter {
    name: String,
    analytic: Option<Box<dyn AnalyticFunction>>,
    template: Box<dyn AggregateFunction>,
}

impl std::fmt::Debug for AggregatorAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregatorAdapter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}


impl AggregatorAdapter {
    /// Wrap a registered function, failing if it has no aggregate
    /// capability.
    pub fn try_new(name: &str, function: Arc<dyn Function>) -> FunctionResult<Self> {
        let Some(template) = function.as_aggregate() else {
            return Err(FunctionError::NotAggregate {
                name: name.to_string(),
            });
        };
        Ok(Self {
            name: name.to_lowercase(),
            analytic: function.as_analytic().map(|a| a.fresh_analytic()),
            template: template.fresh(),
        })
    }

    /// Look a function up in a registry and wrap it.
    pub fn from_registry(
        registry: &registry::FunctionRegistry,
        name: &str,
    ) -> FunctionResult<Self> {
        let function = registry.get(name).ok_or_else(|| FunctionError::UnknownFunction {
            name: name.to_string(),
        })?;
        Self::try_new(name, function)
    }

    /// Create an isolated instance for one group/window/key.
    pub fn new_instance(&self) -> LegacyValue {
        match &self.analytic {
            Some(analytic) => LegacyValue::Analytic(analytic.fresh_analytic()),
            None => LegacyValue::Aggregate(self.template.fresh()),
        }
    }

    /// Name of the wrapped function, for callers that special-case certain
    /// names (window-position functions, for example).
    pub fn function_name(&self) -> &str {
        &self.name
    }
}

/// Wraps an analytical function behind the legacy row-at-a-time contract.
///
/// Holds a private per-instance context; the wrapped instance carries all
/// row history.
pub struct AnalyticAdapter {
    name: String,
    instance: Box<dyn AnalyticFunction>,
    ctx: FunctionContext,
}

impl std::fmt::Debug for AnalyticAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticAdapter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl AnalyticAdapter {
    pub fn try_new(name: &str, function: Arc<dyn Function>) -> FunctionResult<Self> {
        let Some(analytic) = function.as_analytic() else {
            return Err(FunctionError::NotAnalytic {
                name: name.to_string(),
            });
        };
        Ok(Self {
            name: name.to_lowercase(),
            instance: analytic.fresh_analytic(),
            ctx: FunctionContext::new(),
        })
    }

    pub fn from_registry(
        registry: &registry::FunctionRegistry,
        name: &str,
    ) -> FunctionResult<Self> {
        let function = registry.get(name).ok_or_else(|| FunctionError::UnknownFunction {
            name: name.to_string(),
        })?;
        Self::try_new(name, function)
    }

    /// Evaluate for one row using the private context.
    pub fn execute(&mut self, args: &[FieldValue]) -> FunctionResult<FieldValue> {
        self.instance.execute_row(&self.ctx, args)
    }

    /// Discard all remembered rows.
    pub fn reset(&mut self) {
        self.instance.reset();
    }

    pub fn function_name(&self) -> &str {
        &self.name
    }
}

impl Clone for AnalyticAdapter {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            instance: self.instance.snapshot_analytic(),
            ctx: self.ctx.clone(),
        }
    }
}

/// Adapts an analytical function into the accumulate/reduce shape for use
/// inside aggregation pipelines.
pub struct AnalyticAggregatorAdapter {
    name: String,
    instance: Box<dyn AnalyticFunction>,
}

impl AnalyticAggregatorAdapter {
    pub fn try_new(name: &str, function: Arc<dyn Function>) -> FunctionResult<Self> {
        let Some(analytic) = function.as_analytic() else {
            return Err(FunctionError::NotAnalytic {
                name: name.to_string(),
            });
        };
        Ok(Self {
            name: name.to_lowercase(),
            instance: analytic.fresh_analytic(),
        })
    }

    pub fn from_registry(
        registry: &registry::FunctionRegistry,
        name: &str,
    ) -> FunctionResult<Self> {
        let function = registry.get(name).ok_or_else(|| FunctionError::UnknownFunction {
            name: name.to_string(),
        })?;
        Self::try_new(name, function)
    }

    /// Delegates to the wrapped function's native `add`.
    pub fn add(&mut self, value: &FieldValue) {
        self.instance.add(value);
    }

    /// Reads the remembered state through the uniform accessor.
    pub fn result(&self) -> FieldValue {
        self.instance.peek_state()
    }

    pub fn reset(&mut self) {
        self.instance.reset();
    }

    pub fn function_name(&self) -> &str {
        &self.name
    }
}

impl Clone for AnalyticAggregatorAdapter {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            instance: self.instance.snapshot_analytic(),
        }
    }
}

type AggregatorFactory = Arc<dyn Fn() -> Option<AggregatorAdapter> + Send + Sync>;
type AnalyticFactory = Arc<dyn Fn() -> Option<AnalyticAdapter> + Send + Sync>;

/// Process-wide constructor registry: name -> zero-argument adapter factory.
///
/// Factories resolve the underlying function at invocation time, so a
/// factory installed before (or after) the function itself simply returns
/// `None` until the name resolves. Factories are stored behind `Arc` and
/// invoked only after the map guard is dropped: a factory's lookup can
/// trigger first-access initialization of the global function registry,
/// whose registration events re-enter this registry with a write.
pub struct AdapterRegistry {
    aggregators: RwLock<HashMap<String, AggregatorFactory>>,
    analytics: RwLock<HashMap<String, AnalyticFactory>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            aggregators: RwLock::new(HashMap::new()),
            analytics: RwLock::new(HashMap::new()),
        }
    }

    /// Install an aggregator adapter factory for `name`.
    pub fn register_aggregator(&self, name: &str) {
        let key = name.to_lowercase();
        let lookup = key.clone();
        self.aggregators
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(
                key,
                Arc::new(move || {
                    AggregatorAdapter::from_registry(registry::global(), &lookup).ok()
                }),
            );
    }

    /// Install an analytical adapter factory for `name`.
    pub fn register_analytic(&self, name: &str) {
        let key = name.to_lowercase();
        let lookup = key.clone();
        self.analytics
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(
                key,
                Arc::new(move || {
                    AnalyticAdapter::from_registry(registry::global(), &lookup).ok()
                }),
            );
    }

    /// Invoke the factory for `name`, absent if no factory is installed or
    /// the underlying function is gone.
    ///
    /// The factory runs after the guard is dropped; invoking it under the
    /// read lock would deadlock when the lookup re-enters through the
    /// registration events (see the type-level docs).
    pub fn get_aggregator(&self, name: &str) -> Option<AggregatorAdapter> {
        let factory = {
            let factories = self.aggregators.read().unwrap_or_else(|p| p.into_inner());
            factories.get(&name.to_lowercase()).cloned()
        };
        factory.and_then(|f| f())
    }

    pub fn get_analytic(&self, name: &str) -> Option<AnalyticAdapter> {
        let factory = {
            let factories = self.analytics.read().unwrap_or_else(|p| p.into_inner());
            factories.get(&name.to_lowercase()).cloned()
        };
        factory.and_then(|f| f())
    }

    /// Drop any factories for `name` (both kinds).
    pub fn remove(&self, name: &str) {
        let key = name.to_lowercase();
        self.aggregators
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&key);
        self.analytics
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&key);
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide adapter constructor registry.
pub fn global_adapters() -> &'static AdapterRegistry {
    static GLOBAL: LazyLock<AdapterRegistry> = LazyLock::new(AdapterRegistry::new);
    &GLOBAL
}

/// Install an aggregator adapter factory in the global constructor registry.
pub fn register_aggregator_adapter(name: &str) {
    global_adapters().register_aggregator(name);
}

/// Install an analytical adapter factory in the global constructor registry.
pub fn register_analytic_adapter(name: &str) {
    global_adapters().register_analytic(name);
}

/// Invoke the global factory for `name`.
pub fn get_aggregator_adapter(name: &str) -> Option<AggregatorAdapter> {
    global_adapters().get_aggregator(name)
}

/// Invoke the global factory for `name`.
pub fn get_analytic_adapter(name: &str) -> Option<AnalyticAdapter> {
    global_adapters().get_analytic(name)
}

/// Build an aggregator adapter for a registered function, consulting the
/// constructor registry first and falling back to direct construction.
///
/// An unrecognized or non-aggregate name is a typed error, never an abort.
pub fn create_aggregator_from_functions(name: &str) -> FunctionResult<AggregatorAdapter> {
    if let Some(adapter) = get_aggregator_adapter(name) {
        return Ok(adapter);
    }
    AggregatorAdapter::from_registry(registry::global(), name)
}

/// Build an analytical adapter for a registered function, consulting the
/// constructor registry first and falling back to direct construction.
pub fn create_analytic_from_functions(name: &str) -> FunctionResult<AnalyticAdapter> {
    if let Some(adapter) = get_analytic_adapter(name) {
        return Ok(adapter);
    }
    AnalyticAdapter::from_registry(registry::global(), name)
}

/// The registry subscriber that keeps the constructor registry in step with
/// the function registry: every aggregation function gets an aggregator
/// adapter factory, every analytical function gets both an analytical and an
/// aggregator factory, and unregistration removes them again.
pub fn registry_listener() -> RegistryListener {
    Box::new(|event| match event {
        RegistryEvent::Registered {
            name,
            function_type,
        } => match function_type {
            FunctionType::Aggregation => {
                log::debug!("installing aggregator adapter factory for '{}'", name);
                register_aggregator_adapter(name);
            }
            FunctionType::Analytical => {
                log::debug!("installing analytic adapter factories for '{}'", name);
                register_analytic_adapter(name);
                register_aggregator_adapter(name);
            }
            _ => {}
        },
        RegistryEvent::Unregistered { name } => {
            global_adapters().remove(name);
        }
    })
}
