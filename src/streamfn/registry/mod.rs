//! Concurrency-safe function registry.
//!
//! Maps lowercase name/alias to a registered [`Function`], grouped by
//! [`FunctionType`]. The registry is constructor-injectable for tests, with
//! a process-wide default instance behind [`global`] that is populated from
//! the built-in function inventory on first access.
//!
//! Mutations (`register`, `unregister`) take the write lock; reads take the
//! read lock. Locks are held only across map access - no function body ever
//! executes under the registry lock. Registration emits a [`RegistryEvent`]
//! to subscribers after the lock is released; the adapter layer subscribes
//! to install legacy adapter factories for aggregation and analytical
//! functions, making that coupling an explicit, observable step.

pub mod catalog;
pub mod metadata;

pub use metadata::{FunctionMeta, FunctionType};

use crate::streamfn::error::{FunctionError, FunctionResult};
use crate::streamfn::function::{Function, ScalarFunction};
use crate::streamfn::types::{FieldValue, FunctionContext};
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Notification emitted after a successful registry mutation.
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// A function (and all its aliases) was inserted.
    Registered {
        name: String,
        function_type: FunctionType,
    },
    /// A function (and all its aliases) was removed.
    Unregistered { name: String },
}

/// Subscriber callback for registry events.
pub type RegistryListener = Box<dyn Fn(&RegistryEvent) + Send + Sync>;

type SharedListener = Arc<dyn Fn(&RegistryEvent) + Send + Sync>;

#[derive(Default)]
struct RegistryInner {
    /// lowercase name/alias -> function
    by_name: FxHashMap<String, Arc<dyn Function>>,
    /// type tag -> registration-ordered function list
    by_type: HashMap<FunctionType, Vec<Arc<dyn Function>>>,
}

/// Concurrency-safe store of registered functions.
pub struct FunctionRegistry {
    inner: RwLock<RegistryInner>,
    listeners: RwLock<Vec<SharedListener>>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Subscribe to registration events. Listeners run synchronously after
    /// the mutation, outside the registry lock.
    pub fn subscribe(&self, listener: RegistryListener) {
        self.listeners
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .push(Arc::from(listener));
    }

    /// Listeners are invoked on a snapshot taken under the lock, so a
    /// listener may itself call `subscribe` without deadlocking. Listeners
    /// added during emission see the next event, not the current one.
    fn emit(&self, event: RegistryEvent) {
        let snapshot: Vec<SharedListener> = self
            .listeners
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .map(Arc::clone)
            .collect();
        for listener in snapshot {
            listener(&event);
        }
    }

    /// Register a function under its primary name and every alias.
    ///
    /// Insertion is all-or-nothing: if any name collides with an existing
    /// entry, the registry is left untouched and a
    /// [`FunctionError::RegistrationConflict`] is returned.
    pub fn register(&self, function: Arc<dyn Function>) -> FunctionResult<()> {
        let meta = function.meta();
        let names = meta.all_names();
        let primary = meta.name.clone();
        let function_type = meta.function_type;

        {
            let mut inner = self.write();
            if let Some(taken) = names.iter().find(|n| inner.by_name.contains_key(*n)) {
                return Err(FunctionError::RegistrationConflict {
                    name: taken.clone(),
                });
            }
            for name in &names {
                inner.by_name.insert(name.clone(), Arc::clone(&function));
            }
            inner
                .by_type
                .entry(function_type)
                .or_default()
                .push(function);
        }

        log::debug!(
            "registered function '{}' ({}) with {} alias(es)",
            primary,
            function_type,
            names.len() - 1
        );
        self.emit(RegistryEvent::Registered {
            name: primary,
            function_type,
        });
        Ok(())
    }

    /// Case-insensitive lookup by name or alias.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.read().by_name.get(&name.to_lowercase()).cloned()
    }

    /// Whether a name or alias resolves.
    pub fn contains(&self, name: &str) -> bool {
        self.read().by_name.contains_key(&name.to_lowercase())
    }

    /// Snapshot of the functions registered under a type tag. The returned
    /// list does not reflect later mutations.
    pub fn get_by_type(&self, function_type: FunctionType) -> Vec<Arc<dyn Function>> {
        self.read()
            .by_type
            .get(&function_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Defensive copy of the full name -> function mapping (aliases
    /// included) .
    pub fn list_all(&self) -> HashMap<String, Arc<dyn Function>> {
        self.read()
            .by_name
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect()
    }

    /// Remove a function by any of its names.
    ///
    /// Resolves `name` to its function, then removes the primary name, every
    /// alias, and the type-bucket entry. Returns whether anything was
    /// removed.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = {
            let mut inner = self.write();
            let Some(function) = inner.by_name.get(&name.to_lowercase()).cloned() else {
                return false;
            };
            let meta = function.meta();
            let primary = meta.name.clone();
            for n in meta.all_names() {
                inner.by_name.remove(&n);
            }
            if let Some(bucket) = inner.by_type.get_mut(&meta.function_type) {
                bucket.retain(|f| !Arc::ptr_eq(f, &function));
            }
            primary
        };

        log::debug!("unregistered function '{}'", removed);
        self.emit(RegistryEvent::Unregistered { name: removed });
        true
    }

    /// Register an ad-hoc stateless function from a closure.
    pub fn register_custom(
        &self,
        name: &str,
        function_type: FunctionType,
        category: &str,
        description: &str,
        min_args: usize,
        max_args: Option<usize>,
        body: impl Fn(&FunctionContext, &[FieldValue]) -> FunctionResult<FieldValue>
            + Send
            + Sync
            + 'static,
    ) -> FunctionResult<()> {
        let meta = FunctionMeta::new(name, function_type, category, description)
            .with_arity(min_args, max_args);
        self.register(Arc::new(ScalarFunction::new(meta, body)))
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry in the built-in function inventory.
///
/// Built-ins self-register at compile time through
/// [`register_builtin_function!`](crate::register_builtin_function); the
/// global registry collects them on first access.
pub struct BuiltinFunction {
    /// Primary name, for startup diagnostics only
    pub name: &'static str,
    /// Zero-argument constructor for the registered template
    pub ctor: fn() -> Arc<dyn Function>,
}

inventory::collect!(BuiltinFunction);

/// Declare a built-in function for collection into the global registry.
///
/// # Example
/// ```rust,ignore
/// register_builtin_function!(name: "abs", ctor: crate::streamfn::builtin::math::abs);
/// ```
#[macro_export]
macro_rules! register_builtin_function {
    (name: $name:expr, ctor: $ctor:path) => {
        inventory::submit! {
            $crate::streamfn::registry::BuiltinFunction {
                name: $name,
                ctor: $ctor,
            }
        }
    };
}

/// Process-wide default registry.
///
/// On first access, subscribes the legacy adapter installer and registers
/// every function in the built-in inventory. Built-ins that collide (which
/// would indicate a duplicate inventory entry) are skipped with a warning
/// rather than aborting startup.
pub fn global() -> &'static FunctionRegistry {
    static GLOBAL: LazyLock<FunctionRegistry> = LazyLock::new(|| {
        let registry = FunctionRegistry::new();
        registry.subscribe(crate::streamfn::adapter::registry_listener());
        for builtin in inventory::iter::<BuiltinFunction> {
            if let Err(err) = registry.register((builtin.ctor)()) {
                log::warn!("skipping built-in function '{}': {}", builtin.name, err);
            }
        }
        registry
    });
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scalar(name: &str, aliases: &[&str]) -> Arc<dyn Function> {
        let meta = FunctionMeta::new(name, FunctionType::Custom, "test", "test function")
            .with_aliases(aliases);
        Arc::new(ScalarFunction::new(meta, |_, args| {
            Ok(args.first().cloned().unwrap_or(FieldValue::Null))
        }))
    }

    #[test]
    fn test_case_insensitive_get() {
        let registry = FunctionRegistry::new();
        registry.register(scalar("echo", &[])).unwrap();
        assert!(registry.get("ECHO").is_some());
        assert!(registry.get("Echo").is_some());
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_register_conflict_is_atomic() {
        let registry = FunctionRegistry::new();
        registry.register(scalar("first", &["shared"])).unwrap();

        let err = registry
            .register(scalar("second", &["unique", "shared"]))
            .unwrap_err();
        assert!(matches!(err, FunctionError::RegistrationConflict { .. }));

        // Nothing from the failed registration may be visible.
        assert!(registry.get("second").is_none());
        assert!(registry.get("unique").is_none());
        assert!(registry.get("shared").is_some());
    }

    #[test]
    fn test_unregister_cascades_aliases() {
        let registry = FunctionRegistry::new();
        registry.register(scalar("total", &["tot", "sum_of"])).unwrap();

        assert!(registry.unregister("tot"));
        assert!(registry.get("total").is_none());
        assert!(registry.get("tot").is_none());
        assert!(registry.get("sum_of").is_none());
        assert!(registry.get_by_type(FunctionType::Custom).is_empty());
        assert!(!registry.unregister("total"));
    }

    #[test]
    fn test_events_fire_after_mutation() {
        static REGISTERED: AtomicUsize = AtomicUsize::new(0);
        static UNREGISTERED: AtomicUsize = AtomicUsize::new(0);

        let registry = FunctionRegistry::new();
        registry.subscribe(Box::new(|event| match event {
            RegistryEvent::Registered { .. } => {
                REGISTERED.fetch_add(1, Ordering::SeqCst);
            }
            RegistryEvent::Unregistered { .. } => {
                UNREGISTERED.fetch_add(1, Ordering::SeqCst);
            }
        }));

        registry.register(scalar("observed", &[])).unwrap();
        assert_eq!(REGISTERED.load(Ordering::SeqCst), 1);

        // A failed registration must not emit.
        let _ = registry.register(scalar("observed", &[]));
        assert_eq!(REGISTERED.load(Ordering::SeqCst), 1);

        registry.unregister("observed");
        assert_eq!(UNREGISTERED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_may_subscribe_during_emission() {
        static LATE: AtomicUsize = AtomicUsize::new(0);

        let registry = Arc::new(FunctionRegistry::new());
        let inner = Arc::clone(&registry);
        registry.subscribe(Box::new(move |event| {
            if matches!(event, RegistryEvent::Registered { .. }) {
                inner.subscribe(Box::new(|_| {
                    LATE.fetch_add(1, Ordering::SeqCst);
                }));
            }
        }));

        // The registration event subscribes a second listener; it must see
        // the following event, not the current one.
        registry.register(scalar("chained", &[])).unwrap();
        assert_eq!(LATE.load(Ordering::SeqCst), 0);

        registry.unregister("chained");
        assert_eq!(LATE.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_register_custom_round_trip() {
        let registry = FunctionRegistry::new();
        registry
            .register_custom(
                "double",
                FunctionType::Custom,
                "test",
                "double a number",
                1,
                Some(1),
                |_, args| match args[0].as_f64() {
                    Some(f) => Ok(FieldValue::Float(f * 2.0)),
                    None => Ok(FieldValue::Null),
                },
            )
            .unwrap();

        let f = registry.get("double").unwrap();
        let out = f
            .execute(&FunctionContext::new(), &[FieldValue::Integer(21)])
            .unwrap();
        assert_eq!(out, FieldValue::Float(42.0));
    }
}
