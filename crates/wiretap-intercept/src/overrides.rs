//! Override registration and resolution.
//!
//! An override replaces the implementation that runs for one member name. It
//! receives `(member_name, target, args)` and is measured and observed exactly
//! like the member it replaces.
//!
//! Three independent registries exist, one per call type. The
//! [`OverrideResolver`] decides what actually runs for a `(name, call_type)`
//! pair, in this order:
//!
//! 1. an override registered by the caller
//! 2. for reads and writes, a default override forwarding to an accessor the
//!    target already had when it was wrapped
//! 3. for method calls, the target's own method
//!
//! Anything else is passed through to the target uninstrumented.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use wiretap_core::{Descriptor, FaultResult, Target, Value};
use wiretap_observe::CallType;

/// A replacement implementation: `(member_name, target, args) -> result`.
pub type Override<T> = Arc<dyn Fn(&str, &T, &[Value]) -> FaultResult<Value> + Send + Sync>;

/// A shared, concurrently readable map from member name to override.
///
/// Clones of a registry share their entries. An intercepted object built from
/// a registry sees overrides registered through any clone on its next call.
pub struct OverrideRegistry<T> {
    entries: Arc<DashMap<String, Override<T>>>,
}

impl<T> OverrideRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Register an override, returning the one it replaced.
    pub fn register<F>(&self, name: impl Into<String>, implementation: F) -> Option<Override<T>>
    where
        F: Fn(&str, &T, &[Value]) -> FaultResult<Value> + Send + Sync + 'static,
    {
        self.register_shared(name, Arc::new(implementation))
    }

    /// Register an already shared override.
    pub fn register_shared(
        &self,
        name: impl Into<String>,
        implementation: Override<T>,
    ) -> Option<Override<T>> {
        let name = name.into();
        debug!(member = %name, "Registered override");
        self.entries.insert(name, implementation)
    }

    /// Remove an override.
    pub fn remove(&self, name: &str) -> Option<Override<T>> {
        self.entries.remove(name).map(|(_, implementation)| implementation)
    }

    /// Get an override by name.
    pub fn get(&self, name: &str) -> Option<Override<T>> {
        // Cloned out so no shard lock is held while the override runs.
        self.entries.get(name).map(|r| Arc::clone(r.value()))
    }

    /// Check if an override is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Get the number of overrides.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get all registered names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Check if both handles share the same entries.
    pub fn shares_entries_with(&self, other: &OverrideRegistry<T>) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl<T> Default for OverrideRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for OverrideRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T> fmt::Debug for OverrideRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideRegistry")
            .field("overrides", &self.names())
            .finish()
    }
}

/// Outcome of override resolution.
pub enum Resolved<T> {
    /// A caller-registered override.
    Override(Override<T>),
    /// A default override forwarding to an accessor of the wrapped target.
    Accessor(Override<T>),
    /// The target's own method.
    Original(Override<T>),
    /// Nothing to instrument.
    PassThrough,
}

impl<T> Resolved<T> {
    /// The implementation to run under measurement, if any.
    pub fn into_implementation(self) -> Option<Override<T>> {
        match self {
            Resolved::Override(f) | Resolved::Accessor(f) | Resolved::Original(f) => Some(f),
            Resolved::PassThrough => None,
        }
    }

    /// Short name of where the implementation came from.
    pub fn source(&self) -> &'static str {
        match self {
            Resolved::Override(_) => "override",
            Resolved::Accessor(_) => "accessor",
            Resolved::Original(_) => "original",
            Resolved::PassThrough => "pass_through",
        }
    }

    /// Check if the operation is instrumented.
    pub fn is_instrumented(&self) -> bool {
        !matches!(self, Resolved::PassThrough)
    }
}

impl<T> fmt::Debug for Resolved<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resolved({})", self.source())
    }
}

/// Picks the implementation that runs for a member and call type.
pub struct OverrideResolver<T> {
    methods: OverrideRegistry<T>,
    getters: OverrideRegistry<T>,
    setters: OverrideRegistry<T>,
    accessor_getters: HashMap<String, Override<T>>,
    accessor_setters: HashMap<String, Override<T>>,
}

impl<T: Target> OverrideResolver<T> {
    /// Create a resolver for `target`.
    ///
    /// The target's accessor properties are inspected once, here. Accessors
    /// added to the target later are not instrumented.
    pub fn new(
        target: &T,
        methods: OverrideRegistry<T>,
        getters: OverrideRegistry<T>,
        setters: OverrideRegistry<T>,
    ) -> Self {
        let mut accessor_getters: HashMap<String, Override<T>> = HashMap::new();
        let mut accessor_setters: HashMap<String, Override<T>> = HashMap::new();

        for (name, getter, setter) in target.accessors() {
            if let Some(getter) = getter {
                let forward: Override<T> =
                    Arc::new(move |_: &str, target: &T, _: &[Value]| getter(target));
                accessor_getters.insert(name.clone(), forward);
            }
            if let Some(setter) = setter {
                let forward: Override<T> = Arc::new(
                    move |_: &str, target: &T, args: &[Value]| -> FaultResult<Value> {
                        setter(target, args.first().cloned().unwrap_or_default())?;
                        Ok(Value::Undefined)
                    },
                );
                accessor_setters.insert(name, forward);
            }
        }

        debug!(
            accessor_getters = accessor_getters.len(),
            accessor_setters = accessor_setters.len(),
            "Synthesized accessor overrides"
        );

        Self {
            methods,
            getters,
            setters,
            accessor_getters,
            accessor_setters,
        }
    }

    /// Resolve what runs for `name` under `call_type`.
    pub fn resolve(&self, name: &str, call_type: CallType, target: &T) -> Resolved<T> {
        match call_type {
            CallType::Method => {
                if let Some(f) = self.methods.get(name) {
                    return Resolved::Override(f);
                }
                match target.descriptor(name) {
                    Some(Descriptor::Method(method)) => Resolved::Original(Arc::new(
                        move |_: &str, target: &T, args: &[Value]| method(target, args),
                    )),
                    _ => Resolved::PassThrough,
                }
            }
            CallType::Get => Self::pick(&self.getters, &self.accessor_getters, name),
            CallType::Set => Self::pick(&self.setters, &self.accessor_setters, name),
        }
    }

    fn pick(
        registry: &OverrideRegistry<T>,
        accessors: &HashMap<String, Override<T>>,
        name: &str,
    ) -> Resolved<T> {
        if let Some(f) = registry.get(name) {
            Resolved::Override(f)
        } else if let Some(f) = accessors.get(name) {
            Resolved::Accessor(Arc::clone(f))
        } else {
            Resolved::PassThrough
        }
    }

    /// The caller-owned method registry.
    pub fn method_overrides(&self) -> &OverrideRegistry<T> {
        &self.methods
    }

    /// The caller-owned getter registry.
    pub fn getter_overrides(&self) -> &OverrideRegistry<T> {
        &self.getters
    }

    /// The caller-owned setter registry.
    pub fn setter_overrides(&self) -> &OverrideRegistry<T> {
        &self.setters
    }

    /// Names of accessors found on the target at construction.
    pub fn accessor_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .accessor_getters
            .keys()
            .chain(self.accessor_setters.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl<T> fmt::Debug for OverrideResolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideResolver")
            .field("methods", &self.methods)
            .field("getters", &self.getters)
            .field("setters", &self.setters)
            .field("accessor_getters", &self.accessor_getters.len())
            .field("accessor_setters", &self.accessor_setters.len())
            .finish()
    }
}
