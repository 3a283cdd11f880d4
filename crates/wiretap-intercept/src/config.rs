//! Interception configuration.

use std::fmt;

use wiretap_core::{FaultResult, Value};

use crate::overrides::OverrideRegistry;

/// Configuration for one intercepted object.
///
/// The registries are shared handles: overrides registered through a clone
/// kept by the caller take effect on the object built from this config.
pub struct InterceptConfig<T> {
    /// Track completion of deferred results and report it (default: true).
    pub resolve_promises: bool,
    /// Method overrides, keyed by member name.
    pub method_overrides: OverrideRegistry<T>,
    /// Read overrides, keyed by member name.
    pub getter_overrides: OverrideRegistry<T>,
    /// Write overrides, keyed by member name.
    pub setter_overrides: OverrideRegistry<T>,
}

impl<T> InterceptConfig<T> {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable deferred completion tracking.
    pub fn with_resolve_promises(mut self, enabled: bool) -> Self {
        self.resolve_promises = enabled;
        self
    }

    /// Add a method override.
    pub fn with_method_override<F>(self, name: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(&str, &T, &[Value]) -> FaultResult<Value> + Send + Sync + 'static,
    {
        self.method_overrides.register(name, implementation);
        self
    }

    /// Add a read override.
    pub fn with_getter_override<F>(self, name: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(&str, &T, &[Value]) -> FaultResult<Value> + Send + Sync + 'static,
    {
        self.getter_overrides.register(name, implementation);
        self
    }

    /// Add a write override. The assigned value arrives as the only argument.
    pub fn with_setter_override<F>(self, name: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(&str, &T, &[Value]) -> FaultResult<Value> + Send + Sync + 'static,
    {
        self.setter_overrides.register(name, implementation);
        self
    }

    /// Use a caller-owned method registry.
    pub fn with_method_overrides(mut self, registry: OverrideRegistry<T>) -> Self {
        self.method_overrides = registry;
        self
    }

    /// Use a caller-owned read registry.
    pub fn with_getter_overrides(mut self, registry: OverrideRegistry<T>) -> Self {
        self.getter_overrides = registry;
        self
    }

    /// Use a caller-owned write registry.
    pub fn with_setter_overrides(mut self, registry: OverrideRegistry<T>) -> Self {
        self.setter_overrides = registry;
        self
    }
}

impl<T> Default for InterceptConfig<T> {
    fn default() -> Self {
        Self {
            resolve_promises: true,
            method_overrides: OverrideRegistry::new(),
            getter_overrides: OverrideRegistry::new(),
            setter_overrides: OverrideRegistry::new(),
        }
    }
}

impl<T> Clone for InterceptConfig<T> {
    fn clone(&self) -> Self {
        Self {
            resolve_promises: self.resolve_promises,
            method_overrides: self.method_overrides.clone(),
            getter_overrides: self.getter_overrides.clone(),
            setter_overrides: self.setter_overrides.clone(),
        }
    }
}

impl<T> fmt::Debug for InterceptConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptConfig")
            .field("resolve_promises", &self.resolve_promises)
            .field("method_overrides", &self.method_overrides)
            .field("getter_overrides", &self.getter_overrides)
            .field("setter_overrides", &self.setter_overrides)
            .finish()
    }
}
