//! # Wiretap - Transparent Call Instrumentation
//!
//! Wiretap wraps an object and reports what happens to it: every method
//! call, and every read or write that goes through an accessor or override,
//! produces a [`CallRecord`] with timing, arguments, result and failure.
//! The wrapper behaves exactly like the object it wraps.
//!
//! ## Features
//!
//! - **Transparent**: same return values, same faults, same identity
//! - **Deferred-aware**: results that settle later are reported again on settlement
//! - **Overrides**: replace the implementation of any member, still measured
//! - **Isolated observers**: a panicking observer never affects the caller
//!
//! ## Quick Start
//!
//! ```ignore
//! use wiretap::prelude::*;
//!
//! let object = Object::builder()
//!     .value("value", 1)
//!     .method("method", |this, _| this.get("value"))
//!     .build()?;
//!
//! let proxied = Wiretap::builder(object)
//!     .with_observer(|record: &CallRecord| {
//!         println!("{} took {:?}", record.method_name, record.duration);
//!     })
//!     .build()?;
//!
//! assert_eq!(proxied.invoke("method", vec![])?, Value::from(1));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Your Application                     │
//! ├─────────────────────────────────────────────────────────┤
//! │                    wiretap (facade)                     │
//! │                  ┌──────────────────┐                   │
//! │                  │ Wiretap Builder  │                   │
//! │                  └────────┬─────────┘                   │
//! │                           │                             │
//! │  ┌──────────────┬─────────┴─────────┬────────────────┐  │
//! │  │ wiretap-core │ wiretap-intercept │ wiretap-observe│  │
//! │  │ (values,     │ (resolver,        │ (records,      │  │
//! │  │  deferred,   │  measurer,        │  observers)    │  │
//! │  │  targets)    │  proxy)           │                │  │
//! │  └──────────────┴───────────────────┴────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::debug;
use wiretap_core::{FaultResult, ObjectError, Target, Value};
use wiretap_intercept::{InterceptConfig, InterceptedObject, OverrideRegistry};
use wiretap_observe::{CallObserver, LoggingObserver, ObserverDispatcher};

// Re-export from sub-crates
pub use wiretap_core;
pub use wiretap_intercept;
pub use wiretap_observe;

pub use wiretap_core::{Deferred, Fault, Object};
pub use wiretap_intercept::Member;
pub use wiretap_observe::{CallRecord, CallType};

/// Wrap `target`, reporting every intercepted call to `observer`.
///
/// `None` uses the default configuration: deferred completion tracking on,
/// no overrides.
pub fn create_intercepted_object<T: Target>(
    target: T,
    observer: Arc<dyn CallObserver>,
    config: Option<InterceptConfig<T>>,
) -> InterceptedObject<T> {
    InterceptedObject::new(Arc::new(target), observer, config.unwrap_or_default())
}

/// Main entry point for Wiretap.
pub struct Wiretap;

impl Wiretap {
    /// Create a builder wrapping `target`.
    pub fn builder<T: Target>(target: T) -> WiretapBuilder<T> {
        WiretapBuilder::new(Arc::new(target))
    }

    /// Create a builder wrapping an already shared target.
    pub fn builder_shared<T: Target>(target: Arc<T>) -> WiretapBuilder<T> {
        WiretapBuilder::new(target)
    }
}

/// Builder for an intercepted object.
pub struct WiretapBuilder<T> {
    target: Arc<T>,
    observers: Vec<Arc<dyn CallObserver>>,
    config: InterceptConfig<T>,
}

impl<T: Target> WiretapBuilder<T> {
    /// Create a new builder with default configuration.
    pub fn new(target: Arc<T>) -> Self {
        Self {
            target,
            observers: Vec::new(),
            config: InterceptConfig::default(),
        }
    }

    // Observers

    /// Add an observer.
    pub fn with_observer<O: CallObserver + 'static>(self, observer: O) -> Self {
        self.with_shared_observer(Arc::new(observer))
    }

    /// Add an already shared observer.
    pub fn with_shared_observer(mut self, observer: Arc<dyn CallObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Add a [`LoggingObserver`].
    pub fn with_logging(self, include_values: bool) -> Self {
        self.with_observer(LoggingObserver::new().with_values(include_values))
    }

    // Configuration

    /// Enable or disable deferred completion tracking.
    pub fn with_resolve_promises(mut self, enabled: bool) -> Self {
        self.config = self.config.with_resolve_promises(enabled);
        self
    }

    /// Add a method override.
    pub fn with_method_override<F>(mut self, name: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(&str, &T, &[Value]) -> FaultResult<Value> + Send + Sync + 'static,
    {
        self.config = self.config.with_method_override(name, implementation);
        self
    }

    /// Add a read override.
    pub fn with_getter_override<F>(mut self, name: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(&str, &T, &[Value]) -> FaultResult<Value> + Send + Sync + 'static,
    {
        self.config = self.config.with_getter_override(name, implementation);
        self
    }

    /// Add a write override.
    pub fn with_setter_override<F>(mut self, name: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(&str, &T, &[Value]) -> FaultResult<Value> + Send + Sync + 'static,
    {
        self.config = self.config.with_setter_override(name, implementation);
        self
    }

    /// Use a caller-owned method registry.
    pub fn with_method_overrides(mut self, registry: OverrideRegistry<T>) -> Self {
        self.config = self.config.with_method_overrides(registry);
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: InterceptConfig<T>) -> Self {
        self.config = config;
        self
    }

    /// Build the intercepted object.
    ///
    /// Several observers are fanned out through an [`ObserverDispatcher`].
    pub fn build(self) -> WiretapResult<InterceptedObject<T>> {
        let observer: Arc<dyn CallObserver> = match self.observers.len() {
            0 => return Err(WiretapError::MissingObserver),
            1 => self
                .observers
                .into_iter()
                .next()
                .ok_or(WiretapError::MissingObserver)?,
            count => {
                debug!(observers = count, "Fanning out to observers");
                let dispatcher = ObserverDispatcher::new();
                for observer in self.observers {
                    dispatcher.subscribe(observer);
                }
                Arc::new(dispatcher)
            }
        };

        Ok(InterceptedObject::new(self.target, observer, self.config))
    }
}

impl<T> std::fmt::Debug for WiretapBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WiretapBuilder")
            .field("observers", &self.observers.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Errors from Wiretap.
#[derive(Debug, thiserror::Error)]
pub enum WiretapError {
    /// No observer was registered on the builder.
    #[error("No observer registered")]
    MissingObserver,

    /// Object construction error.
    #[error("Object error: {0}")]
    Object(#[from] ObjectError),
}

/// Result type for Wiretap operations.
pub type WiretapResult<T> = Result<T, WiretapError>;

/// Prelude module for convenient imports.
pub mod prelude {
    // Main types
    pub use crate::{
        Wiretap, WiretapBuilder, WiretapError, WiretapResult, create_intercepted_object,
    };

    // Core types
    pub use wiretap_core::{
        Deferred, Descriptor, Fault, FaultKind, FaultResult, Object, ObjectBuilder, Settlement,
        Target, Value,
    };

    // Interception types
    pub use wiretap_intercept::{
        InstrumentedMethod, InterceptConfig, InterceptedObject, Member, OverrideRegistry,
    };

    // Observability types
    pub use wiretap_observe::{
        CallObserver, CallRecord, CallType, CollectingObserver, LoggingObserver,
        ObserverDispatcher,
    };

    // Common std types
    pub use std::sync::Arc;
}
