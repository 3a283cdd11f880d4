//! Wiretap Intercept - The Interception Engine
//!
//! This crate turns a [`Target`](wiretap_core::Target) into an
//! [`InterceptedObject`] that behaves like the target while reporting a
//! [`CallRecord`](wiretap_observe::CallRecord) for every method call,
//! instrumented read and instrumented write.
//!
//! The pipeline for one call:
//!
//! 1. [`OverrideResolver`] picks the implementation: a caller override, an
//!    accessor the target already had, or the target's own method
//! 2. [`measure`] runs it and captures result, fault and timing
//! 3. [`complete`] reports the record, and when the result is deferred,
//!    reports it again once it settles
//! 4. the caller receives exactly what the implementation produced
//!
//! Plain data properties and meta-operations (`keys`, `has`, `delete`) are
//! passed through without producing records.

pub mod completion;
pub mod config;
pub mod measure;
pub mod overrides;
pub mod proxy;

// Re-export main types
pub use completion::{complete, handle_deferred, track_completion};
pub use config::InterceptConfig;
pub use measure::{measure, measure_override};
pub use overrides::{Override, OverrideRegistry, OverrideResolver, Resolved};
pub use proxy::{InstrumentedMethod, InterceptedObject, Member};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::InterceptConfig;
    pub use crate::overrides::{Override, OverrideRegistry};
    pub use crate::proxy::{InstrumentedMethod, InterceptedObject, Member};
}
