//! Wiretap Observability
//!
//! This crate defines what the interception layer reports and who receives
//! it:
//!
//! - [`CallRecord`]: metadata for one intercepted operation
//! - [`CallObserver`]: the receiving side, implemented by any closure
//! - [`ObserverDispatcher`]: fan-out to several observers
//! - [`LoggingObserver`] and [`CollectingObserver`]: ready-made observers
//!
//! # Observer Isolation
//!
//! Observers run inside the call they observe. [`notify_isolated`] contains
//! observer panics so an observer can never change the value or fault that
//! the caller of an intercepted member receives.
//!
//! # Collecting Records
//!
//! ```ignore
//! use std::sync::Arc;
//! use wiretap_observe::{CallObserver, CollectingObserver, ObserverDispatcher};
//!
//! let collector = Arc::new(CollectingObserver::new(1_000));
//! let dispatcher = ObserverDispatcher::new();
//! dispatcher.subscribe(Arc::clone(&collector) as Arc<dyn CallObserver>);
//!
//! // ... hand the dispatcher to an intercepted object ...
//!
//! for record in collector.records() {
//!     println!("{} took {:?}", record.method_name, record.duration);
//! }
//! ```

pub mod observer;
pub mod record;

// Re-export main types
pub use observer::{
    CallObserver, CollectingObserver, LoggingObserver, ObserverDispatcher, notify_isolated,
};
pub use record::{CallId, CallRecord, CallType};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::observer::{CallObserver, CollectingObserver, ObserverDispatcher};
    pub use crate::record::{CallRecord, CallType};
}
