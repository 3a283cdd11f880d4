//! Observers of call records.
//!
//! An observer is the external sink for [`CallRecord`]s. Observers are
//! isolated from the calls they watch: a panicking observer is contained by
//! [`notify_isolated`] and never changes what the caller of the intercepted
//! member sees.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::record::{CallRecord, CallType};

/// Receiver of call records.
///
/// Any `Fn(&CallRecord) + Send + Sync` closure is an observer.
pub trait CallObserver: Send + Sync {
    /// Called for every delivered record.
    fn on_call(&self, record: &CallRecord);

    /// Call types this observer is interested in.
    /// Returns `None` to receive all records.
    fn call_types(&self) -> Option<Vec<CallType>> {
        None
    }
}

impl<F> CallObserver for F
where
    F: Fn(&CallRecord) + Send + Sync,
{
    fn on_call(&self, record: &CallRecord) {
        self(record)
    }
}

/// Deliver `record` to `observer`, swallowing any panic it raises.
///
/// Records filtered out by [`CallObserver::call_types`] are not delivered.
/// Returns `false` if the observer panicked.
pub fn notify_isolated(observer: &dyn CallObserver, record: &CallRecord) -> bool {
    if let Some(types) = observer.call_types() {
        if !types.contains(&record.call_type) {
            return true;
        }
    }
    catch_unwind(AssertUnwindSafe(|| observer.on_call(record))).is_ok()
}

/// An observer that logs every record through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver {
    /// Include arguments and results in the log line.
    pub include_values: bool,
}

impl LoggingObserver {
    /// Create a new logging observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include arguments and results in log lines.
    pub fn with_values(mut self, enabled: bool) -> Self {
        self.include_values = enabled;
        self
    }
}

impl CallObserver for LoggingObserver {
    fn on_call(&self, record: &CallRecord) {
        let duration_ms = record.duration.as_millis() as u64;

        if record.failed {
            let error = record
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            tracing::warn!(
                call_id = %record.id,
                member = %record.method_name,
                call_type = %record.call_type,
                deferred = record.resolved_promise,
                duration_ms,
                error = %error,
                "Intercepted call failed"
            );
        } else if self.include_values {
            let arguments = serde_json::to_string(&record.arguments).unwrap_or_default();
            let result = record
                .result
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            tracing::debug!(
                call_id = %record.id,
                member = %record.method_name,
                call_type = %record.call_type,
                deferred = record.resolved_promise,
                duration_ms,
                arguments = %arguments,
                result = %result,
                "Intercepted call"
            );
        } else {
            tracing::trace!(
                call_id = %record.id,
                member = %record.method_name,
                call_type = %record.call_type,
                deferred = record.resolved_promise,
                duration_ms,
                "Intercepted call"
            );
        }
    }
}

/// An observer that keeps delivered records in memory.
pub struct CollectingObserver {
    records: RwLock<Vec<CallRecord>>,
    max_records: usize,
}

impl CollectingObserver {
    /// Create a collector that keeps at most `max_records` records.
    pub fn new(max_records: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            max_records,
        }
    }

    /// Get collected records, in delivery order.
    pub fn records(&self) -> Vec<CallRecord> {
        self.records.read().clone()
    }

    /// Get the most recently delivered record.
    pub fn last(&self) -> Option<CallRecord> {
        self.records.read().last().cloned()
    }

    /// Get records for one member.
    pub fn for_member(&self, name: &str) -> Vec<CallRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.method_name == name)
            .cloned()
            .collect()
    }

    /// Clear collected records.
    pub fn clear(&self) {
        self.records.write().clear();
    }

    /// Get record count.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for CollectingObserver {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl CallObserver for CollectingObserver {
    fn on_call(&self, record: &CallRecord) {
        let mut records = self.records.write();
        if records.len() < self.max_records {
            records.push(record.clone());
        }
    }
}

impl std::fmt::Debug for CollectingObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectingObserver")
            .field("len", &self.len())
            .field("max_records", &self.max_records)
            .finish()
    }
}

/// Fans records out to several observers.
///
/// Each observer is isolated from the others: one panicking observer does not
/// prevent delivery to the rest.
#[derive(Default)]
pub struct ObserverDispatcher {
    observers: RwLock<Vec<Arc<dyn CallObserver>>>,
}

impl ObserverDispatcher {
    /// Create a new dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer.
    pub fn subscribe(&self, observer: Arc<dyn CallObserver>) {
        self.observers.write().push(observer);
    }

    /// Remove all observers.
    pub fn clear_observers(&self) {
        self.observers.write().clear();
    }

    /// Get observer count.
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Deliver a record to all observers.
    pub fn dispatch(&self, record: &CallRecord) {
        let observers = self.observers.read().clone();
        for observer in &observers {
            notify_isolated(observer.as_ref(), record);
        }
    }
}

impl CallObserver for ObserverDispatcher {
    fn on_call(&self, record: &CallRecord) {
        self.dispatch(record);
    }
}

impl std::fmt::Debug for ObserverDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverDispatcher")
            .field("observer_count", &self.observer_count())
            .finish()
    }
}
