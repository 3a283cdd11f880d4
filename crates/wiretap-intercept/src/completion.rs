//! Delivery of call records, including deferred completion.
//!
//! Every intercepted call is reported synchronously, before its result is
//! handed back to the caller. When the result is a [`Deferred`] value and
//! tracking is enabled, the record is flagged with `resolved_promise`, and
//! once the value settles the same record is updated and reported again:
//!
//! - fulfilled: `result` becomes the fulfilled value
//! - rejected: `result` is cleared, `error` holds the fault, `failed` is set
//!
//! In both cases `duration` is recomputed to span start to settlement. The
//! caller always receives the original deferred value, never a derived one.

use std::sync::Arc;

use tracing::trace;

use wiretap_core::{Deferred, FaultResult, Value};
use wiretap_observe::{CallObserver, CallRecord, notify_isolated};

/// Engage completion tracking when the record's result is deferred.
///
/// Sets `resolved_promise` and returns the deferred value to follow, or
/// `None` when the result is not deferred.
pub fn handle_deferred(record: &mut CallRecord) -> Option<Deferred> {
    let deferred = record.deferred_result()?.clone();
    record.resolved_promise = true;
    Some(deferred)
}

/// Update `record` when `deferred` settles and hand it to `notify`.
pub fn track_completion<N>(deferred: &Deferred, mut record: CallRecord, notify: N)
where
    N: FnOnce(&CallRecord) + Send + 'static,
{
    deferred.on_settle(move |outcome| {
        record.finish(outcome);
        trace!(
            call_id = %record.id,
            member = %record.method_name,
            failed = record.failed,
            "Deferred call completed"
        );
        notify(&record);
    });
}

/// Report a measured call and return what its caller receives.
///
/// The returned outcome is the call's own result or fault, untouched by
/// anything the observer does.
///
/// The completion report for a deferred value that is already settled is
/// scheduled onto the current Tokio runtime, and on a current-thread runtime
/// it arrives strictly after this function returns. Without a runtime it is
/// delivered inline, before this function returns.
pub fn complete(
    mut record: CallRecord,
    resolve_promises: bool,
    observer: Arc<dyn CallObserver>,
) -> FaultResult<Value> {
    let outcome = record.outcome();
    let tracked = if resolve_promises {
        handle_deferred(&mut record)
    } else {
        None
    };

    notify_isolated(observer.as_ref(), &record);

    if let Some(deferred) = tracked {
        trace!(
            call_id = %record.id,
            member = %record.method_name,
            "Tracking deferred result"
        );
        track_completion(&deferred, record, move |record| {
            notify_isolated(observer.as_ref(), record);
        });
    }

    outcome
}
