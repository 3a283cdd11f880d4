//! Measured execution.

use wiretap_core::{FaultResult, Value};
use wiretap_observe::{CallRecord, CallType};

use crate::overrides::Override;

/// Run `body` with `arguments` and capture what happened in a record.
///
/// Faults returned by `body` are stored on the record, never propagated.
/// The duration covers the synchronous portion of the call only.
pub fn measure<F>(
    method_name: &str,
    call_type: CallType,
    arguments: Vec<Value>,
    body: F,
) -> CallRecord
where
    F: FnOnce(&[Value]) -> FaultResult<Value>,
{
    let mut record = CallRecord::begin(method_name, call_type, arguments);
    let outcome = body(&record.arguments);
    record.finish(outcome);
    record
}

/// Run an override against `target` under measurement.
pub fn measure_override<T>(
    implementation: &Override<T>,
    method_name: &str,
    call_type: CallType,
    target: &T,
    arguments: Vec<Value>,
) -> CallRecord {
    measure(method_name, call_type, arguments, |args| {
        implementation(method_name, target, args)
    })
}
