//! Call records.

use std::fmt;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wiretap_core::{Fault, FaultResult, Value};

/// Unique identifier for one physical call.
///
/// The synchronous notification and the later completion notification of the
/// same call carry the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(Uuid);

impl CallId {
    /// Create a new random call ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of intercepted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    /// A method invocation.
    Method,
    /// A property read.
    Get,
    /// A property write.
    Set,
}

impl CallType {
    /// Lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Method => "method",
            CallType::Get => "get",
            CallType::Set => "set",
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata describing one intercepted operation.
///
/// A record is delivered to observers synchronously once. When its result is
/// a deferred value that is being tracked (`resolved_promise`), the same
/// record is updated in place when that value settles and delivered again.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    /// Call identifier.
    pub id: CallId,
    /// Name of the intercepted member.
    pub method_name: String,
    /// Positional arguments. `[value]` for writes, empty for reads.
    pub arguments: Vec<Value>,
    /// Kind of operation.
    pub call_type: CallType,
    /// Milliseconds since the Unix epoch, taken right before execution.
    pub start: u64,
    /// Monotonic start, used to recompute the duration on completion.
    #[serde(skip)]
    pub started_at: Instant,
    /// Elapsed time. Synchronous portion first, settle time after completion.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    /// Whether the call threw or its deferred result rejected.
    pub failed: bool,
    /// Whether completion of a deferred result is being tracked.
    pub resolved_promise: bool,
    /// Returned value, or the fulfilled value after completion.
    pub result: Option<Value>,
    /// Thrown or rejected fault.
    pub error: Option<Fault>,
}

impl CallRecord {
    /// Create a record for a call that is about to start.
    pub fn begin(
        method_name: impl Into<String>,
        call_type: CallType,
        arguments: Vec<Value>,
    ) -> Self {
        Self {
            id: CallId::new(),
            method_name: method_name.into(),
            arguments,
            call_type,
            start: epoch_millis(),
            started_at: Instant::now(),
            duration: Duration::ZERO,
            failed: false,
            resolved_promise: false,
            result: None,
            error: None,
        }
    }

    /// Store the outcome of the call and stamp the elapsed time.
    pub fn finish(&mut self, outcome: FaultResult<Value>) {
        match outcome {
            Ok(value) => {
                self.result = Some(value);
                self.error = None;
                self.failed = false;
            }
            Err(fault) => {
                self.result = None;
                self.error = Some(fault);
                self.failed = true;
            }
        }
        self.duration = self.started_at.elapsed();
    }

    /// What the caller sees: the result, or the fault to re-throw.
    pub fn outcome(&self) -> FaultResult<Value> {
        match (&self.error, &self.result) {
            (Some(fault), _) if self.failed => Err(fault.clone()),
            (_, Some(value)) => Ok(value.clone()),
            _ => Ok(Value::Undefined),
        }
    }

    /// The result, if it is a deferred value.
    pub fn deferred_result(&self) -> Option<&wiretap_core::Deferred> {
        self.result.as_ref().and_then(Value::as_deferred)
    }

    /// JSON representation.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Serialize a Duration as whole milliseconds.
mod duration_millis {
    use serde::{Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }
}
