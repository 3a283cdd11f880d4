//! Error types for Wiretap.
//!
//! Two families live here. [`Fault`] is the value a member "throws": it is
//! what a method, accessor or override returns in its `Err` arm, and what the
//! interception layer hands back to the caller unchanged. [`ObjectError`]
//! reports misuse of the built-in [`Object`](crate::object::Object) type.

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::value::Value;

/// The kind of a [`Fault`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FaultKind {
    /// A fault raised by user code.
    #[error("{0}")]
    Raised(String),

    /// A member that is not callable was invoked.
    #[error("'{0}' is not a function")]
    NotCallable(String),

    /// An accessor property without a setter was assigned.
    #[error("cannot assign to '{0}': property has a getter but no setter")]
    ReadOnly(String),

    /// A deferred value was resolved with itself.
    #[error("deferred value cannot be resolved with itself")]
    DeferredCycle,
}

impl FaultKind {
    /// Short machine-readable name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            FaultKind::Raised(_) => "raised",
            FaultKind::NotCallable(_) => "not_callable",
            FaultKind::ReadOnly(_) => "read_only",
            FaultKind::DeferredCycle => "deferred_cycle",
        }
    }
}

struct FaultInner {
    kind: FaultKind,
    payload: Option<Value>,
}

/// A thrown or rejected value.
///
/// `Fault` is reference counted: cloning it yields the *same* fault, and
/// [`Fault::ptr_eq`] tells whether two handles share identity. The
/// interception layer relies on this to surface exactly the fault the wrapped
/// member produced.
///
/// # Example
///
/// ```
/// use wiretap_core::Fault;
///
/// let fault = Fault::new("something went wrong");
/// let rethrown = fault.clone();
///
/// assert!(fault.ptr_eq(&rethrown));
/// assert_eq!(fault.message(), "something went wrong");
/// ```
#[derive(Clone)]
pub struct Fault(Arc<FaultInner>);

impl Fault {
    /// Create a user fault with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_kind(FaultKind::Raised(message.into()))
    }

    /// Create a user fault carrying an additional value.
    pub fn with_payload(message: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self(Arc::new(FaultInner {
            kind: FaultKind::Raised(message.into()),
            payload: Some(payload.into()),
        }))
    }

    /// Create a fault of the given kind.
    pub fn from_kind(kind: FaultKind) -> Self {
        Self(Arc::new(FaultInner {
            kind,
            payload: None,
        }))
    }

    /// Fault for invoking a member that is not callable.
    pub fn not_callable(member: impl Into<String>) -> Self {
        Self::from_kind(FaultKind::NotCallable(member.into()))
    }

    /// Fault for assigning a getter-only accessor.
    pub fn read_only(member: impl Into<String>) -> Self {
        Self::from_kind(FaultKind::ReadOnly(member.into()))
    }

    /// The fault kind.
    pub fn kind(&self) -> &FaultKind {
        &self.0.kind
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        self.0.kind.to_string()
    }

    /// Attached payload, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.0.payload.as_ref()
    }

    /// Whether both handles refer to the same fault.
    pub fn ptr_eq(&self, other: &Fault) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.kind)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("kind", &self.0.kind)
            .field("payload", &self.0.payload)
            .finish()
    }
}

impl std::error::Error for Fault {}

/// Faults compare by identity.
impl PartialEq for Fault {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl From<FaultKind> for Fault {
    fn from(kind: FaultKind) -> Self {
        Self::from_kind(kind)
    }
}

impl Serialize for Fault {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("kind", self.0.kind.name())?;
        map.serialize_entry("message", &self.message())?;
        map.serialize_entry("payload", &self.0.payload)?;
        map.end()
    }
}

/// Errors raised while building an [`Object`](crate::object::Object).
#[derive(Debug, Error)]
pub enum ObjectError {
    /// The same property name was defined twice.
    #[error("Property already defined: {0}")]
    DuplicateProperty(String),
}

/// Result of anything that may throw.
pub type FaultResult<T> = std::result::Result<T, Fault>;

/// Result type for object construction.
pub type ObjectResult<T> = std::result::Result<T, ObjectError>;
