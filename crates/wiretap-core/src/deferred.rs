//! Deferred values.
//!
//! A [`Deferred`] is a result that is not available yet. It is settled exactly
//! once through its [`Resolver`], either fulfilled with a [`Value`] or rejected
//! with a [`Fault`], and never changes afterwards.
//!
//! Two ways exist to learn about the outcome:
//!
//! - [`Deferred::on_settle`] registers a completion callback. Callbacks
//!   registered while pending run when the value settles. Callbacks registered
//!   after settlement are scheduled onto the current Tokio runtime, so they
//!   run on a later turn rather than inside the registering call. Without a
//!   runtime they run inline.
//! - `Deferred` implements [`Future`], so holders can simply `.await` it.
//!
//! ```ignore
//! use wiretap_core::{Deferred, Value};
//!
//! let (deferred, resolver) = Deferred::new();
//! deferred.on_settle(|outcome| println!("settled: {outcome:?}"));
//! resolver.resolve(Value::from(42));
//!
//! assert_eq!(deferred.await?, Value::from(42));
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use parking_lot::Mutex;
use tracing::trace;

use crate::error::{Fault, FaultKind, FaultResult};
use crate::value::Value;

type Reaction = Box<dyn FnOnce(FaultResult<Value>) + Send>;

enum State {
    Pending {
        reactions: Vec<Reaction>,
        wakers: Vec<Waker>,
    },
    Settled(FaultResult<Value>),
}

struct Shared {
    state: Mutex<State>,
}

impl Shared {
    fn settle(&self, outcome: FaultResult<Value>) {
        let (reactions, wakers) = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, State::Settled(outcome.clone())) {
                State::Pending { reactions, wakers } => (reactions, wakers),
                settled @ State::Settled(_) => {
                    // First settlement wins.
                    *state = settled;
                    return;
                }
            }
        };

        trace!(
            fulfilled = outcome.is_ok(),
            reactions = reactions.len(),
            "Deferred value settled"
        );

        for reaction in reactions {
            reaction(outcome.clone());
        }
        for waker in wakers {
            waker.wake();
        }
    }
}

/// Snapshot of a deferred value's state.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Not settled yet.
    Pending,
    /// Fulfilled with a value.
    Fulfilled(Value),
    /// Rejected with a fault.
    Rejected(Fault),
}

impl Settlement {
    /// Name of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Settlement::Pending => "pending",
            Settlement::Fulfilled(_) => "fulfilled",
            Settlement::Rejected(_) => "rejected",
        }
    }

    /// Check if settled.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Settlement::Pending)
    }
}

/// Handle to a value that settles later.
///
/// Cloning yields another handle to the same deferred value.
#[derive(Clone)]
pub struct Deferred {
    shared: Arc<Shared>,
}

impl Deferred {
    /// Create a pending deferred value and the resolver that settles it.
    pub fn new() -> (Deferred, Resolver) {
        let shared = Arc::new(Shared {
            state: Mutex::new(State::Pending {
                reactions: Vec::new(),
                wakers: Vec::new(),
            }),
        });
        (
            Deferred {
                shared: Arc::clone(&shared),
            },
            Resolver { shared },
        )
    }

    /// A deferred value fulfilled with `value`.
    ///
    /// A deferred `value` is adopted, as with [`Resolver::resolve`].
    pub fn fulfilled(value: impl Into<Value>) -> Deferred {
        let (deferred, resolver) = Deferred::new();
        resolver.resolve(value.into());
        deferred
    }

    /// A deferred value rejected with `fault`.
    pub fn rejected(fault: Fault) -> Deferred {
        let (deferred, resolver) = Deferred::new();
        resolver.reject(fault);
        deferred
    }

    /// Resolve an arbitrary value into a deferred one.
    ///
    /// A deferred value resolves to itself, keeping its identity. Anything
    /// else becomes a new fulfilled deferred value.
    pub fn resolve(value: Value) -> Deferred {
        match value {
            Value::Deferred(deferred) => deferred,
            other => Deferred::fulfilled(other),
        }
    }

    /// Run `future` on the current Tokio runtime and settle with its output.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, like [`tokio::spawn`].
    pub fn spawn<F>(future: F) -> Deferred
    where
        F: Future<Output = FaultResult<Value>> + Send + 'static,
    {
        let (deferred, resolver) = Deferred::new();
        tokio::spawn(async move {
            resolver.settle(future.await);
        });
        deferred
    }

    /// Current state.
    pub fn state(&self) -> Settlement {
        match &*self.shared.state.lock() {
            State::Pending { .. } => Settlement::Pending,
            State::Settled(Ok(value)) => Settlement::Fulfilled(value.clone()),
            State::Settled(Err(fault)) => Settlement::Rejected(fault.clone()),
        }
    }

    /// Check if not yet settled.
    pub fn is_pending(&self) -> bool {
        matches!(&*self.shared.state.lock(), State::Pending { .. })
    }

    /// Whether both handles refer to the same deferred value.
    pub fn ptr_eq(&self, other: &Deferred) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Register a completion callback.
    pub fn on_settle<F>(&self, callback: F)
    where
        F: FnOnce(FaultResult<Value>) + Send + 'static,
    {
        let outcome = {
            let mut state = self.shared.state.lock();
            match &mut *state {
                State::Pending { reactions, .. } => {
                    reactions.push(Box::new(callback));
                    return;
                }
                State::Settled(outcome) => outcome.clone(),
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { callback(outcome) });
            }
            Err(_) => callback(outcome),
        }
    }
}

impl Future for Deferred {
    type Output = FaultResult<Value>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.shared.state.lock();
        match &mut *state {
            State::Settled(outcome) => Poll::Ready(outcome.clone()),
            State::Pending { wakers, .. } => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deferred({})", self.state().name())
    }
}

/// Settling side of a [`Deferred`].
pub struct Resolver {
    shared: Arc<Shared>,
}

impl Resolver {
    /// Fulfil with `value`.
    ///
    /// Resolving with another deferred value adopts its eventual state.
    /// Resolving with the deferred value itself rejects it.
    pub fn resolve(self, value: Value) {
        match value {
            Value::Deferred(other) if Arc::ptr_eq(&other.shared, &self.shared) => {
                self.shared
                    .settle(Err(Fault::from_kind(FaultKind::DeferredCycle)));
            }
            Value::Deferred(other) => {
                let shared = self.shared;
                other.on_settle(move |outcome| shared.settle(outcome));
            }
            value => self.shared.settle(Ok(value)),
        }
    }

    /// Reject with `fault`.
    pub fn reject(self, fault: Fault) {
        self.shared.settle(Err(fault));
    }

    /// Settle with a ready outcome.
    pub fn settle(self, outcome: FaultResult<Value>) {
        match outcome {
            Ok(value) => self.resolve(value),
            Err(fault) => self.reject(fault),
        }
    }

    /// The deferred value this resolver settles.
    pub fn deferred(&self) -> Deferred {
        Deferred {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}
