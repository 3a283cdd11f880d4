//! The interception layer.
//!
//! [`InterceptedObject`] wraps a [`Target`] and exposes the two trap
//! operations every access goes through:
//!
//! - [`InterceptedObject::on_read`] resolves a member for reading. Members
//!   backed by a getter override or accessor are measured right away. Methods
//!   come back as an [`InstrumentedMethod`] that is measured when called.
//!   Plain data is read straight from the target.
//! - [`InterceptedObject::on_write`] runs a setter override or accessor
//!   setter under measurement, or assigns straight to the target.
//!
//! Measured operations are reported to the observer before their result is
//! returned, and faults are handed back to the caller unchanged.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wiretap_intercept::{InterceptConfig, InterceptedObject};
//!
//! let proxied = InterceptedObject::new(
//!     Arc::new(object),
//!     Arc::new(|record: &CallRecord| println!("{}", record.method_name)),
//!     InterceptConfig::default(),
//! );
//!
//! let value = proxied.invoke("method", vec![])?;
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use wiretap_core::{Fault, FaultResult, Target, Value};
use wiretap_observe::{CallObserver, CallType};

use crate::completion::complete;
use crate::config::InterceptConfig;
use crate::measure::measure_override;
use crate::overrides::{Override, OverrideResolver};

struct Shared<T> {
    target: Arc<T>,
    observer: Arc<dyn CallObserver>,
    resolver: OverrideResolver<T>,
    resolve_promises: bool,
}

impl<T: Target> Shared<T> {
    fn run(
        &self,
        name: &str,
        call_type: CallType,
        arguments: Vec<Value>,
        implementation: &Override<T>,
    ) -> FaultResult<Value> {
        trace!(member = name, call_type = %call_type, "Intercepted call");
        let record = measure_override(
            implementation,
            name,
            call_type,
            self.target.as_ref(),
            arguments,
        );
        complete(record, self.resolve_promises, Arc::clone(&self.observer))
    }
}

/// A transparent, instrumented wrapper around a target.
///
/// Cloning yields another handle to the same wrapper.
pub struct InterceptedObject<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Target> InterceptedObject<T> {
    /// Wrap `target`, reporting to `observer`.
    pub fn new(
        target: Arc<T>,
        observer: Arc<dyn CallObserver>,
        config: InterceptConfig<T>,
    ) -> Self {
        let resolver = OverrideResolver::new(
            target.as_ref(),
            config.method_overrides,
            config.getter_overrides,
            config.setter_overrides,
        );

        debug!(
            members = target.keys().len(),
            accessors = resolver.accessor_names().len(),
            resolve_promises = config.resolve_promises,
            "Created intercepted object"
        );

        Self {
            shared: Arc::new(Shared {
                target,
                observer,
                resolver,
                resolve_promises: config.resolve_promises,
            }),
        }
    }

    /// Read a member.
    ///
    /// # Errors
    ///
    /// Returns the fault raised by an instrumented getter, or by the target's
    /// own accessor for pass-through reads.
    pub fn on_read(&self, name: &str) -> FaultResult<Member<T>> {
        let shared = &self.shared;
        let target = shared.target.as_ref();

        if let Some(getter) = shared
            .resolver
            .resolve(name, CallType::Get, target)
            .into_implementation()
        {
            return shared
                .run(name, CallType::Get, Vec::new(), &getter)
                .map(Member::Value);
        }

        if let Some(body) = shared
            .resolver
            .resolve(name, CallType::Method, target)
            .into_implementation()
        {
            return Ok(Member::Method(InstrumentedMethod {
                shared: Arc::clone(shared),
                name: name.to_string(),
                body,
            }));
        }

        target.get(name).map(Member::Value)
    }

    /// Read a member as a value.
    ///
    /// Methods read as `Undefined`, as on the target itself.
    pub fn get(&self, name: &str) -> FaultResult<Value> {
        Ok(self.on_read(name)?.into_value().unwrap_or_default())
    }

    /// Write a member.
    ///
    /// The value returned by a setter override is dropped. A deferred setter
    /// result is still reported to the observer when it settles, but only
    /// while deferred completion is tracked; otherwise its eventual rejection
    /// reaches nobody.
    ///
    /// # Errors
    ///
    /// Returns the fault raised by an instrumented setter, or by the target's
    /// own assignment for pass-through writes.
    pub fn on_write(&self, name: &str, value: Value) -> FaultResult<()> {
        let shared = &self.shared;
        let target = shared.target.as_ref();

        match shared
            .resolver
            .resolve(name, CallType::Set, target)
            .into_implementation()
        {
            Some(setter) => shared
                .run(name, CallType::Set, vec![value], &setter)
                .map(|_| ()),
            None => target.set(name, value),
        }
    }

    /// Read and call a method in one step.
    ///
    /// # Errors
    ///
    /// Returns the method's fault, or a not-callable fault when the member
    /// is not a method.
    pub fn invoke(&self, name: &str, args: Vec<Value>) -> FaultResult<Value> {
        match self.on_read(name)? {
            Member::Method(method) => method.call(args),
            Member::Value(_) => Err(Fault::not_callable(name)),
        }
    }

    /// Own member names of the target.
    pub fn keys(&self) -> Vec<String> {
        self.shared.target.keys()
    }

    /// Check if the target has a member.
    pub fn has(&self, name: &str) -> bool {
        self.shared.target.has(name)
    }

    /// Remove a member from the target.
    pub fn delete(&self, name: &str) -> bool {
        self.shared.target.delete(name)
    }

    /// The wrapped target.
    pub fn target(&self) -> &Arc<T> {
        &self.shared.target
    }

    /// Check if deferred completion is tracked.
    pub fn resolve_promises(&self) -> bool {
        self.shared.resolve_promises
    }
}

impl<T> Clone for InterceptedObject<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for InterceptedObject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptedObject")
            .field("resolver", &self.shared.resolver)
            .field("resolve_promises", &self.shared.resolve_promises)
            .finish()
    }
}

/// Result of reading a member through an [`InterceptedObject`].
pub enum Member<T> {
    /// A value.
    Value(Value),
    /// A method, measured when called.
    Method(InstrumentedMethod<T>),
}

impl<T> Member<T> {
    /// The value, if this is not a method.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Member::Value(value) => Some(value),
            Member::Method(_) => None,
        }
    }

    /// The method, if this is one.
    pub fn into_method(self) -> Option<InstrumentedMethod<T>> {
        match self {
            Member::Method(method) => Some(method),
            Member::Value(_) => None,
        }
    }

    /// Check if this is a method.
    pub fn is_method(&self) -> bool {
        matches!(self, Member::Method(_))
    }
}

impl<T> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Member::Method(method) => f.debug_tuple("Method").field(&method.name).finish(),
        }
    }
}

/// A method read through an [`InterceptedObject`].
///
/// The implementation is fixed when the member is read. Each call produces
/// its own call record.
pub struct InstrumentedMethod<T> {
    shared: Arc<Shared<T>>,
    name: String,
    body: Override<T>,
}

impl<T: Target> InstrumentedMethod<T> {
    /// Call the method.
    ///
    /// # Errors
    ///
    /// Returns exactly the fault the method raised.
    pub fn call(&self, args: Vec<Value>) -> FaultResult<Value> {
        self.shared
            .run(&self.name, CallType::Method, args, &self.body)
    }
}

impl<T> InstrumentedMethod<T> {
    /// Member name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for InstrumentedMethod<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            name: self.name.clone(),
            body: Arc::clone(&self.body),
        }
    }
}

impl<T> fmt::Debug for InstrumentedMethod<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrumentedMethod")
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::time::Duration;
    use wiretap_core::{Deferred, Descriptor, Object};
    use wiretap_observe::{CallRecord, CollectingObserver};

    use crate::overrides::OverrideRegistry;

    fn broken(_: &CallRecord) {
        panic!("broken callback");
    }

    fn sample() -> Object {
        Object::builder()
            .value("value", 1)
            .method("method", |this, _| this.get("value"))
            .method("exceptMethod", |_, _| Err(Fault::new("something went wrong")))
            .method("promise", |_, _| {
                Ok(Value::from(Deferred::spawn(async {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    Ok(Value::from("foo"))
                })))
            })
            .method("failedPromise", |_, _| {
                Ok(Value::from(Deferred::spawn(async {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    Err(Fault::new("rejected"))
                })))
            })
            .method("settled", |_, _| Ok(Value::from(Deferred::fulfilled("done"))))
            .accessor(
                "double",
                |this| Ok(Value::from(this.get("value")?.as_i64().unwrap_or(0) * 2)),
                |this, v| {
                    this.define("value", Value::from(v.as_i64().unwrap_or(0) / 2));
                    Ok(())
                },
            )
            .getter("label", |_| Ok(Value::from("label")))
            .build()
            .unwrap()
    }

    fn wrap(
        config: InterceptConfig<Object>,
    ) -> (InterceptedObject<Object>, Arc<CollectingObserver>) {
        let collector = Arc::new(CollectingObserver::new(100));
        let proxied = InterceptedObject::new(
            Arc::new(sample()),
            Arc::clone(&collector) as Arc<dyn CallObserver>,
            config,
        );
        (proxied, collector)
    }

    async fn settle_records(collector: &CollectingObserver, expected: usize) {
        for _ in 0..100 {
            if collector.len() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[test]
    fn test_method_call() {
        let (proxied, collector) = wrap(InterceptConfig::default());

        let value = proxied.invoke("method", vec![]).unwrap();
        assert_eq!(value, Value::from(1));

        let records = collector.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.method_name, "method");
        assert_eq!(record.call_type, CallType::Method);
        assert_eq!(record.result, Some(Value::from(1)));
        assert!(!record.failed);
        assert!(!record.resolved_promise);
    }

    #[test]
    fn test_arguments_are_recorded() {
        let (proxied, collector) = wrap(InterceptConfig::default());
        proxied.target().define_method("echo", |_, args| {
            Ok(args.first().cloned().unwrap_or_default())
        });

        let value = proxied.invoke("echo", vec![Value::from("hi"), Value::from(2)]).unwrap();

        assert_eq!(value, Value::from("hi"));
        assert_eq!(
            collector.last().unwrap().arguments,
            vec![Value::from("hi"), Value::from(2)]
        );
    }

    #[test]
    fn test_read_returns_instrumented_method() {
        let (proxied, collector) = wrap(InterceptConfig::default());

        let method = proxied.on_read("method").unwrap().into_method().unwrap();
        assert_eq!(method.name(), "method");
        assert!(collector.is_empty());

        method.call(vec![]).unwrap();
        method.call(vec![]).unwrap();

        let records = collector.records();
        assert_eq!(records.len(), 2);
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn test_data_property_not_intercepted() {
        let (proxied, collector) = wrap(InterceptConfig::default());

        assert_eq!(proxied.get("value").unwrap(), Value::from(1));
        assert!(proxied.get("missing").unwrap().is_undefined());
        proxied.on_write("value", Value::from(5)).unwrap();
        assert_eq!(proxied.target().get("value").unwrap(), Value::from(5));

        assert!(collector.is_empty());
    }

    #[test]
    fn test_exception_is_rethrown() {
        let (proxied, collector) = wrap(InterceptConfig::default());
        let fault = Fault::new("something went wrong");
        let thrown = fault.clone();
        proxied
            .target()
            .define_method("throwing", move |_, _| Err(thrown.clone()));

        let err = proxied.invoke("throwing", vec![]).unwrap_err();
        assert!(err.ptr_eq(&fault));

        let record = collector.last().unwrap();
        assert!(record.failed);
        assert!(record.result.is_none());
        assert!(record.error.unwrap().ptr_eq(&fault));
        assert!(!record.resolved_promise);
    }

    #[test]
    fn test_error_callback() {
        let (proxied, collector) = wrap(InterceptConfig::default());

        let err = proxied.invoke("exceptMethod", vec![]).unwrap_err();
        assert_eq!(err.message(), "something went wrong");
        assert_eq!(collector.last().unwrap().error.unwrap().message(), "something went wrong");
    }

    #[test]
    fn test_broken_observer_is_survived() {
        let fault = Fault::new("something went wrong");
        let thrown = fault.clone();
        let object = sample();
        object.define_method("throwing", move |_, _| Err(thrown.clone()));
        let proxied = InterceptedObject::new(
            Arc::new(object),
            Arc::new(broken),
            InterceptConfig::default(),
        );

        assert_eq!(proxied.invoke("method", vec![]).unwrap(), Value::from(1));
        assert!(proxied.invoke("throwing", vec![]).unwrap_err().ptr_eq(&fault));
    }

    #[test]
    fn test_not_callable() {
        let (proxied, collector) = wrap(InterceptConfig::default());

        let err = proxied.invoke("value", vec![]).unwrap_err();
        assert_eq!(err.kind().name(), "not_callable");
        assert!(collector.is_empty());
    }

    #[tokio::test]
    async fn test_async_fulfilled() {
        let (proxied, collector) = wrap(InterceptConfig::default());

        let value = proxied.invoke("promise", vec![]).unwrap();
        let deferred = value.as_deferred().cloned().unwrap();

        let first = collector.last().unwrap();
        assert!(first.resolved_promise);
        assert!(!first.failed);
        assert!(first.deferred_result().unwrap().ptr_eq(&deferred));

        assert_eq!(deferred.await.unwrap(), Value::from("foo"));
        settle_records(&collector, 2).await;

        let records = collector.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, records[0].id);
        assert_eq!(records[1].result, Some(Value::from("foo")));
        assert!(records[1].resolved_promise);
        assert!(!records[1].failed);
    }

    #[tokio::test]
    async fn test_async_rejected() {
        let (proxied, collector) = wrap(InterceptConfig::default());

        let value = proxied.invoke("failedPromise", vec![]).unwrap();
        let deferred = value.as_deferred().cloned().unwrap();
        assert!(deferred.await.is_err());
        settle_records(&collector, 2).await;

        let last = collector.last().unwrap();
        assert_eq!(last.error.unwrap().message(), "rejected");
        assert!(last.failed);
        assert!(last.resolved_promise);
        assert!(last.result.is_none());
    }

    #[tokio::test]
    async fn test_already_settled_reports_after_return() {
        let (proxied, collector) = wrap(InterceptConfig::default());

        proxied.invoke("settled", vec![]).unwrap();
        assert_eq!(collector.len(), 1);

        settle_records(&collector, 2).await;
        assert_eq!(collector.last().unwrap().result, Some(Value::from("done")));
    }

    #[tokio::test]
    async fn test_resolve_promises_disabled() {
        let (proxied, collector) = wrap(InterceptConfig::default().with_resolve_promises(false));

        let value = proxied.invoke("failedPromise", vec![]).unwrap();
        let deferred = value.as_deferred().cloned().unwrap();

        let err = deferred.await.unwrap_err();
        assert_eq!(err.message(), "rejected");
        tokio::time::sleep(Duration::from_millis(5)).await;

        let records = collector.records();
        assert_eq!(records.len(), 1);
        assert!(!records[0].resolved_promise);
        assert!(records[0].deferred_result().is_some());
    }

    #[test]
    fn test_method_override() {
        let config = InterceptConfig::default()
            .with_method_override("method", |name, target: &Object, _| {
                let original = target.get("value")?.as_i64().unwrap_or(0);
                Ok(Value::from(format!("{name} {}", original + 1)))
            });
        let (proxied, collector) = wrap(config);

        assert_eq!(proxied.invoke("method", vec![]).unwrap(), Value::from("method 2"));
        assert_eq!(collector.last().unwrap().result, Some(Value::from("method 2")));
    }

    #[test]
    fn test_method_override_for_absent_member() {
        let config =
            InterceptConfig::default().with_method_override("ghost", |_, _, _| Ok(Value::Null));
        let (proxied, collector) = wrap(config);

        assert_eq!(proxied.invoke("ghost", vec![]).unwrap(), Value::Null);
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_override_registered_after_construction() {
        let registry = OverrideRegistry::new();
        let (proxied, collector) =
            wrap(InterceptConfig::default().with_method_overrides(registry.clone()));

        assert_eq!(proxied.invoke("method", vec![]).unwrap(), Value::from(1));

        registry.register("method", |_, _, _| Ok(Value::from(42)));
        assert_eq!(proxied.invoke("method", vec![]).unwrap(), Value::from(42));

        registry.remove("method");
        assert_eq!(proxied.invoke("method", vec![]).unwrap(), Value::from(1));
        assert_eq!(collector.len(), 3);
    }

    #[test]
    fn test_getter_override() {
        let config =
            InterceptConfig::default().with_getter_override("value", |_, _, _| Ok(Value::from(10)));
        let (proxied, collector) = wrap(config);

        assert_eq!(proxied.get("value").unwrap(), Value::from(10));

        let record = collector.last().unwrap();
        assert_eq!(record.call_type, CallType::Get);
        assert!(record.arguments.is_empty());
        assert_eq!(record.result, Some(Value::from(10)));
    }

    #[test]
    fn test_setter_override() {
        let config = InterceptConfig::default().with_setter_override(
            "value",
            |name, target: &Object, args| {
                let doubled = args[0].as_i64().unwrap_or(0) * 2;
                target.define(name, Value::from(doubled));
                Ok(Value::Undefined)
            },
        );
        let (proxied, collector) = wrap(config);

        proxied.on_write("value", Value::from(4)).unwrap();

        assert_eq!(proxied.get("value").unwrap(), Value::from(8));
        let record = collector.last().unwrap();
        assert_eq!(record.call_type, CallType::Set);
        assert_eq!(record.arguments, vec![Value::from(4)]);
    }

    #[test]
    fn test_setter_override_fault_is_rethrown() {
        let fault = Fault::new("read only");
        let thrown = fault.clone();
        let config = InterceptConfig::default()
            .with_setter_override("value", move |_, _, _| Err(thrown.clone()));
        let (proxied, collector) = wrap(config);

        assert!(proxied.on_write("value", Value::from(2)).unwrap_err().ptr_eq(&fault));
        assert!(collector.last().unwrap().failed);
    }

    #[test]
    fn test_deferred_getter_override_is_tracked() {
        let (deferred, resolver) = Deferred::new();
        let pending = deferred.clone();
        let config = InterceptConfig::default()
            .with_getter_override("value", move |_, _, _| Ok(Value::from(pending.clone())));
        let (proxied, collector) = wrap(config);

        let value = proxied.get("value").unwrap();
        assert!(value.as_deferred().unwrap().ptr_eq(&deferred));
        assert_eq!(collector.len(), 1);
        assert!(collector.records()[0].resolved_promise);

        resolver.reject(Fault::new("rejected"));

        let records = collector.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].call_type, CallType::Get);
        assert!(records[1].failed);
        assert!(records[1].result.is_none());
        assert_eq!(records[1].error.as_ref().unwrap().message(), "rejected");
    }

    #[test]
    fn test_deferred_setter_override_is_tracked() {
        let (deferred, resolver) = Deferred::new();
        let pending = deferred.clone();
        let config = InterceptConfig::default()
            .with_setter_override("value", move |_, _, _| Ok(Value::from(pending.clone())));
        let (proxied, collector) = wrap(config);

        proxied.on_write("value", Value::from(3)).unwrap();
        resolver.reject(Fault::new("rejected"));

        let records = collector.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].call_type, CallType::Set);
        assert_eq!(records[1].arguments, vec![Value::from(3)]);
        assert!(records[1].failed);
    }

    #[test]
    fn test_accessor_getter_fault_is_rethrown() {
        let fault = Fault::new("unreadable");
        let thrown = fault.clone();
        let object = Object::builder()
            .getter("broken", move |_| Err(thrown.clone()))
            .build()
            .unwrap();
        let collector = Arc::new(CollectingObserver::new(100));
        let proxied = InterceptedObject::new(
            Arc::new(object),
            Arc::clone(&collector) as Arc<dyn CallObserver>,
            InterceptConfig::default(),
        );

        let err = proxied.on_read("broken").unwrap_err();
        assert!(err.ptr_eq(&fault));

        let record = collector.last().unwrap();
        assert_eq!(record.call_type, CallType::Get);
        assert!(record.failed);
        assert!(record.result.is_none());
        assert!(record.error.unwrap().ptr_eq(&fault));
    }

    #[test]
    fn test_existing_accessors_keep_working() {
        let (proxied, collector) = wrap(InterceptConfig::default());

        assert_eq!(proxied.get("double").unwrap(), Value::from(2));
        proxied.on_write("double", Value::from(10)).unwrap();
        assert_eq!(proxied.get("value").unwrap(), Value::from(5));

        let types: Vec<CallType> = collector.records().iter().map(|r| r.call_type).collect();
        assert_eq!(types, vec![CallType::Get, CallType::Set]);
    }

    #[test]
    fn test_getter_only_accessor_rejects_writes() {
        let (proxied, collector) = wrap(InterceptConfig::default());

        assert_eq!(proxied.get("label").unwrap(), Value::from("label"));
        let err = proxied.on_write("label", Value::from("other")).unwrap_err();

        assert_eq!(err.kind().name(), "read_only");
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_user_override_beats_accessor() {
        let config = InterceptConfig::default()
            .with_getter_override("double", |_, _, _| Ok(Value::from(-1)));
        let (proxied, _collector) = wrap(config);

        assert_eq!(proxied.get("double").unwrap(), Value::from(-1));
    }

    #[test]
    fn test_accessor_added_later_is_pass_through() {
        let (proxied, collector) = wrap(InterceptConfig::default());
        proxied.target().insert(
            "late",
            Descriptor::Accessor {
                get: Some(Arc::new(|_: &Object| -> FaultResult<Value> { Ok(Value::from(7)) })),
                set: None,
            },
        );

        assert_eq!(proxied.get("late").unwrap(), Value::from(7));
        assert!(collector.is_empty());
    }

    #[test]
    fn test_meta_operations_pass_through() {
        let (proxied, collector) = wrap(InterceptConfig::default());

        assert!(proxied.has("method"));
        assert!(proxied.keys().contains(&"value".to_string()));
        assert!(proxied.delete("method"));
        assert!(!proxied.has("method"));
        assert!(proxied.on_read("method").unwrap().into_value().unwrap().is_undefined());
        assert!(collector.is_empty());
    }

    #[test]
    fn test_reentrant_calls() {
        let (proxied, collector) = wrap(InterceptConfig::default());

        let inner = proxied.clone();
        proxied.target().define_method("outer", move |_, _| inner.invoke("method", vec![]));

        assert_eq!(proxied.invoke("outer", vec![]).unwrap(), Value::from(1));

        let names: Vec<String> = collector
            .records()
            .into_iter()
            .map(|r| r.method_name)
            .collect();
        assert_eq!(names, vec!["method".to_string(), "outer".to_string()]);
    }

    struct Counter {
        count: AtomicI64,
    }

    impl Target for Counter {
        fn descriptor(&self, name: &str) -> Option<Descriptor<Self>> {
            match name {
                "count" => Some(Descriptor::Data(Value::from(self.count.load(Ordering::SeqCst)))),
                "increment" => Some(Descriptor::Method(Arc::new(
                    |this: &Counter, args: &[Value]| -> FaultResult<Value> {
                        let step = args.first().and_then(Value::as_i64).unwrap_or(1);
                        Ok(Value::from(this.count.fetch_add(step, Ordering::SeqCst) + step))
                    },
                ))),
                _ => None,
            }
        }

        fn keys(&self) -> Vec<String> {
            vec!["count".to_string(), "increment".to_string()]
        }

        fn define(&self, name: &str, value: Value) {
            if name == "count" {
                self.count.store(value.as_i64().unwrap_or(0), Ordering::SeqCst);
            }
        }

        fn delete(&self, _name: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_custom_target() {
        let collector = Arc::new(CollectingObserver::new(100));
        let proxied = InterceptedObject::new(
            Arc::new(Counter {
                count: AtomicI64::new(0),
            }),
            Arc::clone(&collector) as Arc<dyn CallObserver>,
            InterceptConfig::default(),
        );

        assert_eq!(proxied.invoke("increment", vec![]).unwrap(), Value::from(1));
        assert_eq!(proxied.invoke("increment", vec![Value::from(5)]).unwrap(), Value::from(6));
        assert_eq!(proxied.get("count").unwrap(), Value::from(6));
        proxied.on_write("count", Value::from(0)).unwrap();

        assert_eq!(proxied.target().count.load(Ordering::SeqCst), 0);
        assert_eq!(collector.len(), 2);
    }
}
