//! Target objects.
//!
//! Anything that can be wrapped implements [`Target`]: a key-based dispatch
//! table that describes its own members by name. A member is a plain data
//! property, a method, or an accessor pair. Members receive the target itself
//! as their receiving context.
//!
//! [`Object`] is a ready-made dynamic implementation for callers that do not
//! want to implement [`Target`] by hand.
//!
//! # Example
//!
//! ```ignore
//! use wiretap_core::{Object, Target, Value};
//!
//! let object = Object::builder()
//!     .value("value", 1)
//!     .method("method", |this, _args| this.get("value"))
//!     .build()?;
//!
//! assert_eq!(object.invoke("method", &[])?, Value::from(1));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Fault, FaultResult, ObjectError, ObjectResult};
use crate::value::Value;

/// A method: receives the target and the positional arguments.
pub type Method<T> = Arc<dyn Fn(&T, &[Value]) -> FaultResult<Value> + Send + Sync>;

/// A property getter.
pub type Getter<T> = Arc<dyn Fn(&T) -> FaultResult<Value> + Send + Sync>;

/// A property setter.
pub type Setter<T> = Arc<dyn Fn(&T, Value) -> FaultResult<()> + Send + Sync>;

/// Description of one own member of a target.
pub enum Descriptor<T: ?Sized> {
    /// A plain data property.
    Data(Value),
    /// A callable member.
    Method(Method<T>),
    /// A property backed by functions.
    Accessor {
        /// Getter, if readable.
        get: Option<Getter<T>>,
        /// Setter, if writable.
        set: Option<Setter<T>>,
    },
}

impl<T: ?Sized> Descriptor<T> {
    /// Check if this member is callable.
    pub fn is_method(&self) -> bool {
        matches!(self, Descriptor::Method(_))
    }

    /// Check if this member is an accessor.
    pub fn is_accessor(&self) -> bool {
        matches!(self, Descriptor::Accessor { .. })
    }

    /// Kind name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Descriptor::Data(_) => "data",
            Descriptor::Method(_) => "method",
            Descriptor::Accessor { .. } => "accessor",
        }
    }
}

impl<T: ?Sized> Clone for Descriptor<T> {
    fn clone(&self) -> Self {
        match self {
            Descriptor::Data(value) => Descriptor::Data(value.clone()),
            Descriptor::Method(method) => Descriptor::Method(Arc::clone(method)),
            Descriptor::Accessor { get, set } => Descriptor::Accessor {
                get: get.clone(),
                set: set.clone(),
            },
        }
    }
}

impl<T: ?Sized> fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Data(value) => f.debug_tuple("Data").field(value).finish(),
            Descriptor::Method(_) => f.write_str("Method(..)"),
            Descriptor::Accessor { get, set } => f
                .debug_struct("Accessor")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .finish(),
        }
    }
}

/// An object that can be wrapped by the interception layer.
///
/// Implementors only describe their members; reading, writing and invoking
/// are provided on top of [`Target::descriptor`] and [`Target::define`].
/// All methods take `&self`, so implementors use interior mutability for
/// writable state.
pub trait Target: Send + Sync + 'static {
    /// Own property descriptor for `name`.
    fn descriptor(&self, name: &str) -> Option<Descriptor<Self>>;

    /// Names of all own members.
    fn keys(&self) -> Vec<String>;

    /// Create or overwrite a plain data property.
    fn define(&self, name: &str, value: Value);

    /// Remove a member. Returns whether it existed.
    fn delete(&self, name: &str) -> bool;

    /// Check if a member exists.
    fn has(&self, name: &str) -> bool {
        self.descriptor(name).is_some()
    }

    /// Read a property, evaluating accessors.
    ///
    /// Missing members and methods read as `Undefined`.
    fn get(&self, name: &str) -> FaultResult<Value> {
        match self.descriptor(name) {
            Some(Descriptor::Data(value)) => Ok(value),
            Some(Descriptor::Accessor { get: Some(getter), .. }) => getter(self),
            Some(Descriptor::Accessor { get: None, .. })
            | Some(Descriptor::Method(_))
            | None => Ok(Value::Undefined),
        }
    }

    /// Assign a property, invoking a setter when one exists.
    fn set(&self, name: &str, value: Value) -> FaultResult<()> {
        match self.descriptor(name) {
            Some(Descriptor::Accessor { set: Some(setter), .. }) => setter(self, value),
            Some(Descriptor::Accessor { set: None, .. }) => Err(Fault::read_only(name)),
            _ => {
                self.define(name, value);
                Ok(())
            }
        }
    }

    /// Call a method directly, without instrumentation.
    fn invoke(&self, name: &str, args: &[Value]) -> FaultResult<Value> {
        match self.descriptor(name) {
            Some(Descriptor::Method(method)) => method(self, args),
            _ => Err(Fault::not_callable(name)),
        }
    }

    /// All own accessor properties with their functions.
    fn accessors(&self) -> Vec<(String, Option<Getter<Self>>, Option<Setter<Self>>)> {
        self.keys()
            .into_iter()
            .filter_map(|name| match self.descriptor(&name) {
                Some(Descriptor::Accessor { get, set }) => Some((name, get, set)),
                _ => None,
            })
            .collect()
    }
}

/// A dynamic object with an interior-mutable property table.
#[derive(Default)]
pub struct Object {
    properties: RwLock<BTreeMap<String, Descriptor<Object>>>,
}

impl Object {
    /// Create an empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder.
    pub fn builder() -> ObjectBuilder {
        ObjectBuilder::new()
    }

    /// Insert or replace a member.
    pub fn insert(&self, name: impl Into<String>, descriptor: Descriptor<Object>) {
        self.properties.write().insert(name.into(), descriptor);
    }

    /// Insert or replace a method.
    pub fn define_method<F>(&self, name: impl Into<String>, method: F)
    where
        F: Fn(&Object, &[Value]) -> FaultResult<Value> + Send + Sync + 'static,
    {
        self.insert(name, Descriptor::Method(Arc::new(method)));
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.properties.read().len()
    }

    /// Check if the object has no members.
    pub fn is_empty(&self) -> bool {
        self.properties.read().is_empty()
    }
}

impl Target for Object {
    fn descriptor(&self, name: &str) -> Option<Descriptor<Self>> {
        // Cloned out so member code never runs under the lock.
        self.properties.read().get(name).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.properties.read().keys().cloned().collect()
    }

    fn define(&self, name: &str, value: Value) {
        self.properties
            .write()
            .insert(name.to_string(), Descriptor::Data(value));
    }

    fn delete(&self, name: &str) -> bool {
        self.properties.write().remove(name).is_some()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.properties.read().iter()).finish()
    }
}

/// Builder for [`Object`].
#[derive(Default)]
pub struct ObjectBuilder {
    properties: Vec<(String, Descriptor<Object>)>,
}

impl ObjectBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a data property.
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties
            .push((name.into(), Descriptor::Data(value.into())));
        self
    }

    /// Add a method.
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> FaultResult<Value> + Send + Sync + 'static,
    {
        self.properties
            .push((name.into(), Descriptor::Method(Arc::new(method))));
        self
    }

    /// Add a read-only accessor property.
    pub fn getter<G>(mut self, name: impl Into<String>, getter: G) -> Self
    where
        G: Fn(&Object) -> FaultResult<Value> + Send + Sync + 'static,
    {
        self.properties.push((
            name.into(),
            Descriptor::Accessor {
                get: Some(Arc::new(getter)),
                set: None,
            },
        ));
        self
    }

    /// Add a read-write accessor property.
    pub fn accessor<G, S>(mut self, name: impl Into<String>, getter: G, setter: S) -> Self
    where
        G: Fn(&Object) -> FaultResult<Value> + Send + Sync + 'static,
        S: Fn(&Object, Value) -> FaultResult<()> + Send + Sync + 'static,
    {
        self.properties.push((
            name.into(),
            Descriptor::Accessor {
                get: Some(Arc::new(getter)),
                set: Some(Arc::new(setter)),
            },
        ));
        self
    }

    /// Build the object.
    ///
    /// # Errors
    ///
    /// Returns an error if a name was defined more than once.
    pub fn build(self) -> ObjectResult<Object> {
        let mut properties = BTreeMap::new();
        for (name, descriptor) in self.properties {
            if properties.contains_key(&name) {
                return Err(ObjectError::DuplicateProperty(name));
            }
            properties.insert(name, descriptor);
        }
        Ok(Object {
            properties: RwLock::new(properties),
        })
    }
}
