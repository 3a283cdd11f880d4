//! Wiretap Core - Data Model for Call Instrumentation
//!
//! This crate provides the building blocks shared by every layer of Wiretap:
//!
//! - [`Value`]: dynamically typed values passed to and returned from members
//! - [`Fault`]: the value a member throws, compared by identity
//! - [`Deferred`]: a value that settles later, the platform "promise"
//! - [`Target`]: the dispatch-table view of an object that can be wrapped
//! - [`Object`]: a ready-made dynamic [`Target`]
//!
//! # Quick Start
//!
//! ```ignore
//! use wiretap_core::prelude::*;
//!
//! let object = Object::builder()
//!     .value("value", 1)
//!     .method("method", |this, _| this.get("value"))
//!     .method("later", |_, args| {
//!         let value = args.first().cloned().unwrap_or_default();
//!         Ok(Value::from(Deferred::fulfilled(value)))
//!     })
//!     .build()?;
//!
//! assert_eq!(object.invoke("method", &[])?, Value::from(1));
//! ```
//!
//! # Deferred Values
//!
//! A member signals an asynchronous result by returning
//! [`Value::Deferred`]. Holders of the value can `.await` it or subscribe with
//! [`Deferred::on_settle`]; the interception layer uses the latter to report
//! the eventual outcome.

pub mod deferred;
pub mod error;
pub mod object;
pub mod value;

// Re-export main types at crate root
pub use deferred::{Deferred, Resolver, Settlement};
pub use error::{Fault, FaultKind, FaultResult, ObjectError, ObjectResult};
pub use object::{Descriptor, Getter, Method, Object, ObjectBuilder, Setter, Target};
pub use value::Value;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::deferred::{Deferred, Resolver, Settlement};
    pub use crate::error::{Fault, FaultResult};
    pub use crate::object::{Descriptor, Object, ObjectBuilder, Target};
    pub use crate::value::Value;
}
