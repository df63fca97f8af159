#![cfg_attr(test, allow(unused_crate_dependencies))]

//! Portable invocation envelopes.
//!
//! An [`Invocation`] captures "call method M with arguments A and properties P"
//! so the call can cross an isolation boundary and be dispatched on the other
//! side without caller and callee sharing class identity:
//! * [`MethodDescriptor`]: domain-independent method identity, usable as a map
//!   key and as the wire reference for a method
//! * [`Domain`]: resolves type names and methods; [`LocalDomain`] is the
//!   in-process implementation with parent delegation
//! * [`Invocation::clone_to`]: rebuilds an envelope inside another domain
//! * [`Proxy`] / [`ProxyHandler`]: turn calls into envelopes for a [`Dispatcher`]
//!   and surface the original failure, never a wrapper
//! * [`wire`]: postcard frames for envelopes and handlers, bounded by [`WireLimits`]

pub mod clone;
pub mod descriptor;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod invocation;
pub mod properties;
pub mod value;
pub mod wire;

#[cfg(test)]
mod fixtures;

pub use clone::{DomainTranslator, StructuralTranslator};
pub use descriptor::MethodDescriptor;
pub use dispatch::{
	Capability, CapabilityGate, Dispatcher, DispatcherRegistry, Fault, GrantTable, InvocationFailure, ObjectDispatcher,
	Proxy, ProxyHandler, Reply,
};
pub use domain::{Builtin, ClassDecl, ClassRef, Domain, DomainId, LocalDomain, MethodDecl, MethodRef, TypeRef};
pub use error::{Error, ResolveError, Result};
pub use invocation::Invocation;
pub use properties::{PropertyMap, PropertyMapBuilder};
pub use value::{ObjectRef, Value};
pub use wire::{DEFAULT_LIMITS, WireLimits};
