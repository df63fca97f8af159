//! Proxy dispatch surface.
//!
//! A [`Proxy`] stands in for an object implementing some interface class. Every
//! call made through it is intercepted by its [`ProxyHandler`], which answers the
//! three universal operations itself and wraps everything else in an
//! [`Invocation`] for the dispatcher.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;

use super::capability::{CapabilityGate, INVOCATION};
use super::{Dispatcher, Fault};
use crate::descriptor::{EQUALS, HASH_CODE, MethodDescriptor, TO_STRING};
use crate::domain::{ClassRef, MethodRef};
use crate::error::{Error, ResolveError, Result};
use crate::invocation::Invocation;
use crate::value::Value;

#[derive(Clone, Copy)]
enum Universal {
	Equals,
	HashCode,
	ToString,
}

impl Universal {
	fn of(method: &MethodRef) -> Option<Self> {
		let (op, descriptor): (Self, &MethodDescriptor) = match (method.name(), method.parameter_types().len()) {
			("equals", 1) => (Self::Equals, &*EQUALS),
			("hash_code", 0) => (Self::HashCode, &*HASH_CODE),
			("to_string", 0) => (Self::ToString, &*TO_STRING),
			_ => return None,
		};
		(method.descriptor() == *descriptor).then_some(op)
	}
}

/// Intercepts proxy calls and forwards them to a [`Dispatcher`].
#[derive(Clone)]
pub struct ProxyHandler {
	dispatcher: Arc<dyn Dispatcher>,
}

impl ProxyHandler {
	pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
		Self { dispatcher }
	}

	/// Rebuilds a handler around a dispatcher received from another process.
	///
	/// The gate is consulted once, here; calls made through the handler are not
	/// re-checked.
	///
	/// # Errors
	///
	/// Returns [`Error::PermissionDenied`] unless the gate confirms the
	/// dispatcher holds [`INVOCATION`].
	pub fn reconstitute(dispatcher: Arc<dyn Dispatcher>, gate: &dyn CapabilityGate) -> Result<Self> {
		if !gate.holder_implies(dispatcher.as_ref(), INVOCATION) {
			tracing::warn!(dispatcher = dispatcher.id(), "refusing handler: dispatcher lacks invocation capability");
			return Err(Error::PermissionDenied {
				dispatcher: dispatcher.id().to_owned(),
				capability: INVOCATION,
			});
		}
		Ok(Self::new(dispatcher))
	}

	pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
		&self.dispatcher
	}

	/// Handles one call made through `proxy`.
	///
	/// # Errors
	///
	/// Returns the cause of the dispatcher's failure, never the failure wrapper.
	pub fn invoke(&self, proxy: &Proxy, method: &MethodRef, args: Vec<Value>) -> std::result::Result<Value, Fault> {
		match Universal::of(method) {
			Some(Universal::Equals) => {
				let same = matches!(args.first(), Some(Value::Proxy(other)) if other.ptr_eq(proxy));
				return Ok(Value::Bool(same));
			}
			Some(Universal::HashCode) => return Ok(Value::Int(proxy.identity_hash())),
			Some(Universal::ToString) => return Ok(Value::from(format!("Proxy via {}", self.dispatcher.id()))),
			None => {}
		}

		let invocation = Invocation::new(method.clone(), args);
		tracing::trace!(method = %method, dispatcher = self.dispatcher.id(), "dispatching proxy call");
		match self.dispatcher.dispatch(invocation) {
			Ok(reply) => Ok(reply.into_value()),
			Err(failure) => Err(failure.into_cause()),
		}
	}
}

impl fmt::Debug for ProxyHandler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProxyHandler")
			.field("dispatcher", &self.dispatcher.id())
			.finish()
	}
}

struct ProxyInner {
	interface: ClassRef,
	handler: ProxyHandler,
}

/// A dispatch surface implementing an interface class.
///
/// Cloning a proxy yields the same surface; equality and hashing are by identity.
#[derive(Clone)]
pub struct Proxy(Arc<ProxyInner>);

impl Proxy {
	pub fn new(interface: ClassRef, handler: ProxyHandler) -> Self {
		Self(Arc::new(ProxyInner { interface, handler }))
	}

	pub fn interface(&self) -> &ClassRef {
		&self.0.interface
	}

	pub fn handler(&self) -> &ProxyHandler {
		&self.0.handler
	}

	/// Calls `method` through the handler.
	pub fn invoke(&self, method: &MethodRef, args: Vec<Value>) -> std::result::Result<Value, Fault> {
		self.0.handler.invoke(self, method, args)
	}

	/// Calls the interface method named `name` taking `args.len()` arguments.
	///
	/// # Errors
	///
	/// Fails with [`ResolveError::MethodNotFound`] if the interface has no such
	/// method, [`ResolveError::AmbiguousMethod`] if overloads with different
	/// parameter types share that arity, or with whatever the dispatcher
	/// surfaces.
	pub fn call(&self, name: &str, args: Vec<Value>) -> std::result::Result<Value, Fault> {
		let method = self
			.0
			.interface
			.find_method_by_arity(name, args.len())?
			.ok_or_else(|| ResolveError::MethodNotFound {
				owner: self.0.interface.name().to_owned(),
				method: format!("{name}/{}", args.len()),
			})?;
		self.invoke(&method, args)
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	/// Hash derived from the proxy's identity.
	pub fn identity_hash(&self) -> i64 {
		let mut hasher = FxHasher::default();
		std::ptr::hash(Arc::as_ptr(&self.0), &mut hasher);
		hasher.finish() as i64
	}
}

impl PartialEq for Proxy {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl Eq for Proxy {}

impl Hash for Proxy {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::ptr::hash(Arc::as_ptr(&self.0), state);
	}
}

impl fmt::Display for Proxy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Proxy via {}", self.0.handler.dispatcher.id())
	}
}

impl fmt::Debug for Proxy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Proxy")
			.field("interface", &self.0.interface)
			.field("dispatcher", &self.0.handler.dispatcher.id())
			.finish()
	}
}
