//! Dispatching invocations.
//!
//! A [`Dispatcher`] executes an [`Invocation`] and produces a [`Reply`] or an
//! [`InvocationFailure`]. The [`Proxy`] surface turns ordinary calls into
//! invocations and hands them to a dispatcher through a [`ProxyHandler`].

mod capability;
mod object;
mod proxy;

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

pub use self::capability::{Capability, CapabilityGate, GrantTable, INVOCATION};
pub use self::object::ObjectDispatcher;
pub use self::proxy::{Proxy, ProxyHandler};
use crate::error::MissingCause;
use crate::invocation::Invocation;
use crate::value::Value;

/// The underlying failure of a call, surfaced to the caller unchanged.
pub type Fault = Box<dyn StdError + Send + Sync + 'static>;

/// Executes invocations.
///
/// Dispatch is synchronous from the caller's point of view. Implementations may
/// queue, parallelize, or forward the call elsewhere, but must not return until
/// they have an outcome.
pub trait Dispatcher: Send + Sync {
	/// Stable identifier, used to find the dispatcher again after transport.
	fn id(&self) -> &str;

	/// Executes `invocation`.
	///
	/// # Errors
	///
	/// Returns an [`InvocationFailure`] whose cause is the failure to surface to
	/// the original caller.
	fn dispatch(&self, invocation: Invocation) -> Result<Reply, InvocationFailure>;
}

/// Successful outcome of a dispatched call.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply(Value);

impl Reply {
	pub fn new(value: Value) -> Self {
		Self(value)
	}

	pub fn value(&self) -> &Value {
		&self.0
	}

	pub fn into_value(self) -> Value {
		self.0
	}
}

/// Failed outcome of a dispatched call.
///
/// The wrapped cause is the real failure. A failure built without one (see
/// [`with_message`](Self::with_message)) can receive it later through
/// [`init_cause`](Self::init_cause).
#[derive(Default)]
pub struct InvocationFailure {
	message: Option<String>,
	cause: Option<Fault>,
}

impl InvocationFailure {
	/// Wraps `cause`.
	pub fn new(cause: impl Into<Fault>) -> Self {
		Self {
			message: None,
			cause: Some(cause.into()),
		}
	}

	/// Failure with a detail message and no cause yet.
	pub fn with_message(message: impl Into<String>) -> Self {
		Self {
			message: Some(message.into()),
			cause: None,
		}
	}

	/// Failure with a detail message and a cause.
	pub fn with_cause(message: impl Into<String>, cause: impl Into<Fault>) -> Self {
		Self {
			message: Some(message.into()),
			cause: Some(cause.into()),
		}
	}

	/// Attaches the cause of a failure built without one.
	///
	/// # Errors
	///
	/// Hands `cause` back if a cause is already attached.
	pub fn init_cause(&mut self, cause: impl Into<Fault>) -> Result<(), Fault> {
		let cause = cause.into();
		if self.cause.is_some() {
			return Err(cause);
		}
		self.cause = Some(cause);
		Ok(())
	}

	pub fn message(&self) -> Option<&str> {
		self.message.as_deref()
	}

	pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
		self.cause.as_deref()
	}

	/// Unwraps the cause.
	///
	/// A failure that never received a cause yields a [`MissingCause`] fault, so
	/// the wrapper itself never escapes.
	pub fn into_cause(self) -> Fault {
		match self.cause {
			Some(cause) => cause,
			None => Box::new(MissingCause(self.message.unwrap_or_default())),
		}
	}
}

impl fmt::Debug for InvocationFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InvocationFailure")
			.field("message", &self.message)
			.field("cause", &self.cause)
			.finish()
	}
}

impl fmt::Display for InvocationFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match (&self.message, &self.cause) {
			(Some(message), _) => f.write_str(message),
			(None, Some(cause)) => write!(f, "{cause}"),
			(None, None) => f.write_str("invocation failed"),
		}
	}
}

impl StdError for InvocationFailure {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		self.cause.as_deref().map(|cause| cause as &(dyn StdError + 'static))
	}
}

/// Dispatchers known to this process, by id.
///
/// Used to reconnect a transmitted [`ProxyHandler`] with its dispatcher.
#[derive(Default)]
pub struct DispatcherRegistry {
	by_id: RwLock<FxHashMap<Arc<str>, Arc<dyn Dispatcher>>>,
}

impl DispatcherRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `dispatcher` under its id, returning any dispatcher it replaces.
	pub fn register(&self, dispatcher: Arc<dyn Dispatcher>) -> Option<Arc<dyn Dispatcher>> {
		let id: Arc<str> = Arc::from(dispatcher.id());
		self.by_id.write().insert(id, dispatcher)
	}

	pub fn get(&self, id: &str) -> Option<Arc<dyn Dispatcher>> {
		self.by_id.read().get(id).cloned()
	}

	pub fn remove(&self, id: &str) -> Option<Arc<dyn Dispatcher>> {
		self.by_id.write().remove(id)
	}
}

impl fmt::Debug for DispatcherRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.by_id.read().keys()).finish()
	}
}
