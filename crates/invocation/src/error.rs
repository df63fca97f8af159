//! Error types for method resolution, envelope transport, and dispatch.

use thiserror::Error;

use crate::descriptor::MethodDescriptor;
use crate::dispatch::Capability;

/// Failure to resolve a type or method inside a domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
	/// A named type is not visible from the domain.
	#[error("type not found: {name} (in {domain})")]
	TypeNotFound {
		/// Type name as requested.
		name: String,
		/// Label of the domain the lookup ran in.
		domain: String,
	},
	/// No method with the requested name and parameter types exists on the class.
	#[error("method not found: {method} on {owner}")]
	MethodNotFound {
		/// Name of the class that was searched.
		owner: String,
		/// Requested signature, e.g. `add(int,int)`.
		method: String,
	},
	/// The domain that defined a class has been dropped.
	#[error("domain of class {class} is no longer loaded")]
	DomainUnloaded {
		/// Name of the orphaned class.
		class: String,
	},
	/// More than one method matches a lookup by name and arity.
	#[error("ambiguous method: {method} on {owner}")]
	AmbiguousMethod {
		/// The class the search started from.
		owner: String,
		/// The method name and arity.
		method: String,
	},
	/// A name resolved to a built-in or array type where a class was required.
	#[error("{name} is not a class")]
	NotAClass {
		/// The offending type name.
		name: String,
	},
}

/// Errors raised by envelope construction, cloning, and transport.
#[derive(Debug, Error)]
pub enum Error {
	/// A construction-time contract was violated.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// A type or method could not be resolved.
	#[error(transparent)]
	Resolve(#[from] ResolveError),

	/// A received envelope could not be re-bound to a live method.
	///
	/// This indicates a deployment mismatch between sender and receiver and is
	/// not worth retrying.
	#[error("cannot re-bind {descriptor}: {source}")]
	Rebind {
		/// Descriptor carried by the envelope.
		descriptor: MethodDescriptor,
		/// Why resolution failed.
		source: ResolveError,
	},

	/// A value is bound to its domain and cannot be cloned or encoded.
	#[error("{kind} values cannot leave their domain")]
	NotTransferable {
		/// Value kind, e.g. `proxy`.
		kind: &'static str,
	},

	/// The frame codec failed.
	#[error("codec error: {0}")]
	Codec(#[from] postcard::Error),

	/// A decoded frame violates the envelope layout.
	#[error("malformed frame: {0}")]
	MalformedFrame(String),

	/// A decoded frame exceeds a configured limit.
	#[error("{what} exceeds limit of {limit}")]
	LimitExceeded {
		/// Which limit was hit.
		what: &'static str,
		/// The configured limit.
		limit: usize,
	},

	/// A transmitted handler names a dispatcher this process does not know.
	#[error("no dispatcher registered as {0:?}")]
	UnknownDispatcher(String),

	/// The capability gate refused a dispatcher.
	#[error("dispatcher {dispatcher:?} does not hold the {capability} capability")]
	PermissionDenied {
		/// Id of the refused dispatcher.
		dispatcher: String,
		/// Capability that was checked.
		capability: Capability,
	},
}

/// Result type for courier operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fault raised when an abstract method is invoked directly.
#[derive(Debug, Clone, Error)]
#[error("method {0} has no body")]
pub struct AbstractMethod(pub String);

/// Fault surfaced when a dispatcher reports a failure that never received a cause.
#[derive(Debug, Clone, Error)]
#[error("invocation failed without a cause: {0}")]
pub struct MissingCause(pub String);
