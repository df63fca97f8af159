use std::fmt;

use super::{Dispatcher, InvocationFailure, Reply};
use crate::invocation::Invocation;
use crate::value::{ObjectRef, Value};

/// Dispatches invocations to a local object.
///
/// The invocation's descriptor is re-bound against the target's own class, so
/// an envelope built against an interface reaches the implementation.
pub struct ObjectDispatcher {
	id: String,
	target: ObjectRef,
}

impl ObjectDispatcher {
	pub fn new(id: impl Into<String>, target: ObjectRef) -> Self {
		Self { id: id.into(), target }
	}

	pub fn target(&self) -> &ObjectRef {
		&self.target
	}
}

impl Dispatcher for ObjectDispatcher {
	fn id(&self) -> &str {
		&self.id
	}

	fn dispatch(&self, invocation: Invocation) -> Result<Reply, InvocationFailure> {
		let method = invocation
			.descriptor()
			.resolve(self.target.class())
			.map_err(InvocationFailure::new)?;
		tracing::trace!(dispatcher = %self.id, %method, "invoking on target");
		method
			.invoke(&Value::Object(self.target.clone()), invocation.args())
			.map(Reply::new)
			.map_err(InvocationFailure::new)
	}
}

impl fmt::Debug for ObjectDispatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ObjectDispatcher")
			.field("id", &self.id)
			.field("target", &self.target.class())
			.finish()
	}
}
