//! The invocation envelope.

use std::fmt;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use crate::descriptor::MethodDescriptor;
use crate::domain::{ClassRef, MethodRef};
use crate::error::{Error, Result};
use crate::properties::PropertyMap;
use crate::value::Value;

/// How the envelope identifies its method.
///
/// Whichever half is missing is derived on first use and published once.
#[derive(Clone)]
enum Identity {
	/// Built around a live method; the descriptor is derived lazily.
	Bound {
		method: MethodRef,
		descriptor: OnceLock<MethodDescriptor>,
	},
	/// Received as a descriptor; the live method is re-bound lazily.
	Unbound {
		descriptor: MethodDescriptor,
		method: OnceLock<MethodRef>,
	},
}

/// A unified view of one method call: declaring class, method, arguments, and
/// contextual properties.
///
/// Everything except the property map is fixed at construction. The property
/// map is replaced atomically as a whole by [`set_properties`](Self::set_properties).
pub struct Invocation {
	args: Arc<[Value]>,
	declaring_class: ClassRef,
	identity: Identity,
	properties: ArcSwap<PropertyMap>,
}

impl Invocation {
	/// Wraps a call to `method` with empty properties.
	pub fn new(method: MethodRef, args: impl IntoIterator<Item = Value>) -> Self {
		Self::with_properties(PropertyMap::empty(), method, args)
	}

	/// Wraps a call to `method` with the given properties.
	pub fn with_properties(properties: PropertyMap, method: MethodRef, args: impl IntoIterator<Item = Value>) -> Self {
		Self {
			args: args.into_iter().collect(),
			declaring_class: method.declaring_class().clone(),
			identity: Identity::Bound {
				method,
				descriptor: OnceLock::new(),
			},
			properties: ArcSwap::from_pointee(properties.canonical()),
		}
	}

	/// Builds an envelope that only knows its method by descriptor.
	///
	/// This is the shape an envelope has on the receiving side of a transport;
	/// [`method`](Self::method) re-binds against `declaring_class` on first use.
	pub fn unbound(
		declaring_class: ClassRef,
		descriptor: MethodDescriptor,
		args: impl IntoIterator<Item = Value>,
		properties: PropertyMap,
	) -> Self {
		Self {
			args: args.into_iter().collect(),
			declaring_class,
			identity: Identity::Unbound {
				descriptor,
				method: OnceLock::new(),
			},
			properties: ArcSwap::from_pointee(properties.canonical()),
		}
	}

	/// Class that declares the invoked method.
	pub fn declaring_class(&self) -> &ClassRef {
		&self.declaring_class
	}

	/// Call arguments, possibly empty.
	pub fn args(&self) -> &[Value] {
		&self.args
	}

	/// Returns the live method, re-binding it from the descriptor if needed.
	///
	/// # Errors
	///
	/// Returns [`Error::Rebind`] if the descriptor no longer resolves against the
	/// declaring class. The sender and receiver disagree about the class, so the
	/// envelope is unusable.
	pub fn method(&self) -> Result<&MethodRef> {
		match &self.identity {
			Identity::Bound { method, .. } => Ok(method),
			Identity::Unbound { descriptor, method } => {
				if let Some(method) = method.get() {
					return Ok(method);
				}
				let resolved = descriptor.resolve(&self.declaring_class).map_err(|source| {
					tracing::error!(%descriptor, class = ?self.declaring_class, error = %source, "method re-binding failed");
					Error::Rebind {
						descriptor: descriptor.clone(),
						source,
					}
				})?;
				tracing::debug!(%descriptor, class = ?self.declaring_class, "re-bound method from descriptor");
				Ok(method.get_or_init(|| resolved))
			}
		}
	}

	/// Returns the method descriptor, deriving it from the live method if needed.
	pub fn descriptor(&self) -> &MethodDescriptor {
		match &self.identity {
			Identity::Bound { method, descriptor } => descriptor.get_or_init(|| method.descriptor()),
			Identity::Unbound { descriptor, .. } => descriptor,
		}
	}

	/// Returns true if a live method is available without resolution.
	pub fn is_bound(&self) -> bool {
		match &self.identity {
			Identity::Bound { .. } => true,
			Identity::Unbound { method, .. } => method.get().is_some(),
		}
	}

	/// Current property map.
	pub fn properties(&self) -> PropertyMap {
		PropertyMap::clone(&self.properties.load())
	}

	/// Replaces the property map. Last writer wins; nothing is merged.
	pub fn set_properties(&self, properties: PropertyMap) {
		self.properties.store(Arc::new(properties.canonical()));
	}

	/// Human-readable form listing descriptor, declaring class, and arguments.
	pub fn describe(&self) -> String {
		let args = self.args.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
		format!(
			"Invocation of {} of {} with arguments ({args})",
			self.descriptor(),
			self.declaring_class
		)
	}
}

impl Clone for Invocation {
	fn clone(&self) -> Self {
		Self {
			args: Arc::clone(&self.args),
			declaring_class: self.declaring_class.clone(),
			identity: self.identity.clone(),
			properties: ArcSwap::new(self.properties.load_full()),
		}
	}
}

impl fmt::Display for Invocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.describe())
	}
}

impl fmt::Debug for Invocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Invocation")
			.field("declaring_class", &self.declaring_class)
			.field("descriptor", self.descriptor())
			.field("args", &self.args)
			.field("properties", &self.properties())
			.field("bound", &self.is_bound())
			.finish()
	}
}
