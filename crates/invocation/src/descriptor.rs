//! Domain-independent method identity.
//!
//! A [`MethodDescriptor`] names a method by its name and the ordered names of its
//! parameter types. It carries no reference to a declaring class, so it can be
//! used as a hash-table key and as the wire-level reference for a method that a
//! receiver re-binds against its own copy of the declaring class.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::domain::{Builtin, ClassRef, MethodRef};
use crate::error::{Error, ResolveError, Result};

/// Unique identification of a method within some class.
///
/// Equality and hashing depend only on the name and the full ordered parameter
/// type name sequence. The hash is derived data: it is recomputed whenever a
/// descriptor is built or decoded and is never transmitted.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "DescriptorFrame", into = "DescriptorFrame")]
pub struct MethodDescriptor {
	name: Arc<str>,
	parameter_types: Arc<[Arc<str>]>,
	hash: u64,
}

/// Descriptor of the universal equality operation, `equals(any)`.
pub static EQUALS: LazyLock<MethodDescriptor> =
	LazyLock::new(|| MethodDescriptor::from_parts("equals".into(), Arc::from([Arc::from(Builtin::Any.name())])));

/// Descriptor of the universal hash operation, `hash_code()`.
pub static HASH_CODE: LazyLock<MethodDescriptor> =
	LazyLock::new(|| MethodDescriptor::from_parts("hash_code".into(), Arc::from([])));

/// Descriptor of the universal string-form operation, `to_string()`.
pub static TO_STRING: LazyLock<MethodDescriptor> =
	LazyLock::new(|| MethodDescriptor::from_parts("to_string".into(), Arc::from([])));

impl MethodDescriptor {
	/// Builds a descriptor from an explicit name and parameter type names.
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidArgument`] if `name` is empty.
	pub fn new<N, P>(name: N, parameter_types: P) -> Result<Self>
	where
		N: Into<Arc<str>>,
		P: IntoIterator,
		P::Item: Into<Arc<str>>,
	{
		let name = name.into();
		if name.is_empty() {
			return Err(Error::InvalidArgument("method name is empty".into()));
		}
		Ok(Self::from_parts(name, parameter_types.into_iter().map(Into::into).collect()))
	}

	/// Extracts the descriptor of a live method.
	pub fn of(method: &MethodRef) -> Self {
		Self::from_parts(
			Arc::from(method.name()),
			method.parameter_types().iter().map(|ty| Arc::from(ty.name())).collect(),
		)
	}

	fn from_parts(name: Arc<str>, parameter_types: Arc<[Arc<str>]>) -> Self {
		let hash = calculate_hash(&name, &parameter_types);
		Self {
			name,
			parameter_types,
			hash,
		}
	}

	/// Returns the method name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the parameter type names in declaration order.
	pub fn parameter_types(&self) -> &[Arc<str>] {
		&self.parameter_types
	}

	/// Returns the cached hash value.
	pub const fn hash_code(&self) -> u64 {
		self.hash
	}

	/// Looks up the method this descriptor names on `target`.
	///
	/// Parameter type names are resolved in `target`'s own domain; built-in
	/// names never reach the domain's class table.
	///
	/// # Errors
	///
	/// Returns [`ResolveError::TypeNotFound`] if a parameter type is not visible
	/// from `target`'s domain and [`ResolveError::MethodNotFound`] if no method
	/// matches exactly.
	pub fn resolve(&self, target: &ClassRef) -> std::result::Result<MethodRef, ResolveError> {
		let domain = target.domain()?;
		let types = self
			.parameter_types
			.iter()
			.map(|name| domain.resolve_type(name))
			.collect::<std::result::Result<Vec<_>, _>>()?;
		domain.resolve_method(target, &self.name, &types)
	}
}

/// `hash(name) * 7 + ordered_hash(parameter_types)`, where the ordered hash folds
/// element hashes with the usual `31 * h + e` sequence combiner.
fn calculate_hash(name: &str, parameter_types: &[Arc<str>]) -> u64 {
	let ordered = parameter_types
		.iter()
		.fold(1u64, |acc, ty| acc.wrapping_mul(31).wrapping_add(str_hash(ty)));
	str_hash(name).wrapping_mul(7).wrapping_add(ordered)
}

fn str_hash(s: &str) -> u64 {
	let mut hasher = FxHasher::default();
	s.hash(&mut hasher);
	hasher.finish()
}

impl PartialEq for MethodDescriptor {
	fn eq(&self, other: &Self) -> bool {
		self.hash == other.hash && self.name == other.name && self.parameter_types == other.parameter_types
	}
}

impl Eq for MethodDescriptor {}

impl Hash for MethodDescriptor {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_u64(self.hash);
	}
}

impl fmt::Display for MethodDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Method {}({})", self.name, self.parameter_types.join(","))
	}
}

impl fmt::Debug for MethodDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MethodDescriptor")
			.field("name", &self.name)
			.field("parameter_types", &self.parameter_types)
			.finish()
	}
}

#[derive(Serialize, Deserialize)]
struct DescriptorFrame {
	name: String,
	parameter_types: Vec<String>,
}

impl TryFrom<DescriptorFrame> for MethodDescriptor {
	type Error = Error;

	fn try_from(frame: DescriptorFrame) -> Result<Self> {
		Self::new(frame.name, frame.parameter_types)
	}
}

impl From<MethodDescriptor> for DescriptorFrame {
	fn from(descriptor: MethodDescriptor) -> Self {
		Self {
			name: descriptor.name.to_string(),
			parameter_types: descriptor.parameter_types.iter().map(|ty| ty.to_string()).collect(),
		}
	}
}
