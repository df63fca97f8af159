//! Cloning invocations into another domain.
//!
//! Arguments and types are translated one at a time so that a failure names the
//! element that could not be carried across. A failed clone produces nothing and
//! leaves the source invocation untouched.

use std::sync::Arc;

use crate::domain::{Domain, TypeRef};
use crate::error::{Error, ResolveError, Result};
use crate::invocation::Invocation;
use crate::value::{ObjectRef, Value};

/// Maps values and types to their equivalents in a destination domain.
pub trait DomainTranslator {
	/// Produces a value native to `destination` that behaves like `value`.
	fn clone_value(&self, value: &Value, destination: &dyn Domain) -> Result<Value>;

	/// Finds the type in `destination` that corresponds to `ty`.
	fn translate_type(&self, ty: &TypeRef, destination: &dyn Domain) -> std::result::Result<TypeRef, ResolveError>;
}

/// Translator that maps classes by name and deep-copies values.
///
/// Every composite value gets a fresh allocation, so clones never share
/// identity with their originals. Proxies are process-bound and refuse to
/// clone.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralTranslator;

impl DomainTranslator for StructuralTranslator {
	fn clone_value(&self, value: &Value, destination: &dyn Domain) -> Result<Value> {
		Ok(match value {
			Value::Null => Value::Null,
			Value::Bool(b) => Value::Bool(*b),
			Value::Int(i) => Value::Int(*i),
			Value::Float(x) => Value::Float(*x),
			Value::Str(s) => Value::Str(Arc::from(&**s)),
			Value::Bytes(b) => Value::Bytes(Arc::from(&**b)),
			Value::List(items) => Value::List(
				items
					.iter()
					.map(|item| self.clone_value(item, destination))
					.collect::<Result<_>>()?,
			),
			Value::Object(object) => {
				let class = destination.resolve_class(object.class().name())?;
				let fields = object
					.fields()
					.map(|(name, field)| Ok((name, self.clone_value(field, destination)?)))
					.collect::<Result<Vec<_>>>()?;
				Value::Object(ObjectRef::new(class, fields))
			}
			Value::Proxy(_) => return Err(Error::NotTransferable { kind: value.kind() }),
		})
	}

	fn translate_type(&self, ty: &TypeRef, destination: &dyn Domain) -> std::result::Result<TypeRef, ResolveError> {
		match ty {
			TypeRef::Builtin(builtin) => Ok(TypeRef::Builtin(*builtin)),
			TypeRef::Array(component) => Ok(TypeRef::array_of(self.translate_type(component, destination)?)),
			TypeRef::Class(class) => destination.resolve_class(class.name()).map(TypeRef::Class),
		}
	}
}

impl Invocation {
	/// Clones this invocation into `destination` using [`StructuralTranslator`].
	///
	/// Every class the invocation references must be visible from `destination`.
	///
	/// # Errors
	///
	/// Returns [`ResolveError::TypeNotFound`] (wrapped in [`Error::Resolve`]) if a
	/// class is missing from `destination`, and [`Error::NotTransferable`] if an
	/// argument cannot leave its domain.
	pub fn clone_to(&self, destination: &dyn Domain) -> Result<Invocation> {
		self.clone_to_with(destination, &StructuralTranslator)
	}

	/// Clones this invocation into `destination` using a custom translator.
	///
	/// Properties are carried over as-is; translate them first if they hold
	/// domain-bound values.
	pub fn clone_to_with(&self, destination: &dyn Domain, translator: &dyn DomainTranslator) -> Result<Invocation> {
		let method = self.method()?;

		let args = self
			.args()
			.iter()
			.map(|arg| translator.clone_value(arg, destination))
			.collect::<Result<Vec<_>>>()?;

		let class = match translator.translate_type(&TypeRef::Class(self.declaring_class().clone()), destination)? {
			TypeRef::Class(class) => class,
			other => return Err(ResolveError::NotAClass { name: other.name() }.into()),
		};
		let params = method
			.parameter_types()
			.iter()
			.map(|ty| translator.translate_type(ty, destination))
			.collect::<std::result::Result<Vec<_>, _>>()?;

		let cloned = destination.resolve_method(&class, method.name(), &params)?;
		tracing::debug!(
			method = %cloned,
			from = ?self.declaring_class(),
			to = destination.label(),
			"cloned invocation into domain"
		);
		Ok(Invocation::with_properties(self.properties(), cloned, args))
	}
}
