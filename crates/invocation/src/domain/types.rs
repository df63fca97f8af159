//! Type and method references bound to a domain.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use rustc_hash::FxHashSet;

use super::{ClassDecl, Domain, DomainId, MethodDecl, ROOT_CLASS};
use crate::descriptor::MethodDescriptor;
use crate::dispatch::Fault;
use crate::error::{AbstractMethod, ResolveError};
use crate::value::Value;

/// Types every domain understands without a class lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Builtin {
	Void,
	Bool,
	Byte,
	Short,
	Int,
	Long,
	Char,
	Float,
	Double,
	Str,
	Bytes,
	/// Top type accepted by the universal operations.
	Any,
}

impl Builtin {
	/// All built-in types.
	pub const ALL: [Self; 12] = [
		Self::Void,
		Self::Bool,
		Self::Byte,
		Self::Short,
		Self::Int,
		Self::Long,
		Self::Char,
		Self::Float,
		Self::Double,
		Self::Str,
		Self::Bytes,
		Self::Any,
	];

	/// Canonical type name.
	pub const fn name(self) -> &'static str {
		match self {
			Self::Void => "void",
			Self::Bool => "bool",
			Self::Byte => "byte",
			Self::Short => "short",
			Self::Int => "int",
			Self::Long => "long",
			Self::Char => "char",
			Self::Float => "float",
			Self::Double => "double",
			Self::Str => "str",
			Self::Bytes => "bytes",
			Self::Any => "any",
		}
	}

	/// Parses a canonical type name.
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"void" => Some(Self::Void),
			"bool" => Some(Self::Bool),
			"byte" => Some(Self::Byte),
			"short" => Some(Self::Short),
			"int" => Some(Self::Int),
			"long" => Some(Self::Long),
			"char" => Some(Self::Char),
			"float" => Some(Self::Float),
			"double" => Some(Self::Double),
			"str" => Some(Self::Str),
			"bytes" => Some(Self::Bytes),
			"any" => Some(Self::Any),
			_ => None,
		}
	}
}

/// A type as seen from some domain.
///
/// Built-in and array types are domain-independent. Class types compare by
/// identity, so two domains that each define `app.Bean` yield unequal types.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
	Builtin(Builtin),
	Array(Arc<TypeRef>),
	Class(ClassRef),
}

impl TypeRef {
	/// Array type with the given component.
	pub fn array_of(component: TypeRef) -> Self {
		Self::Array(Arc::new(component))
	}

	/// Type name: `int`, `app.Bean`, `int[][]`.
	pub fn name(&self) -> String {
		match self {
			Self::Builtin(builtin) => builtin.name().to_owned(),
			Self::Array(component) => format!("{}[]", component.name()),
			Self::Class(class) => class.name().to_owned(),
		}
	}

	/// Returns the class if this is a class type.
	pub fn as_class(&self) -> Option<&ClassRef> {
		match self {
			Self::Class(class) => Some(class),
			_ => None,
		}
	}
}

impl From<Builtin> for TypeRef {
	fn from(builtin: Builtin) -> Self {
		Self::Builtin(builtin)
	}
}

impl From<ClassRef> for TypeRef {
	fn from(class: ClassRef) -> Self {
		Self::Class(class)
	}
}

impl fmt::Debug for TypeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Class(class) => fmt::Debug::fmt(class, f),
			other => f.write_str(&other.name()),
		}
	}
}

impl fmt::Display for TypeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name())
	}
}

pub(crate) struct ClassData {
	pub(crate) domain_id: DomainId,
	pub(crate) domain: Weak<dyn Domain>,
	pub(crate) decl: ClassDecl,
}

/// A class defined by exactly one domain.
#[derive(Clone)]
pub struct ClassRef(pub(crate) Arc<ClassData>);

impl ClassRef {
	/// Fully qualified class name.
	pub fn name(&self) -> &str {
		&self.0.decl.name
	}

	/// Id of the defining domain.
	pub fn domain_id(&self) -> DomainId {
		self.0.domain_id
	}

	/// Returns the defining domain.
	///
	/// # Errors
	///
	/// Returns [`ResolveError::DomainUnloaded`] if the domain has been dropped.
	pub fn domain(&self) -> Result<Arc<dyn Domain>, ResolveError> {
		self.0.domain.upgrade().ok_or_else(|| ResolveError::DomainUnloaded {
			class: self.name().to_owned(),
		})
	}

	/// Names of the direct supertypes, as declared.
	pub fn supertypes(&self) -> &[Arc<str>] {
		&self.0.decl.supertypes
	}

	/// Methods declared directly on this class.
	pub fn declared_methods(&self) -> &[MethodDecl] {
		&self.0.decl.methods
	}

	/// Returns true if both references name the same class.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	/// Finds the method with exactly this name and these parameter types on the
	/// class, its supertypes, or the root class.
	pub fn find_method(&self, name: &str, params: &[TypeRef]) -> Result<Option<MethodRef>, ResolveError> {
		let mut found = None;
		self.search(name, params.len(), |method| {
			if method.parameter_types() == params {
				found = Some(method);
			}
			found.is_some()
		})?;
		Ok(found)
	}

	/// Finds the method with this name and arity, searching like
	/// [`find_method`](Self::find_method).
	///
	/// Overrides of the first match with the same parameter types are ignored.
	///
	/// # Errors
	///
	/// Returns [`ResolveError::AmbiguousMethod`] if another method with this
	/// name and arity takes different parameter types.
	pub fn find_method_by_arity(&self, name: &str, arity: usize) -> Result<Option<MethodRef>, ResolveError> {
		let mut found: Option<MethodRef> = None;
		let mut ambiguous = false;
		self.search(name, arity, |method| {
			if let Some(first) = &found {
				ambiguous = first.parameter_types() != method.parameter_types();
				return ambiguous;
			}
			found = Some(method);
			false
		})?;
		if ambiguous {
			return Err(ResolveError::AmbiguousMethod {
				owner: self.name().to_owned(),
				method: format!("{name}/{arity}"),
			});
		}
		Ok(found)
	}

	/// Depth-first search: own methods, then supertypes in declaration order,
	/// then the root class. Declarations whose parameter types cannot be
	/// resolved are skipped. `visit` sees each candidate in order and returns
	/// true to stop.
	fn search(&self, name: &str, arity: usize, mut visit: impl FnMut(MethodRef) -> bool) -> Result<(), ResolveError> {
		let mut seen = FxHashSet::default();
		let mut stack = Vec::new();
		if let Some(root) = self.domain()?.find_class(ROOT_CLASS) {
			stack.push(root);
		}
		stack.push(self.clone());

		while let Some(class) = stack.pop() {
			if !seen.insert(Arc::as_ptr(&class.0)) {
				continue;
			}
			let domain = class.domain()?;
			for (slot, decl) in class.declared_methods().iter().enumerate() {
				if decl.name.as_ref() != name || decl.params.len() != arity {
					continue;
				}
				let Ok(types) = decl
					.params
					.iter()
					.map(|param| domain.resolve_type(param))
					.collect::<Result<Vec<_>, _>>()
				else {
					continue;
				};
				let method = MethodRef {
					owner: class.clone(),
					slot,
					params: types.into(),
				};
				if visit(method) {
					return Ok(());
				}
			}
			for supertype in class.supertypes().iter().rev() {
				stack.push(domain.resolve_class(supertype)?);
			}
		}
		Ok(())
	}
}

impl PartialEq for ClassRef {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl Eq for ClassRef {}

impl Hash for ClassRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::ptr::hash(Arc::as_ptr(&self.0), state);
	}
}

impl fmt::Debug for ClassRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}@{}", self.name(), self.domain_id())
	}
}

impl fmt::Display for ClassRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "class {}", self.name())
	}
}

/// A live reference to a method of a specific class.
#[derive(Clone)]
pub struct MethodRef {
	owner: ClassRef,
	slot: usize,
	params: Arc<[TypeRef]>,
}

impl MethodRef {
	fn decl(&self) -> &MethodDecl {
		&self.owner.0.decl.methods[self.slot]
	}

	/// Method name.
	pub fn name(&self) -> &str {
		&self.decl().name
	}

	/// Class that declares this method.
	pub fn declaring_class(&self) -> &ClassRef {
		&self.owner
	}

	/// Parameter types, resolved in the declaring class's domain.
	pub fn parameter_types(&self) -> &[TypeRef] {
		&self.params
	}

	/// Returns true if the method has no body.
	pub fn is_abstract(&self) -> bool {
		self.decl().body.is_none()
	}

	/// Domain-independent identity of this method.
	pub fn descriptor(&self) -> MethodDescriptor {
		MethodDescriptor::of(self)
	}

	/// Runs the method body against `receiver`.
	///
	/// # Errors
	///
	/// Returns the body's fault, or [`AbstractMethod`] if there is no body.
	pub fn invoke(&self, receiver: &Value, args: &[Value]) -> Result<Value, Fault> {
		match &self.decl().body {
			Some(body) => body(receiver, args),
			None => Err(Box::new(AbstractMethod(self.to_string()))),
		}
	}
}

impl PartialEq for MethodRef {
	fn eq(&self, other: &Self) -> bool {
		self.owner == other.owner && self.slot == other.slot
	}
}

impl Eq for MethodRef {}

impl Hash for MethodRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.owner.hash(state);
		self.slot.hash(state);
	}
}

impl fmt::Display for MethodRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}(", self.owner.name(), self.name())?;
		for (i, ty) in self.params.iter().enumerate() {
			if i > 0 {
				f.write_str(",")?;
			}
			write!(f, "{ty}")?;
		}
		f.write_str(")")
	}
}

impl fmt::Debug for MethodRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{self}@{}", self.owner.domain_id())
	}
}
