//! Isolation domains: which classes and methods are visible together.
//!
//! A [`Domain`] plays the role a class loader plays in a reflective runtime. It
//! resolves type names to [`TypeRef`]s and (name, parameter types) pairs to
//! [`MethodRef`]s. Built-in names and array syntax are handled before any class
//! table is consulted, so only declared class names reach [`Domain::find_class`].
//!
//! [`LocalDomain`] is the in-process implementation: classes are defined from
//! [`ClassDecl`]s, and lookups fall back to an optional parent domain.

mod types;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

pub use self::types::{Builtin, ClassRef, MethodRef, TypeRef};
use self::types::ClassData;
use crate::dispatch::Fault;
use crate::error::{Error, ResolveError, Result};
use crate::value::Value;

/// Name of the root class every class implicitly extends.
pub const ROOT_CLASS: &str = "object";

/// Process-unique domain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(u64);

impl DomainId {
	fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}

	/// Raw numeric id.
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for DomainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "domain#{}", self.0)
	}
}

/// Type and method resolution capability of an isolation domain.
pub trait Domain: Send + Sync {
	/// Identifier of this domain.
	fn id(&self) -> DomainId;

	/// Human-readable label, used in errors and logs.
	fn label(&self) -> &str;

	/// Looks up a declared class visible from this domain.
	fn find_class(&self, name: &str) -> Option<ClassRef>;

	/// Resolves a type name.
	///
	/// Built-in names never reach [`find_class`](Self::find_class). Array names
	/// (`T[]`) are resolved by resolving their component type.
	fn resolve_type(&self, name: &str) -> std::result::Result<TypeRef, ResolveError> {
		if let Some(builtin) = Builtin::from_name(name) {
			return Ok(TypeRef::Builtin(builtin));
		}
		if let Some(component) = name.strip_suffix("[]") {
			return Ok(TypeRef::array_of(self.resolve_type(component)?));
		}
		self.find_class(name).map(TypeRef::Class).ok_or_else(|| ResolveError::TypeNotFound {
			name: name.to_owned(),
			domain: self.label().to_owned(),
		})
	}

	/// Resolves a name that must denote a class.
	fn resolve_class(&self, name: &str) -> std::result::Result<ClassRef, ResolveError> {
		match self.resolve_type(name)? {
			TypeRef::Class(class) => Ok(class),
			_ => Err(ResolveError::NotAClass { name: name.to_owned() }),
		}
	}

	/// Resolves the method of `owner` with exactly this name and parameter types.
	fn resolve_method(
		&self,
		owner: &ClassRef,
		name: &str,
		params: &[TypeRef],
	) -> std::result::Result<MethodRef, ResolveError> {
		owner.find_method(name, params)?.ok_or_else(|| ResolveError::MethodNotFound {
			owner: owner.name().to_owned(),
			method: format!(
				"{name}({})",
				params.iter().map(TypeRef::name).collect::<Vec<_>>().join(",")
			),
		})
	}
}

/// Body of a concrete method: `(receiver, args) -> result`.
pub type MethodBody = Arc<dyn Fn(&Value, &[Value]) -> std::result::Result<Value, Fault> + Send + Sync>;

/// Declaration of a method: name, parameter type names, optional body.
#[derive(Clone)]
pub struct MethodDecl {
	pub(crate) name: Arc<str>,
	pub(crate) params: Vec<Arc<str>>,
	pub(crate) body: Option<MethodBody>,
}

impl MethodDecl {
	/// Declares an abstract method.
	pub fn new<N, P>(name: N, params: P) -> Self
	where
		N: Into<Arc<str>>,
		P: IntoIterator,
		P::Item: Into<Arc<str>>,
	{
		Self {
			name: name.into(),
			params: params.into_iter().map(Into::into).collect(),
			body: None,
		}
	}

	/// Attaches a body.
	pub fn body<F>(mut self, body: F) -> Self
	where
		F: Fn(&Value, &[Value]) -> std::result::Result<Value, Fault> + Send + Sync + 'static,
	{
		self.body = Some(Arc::new(body));
		self
	}

	/// Method name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Parameter type names.
	pub fn params(&self) -> &[Arc<str>] {
		&self.params
	}
}

impl fmt::Debug for MethodDecl {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MethodDecl")
			.field("name", &self.name)
			.field("params", &self.params)
			.field("abstract", &self.body.is_none())
			.finish()
	}
}

/// Declaration of a class.
///
/// The same declaration can be defined in several domains; each definition is a
/// distinct class sharing the method bodies.
#[derive(Debug, Clone)]
pub struct ClassDecl {
	pub(crate) name: Arc<str>,
	pub(crate) supertypes: Vec<Arc<str>>,
	pub(crate) methods: Vec<MethodDecl>,
}

impl ClassDecl {
	/// Starts a declaration with no supertypes and no methods.
	pub fn new(name: impl Into<Arc<str>>) -> Self {
		Self {
			name: name.into(),
			supertypes: Vec::new(),
			methods: Vec::new(),
		}
	}

	/// Adds a direct supertype, resolved by name in the defining domain.
	pub fn extends(mut self, supertype: impl Into<Arc<str>>) -> Self {
		self.supertypes.push(supertype.into());
		self
	}

	/// Adds a method.
	pub fn method(mut self, method: MethodDecl) -> Self {
		self.methods.push(method);
		self
	}

	/// Class name.
	pub fn name(&self) -> &str {
		&self.name
	}
}

/// In-process domain with an optional parent.
///
/// Lookups consult this domain's own classes first and then the parent, so a
/// child that defines a class of the same name shadows the parent's.
pub struct LocalDomain {
	id: DomainId,
	label: String,
	parent: Option<Arc<dyn Domain>>,
	classes: RwLock<FxHashMap<Arc<str>, ClassRef>>,
	this: Weak<LocalDomain>,
}

impl LocalDomain {
	/// Creates a top-level domain that defines the root class.
	pub fn root(label: impl Into<String>) -> Arc<Self> {
		let domain = Self::build(label.into(), None);
		let root = ClassDecl::new(ROOT_CLASS)
			.method(MethodDecl::new("equals", [Builtin::Any.name()]))
			.method(MethodDecl::new("hash_code", std::iter::empty::<&str>()))
			.method(MethodDecl::new("to_string", std::iter::empty::<&str>()));
		domain.classes.write().insert(Arc::clone(&root.name), domain.class_of(root));
		domain
	}

	/// Creates a domain that delegates unresolved names to `parent`.
	pub fn child(label: impl Into<String>, parent: Arc<dyn Domain>) -> Arc<Self> {
		Self::build(label.into(), Some(parent))
	}

	fn build(label: String, parent: Option<Arc<dyn Domain>>) -> Arc<Self> {
		Arc::new_cyclic(|this| Self {
			id: DomainId::next(),
			label,
			parent,
			classes: RwLock::new(FxHashMap::default()),
			this: this.clone(),
		})
	}

	/// Parent domain, if any.
	pub fn parent(&self) -> Option<&Arc<dyn Domain>> {
		self.parent.as_ref()
	}

	/// Defines a class in this domain.
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidArgument`] if the name is empty, denotes a
	/// built-in or array type, or is already defined in this domain.
	pub fn define(&self, decl: ClassDecl) -> Result<ClassRef> {
		if decl.name.is_empty() {
			return Err(Error::InvalidArgument("class name is empty".into()));
		}
		if Builtin::from_name(&decl.name).is_some() || decl.name.ends_with("[]") {
			return Err(Error::InvalidArgument(format!("{} is reserved", decl.name)));
		}
		let mut classes = self.classes.write();
		if classes.contains_key(&decl.name) {
			return Err(Error::InvalidArgument(format!("{} is already defined in {}", decl.name, self.label)));
		}
		tracing::debug!(domain = %self.label, class = %decl.name, "defining class");
		let name = Arc::clone(&decl.name);
		let class = self.class_of(decl);
		classes.insert(name, class.clone());
		Ok(class)
	}

	fn class_of(&self, decl: ClassDecl) -> ClassRef {
		let domain: Weak<dyn Domain> = self.this.clone();
		ClassRef(Arc::new(ClassData {
			domain_id: self.id,
			domain,
			decl,
		}))
	}
}

impl Domain for LocalDomain {
	fn id(&self) -> DomainId {
		self.id
	}

	fn label(&self) -> &str {
		&self.label
	}

	fn find_class(&self, name: &str) -> Option<ClassRef> {
		if let Some(class) = self.classes.read().get(name) {
			return Some(class.clone());
		}
		self.parent.as_ref()?.find_class(name)
	}
}

impl fmt::Debug for LocalDomain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LocalDomain")
			.field("id", &self.id)
			.field("label", &self.label)
			.field("classes", &self.classes.read().len())
			.finish()
	}
}

#[cfg(test)]
mod tests;
