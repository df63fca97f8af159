//! Argument and property values.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::dispatch::Proxy;
use crate::domain::ClassRef;

/// A value carried by an invocation, either as an argument or as a property.
///
/// Composite values are immutable and shared through `Arc`; cloning a `Value` is
/// cheap and preserves identity. Cross-domain cloning builds fresh allocations
/// instead (see [`crate::clone`]).
#[derive(Clone)]
pub enum Value {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(Arc<str>),
	Bytes(Arc<[u8]>),
	List(Arc<[Value]>),
	/// Instance of a domain class.
	Object(ObjectRef),
	/// A dispatch surface. Proxies are bound to their process and never transfer.
	Proxy(Proxy),
}

impl Value {
	/// Short name of the value's kind.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::Int(_) => "int",
			Self::Float(_) => "float",
			Self::Str(_) => "str",
			Self::Bytes(_) => "bytes",
			Self::List(_) => "list",
			Self::Object(_) => "object",
			Self::Proxy(_) => "proxy",
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) => Some(&**s),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&ObjectRef> {
		match self {
			Self::Object(object) => Some(object),
			_ => None,
		}
	}

	/// Returns true if both values share the same allocation.
	///
	/// Scalars have no identity and compare by value.
	pub fn same_identity(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Str(a), Self::Str(b)) => Arc::ptr_eq(a, b),
			(Self::Bytes(a), Self::Bytes(b)) => Arc::ptr_eq(a, b),
			(Self::List(a), Self::List(b)) => Arc::ptr_eq(a, b),
			(Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
			(Self::Proxy(a), Self::Proxy(b)) => a.ptr_eq(b),
			(a, b) => a == b,
		}
	}

	/// Structural equivalence that compares classes by name rather than identity.
	///
	/// Two values cloned into different domains are equivalent to their originals
	/// even though their classes differ.
	pub fn equivalent(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::List(a), Self::List(b)) => a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equivalent(y)),
			(Self::Object(a), Self::Object(b)) => {
				a.class().name() == b.class().name()
					&& a.0.fields.len() == b.0.fields.len()
					&& a.fields().all(|(name, value)| b.field(name).is_some_and(|other| value.equivalent(other)))
			}
			(a, b) => a == b,
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a == b,
			(Self::Str(a), Self::Str(b)) => a == b,
			(Self::Bytes(a), Self::Bytes(b)) => a == b,
			(Self::List(a), Self::List(b)) => a == b,
			(Self::Object(a), Self::Object(b)) => a == b,
			(Self::Proxy(a), Self::Proxy(b)) => a.ptr_eq(b),
			_ => false,
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("Null"),
			Self::Bool(b) => write!(f, "Bool({b})"),
			Self::Int(i) => write!(f, "Int({i})"),
			Self::Float(x) => write!(f, "Float({x})"),
			Self::Str(s) => write!(f, "Str({s:?})"),
			Self::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
			Self::List(items) => f.debug_list().entries(items.iter()).finish(),
			Self::Object(object) => fmt::Debug::fmt(object, f),
			Self::Proxy(proxy) => fmt::Debug::fmt(proxy, f),
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("null"),
			Self::Bool(b) => write!(f, "{b}"),
			Self::Int(i) => write!(f, "{i}"),
			Self::Float(x) => write!(f, "{x}"),
			Self::Str(s) => f.write_str(s),
			Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
			Self::List(items) => {
				f.write_str("[")?;
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{item}")?;
				}
				f.write_str("]")
			}
			Self::Object(object) => write!(f, "{}@{:x}", object.class().name(), object.address()),
			Self::Proxy(proxy) => write!(f, "{proxy}"),
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Self::Bool(b)
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Self::Int(i)
	}
}

impl From<i32> for Value {
	fn from(i: i32) -> Self {
		Self::Int(i.into())
	}
}

impl From<f64> for Value {
	fn from(x: f64) -> Self {
		Self::Float(x)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Self::Str(s.into())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Self::Str(s.into())
	}
}

impl From<Vec<u8>> for Value {
	fn from(bytes: Vec<u8>) -> Self {
		Self::Bytes(bytes.into())
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Self {
		Self::List(items.into())
	}
}

impl From<ObjectRef> for Value {
	fn from(object: ObjectRef) -> Self {
		Self::Object(object)
	}
}

impl From<Proxy> for Value {
	fn from(proxy: Proxy) -> Self {
		Self::Proxy(proxy)
	}
}

struct ObjectData {
	class: ClassRef,
	fields: IndexMap<Arc<str>, Value>,
}

/// Immutable instance of a domain class with named fields.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectData>);

impl ObjectRef {
	/// Creates a new instance.
	pub fn new<K, I>(class: ClassRef, fields: I) -> Self
	where
		K: Into<Arc<str>>,
		I: IntoIterator<Item = (K, Value)>,
	{
		Self(Arc::new(ObjectData {
			class,
			fields: fields.into_iter().map(|(name, value)| (name.into(), value)).collect(),
		}))
	}

	pub fn class(&self) -> &ClassRef {
		&self.0.class
	}

	pub fn field(&self, name: &str) -> Option<&Value> {
		self.0.fields.get(name)
	}

	/// Fields in definition order.
	pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.fields.iter().map(|(name, value)| (&**name, value))
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	fn address(&self) -> usize {
		Arc::as_ptr(&self.0) as usize
	}
}

/// Same class (by identity) and equal fields.
impl PartialEq for ObjectRef {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other) || (self.0.class == other.0.class && self.0.fields == other.0.fields)
	}
}

impl fmt::Debug for ObjectRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut s = f.debug_struct(self.class().name());
		for (name, value) in self.fields() {
			s.field(name, value);
		}
		s.finish()
	}
}
