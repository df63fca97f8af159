//! Envelope and handler frames.
//!
//! An envelope travels as its arguments and declaring class name followed by
//! exactly two more values: the property map (absent when empty) and the method
//! descriptor. The descriptor is always sent, even when the sender held a live
//! method, because the receiver re-binds against its own copy of the class.
//!
//! Frames are encoded with postcard. Decoding is bounded by [`WireLimits`].

use serde::{Deserialize, Serialize};

use crate::descriptor::MethodDescriptor;
use crate::dispatch::{CapabilityGate, DispatcherRegistry, ProxyHandler};
use crate::domain::{ClassRef, Domain};
use crate::error::{Error, Result};
use crate::invocation::Invocation;
use crate::properties::PropertyMap;
use crate::value::{ObjectRef, Value};

/// Bounds applied while decoding a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireLimits {
	/// Maximum encoded frame size in bytes.
	pub max_frame_len: usize,
	pub max_args: usize,
	pub max_properties: usize,
	/// Maximum length of any string, including names and keys.
	pub max_string_len: usize,
	/// Maximum nesting of lists and objects; a scalar argument has depth 1.
	pub max_depth: usize,
}

/// Limits used by [`Invocation::decode`].
pub const DEFAULT_LIMITS: WireLimits = WireLimits {
	max_frame_len: 1 << 20,
	max_args: 256,
	max_properties: 256,
	max_string_len: 64 * 1024,
	max_depth: 32,
};

impl Default for WireLimits {
	fn default() -> Self {
		DEFAULT_LIMITS
	}
}

impl WireLimits {
	fn check(&self, what: &'static str, len: usize, limit: usize) -> Result<()> {
		if len > limit {
			return Err(Error::LimitExceeded { what, limit });
		}
		Ok(())
	}

	fn check_str(&self, what: &'static str, s: &str) -> Result<()> {
		self.check(what, s.len(), self.max_string_len)
	}
}

/// One node of a value in pre-order.
///
/// Composite nodes announce how many children follow, so nesting is never
/// represented by nesting on the wire and decoding needs no recursion.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
	Bytes(Vec<u8>),
	/// A list of this many items.
	List(usize),
	/// An object whose field values follow in the order of `fields`.
	Object { class: String, fields: Vec<String> },
}

/// A whole value, flattened.
#[derive(Debug, Serialize, Deserialize)]
struct ValueFrame(Vec<Node>);

/// A composite value still waiting for children during decode.
enum Pending {
	List { len: usize, items: Vec<Value> },
	Object { class: ClassRef, names: Vec<String>, values: Vec<Value> },
}

impl Pending {
	/// Adds the next child; returns true once every child has arrived.
	fn push(&mut self, value: Value) -> bool {
		match self {
			Self::List { len, items } => {
				items.push(value);
				items.len() == *len
			}
			Self::Object { names, values, .. } => {
				values.push(value);
				values.len() == names.len()
			}
		}
	}

	fn finish(self) -> Value {
		match self {
			Self::List { items, .. } => Value::from(items),
			Self::Object { class, names, values } => {
				Value::Object(ObjectRef::new(class, names.into_iter().zip(values)))
			}
		}
	}
}

impl ValueFrame {
	fn encode(value: &Value) -> Result<Self> {
		let mut nodes = Vec::new();
		let mut pending = vec![value];
		while let Some(value) = pending.pop() {
			nodes.push(match value {
				Value::Null => Node::Null,
				Value::Bool(b) => Node::Bool(*b),
				Value::Int(i) => Node::Int(*i),
				Value::Float(x) => Node::Float(*x),
				Value::Str(s) => Node::Str(s.to_string()),
				Value::Bytes(b) => Node::Bytes(b.to_vec()),
				Value::List(items) => {
					pending.extend(items.iter().rev());
					Node::List(items.len())
				}
				Value::Object(object) => {
					let (fields, values): (Vec<String>, Vec<&Value>) =
						object.fields().map(|(name, field)| (name.to_owned(), field)).unzip();
					pending.extend(values.into_iter().rev());
					Node::Object {
						class: object.class().name().to_owned(),
						fields,
					}
				}
				Value::Proxy(_) => return Err(Error::NotTransferable { kind: value.kind() }),
			});
		}
		Ok(Self(nodes))
	}

	/// Rebuilds the value against `domain`, resolving object classes by name.
	///
	/// Depth is checked as each node is read, before any child is attached.
	fn decode(self, domain: &dyn Domain, limits: &WireLimits) -> Result<Value> {
		let mut nodes = self.0.into_iter();
		let mut open: Vec<Pending> = Vec::new();

		'nodes: loop {
			let node = nodes
				.next()
				.ok_or_else(|| Error::MalformedFrame("value ends before all children arrived".into()))?;
			limits.check("value depth", open.len() + 1, limits.max_depth)?;

			let mut value = match node {
				Node::Null => Value::Null,
				Node::Bool(b) => Value::Bool(b),
				Node::Int(i) => Value::Int(i),
				Node::Float(x) => Value::Float(x),
				Node::Str(s) => {
					limits.check_str("string", &s)?;
					Value::from(s)
				}
				Node::Bytes(b) => {
					limits.check("bytes", b.len(), limits.max_string_len)?;
					Value::from(b)
				}
				Node::List(0) => Value::from(Vec::<Value>::new()),
				Node::List(len) => {
					open.push(Pending::List {
						len,
						items: Vec::new(),
					});
					continue;
				}
				Node::Object { class, fields } => {
					limits.check_str("class name", &class)?;
					for name in &fields {
						limits.check_str("field name", name)?;
					}
					let class = domain.resolve_class(&class)?;
					if fields.is_empty() {
						Value::Object(ObjectRef::new(class, Vec::<(String, Value)>::new()))
					} else {
						open.push(Pending::Object {
							class,
							names: fields,
							values: Vec::new(),
						});
						continue;
					}
				}
			};

			while let Some(mut parent) = open.pop() {
				if !parent.push(value) {
					open.push(parent);
					continue 'nodes;
				}
				value = parent.finish();
			}

			if nodes.next().is_some() {
				return Err(Error::MalformedFrame("trailing nodes after value".into()));
			}
			return Ok(value);
		}
	}
}

#[derive(Debug, Serialize, Deserialize)]
struct InvocationFrame {
	args: Vec<ValueFrame>,
	declaring_class: String,
	properties: Option<Vec<(String, ValueFrame)>>,
	method: MethodDescriptor,
}

#[derive(Debug, Serialize, Deserialize)]
struct HandlerFrame {
	dispatcher: String,
}

fn checked_frame<'a>(bytes: &'a [u8], limits: &WireLimits) -> Result<&'a [u8]> {
	limits.check("frame", bytes.len(), limits.max_frame_len)?;
	Ok(bytes)
}

impl Invocation {
	/// Encodes the envelope.
	///
	/// # Errors
	///
	/// Returns [`Error::NotTransferable`] if an argument or property holds a
	/// proxy.
	pub fn encode(&self) -> Result<Vec<u8>> {
		let properties = self.properties();
		let frame = InvocationFrame {
			args: self.args().iter().map(ValueFrame::encode).collect::<Result<_>>()?,
			declaring_class: self.declaring_class().name().to_owned(),
			properties: if properties.is_empty() {
				None
			} else {
				Some(
					properties
						.iter()
						.map(|(key, value)| Ok((key.to_owned(), ValueFrame::encode(value)?)))
						.collect::<Result<_>>()?,
				)
			},
			method: self.descriptor().clone(),
		};
		Ok(postcard::to_allocvec(&frame)?)
	}

	/// Decodes an envelope against `domain` with [`DEFAULT_LIMITS`].
	pub fn decode(bytes: &[u8], domain: &dyn Domain) -> Result<Self> {
		Self::decode_with(bytes, domain, &DEFAULT_LIMITS)
	}

	/// Decodes an envelope against `domain`.
	///
	/// The declaring class and every object class are resolved by name in
	/// `domain`. The method stays unbound until [`Invocation::method`] is first
	/// called.
	///
	/// # Errors
	///
	/// Returns [`Error::LimitExceeded`] if the frame breaks `limits`,
	/// [`Error::Codec`] if it is not a valid frame, and a resolution error if a
	/// class is not visible from `domain`.
	pub fn decode_with(bytes: &[u8], domain: &dyn Domain, limits: &WireLimits) -> Result<Self> {
		let frame: InvocationFrame = postcard::from_bytes(checked_frame(bytes, limits)?)?;

		limits.check("args", frame.args.len(), limits.max_args)?;
		limits.check_str("class name", &frame.declaring_class)?;
		limits.check_str("method name", frame.method.name())?;
		for ty in frame.method.parameter_types() {
			limits.check_str("parameter type", ty)?;
		}

		let args = frame
			.args
			.into_iter()
			.map(|arg| arg.decode(domain, limits))
			.collect::<Result<Vec<_>>>()?;

		let properties = match frame.properties {
			None => PropertyMap::empty(),
			Some(entries) if entries.is_empty() => {
				return Err(Error::MalformedFrame("empty property map must be sent as absent".into()));
			}
			Some(entries) => {
				limits.check("properties", entries.len(), limits.max_properties)?;
				entries
					.into_iter()
					.map(|(key, value)| {
						limits.check_str("property key", &key)?;
						Ok((key, value.decode(domain, limits)?))
					})
					.collect::<Result<PropertyMap>>()?
			}
		};

		let declaring_class = domain.resolve_class(&frame.declaring_class)?;
		Ok(Self::unbound(declaring_class, frame.method, args, properties))
	}
}

impl ProxyHandler {
	/// Encodes the handler as a reference to its dispatcher.
	pub fn encode(&self) -> Result<Vec<u8>> {
		let frame = HandlerFrame {
			dispatcher: self.dispatcher().id().to_owned(),
		};
		Ok(postcard::to_allocvec(&frame)?)
	}

	/// Reconstitutes a handler, looking its dispatcher up in `registry`.
	///
	/// # Errors
	///
	/// Returns [`Error::UnknownDispatcher`] if the id is not registered and
	/// [`Error::PermissionDenied`] if `gate` refuses the dispatcher.
	pub fn decode(bytes: &[u8], registry: &DispatcherRegistry, gate: &dyn CapabilityGate) -> Result<Self> {
		let frame: HandlerFrame = postcard::from_bytes(checked_frame(bytes, &DEFAULT_LIMITS)?)?;
		let dispatcher = registry
			.get(&frame.dispatcher)
			.ok_or(Error::UnknownDispatcher(frame.dispatcher))?;
		Self::reconstitute(dispatcher, gate)
	}
}
