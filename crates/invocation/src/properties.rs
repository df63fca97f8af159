//! Immutable, copy-on-write invocation properties.

use std::fmt;
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;

use crate::value::Value;

type Entries = IndexMap<Arc<str>, Value>;

static EMPTY: LazyLock<PropertyMap> = LazyLock::new(|| PropertyMap(Arc::new(Entries::new())));

/// Contextual metadata attached to an invocation.
///
/// Maps are never mutated once built. Deriving a new map goes through
/// [`PropertyMap::builder`], which shares the source entries until the first
/// change. Every empty map is interchangeable with [`PropertyMap::empty`], and
/// builders collapse empty results into it.
#[derive(Clone)]
pub struct PropertyMap(Arc<Entries>);

impl PropertyMap {
	/// The canonical empty map.
	pub fn empty() -> Self {
		EMPTY.clone()
	}

	/// Starts a builder seeded with this map's entries.
	pub fn builder(&self) -> PropertyMapBuilder {
		PropertyMapBuilder {
			entries: Arc::clone(&self.0),
		}
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(key, value)| (&**key, value))
	}

	/// Returns true if this is the shared empty singleton.
	pub fn is_canonical_empty(&self) -> bool {
		Arc::ptr_eq(&self.0, &EMPTY.0)
	}

	/// Returns true if both maps share the same entries.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	/// Replaces any empty map with the canonical singleton.
	pub(crate) fn canonical(self) -> Self {
		if self.is_empty() { Self::empty() } else { self }
	}
}

impl Default for PropertyMap {
	fn default() -> Self {
		Self::empty()
	}
}

impl PartialEq for PropertyMap {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other) || self.0 == other.0
	}
}

impl fmt::Debug for PropertyMap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.iter()).finish()
	}
}

impl<K: Into<Arc<str>>> FromIterator<(K, Value)> for PropertyMap {
	fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
		Self(Arc::new(iter.into_iter().map(|(key, value)| (key.into(), value)).collect())).canonical()
	}
}

/// Derives a new [`PropertyMap`] from an existing one.
///
/// The source map's entries are copied on the first change only.
#[derive(Clone)]
pub struct PropertyMapBuilder {
	entries: Arc<Entries>,
}

impl PropertyMapBuilder {
	/// Starts from the empty map.
	pub fn new() -> Self {
		PropertyMap::empty().builder()
	}

	/// Sets `key`, replacing any previous value.
	pub fn insert(mut self, key: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
		Arc::make_mut(&mut self.entries).insert(key.into(), value.into());
		self
	}

	/// Removes `key` if present.
	pub fn remove(mut self, key: &str) -> Self {
		if self.entries.contains_key(key) {
			Arc::make_mut(&mut self.entries).shift_remove(key);
		}
		self
	}

	pub fn build(self) -> PropertyMap {
		PropertyMap(self.entries).canonical()
	}
}

impl Default for PropertyMapBuilder {
	fn default() -> Self {
		Self::new()
	}
}
