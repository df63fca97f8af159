use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use super::Dispatcher;

/// A named permission a dispatcher may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capability(&'static str);

impl Capability {
	pub const fn new(name: &'static str) -> Self {
		Self(name)
	}

	pub const fn name(self) -> &'static str {
		self.0
	}
}

impl fmt::Display for Capability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.0)
	}
}

/// Permission to receive invocations through a reconstituted proxy handler.
pub const INVOCATION: Capability = Capability::new("invocation");

/// Decides whether a dispatcher holds a capability.
pub trait CapabilityGate {
	fn holder_implies(&self, holder: &dyn Dispatcher, capability: Capability) -> bool;
}

/// Static grants keyed by dispatcher id.
#[derive(Debug, Default, Clone)]
pub struct GrantTable {
	grants: FxHashMap<String, FxHashSet<Capability>>,
}

impl GrantTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Grants `capability` to the dispatcher with id `holder`.
	pub fn grant(mut self, holder: impl Into<String>, capability: Capability) -> Self {
		self.grants.entry(holder.into()).or_default().insert(capability);
		self
	}

	pub fn implies(&self, holder: &str, capability: Capability) -> bool {
		self.grants.get(holder).is_some_and(|caps| caps.contains(&capability))
	}
}

impl CapabilityGate for GrantTable {
	fn holder_implies(&self, holder: &dyn Dispatcher, capability: Capability) -> bool {
		self.implies(holder.id(), capability)
	}
}
