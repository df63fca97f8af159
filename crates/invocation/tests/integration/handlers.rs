use std::sync::Arc;

use courier_invocation::dispatch::INVOCATION;
use courier_invocation::{Capability, DispatcherRegistry, Error, GrantTable, Proxy, ProxyHandler, Value};

use crate::common::{Summing, calculator_domain};

#[test]
fn granted_handler_is_reconstituted_and_usable() {
	let (_domain, iface) = calculator_domain("calc");
	let registry = DispatcherRegistry::new();
	registry.register(Arc::new(Summing));
	let bytes = ProxyHandler::new(Arc::new(Summing)).encode().unwrap();

	let gate = GrantTable::new().grant("summing", INVOCATION);
	let handler = ProxyHandler::decode(&bytes, &registry, &gate).unwrap();
	let calc = Proxy::new(iface, handler);
	assert_eq!(calc.call("add", vec![Value::from(2), Value::from(3)]).unwrap(), Value::Int(5));
}

#[test]
fn withheld_capability_refuses_handler() {
	let registry = DispatcherRegistry::new();
	registry.register(Arc::new(Summing));
	let bytes = ProxyHandler::new(Arc::new(Summing)).encode().unwrap();

	let gate = GrantTable::new().grant("summing", Capability::new("observe"));
	let err = ProxyHandler::decode(&bytes, &registry, &gate).unwrap_err();
	assert!(matches!(err, Error::PermissionDenied { ref dispatcher, .. } if dispatcher == "summing"));
}
