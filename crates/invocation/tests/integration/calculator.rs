use std::sync::Arc;

use courier_invocation::{
	Dispatcher, Domain, InvocationFailure, Invocation, MethodDescriptor, ObjectDispatcher, ObjectRef, PropertyMapBuilder, Proxy,
	ProxyHandler, Value,
};
use pretty_assertions::assert_eq;

use crate::common::{DivideByZero, Summing, calculator_domain};

#[test]
fn add_dispatches_and_round_trips() {
	let (domain, iface) = calculator_domain("calc");
	let descriptor = MethodDescriptor::new("add", ["int", "int"]).unwrap();
	let add = descriptor.resolve(&iface).unwrap();
	assert_eq!(add.descriptor(), descriptor);

	let invocation = Invocation::new(add.clone(), [Value::from(1), Value::from(2)]);
	let reply = Summing.dispatch(invocation.clone()).unwrap();
	assert_eq!(reply.into_value(), Value::Int(3));

	let decoded = Invocation::decode(&invocation.encode().unwrap(), &*domain).unwrap();
	assert_eq!(decoded.method().unwrap(), &add);
	assert_eq!(decoded.args(), invocation.args());
	assert!(decoded.properties().is_canonical_empty());
	assert_eq!(Summing.dispatch(decoded).unwrap().into_value(), Value::Int(3));
}

#[test]
fn decoded_envelope_rebinds_in_receiving_domain() {
	let (sender, iface) = calculator_domain("sender");
	let (receiver, receiver_iface) = calculator_domain("receiver");
	let properties = PropertyMapBuilder::new().insert("caller", "alice").build();

	let add = MethodDescriptor::new("add", ["int", "int"]).unwrap().resolve(&iface).unwrap();
	let bytes = Invocation::with_properties(properties.clone(), add, [Value::from(20), Value::from(22)])
		.encode()
		.unwrap();

	let decoded = Invocation::decode(&bytes, &*receiver).unwrap();
	assert_eq!(decoded.declaring_class(), &receiver_iface);
	assert_eq!(decoded.method().unwrap().declaring_class(), &receiver_iface);
	assert_eq!(decoded.properties(), properties);
	assert_ne!(decoded.declaring_class(), &sender.resolve_class("calc.Calculator").unwrap());
}

#[test]
fn proxy_surfaces_original_failure() {
	let (domain, iface) = calculator_domain("calc");
	let basic = domain.resolve_class("calc.Basic").unwrap();
	let dispatcher = Arc::new(ObjectDispatcher::new("basic", ObjectRef::new(basic, Vec::<(&str, Value)>::new())));
	let calc = Proxy::new(iface, ProxyHandler::new(dispatcher));

	assert_eq!(calc.call("add", vec![Value::from(1), Value::from(2)]).unwrap(), Value::Int(3));
	assert_eq!(calc.call("divide", vec![Value::from(10), Value::from(5)]).unwrap(), Value::Int(2));

	let fault = calc.call("divide", vec![Value::from(1), Value::from(0)]).unwrap_err();
	assert!(fault.downcast_ref::<DivideByZero>().is_some(), "unexpected fault: {fault}");
	assert!(fault.downcast_ref::<InvocationFailure>().is_none());
}

#[test]
fn universal_operations_are_answered_locally() {
	let (_domain, iface) = calculator_domain("calc");
	let calc = Proxy::new(iface, ProxyHandler::new(Arc::new(Summing)));
	let alias = calc.clone();

	assert_eq!(calc.call("equals", vec![Value::from(alias)]).unwrap(), Value::Bool(true));
	assert_eq!(calc.call("to_string", vec![]).unwrap(), Value::from("Proxy via summing"));
	let hash = calc.call("hash_code", vec![]).unwrap();
	assert_eq!(hash, calc.call("hash_code", vec![]).unwrap());
}
