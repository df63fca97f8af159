use courier_invocation::{ClassDecl, Domain, Error, Invocation, LocalDomain, MethodDescriptor, ResolveError, Value};
use pretty_assertions::assert_eq;

use crate::common::{calculator_decls, calculator_domain};

#[test]
fn clone_into_sibling_domain_yields_independent_envelope() {
	let (master, _) = calculator_domain("master");
	let worker = LocalDomain::child("worker", master.clone());
	for decl in calculator_decls() {
		worker.define(decl).unwrap();
	}
	let iface = master.resolve_class("calc.Calculator").unwrap();
	let add = MethodDescriptor::new("add", ["int", "int"]).unwrap().resolve(&iface).unwrap();
	let original = Invocation::new(add.clone(), [Value::from(vec![Value::from(1)]), Value::from(2)]);

	let cloned = original.clone_to(&*worker).unwrap();
	let worker_iface = worker.resolve_class("calc.Calculator").unwrap();
	assert_eq!(cloned.declaring_class(), &worker_iface);
	assert_eq!(cloned.descriptor(), original.descriptor());
	assert!(!original.args()[0].same_identity(&cloned.args()[0]));
	assert!(original.args()[0].equivalent(&cloned.args()[0]));

	assert_eq!(original.method().unwrap(), &add);
	assert_eq!(original.declaring_class(), &iface);
}

#[test]
fn clone_into_child_without_overrides_reuses_parent_classes() {
	let (master, iface) = calculator_domain("master");
	let child = LocalDomain::child("plain", master);
	let add = MethodDescriptor::new("add", ["int", "int"]).unwrap().resolve(&iface).unwrap();

	let cloned = Invocation::new(add.clone(), [Value::from(1), Value::from(2)]).clone_to(&*child).unwrap();
	assert_eq!(cloned.method().unwrap(), &add);
}

#[test]
fn clone_into_unrelated_domain_fails_with_type_error() {
	let (_master, iface) = calculator_domain("master");
	let stranger = LocalDomain::root("stranger");
	stranger.define(ClassDecl::new("other.Thing")).unwrap();
	let add = MethodDescriptor::new("add", ["int", "int"]).unwrap().resolve(&iface).unwrap();
	let original = Invocation::new(add, [Value::from(1), Value::from(2)]);

	let err = original.clone_to(&*stranger).unwrap_err();
	assert!(
		matches!(err, Error::Resolve(ResolveError::TypeNotFound { ref name, ref domain }) if name == "calc.Calculator" && domain == "stranger"),
		"unexpected error: {err}"
	);
	assert_eq!(original.args(), &[Value::from(1), Value::from(2)]);
}
