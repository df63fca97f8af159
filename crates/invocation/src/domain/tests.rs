use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

fn app_domain() -> Arc<LocalDomain> {
	let domain = LocalDomain::root("app");
	domain
		.define(
			ClassDecl::new("app.Shape")
				.method(MethodDecl::new("area", std::iter::empty::<&str>()))
				.method(MethodDecl::new("scale", ["double"])),
		)
		.unwrap();
	domain
		.define(
			ClassDecl::new("app.Square")
				.extends("app.Shape")
				.method(MethodDecl::new("area", std::iter::empty::<&str>()).body(|_, _| Ok(Value::Float(4.0)))),
		)
		.unwrap();
	domain
}

#[rstest]
#[case("int", "int")]
#[case("any", "any")]
#[case("int[]", "int[]")]
#[case("str[][]", "str[][]")]
#[case("app.Shape", "app.Shape")]
#[case("app.Shape[]", "app.Shape[]")]
fn type_names_resolve(#[case] name: &str, #[case] expected: &str) {
	let domain = app_domain();
	assert_eq!(domain.resolve_type(name).unwrap().name(), expected);
}

#[rstest]
#[case("app.Circle")]
#[case("app.Circle[]")]
#[case("")]
fn unknown_type_names_fail(#[case] name: &str) {
	let domain = app_domain();
	let err = domain.resolve_type(name).unwrap_err();
	assert!(matches!(err, ResolveError::TypeNotFound { .. }), "unexpected error: {err}");
}

#[test]
fn builtins_are_not_classes() {
	let domain = app_domain();
	assert!(matches!(domain.resolve_class("int"), Err(ResolveError::NotAClass { .. })));
	assert!(matches!(domain.resolve_class("app.Shape[]"), Err(ResolveError::NotAClass { .. })));
}

#[test]
fn builtin_names_round_trip() {
	for builtin in Builtin::ALL {
		assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
	}
}

#[test]
fn define_rejects_bad_names() {
	let domain = app_domain();
	for name in ["", "int", "app.Shape[]", "app.Shape"] {
		let err = domain.define(ClassDecl::new(name)).unwrap_err();
		assert!(matches!(err, Error::InvalidArgument(_)), "{name:?} gave {err}");
	}
}

#[test]
fn child_shadows_parent() {
	let parent = app_domain();
	let child = LocalDomain::child("child", parent.clone());

	let inherited = child.resolve_class("app.Shape").unwrap();
	assert_eq!(inherited, parent.resolve_class("app.Shape").unwrap());

	let own = child.define(ClassDecl::new("app.Shape")).unwrap();
	assert_ne!(own, inherited);
	assert_eq!(child.resolve_class("app.Shape").unwrap(), own);
	assert_eq!(own.domain_id(), child.id());
	assert_eq!(parent.resolve_class("app.Shape").unwrap(), inherited);
}

#[test]
fn methods_are_found_on_class_then_supertypes_then_root() {
	let domain = app_domain();
	let square = domain.resolve_class("app.Square").unwrap();
	let shape = domain.resolve_class("app.Shape").unwrap();
	let double = domain.resolve_type("double").unwrap();

	let area = domain.resolve_method(&square, "area", &[]).unwrap();
	assert_eq!(area.declaring_class(), &square);
	assert!(!area.is_abstract());
	assert_eq!(area.invoke(&Value::Null, &[]).unwrap(), Value::Float(4.0));

	let scale = domain.resolve_method(&square, "scale", &[double]).unwrap();
	assert_eq!(scale.declaring_class(), &shape);
	assert!(scale.is_abstract());
	assert!(scale.invoke(&Value::Null, &[Value::Float(2.0)]).is_err());

	let any = domain.resolve_type("any").unwrap();
	let equals = domain.resolve_method(&square, "equals", &[any]).unwrap();
	assert_eq!(equals.declaring_class().name(), ROOT_CLASS);
	assert_eq!(equals.to_string(), "object.equals(any)");
}

#[test]
fn parameter_types_must_match_exactly() {
	let domain = app_domain();
	let square = domain.resolve_class("app.Square").unwrap();
	let int = domain.resolve_type("int").unwrap();
	let err = domain.resolve_method(&square, "scale", &[int]).unwrap_err();
	assert_eq!(
		err,
		ResolveError::MethodNotFound {
			owner: "app.Square".into(),
			method: "scale(int)".into(),
		}
	);
}

#[test]
fn lookup_by_arity_skips_same_signature_overrides() {
	let domain = app_domain();
	let square = domain.resolve_class("app.Square").unwrap();
	let area = square.find_method_by_arity("area", 0).unwrap().unwrap();
	assert_eq!(area.declaring_class(), &square);
	assert!(square.find_method_by_arity("area", 1).unwrap().is_none());
}

#[test]
fn lookup_by_arity_refuses_overloads() {
	let domain = app_domain();
	let store = domain
		.define(
			ClassDecl::new("app.Store")
				.method(MethodDecl::new("put", ["int"]))
				.method(MethodDecl::new("put", ["str"]))
				.method(MethodDecl::new("put", ["str", "int"])),
		)
		.unwrap();

	assert_eq!(
		store.find_method_by_arity("put", 1).unwrap_err(),
		ResolveError::AmbiguousMethod {
			owner: "app.Store".into(),
			method: "put/1".into(),
		}
	);
	let put = store.find_method_by_arity("put", 2).unwrap().unwrap();
	assert_eq!(put.to_string(), "app.Store.put(str,int)");

	let str_type = domain.resolve_type("str").unwrap();
	let exact = domain.resolve_method(&store, "put", &[str_type]).unwrap();
	assert_eq!(exact.to_string(), "app.Store.put(str)");
}

#[test]
fn same_named_classes_from_different_domains_differ() {
	let a = app_domain();
	let b = app_domain();
	let shape_a = a.resolve_class("app.Shape").unwrap();
	let shape_b = b.resolve_class("app.Shape").unwrap();
	assert_ne!(shape_a, shape_b);
	assert_eq!(shape_a.name(), shape_b.name());

	let square_b = b.resolve_class("app.Square").unwrap();
	let err = a.resolve_method(&square_b, "foo", &[TypeRef::Class(shape_a)]).unwrap_err();
	assert!(matches!(err, ResolveError::MethodNotFound { .. }));
}

#[test]
fn dropped_domain_orphans_its_classes() {
	let domain = app_domain();
	let shape = domain.resolve_class("app.Shape").unwrap();
	drop(domain);
	assert!(matches!(shape.domain(), Err(ResolveError::DomainUnloaded { ref class }) if class == "app.Shape"));
}
