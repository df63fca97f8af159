//! Shared test domains.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{ClassDecl, ClassRef, LocalDomain, MethodDecl};
use crate::value::Value;

#[derive(Debug, Error)]
#[error("division by zero")]
pub(crate) struct DivideByZero;

fn int_arg(args: &[Value], index: usize) -> Result<i64, crate::dispatch::Fault> {
	args.get(index)
		.and_then(Value::as_int)
		.ok_or_else(|| format!("argument {index} is not an int").into())
}

/// `calc.Calculator` (abstract `add(int,int)` and `divide(int,int)`) and its
/// implementation `calc.Basic`.
pub(crate) fn calculator() -> (Arc<LocalDomain>, ClassRef, ClassRef) {
	let domain = LocalDomain::root("calc");
	let iface = domain
		.define(
			ClassDecl::new("calc.Calculator")
				.method(MethodDecl::new("add", ["int", "int"]))
				.method(MethodDecl::new("divide", ["int", "int"])),
		)
		.unwrap();
	let basic = domain
		.define(
			ClassDecl::new("calc.Basic")
				.extends("calc.Calculator")
				.method(
					MethodDecl::new("add", ["int", "int"])
						.body(|_, args| Ok(Value::Int(int_arg(args, 0)? + int_arg(args, 1)?))),
				)
				.method(MethodDecl::new("divide", ["int", "int"]).body(|_, args| {
					let (a, b) = (int_arg(args, 0)?, int_arg(args, 1)?);
					if b == 0 {
						return Err(Box::new(DivideByZero));
					}
					Ok(Value::Int(a / b))
				})),
		)
		.unwrap();
	(domain, iface, basic)
}

/// Resolves `add(int,int)` on `class`.
pub(crate) fn add_method(class: &ClassRef) -> crate::domain::MethodRef {
	let domain = class.domain().unwrap();
	let int = domain.resolve_type("int").unwrap();
	domain.resolve_method(class, "add", &[int.clone(), int]).unwrap()
}
