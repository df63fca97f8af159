//! Common domains and dispatchers for invocation integration tests.

use std::sync::Arc;

use courier_invocation::{ClassDecl, ClassRef, Dispatcher, Fault, Invocation, InvocationFailure, LocalDomain, MethodDecl, Reply, Value};

/// Failure raised by `calc.Basic.divide` for a zero divisor.
#[derive(Debug, thiserror::Error)]
#[error("division by zero")]
pub struct DivideByZero;

fn int_arg(args: &[Value], index: usize) -> Result<i64, Fault> {
	args.get(index)
		.and_then(Value::as_int)
		.ok_or_else(|| format!("argument {index} is not an int").into())
}

/// Calculator declarations: the `calc.Calculator` interface and its `calc.Basic`
/// implementation.
pub fn calculator_decls() -> [ClassDecl; 2] {
	[
		ClassDecl::new("calc.Calculator")
			.method(MethodDecl::new("add", ["int", "int"]))
			.method(MethodDecl::new("divide", ["int", "int"])),
		ClassDecl::new("calc.Basic")
			.extends("calc.Calculator")
			.method(MethodDecl::new("add", ["int", "int"]).body(|_, args| Ok(Value::Int(int_arg(args, 0)? + int_arg(args, 1)?))))
			.method(MethodDecl::new("divide", ["int", "int"]).body(|_, args| {
				let (a, b) = (int_arg(args, 0)?, int_arg(args, 1)?);
				if b == 0 {
					return Err(Box::new(DivideByZero));
				}
				Ok(Value::Int(a / b))
			})),
	]
}

/// A root domain with the calculator classes defined.
pub fn calculator_domain(label: &str) -> (Arc<LocalDomain>, ClassRef) {
	let _ = tracing_subscriber::fmt::try_init();
	let domain = LocalDomain::root(label);
	let [iface, _basic] = calculator_decls().map(|decl| domain.define(decl).expect("define calculator class"));
	(domain, iface)
}

/// Dispatcher that adds its two integer arguments directly.
pub struct Summing;

impl Dispatcher for Summing {
	fn id(&self) -> &str {
		"summing"
	}

	fn dispatch(&self, invocation: Invocation) -> Result<Reply, InvocationFailure> {
		let sum = invocation
			.args()
			.iter()
			.map(|arg| arg.as_int().ok_or_else(|| InvocationFailure::new(format!("{arg} is not an int"))))
			.sum::<Result<i64, _>>()?;
		Ok(Reply::new(Value::Int(sum)))
	}
}
