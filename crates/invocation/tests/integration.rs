#![allow(unused_crate_dependencies)]

#[path = "integration/common/mod.rs"]
mod common;

#[path = "integration/calculator.rs"]
mod calculator;

#[path = "integration/cross_domain.rs"]
mod cross_domain;

#[path = "integration/handlers.rs"]
mod handlers;
