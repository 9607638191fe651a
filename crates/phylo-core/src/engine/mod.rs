//! Engine module: `FlowEngine` y su builder tipado.

pub mod builder;
pub mod core;

pub use builder::{EngineBuilder, EngineBuilderInit};
pub use core::FlowEngine;
