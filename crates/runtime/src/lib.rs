//! Slorp Runtime
//!
//! The stack-based virtual machine that executes bytecode produced by
//! [`slorp_compiler`]. See [`vm::Vm`] for the entry point.

pub mod config;
pub mod vm;

pub use config::VmConfig;
pub use vm::{InterpretResult, Vm};
