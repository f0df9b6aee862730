//! Slorp Compiler
//!
//! A single-pass Pratt parser that turns source text directly into a
//! [`slorp_core::Chunk`] of bytecode, with no intermediate AST. See
//! [`compiler::compile`] for the entry point.

pub mod compiler;
pub mod scanner;

pub use compiler::{compile, CompileOutcome, Diagnostic};
pub use scanner::{Scanner, Token, TokenKind};
