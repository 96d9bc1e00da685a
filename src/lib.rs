//! Ahead-of-time translation of Kuda programs to C.
//!
//! Kuda source carries no type annotations. The translator infers one
//! [`Kind`] for every variable, field, parameter and return position
//! ([`infer`]), then lowers the program into a single self-contained C
//! unit that embeds its own runtime library ([`translate`]).
//!
//! The syntax tree comes from an external front end and is only ever
//! borrowed, so a caller can hand the same [`ast::Program`] to the
//! interpreter when the C toolchain rejects a unit.

pub mod ast;
pub mod codegen;
pub mod config;
pub mod error;
pub mod infer;
pub mod runtime;
pub mod types;

pub use codegen::CompilationUnit;
pub use config::{RuntimeLimits, TranslateOptions};
pub use error::CompileError;
pub use infer::{infer, Inference};
pub use runtime::runtime_library;
pub use types::Kind;

use ast::Program;

/// Translate `program` with default options.
pub fn translate(program: &Program) -> Result<CompilationUnit, CompileError> {
    translate_with_options(program, &TranslateOptions::default())
}

/// Translate `program` with explicit runtime limits and seeding.
pub fn translate_with_options(
    program: &Program,
    options: &TranslateOptions,
) -> Result<CompilationUnit, CompileError> {
    codegen::translate_program(program, options)
}
