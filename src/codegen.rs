//! C code generation.
//!
//! A translation runs inference once and then lowers the program into one
//! self-contained C unit, laid out as:
//!
//! ```text
//! preamble            feature macro + standard headers
//! runtime             limit #defines + the verbatim runtime library
//! typedefs            typedef struct M M;   (every model)
//! structs             struct M { ... };
//! prototypes          constructors, methods, user functions
//! globals             static declarations of top-level names
//! models              M_new, M_method, ...
//! functions           user functions in source order
//! main                seed, then top-level statements in source order
//! ```
//!
//! Forward typedefs and prototypes come first, so declaration order in the
//! source never matters.

mod emitter;
mod model;
pub(crate) mod names;

use std::collections::BTreeSet;

use crate::ast::navigate;
use crate::ast::Program;
use crate::config::TranslateOptions;
use crate::error::CompileError;
use crate::infer::{self, Inference, ScopeId};
use crate::runtime;

use emitter::Emitter;

pub use names::c_ident;

/// One translated program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilationUnit {
    /// Complete C source, ready for a C99 compiler.
    pub source: String,
    /// The kinds the unit was generated from.
    pub inference: Inference,
}

/// Translate `program` into a C unit.
pub fn translate_program(
    program: &Program,
    options: &TranslateOptions,
) -> Result<CompilationUnit, CompileError> {
    check_unique_names(program)?;
    let inference = infer::infer(program);
    log::debug!(
        "translating {} model(s), {} function(s)",
        inference.models.len(),
        inference.functions.len()
    );

    let mut sections: Vec<String> = Vec::new();
    sections.push(runtime::PREAMBLE.to_string());
    sections.push(runtime::runtime_library(&options.runtime));
    sections.push("/* ==== program ==== */\n".to_string());

    let mut emitter = Emitter::new(&inference, program)?;

    for def in navigate::models(program) {
        emitter.typedef(def);
    }
    for def in navigate::models(program) {
        emitter.struct_definition(def);
    }
    emitter.blank();
    for def in navigate::models(program) {
        emitter.model_prototypes(def);
    }
    for def in navigate::functions(program) {
        emitter.function_prototype(def);
    }
    emitter.blank();
    emitter.globals();
    sections.push(emitter.take_output());

    for def in navigate::models(program) {
        emitter.constructor(def)?;
        emitter.methods(def)?;
    }
    for def in navigate::functions(program) {
        emitter.function(def)?;
    }
    emitter.entry(program, &options.seed_statement())?;
    sections.push(emitter.take_output());

    Ok(CompilationUnit {
        source: sections.join("\n"),
        inference,
    })
}

/// Functions and models share one C namespace each; a repeated top-level
/// declaration would be a C redefinition.
fn check_unique_names(program: &Program) -> Result<(), CompileError> {
    let mut seen = BTreeSet::new();
    let names = navigate::models(program)
        .map(|m| (m.name.as_str(), "model"))
        .chain(navigate::functions(program).map(|f| (f.name.as_str(), "function")));
    for (name, what) in names {
        if !seen.insert(name) {
            return Err(CompileError::new(format!(
                "{} `{}` is declared more than once",
                what, name
            ))
            .with_note("the C backend needs one definition per top-level name".to_string())
            .with_help("rename one of the declarations".to_string()));
        }
    }
    Ok(())
}

/// The scope of a model method.
fn method_scope(model: &str, method: &str) -> ScopeId {
    ScopeId::Method {
        model: model.to_string(),
        method: method.to_string(),
    }
}
