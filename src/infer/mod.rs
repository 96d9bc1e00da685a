//! Static kind inference.
//!
//! Kuda source carries no annotations, so every model field, function
//! signature and local variable gets its kind from four best-effort passes
//! run in order over an explicit [`Inference`] context:
//!
//! 1. model registration (`models`): field kinds from `self.f = ...`
//! 2. return kinds (`returns`): first promoting `give` wins
//! 3. scope pre-scan (`scan`): first assignment fixes a name's kind
//! 4. parameter kinds (`params`): merged across call sites
//!
//! Passes 3 and 4 repeat (with return kinds refreshed in between) while a
//! parameter kind still changes, so a kind handed from `main` into `f` also
//! reaches what `f` passes on to `g`. Each round rebuilds parameter kinds
//! from all call sites, so the earliest call site wins no matter which
//! round first saw its argument kind.
//! Whatever stays undecidable is Number; inference never fails.

mod env;
pub mod hints;
mod models;
mod params;
mod returns;
mod scan;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::ast::navigate;
use crate::ast::{Program, Stmt};
use crate::types::{Kind, KindMap};

pub use env::KindEnv;

/// Upper bound on pass 3/4 refinement rounds.
const MAX_ROUNDS: usize = 8;

// ─── Types ─────────────────────────────────────────────────────────

/// A function or method signature. Method parameters exclude `self`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FnSig {
    pub name: String,
    pub params: Vec<(String, Kind)>,
    pub ret: Kind,
}

impl FnSig {
    /// A signature with every parameter and the return at Number.
    pub fn numeric(name: &str, params: &[String]) -> Self {
        Self {
            name: name.to_string(),
            params: params.iter().map(|p| (p.clone(), Kind::Number)).collect(),
            ret: Kind::Number,
        }
    }

    pub fn param_kind(&self, index: usize) -> Option<&Kind> {
        self.params.get(index).map(|(_, kind)| kind)
    }
}

/// An inferred model: fields in first-assignment order and method
/// signatures (the initializer included).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub fields: KindMap,
    pub methods: BTreeMap<String, FnSig>,
}

impl ModelInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: KindMap::new(),
            methods: BTreeMap::new(),
        }
    }

    pub fn init(&self) -> Option<&FnSig> {
        self.methods.get(crate::ast::ModelDef::INITIALIZER)
    }

    /// Kind of a field read. Unknown fields fall back on the name hints.
    pub fn field_kind(&self, field: &str) -> Kind {
        self.fields
            .get(field)
            .cloned()
            .unwrap_or_else(|| hints::fallback_kind(field))
    }
}

/// A symbol scope: the program entry, a function, or a method.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScopeId {
    Main,
    Function(String),
    Method { model: String, method: String },
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeId::Main => write!(f, "main"),
            ScopeId::Function(name) => write!(f, "{}", name),
            ScopeId::Method { model, method } => write!(f, "{}.{}", model, method),
        }
    }
}

/// Names a scope declares: every locally assigned name (parameters and
/// globals excluded), plus the element kind of lists whose contents are
/// known.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub vars: KindMap,
    pub elements: KindMap,
}

/// Everything inference learned about one program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inference {
    pub models: BTreeMap<String, ModelInfo>,
    pub functions: BTreeMap<String, FnSig>,
    pub scopes: BTreeMap<ScopeId, Scope>,
}

// ─── Entry point ───────────────────────────────────────────────────

/// Run all inference passes over `program`.
pub fn infer(program: &Program) -> Inference {
    let mut ctx = Inference::default();
    models::register_models(&mut ctx, program);
    returns::infer_returns(&mut ctx, program);

    let mut params = params::ParamInference::default();
    for round in 0..MAX_ROUNDS {
        scan::scan_scopes(&mut ctx, program);
        if !params.run(&mut ctx, program) {
            log::debug!("inference settled after {} round(s)", round + 1);
            return ctx;
        }
        // Parameter kinds feed `give` values too.
        returns::infer_returns(&mut ctx, program);
    }
    log::warn!("parameter kinds still changing after {} rounds", MAX_ROUNDS);
    scan::scan_scopes(&mut ctx, program);
    ctx
}

impl Inference {
    /// Signature behind a scope, if the scope is a function or method.
    pub fn signature(&self, id: &ScopeId) -> Option<&FnSig> {
        match id {
            ScopeId::Main => None,
            ScopeId::Function(name) => self.functions.get(name),
            ScopeId::Method { model, method } => {
                self.models.get(model).and_then(|m| m.methods.get(method))
            }
        }
    }

    pub fn scope(&self, id: &ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    /// A kind estimator for expressions inside scope `id`.
    pub fn env(&self, id: &ScopeId) -> Option<KindEnv<'_>> {
        let scope = self.scopes.get(id)?;
        let params = self
            .signature(id)
            .map(|sig| sig.params.as_slice())
            .unwrap_or(&[]);
        let (self_model, globals) = match id {
            ScopeId::Main => (None, None),
            ScopeId::Function(_) => (None, self.scopes.get(&ScopeId::Main)),
            ScopeId::Method { model, .. } => (
                self.models.get(model).map(|m| m.name.as_str()),
                self.scopes.get(&ScopeId::Main),
            ),
        };
        Some(KindEnv::new(self, scope, params, self_model, globals))
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn is_model(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Scopes in source order: entry, functions, then each model's methods.
    pub fn scope_order(program: &Program) -> Vec<ScopeId> {
        let mut order = vec![ScopeId::Main];
        order.extend(navigate::functions(program).map(|f| ScopeId::Function(f.name.clone())));
        for model in navigate::models(program) {
            for method in model.methods() {
                order.push(ScopeId::Method {
                    model: model.name.clone(),
                    method: method.name.clone(),
                });
            }
        }
        order
    }
}

impl fmt::Display for Inference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for model in self.models.values() {
            writeln!(f, "model {}", model.name)?;
            for (field, kind) in model.fields.iter() {
                writeln!(f, "  field {}: {}", field, kind)?;
            }
            for sig in model.methods.values() {
                writeln!(f, "  method {}", format_sig(sig))?;
            }
        }
        for sig in self.functions.values() {
            writeln!(f, "fun {}", format_sig(sig))?;
        }
        for (id, scope) in &self.scopes {
            if scope.vars.is_empty() {
                continue;
            }
            writeln!(f, "scope {}", id)?;
            for (name, kind) in scope.vars.iter() {
                match scope.elements.get(name) {
                    Some(elem) => writeln!(f, "  {}: {} of {}", name, kind, elem)?,
                    None => writeln!(f, "  {}: {}", name, kind)?,
                }
            }
        }
        Ok(())
    }
}

/// The statements a scope runs.
pub(crate) fn scope_body<'p>(program: &'p Program, id: &ScopeId) -> Option<&'p [Stmt]> {
    match id {
        ScopeId::Main => Some(program.statements.as_slice()),
        ScopeId::Function(name) => navigate::find_function(program, name).map(|f| f.body.as_slice()),
        ScopeId::Method { model, method } => navigate::find_model(program, model)
            .and_then(|m| m.methods().find(|f| &f.name == method))
            .map(|f| f.body.as_slice()),
    }
}

fn format_sig(sig: &FnSig) -> String {
    let params: Vec<String> = sig
        .params
        .iter()
        .map(|(name, kind)| format!("{}: {}", name, kind))
        .collect();
    format!("{}({}) -> {}", sig.name, params.join(", "), sig.ret)
}
