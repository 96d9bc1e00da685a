//! Pass 4: parameter kinds from call sites.
//!
//! Every call of a user function (and every method call on a receiver of
//! known model kind) contributes the kinds of its arguments. A parameter
//! position moves off Number the first time any call site passes Text, a
//! List, a Matrix or a model instance there; a later call site passing a
//! different non-Number kind is reported and ignored. Call sites are taken
//! in scope order (entry, functions, methods) and written order within a
//! scope, and every round starts over from Number.
//!
//! Initializer parameters are not merged from call sites. They follow a
//! name/usage rule: a string-hint name, or a parameter stored straight
//! into a non-Number field, takes that kind.

use std::collections::BTreeSet;

use crate::ast::navigate::{self, stmt_exprs, walk_expr, walk_stmts};
use crate::ast::{AssignTarget, Expr, ModelDef, Program, Stmt};
use crate::types::Kind;

use super::hints::is_text_hint;
use super::{scope_body, Inference, ScopeId};

/// Whose parameter a call site feeds.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Callee {
    Function(String),
    Method { model: String, method: String },
}

impl std::fmt::Display for Callee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callee::Function(name) => write!(f, "{}", name),
            Callee::Method { model, method } => write!(f, "{}.{}", model, method),
        }
    }
}

/// One argument observation, in call-site order.
struct ArgKind {
    callee: Callee,
    position: usize,
    kind: Kind,
    site: ScopeId,
}

/// Pass 4 state kept across refinement rounds.
#[derive(Default)]
pub(super) struct ParamInference {
    /// Conflicts already reported.
    warned: BTreeSet<(Callee, usize, Kind)>,
}

impl ParamInference {
    /// Rebuild call-site parameter kinds from this round's observations.
    /// Returns true if any parameter kind changed.
    pub(super) fn run(&mut self, ctx: &mut Inference, program: &Program) -> bool {
        let observed = collect_arguments(ctx, program);
        let before = call_site_params(ctx);
        reset_call_site_params(ctx);
        for arg in observed {
            let Some(slot) = param_slot(ctx, &arg.callee, arg.position) else {
                continue;
            };
            let (name, current) = slot;
            if *current == Kind::Number {
                log::debug!(
                    "params: `{}` of `{}` is {} (from a call in {})",
                    name,
                    arg.callee,
                    arg.kind,
                    arg.site
                );
                *current = arg.kind;
            } else if *current != arg.kind {
                let key = (arg.callee.clone(), arg.position, arg.kind.clone());
                if self.warned.insert(key) {
                    log::warn!(
                        "params: `{}` of `{}` is {}, but a call in {} passes {}; keeping {}",
                        name,
                        arg.callee,
                        current,
                        arg.site,
                        arg.kind,
                        current
                    );
                }
            }
        }
        let mut changed = call_site_params(ctx) != before;
        changed |= init_params(ctx, program);
        changed
    }
}

/// Kinds of every parameter decided by call sites (initializers excluded).
fn call_site_params(ctx: &Inference) -> Vec<Kind> {
    let functions = ctx.functions.values();
    let methods = ctx
        .models
        .values()
        .flat_map(|m| m.methods.values())
        .filter(|sig| sig.name != ModelDef::INITIALIZER);
    functions
        .chain(methods)
        .flat_map(|sig| sig.params.iter().map(|(_, kind)| kind.clone()))
        .collect()
}

fn reset_call_site_params(ctx: &mut Inference) {
    let functions = ctx.functions.values_mut();
    let methods = ctx
        .models
        .values_mut()
        .flat_map(|m| m.methods.values_mut())
        .filter(|sig| sig.name != ModelDef::INITIALIZER);
    for sig in functions.chain(methods) {
        for (_, kind) in sig.params.iter_mut() {
            *kind = Kind::Number;
        }
    }
}

/// The (name, kind) slot of parameter `position` of `callee`.
fn param_slot<'c>(
    ctx: &'c mut Inference,
    callee: &Callee,
    position: usize,
) -> Option<(&'c str, &'c mut Kind)> {
    let sig = match callee {
        Callee::Function(name) => ctx.functions.get_mut(name)?,
        Callee::Method { model, method } => ctx.models.get_mut(model)?.methods.get_mut(method)?,
    };
    sig.params
        .get_mut(position)
        .map(|(name, kind)| (name.as_str(), kind))
}

/// Promoting argument kinds of every user call, scopes in source order.
fn collect_arguments(ctx: &Inference, program: &Program) -> Vec<ArgKind> {
    let mut observed = Vec::new();
    for id in Inference::scope_order(program) {
        let Some(env) = ctx.env(&id) else {
            continue;
        };
        let Some(body) = scope_body(program, &id) else {
            continue;
        };
        walk_stmts(body, &mut |stmt| {
            for expr in stmt_exprs(stmt) {
                walk_expr(expr, &mut |sub| {
                    let Expr::Call { callee, args } = sub else {
                        return;
                    };
                    let target = match callee.as_ref() {
                        Expr::Ident { name } if ctx.is_function(name) => {
                            Callee::Function(name.clone())
                        }
                        Expr::Attr { object, name } if name != ModelDef::INITIALIZER => {
                            match env.kind_of(object) {
                                Kind::Model(model)
                                    if ctx
                                        .models
                                        .get(&model)
                                        .is_some_and(|m| m.methods.contains_key(name)) =>
                                {
                                    Callee::Method {
                                        model,
                                        method: name.clone(),
                                    }
                                }
                                _ => return,
                            }
                        }
                        _ => return,
                    };
                    for (position, arg) in args.iter().enumerate() {
                        let kind = env.kind_of(arg);
                        if kind.promotes() {
                            observed.push(ArgKind {
                                callee: target.clone(),
                                position,
                                kind,
                                site: id.clone(),
                            });
                        }
                    }
                });
            }
        });
    }
    observed
}

/// Initializer parameters: string-hint names are Text; a parameter stored
/// straight into a field (`self.f = p`) takes that field's kind when the
/// field is not Number.
fn init_params(ctx: &mut Inference, program: &Program) -> bool {
    let mut changed = false;
    for model in navigate::models(program) {
        let Some(init) = model.initializer() else {
            continue;
        };
        let Some(info) = ctx.models.get_mut(&model.name) else {
            continue;
        };
        let mut fed: Vec<(String, Kind)> = Vec::new();
        walk_stmts(&init.body, &mut |stmt| {
            if let Stmt::Assign {
                target: AssignTarget::Field { object, field },
                value: Expr::Ident { name },
            } = stmt
            {
                if object.as_ident() == Some("self") {
                    if let Some(kind) = info.fields.get(field) {
                        fed.push((name.clone(), kind.clone()));
                    }
                }
            }
        });
        let Some(sig) = info.methods.get_mut(ModelDef::INITIALIZER) else {
            continue;
        };
        for (param, kind) in sig.params.iter_mut() {
            if *kind != Kind::Number {
                continue;
            }
            let decided = if is_text_hint(param) {
                Some(Kind::Text)
            } else {
                fed.iter()
                    .find(|(name, k)| name == param && k.promotes())
                    .map(|(_, k)| k.clone())
            };
            if let Some(decided) = decided {
                log::debug!("params: `{}` of `{}.init` is {}", param, model.name, decided);
                *kind = decided;
                changed = true;
            }
        }
    }
    changed
}
