//! Pass 2: return kinds.
//!
//! The first `give` (depth-first, branches in written order) whose value
//! is Text, List, Matrix or a model instance decides the return kind;
//! otherwise the function returns Number. Values are estimated against a
//! body-local scan, and calls to functions not scanned yet count as
//! Number.

use crate::ast::navigate::{self, walk_stmts};
use crate::ast::{ModelDef, Program, Stmt};
use crate::types::Kind;

use super::scan::ScopeScanner;
use super::{FnSig, Inference, KindEnv};

pub(super) fn infer_returns(ctx: &mut Inference, program: &Program) {
    // Every function is visible (at Number) before any body is scanned, so
    // user functions shadow builtins from the start.
    for def in navigate::functions(program) {
        ctx.functions
            .entry(def.name.clone())
            .or_insert_with(|| FnSig::numeric(&def.name, &def.params));
    }

    for def in navigate::functions(program) {
        let ret = {
            let params = ctx
                .functions
                .get(&def.name)
                .map(|sig| sig.params.as_slice())
                .unwrap_or(&[]);
            return_kind(ctx, params, None, &def.body)
        };
        if let Some(sig) = ctx.functions.get_mut(&def.name) {
            if ret != Kind::Number {
                log::debug!("returns: `{}` gives {}", def.name, ret);
            }
            sig.ret = ret;
        }
    }

    for model in navigate::models(program) {
        for method in model.methods() {
            if method.name == ModelDef::INITIALIZER {
                continue;
            }
            let ret = {
                let params = ctx
                    .models
                    .get(&model.name)
                    .and_then(|m| m.methods.get(&method.name))
                    .map(|sig| sig.params.as_slice())
                    .unwrap_or(&[]);
                return_kind(ctx, params, Some(&model.name), &method.body)
            };
            if let Some(sig) = ctx
                .models
                .get_mut(&model.name)
                .and_then(|m| m.methods.get_mut(&method.name))
            {
                if ret != Kind::Number {
                    log::debug!("returns: `{}.{}` gives {}", model.name, method.name, ret);
                }
                sig.ret = ret;
            }
        }
    }
}

fn return_kind(
    ctx: &Inference,
    params: &[(String, Kind)],
    self_model: Option<&str>,
    body: &[Stmt],
) -> Kind {
    let scope = ScopeScanner::new(ctx, params, self_model, None).scan(body);
    let env = KindEnv::new(ctx, &scope, params, self_model, None);
    let mut found: Option<Kind> = None;
    walk_stmts(body, &mut |stmt| {
        if found.is_some() {
            return;
        }
        if let Stmt::Give { value } = stmt {
            let kind = env.kind_of(value);
            if kind.promotes() {
                found = Some(kind);
            }
        }
    });
    found.unwrap_or(Kind::Number)
}
