//! Pass 1: model registration.
//!
//! Every `self.field = value` in any method of a model declares a field.
//! The first occurrence (methods in written order, bodies depth-first)
//! decides the field kind from the syntax of the assigned value alone.

use std::collections::BTreeSet;

use crate::ast::navigate::{self, walk_stmts};
use crate::ast::{AssignTarget, Expr, Program, Stmt};
use crate::runtime::builtins::MATRIX_CONSTRUCTORS;
use crate::types::Kind;

use super::hints::is_text_hint;
use super::{FnSig, Inference, ModelInfo};

pub(super) fn register_models(ctx: &mut Inference, program: &Program) {
    let declared: BTreeSet<&str> = navigate::models(program).map(|m| m.name.as_str()).collect();

    for model in navigate::models(program) {
        let mut info = ModelInfo::new(&model.name);
        for method in model.methods() {
            info.methods
                .entry(method.name.clone())
                .or_insert_with(|| FnSig::numeric(&method.name, method.params_without_self()));
            walk_stmts(&method.body, &mut |stmt| {
                if let Stmt::Assign {
                    target: AssignTarget::Field { object, field },
                    value,
                } = stmt
                {
                    if object.as_ident() != Some("self") {
                        return;
                    }
                    let kind = field_kind(field, value, &declared);
                    if info.fields.insert(field, kind.clone()) {
                        log::debug!("models: `{}.{}` is {}", model.name, field, kind);
                    }
                }
            });
        }
        if ctx.models.insert(model.name.clone(), info).is_some() {
            log::warn!("model `{}` is declared more than once; the last one wins", model.name);
        }
    }
}

/// Field kind from the first assigned value.
fn field_kind(field: &str, value: &Expr, models: &BTreeSet<&str>) -> Kind {
    match value {
        Expr::Text { .. } => Kind::Text,
        Expr::Ident { name } if is_text_hint(name) => Kind::Text,
        _ if is_text_hint(field) => Kind::Text,
        Expr::Bool { .. } => Kind::Boolean,
        Expr::List { .. } => Kind::List,
        _ => match value.called_name() {
            Some(name) if MATRIX_CONSTRUCTORS.contains(&name) => Kind::Matrix,
            Some(name) if models.contains(name) => Kind::Model(name.to_string()),
            _ => Kind::Number,
        },
    }
}
