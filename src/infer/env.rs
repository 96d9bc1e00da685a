//! Expression kind estimation.
//!
//! [`KindEnv`] answers "what kind does this expression produce" for one
//! scope, using whatever the passes so far have recorded. The same rules
//! drive the scope scanner, the call-site scan and the code generator, so
//! a hoisted declaration always agrees with the code assigned to it.

use crate::ast::{Expr, UnaryOp};
use crate::runtime::builtins;
use crate::types::{binary_kind, Kind};

use super::{hints, Inference, Scope};

/// Kind lookup for one scope: parameters, then locals, then globals.
#[derive(Clone, Copy)]
pub struct KindEnv<'a> {
    inference: &'a Inference,
    scope: &'a Scope,
    params: &'a [(String, Kind)],
    self_model: Option<&'a str>,
    globals: Option<&'a Scope>,
}

impl<'a> KindEnv<'a> {
    pub fn new(
        inference: &'a Inference,
        scope: &'a Scope,
        params: &'a [(String, Kind)],
        self_model: Option<&'a str>,
        globals: Option<&'a Scope>,
    ) -> Self {
        Self {
            inference,
            scope,
            params,
            self_model,
            globals,
        }
    }

    pub fn param_kind(&self, name: &str) -> Option<&'a Kind> {
        self.params.iter().find(|(p, _)| p == name).map(|(_, k)| k)
    }

    pub fn is_param(&self, name: &str) -> bool {
        self.param_kind(name).is_some()
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.scope.vars.contains(name)
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.globals.is_some_and(|g| g.vars.contains(name))
    }

    /// Kind of a variable, if any scope knows it.
    pub fn var_kind(&self, name: &str) -> Option<Kind> {
        if name == "self" {
            if let Some(model) = self.self_model {
                return Some(Kind::Model(model.to_string()));
            }
        }
        self.param_kind(name)
            .or_else(|| self.scope.vars.get(name))
            .or_else(|| self.globals.and_then(|g| g.vars.get(name)))
            .cloned()
    }

    /// Estimated kind of `expr`.
    pub fn kind_of(&self, expr: &Expr) -> Kind {
        match expr {
            Expr::Number { .. } | Expr::None => Kind::Number,
            Expr::Text { .. } => Kind::Text,
            Expr::Bool { .. } => Kind::Boolean,
            Expr::Ident { name } => match name.as_str() {
                "True" | "False" => Kind::Boolean,
                _ => self.var_kind(name).unwrap_or(Kind::Number),
            },
            Expr::BinOp { op, lhs, rhs } => binary_kind(*op, &self.kind_of(lhs), &self.kind_of(rhs)),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Not => Kind::Boolean,
                UnaryOp::Neg => match self.kind_of(operand) {
                    Kind::Matrix => Kind::Matrix,
                    _ => Kind::Number,
                },
            },
            Expr::Call { callee, args } => self.call_kind(callee, args),
            Expr::Attr { object, name } => self.attr_kind(object, name),
            Expr::Index { object, .. } if self.is_matrix_row(object) => Kind::Number,
            Expr::Index { object, .. } => match self.kind_of(object) {
                Kind::List => self.element_kind(object).unwrap_or(Kind::Number),
                Kind::Text => Kind::Text,
                Kind::Matrix => Kind::Matrix,
                _ => Kind::Number,
            },
            Expr::List { .. } | Expr::ListComp { .. } => Kind::List,
            Expr::Tuple { .. } | Expr::Dict { .. } => Kind::Number,
        }
    }

    /// True for `m[i]` where `m` is a Matrix, so `m[i][j]` reads one cell.
    pub fn is_matrix_row(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Index { object, .. } => self.kind_of(object) == Kind::Matrix,
            _ => false,
        }
    }

    fn call_kind(&self, callee: &Expr, args: &[Expr]) -> Kind {
        match callee {
            Expr::Ident { name } => {
                if let Some(sig) = self.inference.functions.get(name) {
                    return sig.ret.clone();
                }
                if self.inference.is_model(name) {
                    return Kind::Model(name.clone());
                }
                if name == "grab" {
                    return args
                        .first()
                        .and_then(|list| self.element_kind(list))
                        .unwrap_or(Kind::Number);
                }
                let first = args.first().map(|a| self.kind_of(a));
                builtins::call_kind(name, first.as_ref()).unwrap_or(Kind::Number)
            }
            Expr::Attr { object, name } => {
                let receiver = self.kind_of(object);
                self.method_kind(&receiver, object, name)
            }
            _ => Kind::Number,
        }
    }

    /// Kind of `object.method(...)` for a receiver of kind `receiver`.
    pub fn method_kind(&self, receiver: &Kind, object: &Expr, method: &str) -> Kind {
        match receiver {
            Kind::Model(model) => self
                .inference
                .models
                .get(model)
                .and_then(|m| m.methods.get(method))
                .map(|sig| sig.ret.clone())
                .unwrap_or(Kind::Number),
            Kind::List if method == "grab" => self.element_kind(object).unwrap_or(Kind::Number),
            Kind::Text | Kind::List | Kind::Matrix if method == "len" => Kind::Number,
            _ => builtins::method(receiver, method)
                .map(|b| b.ret.kind())
                .unwrap_or(Kind::Number),
        }
    }

    fn attr_kind(&self, object: &Expr, field: &str) -> Kind {
        match self.kind_of(object) {
            Kind::Model(model) => match self.inference.models.get(&model) {
                Some(info) => info.field_kind(field),
                None => hints::fallback_kind(field),
            },
            Kind::Matrix if field == "rows" || field == "cols" => Kind::Number,
            _ => hints::fallback_kind(field),
        }
    }

    /// Kind of the elements of a list-valued expression, when known.
    pub fn element_kind(&self, list: &Expr) -> Option<Kind> {
        match list {
            Expr::List { items } => items.first().map(|item| self.kind_of(item)),
            Expr::Ident { name } => self
                .scope
                .elements
                .get(name)
                .or_else(|| self.globals.and_then(|g| g.elements.get(name)))
                .cloned(),
            Expr::Call { callee, .. } => match callee.as_ref() {
                Expr::Ident { name } if !self.inference.is_function(name) => match name.as_str() {
                    "cut" => Some(Kind::Text),
                    "range" => Some(Kind::Number),
                    _ => None,
                },
                Expr::Attr { object, name } if name == "cut" => {
                    (self.kind_of(object) == Kind::Text).then_some(Kind::Text)
                }
                Expr::Attr { object, name } if name == "copy" => self.element_kind(object),
                _ => None,
            },
            Expr::BinOp { lhs, rhs, .. } => self.element_kind(lhs).or_else(|| self.element_kind(rhs)),
            _ => None,
        }
    }

    /// Kind of the loop variable of `each var in iterable`.
    pub fn each_var_kind(&self, iterable: &Expr) -> Kind {
        if iterable.called_name() == Some("range") && !self.inference.is_function("range") {
            return Kind::Number;
        }
        match self.kind_of(iterable) {
            Kind::List => self.element_kind(iterable).unwrap_or(Kind::Number),
            Kind::Text => Kind::Text,
            Kind::Matrix => Kind::Matrix,
            _ => Kind::Number,
        }
    }
}
