//! Pass 3: scope pre-scan.
//!
//! Walks a body depth-first in written order and records the first
//! assignment of every name. That first assignment fixes the name's kind
//! for the whole scope; the emitter hoists the resulting map to the top of
//! the generated function.

use crate::ast::navigate::child_blocks;
use crate::ast::{AssignTarget, Expr, Program, Stmt};
use crate::types::{binary_kind, Kind};

use super::{scope_body, Inference, KindEnv, Scope, ScopeId};

/// Builds the [`Scope`] of one body.
pub(crate) struct ScopeScanner<'a> {
    inference: &'a Inference,
    params: &'a [(String, Kind)],
    self_model: Option<&'a str>,
    globals: Option<&'a Scope>,
    scope: Scope,
}

impl<'a> ScopeScanner<'a> {
    pub(crate) fn new(
        inference: &'a Inference,
        params: &'a [(String, Kind)],
        self_model: Option<&'a str>,
        globals: Option<&'a Scope>,
    ) -> Self {
        Self {
            inference,
            params,
            self_model,
            globals,
            scope: Scope::default(),
        }
    }

    pub(crate) fn scan(mut self, body: &[Stmt]) -> Scope {
        self.scan_block(body);
        self.scope
    }

    fn env(&self) -> KindEnv<'_> {
        KindEnv::new(
            self.inference,
            &self.scope,
            self.params,
            self.self_model,
            self.globals,
        )
    }

    fn scan_block(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.scan_stmt(stmt);
            for block in child_blocks(stmt) {
                self.scan_block(block);
            }
        }
    }

    fn scan_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign {
                target: AssignTarget::Name { name },
                value,
            } => self.assign(name, value),
            Stmt::AugAssign { name, op, value } => {
                if !self.is_known(name) {
                    let kind = binary_kind(*op, &Kind::Number, &self.env().kind_of(value));
                    self.declare(name, kind);
                }
            }
            Stmt::Each { var, iterable, .. } => {
                // Loop variables stay local even when a global shares the name.
                if !self.env().is_param(var) && !self.scope.vars.contains(var) {
                    let kind = self.env().each_var_kind(iterable);
                    self.declare(var, kind);
                }
            }
            Stmt::Expr { expr } => self.note_list_add(expr),
            _ => {}
        }
    }

    /// A name is known when it is a parameter, `self`, already declared
    /// here, or (inside a function or method) a global.
    fn is_known(&self, name: &str) -> bool {
        let env = self.env();
        (name == "self" && self.self_model.is_some())
            || env.is_param(name)
            || env.is_local(name)
            || env.is_global(name)
    }

    fn assign(&mut self, name: &str, value: &Expr) {
        if self.is_known(name) {
            self.refine_elements(name, value);
            return;
        }
        let (kind, element) = {
            let env = self.env();
            let kind = env.kind_of(value);
            let element = match kind {
                Kind::List => env.element_kind(value),
                _ => None,
            };
            (kind, element)
        };
        self.declare(name, kind);
        if let Some(element) = element {
            self.scope.elements.insert(name, element);
        }
    }

    fn declare(&mut self, name: &str, kind: Kind) {
        log::debug!("scan: `{}` is {}", name, kind);
        self.scope.vars.insert(name, kind);
    }

    /// `xs = []` followed later by `xs = ["a"]` still teaches the element kind.
    fn refine_elements(&mut self, name: &str, value: &Expr) {
        if self.scope.vars.get(name) != Some(&Kind::List) || self.scope.elements.contains(name) {
            return;
        }
        if let Some(element) = self.env().element_kind(value) {
            self.scope.elements.insert(name, element);
        }
    }

    /// `add(xs, v)` / `xs.add(v)` on a local list of unknown contents.
    fn note_list_add(&mut self, expr: &Expr) {
        let (list, value) = match expr {
            Expr::Call { callee, args } => match (callee.as_ref(), args.as_slice()) {
                (Expr::Ident { name }, [list, value])
                    if name == "add" && !self.inference.is_function("add") =>
                {
                    (list, value)
                }
                (Expr::Attr { object, name }, [value]) if name == "add" => (object.as_ref(), value),
                _ => return,
            },
            _ => return,
        };
        let Some(list_name) = list.as_ident() else {
            return;
        };
        if self.scope.vars.get(list_name) != Some(&Kind::List)
            || self.scope.elements.contains(list_name)
        {
            return;
        }
        let element = self.env().kind_of(value);
        self.scope.elements.insert(list_name, element);
    }
}

/// Run the scanner over every scope: the entry first (its names become the
/// globals functions and methods see), then functions, then methods.
pub(super) fn scan_scopes(ctx: &mut Inference, program: &Program) {
    let main = ScopeScanner::new(ctx, &[], None, None).scan(&program.statements);
    ctx.scopes.insert(ScopeId::Main, main);

    for id in Inference::scope_order(program).into_iter().skip(1) {
        let Some(body) = scope_body(program, &id) else {
            continue;
        };
        let scope = {
            let params = ctx
                .signature(&id)
                .map(|sig| sig.params.as_slice())
                .unwrap_or(&[]);
            let self_model = match &id {
                ScopeId::Method { model, .. } => Some(model.as_str()),
                _ => None,
            };
            let globals = ctx.scopes.get(&ScopeId::Main);
            ScopeScanner::new(ctx, params, self_model, globals).scan(body)
        };
        ctx.scopes.insert(id, scope);
    }
}
