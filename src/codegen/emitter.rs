use std::collections::BTreeSet;

use crate::ast::navigate::{self, walk_stmts};
use crate::ast::{AssignTarget, BinOp, CondBranch, Expr, FunDef, Program, Stmt};
use crate::error::CompileError;
use crate::infer::{Inference, KindEnv, ScopeId};
use crate::types::Kind;

use super::names::{c_ident, c_type};

mod call;
mod expr;

pub(super) use expr::Operand;

/// The body currently being emitted.
#[derive(Clone, Copy)]
pub(super) struct Frame<'a> {
    pub env: KindEnv<'a>,
    /// Declared return kind; `None` at top level.
    pub ret: Option<&'a Kind>,
    /// Inside a constructor `give` hands back the instance.
    pub constructor: bool,
}

/// C emitter: walks the syntax tree once per body and produces C lines.
pub(super) struct Emitter<'a> {
    pub inference: &'a Inference,
    output: Vec<String>,
    indent: usize,
    temp_counter: u32,
    pub frame: Frame<'a>,
    /// Names bound by `use`; they have no C counterpart.
    modules: BTreeSet<String>,
}

impl<'a> Emitter<'a> {
    pub(super) fn new(inference: &'a Inference, program: &Program) -> Result<Self, CompileError> {
        let mut modules = BTreeSet::new();
        walk_stmts(&program.statements, &mut |stmt| {
            if let Stmt::Use { module, alias } = stmt {
                modules.insert(alias.clone().unwrap_or_else(|| module.clone()));
            }
        });
        let frame = Self::frame_for(inference, &ScopeId::Main, false)?;
        Ok(Self {
            inference,
            output: Vec::new(),
            indent: 0,
            temp_counter: 0,
            frame,
            modules,
        })
    }

    fn frame_for(
        inference: &'a Inference,
        scope: &ScopeId,
        constructor: bool,
    ) -> Result<Frame<'a>, CompileError> {
        let env = inference
            .env(scope)
            .ok_or_else(|| CompileError::new(format!("no symbol map for scope `{}`", scope)))?;
        let ret = match scope {
            ScopeId::Main => None,
            _ if constructor => None,
            _ => inference.signature(scope).map(|sig| &sig.ret),
        };
        Ok(Frame {
            env,
            ret,
            constructor,
        })
    }

    /// Make `scope` the current body.
    pub(super) fn enter(&mut self, scope: &ScopeId, constructor: bool) -> Result<(), CompileError> {
        self.frame = Self::frame_for(self.inference, scope, constructor)?;
        self.temp_counter = 0;
        Ok(())
    }

    pub(super) fn env(&self) -> KindEnv<'a> {
        self.frame.env
    }

    pub(super) fn is_module(&self, name: &str) -> bool {
        self.modules.contains(name) && self.env().var_kind(name).is_none()
    }

    // ─── Output ────────────────────────────────────────────────────

    pub(super) fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.output.push(String::new());
        } else {
            self.output.push(format!("{}{}", "    ".repeat(self.indent), text));
        }
    }

    pub(super) fn blank(&mut self) {
        self.output.push(String::new());
    }

    pub(super) fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.indent += 1;
    }

    pub(super) fn close(&mut self, text: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    pub(super) fn take_output(&mut self) -> String {
        let mut text = std::mem::take(&mut self.output).join("\n");
        text.push('\n');
        text
    }

    fn temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("kuda_t{}", self.temp_counter)
    }

    /// Defaulted declarations for every local of the current scope.
    pub(super) fn hoist(&mut self, scope: &ScopeId) {
        let Some(vars) = self.inference.scope(scope).map(|s| &s.vars) else {
            return;
        };
        for (name, kind) in vars.iter() {
            self.line(format!(
                "{} {} = {};",
                c_type(kind),
                c_ident(name),
                kind.default_value()
            ));
        }
    }

    // ─── Top-level items ───────────────────────────────────────────

    /// File-scope statics for top-level names, so functions can reach them.
    pub(super) fn globals(&mut self) {
        let Some(vars) = self.inference.scope(&ScopeId::Main).map(|s| &s.vars) else {
            return;
        };
        if vars.is_empty() {
            return;
        }
        for (name, kind) in vars.iter() {
            self.line(format!(
                "static {} {} = {};",
                c_type(kind),
                c_ident(name),
                kind.default_value()
            ));
        }
        self.blank();
    }

    fn function_signature(&self, def: &FunDef) -> String {
        let sig = self.inference.functions.get(&def.name);
        let ret = sig.map(|s| c_type(&s.ret)).unwrap_or_else(|| "double".to_string());
        let params: Vec<String> = def
            .params
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let kind = sig.and_then(|s| s.param_kind(i)).unwrap_or(&Kind::Number);
                format!("{} {}", c_type(kind), c_ident(name))
            })
            .collect();
        format!("{} {}({})", ret, c_ident(&def.name), parameter_list(&params))
    }

    pub(super) fn function_prototype(&mut self, def: &FunDef) {
        let signature = self.function_signature(def);
        self.line(format!("{};", signature));
    }

    pub(super) fn function(&mut self, def: &FunDef) -> Result<(), CompileError> {
        let scope = ScopeId::Function(def.name.clone());
        self.enter(&scope, false)?;
        let signature = self.function_signature(def);
        self.open(format!("{} {{", signature));
        self.hoist(&scope);
        self.body(&def.body)?;
        let fallback = self.frame.ret.map(|k| k.default_value()).unwrap_or("0");
        self.line(format!("return {};", fallback));
        self.close("}");
        self.blank();
        Ok(())
    }

    /// `main`: seed the generator, then run top-level statements in order.
    pub(super) fn entry(&mut self, program: &Program, seed: &str) -> Result<(), CompileError> {
        self.enter(&ScopeId::Main, false)?;
        self.open("int main(void) {");
        self.line(seed);
        for stmt in navigate::entry_statements(program) {
            self.stmt(stmt)?;
        }
        self.line("return 0;");
        self.close("}");
        Ok(())
    }

    // ─── Statements ────────────────────────────────────────────────

    pub(super) fn body(&mut self, body: &[Stmt]) -> Result<(), CompileError> {
        for stmt in body {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn block(&mut self, body: &[Stmt]) -> Result<(), CompileError> {
        self.indent += 1;
        let result = self.body(body);
        self.indent = self.indent.saturating_sub(1);
        result
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Assign { target, value } => match target {
                AssignTarget::Name { name } => self.assign(name, value),
                AssignTarget::Field { object, field } => self.assign_field(object, field, value),
            },
            Stmt::IndexAssign {
                object,
                index,
                value,
            } => self.index_assign(object, index, value),
            Stmt::AugAssign { name, op, value } => self.aug_assign(name, *op, value),
            Stmt::If {
                branches,
                else_body,
            } => self.if_chain(branches, else_body.as_deref()),
            Stmt::Repeat { count, body } => {
                let count = self.expr(count)?;
                let count = self.int(&count);
                let i = self.temp();
                self.line(format!("for (int {i} = 0; {i} < {count}; {i}++) {{"));
                self.block(body)?;
                self.line("}");
                Ok(())
            }
            Stmt::Each {
                var,
                iterable,
                body,
            } => self.each(var, iterable, body),
            Stmt::Til { cond, body } => {
                let cond = self.expr(cond)?;
                let cond = self.truthy(&cond);
                self.line(format!("while ({}) {{", cond));
                self.block(body)?;
                self.line("}");
                Ok(())
            }
            Stmt::Give { value } => self.give(value),
            Stmt::Out { value } => {
                let value = self.expr(value)?;
                let call = self.print_call(&value);
                self.line(format!("{};", call));
                Ok(())
            }
            Stmt::Try { body, fail_body } => {
                if !fail_body.is_empty() {
                    log::debug!("codegen: `fail` branch dropped; only the `try` body runs");
                }
                self.body(body)
            }
            Stmt::Break => {
                self.line("break;");
                Ok(())
            }
            Stmt::Continue => {
                self.line("continue;");
                Ok(())
            }
            Stmt::Use { .. } => Ok(()),
            Stmt::Expr { expr } => {
                let value = self.expr(expr)?;
                let code = value.statement();
                self.line(format!("{};", code));
                Ok(())
            }
            Stmt::Fun(def) => Err(CompileError::unsupported("a nested `fun` declaration")
                .with_note(format!("`{}` is declared inside another body", def.name))),
            Stmt::Model(def) => Err(CompileError::unsupported("a nested `model` declaration")
                .with_note(format!("`{}` is declared inside another body", def.name))),
            Stmt::EachUnpack { vars, .. } => Err(CompileError::unsupported(
                "`each` over several variables",
            )
            .with_note(format!("loop variables: {}", vars.join(", ")))),
        }
    }

    /// Declared kind of an assignable name in the current body.
    fn slot_kind(&self, name: &str) -> Result<Kind, CompileError> {
        self.env().var_kind(name).ok_or_else(|| {
            CompileError::new(format!("`{}` has no declaration in this body", name))
        })
    }

    fn assign(&mut self, name: &str, value: &Expr) -> Result<(), CompileError> {
        let kind = self.slot_kind(name)?;
        let value = self.expr(value)?;
        let code = self.coerce(value, &kind);
        self.line(format!("{} = {};", c_ident(name), code));
        Ok(())
    }

    /// `object.field = value`. A store the models never declared (an
    /// unknown field, or a receiver whose kind fell back to Number) keeps
    /// the value's side effects and is otherwise dropped.
    fn assign_field(&mut self, object: &Expr, field: &str, value: &Expr) -> Result<(), CompileError> {
        let target = self.expr(object)?;
        let declared = match &target.kind {
            Kind::Model(model) => self
                .inference
                .models
                .get(model)
                .and_then(|m| m.fields.get(field))
                .map(|kind| (model.clone(), kind.clone())),
            _ => None,
        };
        let Some((model, kind)) = declared else {
            log::warn!(
                "codegen: no field `{}` on a {} value; dropping the store",
                field,
                target.kind
            );
            let value = self.expr(value)?;
            self.line(format!("{};", value.statement()));
            return Ok(());
        };
        let object = self.coerce(target, &Kind::Model(model));
        let value = self.expr(value)?;
        let code = self.coerce(value, &kind);
        self.line(format!("{}->{} = {};", object, c_ident(field), code));
        Ok(())
    }

    fn index_assign(&mut self, object: &Expr, index: &Expr, value: &Expr) -> Result<(), CompileError> {
        let target = self.expr(object)?;
        match target.kind {
            Kind::List => {
                let list = self.coerce(target, &Kind::List);
                let index = self.expr(index)?;
                let index = self.int(&index);
                let value = self.expr(value)?;
                let cell = self.wrap(&value);
                self.line(format!("kuda_list_set({}, {}, {});", list, index, cell));
                Ok(())
            }
            Kind::Matrix => Err(CompileError::unsupported("matrix index assignment")
                .with_help("use `m.set(row, col, value)` instead".to_string())),
            other => {
                log::warn!("codegen: index store into a {} value dropped", other);
                let value = self.expr(value)?;
                self.line(format!("{};", value.statement()));
                Ok(())
            }
        }
    }

    fn aug_assign(&mut self, name: &str, op: BinOp, value: &Expr) -> Result<(), CompileError> {
        let kind = self.slot_kind(name)?;
        let current = Operand::new(c_ident(name), kind.clone());
        let value = self.expr(value)?;
        let result = self.binop(op, current, value);
        let code = self.coerce(result, &kind);
        self.line(format!("{} = {};", c_ident(name), code));
        Ok(())
    }

    fn if_chain(&mut self, branches: &[CondBranch], else_body: Option<&[Stmt]>) -> Result<(), CompileError> {
        for (i, branch) in branches.iter().enumerate() {
            let cond = self.expr(&branch.cond)?;
            let cond = self.truthy(&cond);
            if i == 0 {
                self.line(format!("if ({}) {{", cond));
            } else {
                self.line(format!("}} else if ({}) {{", cond));
            }
            self.block(&branch.body)?;
        }
        if let Some(body) = else_body {
            self.line("} else {");
            self.block(body)?;
        }
        self.line("}");
        Ok(())
    }

    /// `each` over `range(...)`, a List, a Text's characters or a Matrix's
    /// rows. Bounds are evaluated once, before the first iteration.
    fn each(&mut self, var: &str, iterable: &Expr, body: &[Stmt]) -> Result<(), CompileError> {
        let var_kind = self.slot_kind(var)?;
        let target = c_ident(var);

        if let Some(args) = self.range_args(iterable) {
            let (start, stop, step) = self.range_bounds(args)?;
            let (end, i) = (self.temp(), self.temp());
            self.open("{");
            self.line(format!("double {} = {};", end, stop));
            match step {
                None => {
                    self.line(format!("for (double {i} = {start}; {i} < {end}; {i} += 1.0) {{"));
                }
                Some(step) => {
                    let by = self.temp();
                    self.line(format!("double {} = {};", by, step));
                    self.line(format!(
                        "for (double {i} = {start}; ({by} > 0 && {i} < {end}) || ({by} < 0 && {i} > {end}); {i} += {by}) {{"
                    ));
                }
            }
            let current = self.coerce(Operand::new(i, Kind::Number), &var_kind);
            self.indent += 1;
            self.line(format!("{} = {};", target, current));
            self.indent -= 1;
            self.block(body)?;
            self.line("}");
            self.close("}");
            return Ok(());
        }

        let source = self.expr(iterable)?;
        let (holder_type, length, item) = match source.kind {
            Kind::Text => ("char*", "(int)kuda_str_len", "kuda_char_at"),
            Kind::Matrix => ("KMatrix*", "(int)kuda_mat_rows", "kuda_mat_row"),
            _ => ("KList*", "(int)kuda_list_len", "kuda_list_get"),
        };
        let holder_kind = match source.kind {
            Kind::Text => Kind::Text,
            Kind::Matrix => Kind::Matrix,
            _ => Kind::List,
        };
        let (seq, i) = (self.temp(), self.temp());
        let seq_code = self.coerce(source, &holder_kind);
        self.open("{");
        self.line(format!("{} {} = {};", holder_type, seq, seq_code));
        self.line(format!("for (int {i} = 0; {i} < {length}({seq}); {i}++) {{"));
        let element = format!("{}({}, {})", item, seq, i);
        let element = match holder_kind {
            Kind::List => Operand::cell(element, var_kind.clone()),
            other => Operand::new(element, other),
        };
        let current = self.coerce(element, &var_kind);
        self.indent += 1;
        self.line(format!("{} = {};", target, current));
        self.indent -= 1;
        self.block(body)?;
        self.line("}");
        self.close("}");
        Ok(())
    }

    /// Arguments of `range(...)` when `iterable` is a call of the builtin.
    fn range_args<'e>(&self, iterable: &'e Expr) -> Option<&'e [Expr]> {
        match iterable {
            Expr::Call { callee, args }
                if callee.as_ident() == Some("range") && !self.inference.is_function("range") =>
            {
                Some(args)
            }
            _ => None,
        }
    }

    /// `(start, stop, step)` of a range; `step` is `None` when omitted.
    pub(super) fn range_bounds(
        &self,
        args: &[Expr],
    ) -> Result<(String, String, Option<String>), CompileError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let value = self.expr(arg)?;
            values.push(self.number(&value));
        }
        let mut values = values.into_iter();
        match (values.next(), values.next(), values.next(), values.next()) {
            (Some(stop), None, None, None) => Ok(("0.0".to_string(), stop, None)),
            (Some(start), Some(stop), None, None) => Ok((start, stop, None)),
            (Some(start), Some(stop), Some(step), None) => Ok((start, stop, Some(step))),
            _ => Err(arity_error("range", "1 to 3", args.len())),
        }
    }

    fn give(&mut self, value: &Expr) -> Result<(), CompileError> {
        if self.frame.constructor {
            self.line("return self;");
            return Ok(());
        }
        let Some(ret) = self.frame.ret else {
            return Err(CompileError::new("`give` outside a function")
                .with_help("top-level code cannot return a value".to_string()));
        };
        let value = self.expr(value)?;
        let code = self.coerce(value, ret);
        self.line(format!("return {};", code));
        Ok(())
    }
}

/// `a, b` or `void`.
pub(super) fn parameter_list(params: &[String]) -> String {
    if params.is_empty() {
        "void".to_string()
    } else {
        params.join(", ")
    }
}

pub(super) fn arity_error(name: &str, expected: &str, given: usize) -> CompileError {
    CompileError::new(format!(
        "`{}` takes {} argument(s) but {} were given",
        name, expected, given
    ))
}
