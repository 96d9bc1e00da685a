//! Expressions: each one lowers to C text plus the kind it evaluates to.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::error::CompileError;
use crate::infer::hints;
use crate::types::{binary_kind, Kind};

use super::super::names::{c_ident, c_number, c_type};
use super::Emitter;

/// A lowered expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::codegen) struct Operand {
    pub code: String,
    pub kind: Kind,
    /// `code` is a `KValue` list cell; `kind` is what it should hold.
    pub cell: bool,
    /// `code` is a call returning `void`.
    pub void: bool,
}

impl Operand {
    pub fn new(code: impl Into<String>, kind: Kind) -> Self {
        Self {
            code: code.into(),
            kind,
            cell: false,
            void: false,
        }
    }

    pub fn cell(code: impl Into<String>, kind: Kind) -> Self {
        Self {
            cell: true,
            ..Self::new(code, kind)
        }
    }

    pub fn void(code: impl Into<String>) -> Self {
        Self {
            void: true,
            ..Self::new(code, Kind::Number)
        }
    }

    /// C text usable as a value of `self.kind`.
    pub fn value(&self) -> String {
        if self.void {
            format!("({}, 0.0)", self.code)
        } else if self.cell {
            unwrap_cell(&self.code, &self.kind)
        } else {
            self.code.clone()
        }
    }

    /// C text for an expression statement.
    pub fn statement(&self) -> String {
        if self.void || self.cell {
            self.code.clone()
        } else {
            format!("(void)({})", self.code)
        }
    }
}

/// Read a `KValue` cell as `kind`.
fn unwrap_cell(code: &str, kind: &Kind) -> String {
    match kind {
        Kind::Number => format!("kuda_as_num({})", code),
        Kind::Boolean => format!("(kuda_as_num({}) != 0)", code),
        Kind::Text => format!("kuda_as_text({})", code),
        handle => format!("(({})kuda_as_obj({}))", c_type(handle), code),
    }
}

impl Emitter<'_> {
    /// Lower `expr`.
    pub(in crate::codegen) fn expr(&self, expr: &Expr) -> Result<Operand, CompileError> {
        match expr {
            Expr::Number { value } => Ok(Operand::new(c_number(*value), Kind::Number)),
            Expr::Text { value } => Ok(Operand::new(
                crate::runtime::c_string_literal(value),
                Kind::Text,
            )),
            Expr::Bool { value } => Ok(Operand::new(if *value { "1" } else { "0" }, Kind::Boolean)),
            Expr::None => Ok(Operand::new("0.0", Kind::Number)),
            Expr::Ident { name } => self.ident(name),
            Expr::BinOp { op, lhs, rhs } => {
                let lhs = self.expr(lhs)?;
                let rhs = self.expr(rhs)?;
                Ok(self.binop(*op, lhs, rhs))
            }
            Expr::Unary { op, operand } => {
                let operand = self.expr(operand)?;
                Ok(match op {
                    UnaryOp::Not => Operand::new(format!("(!{})", self.truthy(&operand)), Kind::Boolean),
                    UnaryOp::Neg if operand.kind == Kind::Matrix && !operand.cell => Operand::new(
                        format!("kuda_mat_scale({}, -1.0)", operand.value()),
                        Kind::Matrix,
                    ),
                    UnaryOp::Neg => Operand::new(format!("(-{})", self.number(&operand)), Kind::Number),
                })
            }
            Expr::Call { callee, args } => self.call(expr, callee, args),
            Expr::Attr { object, name } => self.field(object, name),
            Expr::Index { object, index } => self.index(expr, object, index),
            Expr::List { items } => {
                if items.is_empty() {
                    return Ok(Operand::new("kuda_list_new()", Kind::List));
                }
                let mut cells = Vec::with_capacity(items.len());
                for item in items {
                    let item = self.expr(item)?;
                    cells.push(self.wrap(&item));
                }
                Ok(Operand::new(
                    format!(
                        "kuda_list_from((KValue[]){{{}}}, {})",
                        cells.join(", "),
                        cells.len()
                    ),
                    Kind::List,
                ))
            }
            Expr::Tuple { .. } | Expr::Dict { .. } | Expr::ListComp { .. } => Err(
                CompileError::unsupported(&format!("a {}", expr.kind_name())),
            ),
        }
    }

    fn ident(&self, name: &str) -> Result<Operand, CompileError> {
        let env = self.env();
        if let Some(kind) = env.var_kind(name) {
            return Ok(Operand::new(c_ident(name), kind));
        }
        match name {
            "True" => Ok(Operand::new("1", Kind::Boolean)),
            "False" => Ok(Operand::new("0", Kind::Boolean)),
            "pi" => Ok(Operand::new("KUDA_PI", Kind::Number)),
            _ if self.inference.is_function(name) || self.inference.is_model(name) => Err(
                CompileError::unsupported("a function used as a value")
                    .with_note(format!("`{}` is referenced without being called", name)),
            ),
            _ => {
                log::warn!("codegen: `{}` is never assigned; reading it as 0", name);
                Ok(Operand::new("0.0", Kind::Number))
            }
        }
    }

    /// `object.field`.
    fn field(&self, object: &Expr, field: &str) -> Result<Operand, CompileError> {
        if let Some(module) = object.as_ident().filter(|m| self.is_module(m)) {
            return Err(CompileError::unsupported(&format!(
                "reading `{}.{}` from a `use`d module",
                module, field
            )));
        }
        let target = self.expr(object)?;
        match &target.kind {
            Kind::Model(model) => {
                let known = self.inference.models.get(model).and_then(|m| m.fields.get(field));
                match known {
                    Some(kind) => Ok(Operand::new(
                        format!("{}->{}", target.value(), c_ident(field)),
                        kind.clone(),
                    )),
                    None => {
                        let kind = hints::fallback_kind(field);
                        log::warn!(
                            "codegen: model `{}` never assigns `{}`; reading it as a default {}",
                            model,
                            field,
                            kind
                        );
                        Ok(Operand::new(kind.default_value(), kind))
                    }
                }
            }
            Kind::Matrix if field == "rows" || field == "cols" => Ok(Operand::new(
                format!("kuda_mat_{}({})", field, target.value()),
                Kind::Number,
            )),
            other => {
                let kind = hints::fallback_kind(field);
                log::warn!(
                    "codegen: reading `{}` of a {} value as a default {}",
                    field,
                    other,
                    kind
                );
                Ok(Operand::new(kind.default_value(), kind))
            }
        }
    }

    /// `object[index]`.
    fn index(&self, whole: &Expr, object: &Expr, index: &Expr) -> Result<Operand, CompileError> {
        let env = self.env();
        if env.is_matrix_row(object) {
            if let Expr::Index {
                object: matrix,
                index: row,
            } = object
            {
                let matrix = self.expr(matrix)?;
                let row = self.expr(row)?;
                let col = self.expr(index)?;
                return Ok(Operand::new(
                    format!(
                        "kuda_mat_get({}, {}, {})",
                        matrix.value(),
                        self.int(&row),
                        self.int(&col)
                    ),
                    Kind::Number,
                ));
            }
        }
        let target = self.expr(object)?;
        let at = self.expr(index)?;
        let at = self.int(&at);
        match target.kind {
            Kind::List => Ok(Operand::cell(
                format!("kuda_list_get({}, {})", target.value(), at),
                env.kind_of(whole),
            )),
            Kind::Text => Ok(Operand::new(
                format!("kuda_char_at({}, {})", target.value(), at),
                Kind::Text,
            )),
            Kind::Matrix => Ok(Operand::new(
                format!("kuda_mat_row({}, {})", target.value(), at),
                Kind::Matrix,
            )),
            other => {
                log::warn!("codegen: indexing a {} value; reading it as 0", other);
                Ok(Operand::new("0.0", Kind::Number))
            }
        }
    }

    // ─── Operators ─────────────────────────────────────────────────

    /// `lhs op rhs`, dispatched on operand kinds.
    pub(in crate::codegen) fn binop(&self, op: BinOp, lhs: Operand, rhs: Operand) -> Operand {
        if op.is_logical() {
            let joiner = if op == BinOp::And { "&&" } else { "||" };
            return Operand::new(
                format!("({} {} {})", self.truthy(&lhs), joiner, self.truthy(&rhs)),
                Kind::Boolean,
            );
        }
        let (lk, rk) = (lhs.kind.clone(), rhs.kind.clone());
        if op.is_comparison() {
            let code = if lk == Kind::Text || rk == Kind::Text {
                format!(
                    "(kuda_str_cmp({}, {}) {} 0)",
                    self.stringify(&lhs),
                    self.stringify(&rhs),
                    op.as_str()
                )
            } else if lk.is_handle() && rk.is_handle() && !lhs.cell && !rhs.cell {
                format!("({} {} {})", lhs.value(), op.as_str(), rhs.value())
            } else {
                format!("({} {} {})", self.number(&lhs), op.as_str(), self.number(&rhs))
            };
            return Operand::new(code, Kind::Boolean);
        }
        match op {
            BinOp::Mod => Operand::new(
                format!("fmod({}, {})", self.number(&lhs), self.number(&rhs)),
                Kind::Number,
            ),
            BinOp::Add if lk == Kind::Text || rk == Kind::Text => Operand::new(
                format!("kuda_concat({}, {})", self.stringify(&lhs), self.stringify(&rhs)),
                Kind::Text,
            ),
            BinOp::Add if lk == Kind::List && rk == Kind::List => Operand::new(
                format!("kuda_list_concat({}, {})", lhs.value(), rhs.value()),
                Kind::List,
            ),
            _ if binary_kind(op, &lk, &rk) == Kind::Matrix => self.matrix_binop(op, &lhs, &rhs),
            _ => Operand::new(
                format!("({} {} {})", self.number(&lhs), op.as_str(), self.number(&rhs)),
                Kind::Number,
            ),
        }
    }

    /// Arithmetic with at least one Matrix operand. Scalars broadcast.
    fn matrix_binop(&self, op: BinOp, lhs: &Operand, rhs: &Operand) -> Operand {
        let (lm, rm) = (lhs.kind == Kind::Matrix, rhs.kind == Kind::Matrix);
        let code = match (op, lm, rm) {
            (BinOp::Add, true, true) => format!("kuda_mat_add({}, {})", lhs.value(), rhs.value()),
            (BinOp::Add, true, false) => {
                format!("kuda_mat_add_scalar({}, {})", lhs.value(), self.number(rhs))
            }
            (BinOp::Add, false, _) => {
                format!("kuda_mat_add_scalar({}, {})", rhs.value(), self.number(lhs))
            }
            (BinOp::Sub, true, true) => format!("kuda_mat_sub({}, {})", lhs.value(), rhs.value()),
            (BinOp::Sub, true, false) => {
                format!("kuda_mat_add_scalar({}, -({}))", lhs.value(), self.number(rhs))
            }
            (BinOp::Sub, false, _) => {
                format!("kuda_mat_rsub_scalar({}, {})", self.number(lhs), rhs.value())
            }
            (BinOp::Mul, true, true) => format!("kuda_mat_mul({}, {})", lhs.value(), rhs.value()),
            (BinOp::Mul, true, false) => {
                format!("kuda_mat_scale({}, {})", lhs.value(), self.number(rhs))
            }
            (BinOp::Mul, false, _) => {
                format!("kuda_mat_scale({}, {})", rhs.value(), self.number(lhs))
            }
            (BinOp::Div, _, true) => format!("kuda_mat_div({}, {})", lhs.value(), rhs.value()),
            (_, _, _) => {
                format!("kuda_mat_scale({}, 1.0 / ({}))", lhs.value(), self.number(rhs))
            }
        };
        Operand::new(code, Kind::Matrix)
    }

    // ─── Coercions ─────────────────────────────────────────────────

    /// Convert `value` for a slot of kind `target`. Conversions with no C
    /// meaning pass through and are left to the C compiler.
    pub(in crate::codegen) fn coerce(&self, value: Operand, target: &Kind) -> String {
        if value.cell {
            return unwrap_cell(&value.code, target);
        }
        if &value.kind == target {
            return value.value();
        }
        match (&value.kind, target) {
            (_, Kind::Text) => self.stringify(&value),
            (Kind::Boolean, Kind::Number) => format!("(double)({})", value.value()),
            (_, Kind::Boolean) => self.truthy(&value),
            _ => value.value(),
        }
    }

    pub(in crate::codegen) fn number(&self, value: &Operand) -> String {
        self.coerce(value.clone(), &Kind::Number)
    }

    pub(in crate::codegen) fn int(&self, value: &Operand) -> String {
        format!("(int)({})", self.number(value))
    }

    /// Text rendering of a value, as `out` would print it.
    pub(in crate::codegen) fn stringify(&self, value: &Operand) -> String {
        if value.cell {
            return unwrap_cell(&value.code, &Kind::Text);
        }
        let code = value.value();
        match &value.kind {
            Kind::Text => code,
            Kind::Number => format!("kuda_num_to_str({})", code),
            Kind::Boolean => format!("kuda_bool_to_str({})", code),
            Kind::List => format!("kuda_list_to_str({})", code),
            Kind::Matrix => format!("kuda_mat_to_str({})", code),
            Kind::Model(model) => format!(
                "((void)({}), {})",
                code,
                crate::runtime::c_string_literal(&format!("<{} object>", model))
            ),
        }
    }

    /// A C condition for a value.
    pub(in crate::codegen) fn truthy(&self, value: &Operand) -> String {
        if value.cell {
            return format!("(kuda_as_num({}) != 0)", value.code);
        }
        let code = value.value();
        match &value.kind {
            Kind::Boolean => code,
            Kind::Number => format!("(({}) != 0)", code),
            Kind::Text => format!("(kuda_str_len({}) > 0)", code),
            Kind::List => format!("(kuda_list_len({}) > 0)", code),
            Kind::Matrix | Kind::Model(_) => format!("(({}) != NULL)", code),
        }
    }

    /// A value as a `KValue` list cell.
    pub(in crate::codegen) fn wrap(&self, value: &Operand) -> String {
        if value.cell {
            return value.code.clone();
        }
        let code = value.value();
        match &value.kind {
            Kind::Number => format!("kuda_num({})", code),
            Kind::Boolean => format!("kuda_num((double)({}))", code),
            Kind::Text => format!("kuda_text({})", code),
            _ => format!("kuda_obj({})", code),
        }
    }
}
