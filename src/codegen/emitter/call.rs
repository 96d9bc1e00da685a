//! Calls: user functions, constructors, methods and builtins.
//!
//! User functions and models shadow builtins of the same name. Builtins
//! resolve through the tables in [`crate::runtime::builtins`]; the names
//! in [`builtins::SPECIAL`] are lowered here by operand kind.

use crate::ast::{Expr, ModelDef};
use crate::error::CompileError;
use crate::runtime::builtins::{self, Builtin, Ret, Slot};
use crate::runtime::{c_string_literal, format_number};
use crate::types::Kind;

use super::super::names::{c_ident, constructor_symbol, method_symbol};
use super::{arity_error, Emitter, Operand};

impl Emitter<'_> {
    pub(in crate::codegen) fn call(
        &self,
        whole: &Expr,
        callee: &Expr,
        args: &[Expr],
    ) -> Result<Operand, CompileError> {
        match callee {
            Expr::Ident { name } => self.named_call(whole, name, args),
            Expr::Attr { object, name } => self.method_call(whole, object, name, args),
            other => Err(CompileError::unsupported(&format!(
                "calling the result of a {}",
                other.kind_name()
            ))),
        }
    }

    fn named_call(&self, whole: &Expr, name: &str, args: &[Expr]) -> Result<Operand, CompileError> {
        if let Some(sig) = self.inference.functions.get(name) {
            let parts = self.arguments(name, &sig.params, args)?;
            return Ok(Operand::new(
                format!("{}({})", c_ident(name), parts.join(", ")),
                sig.ret.clone(),
            ));
        }
        if let Some(model) = self.inference.models.get(name) {
            let params = model.init().map(|sig| sig.params.as_slice()).unwrap_or(&[]);
            let parts = self.arguments(name, params, args)?;
            return Ok(Operand::new(
                format!("{}({})", constructor_symbol(name), parts.join(", ")),
                Kind::Model(name.to_string()),
            ));
        }
        if builtins::is_special(name) {
            return self.special(whole, name, args);
        }
        let operands = self.operands(args)?;
        match builtins::resolve(name, operands.first().map(|op| &op.kind)) {
            Some(builtin) => self.builtin(builtin, operands),
            None => Err(CompileError::new(format!("unknown function `{}`", name))
                .with_help("declare it with `fun` in the same program".to_string())),
        }
    }

    fn method_call(
        &self,
        whole: &Expr,
        object: &Expr,
        name: &str,
        args: &[Expr],
    ) -> Result<Operand, CompileError> {
        if let Some(module) = object.as_ident().filter(|m| self.is_module(m)) {
            return Err(CompileError::unsupported(&format!(
                "calling `{}.{}` from a `use`d module",
                module, name
            )));
        }
        let receiver = self.expr(object)?;
        match receiver.kind.clone() {
            Kind::Model(model) => {
                let sig = self
                    .inference
                    .models
                    .get(&model)
                    .and_then(|m| m.methods.get(name))
                    .filter(|_| name != ModelDef::INITIALIZER)
                    .ok_or_else(|| {
                        CompileError::new(format!("model `{}` has no method `{}`", model, name))
                    })?;
                let mut parts = vec![self.coerce(receiver, &Kind::Model(model.clone()))];
                parts.extend(self.arguments(&format!("{}.{}", model, name), &sig.params, args)?);
                Ok(Operand::new(
                    format!("{}({})", method_symbol(&model, name), parts.join(", ")),
                    sig.ret.clone(),
                ))
            }
            kind @ (Kind::Text | Kind::List | Kind::Matrix) => {
                if name == "len" && args.is_empty() {
                    return Ok(self.length(&receiver));
                }
                if kind == Kind::List && name == "grab" {
                    return self.grab(whole, receiver, args);
                }
                let builtin = builtins::method(&kind, name).ok_or_else(|| {
                    CompileError::new(format!("no method `{}` on a {} value", name, kind))
                })?;
                let mut operands = vec![receiver];
                operands.extend(self.operands(args)?);
                self.builtin(builtin, operands)
            }
            other => {
                // Receivers whose kind fell back to Number: keep the
                // arguments' effects and read the result as 0.
                log::warn!("codegen: no method `{}` on a {} value; reading it as 0", name, other);
                let mut parts: Vec<String> = self
                    .operands(args)?
                    .iter()
                    .map(Operand::statement)
                    .collect();
                parts.push("0.0".to_string());
                Ok(Operand::new(format!("({})", parts.join(", ")), Kind::Number))
            }
        }
    }

    /// Arguments of a user function or method, coerced to the parameter
    /// kinds.
    fn arguments(
        &self,
        name: &str,
        params: &[(String, Kind)],
        args: &[Expr],
    ) -> Result<Vec<String>, CompileError> {
        if args.len() != params.len() {
            return Err(arity_error(name, &params.len().to_string(), args.len()));
        }
        let mut parts = Vec::with_capacity(args.len());
        for (arg, (_, kind)) in args.iter().zip(params) {
            let value = self.expr(arg)?;
            parts.push(self.coerce(value, kind));
        }
        Ok(parts)
    }

    fn operands(&self, args: &[Expr]) -> Result<Vec<Operand>, CompileError> {
        args.iter().map(|arg| self.expr(arg)).collect()
    }

    /// A call of a runtime primitive.
    fn builtin(&self, builtin: &Builtin, operands: Vec<Operand>) -> Result<Operand, CompileError> {
        let required = builtin.required();
        let accepted = builtin.params.len();
        if operands.len() < required || operands.len() > accepted {
            let expected = if required == accepted {
                accepted.to_string()
            } else {
                format!("{} to {}", required, accepted)
            };
            return Err(arity_error(builtin.name, &expected, operands.len()));
        }
        let mut parts = Vec::with_capacity(accepted);
        for (i, param) in builtin.params.iter().enumerate() {
            let part = match (operands.get(i), param.default) {
                (Some(value), _) => self.slot(value, param.slot),
                (None, Some(default)) => default.to_string(),
                (None, None) => return Err(arity_error(builtin.name, &accepted.to_string(), operands.len())),
            };
            parts.push(part);
        }
        let code = format!("{}({})", builtin.symbol, parts.join(", "));
        Ok(match builtin.ret {
            Ret::Void => Operand::void(code),
            Ret::Cell => Operand::cell(code, Kind::Number),
            ret => Operand::new(code, ret.kind()),
        })
    }

    fn slot(&self, value: &Operand, slot: Slot) -> String {
        match slot {
            Slot::Num => self.number(value),
            Slot::Int => self.int(value),
            Slot::Text => self.stringify(value),
            Slot::List => self.coerce(value.clone(), &Kind::List),
            Slot::Matrix => self.coerce(value.clone(), &Kind::Matrix),
            Slot::Value => self.wrap(value),
        }
    }

    // ─── Kind-directed builtins ────────────────────────────────────

    fn special(&self, whole: &Expr, name: &str, args: &[Expr]) -> Result<Operand, CompileError> {
        match name {
            "out" | "print" => {
                let operands = self.operands(args)?;
                let code = match operands.as_slice() {
                    [] => "kuda_print_str(\"\")".to_string(),
                    [one] => self.print_call(one),
                    [first, rest @ ..] => {
                        let mut line = self.stringify(first);
                        for value in rest {
                            line = format!(
                                "kuda_concat(kuda_concat({}, \" \"), {})",
                                line,
                                self.stringify(value)
                            );
                        }
                        format!("kuda_print_str({})", line)
                    }
                };
                Ok(Operand::void(code))
            }
            "str" => {
                let arg = single(name, args)?;
                if let Expr::Number { value } = arg {
                    return Ok(Operand::new(c_string_literal(&format_number(*value)), Kind::Text));
                }
                let value = self.expr(arg)?;
                Ok(Operand::new(self.stringify(&value), Kind::Text))
            }
            "len" => {
                let value = self.expr(single(name, args)?)?;
                Ok(self.length(&value))
            }
            "int" | "float" => {
                let value = self.expr(single(name, args)?)?;
                let number = if value.kind == Kind::Text {
                    format!("kuda_str_to_num({})", self.coerce(value, &Kind::Text))
                } else {
                    self.number(&value)
                };
                let code = if name == "int" {
                    format!("trunc({})", number)
                } else {
                    number
                };
                Ok(Operand::new(code, Kind::Number))
            }
            "grab" => {
                let (list, rest) = args
                    .split_first()
                    .ok_or_else(|| arity_error(name, "1 or 2", 0))?;
                let list = self.expr(list)?;
                self.grab(whole, list, rest)
            }
            "range" => {
                let (start, stop, step) = self.range_bounds(args)?;
                let step = step.unwrap_or_else(|| "1.0".to_string());
                Ok(Operand::new(
                    format!("kuda_list_range({}, {}, {})", start, stop, step),
                    Kind::List,
                ))
            }
            _ => Err(CompileError::new(format!("unknown function `{}`", name))),
        }
    }

    /// `grab(xs)` pops the last item; `grab(xs, i)` reads item `i`.
    fn grab(&self, whole: &Expr, list: Operand, rest: &[Expr]) -> Result<Operand, CompileError> {
        let kind = self.env().kind_of(whole);
        let list = self.coerce(list, &Kind::List);
        match rest {
            [] => Ok(Operand::cell(format!("kuda_list_pop({})", list), kind)),
            [index] => {
                let index = self.expr(index)?;
                Ok(Operand::cell(
                    format!("kuda_list_get({}, {})", list, self.int(&index)),
                    kind,
                ))
            }
            _ => Err(arity_error("grab", "1 or 2", rest.len() + 1)),
        }
    }

    fn length(&self, value: &Operand) -> Operand {
        let code = match value.kind {
            Kind::Text => format!("kuda_str_len({})", self.coerce(value.clone(), &Kind::Text)),
            Kind::Matrix => format!("kuda_mat_rows({})", self.coerce(value.clone(), &Kind::Matrix)),
            _ => format!("kuda_list_len({})", self.coerce(value.clone(), &Kind::List)),
        };
        Operand::new(code, Kind::Number)
    }

    /// The runtime print call for a value.
    pub(in crate::codegen) fn print_call(&self, value: &Operand) -> String {
        if value.cell {
            return format!("kuda_print_str({})", self.stringify(value));
        }
        let code = value.value();
        match &value.kind {
            Kind::Number => format!("kuda_print_num({})", code),
            Kind::Boolean => format!("kuda_print_bool({})", code),
            Kind::Text => format!("kuda_print_str({})", code),
            Kind::List => format!("kuda_print_list({})", code),
            Kind::Matrix => format!("kuda_mat_print({})", code),
            Kind::Model(_) => format!("kuda_print_str({})", self.stringify(value)),
        }
    }
}

fn single<'e>(name: &str, args: &'e [Expr]) -> Result<&'e Expr, CompileError> {
    match args {
        [one] => Ok(one),
        _ => Err(arity_error(name, "1", args.len())),
    }
}
