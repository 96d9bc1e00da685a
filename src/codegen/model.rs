//! Model lowering.
//!
//! A model `M` becomes `struct M` (one member per inferred field), a
//! constructor `M* M_new(...)` that zero-allocates the instance, gives Text
//! fields an empty string, runs the `init` body with the instance bound to
//! `self` and returns it, and one `M_method(M* self, ...)` per other method.
//! Dispatch is static.

use crate::ast::{FunDef, ModelDef, Stmt};
use crate::error::CompileError;
use crate::types::Kind;

use super::emitter::{parameter_list, Emitter};
use super::method_scope;
use super::names::{c_ident, c_type, constructor_symbol, method_symbol};

impl Emitter<'_> {
    pub(super) fn typedef(&mut self, model: &ModelDef) {
        let name = c_ident(&model.name);
        self.line(format!("typedef struct {} {};", name, name));
    }

    pub(super) fn struct_definition(&mut self, model: &ModelDef) {
        let Some(info) = self.inference.models.get(&model.name) else {
            return;
        };
        self.open(format!("struct {} {{", c_ident(&model.name)));
        if info.fields.is_empty() {
            // C forbids empty structs.
            self.line("char kuda_unused;");
        }
        for (field, kind) in info.fields.iter() {
            self.line(format!("{} {};", c_type(kind), c_ident(field)));
        }
        self.close("};");
    }

    fn constructor_signature(&self, model: &ModelDef) -> String {
        let params = model
            .initializer()
            .map(|init| self.parameters(model, init))
            .unwrap_or_default();
        format!(
            "{}* {}({})",
            c_ident(&model.name),
            constructor_symbol(&model.name),
            parameter_list(&params)
        )
    }

    fn method_signature(&self, model: &ModelDef, method: &FunDef) -> String {
        let ret = self
            .inference
            .models
            .get(&model.name)
            .and_then(|m| m.methods.get(&method.name))
            .map(|sig| c_type(&sig.ret))
            .unwrap_or_else(|| "double".to_string());
        let mut params = vec![format!("{}* self", c_ident(&model.name))];
        params.extend(self.parameters(model, method));
        format!(
            "{} {}({})",
            ret,
            method_symbol(&model.name, &method.name),
            params.join(", ")
        )
    }

    /// C parameters of a method, `self` excluded.
    fn parameters(&self, model: &ModelDef, method: &FunDef) -> Vec<String> {
        let sig = self
            .inference
            .models
            .get(&model.name)
            .and_then(|m| m.methods.get(&method.name));
        method
            .params_without_self()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let kind = sig.and_then(|s| s.param_kind(i)).unwrap_or(&Kind::Number);
                format!("{} {}", c_type(kind), c_ident(name))
            })
            .collect()
    }

    pub(super) fn model_prototypes(&mut self, model: &ModelDef) {
        let signature = self.constructor_signature(model);
        self.line(format!("{};", signature));
        for method in non_init_methods(model) {
            let signature = self.method_signature(model, method);
            self.line(format!("{};", signature));
        }
    }

    pub(super) fn constructor(&mut self, model: &ModelDef) -> Result<(), CompileError> {
        check_model_body(model)?;
        let name = c_ident(&model.name);
        let signature = self.constructor_signature(model);
        self.open(format!("{} {{", signature));
        self.line(format!("{}* self = kuda_zalloc(sizeof({}));", name, name));
        if let Some(info) = self.inference.models.get(&model.name) {
            for (field, kind) in info.fields.iter() {
                if *kind == Kind::Text {
                    self.line(format!("self->{} = \"\";", c_ident(field)));
                }
            }
        }
        if let Some(init) = model.initializer() {
            let scope = method_scope(&model.name, &init.name);
            self.enter(&scope, true)?;
            self.hoist(&scope);
            self.body(&init.body)?;
        }
        self.line("return self;");
        self.close("}");
        self.blank();
        Ok(())
    }

    pub(super) fn methods(&mut self, model: &ModelDef) -> Result<(), CompileError> {
        for method in non_init_methods(model) {
            let scope = method_scope(&model.name, &method.name);
            self.enter(&scope, false)?;
            let signature = self.method_signature(model, method);
            self.open(format!("{} {{", signature));
            self.hoist(&scope);
            self.body(&method.body)?;
            let fallback = self.frame.ret.map(|k| k.default_value()).unwrap_or("0");
            self.line(format!("return {};", fallback));
            self.close("}");
            self.blank();
        }
        Ok(())
    }
}

fn non_init_methods(model: &ModelDef) -> impl Iterator<Item = &FunDef> {
    model
        .methods()
        .filter(|m| m.name != ModelDef::INITIALIZER)
}

/// A model body holds method declarations only.
fn check_model_body(model: &ModelDef) -> Result<(), CompileError> {
    for stmt in &model.body {
        if !matches!(stmt, Stmt::Fun(_)) {
            return Err(CompileError::unsupported("a statement in a model body").with_note(
                format!("model `{}` holds a {} outside any method", model.name, stmt.kind_name()),
            ));
        }
    }
    Ok(())
}
