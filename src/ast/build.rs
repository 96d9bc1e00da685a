//! Terse constructors for building syntax trees in code.
//!
//! Front ends embedding the translator and the test suites use these
//! instead of spelling out every boxed variant.

use super::*;

pub fn program(statements: Vec<Stmt>) -> Program {
    Program { statements }
}

pub fn num(value: f64) -> Expr {
    Expr::Number { value }
}

pub fn text(value: &str) -> Expr {
    Expr::Text {
        value: value.to_string(),
    }
}

pub fn boolean(value: bool) -> Expr {
    Expr::Bool { value }
}

pub fn ident(name: &str) -> Expr {
    Expr::Ident {
        name: name.to_string(),
    }
}

pub fn binop(lhs: Expr, op: BinOp, rhs: Expr) -> Expr {
    Expr::BinOp {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub fn neg(operand: Expr) -> Expr {
    Expr::Unary {
        op: UnaryOp::Neg,
        operand: Box::new(operand),
    }
}

pub fn not(operand: Expr) -> Expr {
    Expr::Unary {
        op: UnaryOp::Not,
        operand: Box::new(operand),
    }
}

/// `name(args...)`
pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Box::new(ident(name)),
        args,
    }
}

/// `object.method(args...)`
pub fn method_call(object: Expr, method: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Box::new(attr(object, method)),
        args,
    }
}

pub fn attr(object: Expr, name: &str) -> Expr {
    Expr::Attr {
        object: Box::new(object),
        name: name.to_string(),
    }
}

pub fn index(object: Expr, index: Expr) -> Expr {
    Expr::Index {
        object: Box::new(object),
        index: Box::new(index),
    }
}

pub fn list(items: Vec<Expr>) -> Expr {
    Expr::List { items }
}

pub fn assign(name: &str, value: Expr) -> Stmt {
    Stmt::Assign {
        target: AssignTarget::Name {
            name: name.to_string(),
        },
        value,
    }
}

/// `object.field = value`
pub fn assign_field(object: Expr, field: &str, value: Expr) -> Stmt {
    Stmt::Assign {
        target: AssignTarget::Field {
            object,
            field: field.to_string(),
        },
        value,
    }
}

/// `self.field = value`
pub fn set_self(field: &str, value: Expr) -> Stmt {
    assign_field(ident("self"), field, value)
}

pub fn aug_assign(name: &str, op: BinOp, value: Expr) -> Stmt {
    Stmt::AugAssign {
        name: name.to_string(),
        op,
        value,
    }
}

pub fn index_assign(object: Expr, idx: Expr, value: Expr) -> Stmt {
    Stmt::IndexAssign {
        object,
        index: idx,
        value,
    }
}

pub fn out(value: Expr) -> Stmt {
    Stmt::Out { value }
}

pub fn give(value: Expr) -> Stmt {
    Stmt::Give { value }
}

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr { expr }
}

pub fn if_else(cond: Expr, body: Vec<Stmt>, else_body: Option<Vec<Stmt>>) -> Stmt {
    Stmt::If {
        branches: vec![CondBranch { cond, body }],
        else_body,
    }
}

pub fn repeat(count: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::Repeat { count, body }
}

pub fn each(var: &str, iterable: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::Each {
        var: var.to_string(),
        iterable,
        body,
    }
}

pub fn til(cond: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::Til { cond, body }
}

pub fn fun(name: &str, params: &[&str], body: Vec<Stmt>) -> Stmt {
    Stmt::Fun(FunDef {
        name: name.to_string(),
        params: params.iter().map(|p| p.to_string()).collect(),
        body,
    })
}

pub fn model(name: &str, methods: Vec<Stmt>) -> Stmt {
    Stmt::Model(ModelDef {
        name: name.to_string(),
        body: methods,
    })
}
