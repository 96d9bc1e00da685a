//! The Kuda syntax tree, as handed over by the front end.
//!
//! The translator only ever borrows a [`Program`]; nothing here is mutated
//! after parsing, so the same tree can be re-run through the interpreter.

pub mod build;
pub mod display;
pub mod navigate;

use serde::{Deserialize, Serialize};

/// A parsed `.kuda` file: top-level statements in source order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// `fun name(params): body`. Methods carry `self` as their first parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

impl FunDef {
    /// Parameters after the explicit `self` receiver.
    pub fn params_without_self(&self) -> &[String] {
        match self.params.first() {
            Some(first) if first == "self" => &self.params[1..],
            _ => &self.params,
        }
    }
}

/// `model Name: body`. The body holds `fun` declarations; `init` is the
/// initializer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelDef {
    pub name: String,
    pub body: Vec<Stmt>,
}

impl ModelDef {
    pub const INITIALIZER: &'static str = "init";

    /// Method declarations in written order.
    pub fn methods(&self) -> impl Iterator<Item = &FunDef> {
        self.body.iter().filter_map(|stmt| match stmt {
            Stmt::Fun(def) => Some(def),
            _ => None,
        })
    }

    pub fn initializer(&self) -> Option<&FunDef> {
        self.methods().find(|m| m.name == Self::INITIALIZER)
    }
}

/// One `if`/`othif` arm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CondBranch {
    pub cond: Expr,
    pub body: Vec<Stmt>,
}

/// Left-hand side of a plain `=` assignment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum AssignTarget {
    Name { name: String },
    Field { object: Expr, field: String },
}

/// Statements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    Assign {
        target: AssignTarget,
        value: Expr,
    },
    /// `xs[i] = value`
    IndexAssign {
        object: Expr,
        index: Expr,
        value: Expr,
    },
    /// `name += value` and friends.
    AugAssign {
        name: String,
        op: BinOp,
        value: Expr,
    },
    If {
        branches: Vec<CondBranch>,
        else_body: Option<Vec<Stmt>>,
    },
    Repeat {
        count: Expr,
        body: Vec<Stmt>,
    },
    Each {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    /// `each a, b in pairs:`
    EachUnpack {
        vars: Vec<String>,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Til {
        cond: Expr,
        body: Vec<Stmt>,
    },
    Fun(FunDef),
    Give {
        value: Expr,
    },
    Model(ModelDef),
    Use {
        module: String,
        alias: Option<String>,
    },
    Out {
        value: Expr,
    },
    Try {
        body: Vec<Stmt>,
        fail_body: Vec<Stmt>,
    },
    Break,
    Continue,
    Expr {
        expr: Expr,
    },
}

/// Expressions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Expr {
    Number {
        value: f64,
    },
    Text {
        value: String,
    },
    Bool {
        value: bool,
    },
    None,
    Ident {
        name: String,
    },
    BinOp {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Attr {
        object: Box<Expr>,
        name: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    List {
        items: Vec<Expr>,
    },
    Tuple {
        items: Vec<Expr>,
    },
    Dict {
        entries: Vec<(Expr, Expr)>,
    },
    /// `[expr each var in iterable]`
    ListComp {
        expr: Box<Expr>,
        var: String,
        iterable: Box<Expr>,
    },
}

impl Expr {
    /// The callee name when this is a call of a bare identifier.
    pub fn called_name(&self) -> Option<&str> {
        match self {
            Expr::Call { callee, .. } => match callee.as_ref() {
                Expr::Ident { name } => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident { name } => Some(name),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %
    Eq,  // ==
    Ne,  // !=
    Lt,  // <
    Gt,  // >
    Le,  // <=
    Ge,  // >=
    And, // and
    Or,  // or
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg, // -
    Not, // not
}
