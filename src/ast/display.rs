//! Short human-readable names for AST nodes, used in diagnostics and logs.

use super::{Expr, Stmt};

impl Stmt {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Assign { .. } => "assignment",
            Stmt::IndexAssign { .. } => "index assignment",
            Stmt::AugAssign { .. } => "augmented assignment",
            Stmt::If { .. } => "if",
            Stmt::Repeat { .. } => "repeat",
            Stmt::Each { .. } => "each",
            Stmt::EachUnpack { .. } => "each with unpacking",
            Stmt::Til { .. } => "til",
            Stmt::Fun(_) => "fun",
            Stmt::Give { .. } => "give",
            Stmt::Model(_) => "model",
            Stmt::Use { .. } => "use",
            Stmt::Out { .. } => "out",
            Stmt::Try { .. } => "try",
            Stmt::Break => "break",
            Stmt::Continue => "continue",
            Stmt::Expr { .. } => "expression statement",
        }
    }
}

impl Expr {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Number { .. } => "number literal",
            Expr::Text { .. } => "string literal",
            Expr::Bool { .. } => "boolean literal",
            Expr::None => "None",
            Expr::Ident { .. } => "identifier",
            Expr::BinOp { .. } => "binary operation",
            Expr::Unary { .. } => "unary operation",
            Expr::Call { .. } => "call",
            Expr::Attr { .. } => "attribute access",
            Expr::Index { .. } => "index",
            Expr::List { .. } => "list literal",
            Expr::Tuple { .. } => "tuple",
            Expr::Dict { .. } => "dict",
            Expr::ListComp { .. } => "list comprehension",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::build::*;
    use crate::ast::Expr;

    #[test]
    fn test_kind_names() {
        assert_eq!(call("f", vec![]).kind_name(), "call");
        assert_eq!(Expr::Tuple { items: vec![] }.kind_name(), "tuple");
        assert_eq!(out(num(1.0)).kind_name(), "out");
    }
}
