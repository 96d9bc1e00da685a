//! AST navigation: lookups by name and depth-first walkers.
//!
//! Every inference pass walks bodies the same way: statements in written
//! order, descending into `if` arms (then `other`), loop bodies and `try`
//! bodies. `fail` bodies are skipped because they are never lowered, and
//! nested `fun`/`model` declarations are not entered.

use super::{Expr, FunDef, ModelDef, Program, Stmt};

/// Find a top-level function by name.
pub fn find_function<'a>(program: &'a Program, name: &str) -> Option<&'a FunDef> {
    program.statements.iter().find_map(|stmt| match stmt {
        Stmt::Fun(def) if def.name == name => Some(def),
        _ => None,
    })
}

/// Find a top-level model by name.
pub fn find_model<'a>(program: &'a Program, name: &str) -> Option<&'a ModelDef> {
    program.statements.iter().find_map(|stmt| match stmt {
        Stmt::Model(def) if def.name == name => Some(def),
        _ => None,
    })
}

/// Top-level functions in declaration order.
pub fn functions(program: &Program) -> impl Iterator<Item = &FunDef> {
    program.statements.iter().filter_map(|stmt| match stmt {
        Stmt::Fun(def) => Some(def),
        _ => None,
    })
}

/// Top-level models in declaration order.
pub fn models(program: &Program) -> impl Iterator<Item = &ModelDef> {
    program.statements.iter().filter_map(|stmt| match stmt {
        Stmt::Model(def) => Some(def),
        _ => None,
    })
}

/// Top-level statements that belong to the program entry (everything but
/// declarations).
pub fn entry_statements(program: &Program) -> Vec<&Stmt> {
    program
        .statements
        .iter()
        .filter(|stmt| !matches!(stmt, Stmt::Fun(_) | Stmt::Model(_)))
        .collect()
}

/// Nested statement blocks of a compound statement, in written order.
pub fn child_blocks(stmt: &Stmt) -> Vec<&[Stmt]> {
    match stmt {
        Stmt::If {
            branches,
            else_body,
        } => {
            let mut blocks: Vec<&[Stmt]> = branches.iter().map(|b| b.body.as_slice()).collect();
            if let Some(else_body) = else_body {
                blocks.push(else_body.as_slice());
            }
            blocks
        }
        Stmt::Repeat { body, .. }
        | Stmt::Each { body, .. }
        | Stmt::EachUnpack { body, .. }
        | Stmt::Til { body, .. }
        | Stmt::Try { body, .. } => vec![body.as_slice()],
        _ => Vec::new(),
    }
}

/// Visit every statement of `body` depth-first (pre-order).
pub fn walk_stmts<'a>(body: &'a [Stmt], f: &mut impl FnMut(&'a Stmt)) {
    for stmt in body {
        f(stmt);
        for block in child_blocks(stmt) {
            walk_stmts(block, f);
        }
    }
}

/// Expressions owned directly by `stmt` (not by its nested blocks).
pub fn stmt_exprs(stmt: &Stmt) -> Vec<&Expr> {
    match stmt {
        Stmt::Assign { target, value } => match target {
            super::AssignTarget::Name { .. } => vec![value],
            super::AssignTarget::Field { object, .. } => vec![object, value],
        },
        Stmt::IndexAssign {
            object,
            index,
            value,
        } => vec![object, index, value],
        Stmt::AugAssign { value, .. } => vec![value],
        Stmt::If { branches, .. } => branches.iter().map(|b| &b.cond).collect(),
        Stmt::Repeat { count, .. } => vec![count],
        Stmt::Each { iterable, .. } | Stmt::EachUnpack { iterable, .. } => vec![iterable],
        Stmt::Til { cond, .. } => vec![cond],
        Stmt::Give { value } | Stmt::Out { value } => vec![value],
        Stmt::Expr { expr } => vec![expr],
        Stmt::Fun(_)
        | Stmt::Model(_)
        | Stmt::Use { .. }
        | Stmt::Try { .. }
        | Stmt::Break
        | Stmt::Continue => Vec::new(),
    }
}

/// Visit `expr` and all of its sub-expressions (pre-order, left to right).
pub fn walk_expr<'a>(expr: &'a Expr, f: &mut impl FnMut(&'a Expr)) {
    f(expr);
    match expr {
        Expr::BinOp { lhs, rhs, .. } => {
            walk_expr(lhs, f);
            walk_expr(rhs, f);
        }
        Expr::Unary { operand, .. } => walk_expr(operand, f),
        Expr::Call { callee, args } => {
            walk_expr(callee, f);
            for arg in args {
                walk_expr(arg, f);
            }
        }
        Expr::Attr { object, .. } => walk_expr(object, f),
        Expr::Index { object, index } => {
            walk_expr(object, f);
            walk_expr(index, f);
        }
        Expr::List { items } | Expr::Tuple { items } => {
            for item in items {
                walk_expr(item, f);
            }
        }
        Expr::Dict { entries } => {
            for (key, value) in entries {
                walk_expr(key, f);
                walk_expr(value, f);
            }
        }
        Expr::ListComp { expr, iterable, .. } => {
            walk_expr(expr, f);
            walk_expr(iterable, f);
        }
        Expr::Number { .. }
        | Expr::Text { .. }
        | Expr::Bool { .. }
        | Expr::None
        | Expr::Ident { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;

    #[test]
    fn test_walk_stmts_is_depth_first_in_written_order() {
        let body = vec![
            assign("a", num(1.0)),
            if_else(
                boolean(true),
                vec![assign("b", num(2.0))],
                Some(vec![assign("c", num(3.0))]),
            ),
            repeat(num(2.0), vec![assign("d", num(4.0))]),
            assign("e", num(5.0)),
        ];
        let mut names = Vec::new();
        walk_stmts(&body, &mut |stmt| {
            if let Stmt::Assign {
                target: crate::ast::AssignTarget::Name { name },
                ..
            } = stmt
            {
                names.push(name.clone());
            }
        });
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_walk_skips_fail_body_and_nested_functions() {
        let body = vec![
            Stmt::Try {
                body: vec![assign("tried", num(1.0))],
                fail_body: vec![assign("failed", num(2.0))],
            },
            fun("inner", &[], vec![assign("hidden", num(3.0))]),
        ];
        let mut count = 0;
        walk_stmts(&body, &mut |stmt| {
            if matches!(stmt, Stmt::Assign { .. }) {
                count += 1;
            }
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn test_find_function_and_model() {
        let prog = program(vec![
            fun("greet", &["n"], vec![give(text("hi"))]),
            model("Point", vec![]),
        ]);
        assert!(find_function(&prog, "greet").is_some());
        assert!(find_function(&prog, "Point").is_none());
        assert!(find_model(&prog, "Point").is_some());
        assert_eq!(entry_statements(&prog).len(), 0);
    }

    #[test]
    fn test_walk_expr_visits_call_arguments() {
        let e = call("f", vec![binop(ident("a"), crate::ast::BinOp::Add, num(1.0))]);
        let mut idents = Vec::new();
        walk_expr(&e, &mut |sub| {
            if let Some(name) = sub.as_ident() {
                idents.push(name.to_string());
            }
        });
        assert_eq!(idents, vec!["f", "a"]);
    }
}
