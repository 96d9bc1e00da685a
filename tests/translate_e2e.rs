//! Translate small programs, build them with the system C compiler and
//! check what they print. Skipped when no `cc` is on the PATH.

use std::path::Path;
use std::process::Command;

use kuda::ast::build::*;
use kuda::ast::{BinOp, Program};
use kuda::TranslateOptions;

fn have_cc() -> bool {
    Command::new("cc")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn build_and_run(dir: &Path, program: &Program) -> String {
    let options = TranslateOptions::default().with_seed(42);
    let unit = kuda::translate_with_options(program, &options).expect("program translates");
    let source = dir.join("prog.c");
    let binary = dir.join("prog");
    std::fs::write(&source, &unit.source).expect("write C source");

    let cc = Command::new("cc")
        .arg("-std=c99")
        .arg("-O0")
        .arg("-o")
        .arg(&binary)
        .arg(&source)
        .arg("-lm")
        .output()
        .expect("run cc");
    assert!(
        cc.status.success(),
        "cc failed:\n{}\n--- source ---\n{}",
        String::from_utf8_lossy(&cc.stderr),
        unit.source
    );

    let run = Command::new(&binary).output().expect("run program");
    assert!(run.status.success(), "program exited with {}", run.status);
    String::from_utf8(run.stdout).expect("utf-8 output")
}

/// Output lines of `program`, or `None` when there is no C compiler.
fn run(program: Program) -> Option<Vec<String>> {
    if !have_cc() {
        eprintln!("skipping: no C compiler on PATH");
        return None;
    }
    let dir = tempfile::tempdir().expect("temp dir");
    let out = build_and_run(dir.path(), &program);
    Some(out.lines().map(str::to_string).collect())
}

#[test]
fn test_number_formatting() {
    let Some(lines) = run(program(vec![
        out(num(3.0)),
        out(num(3.5)),
        out(binop(num(1.0), BinOp::Div, num(4.0))),
        out(neg(num(2.0))),
    ])) else {
        return;
    };
    assert_eq!(lines, vec!["3", "3.5", "0.25", "-2"]);
}

#[test]
fn test_str_of_integer_literal() {
    let Some(lines) = run(program(vec![
        out(binop(call("str", vec![num(3.0)]), BinOp::Eq, text("3"))),
        assign("n", num(7.0)),
        out(binop(text("n="), BinOp::Add, ident("n"))),
    ])) else {
        return;
    };
    assert_eq!(lines, vec!["True", "n=7"]);
}

#[test]
fn test_text_function() {
    let Some(lines) = run(program(vec![
        fun("greet", &["n"], vec![give(binop(text("hi "), BinOp::Add, ident("n")))]),
        out(call("greet", vec![text("sam")])),
    ])) else {
        return;
    };
    assert_eq!(lines, vec!["hi sam"]);
}

#[test]
fn test_model_field_round_trip() {
    let Some(lines) = run(program(vec![
        model(
            "Point",
            vec![
                fun("init", &["self", "x"], vec![set_self("x", ident("x"))]),
                fun(
                    "shifted",
                    &["self", "d"],
                    vec![give(binop(attr(ident("self"), "x"), BinOp::Add, ident("d")))],
                ),
            ],
        ),
        assign("p", call("Point", vec![num(5.0)])),
        out(attr(ident("p"), "x")),
        out(method_call(ident("p"), "shifted", vec![num(2.0)])),
    ])) else {
        return;
    };
    assert_eq!(lines, vec!["5", "7"]);
}

#[test]
fn test_list_push_pop_and_reverse() {
    let Some(lines) = run(program(vec![
        assign("xs", list(vec![num(1.0), num(2.0)])),
        expr_stmt(call("add", vec![ident("xs"), num(3.0)])),
        out(call("len", vec![ident("xs")])),
        out(call("grab", vec![ident("xs")])),
        out(call("len", vec![ident("xs")])),
        assign("ys", list(vec![num(1.0), num(2.0), num(3.0)])),
        expr_stmt(method_call(ident("ys"), "rev", vec![])),
        out(ident("ys")),
        expr_stmt(method_call(ident("ys"), "rev", vec![])),
        out(ident("ys")),
    ])) else {
        return;
    };
    assert_eq!(lines, vec!["3", "3", "2", "[3, 2, 1]", "[1, 2, 3]"]);
}

#[test]
fn test_loops() {
    let Some(lines) = run(program(vec![
        assign("total", num(0.0)),
        each(
            "i",
            call("range", vec![num(1.0), num(5.0)]),
            vec![aug_assign("total", BinOp::Add, ident("i"))],
        ),
        out(ident("total")),
        assign("n", num(0.0)),
        repeat(num(4.0), vec![aug_assign("n", BinOp::Add, num(2.0))]),
        out(ident("n")),
        til(
            binop(ident("n"), BinOp::Gt, num(0.0)),
            vec![aug_assign("n", BinOp::Sub, num(3.0))],
        ),
        out(ident("n")),
    ])) else {
        return;
    };
    assert_eq!(lines, vec!["10", "8", "-1"]);
}

#[test]
fn test_transpose_is_an_involution() {
    let Some(lines) = run(program(vec![
        assign("a", call("mat_rand", vec![num(2.0), num(3.0)])),
        assign(
            "b",
            method_call(method_call(ident("a"), "T", vec![]), "T", vec![]),
        ),
        out(binop(
            call("str", vec![ident("a")]),
            BinOp::Eq,
            call("str", vec![ident("b")]),
        )),
        out(attr(method_call(ident("a"), "T", vec![]), "rows")),
    ])) else {
        return;
    };
    assert_eq!(lines, vec!["True", "3"]);
}

#[test]
fn test_matrix_product_is_associative() {
    let Some(lines) = run(program(vec![
        assign("a", call("mat_rand", vec![num(2.0), num(3.0)])),
        assign("b", call("mat_rand", vec![num(3.0), num(4.0)])),
        assign("c", call("mat_rand", vec![num(4.0), num(2.0)])),
        assign(
            "left",
            binop(binop(ident("a"), BinOp::Mul, ident("b")), BinOp::Mul, ident("c")),
        ),
        assign(
            "right",
            binop(ident("a"), BinOp::Mul, binop(ident("b"), BinOp::Mul, ident("c"))),
        ),
        out(binop(
            call("mse", vec![ident("left"), ident("right")]),
            BinOp::Lt,
            num(0.000001),
        )),
    ])) else {
        return;
    };
    assert_eq!(lines, vec!["True"]);
}

#[test]
fn test_inference_gaps_still_run() {
    let Some(lines) = run(program(vec![
        model(
            "Point",
            vec![fun("init", &["self", "x"], vec![set_self("x", ident("x"))])],
        ),
        fun("show", &["p"], vec![out(attr(ident("p"), "x"))]),
        assign("p", call("Point", vec![num(2.0)])),
        assign_field(ident("p"), "label", text("a")),
        out(attr(ident("p"), "x")),
        out(binop(ident("y"), BinOp::Add, num(1.0))),
    ])) else {
        return;
    };
    assert_eq!(lines, vec!["2", "1"]);
}
