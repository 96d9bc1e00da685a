use super::*;

use kuda::ast::build::*;
use kuda::ast::BinOp;

use super::infer::report_json;
use super::translate::{cmd_translate, TranslateArgs};

fn greeter() -> Program {
    program(vec![
        fun("greet", &["n"], vec![give(binop(text("hi "), BinOp::Add, ident("n")))]),
        assign("msg", call("greet", vec![text("sam")])),
        out(ident("msg")),
    ])
}

fn write_tree(dir: &Path, program: &Program) -> PathBuf {
    let path = dir.join("prog.json");
    let json = serde_json::to_string_pretty(program).unwrap();
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_read_program_then_translate() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_tree(dir.path(), &greeter());

    let parsed = read_program(&path).unwrap();
    assert_eq!(parsed, greeter());

    let unit = kuda::translate(&parsed).unwrap();
    assert!(unit.source.contains("char* greet(char* n)"));
    assert!(unit.source.contains("kuda_print_str(msg);"));
}

#[test]
fn test_read_program_rejects_malformed_tree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{"statements": [{"stmt": "launch"}]}"#).unwrap();

    let err = read_program(&path).unwrap_err();
    assert!(format!("{}", err).contains("is not a Kuda syntax tree"));
}

#[test]
fn test_read_program_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_program(&dir.path().join("absent.json")).unwrap_err();
    assert!(format!("{}", err).contains("cannot read"));
}

#[test]
fn test_translate_command_writes_unit() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path(), &greeter());
    let output = dir.path().join("prog.c");

    cmd_translate(TranslateArgs {
        input,
        output: Some(output.clone()),
        seed: Some(7),
        limits: LimitArgs {
            max_matrix_dim: Some(64),
            max_str: None,
            list_capacity: None,
        },
    })
    .unwrap();

    let c = std::fs::read_to_string(&output).unwrap();
    assert!(c.contains("#define KUDA_MAX_MAT 64"));
    assert!(c.contains("srand(7u);"));
    assert!(c.contains("greet("));
}

#[test]
fn test_limit_args_fill_defaults() {
    let defaults = kuda::RuntimeLimits::default();
    let limits = LimitArgs {
        max_matrix_dim: None,
        max_str: Some(4096),
        list_capacity: None,
    }
    .limits();
    assert_eq!(limits.max_str, 4096);
    assert_eq!(limits.max_matrix_dim, defaults.max_matrix_dim);
    assert_eq!(limits.list_capacity, defaults.list_capacity);
}

#[test]
fn test_infer_report_json() {
    let inference = kuda::infer(&greeter());
    let json = report_json(&inference).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["functions"]["greet"]["ret"], "Text");
    assert_eq!(value["scopes"]["main"]["vars"]["msg"], "Text");
}
