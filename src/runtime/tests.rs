use super::builtins::{self, Ret, Slot};
use super::*;
use crate::config::RuntimeLimits;
use crate::types::Kind;

// ─── Number formatting ─────────────────────────────────────────────

#[test]
fn test_integral_numbers_print_without_fraction() {
    assert_eq!(format_number(3.0), "3");
    assert_eq!(format_number(-2.0), "-2");
    assert_eq!(format_number(0.0), "0");
    assert_eq!(format_number(123456789.0), "123456789");
}

#[test]
fn test_fractional_numbers_use_general_format() {
    assert_eq!(format_number(3.5), "3.5");
    assert_eq!(format_number(0.1 + 0.2), "0.3");
    assert_eq!(format_number(0.0001), "0.0001");
    assert_eq!(format_number(0.00001), "1e-05");
    assert_eq!(format_number(1234567.5), "1.23457e+06");
    assert_eq!(format_number(-0.25), "-0.25");
}

#[test]
fn test_large_and_special_numbers() {
    assert_eq!(format_number(1e15), "1e+15");
    assert_eq!(format_number(2.5e20), "2.5e+20");
    assert_eq!(format_number(f64::NAN), "nan");
    assert_eq!(format_number(f64::INFINITY), "inf");
    assert_eq!(format_number(f64::NEG_INFINITY), "-inf");
}

// ─── String literals ───────────────────────────────────────────────

#[test]
fn test_string_literal_escapes() {
    assert_eq!(c_string_literal("hi"), "\"hi\"");
    assert_eq!(c_string_literal("a\"b\n"), "\"a\\\"b\\n\"");
    assert_eq!(c_string_literal("tab\there"), "\"tab\\there\"");
    assert_eq!(c_string_literal("C:\\dir"), "\"C:\\\\dir\"");
    assert_eq!(c_string_literal("??="), "\"\\?\\?=\"");
    assert_eq!(c_string_literal("é"), "\"\\303\\251\"");
    assert_eq!(c_string_literal(""), "\"\"");
}

// ─── Library text ──────────────────────────────────────────────────

#[test]
fn test_runtime_library_carries_limits_and_primitives() {
    let limits = RuntimeLimits {
        max_str: 1024,
        max_matrix_dim: 64,
        list_capacity: 8,
    };
    let lib = runtime_library(&limits);
    assert!(lib.starts_with("#define KUDA_MAX_STR 1024"));
    assert!(lib.contains("#define KUDA_MAX_MAT 64"));
    assert!(lib.contains("#define KUDA_LIST_INIT_CAP 8"));
    for symbol in [
        "kuda_print_num",
        "kuda_list_add",
        "kuda_list_pop",
        "kuda_concat",
        "kuda_cut",
        "kuda_mat_mul",
        "kuda_mat_T",
        "kuda_mat_print",
        "kuda_mse_grad",
    ] {
        assert!(lib.contains(symbol), "runtime is missing {}", symbol);
    }
}

#[test]
fn test_preamble_defines_posix_before_includes() {
    let define = PREAMBLE.find("_POSIX_C_SOURCE");
    let include = PREAMBLE.find("#include");
    assert!(define.is_some() && include.is_some());
    assert!(define < include);
    assert!(PREAMBLE.contains("#include <math.h>"));
}

#[test]
fn test_every_table_symbol_is_defined_by_the_runtime() {
    let tables = [
        builtins::GENERAL,
        builtins::TEXT_METHODS,
        builtins::LIST_METHODS,
        builtins::MATRIX_METHODS,
    ];
    for table in tables {
        for b in table {
            if !b.symbol.starts_with("kuda_") {
                continue;
            }
            let defined = RUNTIME_SOURCE.contains(&format!("{}(", b.symbol))
                || RUNTIME_SOURCE.contains(&format!("({},", b.symbol));
            assert!(
                defined,
                "builtin `{}` lowers to undefined `{}`",
                b.name,
                b.symbol
            );
        }
    }
}

#[test]
fn test_text_returning_primitives_never_hand_out_literals() {
    for chunk in RUNTIME_SOURCE.split("static char* ").skip(1) {
        let name = chunk.split('(').next().unwrap_or("");
        let body = chunk.split("\n}\n").next().unwrap_or("");
        for line in body.lines().map(str::trim) {
            if line.starts_with("return ") && line.contains('"') {
                assert!(
                    line.starts_with("return kuda_strdup("),
                    "`{}` returns a string literal: {}",
                    name,
                    line
                );
            }
        }
    }
    assert!(RUNTIME_SOURCE.contains("return kuda_strdup(v ? \"True\" : \"False\");"));
}

// ─── Builtin resolution ────────────────────────────────────────────

#[test]
fn test_resolution_prefers_receiver_kind() {
    let fd_text = builtins::resolve("fd", Some(&Kind::Text)).map(|b| b.symbol);
    assert_eq!(fd_text, Some("kuda_str_find"));
    let fd_list = builtins::resolve("fd", Some(&Kind::List)).map(|b| b.symbol);
    assert_eq!(fd_list, Some("kuda_list_fd"));
    let sum_matrix = builtins::resolve("sum", Some(&Kind::Matrix)).map(|b| b.symbol);
    assert_eq!(sum_matrix, Some("kuda_mat_sum"));
    // Numbers have no method table; the general entry applies.
    let abs = builtins::resolve("abs", Some(&Kind::Number)).map(|b| b.symbol);
    assert_eq!(abs, Some("fabs"));
    assert!(builtins::resolve("nope", None).is_none());
}

#[test]
fn test_builtin_arity_and_defaults() {
    let round = builtins::lookup("round").expect("round");
    assert_eq!(round.params.len(), 2);
    assert_eq!(round.required(), 1);
    let input = builtins::lookup("input").expect("input");
    assert_eq!(input.required(), 0);
    assert_eq!(input.params[0].slot, Slot::Text);
    let add = builtins::lookup("add").expect("add");
    assert_eq!(add.params[1].slot, Slot::Value);
    assert_eq!(add.ret, Ret::Void);
}

#[test]
fn test_call_kinds() {
    assert_eq!(builtins::call_kind("str", None), Some(Kind::Text));
    assert_eq!(builtins::call_kind("range", None), Some(Kind::List));
    assert_eq!(builtins::call_kind("len", Some(&Kind::Text)), Some(Kind::Number));
    assert_eq!(builtins::call_kind("cut", Some(&Kind::Text)), Some(Kind::List));
    assert_eq!(builtins::call_kind("mat_rand", None), Some(Kind::Matrix));
    assert_eq!(builtins::call_kind("wait", None), Some(Kind::Number));
    assert_eq!(builtins::call_kind("unknown", None), None);
}
