//! C spellings of Kuda names and literals.

use crate::types::Kind;

/// Identifiers a Kuda name must not shadow: C keywords and everything the
/// preamble and runtime declare at file scope.
const RESERVED: &[&str] = &[
    // keywords
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Bool", "_Complex", "_Imaginary",
    // libc and libm
    "main", "printf", "fprintf", "snprintf", "puts", "fopen", "fclose", "fread", "fgets", "exit",
    "abs", "fabs", "fmod", "exp", "log", "sqrt", "floor", "ceil", "pow", "fmax", "fmin", "round",
    "trunc", "tanh", "sin", "cos", "tan", "rand", "srand", "time", "clock", "free", "malloc",
    "calloc", "realloc", "memcpy", "strlen", "strcmp", "strtod", "isfinite", "isspace",
    "nanosleep", "stdin", "stdout", "stderr", "NULL", "NAN", "INFINITY", "errno",
    // runtime types
    "KValue", "KList", "KMatrix", "KBuf", "KTag",
];

/// A C identifier for a Kuda name.
///
/// Reserved names and names in the runtime's `kuda_` namespace get a
/// trailing underscore; non-ASCII characters become `_uXXXX`.
pub fn c_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push_str(&format!("_u{:04x}", ch as u32));
        }
    }
    let lower = out.to_ascii_lowercase();
    if RESERVED.contains(&out.as_str()) || lower.starts_with("kuda_") {
        out.push('_');
    }
    out
}

/// Declaration type of a slot of `kind`.
pub(crate) fn c_type(kind: &Kind) -> String {
    match kind {
        Kind::Model(name) => format!("{}*", c_ident(name)),
        other => other.c_type(),
    }
}

pub(crate) fn constructor_symbol(model: &str) -> String {
    format!("{}_new", c_ident(model))
}

/// `<Model>_<method>`; a method called `new` keeps clear of the constructor.
pub(crate) fn method_symbol(model: &str, method: &str) -> String {
    let mut symbol = format!("{}_{}", c_ident(model), c_ident(method));
    if method == "new" {
        symbol.push('_');
    }
    symbol
}

/// A `double` literal.
pub(crate) fn c_number(v: f64) -> String {
    if v.is_nan() {
        return "NAN".to_string();
    }
    if v.is_infinite() {
        return if v < 0.0 { "(-INFINITY)" } else { "INFINITY" }.to_string();
    }
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{:.1}", v)
    } else {
        format!("{:?}", v)
    }
}
