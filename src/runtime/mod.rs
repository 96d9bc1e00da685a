//! The C runtime library every translated unit carries.
//!
//! The library text lives in `kuda_runtime.c` and is emitted verbatim,
//! after a block of `#define`s generated from [`RuntimeLimits`]. Every
//! runtime function is `static`, so a unit is self-contained.
//!
//! [`format_number`] mirrors the runtime's print rule so the code
//! generator can fold `str(<literal>)` at translation time.

pub mod builtins;
#[cfg(test)]
mod tests;

use crate::config::RuntimeLimits;

/// Verbatim runtime library source.
pub const RUNTIME_SOURCE: &str = include_str!("kuda_runtime.c");

/// Feature macro and standard headers opening every unit.
pub const PREAMBLE: &str = "\
#define _POSIX_C_SOURCE 200809L
#include <ctype.h>
#include <math.h>
#include <stdint.h>
#include <stdio.h>
#include <stdlib.h>
#include <string.h>
#include <time.h>
";

/// The runtime block for `limits`: limit `#define`s followed by the library.
pub fn runtime_library(limits: &RuntimeLimits) -> String {
    let mut out = String::with_capacity(RUNTIME_SOURCE.len() + 128);
    out.push_str(&limits.defines());
    out.push('\n');
    out.push_str(RUNTIME_SOURCE);
    out
}

/// Format `v` the way `kuda_print_num` does: integral values below 1e15
/// without a fraction, everything else like C's `%.6g`.
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.abs() < 1e15 && v == v.trunc() {
        return format!("{}", v as i64);
    }
    format_general(v, 6)
}

/// C `%.{precision}g`.
fn format_general(v: f64, precision: usize) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    let precision = precision.max(1);
    // Scientific rendering settles the decimal exponent after rounding.
    let sci = format!("{:.*e}", precision - 1, v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => (sci.clone(), 0),
    };
    if exp < -4 || exp >= precision as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_fraction_zeros(&mantissa),
            sign,
            exp.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        strip_fraction_zeros(&format!("{:.*}", decimals, v))
    }
}

fn strip_fraction_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Quote `s` as a C string literal.
pub fn c_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for byte in s.bytes() {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'\r' => out.push_str("\\r"),
            // `??x` would otherwise form a trigraph.
            b'?' => out.push_str("\\?"),
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\{:03o}", byte)),
        }
    }
    out.push('"');
    out
}
