//! Builtin functions and methods and the runtime primitives they lower to.
//!
//! A builtin call `f(a, b)` is looked up first in the method table of
//! `a`'s kind (so `len`, `fd`, `sum` pick the Text, List or Matrix
//! primitive), then in the general table. A method call `a.f(b)` uses the
//! same tables with the receiver as the leading argument. A handful of
//! names need kind-directed lowering and are handled by the code
//! generator directly (see [`SPECIAL`]).

use crate::types::Kind;

/// How an argument is passed to a runtime primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// `double`
    Num,
    /// `int`, truncated from a number.
    Int,
    /// `char*`, numbers and booleans are stringified.
    Text,
    /// `KList*`
    List,
    /// `KMatrix*`
    Matrix,
    /// A `KValue` list cell.
    Value,
}

/// What a runtime primitive returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ret {
    Number,
    Boolean,
    Text,
    List,
    Matrix,
    /// A procedure; `0.0` when used as a value.
    Void,
    /// A raw `KValue` taken out of a list.
    Cell,
}

impl Ret {
    /// The kind a call evaluates to.
    pub fn kind(self) -> Kind {
        match self {
            Ret::Number | Ret::Void | Ret::Cell => Kind::Number,
            Ret::Boolean => Kind::Boolean,
            Ret::Text => Kind::Text,
            Ret::List => Kind::List,
            Ret::Matrix => Kind::Matrix,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Param {
    pub slot: Slot,
    /// C text used when the argument is omitted.
    pub default: Option<&'static str>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Builtin {
    pub name: &'static str,
    pub symbol: &'static str,
    pub params: &'static [Param],
    pub ret: Ret,
}

impl Builtin {
    /// Number of arguments that must be supplied.
    pub fn required(&self) -> usize {
        self.params.iter().filter(|p| p.default.is_none()).count()
    }
}

const NUM: Param = Param {
    slot: Slot::Num,
    default: None,
};
const INT: Param = Param {
    slot: Slot::Int,
    default: None,
};
const TEXT: Param = Param {
    slot: Slot::Text,
    default: None,
};
const LIST: Param = Param {
    slot: Slot::List,
    default: None,
};
const MATRIX: Param = Param {
    slot: Slot::Matrix,
    default: None,
};
const VALUE: Param = Param {
    slot: Slot::Value,
    default: None,
};
const ZERO: Param = Param {
    slot: Slot::Num,
    default: Some("0.0"),
};
const ONE: Param = Param {
    slot: Slot::Num,
    default: Some("1.0"),
};
const PROMPT: Param = Param {
    slot: Slot::Text,
    default: Some("\"\""),
};
const SEPARATOR: Param = Param {
    slot: Slot::Text,
    default: Some("NULL"),
};

macro_rules! builtin {
    ($name:literal => $symbol:literal ($($param:expr),*) -> $ret:ident) => {
        Builtin {
            name: $name,
            symbol: $symbol,
            params: &[$($param),*],
            ret: Ret::$ret,
        }
    };
}

/// Names lowered by the code generator itself.
pub const SPECIAL: &[&str] = &[
    "out", "print", "str", "len", "int", "float", "grab", "range",
];

/// Builtins that construct a matrix.
pub const MATRIX_CONSTRUCTORS: &[&str] = &["Matrix", "MatrixRand", "mat_rand", "mat_zeros"];

/// Free functions.
pub static GENERAL: &[Builtin] = &[
    // numbers
    builtin!("abs" => "fabs"(NUM) -> Number),
    builtin!("round" => "kuda_round"(NUM, ZERO) -> Number),
    builtin!("exp" => "exp"(NUM) -> Number),
    builtin!("log" => "log"(NUM) -> Number),
    builtin!("prw" => "sqrt"(NUM) -> Number),
    builtin!("dwn" => "floor"(NUM) -> Number),
    builtin!("up" => "ceil"(NUM) -> Number),
    builtin!("pot" => "pow"(NUM, NUM) -> Number),
    builtin!("max" => "fmax"(NUM, NUM) -> Number),
    builtin!("min" => "fmin"(NUM, NUM) -> Number),
    builtin!("sigmoid" => "kuda_sigmoid"(NUM) -> Number),
    builtin!("relu" => "kuda_relu"(NUM) -> Number),
    builtin!("rand" => "kuda_rand"(INT, INT) -> Number),
    builtin!("rand_float" => "kuda_rand_float"() -> Number),
    builtin!("rand_normal" => "kuda_rand_normal"(ZERO, ONE) -> Number),
    builtin!("time" => "kuda_time"() -> Number),
    builtin!("wait" => "kuda_wait"(NUM) -> Void),
    // text and files
    builtin!("input" => "kuda_input"(PROMPT) -> Text),
    builtin!("read" => "kuda_read_file"(TEXT) -> Text),
    builtin!("write" => "kuda_write_file"(TEXT, TEXT) -> Void),
    builtin!("cut" => "kuda_cut"(TEXT, SEPARATOR) -> List),
    builtin!("swap" => "kuda_swap"(TEXT, TEXT, TEXT) -> Text),
    builtin!("caps" => "kuda_caps"(TEXT) -> Text),
    builtin!("small" => "kuda_small"(TEXT) -> Text),
    builtin!("trim" => "kuda_trim"(TEXT) -> Text),
    builtin!("merge" => "kuda_merge"(TEXT, LIST) -> Text),
    // lists
    builtin!("add" => "kuda_list_add"(LIST, VALUE) -> Void),
    builtin!("del" => "kuda_list_del"(LIST, VALUE) -> Void),
    builtin!("sort" => "kuda_list_sort"(LIST) -> Void),
    builtin!("rev" => "kuda_list_rev"(LIST) -> Void),
    builtin!("shuffle" => "kuda_list_shuffle"(LIST) -> Void),
    builtin!("fd" => "kuda_list_fd"(LIST, VALUE) -> Number),
    builtin!("cnt" => "kuda_list_cnt"(LIST, VALUE) -> Number),
    builtin!("sum" => "kuda_list_sum"(LIST) -> Number),
    // matrices
    builtin!("Matrix" => "kuda_mat_new"(INT, INT) -> Matrix),
    builtin!("mat_zeros" => "kuda_mat_new"(INT, INT) -> Matrix),
    builtin!("mat_rand" => "kuda_mat_rand"(INT, INT) -> Matrix),
    builtin!("MatrixRand" => "kuda_mat_rand"(INT, INT) -> Matrix),
    builtin!("mat_get" => "kuda_mat_get"(MATRIX, INT, INT) -> Number),
    builtin!("mat_set" => "kuda_mat_set"(MATRIX, INT, INT, NUM) -> Void),
    builtin!("mat_mul" => "kuda_mat_mul"(MATRIX, MATRIX) -> Matrix),
    builtin!("mat_add" => "kuda_mat_add"(MATRIX, MATRIX) -> Matrix),
    builtin!("mat_sub" => "kuda_mat_sub"(MATRIX, MATRIX) -> Matrix),
    builtin!("mat_hadamard" => "kuda_mat_hadamard"(MATRIX, MATRIX) -> Matrix),
    builtin!("mat_scale" => "kuda_mat_scale"(MATRIX, NUM) -> Matrix),
    builtin!("mat_T" => "kuda_mat_T"(MATRIX) -> Matrix),
    builtin!("mat_copy" => "kuda_mat_copy"(MATRIX) -> Matrix),
    builtin!("mat_row" => "kuda_mat_row"(MATRIX, INT) -> Matrix),
    builtin!("mat_print" => "kuda_mat_print"(MATRIX) -> Void),
    builtin!("mat_sum" => "kuda_mat_sum"(MATRIX) -> Number),
    builtin!("mat_mean" => "kuda_mat_mean"(MATRIX) -> Number),
    builtin!("dot" => "kuda_dot"(MATRIX, MATRIX) -> Number),
    builtin!("mat_sigmoid" => "kuda_mat_sigmoid"(MATRIX) -> Matrix),
    builtin!("mat_sigmoid_deriv" => "kuda_mat_sigmoid_deriv"(MATRIX) -> Matrix),
    builtin!("mat_relu" => "kuda_mat_relu"(MATRIX) -> Matrix),
    builtin!("mat_relu_deriv" => "kuda_mat_relu_deriv"(MATRIX) -> Matrix),
    builtin!("mat_tanh" => "kuda_mat_tanh"(MATRIX) -> Matrix),
    builtin!("mat_tanh_deriv" => "kuda_mat_tanh_deriv"(MATRIX) -> Matrix),
    builtin!("mse" => "kuda_mse"(MATRIX, MATRIX) -> Number),
    builtin!("mse_grad" => "kuda_mse_grad"(MATRIX, MATRIX) -> Matrix),
];

/// Methods on Text; the receiver is the first parameter.
pub static TEXT_METHODS: &[Builtin] = &[
    builtin!("cut" => "kuda_cut"(TEXT, SEPARATOR) -> List),
    builtin!("swap" => "kuda_swap"(TEXT, TEXT, TEXT) -> Text),
    builtin!("caps" => "kuda_caps"(TEXT) -> Text),
    builtin!("small" => "kuda_small"(TEXT) -> Text),
    builtin!("trim" => "kuda_trim"(TEXT) -> Text),
    builtin!("fd" => "kuda_str_find"(TEXT, TEXT) -> Number),
    builtin!("cnt" => "kuda_str_count"(TEXT, TEXT) -> Number),
    builtin!("merge" => "kuda_merge"(TEXT, LIST) -> Text),
];

/// Methods on List.
pub static LIST_METHODS: &[Builtin] = &[
    builtin!("add" => "kuda_list_add"(LIST, VALUE) -> Void),
    builtin!("del" => "kuda_list_del"(LIST, VALUE) -> Void),
    builtin!("sort" => "kuda_list_sort"(LIST) -> Void),
    builtin!("rev" => "kuda_list_rev"(LIST) -> Void),
    builtin!("shuffle" => "kuda_list_shuffle"(LIST) -> Void),
    builtin!("fd" => "kuda_list_fd"(LIST, VALUE) -> Number),
    builtin!("cnt" => "kuda_list_cnt"(LIST, VALUE) -> Number),
    builtin!("sum" => "kuda_list_sum"(LIST) -> Number),
    builtin!("max" => "kuda_list_max"(LIST) -> Number),
    builtin!("min" => "kuda_list_min"(LIST) -> Number),
    builtin!("copy" => "kuda_list_copy"(LIST) -> List),
];

/// Methods on Matrix.
pub static MATRIX_METHODS: &[Builtin] = &[
    builtin!("T" => "kuda_mat_T"(MATRIX) -> Matrix),
    builtin!("sigmoid" => "kuda_mat_sigmoid"(MATRIX) -> Matrix),
    builtin!("sigmoid_deriv" => "kuda_mat_sigmoid_deriv"(MATRIX) -> Matrix),
    builtin!("relu" => "kuda_mat_relu"(MATRIX) -> Matrix),
    builtin!("relu_deriv" => "kuda_mat_relu_deriv"(MATRIX) -> Matrix),
    builtin!("tanh" => "kuda_mat_tanh"(MATRIX) -> Matrix),
    builtin!("tanh_deriv" => "kuda_mat_tanh_deriv"(MATRIX) -> Matrix),
    builtin!("copy" => "kuda_mat_copy"(MATRIX) -> Matrix),
    builtin!("row" => "kuda_mat_row"(MATRIX, INT) -> Matrix),
    builtin!("mul" => "kuda_mat_mul"(MATRIX, MATRIX) -> Matrix),
    builtin!("hadamard" => "kuda_mat_hadamard"(MATRIX, MATRIX) -> Matrix),
    builtin!("scale" => "kuda_mat_scale"(MATRIX, NUM) -> Matrix),
    builtin!("get" => "kuda_mat_get"(MATRIX, INT, INT) -> Number),
    builtin!("set" => "kuda_mat_set"(MATRIX, INT, INT, NUM) -> Void),
    builtin!("sum" => "kuda_mat_sum"(MATRIX) -> Number),
    builtin!("mean" => "kuda_mat_mean"(MATRIX) -> Number),
    builtin!("dot" => "kuda_dot"(MATRIX, MATRIX) -> Number),
    builtin!("print" => "kuda_mat_print"(MATRIX) -> Void),
];

/// A free builtin function by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    GENERAL.iter().find(|b| b.name == name)
}

/// A builtin method of a receiver kind.
pub fn method(receiver: &Kind, name: &str) -> Option<&'static Builtin> {
    let table = match receiver {
        Kind::Text => TEXT_METHODS,
        Kind::List => LIST_METHODS,
        Kind::Matrix => MATRIX_METHODS,
        _ => return None,
    };
    table.iter().find(|b| b.name == name)
}

/// Resolve a free call `name(first, ...)`, preferring the method table of
/// the first argument's kind.
pub fn resolve(name: &str, first_arg: Option<&Kind>) -> Option<&'static Builtin> {
    first_arg
        .and_then(|kind| method(kind, name))
        .or_else(|| lookup(name))
}

pub fn is_special(name: &str) -> bool {
    SPECIAL.contains(&name)
}

/// Kind of a call to a special builtin.
pub fn special_kind(name: &str) -> Option<Kind> {
    match name {
        "str" => Some(Kind::Text),
        "range" => Some(Kind::List),
        "len" | "int" | "float" | "grab" | "out" | "print" => Some(Kind::Number),
        _ => None,
    }
}

/// Kind of `name(args)` given the kind of its first argument.
pub fn call_kind(name: &str, first_arg: Option<&Kind>) -> Option<Kind> {
    special_kind(name).or_else(|| resolve(name, first_arg).map(|b| b.ret.kind()))
}
