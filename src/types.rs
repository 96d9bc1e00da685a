//! Kinds: the single static value category inferred for every variable,
//! field, parameter and return position.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::ast::BinOp;

/// Closed set of value categories the C backend can represent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum Kind {
    Number,
    Boolean,
    Text,
    List,
    Matrix,
    /// An instance of the named model.
    Model(String),
}

impl Kind {
    /// The C declaration type for a slot of this kind.
    pub fn c_type(&self) -> String {
        match self {
            Kind::Number => "double".to_string(),
            Kind::Boolean => "int".to_string(),
            Kind::Text => "char*".to_string(),
            Kind::List => "KList*".to_string(),
            Kind::Matrix => "KMatrix*".to_string(),
            Kind::Model(name) => format!("{}*", name),
        }
    }

    /// Initializer used for hoisted declarations and fresh struct fields.
    pub fn default_value(&self) -> &'static str {
        match self {
            Kind::Number | Kind::Boolean => "0",
            Kind::Text => "\"\"",
            Kind::List | Kind::Matrix | Kind::Model(_) => "NULL",
        }
    }

    /// Kinds passed around as pointers.
    pub fn is_handle(&self) -> bool {
        !self.is_scalar()
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Kind::Number | Kind::Boolean)
    }

    /// Kinds that promote a parameter or return slot away from Number.
    pub fn promotes(&self) -> bool {
        self.is_handle()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Number => write!(f, "Number"),
            Kind::Boolean => write!(f, "Boolean"),
            Kind::Text => write!(f, "Text"),
            Kind::List => write!(f, "List"),
            Kind::Matrix => write!(f, "Matrix"),
            Kind::Model(name) => write!(f, "{}", name),
        }
    }
}

/// Result kind of `lhs op rhs`.
pub fn binary_kind(op: BinOp, lhs: &Kind, rhs: &Kind) -> Kind {
    if op.is_logical() || op.is_comparison() {
        return Kind::Boolean;
    }
    match op {
        BinOp::Mod => Kind::Number,
        BinOp::Add if *lhs == Kind::Text || *rhs == Kind::Text => Kind::Text,
        BinOp::Add if *lhs == Kind::List && *rhs == Kind::List => Kind::List,
        BinOp::Add | BinOp::Sub | BinOp::Mul
            if *lhs == Kind::Matrix || *rhs == Kind::Matrix =>
        {
            Kind::Matrix
        }
        BinOp::Div if *lhs == Kind::Matrix => Kind::Matrix,
        _ => Kind::Number,
    }
}

// ─── Symbol maps ───────────────────────────────────────────────────

/// Name → Kind, ordered by first insertion. A name's kind is fixed by its
/// first insertion; later inserts of the same name are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KindMap {
    entries: Vec<(String, Kind)>,
    index: BTreeMap<String, usize>,
}

impl KindMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `name` unless already present. Returns true if inserted.
    pub fn insert(&mut self, name: &str, kind: Kind) -> bool {
        if self.index.contains_key(name) {
            return false;
        }
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push((name.to_string(), kind));
        true
    }

    pub fn get(&self, name: &str) -> Option<&Kind> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Kind)> {
        self.entries.iter().map(|(n, k)| (n.as_str(), k))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for KindMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, kind) in &self.entries {
            map.serialize_entry(name, &kind.to_string())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_types_and_defaults() {
        assert_eq!(Kind::Number.c_type(), "double");
        assert_eq!(Kind::Boolean.c_type(), "int");
        assert_eq!(Kind::Text.c_type(), "char*");
        assert_eq!(Kind::Model("Point".into()).c_type(), "Point*");
        assert_eq!(Kind::Text.default_value(), "\"\"");
        assert_eq!(Kind::Matrix.default_value(), "NULL");
    }

    #[test]
    fn test_binary_kind_rules() {
        assert_eq!(binary_kind(BinOp::Add, &Kind::Text, &Kind::Number), Kind::Text);
        assert_eq!(binary_kind(BinOp::Add, &Kind::List, &Kind::List), Kind::List);
        assert_eq!(binary_kind(BinOp::Mul, &Kind::Number, &Kind::Matrix), Kind::Matrix);
        assert_eq!(binary_kind(BinOp::Div, &Kind::Number, &Kind::Matrix), Kind::Number);
        assert_eq!(binary_kind(BinOp::Mod, &Kind::Text, &Kind::Text), Kind::Number);
        assert_eq!(binary_kind(BinOp::Le, &Kind::Text, &Kind::Text), Kind::Boolean);
        assert_eq!(binary_kind(BinOp::And, &Kind::Number, &Kind::Number), Kind::Boolean);
    }

    #[test]
    fn test_kind_map_first_insert_wins() {
        let mut map = KindMap::new();
        assert!(map.insert("x", Kind::Text));
        assert!(!map.insert("x", Kind::Number));
        map.insert("a", Kind::List);
        assert_eq!(map.get("x"), Some(&Kind::Text));
        let names: Vec<&str> = map.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["x", "a"]);
    }
}
