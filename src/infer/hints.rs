/// Identifier and field names that suggest a Text value.
pub const TEXT_HINTS: &[&str] = &[
    "name",
    "title",
    "label",
    "text",
    "msg",
    "description",
    "type",
    "kind",
    "tag",
];

pub fn is_text_hint(name: &str) -> bool {
    TEXT_HINTS.contains(&name)
}

/// Kind for a name nothing else decides.
pub fn fallback_kind(name: &str) -> crate::types::Kind {
    if is_text_hint(name) {
        crate::types::Kind::Text
    } else {
        crate::types::Kind::Number
    }
}
