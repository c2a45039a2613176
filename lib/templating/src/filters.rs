use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^A-Za-z0-9_]").unwrap();
}

/// Strips every non-word character, turning a display name into a DSL identifier.
/// `"Order Service!"` becomes `"OrderService"`.
pub fn identifier(value: &str) -> String {
    NON_WORD.replace_all(value, "").into_owned()
}

/// Renders `value` as a double quoted DSL string literal.
pub(crate) fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
