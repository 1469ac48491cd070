//! Small byte and text helpers shared by the format layer.

/// Returns `true` if `needle` occurs anywhere in `haystack`.
pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Returns `true` if `value` is a complete `@...@` identifier.
///
/// The body must be non-empty and free of further `@` characters.
pub fn is_xref(value: &str) -> bool {
    value.len() > 2
        && value.starts_with('@')
        && value.ends_with('@')
        && !value[1..value.len() - 1].contains('@')
}
