//! Utility functions for mapping review output.

/// Lowercases text and joins its alphanumeric runs with `-`, giving an id
/// that is safe to use as a URL fragment.
pub fn slugify(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// "There is 1 unmapped {singular}" / "There are N unmapped {plural}".
pub fn unmapped_message(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("There is 1 unmapped {singular}")
    } else {
        format!("There are {count} unmapped {plural}")
    }
}
