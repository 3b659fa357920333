/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The value that follows a label: surrounding space trimmed, then one
/// optional leading colon stripped and trimmed again.
pub fn value_after_label<'a>(text: &'a str, label: &str) -> &'a str {
    let rest = text.get(label.len()..).unwrap_or("").trim();
    match rest.strip_prefix(':') {
        Some(after) => after.trim(),
        None => rest,
    }
}

/// Whether `text` starts with `label` and the label is not the head of a
/// longer word (next char is non-alphanumeric, or the text ends).
pub fn starts_with_label(text: &str, label: &str) -> bool {
    if !text.starts_with(label) {
        return false;
    }
    match text[label.len()..].chars().next() {
        None => true,
        Some(c) => !c.is_alphanumeric(),
    }
}

/// Join two fragments with exactly one space; an empty side adds nothing.
pub fn join_spaced(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{} {}", head, tail),
    }
}
