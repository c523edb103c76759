//! Input scrubbing for values taken from webhook payloads.
//!
//! This is not an encoding scheme: control characters that could split a
//! header or request line are replaced, and URL components are reduced to a
//! conservative character set.

/// Replace newline, carriage return and tab with `_`, then trim.
/// A missing value becomes the empty string.
pub fn sanitize(input: Option<&str>) -> String {
    match input {
        Some(s) => s
            .chars()
            .map(|c| if matches!(c, '\n' | '\r' | '\t') { '_' } else { c })
            .collect::<String>()
            .trim()
            .to_string(),
        None => String::new(),
    }
}

/// `sanitize`, then drop every character outside `[a-zA-Z0-9:/._-]`.
pub fn sanitize_url(input: &str) -> String {
    sanitize(Some(input))
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '/' | '.' | '_' | '-'))
        .collect()
}
