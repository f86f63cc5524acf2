//! Path templates and `{name}` placeholders.

/// Extract placeholder names from a path template, in order of appearance.
///
/// A placeholder is a maximal region bounded by `{` and `}` containing no
/// nested braces; its name is any non-empty run of non-brace characters.
/// Matching against parameter and property keys is by exact string equality.
///
/// # Example
/// ```
/// use restgen::template::placeholders;
///
/// assert_eq!(
///     placeholders("/accounts/{accountId}/users/{userId}"),
///     vec!["accountId", "userId"],
/// );
/// ```
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut found = vec![];
    let mut start = None;
    for (i, c) in template.char_indices() {
        match c {
            '{' => start = Some(i + 1),
            '}' => {
                if let Some(s) = start.take() {
                    if s < i {
                        found.push(&template[s..i]);
                    }
                }
            }
            _ => (),
        }
    }
    found
}

/// Replace each `{name}` region with the value produced by `resolve`.
///
/// Placeholders with no value are left in the template verbatim, so an
/// unresolved template remains visibly unresolved. Malformed regions
/// (nested or unclosed braces, empty names) are copied through unchanged.
pub fn substitute<F>(template: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        match rest[open + 1..].find(|c| c == '{' || c == '}') {
            Some(delta) => {
                let close = open + 1 + delta;
                if rest.as_bytes()[close] == b'}' && close > open + 1 {
                    let name = &rest[open + 1..close];
                    match resolve(name) {
                        Some(value) => out.push_str(&value),
                        None => out.push_str(&rest[open..=close]),
                    }
                    rest = &rest[close + 1..];
                } else {
                    out.push_str(&rest[open..close]);
                    rest = &rest[close..];
                }
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
