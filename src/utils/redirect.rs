/// Resolve a user-supplied `?redirect=` target.
///
/// Only same-site absolute paths are honoured; anything else (including protocol-relative
/// `//host` and backslash tricks) falls back to `/`.
#[must_use]
pub fn safe_redirect_target(target: Option<&str>) -> &str {
    match target {
        Some(t)
            if t.starts_with('/')
                && !t.starts_with("//")
                && !t.contains('\\')
                && !t.chars().any(char::is_control) =>
        {
            t
        }
        _ => "/",
    }
}
