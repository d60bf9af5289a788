//! Request URL rewriting.
//!
//! Base URLs are matched as prefixes ending on a URL boundary, so
//! `https://a.example` never matches `https://a.example.org/x`.

/// True if `url` is `base_url` itself or a location below it.
pub fn targets_base(url: &str, base_url: &str) -> bool {
    if base_url.is_empty() {
        return false;
    }
    match url.strip_prefix(base_url) {
        Some(rest) => rest.is_empty() || rest.starts_with(|c: char| matches!(c, '/' | '?' | '#')),
        None => false,
    }
}

/// Replace the `from` prefix of `url` with `to`.
///
/// Returns `None` when `url` does not target `from`. Nothing past the prefix is touched.
pub fn rewrite_url(url: &str, from: &str, to: &str) -> Option<String> {
    if !targets_base(url, from) {
        return None;
    }
    Some(format!("{}{}", to, &url[from.len()..]))
}

/// Resolve `path` against `base_url`.
pub fn join_url(base_url: &str, path: &str) -> String {
    if path.is_empty() {
        return base_url.to_string();
    }
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
