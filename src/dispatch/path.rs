//! Path normalization

/// Canonical absolute form: one leading `/`, no empty segments, no trailing `/`
///
/// The root path normalizes to `/`.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Compose a handler base path and an operation sub-path
pub fn compose(base: &str, sub: &str) -> String {
    normalize(&format!("{base}/{sub}"))
}

/// Remove the mount prefix `context` from `path`
///
/// The prefix only matches on a segment boundary, so `/app` strips
/// `/app/x` but not `/apple`. Returns `None` for paths outside the mount.
/// An empty or `/` context accepts every path unchanged.
pub fn strip_context<'a>(path: &'a str, context: &str) -> Option<&'a str> {
    let context = context.trim_end_matches('/');
    if context.is_empty() {
        return Some(path);
    }
    match path.strip_prefix(context) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => Some(rest),
        _ => None,
    }
}
