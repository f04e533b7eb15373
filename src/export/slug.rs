//! Filesystem- and URL-safe slugs for post and attachment names.

/// Reduce `s` to a lowercase slug made of `[a-z0-9-]`.
///
/// Every character other than an ASCII letter, digit, hyphen or space is
/// dropped, surrounding whitespace is trimmed and inner spaces become
/// hyphens. Returns an empty string when nothing survives; callers pick
/// their own fallback name.
pub fn slugify(s: &str) -> String {
    let kept: String = s
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ' ')
        .collect();

    kept.trim().replace(' ', "-").to_ascii_lowercase()
}

/// [`slugify`], substituting `fallback` for an empty result.
pub fn slugify_or(s: &str, fallback: &str) -> String {
    let slug = slugify(s);
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}
