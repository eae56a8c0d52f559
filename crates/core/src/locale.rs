//! Locale-aware link construction.

/// Path prefix marking Spanish-language pages.
pub const SPANISH_PREFIX: &str = "/es";

/// Whether `current_path` sits under the Spanish prefix.
///
/// Matches the prefix as a whole path segment, so `/es` and `/es/ed` match
/// while `/escape` does not.
pub fn is_spanish_path(current_path: &str) -> bool {
    current_path
        .strip_prefix(SPANISH_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Build a link to `path` that keeps the visitor in their current locale.
///
/// # Examples
///
/// ```
/// use rally_core::locale::make_locale_link;
///
/// assert_eq!(make_locale_link("/ed", "/about"), "/about");
/// assert_eq!(make_locale_link("/es/ed", "/about"), "/es/about");
/// ```
pub fn make_locale_link(current_path: &str, path: &str) -> String {
    if is_spanish_path(current_path) {
        format!("{SPANISH_PREFIX}{path}")
    } else {
        path.to_string()
    }
}
