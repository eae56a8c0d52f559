//! Page code normalization.
//!
//! A page code is the URL slug that identifies a page within a campaign.
//! Codes are stored normalized, so every lookup must normalize the route
//! parameter first.

use crate::error::CoreError;

/// Longest accepted normalized page code.
pub const MAX_PAGE_CODE_LEN: usize = 64;

/// Canonicalize a raw page code.
///
/// - surrounding whitespace is trimmed and letters are lowercased
/// - whitespace and `_` become `-`
/// - anything outside `[a-z0-9-]` is dropped
/// - runs of `-` collapse to one, and leading/trailing `-` are stripped
///
/// The function is idempotent: `normalize_page_code(normalize_page_code(x))`
/// equals `normalize_page_code(x)`.
///
/// # Examples
///
/// ```
/// use rally_core::page_code::normalize_page_code;
///
/// assert_eq!(normalize_page_code("  Ed "), "ed");
/// assert_eq!(normalize_page_code("Help_Ed Now!"), "help-ed-now");
/// ```
pub fn normalize_page_code(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut pending_dash = false;

    for ch in code.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_dash = true;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        }
    }

    out
}

/// Normalize a code and reject results that cannot name a page.
pub fn validate_page_code(code: &str) -> Result<String, CoreError> {
    let normalized = normalize_page_code(code);

    if normalized.is_empty() {
        return Err(CoreError::Validation(format!(
            "Page code '{code}' is empty after normalization"
        )));
    }
    if normalized.len() > MAX_PAGE_CODE_LEN {
        return Err(CoreError::Validation(format!(
            "Page code exceeds {MAX_PAGE_CODE_LEN} characters"
        )));
    }

    Ok(normalized)
}
