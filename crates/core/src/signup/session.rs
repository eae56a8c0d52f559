//! Session-scoped one-shot flags.
//!
//! The page builder marks a freshly created page; the first signup view of
//! that page in the same session consumes the mark and shows the welcome
//! modal. The flow controller never reads this directly: callers resolve
//! the flag into a boolean before constructing the flow.

use std::collections::HashSet;

use crate::page_code::normalize_page_code;

/// Session storage key marking `code` as just created. Keyed on the
/// normalized code, like every other page lookup.
pub fn fresh_page_key(code: &str) -> String {
    format!("{}-new", normalize_page_code(code))
}

/// In-memory stand-in for a browser session's storage.
#[derive(Debug, Default, Clone)]
pub struct SessionFlags {
    keys: HashSet<String>,
}

impl SessionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the page with `code` was just created in this session.
    pub fn mark_page_created(&mut self, code: &str) {
        self.keys.insert(fresh_page_key(code));
    }

    /// Consume the fresh-page mark for `code`.
    ///
    /// Returns `true` at most once per mark.
    pub fn take_fresh_page_flag(&mut self, code: &str) -> bool {
        self.keys.remove(&fresh_page_key(code))
    }
}
