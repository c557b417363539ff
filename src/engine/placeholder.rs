// SPDX-License-Identifier: MIT

//! Placeholder syntax for deferred lookups into session values
//!
//! A placeholder is any string holding both `{{` and `}}`. Detection is plain
//! substring containment, so `"a{{b}}c"` counts while `"a{{b"` does not, and
//! strings with several pairs are not split apart.

pub const OPEN_MARKER: &str = "{{";
pub const CLOSE_MARKER: &str = "}}";

/// Whether `value` is a placeholder reference
pub fn is_placeholder(value: &str) -> bool {
    value.contains(OPEN_MARKER) && value.contains(CLOSE_MARKER)
}

/// Strip the markers from both ends and trim whitespace, leaving the lookup path
pub fn clean_placeholder(value: &str) -> &str {
    value.trim_start_matches('{').trim_end_matches('}').trim()
}
