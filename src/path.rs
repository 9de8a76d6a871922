//! Path scanning helpers shared by trie construction and matching.
//!
//! Patterns and request paths use `/` as the segment separator. Two bytes are
//! reserved as meta characters in patterns: [`PARAM_CHARACTER`] (`:`) opens a
//! single-segment capture and [`WILDCARD_CHARACTER`] (`*`) opens a trailing
//! capture that consumes the rest of the path.

/// Meta character that opens a single-segment path parameter (`:name`).
pub const PARAM_CHARACTER: u8 = b':';

/// Meta character that opens a trailing wildcard parameter (`*name`).
pub const WILDCARD_CHARACTER: u8 = b'*';

/// Segment separator in patterns and request paths.
pub const SEPARATOR_CHARACTER: u8 = b'/';

/// Returns the index of the next segment separator at or after `start`, or
/// `path.len()` if the remainder of the path is a single segment.
///
/// Because `/` is ASCII, the returned index is always a `char` boundary and is
/// safe to slice a `&str` at.
#[inline]
#[must_use]
pub fn next_separator(path: &str, start: usize) -> usize {
    let bytes = path.as_bytes();
    let mut i = start;
    while i < bytes.len() && bytes[i] != SEPARATOR_CHARACTER {
        i += 1;
    }
    i
}

/// Returns whether `c` is one of the reserved pattern meta characters.
#[inline]
#[must_use]
pub fn is_meta_char(c: u8) -> bool {
    c == PARAM_CHARACTER || c == WILDCARD_CHARACTER
}

/// Returns the capture names declared in `pattern`, meta character included,
/// in declaration order.
///
/// ```
/// assert_eq!(routrie::path::param_names("/posts/:year/*rest"), vec![":year", "*rest"]);
/// ```
#[must_use]
pub fn param_names(pattern: &str) -> Vec<&str> {
    let bytes = pattern.as_bytes();
    let mut names = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if is_meta_char(bytes[i]) {
            let next = next_separator(pattern, i + 1);
            names.push(&pattern[i..next]);
            i = next;
        } else {
            i += 1;
        }
    }
    names
}
