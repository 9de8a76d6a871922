//! Router façade: classifies patterns, owns the exact-match table and the
//! double-array trie, and exposes `build` / `lookup`.

use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, info};

use crate::error::BuildError;
use crate::path::{self, is_meta_char, WILDCARD_CHARACTER};
use crate::trie::{BuildRecord, DoubleArray};

/// Maximum number of path parameters before the parameter vector spills to
/// the heap. Most route sets have well under 8 captures per pattern.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the lookup hot path.
///
/// Names are `Arc<str>` because they come from the static route table built
/// once at startup; values are per-request data sliced out of the looked-up
/// path.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A route pattern paired with the value returned when it matches.
///
/// The key uses `/` as the segment separator; a segment starting with `:`
/// captures exactly one segment and a final segment starting with `*`
/// captures the remainder of the path, separators included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<T> {
    pub key: String,
    pub value: T,
}

impl<T> Record<T> {
    pub fn new(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl<T> From<(String, T)> for Record<T> {
    fn from((key, value): (String, T)) -> Self {
        Self { key, value }
    }
}

impl<T> From<(&str, T)> for Record<T> {
    fn from((key, value): (&str, T)) -> Self {
        Self::new(key, value)
    }
}

/// Result of successfully matching a path against the route table.
#[derive(Debug)]
pub struct RouteMatch<'r, T> {
    /// The value registered for the matched pattern.
    pub value: &'r T,
    /// Captured parameters in pattern-declaration order, e.g. matching
    /// `/path/:id/:name` against `/path/1/alice` yields
    /// `[("id", "1"), ("name", "alice")]`, never the reverse.
    pub params: ParamVec,
}

impl<T> RouteMatch<'_, T> {
    /// Get a captured parameter by name.
    ///
    /// Last write wins: should a pattern somehow carry the same name twice it
    /// would be rejected at build time, so every name here is unique.
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert the captured parameters to a `HashMap`.
    /// Note: this allocates - use `get_param()` in hot paths instead.
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// URL router backed by an exact-match table for literal patterns and a
/// double-array trie for parameterized ones.
///
/// Built once via [`Router::build`] and immutable afterwards; [`Router::lookup`]
/// never writes shared state, so a router can be shared across threads freely.
pub struct Router<T> {
    static_routes: HashMap<String, T>,
    dynamic: DoubleArray<T>,
}

impl<T> Router<T> {
    /// Compile `records` into a router.
    ///
    /// Literal-only keys go to the exact-match table (duplicates: the last
    /// registration wins, also for parameterized keys); keys containing a
    /// capture go to the trie. At most one wildcard pattern is retained per
    /// literal prefix: registering both `/s/*a` and `/s/*b` keeps only the
    /// lexicographically first. Fails on malformed patterns, see
    /// [`BuildError`]; a failed build consumes the records and yields no
    /// router.
    pub fn build<R>(records: impl IntoIterator<Item = R>) -> Result<Self, BuildError>
    where
        R: Into<Record<T>>,
    {
        let mut static_routes = HashMap::new();
        let mut dynamic_records: Vec<BuildRecord<T>> = Vec::new();
        for record in records {
            let Record { key, value } = record.into();
            validate_key(&key)?;
            if key.bytes().any(is_meta_char) {
                dynamic_records.push(BuildRecord::new(&key, value));
            } else {
                static_routes.insert(key, value);
            }
        }

        let mut dynamic = DoubleArray::new();
        dynamic.build(&mut dynamic_records)?;

        info!(
            static_routes = static_routes.len(),
            dynamic_routes = dynamic.leaf_count(),
            "routing table built"
        );
        Ok(Self {
            static_routes,
            dynamic,
        })
    }

    /// Match `path` against the route table.
    ///
    /// The exact-match table is probed first, so a literal pattern always
    /// beats a parameterized pattern spelling the same path. A miss is a
    /// normal outcome, not an error.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<RouteMatch<'_, T>> {
        if let Some(value) = self.static_routes.get(path) {
            return Some(RouteMatch {
                value,
                params: ParamVec::new(),
            });
        }
        let Some((leaf, values)) = self.dynamic.lookup(path) else {
            debug!(path = %path, "no route matched");
            return None;
        };
        debug_assert_eq!(
            leaf.param_names.len(),
            values.len(),
            "capture count diverged from declared parameter names"
        );
        let params = leaf
            .param_names
            .iter()
            .zip(&values)
            .map(|(name, value)| (Arc::clone(name), (*value).to_owned()))
            .collect();
        Some(RouteMatch {
            value: &leaf.value,
            params,
        })
    }

    /// Number of registered patterns, literal and parameterized combined.
    #[must_use]
    pub fn len(&self) -> usize {
        self.static_routes.len() + self.dynamic.leaf_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rejects the pattern shapes whose behavior the trie cannot represent:
/// a meta character inside a segment, an unnamed capture, and a wildcard
/// that is not the final segment.
fn validate_key(key: &str) -> Result<(), BuildError> {
    let mut start = 0;
    while start <= key.len() {
        let end = path::next_separator(key, start);
        let segment = &key[start..end];
        let bytes = segment.as_bytes();
        match bytes.first() {
            Some(&c) if is_meta_char(c) => {
                if bytes.len() == 1 {
                    return Err(BuildError::EmptyParamName {
                        key: key.to_owned(),
                    });
                }
                if bytes[1..].iter().copied().any(is_meta_char) {
                    return Err(BuildError::StrayMetaCharacter {
                        key: key.to_owned(),
                        segment: segment.to_owned(),
                    });
                }
                if c == WILDCARD_CHARACTER && end != key.len() {
                    return Err(BuildError::WildcardNotLast {
                        key: key.to_owned(),
                    });
                }
            }
            _ => {
                if bytes.iter().copied().any(is_meta_char) {
                    return Err(BuildError::StrayMetaCharacter {
                        key: key.to_owned(),
                        segment: segment.to_owned(),
                    });
                }
            }
        }
        start = end + 1;
    }
    Ok(())
}
