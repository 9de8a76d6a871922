//! # routrie
//!
//! A compact URL router that matches `/`-delimited paths against a
//! pre-compiled pattern set with literal segments, named single-segment
//! parameters (`:name`) and trailing wildcards (`*name`).
//!
//! ## Architecture
//!
//! - **[`path`]** - segment scanning and meta-character classification shared
//!   by construction and matching
//! - **[`router`]** - the façade: pattern classification, the exact-match
//!   table for literal patterns, and [`Router::build`] / [`Router::lookup`]
//! - `trie` (private) - the double-array transition table that encodes all
//!   parameterized patterns, plus the backtracking matcher
//! - **[`error`]** - build-time validation errors
//!
//! Patterns are compiled once: literal-only keys land in a plain hash table,
//! parameterized keys are sorted and threaded into a single flat BASE/CHECK
//! array (a double-array trie). Lookup walks the array one byte at a time and
//! records every cell that could start a parameter or wildcard capture; when
//! literal matching fails it retries from the deepest recorded boundary
//! outward, so literal matches beat parameters and parameters beat wildcards.
//!
//! ## Example
//!
//! ```
//! use routrie::Router;
//!
//! let router = Router::build([
//!     ("/", "root"),
//!     ("/users/:id", "user"),
//!     ("/static/*path", "asset"),
//! ])?;
//!
//! let m = router.lookup("/users/42").unwrap();
//! assert_eq!(*m.value, "user");
//! assert_eq!(m.get_param("id"), Some("42"));
//!
//! let m = router.lookup("/static/css/site.css").unwrap();
//! assert_eq!(m.get_param("path"), Some("css/site.css"));
//!
//! assert!(router.lookup("/users/42/posts").is_none());
//! # Ok::<(), routrie::BuildError>(())
//! ```
//!
//! ## Matching rules
//!
//! - A literal pattern always wins over a parameterized pattern spelling the
//!   same path (longest-literal-match policy).
//! - Captured parameters are returned in pattern-declaration order.
//! - A wildcard consumes the remainder of the path, separators included, and
//!   must be the final segment of its pattern.
//! - `lookup` never errors; a miss is `None`. All validation happens in
//!   [`Router::build`].
//!
//! A looked-up path is expected to contain no `:` or `*` bytes; such paths are
//! ambiguous with the pattern grammar and their matching behavior is
//! unspecified.
//!
//! Concurrency: a built router is immutable. `lookup` takes `&self` and keeps
//! its backtrack state on the caller's stack, so sharing a router across
//! threads needs no locking.

pub mod error;
pub mod path;
pub mod router;
mod trie;

pub use error::BuildError;
pub use router::{ParamVec, Record, RouteMatch, Router, MAX_INLINE_PARAMS};
