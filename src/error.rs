use std::fmt;

/// Route table construction error
///
/// Returned by [`Router::build`](crate::Router::build) when a registered
/// pattern is malformed. A failed build yields no router, so a half-built
/// table can never be queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The same capture name appears more than once along one pattern's path
    ///
    /// `/users/:id/posts/:id` is rejected: the second capture would silently
    /// shadow the first.
    DuplicateParamName {
        /// The repeated capture name, without its meta character
        name: String,
        /// The offending pattern key
        key: String,
    },
    /// A `:` or `*` segment declares no capture name
    ///
    /// A parameter must be addressable by name; `/users/:` and `/files/*`
    /// are rejected.
    EmptyParamName {
        /// The offending pattern key
        key: String,
    },
    /// A wildcard segment is not the final segment of its pattern
    ///
    /// A wildcard consumes the remainder of the path, so nothing can follow
    /// it.
    WildcardNotLast {
        /// The offending pattern key
        key: String,
    },
    /// A `:` or `*` appears inside a segment rather than at its start
    ///
    /// Segments like `x:y` are ambiguous with the capture grammar and are
    /// rejected rather than matched byte-for-byte.
    StrayMetaCharacter {
        /// The offending pattern key
        key: String,
        /// The segment containing the misplaced meta character
        segment: String,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::DuplicateParamName { name, key } => {
                write!(
                    f,
                    "path parameter `{name}' is duplicated in the key `{key}'"
                )
            }
            BuildError::EmptyParamName { key } => {
                write!(f, "parameter segment without a name in the key `{key}'")
            }
            BuildError::WildcardNotLast { key } => {
                write!(
                    f,
                    "wildcard must be the final segment in the key `{key}'"
                )
            }
            BuildError::StrayMetaCharacter { key, segment } => {
                write!(
                    f,
                    "segment `{segment}' in the key `{key}' contains a reserved \
                    meta character (`:' and `*' are only allowed at the start \
                    of a segment)"
                )
            }
        }
    }
}

impl std::error::Error for BuildError {}
