//! Path matching logic.
//!
//! # Responsibilities
//! - Match a normalized path exactly
//! - Match a literal prefix and bind the trailing segment as a parameter
//! - Never bind reserved trailing segments
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - The trailing segment is the text after the last `/`, bound verbatim
//! - No regex, no wildcards beyond the single trailing parameter

use std::collections::BTreeSet;
use std::fmt;

/// A trailing path segment bound by a [`PathMatcher::TrailingParam`] route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    pub name: String,
    pub value: String,
}

/// How a matcher accepted a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acceptance {
    Exact,
    Bound(PathParam),
}

impl Acceptance {
    pub fn into_param(self) -> Option<PathParam> {
        match self {
            Acceptance::Exact => None,
            Acceptance::Bound(param) => Some(param),
        }
    }
}

/// Path condition of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher {
    /// Accepts one literal path.
    Exact(String),

    /// Accepts any path under `prefix` whose last segment is non-empty and
    /// not reserved, binding that segment to `param`.
    TrailingParam {
        prefix: String,
        reserved: BTreeSet<String>,
        param: String,
    },
}

impl PathMatcher {
    pub fn exact(path: impl Into<String>) -> Self {
        PathMatcher::Exact(path.into())
    }

    pub fn trailing_param<I, S>(prefix: impl Into<String>, param: impl Into<String>, reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PathMatcher::TrailingParam {
            prefix: prefix.into(),
            reserved: reserved.into_iter().map(Into::into).collect(),
            param: param.into(),
        }
    }

    /// Evaluate a normalized path against this matcher.
    pub fn accept(&self, path: &str) -> Option<Acceptance> {
        match self {
            PathMatcher::Exact(expected) => (path == expected).then_some(Acceptance::Exact),
            PathMatcher::TrailingParam {
                prefix,
                reserved,
                param,
            } => {
                if !path.starts_with(prefix.as_str()) {
                    return None;
                }
                let segment = last_segment(path);
                if segment.is_empty() || reserved.contains(segment) {
                    return None;
                }
                Some(Acceptance::Bound(PathParam {
                    name: param.clone(),
                    value: segment.to_string(),
                }))
            }
        }
    }
}

impl fmt::Display for PathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathMatcher::Exact(path) => f.write_str(path),
            PathMatcher::TrailingParam { prefix, param, .. } => write!(f, "{prefix}:{param}"),
        }
    }
}

/// Text after the last `/` of a path.
pub fn last_segment(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, segment)| segment)
}
