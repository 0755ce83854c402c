//! Per-function route tables.
//!
//! # Responsibilities
//! - Store the ordered routes of one function
//! - Look up the first route accepting a (method, path) pair
//! - Reject ambiguous tables at construction time
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - O(n) scan in declared order; first acceptance wins
//! - Explicit no-match (`None`) rather than a silent default
//! - Every exact route a parameter route could capture must be reserved
//!   by that parameter route, so declaration order never decides between
//!   them

use std::fmt;

use axum::http::Method;
use thiserror::Error;

use crate::dispatch::handler::HandlerRef;
use crate::routing::matcher::{PathMatcher, PathParam};

/// Methods a route may be declared for. `OPTIONS` never reaches routing.
pub const ROUTABLE_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// One logical endpoint of a function.
#[derive(Clone)]
pub struct Route {
    method: Method,
    matcher: PathMatcher,
    handler: HandlerRef,
}

impl Route {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn matcher(&self) -> &PathMatcher {
        &self.matcher
    }

    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.matcher)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.matcher)
    }
}

/// A route accepted for a request, with the bound parameter if any.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub param: Option<PathParam>,
}

/// Defects that make a route table unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteProblem {
    #[error("{method} cannot be routed")]
    UnsupportedMethod { method: Method },

    #[error("exact path {path:?} must start with '/'")]
    InvalidPath { path: String },

    #[error("parameter prefix {prefix:?} must start and end with '/'")]
    InvalidPrefix { prefix: String },

    #[error("parameter name for {prefix:?} must not be empty")]
    EmptyParamName { prefix: String },

    #[error("duplicate route {method} {path}")]
    DuplicateRoute { method: Method, path: String },

    #[error("{method} {first} overlaps {second}")]
    OverlappingParams {
        method: Method,
        first: String,
        second: String,
    },

    #[error("{method} {exact} is captured by {param_route}; reserve {segment:?}")]
    UnreservedSegment {
        method: Method,
        exact: String,
        param_route: String,
        segment: String,
    },
}

/// Error returned by [`RouteTableBuilder::build`], listing every problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("route table {function:?} is invalid: {}", join_problems(.problems))]
pub struct RouteTableError {
    pub function: String,
    pub problems: Vec<RouteProblem>,
}

fn join_problems(problems: &[RouteProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Immutable, ordered routes of one function.
#[derive(Debug, Clone)]
pub struct RouteTable {
    function: String,
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn builder(function: impl Into<String>) -> RouteTableBuilder {
        RouteTableBuilder {
            function: function.into(),
            routes: Vec::new(),
        }
    }

    /// A table with no routes; every request to it is a 404.
    pub fn empty(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            routes: Vec::new(),
        }
    }

    /// Name of the function this table belongs to.
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the first route accepting `method` and the normalized `path`.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| {
                route.matcher.accept(path).map(|acceptance| RouteMatch {
                    route,
                    param: acceptance.into_param(),
                })
            })
    }
}

/// Collects route declarations and validates them on [`build`](Self::build).
pub struct RouteTableBuilder {
    function: String,
    routes: Vec<Route>,
}

impl RouteTableBuilder {
    /// Append a route with an arbitrary matcher.
    pub fn route(mut self, method: Method, matcher: PathMatcher, handler: HandlerRef) -> Self {
        self.routes.push(Route {
            method,
            matcher,
            handler,
        });
        self
    }

    /// Append a route accepting exactly `path`.
    pub fn exact(self, method: Method, path: &str, handler: HandlerRef) -> Self {
        self.route(method, PathMatcher::exact(path), handler)
    }

    /// Append a route binding the last segment under `prefix` to `param`.
    pub fn param<I, S>(
        self,
        method: Method,
        prefix: &str,
        param: &str,
        reserved: I,
        handler: HandlerRef,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route(
            method,
            PathMatcher::trailing_param(prefix, param, reserved),
            handler,
        )
    }

    /// Validate the declarations and freeze them.
    pub fn build(self) -> Result<RouteTable, RouteTableError> {
        let problems = validate_routes(&self.routes);
        if !problems.is_empty() {
            return Err(RouteTableError {
                function: self.function,
                problems,
            });
        }
        Ok(RouteTable {
            function: self.function,
            routes: self.routes,
        })
    }
}

fn validate_routes(routes: &[Route]) -> Vec<RouteProblem> {
    let mut problems = Vec::new();

    for route in routes {
        if !ROUTABLE_METHODS.contains(&route.method) {
            problems.push(RouteProblem::UnsupportedMethod {
                method: route.method.clone(),
            });
        }
        match &route.matcher {
            PathMatcher::Exact(path) if !path.starts_with('/') => {
                problems.push(RouteProblem::InvalidPath { path: path.clone() });
            }
            PathMatcher::TrailingParam { prefix, param, .. } => {
                if !prefix.starts_with('/') || !prefix.ends_with('/') {
                    problems.push(RouteProblem::InvalidPrefix {
                        prefix: prefix.clone(),
                    });
                }
                if param.is_empty() {
                    problems.push(RouteProblem::EmptyParamName {
                        prefix: prefix.clone(),
                    });
                }
            }
            PathMatcher::Exact(_) => {}
        }
    }

    for (i, first) in routes.iter().enumerate() {
        for second in &routes[i + 1..] {
            if first.method != second.method {
                continue;
            }
            match (&first.matcher, &second.matcher) {
                (PathMatcher::Exact(a), PathMatcher::Exact(b)) if a == b => {
                    problems.push(RouteProblem::DuplicateRoute {
                        method: first.method.clone(),
                        path: a.clone(),
                    });
                }
                (
                    PathMatcher::TrailingParam { prefix: a, .. },
                    PathMatcher::TrailingParam { prefix: b, .. },
                ) if a.starts_with(b.as_str()) || b.starts_with(a.as_str()) => {
                    problems.push(RouteProblem::OverlappingParams {
                        method: first.method.clone(),
                        first: first.matcher.to_string(),
                        second: second.matcher.to_string(),
                    });
                }
                (PathMatcher::Exact(exact), param @ PathMatcher::TrailingParam { .. })
                | (param @ PathMatcher::TrailingParam { .. }, PathMatcher::Exact(exact)) => {
                    if let Some(acceptance) = param.accept(exact) {
                        let segment = acceptance
                            .into_param()
                            .map(|p| p.value)
                            .unwrap_or_default();
                        problems.push(RouteProblem::UnreservedSegment {
                            method: first.method.clone(),
                            exact: exact.clone(),
                            param_route: param.to_string(),
                            segment,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    problems
}
