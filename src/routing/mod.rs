//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Table Construction (at startup):
//!     (method, matcher, handler)[] in declared order
//!     → router.rs (validate: methods, prefixes, duplicates, reserved segments)
//!     → Freeze as immutable RouteTable
//!
//! Per Request:
//!     (method, normalized path)
//!     → router.rs (scan routes in declared order)
//!     → matcher.rs (exact equality or trailing parameter capture)
//!     → Return: first RouteMatch or None
//! ```
//!
//! # Design Decisions
//! - Tables are validated once, immutable at runtime
//! - No regex: exact comparison and one prefix check per route
//! - Deterministic: first match in declared order wins
//! - A trailing parameter never binds a reserved segment

pub mod matcher;
pub mod router;

pub use matcher::{Acceptance, PathMatcher, PathParam};
pub use router::{Route, RouteMatch, RouteProblem, RouteTable, RouteTableBuilder, RouteTableError};
