//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound path
//!     → router.rs (route lookup)
//!     → rule.rs (prefix match, path rewrite, target URI)
//!     → Return: matched RouteRule or None
//!
//! Route Compilation (at startup):
//!     RouteConfig[] + backend url
//!     → TargetOrigin (parsed once)
//!     → Sort by prefix length
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route

pub mod router;
pub mod rule;

pub use router::RouteTable;
pub use rule::{rewrite_path, RouteRule, TargetOrigin};
