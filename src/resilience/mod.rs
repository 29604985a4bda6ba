//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (enforce deadline up to response headers)
//!     → On failure: ForwardError → 502 to the client
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - No retries and no circuit breaking: one attempt per inbound request

pub mod timeouts;
