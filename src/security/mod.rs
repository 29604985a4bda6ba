//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (preflight short-circuit, origin policy)
//!     → [routing + forwarder]
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-*)
//!     → Backend
//! ```
//!
//! # Design Decisions
//! - CORS is enforced, not advisory: production only reflects listed origins
//! - Forwarding headers set by the gateway are never taken from the client

pub mod cors;
pub mod headers;
