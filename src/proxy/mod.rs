//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request + RouteRule
//!     → forwarder.rs (rewrite path, amend headers, pick body)
//!     → client.rs (pooled http/https client)
//!     → resilience::timeouts (deadline until response headers)
//!     → RelayResult: backend Response | ForwardError
//!     → http::response (502/500 JSON on failure)
//! ```
//!
//! # Design Decisions
//! - Bodies stream in both directions; nothing is buffered
//! - One attempt per request, no retries
//! - Pre-send and post-receive steps run inline in a fixed order

pub mod client;
pub mod error;
pub mod forwarder;

pub use error::ForwardError;
pub use forwarder::{build_outbound, ForwardState, Forwarder, RelayResult};
