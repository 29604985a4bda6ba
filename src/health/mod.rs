//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /test-backend
//!     → probe.rs (GET backend health path, bounded by the upstream deadline)
//!     → ProbeReport { status, body } | ForwardError
//!     → http::handlers relays it to the caller
//! ```
//!
//! # Design Decisions
//! - Probes run on demand only; there is a single backend and no pool to evict from
//! - The gateway's own liveness (`/health`) never depends on the backend

pub mod probe;

pub use probe::{BackendProbe, ProbeReport};
