//! Single-backend HTTP API gateway library.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use proxy::Forwarder;
