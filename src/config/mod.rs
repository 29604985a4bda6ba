//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//! CLI flags / environment variables
//!     → overrides.rs (layered on top of the file)
//!     → validation.rs (semantic checks, all errors at once)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults except the backend url
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod overrides;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use overrides::ConfigOverrides;
pub use schema::{
    BackendConfig, CorsConfig, Environment, GatewayConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, PrefixRewrite, RouteConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
