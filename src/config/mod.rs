//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (GatewayConfig::default)
//!     → optional TOML file (loader.rs)
//!     → env overrides: BACKEND_URL, GATEWAY_BIND (loader.rs)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads + overrides + validates
//!     → server swaps its upstream snapshot atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults so an empty file (or none) is valid
//! - Environment wins over the file so container deployments need no file

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    GatewayConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig, ReloadConfig,
    TimeoutConfig, UpstreamConfig, DEFAULT_BACKEND_URL,
};
