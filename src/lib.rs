//! Same-origin API gateway for the notes application.
//!
//! The browser (or `notes-cli`) talks to `/api/...` on the gateway; the
//! gateway forwards every call to the notes backend and relays the answer
//! verbatim.

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
