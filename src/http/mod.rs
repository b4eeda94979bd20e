//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, logs only)
//!     → gateway::forward (proxy to backend)
//!     → response.rs (relay upstream response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{assign_request_id, RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
