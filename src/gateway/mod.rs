//! Same-origin proxy for the notes backend.
//!
//! # Data Flow
//! ```text
//! Browser / CLI ──/api/...──▶ gateway ──/api/.../──▶ backend
//!               ◀─────────── (verbatim) ◀───────────
//! ```
//!
//! # Design Decisions
//! - Stateless: the outbound request is a pure function of the inbound
//!   request and the configured backend base URL
//! - No retries, no caching; upstream 4xx/5xx are relayed untouched
//! - Content-type branching happens once, into a tagged union
//! - Bodies are fully buffered (bounded by `limits.max_body_bytes` if set)

pub mod body;
pub mod forward;
pub mod headers;
pub mod target;
pub mod upstream;

pub use body::{BodyEncoding, FormField, OutboundBody};
pub use forward::proxy_handler;
pub use headers::forward_headers;
pub use target::{upstream_path, upstream_url};
pub use upstream::Upstream;
