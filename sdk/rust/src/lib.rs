//! Typed client for the notes REST API.
//!
//! Credentials live in an explicit [`Session`] backed by a [`TokenStore`];
//! nothing is kept in globals.

pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::{NotesClient, DEFAULT_BACKEND_URL};
pub use error::ClientError;
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
pub use types::{AuthResponse, Note, NoteList, User};
