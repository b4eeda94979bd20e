//! Session and persisted credentials.
//!
//! A [`Session`] holds the current API token and mirrors every change into
//! its [`TokenStore`], so a later process can pick the login up again.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persistence for a single API token.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> io::Result<Option<String>>;
    fn set(&self, token: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Process-local token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> io::Result<Option<String>> {
        Ok(self.slot().clone())
    }

    fn set(&self, token: &str) -> io::Result<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// Token kept in a single file. The file exists only while logged in.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Current credentials, passed explicitly to API call sites.
#[derive(Debug)]
pub struct Session<S: TokenStore> {
    store: S,
    token: Option<String>,
}

impl<S: TokenStore> Session<S> {
    /// Start a session from whatever token the store holds.
    pub fn load(store: S) -> io::Result<Self> {
        let token = store.get()?;
        Ok(Self { store, token })
    }

    /// Start a logged-out session without reading the store.
    pub fn anonymous(store: S) -> Self {
        Self { store, token: None }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Remember a new token, in memory and in the store.
    pub fn set_token(&mut self, token: impl Into<String>) -> io::Result<()> {
        let token = token.into();
        self.store.set(&token)?;
        self.token = Some(token);
        Ok(())
    }

    /// Forget the token, in memory and in the store.
    pub fn clear(&mut self) -> io::Result<()> {
        self.token = None;
        self.store.clear()
    }

    /// Value of the `Authorization` header, when logged in.
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Token {}", token))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
