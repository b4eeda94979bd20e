use reqwest::header::AUTHORIZATION;
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::session::{MemoryTokenStore, Session, TokenStore};
use crate::types::{AuthResponse, LoginRequest, Note, NoteList, RegisterRequest, User};

/// Backend origin used by server-side callers when `BACKEND_URL` is unset.
pub const DEFAULT_BACKEND_URL: &str = "http://notes-backend:8000";

/// Client for the notes API.
///
/// `base_url` is an origin (gateway or backend); every call goes to
/// `{base_url}/api/...` with a trailing slash.
pub struct NotesClient<S: TokenStore = MemoryTokenStore> {
    http: Client,
    base_url: String,
    session: Session<S>,
}

impl NotesClient<MemoryTokenStore> {
    /// Anonymous client with an in-memory session.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session: Session::anonymous(MemoryTokenStore::new()),
        }
    }

    /// Client talking straight to the backend named by `BACKEND_URL`.
    pub fn from_env() -> Self {
        let base_url = std::env::var("BACKEND_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        Self::new(&base_url)
    }
}

impl<S: TokenStore> NotesClient<S> {
    /// Client resuming whatever session `store` holds.
    pub fn with_store(base_url: &str, store: S) -> Result<Self, ClientError> {
        Ok(Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session: Session::load(store)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Create an account and start a session with the returned token.
    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = RegisterRequest { username, email, password };
        let auth: AuthResponse = parse(self.request(Method::POST, "users/register/").json(&body).send().await?).await?;
        self.session.set_token(auth.token.as_str())?;
        Ok(auth)
    }

    /// Log in and start a session with the returned token.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest { username, password };
        let auth: AuthResponse = parse(self.request(Method::POST, "users/login/").json(&body).send().await?).await?;
        self.session.set_token(auth.token.as_str())?;
        tracing::debug!(username = %auth.user.username, "Logged in");
        Ok(auth)
    }

    /// Forget the current token.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.session.clear()?;
        Ok(())
    }

    pub async fn me(&self) -> Result<User, ClientError> {
        parse(self.request(Method::GET, "users/me/").send().await?).await
    }

    /// All notes of the current user, newest edit first.
    pub async fn list_notes(&self) -> Result<Vec<Note>, ClientError> {
        let list: NoteList = parse(self.request(Method::GET, "notes/").send().await?).await?;
        Ok(list.into_notes())
    }

    pub async fn get_note(&self, id: u64) -> Result<Note, ClientError> {
        parse(self.request(Method::GET, &format!("notes/{}/", id)).send().await?).await
    }

    pub async fn create_note(&self, text: &str) -> Result<Note, ClientError> {
        let form = Form::new().text("text", text.to_string());
        parse(self.request(Method::POST, "notes/").multipart(form).send().await?).await
    }

    pub async fn update_note(&self, id: u64, text: &str) -> Result<Note, ClientError> {
        let form = Form::new().text("text", text.to_string());
        parse(self.request(Method::PATCH, &format!("notes/{}/", id)).multipart(form).send().await?).await
    }

    pub async fn delete_note(&self, id: u64) -> Result<(), ClientError> {
        check(self.request(Method::DELETE, &format!("notes/{}/", id)).send().await?).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/api/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.http.request(method, url);
        match self.session.authorization() {
            Some(auth) => builder.header(AUTHORIZATION, auth),
            None => builder,
        }
    }
}

async fn check(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(ClientError::api(status, body))
}

async fn parse<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let res = check(res).await?;
    Ok(res.json::<T>().await?)
}
