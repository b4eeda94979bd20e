//! In-memory notes backend for trying the gateway locally.
//!
//! ```text
//! cargo run --example mock_backend            # listens on 127.0.0.1:8000
//! BACKEND_URL=http://127.0.0.1:8000 cargo run # gateway on 0.0.0.0:3000
//! cargo run --bin notes-cli -- register ann ann@example.com password1
//! ```
//!
//! Everything is lost on exit.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::{FromRequest, Multipart, Path, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Clone)]
struct Account {
    id: u64,
    username: String,
    email: String,
    password: String,
}

#[derive(Clone)]
struct StoredNote {
    id: u64,
    owner: u64,
    text: String,
    date_created: String,
    date_edited: String,
    edit_seq: u64,
}

#[derive(Default)]
struct Store {
    accounts: Vec<Account>,
    tokens: HashMap<String, u64>,
    notes: Vec<StoredNote>,
    next_id: u64,
    edit_seq: u64,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn account(&self, id: u64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    fn issue_token(&mut self, user_id: u64) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), user_id);
        token
    }

    fn note_json(&self, note: &StoredNote) -> Value {
        json!({
            "id": note.id,
            "text": note.text,
            "date_created": note.date_created,
            "date_edited": note.date_edited,
            "user": self.account(note.owner).map(user_json).unwrap_or(Value::Null),
        })
    }
}

type Shared = Arc<Mutex<Store>>;

fn user_json(account: &Account) -> Value {
    json!({ "id": account.id, "username": account.username, "email": account.email })
}

fn now() -> String {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    format!("{}.{:03}", elapsed.as_secs(), elapsed.subsec_millis())
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Authentication credentials were not provided." })),
    )
        .into_response()
}

fn authenticate(store: &Store, headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Token ")?;
    store.tokens.get(token).copied()
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    #[serde(default)]
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct TextBody {
    text: String,
}

/// Note text from either a multipart form or a JSON body.
async fn read_text(request: Request<Body>) -> Option<String> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    if is_multipart {
        let mut multipart = Multipart::from_request(request, &()).await.ok()?;
        while let Ok(Some(field)) = multipart.next_field().await {
            if field.name() == Some("text") {
                return field.text().await.ok();
            }
        }
        None
    } else {
        Json::<TextBody>::from_request(request, &())
            .await
            .ok()
            .map(|Json(body)| body.text)
    }
}

async fn register(State(store): State<Shared>, Json(creds): Json<Credentials>) -> Response {
    if creds.password.len() < 8 {
        return error(StatusCode::BAD_REQUEST, "Password must be at least 8 characters");
    }

    let mut store = store.lock().unwrap();
    if store.accounts.iter().any(|a| a.username == creds.username) {
        return error(StatusCode::BAD_REQUEST, "Username already taken");
    }

    let id = store.next_id();
    let account = Account {
        id,
        username: creds.username,
        email: creds.email,
        password: creds.password,
    };
    let user = user_json(&account);
    store.accounts.push(account);
    let token = store.issue_token(id);

    (StatusCode::CREATED, Json(json!({ "token": token, "user": user }))).into_response()
}

async fn login(State(store): State<Shared>, Json(creds): Json<Credentials>) -> Response {
    let mut store = store.lock().unwrap();
    let account = store
        .accounts
        .iter()
        .find(|a| a.username == creds.username && a.password == creds.password)
        .cloned();

    match account {
        Some(account) => {
            let token = store.issue_token(account.id);
            Json(json!({ "token": token, "user": user_json(&account) })).into_response()
        }
        None => error(StatusCode::BAD_REQUEST, "Invalid credentials"),
    }
}

async fn me(State(store): State<Shared>, headers: HeaderMap) -> Response {
    let store = store.lock().unwrap();
    match authenticate(&store, &headers).and_then(|id| store.account(id)) {
        Some(account) => Json(user_json(account)).into_response(),
        None => unauthenticated(),
    }
}

async fn list_notes(State(store): State<Shared>, headers: HeaderMap) -> Response {
    let store = store.lock().unwrap();
    let Some(user_id) = authenticate(&store, &headers) else {
        return unauthenticated();
    };

    let mut notes: Vec<&StoredNote> = store.notes.iter().filter(|n| n.owner == user_id).collect();
    notes.sort_by(|a, b| b.edit_seq.cmp(&a.edit_seq));
    let results: Vec<Value> = notes.into_iter().map(|n| store.note_json(n)).collect();

    Json(json!({
        "count": results.len(),
        "next": null,
        "previous": null,
        "results": results,
    }))
    .into_response()
}

async fn create_note(State(store): State<Shared>, request: Request<Body>) -> Response {
    let user_id = {
        let store = store.lock().unwrap();
        match authenticate(&store, request.headers()) {
            Some(id) => id,
            None => return unauthenticated(),
        }
    };
    let Some(text) = read_text(request).await else {
        return error(StatusCode::BAD_REQUEST, "Field `text` is required");
    };

    let mut store = store.lock().unwrap();
    let id = store.next_id();
    store.edit_seq += 1;
    let stamp = now();
    let note = StoredNote {
        id,
        owner: user_id,
        text,
        date_created: stamp.clone(),
        date_edited: stamp,
        edit_seq: store.edit_seq,
    };
    let body = store.note_json(&note);
    store.notes.push(note);

    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_note(
    State(store): State<Shared>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let store = store.lock().unwrap();
    let Some(user_id) = authenticate(&store, &headers) else {
        return unauthenticated();
    };
    match store.notes.iter().find(|n| n.id == id && n.owner == user_id) {
        Some(note) => Json(store.note_json(note)).into_response(),
        None => error(StatusCode::NOT_FOUND, "Not found"),
    }
}

async fn update_note(
    State(store): State<Shared>,
    Path(id): Path<u64>,
    request: Request<Body>,
) -> Response {
    let user_id = {
        let store = store.lock().unwrap();
        match authenticate(&store, request.headers()) {
            Some(id) => id,
            None => return unauthenticated(),
        }
    };
    let Some(text) = read_text(request).await else {
        return error(StatusCode::BAD_REQUEST, "Field `text` is required");
    };

    let mut store = store.lock().unwrap();
    store.edit_seq += 1;
    let seq = store.edit_seq;
    let Some(note) = store.notes.iter_mut().find(|n| n.id == id && n.owner == user_id) else {
        return error(StatusCode::NOT_FOUND, "Not found");
    };
    note.text = text;
    note.date_edited = now();
    note.edit_seq = seq;
    let note = note.clone();

    Json(store.note_json(&note)).into_response()
}

async fn delete_note(
    State(store): State<Shared>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let mut store = store.lock().unwrap();
    let Some(user_id) = authenticate(&store, &headers) else {
        return unauthenticated();
    };
    let before = store.notes.len();
    store.notes.retain(|n| !(n.id == id && n.owner == user_id));
    if store.notes.len() == before {
        return error(StatusCode::NOT_FOUND, "Not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Router serving the notes API under `/api`.
pub fn app() -> Router {
    Router::new()
        .route("/api/users/register/", post(register))
        .route("/api/users/login/", post(login))
        .route("/api/users/me/", get(me))
        .route("/api/notes/", get(list_notes).post(create_note))
        .route(
            "/api/notes/{id}/",
            get(get_note).patch(update_note).put(update_note).delete(delete_note),
        )
        .with_state(Shared::default())
}

#[tokio::main]
async fn main() {
    let addr = SocketAddr::from(([127, 0, 0, 1], 8000));
    println!("Notes backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app()).await.unwrap();
}
