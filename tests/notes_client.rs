//! The notes SDK driven through the gateway against the demo backend.

use notes_sdk::{ClientError, FileTokenStore, NotesClient, TokenStore};
use reqwest::StatusCode;

mod common;

async fn gateway_with_notes_backend() -> (String, notes_gateway::Shutdown) {
    let backend = common::start_notes_backend().await;
    let (gateway, shutdown) = common::start_gateway(&format!("http://{}", backend)).await;
    (format!("http://{}", gateway), shutdown)
}

#[tokio::test]
async fn full_note_lifecycle() {
    let (base_url, shutdown) = gateway_with_notes_backend().await;
    let mut client = NotesClient::new(&base_url);

    let auth = client.register("ann", "ann@example.com", "password1").await.unwrap();
    assert_eq!(auth.user.username, "ann");
    assert!(client.session().is_authenticated());

    let me = client.me().await.unwrap();
    assert_eq!(me.username, "ann");
    assert_eq!(me.email, "ann@example.com");

    let first = client.create_note("first note").await.unwrap();
    let second = client.create_note("second note").await.unwrap();
    assert_eq!(first.text, "first note");
    assert_eq!(first.user.username, "ann");

    let notes = client.list_notes().await.unwrap();
    let ids: Vec<u64> = notes.iter().map(|n| n.id).collect();
    assert_eq!(ids, [second.id, first.id]);

    let edited = client.update_note(first.id, "first note, edited").await.unwrap();
    assert_eq!(edited.text, "first note, edited");

    let notes = client.list_notes().await.unwrap();
    assert_eq!(notes[0].id, first.id);

    let fetched = client.get_note(first.id).await.unwrap();
    assert_eq!(fetched, edited);

    client.delete_note(second.id).await.unwrap();
    let err = client.get_note(second.id).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(client.list_notes().await.unwrap().len(), 1);

    client.logout().unwrap();
    assert!(!client.session().is_authenticated());

    match client.list_notes().await {
        Err(ClientError::Api { status, message, .. }) => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "Authentication credentials were not provided.");
        }
        other => panic!("expected 401, got {:?}", other),
    }

    shutdown.trigger();
}

#[tokio::test]
async fn backend_errors_reach_the_client() {
    let (base_url, shutdown) = gateway_with_notes_backend().await;
    let mut client = NotesClient::new(&base_url);

    let err = client.login("nobody", "password1").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert!(matches!(err, ClientError::Api { ref message, .. } if message == "Invalid credentials"));
    assert!(!client.session().is_authenticated());

    let err = client.register("bob", "bob@example.com", "short").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { ref message, .. } if message == "Password must be at least 8 characters"));

    shutdown.trigger();
}

#[tokio::test]
async fn file_session_survives_a_new_client() {
    let (base_url, shutdown) = gateway_with_notes_backend().await;
    let token_path = std::env::temp_dir()
        .join(format!("notes-gateway-{}", uuid::Uuid::new_v4()))
        .join("token");

    let mut client = NotesClient::with_store(&base_url, FileTokenStore::new(&token_path)).unwrap();
    client.register("cat", "cat@example.com", "password1").await.unwrap();
    client.create_note("kept across runs").await.unwrap();

    let resumed = NotesClient::with_store(&base_url, FileTokenStore::new(&token_path)).unwrap();
    assert!(resumed.session().is_authenticated());
    assert_eq!(resumed.me().await.unwrap().username, "cat");
    assert_eq!(resumed.list_notes().await.unwrap()[0].text, "kept across runs");

    let mut resumed = resumed;
    resumed.logout().unwrap();
    assert_eq!(FileTokenStore::new(&token_path).get().unwrap(), None);

    let _ = std::fs::remove_dir(token_path.parent().unwrap());
    shutdown.trigger();
}

#[tokio::test]
async fn unreachable_backend_surfaces_as_api_error() {
    let (gateway, shutdown) = common::start_gateway(&common::closed_backend_url()).await;
    let mut client = NotesClient::new(&format!("http://{}", gateway));

    match client.login("ann", "password1").await {
        Err(ClientError::Api { status, message, .. }) => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "Failed to connect to backend");
        }
        other => panic!("expected 500, got {:?}", other),
    }

    shutdown.trigger();
}
