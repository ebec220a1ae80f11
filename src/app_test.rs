use super::*;
use crate::error::{DELETE_FAILED, LOGIN_FAILED};
use crate::net::stub::StubTransport;

fn image_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "originalUrl": format!("https://cdn.test/{id}.png"),
        "processedUrl": null,
        "originalName": format!("{id}.png"),
        "mimetype": "image/png",
        "size": 10,
        "transformations": {},
        "uploadedAt": "2024-03-01T10:00:00Z",
        "processedAt": null
    })
}

fn login_ok(token: &str) -> serde_json::Value {
    serde_json::json!({
        "status": 200,
        "message": "Welcome back",
        "data": {
            "token": token,
            "user": { "id": 1, "email": "a@b.com", "name": "Ada", "lastName": "Lovelace" }
        }
    })
}

fn credentials() -> LoginRequest {
    LoginRequest { email: "a@b.com".to_owned(), password: "secret".to_owned() }
}

fn signed_in(stub: StubTransport) -> (Gallery, Arc<StubTransport>) {
    let stub = Arc::new(stub);
    let session = SessionStore::in_memory();
    session.set_token("tok123").unwrap();
    (Gallery::new(session, stub.clone()), stub)
}

fn ids(gallery: &Gallery) -> Vec<String> {
    gallery.images().into_iter().map(|image| image.id).collect()
}

#[tokio::test]
async fn login_then_list_uses_received_token() {
    let stub = Arc::new(
        StubTransport::new()
            .respond(200, login_ok("tok123"))
            .respond(200, serde_json::json!({ "status": 200, "data": [image_json("a")] })),
    );
    let gallery = Gallery::new(SessionStore::in_memory(), stub.clone());

    let outcome = gallery.login(&credentials()).await.unwrap();
    assert_eq!(outcome.landing, "/gallery");
    assert_eq!(outcome.message.as_deref(), Some("Welcome back"));
    assert_eq!(outcome.user.id, "1");
    assert_eq!(gallery.session().get_token().as_deref(), Some("tok123"));

    gallery.refresh().await.unwrap();
    assert_eq!(stub.last_request().authorization().as_deref(), Some("Bearer tok123"));
    assert_eq!(ids(&gallery), vec!["a"]);
}

#[tokio::test]
async fn failed_login_leaves_no_session() {
    let stub = Arc::new(StubTransport::new().respond(401, serde_json::json!({})));
    let session = SessionStore::in_memory();
    session.set_token("previous").unwrap();
    let gallery = Gallery::new(session, stub);

    let err = gallery.login(&credentials()).await.unwrap_err();
    assert_eq!(err.to_string(), LOGIN_FAILED);
    assert!(!gallery.session().has_token());
}

#[tokio::test]
async fn resource_calls_require_session() {
    let stub = Arc::new(StubTransport::new());
    let gallery = Gallery::new(SessionStore::in_memory(), stub.clone());

    assert!(matches!(gallery.refresh().await, Err(ClientError::SignedOut)));
    assert!(matches!(gallery.delete("a").await, Err(ClientError::SignedOut)));
    let file = UploadFile::new("a.png", "image/png", vec![1]);
    assert!(matches!(
        gallery.upload(&file, &TransformationRequest::default()).await,
        Err(ClientError::SignedOut)
    ));
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn failed_refresh_keeps_snapshot_and_session() {
    let (gallery, _stub) = signed_in(
        StubTransport::new()
            .respond(200, serde_json::json!({ "data": [image_json("a")] }))
            .respond(500, serde_json::json!({ "message": "boom" })),
    );
    gallery.refresh().await.unwrap();

    let err = gallery.refresh().await.unwrap_err();
    assert!(matches!(err, ClientError::Fetch(_)));
    assert_eq!(ids(&gallery), vec!["a"]);
    assert!(gallery.session().has_token());
}

#[tokio::test]
async fn upload_prepends_new_image() {
    let (gallery, _stub) = signed_in(
        StubTransport::new()
            .respond(200, serde_json::json!({ "data": [image_json("a")] }))
            .respond(201, serde_json::json!({ "data": image_json("b") })),
    );
    gallery.refresh().await.unwrap();

    let file = UploadFile::new("b.png", "image/png", vec![1, 2]);
    gallery.upload(&file, &TransformationRequest::default()).await.unwrap();

    assert_eq!(ids(&gallery), vec!["b", "a"]);
    assert!(!gallery.is_uploading());
}

#[tokio::test]
async fn failed_upload_clears_pending_and_keeps_session() {
    let (gallery, _stub) = signed_in(StubTransport::new().respond(500, serde_json::json!({ "message": "disk full" })));
    let file = UploadFile::new("b.png", "image/png", vec![1, 2]);

    let err = gallery.upload(&file, &TransformationRequest::default()).await.unwrap_err();

    assert_eq!(err.to_string(), "disk full");
    assert!(!gallery.is_uploading());
    assert!(gallery.session().has_token());
}

#[tokio::test]
async fn delete_removes_image_from_snapshot() {
    let (gallery, _stub) = signed_in(
        StubTransport::new()
            .respond(200, serde_json::json!({ "data": [image_json("a"), image_json("b"), image_json("c")] }))
            .respond_raw(204, ""),
    );
    gallery.refresh().await.unwrap();

    gallery.delete("b").await.unwrap();
    assert_eq!(ids(&gallery), vec!["a", "c"]);
}

#[tokio::test]
async fn failed_delete_restores_image_in_place() {
    let (gallery, _stub) = signed_in(
        StubTransport::new()
            .respond(200, serde_json::json!({ "data": [image_json("a"), image_json("b"), image_json("c")] }))
            .respond_raw(500, ""),
    );
    gallery.refresh().await.unwrap();

    let err = gallery.delete("b").await.unwrap_err();
    assert_eq!(err.to_string(), DELETE_FAILED);
    assert_eq!(ids(&gallery), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn logout_clears_session_and_snapshot() {
    let (gallery, _stub) = signed_in(StubTransport::new().respond(200, serde_json::json!({ "data": [image_json("a")] })));
    gallery.refresh().await.unwrap();

    gallery.logout().unwrap();
    assert!(!gallery.session().has_token());
    assert!(gallery.images().is_empty());
}

#[tokio::test]
async fn concurrent_upload_is_refused() {
    let (gallery, _stub) = signed_in(StubTransport::new());
    let _pending = gallery.upload_pending.try_begin().unwrap();
    let file = UploadFile::new("b.png", "image/png", vec![1]);

    let err = gallery.upload(&file, &TransformationRequest::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::Busy("upload")));
}
