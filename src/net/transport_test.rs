use super::*;

#[test]
fn join_url_normalizes_slashes() {
    assert_eq!(join_url("http://api.test", "/images"), "http://api.test/images");
    assert_eq!(join_url("http://api.test/", "images"), "http://api.test/images");
    assert_eq!(join_url("http://api.test/v1/", "/auth/login"), "http://api.test/v1/auth/login");
}

#[test]
fn http_transport_trims_base_url() {
    let transport = HttpTransport::new("http://api.test/").unwrap();
    assert_eq!(transport.base_url(), "http://api.test");
    assert_eq!(transport.url("/images/42"), "http://api.test/images/42");
}

#[test]
fn bearer_only_attached_when_present() {
    let anonymous = ApiRequest::get("/images");
    assert!(anonymous.authorization().is_none());

    let authed = ApiRequest::get("/images").with_bearer("tok123");
    assert_eq!(authed.authorization().as_deref(), Some("Bearer tok123"));
}

#[test]
fn text_part_finds_named_field() {
    let request = ApiRequest::post_multipart(
        "/images/upload",
        vec![
            FormPart::File {
                name: "image".to_owned(),
                file_name: "a.png".to_owned(),
                mimetype: "image/png".to_owned(),
                bytes: vec![1, 2, 3],
            },
            FormPart::Text { name: "transformations".to_owned(), value: "{}".to_owned() },
        ],
    );
    assert_eq!(request.text_part("transformations"), Some("{}"));
    assert_eq!(request.text_part("image"), None);
    assert_eq!(ApiRequest::get("/images").text_part("transformations"), None);
}

#[test]
fn server_message_extracts_message_field() {
    assert_eq!(server_message(r#"{"message":"invalid credentials"}"#).as_deref(), Some("invalid credentials"));
    assert_eq!(server_message(r#"{"message":"  "}"#), None);
    assert_eq!(server_message(r#"{"message":42}"#), None);
    assert_eq!(server_message("<html>502</html>"), None);
}

#[test]
fn response_success_range() {
    assert!(ApiResponse::new(200, "").is_success());
    assert!(ApiResponse::new(204, "").is_success());
    assert!(!ApiResponse::new(302, "").is_success());
    assert!(!ApiResponse::new(401, "").is_success());
}

#[test]
fn multipart_form_rejects_bad_mimetype() {
    let parts = vec![FormPart::File {
        name: "image".to_owned(),
        file_name: "a.png".to_owned(),
        mimetype: "not a mime".to_owned(),
        bytes: vec![0],
    }];
    assert!(matches!(multipart_form(parts), Err(TransportError::InvalidRequest(_))));
}
