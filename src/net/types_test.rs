use super::*;

#[test]
fn login_envelope_parses_token_and_user() {
    let raw = serde_json::json!({
        "status": 200,
        "message": "ok",
        "data": {
            "token": "tok123",
            "user": { "id": 7, "email": "a@b.com", "name": "Ada", "lastName": "Lovelace" }
        }
    });
    let envelope: Envelope<LoginData> = serde_json::from_value(raw).unwrap();
    assert!(envelope.reports_success());
    let data = envelope.data.unwrap();
    assert_eq!(data.token, "tok123");
    assert_eq!(data.user.id, "7");
    assert_eq!(data.user.last_name, "Lovelace");
}

#[test]
fn envelope_without_status_counts_as_success() {
    let envelope: Envelope<serde_json::Value> = serde_json::from_str(r#"{"data":null}"#).unwrap();
    assert!(envelope.reports_success());
    assert!(envelope.data.is_none());
    assert!(envelope.message.is_none());
}

#[test]
fn envelope_with_error_status_reports_failure() {
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(r#"{"status":401,"message":"invalid credentials"}"#).unwrap();
    assert!(!envelope.reports_success());
    assert_eq!(envelope.message.as_deref(), Some("invalid credentials"));
}

#[test]
fn image_resource_parses_backend_shape() {
    let raw = serde_json::json!({
        "id": "img-1",
        "originalUrl": "https://cdn.test/original.png",
        "processedUrl": "https://cdn.test/processed.png",
        "originalName": "cat.png",
        "mimetype": "image/png",
        "size": 2048,
        "transformations": "{\"rotate\":90}",
        "uploadedAt": "2024-03-01T10:00:00Z",
        "processedAt": null
    });
    let image: ImageResource = serde_json::from_value(raw).unwrap();
    assert_eq!(image.id, "img-1");
    assert_eq!(image.size, 2048);
    assert_eq!(image.processed_url.as_deref(), Some("https://cdn.test/processed.png"));
    assert!(image.processed_at.is_none());
    assert_eq!(image.transformations, serde_json::json!("{\"rotate\":90}"));
}

#[test]
fn image_resource_rejects_object_id() {
    let raw = serde_json::json!({
        "id": { "oid": 1 },
        "originalUrl": "u",
        "originalName": "n",
        "mimetype": "image/png",
        "size": 1,
        "uploadedAt": "t"
    });
    assert!(serde_json::from_value::<ImageResource>(raw).is_err());
}

#[test]
fn registration_request_uses_camel_case() {
    let request = RegistrationRequest {
        email: "a@b.com".to_owned(),
        password: "secret".to_owned(),
        name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
    };
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["lastName"], "Lovelace");
    assert!(json.get("last_name").is_none());
}

#[test]
fn registration_requires_six_character_password() {
    let mut request = RegistrationRequest {
        email: "a@b.com".to_owned(),
        password: "12345".to_owned(),
        name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
    };
    assert_eq!(request.validate().unwrap_err(), "Password must be at least 6 characters");

    request.password = "123456".to_owned();
    assert!(request.validate().is_ok());
}

#[test]
fn registration_requires_email_and_names() {
    let request = RegistrationRequest {
        email: "not-an-email".to_owned(),
        password: "secret".to_owned(),
        name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
    };
    assert!(request.validate().is_err());

    let request = RegistrationRequest { email: "a@b.com".to_owned(), last_name: " ".to_owned(), ..request };
    assert_eq!(request.validate().unwrap_err(), "Enter your name and last name");
}

#[test]
fn transformation_json_round_trips_exactly() {
    let input = serde_json::json!({
        "resize": { "width": 800, "height": 600 },
        "rotate": 90,
        "flip": false,
        "flop": false,
        "grayscale": true
    });
    let request: TransformationRequest = serde_json::from_value(input.clone()).unwrap();
    let serialized = request.to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&serialized).unwrap();
    assert_eq!(parsed, input);
}

#[test]
fn transformation_without_resize_omits_field() {
    let request = TransformationRequest { grayscale: true, ..TransformationRequest::default() };
    let parsed: serde_json::Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
    assert!(parsed.get("resize").is_none());
    assert_eq!(parsed["grayscale"], true);
}

#[test]
fn transformation_rotation_must_be_quarter_turn() {
    for rotate in [0, 90, 180, 270, 360] {
        let request = TransformationRequest { rotate, ..TransformationRequest::default() };
        assert!(request.validate().is_ok(), "rotate {rotate} should be accepted");
    }
    for rotate in [45, 100, 450] {
        let request = TransformationRequest { rotate, ..TransformationRequest::default() };
        assert!(request.validate().is_err(), "rotate {rotate} should be rejected");
    }
}

#[test]
fn transformation_resize_must_be_non_zero() {
    let request = TransformationRequest {
        resize: Some(Resize { width: 0, height: 600 }),
        ..TransformationRequest::default()
    };
    assert!(request.validate().is_err());
}
