use super::*;

#[test]
fn operation_errors_display_user_message() {
    assert_eq!(ClientError::Authentication(LOGIN_FAILED.to_owned()).to_string(), "Login failed");
    assert_eq!(ClientError::Upload("disk full".to_owned()).to_string(), "disk full");
    assert_eq!(ClientError::Busy("upload").to_string(), "upload already in progress");
    assert_eq!(ClientError::SignedOut.to_string(), "not signed in");
}

#[test]
fn session_errors_convert_and_keep_cause() {
    let err: ClientError = SessionError::Write { view: "cookie", reason: "read-only".to_owned() }.into();
    assert_eq!(err.code(), "E_SESSION");
    assert_eq!(err.to_string(), "session storage failed: cookie write failed: read-only");
}

#[test]
fn codes_are_distinct() {
    let errors = [
        ClientError::Authentication(String::new()),
        ClientError::Registration(String::new()),
        ClientError::Fetch(String::new()),
        ClientError::Upload(String::new()),
        ClientError::Delete(String::new()),
        ClientError::Validation(String::new()),
        ClientError::SignedOut,
        ClientError::Busy("login"),
    ];
    let mut codes: Vec<_> = errors.iter().map(ClientError::code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}
