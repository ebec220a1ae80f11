//! Auth client: login, registration, logout.
//!
//! SESSION RULES
//! =============
//! The token is written in exactly one place, after a confirmed login. Every
//! failed login clears whatever session existed before, so a rejected
//! re-authentication never leaves the previous credential active.
//! Registration never reads or writes the session.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use crate::error::{ClientError, LOGIN_FAILED, REGISTRATION_FAILED};
use crate::net::transport::{ApiRequest, ApiResponse, Transport};
use crate::net::types::{LoginData, LoginRequest, RegistrationRequest, UserProfile};
use crate::session::SessionStore;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";

/// Client for the `/auth` endpoints.
#[derive(Clone)]
pub struct AuthClient {
    transport: Arc<dyn Transport>,
}

impl AuthClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Log in and commit the returned token to `session`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Authentication`] with the server's message (or
    /// a generic one) when the login is rejected or cannot be sent; the
    /// session is cleared in that case. Returns [`ClientError::Session`] if
    /// the token cannot be committed, after clearing the session.
    pub async fn login(&self, session: &SessionStore, credentials: &LoginRequest) -> Result<LoginData, ClientError> {
        let data = match self.request_login(credentials).await {
            Ok(data) => data,
            Err(message) => {
                tracing::warn!(%message, "login rejected; clearing session");
                purge(session);
                return Err(ClientError::Authentication(message));
            }
        };

        if let Err(e) = session.set_token(&data.token) {
            tracing::error!(error = %e, "login succeeded but session could not be stored");
            purge(session);
            return Err(e.into());
        }

        tracing::info!(user_id = %data.user.id, "logged in");
        Ok(data)
    }

    /// Register a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for a request that fails local
    /// checks, or [`ClientError::Registration`] with the server's message
    /// (or a generic one) when registration is rejected or cannot be sent.
    pub async fn register(&self, profile: &RegistrationRequest) -> Result<UserProfile, ClientError> {
        profile.validate().map_err(ClientError::Validation)?;

        let body = serde_json::to_value(profile).map_err(|_| registration_failed())?;
        let response = self
            .transport
            .send(ApiRequest::post_json(REGISTER_PATH, body))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "registration request failed");
                registration_failed()
            })?;

        let user = registration_outcome(&response).map_err(ClientError::Registration)?;
        tracing::info!(user_id = %user.id, "registered");
        Ok(user)
    }

    /// End the session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Session`] if a session view cannot be cleared;
    /// the in-memory session is cleared regardless.
    pub fn logout(&self, session: &SessionStore) -> Result<(), ClientError> {
        session.remove_token()?;
        tracing::info!("logged out");
        Ok(())
    }

    async fn request_login(&self, credentials: &LoginRequest) -> Result<LoginData, String> {
        let body = serde_json::to_value(credentials).map_err(|_| LOGIN_FAILED.to_owned())?;
        let response = self
            .transport
            .send(ApiRequest::post_json(LOGIN_PATH, body))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "login request failed");
                LOGIN_FAILED.to_owned()
            })?;
        login_outcome(&response)
    }
}

fn purge(session: &SessionStore) {
    if let Err(e) = session.remove_token() {
        tracing::warn!(error = %e, "failed to clear session views");
    }
}

fn registration_failed() -> ClientError {
    ClientError::Registration(REGISTRATION_FAILED.to_owned())
}

/// Interpret a login response: success needs an HTTP 2xx, a successful
/// in-body status and a non-empty token.
pub(crate) fn login_outcome(response: &ApiResponse) -> Result<LoginData, String> {
    if !response.is_success() {
        return Err(response.failure_message(LOGIN_FAILED));
    }
    let envelope = response
        .envelope::<LoginData>()
        .map_err(|_| LOGIN_FAILED.to_owned())?;
    if !envelope.reports_success() {
        return Err(envelope.message.unwrap_or_else(|| LOGIN_FAILED.to_owned()));
    }
    match envelope.data {
        Some(data) if !data.token.is_empty() => Ok(LoginData { message: envelope.message, ..data }),
        _ => Err(LOGIN_FAILED.to_owned()),
    }
}

pub(crate) fn registration_outcome(response: &ApiResponse) -> Result<UserProfile, String> {
    if !response.is_success() {
        return Err(response.failure_message(REGISTRATION_FAILED));
    }
    let envelope = response
        .envelope::<UserProfile>()
        .map_err(|_| REGISTRATION_FAILED.to_owned())?;
    if !envelope.reports_success() {
        return Err(envelope.message.unwrap_or_else(|| REGISTRATION_FAILED.to_owned()));
    }
    envelope.data.ok_or_else(|| REGISTRATION_FAILED.to_owned())
}
