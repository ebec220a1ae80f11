//! Client error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! Each user-triggered operation fails with its own variant so a front end
//! can surface a transient notice without inspecting transport details.
//! The message carried by the operation variants is the text shown to the
//! user: the server-provided message when there is one, otherwise a
//! generic fallback.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::session::SessionError;

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const FETCH_FAILED: &str = "Failed to fetch images";
pub const UPLOAD_FAILED: &str = "Upload failed";
pub const DELETE_FAILED: &str = "Delete failed";

/// Errors surfaced by the auth and image clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Login was rejected or could not be completed.
    #[error("{0}")]
    Authentication(String),

    /// Registration was rejected or could not be completed.
    #[error("{0}")]
    Registration(String),

    /// Listing images failed.
    #[error("{0}")]
    Fetch(String),

    /// Uploading an image failed.
    #[error("{0}")]
    Upload(String),

    /// Deleting an image failed.
    #[error("{0}")]
    Delete(String),

    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// A resource operation was attempted without a session.
    #[error("not signed in")]
    SignedOut,

    /// The same operation is already in flight.
    #[error("{0} already in progress")]
    Busy(&'static str),

    /// The session could not be committed to storage.
    #[error("session storage failed: {0}")]
    Session(#[from] SessionError),
}

impl ClientError {
    /// Short machine-readable code, stable across message changes.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "E_AUTHENTICATION",
            Self::Registration(_) => "E_REGISTRATION",
            Self::Fetch(_) => "E_FETCH",
            Self::Upload(_) => "E_UPLOAD",
            Self::Delete(_) => "E_DELETE",
            Self::Validation(_) => "E_VALIDATION",
            Self::SignedOut => "E_SIGNED_OUT",
            Self::Busy(_) => "E_BUSY",
            Self::Session(_) => "E_SESSION",
        }
    }
}
