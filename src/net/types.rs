//! Wire DTOs for the gallery REST API.
//!
//! DESIGN
//! ======
//! Field names follow the backend's camelCase JSON. Every response is
//! wrapped in an [`Envelope`]; identifiers arrive as strings or integers
//! depending on the backend's storage, so both are accepted.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Response wrapper used by every endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Envelope<T> {
    /// Status reported inside the body, if any.
    pub status: Option<u16>,
    /// Human-readable message, shown to the user on failure.
    pub message: Option<String>,
    /// Payload.
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Whether the in-body status, when present, reports success.
    #[must_use]
    pub fn reports_success(&self) -> bool {
        self.status.is_none_or(|status| (200..300).contains(&status))
    }
}

/// `POST /auth/login` body. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/login` payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub user: UserProfile,
    /// Success notice from the response envelope, shown to the user.
    #[serde(skip)]
    pub message: Option<String>,
}

/// `POST /auth/register` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub last_name: String,
}

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

impl RegistrationRequest {
    /// Check the request before sending it.
    ///
    /// # Errors
    ///
    /// Returns the message to show when a field is missing or the password
    /// is shorter than [`MIN_PASSWORD_LEN`] characters.
    pub fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err("Enter a valid email address".to_owned());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!("Password must be at least {MIN_PASSWORD_LEN} characters"));
        }
        if self.name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("Enter your name and last name".to_owned());
        }
        Ok(())
    }
}

/// A registered user as returned by register and login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    pub last_name: String,
}

/// An uploaded image as held by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResource {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub original_url: String,
    pub processed_url: Option<String>,
    pub original_name: String,
    pub mimetype: String,
    /// Size in bytes.
    pub size: u64,
    /// Transformations applied, as described by the backend.
    #[serde(default)]
    pub transformations: serde_json::Value,
    pub uploaded_at: String,
    pub processed_at: Option<String>,
}

/// Target dimensions for a resize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
}

/// Processing options sent alongside an upload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize: Option<Resize>,
    /// Degrees clockwise; a multiple of 90 in `0..=360`.
    #[serde(default)]
    pub rotate: u16,
    /// Mirror vertically.
    #[serde(default)]
    pub flip: bool,
    /// Mirror horizontally.
    #[serde(default)]
    pub flop: bool,
    #[serde(default)]
    pub grayscale: bool,
}

impl TransformationRequest {
    /// Check the options before uploading.
    ///
    /// # Errors
    ///
    /// Returns the message to show for an unsupported rotation or an empty
    /// resize dimension.
    pub fn validate(&self) -> Result<(), String> {
        if self.rotate > 360 || self.rotate % 90 != 0 {
            return Err(format!("Rotation must be 0, 90, 180, 270 or 360 degrees, got {}", self.rotate));
        }
        if let Some(resize) = self.resize
            && (resize.width == 0 || resize.height == 0)
        {
            return Err("Resize width and height must be greater than zero".to_owned());
        }
        Ok(())
    }

    /// JSON form sent in the `transformations` multipart field.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        _ => Err(D::Error::custom("expected string or integer id")),
    }
}
