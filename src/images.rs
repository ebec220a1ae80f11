//! Image resource client: list, upload, delete.
//!
//! Every call takes the bearer token from the caller. The client never
//! reads the session itself and never interprets status codes beyond
//! success or failure; recovering from an expired session is the caller's
//! decision.

#[cfg(test)]
#[path = "images_test.rs"]
mod images_test;

use std::path::Path;
use std::sync::Arc;

use crate::error::{ClientError, DELETE_FAILED, FETCH_FAILED, UPLOAD_FAILED};
use crate::net::transport::{ApiRequest, ApiResponse, FormPart, Transport};
use crate::net::types::{Envelope, ImageResource, TransformationRequest};

pub const IMAGES_PATH: &str = "/images";
const IMAGES_SEGMENT: &str = "images";
pub const UPLOAD_PATH: &str = "/images/upload";

/// Multipart field carrying the file bytes.
pub const FILE_FIELD: &str = "image";
/// Multipart field carrying the transformation JSON.
pub const TRANSFORMATIONS_FIELD: &str = "transformations";

/// A file selected for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mimetype: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    #[must_use]
    pub fn new(file_name: impl Into<String>, mimetype: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), mimetype: mimetype.into(), bytes }
    }

    /// Read a file from disk, inferring its mimetype from the extension.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::Validation(format!("Cannot read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned());
        Ok(Self { mimetype: mimetype_for(path).to_owned(), file_name, bytes })
    }
}

/// Mimetype for a file extension; unknown extensions are sent as raw bytes.
#[must_use]
pub fn mimetype_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Client for the `/images` endpoints.
#[derive(Clone)]
pub struct ImageClient {
    transport: Arc<dyn Transport>,
}

impl ImageClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch the signed-in user's images.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Fetch`] on any non-success response or
    /// transport failure.
    pub async fn list(&self, token: &str) -> Result<Vec<ImageResource>, ClientError> {
        let response = self
            .send(ApiRequest::get(IMAGES_PATH).with_bearer(token), FETCH_FAILED)
            .await
            .map_err(ClientError::Fetch)?;
        let images = payload::<Vec<ImageResource>>(&response, FETCH_FAILED)
            .map_err(ClientError::Fetch)?
            .unwrap_or_default();
        tracing::debug!(count = images.len(), "images fetched");
        Ok(images)
    }

    /// Upload one file with the requested transformations.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for an empty file or invalid
    /// transformations (nothing is sent), or [`ClientError::Upload`] with the
    /// server's message (or a generic one) on failure.
    pub async fn upload(
        &self,
        file: &UploadFile,
        token: &str,
        transformations: &TransformationRequest,
    ) -> Result<ImageResource, ClientError> {
        let request = upload_request(file, token, transformations)?;
        let response = self
            .send(request, UPLOAD_FAILED)
            .await
            .map_err(ClientError::Upload)?;
        let image = payload::<ImageResource>(&response, UPLOAD_FAILED)
            .map_err(ClientError::Upload)?
            .ok_or_else(|| ClientError::Upload(UPLOAD_FAILED.to_owned()))?;
        tracing::info!(image_id = %image.id, name = %image.original_name, "image uploaded");
        Ok(image)
    }

    /// Delete one image.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for an id that cannot name an
    /// image (nothing is sent), or [`ClientError::Delete`] on any
    /// non-success response or transport failure.
    pub async fn delete(&self, id: &str, token: &str) -> Result<(), ClientError> {
        let path = image_path(id)?;
        let response = self
            .send(ApiRequest::delete(path).with_bearer(token), DELETE_FAILED)
            .await
            .map_err(ClientError::Delete)?;
        if !response.is_success() {
            return Err(ClientError::Delete(response.failure_message(DELETE_FAILED)));
        }
        tracing::info!(image_id = %id, "image deleted");
        Ok(())
    }

    async fn send(&self, request: ApiRequest, fallback: &str) -> Result<ApiResponse, String> {
        let path = request.path.clone();
        self.transport.send(request).await.map_err(|e| {
            tracing::warn!(error = %e, %path, "image request failed");
            fallback.to_owned()
        })
    }
}

/// Path of a single image; the id is percent-encoded as one path segment.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] for an empty, `.` or `..` id, which
/// would not address a single image.
pub fn image_path(id: &str) -> Result<String, ClientError> {
    if matches!(id, "" | "." | "..") {
        return Err(ClientError::Validation(format!("Invalid image id {id:?}")));
    }
    let mut url = reqwest::Url::parse("http://localhost/").map_err(|e| ClientError::Validation(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| ClientError::Validation("cannot build image path".to_owned()))?
        .push(IMAGES_SEGMENT)
        .push(id);
    Ok(url.path().to_owned())
}

/// Build the multipart upload request after local validation.
pub(crate) fn upload_request(
    file: &UploadFile,
    token: &str,
    transformations: &TransformationRequest,
) -> Result<ApiRequest, ClientError> {
    if file.bytes.is_empty() {
        return Err(ClientError::Validation("Select an image to upload".to_owned()));
    }
    transformations
        .validate()
        .map_err(ClientError::Validation)?;
    let json = transformations
        .to_json()
        .map_err(|e| ClientError::Validation(e.to_string()))?;

    let parts = vec![
        FormPart::File {
            name: FILE_FIELD.to_owned(),
            file_name: file.file_name.clone(),
            mimetype: file.mimetype.clone(),
            bytes: file.bytes.clone(),
        },
        FormPart::Text { name: TRANSFORMATIONS_FIELD.to_owned(), value: json },
    ];
    Ok(ApiRequest::post_multipart(UPLOAD_PATH, parts).with_bearer(token))
}

fn payload<T: serde::de::DeserializeOwned>(response: &ApiResponse, fallback: &str) -> Result<Option<T>, String> {
    if !response.is_success() {
        return Err(response.failure_message(fallback));
    }
    let envelope: Envelope<T> = response.envelope().map_err(|_| fallback.to_owned())?;
    if !envelope.reports_success() {
        return Err(envelope.message.unwrap_or_else(|| fallback.to_owned()));
    }
    Ok(envelope.data)
}
