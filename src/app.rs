//! Gallery view-model: the session plus the two API clients, as a page
//! or command consumes them.
//!
//! SYSTEM CONTEXT
//! ==============
//! Front ends drive a [`Gallery`] instead of the clients directly. It reads
//! the token from the session immediately before each image call, keeps the
//! per-load image snapshot, and refuses to start a login, registration or
//! upload while the previous one is still pending.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::{Arc, Mutex, PoisonError};

use crate::auth::AuthClient;
use crate::error::ClientError;
use crate::guard::DEFAULT_LANDING;
use crate::images::{ImageClient, UploadFile};
use crate::net::transport::Transport;
use crate::net::types::{ImageResource, LoginRequest, RegistrationRequest, TransformationRequest, UserProfile};
use crate::pending::PendingFlag;
use crate::session::SessionStore;

/// Result of a confirmed login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: UserProfile,
    /// Page to navigate to; the session is already stored when this is returned.
    pub landing: &'static str,
    /// Server-provided success notice, if any.
    pub message: Option<String>,
}

pub struct Gallery {
    session: SessionStore,
    auth: AuthClient,
    images: ImageClient,
    snapshot: Mutex<Vec<ImageResource>>,
    login_pending: PendingFlag,
    register_pending: PendingFlag,
    upload_pending: PendingFlag,
}

impl Gallery {
    #[must_use]
    pub fn new(session: SessionStore, transport: Arc<dyn Transport>) -> Self {
        Self {
            session,
            auth: AuthClient::new(transport.clone()),
            images: ImageClient::new(transport),
            snapshot: Mutex::new(Vec::new()),
            login_pending: PendingFlag::new(),
            register_pending: PendingFlag::new(),
            upload_pending: PendingFlag::new(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Images from the last refresh, adjusted by later uploads and deletes.
    #[must_use]
    pub fn images(&self) -> Vec<ImageResource> {
        self.snapshot().clone()
    }

    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.upload_pending.is_pending()
    }

    /// Log in. The returned landing page is only handed out once the
    /// session write has completed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Busy`] if a login is already pending, otherwise
    /// whatever [`AuthClient::login`] returns.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginOutcome, ClientError> {
        let _pending = self.login_pending.try_begin().ok_or(ClientError::Busy("login"))?;
        let data = self.auth.login(&self.session, credentials).await;
        self.snapshot().clear();
        let data = data?;
        Ok(LoginOutcome { user: data.user, landing: DEFAULT_LANDING, message: data.message })
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Busy`] if a registration is already pending,
    /// otherwise whatever [`AuthClient::register`] returns.
    pub async fn register(&self, profile: &RegistrationRequest) -> Result<UserProfile, ClientError> {
        let _pending = self.register_pending.try_begin().ok_or(ClientError::Busy("registration"))?;
        self.auth.register(profile).await
    }

    /// End the session and drop the image snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Session`] if a session view cannot be cleared.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.snapshot().clear();
        self.auth.logout(&self.session)
    }

    /// Replace the snapshot with a fresh listing.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SignedOut`] without a session, or
    /// [`ClientError::Fetch`] if the listing fails (the snapshot is kept).
    pub async fn refresh(&self) -> Result<Vec<ImageResource>, ClientError> {
        let token = self.token()?;
        let images = self.images.list(&token).await?;
        self.snapshot().clone_from(&images);
        Ok(images)
    }

    /// Upload a file and add the result to the front of the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Busy`] if an upload is pending,
    /// [`ClientError::SignedOut`] without a session, or whatever
    /// [`ImageClient::upload`] returns.
    pub async fn upload(
        &self,
        file: &UploadFile,
        transformations: &TransformationRequest,
    ) -> Result<ImageResource, ClientError> {
        let _pending = self.upload_pending.try_begin().ok_or(ClientError::Busy("upload"))?;
        let token = self.token()?;
        let image = self.images.upload(file, &token, transformations).await?;
        self.snapshot().insert(0, image.clone());
        Ok(image)
    }

    /// Delete an image, removing it from the snapshot first and restoring it
    /// in place if the call fails.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SignedOut`] without a session, or
    /// [`ClientError::Delete`] if the backend refuses.
    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let token = self.token()?;
        let removed = {
            let mut snapshot = self.snapshot();
            snapshot
                .iter()
                .position(|image| image.id == id)
                .map(|index| (index, snapshot.remove(index)))
        };

        let result = self.images.delete(id, &token).await;
        if result.is_err()
            && let Some((index, image)) = removed
        {
            let mut snapshot = self.snapshot();
            let index = index.min(snapshot.len());
            snapshot.insert(index, image);
        }
        result
    }

    fn token(&self) -> Result<String, ClientError> {
        self.session.get_token().ok_or(ClientError::SignedOut)
    }

    fn snapshot(&self) -> std::sync::MutexGuard<'_, Vec<ImageResource>> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
