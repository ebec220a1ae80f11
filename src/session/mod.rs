//! Client-side session: one canonical token with two synchronized views.
//!
//! ARCHITECTURE
//! ============
//! The canonical token lives in memory. It is projected into a persistent
//! key/value store (read back to decorate API requests) and into a session
//! cookie (read back by the route guard). Both projections go through a
//! single write path, so a failed write either rolls back or is reported
//! as divergence instead of silently leaving the views disagreeing.
//!
//! TRADE-OFFS
//! ==========
//! The cookie carries a fixed 7-day expiry while the persistent store does
//! not expire. On [`SessionStore::open`] any disagreement (including an
//! expired cookie) ends the session rather than re-projecting the cookie,
//! so expiry cannot be extended by restarting the client.

pub mod cookie;
pub mod storage;


use std::sync::{PoisonError, RwLock};

use axum_extra::extract::cookie::Cookie;

pub use cookie::{CookieFile, SESSION_COOKIE, session_cookie};
pub use storage::{LocalStorage, MemoryView, TOKEN_KEY};

// =============================================================================
// ERRORS
// =============================================================================

/// Errors raised while reading or writing a session view.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{view} read failed: {reason}")]
    Read { view: &'static str, reason: String },

    #[error("{view} write failed: {reason}")]
    Write { view: &'static str, reason: String },

    /// The cookie write failed after the persistent write succeeded; the
    /// persistent view was restored to its previous value.
    #[error("{cause}; persistent store rolled back")]
    Partial { cause: Box<SessionError> },

    /// The cookie write failed and restoring the persistent view failed too.
    /// The views disagree until the next open, login or logout.
    #[error("session views diverged: {cause}; rollback failed: {rollback}")]
    Diverged { cause: Box<SessionError>, rollback: Box<SessionError> },
}

// =============================================================================
// VIEWS
// =============================================================================

/// One physical projection of the session token.
pub trait TokenView: Send + Sync {
    /// Label used in errors and logs.
    fn name(&self) -> &'static str;

    /// Read the projected token. Empty values load as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Read`] if the backing store cannot be read.
    fn load(&self) -> Result<Option<String>, SessionError>;

    /// Project `token`, or clear the projection when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Write`] if the backing store cannot be written.
    fn store(&self, token: Option<&str>) -> Result<(), SessionError>;
}

// =============================================================================
// STORE
// =============================================================================

/// Canonical session holder. Constructed explicitly and passed by reference
/// to whatever needs the session; there is no process-wide instance.
pub struct SessionStore {
    token: RwLock<Option<String>>,
    persistent: Box<dyn TokenView>,
    cookie: Box<dyn TokenView>,
    attached: bool,
}

impl SessionStore {
    /// Open a session over the given views, restoring a session only when
    /// both views agree on it.
    ///
    /// # Errors
    ///
    /// Returns an error if either view cannot be read, or if clearing
    /// disagreeing views fails.
    pub fn open<P, C>(persistent: P, cookie: C) -> Result<Self, SessionError>
    where
        P: TokenView + 'static,
        C: TokenView + 'static,
    {
        let stored = persistent.load()?;
        let projected = cookie.load()?;

        let token = match (stored, projected) {
            (Some(stored), Some(projected)) if stored == projected => Some(stored),
            (None, None) => None,
            (stored, projected) => {
                tracing::warn!(
                    persistent = stored.is_some(),
                    cookie = projected.is_some(),
                    "session views disagree; ending session"
                );
                persistent.store(None)?;
                cookie.store(None)?;
                None
            }
        };

        Ok(Self { token: RwLock::new(token), persistent: Box::new(persistent), cookie: Box::new(cookie), attached: true })
    }

    /// Session backed by in-memory views only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            token: RwLock::new(None),
            persistent: Box::new(MemoryView::new("local storage")),
            cookie: Box::new(MemoryView::new("cookie")),
            attached: true,
        }
    }

    /// Session used outside an attached client context. Writes are silently
    /// ignored and reads are always absent.
    #[must_use]
    pub fn detached() -> Self {
        Self { attached: false, ..Self::in_memory() }
    }

    /// Whether writes reach the underlying views.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Commit `token` to both views, then make it canonical.
    ///
    /// An empty token clears the session.
    ///
    /// # Errors
    ///
    /// Returns the persistent write error if that write fails (nothing was
    /// changed), [`SessionError::Partial`] if the cookie write failed and the
    /// persistent view was restored, or [`SessionError::Diverged`] if the
    /// restore failed as well. The canonical token is unchanged on error.
    pub fn set_token(&self, token: &str) -> Result<(), SessionError> {
        if !self.attached {
            tracing::debug!("session detached; ignoring token write");
            return Ok(());
        }
        if token.is_empty() {
            return self.remove_token();
        }

        let previous = self.get_token();
        self.persistent.store(Some(token))?;

        if let Err(cause) = self.cookie.store(Some(token)) {
            let cause = Box::new(cause);
            return Err(match self.persistent.store(previous.as_deref()) {
                Ok(()) => SessionError::Partial { cause },
                Err(rollback) => {
                    tracing::error!(error = %rollback, "session rollback failed; views diverged");
                    SessionError::Diverged { cause, rollback: Box::new(rollback) }
                }
            });
        }

        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    /// Current canonical token.
    #[must_use]
    pub fn get_token(&self) -> Option<String> {
        if !self.attached {
            return None;
        }
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Whether a session currently exists.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.get_token().is_some()
    }

    /// Clear both views and the canonical token. Safe to call repeatedly.
    ///
    /// The canonical token is cleared even when a view fails, so no later
    /// request carries the old credential.
    ///
    /// # Errors
    ///
    /// Returns the first view error; both views are attempted regardless.
    pub fn remove_token(&self) -> Result<(), SessionError> {
        if !self.attached {
            return Ok(());
        }
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;

        let persistent = self.persistent.store(None);
        let cookie = self.cookie.store(None);
        persistent.and(cookie)
    }

    /// `Authorization` header value for the current session.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.get_token().map(|token| bearer(&token))
    }

    /// Cookie a navigation request would carry for the current session.
    #[must_use]
    pub fn cookie(&self) -> Option<Cookie<'static>> {
        self.get_token().map(|token| Cookie::new(SESSION_COOKIE, token))
    }

    /// Token as currently projected into the cookie view.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie view cannot be read.
    pub fn cookie_token(&self) -> Result<Option<String>, SessionError> {
        if !self.attached {
            return Ok(None);
        }
        self.cookie.load()
    }

    /// Token as currently projected into the persistent view.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistent view cannot be read.
    pub fn stored_token(&self) -> Result<Option<String>, SessionError> {
        if !self.attached {
            return Ok(None);
        }
        self.persistent.load()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("persistent", &self.persistent.name())
            .field("cookie", &self.cookie.name())
            .field("attached", &self.attached)
            .field("has_token", &self.has_token())
            .finish()
    }
}

/// Format a bearer credential.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
