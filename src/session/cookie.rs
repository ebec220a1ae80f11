//! Session cookie projection.
//!
//! The cookie is what the route guard sees on each navigation. It is kept
//! in `Set-Cookie` form so its attributes (path, expiry, same-site policy,
//! secure flag) travel with the value.

use std::path::{Path, PathBuf};

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

use super::{SessionError, TokenView};

/// Cookie name; matches the persistent storage key.
pub const SESSION_COOKIE: &str = super::storage::TOKEN_KEY;

/// Lifetime of the session cookie.
pub const COOKIE_TTL: Duration = Duration::days(7);

const VIEW_NAME: &str = "cookie";

/// Build the session cookie issued at `now`.
#[must_use]
pub fn session_cookie(token: &str, secure: bool, now: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_owned()))
        .path("/")
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(COOKIE_TTL)
        .expires(now + COOKIE_TTL)
        .build()
}

/// Value of a stored cookie, or `None` when it is empty or expired at `now`.
#[must_use]
pub fn live_value(cookie: &Cookie<'_>, now: OffsetDateTime) -> Option<String> {
    if cookie.value().is_empty() {
        return None;
    }
    match cookie.expires_datetime() {
        Some(expires) if expires <= now => None,
        _ => Some(cookie.value().to_owned()),
    }
}

/// File holding the session cookie in `Set-Cookie` form.
#[derive(Debug, Clone)]
pub struct CookieFile {
    path: PathBuf,
    secure: bool,
}

impl CookieFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, secure: bool) -> Self {
        Self { path: path.into(), secure }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn secure(&self) -> bool {
        self.secure
    }

    /// Read the stored cookie, including its attributes.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Read`] if the file exists but cannot be read
    /// or does not hold a parseable cookie.
    pub fn read_cookie(&self) -> Result<Option<Cookie<'static>>, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(read_error(e)),
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let cookie = Cookie::parse(raw.to_owned()).map_err(read_error)?;
        if cookie.name() != SESSION_COOKIE {
            return Err(read_error(format!("unexpected cookie `{}`", cookie.name())));
        }
        Ok(Some(cookie))
    }
}

impl TokenView for CookieFile {
    fn name(&self) -> &'static str {
        VIEW_NAME
    }

    fn load(&self) -> Result<Option<String>, SessionError> {
        let now = OffsetDateTime::now_utc();
        Ok(self.read_cookie()?.and_then(|cookie| live_value(&cookie, now)))
    }

    fn store(&self, token: Option<&str>) -> Result<(), SessionError> {
        let Some(token) = token else {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(write_error(e)),
            };
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let cookie = session_cookie(token, self.secure, OffsetDateTime::now_utc());
        std::fs::write(&self.path, cookie.to_string()).map_err(write_error)
    }
}

fn read_error(e: impl std::fmt::Display) -> SessionError {
    SessionError::Read { view: VIEW_NAME, reason: e.to_string() }
}

fn write_error(e: impl std::fmt::Display) -> SessionError {
    SessionError::Write { view: VIEW_NAME, reason: e.to_string() }
}
