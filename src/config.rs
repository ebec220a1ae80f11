//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::session::{CookieFile, LocalStorage, SessionError, SessionStore};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
pub const STORAGE_FILE: &str = "storage.json";
pub const COOKIE_FILE: &str = "cookie";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub api_url: String,
    /// Directory holding the persistent store and the session cookie.
    pub session_dir: PathBuf,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
}

impl ClientConfig {
    /// Build config from the environment.
    ///
    /// - `GALLERY_API_URL`: backend base URL (default `http://127.0.0.1:3000`)
    /// - `GALLERY_SESSION_DIR`: session directory (default: platform config dir)
    /// - `GALLERY_COOKIE_SECURE`: explicit secure-cookie flag
    /// - `GALLERY_ENV`: `production` enables secure cookies when not explicit
    #[must_use]
    pub fn from_env() -> Self {
        let api_url = std::env::var("GALLERY_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let session_dir = std::env::var("GALLERY_SESSION_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_dir());
        let cookie_secure = cookie_secure(&api_url);
        Self { api_url, session_dir, cookie_secure }
    }

    /// Override the API URL (e.g. from a command-line flag). The cookie
    /// secure flag is re-derived for the new URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        api_url.trim_end_matches('/').clone_into(&mut self.api_url);
        self.cookie_secure = cookie_secure(&self.api_url);
        self
    }

    #[must_use]
    pub fn with_session_dir(mut self, session_dir: PathBuf) -> Self {
        self.session_dir = session_dir;
        self
    }

    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.session_dir.join(STORAGE_FILE)
    }

    #[must_use]
    pub fn cookie_path(&self) -> PathBuf {
        self.session_dir.join(COOKIE_FILE)
    }

    /// Open the file-backed session described by this config.
    ///
    /// # Errors
    ///
    /// Returns an error if either session file cannot be read or reconciled.
    pub fn open_session(&self) -> Result<SessionStore, SessionError> {
        SessionStore::open(
            LocalStorage::new(self.storage_path()),
            CookieFile::new(self.cookie_path(), self.cookie_secure),
        )
    }
}

fn default_session_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("gallery")
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().and_then(|raw| parse_bool(&raw))
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn cookie_secure(api_url: &str) -> bool {
    let env = std::env::var("GALLERY_ENV").ok();
    infer_cookie_secure(env_bool("GALLERY_COOKIE_SECURE"), env.as_deref(), api_url)
}

/// Secure cookies for production deployments: explicit flag first, then
/// `GALLERY_ENV=production`, then an `https://` API URL.
pub(crate) fn infer_cookie_secure(explicit: Option<bool>, env: Option<&str>, api_url: &str) -> bool {
    if let Some(value) = explicit {
        return value;
    }
    let production = env.is_some_and(|env| env.trim().eq_ignore_ascii_case("production"));
    production || api_url.starts_with("https://")
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
