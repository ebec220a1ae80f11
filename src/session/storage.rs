//! Persistent key/value storage for the session token.
//!
//! `LocalStorage` keeps string items in a single JSON object file and
//! survives restarts; items are removed only explicitly. Writes go through
//! a temporary file and a rename so a crash never leaves a torn file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{SessionError, TokenView};

/// Fixed key under which the session token is stored.
pub const TOKEN_KEY: &str = "token";

const VIEW_NAME: &str = "local storage";

/// File-backed string key/value store.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one item.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Read`] if the file exists but cannot be read
    /// or is not a JSON object of strings.
    pub fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read_items()?.remove(key))
    }

    /// Write one item, keeping the others.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing file cannot be read or the new
    /// contents cannot be written.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut items = self.read_items()?;
        items.insert(key.to_owned(), value.to_owned());
        self.write_items(&items)
    }

    /// Remove one item. Removing a missing item is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing file cannot be read or rewritten.
    pub fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        let mut items = self.read_items()?;
        if items.remove(key).is_none() {
            return Ok(());
        }
        self.write_items(&items)
    }

    fn read_items(&self) -> Result<BTreeMap<String, String>, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(read_error(e)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(read_error)
    }

    fn write_items(&self, items: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let raw = serde_json::to_string_pretty(items).map_err(write_error)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, raw).map_err(write_error)?;
        std::fs::rename(&tmp, &self.path).map_err(write_error)
    }
}

impl TokenView for LocalStorage {
    fn name(&self) -> &'static str {
        VIEW_NAME
    }

    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.get_item(TOKEN_KEY)?.filter(|token| !token.is_empty()))
    }

    fn store(&self, token: Option<&str>) -> Result<(), SessionError> {
        match token {
            Some(token) => self.set_item(TOKEN_KEY, token),
            None => self.remove_item(TOKEN_KEY),
        }
    }
}

fn read_error(e: impl std::fmt::Display) -> SessionError {
    SessionError::Read { view: VIEW_NAME, reason: e.to_string() }
}

fn write_error(e: impl std::fmt::Display) -> SessionError {
    SessionError::Write { view: VIEW_NAME, reason: e.to_string() }
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-memory projection, for embedding and tests.
#[derive(Debug)]
pub struct MemoryView {
    name: &'static str,
    token: Mutex<Option<String>>,
}

impl MemoryView {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self { name, token: Mutex::new(None) }
    }

    /// Start with a token already projected.
    #[must_use]
    pub fn with_token(name: &'static str, token: &str) -> Self {
        Self { name, token: Mutex::new(Some(token.to_owned())) }
    }
}

impl TokenView for MemoryView {
    fn name(&self) -> &'static str {
        self.name
    }

    fn load(&self) -> Result<Option<String>, SessionError> {
        let token = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(token.clone().filter(|token| !token.is_empty()))
    }

    fn store(&self, token: Option<&str>) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = token.map(str::to_owned);
        Ok(())
    }
}
