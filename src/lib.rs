//! Client-side session and API layer for the image gallery.
//!
//! A [`session::SessionStore`] holds the bearer token and keeps its two
//! views (the persistent store and the session cookie) in step. The
//! [`auth::AuthClient`] and [`images::ImageClient`] talk to the backend
//! through a [`net::transport::Transport`], and [`guard`] decides which
//! pages a request may reach based on the cookie alone.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod images;
pub mod net;
pub mod pending;
pub mod session;

pub use app::Gallery;
pub use config::ClientConfig;
pub use error::ClientError;
pub use session::{SessionError, SessionStore};
