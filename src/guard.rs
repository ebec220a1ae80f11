//! Route guard: session-cookie gate evaluated before every page navigation.
//!
//! The decision is a pure function of two facts, whether the navigation
//! carries a session cookie and whether it targets an auth page:
//!
//! | has token | auth path | result                   |
//! |-----------|-----------|--------------------------|
//! | no        | no        | redirect to login        |
//! | no        | yes       | allow                    |
//! | yes       | no        | allow                    |
//! | yes       | yes       | redirect to the gallery  |
//!
//! Every page navigation is guarded. Only API routes and static assets
//! bypass the table. Nothing is cached between navigations; each one is
//! decided from the cookie it carries.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::session::SESSION_COOKIE;

pub const LOGIN_PAGE: &str = "/auth/login";
pub const REGISTER_PAGE: &str = "/auth/register";
pub const GALLERY_PAGE: &str = "/gallery";

/// Where an authenticated user lands by default.
pub const DEFAULT_LANDING: &str = GALLERY_PAGE;

const AUTH_PREFIX: &str = "/auth/";

/// Prefixes served without consulting the session cookie.
const UNGUARDED_PREFIXES: [&str; 4] = ["/api", "/_next/static", "/_next/image", "/favicon.ico"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// Apply the guard table.
#[must_use]
pub fn decide(has_token: bool, is_auth_path: bool) -> GuardDecision {
    match (has_token, is_auth_path) {
        (false, false) => GuardDecision::Redirect(LOGIN_PAGE),
        (true, true) => GuardDecision::Redirect(DEFAULT_LANDING),
        (false, true) | (true, false) => GuardDecision::Allow,
    }
}

/// Every path below `/auth/`. A bare `/auth` is not an auth page.
#[must_use]
pub fn is_auth_path(path: &str) -> bool {
    path.starts_with(AUTH_PREFIX)
}

/// Whether the guard runs for `path` at all. API routes and static assets
/// always pass; every other path is a page.
#[must_use]
pub fn is_guarded(path: &str) -> bool {
    !UNGUARDED_PREFIXES.iter().any(|prefix| is_under(path, prefix))
}

/// Decide a navigation to `path` carrying `cookie_token`.
#[must_use]
pub fn evaluate(cookie_token: Option<&str>, path: &str) -> GuardDecision {
    if !is_guarded(path) {
        return GuardDecision::Allow;
    }
    let has_token = cookie_token.is_some_and(|token| !token.is_empty());
    decide(has_token, is_auth_path(path))
}

fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Axum middleware applying [`evaluate`] to the request's session cookie.
///
/// Install with `axum::middleware::from_fn(route_guard)`.
pub async fn route_guard(jar: CookieJar, request: Request, next: Next) -> Response {
    let token = jar.get(SESSION_COOKIE).map(Cookie::value);
    match evaluate(token, request.uri().path()) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(target) => {
            tracing::debug!(path = %request.uri().path(), %target, "route guard redirect");
            Redirect::temporary(target).into_response()
        }
    }
}
