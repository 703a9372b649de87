//! Session cookie helpers.
//!
//! The session is a signed cookie whose value is the logged-in user's ID.

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};

use crate::middleware::AppState;

/// Log `user_id` in by setting the session cookie.
#[must_use]
pub fn login(jar: SignedCookieJar, state: &AppState, user_id: &str) -> SignedCookieJar {
    jar.add(
        Cookie::build((state.cookie_name.clone(), user_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Log out by removing the session cookie.
#[must_use]
pub fn logout(jar: SignedCookieJar, state: &AppState) -> SignedCookieJar {
    jar.remove(Cookie::build((state.cookie_name.clone(), String::new())).path("/"))
}
