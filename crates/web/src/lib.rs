//! HTML front end for Warbler.
//!
//! This crate provides the server-rendered site:
//!
//! - **Endpoints**: signup/login, profiles, follows, messages, home feed
//! - **Extractors**: the logged-in user resolved from the session cookie
//! - **Middleware**: session loading and the HTML 404 page
//! - **Templates**: minijinja templates compiled into the binary
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod session;
pub mod templates;

use axum::{Router, middleware::from_fn_with_state};

pub use middleware::AppState;
pub use templates::Templates;

/// Build the site router with session handling and error pages applied.
pub fn router(state: AppState) -> Router {
    endpoints::router()
        .layer(from_fn_with_state(state.clone(), middleware::session_middleware))
        .layer(from_fn_with_state(state.clone(), middleware::error_pages))
        .with_state(state)
}
