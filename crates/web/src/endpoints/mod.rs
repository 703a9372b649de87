//! Site endpoints.

mod auth;
mod home;
mod messages;
mod users;

use axum::Router;
use warbler_common::AppError;

use crate::middleware::AppState;

/// Create the site router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(home::router())
        .merge(auth::router())
        .nest("/users", users::router())
        .nest("/messages", messages::router())
        .fallback(not_found)
}

/// Anything unrouted; rendered as the 404 page by the error-page middleware.
async fn not_found() -> AppError {
    AppError::NotFound("No such page".to_string())
}
