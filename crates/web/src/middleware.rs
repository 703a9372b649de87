//! Application state and request middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRef, State},
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use sea_orm::DatabaseConnection;
use warbler_common::{AppError, AppResult, config::SessionConfig};
use warbler_core::{FollowingService, MessageService, UserService};
use warbler_db::repositories::{FollowsRepository, MessageRepository, UserRepository};

use crate::templates::Templates;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub following_service: FollowingService,
    pub message_service: MessageService,
    pub templates: Templates,
    /// Key signing the session cookie.
    pub cookie_key: Key,
    /// Name of the session cookie holding the current user's ID.
    pub cookie_name: String,
}

impl AppState {
    /// Wire repositories and services over a database connection.
    pub fn new(db: Arc<DatabaseConnection>, session: &SessionConfig) -> AppResult<Self> {
        let cookie_key = Key::try_from(session.secret.as_bytes()).map_err(|e| {
            AppError::Config(format!("session.secret is unusable as a signing key: {e}"))
        })?;

        let user_repo = UserRepository::new(Arc::clone(&db));
        let message_repo = MessageRepository::new(Arc::clone(&db));
        let follows_repo = FollowsRepository::new(db);

        Ok(Self {
            user_service: UserService::new(
                user_repo.clone(),
                message_repo.clone(),
                follows_repo.clone(),
            ),
            following_service: FollowingService::new(follows_repo.clone(), user_repo.clone()),
            message_service: MessageService::new(message_repo, user_repo, follows_repo),
            templates: Templates::new()?,
            cookie_key,
            cookie_name: session.cookie_name.clone(),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Session middleware.
///
/// Resolves the signed session cookie to a user and stores it in the request
/// extensions for the extractors. A cookie naming a user that no longer
/// exists is treated as no session; a failed lookup fails the request.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(&state.cookie_name) {
        match state.user_service.find(cookie.value()).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => {
                tracing::debug!(user_id = %cookie.value(), "Session refers to a missing user");
            }
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}

/// Replace bare 404 responses with the rendered not-found page.
pub async fn error_pages(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    if response.status() != StatusCode::NOT_FOUND || is_html(&response) {
        return response;
    }

    match state.templates.render("404.html", minijinja::context! {}) {
        Ok(page) => (StatusCode::NOT_FOUND, page).into_response(),
        Err(e) => e.into_response(),
    }
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"))
}
