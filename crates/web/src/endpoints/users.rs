//! User pages: listing, profiles, follows, profile editing and deletion.

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::SignedCookieJar;
use minijinja::context;
use serde::Deserialize;
use warbler_common::{AppError, AppResult};
use warbler_core::UpdateProfileInput;
use warbler_db::entities::user;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{MessageView, ProfileForm, ProfileView, UserView, redirect, user_views},
    session,
};

/// Maximum number of users listed on the index page.
const USER_LIST_LIMIT: u64 = 100;

/// User search query.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// IDs of the users the viewer follows, for rendering follow buttons.
async fn followed_ids(state: &AppState, viewer: Option<&user::Model>) -> AppResult<Vec<String>> {
    let Some(viewer) = viewer else {
        return Ok(vec![]);
    };

    Ok(state
        .following_service
        .following(&viewer.id)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect())
}

/// List users, optionally filtered by `?q=`.
async fn list_users(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let users = state
        .user_service
        .search(query.q.as_deref(), USER_LIST_LIMIT)
        .await?;
    let followed = followed_ids(&state, viewer.as_ref()).await?;

    state.templates.render(
        "users/index.html",
        context! {
            current_user => viewer.as_ref().map(UserView::from),
            users => user_views(&users),
            followed_ids => followed,
            q => query.q,
        },
    )
}

/// Profile page with the user's messages.
async fn show_user(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let summary = state.user_service.get_profile(&id).await?;

    let is_following = match viewer {
        Some(ref v) if v.id != id => state.following_service.is_following(&v.id, &id).await?,
        _ => false,
    };

    let messages: Vec<MessageView> = summary.messages.iter().map(MessageView::bare).collect();

    state.templates.render(
        "users/show.html",
        context! {
            current_user => viewer.as_ref().map(UserView::from),
            profile => ProfileView::from(&summary),
            is_following => is_following,
            messages => messages,
        },
    )
}

/// Users followed by `id`. Requires a session.
async fn show_following(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let summary = state.user_service.get_profile(&id).await?;
    let following = state.following_service.following(&id).await?;
    let followed = followed_ids(&state, Some(&viewer)).await?;
    let is_following = followed.contains(&id);

    state.templates.render(
        "users/following.html",
        context! {
            current_user => UserView::from(&viewer),
            profile => ProfileView::from(&summary),
            is_following => is_following,
            users => user_views(&following),
            followed_ids => followed,
        },
    )
}

/// Users following `id`.
async fn show_followers(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let summary = state.user_service.get_profile(&id).await?;
    let followers = state.following_service.followers(&id).await?;
    let followed = followed_ids(&state, viewer.as_ref()).await?;
    let is_following = followed.contains(&id);

    state.templates.render(
        "users/followers.html",
        context! {
            current_user => viewer.as_ref().map(UserView::from),
            profile => ProfileView::from(&summary),
            is_following => is_following,
            users => user_views(&followers),
            followed_ids => followed,
        },
    )
}

/// Follow `id` as the logged-in user.
async fn follow(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    state.following_service.follow(&viewer.id, &id).await?;
    Ok(redirect(&format!("/users/{}/following", viewer.id)))
}

/// Stop following `id`.
async fn stop_following(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    state.following_service.unfollow(&viewer.id, &id).await?;
    Ok(redirect(&format!("/users/{}/following", viewer.id)))
}

/// Profile edit form. Only the owner may open it.
async fn edit_profile_form(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    if viewer.id != id {
        return Ok(redirect("/"));
    }

    Ok(state
        .templates
        .render(
            "users/edit.html",
            context! {
                current_user => UserView::from(&viewer),
                user_id => viewer.id.clone(),
                form => ProfileForm::from(&viewer),
            },
        )?
        .into_response())
}

/// Apply a profile edit after re-checking the password.
async fn update_profile(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(input): Form<UpdateProfileInput>,
) -> AppResult<Response> {
    if viewer.id != id {
        tracing::debug!(user_id = %viewer.id, target = %id, "Refusing to edit another user's profile");
        return Ok(redirect("/"));
    }

    // Re-rendered on failure so the user keeps what they typed
    let form = ProfileForm::from(&input);

    let error = match state.user_service.update_profile(&id, input).await {
        Ok(user) => return Ok(redirect(&format!("/users/{}", user.id))),
        Err(AppError::Unauthorized) => "Wrong password, please try again".to_string(),
        Err(AppError::Conflict(msg) | AppError::Validation(msg)) => msg,
        Err(e) => return Err(e),
    };

    Ok(state
        .templates
        .render(
            "users/edit.html",
            context! {
                current_user => UserView::from(&viewer),
                user_id => viewer.id.clone(),
                form => form,
                error => error,
            },
        )?
        .into_response())
}

/// Delete the logged-in user's account and end the session.
async fn delete_user(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    state.user_service.delete_account(&viewer.id).await?;
    Ok((session::logout(jar, &state), redirect("/signup")).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(show_user))
        .route("/{id}/following", get(show_following))
        .route("/{id}/followers", get(show_followers))
        .route("/follow/{id}", post(follow))
        .route("/stop-following/{id}", post(stop_following))
        .route("/profile/{id}", get(edit_profile_form).post(update_profile))
        .route("/delete", post(delete_user))
}
