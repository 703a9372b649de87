//! Message pages.

use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use minijinja::context;
use warbler_common::{AppError, AppResult};
use warbler_core::CreateMessageInput;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{MessageView, UserView, redirect},
};

async fn new_message_form(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Html<String>> {
    state.templates.render(
        "messages/new.html",
        context! { current_user => UserView::from(&viewer) },
    )
}

/// Post a message and go to the author's profile.
async fn create_message(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Form(input): Form<CreateMessageInput>,
) -> AppResult<Response> {
    let text = input.text.clone();

    match state.message_service.create(&viewer.id, input).await {
        Ok(_) => Ok(redirect(&format!("/users/{}", viewer.id))),
        Err(AppError::Validation(msg)) => Ok(state
            .templates
            .render(
                "messages/new.html",
                context! { current_user => UserView::from(&viewer), error => msg, text => text },
            )?
            .into_response()),
        Err(e) => Err(e),
    }
}

async fn show_message(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let item = state.message_service.get_with_author(&id).await?;

    state.templates.render(
        "messages/show.html",
        context! {
            current_user => viewer.as_ref().map(UserView::from),
            message => MessageView::from(&item),
        },
    )
}

/// Delete one of the logged-in user's messages.
async fn delete_message(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    state.message_service.delete(&viewer.id, &id).await?;
    Ok(redirect(&format!("/users/{}", viewer.id)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new", get(new_message_form).post(create_message))
        .route("/{id}", get(show_message))
        .route("/{id}/delete", post(delete_message))
}
