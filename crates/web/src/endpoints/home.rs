//! Home page.

use axum::{Router, extract::State, response::Html, routing::get};
use minijinja::context;
use warbler_common::AppResult;

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::{MessageView, ProfileView},
};

/// Show the feed of followed users' messages, or the landing page.
async fn homepage(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<Html<String>> {
    let Some(user) = user else {
        return state.templates.render("home-anon.html", context! {});
    };

    let feed = state
        .message_service
        .messages_from_followed_users(&user.id)
        .await?;
    let profile = ProfileView::from(&state.user_service.get_profile(&user.id).await?);

    let messages: Vec<MessageView> = feed.iter().map(MessageView::from).collect();

    state.templates.render(
        "home.html",
        context! {
            current_user => profile.user.clone(),
            profile => profile,
            messages => messages,
        },
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(homepage))
}
