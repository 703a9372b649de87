//! Signup, login and logout.

use axum::{
    Form, Router,
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::SignedCookieJar;
use minijinja::context;
use serde::Deserialize;
use warbler_common::{AppError, AppResult};
use warbler_core::SignupInput;

use crate::{middleware::AppState, response::redirect, session};

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

async fn signup_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    state.templates.render("users/signup.html", context! {})
}

/// Create a user and log them in.
///
/// A taken username or email re-renders the form instead of failing.
async fn signup(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(input): Form<SignupInput>,
) -> AppResult<Response> {
    let username = input.username.clone();
    let email = input.email.clone();

    let error = match state.user_service.signup(input).await {
        Ok(Some(user)) => {
            let jar = session::login(jar, &state, &user.id);
            return Ok((jar, redirect("/")).into_response());
        }
        Ok(None) => "Username or email already taken".to_string(),
        Err(AppError::Validation(msg)) => msg,
        Err(e) => return Err(e),
    };

    Ok(state
        .templates
        .render(
            "users/signup.html",
            context! { error => error, username => username, email => email },
        )?
        .into_response())
}

async fn login_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    state.templates.render("users/login.html", context! {})
}

/// Check credentials and start a session.
async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match state
        .user_service
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User logged in");
            let jar = session::login(jar, &state, &user.id);
            Ok((jar, redirect("/")).into_response())
        }
        Err(AppError::Unauthorized) => Ok(state
            .templates
            .render(
                "users/login.html",
                context! { error => "Invalid credentials", username => form.username },
            )?
            .into_response()),
        Err(e) => Err(e),
    }
}

/// End the session.
async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    (session::logout(jar, &state), redirect("/login")).into_response()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup_form).post(signup))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
}
