// ============================================================================
// SSG API - Auth Handlers
// File: crates/ssg-api/src/handlers/auth.rs
// ============================================================================
//! Sign-in, sign-up, sign-out and password change

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use ssg_core::error::DomainError;
use ssg_core::services::Principal;
use ssg_shared::constants::{SESSION_COOKIE, USER_COOKIE};
use tracing::debug;

use crate::error::ApiError;
use crate::middleware::admit_cookies;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

fn auth_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

/// Render `template`, or send an already signed-in caller to /changepwd/.
async fn anonymous_page(
    state: &AppState,
    jar: &CookieJar,
    template: &str,
    title: &str,
) -> Result<Response, ApiError> {
    if let Ok(principal) = admit_cookies(state, jar).await {
        debug!("{} is already signed in", principal.username());
        return Ok(Redirect::to("/changepwd/").into_response());
    }
    Ok(state.pages.page(template, &json!({ "title": title }))?.into_response())
}

/// GET /signin/
pub async fn signin_form(State(state): State<AppState>, jar: CookieJar) -> Result<Response, ApiError> {
    anonymous_page(&state, &jar, "signin", "Sign in").await
}

/// POST /signin/
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignInForm>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let (user, token) = state.accounts.sign_in(&form.username, &form.password).await?;

    let jar = jar
        .add(auth_cookie(USER_COOKIE, user.username))
        .add(auth_cookie(SESSION_COOKIE, token));
    Ok((jar, Redirect::to("/changepwd/")))
}

/// GET /signup/
pub async fn signup_form(State(state): State<AppState>, jar: CookieJar) -> Result<Response, ApiError> {
    anonymous_page(&state, &jar, "signup", "Sign up").await
}

/// POST /signup/
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignUpForm>,
) -> Result<Redirect, ApiError> {
    if form.password != form.confirm_password {
        return Err(DomainError::PasswordMismatch.into());
    }
    state
        .accounts
        .create_user(&form.username, &form.password, &form.display_name)
        .await?;
    Ok(Redirect::to("/signin/"))
}

/// POST /signout/
pub async fn signout(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    state.accounts.sign_out(&principal).await?;

    let jar = jar
        .remove(expired_cookie(SESSION_COOKIE))
        .remove(expired_cookie(USER_COOKIE));
    Ok((jar, Redirect::to("/signin/")))
}

/// GET /changepwd/
pub async fn changepwd_form(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Html<String>, ApiError> {
    state.pages.page(
        "changepwd",
        &json!({ "title": "Change password", "username": principal.username() }),
    )
}

/// POST /changepwd/
pub async fn changepwd(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Html<String>, ApiError> {
    state
        .accounts
        .change_password(
            &principal,
            &form.old_password,
            &form.new_password,
            &form.confirm_password,
        )
        .await?;

    state.pages.page(
        "changepwd",
        &json!({
            "title": "Change password",
            "username": principal.username(),
            "message": "Password changed.",
        }),
    )
}
