//! Session gate for protected routes
//!
//! Reads the `user` and `sessionid` cookies, asks the [`AuthGate`] to admit
//! the request, and hands the admitted [`Principal`] to the handler through
//! request extensions.
//!
//! [`AuthGate`]: ssg_core::services::AuthGate

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use ssg_core::services::Principal;
use ssg_shared::constants::{SESSION_COOKIE, USER_COOKIE};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Run the gate over the request cookies without rejecting anything.
pub(crate) async fn admit_cookies(state: &AppState, jar: &CookieJar) -> Result<Principal, ApiError> {
    let identity = jar.get(USER_COOKIE).map(|c| c.value());
    let token = jar.get(SESSION_COOKIE).map(|c| c.value());
    Ok(state.gate.admit(identity, token).await?)
}

pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = admit_cookies(&state, &jar).await?;
    debug!("Admitted {} to {}", principal.username(), request.uri().path());

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
