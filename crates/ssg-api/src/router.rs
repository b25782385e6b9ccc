//! Route table

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::handlers::{auth, health, posts};
use crate::middleware::require_session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/signin/", get(auth::signin_form).post(auth::signin))
        .route("/signup/", get(auth::signup_form).post(auth::signup));

    // Protected routes (session gate)
    let protected_routes = Router::new()
        .route("/signout/", post(auth::signout))
        .route("/changepwd/", get(auth::changepwd_form).post(auth::changepwd))
        .route("/", get(posts::list))
        .route("/post/", get(posts::list))
        .route("/post/{slug}", get(posts::view))
        .route("/new/", get(posts::new_form).post(posts::create))
        .route("/edit/{slug}", get(posts::edit_form))
        .route("/save/{slug}", post(posts::save))
        .route("/generate/", post(posts::generate))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/static", ServeDir::new(&state.site_root))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.request_timeout,
        ))
        .with_state(state)
}
