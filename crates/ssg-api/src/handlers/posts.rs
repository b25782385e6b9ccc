// ============================================================================
// SSG API - Post Handlers
// File: crates/ssg-api/src/handlers/posts.rs
// ============================================================================
//! Post listing, viewing, editing and site generation. Every route here sits
//! behind the session gate.

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Extension, Form,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use ssg_core::domain::PostDraft;
use ssg_core::services::{Principal, PostView};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: String,
    /// `YYYY-MM-DD`; today when empty.
    #[serde(default)]
    pub pubdate: String,
}

impl TryFrom<PostForm> for PostDraft {
    type Error = ApiError;

    fn try_from(form: PostForm) -> Result<Self, Self::Error> {
        let pubdate = match form.pubdate.trim() {
            "" => Utc::now().date_naive(),
            raw => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ApiError::BadRequest(format!("invalid publish date: {}", raw)))?,
        };
        Ok(PostDraft {
            title: form.title,
            subtitle: form.subtitle,
            author: form.author,
            content: form.content,
            pubdate,
        })
    }
}

/// GET /post/
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Html<String>, ApiError> {
    let posts = state.posts.list_for(principal.username()).await?;
    let views: Vec<PostView> = posts.iter().map(PostView::from).collect();

    state.pages.page(
        "post_list",
        &json!({ "title": "Your posts", "username": principal.username(), "posts": views }),
    )
}

/// GET /post/{slug}
pub async fn view(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(slug): Path<String>,
) -> Result<Html<String>, ApiError> {
    let post = state.posts.get(&slug).await?;
    let owned = post.is_owned_by(principal.username());

    state.pages.page(
        "post_view",
        &json!({
            "title": post.title,
            "username": principal.username(),
            "post": PostView::from(&post),
            "owned": owned,
        }),
    )
}

/// GET /new/
pub async fn new_form(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Html<String>, ApiError> {
    state.pages.page(
        "post_edit",
        &json!({
            "title": "New post",
            "username": principal.username(),
            "action": "/new/",
            "post": {
                "author": principal.user.display_name,
                "pubdate": Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            },
        }),
    )
}

/// POST /new/
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Form(form): Form<PostForm>,
) -> Result<Redirect, ApiError> {
    let post = state.posts.create(&principal, form.try_into()?).await?;
    Ok(Redirect::to(&format!("/post/{}", post.slug)))
}

/// GET /edit/{slug}
pub async fn edit_form(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(slug): Path<String>,
) -> Result<Html<String>, ApiError> {
    let post = state.posts.get_for_edit(&principal, &slug).await?;

    state.pages.page(
        "post_edit",
        &json!({
            "title": format!("Edit {}", post.title),
            "username": principal.username(),
            "action": format!("/save/{}", post.slug),
            "post": {
                "title": post.title,
                "subtitle": post.subtitle,
                "author": post.author,
                "content": post.content,
                "pubdate": post.pubdate.format("%Y-%m-%d").to_string(),
            },
        }),
    )
}

/// POST /save/{slug}
pub async fn save(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(slug): Path<String>,
    Form(form): Form<PostForm>,
) -> Result<Redirect, ApiError> {
    let post = state.posts.save(&principal, &slug, form.try_into()?).await?;
    Ok(Redirect::to(&format!("/post/{}", post.slug)))
}

/// POST /generate/
pub async fn generate(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Redirect, ApiError> {
    let pages = state.generator.generate(&principal).await?;
    info!("Generated {} pages for {}", pages, principal.username());
    Ok(Redirect::to(&format!("/static/{}/", principal.username())))
}
