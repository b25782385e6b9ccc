//! Handlebars page rendering
//!
//! Templates are compiled into the binary. The editor pages and the
//! generated site pages share one layout.

use axum::response::Html;
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;
use ssg_core::error::DomainError;
use ssg_core::services::{IndexView, PageRenderer, PostView};

use crate::error::ApiError;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout", include_str!("../templates/layout.hbs")),
    ("signin", include_str!("../templates/signin.hbs")),
    ("signup", include_str!("../templates/signup.hbs")),
    ("changepwd", include_str!("../templates/changepwd.hbs")),
    ("post_list", include_str!("../templates/post_list.hbs")),
    ("post_view", include_str!("../templates/post_view.hbs")),
    ("post_edit", include_str!("../templates/post_edit.hbs")),
    ("site_post", include_str!("../templates/site_post.hbs")),
    ("site_index", include_str!("../templates/site_index.hbs")),
];

pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    pub fn new() -> Result<Self, ApiError> {
        let mut registry = Handlebars::new();
        for (name, source) in TEMPLATES {
            registry
                .register_template_string(name, *source)
                .map_err(|e| ApiError::Template(format!("{}: {}", name, e)))?;
        }
        Ok(Self { registry })
    }

    /// Render an editor page.
    pub fn page<T: Serialize>(&self, name: &str, data: &T) -> Result<Html<String>, ApiError> {
        self.registry
            .render(name, data)
            .map(Html)
            .map_err(|e| ApiError::Template(format!("{}: {}", name, e)))
    }
}

impl PageRenderer for HandlebarsRenderer {
    fn render_post(&self, view: &PostView) -> Result<String, DomainError> {
        self.registry
            .render("site_post", view)
            .map_err(|e| DomainError::Render(e.to_string()))
    }

    fn render_index(&self, view: &IndexView) -> Result<String, DomainError> {
        let data = json!({
            "title": format!("{}'s posts", view.display_name),
            "posts": view.posts,
        });
        self.registry
            .render("site_index", &data)
            .map_err(|e| DomainError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> PostView {
        PostView {
            slug: "hello-2024-01-02".into(),
            title: "Hello <World>".into(),
            subtitle: String::new(),
            author: "Alice".into(),
            pubdate: "January 2, 2024".into(),
            paragraphs: vec!["First".into(), "Second".into()],
        }
    }

    #[test]
    fn test_site_post_escapes_and_splits_paragraphs() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let html = renderer.render_post(&view()).unwrap();
        assert!(html.contains("Hello &lt;World&gt;"));
        assert!(html.contains("<p>First</p>"));
        assert!(html.contains("<p>Second</p>"));
        assert!(!html.contains("<nav>"));
    }

    #[test]
    fn test_site_index_links_pages() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let html = renderer
            .render_index(&IndexView {
                owner: "alice".into(),
                display_name: "Alice".into(),
                posts: vec![view()],
            })
            .unwrap();
        assert!(html.contains(r#"href="hello-2024-01-02.html""#));
    }

    #[test]
    fn test_editor_page_shows_nav_when_signed_in() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let Html(html) = renderer
            .page("post_list", &json!({ "title": "Posts", "username": "alice", "posts": [] }))
            .unwrap();
        assert!(html.contains("<nav>"));
        assert!(html.contains("No posts yet"));
    }
}
