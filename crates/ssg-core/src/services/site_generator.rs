// ============================================================================
// SSG Core - Site Generator
// File: crates/ssg-core/src/services/site_generator.rs
// ============================================================================
//! Renders a user's posts to standalone HTML pages and pushes them to a
//! static host under the user's prefix.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use super::auth_gate::Principal;
use crate::domain::Post;
use crate::error::DomainError;
use crate::repositories::PostRepository;

/// Template data for one post page.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub pubdate: String,
    pub paragraphs: Vec<String>,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            pubdate: post.pubdate.format("%B %-d, %Y").to_string(),
            paragraphs: post.paragraphs(),
        }
    }
}

/// Template data for a user's generated index page.
#[derive(Debug, Clone, Serialize)]
pub struct IndexView {
    pub owner: String,
    pub display_name: String,
    pub posts: Vec<PostView>,
}

#[cfg_attr(test, mockall::automock)]
pub trait PageRenderer: Send + Sync {
    fn render_post(&self, view: &PostView) -> Result<String, DomainError>;
    fn render_index(&self, view: &IndexView) -> Result<String, DomainError>;
}

/// Destination for generated pages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StaticHost: Send + Sync {
    /// Store `text` as `{prefix}/{name}` and return where it landed.
    async fn save(&self, text: &str, name: &str, prefix: &str) -> Result<String, DomainError>;
}

pub struct SiteGenerator {
    posts: Arc<dyn PostRepository>,
    renderer: Arc<dyn PageRenderer>,
    host: Arc<dyn StaticHost>,
}

impl SiteGenerator {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        renderer: Arc<dyn PageRenderer>,
        host: Arc<dyn StaticHost>,
    ) -> Self {
        Self {
            posts,
            renderer,
            host,
        }
    }

    /// Publish every post of the principal plus an index page. Returns the
    /// number of post pages written.
    pub async fn generate(&self, principal: &Principal) -> Result<usize, DomainError> {
        let owner = principal.username();
        let posts = self.posts.find_by_owner(owner).await?;
        let views: Vec<PostView> = posts.iter().map(PostView::from).collect();

        for view in &views {
            let html = self.renderer.render_post(view)?;
            let location = self.host.save(&html, &format!("{}.html", view.slug), owner).await?;
            debug!(%location, "Page written");
        }

        let index = IndexView {
            owner: owner.to_string(),
            display_name: principal.user.display_name.clone(),
            posts: views,
        };
        let html = self.renderer.render_index(&index)?;
        self.host.save(&html, "index.html", owner).await?;

        info!(owner = %owner, pages = index.posts.len(), "Site generated");
        Ok(index.posts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PostDraft, User};
    use crate::repositories::MockPostRepository;
    use chrono::{NaiveDate, Utc};
    use mockall::predicate::*;

    fn principal() -> Principal {
        Principal {
            user: User::new("alice".into(), "Alice".into(), "hash".into(), Utc::now()).unwrap(),
            token: "t".into(),
        }
    }

    fn post(slug: &str) -> Post {
        Post::from_draft(
            "alice",
            slug.into(),
            PostDraft {
                title: slug.into(),
                subtitle: String::new(),
                author: "Alice".into(),
                content: "one\n\ntwo".into(),
                pubdate: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            },
        )
    }

    #[test]
    fn test_post_view_formats_date_and_paragraphs() {
        let view = PostView::from(&post("a"));
        assert_eq!(view.pubdate, "January 2, 2024");
        assert_eq!(view.paragraphs, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_generate_pushes_each_post_under_owner_prefix() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_by_owner()
            .with(eq("alice"))
            .returning(|_| Ok(vec![post("a"), post("b")]));

        let mut renderer = MockPageRenderer::new();
        renderer
            .expect_render_post()
            .times(2)
            .returning(|v| Ok(format!("<h1>{}</h1>", v.title)));
        renderer
            .expect_render_index()
            .withf(|v: &IndexView| v.posts.len() == 2)
            .times(1)
            .returning(|_| Ok("<ul></ul>".into()));

        let mut host = MockStaticHost::new();
        host.expect_save()
            .with(eq("<h1>a</h1>"), eq("a.html"), eq("alice"))
            .times(1)
            .returning(|_, n, p| Ok(format!("{}/{}", p, n)));
        host.expect_save()
            .with(eq("<h1>b</h1>"), eq("b.html"), eq("alice"))
            .times(1)
            .returning(|_, n, p| Ok(format!("{}/{}", p, n)));
        host.expect_save()
            .with(always(), eq("index.html"), eq("alice"))
            .times(1)
            .returning(|_, n, p| Ok(format!("{}/{}", p, n)));

        let generator = SiteGenerator::new(Arc::new(repo), Arc::new(renderer), Arc::new(host));
        assert_eq!(generator.generate(&principal()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_host_failure_surfaces() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_by_owner().returning(|_| Ok(vec![post("a")]));
        let mut renderer = MockPageRenderer::new();
        renderer.expect_render_post().returning(|_| Ok(String::new()));
        let mut host = MockStaticHost::new();
        host.expect_save()
            .returning(|_, _, _| Err(DomainError::Host("disk full".into())));

        let generator = SiteGenerator::new(Arc::new(repo), Arc::new(renderer), Arc::new(host));
        let result = generator.generate(&principal()).await;
        assert!(matches!(result, Err(DomainError::Host(_))));
    }
}
