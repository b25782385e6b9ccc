// ============================================================================
// SSG Core - Post Service
// File: crates/ssg-core/src/services/post_service.rs
// ============================================================================
//! Post CRUD with ownership checks.

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use super::auth_gate::Principal;
use crate::domain::{derive_slug, is_valid_slug, Post, PostDraft};
use crate::error::DomainError;
use crate::repositories::PostRepository;

pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    pub async fn list_for(&self, owner: &str) -> Result<Vec<Post>, DomainError> {
        self.posts.find_by_owner(owner).await
    }

    pub async fn get(&self, slug: &str) -> Result<Post, DomainError> {
        self.posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::PostNotFound(slug.to_string()))
    }

    /// Load a post for its editor. Only the owner may edit.
    pub async fn get_for_edit(&self, principal: &Principal, slug: &str) -> Result<Post, DomainError> {
        let post = self.get(slug).await?;
        ensure_owner(&post, principal)?;
        Ok(post)
    }

    pub async fn create(&self, principal: &Principal, draft: PostDraft) -> Result<Post, DomainError> {
        draft.validate()?;
        let slug = derive_slug(&draft.title, draft.pubdate);
        if !is_valid_slug(&slug) {
            return Err(DomainError::Validation(format!(
                "title does not produce a usable slug: {:?}",
                draft.title
            )));
        }
        self.insert(principal, slug, draft).await
    }

    /// Update the post at `slug` if the principal owns it, create it if it
    /// does not exist yet.
    pub async fn save(
        &self,
        principal: &Principal,
        slug: &str,
        draft: PostDraft,
    ) -> Result<Post, DomainError> {
        draft.validate()?;
        match self.posts.find_by_slug(slug).await? {
            Some(mut post) => {
                ensure_owner(&post, principal)?;
                post.apply(with_author(draft, principal));
                self.posts.update(&post).await?;
                info!(slug = %post.slug, owner = %post.owner_username, "Post updated");
                Ok(post)
            }
            None => {
                if !is_valid_slug(slug) {
                    return Err(DomainError::Validation(format!("invalid slug: {:?}", slug)));
                }
                self.insert(principal, slug.to_string(), draft).await
            }
        }
    }

    async fn insert(&self, principal: &Principal, slug: String, draft: PostDraft) -> Result<Post, DomainError> {
        let post = Post::from_draft(principal.username(), slug, with_author(draft, principal));
        self.posts.insert(&post).await?;
        info!(slug = %post.slug, owner = %post.owner_username, "Post created");
        Ok(post)
    }
}

fn ensure_owner(post: &Post, principal: &Principal) -> Result<(), DomainError> {
    if post.is_owned_by(principal.username()) {
        Ok(())
    } else {
        warn!(slug = %post.slug, username = %principal.username(), "Post access denied");
        Err(DomainError::Forbidden(format!("post {} belongs to another user", post.slug)))
    }
}

/// Posts without an explicit author are credited to the user's display name.
fn with_author(mut draft: PostDraft, principal: &Principal) -> PostDraft {
    if draft.author.trim().is_empty() {
        draft.author = principal.user.display_name.clone();
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::repositories::MockPostRepository;
    use chrono::{NaiveDate, Utc};

    fn principal(name: &str) -> Principal {
        Principal {
            user: User::new(name.into(), String::new(), "hash".into(), Utc::now()).unwrap(),
            token: "t".into(),
        }
    }

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.into(),
            subtitle: String::new(),
            author: String::new(),
            content: "Hello\n\nWorld".into(),
            pubdate: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        }
    }

    fn post_of(owner: &str, slug: &str) -> Post {
        Post::from_draft(owner, slug.into(), draft("Existing"))
    }

    #[tokio::test]
    async fn test_create_derives_slug_and_author() {
        let mut repo = MockPostRepository::new();
        repo.expect_insert()
            .withf(|p: &Post| p.slug == "first-post-2024-05-01" && p.author == "alice")
            .times(1)
            .returning(|_| Ok(()));
        let service = PostService::new(Arc::new(repo));

        let post = service.create(&principal("alice"), draft("First Post")).await.unwrap();
        assert_eq!(post.owner_username, "alice");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let mut repo = MockPostRepository::new();
        repo.expect_insert().never();
        let service = PostService::new(Arc::new(repo));

        let result = service.create(&principal("alice"), draft("")).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_save_foreign_post_is_forbidden() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_by_slug()
            .returning(|slug| Ok(Some(post_of("bob", slug))));
        repo.expect_update().never();
        let service = PostService::new(Arc::new(repo));

        let result = service.save(&principal("alice"), "bobs-post", draft("Mine now")).await;
        assert!(matches!(result, Err(DomainError::Forbidden(_))));
        let result = service.get_for_edit(&principal("alice"), "bobs-post").await;
        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_save_updates_own_post_keeping_slug() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_by_slug()
            .returning(|slug| Ok(Some(post_of("alice", slug))));
        repo.expect_update()
            .withf(|p: &Post| p.slug == "my-post" && p.title == "Renamed")
            .times(1)
            .returning(|_| Ok(()));
        let service = PostService::new(Arc::new(repo));

        let post = service.save(&principal("alice"), "my-post", draft("Renamed")).await.unwrap();
        assert_eq!(post.slug, "my-post");
    }

    #[tokio::test]
    async fn test_save_missing_creates() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_by_slug().returning(|_| Ok(None));
        repo.expect_insert().times(1).returning(|_| Ok(()));
        let service = PostService::new(Arc::new(repo));

        let post = service.save(&principal("alice"), "fresh-2024-05-01", draft("Fresh")).await.unwrap();
        assert_eq!(post.slug, "fresh-2024-05-01");

        let result = service.save(&principal("alice"), "../escape", draft("Fresh")).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_missing_post() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_by_slug().returning(|_| Ok(None));
        let service = PostService::new(Arc::new(repo));

        let result = service.get("nope").await;
        assert!(matches!(result, Err(DomainError::PostNotFound(_))));
    }
}
