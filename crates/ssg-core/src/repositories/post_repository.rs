//! Post repository trait (port)

use async_trait::async_trait;

use crate::domain::Post;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError>;

    /// Posts owned by `owner`, newest publish date first.
    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Post>, DomainError>;

    /// Fails with `PostAlreadyExists` on slug collision.
    async fn insert(&self, post: &Post) -> Result<(), DomainError>;

    /// Fails with `PostNotFound` when no post has this slug.
    async fn update(&self, post: &Post) -> Result<(), DomainError>;
}
