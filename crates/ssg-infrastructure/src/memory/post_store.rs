//! In-memory post store

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use ssg_core::domain::Post;
use ssg_core::error::DomainError;
use ssg_core::repositories::PostRepository;

#[derive(Default)]
pub struct MemoryPostStore {
    posts: DashMap<String, Post>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for MemoryPostStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        Ok(self.posts.get(slug).map(|p| p.clone()))
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Post>, DomainError> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| p.is_owned_by(owner))
            .map(|p| p.clone())
            .collect();
        posts.sort_by(|a, b| b.pubdate.cmp(&a.pubdate).then_with(|| a.slug.cmp(&b.slug)));
        Ok(posts)
    }

    async fn insert(&self, post: &Post) -> Result<(), DomainError> {
        match self.posts.entry(post.slug.clone()) {
            Entry::Occupied(_) => Err(DomainError::PostAlreadyExists(post.slug.clone())),
            Entry::Vacant(slot) => {
                slot.insert(post.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, post: &Post) -> Result<(), DomainError> {
        let mut stored = self
            .posts
            .get_mut(&post.slug)
            .ok_or_else(|| DomainError::PostNotFound(post.slug.clone()))?;
        *stored = post.clone();
        Ok(())
    }
}
