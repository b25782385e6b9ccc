// ============================================================================
// SSG Infrastructure - PostgreSQL Post Repository
// File: crates/ssg-infrastructure/src/database/postgres/post_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};

use ssg_core::domain::Post;
use ssg_core::error::DomainError;
use ssg_core::repositories::PostRepository;

use super::{is_unique_violation, store_error};

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    slug: String,
    owner_username: String,
    title: String,
    subtitle: String,
    author: String,
    content: String,
    pubdate: NaiveDate,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            owner_username: row.owner_username,
            title: row.title,
            subtitle: row.subtitle,
            author: row.author,
            content: row.content,
            slug: row.slug,
            pubdate: row.pubdate,
        }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        let row: Option<PostRow> = sqlx::query_as(
            r#"
            SELECT slug, owner_username, title, subtitle, author, content, pubdate
            FROM posts
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("finding post by slug", e))?;

        Ok(row.map(Post::from))
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Post>, DomainError> {
        let rows: Vec<PostRow> = sqlx::query_as(
            r#"
            SELECT slug, owner_username, title, subtitle, author, content, pubdate
            FROM posts
            WHERE owner_username = $1
            ORDER BY pubdate DESC, slug
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("listing posts", e))?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn insert(&self, post: &Post) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts (slug, owner_username, title, subtitle, author, content, pubdate)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&post.slug)
        .bind(&post.owner_username)
        .bind(&post.title)
        .bind(&post.subtitle)
        .bind(&post.author)
        .bind(&post.content)
        .bind(post.pubdate)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::PostAlreadyExists(post.slug.clone())
            } else {
                store_error("creating post", e)
            }
        })?;

        Ok(())
    }

    async fn update(&self, post: &Post) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, subtitle = $3, author = $4, content = $5, pubdate = $6
            WHERE slug = $1
            "#,
        )
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.subtitle)
        .bind(&post.author)
        .bind(&post.content)
        .bind(post.pubdate)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("updating post", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::PostNotFound(post.slug.clone()));
        }
        Ok(())
    }
}
