// ============================================================================
// SSG Infrastructure - PostgreSQL User Repository
// File: crates/ssg-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================
//! Users and their embedded sessions. Sessions live in the `sessions` JSONB
//! column of the user row; renewal and pruning rewrite that column inside a
//! single statement or under a row lock, so writes to other elements are
//! never lost.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};

use ssg_core::domain::{Session, User};
use ssg_core::error::DomainError;
use ssg_core::repositories::{SessionRepository, UserRepository};

use super::{is_unique_violation, store_error};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct UserRow {
    username: String,
    display_name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    sessions: Json<Vec<Session>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            username: row.username,
            display_name: row.display_name,
            password_hash: row.password_hash,
            created_at: row.created_at,
            sessions: row.sessions.0,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT username, display_name, password_hash, created_at, sessions
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("finding user by username", e))?;

        Ok(row.map(User::from))
    }

    async fn insert(&self, user: &User) -> Result<(), DomainError> {
        info!("Creating user: {}", user.username);

        sqlx::query(
            r#"
            INSERT INTO users (username, display_name, password_hash, created_at, sessions)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(Json(&user.sessions))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::DuplicateUsername(user.username.clone())
            } else {
                store_error("creating user", e)
            }
        })?;

        Ok(())
    }

    async fn update_password_hash(&self, username: &str, password_hash: &str) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE username = $1")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("updating password hash", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for PgUserRepository {
    async fn list_sessions(&self, username: &str) -> Result<Option<Vec<Session>>, DomainError> {
        let sessions: Option<Json<Vec<Session>>> =
            sqlx::query_scalar("SELECT sessions FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| store_error("listing sessions", e))?;

        Ok(sessions.map(|s| s.0))
    }

    async fn replace_sessions(&self, username: &str, sessions: &[Session]) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET sessions = $2 WHERE username = $1")
            .bind(username)
            .bind(Json(sessions))
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("replacing sessions", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }
        Ok(())
    }

    async fn renew_session(
        &self,
        username: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        // SET is evaluated against the row version the UPDATE locked, so a
        // concurrent append or removal on the same row is preserved. Only the
        // lowest-ordinal match is renewed.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET sessions = (
                SELECT jsonb_agg(
                    CASE WHEN ord = (
                            SELECT MIN(o)
                            FROM jsonb_array_elements(sessions) WITH ORDINALITY AS m(e, o)
                            WHERE e->>'token' = $2
                        )
                        THEN jsonb_set(elem, '{expires_at}', $3)
                        ELSE elem
                    END
                    ORDER BY ord
                )
                FROM jsonb_array_elements(sessions) WITH ORDINALITY AS t(elem, ord)
            )
            WHERE username = $1
              AND sessions @> jsonb_build_array(jsonb_build_object('token', $2::text))
            "#,
        )
        .bind(username)
        .bind(token)
        .bind(Json(expires_at))
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("renewing session", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_sessions(&self, username: &str, tokens: &[String]) -> Result<u64, DomainError> {
        if tokens.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("starting session removal", e))?;

        let current: Option<Json<Vec<Session>>> =
            sqlx::query_scalar("SELECT sessions FROM users WHERE username = $1 FOR UPDATE")
                .bind(username)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| store_error("locking sessions", e))?;

        let Some(Json(mut sessions)) = current else {
            return Err(DomainError::UserNotFound);
        };

        let before = sessions.len();
        sessions.retain(|s| !tokens.contains(&s.token));
        let removed = (before - sessions.len()) as u64;

        if removed > 0 {
            sqlx::query("UPDATE users SET sessions = $2 WHERE username = $1")
                .bind(username)
                .bind(Json(&sessions))
                .execute(&mut *tx)
                .await
                .map_err(|e| store_error("removing sessions", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| store_error("committing session removal", e))?;

        debug!("Removed {} sessions for {}", removed, username);
        Ok(removed)
    }

    async fn remove_all_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        // `locked` re-reads each candidate row at its latest version, so the
        // count is taken from the same list the UPDATE rewrites.
        let removed: i64 = sqlx::query_scalar(
            r#"
            WITH locked AS (
                SELECT u.username, jsonb_array_length(u.sessions) AS before
                FROM users u
                WHERE EXISTS (
                    SELECT 1 FROM jsonb_array_elements(u.sessions) AS elem
                    WHERE (elem->>'expires_at')::timestamptz <= $1
                )
                FOR UPDATE
            ), swept AS (
                UPDATE users u
                SET sessions = COALESCE((
                    SELECT jsonb_agg(e ORDER BY ord)
                    FROM jsonb_array_elements(u.sessions) WITH ORDINALITY AS t(e, ord)
                    WHERE (e->>'expires_at')::timestamptz > $1
                ), '[]'::jsonb)
                FROM locked
                WHERE u.username = locked.username
                RETURNING locked.before - jsonb_array_length(u.sessions) AS n
            )
            SELECT COALESCE(SUM(n), 0)::BIGINT FROM swept
            "#,
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("sweeping expired sessions", e))?;

        Ok(removed.max(0) as u64)
    }

    async fn token_in_use(&self, token: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE sessions @> jsonb_build_array(jsonb_build_object('token', $1::text))
            )
            "#,
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("checking token", e))
    }
}
