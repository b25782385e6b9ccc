// ============================================================================
// SSG Core - Account Service
// File: crates/ssg-core/src/services/account_service.rs
// ============================================================================
//! Sign-up, sign-in, password change and sign-out.

use std::sync::Arc;

use ssg_security::password::validate_password;
use ssg_security::PasswordService;
use ssg_shared::Clock;
use tracing::{info, warn};

use super::auth_gate::Principal;
use super::bounded;
use super::session_service::SessionService;
use crate::domain::User;
use crate::error::DomainError;
use crate::repositories::UserRepository;

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<SessionService>,
    passwords: Arc<PasswordService>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<SessionService>,
        passwords: Arc<PasswordService>,
    ) -> Self {
        Self {
            users,
            sessions,
            passwords,
        }
    }

    /// Register a new user. The password policy is checked before anything
    /// is hashed or stored.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<User, DomainError> {
        let username = username.trim();
        info!("Sign-up attempt for username: {}", username);

        // 1. Shape checks
        User::validate_username(username)?;
        validate_password(password)?;

        // 2. Uniqueness
        if self.find(username).await?.is_some() {
            warn!("Sign-up failed: username taken: {}", username);
            return Err(DomainError::DuplicateUsername(username.to_string()));
        }

        // 3. Hash and insert
        let password_hash = self.hash(password).await?;
        let user = User::new(
            username.to_string(),
            display_name.to_string(),
            password_hash,
            self.clock().now(),
        )?;
        bounded(self.sessions.store_timeout(), "insert_user", self.users.insert(&user)).await?;

        info!("User created: {}", user.username);
        Ok(user)
    }

    /// Check credentials and open a session. Unknown users and wrong
    /// passwords fail identically and cost one bcrypt verification each.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<(User, String), DomainError> {
        let username = username.trim();
        info!("Sign-in attempt for username: {}", username);

        let Some(user) = self.find(username).await? else {
            self.burn_verification(password).await?;
            warn!("Sign-in failed for username: {}", username);
            return Err(DomainError::InvalidCredentials);
        };

        if !self.verify(password, &user.password_hash).await? {
            warn!("Sign-in failed for username: {}", username);
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.sessions.create_session(&user.username).await?;
        info!("Sign-in successful for username: {}", user.username);
        Ok((user, token))
    }

    pub async fn change_password(
        &self,
        principal: &Principal,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), DomainError> {
        // 1. Current password
        if !self.verify(old_password, &principal.user.password_hash).await? {
            warn!("Password change rejected for {}: wrong current password", principal.username());
            return Err(DomainError::InvalidCredentials);
        }

        // 2. Confirmation
        if new_password != confirm_password {
            return Err(DomainError::PasswordMismatch);
        }

        // 3. Policy, hash, persist
        validate_password(new_password)?;
        let password_hash = self.hash(new_password).await?;
        bounded(
            self.sessions.store_timeout(),
            "update_password_hash",
            self.users.update_password_hash(principal.username(), &password_hash),
        )
        .await?;

        info!("Password changed for {}", principal.username());
        Ok(())
    }

    /// End the session that authenticated this request.
    pub async fn sign_out(&self, principal: &Principal) -> Result<(), DomainError> {
        self.sessions
            .invalidate_session(principal.username(), &principal.token)
            .await?;
        info!("Signed out: {}", principal.username());
        Ok(())
    }

    fn clock(&self) -> &Arc<dyn Clock> {
        self.sessions.clock()
    }

    async fn find(&self, username: &str) -> Result<Option<User>, DomainError> {
        bounded(
            self.sessions.store_timeout(),
            "find_by_username",
            self.users.find_by_username(username),
        )
        .await
    }

    async fn hash(&self, password: &str) -> Result<String, DomainError> {
        let passwords = Arc::clone(&self.passwords);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?
            .map_err(DomainError::from)
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        let passwords = Arc::clone(&self.passwords);
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || passwords.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?
            .map_err(DomainError::from)
    }

    async fn burn_verification(&self, password: &str) -> Result<(), DomainError> {
        let passwords = Arc::clone(&self.passwords);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || passwords.verify_dummy(&password))
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))
    }
}
