//! User management service: application-layer orchestration
//!
//! All user-related business logic lives here.
//! HTTP handlers should be thin wrappers that delegate to this service.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use crate::config::AdminConfig;
use crate::domain::{
    CreateUserDto, DomainError, DomainResult, RepositoryProvider, Role, UpdateUserDto, User,
};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password_with_cost, verify_password};

const LOGIN_MISMATCH: &str = "The given email and password do not match";

/// Authentication result returned after a successful login or registration
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub user: User,
}

/// User service: orchestrates all identity / user-management use-cases.
pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
    bcrypt_cost: u32,
    max_auth_delay: Duration,
}

impl UserService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig) -> Self {
        Self {
            repos,
            jwt_config,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            max_auth_delay: Duration::ZERO,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Login and registration sleep a random duration up to `max` so that
    /// response times do not reveal which step failed.
    pub fn with_auth_delay(mut self, max: Duration) -> Self {
        self.max_auth_delay = max;
        self
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate by email + password and return a JWT.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        self.auth_delay().await;

        let Some(user) = self.repos.users().find_by_email(email).await? else {
            return Err(DomainError::Unauthorized(LOGIN_MISMATCH.into()));
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized(LOGIN_MISMATCH.into()));
        }

        let token = self.issue_token(&user)?;
        info!(user_id = user.id, "User logged in");
        Ok(AuthResult { token, user })
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a new user with the `USER` role and sign them in.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> DomainResult<AuthResult> {
        self.auth_delay().await;

        if self.repos.users().find_by_email(email).await?.is_some() {
            return Err(DomainError::Conflict(
                "There is already a user with this email address".into(),
            ));
        }

        let user = self
            .create_account(username, email, password, vec![Role::User])
            .await?;
        let token = self.issue_token(&user)?;

        info!(user_id = user.id, username = %user.username, "New user registered");
        Ok(AuthResult { token, user })
    }

    /// Create the configured admin account when no user exists yet.
    pub async fn seed_admin(&self, admin: &AdminConfig) -> DomainResult<Option<User>> {
        if self.repos.users().count().await? > 0 {
            return Ok(None);
        }

        let user = self
            .create_account(
                &admin.username,
                &admin.email,
                &admin.password,
                vec![Role::User, Role::Admin],
            )
            .await?;
        warn!(
            email = %user.email,
            "Seeded default admin account, change its password"
        );
        Ok(Some(user))
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get_all(&self) -> DomainResult<Vec<User>> {
        self.repos.users().find_all().await
    }

    pub async fn get_by_id(&self, id: i32) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(|| no_such_user(id))
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Update user profile fields (username, email).
    pub async fn update(&self, id: i32, dto: UpdateUserDto) -> DomainResult<User> {
        let user = self.repos.users().update(id, dto).await.map_err(|e| {
            if e.is_not_found() {
                no_such_user(id)
            } else {
                e
            }
        })?;
        info!(user_id = id, "User updated");
        Ok(user)
    }

    /// Delete a user. Their reservations go with them.
    pub async fn delete(&self, id: i32) -> DomainResult<()> {
        self.repos.users().delete(id).await.map_err(|e| {
            if e.is_not_found() {
                no_such_user(id)
            } else {
                e
            }
        })?;
        info!(user_id = id, "User deleted");
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        roles: Vec<Role>,
    ) -> DomainResult<User> {
        let password_hash = hash_password_with_cost(password, self.bcrypt_cost)
            .map_err(|e| DomainError::Storage(format!("Hashing failed: {}", e)))?;

        self.repos
            .users()
            .create(CreateUserDto {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                roles,
            })
            .await
    }

    fn issue_token(&self, user: &User) -> DomainResult<String> {
        create_token(user.id, &user.roles, &self.jwt_config)
            .map_err(|e| DomainError::Storage(format!("Token error: {}", e)))
    }

    async fn auth_delay(&self) {
        let max = self.max_auth_delay.as_millis() as u64;
        if max == 0 {
            return;
        }
        let millis = rand::thread_rng().gen_range(0..=max);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

pub(crate) fn no_such_user(id: i32) -> DomainError {
    DomainError::Missing(format!("There is no user with id {}.", id))
}
