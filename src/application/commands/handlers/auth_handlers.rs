//! Auth Command Handlers

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{SignIn, SignUp};
use crate::application::error::ApplicationError;
use crate::application::ports::{PasswordHasherPort, TokenServicePort, UserRepositoryPort};
use crate::domain::identity::{validate_raw_password, Role, User};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

// ============================================================================
// SignUp
// ============================================================================

/// 注册并返回访问 Token
pub struct SignUpHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    hasher: Arc<dyn PasswordHasherPort>,
    tokens: Arc<dyn TokenServicePort>,
}

impl SignUpHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        hasher: Arc<dyn PasswordHasherPort>,
        tokens: Arc<dyn TokenServicePort>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            tokens,
        }
    }

    pub async fn handle(&self, command: SignUp) -> Result<String, ApplicationError> {
        if command.password != command.password_repeat {
            return Err(ApplicationError::invalid_field(
                "password_repeat",
                "passwords do not match",
            ));
        }
        validate_raw_password("password", &command.password)?;

        let now = Utc::now();
        let mut user = User {
            id: Uuid::new_v4(),
            name: command.name.trim().to_string(),
            surname: command.surname.trim().to_string(),
            username: command.username.trim().to_string(),
            email: command.email.trim().to_string(),
            password_hash: String::new(),
            roles: [Role::User].into_iter().collect(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        user.validate()?;
        user.password_hash = self.hasher.hash(&command.password)?;

        self.user_repo.insert(&user).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

        Ok(self.tokens.issue(&user)?)
    }
}

// ============================================================================
// SignIn
// ============================================================================

/// 校验用户名密码并返回访问 Token
pub struct SignInHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    hasher: Arc<dyn PasswordHasherPort>,
    tokens: Arc<dyn TokenServicePort>,
}

impl SignInHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        hasher: Arc<dyn PasswordHasherPort>,
        tokens: Arc<dyn TokenServicePort>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            tokens,
        }
    }

    pub async fn handle(&self, command: SignIn) -> Result<String, ApplicationError> {
        let user = self
            .user_repo
            .find_by_username(command.username.trim())
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| ApplicationError::unauthorized(INVALID_CREDENTIALS))?;

        if !self.hasher.verify(&command.password, &user.password_hash)? {
            tracing::warn!(username = %user.username, "Sign in rejected: wrong password");
            return Err(ApplicationError::unauthorized(INVALID_CREDENTIALS));
        }

        tracing::info!(user_id = %user.id, username = %user.username, "User signed in");

        Ok(self.tokens.issue(&user)?)
    }
}
