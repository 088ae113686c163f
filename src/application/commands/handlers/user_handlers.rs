//! User Command Handlers

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{CreateUser, DeleteUser, PatchUser, UpdateUser};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    OrderReference, OrderStorePort, PasswordHasherPort, UserRepositoryPort,
};
use crate::domain::identity::{validate_raw_password, Role, User};

impl From<UpdateUser> for PatchUser {
    fn from(command: UpdateUser) -> Self {
        Self {
            id: command.id,
            name: Some(command.name),
            surname: Some(command.surname),
            username: Some(command.username),
            email: Some(command.email),
            password: command.password,
            roles: command.roles,
        }
    }
}

// ============================================================================
// CreateUser
// ============================================================================

pub struct CreateUserHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    hasher: Arc<dyn PasswordHasherPort>,
}

impl CreateUserHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>, hasher: Arc<dyn PasswordHasherPort>) -> Self {
        Self { user_repo, hasher }
    }

    pub async fn handle(&self, command: CreateUser) -> Result<User, ApplicationError> {
        validate_raw_password("password", &command.password)?;

        let now = Utc::now();
        let mut user = User {
            id: Uuid::new_v4(),
            name: command.name.trim().to_string(),
            surname: command.surname.trim().to_string(),
            username: command.username.trim().to_string(),
            email: command.email.trim().to_string(),
            password_hash: String::new(),
            roles: command
                .roles
                .unwrap_or_else(|| [Role::User].into_iter().collect()),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        user.validate()?;
        user.password_hash = self.hasher.hash(&command.password)?;

        self.user_repo.insert(&user).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User created");

        Ok(user)
    }
}

// ============================================================================
// UpdateUser / PatchUser
// ============================================================================

/// 整体更新与部分更新共用同一流程
pub struct UpdateUserHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    hasher: Arc<dyn PasswordHasherPort>,
}

impl UpdateUserHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>, hasher: Arc<dyn PasswordHasherPort>) -> Self {
        Self { user_repo, hasher }
    }

    pub async fn handle(&self, command: UpdateUser) -> Result<User, ApplicationError> {
        self.handle_patch(command.into()).await
    }

    pub async fn handle_patch(&self, command: PatchUser) -> Result<User, ApplicationError> {
        let mut user = self
            .user_repo
            .find_by_id(command.id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| ApplicationError::not_found("User", command.id))?;

        if let Some(name) = command.name {
            user.name = name.trim().to_string();
        }
        if let Some(surname) = command.surname {
            user.surname = surname.trim().to_string();
        }
        if let Some(username) = command.username {
            user.username = username.trim().to_string();
        }
        if let Some(email) = command.email {
            user.email = email.trim().to_string();
        }
        if let Some(roles) = command.roles {
            user.roles = roles;
        }
        user.validate()?;

        if let Some(password) = command.password.filter(|p| !p.is_empty()) {
            validate_raw_password("password", &password)?;
            user.password_hash = self.hasher.hash(&password)?;
        }

        user.updated_at = Utc::now();
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.id, "User updated");

        Ok(user)
    }
}

// ============================================================================
// DeleteUser
// ============================================================================

/// 删除结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDeletion {
    /// 存在订单，仅标记删除
    Soft,
    /// 物理删除
    Hard,
}

pub struct DeleteUserHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    order_store: Arc<dyn OrderStorePort>,
}

impl DeleteUserHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>, order_store: Arc<dyn OrderStorePort>) -> Self {
        Self {
            user_repo,
            order_store,
        }
    }

    pub async fn handle(&self, command: DeleteUser) -> Result<UserDeletion, ApplicationError> {
        let mut user = self
            .user_repo
            .find_by_id(command.id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| ApplicationError::not_found("User", command.id))?;

        let has_orders = self
            .order_store
            .exists_by(OrderReference::User(user.id))
            .await?;

        let deletion = if has_orders {
            user.is_deleted = true;
            user.updated_at = Utc::now();
            self.user_repo.update(&user).await?;
            UserDeletion::Soft
        } else {
            self.user_repo.delete(user.id).await?;
            UserDeletion::Hard
        };

        tracing::info!(user_id = %user.id, ?deletion, "User deleted");

        Ok(deletion)
    }
}
