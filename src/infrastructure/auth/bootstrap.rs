//! Admin Bootstrap - 启动时创建管理员账户

use chrono::Utc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{PasswordHasherPort, UserRepositoryPort};
use crate::config::AdminAccountConfig;
use crate::domain::identity::{validate_raw_password, Role, User};

/// 账户已存在时不做修改，返回 false
pub async fn ensure_admin_account(
    user_repo: &dyn UserRepositoryPort,
    hasher: &dyn PasswordHasherPort,
    admin: &AdminAccountConfig,
) -> Result<bool, ApplicationError> {
    if let Some(existing) = user_repo.find_by_username(admin.username.trim()).await? {
        if !existing.is_admin() {
            tracing::warn!(username = %existing.username, "Configured admin account exists without ADMIN role");
        }
        return Ok(false);
    }

    validate_raw_password("password", &admin.password)?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: "Admin".to_string(),
        surname: "Admin".to_string(),
        username: admin.username.trim().to_string(),
        email: admin.email.trim().to_string(),
        password_hash: hasher.hash(&admin.password)?,
        roles: [Role::User, Role::Admin].into_iter().collect(),
        is_deleted: false,
        created_at: now,
        updated_at: now,
    };
    user.validate()?;
    user_repo.insert(&user).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "Admin account created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::auth::Argon2PasswordHasher;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteUserRepository,
    };

    #[tokio::test]
    async fn test_admin_created_once() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = SqliteUserRepository::new(pool);
        let hasher = Argon2PasswordHasher::fast();
        let admin = AdminAccountConfig {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "admin123".to_string(),
        };

        assert!(ensure_admin_account(&repo, &hasher, &admin).await.unwrap());
        assert!(!ensure_admin_account(&repo, &hasher, &admin).await.unwrap());

        let stored = repo.find_by_username("admin").await.unwrap().unwrap();
        assert!(stored.is_admin());
        assert!(hasher.verify("admin123", &stored.password_hash).unwrap());
    }
}
