//! Identity Context - User

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::Role;
use crate::domain::validation::{FieldErrors, ValidationError};

pub type UserId = Uuid;

pub const MIN_PASSWORD_LEN: usize = 5;

/// 用户
///
/// 不变量:
/// - username / email 全局唯一（忽略大小写）
/// - 至少拥有一个角色
/// - 有订单的用户只能软删除（is_deleted = true）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        errors
            .not_blank("name", &self.name)
            .not_blank("surname", &self.surname)
            .not_blank("username", &self.username)
            .email("email", &self.email)
            .check(!self.roles.is_empty(), "roles", "must contain at least one role");
        errors.into_result()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// 明文密码策略
pub fn validate_raw_password(field: &str, password: &str) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    errors.check(
        password.chars().count() >= MIN_PASSWORD_LEN,
        field,
        "must be at least 5 characters",
    );
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            roles: [Role::User].into_iter().collect(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["roles"], serde_json::json!(["USER"]));
    }

    #[test]
    fn test_roles_required() {
        let mut u = user();
        u.roles.clear();
        assert!(u.validate().is_err());
        assert!(!u.is_admin());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_raw_password("password", "1234").is_err());
        assert!(validate_raw_password("password", "12345").is_ok());
    }
}
