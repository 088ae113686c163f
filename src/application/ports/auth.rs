//! Auth Ports - Token 签发与密码哈希

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::identity::{Role, User, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Failed to create token: {0}")]
    TokenCreation(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Token 载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// 用户 ID
    pub sub: String,
    pub username: String,
    pub roles: Vec<Role>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))
    }
}

pub trait TokenServicePort: Send + Sync {
    fn issue(&self, user: &User) -> Result<String, AuthError>;

    /// 校验签名、签发者与有效期
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

pub trait PasswordHasherPort: Send + Sync {
    fn hash(&self, raw: &str) -> Result<String, AuthError>;

    /// 密码不匹配返回 `Ok(false)`
    fn verify(&self, raw: &str, hash: &str) -> Result<bool, AuthError>;
}
