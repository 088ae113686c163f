//! Auth Adapters - JWT 与 Argon2 实现

mod bootstrap;
mod jwt_service;
mod password_service;

pub use bootstrap::ensure_admin_account;
pub use jwt_service::JwtTokenService;
pub use password_service::Argon2PasswordHasher;
