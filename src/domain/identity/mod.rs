//! Identity Context - 用户与角色

mod role;
mod user;

pub use role::{Role, RoleParseError};
pub use user::{validate_raw_password, User, UserId, MIN_PASSWORD_LEN};
