//! Auth Commands

/// 注册命令
#[derive(Debug, Clone)]
pub struct SignUp {
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub password: String,
    pub password_repeat: String,
}

/// 登录命令
#[derive(Debug, Clone)]
pub struct SignIn {
    pub username: String,
    pub password: String,
}
