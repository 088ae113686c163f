//! Client Commands

use crate::application::ports::ImageUpload;
use crate::domain::customer::{Address, ClientId};

#[derive(Debug, Clone)]
pub struct CreateClient {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateClient {
    pub id: ClientId,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub image: Option<String>,
}

/// 物理删除，存在订单时冲突
#[derive(Debug, Clone)]
pub struct DeleteClient {
    pub id: ClientId,
}

#[derive(Debug, Clone)]
pub struct UpdateClientImage {
    pub id: ClientId,
    pub upload: ImageUpload,
    pub with_url: bool,
}
