//! Book Commands

use crate::application::ports::ImageUpload;
use crate::domain::catalog::{BookId, PublisherId};

/// 创建图书，分类按名称引用
#[derive(Debug, Clone)]
pub struct CreateBook {
    pub name: String,
    pub author: String,
    pub publisher_id: PublisherId,
    pub category: String,
    pub image: Option<String>,
    pub description: String,
    pub price: f64,
    pub stock: i32,
}

#[derive(Debug, Clone)]
pub struct UpdateBook {
    pub id: BookId,
    pub name: String,
    pub author: String,
    pub publisher_id: PublisherId,
    pub category: String,
    pub image: Option<String>,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct PatchBook {
    pub id: BookId,
    pub name: Option<String>,
    pub author: Option<String>,
    pub publisher_id: Option<PublisherId>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub active: Option<bool>,
}

/// 软删除（下架）
#[derive(Debug, Clone)]
pub struct DeleteBook {
    pub id: BookId,
}

#[derive(Debug, Clone)]
pub struct UpdateBookImage {
    pub id: BookId,
    pub upload: ImageUpload,
    pub with_url: bool,
}
