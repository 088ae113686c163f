//! Publisher Commands

use crate::application::ports::ImageUpload;
use crate::domain::catalog::PublisherId;

#[derive(Debug, Clone)]
pub struct CreatePublisher {
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdatePublisher {
    pub id: PublisherId,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PatchPublisher {
    pub id: PublisherId,
    pub name: Option<String>,
    pub image: Option<String>,
    pub active: Option<bool>,
}

/// 软删除
#[derive(Debug, Clone)]
pub struct DeletePublisher {
    pub id: PublisherId,
}

#[derive(Debug, Clone)]
pub struct UpdatePublisherImage {
    pub id: PublisherId,
    pub upload: ImageUpload,
    /// true 时保存完整下载 URL，否则只保存文件名
    pub with_url: bool,
}
