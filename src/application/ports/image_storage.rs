//! Image Storage Port - 图片文件存储
//!
//! 图书、出版社、客户的图片上传与下载

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// 允许的图片扩展名
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, Error)]
pub enum ImageStorageError {
    #[error("Unsupported image type: {0}, allowed: png, jpg, jpeg")]
    UnsupportedType(String),

    #[error("Uploaded file is empty")]
    Empty,

    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 上传的图片
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

/// 已保存的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// 存储内文件名
    pub filename: String,
    /// 公开下载地址
    pub url: String,
}

#[async_trait]
pub trait ImageStoragePort: Send + Sync {
    /// 保存图片，文件名为 `{stem}-{timestamp}.{ext}`
    async fn store(&self, stem: &str, upload: ImageUpload)
        -> Result<StoredImage, ImageStorageError>;

    /// 定位可下载的文件
    async fn locate(&self, filename: &str) -> Result<PathBuf, ImageStorageError>;

    /// 删除本存储管理的图片，`reference` 可以是文件名或下载 URL
    ///
    /// 不属于本存储的引用（如外部 URL）返回 `Ok(false)`
    async fn delete(&self, reference: &str) -> Result<bool, ImageStorageError>;
}

/// 根据扩展名推断 Content-Type
pub fn image_content_type(filename: &str) -> &'static str {
    match image_extension(filename).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// 小写扩展名
pub fn image_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(image_content_type("1-100.PNG"), "image/png");
        assert_eq!(image_content_type("cover.jpeg"), "image/jpeg");
        assert_eq!(image_content_type("notes.txt"), "application/octet-stream");
    }
}
