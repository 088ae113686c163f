//! File Storage - 文件系统图片存储实现
//!
//! 实现 ImageStoragePort trait

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{
    image_extension, ImageStorageError, ImageStoragePort, ImageUpload, StoredImage,
    ALLOWED_IMAGE_EXTENSIONS,
};

/// 下载路由前缀
pub const STORAGE_ROUTE: &str = "/api/storage";

/// 文件系统图片存储
pub struct FileImageStorage {
    /// 存储根目录
    base_dir: PathBuf,
    /// 对外地址（不含末尾 `/`）
    public_base_url: String,
}

impl FileImageStorage {
    /// 创建新的文件存储
    pub async fn new(
        base_dir: impl AsRef<Path>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, ImageStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| ImageStorageError::IoError(e.to_string()))?;

        Ok(Self {
            base_dir,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn url_for(&self, filename: &str) -> String {
        format!("{}{}/{}", self.public_base_url, STORAGE_ROUTE, filename)
    }

    /// 确定扩展名：优先文件名，其次 Content-Type
    fn resolve_extension(upload: &ImageUpload) -> Result<&'static str, ImageStorageError> {
        let from_name = upload.file_name.as_deref().and_then(image_extension);
        let from_type = upload.content_type.as_deref().map(|ct| match ct {
            "image/png" => "png".to_string(),
            "image/jpeg" | "image/jpg" => "jpg".to_string(),
            other => other.to_string(),
        });

        let candidate = from_name.or(from_type).unwrap_or_default();
        ALLOWED_IMAGE_EXTENSIONS
            .iter()
            .copied()
            .find(|ext| *ext == candidate)
            .ok_or(ImageStorageError::UnsupportedType(candidate))
    }
}

/// 只接受单层、非隐藏的文件名
fn checked_name(filename: &str) -> Result<&str, ImageStorageError> {
    let invalid = filename.is_empty()
        || filename.starts_with('.')
        || filename.contains(['/', '\\'])
        || filename.contains("..");
    if invalid {
        return Err(ImageStorageError::InvalidName(filename.to_string()));
    }
    Ok(filename)
}

#[async_trait]
impl ImageStoragePort for FileImageStorage {
    async fn store(
        &self,
        stem: &str,
        upload: ImageUpload,
    ) -> Result<StoredImage, ImageStorageError> {
        if upload.bytes.is_empty() {
            return Err(ImageStorageError::Empty);
        }
        let extension = Self::resolve_extension(&upload)?;

        let filename = format!(
            "{}-{}.{}",
            stem,
            Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            extension
        );
        let filename = checked_name(&filename)?.to_string();

        fs::write(self.base_dir.join(&filename), &upload.bytes)
            .await
            .map_err(|e| ImageStorageError::IoError(e.to_string()))?;

        tracing::debug!(filename = %filename, size = upload.bytes.len(), "Image stored");

        Ok(StoredImage {
            url: self.url_for(&filename),
            filename,
        })
    }

    async fn locate(&self, filename: &str) -> Result<PathBuf, ImageStorageError> {
        let path = self.base_dir.join(checked_name(filename)?);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(ImageStorageError::NotFound(filename.to_string())),
        }
    }

    async fn delete(&self, reference: &str) -> Result<bool, ImageStorageError> {
        let prefix = format!("{}{}/", self.public_base_url, STORAGE_ROUTE);
        let filename = match reference.strip_prefix(&prefix) {
            Some(name) => name,
            // 其他 URL 不归本存储管理
            None if reference.contains(['/', ':']) => return Ok(false),
            None => reference,
        };

        let path = self.base_dir.join(checked_name(filename)?);
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(filename = %filename, "Image deleted");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ImageStorageError::IoError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn upload(name: Option<&str>, content_type: Option<&str>, bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            bytes: bytes.to_vec(),
            file_name: name.map(String::from),
            content_type: content_type.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_store_locate_delete() {
        let temp_dir = tempdir().unwrap();
        let storage = FileImageStorage::new(temp_dir.path(), "http://localhost:3000/")
            .await
            .unwrap();

        let stored = storage
            .store("book-1", upload(Some("cover.PNG"), None, b"png-bytes"))
            .await
            .unwrap();
        assert!(stored.filename.starts_with("book-1-"));
        assert!(stored.filename.ends_with(".png"));
        assert_eq!(
            stored.url,
            format!("http://localhost:3000/api/storage/{}", stored.filename)
        );

        let path = storage.locate(&stored.filename).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"png-bytes");

        // URL 引用同样可删除
        assert!(storage.delete(&stored.url).await.unwrap());
        assert!(!storage.delete(&stored.filename).await.unwrap());
        assert!(matches!(
            storage.locate(&stored.filename).await,
            Err(ImageStorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_bad_uploads() {
        let temp_dir = tempdir().unwrap();
        let storage = FileImageStorage::new(temp_dir.path(), "http://localhost")
            .await
            .unwrap();

        assert!(matches!(
            storage.store("x", upload(Some("a.png"), None, b"")).await,
            Err(ImageStorageError::Empty)
        ));
        assert!(matches!(
            storage.store("x", upload(Some("a.gif"), None, b"gif")).await,
            Err(ImageStorageError::UnsupportedType(_))
        ));

        let stored = storage
            .store("x", upload(None, Some("image/jpeg"), b"jpg"))
            .await
            .unwrap();
        assert!(stored.filename.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_path_traversal_and_foreign_urls() {
        let temp_dir = tempdir().unwrap();
        let storage = FileImageStorage::new(temp_dir.path(), "http://localhost")
            .await
            .unwrap();

        assert!(matches!(
            storage.locate("../secret.png").await,
            Err(ImageStorageError::InvalidName(_))
        ));
        assert!(matches!(
            storage.locate(".env").await,
            Err(ImageStorageError::InvalidName(_))
        ));
        assert!(!storage
            .delete("https://via.placeholder.com/150")
            .await
            .unwrap());
    }
}
