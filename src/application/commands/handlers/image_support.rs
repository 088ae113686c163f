//! 图片替换的公共流程（图书、出版社、客户共用）
//!
//! 先写入新文件，实体更新成功后再删旧文件；更新失败则删掉刚写入的新文件。

use crate::application::error::ApplicationError;
use crate::application::ports::{ImageStoragePort, ImageUpload};
use crate::domain::DEFAULT_IMAGE;

/// 已写入但尚未落库的新图片
#[must_use]
pub(crate) struct StagedImage {
    /// 写入实体的图片引用（URL 或文件名）
    pub reference: String,
    filename: String,
    previous: String,
}

/// 保存新图片，旧图片保留到 `settle` 时再处理
///
/// `with_url` 为 true 时引用为完整下载 URL，否则为文件名
pub(crate) async fn stage_image(
    storage: &dyn ImageStoragePort,
    stem: &str,
    upload: ImageUpload,
    with_url: bool,
    previous: &str,
) -> Result<StagedImage, ApplicationError> {
    let stored = storage.store(stem, upload).await?;

    Ok(StagedImage {
        reference: if with_url { stored.url } else { stored.filename.clone() },
        filename: stored.filename,
        previous: previous.to_string(),
    })
}

impl StagedImage {
    /// 根据实体更新结果清理文件：成功删旧图，失败删新图
    pub async fn settle<T, E>(
        self,
        storage: &dyn ImageStoragePort,
        saved: Result<T, E>,
    ) -> Result<T, E> {
        match &saved {
            Ok(_) => discard_image(storage, &self.previous).await,
            Err(_) => {
                tracing::warn!(image = %self.filename, "Entity update failed, dropping new image");
                discard_image(storage, &self.filename).await;
            }
        }
        saved
    }
}

/// 删除实体拥有的图片，失败只记录日志
pub(crate) async fn discard_image(storage: &dyn ImageStoragePort, image: &str) {
    if image == DEFAULT_IMAGE {
        return;
    }
    match storage.delete(image).await {
        Ok(true) => tracing::debug!(image = %image, "Image removed"),
        Ok(false) => {}
        Err(e) => tracing::warn!(image = %image, error = %e, "Failed to remove image"),
    }
}
