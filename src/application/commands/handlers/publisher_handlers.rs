//! Publisher Command Handlers

use chrono::Utc;
use std::sync::Arc;

use super::image_support::stage_image;
use crate::application::commands::{
    CreatePublisher, DeletePublisher, PatchPublisher, UpdatePublisher, UpdatePublisherImage,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    BookCache, ImageStoragePort, Notification, NotificationEntity, NotificationType, NotifierPort,
    PublisherCache, PublisherRepositoryPort,
};
use crate::domain::catalog::{Publisher, PublisherId};
use crate::domain::DEFAULT_IMAGE;

impl From<UpdatePublisher> for PatchPublisher {
    fn from(command: UpdatePublisher) -> Self {
        Self {
            id: command.id,
            name: Some(command.name),
            image: command.image,
            active: None,
        }
    }
}

/// 读取未删除的出版社
async fn find_active(
    repo: &dyn PublisherRepositoryPort,
    id: PublisherId,
) -> Result<Publisher, ApplicationError> {
    repo.find_by_id(id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| ApplicationError::not_found("Publisher", id))
}

// ============================================================================
// CreatePublisher
// ============================================================================

pub struct CreatePublisherHandler {
    repo: Arc<dyn PublisherRepositoryPort>,
    notifier: Arc<dyn NotifierPort>,
}

impl CreatePublisherHandler {
    pub fn new(repo: Arc<dyn PublisherRepositoryPort>, notifier: Arc<dyn NotifierPort>) -> Self {
        Self { repo, notifier }
    }

    pub async fn handle(&self, command: CreatePublisher) -> Result<Publisher, ApplicationError> {
        let now = Utc::now();
        let mut publisher = Publisher {
            id: 0,
            name: command.name.trim().to_string(),
            image: command.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            active: true,
            created_at: now,
            updated_at: now,
        };
        publisher.validate()?;

        publisher.id = self.repo.insert(&publisher).await?;

        tracing::info!(publisher_id = publisher.id, name = %publisher.name, "Publisher created");
        self.notifier.notify(Notification::new(
            NotificationEntity::Publishers,
            NotificationType::Create,
            &publisher,
        ));

        Ok(publisher)
    }
}

// ============================================================================
// UpdatePublisher / PatchPublisher
// ============================================================================

pub struct UpdatePublisherHandler {
    repo: Arc<dyn PublisherRepositoryPort>,
    cache: PublisherCache,
    book_cache: BookCache,
    notifier: Arc<dyn NotifierPort>,
}

impl UpdatePublisherHandler {
    pub fn new(
        repo: Arc<dyn PublisherRepositoryPort>,
        cache: PublisherCache,
        book_cache: BookCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            repo,
            cache,
            book_cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: UpdatePublisher) -> Result<Publisher, ApplicationError> {
        self.handle_patch(command.into()).await
    }

    pub async fn handle_patch(&self, command: PatchPublisher) -> Result<Publisher, ApplicationError> {
        let mut publisher = find_active(self.repo.as_ref(), command.id).await?;

        if let Some(name) = command.name {
            publisher.name = name.trim().to_string();
        }
        if let Some(image) = command.image {
            publisher.image = image;
        }
        if let Some(active) = command.active {
            publisher.active = active;
        }
        publisher.validate()?;
        publisher.touch();

        self.repo.update(&publisher).await?;
        self.cache.evict(&publisher.id);
        // 图书读模型中包含出版社名称
        self.book_cache.clear();

        tracing::info!(publisher_id = publisher.id, "Publisher updated");
        self.notifier.notify(Notification::new(
            NotificationEntity::Publishers,
            NotificationType::Update,
            &publisher,
        ));

        Ok(publisher)
    }
}

// ============================================================================
// DeletePublisher
// ============================================================================

/// 软删除：active = false
pub struct DeletePublisherHandler {
    repo: Arc<dyn PublisherRepositoryPort>,
    cache: PublisherCache,
    notifier: Arc<dyn NotifierPort>,
}

impl DeletePublisherHandler {
    pub fn new(
        repo: Arc<dyn PublisherRepositoryPort>,
        cache: PublisherCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            repo,
            cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: DeletePublisher) -> Result<(), ApplicationError> {
        let mut publisher = find_active(self.repo.as_ref(), command.id).await?;

        publisher.active = false;
        publisher.touch();
        self.repo.update(&publisher).await?;
        self.cache.evict(&publisher.id);

        tracing::info!(publisher_id = publisher.id, "Publisher deleted");
        self.notifier.notify(Notification::new(
            NotificationEntity::Publishers,
            NotificationType::Delete,
            &publisher,
        ));

        Ok(())
    }
}

// ============================================================================
// UpdatePublisherImage
// ============================================================================

pub struct UpdatePublisherImageHandler {
    repo: Arc<dyn PublisherRepositoryPort>,
    storage: Arc<dyn ImageStoragePort>,
    cache: PublisherCache,
    notifier: Arc<dyn NotifierPort>,
}

impl UpdatePublisherImageHandler {
    pub fn new(
        repo: Arc<dyn PublisherRepositoryPort>,
        storage: Arc<dyn ImageStoragePort>,
        cache: PublisherCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            repo,
            storage,
            cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: UpdatePublisherImage) -> Result<Publisher, ApplicationError> {
        let mut publisher = find_active(self.repo.as_ref(), command.id).await?;

        let staged = stage_image(
            self.storage.as_ref(),
            &format!("publisher-{}", publisher.id),
            command.upload,
            command.with_url,
            &publisher.image,
        )
        .await?;
        publisher.image = staged.reference.clone();
        publisher.touch();

        staged
            .settle(self.storage.as_ref(), self.repo.update(&publisher).await)
            .await?;
        self.cache.evict(&publisher.id);

        tracing::info!(publisher_id = publisher.id, image = %publisher.image, "Publisher image updated");
        self.notifier.notify(Notification::new(
            NotificationEntity::Publishers,
            NotificationType::Update,
            &publisher,
        ));

        Ok(publisher)
    }
}
