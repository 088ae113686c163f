//! Category Command Handlers

use chrono::Utc;
use std::sync::Arc;

use crate::application::commands::{CreateCategory, DeleteCategory, UpdateCategory};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    BookCache, BookRepositoryPort, CategoryCache, CategoryRepositoryPort, Notification,
    NotificationEntity, NotificationType, NotifierPort,
};
use crate::domain::catalog::Category;

pub struct CreateCategoryHandler {
    repo: Arc<dyn CategoryRepositoryPort>,
    notifier: Arc<dyn NotifierPort>,
}

impl CreateCategoryHandler {
    pub fn new(repo: Arc<dyn CategoryRepositoryPort>, notifier: Arc<dyn NotifierPort>) -> Self {
        Self { repo, notifier }
    }

    pub async fn handle(&self, command: CreateCategory) -> Result<Category, ApplicationError> {
        let category = Category::new(command.name, command.active.unwrap_or(true));
        category.validate()?;

        self.repo.insert(&category).await?;

        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        self.notifier.notify(Notification::new(
            NotificationEntity::Categories,
            NotificationType::Create,
            &category,
        ));

        Ok(category)
    }
}

pub struct UpdateCategoryHandler {
    repo: Arc<dyn CategoryRepositoryPort>,
    cache: CategoryCache,
    book_cache: BookCache,
    notifier: Arc<dyn NotifierPort>,
}

impl UpdateCategoryHandler {
    pub fn new(
        repo: Arc<dyn CategoryRepositoryPort>,
        cache: CategoryCache,
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

    pub async fn handle(&self, command: UpdateCategory) -> Result<Category, ApplicationError> {
        let mut category = self
            .repo
            .find_by_id(command.id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Category", command.id))?;

        category.name = command.name.trim().to_string();
        if let Some(active) = command.active {
            category.active = active;
        }
        category.validate()?;
        category.updated_at = Utc::now();

        self.repo.update(&category).await?;
        self.cache.evict(&category.id);
        // 图书读模型中包含分类名称
        self.book_cache.clear();

        tracing::info!(category_id = %category.id, "Category updated");
        self.notifier.notify(Notification::new(
            NotificationEntity::Categories,
            NotificationType::Update,
            &category,
        ));

        Ok(category)
    }
}

/// 物理删除，仍被图书引用时返回冲突
pub struct DeleteCategoryHandler {
    repo: Arc<dyn CategoryRepositoryPort>,
    book_repo: Arc<dyn BookRepositoryPort>,
    cache: CategoryCache,
    notifier: Arc<dyn NotifierPort>,
}

impl DeleteCategoryHandler {
    pub fn new(
        repo: Arc<dyn CategoryRepositoryPort>,
        book_repo: Arc<dyn BookRepositoryPort>,
        cache: CategoryCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            repo,
            book_repo,
            cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: DeleteCategory) -> Result<(), ApplicationError> {
        let category = self
            .repo
            .find_by_id(command.id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Category", command.id))?;

        if self.book_repo.exists_by_category(category.id).await? {
            return Err(ApplicationError::conflict(format!(
                "Category {} is still referenced by books",
                category.name
            )));
        }

        self.repo.delete(category.id).await?;
        self.cache.evict(&category.id);

        tracing::info!(category_id = %category.id, "Category deleted");
        self.notifier.notify(Notification::new(
            NotificationEntity::Categories,
            NotificationType::Delete,
            &category,
        ));

        Ok(())
    }
}
