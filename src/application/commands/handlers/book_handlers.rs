//! Book Command Handlers

use chrono::Utc;
use std::sync::Arc;

use super::image_support::stage_image;
use crate::application::commands::{CreateBook, DeleteBook, PatchBook, UpdateBook, UpdateBookImage};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    BookCache, BookRepositoryPort, CategoryRepositoryPort, ImageStoragePort, Notification,
    NotificationEntity, NotificationType, NotifierPort, PublisherRepositoryPort,
};
use crate::domain::catalog::{Book, BookId, BookView, Category, PublisherId};
use crate::domain::DEFAULT_IMAGE;

impl From<UpdateBook> for PatchBook {
    fn from(command: UpdateBook) -> Self {
        Self {
            id: command.id,
            name: Some(command.name),
            author: Some(command.author),
            publisher_id: Some(command.publisher_id),
            category: Some(command.category),
            image: command.image,
            description: Some(command.description),
            price: Some(command.price),
            stock: Some(command.stock),
            active: command.active,
        }
    }
}

/// 图书引用校验：出版社与分类必须存在且有效
struct CatalogReferences {
    publisher_repo: Arc<dyn PublisherRepositoryPort>,
    category_repo: Arc<dyn CategoryRepositoryPort>,
}

impl CatalogReferences {
    async fn publisher(&self, id: PublisherId) -> Result<(), ApplicationError> {
        self.publisher_repo
            .find_by_id(id)
            .await?
            .filter(|p| p.active)
            .map(|_| ())
            .ok_or_else(|| ApplicationError::not_found("Publisher", id))
    }

    async fn category(&self, name: &str) -> Result<Category, ApplicationError> {
        let category = self
            .category_repo
            .find_by_name(name.trim())
            .await?
            .ok_or_else(|| ApplicationError::not_found("Category", name))?;

        if !category.active {
            return Err(ApplicationError::business_rule(format!(
                "Category {} is not active",
                category.name
            )));
        }
        Ok(category)
    }
}

/// 读取在售图书
async fn find_active(
    repo: &dyn BookRepositoryPort,
    id: BookId,
) -> Result<BookView, ApplicationError> {
    repo.find_by_id(id)
        .await?
        .filter(|v| v.book.active)
        .ok_or_else(|| ApplicationError::not_found("Book", id))
}

// ============================================================================
// CreateBook
// ============================================================================

pub struct CreateBookHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
    references: CatalogReferences,
    notifier: Arc<dyn NotifierPort>,
}

impl CreateBookHandler {
    pub fn new(
        book_repo: Arc<dyn BookRepositoryPort>,
        publisher_repo: Arc<dyn PublisherRepositoryPort>,
        category_repo: Arc<dyn CategoryRepositoryPort>,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            book_repo,
            references: CatalogReferences {
                publisher_repo,
                category_repo,
            },
            notifier,
        }
    }

    pub async fn handle(&self, command: CreateBook) -> Result<BookView, ApplicationError> {
        self.references.publisher(command.publisher_id).await?;
        let category = self.references.category(&command.category).await?;

        let now = Utc::now();
        let book = Book {
            id: 0,
            name: command.name.trim().to_string(),
            author: command.author.trim().to_string(),
            publisher_id: command.publisher_id,
            category_id: category.id,
            image: command.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            description: command.description.trim().to_string(),
            price: command.price,
            stock: command.stock,
            active: true,
            created_at: now,
            updated_at: now,
        };
        book.validate()?;

        let book_id = self.book_repo.insert(&book).await?;
        let view = find_active(self.book_repo.as_ref(), book_id).await?;

        tracing::info!(book_id, name = %view.book.name, "Book created");
        self.notifier.notify(Notification::new(
            NotificationEntity::Books,
            NotificationType::Create,
            &view,
        ));

        Ok(view)
    }
}

// ============================================================================
// UpdateBook / PatchBook
// ============================================================================

pub struct UpdateBookHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
    references: CatalogReferences,
    cache: BookCache,
    notifier: Arc<dyn NotifierPort>,
}

impl UpdateBookHandler {
    pub fn new(
        book_repo: Arc<dyn BookRepositoryPort>,
        publisher_repo: Arc<dyn PublisherRepositoryPort>,
        category_repo: Arc<dyn CategoryRepositoryPort>,
        cache: BookCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            book_repo,
            references: CatalogReferences {
                publisher_repo,
                category_repo,
            },
            cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: UpdateBook) -> Result<BookView, ApplicationError> {
        self.handle_patch(command.into()).await
    }

    pub async fn handle_patch(&self, command: PatchBook) -> Result<BookView, ApplicationError> {
        let mut book = find_active(self.book_repo.as_ref(), command.id).await?.book;

        if let Some(publisher_id) = command.publisher_id {
            if publisher_id != book.publisher_id {
                self.references.publisher(publisher_id).await?;
                book.publisher_id = publisher_id;
            }
        }
        if let Some(category) = command.category {
            book.category_id = self.references.category(&category).await?.id;
        }
        if let Some(name) = command.name {
            book.name = name.trim().to_string();
        }
        if let Some(author) = command.author {
            book.author = author.trim().to_string();
        }
        if let Some(image) = command.image {
            book.image = image;
        }
        if let Some(description) = command.description {
            book.description = description.trim().to_string();
        }
        if let Some(price) = command.price {
            book.price = price;
        }
        if let Some(stock) = command.stock {
            book.stock = stock;
        }
        if let Some(active) = command.active {
            book.active = active;
        }
        book.validate()?;
        book.touch();

        self.book_repo.update(&book).await?;
        self.cache.evict(&book.id);

        let view = self
            .book_repo
            .find_by_id(book.id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Book", book.id))?;

        tracing::info!(book_id = book.id, "Book updated");
        self.notifier.notify(Notification::new(
            NotificationEntity::Books,
            NotificationType::Update,
            &view,
        ));

        Ok(view)
    }
}

// ============================================================================
// DeleteBook
// ============================================================================

/// 软删除：下架后查询视为不存在，订单历史保留引用
pub struct DeleteBookHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
    cache: BookCache,
    notifier: Arc<dyn NotifierPort>,
}

impl DeleteBookHandler {
    pub fn new(
        book_repo: Arc<dyn BookRepositoryPort>,
        cache: BookCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            book_repo,
            cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: DeleteBook) -> Result<(), ApplicationError> {
        let mut view = find_active(self.book_repo.as_ref(), command.id).await?;

        view.book.active = false;
        view.book.touch();
        self.book_repo.update(&view.book).await?;
        self.cache.evict(&view.book.id);

        tracing::info!(book_id = view.book.id, "Book deleted");
        self.notifier.notify(Notification::new(
            NotificationEntity::Books,
            NotificationType::Delete,
            &view,
        ));

        Ok(())
    }
}

// ============================================================================
// UpdateBookImage
// ============================================================================

pub struct UpdateBookImageHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
    storage: Arc<dyn ImageStoragePort>,
    cache: BookCache,
    notifier: Arc<dyn NotifierPort>,
}

impl UpdateBookImageHandler {
    pub fn new(
        book_repo: Arc<dyn BookRepositoryPort>,
        storage: Arc<dyn ImageStoragePort>,
        cache: BookCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            book_repo,
            storage,
            cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: UpdateBookImage) -> Result<BookView, ApplicationError> {
        let mut view = find_active(self.book_repo.as_ref(), command.id).await?;

        let staged = stage_image(
            self.storage.as_ref(),
            &format!("book-{}", view.book.id),
            command.upload,
            command.with_url,
            &view.book.image,
        )
        .await?;
        view.book.image = staged.reference.clone();
        view.book.touch();

        staged
            .settle(self.storage.as_ref(), self.book_repo.update(&view.book).await)
            .await?;
        self.cache.evict(&view.book.id);

        tracing::info!(book_id = view.book.id, image = %view.book.image, "Book image updated");
        self.notifier.notify(Notification::new(
            NotificationEntity::Books,
            NotificationType::Update,
            &view,
        ));

        Ok(view)
    }
}
