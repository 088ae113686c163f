//! Shop Command Handlers

use chrono::Utc;
use std::sync::Arc;

use crate::application::commands::{
    AddShopMember, CreateShop, DeleteShop, RemoveShopMember, ShopMembership, UpdateShop,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    BookRepositoryPort, ClientRepositoryPort, Notification, NotificationEntity, NotificationType,
    NotifierPort, OrderReference, OrderStorePort, ShopCache, ShopRepositoryPort,
};
use crate::domain::shop::{Shop, ShopId};

async fn find_shop(repo: &dyn ShopRepositoryPort, id: ShopId) -> Result<Shop, ApplicationError> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Shop", id))
}

pub struct CreateShopHandler {
    repo: Arc<dyn ShopRepositoryPort>,
    notifier: Arc<dyn NotifierPort>,
}

impl CreateShopHandler {
    pub fn new(repo: Arc<dyn ShopRepositoryPort>, notifier: Arc<dyn NotifierPort>) -> Self {
        Self { repo, notifier }
    }

    pub async fn handle(&self, command: CreateShop) -> Result<Shop, ApplicationError> {
        let shop = Shop::new(command.name.trim(), command.address);
        shop.validate()?;

        self.repo.insert(&shop).await?;

        tracing::info!(shop_id = %shop.id, name = %shop.name, "Shop created");
        self.notifier.notify(Notification::new(
            NotificationEntity::Shops,
            NotificationType::Create,
            &shop,
        ));

        Ok(shop)
    }
}

pub struct UpdateShopHandler {
    repo: Arc<dyn ShopRepositoryPort>,
    cache: ShopCache,
    notifier: Arc<dyn NotifierPort>,
}

impl UpdateShopHandler {
    pub fn new(
        repo: Arc<dyn ShopRepositoryPort>,
        cache: ShopCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            repo,
            cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: UpdateShop) -> Result<Shop, ApplicationError> {
        let mut shop = find_shop(self.repo.as_ref(), command.id).await?;

        shop.name = command.name.trim().to_string();
        shop.address = command.address;
        shop.validate()?;
        shop.updated_at = Utc::now();

        self.repo.update(&shop).await?;
        self.cache.evict(&shop.id);

        tracing::info!(shop_id = %shop.id, "Shop updated");
        self.notifier.notify(Notification::new(
            NotificationEntity::Shops,
            NotificationType::Update,
            &shop,
        ));

        Ok(shop)
    }
}

/// 物理删除；仍有订单引用时冲突
pub struct DeleteShopHandler {
    repo: Arc<dyn ShopRepositoryPort>,
    order_store: Arc<dyn OrderStorePort>,
    cache: ShopCache,
    notifier: Arc<dyn NotifierPort>,
}

impl DeleteShopHandler {
    pub fn new(
        repo: Arc<dyn ShopRepositoryPort>,
        order_store: Arc<dyn OrderStorePort>,
        cache: ShopCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            repo,
            order_store,
            cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: DeleteShop) -> Result<(), ApplicationError> {
        let shop = find_shop(self.repo.as_ref(), command.id).await?;

        if self
            .order_store
            .exists_by(OrderReference::Shop(shop.id))
            .await?
        {
            return Err(ApplicationError::conflict(format!(
                "Shop {} has orders and cannot be deleted",
                shop.id
            )));
        }

        self.repo.delete(shop.id).await?;
        self.cache.evict(&shop.id);

        tracing::info!(shop_id = %shop.id, "Shop deleted");
        self.notifier.notify(Notification::new(
            NotificationEntity::Shops,
            NotificationType::Delete,
            &shop,
        ));

        Ok(())
    }
}

// ============================================================================
// Shop membership
// ============================================================================

/// 添加图书/客户关联（重复添加无副作用）
pub struct AddShopMemberHandler {
    repo: Arc<dyn ShopRepositoryPort>,
    book_repo: Arc<dyn BookRepositoryPort>,
    client_repo: Arc<dyn ClientRepositoryPort>,
    cache: ShopCache,
    notifier: Arc<dyn NotifierPort>,
}

impl AddShopMemberHandler {
    pub fn new(
        repo: Arc<dyn ShopRepositoryPort>,
        book_repo: Arc<dyn BookRepositoryPort>,
        client_repo: Arc<dyn ClientRepositoryPort>,
        cache: ShopCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            repo,
            book_repo,
            client_repo,
            cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: AddShopMember) -> Result<Shop, ApplicationError> {
        let shop_id = find_shop(self.repo.as_ref(), command.shop_id).await?.id;

        let added = match command.member {
            ShopMembership::Book(book_id) => {
                self.book_repo
                    .find_by_id(book_id)
                    .await?
                    .filter(|v| v.book.active)
                    .ok_or_else(|| ApplicationError::not_found("Book", book_id))?;
                self.repo.add_book(shop_id, book_id).await?
            }
            ShopMembership::Client(client_id) => {
                self.client_repo
                    .find_by_id(client_id)
                    .await?
                    .ok_or_else(|| ApplicationError::not_found("Client", client_id))?;
                self.repo.add_client(shop_id, client_id).await?
            }
        };

        self.cache.evict(&shop_id);
        let shop = find_shop(self.repo.as_ref(), shop_id).await?;

        if added {
            tracing::info!(shop_id = %shop_id, member = ?command.member, "Shop member added");
            self.notifier.notify(Notification::new(
                NotificationEntity::Shops,
                NotificationType::Update,
                &shop,
            ));
        }

        Ok(shop)
    }
}

/// 移除关联，关联不存在时返回 NotFound
pub struct RemoveShopMemberHandler {
    repo: Arc<dyn ShopRepositoryPort>,
    cache: ShopCache,
    notifier: Arc<dyn NotifierPort>,
}

impl RemoveShopMemberHandler {
    pub fn new(
        repo: Arc<dyn ShopRepositoryPort>,
        cache: ShopCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            repo,
            cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: RemoveShopMember) -> Result<Shop, ApplicationError> {
        let shop_id = find_shop(self.repo.as_ref(), command.shop_id).await?.id;

        let removed = match command.member {
            ShopMembership::Book(book_id) => self.repo.remove_book(shop_id, book_id).await?,
            ShopMembership::Client(client_id) => self.repo.remove_client(shop_id, client_id).await?,
        };
        if !removed {
            return Err(match command.member {
                ShopMembership::Book(book_id) => {
                    ApplicationError::not_found("Book in shop", book_id)
                }
                ShopMembership::Client(client_id) => {
                    ApplicationError::not_found("Client in shop", client_id)
                }
            });
        }

        self.cache.evict(&shop_id);
        let shop = find_shop(self.repo.as_ref(), shop_id).await?;

        tracing::info!(shop_id = %shop_id, member = ?command.member, "Shop member removed");
        self.notifier.notify(Notification::new(
            NotificationEntity::Shops,
            NotificationType::Update,
            &shop,
        ));

        Ok(shop)
    }
}
