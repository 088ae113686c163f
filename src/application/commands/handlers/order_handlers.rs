//! Order Command Handlers
//!
//! 订单写入跨两个存储：库存在关系库中原子调整，订单文档写入文档库。
//! 先预留库存再写文档，文档写入失败时回滚库存。

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::application::commands::{CreateOrder, DeleteOrder, OrderLineInput, UpdateOrder};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    BookCache, BookRepositoryPort, ClientRepositoryPort, Notification, NotificationEntity,
    NotificationType, NotifierPort, OrderStorePort, RepositoryError, ShopRepositoryPort,
    UserRepositoryPort,
};
use crate::domain::catalog::BookId;
use crate::domain::customer::ClientId;
use crate::domain::identity::UserId;
use crate::domain::ordering::{Order, OrderLine};
use crate::domain::shop::ShopId;
use crate::domain::FieldErrors;

/// 订单行价格与图书价格允许的误差
const PRICE_TOLERANCE: f64 = 0.001;

/// 订单写操作的依赖
#[derive(Clone)]
pub struct OrderDependencies {
    pub order_store: Arc<dyn OrderStorePort>,
    pub book_repo: Arc<dyn BookRepositoryPort>,
    pub user_repo: Arc<dyn UserRepositoryPort>,
    pub client_repo: Arc<dyn ClientRepositoryPort>,
    pub shop_repo: Arc<dyn ShopRepositoryPort>,
    pub book_cache: BookCache,
    pub notifier: Arc<dyn NotifierPort>,
}

impl OrderDependencies {
    async fn ensure_user(&self, user_id: UserId) -> Result<(), ApplicationError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .filter(|u| !u.is_deleted)
            .map(|_| ())
            .ok_or_else(|| ApplicationError::not_found("User", user_id))
    }

    async fn ensure_client_and_shop(
        &self,
        client_id: ClientId,
        shop_id: ShopId,
    ) -> Result<(), ApplicationError> {
        self.client_repo
            .find_by_id(client_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Client", client_id))?;
        self.shop_repo
            .find_by_id(shop_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Shop", shop_id))?;
        Ok(())
    }

    /// 校验订单行：数量、价格、图书在售且价格与当前价格一致
    async fn checked_lines(
        &self,
        inputs: &[OrderLineInput],
    ) -> Result<Vec<OrderLine>, ApplicationError> {
        let lines: Vec<OrderLine> = inputs
            .iter()
            .map(|l| OrderLine::new(l.book_id, l.quantity, l.price))
            .collect();
        Order::validate_lines(&lines)?;

        let mut errors = FieldErrors::new();
        for (index, line) in lines.iter().enumerate() {
            let view = self
                .book_repo
                .find_by_id(line.book_id)
                .await?
                .filter(|v| v.book.active)
                .ok_or_else(|| ApplicationError::not_found("Book", line.book_id))?;

            if (view.book.price - line.price).abs() > PRICE_TOLERANCE {
                errors.add(
                    &format!("order_lines[{}].price", index),
                    format!("does not match the current book price {:.2}", view.book.price),
                );
            }
        }
        errors.into_result()?;

        Ok(lines)
    }

    /// 依次调整库存，任一失败时回滚已完成的调整
    async fn apply_stock_changes(&self, changes: &[(BookId, i32)]) -> Result<(), ApplicationError> {
        let mut applied: Vec<(BookId, i32)> = Vec::with_capacity(changes.len());

        for &(book_id, delta) in changes {
            if delta == 0 {
                continue;
            }
            match self.book_repo.adjust_stock(book_id, delta).await {
                Ok(stock) => {
                    tracing::debug!(book_id, delta, stock, "Stock adjusted");
                    applied.push((book_id, delta));
                }
                Err(e) => {
                    self.revert_stock_changes(&applied).await;
                    return Err(match e {
                        RepositoryError::ConstraintViolation(_) => ApplicationError::conflict(
                            format!("Insufficient stock for book {}", book_id),
                        ),
                        other => other.into(),
                    });
                }
            }
        }

        Ok(())
    }

    async fn revert_stock_changes(&self, applied: &[(BookId, i32)]) {
        for &(book_id, delta) in applied.iter().rev() {
            if let Err(e) = self.book_repo.adjust_stock(book_id, -delta).await {
                tracing::error!(book_id, delta, error = %e, "Failed to revert stock change");
            }
        }
    }

    fn evict_books(&self, ids: impl IntoIterator<Item = BookId>) {
        for id in ids {
            self.book_cache.evict(&id);
        }
    }

    fn notify(&self, kind: NotificationType, order: &Order) {
        self.notifier
            .notify(Notification::new(NotificationEntity::Orders, kind, order));
    }
}

/// 两组数量之间的库存变化：正数归还，负数预留
fn stock_changes(
    previous: &BTreeMap<BookId, i32>,
    next: &BTreeMap<BookId, i32>,
) -> Vec<(BookId, i32)> {
    let books: BTreeSet<BookId> = previous.keys().chain(next.keys()).copied().collect();
    books
        .into_iter()
        .map(|id| {
            let before = previous.get(&id).copied().unwrap_or(0);
            let after = next.get(&id).copied().unwrap_or(0);
            (id, before.saturating_sub(after))
        })
        .filter(|(_, delta)| *delta != 0)
        .collect()
}

// ============================================================================
// CreateOrder
// ============================================================================

pub struct CreateOrderHandler {
    deps: OrderDependencies,
}

impl CreateOrderHandler {
    pub fn new(deps: OrderDependencies) -> Self {
        Self { deps }
    }

    pub async fn handle(&self, command: CreateOrder) -> Result<Order, ApplicationError> {
        self.deps.ensure_user(command.user_id).await?;
        self.deps
            .ensure_client_and_shop(command.client_id, command.shop_id)
            .await?;
        let lines = self.deps.checked_lines(&command.order_lines).await?;

        let order = Order::new(command.user_id, command.client_id, command.shop_id, lines)?;
        let changes = stock_changes(&BTreeMap::new(), &order.quantities());

        self.deps.apply_stock_changes(&changes).await?;
        if let Err(e) = self.deps.order_store.insert(&order).await {
            tracing::error!(order_id = %order.id, error = %e, "Order insert failed, releasing stock");
            self.deps.revert_stock_changes(&changes).await;
            return Err(e.into());
        }
        self.deps.evict_books(changes.iter().map(|(id, _)| *id));

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = order.total,
            total_books = order.total_books,
            "Order created"
        );
        self.deps.notify(NotificationType::Create, &order);

        Ok(order)
    }
}

// ============================================================================
// UpdateOrder
// ============================================================================

pub struct UpdateOrderHandler {
    deps: OrderDependencies,
}

impl UpdateOrderHandler {
    pub fn new(deps: OrderDependencies) -> Self {
        Self { deps }
    }

    pub async fn handle(&self, command: UpdateOrder) -> Result<Order, ApplicationError> {
        let mut order = self
            .deps
            .order_store
            .find_by_id(&command.id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Order", &command.id))?;

        self.deps
            .ensure_client_and_shop(command.client_id, command.shop_id)
            .await?;
        let lines = self.deps.checked_lines(&command.order_lines).await?;

        let previous = order.quantities();
        order.revise(command.client_id, command.shop_id, lines)?;
        let changes = stock_changes(&previous, &order.quantities());

        self.deps.apply_stock_changes(&changes).await?;
        if let Err(e) = self.deps.order_store.replace(&order).await {
            tracing::error!(order_id = %order.id, error = %e, "Order replace failed, reverting stock");
            self.deps.revert_stock_changes(&changes).await;
            return Err(e.into());
        }
        self.deps.evict_books(changes.iter().map(|(id, _)| *id));

        tracing::info!(order_id = %order.id, total = order.total, "Order updated");
        self.deps.notify(NotificationType::Update, &order);

        Ok(order)
    }
}

// ============================================================================
// DeleteOrder
// ============================================================================

pub struct DeleteOrderHandler {
    deps: OrderDependencies,
}

impl DeleteOrderHandler {
    pub fn new(deps: OrderDependencies) -> Self {
        Self { deps }
    }

    pub async fn handle(&self, command: DeleteOrder) -> Result<(), ApplicationError> {
        let order = self
            .deps
            .order_store
            .find_by_id(&command.id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Order", &command.id))?;

        if !self.deps.order_store.delete(&order.id).await? {
            return Err(ApplicationError::not_found("Order", &order.id));
        }

        // 文档已删除，库存归还失败只记录日志
        for (book_id, quantity) in order.quantities() {
            if let Err(e) = self.deps.book_repo.adjust_stock(book_id, quantity).await {
                tracing::error!(order_id = %order.id, book_id, error = %e, "Failed to restore stock");
            }
        }
        self.deps.evict_books(order.quantities().into_keys());

        tracing::info!(order_id = %order.id, "Order deleted");
        self.deps.notify(NotificationType::Delete, &order);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::application::pagination::{Page, PageRequest};
    use crate::application::ports::{
        CategoryRepositoryPort, ClientRepositoryPort, OrderFilter, OrderReference,
        PublisherRepositoryPort, ShopRepositoryPort, UserRepositoryPort,
    };
    use crate::domain::catalog::{Book, Category, Publisher};
    use crate::domain::customer::{Address, Client};
    use crate::domain::identity::{Role, User};
    use crate::domain::ordering::OrderId;
    use crate::domain::shop::Shop;
    use crate::domain::DEFAULT_IMAGE;
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::{InMemoryEntityCache, InMemoryOrderStore};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteBookRepository,
        SqliteCategoryRepository, SqliteClientRepository, SqlitePublisherRepository,
        SqliteShopRepository, SqliteUserRepository,
    };

    struct Fixture {
        deps: OrderDependencies,
        user_id: UserId,
        client_id: ClientId,
        shop_id: ShopId,
        book_id: BookId,
    }

    fn address() -> Address {
        Address {
            street: "Calle Mayor".to_string(),
            number: "5".to_string(),
            city: "Madrid".to_string(),
            province: "Madrid".to_string(),
            country: "Spain".to_string(),
            postal_code: "28013".to_string(),
        }
    }

    async fn fixture(order_store: Arc<dyn OrderStorePort>) -> Fixture {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let book_repo = Arc::new(SqliteBookRepository::new(pool.clone()));
        let publisher_repo = SqlitePublisherRepository::new(pool.clone());
        let category_repo = SqliteCategoryRepository::new(pool.clone());
        let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
        let client_repo = Arc::new(SqliteClientRepository::new(pool.clone()));
        let shop_repo = Arc::new(SqliteShopRepository::new(pool.clone()));

        let now = Utc::now();
        let publisher_id = publisher_repo
            .insert(&Publisher {
                id: 0,
                name: "Planeta".to_string(),
                image: DEFAULT_IMAGE.to_string(),
                active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        let category = Category::new("Novel", true);
        category_repo.insert(&category).await.unwrap();
        let book_id = book_repo
            .insert(&Book {
                id: 0,
                name: "El Quijote".to_string(),
                author: "Cervantes".to_string(),
                publisher_id,
                category_id: category.id,
                image: DEFAULT_IMAGE.to_string(),
                description: "Clásico".to_string(),
                price: 12.5,
                stock: 5,
                active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            roles: [Role::User].into_iter().collect(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        user_repo.insert(&user).await.unwrap();

        let client = Client {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            surname: "García".to_string(),
            email: "ana@example.com".to_string(),
            phone: "612345678".to_string(),
            address: address(),
            image: DEFAULT_IMAGE.to_string(),
            created_at: now,
            updated_at: now,
        };
        client_repo.insert(&client).await.unwrap();

        let shop = Shop::new("Centro", address());
        shop_repo.insert(&shop).await.unwrap();

        Fixture {
            deps: OrderDependencies {
                order_store,
                book_repo,
                user_repo,
                client_repo,
                shop_repo,
                book_cache: Arc::new(InMemoryEntityCache::new(std::time::Duration::from_secs(60), 100)),
                notifier: Arc::new(EventPublisher::new()),
            },
            user_id: user.id,
            client_id: client.id,
            shop_id: shop.id,
            book_id,
        }
    }

    async fn stock(f: &Fixture) -> i32 {
        f.deps
            .book_repo
            .find_by_id(f.book_id)
            .await
            .unwrap()
            .unwrap()
            .book
            .stock
    }

    fn create(f: &Fixture, quantity: i32, price: f64) -> CreateOrder {
        CreateOrder {
            user_id: f.user_id,
            client_id: f.client_id,
            shop_id: f.shop_id,
            order_lines: vec![OrderLineInput {
                book_id: f.book_id,
                quantity,
                price,
            }],
        }
    }

    #[tokio::test]
    async fn test_create_reserves_and_delete_restores_stock() {
        let f = fixture(Arc::new(InMemoryOrderStore::new())).await;
        let handler = CreateOrderHandler::new(f.deps.clone());

        let order = handler.handle(create(&f, 2, 12.5)).await.unwrap();
        assert_eq!(order.total, 25.0);
        assert_eq!(order.total_books, 2);
        assert_eq!(stock(&f).await, 3);

        DeleteOrderHandler::new(f.deps.clone())
            .handle(DeleteOrder { id: order.id.clone() })
            .await
            .unwrap();
        assert_eq!(stock(&f).await, 5);
        assert!(f.deps.order_store.find_by_id(&order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_conflict() {
        let f = fixture(Arc::new(InMemoryOrderStore::new())).await;
        let handler = CreateOrderHandler::new(f.deps.clone());

        let err = handler.handle(create(&f, 6, 12.5)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Conflict(_)));
        assert_eq!(stock(&f).await, 5);
    }

    #[tokio::test]
    async fn test_price_mismatch_is_field_error() {
        let f = fixture(Arc::new(InMemoryOrderStore::new())).await;
        let handler = CreateOrderHandler::new(f.deps.clone());

        let err = handler.handle(create(&f, 1, 10.0)).await.unwrap_err();
        match err {
            ApplicationError::InvalidFields(fields) => {
                assert!(fields.get("order_lines[0].price").is_some())
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_adjusts_by_difference() {
        let f = fixture(Arc::new(InMemoryOrderStore::new())).await;
        let order = CreateOrderHandler::new(f.deps.clone())
            .handle(create(&f, 1, 12.5))
            .await
            .unwrap();
        assert_eq!(stock(&f).await, 4);

        let updated = UpdateOrderHandler::new(f.deps.clone())
            .handle(UpdateOrder {
                id: order.id.clone(),
                client_id: f.client_id,
                shop_id: f.shop_id,
                order_lines: vec![OrderLineInput {
                    book_id: f.book_id,
                    quantity: 4,
                    price: 12.5,
                }],
            })
            .await
            .unwrap();
        assert_eq!(updated.total_books, 4);
        assert_eq!(stock(&f).await, 1);
    }

    #[tokio::test]
    async fn test_oversized_quantities_leave_stock_untouched() {
        let f = fixture(Arc::new(InMemoryOrderStore::new())).await;
        let handler = CreateOrderHandler::new(f.deps.clone());

        let mut command = create(&f, i32::MAX, 12.5);
        command.order_lines.push(OrderLineInput {
            book_id: f.book_id,
            quantity: 2,
            price: 12.5,
        });

        let err = handler.handle(command).await.unwrap_err();
        match err {
            ApplicationError::InvalidFields(fields) => {
                assert!(fields.get("order_lines[0].quantity").is_some())
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stock(&f).await, 5);
    }

    /// 文档库写入总是失败
    struct UnavailableOrderStore;

    #[async_trait]
    impl OrderStorePort for UnavailableOrderStore {
        async fn insert(&self, _order: &Order) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("document store down".to_string()))
        }
        async fn find_by_id(&self, _id: &OrderId) -> Result<Option<Order>, RepositoryError> {
            Ok(None)
        }
        async fn find_page(
            &self,
            _filter: &OrderFilter,
            page: &PageRequest,
        ) -> Result<Page<Order>, RepositoryError> {
            Ok(Page::new(vec![], 0, page))
        }
        async fn replace(&self, _order: &Order) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("document store down".to_string()))
        }
        async fn delete(&self, _id: &OrderId) -> Result<bool, RepositoryError> {
            Ok(false)
        }
        async fn exists_by(&self, _reference: OrderReference) -> Result<bool, RepositoryError> {
            Ok(false)
        }
        async fn ids_by_user(&self, _user_id: UserId) -> Result<Vec<OrderId>, RepositoryError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_failed_document_write_releases_stock() {
        let f = fixture(Arc::new(UnavailableOrderStore)).await;
        let handler = CreateOrderHandler::new(f.deps.clone());

        let err = handler.handle(create(&f, 2, 12.5)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ExternalServiceError(_)));
        assert_eq!(stock(&f).await, 5);
    }

    #[test]
    fn test_stock_changes() {
        let previous: BTreeMap<BookId, i32> = [(1, 2), (2, 1)].into_iter().collect();
        let next: BTreeMap<BookId, i32> = [(1, 3), (3, 1)].into_iter().collect();
        assert_eq!(stock_changes(&previous, &next), vec![(1, -1), (2, 1), (3, -1)]);
    }
}
