//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态，由 main 显式组装

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::application::commands::handlers::{
    AddShopMemberHandler, CreateBookHandler, CreateCategoryHandler, CreateClientHandler,
    CreateOrderHandler, CreatePublisherHandler, CreateShopHandler, CreateUserHandler,
    DeleteBookHandler, DeleteCategoryHandler, DeleteClientHandler, DeleteOrderHandler,
    DeletePublisherHandler, DeleteShopHandler, DeleteUserHandler, OrderDependencies,
    RemoveShopMemberHandler, SignInHandler, SignUpHandler, UpdateBookHandler,
    UpdateBookImageHandler, UpdateCategoryHandler, UpdateClientHandler, UpdateClientImageHandler,
    UpdateOrderHandler, UpdatePublisherHandler, UpdatePublisherImageHandler, UpdateShopHandler,
    UpdateUserHandler,
};
use crate::application::ports::{
    BookCache, BookRepositoryPort, CategoryCache, CategoryRepositoryPort, ClientCache,
    ClientRepositoryPort, EntityCachePort, ImageStoragePort, NotifierPort, OrderStorePort,
    PasswordHasherPort, PublisherCache, PublisherRepositoryPort, ShopCache, ShopRepositoryPort,
    TokenServicePort, UserRepositoryPort,
};
use crate::application::queries::handlers::{
    GetBookHandler, GetCategoryHandler, GetClientHandler, GetOrderHandler, GetPublisherHandler,
    GetShopHandler, GetUserHandler, ListBooksHandler, ListCategoriesHandler, ListClientsHandler,
    ListOrdersHandler, ListPublishersHandler, ListShopsHandler, ListUsersHandler,
};
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::memory::InMemoryEntityCache;

/// 按 ID 的实体缓存
#[derive(Clone)]
pub struct EntityCaches {
    pub books: BookCache,
    pub publishers: PublisherCache,
    pub categories: CategoryCache,
    pub clients: ClientCache,
    pub shops: ShopCache,
}

impl EntityCaches {
    /// 进程内 TTL 缓存
    pub fn in_memory(ttl: Duration, max_entries: usize) -> Self {
        Self {
            books: in_memory_cache(ttl, max_entries),
            publishers: in_memory_cache(ttl, max_entries),
            categories: in_memory_cache(ttl, max_entries),
            clients: in_memory_cache(ttl, max_entries),
            shops: in_memory_cache(ttl, max_entries),
        }
    }
}

fn in_memory_cache<K, V>(ttl: Duration, max_entries: usize) -> Arc<dyn EntityCachePort<K, V>>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    InMemoryEntityCache::new(ttl, max_entries).arc()
}

/// 组装 AppState 所需的端口实现
pub struct AppDependencies {
    pub user_repo: Arc<dyn UserRepositoryPort>,
    pub publisher_repo: Arc<dyn PublisherRepositoryPort>,
    pub category_repo: Arc<dyn CategoryRepositoryPort>,
    pub book_repo: Arc<dyn BookRepositoryPort>,
    pub client_repo: Arc<dyn ClientRepositoryPort>,
    pub shop_repo: Arc<dyn ShopRepositoryPort>,
    pub order_store: Arc<dyn OrderStorePort>,
    pub image_storage: Arc<dyn ImageStoragePort>,
    pub password_hasher: Arc<dyn PasswordHasherPort>,
    pub token_service: Arc<dyn TokenServicePort>,
    pub event_publisher: Arc<EventPublisher>,
    pub caches: EntityCaches,
}

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub user_repo: Arc<dyn UserRepositoryPort>,
    pub token_service: Arc<dyn TokenServicePort>,
    pub image_storage: Arc<dyn ImageStoragePort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub sign_up_handler: SignUpHandler,
    pub sign_in_handler: SignInHandler,
    pub create_user_handler: CreateUserHandler,
    pub update_user_handler: UpdateUserHandler,
    pub delete_user_handler: DeleteUserHandler,
    pub create_publisher_handler: CreatePublisherHandler,
    pub update_publisher_handler: UpdatePublisherHandler,
    pub delete_publisher_handler: DeletePublisherHandler,
    pub update_publisher_image_handler: UpdatePublisherImageHandler,
    pub create_category_handler: CreateCategoryHandler,
    pub update_category_handler: UpdateCategoryHandler,
    pub delete_category_handler: DeleteCategoryHandler,
    pub create_book_handler: CreateBookHandler,
    pub update_book_handler: UpdateBookHandler,
    pub delete_book_handler: DeleteBookHandler,
    pub update_book_image_handler: UpdateBookImageHandler,
    pub create_client_handler: CreateClientHandler,
    pub update_client_handler: UpdateClientHandler,
    pub delete_client_handler: DeleteClientHandler,
    pub update_client_image_handler: UpdateClientImageHandler,
    pub create_shop_handler: CreateShopHandler,
    pub update_shop_handler: UpdateShopHandler,
    pub delete_shop_handler: DeleteShopHandler,
    pub add_shop_member_handler: AddShopMemberHandler,
    pub remove_shop_member_handler: RemoveShopMemberHandler,
    pub create_order_handler: CreateOrderHandler,
    pub update_order_handler: UpdateOrderHandler,
    pub delete_order_handler: DeleteOrderHandler,

    // ========== Query Handlers ==========
    pub get_user_handler: GetUserHandler,
    pub list_users_handler: ListUsersHandler,
    pub get_publisher_handler: GetPublisherHandler,
    pub list_publishers_handler: ListPublishersHandler,
    pub get_category_handler: GetCategoryHandler,
    pub list_categories_handler: ListCategoriesHandler,
    pub get_book_handler: GetBookHandler,
    pub list_books_handler: ListBooksHandler,
    pub get_client_handler: GetClientHandler,
    pub list_clients_handler: ListClientsHandler,
    pub get_shop_handler: GetShopHandler,
    pub list_shops_handler: ListShopsHandler,
    pub get_order_handler: GetOrderHandler,
    pub list_orders_handler: ListOrdersHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(deps: AppDependencies) -> Self {
        let AppDependencies {
            user_repo,
            publisher_repo,
            category_repo,
            book_repo,
            client_repo,
            shop_repo,
            order_store,
            image_storage,
            password_hasher,
            token_service,
            event_publisher,
            caches,
        } = deps;
        let notifier: Arc<dyn NotifierPort> = event_publisher.clone();

        let order_deps = OrderDependencies {
            order_store: order_store.clone(),
            book_repo: book_repo.clone(),
            user_repo: user_repo.clone(),
            client_repo: client_repo.clone(),
            shop_repo: shop_repo.clone(),
            book_cache: caches.books.clone(),
            notifier: notifier.clone(),
        };

        Self {
            // Command handlers
            sign_up_handler: SignUpHandler::new(
                user_repo.clone(),
                password_hasher.clone(),
                token_service.clone(),
            ),
            sign_in_handler: SignInHandler::new(
                user_repo.clone(),
                password_hasher.clone(),
                token_service.clone(),
            ),
            create_user_handler: CreateUserHandler::new(user_repo.clone(), password_hasher.clone()),
            update_user_handler: UpdateUserHandler::new(user_repo.clone(), password_hasher.clone()),
            delete_user_handler: DeleteUserHandler::new(user_repo.clone(), order_store.clone()),
            create_publisher_handler: CreatePublisherHandler::new(
                publisher_repo.clone(),
                notifier.clone(),
            ),
            update_publisher_handler: UpdatePublisherHandler::new(
                publisher_repo.clone(),
                caches.publishers.clone(),
                caches.books.clone(),
                notifier.clone(),
            ),
            delete_publisher_handler: DeletePublisherHandler::new(
                publisher_repo.clone(),
                caches.publishers.clone(),
                notifier.clone(),
            ),
            update_publisher_image_handler: UpdatePublisherImageHandler::new(
                publisher_repo.clone(),
                image_storage.clone(),
                caches.publishers.clone(),
                notifier.clone(),
            ),
            create_category_handler: CreateCategoryHandler::new(
                category_repo.clone(),
                notifier.clone(),
            ),
            update_category_handler: UpdateCategoryHandler::new(
                category_repo.clone(),
                caches.categories.clone(),
                caches.books.clone(),
                notifier.clone(),
            ),
            delete_category_handler: DeleteCategoryHandler::new(
                category_repo.clone(),
                book_repo.clone(),
                caches.categories.clone(),
                notifier.clone(),
            ),
            create_book_handler: CreateBookHandler::new(
                book_repo.clone(),
                publisher_repo.clone(),
                category_repo.clone(),
                notifier.clone(),
            ),
            update_book_handler: UpdateBookHandler::new(
                book_repo.clone(),
                publisher_repo.clone(),
                category_repo.clone(),
                caches.books.clone(),
                notifier.clone(),
            ),
            delete_book_handler: DeleteBookHandler::new(
                book_repo.clone(),
                caches.books.clone(),
                notifier.clone(),
            ),
            update_book_image_handler: UpdateBookImageHandler::new(
                book_repo.clone(),
                image_storage.clone(),
                caches.books.clone(),
                notifier.clone(),
            ),
            create_client_handler: CreateClientHandler::new(client_repo.clone(), notifier.clone()),
            update_client_handler: UpdateClientHandler::new(
                client_repo.clone(),
                caches.clients.clone(),
                notifier.clone(),
            ),
            delete_client_handler: DeleteClientHandler::new(
                client_repo.clone(),
                order_store.clone(),
                image_storage.clone(),
                caches.clients.clone(),
                notifier.clone(),
            ),
            update_client_image_handler: UpdateClientImageHandler::new(
                client_repo.clone(),
                image_storage.clone(),
                caches.clients.clone(),
                notifier.clone(),
            ),
            create_shop_handler: CreateShopHandler::new(shop_repo.clone(), notifier.clone()),
            update_shop_handler: UpdateShopHandler::new(
                shop_repo.clone(),
                caches.shops.clone(),
                notifier.clone(),
            ),
            delete_shop_handler: DeleteShopHandler::new(
                shop_repo.clone(),
                order_store.clone(),
                caches.shops.clone(),
                notifier.clone(),
            ),
            add_shop_member_handler: AddShopMemberHandler::new(
                shop_repo.clone(),
                book_repo.clone(),
                client_repo.clone(),
                caches.shops.clone(),
                notifier.clone(),
            ),
            remove_shop_member_handler: RemoveShopMemberHandler::new(
                shop_repo.clone(),
                caches.shops.clone(),
                notifier.clone(),
            ),
            create_order_handler: CreateOrderHandler::new(order_deps.clone()),
            update_order_handler: UpdateOrderHandler::new(order_deps.clone()),
            delete_order_handler: DeleteOrderHandler::new(order_deps),

            // Query handlers
            get_user_handler: GetUserHandler::new(user_repo.clone(), order_store.clone()),
            list_users_handler: ListUsersHandler::new(user_repo.clone()),
            get_publisher_handler: GetPublisherHandler::new(
                publisher_repo.clone(),
                caches.publishers.clone(),
            ),
            list_publishers_handler: ListPublishersHandler::new(publisher_repo),
            get_category_handler: GetCategoryHandler::new(
                category_repo.clone(),
                caches.categories.clone(),
            ),
            list_categories_handler: ListCategoriesHandler::new(category_repo),
            get_book_handler: GetBookHandler::new(book_repo.clone(), caches.books.clone()),
            list_books_handler: ListBooksHandler::new(book_repo),
            get_client_handler: GetClientHandler::new(client_repo.clone(), caches.clients.clone()),
            list_clients_handler: ListClientsHandler::new(client_repo),
            get_shop_handler: GetShopHandler::new(shop_repo.clone(), caches.shops),
            list_shops_handler: ListShopsHandler::new(shop_repo),
            get_order_handler: GetOrderHandler::new(order_store.clone()),
            list_orders_handler: ListOrdersHandler::new(order_store, user_repo.clone()),

            // Ports
            user_repo,
            token_service,
            image_storage,
            event_publisher,
        }
    }
}
