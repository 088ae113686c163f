//! MongoDB Order Store
//!
//! 订单以 `orders` 集合保存，`_id` 为 ObjectId，关联 ID 保存为字符串

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

use crate::application::pagination::{Page, PageRequest, SortDirection};
use crate::application::ports::{
    OrderFilter, OrderReference, OrderStorePort, RepositoryError, ORDER_SORT_FIELDS,
};
use crate::domain::catalog::BookId;
use crate::domain::identity::UserId;
use crate::domain::ordering::{Order, OrderId, OrderLine};

const COLLECTION: &str = "orders";

/// 重复键错误码
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Serialize, Deserialize)]
struct OrderDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    user_id: String,
    client_id: String,
    shop_id: String,
    order_lines: Vec<OrderLineDocument>,
    total: f64,
    total_books: i32,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OrderLineDocument {
    book_id: BookId,
    quantity: i32,
    price: f64,
    total: f64,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    #[serde(rename = "_id")]
    id: ObjectId,
}

impl TryFrom<&Order> for OrderDocument {
    type Error = RepositoryError;

    fn try_from(order: &Order) -> Result<Self, Self::Error> {
        Ok(Self {
            id: order
                .id
                .to_object_id()
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            user_id: order.user_id.to_string(),
            client_id: order.client_id.to_string(),
            shop_id: order.shop_id.to_string(),
            order_lines: order
                .order_lines
                .iter()
                .map(|line| OrderLineDocument {
                    book_id: line.book_id,
                    quantity: line.quantity,
                    price: line.price,
                    total: line.total,
                })
                .collect(),
            total: order.total,
            total_books: order.total_books,
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
    }
}

impl TryFrom<OrderDocument> for Order {
    type Error = RepositoryError;

    fn try_from(document: OrderDocument) -> Result<Self, Self::Error> {
        let parse = |value: &str| {
            uuid::Uuid::parse_str(value)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))
        };
        Ok(Order {
            id: OrderId::from(document.id),
            user_id: parse(&document.user_id)?,
            client_id: parse(&document.client_id)?,
            shop_id: parse(&document.shop_id)?,
            order_lines: document
                .order_lines
                .into_iter()
                .map(|line| OrderLine {
                    book_id: line.book_id,
                    quantity: line.quantity,
                    price: line.price,
                    total: line.total,
                })
                .collect(),
            total: document.total,
            total_books: document.total_books,
            created_at: document.created_at,
            updated_at: document.updated_at,
        })
    }
}

fn map_mongo_error(error: mongodb::error::Error) -> RepositoryError {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY => {
            RepositoryError::Duplicate(e.message.clone())
        }
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::ConnectionPoolCleared { .. } => {
            RepositoryError::Unavailable(error.to_string())
        }
        _ => RepositoryError::DatabaseError(error.to_string()),
    }
}

/// 非法 ObjectId 不可能命中任何文档
fn object_id(id: &OrderId) -> Option<ObjectId> {
    id.to_object_id().ok()
}

fn filter_document(filter: &OrderFilter) -> Document {
    let mut document = Document::new();
    if let Some(user_id) = filter.user_id {
        document.insert("user_id", user_id.to_string());
    }
    document
}

/// MongoDB 订单存储
pub struct MongoOrderStore {
    collection: Collection<OrderDocument>,
}

impl MongoOrderStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION),
        }
    }

    /// 连接 MongoDB，校验可达并创建索引
    pub async fn connect(uri: &str, database: &str) -> Result<Self, RepositoryError> {
        let client = Client::with_uri_str(uri).await.map_err(map_mongo_error)?;
        let db = client.database(database);

        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(map_mongo_error)?;

        let store = Self::new(&db);
        store.ensure_indexes().await?;

        tracing::info!(database = %database, "MongoDB order store connected");
        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), RepositoryError> {
        for field in ["user_id", "client_id", "shop_id"] {
            let index = IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(
                    IndexOptions::builder()
                        .name(format!("idx_orders_{}", field))
                        .build(),
                )
                .build();
            self.collection
                .create_index(index)
                .await
                .map_err(map_mongo_error)?;
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStorePort for MongoOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        let document = OrderDocument::try_from(order)?;
        self.collection
            .insert_one(&document)
            .await
            .map_err(map_mongo_error)?;

        tracing::debug!(order_id = %order.id, "Order document inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let Some(oid) = object_id(id) else {
            return Ok(None);
        };
        let document = self
            .collection
            .find_one(doc! { "_id": oid })
            .await
            .map_err(map_mongo_error)?;

        document.map(Order::try_from).transpose()
    }

    async fn find_page(
        &self,
        filter: &OrderFilter,
        page: &PageRequest,
    ) -> Result<Page<Order>, RepositoryError> {
        let field = page
            .sort_field(ORDER_SORT_FIELDS)
            .ok_or_else(|| RepositoryError::unknown_sort(&page.sort_by))?;
        let field = if field == "id" { "_id" } else { field };
        let direction = match page.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        };

        let query = filter_document(filter);
        let total = self
            .collection
            .count_documents(query.clone())
            .await
            .map_err(map_mongo_error)?;

        let documents: Vec<OrderDocument> = self
            .collection
            .find(query)
            .sort(doc! { field: direction })
            .skip(page.offset())
            .limit(page.limit() as i64)
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)?;

        let content = documents
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(content, total, page))
    }

    async fn replace(&self, order: &Order) -> Result<(), RepositoryError> {
        let document = OrderDocument::try_from(order)?;
        let result = self
            .collection
            .replace_one(doc! { "_id": document.id }, &document)
            .await
            .map_err(map_mongo_error)?;

        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound(format!("Order {}", order.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &OrderId) -> Result<bool, RepositoryError> {
        let Some(oid) = object_id(id) else {
            return Ok(false);
        };
        let result = self
            .collection
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count > 0)
    }

    async fn exists_by(&self, reference: OrderReference) -> Result<bool, RepositoryError> {
        let query = match reference {
            OrderReference::User(id) => doc! { "user_id": id.to_string() },
            OrderReference::Client(id) => doc! { "client_id": id.to_string() },
            OrderReference::Shop(id) => doc! { "shop_id": id.to_string() },
        };
        let found = self
            .collection
            .clone_with_type::<Document>()
            .find_one(query)
            .projection(doc! { "_id": 1 })
            .await
            .map_err(map_mongo_error)?;

        Ok(found.is_some())
    }

    async fn ids_by_user(&self, user_id: UserId) -> Result<Vec<OrderId>, RepositoryError> {
        let ids: Vec<IdOnly> = self
            .collection
            .clone_with_type::<IdOnly>()
            .find(doc! { "user_id": user_id.to_string() })
            .projection(doc! { "_id": 1 })
            .sort(doc! { "created_at": 1 })
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)?;

        Ok(ids.into_iter().map(|doc| OrderId::from(doc.id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_document_conversion_keeps_order_intact() {
        let order = Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            vec![OrderLine::new(7, 2, 3.25), OrderLine::new(9, 1, 10.0)],
        )
        .unwrap();

        let document = OrderDocument::try_from(&order).unwrap();
        assert_eq!(document.id.to_hex(), order.id.as_str());
        assert_eq!(document.user_id, order.user_id.to_string());

        let bson = bson::to_document(&document).unwrap();
        assert!(bson.get_object_id("_id").is_ok());
        assert!(bson.get_datetime("created_at").is_ok());

        let restored = Order::try_from(bson::from_document::<OrderDocument>(bson).unwrap()).unwrap();
        assert_eq!(restored.id, order.id);
        assert_eq!(restored.order_lines, order.order_lines);
        assert_eq!(restored.total, order.total);
        // BSON 日期精度为毫秒
        assert_eq!(
            restored.created_at.timestamp_millis(),
            order.created_at.timestamp_millis()
        );
    }

    #[test]
    fn test_filter_document() {
        let user_id = Uuid::new_v4();
        let filter = OrderFilter {
            user_id: Some(user_id),
        };
        assert_eq!(
            filter_document(&filter),
            doc! { "user_id": user_id.to_string() }
        );
        assert!(filter_document(&OrderFilter::default()).is_empty());
    }
}
