//! SQLite Shop Repository
//!
//! 门店主表加两张关联表（shop_books、shop_clients），删除门店时级联删除关联

use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use std::collections::BTreeSet;

use super::{like_pattern, map_db_error, parse_timestamp, parse_uuid, DbPool};
use crate::application::pagination::{Page, PageRequest};
use crate::application::ports::{RepositoryError, ShopFilter, ShopRepositoryPort};
use crate::domain::catalog::BookId;
use crate::domain::customer::{Address, ClientId};
use crate::domain::shop::{Shop, ShopId};

const SORT_COLUMNS: &[&str] = &["id", "name", "city", "created_at", "updated_at"];

const SELECT: &str = r#"
    SELECT id, name, street, number, city, province, country, postal_code, created_at, updated_at
    FROM shops
"#;

/// SQLite Shop Repository
pub struct SqliteShopRepository {
    pool: DbPool,
}

impl SqliteShopRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ShopFilter) {
        builder.push(" WHERE 1 = 1");
        if let Some(name) = filter.name.as_deref().filter(|s| !s.trim().is_empty()) {
            builder
                .push(" AND name LIKE ")
                .push_bind(like_pattern(name))
                .push(" ESCAPE '\\'");
        }
        if let Some(city) = filter.city.as_deref().filter(|s| !s.trim().is_empty()) {
            builder
                .push(" AND city LIKE ")
                .push_bind(like_pattern(city))
                .push(" ESCAPE '\\'");
        }
    }

    /// 读取关联集合并组装聚合
    async fn assemble(&self, row: ShopRow) -> Result<Shop, RepositoryError> {
        let book_ids: Vec<i64> =
            sqlx::query_scalar("SELECT book_id FROM shop_books WHERE shop_id = ? ORDER BY book_id")
                .bind(&row.id)
                .fetch_all(&self.pool)
                .await
                .map_err(map_db_error)?;

        let client_ids: Vec<String> = sqlx::query_scalar(
            "SELECT client_id FROM shop_clients WHERE shop_id = ? ORDER BY client_id",
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Shop {
            id: parse_uuid(&row.id)?,
            name: row.name,
            address: Address {
                street: row.street,
                number: row.number,
                city: row.city,
                province: row.province,
                country: row.country,
                postal_code: row.postal_code,
            },
            book_ids: book_ids.into_iter().collect(),
            client_ids: client_ids
                .iter()
                .map(|id| parse_uuid(id))
                .collect::<Result<BTreeSet<_>, _>>()?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }

    async fn insert_members(conn: &mut SqliteConnection, shop: &Shop) -> Result<(), RepositoryError> {
        for book_id in &shop.book_ids {
            sqlx::query("INSERT INTO shop_books (shop_id, book_id) VALUES (?, ?)")
                .bind(shop.id.to_string())
                .bind(book_id)
                .execute(&mut *conn)
                .await
                .map_err(map_db_error)?;
        }
        for client_id in &shop.client_ids {
            sqlx::query("INSERT INTO shop_clients (shop_id, client_id) VALUES (?, ?)")
                .bind(shop.id.to_string())
                .bind(client_id.to_string())
                .execute(&mut *conn)
                .await
                .map_err(map_db_error)?;
        }
        Ok(())
    }
}

#[derive(FromRow)]
struct ShopRow {
    id: String,
    name: String,
    street: String,
    number: String,
    city: String,
    province: String,
    country: String,
    postal_code: String,
    created_at: String,
    updated_at: String,
}

#[async_trait]
impl ShopRepositoryPort for SqliteShopRepository {
    async fn insert(&self, shop: &Shop) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO shops (id, name, street, number, city, province, country, postal_code,
                               created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(shop.id.to_string())
        .bind(&shop.name)
        .bind(&shop.address.street)
        .bind(&shop.address.number)
        .bind(&shop.address.city)
        .bind(&shop.address.province)
        .bind(&shop.address.country)
        .bind(&shop.address.postal_code)
        .bind(shop.created_at.to_rfc3339())
        .bind(shop.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        Self::insert_members(&mut tx, shop).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        let row: Option<ShopRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_page(
        &self,
        filter: &ShopFilter,
        page: &PageRequest,
    ) -> Result<Page<Shop>, RepositoryError> {
        let column = page
            .sort_field(SORT_COLUMNS)
            .ok_or_else(|| RepositoryError::unknown_sort(&page.sort_by))?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM shops");
        Self::push_filter(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let mut select = QueryBuilder::<Sqlite>::new(SELECT);
        Self::push_filter(&mut select, filter);
        select
            .push(format!(" ORDER BY {} {}", column, page.direction.as_sql()))
            .push(" LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows = select
            .build_query_as::<ShopRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let mut content = Vec::with_capacity(rows.len());
        for row in rows {
            content.push(self.assemble(row).await?);
        }

        Ok(Page::new(content, total as u64, page))
    }

    async fn update(&self, shop: &Shop) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE shops SET
                name = ?, street = ?, number = ?, city = ?, province = ?, country = ?,
                postal_code = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&shop.name)
        .bind(&shop.address.street)
        .bind(&shop.address.number)
        .bind(&shop.address.city)
        .bind(&shop.address.province)
        .bind(&shop.address.country)
        .bind(&shop.address.postal_code)
        .bind(shop.updated_at.to_rfc3339())
        .bind(shop.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Shop {}", shop.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: ShopId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shops WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Shop {}", id)));
        }
        Ok(())
    }

    async fn add_book(&self, shop_id: ShopId, book_id: BookId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO shop_books (shop_id, book_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(shop_id.to_string())
        .bind(book_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_book(&self, shop_id: ShopId, book_id: BookId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop_books WHERE shop_id = ? AND book_id = ?")
            .bind(shop_id.to_string())
            .bind(book_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_client(
        &self,
        shop_id: ShopId,
        client_id: ClientId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO shop_clients (shop_id, client_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(shop_id.to_string())
        .bind(client_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_client(
        &self,
        shop_id: ShopId,
        client_id: ClientId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop_clients WHERE shop_id = ? AND client_id = ?")
            .bind(shop_id.to_string())
            .bind(client_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ClientRepositoryPort;
    use crate::domain::customer::Client;
    use crate::domain::DEFAULT_IMAGE;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteClientRepository,
    };
    use chrono::Utc;
    use uuid::Uuid;

    fn address(city: &str) -> Address {
        Address {
            street: "Rambla".to_string(),
            number: "10".to_string(),
            city: city.to_string(),
            province: city.to_string(),
            country: "Spain".to_string(),
            postal_code: "08002".to_string(),
        }
    }

    async fn setup() -> (SqliteShopRepository, SqliteClientRepository) {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (
            SqliteShopRepository::new(pool.clone()),
            SqliteClientRepository::new(pool),
        )
    }

    #[tokio::test]
    async fn test_membership_lifecycle() {
        let (shops, clients) = setup().await;
        let shop = Shop::new("Casa del Libro", address("Barcelona"));
        shops.insert(&shop).await.unwrap();

        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            name: "Jordi".to_string(),
            surname: "Puig".to_string(),
            email: "jordi@example.com".to_string(),
            phone: "934000000".to_string(),
            address: address("Barcelona"),
            image: DEFAULT_IMAGE.to_string(),
            created_at: now,
            updated_at: now,
        };
        clients.insert(&client).await.unwrap();

        assert!(shops.add_client(shop.id, client.id).await.unwrap());
        assert!(!shops.add_client(shop.id, client.id).await.unwrap());

        let loaded = shops.find_by_id(shop.id).await.unwrap().unwrap();
        assert!(loaded.serves(&client.id));

        assert!(shops.remove_client(shop.id, client.id).await.unwrap());
        assert!(!shops.remove_client(shop.id, client.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_book_is_constraint_violation() {
        let (shops, _) = setup().await;
        let shop = Shop::new("Central", address("Madrid"));
        shops.insert(&shop).await.unwrap();

        assert!(matches!(
            shops.add_book(shop.id, 404).await.unwrap_err(),
            RepositoryError::ConstraintViolation(_)
        ));
    }

    #[tokio::test]
    async fn test_filter_by_city_and_delete() {
        let (shops, _) = setup().await;
        let madrid = Shop::new("Norte", address("Madrid"));
        shops.insert(&madrid).await.unwrap();
        shops
            .insert(&Shop::new("Sur", address("Granada")))
            .await
            .unwrap();

        let filter = ShopFilter {
            city: Some("madr".to_string()),
            ..Default::default()
        };
        let page = shops.find_page(&filter, &PageRequest::default()).await.unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].id, madrid.id);

        shops.delete(madrid.id).await.unwrap();
        assert!(shops.find_by_id(madrid.id).await.unwrap().is_none());
    }
}
