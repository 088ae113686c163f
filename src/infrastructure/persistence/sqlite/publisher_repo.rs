//! SQLite Publisher Repository

use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::{like_pattern, map_db_error, parse_timestamp, DbPool};
use crate::application::pagination::{Page, PageRequest};
use crate::application::ports::{PublisherFilter, PublisherRepositoryPort, RepositoryError};
use crate::domain::catalog::{Publisher, PublisherId};

const SORT_COLUMNS: &[&str] = &["id", "name", "created_at", "updated_at"];

const SELECT: &str = "SELECT id, name, image, active, created_at, updated_at FROM publishers";

/// SQLite Publisher Repository
pub struct SqlitePublisherRepository {
    pool: DbPool,
}

impl SqlitePublisherRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &PublisherFilter) {
        builder.push(" WHERE 1 = 1");
        if !filter.include_inactive {
            builder.push(" AND active = 1");
        }
        if let Some(name) = filter.name.as_deref().filter(|s| !s.trim().is_empty()) {
            builder
                .push(" AND name LIKE ")
                .push_bind(like_pattern(name))
                .push(" ESCAPE '\\'");
        }
    }
}

#[derive(FromRow)]
struct PublisherRow {
    id: i64,
    name: String,
    image: String,
    active: bool,
    created_at: String,
    updated_at: String,
}

impl TryFrom<PublisherRow> for Publisher {
    type Error = RepositoryError;

    fn try_from(row: PublisherRow) -> Result<Self, Self::Error> {
        Ok(Publisher {
            id: row.id,
            name: row.name,
            image: row.image,
            active: row.active,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl PublisherRepositoryPort for SqlitePublisherRepository {
    async fn insert(&self, publisher: &Publisher) -> Result<PublisherId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO publishers (name, image, active, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&publisher.name)
        .bind(&publisher.image)
        .bind(publisher.active)
        .bind(publisher.created_at.to_rfc3339())
        .bind(publisher.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn find_by_id(&self, id: PublisherId) -> Result<Option<Publisher>, RepositoryError> {
        let row: Option<PublisherRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(Publisher::try_from).transpose()
    }

    async fn find_page(
        &self,
        filter: &PublisherFilter,
        page: &PageRequest,
    ) -> Result<Page<Publisher>, RepositoryError> {
        let column = page
            .sort_field(SORT_COLUMNS)
            .ok_or_else(|| RepositoryError::unknown_sort(&page.sort_by))?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM publishers");
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
            .build_query_as::<PublisherRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let content = rows
            .into_iter()
            .map(Publisher::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(content, total as u64, page))
    }

    async fn update(&self, publisher: &Publisher) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE publishers SET name = ?, image = ?, active = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&publisher.name)
        .bind(&publisher.image)
        .bind(publisher.active)
        .bind(publisher.updated_at.to_rfc3339())
        .bind(publisher.id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Publisher {}", publisher.id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_IMAGE;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};
    use chrono::Utc;

    async fn repo() -> SqlitePublisherRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqlitePublisherRepository::new(pool)
    }

    fn publisher(name: &str) -> Publisher {
        let now = Utc::now();
        Publisher {
            id: 0,
            name: name.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_ids_are_generated() {
        let repo = repo().await;
        let first = repo.insert(&publisher("Alfaguara")).await.unwrap();
        let second = repo.insert(&publisher("Salamandra")).await.unwrap();
        assert!(second > first);

        let found = repo.find_by_id(second).await.unwrap().unwrap();
        assert_eq!(found.name, "Salamandra");
    }

    #[tokio::test]
    async fn test_filter_by_name_ignores_case_and_inactive() {
        let repo = repo().await;
        repo.insert(&publisher("Alfaguara")).await.unwrap();
        let id = repo.insert(&publisher("Alianza")).await.unwrap();

        let mut alianza = repo.find_by_id(id).await.unwrap().unwrap();
        alianza.active = false;
        repo.update(&alianza).await.unwrap();

        let filter = PublisherFilter {
            name: Some("AL".to_string()),
            include_inactive: false,
        };
        let page = repo.find_page(&filter, &PageRequest::default()).await.unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].name, "Alfaguara");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = repo().await;
        let mut missing = publisher("Ghost");
        missing.id = 42;
        assert!(matches!(
            repo.update(&missing).await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
    }
}
