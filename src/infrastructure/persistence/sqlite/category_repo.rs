//! SQLite Category Repository

use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::{like_pattern, map_db_error, parse_timestamp, parse_uuid, DbPool};
use crate::application::pagination::{Page, PageRequest};
use crate::application::ports::{CategoryFilter, CategoryRepositoryPort, RepositoryError};
use crate::domain::catalog::{Category, CategoryId};

const SORT_COLUMNS: &[&str] = &["id", "name", "active", "created_at", "updated_at"];

const SELECT: &str = "SELECT id, name, active, created_at, updated_at FROM categories";

/// SQLite Category Repository
pub struct SqliteCategoryRepository {
    pool: DbPool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &CategoryFilter) {
        builder.push(" WHERE 1 = 1");
        if let Some(name) = filter.name.as_deref().filter(|s| !s.trim().is_empty()) {
            builder
                .push(" AND name LIKE ")
                .push_bind(like_pattern(name))
                .push(" ESCAPE '\\'");
        }
        if let Some(active) = filter.active {
            builder.push(" AND active = ").push_bind(active);
        }
    }
}

#[derive(FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    active: bool,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Category {
            id: parse_uuid(&row.id)?,
            name: row.name,
            active: row.active,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl CategoryRepositoryPort for SqliteCategoryRepository {
    async fn insert(&self, category: &Category) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO categories (id, name, active, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(category.id.to_string())
        .bind(&category.name)
        .bind(category.active)
        .bind(category.created_at.to_rfc3339())
        .bind(category.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row: Option<CategoryRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(Category::try_from).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        // name 列为 COLLATE NOCASE
        let row: Option<CategoryRow> = sqlx::query_as(&format!("{} WHERE name = ?", SELECT))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(Category::try_from).transpose()
    }

    async fn find_page(
        &self,
        filter: &CategoryFilter,
        page: &PageRequest,
    ) -> Result<Page<Category>, RepositoryError> {
        let column = page
            .sort_field(SORT_COLUMNS)
            .ok_or_else(|| RepositoryError::unknown_sort(&page.sort_by))?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM categories");
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
            .build_query_as::<CategoryRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let content = rows
            .into_iter()
            .map(Category::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(content, total as u64, page))
    }

    async fn update(&self, category: &Category) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE categories SET name = ?, active = ?, updated_at = ? WHERE id = ?")
                .bind(&category.name)
                .bind(category.active)
                .bind(category.updated_at.to_rfc3339())
                .bind(category.id.to_string())
                .execute(&self.pool)
                .await
                .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Category {}", category.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Category {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn repo() -> SqliteCategoryRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteCategoryRepository::new(pool)
    }

    #[tokio::test]
    async fn test_name_is_unique_ignoring_case() {
        let repo = repo().await;
        repo.insert(&Category::new("Terror", true)).await.unwrap();

        let err = repo.insert(&Category::new("TERROR", true)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));

        let found = repo.find_by_name("terror").await.unwrap().unwrap();
        assert_eq!(found.name, "Terror");
    }

    #[tokio::test]
    async fn test_filter_active() {
        let repo = repo().await;
        repo.insert(&Category::new("Drama", true)).await.unwrap();
        repo.insert(&Category::new("Comedy", false)).await.unwrap();

        let filter = CategoryFilter {
            name: None,
            active: Some(false),
        };
        let page = repo.find_page(&filter, &PageRequest::default()).await.unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].name, "Comedy");
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let category = Category::new("Essay", true);
        repo.insert(&category).await.unwrap();

        repo.delete(category.id).await.unwrap();
        assert!(repo.find_by_id(category.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(category.id).await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
    }
}
