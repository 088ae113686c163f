//! SQLite Book Repository

use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::{like_pattern, map_db_error, parse_timestamp, parse_uuid, DbPool};
use crate::application::pagination::{Page, PageRequest};
use crate::application::ports::{BookFilter, BookRepositoryPort, RepositoryError};
use crate::domain::catalog::{Book, BookId, BookView, CategoryId};

/// 可排序列
const SORT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "author",
    "price",
    "stock",
    "created_at",
    "updated_at",
];

const SELECT_VIEW: &str = r#"
    SELECT b.id, b.name, b.author, b.publisher_id, b.category_id, b.image, b.description,
           b.price, b.stock, b.active, b.created_at, b.updated_at,
           p.name AS publisher_name, c.name AS category_name
    FROM books b
    JOIN publishers p ON p.id = b.publisher_id
    JOIN categories c ON c.id = b.category_id
"#;

/// SQLite Book Repository
pub struct SqliteBookRepository {
    pool: DbPool,
}

impl SqliteBookRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &BookFilter) {
        builder.push(" WHERE 1 = 1");
        if !filter.include_inactive {
            builder.push(" AND b.active = 1");
        }
        if let Some(publisher) = filter.publisher.as_deref().filter(|s| !s.trim().is_empty()) {
            builder
                .push(" AND p.name LIKE ")
                .push_bind(like_pattern(publisher))
                .push(" ESCAPE '\\'");
        }
        if let Some(category) = filter.category.as_deref().filter(|s| !s.trim().is_empty()) {
            builder
                .push(" AND c.name LIKE ")
                .push_bind(like_pattern(category))
                .push(" ESCAPE '\\'");
        }
        if let Some(max_price) = filter.max_price {
            builder.push(" AND b.price <= ").push_bind(max_price);
        }
    }
}

#[derive(FromRow)]
struct BookRow {
    id: i64,
    name: String,
    author: String,
    publisher_id: i64,
    category_id: String,
    image: String,
    description: String,
    price: f64,
    stock: i32,
    active: bool,
    created_at: String,
    updated_at: String,
    publisher_name: String,
    category_name: String,
}

impl TryFrom<BookRow> for BookView {
    type Error = RepositoryError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Ok(BookView {
            book: Book {
                id: row.id,
                name: row.name,
                author: row.author,
                publisher_id: row.publisher_id,
                category_id: parse_uuid(&row.category_id)?,
                image: row.image,
                description: row.description,
                price: row.price,
                stock: row.stock,
                active: row.active,
                created_at: parse_timestamp(&row.created_at)?,
                updated_at: parse_timestamp(&row.updated_at)?,
            },
            publisher_name: row.publisher_name,
            category_name: row.category_name,
        })
    }
}

#[async_trait]
impl BookRepositoryPort for SqliteBookRepository {
    async fn insert(&self, book: &Book) -> Result<BookId, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO books (name, author, publisher_id, category_id, image, description,
                               price, stock, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&book.name)
        .bind(&book.author)
        .bind(book.publisher_id)
        .bind(book.category_id.to_string())
        .bind(&book.image)
        .bind(&book.description)
        .bind(book.price)
        .bind(book.stock)
        .bind(book.active)
        .bind(book.created_at.to_rfc3339())
        .bind(book.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<BookView>, RepositoryError> {
        let row: Option<BookRow> = sqlx::query_as(&format!("{} WHERE b.id = ?", SELECT_VIEW))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(BookView::try_from).transpose()
    }

    async fn find_page(
        &self,
        filter: &BookFilter,
        page: &PageRequest,
    ) -> Result<Page<BookView>, RepositoryError> {
        let column = page
            .sort_field(SORT_COLUMNS)
            .ok_or_else(|| RepositoryError::unknown_sort(&page.sort_by))?;

        let mut count = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) FROM books b \
             JOIN publishers p ON p.id = b.publisher_id \
             JOIN categories c ON c.id = b.category_id",
        );
        Self::push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let mut select = QueryBuilder::<Sqlite>::new(SELECT_VIEW);
        Self::push_filter(&mut select, filter);
        select
            .push(format!(" ORDER BY b.{} {}", column, page.direction.as_sql()))
            .push(" LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows: Vec<BookRow> = select
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let content = rows
            .into_iter()
            .map(BookView::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(content, total as u64, page))
    }

    async fn update(&self, book: &Book) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE books SET
                name = ?, author = ?, publisher_id = ?, category_id = ?, image = ?,
                description = ?, price = ?, stock = ?, active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&book.name)
        .bind(&book.author)
        .bind(book.publisher_id)
        .bind(book.category_id.to_string())
        .bind(&book.image)
        .bind(&book.description)
        .bind(book.price)
        .bind(book.stock)
        .bind(book.active)
        .bind(book.updated_at.to_rfc3339())
        .bind(book.id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Book {}", book.id)));
        }
        Ok(())
    }

    async fn adjust_stock(&self, id: BookId, delta: i32) -> Result<i32, RepositoryError> {
        let stock: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE books SET stock = stock + ?, updated_at = ?
            WHERE id = ? AND stock + ? BETWEEN 0 AND ?
            RETURNING stock
            "#,
        )
        .bind(delta)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id)
        .bind(delta)
        .bind(i32::MAX)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        if let Some(stock) = stock {
            return Ok(stock);
        }

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        match exists {
            Some(_) => Err(RepositoryError::ConstraintViolation(format!(
                "Stock for book {} would leave the valid range",
                id
            ))),
            None => Err(RepositoryError::NotFound(format!("Book {}", id))),
        }
    }

    async fn exists_by_category(&self, category_id: CategoryId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE category_id = ?)")
                .bind(category_id.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(map_db_error)?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pagination::SortDirection;
    use crate::application::ports::{CategoryRepositoryPort, PublisherRepositoryPort};
    use crate::domain::catalog::{Category, Publisher};
    use crate::domain::DEFAULT_IMAGE;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteCategoryRepository,
        SqlitePublisherRepository,
    };
    use chrono::Utc;

    async fn setup() -> (SqliteBookRepository, i64, Category) {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let now = Utc::now();
        let publisher_id = SqlitePublisherRepository::new(pool.clone())
            .insert(&Publisher {
                id: 0,
                name: "Anagrama".to_string(),
                image: DEFAULT_IMAGE.to_string(),
                active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        let category = Category::new("Poetry", true);
        SqliteCategoryRepository::new(pool.clone())
            .insert(&category)
            .await
            .unwrap();

        (SqliteBookRepository::new(pool), publisher_id, category)
    }

    fn book(name: &str, price: f64, publisher_id: i64, category: &Category) -> Book {
        let now = Utc::now();
        Book {
            id: 0,
            name: name.to_string(),
            author: "Author".to_string(),
            publisher_id,
            category_id: category.id,
            image: DEFAULT_IMAGE.to_string(),
            description: "Description".to_string(),
            price,
            stock: 3,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_view() {
        let (repo, publisher_id, category) = setup().await;

        let id = repo
            .insert(&book("Veinte poemas", 9.5, publisher_id, &category))
            .await
            .unwrap();
        let view = repo.find_by_id(id).await.unwrap().unwrap();

        assert_eq!(view.book.id, id);
        assert_eq!(view.publisher_name, "Anagrama");
        assert_eq!(view.category_name, "Poetry");
        assert!(repo.find_by_id(id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_page_filters_and_sort() {
        let (repo, publisher_id, category) = setup().await;
        for (name, price) in [("A", 5.0), ("B", 15.0), ("C", 25.0)] {
            repo.insert(&book(name, price, publisher_id, &category))
                .await
                .unwrap();
        }

        let filter = BookFilter {
            max_price: Some(20.0),
            category: Some("poe".to_string()),
            ..Default::default()
        };
        let page = repo
            .find_page(&filter, &PageRequest::of(0, 10).sorted("price", SortDirection::Desc))
            .await
            .unwrap();
        assert_eq!(page.total_elements, 2);
        assert_eq!(page.content[0].book.name, "B");

        let err = repo
            .find_page(&BookFilter::default(), &PageRequest::of(0, 10).sorted("secret", SortDirection::Asc))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_inactive_books_hidden_from_listing() {
        let (repo, publisher_id, category) = setup().await;
        let id = repo
            .insert(&book("Gone", 1.0, publisher_id, &category))
            .await
            .unwrap();
        let mut stored = repo.find_by_id(id).await.unwrap().unwrap().book;
        stored.active = false;
        repo.update(&stored).await.unwrap();

        let page = repo
            .find_page(&BookFilter::default(), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_elements, 0);
        assert!(repo.exists_by_category(category.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_adjust_stock_never_negative() {
        let (repo, publisher_id, category) = setup().await;
        let id = repo
            .insert(&book("Stocked", 1.0, publisher_id, &category))
            .await
            .unwrap();

        assert_eq!(repo.adjust_stock(id, -2).await.unwrap(), 1);
        assert!(matches!(
            repo.adjust_stock(id, -2).await.unwrap_err(),
            RepositoryError::ConstraintViolation(_)
        ));
        assert_eq!(repo.adjust_stock(id, 4).await.unwrap(), 5);
        assert!(matches!(
            repo.adjust_stock(id, i32::MAX).await.unwrap_err(),
            RepositoryError::ConstraintViolation(_)
        ));
        assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().book.stock, 5);
        assert!(matches!(
            repo.adjust_stock(id + 1, 1).await.unwrap_err(),
            RepositoryError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_unknown_publisher_is_constraint_violation() {
        let (repo, _, category) = setup().await;
        let err = repo
            .insert(&book("Orphan", 1.0, 999, &category))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
    }
}
