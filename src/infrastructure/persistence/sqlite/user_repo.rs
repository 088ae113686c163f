//! SQLite User Repository

use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::{like_pattern, map_db_error, parse_timestamp, parse_uuid, DbPool};
use crate::application::pagination::{Page, PageRequest};
use crate::application::ports::{RepositoryError, UserFilter, UserRepositoryPort};
use crate::domain::identity::{Role, User, UserId};

const SORT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "surname",
    "username",
    "email",
    "created_at",
    "updated_at",
];

const SELECT: &str = r#"
    SELECT id, name, surname, username, email, password_hash, roles, is_deleted,
           created_at, updated_at
    FROM users
"#;

/// SQLite User Repository
pub struct SqliteUserRepository {
    pool: DbPool,
}

impl SqliteUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &UserFilter) {
        builder.push(" WHERE 1 = 1");
        if let Some(username) = filter.username.as_deref().filter(|s| !s.trim().is_empty()) {
            builder
                .push(" AND username LIKE ")
                .push_bind(like_pattern(username))
                .push(" ESCAPE '\\'");
        }
        if let Some(email) = filter.email.as_deref().filter(|s| !s.trim().is_empty()) {
            builder
                .push(" AND email LIKE ")
                .push_bind(like_pattern(email))
                .push(" ESCAPE '\\'");
        }
        if let Some(is_deleted) = filter.is_deleted {
            builder.push(" AND is_deleted = ").push_bind(is_deleted);
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: String,
    name: String,
    surname: String,
    username: String,
    email: String,
    password_hash: String,
    roles: String,
    is_deleted: bool,
    created_at: String,
    updated_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_uuid(&row.id)?,
            name: row.name,
            surname: row.surname,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            roles: Role::split(&row.roles)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            is_deleted: row.is_deleted,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl UserRepositoryPort for SqliteUserRepository {
    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, surname, username, email, password_hash, roles,
                               is_deleted, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(Role::join(&user.roles))
        .bind(user.is_deleted)
        .bind(user.created_at.to_rfc3339())
        .bind(user.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{} WHERE username = ?", SELECT))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_page(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> Result<Page<User>, RepositoryError> {
        let column = page
            .sort_field(SORT_COLUMNS)
            .ok_or_else(|| RepositoryError::unknown_sort(&page.sort_by))?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users");
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
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let content = rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(content, total as u64, page))
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = ?, surname = ?, username = ?, email = ?, password_hash = ?, roles = ?,
                is_deleted = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(Role::join(&user.roles))
        .bind(user.is_deleted)
        .bind(user.updated_at.to_rfc3339())
        .bind(user.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("User {}", user.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("User {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};
    use chrono::Utc;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    async fn repo() -> SqliteUserRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteUserRepository::new(pool)
    }

    fn user(username: &str, email: &str, roles: BTreeSet<Role>) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Grace".to_string(),
            surname: "Hopper".to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            roles,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_roles_persist() {
        let repo = repo().await;
        let admin = user(
            "grace",
            "grace@example.com",
            [Role::User, Role::Admin].into_iter().collect(),
        );
        repo.insert(&admin).await.unwrap();

        let found = repo.find_by_username("GRACE").await.unwrap().unwrap();
        assert_eq!(found.id, admin.id);
        assert!(found.is_admin());
        assert_eq!(found.password_hash, admin.password_hash);
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email() {
        let repo = repo().await;
        let roles: BTreeSet<Role> = [Role::User].into_iter().collect();
        repo.insert(&user("grace", "grace@example.com", roles.clone()))
            .await
            .unwrap();

        assert!(matches!(
            repo.insert(&user("Grace", "other@example.com", roles.clone()))
                .await
                .unwrap_err(),
            RepositoryError::Duplicate(_)
        ));
        assert!(matches!(
            repo.insert(&user("other", "GRACE@example.com", roles))
                .await
                .unwrap_err(),
            RepositoryError::Duplicate(_)
        ));
    }

    #[tokio::test]
    async fn test_filter_deleted() {
        let repo = repo().await;
        let roles: BTreeSet<Role> = [Role::User].into_iter().collect();
        let mut gone = user("gone", "gone@example.com", roles.clone());
        repo.insert(&gone).await.unwrap();
        repo.insert(&user("here", "here@example.com", roles))
            .await
            .unwrap();

        gone.is_deleted = true;
        repo.update(&gone).await.unwrap();

        let filter = UserFilter {
            is_deleted: Some(true),
            ..Default::default()
        };
        let page = repo.find_page(&filter, &PageRequest::default()).await.unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].username, "gone");
    }
}
