//! SQLite Client Repository

use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::{like_pattern, map_db_error, parse_timestamp, parse_uuid, DbPool};
use crate::application::pagination::{Page, PageRequest};
use crate::application::ports::{ClientFilter, ClientRepositoryPort, RepositoryError};
use crate::domain::customer::{Address, Client, ClientId};

const SORT_COLUMNS: &[&str] = &["id", "name", "surname", "email", "created_at", "updated_at"];

const SELECT: &str = r#"
    SELECT id, name, surname, email, phone, street, number, city, province, country,
           postal_code, image, created_at, updated_at
    FROM clients
"#;

/// SQLite Client Repository
pub struct SqliteClientRepository {
    pool: DbPool,
}

impl SqliteClientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ClientFilter) {
        builder.push(" WHERE 1 = 1");
        let columns = [
            ("name", &filter.name),
            ("surname", &filter.surname),
            ("email", &filter.email),
            ("phone", &filter.phone),
        ];
        for (column, value) in columns {
            if let Some(value) = value.as_deref().filter(|s| !s.trim().is_empty()) {
                builder
                    .push(format!(" AND {} LIKE ", column))
                    .push_bind(like_pattern(value))
                    .push(" ESCAPE '\\'");
            }
        }
        if let Some(address) = filter.address.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(address);
            builder.push(" AND (");
            for (i, column) in ["street", "city", "province", "country", "postal_code"]
                .iter()
                .enumerate()
            {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder
                    .push(format!("{} LIKE ", column))
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\'");
            }
            builder.push(")");
        }
    }
}

#[derive(FromRow)]
struct ClientRow {
    id: String,
    name: String,
    surname: String,
    email: String,
    phone: String,
    street: String,
    number: String,
    city: String,
    province: String,
    country: String,
    postal_code: String,
    image: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ClientRow> for Client {
    type Error = RepositoryError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        Ok(Client {
            id: parse_uuid(&row.id)?,
            name: row.name,
            surname: row.surname,
            email: row.email,
            phone: row.phone,
            address: Address {
                street: row.street,
                number: row.number,
                city: row.city,
                province: row.province,
                country: row.country,
                postal_code: row.postal_code,
            },
            image: row.image,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl ClientRepositoryPort for SqliteClientRepository {
    async fn insert(&self, client: &Client) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, name, surname, email, phone, street, number, city, province,
                                 country, postal_code, image, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(client.id.to_string())
        .bind(&client.name)
        .bind(&client.surname)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address.street)
        .bind(&client.address.number)
        .bind(&client.address.city)
        .bind(&client.address.province)
        .bind(&client.address.country)
        .bind(&client.address.postal_code)
        .bind(&client.image)
        .bind(client.created_at.to_rfc3339())
        .bind(client.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: ClientId) -> Result<Option<Client>, RepositoryError> {
        let row: Option<ClientRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(Client::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>, RepositoryError> {
        let row: Option<ClientRow> = sqlx::query_as(&format!("{} WHERE email = ?", SELECT))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(Client::try_from).transpose()
    }

    async fn find_page(
        &self,
        filter: &ClientFilter,
        page: &PageRequest,
    ) -> Result<Page<Client>, RepositoryError> {
        let column = page
            .sort_field(SORT_COLUMNS)
            .ok_or_else(|| RepositoryError::unknown_sort(&page.sort_by))?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM clients");
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
            .build_query_as::<ClientRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let content = rows
            .into_iter()
            .map(Client::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(content, total as u64, page))
    }

    async fn update(&self, client: &Client) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE clients SET
                name = ?, surname = ?, email = ?, phone = ?, street = ?, number = ?, city = ?,
                province = ?, country = ?, postal_code = ?, image = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&client.name)
        .bind(&client.surname)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address.street)
        .bind(&client.address.number)
        .bind(&client.address.city)
        .bind(&client.address.province)
        .bind(&client.address.country)
        .bind(&client.address.postal_code)
        .bind(&client.image)
        .bind(client.updated_at.to_rfc3339())
        .bind(client.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Client {}", client.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: ClientId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Client {}", id)));
        }
        Ok(())
    }
}
