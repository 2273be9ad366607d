//! PostgreSQL record store. Table DDL, single-row queries, chunked batch insert in one
//! transaction, and TRUNCATE with identity reset.

use super::CustomerStore;
use crate::error::StoreError;
use crate::model::{Customer, CustomerPatch, NewCustomer, Page, CUSTOMERS_TABLE, EMAIL_UNIQUE_CONSTRAINT};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool, Postgres, QueryBuilder};
use std::collections::HashSet;
use std::str::FromStr;

const COLUMNS: &str = "id, name, age, email";

/// Rows per multi-row INSERT. Three binds per row keeps a chunk far below the 65535 bind limit.
const INSERT_CHUNK_ROWS: usize = 5_000;

#[derive(Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        PgCustomerStore { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(PgCustomerStore { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id SERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                age INTEGER NOT NULL,
                email VARCHAR(255) NOT NULL CONSTRAINT {} UNIQUE
            )
            "#,
            CUSTOMERS_TABLE, EMAIL_UNIQUE_CONSTRAINT
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        let name_index = format!(
            "CREATE INDEX IF NOT EXISTS ix_{0}_name ON {0} (name)",
            CUSTOMERS_TABLE
        );
        sqlx::query(&name_index).execute(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", CUSTOMERS_TABLE))
            .fetch_one(&self.pool)
            .await?;
        Ok(n.max(0) as u64)
    }

    async fn get(&self, id: i32) -> Result<Option<Customer>, StoreError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, CUSTOMERS_TABLE);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError> {
        let sql = format!("SELECT {} FROM {} WHERE email = $1", COLUMNS, CUSTOMERS_TABLE);
        tracing::debug!(sql = %sql, email, "query");
        let row = sqlx::query_as::<_, Customer>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Page<Customer>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id OFFSET $1 LIMIT $2",
            COLUMNS, CUSTOMERS_TABLE
        );
        tracing::debug!(sql = %sql, skip, limit, "query");
        let records = sqlx::query_as::<_, Customer>(&sql)
            .bind(i64::try_from(skip).unwrap_or(i64::MAX))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        let total = self.count().await?;
        Ok(Page {
            records,
            total,
            skip,
            limit,
        })
    }

    async fn insert(&self, customer: &NewCustomer) -> Result<Customer, StoreError> {
        let sql = format!(
            "INSERT INTO {} (name, age, email) VALUES ($1, $2, $3) RETURNING {}",
            CUSTOMERS_TABLE, COLUMNS
        );
        tracing::debug!(sql = %sql, email = %customer.email, "query");
        sqlx::query_as::<_, Customer>(&sql)
            .bind(&customer.name)
            .bind(customer.age)
            .bind(&customer.email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(e, Some(&customer.email)))
    }

    async fn update(&self, id: i32, patch: &CustomerPatch) -> Result<Option<Customer>, StoreError> {
        if patch.is_empty() {
            return self.get(id).await;
        }
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!("UPDATE {} SET ", CUSTOMERS_TABLE));
        {
            let mut set = qb.separated(", ");
            if let Some(name) = &patch.name {
                set.push("name = ").push_bind_unseparated(name);
            }
            if let Some(age) = patch.age {
                set.push("age = ").push_bind_unseparated(age);
            }
            if let Some(email) = &patch.email {
                set.push("email = ").push_bind_unseparated(email);
            }
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {}", COLUMNS));
        tracing::debug!(sql = %qb.sql(), id, "query");
        qb.build_query_as::<Customer>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(e, patch.email.as_deref()))
    }

    async fn delete(&self, id: i32) -> Result<Option<Customer>, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING {}", CUSTOMERS_TABLE, COLUMNS);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn all_emails(&self) -> Result<HashSet<String>, StoreError> {
        let emails: Vec<String> = sqlx::query_scalar(&format!("SELECT email FROM {}", CUSTOMERS_TABLE))
            .fetch_all(&self.pool)
            .await?;
        Ok(emails.into_iter().collect())
    }

    async fn insert_batch(&self, customers: &[NewCustomer]) -> Result<u64, StoreError> {
        if customers.is_empty() {
            return Ok(0);
        }
        // Dropping the transaction without commit rolls it back.
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;
        for chunk in customers.chunks(INSERT_CHUNK_ROWS) {
            let mut qb: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO {} (name, age, email) ", CUSTOMERS_TABLE));
            qb.push_values(chunk, |mut row, c| {
                row.push_bind(&c.name).push_bind(c.age).push_bind(&c.email);
            });
            let result = qb.build().execute(&mut *tx).await?;
            inserted += result.rows_affected();
            tracing::debug!(rows = chunk.len(), inserted, "batch chunk (tx)");
        }
        tx.commit().await?;
        Ok(inserted)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("TRUNCATE TABLE {} RESTART IDENTITY", CUSTOMERS_TABLE))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before opening the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url)
        .map_err(|e| StoreError::Unavailable(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split `database_url` into an admin URL on the `postgres` database and the target database
/// name. The name is empty when the URL has no path.
fn parse_db_name_from_url(url: &str) -> Result<(String, String), StoreError> {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (url, None),
    };
    let authority_start = base
        .find("://")
        .map(|i| i + 3)
        .ok_or_else(|| StoreError::Unavailable("DATABASE_URL: missing scheme".into()))?;
    let path_start = match base[authority_start..].find('/') {
        Some(i) => authority_start + i,
        None => return Ok((url.to_string(), String::new())),
    };
    let db_name = base[path_start + 1..].trim();
    let admin_url = match query {
        Some(q) => format!("{}/postgres?{}", &base[..path_start], q),
        None => format!("{}/postgres", &base[..path_start]),
    };
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_url_targets_postgres_database() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@localhost:5432/customers").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(db, "customers");
    }

    #[test]
    fn admin_url_keeps_query_string() {
        let (admin, db) = parse_db_name_from_url("postgres://localhost/shop?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://localhost/postgres?sslmode=disable");
        assert_eq!(db, "shop");
    }

    #[test]
    fn slash_in_query_string_is_not_the_database() {
        let (admin, db) =
            parse_db_name_from_url("postgres://u@db:5432/customers?sslrootcert=/certs/ca.pem").unwrap();
        assert_eq!(admin, "postgres://u@db:5432/postgres?sslrootcert=/certs/ca.pem");
        assert_eq!(db, "customers");
    }

    #[test]
    fn url_without_path_names_no_database() {
        let (admin, db) = parse_db_name_from_url("postgres://u@db:5432").unwrap();
        assert_eq!(admin, "postgres://u@db:5432");
        assert_eq!(db, "");
        let (_, db) = parse_db_name_from_url("postgres://u@db:5432?sslmode=require").unwrap();
        assert_eq!(db, "");
    }

    #[test]
    fn url_without_scheme_is_rejected() {
        assert!(matches!(
            parse_db_name_from_url("localhost/customers"),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn identifiers_are_double_quoted() {
        assert_eq!(quote_ident("my\"db"), "\"my\"\"db\"");
    }
}
