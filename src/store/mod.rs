//! Record store: persistence of customer rows behind one trait so handlers, the bulk generator
//! and the table clear receive an explicit handle instead of module globals.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgCustomerStore};

use crate::config::{ServiceConfig, StoreKind};
use crate::error::StoreError;
use crate::model::{Customer, CustomerPatch, NewCustomer, Page};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// Operations the service needs from persistence.
///
/// Implementations enforce email uniqueness themselves; callers treat
/// [`StoreError::DuplicateEmail`] as the authoritative signal.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Idempotent schema creation.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<Customer>, StoreError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError>;

    /// Rows ordered by id, plus the total row count.
    async fn list(&self, skip: u64, limit: u64) -> Result<Page<Customer>, StoreError>;

    async fn insert(&self, customer: &NewCustomer) -> Result<Customer, StoreError>;

    /// Apply supplied fields; `None` when no row has `id`.
    async fn update(&self, id: i32, patch: &CustomerPatch) -> Result<Option<Customer>, StoreError>;

    /// Remove and return the row; `None` when no row has `id`.
    async fn delete(&self, id: i32) -> Result<Option<Customer>, StoreError>;

    /// Every email currently stored.
    async fn all_emails(&self) -> Result<HashSet<String>, StoreError>;

    /// Insert every row or none of them. Returns the number of rows inserted.
    async fn insert_batch(&self, customers: &[NewCustomer]) -> Result<u64, StoreError>;

    /// Remove every row and reset the id sequence, atomically.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Open the configured backend and make sure the customers table exists.
pub async fn open_store(config: &ServiceConfig) -> Result<Arc<dyn CustomerStore>, StoreError> {
    let store: Arc<dyn CustomerStore> = match config.store {
        StoreKind::Memory => {
            tracing::info!("using in-memory customer store");
            Arc::new(MemoryStore::new())
        }
        StoreKind::Postgres => {
            if config.create_database {
                ensure_database_exists(&config.database_url).await?;
            }
            Arc::new(PgCustomerStore::connect(&config.database_url, config.max_connections).await?)
        }
    };
    store.ensure_schema().await?;
    Ok(store)
}
