//! Customer CRUD on top of a [`CustomerStore`].

use crate::error::AppError;
use crate::model::{Customer, CustomerPatch, NewCustomer, Page};
use crate::service::validation::MAX_PAGE_LIMIT;
use crate::store::CustomerStore;

pub struct CustomerService;

impl CustomerService {
    /// Insert one customer. An email already on file is [`AppError::DuplicateEmail`].
    pub async fn create(store: &dyn CustomerStore, body: &NewCustomer) -> Result<Customer, AppError> {
        if store.get_by_email(&body.email).await?.is_some() {
            return Err(AppError::DuplicateEmail(body.email.clone()));
        }
        // A concurrent insert of the same email still fails on the unique constraint.
        let row = store.insert(body).await?;
        tracing::debug!(id = row.id, "customer created");
        Ok(row)
    }

    pub async fn get(store: &dyn CustomerStore, id: i32) -> Result<Customer, AppError> {
        store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("customer {}", id)))
    }

    /// List rows with skip (default 0) and limit (default 100, max 100).
    pub async fn list(
        store: &dyn CustomerStore,
        skip: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Page<Customer>, AppError> {
        let skip = skip.unwrap_or(0);
        let limit = limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
        Ok(store.list(skip, limit).await?)
    }

    /// Apply the supplied fields. An empty patch returns the record unchanged.
    pub async fn update(
        store: &dyn CustomerStore,
        id: i32,
        patch: &CustomerPatch,
    ) -> Result<Customer, AppError> {
        let current = Self::get(store, id).await?;
        if patch.is_empty() {
            return Ok(current);
        }
        if let Some(email) = patch.email.as_deref().filter(|e| *e != current.email) {
            if store.get_by_email(email).await?.is_some() {
                return Err(AppError::DuplicateEmail(email.to_string()));
            }
        }
        store
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("customer {}", id)))
    }

    /// Delete and return the removed row.
    pub async fn delete(store: &dyn CustomerStore, id: i32) -> Result<Customer, AppError> {
        store
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("customer {}", id)))
    }
}
