//! In-process record store with the same contract as the PostgreSQL one, including the
//! unique email constraint and all-or-nothing batches. Used by tests and `CUSTOMER_STORE=memory`.

use super::CustomerStore;
use crate::error::StoreError;
use crate::model::{Customer, CustomerPatch, NewCustomer, Page};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    rows: BTreeMap<i32, Customer>,
    by_email: HashMap<String, i32>,
    next_id: i32,
}

impl Table {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn put(&mut self, customer: Customer) {
        self.by_email.insert(customer.email.clone(), customer.id);
        self.rows.insert(customer.id, customer);
    }
}

#[derive(Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every mutating call fail with [`StoreError::Unavailable`] until reset.
    /// Lets callers exercise rollback paths without a real outage.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.table.read().await.rows.len() as u64)
    }

    async fn get(&self, id: i32) -> Result<Option<Customer>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError> {
        let table = self.table.read().await;
        Ok(table.by_email.get(email).and_then(|id| table.rows.get(id)).cloned())
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Page<Customer>, StoreError> {
        let table = self.table.read().await;
        let records = table
            .rows
            .values()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(Page {
            records,
            total: table.rows.len() as u64,
            skip,
            limit,
        })
    }

    async fn insert(&self, customer: &NewCustomer) -> Result<Customer, StoreError> {
        self.check_writable()?;
        let mut table = self.table.write().await;
        if table.by_email.contains_key(&customer.email) {
            return Err(StoreError::DuplicateEmail(customer.email.clone()));
        }
        let id = table.allocate_id();
        let row = Customer::from_new(id, customer.clone());
        table.put(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, patch: &CustomerPatch) -> Result<Option<Customer>, StoreError> {
        if patch.is_empty() {
            return self.get(id).await;
        }
        self.check_writable()?;
        let mut table = self.table.write().await;
        let Some(existing) = table.rows.get(&id).cloned() else {
            return Ok(None);
        };
        if let Some(email) = &patch.email {
            if table.by_email.get(email).is_some_and(|owner| *owner != id) {
                return Err(StoreError::DuplicateEmail(email.clone()));
            }
        }
        let mut updated = existing.clone();
        patch.apply_to(&mut updated);
        table.by_email.remove(&existing.email);
        table.put(updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: i32) -> Result<Option<Customer>, StoreError> {
        self.check_writable()?;
        let mut table = self.table.write().await;
        let removed = table.rows.remove(&id);
        if let Some(row) = &removed {
            table.by_email.remove(&row.email);
        }
        Ok(removed)
    }

    async fn all_emails(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self.table.read().await.by_email.keys().cloned().collect())
    }

    async fn insert_batch(&self, customers: &[NewCustomer]) -> Result<u64, StoreError> {
        self.check_writable()?;
        let mut table = self.table.write().await;
        // Validate the whole batch before touching the table.
        let mut seen = HashSet::with_capacity(customers.len());
        for c in customers {
            if table.by_email.contains_key(&c.email) || !seen.insert(c.email.as_str()) {
                return Err(StoreError::DuplicateEmail(c.email.clone()));
            }
        }
        for c in customers {
            let id = table.allocate_id();
            table.put(Customer::from_new(id, c.clone()));
        }
        Ok(customers.len() as u64)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.table.write().await = Table::default();
        Ok(())
    }
}
