//! Table clear: remove every customer and reset the id sequence in one atomic step.

use crate::error::DevError;
use crate::store::CustomerStore;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClearOutcome {
    Cleared,
}

impl fmt::Display for ClearOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClearOutcome::Cleared => write!(f, "Successfully truncated the 'customers' table."),
        }
    }
}

/// On failure the store rolls back, so prior contents are unchanged.
pub async fn clear_all(store: &dyn CustomerStore) -> Result<ClearOutcome, DevError> {
    match store.clear().await {
        Ok(()) => {
            tracing::info!("customers table truncated");
            Ok(ClearOutcome::Cleared)
        }
        Err(source) => {
            tracing::warn!(error = %source, "truncate failed");
            Err(DevError::ClearFailed { source })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::populate::{populate, PopulateOutcome};
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn clear_then_populate_behaves_like_fresh_store() {
        let store = MemoryStore::new();
        populate(&store, 20, false).await.unwrap();
        assert_eq!(clear_all(&store).await.unwrap(), ClearOutcome::Cleared);
        assert_eq!(store.count().await.unwrap(), 0);
        let outcome = populate(&store, 4, false).await.unwrap();
        assert_eq!(
            outcome,
            PopulateOutcome::Populated {
                added: 4,
                prior_count: 0,
                new_count: 4
            }
        );
        let ids: Vec<i32> = store.list(0, 10).await.unwrap().records.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn failed_clear_surfaces_typed_error() {
        let store = MemoryStore::new();
        populate(&store, 3, false).await.unwrap();
        store.set_fail_writes(true);
        let err = clear_all(&store).await.unwrap_err();
        store.set_fail_writes(false);
        assert!(matches!(err, DevError::ClearFailed { .. }));
        assert_eq!(store.count().await.unwrap(), 3);
    }
}
