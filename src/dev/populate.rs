//! Bulk generator: fill the customers table with synthetic rows whose emails are unique against
//! both the existing table and the batch being built, then commit the batch in one insert.

use crate::dev::synth::{CustomerSource, SyntheticCustomers};
use crate::error::DevError;
use crate::model::NewCustomer;
use crate::store::CustomerStore;
use rand::rngs::StdRng;
use serde::Serialize;
use std::fmt;

/// Draws allowed per slot, as a multiple of the requested count.
pub const RETRIES_PER_RECORD: u64 = 50;

const PROGRESS_EVERY: u64 = 1_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PopulateOutcome {
    /// Table already had rows and `force` was not set. Nothing was written.
    Skipped { current_count: u64 },
    Populated {
        added: u64,
        prior_count: u64,
        new_count: u64,
    },
}

impl fmt::Display for PopulateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopulateOutcome::Skipped { current_count } => write!(
                f,
                "Database is not empty (found {} customers). Populating skipped. Use 'force=true' to override.",
                current_count
            ),
            PopulateOutcome::Populated {
                added,
                prior_count,
                new_count,
            } => {
                if *prior_count > 0 {
                    write!(f, "Forcing data population. Current count: {}.", prior_count)?;
                } else {
                    write!(f, "Database is empty. Populating data.")?;
                }
                write!(f, " Successfully added {} records. New total: {}", added, new_count)
            }
        }
    }
}

pub struct BulkGenerator<'a, S> {
    store: &'a dyn CustomerStore,
    source: S,
    retry_ceiling: Option<u64>,
}

impl<'a> BulkGenerator<'a, SyntheticCustomers<StdRng>> {
    pub fn new(store: &'a dyn CustomerStore) -> Self {
        BulkGenerator::with_source(store, SyntheticCustomers::from_entropy())
    }
}

impl<'a, S: CustomerSource> BulkGenerator<'a, S> {
    pub fn with_source(store: &'a dyn CustomerStore, source: S) -> Self {
        BulkGenerator {
            store,
            source,
            retry_ceiling: None,
        }
    }

    /// Override the per-slot draw limit (default `count * RETRIES_PER_RECORD`).
    pub fn with_retry_ceiling(mut self, ceiling: u64) -> Self {
        self.retry_ceiling = Some(ceiling);
        self
    }

    /// Generate `count` customers unless the table already has rows and `force` is false.
    ///
    /// The only write is the final batch insert, so a skipped or failed call leaves the
    /// table as it was.
    pub async fn generate(&mut self, count: u64, force: bool) -> Result<PopulateOutcome, DevError> {
        self.store.ensure_schema().await?;
        let prior_count = self.store.count().await?;
        if prior_count > 0 && !force {
            tracing::warn!(current_count = prior_count, "table not empty, populating skipped");
            return Ok(PopulateOutcome::Skipped {
                current_count: prior_count,
            });
        }
        tracing::info!(count, prior_count, force, "populating customers");

        let mut claimed = self.store.all_emails().await?;
        let batch = self.draw_unique(count, &mut claimed)?;

        let added = self
            .store
            .insert_batch(&batch)
            .await
            .map_err(|source| {
                tracing::warn!(error = %source, prior_count, "bulk insert failed, batch rolled back");
                DevError::BulkInsertFailed { prior_count, source }
            })?;
        tracing::info!(added, new_count = prior_count + added, "populating finished");
        Ok(PopulateOutcome::Populated {
            added,
            prior_count,
            new_count: prior_count + added,
        })
    }

    /// Rejection sampling: redraw until the email is not in `claimed`.
    fn draw_unique(
        &mut self,
        count: u64,
        claimed: &mut std::collections::HashSet<String>,
    ) -> Result<Vec<NewCustomer>, DevError> {
        let ceiling = self
            .retry_ceiling
            .unwrap_or_else(|| count.saturating_mul(RETRIES_PER_RECORD))
            .max(1);
        let mut batch = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
        for slot in 1..=count {
            let mut attempts = 0u64;
            loop {
                if attempts >= ceiling {
                    tracing::warn!(slot, attempts, "no unique email found, generation abandoned");
                    return Err(DevError::GenerationExhausted { slot, attempts });
                }
                attempts += 1;
                let candidate = self.source.draw();
                if claimed.insert(candidate.email.clone()) {
                    batch.push(candidate);
                    break;
                }
            }
            if slot % PROGRESS_EVERY == 0 {
                tracing::debug!(generated = slot, count, "generated records for batch insertion");
            }
        }
        Ok(batch)
    }
}

/// Populate with freshly seeded synthetic data.
pub async fn populate(
    store: &dyn CustomerStore,
    count: u64,
    force: bool,
) -> Result<PopulateOutcome, DevError> {
    BulkGenerator::new(store).generate(count, force).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::synth::AGE_RANGE;
    use crate::store::MemoryStore;
    use std::collections::HashSet;

    /// Replays a fixed list of emails in a loop.
    struct Cycle {
        emails: Vec<&'static str>,
        next: usize,
    }

    impl Cycle {
        fn new(emails: Vec<&'static str>) -> Self {
            Cycle { emails, next: 0 }
        }
    }

    impl CustomerSource for Cycle {
        fn draw(&mut self) -> NewCustomer {
            let email = self.emails[self.next % self.emails.len()];
            self.next += 1;
            NewCustomer {
                name: "Cyc Lic".into(),
                age: 30,
                email: email.into(),
            }
        }
    }

    async fn emails(store: &MemoryStore) -> HashSet<String> {
        store.all_emails().await.unwrap()
    }

    #[tokio::test]
    async fn populates_empty_store() {
        let store = MemoryStore::new();
        let outcome = BulkGenerator::with_source(&store, SyntheticCustomers::seeded(42))
            .generate(3, false)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PopulateOutcome::Populated {
                added: 3,
                prior_count: 0,
                new_count: 3
            }
        );
        assert_eq!(store.count().await.unwrap(), 3);
        assert_eq!(emails(&store).await.len(), 3);
    }

    #[tokio::test]
    async fn large_batch_is_distinct_and_in_age_range() {
        let store = MemoryStore::new();
        let outcome = BulkGenerator::with_source(&store, SyntheticCustomers::seeded(9))
            .generate(2_000, false)
            .await
            .unwrap();
        assert!(matches!(outcome, PopulateOutcome::Populated { added: 2_000, .. }));
        let page = store.list(0, 5_000).await.unwrap();
        assert_eq!(page.records.len(), 2_000);
        assert!(page.records.iter().all(|c| AGE_RANGE.contains(&c.age)));
        assert_eq!(emails(&store).await.len(), 2_000);
    }

    #[tokio::test]
    async fn second_call_without_force_is_skipped() {
        let store = MemoryStore::new();
        populate(&store, 5, false).await.unwrap();
        let outcome = populate(&store, 5, false).await.unwrap();
        assert_eq!(outcome, PopulateOutcome::Skipped { current_count: 5 });
        assert_eq!(store.count().await.unwrap(), 5);
    }

    /// Records the level of every event seen.
    #[derive(Clone, Default)]
    struct Levels(std::sync::Arc<std::sync::Mutex<Vec<tracing::Level>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Levels {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
            self.0.lock().unwrap().push(*event.metadata().level());
        }
    }

    #[tokio::test]
    async fn skipped_generation_logs_a_warning() {
        use tracing_subscriber::layer::SubscriberExt;

        let store = MemoryStore::new();
        populate(&store, 2, false).await.unwrap();

        let levels = Levels::default();
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(levels.clone()));
        let outcome = populate(&store, 2, false).await.unwrap();
        assert_eq!(outcome, PopulateOutcome::Skipped { current_count: 2 });
        assert!(levels.0.lock().unwrap().contains(&tracing::Level::WARN));
    }

    #[tokio::test]
    async fn force_appends_without_reusing_existing_emails() {
        let store = MemoryStore::new();
        populate(&store, 10, false).await.unwrap();
        let before = emails(&store).await;
        let outcome = populate(&store, 15, true).await.unwrap();
        assert_eq!(
            outcome,
            PopulateOutcome::Populated {
                added: 15,
                prior_count: 10,
                new_count: 25
            }
        );
        let after = emails(&store).await;
        assert_eq!(after.len(), 25);
        assert!(before.is_subset(&after));
    }

    #[tokio::test]
    async fn duplicate_prone_source_retries_until_unique() {
        let store = MemoryStore::new();
        store
            .insert(&NewCustomer {
                name: "Existing".into(),
                age: 50,
                email: "a@x.io".into(),
            })
            .await
            .unwrap();
        let source = Cycle::new(vec!["a@x.io", "a@x.io", "b@x.io", "b@x.io", "c@x.io"]);
        let outcome = BulkGenerator::with_source(&store, source)
            .generate(2, true)
            .await
            .unwrap();
        assert!(matches!(outcome, PopulateOutcome::Populated { added: 2, new_count: 3, .. }));
        let all = emails(&store).await;
        assert!(all.contains("b@x.io") && all.contains("c@x.io"));
    }

    #[tokio::test]
    async fn exhausted_retries_leave_store_untouched() {
        let store = MemoryStore::new();
        let source = Cycle::new(vec!["a@x.io", "b@x.io"]);
        let err = BulkGenerator::with_source(&store, source)
            .with_retry_ceiling(10)
            .generate(3, false)
            .await
            .unwrap_err();
        assert!(matches!(err, DevError::GenerationExhausted { slot: 3, attempts: 10 }));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_insert_reports_prior_count() {
        let store = MemoryStore::new();
        populate(&store, 4, false).await.unwrap();
        store.set_fail_writes(true);
        let err = populate(&store, 4, true).await.unwrap_err();
        store.set_fail_writes(false);
        assert!(matches!(err, DevError::BulkInsertFailed { prior_count: 4, .. }));
        assert_eq!(store.count().await.unwrap(), 4);
    }

    #[test]
    fn outcome_messages() {
        let skipped = PopulateOutcome::Skipped { current_count: 8 };
        assert!(skipped.to_string().contains("found 8 customers"));
        let fresh = PopulateOutcome::Populated {
            added: 3,
            prior_count: 0,
            new_count: 3,
        };
        assert_eq!(
            fresh.to_string(),
            "Database is empty. Populating data. Successfully added 3 records. New total: 3"
        );
        let forced = PopulateOutcome::Populated {
            added: 2,
            prior_count: 3,
            new_count: 5,
        };
        assert!(forced.to_string().starts_with("Forcing data population. Current count: 3."));
    }
}
