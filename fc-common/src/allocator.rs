//! Random application number allocation
//!
//! Application numbers are short, human-typed values drawn at random from
//! `0..=99999`. A candidate that is already taken is a collision and is
//! retried with a fresh draw, up to [`MAX_ALLOCATION_ATTEMPTS`] times. Any
//! other store failure aborts immediately.

use rand::Rng;
use tracing::{debug, info, warn};

use crate::db::models::MAX_APPLICATION_ID;
use crate::store::{ApplicationStore, InsertOutcome};
use crate::{Error, Result};

/// Number of candidates tried before giving up
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 10;

/// Source of candidate application numbers
pub trait IdSource: Send + Sync {
    /// Draw a candidate in `0..=MAX_APPLICATION_ID`
    fn next_id(&self) -> u32;
}

/// Uniform candidates from the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl IdSource for ThreadRngSource {
    fn next_id(&self) -> u32 {
        rand::thread_rng().gen_range(0..=MAX_APPLICATION_ID)
    }
}

/// Reserve a new application number by inserting an empty record
///
/// Attempts run one after another; each waits for its store round trip
/// before the next candidate is drawn.
pub async fn allocate<S, R>(store: &S, ids: &R) -> Result<u32>
where
    S: ApplicationStore + ?Sized,
    R: IdSource + ?Sized,
{
    for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
        let candidate = ids.next_id();

        match store.insert_empty(candidate).await? {
            InsertOutcome::Inserted => {
                info!(id = candidate, attempt, "Allocated application number");
                return Ok(candidate);
            }
            InsertOutcome::Collision => {
                debug!(id = candidate, attempt, "Application number already taken");
            }
        }
    }

    warn!(
        attempts = MAX_ALLOCATION_ATTEMPTS,
        "Unable to generate new application number"
    );
    Err(Error::AllocationExhausted {
        attempts: MAX_ALLOCATION_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{ApplicationPatch, ApplicationRecord};
    use async_trait::async_trait;
    use std::collections::{BTreeSet, VecDeque};
    use std::sync::Mutex;

    /// In-memory store recording every insert attempt
    #[derive(Default)]
    struct FakeStore {
        taken: Mutex<BTreeSet<u32>>,
        attempts: Mutex<Vec<u32>>,
        fail_with_error: bool,
    }

    impl FakeStore {
        fn with_taken(ids: impl IntoIterator<Item = u32>) -> Self {
            Self {
                taken: Mutex::new(ids.into_iter().collect()),
                ..Default::default()
            }
        }

        fn attempts(&self) -> Vec<u32> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ApplicationStore for FakeStore {
        async fn insert_empty(&self, id: u32) -> Result<InsertOutcome> {
            self.attempts.lock().unwrap().push(id);
            if self.fail_with_error {
                return Err(Error::Database(sqlx::Error::PoolClosed));
            }
            if self.taken.lock().unwrap().insert(id) {
                Ok(InsertOutcome::Inserted)
            } else {
                Ok(InsertOutcome::Collision)
            }
        }

        async fn find(&self, _id: u32) -> Result<Option<ApplicationRecord>> {
            Ok(None)
        }

        async fn fill_unassigned(&self, _id: u32, _patch: &ApplicationPatch) -> Result<bool> {
            Ok(false)
        }
    }

    /// Candidates replayed from a fixed script
    struct ScriptedIds(Mutex<VecDeque<u32>>);

    impl ScriptedIds {
        fn new(ids: impl IntoIterator<Item = u32>) -> Self {
            Self(Mutex::new(ids.into_iter().collect()))
        }
    }

    impl IdSource for ScriptedIds {
        fn next_id(&self) -> u32 {
            self.0.lock().unwrap().pop_front().expect("script exhausted")
        }
    }

    /// Always the same candidate
    struct ConstantId(u32);

    impl IdSource for ConstantId {
        fn next_id(&self) -> u32 {
            self.0
        }
    }

    #[tokio::test]
    async fn test_first_free_candidate_is_returned() {
        let store = FakeStore::default();
        let id = allocate(&store, &ScriptedIds::new([42])).await.unwrap();

        assert_eq!(id, 42);
        assert_eq!(store.attempts(), vec![42]);
    }

    #[tokio::test]
    async fn test_collisions_are_retried_with_fresh_candidates() {
        let store = FakeStore::with_taken([1, 2, 3]);
        let id = allocate(&store, &ScriptedIds::new([1, 2, 3, 4])).await.unwrap();

        assert_eq!(id, 4);
        assert_eq!(store.attempts(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_success_on_tenth_attempt() {
        let store = FakeStore::with_taken(0..9);
        let id = allocate(&store, &ScriptedIds::new(0..10)).await.unwrap();

        assert_eq!(id, 9);
        assert_eq!(store.attempts().len(), 10);
    }

    #[tokio::test]
    async fn test_ten_collisions_exhaust_allocation() {
        let store = FakeStore::with_taken([5]);
        let result = allocate(&store, &ConstantId(5)).await;

        assert!(matches!(
            result,
            Err(Error::AllocationExhausted { attempts: 10 })
        ));
        assert_eq!(store.attempts(), vec![5; 10]);
    }

    #[tokio::test]
    async fn test_store_error_aborts_without_retry() {
        let store = FakeStore {
            fail_with_error: true,
            ..Default::default()
        };
        let result = allocate(&store, &ConstantId(5)).await;

        assert!(matches!(result, Err(Error::Database(_))));
        assert_eq!(store.attempts().len(), 1);
    }

    #[test]
    fn test_thread_rng_source_stays_in_range() {
        let source = ThreadRngSource;
        for _ in 0..10_000 {
            assert!(source.next_id() <= MAX_APPLICATION_ID);
        }
    }
}
