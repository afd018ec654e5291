//! In-memory search-count store for development and tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::table::CountTable;
use super::{SearchCountStore, StoreError, TrendingEntry};

/// Volatile search-count store.
///
/// Same ranking and atomicity as the file store; counts vanish with the
/// process, which is what development mode wants.
#[derive(Debug, Default)]
pub struct InMemorySearchCountStore {
    table: Mutex<CountTable>,
}

impl InMemorySearchCountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SearchCountStore for InMemorySearchCountStore {
    async fn increment(
        &self,
        item_id: u64,
        search_term: &str,
        poster_url: &str,
    ) -> Result<TrendingEntry, StoreError> {
        let mut table = self.table.lock().await;
        let (entry, _undo) = table.increment(item_id, search_term, poster_url, Utc::now());
        Ok(entry)
    }

    async fn top_n(&self, n: usize) -> Result<Vec<TrendingEntry>, StoreError> {
        Ok(self.table.lock().await.top_n(n))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;

    #[tokio::test]
    async fn test_top_n_limits_and_orders() {
        let store = InMemorySearchCountStore::new();
        // Counts [5, 5, 3, 1]; item 20 reaches five after item 10 does.
        for _ in 0..5 {
            store.increment(10, "ten", "/10.jpg").await.unwrap();
        }
        for _ in 0..3 {
            store.increment(30, "thirty", "/30.jpg").await.unwrap();
        }
        store.increment(40, "forty", "/40.jpg").await.unwrap();
        for _ in 0..5 {
            store.increment(20, "twenty", "/20.jpg").await.unwrap();
        }

        let top = store.top_n(5).await.unwrap();
        let ranked: Vec<(u64, u64)> = top.iter().map(|e| (e.item_id, e.count)).collect();
        assert_eq!(ranked, vec![(20, 5), (10, 5), (30, 3), (40, 1)]);

        assert_eq!(store.top_n(2).await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_same_id() {
        let store = Arc::new(InMemorySearchCountStore::new());
        store.increment(603, "matrix", "/m.jpg").await.unwrap();

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment(603, "matrix", "/m.jpg").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.top_n(1).await.unwrap()[0].count, 101);
    }

    proptest! {
        #[test]
        fn prop_counts_never_decrease(ids in proptest::collection::vec(0u64..5, 1..60)) {
            tokio_test::block_on(async {
                let store = InMemorySearchCountStore::new();
                let mut expected = std::collections::HashMap::new();

                for id in &ids {
                    let before = expected.get(id).copied().unwrap_or(0u64);
                    let entry = store.increment(*id, "q", "p").await.unwrap();
                    prop_assert_eq!(entry.count, before + 1);
                    expected.insert(*id, entry.count);
                }

                let top = store.top_n(usize::MAX).await.unwrap();
                for window in top.windows(2) {
                    prop_assert!(window[0].count >= window[1].count);
                }
                for entry in &top {
                    prop_assert_eq!(Some(&entry.count), expected.get(&entry.item_id));
                }
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}
