//! In-memory count table shared by the store implementations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TrendingEntry;

/// Persisted form of a single count.
///
/// `revision` is a table-wide sequence number assigned on every update and
/// orders entries with equal counts even when wall-clock timestamps collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CountRecord {
    pub item_id: u64,
    pub search_term: String,
    pub poster_url: String,
    pub count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: u64,
}

impl CountRecord {
    fn to_entry(&self) -> TrendingEntry {
        TrendingEntry {
            item_id: self.item_id,
            search_term: self.search_term.clone(),
            poster_url: self.poster_url.clone(),
            count: self.count,
            updated_at: self.updated_at,
        }
    }
}

/// Undo information for one increment.
#[derive(Debug)]
pub(crate) struct Undo {
    item_id: u64,
    previous: Option<CountRecord>,
    previous_revision: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CountTable {
    revision: u64,
    records: BTreeMap<u64, CountRecord>,
}

impl CountTable {
    /// Applies one search to the table.
    ///
    /// Returns the updated entry together with the information needed to
    /// roll the change back if it cannot be persisted.
    pub fn increment(
        &mut self,
        item_id: u64,
        search_term: &str,
        poster_url: &str,
        now: DateTime<Utc>,
    ) -> (TrendingEntry, Undo) {
        let undo = Undo {
            item_id,
            previous: self.records.get(&item_id).cloned(),
            previous_revision: self.revision,
        };

        self.revision += 1;
        let revision = self.revision;

        let record = self
            .records
            .entry(item_id)
            .and_modify(|record| {
                record.count += 1;
                record.search_term = search_term.to_string();
                record.poster_url = poster_url.to_string();
                record.updated_at = now;
                record.revision = revision;
            })
            .or_insert_with(|| CountRecord {
                item_id,
                search_term: search_term.to_string(),
                poster_url: poster_url.to_string(),
                count: 1,
                created_at: now,
                updated_at: now,
                revision,
            });

        (record.to_entry(), undo)
    }

    pub fn rollback(&mut self, undo: Undo) {
        match undo.previous {
            Some(previous) => {
                self.records.insert(undo.item_id, previous);
            }
            None => {
                self.records.remove(&undo.item_id);
            }
        }
        self.revision = undo.previous_revision;
    }

    pub fn top_n(&self, n: usize) -> Vec<TrendingEntry> {
        let mut ranked: Vec<&CountRecord> = self.records.values().collect();
        ranked.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.revision.cmp(&a.revision))
        });
        ranked.into_iter().take(n).map(CountRecord::to_entry).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
