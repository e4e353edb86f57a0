//! Append-only history of review records.

use super::ReviewRecord;
use parking_lot::RwLock;
use std::sync::Arc;

/// Insertion-ordered, process-lifetime history of completed reviews.
///
/// Records are never mutated or removed. `append` takes a single writer
/// lock, so concurrent runs may share one store.
#[derive(Debug, Default)]
pub struct HistoryStore {
    records: RwLock<Vec<Arc<ReviewRecord>>>,
}

impl HistoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns the shared handle.
    pub fn append(&self, record: ReviewRecord) -> Arc<ReviewRecord> {
        let record = Arc::new(record);
        self.records.write().push(Arc::clone(&record));
        record
    }

    /// Number of stored records.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// The most recently appended record.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<ReviewRecord>> {
        self.records.read().last().cloned()
    }

    /// All records in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<ReviewRecord>> {
        self.records.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelId, Temperature};
    use crate::core::Artifact;
    use crate::utils::now_utc;
    use uuid::Uuid;

    fn record(content: &str) -> ReviewRecord {
        ReviewRecord::new(
            Uuid::now_v7(),
            content.to_string(),
            &Artifact::new("a.py", "pass"),
            ModelId::default(),
            Temperature::default(),
            now_utc(),
        )
    }

    #[test]
    fn test_empty_store() {
        let store = HistoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.count(), 0);
        assert!(store.latest().is_none());
    }

    #[test]
    fn test_append_preserves_order() {
        let store = HistoryStore::new();
        store.append(record("first"));
        store.append(record("second"));
        store.append(record("first"));

        assert_eq!(store.count(), 3);
        let contents: Vec<_> = store.snapshot().iter().map(|r| r.content().to_string()).collect();
        assert_eq!(contents, vec!["first", "second", "first"]);
        assert_eq!(store.latest().unwrap().content(), "first");
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = HistoryStore::new();
        store.append(record("a"));
        let snap = store.snapshot();
        store.append(record("b"));

        assert_eq!(snap.len(), 1);
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_concurrent_appends() {
        let store = Arc::new(HistoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for j in 0..25 {
                        store.append(record(&format!("{i}-{j}")));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.count(), 200);
    }
}
