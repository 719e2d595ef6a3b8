use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::domain::{DeletionCriteria, ExpenseRecord, OwnerId, Timestamp};

use super::ExpenseStore;

/// Expense storage kept in process memory. Cloning shares the same records.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<ExpenseRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExpenseStore for MemoryStore {
    async fn insert_all(&self, records: &[ExpenseRecord]) -> Result<()> {
        let mut store = self.records.write().await;
        let mut ids: HashSet<_> = store.iter().map(|r| r.id).collect();
        for record in records {
            if !ids.insert(record.id) {
                anyhow::bail!("Expense {} already exists", record.id);
            }
        }
        store.extend_from_slice(records);
        Ok(())
    }

    async fn list_for_owner(
        &self,
        owner_id: &OwnerId,
        include_deleted: bool,
    ) -> Result<Vec<ExpenseRecord>> {
        let store = self.records.read().await;
        Ok(store
            .iter()
            .filter(|r| &r.owner_id == owner_id && (include_deleted || !r.is_deleted()))
            .cloned()
            .collect())
    }

    async fn list_active_for_day(
        &self,
        owner_id: &OwnerId,
        day: NaiveDate,
    ) -> Result<Vec<ExpenseRecord>> {
        let store = self.records.read().await;
        Ok(store
            .iter()
            .filter(|r| &r.owner_id == owner_id && !r.is_deleted() && r.day() == day)
            .cloned()
            .collect())
    }

    async fn mark_deleted(&self, criteria: &DeletionCriteria, deleted_at: Timestamp) -> Result<u64> {
        let mut store = self.records.write().await;
        let mut affected = 0;
        for record in store.iter_mut().filter(|r| criteria.matches(r)) {
            record.deleted_at = Some(deleted_at);
            affected += 1;
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn owner(name: &str) -> OwnerId {
        OwnerId::new(name).unwrap()
    }

    fn at(s: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_list_in_insertion_order() {
        let store = MemoryStore::new();
        let records = vec![
            ExpenseRecord::new(owner("alice"), "B", 2.0, at("2024-03-05T18:00:00Z")),
            ExpenseRecord::new(owner("alice"), "A", 1.0, at("2024-03-05T08:00:00Z")),
            ExpenseRecord::new(owner("bob"), "C", 3.0, at("2024-03-05T08:00:00Z")),
        ];
        store.insert_all(&records).await.unwrap();

        let listed = store.list_for_owner(&owner("alice"), false).await.unwrap();

        assert_eq!(listed, records[..2].to_vec());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_batch_atomically() {
        let store = MemoryStore::new();
        let existing = ExpenseRecord::new(owner("alice"), "A", 1.0, at("2024-03-05T08:00:00Z"));
        store.insert_all(&[existing.clone()]).await.unwrap();

        let fresh = ExpenseRecord::new(owner("alice"), "B", 2.0, at("2024-03-05T09:00:00Z"));
        let result = store.insert_all(&[fresh, existing]).await;

        assert!(result.is_err());
        assert_eq!(store.list_for_owner(&owner("alice"), true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_repeated_id_within_batch() {
        let store = MemoryStore::new();
        let first = ExpenseRecord::new(owner("alice"), "A", 1.0, at("2024-03-05T08:00:00Z"));
        let mut repeat = ExpenseRecord::new(owner("alice"), "B", 2.0, at("2024-03-05T09:00:00Z"));
        repeat.id = first.id;

        let result = store.insert_all(&[first, repeat]).await;

        assert!(result.is_err());
        assert!(store.list_for_owner(&owner("alice"), true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_deleted_is_idempotent() {
        let store = MemoryStore::new();
        store
            .insert_all(&[
                ExpenseRecord::new(owner("alice"), "A", 1.0, at("2024-03-05T08:00:00Z")),
                ExpenseRecord::new(owner("alice"), "B", 2.0, at("2024-03-05T23:59:00Z")),
                ExpenseRecord::new(owner("alice"), "C", 3.0, at("2024-03-06T00:01:00Z")),
                ExpenseRecord::new(owner("bob"), "D", 4.0, at("2024-03-05T08:00:00Z")),
            ])
            .await
            .unwrap();
        let criteria = DeletionCriteria::new(owner("alice"), day("2024-03-05"));

        let first = store
            .mark_deleted(&criteria, at("2024-03-07T10:00:00Z"))
            .await
            .unwrap();
        let second = store
            .mark_deleted(&criteria, at("2024-03-07T11:00:00Z"))
            .await
            .unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 0);

        let active = store.list_for_owner(&owner("alice"), false).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].label, "C");

        let all = store.list_for_owner(&owner("alice"), true).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(
            all.iter()
                .filter(|r| r.is_deleted())
                .all(|r| r.deleted_at == Some(at("2024-03-07T10:00:00Z")))
        );

        let bob = store
            .list_active_for_day(&owner("bob"), day("2024-03-05"))
            .await
            .unwrap();
        assert_eq!(bob.len(), 1);
    }
}
