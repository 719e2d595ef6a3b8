mod memory;
mod repository;

use anyhow::Result;
use chrono::NaiveDate;

use crate::domain::{DeletionCriteria, ExpenseRecord, OwnerId, Timestamp};

pub use memory::*;
pub use repository::*;

/// SQL migration for initial schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// Where expense records live. The service is handed one of these instead of
/// reaching for a shared connection.
pub trait ExpenseStore {
    /// Insert every record or none of them.
    fn insert_all(&self, records: &[ExpenseRecord]) -> impl Future<Output = Result<()>> + Send;

    /// All records of an owner in insertion order, optionally with soft-deleted ones.
    fn list_for_owner(
        &self,
        owner_id: &OwnerId,
        include_deleted: bool,
    ) -> impl Future<Output = Result<Vec<ExpenseRecord>>> + Send;

    /// Active records of an owner created on `day`, in insertion order.
    fn list_active_for_day(
        &self,
        owner_id: &OwnerId,
        day: NaiveDate,
    ) -> impl Future<Output = Result<Vec<ExpenseRecord>>> + Send;

    /// Set `deleted_at` on every record matching `criteria`.
    /// Returns how many records were marked.
    fn mark_deleted(
        &self,
        criteria: &DeletionCriteria,
        deleted_at: Timestamp,
    ) -> impl Future<Output = Result<u64>> + Send;
}
