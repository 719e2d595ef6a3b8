use chrono::Local;
use tracing::{debug, info};

use crate::domain::{
    DayDetail, DayGroup, DeletionCriteria, ExpenseBatch, ExpenseRecord, OwnerId, Timestamp,
    detail_for_day, group_by_day, parse_day,
};
use crate::storage::{ExpenseStore, Repository};

use super::AppError;

/// Resolve the acting principal. Nothing runs without one.
pub fn require_owner(user: Option<&str>) -> Result<OwnerId, AppError> {
    user.and_then(OwnerId::new).ok_or(AppError::MissingPrincipal)
}

/// Application service providing the expense use cases.
/// This is the primary interface for any client (CLI, API, etc.).
pub struct ExpenseService<S> {
    store: S,
}

impl ExpenseService<Repository> {
    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }
}

impl<S: ExpenseStore> ExpenseService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record a batch of expenses created now.
    pub async fn record_expenses(
        &self,
        owner: &OwnerId,
        batch: ExpenseBatch,
    ) -> Result<Vec<ExpenseRecord>, AppError> {
        self.record_expenses_at(owner, batch, Local::now().fixed_offset())
            .await
    }

    /// Record a batch of expenses created at `created_at`.
    /// Nothing is stored unless every entry is valid.
    pub async fn record_expenses_at(
        &self,
        owner: &OwnerId,
        batch: ExpenseBatch,
        created_at: Timestamp,
    ) -> Result<Vec<ExpenseRecord>, AppError> {
        batch.validate()?;

        let records = batch.into_records(owner, created_at);
        self.store.insert_all(&records).await?;

        info!(owner = %owner, count = records.len(), "recorded expenses");
        Ok(records)
    }

    /// List an owner's expenses in the order they were recorded.
    pub async fn list_expenses(
        &self,
        owner: &OwnerId,
        include_deleted: bool,
    ) -> Result<Vec<ExpenseRecord>, AppError> {
        Ok(self.store.list_for_owner(owner, include_deleted).await?)
    }

    /// Active expenses grouped by day, newest day first.
    pub async fn expenses_by_day(&self, owner: &OwnerId) -> Result<Vec<DayGroup>, AppError> {
        let records = self.store.list_for_owner(owner, false).await?;
        let groups = group_by_day(&records);

        debug!(owner = %owner, records = records.len(), days = groups.len(), "grouped expenses");
        Ok(groups)
    }

    /// Active expenses of one `YYYY-MM-DD` day with their total.
    pub async fn expenses_for_day(&self, owner: &OwnerId, day: &str) -> Result<DayDetail, AppError> {
        let day = parse_day(day)?;
        let records = self.store.list_active_for_day(owner, day).await?;
        let detail = detail_for_day(&records, day);

        debug!(owner = %owner, %day, count = detail.expenses.len(), "loaded day detail");
        Ok(detail)
    }

    /// Soft-delete every active expense of one `YYYY-MM-DD` day.
    ///
    /// Deleting a day that has nothing left to delete still succeeds.
    pub async fn delete_expenses_for_day(&self, owner: &OwnerId, day: &str) -> Result<(), AppError> {
        let day = parse_day(day)?;
        let criteria = DeletionCriteria::new(owner.clone(), day);
        let affected = self
            .store
            .mark_deleted(&criteria, Local::now().fixed_offset())
            .await?;

        info!(owner = %owner, %day, affected, "deleted expenses");
        Ok(())
    }
}
