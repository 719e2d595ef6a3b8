use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Amount;

pub type ExpenseId = Uuid;

/// Instants keep the UTC offset they were recorded in, so the calendar day of
/// a record is the day its owner saw when it was created.
pub type Timestamp = DateTime<FixedOffset>;

/// Opaque identifier of the authenticated principal owning expenses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Returns `None` for a blank identifier.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single recorded expense. Records are never edited: the only change a
/// record ever sees is the soft-deletion marker being set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub owner_id: OwnerId,
    /// Free-text category tag
    #[serde(rename = "tenant")]
    pub label: String,
    pub amount: Amount,
    /// Doubles as the expense date once truncated to the calendar day
    pub created_at: Timestamp,
    /// Set once when the record is soft-deleted
    pub deleted_at: Option<Timestamp>,
}

impl ExpenseRecord {
    pub fn new(
        owner_id: OwnerId,
        label: impl Into<String>,
        amount: Amount,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            label: label.into(),
            amount,
            created_at,
            deleted_at: None,
        }
    }

    pub fn with_deleted_at(mut self, deleted_at: Timestamp) -> Self {
        self.deleted_at = Some(deleted_at);
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Calendar day of `created_at`, in the offset the timestamp carries.
    pub fn day(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

/// One entry of a bulk create payload.
///
/// Missing fields deserialize to their zero value and are rejected by
/// [`ExpenseBatch::validate`], so "absent" and "zero" are the same failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    #[serde(default)]
    pub tenant: String,
    #[serde(default)]
    pub amount: Amount,
}

impl NewExpense {
    pub fn new(tenant: impl Into<String>, amount: Amount) -> Self {
        Self {
            tenant: tenant.into(),
            amount,
        }
    }
}

/// Bulk create payload: `{"expenses": [{"tenant": "...", "amount": 1.0}, ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBatch {
    #[serde(default)]
    pub expenses: Vec<NewExpense>,
}

impl ExpenseBatch {
    pub fn new(expenses: Vec<NewExpense>) -> Self {
        Self { expenses }
    }

    /// Check every entry. The batch is all-or-nothing: the first invalid
    /// entry rejects the whole payload.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.expenses.is_empty() {
            return Err(BatchError::NoExpenses);
        }

        for (index, expense) in self.expenses.iter().enumerate() {
            if expense.tenant.trim().is_empty() {
                return Err(BatchError::MissingTenant { index });
            }
            if expense.amount == 0.0 {
                return Err(BatchError::MissingAmount { index });
            }
            if !expense.amount.is_finite() {
                return Err(BatchError::InvalidAmount { index });
            }
        }

        Ok(())
    }

    /// Build the records for this batch, all stamped with the same instant.
    /// Callers validate first.
    pub fn into_records(self, owner_id: &OwnerId, created_at: Timestamp) -> Vec<ExpenseRecord> {
        self.expenses
            .into_iter()
            .map(|e| ExpenseRecord::new(owner_id.clone(), e.tenant, e.amount, created_at))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    NoExpenses,
    MissingTenant { index: usize },
    MissingAmount { index: usize },
    InvalidAmount { index: usize },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::NoExpenses => write!(f, "expenses list is required"),
            BatchError::MissingTenant { index } => {
                write!(f, "expenses[{}]: tenant is required", index)
            }
            BatchError::MissingAmount { index } => {
                write!(f, "expenses[{}]: amount is required", index)
            }
            BatchError::InvalidAmount { index } => {
                write!(f, "expenses[{}]: amount must be a finite number", index)
            }
        }
    }
}

impl std::error::Error for BatchError {}
