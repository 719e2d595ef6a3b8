//! Day-based aggregation over expense records.
//!
//! Everything here is pure: callers hand over records already fetched for a
//! single owner and get grouped, totaled views back. Soft-deleted records are
//! skipped even when a caller forgets to filter them out.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::{Amount, ExpenseId, ExpenseRecord, OwnerId, Timestamp, day_label};

/// Projection of a record returned by every aggregation view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseResponse {
    pub id: ExpenseId,
    #[serde(rename = "tenant")]
    pub label: String,
    pub amount: Amount,
    pub created_at: Timestamp,
}

impl From<&ExpenseRecord> for ExpenseResponse {
    fn from(record: &ExpenseRecord) -> Self {
        Self {
            id: record.id,
            label: record.label.clone(),
            amount: record.amount,
            created_at: record.created_at,
        }
    }
}

/// All active expenses of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    /// Sort key; the label is for display only.
    #[serde(skip)]
    pub day: NaiveDate,
    pub date: String,
    pub total: Amount,
    pub expenses: Vec<ExpenseResponse>,
}

impl DayGroup {
    fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            date: day_label(day),
            total: 0.0,
            expenses: Vec::new(),
        }
    }

    fn push(&mut self, record: &ExpenseRecord) {
        self.total += record.amount;
        self.expenses.push(ExpenseResponse::from(record));
    }
}

/// Detail view of a single requested day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetail {
    #[serde(skip)]
    pub day: NaiveDate,
    pub date: String,
    pub total: Amount,
    pub expenses: Vec<ExpenseResponse>,
}

/// Group active records by the calendar day of `created_at`, newest day first.
///
/// Within a group, expenses keep the order they had in `records`.
pub fn group_by_day(records: &[ExpenseRecord]) -> Vec<DayGroup> {
    let mut by_day: HashMap<NaiveDate, DayGroup> = HashMap::new();

    for record in records.iter().filter(|r| !r.is_deleted()) {
        let day = record.day();
        by_day
            .entry(day)
            .or_insert_with(|| DayGroup::empty(day))
            .push(record);
    }

    let mut groups: Vec<DayGroup> = by_day.into_values().collect();
    sort_newest_first(&mut groups);
    groups
}

/// Order groups by their day, most recent first.
///
/// Compares the retained day value only, so a display label that no longer
/// round-trips through its format cannot disturb the order.
pub fn sort_newest_first(groups: &mut [DayGroup]) {
    groups.sort_by(|a, b| b.day.cmp(&a.day));
}

/// Active records created on `day`, with their total.
///
/// A day without expenses is a valid, empty result.
pub fn detail_for_day(records: &[ExpenseRecord], day: NaiveDate) -> DayDetail {
    let expenses: Vec<ExpenseResponse> = records
        .iter()
        .filter(|r| !r.is_deleted() && r.day() == day)
        .map(ExpenseResponse::from)
        .collect();
    let total: Amount = expenses.iter().map(|e| e.amount).sum();

    DayDetail {
        day,
        date: day_label(day),
        total,
        expenses,
    }
}

/// Which records a delete-by-day request soft-deletes: the owner's active
/// records whose calendar day equals `day`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionCriteria {
    pub owner_id: OwnerId,
    pub day: NaiveDate,
}

impl DeletionCriteria {
    pub fn new(owner_id: OwnerId, day: NaiveDate) -> Self {
        Self { owner_id, day }
    }

    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        record.owner_id == self.owner_id && record.day() == self.day && !record.is_deleted()
    }
}
