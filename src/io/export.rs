use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::ExpenseService;
use crate::domain::{ExpenseRecord, OwnerId};
use crate::storage::ExpenseStore;

/// Full history of one owner, for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub owner_id: OwnerId,
    pub expenses: Vec<ExpenseRecord>,
}

/// Exporter for writing an owner's expenses in various formats
pub struct Exporter<'a, S> {
    service: &'a ExpenseService<S>,
}

impl<'a, S: ExpenseStore> Exporter<'a, S> {
    pub fn new(service: &'a ExpenseService<S>) -> Self {
        Self { service }
    }

    /// Export expenses to CSV format
    pub async fn export_expenses_csv<W: Write>(
        &self,
        owner: &OwnerId,
        include_deleted: bool,
        writer: W,
    ) -> Result<usize> {
        let expenses = self.service.list_expenses(owner, include_deleted).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "tenant", "amount", "created_at", "deleted_at"])?;

        for expense in &expenses {
            csv_writer.write_record(&[
                expense.id.to_string(),
                expense.label.clone(),
                expense.amount.to_string(),
                expense.created_at.to_rfc3339(),
                expense
                    .deleted_at
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_default(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(expenses.len())
    }

    /// Export expenses as a JSON snapshot
    pub async fn export_expenses_json<W: Write>(
        &self,
        owner: &OwnerId,
        include_deleted: bool,
        mut writer: W,
    ) -> Result<ExpenseSnapshot> {
        let expenses = self.service.list_expenses(owner, include_deleted).await?;

        let snapshot = ExpenseSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            owner_id: owner.clone(),
            expenses,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
