use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    DAY_INPUT_FORMAT, DeletionCriteria, ExpenseRecord, OwnerId, Timestamp,
};

use super::{ExpenseStore, MIGRATION_001_INITIAL};

const EXPENSE_COLUMNS: &str = "id, owner_id, tenant, amount, created_at, deleted_at";

/// SQLite-backed expense storage.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<ExpenseRecord> {
        let id_str: String = row.get("id");
        let owner_str: String = row.get("owner_id");
        let created_at_str: String = row.get("created_at");
        let deleted_at_str: Option<String> = row.get("deleted_at");

        Ok(ExpenseRecord {
            id: Uuid::parse_str(&id_str).context("Invalid expense ID")?,
            owner_id: OwnerId::new(owner_str)
                .ok_or_else(|| anyhow::anyhow!("Expense {} has a blank owner", id_str))?,
            label: row.get("tenant"),
            amount: row.get("amount"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?,
            deleted_at: deleted_at_str
                .map(|s| DateTime::parse_from_rfc3339(&s))
                .transpose()
                .context("Invalid deleted_at timestamp")?,
        })
    }
}

fn day_key(day: NaiveDate) -> String {
    day.format(DAY_INPUT_FORMAT).to_string()
}

impl ExpenseStore for Repository {
    async fn insert_all(&self, records: &[ExpenseRecord]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO expenses (id, owner_id, tenant, amount, created_at, created_day, deleted_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(record.id.to_string())
            .bind(record.owner_id.as_str())
            .bind(&record.label)
            .bind(record.amount)
            .bind(record.created_at.to_rfc3339())
            .bind(day_key(record.day()))
            .bind(record.deleted_at.map(|dt| dt.to_rfc3339()))
            .execute(&mut *tx)
            .await
            .context("Failed to save expense")?;
        }

        tx.commit().await.context("Failed to commit expenses")?;
        tracing::debug!(count = records.len(), "inserted expenses");
        Ok(())
    }

    async fn list_for_owner(
        &self,
        owner_id: &OwnerId,
        include_deleted: bool,
    ) -> Result<Vec<ExpenseRecord>> {
        let query = if include_deleted {
            format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE owner_id = ? ORDER BY rowid")
        } else {
            format!(
                "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE owner_id = ? AND deleted_at IS NULL ORDER BY rowid"
            )
        };

        let rows = sqlx::query(&query)
            .bind(owner_id.as_str())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    async fn list_active_for_day(
        &self,
        owner_id: &OwnerId,
        day: NaiveDate,
    ) -> Result<Vec<ExpenseRecord>> {
        let query = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE owner_id = ? AND created_day = ? AND deleted_at IS NULL ORDER BY rowid"
        );

        let rows = sqlx::query(&query)
            .bind(owner_id.as_str())
            .bind(day_key(day))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list expenses for day")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    async fn mark_deleted(&self, criteria: &DeletionCriteria, deleted_at: Timestamp) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET deleted_at = ?
            WHERE owner_id = ? AND created_day = ? AND deleted_at IS NULL
            "#,
        )
        .bind(deleted_at.to_rfc3339())
        .bind(criteria.owner_id.as_str())
        .bind(day_key(criteria.day))
        .execute(&self.pool)
        .await
        .context("Failed to delete expenses")?;

        Ok(result.rows_affected())
    }
}
