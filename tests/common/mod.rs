// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::DateTime;
use daybook::application::ExpenseService;
use daybook::domain::{ExpenseBatch, NewExpense, OwnerId, Timestamp};
use daybook::storage::Repository;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(ExpenseService<Repository>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = ExpenseService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to create a migrated repository in a temporary database
pub async fn test_repository() -> Result<(Repository, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let repo = Repository::init(&format!("sqlite:{}?mode=rwc", db_path.display())).await?;
    Ok((repo, temp_dir))
}

/// Helper to parse an RFC 3339 timestamp, keeping its offset
pub fn at(timestamp: &str) -> Timestamp {
    DateTime::parse_from_rfc3339(timestamp).unwrap()
}

pub fn owner(name: &str) -> OwnerId {
    OwnerId::new(name).unwrap()
}

pub fn batch(entries: &[(&str, f64)]) -> ExpenseBatch {
    ExpenseBatch::new(
        entries
            .iter()
            .map(|(tenant, amount)| NewExpense::new(*tenant, *amount))
            .collect(),
    )
}

/// Record the spending scenario used across tests:
/// Food 10.50 and Transport 5.00 on 2024-03-05, Rent 500.00 on 2024-03-01.
pub async fn record_march_week(service: &ExpenseService<Repository>, who: &OwnerId) -> Result<()> {
    service
        .record_expenses_at(who, batch(&[("Rent", 500.0)]), at("2024-03-01T09:00:00Z"))
        .await?;
    service
        .record_expenses_at(who, batch(&[("Food", 10.50)]), at("2024-03-05T08:00:00Z"))
        .await?;
    service
        .record_expenses_at(who, batch(&[("Transport", 5.00)]), at("2024-03-05T18:00:00Z"))
        .await?;
    Ok(())
}
