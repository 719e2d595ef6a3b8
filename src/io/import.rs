use anyhow::{Context, Result};
use std::io::Read;

use crate::application::ExpenseService;
use crate::domain::{ExpenseBatch, NewExpense, OwnerId, parse_amount};
use crate::storage::ExpenseStore;

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
}

/// Read a bulk payload: `{"expenses": [{"tenant": "...", "amount": 1.0}]}`.
pub fn read_batch_json<R: Read>(reader: R) -> Result<ExpenseBatch> {
    serde_json::from_reader(reader).context("Invalid expenses payload")
}

/// Read a CSV with `tenant` and `amount` columns into a batch.
/// Rows that fail to parse are reported instead of being dropped silently.
pub fn read_batch_csv<R: Read>(reader: R) -> Result<(ExpenseBatch, Vec<ImportError>)> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers().context("Missing CSV header")?.clone();

    let tenant_col = headers
        .iter()
        .position(|h| h.trim() == "tenant")
        .ok_or_else(|| anyhow::anyhow!("CSV header must contain a 'tenant' column"))?;
    let amount_col = headers
        .iter()
        .position(|h| h.trim() == "amount")
        .ok_or_else(|| anyhow::anyhow!("CSV header must contain an 'amount' column"))?;

    let mut expenses = Vec::new();
    let mut errors = Vec::new();

    for (line_num, result) in csv_reader.records().enumerate() {
        let line = line_num + 2; // +2 for header and 0-indexing

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                errors.push(ImportError {
                    line,
                    field: None,
                    error: format!("CSV parse error: {}", e),
                });
                continue;
            }
        };

        let tenant = record.get(tenant_col).unwrap_or("").trim();
        let amount = match parse_amount(record.get(amount_col).unwrap_or("")) {
            Ok(a) => a,
            Err(e) => {
                errors.push(ImportError {
                    line,
                    field: Some("amount".to_string()),
                    error: format!("Invalid amount: {}", e),
                });
                continue;
            }
        };

        expenses.push(NewExpense::new(tenant, amount));
    }

    Ok((ExpenseBatch::new(expenses), errors))
}

/// Importer for recording payloads through the service
pub struct Importer<'a, S> {
    service: &'a ExpenseService<S>,
}

impl<'a, S: ExpenseStore> Importer<'a, S> {
    pub fn new(service: &'a ExpenseService<S>) -> Self {
        Self { service }
    }

    /// Import a batch as one unit. Any read error or invalid entry aborts
    /// the whole import before anything is stored.
    pub async fn import_batch(
        &self,
        owner: &OwnerId,
        batch: ExpenseBatch,
        read_errors: Vec<ImportError>,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        if !read_errors.is_empty() {
            return Ok(ImportResult {
                imported: 0,
                errors: read_errors,
            });
        }

        if let Err(e) = batch.validate() {
            return Ok(ImportResult {
                imported: 0,
                errors: vec![ImportError {
                    line: 0,
                    field: None,
                    error: e.to_string(),
                }],
            });
        }

        if options.dry_run {
            return Ok(ImportResult {
                imported: batch.expenses.len(),
                errors: Vec::new(),
            });
        }

        let records = self.service.record_expenses(owner, batch).await?;
        Ok(ImportResult {
            imported: records.len(),
            errors: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_batch_json() {
        let batch =
            read_batch_json(r#"{"expenses": [{"tenant": "Food", "amount": 10.5}]}"#.as_bytes())
                .unwrap();
        assert_eq!(batch.expenses, vec![NewExpense::new("Food", 10.5)]);

        assert!(read_batch_json("not json".as_bytes()).is_err());
    }

    #[test]
    fn test_read_batch_csv() {
        let input = "amount,tenant\n10.50,Food\nabc,Broken\n5,Transport\n";

        let (batch, errors) = read_batch_csv(input.as_bytes()).unwrap();

        assert_eq!(
            batch.expenses,
            vec![NewExpense::new("Food", 10.5), NewExpense::new("Transport", 5.0)]
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 3);
        assert_eq!(errors[0].field.as_deref(), Some("amount"));
    }

    #[test]
    fn test_read_batch_csv_requires_columns() {
        assert!(read_batch_csv("name,value\nFood,1\n".as_bytes()).is_err());
    }
}
