use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::ExpenseService;
use crate::config::{Config, DATABASE_ENV, DEFAULT_DATABASE, USER_ENV};
use crate::domain::{
    DayDetail, DayGroup, ExpenseBatch, ExpenseRecord, NewExpense, OwnerId, format_amount,
    parse_amount,
};
use crate::io::{Exporter, ImportOptions, Importer, read_batch_csv, read_batch_json};
use crate::storage::Repository;

/// Daybook - expenses grouped by day
#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Record expenses and review them day by day")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = DATABASE_ENV, default_value = DEFAULT_DATABASE, global = true)]
    pub database: String,

    /// User the expenses belong to
    #[arg(short, long, env = USER_ENV, global = true)]
    pub user: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record a single expense
    Add {
        /// Tenant (free-text category), e.g. "Food"
        tenant: String,

        /// Amount, e.g. "10.50"
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Record a batch of expenses at once (all or nothing)
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Format: json ({"expenses": [{"tenant", "amount"}]}) or csv (tenant,amount)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Validate without recording
        #[arg(long)]
        dry_run: bool,
    },

    /// List expenses in the order they were recorded
    List {
        /// Include deleted expenses
        #[arg(long)]
        all: bool,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show expenses grouped by day, newest first
    Days {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show the expenses of a single day
    Day {
        /// Day (YYYY-MM-DD)
        date: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Delete every expense of a day
    Delete {
        /// Day (YYYY-MM-DD)
        date: String,
    },

    /// Export expenses to CSV or JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Include deleted expenses
        #[arg(long)]
        all: bool,
    },
}

impl Cli {
    pub fn config(&self) -> Config {
        Config::new(self.database.clone(), self.user.clone(), self.verbose)
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config();

        match self.command {
            Commands::Init => {
                ExpenseService::init(&config.database).await?;
                println!("Database initialized: {}", config.database);
            }

            Commands::Add { tenant, amount } => {
                let (owner, service) = open(&config).await?;
                let amount =
                    parse_amount(&amount).context("Invalid amount format. Use '10.50' or '10'")?;
                let batch = ExpenseBatch::new(vec![NewExpense::new(tenant, amount)]);

                let records = service.record_expenses(&owner, batch).await?;
                for record in &records {
                    println!(
                        "Recorded expense: {} {} ({})",
                        record.label,
                        format_amount(record.amount),
                        record.id
                    );
                }
            }

            Commands::Import {
                input,
                format,
                dry_run,
            } => {
                let (owner, service) = open(&config).await?;
                run_import_command(&service, &owner, input.as_deref(), &format, dry_run).await?;
            }

            Commands::List { all, format } => {
                let (owner, service) = open(&config).await?;
                let expenses = service.list_expenses(&owner, all).await?;
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&expenses)?),
                    "table" => print!("{}", render_expenses_table(&expenses)),
                    other => anyhow::bail!("Unknown format '{}'. Use table or json", other),
                }
            }

            Commands::Days { format } => {
                let (owner, service) = open(&config).await?;
                let groups = service.expenses_by_day(&owner).await?;
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&groups)?),
                    "table" => print!("{}", render_days_table(&groups)),
                    other => anyhow::bail!("Unknown format '{}'. Use table or json", other),
                }
            }

            Commands::Day { date, format } => {
                let (owner, service) = open(&config).await?;
                let detail = service.expenses_for_day(&owner, &date).await?;
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&detail)?),
                    "table" => print!("{}", render_day_detail(&detail)),
                    other => anyhow::bail!("Unknown format '{}'. Use table or json", other),
                }
            }

            Commands::Delete { date } => {
                let (owner, service) = open(&config).await?;
                service.delete_expenses_for_day(&owner, &date).await?;
                println!("Expenses deleted successfully");
            }

            Commands::Export {
                output,
                format,
                all,
            } => {
                let (owner, service) = open(&config).await?;
                run_export_command(&service, &owner, output.as_deref(), &format, all).await?;
            }
        }

        Ok(())
    }
}

/// Resolve the acting user, then open the existing database.
async fn open(config: &Config) -> Result<(OwnerId, ExpenseService<Repository>)> {
    let owner = config.owner()?;
    let service = ExpenseService::connect(&config.database)
        .await
        .with_context(|| {
            format!(
                "Cannot open database '{}'. Run `daybook init` first",
                config.database
            )
        })?;
    Ok((owner, service))
}

async fn run_import_command(
    service: &ExpenseService<Repository>,
    owner: &OwnerId,
    input: Option<&str>,
    format: &str,
    dry_run: bool,
) -> Result<()> {
    let reader: Box<dyn std::io::Read> = match input {
        Some(path) => Box::new(
            std::fs::File::open(path).with_context(|| format!("Cannot open '{}'", path))?,
        ),
        None => Box::new(std::io::stdin()),
    };

    let (batch, read_errors) = match format {
        "json" => (read_batch_json(reader)?, Vec::new()),
        "csv" => read_batch_csv(reader)?,
        other => anyhow::bail!("Unknown import format '{}'. Use json or csv", other),
    };

    let importer = Importer::new(service);
    let result = importer
        .import_batch(owner, batch, read_errors, ImportOptions { dry_run })
        .await?;

    if !result.errors.is_empty() {
        eprintln!("Nothing imported, {} error(s):", result.errors.len());
        for error in &result.errors {
            match (&error.field, error.line) {
                (Some(field), line) => eprintln!("  line {} ({}): {}", line, field, error.error),
                (None, 0) => eprintln!("  {}", error.error),
                (None, line) => eprintln!("  line {}: {}", line, error.error),
            }
        }
        anyhow::bail!("Import failed");
    }

    if dry_run {
        println!("Validated {} expense(s), nothing recorded", result.imported);
    } else {
        println!("Expenses created successfully: {}", result.imported);
    }
    Ok(())
}

async fn run_export_command(
    service: &ExpenseService<Repository>,
    owner: &OwnerId,
    output: Option<&str>,
    format: &str,
    include_deleted: bool,
) -> Result<()> {
    let writer: Box<dyn std::io::Write> = match output {
        Some(path) => Box::new(
            std::fs::File::create(path).with_context(|| format!("Cannot create '{}'", path))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    let exporter = Exporter::new(service);
    let count = match format {
        "csv" => {
            exporter
                .export_expenses_csv(owner, include_deleted, writer)
                .await?
        }
        "json" => {
            exporter
                .export_expenses_json(owner, include_deleted, writer)
                .await?
                .expenses
                .len()
        }
        other => anyhow::bail!("Unknown export format '{}'. Use csv or json", other),
    };

    if let Some(path) = output {
        eprintln!("Exported {} expense(s) to {}", count, path);
    }
    Ok(())
}

fn render_expenses_table(expenses: &[ExpenseRecord]) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:<20} {:>12} {:<8}",
        "CREATED", "TENANT", "AMOUNT", "STATUS"
    );
    let _ = writeln!(out, "{}", "-".repeat(63));
    for expense in expenses {
        let _ = writeln!(
            out,
            "{:<20} {:<20} {:>12} {:<8}",
            expense.created_at.format("%Y-%m-%d %H:%M:%S"),
            truncate(&expense.label, 20),
            format_amount(expense.amount),
            if expense.is_deleted() { "deleted" } else { "active" }
        );
    }
    out
}

fn render_days_table(groups: &[DayGroup]) -> String {
    if groups.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{:<40} {:>12}", group.date, format_amount(group.total));
        for expense in &group.expenses {
            let _ = writeln!(
                out,
                "  {:<8} {:<28} {:>12}",
                expense.created_at.format("%H:%M"),
                truncate(&expense.label, 28),
                format_amount(expense.amount)
            );
        }
    }
    out
}

fn render_day_detail(detail: &DayDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", detail.date);
    let _ = writeln!(out, "{}", "-".repeat(53));
    if detail.expenses.is_empty() {
        let _ = writeln!(out, "No expenses on this day.");
    }
    for expense in &detail.expenses {
        let _ = writeln!(
            out,
            "  {:<8} {:<28} {:>12}",
            expense.created_at.format("%H:%M"),
            truncate(&expense.label, 28),
            format_amount(expense.amount)
        );
    }
    let _ = writeln!(out, "{:<40} {:>12}", "TOTAL", format_amount(detail.total));
    out
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::domain::{detail_for_day, group_by_day, parse_day};

    fn expense(label: &str, amount: f64, created_at: &str) -> ExpenseRecord {
        ExpenseRecord::new(
            OwnerId::new("alice").unwrap(),
            label,
            amount,
            DateTime::parse_from_rfc3339(created_at).unwrap(),
        )
    }

    #[test]
    fn test_cli_parses_global_user_after_subcommand() {
        let cli = Cli::try_parse_from(["daybook", "days", "--user", "alice"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert!(matches!(cli.command, Commands::Days { .. }));
    }

    #[test]
    fn test_cli_parses_global_database_after_subcommand() {
        let cli = Cli::try_parse_from(["daybook", "days", "-d", "other.db", "-u", "alice"]).unwrap();
        assert_eq!(cli.database, "other.db");
        assert_eq!(cli.user.as_deref(), Some("alice"));
    }

    #[test]
    fn test_cli_accepts_negative_amount() {
        let cli = Cli::try_parse_from(["daybook", "-u", "alice", "add", "Refund", "-4.50"]).unwrap();
        match cli.command {
            Commands::Add { tenant, amount } => {
                assert_eq!(tenant, "Refund");
                assert_eq!(amount, "-4.50");
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_render_days_table() {
        let records = vec![
            expense("Food", 10.5, "2024-03-05T08:00:00Z"),
            expense("Rent", 500.0, "2024-03-01T09:00:00Z"),
        ];

        let table = render_days_table(&group_by_day(&records));

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Tuesday, 05 March 2024"));
        assert!(lines[0].ends_with("10.50"));
        assert!(lines[1].contains("08:00") && lines[1].contains("Food"));
        assert!(lines[2].starts_with("Friday, 01 March 2024"));
    }

    #[test]
    fn test_render_day_detail_empty() {
        let detail = detail_for_day(&[], parse_day("2024-03-05").unwrap());

        let text = render_day_detail(&detail);

        assert!(text.starts_with("Tuesday, 05 March 2024\n"));
        assert!(text.contains("No expenses on this day."));
        assert!(text.trim_end().ends_with("0.00"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Food", 10), "Food");
        assert_eq!(truncate("Groceries and more", 10), "Groceri...");
    }
}
