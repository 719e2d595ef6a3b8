//! Runtime configuration.
//!
//! Values come from command-line flags, falling back to `DAYBOOK_*`
//! environment variables (resolved by clap) and then to the defaults below.

use crate::application::{AppError, require_owner};
use crate::domain::OwnerId;

/// Database file used when neither `--database` nor `DAYBOOK_DATABASE` is set.
pub const DEFAULT_DATABASE: &str = "daybook.db";

/// Environment variable naming the database file.
pub const DATABASE_ENV: &str = "DAYBOOK_DATABASE";

/// Environment variable naming the acting user.
pub const USER_ENV: &str = "DAYBOOK_USER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite database file path.
    pub database: String,
    /// Acting user, if one was given.
    pub user: Option<String>,
    /// Emit debug logs.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            user: None,
            verbose: false,
        }
    }
}

impl Config {
    pub fn new(database: impl Into<String>, user: Option<String>, verbose: bool) -> Self {
        Self {
            database: database.into(),
            user,
            verbose,
        }
    }

    /// The principal every expense command acts for.
    pub fn owner(&self) -> Result<OwnerId, AppError> {
        require_owner(self.user.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database, "daybook.db");
        assert!(config.user.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_owner_requires_user() {
        assert!(matches!(
            Config::default().owner(),
            Err(AppError::MissingPrincipal)
        ));

        let config = Config::new("x.db", Some("alice".into()), false);
        assert_eq!(config.owner().unwrap().as_str(), "alice");
    }
}
