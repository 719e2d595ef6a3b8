use thiserror::Error;

use crate::domain::{BatchError, ParseDayError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("User not authenticated")]
    MissingPrincipal,

    #[error("Invalid expenses: {0}")]
    MalformedInput(#[from] BatchError),

    #[error("Invalid date: {0}")]
    MalformedDate(#[from] ParseDayError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
