use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PayoffError {
    #[error("invalid assumption {field}: {message}")]
    InvalidAssumption {
        field: &'static str,
        message: String,
    },

    #[error("invalid debt `{name}`: {message}")]
    InvalidDebt { name: String, message: String },

    #[error("debt in row {row} has no name")]
    EmptyDebtName { row: usize },

    #[error("debt name `{0}` appears more than once")]
    DuplicateDebtName(String),

    #[error("debt id {0} appears more than once")]
    DuplicateDebtId(usize),

    #[error("date {0} cannot be advanced by one month")]
    DateOutOfRange(NaiveDate),
}

pub type Result<T> = std::result::Result<T, PayoffError>;
