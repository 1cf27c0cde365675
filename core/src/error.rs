use alloc::string::String;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid position")]
    InvalidPosition,
    #[error("Grid size must be at least 2")]
    InvalidGridSize,
    #[error("Card values must be a permutation of 1..=N²")]
    InvalidLayout,
    #[error("No finished round to advance from")]
    NotRoundOver,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failure of the best-score store. Sessions keep running without a best score when this happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Score store unavailable: {0}")]
    Unavailable(String),
    #[error("Stored score could not be decoded: {0}")]
    Corrupt(String),
}
