//! Common error types for TCM

use thiserror::Error;

/// Common result type for TCM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across TCM crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
