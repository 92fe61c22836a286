use std::io;

use thiserror::Error;

use crate::errors::CurrencyError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("Invalid rate configuration: {0}")]
    Rate(#[from] CurrencyError),
}
