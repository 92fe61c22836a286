use thiserror::Error;

use crate::currency::Currency;

/// Failures raised while looking up or applying a conversion rate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurrencyError {
    #[error("conversion rate {from} -> {to} not found")]
    RateNotFound { from: Currency, to: Currency },
    #[error("invalid conversion rate {rate} for {from} -> {to}")]
    InvalidRate {
        from: Currency,
        to: Currency,
        rate: f64,
    },
}

/// Error type for hierarchy traversal.
///
/// Every variant is fatal to the aggregation call that produced them; the
/// same input always yields the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HierarchyError {
    #[error("malformed account hierarchy: account `{account_id}` visited twice")]
    Structural { account_id: String },
    #[error("node #{index} does not belong to this account hierarchy")]
    UnknownNode { index: usize },
    #[error(transparent)]
    Conversion(#[from] CurrencyError),
}

/// Error type for reading and writing account books.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Account book not found: {0}")]
    NotFound(String),
}
