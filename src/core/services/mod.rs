pub mod account_service;
pub mod hierarchy_service;

pub use account_service::AccountService;
pub use hierarchy_service::{HierarchyReport, HierarchyService};

use crate::errors::{HierarchyError, StorageError};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Invalid(String),
    #[error("{0} not found")]
    NotFound(String),
}
