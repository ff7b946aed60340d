use thiserror::Error;

use crate::repository::RepositoryError;

pub mod orders;
pub mod reference_data;
pub mod runs;

/// Result type returned by the generation services.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no products available for order generation")]
    NoProducts,
    #[error("no customers with delivery sequences available for order generation")]
    NoCustomers,
}
