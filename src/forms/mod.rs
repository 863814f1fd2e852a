//! Form definitions backing the order list inputs.

use thiserror::Error;
use validator::ValidationErrors;

pub mod orders;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("cancellation reason is required")]
    EmptyReason,

    #[error("invalid status filter: {0}")]
    InvalidStatus(String),

    #[error("invalid order id")]
    InvalidOrderId,
}
