pub mod errors;
pub mod orders;
pub mod prompt;

pub use errors::{ServiceError, ServiceResult};
