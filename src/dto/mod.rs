//! DTO modules that bridge the controller with templates.

pub mod orders;
