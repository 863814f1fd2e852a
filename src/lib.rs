//! Order list view: query and pagination controller over an order repository.
//!
//! The `data` feature builds the domain, repository and controller layers;
//! `console` adds the terminal front end used by the `order-desk` binary.

#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod dto;
#[cfg(feature = "data")]
mod error_conversions;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "data")]
pub mod pagination;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod services;

#[cfg(feature = "console")]
pub mod console;
#[cfg(feature = "console")]
pub mod models;
