//! Domain aggregates exposed by the order list layer.

pub mod order;
pub mod types;
