use async_trait::async_trait;
use serde::Serialize;

use crate::domain::order::{Order, OrderStatus};
use crate::domain::types::{CancellationReason, OrderId};
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod memory;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use memory::InMemoryOrderRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Number of rows preceding the requested page.
    pub fn offset(&self) -> usize {
        self.page.max(1).saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// Query descriptor sent to [`OrderReader::list_orders`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderListQuery {
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub pagination: Option<Pagination>,
}

impl OrderListQuery {
    pub fn new() -> Self {
        Self {
            search: None,
            status: None,
            pagination: None,
        }
    }

    /// Filters by free text; blank terms are dropped.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into().trim().to_string();
        self.search = (!term.is_empty()).then_some(term);
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }

    pub fn page(&self) -> Option<usize> {
        self.pagination.map(|p| p.page)
    }
}

impl Default for OrderListQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// One page of orders together with the total number of matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderPage {
    pub total_count: usize,
    pub orders: Vec<Order>,
}

#[async_trait]
pub trait OrderReader {
    async fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<OrderPage>;
    async fn get_order_by_id(&self, id: &OrderId) -> RepositoryResult<Option<Order>>;
}

#[async_trait]
pub trait OrderWriter {
    /// Moves a confirmed order to shipped.
    async fn ship_order(&self, id: &OrderId) -> RepositoryResult<()>;
    /// Cancels an order that has not been delivered yet.
    async fn cancel_order(&self, id: &OrderId, reason: &CancellationReason)
    -> RepositoryResult<()>;
}
