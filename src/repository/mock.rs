//! Mock repository implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::domain::order::Order;
use crate::domain::types::{CancellationReason, OrderId};
use crate::repository::errors::RepositoryResult;
use crate::repository::{OrderListQuery, OrderPage, OrderReader, OrderWriter};

mock! {
    pub Repository {}

    #[async_trait]
    impl OrderReader for Repository {
        async fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<OrderPage>;
        async fn get_order_by_id(&self, id: &OrderId) -> RepositoryResult<Option<Order>>;
    }

    #[async_trait]
    impl OrderWriter for Repository {
        async fn ship_order(&self, id: &OrderId) -> RepositoryResult<()>;
        async fn cancel_order(
            &self,
            id: &OrderId,
            reason: &CancellationReason,
        ) -> RepositoryResult<()>;
    }
}
