//! In-memory order repository.
//!
//! Stands in for the order service: it filters, sorts and paginates a shared
//! order list and enforces the ship/cancel transition rules the same way the
//! service does, reporting violations as [`RepositoryError::Conflict`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::order::{Order, OrderAction};
use crate::domain::types::{CancellationReason, OrderId};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{OrderListQuery, OrderPage, OrderReader, OrderWriter};

#[derive(Debug, Default)]
struct Store {
    orders: Vec<Order>,
    cancellations: HashMap<OrderId, CancellationReason>,
}

/// Cloneable handle to a shared in-memory order store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryOrderRepository {
    store: Arc<RwLock<Store>>,
    latency: Option<Duration>,
}

impl InMemoryOrderRepository {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store {
                orders,
                cancellations: HashMap::new(),
            })),
            latency: None,
        }
    }

    /// Loads orders from a JSON array file.
    pub fn from_json_file(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let orders: Vec<Order> = serde_json::from_str(&raw)?;
        log::info!(
            "Loaded {} orders from {}",
            orders.len(),
            path.as_ref().display()
        );
        Ok(Self::new(orders))
    }

    /// Delays every call by `latency`, simulating a remote service.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = (!latency.is_zero()).then_some(latency);
        self
    }

    /// Returns a copy of every stored order, in insertion order.
    pub fn snapshot(&self) -> RepositoryResult<Vec<Order>> {
        Ok(self.read()?.orders.clone())
    }

    /// Reason recorded when the order was cancelled.
    pub fn cancellation_reason(&self, id: &OrderId) -> RepositoryResult<Option<CancellationReason>> {
        Ok(self.read()?.cancellations.get(id).cloned())
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Store>> {
        self.store
            .read()
            .map_err(|_| RepositoryError::Unexpected("order store lock poisoned".to_string()))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Store>> {
        self.store
            .write()
            .map_err(|_| RepositoryError::Unexpected("order store lock poisoned".to_string()))
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn transition(&self, id: &OrderId, action: OrderAction) -> RepositoryResult<Order> {
        let mut store = self.write()?;
        let order = store
            .orders
            .iter_mut()
            .find(|order| &order.id == id)
            .ok_or(RepositoryError::NotFound)?;

        let next = order.status.apply(action).ok_or_else(|| {
            RepositoryError::Conflict(format!(
                "cannot {action} order {id} in status {}",
                order.status
            ))
        })?;
        order.status = next;
        Ok(order.clone())
    }
}

fn matches_search(order: &Order, term: &str) -> bool {
    let term = term.to_lowercase();
    order.id.as_str().to_lowercase().contains(&term)
        || order.customer_name.as_str().to_lowercase().contains(&term)
}

#[async_trait]
impl OrderReader for InMemoryOrderRepository {
    async fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<OrderPage> {
        self.simulate_latency().await;

        let store = self.read()?;
        let mut matching: Vec<&Order> = store
            .orders
            .iter()
            .filter(|order| query.status.is_none_or(|status| order.status == status))
            .filter(|order| {
                query
                    .search
                    .as_deref()
                    .is_none_or(|term| matches_search(order, term))
            })
            .collect();

        // Newest first; ties broken by id so pages are stable.
        matching.sort_by(|a, b| {
            b.order_date
                .cmp(&a.order_date)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total_count = matching.len();
        let orders = match query.pagination {
            Some(pagination) => matching
                .into_iter()
                .skip(pagination.offset())
                .take(pagination.per_page)
                .cloned()
                .collect(),
            None => matching.into_iter().cloned().collect(),
        };

        Ok(OrderPage {
            total_count,
            orders,
        })
    }

    async fn get_order_by_id(&self, id: &OrderId) -> RepositoryResult<Option<Order>> {
        self.simulate_latency().await;
        Ok(self.read()?.orders.iter().find(|order| &order.id == id).cloned())
    }
}

#[async_trait]
impl OrderWriter for InMemoryOrderRepository {
    async fn ship_order(&self, id: &OrderId) -> RepositoryResult<()> {
        self.simulate_latency().await;
        self.transition(id, OrderAction::Ship)?;
        log::info!("Order {id} shipped");
        Ok(())
    }

    async fn cancel_order(
        &self,
        id: &OrderId,
        reason: &CancellationReason,
    ) -> RepositoryResult<()> {
        self.simulate_latency().await;
        self.transition(id, OrderAction::Cancel)?;
        self.write()?
            .cancellations
            .insert(id.clone(), reason.clone());
        log::info!("Order {id} cancelled: {reason}");
        Ok(())
    }
}
