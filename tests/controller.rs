use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use order_desk::domain::order::{Order, OrderStatus};
use order_desk::domain::types::{CancellationReason, OrderId, PageSize};
use order_desk::repository::errors::{RepositoryError, RepositoryResult};
use order_desk::repository::{OrderListQuery, OrderPage, OrderReader, OrderWriter};
use order_desk::services::ServiceError;
use order_desk::services::orders::{ActionOutcome, OrderListController, RefreshOutcome};
use order_desk::services::prompt::FixedPrompt;
use tokio::sync::oneshot;

mod common;

fn id(raw: &str) -> OrderId {
    OrderId::new(raw).unwrap()
}

#[tokio::test]
async fn test_walks_pages_of_the_in_memory_repository() {
    let controller = OrderListController::new(
        common::repository(45),
        FixedPrompt::declining(),
        PageSize::default(),
    );

    controller.load().await.unwrap();
    assert_eq!(controller.state().total_pages, 3);

    controller.next_page().await.unwrap();
    controller.next_page().await.unwrap();
    assert_eq!(controller.snapshot().orders.len(), 5);
    assert_eq!(controller.next_page().await.unwrap(), None);

    controller.previous_page().await.unwrap();
    let view = controller.snapshot();
    assert_eq!(view.state.page, 2);
    assert_eq!(view.orders[0].id.as_str(), "order-020");
    assert!(!view.loading);
}

#[tokio::test]
async fn test_subscribers_see_published_results() {
    let controller = OrderListController::new(
        common::repository(12),
        FixedPrompt::declining(),
        PageSize::new(5).unwrap(),
    );
    let mut updates = controller.subscribe();

    controller
        .set_status_filter(Some(OrderStatus::Confirmed))
        .await
        .unwrap();

    assert!(updates.has_changed().unwrap());
    let view = updates.borrow_and_update().clone();
    assert_eq!(view.state.total_count, 3);
    assert!(view.orders.iter().all(|o| o.status == OrderStatus::Confirmed));
}

#[tokio::test]
async fn test_ship_moves_confirmed_order_to_shipped() {
    let repo = common::repository(5);
    let controller =
        OrderListController::new(repo.clone(), FixedPrompt::accepting(""), PageSize::default());
    controller.load().await.unwrap();

    let outcome = controller.request_ship(&id("order-001")).await.unwrap();

    assert_eq!(outcome, ActionOutcome::Completed);
    let shipped = controller
        .snapshot()
        .find_order("order-001")
        .map(|o| o.status);
    assert_eq!(shipped, Some(OrderStatus::Shipped));
}

#[tokio::test]
async fn test_ship_conflict_from_repository_is_surfaced() {
    let repo = common::repository(5);
    let controller =
        OrderListController::new(repo.clone(), FixedPrompt::accepting(""), PageSize::default());
    controller.load().await.unwrap();

    // Another user ships the order after the list was loaded.
    repo.ship_order(&id("order-001")).await.unwrap();
    let before = controller.snapshot();

    let result = controller.request_ship(&id("order-001")).await;

    assert!(matches!(result, Err(ServiceError::Conflict(_))));
    assert_eq!(controller.snapshot(), before);
}

#[tokio::test]
async fn test_cancel_with_reason_updates_the_list() {
    let repo = common::repository(5);
    let controller = OrderListController::new(
        repo.clone(),
        FixedPrompt::accepting("ordered twice"),
        PageSize::default(),
    );
    controller.load().await.unwrap();

    let outcome = controller.request_cancel(&id("order-000")).await.unwrap();

    assert_eq!(outcome, ActionOutcome::Completed);
    assert_eq!(
        repo.cancellation_reason(&id("order-000")).unwrap(),
        Some(CancellationReason::new("ordered twice").unwrap())
    );
    assert_eq!(
        controller
            .snapshot()
            .find_order("order-000")
            .map(|o| o.status),
        Some(OrderStatus::Cancelled)
    );
}

#[tokio::test]
async fn test_dismissed_cancel_changes_nothing() {
    let repo = common::repository(5);
    let controller =
        OrderListController::new(repo.clone(), FixedPrompt::declining(), PageSize::default());
    controller.load().await.unwrap();

    let outcome = controller.request_cancel(&id("order-000")).await.unwrap();

    assert_eq!(outcome, ActionOutcome::Declined);
    assert_eq!(repo.cancellation_reason(&id("order-000")).unwrap(), None);
}

#[tokio::test]
async fn test_cancel_is_not_offered_for_delivered_rows() {
    let controller = OrderListController::new(
        common::repository(5),
        FixedPrompt::accepting("late"),
        PageSize::default(),
    );
    controller.load().await.unwrap();

    let result = controller.request_cancel(&id("order-003")).await;

    assert!(matches!(result, Err(ServiceError::ActionNotAvailable(_))));
}

#[tokio::test]
async fn test_open_order_reports_missing_orders() {
    let controller = OrderListController::new(
        common::repository(3),
        FixedPrompt::declining(),
        PageSize::default(),
    );

    let order = controller.open_order(&id("order-002")).await.unwrap();
    assert_eq!(order.customer_name.as_str(), "Customer 2");
    assert_eq!(controller.detail_path(&order.id), "/orders/order-002");

    let missing = controller.open_order(&id("order-404")).await;
    assert!(matches!(missing, Err(ServiceError::NotFound)));
}

/// Repository whose list responses are released by the test, in any order.
struct GatedRepository {
    gates: Mutex<VecDeque<(oneshot::Receiver<()>, RepositoryResult<OrderPage>)>>,
}

impl GatedRepository {
    fn new(responses: Vec<(oneshot::Receiver<()>, RepositoryResult<OrderPage>)>) -> Self {
        Self {
            gates: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl OrderReader for GatedRepository {
    async fn list_orders(&self, _query: OrderListQuery) -> RepositoryResult<OrderPage> {
        let next = self.gates.lock().unwrap().pop_front();
        let (gate, response) = next.expect("unexpected list call");
        gate.await.expect("gate dropped");
        response
    }

    async fn get_order_by_id(&self, _id: &OrderId) -> RepositoryResult<Option<Order>> {
        Ok(None)
    }
}

#[async_trait]
impl OrderWriter for GatedRepository {
    async fn ship_order(&self, _id: &OrderId) -> RepositoryResult<()> {
        Ok(())
    }

    async fn cancel_order(
        &self,
        _id: &OrderId,
        _reason: &CancellationReason,
    ) -> RepositoryResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_slow_earlier_response_does_not_overwrite_newer_one() {
    let all = common::numbered_orders(3);
    let (release_first, first_gate) = oneshot::channel();
    let (release_second, second_gate) = oneshot::channel();
    let repo = GatedRepository::new(vec![
        (
            first_gate,
            Ok(OrderPage {
                total_count: 3,
                orders: all.clone(),
            }),
        ),
        (
            second_gate,
            Ok(OrderPage {
                total_count: 1,
                orders: vec![all[1].clone()],
            }),
        ),
    ]);
    let controller = OrderListController::new(repo, FixedPrompt::declining(), PageSize::default());

    let first = controller.refresh();
    let second = async {
        let outcome = controller.set_status_filter(Some(OrderStatus::Confirmed));
        release_second.send(()).unwrap();
        let outcome = outcome.await;
        release_first.send(()).unwrap();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.unwrap(), RefreshOutcome::Superseded);
    assert_eq!(second.unwrap(), RefreshOutcome::Applied);
    let view = controller.snapshot();
    assert_eq!(view.orders.len(), 1);
    assert_eq!(view.orders[0].id.as_str(), "order-001");
    assert_eq!(view.state.total_count, 1);
    assert!(!view.loading);
}

#[tokio::test]
async fn test_superseded_failure_is_ignored() {
    let all = common::numbered_orders(2);
    let (release_first, first_gate) = oneshot::channel();
    let (release_second, second_gate) = oneshot::channel();
    let repo = GatedRepository::new(vec![
        (
            first_gate,
            Err(RepositoryError::ConnectionError("reset".to_string())),
        ),
        (
            second_gate,
            Ok(OrderPage {
                total_count: 2,
                orders: all,
            }),
        ),
    ]);
    let controller = OrderListController::new(repo, FixedPrompt::declining(), PageSize::default());

    let first = async {
        let outcome = controller.refresh().await;
        // The newer query is still in flight.
        assert!(controller.is_loading());
        release_second.send(()).unwrap();
        outcome
    };
    let second = async {
        let outcome = controller.set_search("customer");
        release_first.send(()).unwrap();
        outcome.await
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.unwrap(), RefreshOutcome::Superseded);
    assert_eq!(second.unwrap(), RefreshOutcome::Applied);
    assert_eq!(controller.snapshot().orders.len(), 2);
}
