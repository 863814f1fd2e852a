//! Query and pagination controller behind the order list view.
//!
//! The controller owns the filter/pagination state, turns user intent into
//! repository queries and publishes a single [`OrderListView`] that every
//! display surface reads. Every refresh is tagged with a sequence number and
//! only the response to the most recently issued query is applied.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;

use crate::domain::order::{Order, OrderAction, OrderStatus};
use crate::domain::types::{OrderId, PageSize};
use crate::forms::FormError;
use crate::forms::orders::{CancelOrderForm, CancelOrderPayload};
use crate::repository::errors::RepositoryResult;
use crate::repository::{OrderListQuery, OrderPage, OrderReader, OrderWriter};
use crate::services::prompt::UserPrompt;
use crate::services::{ServiceError, ServiceResult};

pub const SHIP_CONFIRMATION: &str = "Ship this order?";
pub const CANCELLATION_PROMPT: &str = "Cancellation reason:";

/// Filter and pagination state owned by the controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryState {
    pub page: usize,
    pub page_size: PageSize,
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub total_count: usize,
    pub total_pages: usize,
}

impl QueryState {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page: 1,
            page_size,
            search: None,
            status: None,
            total_count: 0,
            total_pages: 0,
        }
    }

    /// Builds the query descriptor for the current state.
    pub fn to_query(&self) -> OrderListQuery {
        let mut query = OrderListQuery::new().paginate(self.page, self.page_size.get());
        if let Some(term) = &self.search {
            query = query.search(term.clone());
        }
        if let Some(status) = self.status {
            query = query.status(status);
        }
        query
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    fn record_total(&mut self, total_count: usize) {
        self.total_count = total_count;
        self.total_pages = total_count.div_ceil(self.page_size.get());
    }

    /// Pulls `page` back inside `[1, total_pages]`; returns whether the
    /// new page has to be fetched. An empty result has nothing to fetch.
    fn clamp_page(&mut self) -> bool {
        if self.total_pages == 0 {
            self.page = 1;
            false
        } else if self.page > self.total_pages {
            self.page = self.total_pages;
            true
        } else {
            false
        }
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

/// The published result set together with the state that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderListView {
    pub orders: Vec<Order>,
    pub state: QueryState,
    pub loading: bool,
}

impl OrderListView {
    /// True when the last applied query matched nothing.
    pub fn is_empty(&self) -> bool {
        !self.loading && self.orders.is_empty()
    }

    /// Finds a displayed order by its full or abbreviated identifier.
    pub fn find_order(&self, raw_id: &str) -> Option<&Order> {
        let raw_id = raw_id.trim().trim_start_matches('#');
        self.orders
            .iter()
            .find(|order| order.id.as_str() == raw_id)
            .or_else(|| {
                let mut matches = self.orders.iter().filter(|order| order.id.short() == raw_id);
                match (matches.next(), matches.next()) {
                    (Some(order), None) => Some(order),
                    _ => None,
                }
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was the latest one and is now displayed.
    Applied,
    /// A newer query was issued while this one was in flight; its response was dropped.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The user declined the confirmation or gave no reason.
    Declined,
}

/// Detail route reached by clicking an order row.
pub fn order_detail_path(id: &OrderId) -> String {
    format!("/orders/{id}")
}

#[derive(Debug)]
struct Inner {
    state: QueryState,
    /// State that produced `orders`.
    applied: QueryState,
    orders: Vec<Order>,
    loading: bool,
    issued: u64,
}

impl Inner {
    fn view(&self) -> OrderListView {
        OrderListView {
            orders: self.orders.clone(),
            state: self.state.clone(),
            loading: self.loading,
        }
    }
}

enum Step {
    Done(ServiceResult<RefreshOutcome>),
    Retry,
}

pub struct OrderListController<R, P> {
    repo: R,
    prompt: P,
    inner: Mutex<Inner>,
    view: watch::Sender<OrderListView>,
}

impl<R, P> OrderListController<R, P>
where
    R: OrderReader + OrderWriter + Send + Sync,
    P: UserPrompt + Send + Sync,
{
    pub fn new(repo: R, prompt: P, page_size: PageSize) -> Self {
        let state = QueryState::new(page_size);
        let inner = Inner {
            applied: state.clone(),
            state,
            orders: Vec::new(),
            loading: false,
            issued: 0,
        };
        let (view, _) = watch::channel(inner.view());
        Self {
            repo,
            prompt,
            inner: Mutex::new(inner),
            view,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Receiver of every published result set.
    pub fn subscribe(&self) -> watch::Receiver<OrderListView> {
        self.view.subscribe()
    }

    /// The currently published result set.
    pub fn snapshot(&self) -> OrderListView {
        self.view.borrow().clone()
    }

    pub fn state(&self) -> QueryState {
        self.lock().state.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn detail_path(&self, id: &OrderId) -> String {
        order_detail_path(id)
    }

    /// Initial load when the view is first shown.
    pub async fn load(&self) -> ServiceResult<RefreshOutcome> {
        log::info!("Loading order list");
        self.refresh().await
    }

    /// Re-issues the query for the current state and publishes the result.
    pub async fn refresh(&self) -> ServiceResult<RefreshOutcome> {
        let mut may_clamp = true;
        loop {
            let (seq, query) = self.begin_query();
            log::debug!("Issuing order query #{seq}: {query:?}");

            let result = self.repo.list_orders(query).await;

            match self.finish_query(seq, result, may_clamp) {
                Step::Done(outcome) => return outcome,
                Step::Retry => may_clamp = false,
            }
        }
    }

    pub async fn set_search(&self, term: impl Into<String>) -> ServiceResult<RefreshOutcome> {
        let term = term.into().trim().to_string();
        {
            let mut inner = self.lock();
            inner.state.search = (!term.is_empty()).then_some(term);
            inner.state.page = 1;
        }
        self.refresh().await
    }

    pub async fn set_status_filter(
        &self,
        status: Option<OrderStatus>,
    ) -> ServiceResult<RefreshOutcome> {
        {
            let mut inner = self.lock();
            inner.state.status = status;
            inner.state.page = 1;
        }
        self.refresh().await
    }

    /// Moves forward one page; `None` when already on the last page.
    pub async fn next_page(&self) -> ServiceResult<Option<RefreshOutcome>> {
        {
            let mut inner = self.lock();
            if !inner.state.has_next() {
                return Ok(None);
            }
            inner.state.page += 1;
        }
        self.refresh().await.map(Some)
    }

    /// Moves back one page; `None` when already on the first page.
    pub async fn previous_page(&self) -> ServiceResult<Option<RefreshOutcome>> {
        {
            let mut inner = self.lock();
            if !inner.state.has_previous() {
                return Ok(None);
            }
            inner.state.page -= 1;
        }
        self.refresh().await.map(Some)
    }

    /// Fetches a single order for the detail view.
    pub async fn open_order(&self, id: &OrderId) -> ServiceResult<Order> {
        self.repo
            .get_order_by_id(id)
            .await
            .map_err(|err| {
                log::error!("Failed to load order {id}: {err}");
                ServiceError::from(err)
            })?
            .ok_or(ServiceError::NotFound)
    }

    /// Ships a confirmed order after the user confirms.
    pub async fn request_ship(&self, id: &OrderId) -> ServiceResult<ActionOutcome> {
        self.ensure_offered(id, OrderAction::Ship)?;

        if !self.prompt.confirm(SHIP_CONFIRMATION).await {
            log::info!("Shipping of order {id} declined");
            return Ok(ActionOutcome::Declined);
        }

        self.repo.ship_order(id).await.map_err(|err| {
            log::error!("Failed to ship order {id}: {err}");
            ServiceError::from(err)
        })?;

        self.refresh().await?;
        Ok(ActionOutcome::Completed)
    }

    /// Cancels an order with a reason supplied by the user.
    pub async fn request_cancel(&self, id: &OrderId) -> ServiceResult<ActionOutcome> {
        self.ensure_offered(id, OrderAction::Cancel)?;

        let Some(answer) = self.prompt.ask(CANCELLATION_PROMPT).await else {
            log::info!("Cancellation of order {id} dismissed");
            return Ok(ActionOutcome::Declined);
        };

        let payload = match CancelOrderPayload::try_from(CancelOrderForm { reason: answer }) {
            Ok(payload) => payload,
            Err(FormError::EmptyReason) => {
                log::info!("Cancellation of order {id} aborted without a reason");
                return Ok(ActionOutcome::Declined);
            }
            Err(err) => return Err(ServiceError::Form(err.to_string())),
        };

        self.repo
            .cancel_order(id, &payload.reason)
            .await
            .map_err(|err| {
                log::error!("Failed to cancel order {id}: {err}");
                ServiceError::from(err)
            })?;

        self.refresh().await?;
        Ok(ActionOutcome::Completed)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.view.send_replace(inner.view());
    }

    fn begin_query(&self) -> (u64, OrderListQuery) {
        let mut inner = self.lock();
        inner.issued += 1;
        inner.loading = true;
        self.publish(&inner);
        (inner.issued, inner.state.to_query())
    }

    fn finish_query(
        &self,
        seq: u64,
        result: RepositoryResult<OrderPage>,
        may_clamp: bool,
    ) -> Step {
        let mut inner = self.lock();
        if inner.issued != seq {
            log::debug!(
                "Dropping response to order query #{seq}; #{} is newer",
                inner.issued
            );
            return Step::Done(Ok(RefreshOutcome::Superseded));
        }

        match result {
            Ok(page) => {
                inner.state.record_total(page.total_count);
                if inner.state.clamp_page() && may_clamp {
                    log::debug!(
                        "Page out of range after query #{seq}, moving to page {}",
                        inner.state.page
                    );
                    return Step::Retry;
                }
                inner.orders = page.orders;
                inner.applied = inner.state.clone();
                inner.loading = false;
                self.publish(&inner);
                Step::Done(Ok(RefreshOutcome::Applied))
            }
            Err(err) => {
                log::error!("Failed to list orders: {err}");
                inner.state = inner.applied.clone();
                inner.loading = false;
                self.publish(&inner);
                Step::Done(Err(ServiceError::from(err)))
            }
        }
    }

    /// Refuses actions the displayed row does not offer.
    fn ensure_offered(&self, id: &OrderId, action: OrderAction) -> ServiceResult<()> {
        let inner = self.lock();
        match inner.orders.iter().find(|order| &order.id == id) {
            Some(order) if !order.status.allows(action) => Err(ServiceError::ActionNotAvailable(
                format!("cannot {action} order {id} in status {}", order.status),
            )),
            _ => Ok(()),
        }
    }
}
