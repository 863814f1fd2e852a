//! DTOs shaped for the order list and detail templates.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::domain::order::{Order, OrderStatus};
use crate::domain::types::CurrencyCode;
use crate::forms::orders::ALL_STATUSES;
use crate::pagination::PageControls;
use crate::services::orders::{OrderListView, order_detail_path};

/// One table row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OrderRow {
    pub id: String,
    pub short_id: String,
    pub customer_name: String,
    pub total: String,
    pub status: String,
    pub status_class: &'static str,
    pub order_date: String,
    pub can_ship: bool,
    pub can_cancel: bool,
    pub detail_path: String,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            short_id: format!("#{}", order.id.short()),
            customer_name: order.customer_name.to_string(),
            total: format_money(order.total_amount, &order.currency),
            status: order.status.to_string(),
            status_class: order.status.css_class(),
            order_date: format_short_date(&order.order_date),
            can_ship: order.can_ship(),
            can_cancel: order.can_cancel(),
            detail_path: order_detail_path(&order.id),
        }
    }
}

/// Entry of the status dropdown.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Dropdown entries: "All Statuses" followed by every status.
pub fn status_options(selected: Option<OrderStatus>) -> Vec<StatusOption> {
    std::iter::once(StatusOption {
        value: ALL_STATUSES,
        label: "All Statuses",
        selected: selected.is_none(),
    })
    .chain(OrderStatus::ALL.into_iter().map(|status| StatusOption {
        value: status.as_str(),
        label: status.as_str(),
        selected: selected == Some(status),
    }))
    .collect()
}

/// Data required to render the order list template.
#[derive(Debug, Clone, Serialize)]
pub struct OrderListPage {
    pub rows: Vec<OrderRow>,
    pub status_options: Vec<StatusOption>,
    pub search_query: Option<String>,
    pub loading: bool,
    pub empty: bool,
    pub pagination: PageControls,
    pub summary: String,
}

impl From<&OrderListView> for OrderListPage {
    fn from(view: &OrderListView) -> Self {
        let state = &view.state;
        let pagination = PageControls::new(
            state.page,
            state.page_size.get(),
            state.total_count,
            state.total_pages,
        );
        Self {
            rows: view.orders.iter().map(OrderRow::from).collect(),
            status_options: status_options(state.status),
            search_query: state.search.clone(),
            loading: view.loading,
            empty: view.is_empty(),
            summary: pagination.summary(),
            pagination,
        }
    }
}

/// Data required to render a single order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetailPage {
    pub row: OrderRow,
    pub currency: String,
    pub amount: String,
    pub order_date: String,
}

impl From<&Order> for OrderDetailPage {
    fn from(order: &Order) -> Self {
        Self {
            row: OrderRow::from(order),
            currency: order.currency.to_string(),
            amount: order.total_amount.to_string(),
            order_date: order.order_date.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Formats an amount the way the list shows totals, e.g. `$1,234.50`.
pub fn format_money(amount: Decimal, currency: &CurrencyCode) -> String {
    let digits = currency.minor_digits();
    let rounded = amount.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.*}", digits as usize, rounded.abs());

    let (whole, fraction) = match plain.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (plain.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    let sign = if negative { "-" } else { "" };
    match currency.symbol() {
        Some(symbol) => format!("{sign}{symbol}{grouped}"),
        None => format!("{sign}{currency} {grouped}"),
    }
}

/// Short date and time, e.g. `3/1/24, 9:30 AM`.
pub fn format_short_date(date: &NaiveDateTime) -> String {
    date.format("%-m/%-d/%y, %-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::services::orders::QueryState;

    fn order(id: &str, status: OrderStatus) -> Order {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(21, 5, 0)
            .unwrap();
        Order::try_new(
            id,
            "Grace Hopper",
            Decimal::new(123450, 2),
            "USD",
            status,
            date,
        )
        .unwrap()
    }

    #[test]
    fn row_exposes_actions_per_status() {
        let confirmed = OrderRow::from(&order("3f2b9c1e-0d4a-4c57", OrderStatus::Confirmed));
        assert_eq!(confirmed.short_id, "#3f2b9c1e");
        assert!(confirmed.can_ship);
        assert!(confirmed.can_cancel);
        assert_eq!(confirmed.status_class, "bg-blue-100 text-blue-800");
        assert_eq!(confirmed.detail_path, "/orders/3f2b9c1e-0d4a-4c57");

        let delivered = OrderRow::from(&order("abc", OrderStatus::Delivered));
        assert!(!delivered.can_ship);
        assert!(!delivered.can_cancel);
    }

    #[test]
    fn money_is_grouped_and_prefixed() {
        let usd = CurrencyCode::new("USD").unwrap();
        assert_eq!(format_money(Decimal::new(123450, 2), &usd), "$1,234.50");
        assert_eq!(format_money(Decimal::new(5, 0), &usd), "$5.00");
        assert_eq!(format_money(Decimal::new(-1000000, 0), &usd), "-$1,000,000.00");

        let jpy = CurrencyCode::new("JPY").unwrap();
        assert_eq!(format_money(Decimal::new(19999, 1), &jpy), "¥2,000");

        let chf = CurrencyCode::new("CHF").unwrap();
        assert_eq!(format_money(Decimal::new(995, 1), &chf), "CHF 99.50");
    }

    #[test]
    fn short_date_uses_twelve_hour_clock() {
        let row = OrderRow::from(&order("abc", OrderStatus::Draft));
        assert_eq!(row.order_date, "3/1/24, 9:05 PM");
    }

    #[test]
    fn dropdown_has_all_plus_five_statuses() {
        let options = status_options(Some(OrderStatus::Shipped));
        assert_eq!(options.len(), 6);
        assert_eq!(options[0].label, "All Statuses");
        assert!(!options[0].selected);
        let selected: Vec<_> = options.iter().filter(|o| o.selected).map(|o| o.value).collect();
        assert_eq!(selected, vec!["Shipped"]);
    }

    #[test]
    fn list_page_marks_empty_results() {
        let view = OrderListView {
            orders: Vec::new(),
            state: QueryState::default(),
            loading: false,
        };
        let page = OrderListPage::from(&view);
        assert!(page.empty);
        assert_eq!(page.summary, "Showing 0 to 0 of 0 results");
        assert!(status_options(None)[0].selected);
    }
}
