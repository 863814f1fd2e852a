use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CurrencyCode, CustomerName, OrderId, TypeConstraintError};

/// Read-only projection of an order as shown in the list view.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: CustomerName,
    pub total_amount: Decimal,
    pub currency: CurrencyCode,
    pub status: OrderStatus,
    pub order_date: NaiveDateTime,
}

impl Order {
    /// Builds an order from raw values, validating each field.
    pub fn try_new(
        id: impl Into<String>,
        customer_name: impl Into<String>,
        total_amount: Decimal,
        currency: impl Into<String>,
        status: OrderStatus,
        order_date: NaiveDateTime,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            id: OrderId::new(id)?,
            customer_name: CustomerName::new(customer_name)?,
            total_amount,
            currency: CurrencyCode::new(currency)?,
            status,
            order_date,
        })
    }

    pub fn can_ship(&self) -> bool {
        self.status.allows(OrderAction::Ship)
    }

    pub fn can_cancel(&self) -> bool {
        self.status.allows(OrderAction::Cancel)
    }
}

/// Lifecycle status of an order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Draft,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

/// Row-level actions the list view can offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderAction {
    Ship,
    Cancel,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Draft,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// CSS class used for statuses the view does not recognise.
    pub const FALLBACK_CLASS: &'static str = "bg-gray-100 text-gray-800";

    pub const fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Draft => "Draft",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Badge classes for the status column.
    pub const fn css_class(self) -> &'static str {
        match self {
            OrderStatus::Draft => Self::FALLBACK_CLASS,
            OrderStatus::Confirmed => "bg-blue-100 text-blue-800",
            OrderStatus::Shipped => "bg-yellow-100 text-yellow-800",
            OrderStatus::Delivered => "bg-green-100 text-green-800",
            OrderStatus::Cancelled => "bg-red-100 text-red-800",
        }
    }

    /// Maps a raw status string to its badge classes, falling back for unknown values.
    pub fn css_class_for(raw: &str) -> &'static str {
        raw.parse::<OrderStatus>()
            .map(OrderStatus::css_class)
            .unwrap_or(Self::FALLBACK_CLASS)
    }

    /// Whether the given action may be initiated from this status.
    pub const fn allows(self, action: OrderAction) -> bool {
        matches!(
            (self, action),
            (OrderStatus::Confirmed, OrderAction::Ship)
                | (
                    OrderStatus::Draft | OrderStatus::Confirmed | OrderStatus::Shipped,
                    OrderAction::Cancel
                )
        )
    }

    /// Status reached by applying `action`, or `None` when the transition is not allowed.
    pub const fn apply(self, action: OrderAction) -> Option<OrderStatus> {
        if !self.allows(action) {
            return None;
        }
        match action {
            OrderAction::Ship => Some(OrderStatus::Shipped),
            OrderAction::Cancel => Some(OrderStatus::Cancelled),
        }
    }

    /// Delivered and cancelled orders offer no further actions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown status `{trimmed}`")))
    }
}

impl Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderAction::Ship => write!(f, "ship"),
            OrderAction::Cancel => write!(f, "cancel"),
        }
    }
}
