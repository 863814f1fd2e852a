use serde::Deserialize;
use validator::Validate;

use crate::domain::order::OrderStatus;
use crate::domain::types::{CancellationReason, OrderId};
use crate::forms::FormError;

/// Value of the status dropdown that clears the filter.
pub const ALL_STATUSES: &str = "";

#[derive(Debug, Default, Deserialize, Validate)]
/// Filter inputs from the list header: search box and status dropdown.
pub struct OrderFilterForm {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub search: String,
    /// Status name, or empty/`all` for every status.
    #[serde(default)]
    pub status: String,
}

/// Filter values after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFilterPayload {
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
}

impl TryFrom<OrderFilterForm> for OrderFilterPayload {
    type Error = FormError;

    fn try_from(form: OrderFilterForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let search = Some(form.search.trim().to_string()).filter(|s| !s.is_empty());
        let status = parse_status_filter(&form.status)?;

        Ok(Self { search, status })
    }
}

/// Parses a dropdown value; empty and `all` mean no filter.
pub fn parse_status_filter(raw: &str) -> Result<Option<OrderStatus>, FormError> {
    let raw = raw.trim();
    if raw == ALL_STATUSES || raw.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    raw.parse::<OrderStatus>()
        .map(Some)
        .map_err(|_| FormError::InvalidStatus(raw.to_string()))
}

#[derive(Debug, Deserialize, Validate)]
/// Reason typed into the cancellation prompt.
pub struct CancelOrderForm {
    #[validate(length(max = 500))]
    pub reason: String,
}

/// Validated cancellation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOrderPayload {
    pub reason: CancellationReason,
}

impl TryFrom<CancelOrderForm> for CancelOrderPayload {
    type Error = FormError;

    fn try_from(form: CancelOrderForm) -> Result<Self, Self::Error> {
        if form.reason.trim().is_empty() {
            return Err(FormError::EmptyReason);
        }
        form.validate()?;

        let reason = CancellationReason::new(form.reason).map_err(|_| FormError::EmptyReason)?;
        Ok(Self { reason })
    }
}

#[derive(Debug, Deserialize)]
/// Row action target as typed or clicked by the user.
pub struct OrderActionForm {
    pub id: String,
}

impl TryFrom<OrderActionForm> for OrderId {
    type Error = FormError;

    fn try_from(form: OrderActionForm) -> Result<Self, Self::Error> {
        OrderId::new(form.id.trim_start_matches('#')).map_err(|_| FormError::InvalidOrderId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_mean_no_filter() {
        let payload = OrderFilterPayload::try_from(OrderFilterForm {
            search: "   ".to_string(),
            status: ALL_STATUSES.to_string(),
        })
        .unwrap();

        assert_eq!(
            payload,
            OrderFilterPayload {
                search: None,
                status: None
            }
        );
    }

    #[test]
    fn status_filter_accepts_names_and_all() {
        assert_eq!(parse_status_filter("Shipped").unwrap(), Some(OrderStatus::Shipped));
        assert_eq!(parse_status_filter("ALL").unwrap(), None);
        assert!(matches!(
            parse_status_filter("Lost"),
            Err(FormError::InvalidStatus(_))
        ));
    }

    #[test]
    fn overlong_search_is_rejected() {
        let form = OrderFilterForm {
            search: "x".repeat(201),
            status: String::new(),
        };

        assert!(matches!(
            OrderFilterPayload::try_from(form),
            Err(FormError::Validation(_))
        ));
    }

    #[test]
    fn cancel_reason_is_required() {
        let form = CancelOrderForm {
            reason: " \t ".to_string(),
        };
        assert!(matches!(
            CancelOrderPayload::try_from(form),
            Err(FormError::EmptyReason)
        ));

        let payload = CancelOrderPayload::try_from(CancelOrderForm {
            reason: " damaged in transit ".to_string(),
        })
        .unwrap();
        assert_eq!(payload.reason.as_str(), "damaged in transit");
    }

    #[test]
    fn overlong_reason_fails_validation() {
        let form = CancelOrderForm {
            reason: "x".repeat(501),
        };
        assert!(matches!(
            CancelOrderPayload::try_from(form),
            Err(FormError::Validation(_))
        ));
    }

    #[test]
    fn action_form_strips_hash_prefix() {
        let id = OrderId::try_from(OrderActionForm {
            id: "#abc123".to_string(),
        })
        .unwrap();
        assert_eq!(id.as_str(), "abc123");
    }
}
