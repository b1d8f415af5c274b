use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

/// Lifecycle state of an order.
///
/// `Pending` is the only state an order is created in. The forward path is
/// `Pending -> ToShip -> ToReceive -> ToReview`; `Refund` is terminal and can
/// be entered from any other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderStatus {
    Pending,
    ToShip,
    ToReceive,
    ToReview,
    Refund,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::ToShip,
        OrderStatus::ToReceive,
        OrderStatus::ToReview,
        OrderStatus::Refund,
    ];

    /// Column value stored in `orders.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::ToShip => "toship",
            OrderStatus::ToReceive => "toreceive",
            OrderStatus::ToReview => "toreview",
            OrderStatus::Refund => "refund",
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, ToShip)
                | (ToShip, ToReceive)
                | (ToReceive, ToReview)
                | (Pending | ToShip | ToReceive | ToReview, Refund)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown order status '{s}'")))
    }
}

#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub product_id: i32,
    pub model_id: i32,
    pub quantity: i32,
    /// Price at checkout time; never re-read from the catalog.
    pub unit_price: BigDecimal,
}

/// A checkout request that has not been persisted yet.
///
/// `total_price` is taken as declared by the caller and is not recomputed
/// from the items.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub items: Vec<OrderItemInput>,
    pub address: String,
    pub total_price: BigDecimal,
}

impl NewOrder {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.items.is_empty() {
            return Err(DomainError::InvalidInput(
                "order must contain at least one item".to_string(),
            ));
        }
        if self.address.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "address must not be empty".to_string(),
            ));
        }
        check_amount(&self.total_price, "total")?;
        for (idx, item) in self.items.iter().enumerate() {
            if item.quantity <= 0 {
                return Err(DomainError::InvalidInput(format!(
                    "item {idx}: quantity must be positive"
                )));
            }
            check_amount(&item.unit_price, &format!("item {idx}: price"))?;
        }
        Ok(())
    }
}

/// Money columns are `NUMERIC(12,2)`.
const MAX_FRACTION_DIGITS: i64 = 2;
const MAX_INTEGER_DIGITS: u32 = 10;

fn check_amount(value: &BigDecimal, field: &str) -> Result<(), DomainError> {
    if *value < BigDecimal::zero() {
        return Err(DomainError::InvalidInput(format!(
            "{field} must not be negative"
        )));
    }
    if value.normalized().fractional_digit_count() > MAX_FRACTION_DIGITS {
        return Err(DomainError::InvalidInput(format!(
            "{field} must have at most {MAX_FRACTION_DIGITS} decimal places"
        )));
    }
    if *value >= BigDecimal::from(10_i64.pow(MAX_INTEGER_DIGITS)) {
        return Err(DomainError::InvalidInput(format!(
            "{field} must be less than 10^{MAX_INTEGER_DIGITS}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: Uuid,
    pub status: String,
    pub total_price: BigDecimal,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub item_count: i64,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub product_id: i32,
    pub model_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub id: Uuid,
    pub status: String,
    pub total_price: BigDecimal,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

/// Per-status order counts for one user.
///
/// The five known statuses are always present. Any other value found in the
/// status column is kept in `other` rather than dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: i64,
    pub to_ship: i64,
    pub to_receive: i64,
    pub to_review: i64,
    pub refund: i64,
    pub other: BTreeMap<String, i64>,
}

impl StatusCounts {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, i64)>,
    {
        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            match status.parse::<OrderStatus>() {
                Ok(OrderStatus::Pending) => counts.pending += count,
                Ok(OrderStatus::ToShip) => counts.to_ship += count,
                Ok(OrderStatus::ToReceive) => counts.to_receive += count,
                Ok(OrderStatus::ToReview) => counts.to_review += count,
                Ok(OrderStatus::Refund) => counts.refund += count,
                Err(_) => *counts.other.entry(status).or_default() += count,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, price: &str) -> OrderItemInput {
        OrderItemInput {
            product_id: 1,
            model_id: 1,
            quantity,
            unit_price: BigDecimal::from_str(price).expect("valid decimal"),
        }
    }

    fn order(items: Vec<OrderItemInput>, address: &str, total: &str) -> NewOrder {
        NewOrder {
            items,
            address: address.to_string(),
            total_price: BigDecimal::from_str(total).expect("valid decimal"),
        }
    }

    #[test]
    fn status_round_trips_through_column_value() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!("PENDING".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn forward_path_is_one_step_at_a_time() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(ToShip));
        assert!(ToShip.can_transition_to(ToReceive));
        assert!(ToReceive.can_transition_to(ToReview));

        assert!(!Pending.can_transition_to(ToReceive));
        assert!(!ToShip.can_transition_to(Pending));
        assert!(!ToReview.can_transition_to(ToReceive));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn refund_is_reachable_from_every_other_state_and_terminal() {
        for status in OrderStatus::ALL {
            if status == OrderStatus::Refund {
                continue;
            }
            assert!(status.can_transition_to(OrderStatus::Refund), "{status}");
            assert!(!OrderStatus::Refund.can_transition_to(status), "{status}");
        }
        assert!(!OrderStatus::Refund.can_transition_to(OrderStatus::Refund));
    }

    #[test]
    fn valid_order_passes() {
        let order = order(vec![item(2, "10.0"), item(1, "0")], "X", "20.0");
        assert!(order.validate().is_ok());
    }

    #[test]
    fn empty_items_rejected() {
        let err = order(vec![], "X", "0").validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn blank_address_rejected() {
        let err = order(vec![item(1, "1")], "   ", "1").validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.contains("address")));
    }

    #[test]
    fn non_positive_quantity_rejected() {
        let err = order(vec![item(1, "1"), item(0, "1")], "X", "1")
            .validate()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.starts_with("item 1")));
    }

    #[test]
    fn negative_amounts_rejected() {
        assert!(order(vec![item(1, "-1")], "X", "1").validate().is_err());
        assert!(order(vec![item(1, "1")], "X", "-0.01").validate().is_err());
    }

    #[test]
    fn sub_cent_amounts_rejected() {
        let err = order(vec![item(1, "0.005")], "X", "1").validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.starts_with("item 0: price")));
        assert!(order(vec![item(1, "1")], "X", "1.001").validate().is_err());
        // trailing zeros beyond the second place are not extra precision
        assert!(order(vec![item(1, "1.5000")], "X", "1.50").validate().is_ok());
    }

    #[test]
    fn amounts_past_column_precision_rejected() {
        let err = order(vec![item(1, "1")], "X", "10000000000")
            .validate()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.starts_with("total")));
        assert!(order(vec![item(1, "1e10")], "X", "1").validate().is_err());
        assert!(order(vec![item(1, "9999999999.99")], "X", "9999999999.99")
            .validate()
            .is_ok());
    }

    #[test]
    fn counts_are_zero_filled() {
        let counts = StatusCounts::from_rows(Vec::new());
        assert_eq!(counts, StatusCounts::default());
        assert!(counts.other.is_empty());
    }

    #[test]
    fn counts_keep_unrecognised_statuses() {
        let counts = StatusCounts::from_rows(vec![
            ("pending".to_string(), 2),
            ("toship".to_string(), 1),
            ("legacy".to_string(), 4),
        ]);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.to_ship, 1);
        assert_eq!(counts.refund, 0);
        assert_eq!(counts.other.get("legacy"), Some(&4));
    }
}
