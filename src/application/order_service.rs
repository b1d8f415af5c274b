use std::sync::Arc;

use uuid::Uuid;

use crate::domain::cancel::Cancellation;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, OrderDetail, OrderStatus, OrderSummary, StatusCounts};
use crate::domain::ports::OrderRepository;

#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(repo: impl OrderRepository) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }

    /// Validates and persists a new order. Raising `cancel` before the
    /// repository commits discards the whole write.
    pub fn create_order(
        &self,
        user_id: Uuid,
        order: NewOrder,
        cancel: &Cancellation,
    ) -> Result<Uuid, DomainError> {
        order.validate()?;
        let item_count = order.items.len();
        let order_id = self
            .repo
            .create(user_id, order, cancel)
            .inspect_err(|e| {
                if let DomainError::Cancelled = e {
                    log::warn!("order for user {user_id} rolled back: {e}");
                }
            })?;
        log::info!("order {order_id} created for user {user_id} with {item_count} item(s)");
        Ok(order_id)
    }

    pub fn list_orders(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderSummary>, DomainError> {
        self.repo.list(user_id, status)
    }

    pub fn count_by_status(&self, user_id: Uuid) -> Result<StatusCounts, DomainError> {
        let rows = self.repo.count_by_status(user_id)?;
        Ok(StatusCounts::from_rows(rows))
    }

    pub fn get_order(&self, user_id: Uuid, order_id: Uuid) -> Result<OrderDetail, DomainError> {
        self.repo
            .find_by_id(user_id, order_id)?
            .ok_or(DomainError::NotFound)
    }

    /// Simulated payment: `pending -> toship`.
    pub fn pay(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        cancel: &Cancellation,
    ) -> Result<(), DomainError> {
        self.transition(
            user_id,
            order_id,
            OrderStatus::Pending,
            OrderStatus::ToShip,
            cancel,
        )?;
        log::info!("order {order_id} paid by user {user_id}");
        Ok(())
    }

    fn transition(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        cancel: &Cancellation,
    ) -> Result<(), DomainError> {
        if !from.can_transition_to(to) {
            return Err(DomainError::InvalidTransition {
                from: from.to_string(),
                to,
            });
        }
        self.repo
            .transition(user_id, order_id, from, to, cancel)
            .inspect_err(|e| {
                if let DomainError::InvalidTransition { .. } | DomainError::Cancelled = e {
                    log::warn!("order {order_id}: {e}");
                }
            })
    }
}
