use uuid::Uuid;

use super::cancel::Cancellation;
use super::errors::DomainError;
use super::order::{NewOrder, OrderDetail, OrderStatus, OrderSummary};

/// Persistence for orders and their line items.
///
/// Every method is scoped to `user_id`; implementations must apply the
/// ownership check inside the query itself.
pub trait OrderRepository: Send + Sync + 'static {
    /// Persist the header and all items atomically, returning the new order id.
    ///
    /// Nothing is committed if `cancel` is raised before the write finishes.
    fn create(
        &self,
        user_id: Uuid,
        order: NewOrder,
        cancel: &Cancellation,
    ) -> Result<Uuid, DomainError>;

    /// Orders owned by `user_id`, newest first.
    fn list(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderSummary>, DomainError>;

    /// Raw `(status, count)` pairs for the user's orders.
    fn count_by_status(&self, user_id: Uuid) -> Result<Vec<(String, i64)>, DomainError>;

    fn find_by_id(&self, user_id: Uuid, order_id: Uuid) -> Result<Option<OrderDetail>, DomainError>;

    /// Move the order from `from` to `to` in a single conditional write.
    ///
    /// Fails with `NotFound` when the order is missing or owned by someone
    /// else, and with `InvalidTransition` when its current status is not `from`.
    /// A raised `cancel` rolls the update back.
    fn transition(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        cancel: &Cancellation,
    ) -> Result<(), DomainError>;
}

/// Maps a session token to the internal user id.
pub trait IdentityResolver: Send + Sync + 'static {
    fn resolve(&self, session_token: Option<&str>) -> Result<Uuid, DomainError>;
}
