//! In-process implementations of the ports, used by unit and handler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::cancel::Cancellation;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    NewOrder, OrderDetail, OrderItemInput, OrderItemView, OrderStatus, OrderSummary,
};
use crate::domain::ports::{IdentityResolver, OrderRepository};

#[derive(Debug, Clone)]
struct StoredOrder {
    id: Uuid,
    user_id: Uuid,
    status: String,
    order: NewOrder,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Orders kept in insertion order behind one lock; every operation is
/// atomic with respect to every other.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<Mutex<Vec<StoredOrder>>>,
}

impl InMemoryOrderRepository {
    pub fn order_count(&self) -> usize {
        self.orders.lock().map(|orders| orders.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StoredOrder>>, DomainError> {
        self.orders
            .lock()
            .map_err(|_| DomainError::Internal("order store lock poisoned".to_string()))
    }
}

fn item_view(item: &OrderItemInput) -> OrderItemView {
    OrderItemView {
        product_id: item.product_id,
        model_id: item.model_id,
        quantity: item.quantity,
        unit_price: item.unit_price.clone(),
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(
        &self,
        user_id: Uuid,
        order: NewOrder,
        cancel: &Cancellation,
    ) -> Result<Uuid, DomainError> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut orders = self.lock()?;
        cancel.check()?;
        orders.push(StoredOrder {
            id,
            user_id,
            status: OrderStatus::Pending.to_string(),
            order,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    fn list(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderSummary>, DomainError> {
        let orders = self.lock()?;
        Ok(orders
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .filter(|o| status.map_or(true, |s| o.status == s.as_str()))
            .map(|o| OrderSummary {
                id: o.id,
                status: o.status.clone(),
                total_price: o.order.total_price.clone(),
                address: o.order.address.clone(),
                created_at: o.created_at,
                updated_at: o.updated_at,
                item_count: o.order.items.len() as i64,
            })
            .collect())
    }

    fn count_by_status(&self, user_id: Uuid) -> Result<Vec<(String, i64)>, DomainError> {
        let orders = self.lock()?;
        let mut counts: HashMap<String, i64> = HashMap::new();
        for o in orders.iter().filter(|o| o.user_id == user_id) {
            *counts.entry(o.status.clone()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    fn find_by_id(&self, user_id: Uuid, order_id: Uuid) -> Result<Option<OrderDetail>, DomainError> {
        let orders = self.lock()?;
        Ok(orders
            .iter()
            .find(|o| o.id == order_id && o.user_id == user_id)
            .map(|o| OrderDetail {
                id: o.id,
                status: o.status.clone(),
                total_price: o.order.total_price.clone(),
                address: o.order.address.clone(),
                created_at: o.created_at,
                updated_at: o.updated_at,
                items: o.order.items.iter().map(item_view).collect(),
            }))
    }

    fn transition(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        cancel: &Cancellation,
    ) -> Result<(), DomainError> {
        let mut orders = self.lock()?;
        let order = orders
            .iter_mut()
            .find(|o| o.id == order_id && o.user_id == user_id)
            .ok_or(DomainError::NotFound)?;
        if order.status != from.as_str() {
            return Err(DomainError::InvalidTransition {
                from: order.status.clone(),
                to,
            });
        }
        cancel.check()?;
        order.status = to.to_string();
        order.updated_at = Utc::now();
        Ok(())
    }
}

/// Session tokens and usernames held in maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityResolver {
    sessions: HashMap<String, String>,
    users: HashMap<String, Uuid>,
}

impl InMemoryIdentityResolver {
    /// Register a user with an active session, returning the user id.
    pub fn with_session(mut self, token: &str, username: &str) -> (Self, Uuid) {
        let user_id = *self
            .users
            .entry(username.to_string())
            .or_insert_with(Uuid::new_v4);
        self.sessions
            .insert(token.to_string(), username.to_string());
        (self, user_id)
    }

    /// Register a session whose username has no user record.
    pub fn with_orphan_session(mut self, token: &str, username: &str) -> Self {
        self.sessions
            .insert(token.to_string(), username.to_string());
        self
    }
}

impl IdentityResolver for InMemoryIdentityResolver {
    fn resolve(&self, session_token: Option<&str>) -> Result<Uuid, DomainError> {
        let username = session_token
            .and_then(|token| self.sessions.get(token))
            .ok_or(DomainError::Unauthenticated)?;
        self.users
            .get(username)
            .copied()
            .ok_or(DomainError::UnknownUser)
    }
}
