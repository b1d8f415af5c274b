use std::collections::HashMap;

use diesel::dsl::{count_star, now};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cancel::Cancellation;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, OrderDetail, OrderItemView, OrderStatus, OrderSummary};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, orders};

use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(
        &self,
        user_id: Uuid,
        order: NewOrder,
        cancel: &Cancellation,
    ) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order header
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id,
                    status: OrderStatus::Pending.as_str(),
                    total_price: &order.total_price,
                    address: &order.address,
                })
                .execute(conn)?;

            // 2. One row per line item; any failure rolls back the header too
            for item in &order.items {
                diesel::insert_into(order_items::table)
                    .values(&NewOrderItemRow {
                        order_id,
                        product_id: item.product_id,
                        model_id: item.model_id,
                        quantity: item.quantity,
                        price: &item.unit_price,
                    })
                    .execute(conn)?;
            }

            // 3. Last chance to abandon the write before COMMIT
            cancel.check()?;

            Ok(order_id)
        })
    }

    fn list(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderSummary>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, DomainError, _>(|conn| {
                let mut query = orders::table
                    .filter(orders::user_id.eq(user_id))
                    .select(OrderRow::as_select())
                    .into_boxed();
                if let Some(status) = status {
                    query = query.filter(orders::status.eq(status.as_str()));
                }
                let rows: Vec<OrderRow> = query.order(orders::created_at.desc()).load(conn)?;

                let ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
                let item_counts: HashMap<Uuid, i64> = order_items::table
                    .filter(order_items::order_id.eq_any(&ids))
                    .group_by(order_items::order_id)
                    .select((order_items::order_id, count_star()))
                    .load::<(Uuid, i64)>(conn)?
                    .into_iter()
                    .collect();

                Ok(rows
                    .into_iter()
                    .map(|o| OrderSummary {
                        item_count: item_counts.get(&o.id).copied().unwrap_or(0),
                        id: o.id,
                        status: o.status,
                        total_price: o.total_price,
                        address: o.address,
                        created_at: o.created_at,
                        updated_at: o.updated_at,
                    })
                    .collect())
            })
    }

    fn count_by_status(&self, user_id: Uuid) -> Result<Vec<(String, i64)>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .group_by(orders::status)
            .select((orders::status, count_star()))
            .load::<(String, i64)>(&mut conn)?;
        Ok(rows)
    }

    fn find_by_id(&self, user_id: Uuid, order_id: Uuid) -> Result<Option<OrderDetail>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, DomainError, _>(|conn| {
                let order: Option<OrderRow> = orders::table
                    .filter(orders::id.eq(order_id))
                    .filter(orders::user_id.eq(user_id))
                    .select(OrderRow::as_select())
                    .first(conn)
                    .optional()?;

                let Some(order) = order else {
                    return Ok(None);
                };

                let items: Vec<OrderItemRow> = OrderItemRow::belonging_to(&order)
                    .order(order_items::id.asc())
                    .select(OrderItemRow::as_select())
                    .load(conn)?;

                Ok(Some(OrderDetail {
                    id: order.id,
                    status: order.status,
                    total_price: order.total_price,
                    address: order.address,
                    created_at: order.created_at,
                    updated_at: order.updated_at,
                    items: items
                        .into_iter()
                        .map(|i| OrderItemView {
                            product_id: i.product_id,
                            model_id: i.model_id,
                            quantity: i.quantity,
                            unit_price: i.price,
                        })
                        .collect(),
                }))
            })
    }

    fn transition(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        cancel: &Cancellation,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // The status guard lives in the WHERE clause, so concurrent callers
            // serialize on the row lock and only one of them matches.
            let updated = diesel::update(
                orders::table
                    .filter(orders::id.eq(order_id))
                    .filter(orders::user_id.eq(user_id))
                    .filter(orders::status.eq(from.as_str())),
            )
            .set((orders::status.eq(to.as_str()), orders::updated_at.eq(now)))
            .execute(conn)?;

            if updated == 1 {
                return cancel.check();
            }

            let current = orders::table
                .filter(orders::id.eq(order_id))
                .filter(orders::user_id.eq(user_id))
                .select(orders::status)
                .first::<String>(conn)
                .optional()?;

            match current {
                None => Err(DomainError::NotFound),
                Some(status) => Err(DomainError::InvalidTransition { from: status, to }),
            }
        })
    }
}
