use std::collections::BTreeMap;
use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::auth::CurrentUser;
use super::CancelOnDrop;
use crate::application::order_service::OrderService;
use crate::domain::order::{
    NewOrder, OrderDetail, OrderItemInput, OrderStatus, OrderSummary, StatusCounts,
};
use crate::errors::AppError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderItemRequest {
    pub product_id: i32,
    pub model_id: i32,
    pub quantity: i32,
    /// Unit price at checkout time.
    pub price: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<CreateOrderItemRequest>,
    pub address: String,
    /// Declared order total; stored as given.
    pub total: f64,
}

impl CreateOrderRequest {
    fn into_new_order(self) -> Result<NewOrder, AppError> {
        let items = self
            .items
            .into_iter()
            .map(|item| {
                Ok(OrderItemInput {
                    product_id: item.product_id,
                    model_id: item.model_id,
                    quantity: item.quantity,
                    unit_price: decimal_from_f64(item.price, "price")?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(NewOrder {
            items,
            address: self.address,
            total_price: decimal_from_f64(self.total, "total")?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummaryResponse {
    pub id: Uuid,
    pub status: String,
    pub total_price: f64,
    pub address: String,
    pub created_at: String,
    pub updated_at: String,
    pub item_count: i64,
}

impl From<OrderSummary> for OrderSummaryResponse {
    fn from(o: OrderSummary) -> Self {
        Self {
            id: o.id,
            status: o.status,
            total_price: decimal_to_f64(&o.total_price),
            address: o.address,
            created_at: format_timestamp(&o.created_at),
            updated_at: format_timestamp(&o.updated_at),
            item_count: o.item_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: i32,
    pub model_id: i32,
    pub quantity: i32,
    pub price: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    pub id: Uuid,
    pub status: String,
    pub total_price: f64,
    pub address: String,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderDetail> for OrderDetailResponse {
    fn from(o: OrderDetail) -> Self {
        Self {
            id: o.id,
            status: o.status,
            total_price: decimal_to_f64(&o.total_price),
            address: o.address,
            created_at: format_timestamp(&o.created_at),
            updated_at: format_timestamp(&o.updated_at),
            items: o
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    product_id: i.product_id,
                    model_id: i.model_id,
                    quantity: i.quantity,
                    price: decimal_to_f64(&i.unit_price),
                })
                .collect(),
        }
    }
}

/// All five statuses, plus any unrecognised value found in storage.
#[derive(Debug, Serialize)]
pub struct StatusCountsResponse {
    pub pending: i64,
    pub toship: i64,
    pub toreceive: i64,
    pub toreview: i64,
    pub refund: i64,
    #[serde(flatten)]
    pub other: BTreeMap<String, i64>,
}

impl From<StatusCounts> for StatusCountsResponse {
    fn from(c: StatusCounts) -> Self {
        Self {
            pending: c.pending,
            toship: c.to_ship,
            toreceive: c.to_receive,
            toreview: c.to_review,
            refund: c.refund,
            other: c.other,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    /// Only return orders in this status.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderDetailParams {
    pub id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PayOrderRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn decimal_from_f64(value: f64, field: &str) -> Result<BigDecimal, AppError> {
    if !value.is_finite() {
        return Err(AppError::BadRequest(format!("{field} must be a finite number")));
    }
    // Display gives the shortest representation that round-trips, which
    // avoids carrying binary noise like 9.9900000000000002 into NUMERIC.
    BigDecimal::from_str(&value.to_string())
        .map_err(|e| AppError::BadRequest(format!("invalid {field}: {e}")))
}

fn decimal_to_f64(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or_else(|| {
        log::warn!("amount {value} has no f64 representation, rendering as 0");
        0.0
    })
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/order/counts
///
/// Number of the caller's orders in each status, zero-filled.
#[utoipa::path(
    get,
    path = "/api/order/counts",
    responses(
        (status = 200, description = "Order counts keyed by status"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn order_counts(
    user: CurrentUser,
    service: web::Data<OrderService>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let counts = web::block(move || service.count_by_status(user.0)).await??;

    Ok(HttpResponse::Ok().json(StatusCountsResponse::from(counts)))
}

/// GET /api/order/list
///
/// The caller's orders, newest first, optionally restricted to one status.
/// An unrecognised status matches nothing.
#[utoipa::path(
    get,
    path = "/api/order/list",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Orders of the current user", body = Vec<OrderSummaryResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    user: CurrentUser,
    service: web::Data<OrderService>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let status = match query.into_inner().status.filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<OrderStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                log::debug!("list filter '{raw}' is not a known status");
                return Ok(HttpResponse::Ok().json(Vec::<OrderSummaryResponse>::new()));
            }
        },
    };

    let service = service.into_inner();
    let orders = web::block(move || service.list_orders(user.0, status)).await??;

    let body: Vec<OrderSummaryResponse> = orders.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/order/create
///
/// Creates a pending order together with its line items. The header and all
/// items are written in a single transaction, which is rolled back if the
/// client disconnects before it commits.
#[utoipa::path(
    post,
    path = "/api/order/create",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Malformed or invalid order"),
        (status = 401, description = "Not authenticated"),
        (status = 408, description = "Client went away before the order was committed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    user: CurrentUser,
    service: web::Data<OrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order = body.into_inner().into_new_order()?;

    let service = service.into_inner();
    let guard = CancelOnDrop::new();
    let cancel = guard.token();
    let order_id = web::block(move || service.create_order(user.0, order, &cancel)).await??;
    guard.disarm();

    Ok(HttpResponse::Ok().json(CreateOrderResponse {
        success: true,
        order_id,
    }))
}

/// GET /api/order/detail
///
/// Returns the order header together with its line items.
#[utoipa::path(
    get,
    path = "/api/order/detail",
    params(OrderDetailParams),
    responses(
        (status = 200, description = "Order found", body = OrderDetailResponse),
        (status = 400, description = "Missing or malformed order id"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    user: CurrentUser,
    service: web::Data<OrderService>,
    query: web::Query<OrderDetailParams>,
) -> Result<HttpResponse, AppError> {
    let order_id = query.into_inner().id;

    let service = service.into_inner();
    let order = web::block(move || service.get_order(user.0, order_id)).await??;

    Ok(HttpResponse::Ok().json(OrderDetailResponse::from(order)))
}

/// POST /api/order/pay
///
/// Simulated payment: moves a pending order to `toship`.
#[utoipa::path(
    post,
    path = "/api/order/pay",
    request_body = PayOrderRequest,
    responses(
        (status = 200, description = "Order paid", body = MessageResponse),
        (status = 400, description = "Malformed body or order is not pending"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Order not found"),
        (status = 408, description = "Client went away before the payment was committed"),
    ),
    tag = "orders"
)]
pub async fn pay_order(
    user: CurrentUser,
    service: web::Data<OrderService>,
    body: web::Json<PayOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = body.into_inner().order_id;

    let service = service.into_inner();
    let guard = CancelOnDrop::new();
    let cancel = guard.token();
    web::block(move || service.pay(user.0, order_id, &cancel)).await??;
    guard.disarm();

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "ok".to_string(),
    }))
}
