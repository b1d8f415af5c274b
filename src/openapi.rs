use utoipa::OpenApi;

use crate::handlers::{health, orders};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::ping,
        orders::order_counts,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::pay_order,
    ),
    components(schemas(
        orders::CreateOrderRequest,
        orders::CreateOrderItemRequest,
        orders::CreateOrderResponse,
        orders::OrderSummaryResponse,
        orders::OrderDetailResponse,
        orders::OrderItemResponse,
        orders::PayOrderRequest,
        orders::MessageResponse,
    )),
    tags(
        (name = "orders", description = "Order creation, queries and payment"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_order_endpoint() {
        let doc = ApiDoc::openapi();
        for path in [
            "/ping",
            "/api/order/counts",
            "/api/order/list",
            "/api/order/create",
            "/api/order/detail",
            "/api/order/pay",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
