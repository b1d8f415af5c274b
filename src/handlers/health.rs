use actix_web::HttpResponse;

use super::orders::MessageResponse;

/// GET /ping
#[utoipa::path(
    get,
    path = "/ping",
    responses(
        (status = 200, description = "Service is up", body = MessageResponse),
    ),
    tag = "health"
)]
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse {
        message: "pong".to_string(),
    })
}
