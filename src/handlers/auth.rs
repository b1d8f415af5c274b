use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use crate::domain::ports::IdentityResolver;
use crate::errors::AppError;

pub const SESSION_COOKIE: &str = "session";

/// The user id behind the request's session.
///
/// Extracting it runs the identity resolver; handlers that take a
/// `CurrentUser` reject unauthenticated requests with 401 before any order
/// work happens.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

/// Session token from `Authorization: Bearer <token>`, else the session cookie.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    bearer.or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()))
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = session_token(req);
        let resolver = req.app_data::<web::Data<dyn IdentityResolver>>().cloned();

        Box::pin(async move {
            let resolver = resolver.ok_or_else(|| {
                AppError::Internal("identity resolver is not registered".to_string())
            })?;
            let user_id = web::block(move || resolver.resolve(token.as_deref())).await??;
            Ok(CurrentUser(user_id))
        })
    }
}
