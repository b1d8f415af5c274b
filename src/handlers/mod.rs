pub mod auth;
pub mod health;
pub mod orders;

use actix_web::web;

use crate::domain::cancel::Cancellation;
use crate::errors::AppError;

/// Malformed JSON bodies become 400s with a JSON `error` field.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(format!("invalid request body: {err}")).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(format!("invalid query string: {err}")).into())
}

/// Raises its token when dropped while still armed.
///
/// actix drops a handler future when the client disconnects, but work already
/// handed to `web::block` keeps running. Holding this guard across the
/// `.await` lets that work see the disconnect and roll back instead of
/// committing.
pub(crate) struct CancelOnDrop {
    token: Cancellation,
    armed: bool,
}

impl CancelOnDrop {
    pub(crate) fn new() -> Self {
        Self {
            token: Cancellation::new(),
            armed: true,
        }
    }

    pub(crate) fn token(&self) -> Cancellation {
        self.token.clone()
    }

    /// The handler finished; dropping no longer cancels.
    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            log::debug!("request dropped before completion, cancelling pending write");
            self.token.cancel();
        }
    }
}
