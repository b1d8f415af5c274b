use thiserror::Error;

use super::order::OrderStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error("unknown user")]
    UnknownUser,
    #[error("Order not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("order in status '{from}' cannot move to '{to}'")]
    InvalidTransition { from: String, to: OrderStatus },
    #[error("request cancelled before commit")]
    Cancelled,
    #[error("Internal error: {0}")]
    Internal(String),
}
