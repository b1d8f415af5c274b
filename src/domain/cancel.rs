use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::errors::DomainError;

/// Shared flag raised when the caller that started a write has gone away.
///
/// Repositories check it as the last step before committing, so a request
/// dropped mid-flight leaves nothing behind.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the flag is raised.
    pub fn check(&self) -> Result<(), DomainError> {
        if self.is_cancelled() {
            Err(DomainError::Cancelled)
        } else {
            Ok(())
        }
    }
}
