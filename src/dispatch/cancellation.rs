use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Advisory cancellation flag shared between a request and its plugin calls.
///
/// Nothing is interrupted when the flag is set; features check it before
/// delegating to a plugin and plugins may check it while they work.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
