//! Cooperative cancellation for long-running operations

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Cancellation handle honored between post-condition polling ticks
///
/// An in-flight publish or signature computation is never interrupted;
/// cancelling before the transaction was published aborts with no on-chain
/// effect, cancelling afterwards may still end in a confirmed transaction.
#[derive(Clone, Debug, Default)]
pub struct Cancel {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancel {
    pub fn new() -> Self {
        Default::default()
    }

    /// A handle that additionally trips once the wall clock passes
    /// `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self { flag: Arc::default(), deadline: Some(deadline) }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        if self.flag.load(Ordering::SeqCst) {
            return true;
        }
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }
}
