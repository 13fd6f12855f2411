//! One-shot interrupt notification from the UI to the feed owner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Write-once cancellation signal shared between the view and the producer.
///
/// Clones share state. Only the first `signal` call is observed; later calls
/// return `false` and change nothing. Signalling never blocks, whether or not
/// anyone is listening.
#[derive(Debug, Clone, Default)]
pub struct InterruptSignal {
    token: CancellationToken,
    fired: Arc<AtomicBool>,
}

impl InterruptSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal. Returns `true` only for the call that fired it.
    pub fn signal(&self) -> bool {
        let first = !self.fired.swap(true, Ordering::SeqCst);
        if first {
            tracing::debug!("interrupt signalled");
            self.token.cancel();
        }
        first
    }

    pub fn is_signaled(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Resolves once the signal has fired.
    pub async fn signaled(&self) {
        self.token.cancelled().await;
    }

    /// Cancellation token to hand to an upstream subscription.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}
