use tokio::sync::watch;

/// Single-shot flag that releases every waiter once it is resolved
#[derive(Debug)]
pub struct Readiness {
    tx: watch::Sender<bool>,
}

impl Readiness {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Resolve the signal. Returns `false` if it was already resolved.
    pub fn resolve(&self) -> bool {
        !self.tx.send_replace(true)
    }

    pub fn is_resolved(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the signal is resolved
    pub async fn wait(&self) {
        if self.is_resolved() {
            return;
        }

        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}
