use std::time::Duration;

use tokio::task::JoinHandle;

/// Handed to a scheduled action so it can check it was not replaced while it
/// waited for the lock its owner lives behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Armed(u64);

/// Trailing-edge delayed action. Scheduling again before the delay elapses
/// replaces the pending action; dropping the debouncer aborts it.
#[derive(Debug, Default)]
pub struct Debouncer {
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, delay: Duration, action: F)
    where
        F: FnOnce(Armed) + Send + 'static,
    {
        self.cancel();
        let armed = Armed(self.generation);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action(armed);
        }));
    }

    /// Returns whether an action was still waiting.
    pub fn cancel(&mut self) -> bool {
        self.generation += 1;
        match self.pending.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Called by the action once it runs. Returns `false` when the action was
    /// replaced or cancelled in the meantime and must not proceed.
    pub fn complete(&mut self, armed: Armed) -> bool {
        if armed.0 != self.generation {
            return false;
        }
        self.pending = None;
        self.generation += 1;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
