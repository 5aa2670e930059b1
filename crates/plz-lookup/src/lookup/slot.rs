use tokio::task::JoinHandle;

/// Identifies one request issued through a [`RequestSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Holds at most one in-flight request for a lookup direction.
///
/// Every `begin` and `cancel` advances the generation, so a request that
/// outlives its ticket can tell it was superseded even if the abort did not
/// land before it completed.
#[derive(Debug, Default)]
pub struct RequestSlot {
    generation: u64,
    active: Option<JoinHandle<()>>,
}

impl RequestSlot {
    /// Cancels whatever occupies the slot and hands out a fresh ticket.
    pub fn begin(&mut self) -> Ticket {
        self.cancel();
        Ticket(self.generation)
    }

    /// Stores the task serving `ticket`; a stale ticket's task is aborted.
    pub fn attach(&mut self, ticket: Ticket, handle: JoinHandle<()>) {
        if self.is_current(ticket) {
            self.active = Some(handle);
        } else {
            handle.abort();
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// Releases the slot if `ticket` still owns it. A `false` return means the
    /// result belongs to a superseded request and must be dropped.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.active = None;
        self.generation += 1;
        true
    }

    /// Returns whether a request was in flight.
    pub fn cancel(&mut self) -> bool {
        self.generation += 1;
        match self.active.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for RequestSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}
