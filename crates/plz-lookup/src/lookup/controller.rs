use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};

use super::debounce::{Armed, Debouncer};
use super::slot::{RequestSlot, Ticket};
use super::state::{LookupDirection, LookupErrorKind, LookupEvent, SearchState, SkipReason};
use crate::config::LookupConfig;
use crate::directory::{AddressDirectory, DirectoryError, LocalityQuery, LocalityRecord, Page};

/// Longest postal code the German directory knows.
const MAX_POSTAL_CODE_DIGITS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no postal code list is open")]
    DropdownClosed,
    #[error("'{0}' is not one of the offered postal codes")]
    UnknownCandidate(String),
}

/// Debounced, cancellable locality/postal code lookup for a two-field form.
///
/// Edits update the state immediately and arm a per-field debounce timer.
/// When the timer expires the controller issues one directory request for
/// that field, cancelling the field's previous request first. Results of
/// superseded requests never touch the state.
///
/// All operations must run inside a tokio runtime. Dropping the controller
/// disposes it.
pub struct AddressLookupController<D>
where
    D: AddressDirectory + 'static,
{
    shared: Arc<Shared<D>>,
}

struct Shared<D> {
    directory: D,
    settings: LookupConfig,
    inner: Mutex<Inner>,
    updates: watch::Sender<SearchState>,
}

#[derive(Default)]
struct Lane {
    debounce: Debouncer,
    slot: RequestSlot,
}

#[derive(Default)]
struct Inner {
    state: SearchState,
    page: Page,
    locality: Lane,
    postal_code: Lane,
    disposed: bool,
}

impl Inner {
    fn lane_mut(&mut self, direction: LookupDirection) -> &mut Lane {
        match direction {
            LookupDirection::Locality => &mut self.locality,
            LookupDirection::PostalCode => &mut self.postal_code,
        }
    }

    fn is_settled(&self) -> bool {
        !self.state.is_loading()
            && !self.locality.debounce.is_pending()
            && !self.postal_code.debounce.is_pending()
    }
}

enum Gate {
    Open(LocalityQuery),
    Closed(LookupEvent),
}

impl<D> AddressLookupController<D>
where
    D: AddressDirectory + 'static,
{
    pub fn new(directory: D, settings: LookupConfig) -> Self {
        let (updates, _) = watch::channel(SearchState::default());
        Self {
            shared: Arc::new(Shared {
                directory,
                settings,
                inner: Mutex::new(Inner::default()),
                updates,
            }),
        }
    }

    pub fn on_locality_edit(&self, text: impl Into<String>) {
        self.shared.edit(
            LookupDirection::Locality,
            LookupEvent::LocalityEdited(text.into()),
        );
    }

    pub fn on_postal_code_edit(&self, text: impl Into<String>) {
        self.shared.edit(
            LookupDirection::PostalCode,
            LookupEvent::PostalCodeEdited(text.into()),
        );
    }

    /// Accepts one of the offered postal codes. This is a resolved choice, so
    /// no reverse lookup is started for it.
    pub fn on_candidate_select(&self, code: &str) -> Result<(), SelectionError> {
        let mut inner = self.shared.lock();
        if inner.disposed || !inner.state.is_showing_dropdown() {
            return Err(SelectionError::DropdownClosed);
        }
        if !inner.state.candidates().iter().any(|candidate| candidate == code) {
            return Err(SelectionError::UnknownCandidate(code.to_string()));
        }

        self.shared.quiesce(&mut inner, LookupDirection::PostalCode);
        inner
            .state
            .apply(LookupEvent::CandidateSelected(code.to_string()));
        self.shared.publish(&inner);
        info!(postal_code = code, "postal code chosen from candidates");
        Ok(())
    }

    pub fn snapshot(&self) -> SearchState {
        self.shared.lock().state.clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.updates.subscribe()
    }

    pub fn page(&self) -> Page {
        self.shared.lock().page
    }

    /// Changes the result page and re-runs the locality lookup right away when
    /// the locality text is long enough to search for.
    pub fn set_page(&self, page: Page) {
        let mut inner = self.shared.lock();
        if inner.disposed || inner.page == page {
            return;
        }
        inner.page = page;

        let searchable =
            inner.state.locality_text().chars().count() >= self.shared.settings.min_query_len;
        if searchable {
            inner.locality.debounce.cancel();
            self.shared.start_lookup(&mut inner, LookupDirection::Locality);
        }
    }

    /// Re-issues every lookup whose last attempt failed in transport. Returns
    /// how many lookups were started.
    pub fn retry(&self) -> usize {
        let mut inner = self.shared.lock();
        if inner.disposed {
            return 0;
        }
        let mut retried = 0;
        for direction in LookupDirection::ALL {
            let retryable = inner
                .state
                .error(direction)
                .is_some_and(|error| error.kind.is_retryable());
            if retryable && self.shared.start_lookup(&mut inner, direction) {
                retried += 1;
            }
        }
        retried
    }

    /// No timer is armed and no request is in flight.
    pub fn is_settled(&self) -> bool {
        self.shared.lock().is_settled()
    }

    /// Waits until the controller is settled and returns the final state.
    pub async fn settled(&self) -> SearchState {
        let mut updates = self.subscribe();
        loop {
            {
                let inner = self.shared.lock();
                if inner.is_settled() || inner.disposed {
                    return inner.state.clone();
                }
            }
            if updates.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    /// Stops both timers and both requests. Later results are ignored.
    pub fn dispose(&self) {
        let mut inner = self.shared.lock();
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        for direction in LookupDirection::ALL {
            self.shared.quiesce(&mut inner, direction);
        }
        self.shared.publish(&inner);
        debug!("lookup controller disposed");
    }
}

impl<D> Drop for AddressLookupController<D>
where
    D: AddressDirectory + 'static,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<D> Shared<D>
where
    D: AddressDirectory + 'static,
{
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("lookup state mutex poisoned")
    }

    fn publish(&self, inner: &Inner) {
        self.updates.send_replace(inner.state.clone());
    }

    fn edit(self: &Arc<Self>, direction: LookupDirection, event: LookupEvent) {
        let mut inner = self.lock();
        if inner.disposed {
            return;
        }
        inner.state.apply(event);
        self.publish(&inner);

        let shared = Arc::clone(self);
        let delay: Duration = self.settings.debounce;
        inner
            .lane_mut(direction)
            .debounce
            .schedule(delay, move |armed| shared.fire(direction, armed));
    }

    fn fire(self: &Arc<Self>, direction: LookupDirection, armed: Armed) {
        let mut inner = self.lock();
        if inner.disposed || !inner.lane_mut(direction).debounce.complete(armed) {
            return;
        }
        self.start_lookup(&mut inner, direction);
    }

    /// Cancels any request the direction already has in flight, then either
    /// issues a new one or records why none is needed. Returns whether a
    /// request was sent.
    fn start_lookup(self: &Arc<Self>, inner: &mut Inner, direction: LookupDirection) -> bool {
        let query = match self.gate(&inner.state, direction) {
            Gate::Open(query) => query,
            Gate::Closed(event) => {
                if inner.lane_mut(direction).slot.cancel() {
                    debug!(?direction, "cancelled in-flight lookup, input no longer searchable");
                }
                inner.state.apply(event);
                self.publish(inner);
                return false;
            }
        };

        let page = inner.page;
        let lane = inner.lane_mut(direction);
        let superseded = lane.slot.is_occupied();
        let ticket = lane.slot.begin();
        if superseded {
            debug!(?direction, "cancelled superseded lookup");
        }

        inner.state.apply(LookupEvent::RequestStarted(direction));
        self.publish(inner);

        let shared = Arc::clone(self);
        let span = info_span!("lookup", ?direction, %query, %page);
        let handle = tokio::spawn(
            async move {
                let result = shared.directory.search(&query, page).await;
                shared.resolve(direction, ticket, result);
            }
            .instrument(span),
        );
        inner.lane_mut(direction).slot.attach(ticket, handle);
        true
    }

    fn gate(&self, state: &SearchState, direction: LookupDirection) -> Gate {
        let text = state.text(direction).trim();
        if text.chars().count() < self.settings.min_query_len {
            return Gate::Closed(LookupEvent::LookupSkipped {
                direction,
                reason: SkipReason::TooShort,
            });
        }

        match direction {
            LookupDirection::Locality => Gate::Open(LocalityQuery::Name(text.to_string())),
            LookupDirection::PostalCode => {
                if state.is_showing_dropdown() {
                    return Gate::Closed(LookupEvent::LookupSkipped {
                        direction,
                        reason: SkipReason::DropdownActive,
                    });
                }
                if !is_postal_code_prefix(text) {
                    return Gate::Closed(LookupEvent::PostalCodeMalformed);
                }
                Gate::Open(LocalityQuery::PostalCode(text.to_string()))
            }
        }
    }

    fn resolve(
        &self,
        direction: LookupDirection,
        ticket: Ticket,
        result: Result<Vec<LocalityRecord>, DirectoryError>,
    ) {
        let mut inner = self.lock();
        if inner.disposed || !inner.lane_mut(direction).slot.finish(ticket) {
            debug!(?direction, "discarding result of superseded lookup");
            return;
        }
        if direction == LookupDirection::PostalCode && inner.state.is_showing_dropdown() {
            debug!("discarding postal code result while candidates are offered");
            inner.state.apply(LookupEvent::RequestCancelled(direction));
            self.publish(&inner);
            return;
        }

        let event = match result {
            Ok(records) => {
                info!(?direction, matches = records.len(), "lookup resolved");
                match direction {
                    LookupDirection::Locality => LookupEvent::LocalitiesResolved(records),
                    LookupDirection::PostalCode => LookupEvent::PostalCodesResolved(records),
                }
            }
            Err(err) => {
                warn!(?direction, error = %err, "address directory lookup failed");
                LookupEvent::LookupFailed {
                    direction,
                    kind: LookupErrorKind::TransportFailure,
                }
            }
        };

        if let Some(obsolete) = inner.state.apply(event) {
            self.quiesce(&mut inner, obsolete);
        }
        self.publish(&inner);
    }

    /// Drops the direction's pending timer and in-flight request. Used when a
    /// field is overwritten by something other than a raw edit, or may not be
    /// looked up while candidates are offered.
    fn quiesce(&self, inner: &mut Inner, direction: LookupDirection) {
        let lane = inner.lane_mut(direction);
        lane.debounce.cancel();
        if lane.slot.cancel() {
            debug!(?direction, "cancelled in-flight lookup for overwritten field");
        }
        inner.state.apply(LookupEvent::RequestCancelled(direction));
    }
}

/// Digits only, at most five of them.
fn is_postal_code_prefix(text: &str) -> bool {
    text.len() <= MAX_POSTAL_CODE_DIGITS && text.chars().all(|c| c.is_ascii_digit())
}
