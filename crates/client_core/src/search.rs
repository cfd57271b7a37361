//! Debounced incremental search with a dismissible result dropdown.
//!
//! Every keystroke replaces the query and re-arms a single quiet-period timer;
//! only the last keystroke of a burst reaches the catalog. Lookups that are
//! already in flight are never aborted, but their responses are applied only
//! while the query they were issued for is still the live query.
//!
//! State changes go out on a broadcast channel that observers may fall behind
//! on. Selections go to the parent on their own unbounded queue and are never
//! dropped.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use shared::domain::{Candidate, ListIntent};
use tokio::{
    runtime::Handle,
    sync::{broadcast, mpsc},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, warn};

use crate::{catalog::CatalogService, interaction::OutsideWatch};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// No query.
    Idle,
    /// Query present, lookup scheduled.
    Typing,
    /// Lookup in flight.
    Waiting,
    ResultsShown,
    NoResults,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub query: String,
    pub candidates: Vec<Candidate>,
    pub dropdown_visible: bool,
    pub phase: SearchPhase,
}

/// A candidate picked for one of the two lists. Persisting it is the caller's job.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub candidate: Candidate,
    pub watched: bool,
    pub want_to_watch: bool,
}

impl Selection {
    pub fn new(candidate: Candidate, intent: ListIntent) -> Self {
        let (watched, want_to_watch) = intent.flags();
        Self {
            candidate,
            watched,
            want_to_watch,
        }
    }

    pub fn intent(&self) -> ListIntent {
        if self.watched {
            ListIntent::Watched
        } else {
            ListIntent::WantToWatch
        }
    }
}

/// How a finished lookup was folded into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Results(usize),
    Empty,
    Failed,
    Stale,
}

struct SearchSessionState {
    query: String,
    candidates: Vec<Candidate>,
    dropdown_visible: bool,
    phase: SearchPhase,
    pending_timer: Option<JoinHandle<()>>,
    timer_generation: u64,
    closed: bool,
}

impl SearchSessionState {
    fn new() -> Self {
        Self {
            query: String::new(),
            candidates: Vec::new(),
            dropdown_visible: false,
            phase: SearchPhase::Idle,
            pending_timer: None,
            timer_generation: 0,
            closed: false,
        }
    }

    fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            query: self.query.clone(),
            candidates: self.candidates.clone(),
            dropdown_visible: self.dropdown_visible,
            phase: self.phase,
        }
    }

    fn cancel_timer(&mut self) {
        self.timer_generation = self.timer_generation.wrapping_add(1);
        if let Some(timer) = self.pending_timer.take() {
            timer.abort();
        }
    }

    fn clear_results(&mut self) {
        self.candidates.clear();
        self.dropdown_visible = false;
    }
}

fn lock_state(state: &Mutex<SearchSessionState>) -> MutexGuard<'_, SearchSessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SearchController {
    catalog: Arc<dyn CatalogService>,
    state: Arc<Mutex<SearchSessionState>>,
    events: broadcast::Sender<SearchSnapshot>,
    selections: mpsc::UnboundedSender<Selection>,
    selection_queue: Mutex<Option<mpsc::UnboundedReceiver<Selection>>>,
    debounce: Duration,
    runtime: Handle,
    dismiss_watch: Mutex<Option<JoinHandle<()>>>,
}

impl SearchController {
    /// Must be called from within a tokio runtime; see [`Self::new_with_runtime`]
    /// for UI threads that live outside one.
    pub fn new(catalog: Arc<dyn CatalogService>, debounce: Duration) -> Self {
        Self::new_with_runtime(catalog, debounce, Handle::current())
    }

    pub fn new_with_runtime(
        catalog: Arc<dyn CatalogService>,
        debounce: Duration,
        runtime: Handle,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        let (selections, selection_queue) = mpsc::unbounded_channel();
        Self {
            catalog,
            state: Arc::new(Mutex::new(SearchSessionState::new())),
            events,
            selections,
            selection_queue: Mutex::new(Some(selection_queue)),
            debounce,
            runtime,
            dismiss_watch: Mutex::new(None),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SearchSnapshot> {
        self.events.subscribe()
    }

    /// Hands out the selection queue. There is one parent, so only the first
    /// call gets it. The queue ends once the controller is dropped.
    pub fn take_selections(&self) -> Option<mpsc::UnboundedReceiver<Selection>> {
        self.selection_queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        lock_state(&self.state).snapshot()
    }

    pub fn on_query_change(&self, new_text: impl Into<String>) {
        let new_text = new_text.into();
        let deadline = Instant::now() + self.debounce;
        let mut state = lock_state(&self.state);
        if state.closed {
            return;
        }
        state.cancel_timer();
        state.query = new_text;

        if state.query.is_empty() {
            state.clear_results();
            state.phase = SearchPhase::Idle;
        } else {
            state.phase = SearchPhase::Typing;
            let generation = state.timer_generation;
            let timer = self.runtime.spawn(run_scheduled_lookup(
                Arc::downgrade(&self.state),
                self.catalog.clone(),
                self.events.clone(),
                deadline,
                generation,
            ));
            state.pending_timer = Some(timer);
        }

        publish(&self.events, &state);
    }

    pub fn clear(&self) {
        self.on_query_change(String::new());
    }

    /// Queues the selection for the parent; the visible state is left
    /// untouched. Returns `None` once the controller is shut down.
    pub fn on_select(&self, candidate: Candidate, intent: ListIntent) -> Option<Selection> {
        if lock_state(&self.state).closed {
            return None;
        }
        let selection = Selection::new(candidate, intent);
        debug!(
            external_id = %selection.candidate.external_id,
            watched = selection.watched,
            want_to_watch = selection.want_to_watch,
            "search candidate selected"
        );
        if self.selections.send(selection.clone()).is_err() {
            warn!("selection queue was dropped; nobody will persist this selection");
        }
        Some(selection)
    }

    /// Selects by position in the current candidate list.
    pub fn select_index(&self, index: usize, intent: ListIntent) -> Option<Selection> {
        let candidate = lock_state(&self.state).candidates.get(index).cloned()?;
        self.on_select(candidate, intent)
    }

    /// Hides the dropdown but keeps the query and candidates around.
    pub fn on_dismiss(&self) {
        dismiss(&self.state, &self.events);
    }

    /// Dismisses the dropdown for every press the watch reports outside its region.
    pub fn attach_dismiss_watch(&self, mut watch: OutsideWatch) {
        let state = Arc::downgrade(&self.state);
        let events = self.events.clone();
        let task = self.runtime.spawn(async move {
            while watch.next_outside().await.is_some() {
                let Some(state) = state.upgrade() else {
                    break;
                };
                dismiss(&state, &events);
            }
        });

        let previous = self
            .dismiss_watch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Cancels the pending timer and the dismiss watch. Later responses are dropped.
    pub fn shutdown(&self) {
        {
            let mut state = lock_state(&self.state);
            state.cancel_timer();
            state.closed = true;
        }
        if let Some(task) = self
            .dismiss_watch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn publish(events: &broadcast::Sender<SearchSnapshot>, state: &SearchSessionState) {
    let _ = events.send(state.snapshot());
}

fn dismiss(state: &Mutex<SearchSessionState>, events: &broadcast::Sender<SearchSnapshot>) {
    let mut state = lock_state(state);
    if state.closed || !state.dropdown_visible {
        return;
    }
    state.dropdown_visible = false;
    publish(events, &state);
}

async fn run_scheduled_lookup(
    state: Weak<Mutex<SearchSessionState>>,
    catalog: Arc<dyn CatalogService>,
    events: broadcast::Sender<SearchSnapshot>,
    deadline: Instant,
    generation: u64,
) {
    tokio::time::sleep_until(deadline).await;

    let query = {
        let Some(state) = state.upgrade() else {
            return;
        };
        let mut state = lock_state(&state);
        if state.closed || state.timer_generation != generation {
            return;
        }
        // From here on the lookup is in flight and no longer cancellable.
        state.pending_timer = None;
        state.phase = SearchPhase::Waiting;
        publish(&events, &state);
        state.query.clone()
    };

    debug!(query = %query, "catalog lookup started");
    let result = catalog.search(&query).await;

    let Some(state) = state.upgrade() else {
        debug!(query = %query, "search controller gone; dropping lookup response");
        return;
    };
    let outcome = apply_lookup(&mut lock_state(&state), &query, result, &events);
    debug!(query = %query, ?outcome, "catalog lookup finished");
}

fn apply_lookup(
    state: &mut SearchSessionState,
    query: &str,
    result: Result<Vec<Candidate>, crate::error::CatalogError>,
    events: &broadcast::Sender<SearchSnapshot>,
) -> LookupOutcome {
    if state.closed || state.query != query {
        return LookupOutcome::Stale;
    }

    let outcome = match result {
        Ok(candidates) if !candidates.is_empty() => {
            let count = candidates.len();
            state.candidates = candidates;
            state.dropdown_visible = true;
            state.phase = SearchPhase::ResultsShown;
            LookupOutcome::Results(count)
        }
        Ok(_) => {
            state.clear_results();
            state.phase = SearchPhase::NoResults;
            LookupOutcome::Empty
        }
        Err(error) => {
            warn!(query, %error, "catalog lookup failed");
            state.clear_results();
            state.phase = SearchPhase::NoResults;
            LookupOutcome::Failed
        }
    };
    publish(events, state);
    outcome
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
