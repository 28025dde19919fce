//! Fetch controller: one request per published state, newest result wins.

use std::sync::Arc;

use shared::domain::{IdeasResponse, ListState, PageResult};
use tokio::{
    sync::{broadcast, mpsc, watch, Mutex},
    task::JoinHandle,
};
use tracing::{debug, error, info};

use crate::{error::FetchError, source::IdeasSource, store::StateChange};

/// What the presentation layer observes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListView {
    /// Sequence of the most recently issued request, if any.
    pub latest_issued: Option<u64>,
    pub loading: bool,
    pub result: PageResult,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Failed,
    Stale,
}

impl ListView {
    pub fn begin(&mut self, sequence: u64) {
        if self.latest_issued.is_some_and(|latest| sequence < latest) {
            return;
        }
        self.latest_issued = Some(sequence);
        self.loading = true;
    }

    /// Applies an outcome only if its sequence is both the store's current
    /// one (`current_sequence`, read at resolution time) and the latest issued.
    /// A failure keeps the previous page in place.
    pub fn complete(
        &mut self,
        sequence: u64,
        current_sequence: u64,
        outcome: Result<IdeasResponse, FetchError>,
    ) -> Completion {
        if sequence != current_sequence || self.latest_issued != Some(sequence) {
            return Completion::Stale;
        }
        self.loading = false;
        match outcome {
            Ok(response) => {
                self.result = PageResult::from_response(response);
                self.last_error = None;
                Completion::Applied
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Completion::Failed
            }
        }
    }

    pub fn is_settled_at(&self, sequence: u64) -> bool {
        self.latest_issued == Some(sequence) && !self.loading
    }
}

#[derive(Debug, Clone)]
pub enum ListEvent {
    Loading {
        sequence: u64,
        state: ListState,
    },
    Loaded {
        sequence: u64,
        current_page: u32,
        last_page: u32,
        total_items: u64,
    },
    Failed {
        sequence: u64,
        message: String,
    },
    StaleDiscarded {
        sequence: u64,
    },
}

pub struct FetchController {
    source: Arc<dyn IdeasSource>,
    current: watch::Receiver<StateChange>,
    view: Mutex<ListView>,
    events: broadcast::Sender<ListEvent>,
}

impl FetchController {
    /// `current` is the store's latest published state (see `ListStore::watch`).
    pub fn new(
        source: Arc<dyn IdeasSource>,
        current: watch::Receiver<StateChange>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            source,
            current,
            view: Mutex::new(ListView::default()),
            events,
        })
    }

    pub async fn snapshot(&self) -> ListView {
        self.view.lock().await.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    pub async fn begin(&self, change: StateChange) {
        self.view.lock().await.begin(change.sequence);
        let _ = self.events.send(ListEvent::Loading {
            sequence: change.sequence,
            state: change.state,
        });
    }

    pub async fn complete(
        &self,
        sequence: u64,
        outcome: Result<IdeasResponse, FetchError>,
    ) -> Completion {
        let mut guard = self.view.lock().await;
        let current_sequence = self.current.borrow().sequence;
        let failure = outcome.as_ref().err().map(ToString::to_string);
        let completion = guard.complete(sequence, current_sequence, outcome);
        let event = match completion {
            Completion::Applied => {
                info!(
                    sequence,
                    page = guard.result.current_page,
                    items = guard.result.items.len(),
                    "ideas page loaded"
                );
                ListEvent::Loaded {
                    sequence,
                    current_page: guard.result.current_page,
                    last_page: guard.result.last_page,
                    total_items: guard.result.total_items,
                }
            }
            Completion::Failed => {
                let message = failure.unwrap_or_default();
                error!(sequence, error = %message, "error fetching ideas page");
                ListEvent::Failed { sequence, message }
            }
            Completion::Stale => {
                debug!(sequence, current_sequence, "discarding stale ideas response");
                ListEvent::StaleDiscarded { sequence }
            }
        };
        drop(guard);
        let _ = self.events.send(event);
        completion
    }

    /// Runs one request to completion on the current task.
    pub async fn fetch(&self, change: StateChange) -> Completion {
        self.begin(change).await;
        let outcome = self.source.fetch_page(&change.state).await;
        self.complete(change.sequence, outcome).await
    }

    /// Marks the request as issued, then resolves it on its own task so later
    /// requests are not held up behind it.
    pub async fn issue(self: &Arc<Self>, change: StateChange) -> JoinHandle<Completion> {
        self.begin(change).await;
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = controller.source.fetch_page(&change.state).await;
            controller.complete(change.sequence, outcome).await
        })
    }

    /// Issues `initial`, then one request per change received, in order,
    /// until the store goes away.
    pub async fn spawn(
        self: &Arc<Self>,
        initial: StateChange,
        mut changes: mpsc::UnboundedReceiver<StateChange>,
    ) -> JoinHandle<()> {
        self.issue(initial).await;

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(change) = changes.recv().await {
                controller.issue(change).await;
            }
            debug!("list store closed; fetch loop finished");
        })
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
