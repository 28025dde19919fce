//! List state store: the (page, size, sort) triple and its page address.

use std::sync::{Arc, Mutex, PoisonError};

use shared::{
    domain::{ListState, PageSize, SortOrder},
    url_state,
};
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// The page's own address, reduced to its query string.
pub trait Location: Send + Sync {
    fn current_query(&self) -> String;
    /// Rewrites the address in place without moving the viewport.
    fn push_query(&self, query: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationEntry {
    pub query: String,
    pub preserve_scroll: bool,
}

#[derive(Debug, Default)]
struct MemoryLocationState {
    current: String,
    history: Vec<LocationEntry>,
}

/// In-process address used by the terminal front end and tests.
#[derive(Debug, Default)]
pub struct MemoryLocation {
    inner: Mutex<MemoryLocationState>,
}

impl MemoryLocation {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(MemoryLocationState {
                current: query.into(),
                history: Vec::new(),
            }),
        }
    }

    /// Entries written through [`Location::push_query`], oldest first.
    pub fn history(&self) -> Vec<LocationEntry> {
        self.lock().history.clone()
    }

    /// Changes the address the way back/forward navigation does: no entry is
    /// recorded and nothing is notified until the store re-reads it.
    pub fn navigate(&self, query: impl Into<String>) {
        self.lock().current = query.into();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryLocationState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Location for MemoryLocation {
    fn current_query(&self) -> String {
        self.lock().current.clone()
    }

    fn push_query(&self, query: &str) {
        let mut guard = self.lock();
        guard.current = query.to_string();
        guard.history.push(LocationEntry {
            query: query.to_string(),
            preserve_scroll: true,
        });
    }
}

/// A state together with the sequence number it was published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub sequence: u64,
    pub state: ListState,
}

pub struct ListStore {
    location: Arc<dyn Location>,
    current: watch::Sender<StateChange>,
    observers: Mutex<Vec<mpsc::UnboundedSender<StateChange>>>,
}

impl ListStore {
    /// Reads the initial state from the address. Hydration is sequence 0.
    pub fn hydrate(location: Arc<dyn Location>) -> Self {
        let query = location.current_query();
        let state = url_state::decode(&query);
        debug!(%query, ?state, "hydrated list state from location");
        let (current, _) = watch::channel(StateChange { sequence: 0, state });
        Self {
            location,
            current,
            observers: Mutex::new(Vec::new()),
        }
    }

    pub fn current(&self) -> StateChange {
        *self.current.borrow()
    }

    pub fn state(&self) -> ListState {
        self.current().state
    }

    pub fn sequence(&self) -> u64 {
        self.current().sequence
    }

    /// Latest published state only; used to judge whether a response is stale.
    pub fn watch(&self) -> watch::Receiver<StateChange> {
        self.current.subscribe()
    }

    /// Every effective mutation after this call, in order. Each one is a
    /// fetch trigger; none are merged.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<StateChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub fn set_page(&self, page: u32) -> StateChange {
        let next = self.state().with_page(page);
        self.transition(next, true)
    }

    pub fn set_page_size(&self, size: PageSize) -> StateChange {
        let next = self.state().with_size(size);
        self.transition(next, true)
    }

    pub fn set_sort(&self, sort: SortOrder) -> StateChange {
        let next = self.state().with_sort(sort);
        self.transition(next, true)
    }

    /// Re-reads the address after back/forward navigation.
    pub fn sync_from_location(&self) -> StateChange {
        let next = url_state::decode(&self.location.current_query());
        self.transition(next, false)
    }

    // The address is written before observers hear about the change.
    fn transition(&self, next: ListState, push: bool) -> StateChange {
        if push {
            self.location.push_query(&url_state::encode(&next));
        }
        let changed = self.current.send_if_modified(|current| {
            if current.state == next {
                return false;
            }
            current.sequence += 1;
            current.state = next;
            true
        });
        let current = self.current();
        if changed {
            debug!(sequence = current.sequence, state = ?current.state, "list state changed");
            self.observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|observer| observer.send(current).is_ok());
        }
        current
    }
}
