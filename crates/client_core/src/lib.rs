use std::sync::Arc;

use shared::{
    domain::{ListState, PageSize, SortOrder},
    url_state,
};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};

pub mod controller;
pub mod display;
pub mod error;
pub mod source;
pub mod store;

pub use controller::{Completion, FetchController, ListEvent, ListView};
pub use display::{page_links, ItemCard, PageLink, PageLinks, RangeSummary};
pub use error::FetchError;
pub use source::{GatewaySource, IdeasSource};
pub use store::{ListStore, Location, LocationEntry, MemoryLocation, StateChange};

/// The ideas list page: address-backed state wired to a fetch loop.
pub struct IdeasPage {
    store: ListStore,
    controller: Arc<FetchController>,
    fetch_loop: JoinHandle<()>,
}

impl IdeasPage {
    /// Hydrates from `location` and issues the first request before returning,
    /// so the view already reports `loading`.
    pub async fn open(location: Arc<dyn Location>, source: Arc<dyn IdeasSource>) -> Self {
        let store = ListStore::hydrate(location);
        let controller = FetchController::new(source, store.watch());
        let changes = store.subscribe();
        let fetch_loop = controller.spawn(store.current(), changes).await;
        Self {
            store,
            controller,
            fetch_loop,
        }
    }

    pub fn state(&self) -> ListState {
        self.store.state()
    }

    pub fn sequence(&self) -> u64 {
        self.store.sequence()
    }

    /// Canonical address for the current state.
    pub fn address(&self) -> String {
        url_state::encode(&self.state())
    }

    pub fn set_page(&self, page: u32) -> StateChange {
        self.store.set_page(page)
    }

    pub fn set_page_size(&self, size: PageSize) -> StateChange {
        self.store.set_page_size(size)
    }

    pub fn set_sort(&self, sort: SortOrder) -> StateChange {
        self.store.set_sort(sort)
    }

    pub fn sync_from_location(&self) -> StateChange {
        self.store.sync_from_location()
    }

    pub async fn view(&self) -> ListView {
        self.controller.snapshot().await
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ListEvent> {
        self.controller.subscribe_events()
    }

    /// Waits until the request for the store's current sequence has resolved.
    pub async fn settled(&self) -> ListView {
        let mut events = self.controller.subscribe_events();
        loop {
            let view = self.controller.snapshot().await;
            if view.is_settled_at(self.store.sequence()) {
                return view;
            }
            match events.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return view,
            }
        }
    }

    pub async fn range_summary(&self) -> RangeSummary {
        let state = self.state();
        let view = self.view().await;
        RangeSummary::compute(state.page, state.size.get(), view.result.total_items)
    }

    pub async fn page_links(&self) -> PageLinks {
        let view = self.view().await;
        page_links(self.state().page, view.result.last_page)
    }

    pub async fn cards(&self) -> Vec<ItemCard> {
        self.view()
            .await
            .result
            .items
            .iter()
            .map(ItemCard::from_item)
            .collect()
    }
}

impl Drop for IdeasPage {
    fn drop(&mut self) {
        self.fetch_loop.abort();
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
