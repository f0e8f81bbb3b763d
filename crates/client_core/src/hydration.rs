//! Reconciles freshly fetched lists into a [`ListSyncStore`].

use std::sync::Arc;

use shared::domain::Entity;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::store::{ListDraft, ListSyncStore};

/// Fire-and-forget route change, provided by the host application.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationState {
    AwaitingFirstLoad,
    Hydrated,
    /// The list came back empty and the user was sent to the creation route.
    Redirected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationOutcome {
    Hydrated { count: usize },
    Redirected { route: String },
    /// Empty again after a redirect was already issued.
    RedirectPending,
    /// An empty page past the end of a list that still has items. Nothing is
    /// hydrated and no redirect is issued.
    OutOfRange { requested: u64, last_page: u64 },
}

pub struct HydrationController<T: Entity> {
    store: Arc<ListSyncStore<T>>,
    navigator: Arc<dyn Navigator>,
    bootstrap_route: String,
    auto_select_first: bool,
    state: watch::Sender<HydrationState>,
}

impl<T: Entity> HydrationController<T> {
    pub fn new(
        store: Arc<ListSyncStore<T>>,
        navigator: Arc<dyn Navigator>,
        bootstrap_route: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(HydrationState::AwaitingFirstLoad);
        Self {
            store,
            navigator,
            bootstrap_route: bootstrap_route.into(),
            auto_select_first: false,
            state,
        }
    }

    /// Select the first item when a list is hydrated and nothing is selected.
    pub fn with_auto_select_first(mut self, enabled: bool) -> Self {
        self.auto_select_first = enabled;
        self
    }

    pub fn state(&self) -> HydrationState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<HydrationState> {
        self.state.subscribe()
    }

    pub fn bootstrap_route(&self) -> &str {
        &self.bootstrap_route
    }

    pub fn store(&self) -> &Arc<ListSyncStore<T>> {
        &self.store
    }

    pub fn on_list_fetched(&self, items: Vec<T>) -> HydrationOutcome {
        self.apply(items, |_| {})
    }

    /// Hydrates `items` and runs `finish` inside the same store transition,
    /// so callers can fold their own bookkeeping (the loading flag) into it.
    pub(crate) fn apply(
        &self,
        items: Vec<T>,
        finish: impl FnOnce(&mut ListDraft<'_, T>),
    ) -> HydrationOutcome {
        if items.is_empty() {
            self.store.update(finish);
            return self.redirect();
        }

        let auto_select_first = self.auto_select_first;
        let mut count = 0;
        self.store.update(|draft| {
            let first = items.first().map(|item| item.id().clone());
            draft.set_list(items);
            count = draft.snapshot().len();
            if auto_select_first && draft.snapshot().active.is_none() {
                draft.set_active_selection(first);
            }
            finish(draft);
        });
        self.state.send_if_modified(|state| {
            let changed = *state != HydrationState::Hydrated;
            *state = HydrationState::Hydrated;
            changed
        });
        debug!(kind = T::KIND.label(), count, "hydrated list");
        HydrationOutcome::Hydrated { count }
    }

    fn redirect(&self) -> HydrationOutcome {
        let entered = self.state.send_if_modified(|state| {
            let changed = *state != HydrationState::Redirected;
            *state = HydrationState::Redirected;
            changed
        });
        if !entered {
            return HydrationOutcome::RedirectPending;
        }

        info!(
            kind = T::KIND.label(),
            route = %self.bootstrap_route,
            "list is empty; redirecting to creation route"
        );
        self.navigator.navigate_to(&self.bootstrap_route);
        HydrationOutcome::Redirected {
            route: self.bootstrap_route.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/hydration_tests.rs"]
mod tests;
