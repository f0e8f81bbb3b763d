//! Session-scoped cache of one fetched entity list.

use std::collections::HashSet;

use shared::domain::Entity;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<T: Entity> {
    pub items: Vec<T>,
    pub active: Option<T::Id>,
    pub loading: bool,
}

impl<T: Entity> Default for ListSnapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            active: None,
            loading: false,
        }
    }
}

impl<T: Entity> ListSnapshot<T> {
    pub fn contains(&self, id: &T::Id) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    /// The selected record, if the selection still points into the list.
    pub fn active_item(&self) -> Option<&T> {
        let active = self.active.as_ref()?;
        self.items.iter().find(|item| item.id() == active)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Mutable view handed to [`ListSyncStore::update`]. Everything done through
/// one draft is published as a single change.
pub struct ListDraft<'a, T: Entity> {
    snapshot: &'a mut ListSnapshot<T>,
    modified: bool,
}

impl<T: Entity> ListDraft<'_, T> {
    pub fn snapshot(&self) -> &ListSnapshot<T> {
        &*self.snapshot
    }

    pub fn set_list(&mut self, items: Vec<T>) {
        let items = dedup_by_id(items);
        if self.snapshot.items != items {
            self.snapshot.items = items;
            self.modified = true;
        }

        let dangling = self
            .snapshot
            .active
            .as_ref()
            .filter(|active| !self.snapshot.contains(active))
            .cloned();
        if let Some(active) = dangling {
            debug!(kind = T::KIND.label(), id = %active, "clearing dangling selection");
            self.snapshot.active = None;
            self.modified = true;
        }
    }

    pub fn set_active_selection(&mut self, id: Option<T::Id>) {
        if self.snapshot.active != id {
            self.snapshot.active = id;
            self.modified = true;
        }
    }

    pub fn set_loading(&mut self, loading: bool) {
        if self.snapshot.loading != loading {
            self.snapshot.loading = loading;
            self.modified = true;
        }
    }
}

fn dedup_by_id<T: Entity>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    let total = items.len();
    let unique: Vec<T> = items
        .into_iter()
        .filter(|item| seen.insert(item.id().clone()))
        .collect();
    if unique.len() != total {
        warn!(
            kind = T::KIND.label(),
            dropped = total - unique.len(),
            "list contained duplicate identifiers"
        );
    }
    unique
}

pub struct ListSyncStore<T: Entity> {
    state: watch::Sender<ListSnapshot<T>>,
}

impl<T: Entity> Default for ListSyncStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> ListSyncStore<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ListSnapshot::default());
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<T>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        self.state.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&ListSnapshot<T>) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Applies every mutation made through the draft as one transition.
    /// Observers are only notified if something actually changed.
    pub fn update(&self, f: impl FnOnce(&mut ListDraft<'_, T>)) -> bool {
        self.state.send_if_modified(|snapshot| {
            let mut draft = ListDraft {
                snapshot,
                modified: false,
            };
            f(&mut draft);
            draft.modified
        })
    }

    pub fn set_list(&self, items: Vec<T>) {
        self.update(|draft| draft.set_list(items));
    }

    pub fn set_active_selection(&self, id: Option<T::Id>) {
        self.update(|draft| draft.set_active_selection(id));
    }

    pub fn set_loading(&self, loading: bool) {
        self.update(|draft| draft.set_loading(loading));
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
