//! Page bookkeeping for list views backed by a paginated endpoint.
//!
//! [`PaginationController`] owns a [`PageState`] and publishes it through a
//! `watch` channel, so views can re-read it after every change. It never
//! performs I/O: a caller that wants fresh data observes the new page and
//! fetches it.

use serde::Deserialize;
use tokio::sync::watch;
use tracing::debug;

pub const DEFAULT_PAGE_NUMBER: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub page: u64,
    pub limit: u64,
    pub total_items: u64,
}

impl PageState {
    fn first(limit: u64) -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            limit,
            total_items: 0,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(self.limit.max(1))
    }

    /// Highest page navigation may reach; 1 while the list is empty.
    pub fn last_page(&self) -> u64 {
        self.total_pages().max(DEFAULT_PAGE_NUMBER)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > DEFAULT_PAGE_NUMBER
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn is_out_of_range(&self) -> bool {
        self.page > self.last_page()
    }
}

/// What happens to the current page when the total shrinks under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampPolicy {
    /// Leave the page alone; the caller decides.
    #[default]
    Preserve,
    /// Pull the page back to the last page.
    ClampToLast,
}

pub struct PaginationController {
    state: watch::Sender<PageState>,
    max_limit: u64,
    clamp_policy: ClampPolicy,
}

impl PaginationController {
    pub fn initialize(default_limit: u64) -> Self {
        Self::with_options(default_limit, MAX_PAGE_SIZE, ClampPolicy::default())
    }

    pub fn with_options(default_limit: u64, max_limit: u64, clamp_policy: ClampPolicy) -> Self {
        let max_limit = max_limit.max(1);
        let limit = default_limit.clamp(1, max_limit);
        if limit != default_limit {
            debug!(default_limit, limit, "clamped default page size");
        }
        let (state, _) = watch::channel(PageState::first(limit));
        Self {
            state,
            max_limit,
            clamp_policy,
        }
    }

    pub fn snapshot(&self) -> PageState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PageState> {
        self.state.subscribe()
    }

    pub fn clamp_policy(&self) -> ClampPolicy {
        self.clamp_policy
    }

    pub fn total_pages(&self) -> u64 {
        self.state.borrow().total_pages()
    }

    pub fn set_total_items(&self, total_items: u64) {
        let policy = self.clamp_policy;
        self.state.send_if_modified(|state| {
            let before = *state;
            state.total_items = total_items;
            if policy == ClampPolicy::ClampToLast && state.is_out_of_range() {
                debug!(
                    page = state.page,
                    last_page = state.last_page(),
                    "clamping page after total shrank"
                );
                state.page = state.last_page();
            }
            *state != before
        });
    }

    pub fn go_to_next_page(&self) {
        self.state.send_if_modified(|state| {
            let next = state.page.saturating_add(1).min(state.last_page());
            let changed = next != state.page;
            state.page = next;
            changed
        });
    }

    pub fn go_to_previous_page(&self) {
        self.state.send_if_modified(|state| {
            let previous = state
                .page
                .saturating_sub(1)
                .max(DEFAULT_PAGE_NUMBER)
                .min(state.last_page());
            let changed = previous != state.page;
            state.page = previous;
            changed
        });
    }

    /// Sets page and limit together. Inputs are clamped rather than rejected:
    /// the limit into `1..=max_limit`, the page into `1..=last_page` under the
    /// new limit.
    pub fn set_pagination(&self, new_page: i64, new_limit: i64) -> PageState {
        let max_limit = self.max_limit;
        self.state.send_if_modified(|state| {
            let before = *state;
            let limit = clamp_input(new_limit, 1, max_limit);
            state.limit = limit;
            state.page = clamp_input(new_page, DEFAULT_PAGE_NUMBER, state.last_page());
            if state.page as i64 != new_page || limit as i64 != new_limit {
                debug!(
                    new_page,
                    new_limit,
                    page = state.page,
                    limit = state.limit,
                    "clamped invalid pagination input"
                );
            }
            *state != before
        });
        self.snapshot()
    }

    /// Starts over at the first page, keeping the page size. Used when the
    /// list filters change.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            let fresh = PageState::first(state.limit);
            let changed = *state != fresh;
            *state = fresh;
            changed
        });
    }
}

fn clamp_input(value: i64, min: u64, max: u64) -> u64 {
    if value < min as i64 {
        min
    } else {
        (value as u64).min(max)
    }
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
