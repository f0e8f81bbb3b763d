//! Ties one paginated list view together: filters, page state, fetches,
//! staleness and hydration.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::Entity,
    protocol::{EntityPage, ListFilters},
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    config::ClientSettings,
    error::SyncError,
    hydration::{HydrationController, HydrationOutcome, HydrationState, Navigator},
    pagination::{PageState, PaginationController},
    session::AuthSession,
    store::ListSyncStore,
};

#[async_trait]
pub trait EntityFetcher<T: Entity>: Send + Sync {
    async fn fetch_entity_page(
        &self,
        filters: &ListFilters,
        page: u64,
        limit: u64,
    ) -> Result<EntityPage<T>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchToken(u64);

impl FetchToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Hands out increasing tokens; only the most recent one may apply.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    latest: AtomicU64,
}

impl FetchSequencer {
    pub fn issue(&self) -> FetchToken {
        FetchToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, token: FetchToken) -> bool {
        token.0 == self.latest()
    }

    pub fn check(&self, token: FetchToken) -> Result<(), SyncError> {
        let latest = self.latest();
        if token.0 == latest {
            Ok(())
        } else {
            Err(SyncError::StaleFetchResult {
                token: token.0,
                latest,
            })
        }
    }

    /// Makes every outstanding token stale.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

/// A fetch that was started with [`ListSync::begin`] and still has to be
/// completed.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFetch {
    pub token: FetchToken,
    pub filters: ListFilters,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub page: PageState,
    pub hydration: HydrationOutcome,
}

pub struct ListSync<T: Entity> {
    fetcher: Arc<dyn EntityFetcher<T>>,
    session: Arc<dyn AuthSession>,
    pagination: Arc<PaginationController>,
    store: Arc<ListSyncStore<T>>,
    hydration: HydrationController<T>,
    sequencer: FetchSequencer,
    filters: watch::Sender<ListFilters>,
}

impl<T: Entity> ListSync<T> {
    pub fn new(
        fetcher: Arc<dyn EntityFetcher<T>>,
        session: Arc<dyn AuthSession>,
        pagination: PaginationController,
        hydration: HydrationController<T>,
    ) -> Self {
        let (filters, _) = watch::channel(ListFilters::default());
        Self {
            fetcher,
            session,
            pagination: Arc::new(pagination),
            store: hydration.store().clone(),
            hydration,
            sequencer: FetchSequencer::default(),
            filters,
        }
    }

    pub fn from_settings(
        settings: &ClientSettings,
        fetcher: Arc<dyn EntityFetcher<T>>,
        session: Arc<dyn AuthSession>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let pagination = PaginationController::with_options(
            settings.default_page_size,
            settings.max_page_size,
            settings.clamp_policy,
        );
        let hydration = HydrationController::new(
            Arc::new(ListSyncStore::new()),
            navigator,
            settings.routes.for_kind(T::KIND),
        )
        .with_auto_select_first(settings.auto_select_first);
        Self::new(fetcher, session, pagination, hydration)
    }

    pub fn store(&self) -> &Arc<ListSyncStore<T>> {
        &self.store
    }

    pub fn pagination(&self) -> &Arc<PaginationController> {
        &self.pagination
    }

    pub fn hydration_state(&self) -> HydrationState {
        self.hydration.state()
    }

    pub fn filters(&self) -> ListFilters {
        self.filters.borrow().clone()
    }

    pub fn subscribe_filters(&self) -> watch::Receiver<ListFilters> {
        self.filters.subscribe()
    }

    /// New filters start a new pagination session; in-flight fetches for the
    /// old filters become stale.
    pub fn set_filters(&self, filters: ListFilters) {
        let changed = self.filters.send_if_modified(|current| {
            let changed = *current != filters;
            *current = filters;
            changed
        });
        if changed {
            self.sequencer.invalidate();
            self.pagination.reset();
            self.store.set_loading(false);
        }
    }

    /// Issues a token for the current filters and page and raises the
    /// loading flag.
    pub fn begin(&self) -> Result<PendingFetch, SyncError> {
        self.ensure_session()?;
        let token = self.sequencer.issue();
        let page = self.pagination.snapshot();
        self.store.set_loading(true);
        debug!(
            kind = T::KIND.label(),
            token = token.value(),
            page = page.page,
            limit = page.limit,
            "fetching list page"
        );
        Ok(PendingFetch {
            token,
            filters: self.filters(),
            page: page.page,
            limit: page.limit,
        })
    }

    pub fn complete(
        &self,
        pending: &PendingFetch,
        result: Result<EntityPage<T>>,
    ) -> Result<SyncOutcome, SyncError> {
        if let Err(err) = self.sequencer.check(pending.token) {
            debug!(kind = T::KIND.label(), "{err}");
            return Err(err);
        }

        let page = match result {
            Ok(page) => page,
            Err(source) => {
                warn!(kind = T::KIND.label(), "list fetch failed: {source:#}");
                self.store.set_loading(false);
                return Err(SyncError::Fetch {
                    kind: T::KIND.label(),
                    source,
                });
            }
        };

        self.pagination.set_total_items(page.total_items);
        if page.items.is_empty() && page.total_items > 0 {
            let state = self.pagination.snapshot();
            debug!(
                kind = T::KIND.label(),
                requested = pending.page,
                last_page = state.last_page(),
                "requested page is past the end of the list"
            );
            self.store.set_loading(false);
            return Ok(SyncOutcome {
                page: state,
                hydration: HydrationOutcome::OutOfRange {
                    requested: pending.page,
                    last_page: state.last_page(),
                },
            });
        }

        let hydration = self
            .hydration
            .apply(page.items, |draft| draft.set_loading(false));
        Ok(SyncOutcome {
            page: self.pagination.snapshot(),
            hydration,
        })
    }

    /// Fetches the current page. If the list shrank under it, falls back to
    /// the last page once.
    pub async fn refresh(&self) -> Result<SyncOutcome, SyncError> {
        let outcome = self.fetch_current().await?;
        match outcome.hydration {
            HydrationOutcome::OutOfRange {
                requested,
                last_page,
            } if requested != last_page => {
                self.pagination
                    .set_pagination(last_page as i64, outcome.page.limit as i64);
                self.fetch_current().await
            }
            _ => Ok(outcome),
        }
    }

    pub async fn next_page(&self) -> Result<SyncOutcome, SyncError> {
        self.ensure_session()?;
        self.pagination.go_to_next_page();
        self.refresh().await
    }

    pub async fn previous_page(&self) -> Result<SyncOutcome, SyncError> {
        self.ensure_session()?;
        self.pagination.go_to_previous_page();
        self.refresh().await
    }

    pub async fn go_to(&self, page: i64, limit: i64) -> Result<SyncOutcome, SyncError> {
        self.ensure_session()?;
        self.pagination.set_pagination(page, limit);
        self.refresh().await
    }

    async fn fetch_current(&self) -> Result<SyncOutcome, SyncError> {
        let pending = self.begin()?;
        let result = self
            .fetcher
            .fetch_entity_page(&pending.filters, pending.page, pending.limit)
            .await;
        self.complete(&pending, result)
    }

    fn ensure_session(&self) -> Result<(), SyncError> {
        if self.session.is_active() {
            Ok(())
        } else {
            Err(SyncError::NoActiveSession)
        }
    }
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
