use std::sync::Arc;

use anyhow::Result;
use shared::domain::{FormSummary, ProjectSummary, TeamSummary};
use tokio::sync::broadcast;
use tracing::debug;

pub mod config;
pub mod error;
pub mod hydration;
pub mod pagination;
pub mod session;
pub mod store;
pub mod sync;
pub mod transport;

pub use config::{load_settings, ClientSettings};
pub use error::SyncError;
pub use hydration::{HydrationController, HydrationOutcome, HydrationState, Navigator};
pub use pagination::{ClampPolicy, PageState, PaginationController};
pub use session::{AuthSession, SessionState};
pub use store::{ListSnapshot, ListSyncStore};
pub use sync::{EntityFetcher, FetchSequencer, ListSync, SyncOutcome};
pub use transport::HttpEntityFetcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Navigate { route: String },
    Error(String),
}

/// Publishes navigation requests as [`ClientEvent::Navigate`] for whatever
/// router the host application runs.
pub struct EventNavigator {
    events: broadcast::Sender<ClientEvent>,
}

impl EventNavigator {
    pub fn new(events: broadcast::Sender<ClientEvent>) -> Self {
        Self { events }
    }
}

impl Navigator for EventNavigator {
    fn navigate_to(&self, path: &str) {
        if self
            .events
            .send(ClientEvent::Navigate {
                route: path.to_string(),
            })
            .is_err()
        {
            debug!(route = path, "navigation requested with no listeners");
        }
    }
}

/// Everything one signed-in dashboard session owns: the session signal and a
/// list view per entity kind, all talking to the same backend.
pub struct DashboardSession {
    pub session: Arc<SessionState>,
    pub teams: ListSync<TeamSummary>,
    pub projects: ListSync<ProjectSummary>,
    pub forms: ListSync<FormSummary>,
    events: broadcast::Sender<ClientEvent>,
}

impl DashboardSession {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let session = Arc::new(SessionState::new());
        let fetcher = Arc::new(HttpEntityFetcher::from_settings(settings, session.clone())?);
        let (events, _) = broadcast::channel(64);
        let navigator: Arc<dyn Navigator> = Arc::new(EventNavigator::new(events.clone()));

        Ok(Self {
            teams: ListSync::<TeamSummary>::from_settings(
                settings,
                fetcher.clone(),
                session.clone(),
                navigator.clone(),
            ),
            projects: ListSync::<ProjectSummary>::from_settings(
                settings,
                fetcher.clone(),
                session.clone(),
                navigator.clone(),
            ),
            forms: ListSync::<FormSummary>::from_settings(
                settings,
                fetcher,
                session.clone(),
                navigator,
            ),
            session,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Reports a failure to event listeners unless it is a discarded stale
    /// result.
    pub fn report(&self, err: &SyncError) {
        if err.is_benign() {
            return;
        }
        let _ = self.events.send(ClientEvent::Error(err.to_string()));
    }
}

#[cfg(test)]
#[path = "tests/fixtures.rs"]
mod fixtures;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
