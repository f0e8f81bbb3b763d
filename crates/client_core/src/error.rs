use shared::error::ApiException;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("fetch #{token} was superseded by fetch #{latest}; result discarded")]
    StaleFetchResult { token: u64, latest: u64 },
    #[error("no active user session")]
    NoActiveSession,
    #[error("failed to fetch {kind} list: {source:#}")]
    Fetch {
        kind: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl SyncError {
    /// Stale results are dropped silently; nothing needs surfacing to the user.
    pub fn is_benign(&self) -> bool {
        matches!(self, SyncError::StaleFetchResult { .. })
    }

    pub fn requires_reauth(&self) -> bool {
        match self {
            SyncError::NoActiveSession => true,
            SyncError::Fetch { source, .. } => source
                .downcast_ref::<ApiException>()
                .is_some_and(ApiException::requires_reauth),
            SyncError::StaleFetchResult { .. } => false,
        }
    }
}
