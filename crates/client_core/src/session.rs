//! Authenticated-user signal fed by the external identity provider.

use shared::domain::UserId;
use tokio::sync::watch;
use tracing::info;

pub trait AuthSession: Send + Sync {
    fn is_active(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub access_token: Option<String>,
}

pub struct SessionState {
    current: watch::Sender<Option<AuthenticatedUser>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    pub fn sign_in(&self, user_id: UserId, access_token: Option<String>) {
        info!(user_id = %user_id, "session started");
        self.current.send_replace(Some(AuthenticatedUser {
            user_id,
            access_token,
        }));
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self.current.send_replace(None) {
            info!(user_id = %previous.user_id, "session ended");
        }
    }

    pub fn user(&self) -> Option<AuthenticatedUser> {
        self.current.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.current
            .borrow()
            .as_ref()
            .and_then(|user| user.access_token.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AuthenticatedUser>> {
        self.current.subscribe()
    }
}

impl AuthSession for SessionState {
    fn is_active(&self) -> bool {
        self.current.borrow().is_some()
    }
}
