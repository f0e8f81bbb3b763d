use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::{
    domain::{TeamId, TeamRole, TeamSummary, UserId},
    protocol::{EntityPage, ListFilters},
};

use crate::{hydration::Navigator, session::AuthSession, sync::EntityFetcher};

pub fn team(id: &str) -> TeamSummary {
    TeamSummary {
        team_id: TeamId::from(id),
        name: format!("Team {id}"),
        owner_id: UserId::from("owner-1"),
        role: TeamRole::Owner,
        created_at: Utc
            .with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub fn teams(ids: &[&str]) -> Vec<TeamSummary> {
    ids.iter().map(|id| team(id)).collect()
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().expect("navigator lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, path: &str) {
        self.routes
            .lock()
            .expect("navigator lock")
            .push(path.to_string());
    }
}

pub struct FixedSession(pub bool);

impl AuthSession for FixedSession {
    fn is_active(&self) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchCall {
    pub filters: ListFilters,
    pub page: u64,
    pub limit: u64,
}

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<EntityPage<TeamSummary>>>>,
    calls: Mutex<Vec<FetchCall>>,
}

impl ScriptedFetcher {
    pub fn with_pages(pages: Vec<EntityPage<TeamSummary>>) -> Arc<Self> {
        let fetcher = Self::default();
        fetcher
            .responses
            .lock()
            .expect("responses lock")
            .extend(pages.into_iter().map(Ok));
        Arc::new(fetcher)
    }

    pub fn push_failure(&self, message: &str) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Err(anyhow!(message.to_string())));
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl EntityFetcher<TeamSummary> for ScriptedFetcher {
    async fn fetch_entity_page(
        &self,
        filters: &ListFilters,
        page: u64,
        limit: u64,
    ) -> Result<EntityPage<TeamSummary>> {
        self.calls.lock().expect("calls lock").push(FetchCall {
            filters: filters.clone(),
            page,
            limit,
        });
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted response left")))
    }
}
