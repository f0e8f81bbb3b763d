//! HTTP implementation of [`EntityFetcher`] against the dashboard API.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{Entity, EntityKind, ProjectId, TeamId},
    error::{ApiError, ApiException},
    protocol::{EntityPage, ListFilters, SortOrder},
};
use tracing::debug;
use url::Url;

use crate::{config::ClientSettings, session::SessionState, sync::EntityFetcher};

#[derive(Debug, Serialize)]
struct ListEntitiesQuery<'a> {
    page: u64,
    limit: u64,
    order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    team_id: Option<&'a TeamId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<&'a ProjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

pub struct HttpEntityFetcher {
    http: Client,
    base_url: Url,
    session: Arc<SessionState>,
}

impl HttpEntityFetcher {
    pub fn new(base_url: &str, session: Arc<SessionState>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
            session,
        })
    }

    pub fn from_settings(settings: &ClientSettings, session: Arc<SessionState>) -> Result<Self> {
        Self::new(
            &settings.api_base_url,
            session,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, kind: EntityKind) -> Result<Url> {
        self.base_url
            .join(kind.resource_path())
            .with_context(|| format!("invalid {kind} endpoint under '{}'", self.base_url))
    }
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&with_slash).with_context(|| format!("invalid api base url '{raw}'"))
}

#[async_trait]
impl<T> EntityFetcher<T> for HttpEntityFetcher
where
    T: Entity + DeserializeOwned,
{
    async fn fetch_entity_page(
        &self,
        filters: &ListFilters,
        page: u64,
        limit: u64,
    ) -> Result<EntityPage<T>> {
        let url = self.endpoint(T::KIND)?;
        let query = ListEntitiesQuery {
            page,
            limit,
            order: filters.order,
            team_id: filters.team_id.as_ref(),
            project_id: filters.project_id.as_ref(),
            search: filters.search.as_deref(),
        };

        let mut request = self.http.get(url.clone()).query(&query);
        if let Some(token) = self.session.access_token() {
            request = request.bearer_auth(token);
        }

        let res = request
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let api_error = serde_json::from_str::<ApiError>(&body).ok();
            return Err(ApiException::from_body(status.as_u16(), api_error).into());
        }

        let page: EntityPage<T> = res
            .json()
            .await
            .with_context(|| format!("malformed {} page from {url}", T::KIND))?;
        debug!(
            kind = T::KIND.label(),
            received = page.items.len(),
            total_items = page.total_items,
            "fetched list page"
        );
        Ok(page)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
