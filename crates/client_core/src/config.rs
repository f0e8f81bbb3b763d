use std::{fs, path::Path};

use serde::Deserialize;
use shared::domain::EntityKind;
use tracing::warn;

use crate::pagination::{ClampPolicy, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub const DEFAULT_SETTINGS_FILE: &str = "escape_form.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BootstrapRoutes {
    pub create_team: String,
    pub create_project: String,
    pub create_form: String,
}

impl Default for BootstrapRoutes {
    fn default() -> Self {
        Self {
            create_team: "/teams/new".into(),
            create_project: "/projects/new".into(),
            create_form: "/forms/new".into(),
        }
    }
}

impl BootstrapRoutes {
    pub fn for_kind(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Team => &self.create_team,
            EntityKind::Project => &self.create_project,
            EntityKind::Form => &self.create_form,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub clamp_policy: ClampPolicy,
    pub auto_select_first: bool,
    pub request_timeout_secs: u64,
    pub routes: BootstrapRoutes,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000/api/".into(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            clamp_policy: ClampPolicy::Preserve,
            auto_select_first: false,
            request_timeout_secs: 15,
            routes: BootstrapRoutes::default(),
        }
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file if it exists, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> ClientSettings {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => match toml::from_str::<ClientSettings>(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(path = %path.display(), "ignoring malformed settings file: {err}");
                ClientSettings::default()
            }
        },
        Err(_) => ClientSettings::default(),
    };

    apply_env_overrides(&mut settings, env);
    normalize(&mut settings);
    settings
}

fn apply_env_overrides(settings: &mut ClientSettings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("ESCAPE_FORM_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = parse_env(&env, "APP__DEFAULT_PAGE_SIZE") {
        settings.default_page_size = v;
    }
    if let Some(v) = parse_env(&env, "APP__MAX_PAGE_SIZE") {
        settings.max_page_size = v;
    }
    if let Some(v) = parse_env(&env, "APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = parse_env(&env, "APP__AUTO_SELECT_FIRST") {
        settings.auto_select_first = v;
    }

    if let Some(v) = env("APP__CLAMP_POLICY") {
        match v.trim().to_ascii_lowercase().as_str() {
            "preserve" => settings.clamp_policy = ClampPolicy::Preserve,
            "clamp_to_last" => settings.clamp_policy = ClampPolicy::ClampToLast,
            other => warn!(value = other, "unknown APP__CLAMP_POLICY"),
        }
    }

    if let Some(v) = env("APP__ROUTES__CREATE_TEAM") {
        settings.routes.create_team = v;
    }
    if let Some(v) = env("APP__ROUTES__CREATE_PROJECT") {
        settings.routes.create_project = v;
    }
    if let Some(v) = env("APP__ROUTES__CREATE_FORM") {
        settings.routes.create_form = v;
    }
}

fn parse_env<V: std::str::FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<V> {
    let raw = env(key)?;
    match raw.trim().parse::<V>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

fn normalize(settings: &mut ClientSettings) {
    settings.max_page_size = settings.max_page_size.max(1);
    settings.default_page_size = settings
        .default_page_size
        .clamp(1, settings.max_page_size);
    if settings.api_base_url.trim().is_empty() {
        settings.api_base_url = ClientSettings::default().api_base_url;
    }
    if settings.request_timeout_secs == 0 {
        settings.request_timeout_secs = ClientSettings::default().request_timeout_secs;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
