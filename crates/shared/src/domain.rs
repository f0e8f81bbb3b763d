use std::{fmt, hash::Hash};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(TeamId);
id_newtype!(ProjectId);
id_newtype!(FormId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Team,
    Project,
    Form,
}

impl EntityKind {
    /// Collection path under the API base url.
    pub fn resource_path(self) -> &'static str {
        match self {
            EntityKind::Team => "teams",
            EntityKind::Project => "projects",
            EntityKind::Form => "forms",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Team => "team",
            EntityKind::Project => "project",
            EntityKind::Form => "form",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A record that can be listed, cached and selected by identifier.
pub trait Entity: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    const KIND: EntityKind;

    fn id(&self) -> &Self::Id;

    fn display_name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Owner,
    Admin,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    #[default]
    Draft,
    Published,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    #[serde(alias = "id")]
    pub team_id: TeamId,
    pub name: String,
    pub owner_id: UserId,
    #[serde(default = "default_team_role")]
    pub role: TeamRole,
    pub created_at: DateTime<Utc>,
}

fn default_team_role() -> TeamRole {
    TeamRole::Member
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    #[serde(alias = "id")]
    pub project_id: ProjectId,
    pub team_id: TeamId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSummary {
    #[serde(alias = "id")]
    pub form_id: FormId,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub status: FormStatus,
    #[serde(default)]
    pub submission_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Entity for TeamSummary {
    type Id = TeamId;

    const KIND: EntityKind = EntityKind::Team;

    fn id(&self) -> &TeamId {
        &self.team_id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Entity for ProjectSummary {
    type Id = ProjectId;

    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> &ProjectId {
        &self.project_id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Entity for FormSummary {
    type Id = FormId;

    const KIND: EntityKind = EntityKind::Form;

    fn id(&self) -> &FormId {
        &self.form_id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_summary_accepts_plain_id_field() {
        let team: TeamSummary = serde_json::from_str(
            r#"{"id":"t1","name":"Acme","owner_id":"u1","created_at":"2024-05-01T10:00:00Z"}"#,
        )
        .expect("decode team");
        assert_eq!(team.id(), &TeamId::from("t1"));
        assert_eq!(team.role, TeamRole::Member);
    }

    #[test]
    fn form_summary_defaults_status_and_submissions() {
        let form: FormSummary = serde_json::from_str(
            r#"{"form_id":"f9","project_id":"p1","name":"Survey","created_at":"2024-05-01T10:00:00Z"}"#,
        )
        .expect("decode form");
        assert_eq!(form.status, FormStatus::Draft);
        assert_eq!(form.submission_count, 0);
        assert_eq!(FormSummary::KIND.resource_path(), "forms");
    }
}
