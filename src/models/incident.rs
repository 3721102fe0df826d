//! Incident (occurrence report) models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Incident severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Baixa,
    Media,
    Alta,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baixa => "baixa",
            Self::Media => "media",
            Self::Alta => "alta",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "baixa" => Some(Self::Baixa),
            "media" => Some(Self::Media),
            "alta" => Some(Self::Alta),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Incident workflow status. Any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Nova,
    EmAndamento,
    Resolvida,
    Cancelada,
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 4] = [
        Self::Nova,
        Self::EmAndamento,
        Self::Resolvida,
        Self::Cancelada,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nova => "nova",
            Self::EmAndamento => "em_andamento",
            Self::Resolvida => "resolvida",
            Self::Cancelada => "cancelada",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "nova" => Some(Self::Nova),
            "em_andamento" => Some(Self::EmAndamento),
            "resolvida" => Some(Self::Resolvida),
            "cancelada" => Some(Self::Cancelada),
            _ => None,
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A filed occurrence report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Incident {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Category tag.
    #[serde(rename = "type")]
    pub category: String,
    /// Location tag (apartment).
    pub location: String,
    /// Involved-party tag (block).
    pub people_involved: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    /// Owner identifier. Never changes after creation.
    pub created_by: Uuid,
    pub created_by_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments_count: u64,
    pub files_count: u64,
}

/// Incident creation request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateIncidentRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub category: String,
    pub location: String,
    pub people_involved: String,
    pub severity: Severity,
}

/// Partial field edit. Absent or null fields keep their prior value; a
/// `status` key in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct IncidentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub location: Option<String>,
    pub people_involved: Option<String>,
    pub severity: Option<Severity>,
}

impl IncidentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.location.is_none()
            && self.people_involved.is_none()
            && self.severity.is_none()
    }

    /// Apply the supplied fields to an incident in place.
    pub fn apply_to(&self, incident: &mut Incident) {
        if let Some(ref v) = self.title {
            incident.title = v.clone();
        }
        if let Some(ref v) = self.description {
            incident.description = v.clone();
        }
        if let Some(ref v) = self.category {
            incident.category = v.clone();
        }
        if let Some(ref v) = self.location {
            incident.location = v.clone();
        }
        if let Some(ref v) = self.people_involved {
            incident.people_involved = v.clone();
        }
        if let Some(v) = self.severity {
            incident.severity = v;
        }
    }
}

/// Status transition request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    pub status: IncidentStatus,
}
