use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ASSIGNEE: &str = "GRC Team";

/// GRC project row of `projects.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub project_name: String,
    pub compliance: String,
    pub risk_level: String,
    pub status: String,
    pub last_audit: NaiveDate,
    pub assigned_to: String,
}

/// Body of `POST /api/projects`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub compliance: String,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_audit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

/// Body of `PUT /api/projects/:id`.
///
/// `lastAudit` follows "blank keeps the old value"; the string fields
/// only change when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_audit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl NewProject {
    /// Names of required fields that are missing or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("projectName", &self.project_name),
            ("compliance", &self.compliance),
            ("riskLevel", &self.risk_level),
            ("status", &self.status),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Parse a `YYYY-MM-DD` audit date. Blank input yields `None`.
pub fn parse_audit_date(raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("lastAudit must be a YYYY-MM-DD date, got '{}'", value)),
    }
}

impl Project {
    pub fn apply(&mut self, patch: ProjectPatch, last_audit: Option<NaiveDate>) {
        if let Some(v) = patch.project_name {
            self.project_name = v;
        }
        if let Some(v) = patch.compliance {
            self.compliance = v;
        }
        if let Some(v) = patch.risk_level {
            self.risk_level = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(date) = last_audit {
            self.last_audit = date;
        }
        if let Some(v) = patch.assigned_to {
            self.assigned_to = v;
        }
    }
}
