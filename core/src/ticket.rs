//! Ticket records — the draft handed in by the submission form and the
//! registered ticket owned by the store.

use crate::{
    error::{TriageError, TriageResult},
    types::{ManagerKey, Money, TicketId},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketType {
    #[default]
    Bug,
    #[serde(rename = "Feature Request")]
    FeatureRequest,
    Incident,
    Task,
    Other,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bug            => "Bug",
            Self::FeatureRequest => "Feature Request",
            Self::Incident       => "Incident",
            Self::Task           => "Task",
            Self::Other          => "Other",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketType {
    type Err = TriageError;

    fn from_str(s: &str) -> TriageResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "bug" => Ok(Self::Bug),
            "feature request" | "feature_request" => Ok(Self::FeatureRequest),
            "incident" => Ok(Self::Incident),
            "task" => Ok(Self::Task),
            "other" => Ok(Self::Other),
            _ => Err(TriageError::InvalidField {
                field: "ticket_type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low      => "Low",
            Self::Medium   => "Medium",
            Self::High     => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = TriageError;

    fn from_str(s: &str) -> TriageResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(TriageError::InvalidField {
                field: "severity",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Active,
    Completed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active    => "active",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = TriageError;

    fn from_str(s: &str) -> TriageResult<Self> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(TriageError::InvalidField {
                field: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// Form data as submitted for triage. Blank strings count as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketDraft {
    pub issuer_name:       Option<String>,
    pub issuer_email:      Option<String>,
    pub issuer_department: Option<String>,
    pub assignee_name:     Option<String>,
    pub assignee_email:    Option<String>,
    pub ticket_type:       TicketType,
    pub severity:          Severity,
    pub description:       String,
    pub deadline:          Option<NaiveDate>,
    pub project:           Option<String>,
}

impl TicketDraft {
    pub fn issuer_name(&self) -> Option<&str> {
        non_blank(&self.issuer_name)
    }

    pub fn issuer_email(&self) -> Option<&str> {
        non_blank(&self.issuer_email)
    }

    pub fn assignee_name(&self) -> Option<&str> {
        non_blank(&self.assignee_name)
    }

    pub fn assignee_email(&self) -> Option<&str> {
        non_blank(&self.assignee_email)
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

/// A ticket registered for cost-of-delay tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id:                TicketId,
    pub issuer_name:       String,
    pub issuer_email:      Option<String>,
    pub issuer_department: Option<String>,
    pub assignee_name:     String,
    pub assignee_email:    Option<String>,
    pub ticket_type:       TicketType,
    pub severity:          Severity,
    pub description:       String,
    pub deadline:          Option<NaiveDate>,
    pub project:           Option<String>,
    pub status:            TicketStatus,
    pub created_at:        DateTime<Utc>,
    pub completed_at:      Option<DateTime<Utc>>,
    pub delay_days:        i64,
    pub total_delay_cost:  Money,
    pub last_calculated:   Option<NaiveDate>,
}

impl Ticket {
    pub fn from_draft(draft: &TicketDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: generate_ticket_id(draft.issuer_name(), created_at),
            issuer_name: draft.issuer_name().unwrap_or_default().to_string(),
            issuer_email: draft.issuer_email().map(String::from),
            issuer_department: non_blank(&draft.issuer_department).map(String::from),
            assignee_name: draft.assignee_name().unwrap_or_default().to_string(),
            assignee_email: draft.assignee_email().map(String::from),
            ticket_type: draft.ticket_type,
            severity: draft.severity,
            description: draft.description.clone(),
            deadline: draft.deadline,
            project: non_blank(&draft.project).map(String::from),
            status: TicketStatus::Active,
            created_at,
            completed_at: None,
            delay_days: 0,
            total_delay_cost: 0.0,
            last_calculated: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TicketStatus::Active
    }

    /// Costs are reported to the issuer: keyed by email, else by name.
    pub fn manager_key(&self) -> ManagerKey {
        match self.issuer_email.as_deref() {
            Some(email) if !email.is_empty() => email.to_string(),
            _ => self.issuer_name.clone(),
        }
    }
}

/// `<issuer without whitespace>_<unix millis>_<random suffix>`.
///
/// The suffix keeps two tickets from the same issuer in the same
/// millisecond apart.
pub fn generate_ticket_id(issuer_name: Option<&str>, created_at: DateTime<Utc>) -> TicketId {
    let issuer: String = issuer_name
        .unwrap_or("unknown")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{issuer}_{}_{}", created_at.timestamp_millis(), &suffix[..8])
}
