//! Rule-based triage classifier.
//!
//! PRIORITY CHAIN (fixed, each stage short-circuits the next):
//!   1. Completeness check  → NeedMoreInfo
//!   2. Discard heuristics  → Discard
//!   3. Keyword forwarding  → Forward to first matching team
//!   4. Urgency fallback    → Forward (Frontend / Backend / Triage)
//!   5. Default             → Forward to Triage
//!
//! Classification never fails: every draft gets a result.

use crate::{
    clock::days_between,
    config::TriageConfig,
    ticket::{Severity, TicketDraft},
};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Frontend,
    Backend,
    Infrastructure,
    Security,
    Data,
    Product,
    Triage,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frontend       => "Frontend",
            Self::Backend        => "Backend",
            Self::Infrastructure => "Infrastructure",
            Self::Security       => "Security",
            Self::Data           => "Data",
            Self::Product        => "Product",
            Self::Triage         => "Triage",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    NeedMoreInfo,
    Discard,
    Forward,
}

impl Action {
    /// Human-facing label shown next to the result.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NeedMoreInfo => "Need more information",
            Self::Discard      => "Discard",
            Self::Forward      => "Forward",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub action:         Action,
    pub reasons:        Vec<String>,
    pub discard_reason: Option<String>,
    pub forward_to:     Option<Team>,
}

impl ClassificationResult {
    fn need_more_info(reasons: Vec<String>) -> Self {
        Self { action: Action::NeedMoreInfo, reasons, discard_reason: None, forward_to: None }
    }

    fn discard(reasons: Vec<String>) -> Self {
        let discard_reason = Some(reasons.join(" "));
        Self { action: Action::Discard, reasons, discard_reason, forward_to: None }
    }

    fn forward(team: Team, reasons: Vec<String>) -> Self {
        Self { action: Action::Forward, reasons, discard_reason: None, forward_to: Some(team) }
    }
}

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    }
}

static SPAM_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"spam|test ticket|ignore|dummy"));
static LOW_PRIORITY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"feature request.*later|low priority|wish list"));

// Table order is the match priority.
static TEAM_RULES: LazyLock<Vec<(Team, Regex)>> = LazyLock::new(|| {
    vec![
        (Team::Frontend,       compile(r"frontend|ui|ux|css|html|javascript|react|angular|vue")),
        (Team::Backend,        compile(r"backend|server|api|database|sql|node|python|java|go|dotnet")),
        (Team::Infrastructure, compile(r"deploy|infrastructure|k8s|kubernetes|aws|azure|gcp|performance|latency")),
        (Team::Security,       compile(r"security|vulnerability|xss|sql injection|sqli|auth|authorization|cve")),
        (Team::Data,           compile(r"data|etl|warehouse|analytics|ml|model|dataset")),
        (Team::Product,        compile(r"feature request|enhancement|improvement|product request")),
    ]
});

static URGENT_FRONTEND_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"frontend|ui|ux"));
static URGENT_BACKEND_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"backend|api|database"));

pub struct RuleClassifier {
    min_description_len: usize,
    urgency_window_days: i64,
}

impl RuleClassifier {
    pub fn new(config: &TriageConfig) -> Self {
        Self {
            min_description_len: config.min_description_len,
            urgency_window_days: config.urgency_window_days,
        }
    }

    /// Classify `draft` as of `today`.
    pub fn classify(&self, draft: &TicketDraft, today: NaiveDate) -> ClassificationResult {
        let missing = self.missing_info(draft);
        if !missing.is_empty() {
            log::debug!("classify: {} completeness issue(s)", missing.len());
            return ClassificationResult::need_more_info(missing);
        }

        let desc = draft.description.to_lowercase();

        let discard_reasons = discard_reasons(&desc, draft.severity);
        if !discard_reasons.is_empty() {
            return ClassificationResult::discard(discard_reasons);
        }

        if let Some(team) = keyword_team(&desc, draft) {
            return ClassificationResult::forward(
                team,
                vec![format!("Matches keywords for {team} team.")],
            );
        }

        let days_until = draft.deadline.map(|d| days_between(today, d));
        let deadline_close = days_until.is_some_and(|d| d <= self.urgency_window_days);
        if draft.severity == Severity::Critical || deadline_close {
            let team = if URGENT_FRONTEND_RE.is_match(&desc) {
                Team::Frontend
            } else if URGENT_BACKEND_RE.is_match(&desc) {
                Team::Backend
            } else {
                Team::Triage
            };
            let trigger = if draft.severity == Severity::Critical {
                "Marked as Critical.".to_string()
            } else {
                format!("Deadline within {} day(s).", days_until.unwrap_or_default())
            };
            return ClassificationResult::forward(
                team,
                vec![trigger, format!("Recommend urgent review by {team} team.")],
            );
        }

        ClassificationResult::forward(
            Team::Triage,
            vec!["No clear specialized team match; route to Triage team for prioritization.".into()],
        )
    }

    /// One reason per missing or invalid field, in fixed field order.
    pub fn missing_info(&self, draft: &TicketDraft) -> Vec<String> {
        let mut reasons = Vec::new();
        if draft.issuer_name().is_none() {
            reasons.push("Missing issuer name.".to_string());
        }
        if draft.assignee_name().is_none() {
            reasons.push("Missing issued to field.".to_string());
        }
        if draft.assignee_email().is_none() {
            reasons.push("Missing issued to email.".to_string());
        }
        if draft.issuer_email().is_none() {
            reasons.push("Missing issuer contact (email).".to_string());
        }
        if draft.description.trim().chars().count() < self.min_description_len {
            reasons.push(
                "Description too short; please provide reproduction steps and expected behaviour."
                    .to_string(),
            );
        }
        if draft.deadline.is_none() {
            reasons.push("Missing deadline.".to_string());
        }
        reasons
    }
}

fn discard_reasons(desc: &str, severity: Severity) -> Vec<String> {
    let mut reasons = Vec::new();
    if SPAM_RE.is_match(desc) {
        reasons.push("Content appears to be spam or a test ticket.".to_string());
    }
    if severity == Severity::Low && LOW_PRIORITY_RE.is_match(desc) {
        reasons.push("Low priority feature request better tracked in product backlog.".to_string());
    }
    reasons
}

fn keyword_team(desc: &str, draft: &TicketDraft) -> Option<Team> {
    let declared = draft.ticket_type.as_str();
    TEAM_RULES
        .iter()
        .find(|(team, re)| re.is_match(desc) || declared.eq_ignore_ascii_case(team.as_str()))
        .map(|(team, _)| *team)
}
