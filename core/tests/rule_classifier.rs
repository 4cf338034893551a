//! Rule-based classifier tests — completeness, discard, forwarding,
//! urgency and default routing.

use chrono::{Days, NaiveDate};
use triage_core::{
    config::TriageConfig,
    rules::{Action, RuleClassifier, Team},
    ticket::{Severity, TicketDraft},
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

fn classifier() -> RuleClassifier {
    RuleClassifier::new(&TriageConfig::default_test())
}

/// A draft that passes the completeness check and matches no keyword.
fn complete_draft(description: &str) -> TicketDraft {
    TicketDraft {
        issuer_name: Some("Laura Lee".into()),
        issuer_email: Some("laura.lee@example.com".into()),
        issuer_department: Some("Ops".into()),
        assignee_name: Some("Bob Harris".into()),
        assignee_email: Some("bob.harris@example.com".into()),
        description: description.into(),
        deadline: today().checked_add_days(Days::new(30)),
        ..Default::default()
    }
}

const NEUTRAL: &str = "printer on floor three keeps jamming";

#[test]
fn empty_draft_lists_every_missing_field_in_order() {
    let result = classifier().classify(&TicketDraft::default(), today());
    assert_eq!(result.action, Action::NeedMoreInfo);
    assert_eq!(
        result.reasons,
        vec![
            "Missing issuer name.",
            "Missing issued to field.",
            "Missing issued to email.",
            "Missing issuer contact (email).",
            "Description too short; please provide reproduction steps and expected behaviour.",
            "Missing deadline.",
        ]
    );
    assert_eq!(result.forward_to, None);
    assert_eq!(result.discard_reason, None);
}

#[test]
fn only_violated_fields_are_reported() {
    let mut draft = complete_draft(NEUTRAL);
    draft.assignee_email = Some("   ".into());
    draft.deadline = None;

    let result = classifier().classify(&draft, today());
    assert_eq!(result.action, Action::NeedMoreInfo);
    assert_eq!(result.reasons, vec!["Missing issued to email.", "Missing deadline."]);
}

#[test]
fn description_length_is_measured_after_trimming() {
    // Sixteen visible characters padded with whitespace.
    let draft = complete_draft("   nineteen chars!!       ");
    let result = classifier().classify(&draft, today());
    assert_eq!(result.action, Action::NeedMoreInfo);
    assert_eq!(result.reasons.len(), 1);

    let ok = complete_draft("twenty characters!!!");
    assert_ne!(classifier().classify(&ok, today()).action, Action::NeedMoreInfo);
}

#[test]
fn spam_is_discarded_without_a_team() {
    let mut draft = complete_draft("please ignore, this is a dummy entry");
    draft.severity = Severity::High;

    let result = classifier().classify(&draft, today());
    assert_eq!(result.action, Action::Discard);
    assert_eq!(result.forward_to, None);
    assert_eq!(
        result.discard_reason.as_deref(),
        Some("Content appears to be spam or a test ticket.")
    );
}

#[test]
fn low_priority_feature_request_needs_low_severity() {
    let text = "feature request for later: dark mode toggle";

    let mut low = complete_draft(text);
    low.severity = Severity::Low;
    let result = classifier().classify(&low, today());
    assert_eq!(result.action, Action::Discard);
    assert_eq!(
        result.discard_reason.as_deref(),
        Some("Low priority feature request better tracked in product backlog.")
    );

    let medium = complete_draft(text);
    let result = classifier().classify(&medium, today());
    assert_eq!(result.action, Action::Forward);
    assert_eq!(result.forward_to, Some(Team::Product));
}

#[test]
fn discard_reasons_are_concatenated() {
    let mut draft = complete_draft("ignore this wish list item please");
    draft.severity = Severity::Low;

    let result = classifier().classify(&draft, today());
    assert_eq!(result.action, Action::Discard);
    assert_eq!(
        result.discard_reason.as_deref(),
        Some(
            "Content appears to be spam or a test ticket. \
             Low priority feature request better tracked in product backlog."
        )
    );
}

#[test]
fn discard_takes_priority_over_keywords() {
    let result = classifier().classify(&complete_draft("test ticket for the api gateway"), today());
    assert_eq!(result.action, Action::Discard);
    assert_eq!(result.forward_to, None);
}

#[test]
fn first_team_in_table_order_wins() {
    // Matches both Frontend (react) and Backend (api).
    let result = classifier().classify(&complete_draft("the react page calls the api slowly"), today());
    assert_eq!(result.action, Action::Forward);
    assert_eq!(result.forward_to, Some(Team::Frontend));
    assert_eq!(result.reasons, vec!["Matches keywords for Frontend team."]);
}

#[test]
fn keywords_route_to_their_teams() {
    let cases = [
        ("Checkout endpoint returns 500 from SERVER", Team::Backend),
        ("kubernetes rollout stuck on pending", Team::Infrastructure),
        ("possible xss in comment field", Team::Security),
        ("nightly etl job skipped rows", Team::Data),
        ("enhancement: bulk edit for invoices", Team::Product),
    ];
    for (text, team) in cases {
        let result = classifier().classify(&complete_draft(text), today());
        assert_eq!(result.forward_to, Some(team), "{text}");
        assert_eq!(result.reasons.len(), 1);
    }
}

#[test]
fn critical_without_keywords_goes_to_triage() {
    let mut draft = complete_draft("random unrelated issue");
    draft.severity = Severity::Critical;

    let result = classifier().classify(&draft, today());
    assert_eq!(result.action, Action::Forward);
    assert_eq!(result.forward_to, Some(Team::Triage));
    assert_eq!(
        result.reasons,
        vec!["Marked as Critical.", "Recommend urgent review by Triage team."]
    );
}

#[test]
fn close_deadline_triggers_urgent_review() {
    let mut draft = complete_draft(NEUTRAL);
    draft.deadline = today().checked_add_days(Days::new(2));

    let result = classifier().classify(&draft, today());
    assert_eq!(result.forward_to, Some(Team::Triage));
    assert_eq!(
        result.reasons,
        vec!["Deadline within 2 day(s).", "Recommend urgent review by Triage team."]
    );
}

#[test]
fn urgency_window_is_inclusive() {
    let mut at_edge = complete_draft(NEUTRAL);
    at_edge.deadline = today().checked_add_days(Days::new(3));
    let result = classifier().classify(&at_edge, today());
    assert_eq!(result.reasons[0], "Deadline within 3 day(s).");

    let mut outside = complete_draft(NEUTRAL);
    outside.deadline = today().checked_add_days(Days::new(4));
    let result = classifier().classify(&outside, today());
    assert_eq!(result.reasons.len(), 1, "expected default routing: {:?}", result.reasons);
}

#[test]
fn past_deadline_counts_as_urgent() {
    let mut draft = complete_draft(NEUTRAL);
    draft.deadline = today().checked_sub_days(Days::new(5));

    let result = classifier().classify(&draft, today());
    assert_eq!(result.reasons[0], "Deadline within -5 day(s).");
}

#[test]
fn unmatched_tickets_default_to_triage() {
    let result = classifier().classify(&complete_draft(NEUTRAL), today());
    assert_eq!(result.action, Action::Forward);
    assert_eq!(result.forward_to, Some(Team::Triage));
    assert_eq!(
        result.reasons,
        vec!["No clear specialized team match; route to Triage team for prioritization."]
    );
}

#[test]
fn classification_is_deterministic() {
    let draft = complete_draft("possible xss in comment field");
    let a = classifier().classify(&draft, today());
    let b = classifier().classify(&draft, today());
    assert_eq!(a, b);
}

#[test]
fn minimum_description_length_is_configurable() {
    let config = TriageConfig { min_description_len: 40, ..TriageConfig::default_test() };
    let result = RuleClassifier::new(&config).classify(&complete_draft(NEUTRAL), today());
    assert_eq!(result.action, Action::NeedMoreInfo);
}
