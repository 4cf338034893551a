//! Ticket store tests — run against both store implementations.

use chrono::{NaiveDate, TimeZone, Utc};
use triage_core::{
    error::TriageError,
    store::{DelayHistoryEntry, MemoryTicketStore, SqliteTicketStore, TicketStore},
    ticket::{Severity, Ticket, TicketDraft, TicketStatus, TicketType},
};

fn stores() -> Vec<(&'static str, Box<dyn TicketStore>)> {
    let sqlite = SqliteTicketStore::in_memory().expect("in-memory store");
    sqlite.migrate().expect("migration");
    vec![
        ("memory", Box::new(MemoryTicketStore::new())),
        ("sqlite", Box::new(sqlite)),
    ]
}

fn ticket(issuer: &str) -> Ticket {
    let draft = TicketDraft {
        issuer_name: Some(issuer.into()),
        issuer_email: Some(format!("{}@example.com", issuer.to_lowercase().replace(' ', "."))),
        issuer_department: Some("Sales".into()),
        assignee_name: Some("Dana Scott".into()),
        assignee_email: Some("dana@example.com".into()),
        ticket_type: TicketType::Incident,
        severity: Severity::High,
        description: "shared drive unreachable since noon".into(),
        deadline: NaiveDate::from_ymd_opt(2026, 10, 1),
        project: Some("Atlas".into()),
    };
    Ticket::from_draft(&draft, Utc.with_ymd_and_hms(2026, 9, 20, 8, 30, 0).unwrap())
}

#[test]
fn tickets_round_trip_in_registration_order() {
    for (name, mut store) in stores() {
        let a = ticket("Zoe Adams");
        let b = ticket("Adam Young");
        store.insert(a.clone()).unwrap();
        store.insert(b.clone()).unwrap();

        assert_eq!(store.all().unwrap(), vec![a.clone(), b], "{name}");
        assert_eq!(store.get(&a.id).unwrap(), Some(a), "{name}");
        assert_eq!(store.get("nope").unwrap(), None, "{name}");
    }
}

#[test]
fn same_id_is_last_write_wins_in_place() {
    for (name, mut store) in stores() {
        let a = ticket("Zoe Adams");
        let b = ticket("Adam Young");
        store.insert(a.clone()).unwrap();
        store.insert(b.clone()).unwrap();

        let mut replaced = a.clone();
        replaced.description = "rewritten description text".into();
        store.insert(replaced.clone()).unwrap();

        let all = store.all().unwrap();
        assert_eq!(all.len(), 2, "{name}");
        assert_eq!(all[0], replaced, "{name}");
    }
}

#[test]
fn delay_fields_and_completion_are_persisted() {
    for (name, mut store) in stores() {
        let t = ticket("Zoe Adams");
        store.insert(t.clone()).unwrap();

        let on = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        store.update_delay(&t.id, 16, 1600.0, on).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 17, 0, 0).unwrap();
        assert!(store.complete(&t.id, at).unwrap(), "{name}");

        let got = store.get(&t.id).unwrap().unwrap();
        assert_eq!(got.delay_days, 16, "{name}");
        assert_eq!(got.total_delay_cost, 1600.0, "{name}");
        assert_eq!(got.last_calculated, Some(on), "{name}");
        assert_eq!(got.status, TicketStatus::Completed, "{name}");
        assert_eq!(got.completed_at, Some(at), "{name}");
    }
}

#[test]
fn unknown_ids_are_reported() {
    for (name, mut store) in stores() {
        let on = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let err = store.update_delay("ghost", 1, 1.0, on).unwrap_err();
        assert!(matches!(err, TriageError::TicketNotFound { .. }), "{name}");

        let entry = DelayHistoryEntry { recorded_at: Utc::now(), delay_days: 1, cost: 1.0 };
        let err = store.append_delay_history("ghost", entry).unwrap_err();
        assert!(matches!(err, TriageError::TicketNotFound { .. }), "{name}");

        assert!(!store.complete("ghost", Utc::now()).unwrap(), "{name}");
        assert!(!store.remove("ghost").unwrap(), "{name}");
        assert!(store.delay_history("ghost").unwrap().is_empty(), "{name}");
    }
}

#[test]
fn history_is_ordered_and_removed_with_ticket() {
    for (name, mut store) in stores() {
        let t = ticket("Zoe Adams");
        store.insert(t.clone()).unwrap();
        for day in 1..=3 {
            let entry = DelayHistoryEntry {
                recorded_at: Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap(),
                delay_days: day as i64,
                cost: 100.0 * day as f64,
            };
            store.append_delay_history(&t.id, entry).unwrap();
        }

        let costs: Vec<f64> = store.delay_history(&t.id).unwrap().iter().map(|h| h.cost).collect();
        assert_eq!(costs, vec![100.0, 200.0, 300.0], "{name}");

        assert!(store.remove(&t.id).unwrap(), "{name}");
        assert!(store.delay_history(&t.id).unwrap().is_empty(), "{name}");
        assert!(store.all().unwrap().is_empty(), "{name}");
    }
}

#[test]
fn sqlite_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tickets.db");
    let path = path.to_str().unwrap();
    let t = ticket("Zoe Adams");

    {
        let mut store = SqliteTicketStore::open(path).unwrap();
        store.migrate().unwrap();
        store.insert(t.clone()).unwrap();
    }

    let store = SqliteTicketStore::open(path).unwrap();
    store.migrate().unwrap();
    assert_eq!(store.get(&t.id).unwrap(), Some(t));
}
