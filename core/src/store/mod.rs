//! Ticket persistence.
//!
//! RULE: Services reach tickets only through the `TicketStore` trait.
//! `MemoryTicketStore` lives for the process; `SqliteTicketStore` can be
//! file-backed or in-memory.

mod memory;
mod sqlite;

pub use memory::MemoryTicketStore;
pub use sqlite::SqliteTicketStore;

use crate::{
    error::TriageResult,
    ticket::Ticket,
    types::Money,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One recorded observation of a ticket's delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayHistoryEntry {
    pub recorded_at: DateTime<Utc>,
    pub delay_days:  i64,
    pub cost:        Money,
}

pub trait TicketStore: Send {
    /// Insert a ticket. An existing ticket with the same id is replaced
    /// in place (last write wins, original position kept).
    fn insert(&mut self, ticket: Ticket) -> TriageResult<()>;

    fn get(&self, ticket_id: &str) -> TriageResult<Option<Ticket>>;

    /// All tickets in registration order.
    fn all(&self) -> TriageResult<Vec<Ticket>>;

    /// Overwrite the computed delay fields of a ticket.
    fn update_delay(
        &mut self,
        ticket_id: &str,
        delay_days: i64,
        total_delay_cost: Money,
        calculated_on: NaiveDate,
    ) -> TriageResult<()>;

    /// Mark completed. Returns false if the ticket is unknown.
    fn complete(&mut self, ticket_id: &str, at: DateTime<Utc>) -> TriageResult<bool>;

    /// Delete a ticket and its delay history. Returns false if unknown.
    fn remove(&mut self, ticket_id: &str) -> TriageResult<bool>;

    fn append_delay_history(&mut self, ticket_id: &str, entry: DelayHistoryEntry) -> TriageResult<()>;

    /// Oldest first; empty for unknown tickets.
    fn delay_history(&self, ticket_id: &str) -> TriageResult<Vec<DelayHistoryEntry>>;
}
