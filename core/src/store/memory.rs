use super::{DelayHistoryEntry, TicketStore};
use crate::{
    error::{TriageError, TriageResult},
    ticket::{Ticket, TicketStatus},
    types::{Money, TicketId},
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

/// Process-lifetime ticket store backed by hash maps.
#[derive(Debug, Default)]
pub struct MemoryTicketStore {
    order:   Vec<TicketId>,
    tickets: HashMap<TicketId, Ticket>,
    history: HashMap<TicketId, Vec<DelayHistoryEntry>>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ticket_mut(&mut self, ticket_id: &str) -> TriageResult<&mut Ticket> {
        self.tickets
            .get_mut(ticket_id)
            .ok_or_else(|| TriageError::TicketNotFound { ticket_id: ticket_id.to_string() })
    }
}

impl TicketStore for MemoryTicketStore {
    fn insert(&mut self, ticket: Ticket) -> TriageResult<()> {
        if !self.tickets.contains_key(&ticket.id) {
            self.order.push(ticket.id.clone());
        }
        self.tickets.insert(ticket.id.clone(), ticket);
        Ok(())
    }

    fn get(&self, ticket_id: &str) -> TriageResult<Option<Ticket>> {
        Ok(self.tickets.get(ticket_id).cloned())
    }

    fn all(&self) -> TriageResult<Vec<Ticket>> {
        Ok(self
            .order
            .iter()
            .filter_map(|id| self.tickets.get(id).cloned())
            .collect())
    }

    fn update_delay(
        &mut self,
        ticket_id: &str,
        delay_days: i64,
        total_delay_cost: Money,
        calculated_on: NaiveDate,
    ) -> TriageResult<()> {
        let ticket = self.ticket_mut(ticket_id)?;
        ticket.delay_days = delay_days;
        ticket.total_delay_cost = total_delay_cost;
        ticket.last_calculated = Some(calculated_on);
        Ok(())
    }

    fn complete(&mut self, ticket_id: &str, at: DateTime<Utc>) -> TriageResult<bool> {
        let Some(ticket) = self.tickets.get_mut(ticket_id) else {
            return Ok(false);
        };
        ticket.status = TicketStatus::Completed;
        ticket.completed_at = Some(at);
        Ok(true)
    }

    fn remove(&mut self, ticket_id: &str) -> TriageResult<bool> {
        self.history.remove(ticket_id);
        if self.tickets.remove(ticket_id).is_none() {
            return Ok(false);
        }
        self.order.retain(|id| id != ticket_id);
        Ok(true)
    }

    fn append_delay_history(&mut self, ticket_id: &str, entry: DelayHistoryEntry) -> TriageResult<()> {
        if !self.tickets.contains_key(ticket_id) {
            return Err(TriageError::TicketNotFound { ticket_id: ticket_id.to_string() });
        }
        self.history.entry(ticket_id.to_string()).or_default().push(entry);
        Ok(())
    }

    fn delay_history(&self, ticket_id: &str) -> TriageResult<Vec<DelayHistoryEntry>> {
        Ok(self.history.get(ticket_id).cloned().unwrap_or_default())
    }
}
