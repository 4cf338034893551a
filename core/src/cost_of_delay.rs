//! Cost-of-delay service.
//!
//! For every active ticket past its deadline:
//!   days_overdue = today − deadline          (whole calendar days)
//!   delay_cost   = daily_cost(assignee) × days_overdue
//!
//! Costs are recomputed from scratch on every call and written back to
//! the store, so stored delay fields never drift from their inputs.
//! Overdue tickets are grouped by manager (the issuer), keyed by issuer
//! email with the issuer name as fallback, in first-seen order.

use crate::{
    clock::{days_between, Clock},
    error::TriageResult,
    notify::{Notification, NotificationSink},
    salary::SalaryLookup,
    store::{DelayHistoryEntry, TicketStore},
    ticket::{Ticket, TicketDraft},
    types::{ManagerKey, Money, TicketId},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueTicket {
    #[serde(flatten)]
    pub ticket:     Ticket,
    pub daily_cost: Money,
    pub delay_cost: Money,
}

/// One line of a manager's report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerTicketCost {
    pub ticket_id:   TicketId,
    pub issued_to:   String,
    pub delay_days:  i64,
    pub daily_cost:  Money,
    pub delay_cost:  Money,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerCost {
    pub manager_name:  String,
    pub manager_email: Option<String>,
    pub total_cost:    Money,
    pub tickets:       Vec<ManagerTicketCost>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub overdue_tickets: Vec<OverdueTicket>,
    pub manager_costs:   Vec<ManagerCost>,
    pub total_cost:      Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueRun {
    pub cost_data:     CostReport,
    pub notifications: Vec<Notification>,
}

pub struct CostOfDelayService {
    store:    Box<dyn TicketStore>,
    salaries: Box<dyn SalaryLookup>,
    clock:    Box<dyn Clock>,
    sink:     Box<dyn NotificationSink>,
}

impl CostOfDelayService {
    pub fn new(
        store: Box<dyn TicketStore>,
        salaries: Box<dyn SalaryLookup>,
        clock: Box<dyn Clock>,
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        Self { store, salaries, clock, sink }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // ── Ticket lifecycle ───────────────────────────────────────

    /// Register a ticket for tracking. Returns its generated id.
    pub fn add_ticket(&mut self, draft: &TicketDraft) -> TriageResult<TicketId> {
        let ticket = Ticket::from_draft(draft, self.clock.now());
        let ticket_id = ticket.id.clone();
        self.store.insert(ticket)?;
        log::info!("Ticket {ticket_id} added to cost tracking");
        Ok(ticket_id)
    }

    pub fn get_ticket(&self, ticket_id: &str) -> TriageResult<Option<Ticket>> {
        self.store.get(ticket_id)
    }

    pub fn all_tickets(&self) -> TriageResult<Vec<Ticket>> {
        self.store.all()
    }

    /// Returns false when the ticket is unknown.
    pub fn complete_ticket(&mut self, ticket_id: &str) -> TriageResult<bool> {
        let done = self.store.complete(ticket_id, self.clock.now())?;
        if !done {
            log::warn!("Attempted to complete unknown ticket {ticket_id}");
        }
        Ok(done)
    }

    /// Stop tracking a ticket and drop its delay history.
    pub fn remove_ticket(&mut self, ticket_id: &str) -> TriageResult<bool> {
        self.store.remove(ticket_id)
    }

    pub fn update_delay_history(
        &mut self,
        ticket_id: &str,
        delay_days: i64,
        cost: Money,
    ) -> TriageResult<()> {
        let entry = DelayHistoryEntry {
            recorded_at: self.clock.now(),
            delay_days,
            cost,
        };
        self.store.append_delay_history(ticket_id, entry)
    }

    pub fn delay_history(&self, ticket_id: &str) -> TriageResult<Vec<DelayHistoryEntry>> {
        self.store.delay_history(ticket_id)
    }

    // ── Salary lookups ─────────────────────────────────────────

    pub fn daily_cost_for(&self, employee: &str) -> Money {
        self.salaries.daily_cost(employee)
    }

    pub fn employees(&self) -> Vec<String> {
        self.salaries.employees()
    }

    // ── Aggregation ────────────────────────────────────────────

    pub fn calculate_cost_of_delay(&mut self) -> TriageResult<CostReport> {
        let today = self.clock.today();
        let mut overdue_tickets = Vec::new();
        let mut manager_costs: Vec<ManagerCost> = Vec::new();
        let mut manager_index: HashMap<ManagerKey, usize> = HashMap::new();

        for mut ticket in self.store.all()? {
            if !ticket.is_active() {
                continue;
            }
            let Some(deadline) = ticket.deadline else {
                continue;
            };
            let days_overdue = days_between(deadline, today);
            if days_overdue <= 0 {
                continue;
            }

            let daily_cost = self.salaries.daily_cost(&ticket.assignee_name);
            let delay_cost = daily_cost * days_overdue as f64;

            self.store.update_delay(&ticket.id, days_overdue, delay_cost, today)?;
            ticket.delay_days = days_overdue;
            ticket.total_delay_cost = delay_cost;
            ticket.last_calculated = Some(today);

            let idx = *manager_index.entry(ticket.manager_key()).or_insert_with(|| {
                manager_costs.push(ManagerCost {
                    manager_name: ticket.issuer_name.clone(),
                    manager_email: ticket.issuer_email.clone(),
                    total_cost: 0.0,
                    tickets: Vec::new(),
                });
                manager_costs.len() - 1
            });
            let manager = &mut manager_costs[idx];
            manager.total_cost += delay_cost;
            manager.tickets.push(ManagerTicketCost {
                ticket_id: ticket.id.clone(),
                issued_to: ticket.assignee_name.clone(),
                delay_days: days_overdue,
                daily_cost,
                delay_cost,
                description: ticket.description.clone(),
            });

            overdue_tickets.push(OverdueTicket { ticket, daily_cost, delay_cost });
        }

        let total_cost = manager_costs.iter().map(|m| m.total_cost).sum();
        log::debug!(
            "cost of delay: overdue={} managers={} total={total_cost:.2}",
            overdue_tickets.len(),
            manager_costs.len(),
        );

        Ok(CostReport { overdue_tickets, manager_costs, total_cost })
    }

    // ── Notifications ──────────────────────────────────────────

    pub fn report_subject(&self) -> String {
        format!("Cost of Delay Report - {}", self.clock.today().format("%-m/%-d/%Y"))
    }

    /// Plain-text report for one manager. Pure: no delivery happens here.
    pub fn generate_manager_email(&self, manager: &ManagerCost) -> String {
        let mut body = format!(
            "\nSubject: {}\n\nDear {},\n\n\
             The following tickets assigned to your team are overdue and incurring daily costs:\n\n",
            self.report_subject(),
            manager.manager_name,
        );

        for t in &manager.tickets {
            body.push_str(&format!(
                "\nTicket: {}\nAssigned to: {}\nDelay: {} day(s)\nDaily Cost: ${:.2}\n\
                 Total Delay Cost: ${:.2}\nDescription: {}\n\n",
                t.ticket_id, t.issued_to, t.delay_days, t.daily_cost, t.delay_cost, t.description,
            ));
        }

        body.push_str(&format!(
            "\nTotal Cost of Delay: ${:.2}\n\n\
             Please ensure these tickets are prioritized and completed as soon as possible \
             to minimize additional costs.\n\n\
             Best regards,\nTicket Triage System\n",
            manager.total_cost,
        ));
        body
    }

    /// Build the report and hand it to the sink.
    pub fn send_manager_notification(&self, manager: &ManagerCost) -> Notification {
        let email_content = self.generate_manager_email(manager);
        let subject = self.report_subject();
        let recipient = manager.manager_email.clone().filter(|e| !e.is_empty());

        let success = match recipient.as_deref() {
            Some(to) => match self.sink.deliver(to, &subject, &email_content) {
                Ok(()) => true,
                Err(e) => {
                    log::error!("Notification to {to} failed: {e}");
                    false
                }
            },
            None => {
                log::warn!("No email on record for manager {}", manager.manager_name);
                false
            }
        };

        Notification { success, email_content, recipient, subject }
    }

    /// Recompute costs, then notify each manager with an email, in order.
    pub fn process_overdue_tickets(&mut self) -> TriageResult<OverdueRun> {
        let cost_data = self.calculate_cost_of_delay()?;
        let notifications = cost_data
            .manager_costs
            .iter()
            .filter(|m| m.manager_email.as_deref().is_some_and(|e| !e.is_empty()))
            .map(|m| self.send_manager_notification(m))
            .collect();
        Ok(OverdueRun { cost_data, notifications })
    }
}
