use super::{DelayHistoryEntry, TicketStore};
use crate::{
    error::{TriageError, TriageResult},
    ticket::{Severity, Ticket, TicketStatus, TicketType},
    types::Money,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension};

const TICKET_COLUMNS: &str =
    "ticket_id, issuer_name, issuer_email, issuer_department, assignee_name, assignee_email,
     ticket_type, severity, description, deadline, project, status, created_at,
     completed_at, delay_days, total_delay_cost, last_calculated";

/// SQLite-backed ticket store.
pub struct SqliteTicketStore {
    conn: Connection,
}

impl SqliteTicketStore {
    pub fn open(path: &str) -> TriageResult<Self> {
        let conn = Connection::open(path)?;
        // WAL only matters for real files; in-memory databases ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> TriageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> TriageResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_tickets.sql"))?;
        Ok(())
    }

    fn exists(&self, ticket_id: &str) -> TriageResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM ticket WHERE ticket_id = ?1",
                params![ticket_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn parse_date(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    raw.map(|s| s.parse::<NaiveDate>().map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn parse_instant(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn ticket_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
    let created_at: String = row.get(12)?;
    let completed_at: Option<String> = row.get(13)?;
    Ok(Ticket {
        id:                row.get(0)?,
        issuer_name:       row.get(1)?,
        issuer_email:      row.get(2)?,
        issuer_department: row.get(3)?,
        assignee_name:     row.get(4)?,
        assignee_email:    row.get(5)?,
        ticket_type:       row.get::<_, String>(6)?.parse::<TicketType>().map_err(|e| conversion_error(6, e))?,
        severity:          row.get::<_, String>(7)?.parse::<Severity>().map_err(|e| conversion_error(7, e))?,
        description:       row.get(8)?,
        deadline:          parse_date(9, row.get(9)?)?,
        project:           row.get(10)?,
        status:            row.get::<_, String>(11)?.parse::<TicketStatus>().map_err(|e| conversion_error(11, e))?,
        created_at:        parse_instant(12, &created_at)?,
        completed_at:      completed_at.as_deref().map(|s| parse_instant(13, s)).transpose()?,
        delay_days:        row.get(14)?,
        total_delay_cost:  row.get(15)?,
        last_calculated:   parse_date(16, row.get(16)?)?,
    })
}

impl TicketStore for SqliteTicketStore {
    fn insert(&mut self, t: Ticket) -> TriageResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO ticket ({TICKET_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
                 ON CONFLICT(ticket_id) DO UPDATE SET
                    issuer_name = excluded.issuer_name,
                    issuer_email = excluded.issuer_email,
                    issuer_department = excluded.issuer_department,
                    assignee_name = excluded.assignee_name,
                    assignee_email = excluded.assignee_email,
                    ticket_type = excluded.ticket_type,
                    severity = excluded.severity,
                    description = excluded.description,
                    deadline = excluded.deadline,
                    project = excluded.project,
                    status = excluded.status,
                    created_at = excluded.created_at,
                    completed_at = excluded.completed_at,
                    delay_days = excluded.delay_days,
                    total_delay_cost = excluded.total_delay_cost,
                    last_calculated = excluded.last_calculated"
            ),
            params![
                &t.id,
                &t.issuer_name,
                t.issuer_email.as_deref(),
                t.issuer_department.as_deref(),
                &t.assignee_name,
                t.assignee_email.as_deref(),
                t.ticket_type.as_str(),
                t.severity.as_str(),
                &t.description,
                t.deadline.map(|d| d.to_string()),
                t.project.as_deref(),
                t.status.as_str(),
                t.created_at.to_rfc3339(),
                t.completed_at.map(|c| c.to_rfc3339()),
                t.delay_days,
                t.total_delay_cost,
                t.last_calculated.map(|d| d.to_string()),
            ],
        )?;
        Ok(())
    }

    fn get(&self, ticket_id: &str) -> TriageResult<Option<Ticket>> {
        self.conn
            .query_row(
                &format!("SELECT {TICKET_COLUMNS} FROM ticket WHERE ticket_id = ?1"),
                params![ticket_id],
                ticket_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    fn all(&self) -> TriageResult<Vec<Ticket>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TICKET_COLUMNS} FROM ticket ORDER BY seq ASC"))?;
        let rows = stmt.query_map([], ticket_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn update_delay(
        &mut self,
        ticket_id: &str,
        delay_days: i64,
        total_delay_cost: Money,
        calculated_on: NaiveDate,
    ) -> TriageResult<()> {
        let changed = self.conn.execute(
            "UPDATE ticket SET delay_days = ?1, total_delay_cost = ?2, last_calculated = ?3
             WHERE ticket_id = ?4",
            params![delay_days, total_delay_cost, calculated_on.to_string(), ticket_id],
        )?;
        if changed == 0 {
            return Err(TriageError::TicketNotFound { ticket_id: ticket_id.to_string() });
        }
        Ok(())
    }

    fn complete(&mut self, ticket_id: &str, at: DateTime<Utc>) -> TriageResult<bool> {
        let changed = self.conn.execute(
            "UPDATE ticket SET status = 'completed', completed_at = ?1 WHERE ticket_id = ?2",
            params![at.to_rfc3339(), ticket_id],
        )?;
        Ok(changed > 0)
    }

    fn remove(&mut self, ticket_id: &str) -> TriageResult<bool> {
        self.conn.execute(
            "DELETE FROM delay_history WHERE ticket_id = ?1",
            params![ticket_id],
        )?;
        let changed = self
            .conn
            .execute("DELETE FROM ticket WHERE ticket_id = ?1", params![ticket_id])?;
        Ok(changed > 0)
    }

    fn append_delay_history(&mut self, ticket_id: &str, entry: DelayHistoryEntry) -> TriageResult<()> {
        if !self.exists(ticket_id)? {
            return Err(TriageError::TicketNotFound { ticket_id: ticket_id.to_string() });
        }
        self.conn.execute(
            "INSERT INTO delay_history (ticket_id, recorded_at, delay_days, cost)
             VALUES (?1, ?2, ?3, ?4)",
            params![ticket_id, entry.recorded_at.to_rfc3339(), entry.delay_days, entry.cost],
        )?;
        Ok(())
    }

    fn delay_history(&self, ticket_id: &str) -> TriageResult<Vec<DelayHistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT recorded_at, delay_days, cost FROM delay_history
             WHERE ticket_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![ticket_id], |row| {
            let recorded_at: String = row.get(0)?;
            Ok(DelayHistoryEntry {
                recorded_at: parse_instant(0, &recorded_at)?,
                delay_days:  row.get(1)?,
                cost:        row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
