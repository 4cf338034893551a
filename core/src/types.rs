//! Shared primitive types used across the triage engine.

/// Stable identifier of a registered ticket.
pub type TicketId = String;

/// An amount of money in currency units.
pub type Money = f64;

/// Key a manager's costs are grouped under (issuer email, else issuer name).
pub type ManagerKey = String;
