//! Ticket triage and cost-of-delay engine.
//!
//! - `rules`: deterministic rule-based triage
//! - `bayes`: naive-Bayes triage model trained from a CSV export
//! - `cost_of_delay`: overdue cost aggregation and manager reports
//! - `desk`: the submission flow tying them together

pub mod bayes;
pub mod clock;
pub mod config;
pub mod cost_of_delay;
pub mod desk;
pub mod error;
pub mod export;
pub mod notify;
pub mod rules;
pub mod salary;
pub mod store;
pub mod text;
pub mod ticket;
pub mod types;
