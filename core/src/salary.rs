//! Salary lookup — employee name → monthly salary → daily cost.
//!
//! Loaded once from a two-column `name,monthlySalary` CSV. If the file
//! cannot be read, an embedded table is used instead so costing keeps
//! working. Unknown names cost zero and log a warning.

use crate::types::Money;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Read-only salary collaborator used by the cost-of-delay service.
pub trait SalaryLookup: Send {
    /// Monthly salary for an exact employee name.
    fn monthly_salary(&self, employee: &str) -> Option<Money>;

    fn working_days_per_month(&self) -> f64;

    fn employees(&self) -> Vec<String>;

    /// Salary-derived cost of one working day; 0 when unknown.
    fn daily_cost(&self, employee: &str) -> Money {
        match self.monthly_salary(employee) {
            Some(salary) if salary > 0.0 => salary / self.working_days_per_month(),
            _ => {
                log::warn!("No salary data found for {employee}");
                0.0
            }
        }
    }
}

const FALLBACK_SALARIES: &[(&str, Money)] = &[
    ("Hannah Taylor", 3431.0),
    ("Charlie Martinez", 3391.0),
    ("Laura Lee", 10264.0),
    ("Bob Harris", 2535.0),
    ("Rachel Davis", 11121.0),
    ("Julia Walker", 7005.0),
    ("Wendy Miller", 9644.0),
    ("Paula Lee", 13899.0),
    ("George Lee", 5138.0),
    ("Bob Martin", 10784.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalarySource {
    Csv,
    Fallback,
    Manual,
}

#[derive(Debug, Clone)]
pub struct SalaryTable {
    salaries:               HashMap<String, Money>,
    working_days_per_month: f64,
    source:                 SalarySource,
}

impl SalaryTable {
    pub fn new(working_days_per_month: f64) -> Self {
        Self {
            salaries: HashMap::new(),
            working_days_per_month,
            source: SalarySource::Manual,
        }
    }

    /// Load from `path`, degrading to the embedded table on read failure.
    pub fn load(path: &Path, working_days_per_month: f64) -> Self {
        match std::fs::read_to_string(path) {
            Ok(csv) => {
                let mut table = Self::from_csv_str(&csv, working_days_per_month);
                table.source = SalarySource::Csv;
                log::info!("Loaded {} salary records from {}", table.len(), path.display());
                table
            }
            Err(e) => {
                log::error!("Error loading salary data from {}: {e}", path.display());
                Self::fallback(working_days_per_month)
            }
        }
    }

    /// Parse CSV text. The first line is a header; rows without a
    /// positive numeric salary are skipped.
    pub fn from_csv_str(csv: &str, working_days_per_month: f64) -> Self {
        let mut table = Self::new(working_days_per_month);
        for line in csv.split('\n').skip(1) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let values: Vec<&str> = line.split(',').collect();
            if values.len() < 2 {
                continue;
            }
            match values[1].trim().parse::<Money>() {
                Ok(salary) if salary.is_finite() && salary > 0.0 => {
                    table.insert(values[0].trim(), salary);
                }
                _ => log::debug!("Skipping salary row '{line}'"),
            }
        }
        table
    }

    pub fn fallback(working_days_per_month: f64) -> Self {
        let mut table = Self::new(working_days_per_month);
        for (name, salary) in FALLBACK_SALARIES {
            table.insert(name, *salary);
        }
        table.source = SalarySource::Fallback;
        table
    }

    /// Later rows for the same name replace earlier ones.
    pub fn insert(&mut self, employee: &str, monthly_salary: Money) {
        self.salaries.insert(employee.to_string(), monthly_salary);
    }

    pub fn source(&self) -> SalarySource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.salaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.salaries.is_empty()
    }
}

impl SalaryLookup for SalaryTable {
    fn monthly_salary(&self, employee: &str) -> Option<Money> {
        self.salaries.get(employee).copied()
    }

    fn working_days_per_month(&self) -> f64 {
        self.working_days_per_month
    }

    fn employees(&self) -> Vec<String> {
        let mut names: Vec<String> = self.salaries.keys().cloned().collect();
        names.sort();
        names
    }
}
