use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "triage_config.json";

/// Tunables for classification, costing and resource locations.
///
/// Every field has a built-in default, so a config file only needs to
/// name the values it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TriageConfig {
    /// Minimum trimmed description length before a ticket is considered complete.
    pub min_description_len: usize,
    /// Deadlines this many calendar days away (or fewer) count as urgent.
    pub urgency_window_days: i64,
    /// Divisor turning a monthly salary into a daily cost.
    pub working_days_per_month: f64,
    /// Salary CSV file name, relative to the data directory.
    pub salary_csv: String,
    /// Labelled training export, relative to the data directory.
    pub training_csv: String,
    /// Column of the training export carrying the class label.
    pub label_column: String,
    #[serde(skip)]
    pub data_dir: PathBuf,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            min_description_len: 20,
            urgency_window_days: 3,
            working_days_per_month: 20.0,
            salary_csv: "simple_salary_dataset.csv".into(),
            training_csv: "jira_export_minimal_HPS_tickets.csv".into(),
            label_column: "HPS Triage Class".into(),
            data_dir: PathBuf::from("."),
        }
    }
}

impl TriageConfig {
    /// Load from `<data_dir>/triage_config.json`.
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = Path::new(data_dir).join(CONFIG_FILE);
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
            serde_json::from_str::<TriageConfig>(&content)
                .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?
        } else {
            log::info!("{} not found, using built-in defaults", path.display());
            Self::default()
        };
        config.data_dir = PathBuf::from(data_dir);
        if config.working_days_per_month <= 0.0 {
            anyhow::bail!(
                "working_days_per_month must be positive, got {}",
                config.working_days_per_month
            );
        }
        Ok(config)
    }

    /// Config with hardcoded defaults for use in tests.
    pub fn default_test() -> Self {
        Self::default()
    }

    pub fn salary_path(&self) -> PathBuf {
        self.data_dir.join(&self.salary_csv)
    }

    pub fn training_path(&self) -> PathBuf {
        self.data_dir.join(&self.training_csv)
    }
}
