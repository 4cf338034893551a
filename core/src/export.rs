//! JSON export of a triaged ticket: the form data plus its classification.

use crate::{error::TriageResult, rules::ClassificationResult, ticket::TicketDraft};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketExport {
    #[serde(flatten)]
    pub draft:          TicketDraft,
    pub classification: Option<ClassificationResult>,
}

impl TicketExport {
    pub fn new(draft: &TicketDraft, classification: Option<&ClassificationResult>) -> Self {
        Self {
            draft: draft.clone(),
            classification: classification.cloned(),
        }
    }

    pub fn to_json(&self) -> TriageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `ticket-<issuer name with whitespace runs replaced by '-'>.json`
    pub fn file_name(&self) -> String {
        let issuer = self.draft.issuer_name().unwrap_or("unknown");
        let slug = issuer.split_whitespace().collect::<Vec<_>>().join("-");
        format!("ticket-{slug}.json")
    }

    /// Write the export into `dir` under `file_name()`. Returns the path written.
    pub fn write_to(&self, dir: &Path) -> TriageResult<PathBuf> {
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.to_json()?)?;
        log::info!("Exported ticket to {}", path.display());
        Ok(path)
    }
}
