//! The triage desk — the submission flow and owner of every service.
//!
//! SUBMISSION FLOW (fixed):
//!   1. Classify the draft with the rule classifier.
//!   2. If the action is Forward and a deadline is set, register the
//!      ticket for cost-of-delay tracking.
//!
//! Nothing here is global: callers build one desk and pass it around.

use crate::{
    bayes::{BayesTicket, NaiveBayesClassifier, Prediction, TrainingReport},
    clock::{FixedClock, SystemClock},
    config::TriageConfig,
    cost_of_delay::CostOfDelayService,
    error::TriageResult,
    export::TicketExport,
    notify::LogSink,
    rules::{Action, ClassificationResult, RuleClassifier},
    salary::SalaryTable,
    store::{MemoryTicketStore, TicketStore},
    ticket::TicketDraft,
    types::TicketId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub classification: ClassificationResult,
    /// Set when the ticket was registered for cost tracking.
    pub ticket_id:      Option<TicketId>,
}

pub struct TriageDesk {
    pub config: TriageConfig,
    classifier: RuleClassifier,
    bayes:      NaiveBayesClassifier,
    costs:      CostOfDelayService,
}

impl TriageDesk {
    pub fn new(config: TriageConfig, costs: CostOfDelayService) -> Self {
        Self {
            classifier: RuleClassifier::new(&config),
            bayes: NaiveBayesClassifier::new(config.label_column.clone()),
            costs,
            config,
        }
    }

    /// Wire a desk for production use: salaries from the data directory,
    /// system clock, log-only notifications.
    pub fn build(config: TriageConfig, store: Box<dyn TicketStore>) -> Self {
        let salaries = SalaryTable::load(&config.salary_path(), config.working_days_per_month);
        let costs = CostOfDelayService::new(
            store,
            Box::new(salaries),
            Box::new(SystemClock),
            Box::new(LogSink),
        );
        Self::new(config, costs)
    }

    /// Desk pinned to `today` with an in-memory store and the embedded
    /// salary table.
    pub fn build_test(today: NaiveDate) -> Self {
        let config = TriageConfig::default_test();
        let costs = CostOfDelayService::new(
            Box::new(MemoryTicketStore::new()),
            Box::new(SalaryTable::fallback(config.working_days_per_month)),
            Box::new(FixedClock::on(today)),
            Box::new(LogSink),
        );
        Self::new(config, costs)
    }

    pub fn classify(&self, draft: &TicketDraft) -> ClassificationResult {
        self.classifier.classify(draft, self.costs.clock().today())
    }

    pub fn submit(&mut self, draft: &TicketDraft) -> TriageResult<Submission> {
        let classification = self.classify(draft);
        log::debug!(
            "submit: action={} team={:?}",
            classification.action.label(),
            classification.forward_to,
        );

        let ticket_id = if classification.action == Action::Forward && draft.deadline.is_some() {
            Some(self.costs.add_ticket(draft)?)
        } else {
            None
        };

        Ok(Submission { classification, ticket_id })
    }

    pub fn export(&self, draft: &TicketDraft, classification: Option<&ClassificationResult>) -> TicketExport {
        TicketExport::new(draft, classification)
    }

    /// Train the naive-Bayes model from the configured corpus.
    pub fn train_model(&mut self) -> TrainingReport {
        let path = self.config.training_path();
        self.bayes.train(&path)
    }

    pub fn predict(&self, ticket: &BayesTicket) -> TriageResult<Prediction> {
        self.bayes.predict(ticket)
    }

    pub fn bayes(&self) -> &NaiveBayesClassifier {
        &self.bayes
    }

    pub fn bayes_mut(&mut self) -> &mut NaiveBayesClassifier {
        &mut self.bayes
    }

    pub fn costs(&self) -> &CostOfDelayService {
        &self.costs
    }

    pub fn costs_mut(&mut self) -> &mut CostOfDelayService {
        &mut self.costs
    }
}
