//! Multinomial naive-Bayes triage model trained from a labelled ticket export.
//!
//! Scoring for class c over features f1..fn:
//!
//!   log P(c) + Σ log((count(c, fi) + 1) / (docs(c) + |V|))
//!
//! The smoothing denominator uses the class's document count, not its
//! total feature count. Confidence is computed in a second pass by
//! exponentiating the three log scores and normalising; for very long
//! inputs every exponential underflows and confidence becomes NaN while
//! the log-domain argmax is still well defined.

use crate::{
    error::{TriageError, TriageResult},
    text::preprocess_text,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageClass {
    NeedMoreInfo,
    Discard,
    ForwardOtherTeam,
}

impl TriageClass {
    /// Fixed evaluation order; ties in the argmax keep the earlier class.
    pub const ALL: [TriageClass; 3] = [
        TriageClass::NeedMoreInfo,
        TriageClass::Discard,
        TriageClass::ForwardOtherTeam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeedMoreInfo     => "need_more_info",
            Self::Discard          => "discard",
            Self::ForwardOtherTeam => "forward_other_team",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }
}

impl fmt::Display for TriageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ticket fields the model reads. Mirrors the export's columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BayesTicket {
    pub summary:     String,
    pub description: String,
    pub component:   String,
    pub environment: String,
    pub issue_type:  String,
    pub priority:    String,
}

impl BayesTicket {
    /// Columns are looked up by their exact export keys. A header that
    /// differs in case or spacing (`Summary`, `Issue Type`) feeds nothing.
    fn from_row(row: &HashMap<&str, &str>) -> Self {
        let col = |name: &str| row.get(name).copied().unwrap_or_default().to_string();
        Self {
            summary:     col("summary"),
            description: col("description"),
            component:   col("component"),
            environment: col("environment"),
            issue_type:  col("issueType"),
            priority:    col("priority"),
        }
    }
}

/// Text tokens of every field plus four prefixed categorical features.
pub fn extract_features(ticket: &BayesTicket) -> Vec<String> {
    let text = [
        ticket.summary.as_str(),
        ticket.description.as_str(),
        ticket.component.as_str(),
        ticket.environment.as_str(),
        ticket.issue_type.as_str(),
        ticket.priority.as_str(),
    ]
    .join(" ");

    let mut features = preprocess_text(&text);
    let categorical = [
        ("priority", &ticket.priority),
        ("type", &ticket.issue_type),
        ("env", &ticket.environment),
        ("comp", &ticket.component),
    ];
    for (prefix, value) in categorical {
        if !value.is_empty() {
            features.push(format!("{prefix}_{}", value.to_lowercase()));
        }
    }
    features
}

/// Split one CSV line. A `"` toggles the in-quotes state and is dropped;
/// commas split only outside quotes. Escaped quotes are not recognised.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Outcome of a training run. Failures are reported here, never raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub success:            bool,
    pub total_docs:         usize,
    pub vocabulary_size:    usize,
    pub class_distribution: BTreeMap<TriageClass, usize>,
    pub error:              Option<String>,
}

impl TrainingReport {
    fn failed(error: String) -> Self {
        Self {
            success: false,
            total_docs: 0,
            vocabulary_size: 0,
            class_distribution: BTreeMap::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_class:   TriageClass,
    pub confidence:        f64,
    pub probabilities:     BTreeMap<TriageClass, f64>,
    pub log_probabilities: BTreeMap<TriageClass, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub is_trained:           bool,
    pub total_docs:           usize,
    pub vocabulary_size:      usize,
    pub class_distribution:   BTreeMap<TriageClass, usize>,
    pub class_probabilities:  BTreeMap<TriageClass, f64>,
}

#[derive(Debug, Default)]
pub struct NaiveBayesClassifier {
    label_column:      String,
    vocabulary:        HashSet<String>,
    class_word_counts: HashMap<TriageClass, HashMap<String, usize>>,
    class_doc_counts:  HashMap<TriageClass, usize>,
    total_docs:        usize,
    is_trained:        bool,
}

impl NaiveBayesClassifier {
    pub fn new(label_column: impl Into<String>) -> Self {
        Self {
            label_column: label_column.into(),
            ..Default::default()
        }
    }

    pub fn is_trained(&self) -> bool {
        self.is_trained
    }

    /// Train from a CSV file. An unreadable file yields a failed report.
    pub fn train(&mut self, path: &Path) -> TrainingReport {
        log::info!("Loading training data from {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(csv) => self.train_from_str(&csv),
            Err(e) => {
                log::error!("Training failed: {e}");
                TrainingReport::failed(format!("Cannot read {}: {e}", path.display()))
            }
        }
    }

    /// Train from CSV text, replacing all previous counts.
    pub fn train_from_str(&mut self, csv: &str) -> TrainingReport {
        let mut lines = csv.split('\n');
        let Some(header_line) = lines.next().filter(|h| !h.trim().is_empty()) else {
            log::error!("Training failed: empty training corpus");
            return TrainingReport::failed("empty training corpus".into());
        };
        let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();

        self.class_word_counts = TriageClass::ALL.iter().map(|c| (*c, HashMap::new())).collect();
        self.class_doc_counts = TriageClass::ALL.iter().map(|c| (*c, 0)).collect();
        self.vocabulary.clear();
        self.total_docs = 0;

        let mut skipped = 0usize;
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let values = parse_csv_line(line);
            if values.len() < headers.len() {
                skipped += 1;
                continue;
            }
            let row: HashMap<&str, &str> = headers
                .iter()
                .zip(values.iter())
                .map(|(h, v)| (*h, v.trim()))
                .collect();

            let label = row.get(self.label_column.as_str()).copied().unwrap_or_default();
            let Some(class) = TriageClass::from_label(label) else {
                skipped += 1;
                continue;
            };

            let features = extract_features(&BayesTicket::from_row(&row));
            let counts = self.class_word_counts.entry(class).or_default();
            for feature in features {
                *counts.entry(feature.clone()).or_default() += 1;
                self.vocabulary.insert(feature);
            }
            *self.class_doc_counts.entry(class).or_default() += 1;
            self.total_docs += 1;
        }

        log::info!(
            "Training completed: {} documents, {} features ({skipped} rows skipped)",
            self.total_docs,
            self.vocabulary.len(),
        );
        self.is_trained = true;

        TrainingReport {
            success: true,
            total_docs: self.total_docs,
            vocabulary_size: self.vocabulary.len(),
            class_distribution: self.class_distribution(),
            error: None,
        }
    }

    /// Log-domain score of `class` for a feature list.
    fn class_log_score(&self, features: &[String], class: TriageClass) -> f64 {
        let doc_count = self.class_doc_counts.get(&class).copied().unwrap_or(0);
        let prior = doc_count as f64 / self.total_docs as f64;
        let counts = self.class_word_counts.get(&class);
        let denominator = (doc_count + self.vocabulary.len()) as f64;

        features.iter().fold(prior.ln(), |acc, feature| {
            let count = counts.and_then(|c| c.get(feature)).copied().unwrap_or(0);
            acc + ((count + 1) as f64 / denominator).ln()
        })
    }

    pub fn predict(&self, ticket: &BayesTicket) -> TriageResult<Prediction> {
        if !self.is_trained {
            return Err(TriageError::NotTrained);
        }

        let features = extract_features(ticket);
        let log_probabilities: BTreeMap<TriageClass, f64> = TriageClass::ALL
            .iter()
            .map(|c| (*c, self.class_log_score(&features, *c)))
            .collect();

        // Strict > keeps the earlier class on ties and never selects NaN.
        let mut best = TriageClass::ALL[0];
        let mut best_score = log_probabilities[&best];
        for class in TriageClass::ALL {
            let score = log_probabilities[&class];
            if score > best_score {
                best = class;
                best_score = score;
            }
        }

        let probabilities: BTreeMap<TriageClass, f64> = log_probabilities
            .iter()
            .map(|(c, lp)| (*c, lp.exp()))
            .collect();
        let total: f64 = probabilities.values().sum();
        let confidence = probabilities[&best] / total;

        Ok(Prediction {
            predicted_class: best,
            confidence,
            probabilities,
            log_probabilities,
        })
    }

    fn class_distribution(&self) -> BTreeMap<TriageClass, usize> {
        TriageClass::ALL
            .iter()
            .map(|c| (*c, self.class_doc_counts.get(c).copied().unwrap_or(0)))
            .collect()
    }

    pub fn model_stats(&self) -> TriageResult<ModelStats> {
        if !self.is_trained {
            return Err(TriageError::NotTrained);
        }
        let class_probabilities = self
            .class_distribution()
            .into_iter()
            .map(|(c, n)| (c, n as f64 / self.total_docs as f64))
            .collect();
        Ok(ModelStats {
            is_trained: self.is_trained,
            total_docs: self.total_docs,
            vocabulary_size: self.vocabulary.len(),
            class_distribution: self.class_distribution(),
            class_probabilities,
        })
    }

    pub fn reset(&mut self) {
        self.vocabulary.clear();
        self.class_word_counts.clear();
        self.class_doc_counts.clear();
        self.total_docs = 0;
        self.is_trained = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_commas_stay_in_one_field() {
        assert_eq!(
            parse_csv_line(r#"a,"b, c",d"#),
            vec!["a".to_string(), "b, c".into(), "d".into()],
        );
    }

    #[test]
    fn doubled_quotes_are_not_escapes() {
        // "x""y" toggles twice inside: the quote characters vanish.
        assert_eq!(parse_csv_line(r#""x""y",z"#), vec!["xy".to_string(), "z".into()]);
    }

    #[test]
    fn trailing_comma_yields_empty_field() {
        assert_eq!(parse_csv_line("a,b,"), vec!["a".to_string(), "b".into(), "".into()]);
    }

    #[test]
    fn categorical_features_are_prefixed_and_lowercased() {
        let ticket = BayesTicket {
            summary: "Checkout broken".into(),
            priority: "High".into(),
            issue_type: "Bug".into(),
            environment: "PROD".into(),
            component: "Payments".into(),
            ..Default::default()
        };
        let features = extract_features(&ticket);
        for expected in ["checkout", "broken", "payments", "prod", "high", "bug",
                         "priority_high", "type_bug", "env_prod", "comp_payments"] {
            assert!(features.iter().any(|f| f == expected), "missing {expected}: {features:?}");
        }
    }

    #[test]
    fn labels_map_to_classes() {
        assert_eq!(TriageClass::from_label("discard"), Some(TriageClass::Discard));
        assert_eq!(TriageClass::from_label("Discard"), None);
        assert_eq!(TriageClass::from_label(""), None);
    }
}
