//! Per-model summaries and the cross-model aggregate

use super::verdict::CaseResult;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Passed/total counts for one model's batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelSummary {
    pub passed: usize,
    pub total: usize,
}

impl ModelSummary {
    /// Pass rate in percent; `0.0` for an empty batch
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Reduce one model's results to counts
pub fn summarize(results: &[CaseResult]) -> ModelSummary {
    ModelSummary {
        passed: results.iter().filter(|r| r.passed).count(),
        total: results.len(),
    }
}

/// Model name to summary, in the order models were evaluated.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    entries: Vec<(String, ModelSummary)>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a model's summary. Re-inserting a name replaces it in place.
    pub fn insert(&mut self, model: impl Into<String>, summary: ModelSummary) {
        let model = model.into();
        match self.entries.iter_mut().find(|(name, _)| *name == model) {
            Some(entry) => entry.1 = summary,
            None => self.entries.push((model, summary)),
        }
    }

    pub fn get(&self, model: &str) -> Option<&ModelSummary> {
        self.entries
            .iter()
            .find(|(name, _)| name == model)
            .map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelSummary)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Aggregate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, summary) in &self.entries {
            map.serialize_entry(name, summary)?;
        }
        map.end()
    }
}
