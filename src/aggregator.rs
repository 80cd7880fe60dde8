//! Per-frame result collection and label counting.
//!
//! The [`Aggregator`] owns the [`EmotionLog`] for one run. Outcomes are
//! appended in strictly increasing frame order; a failed classification is
//! recorded like any other outcome so one bad frame never loses the rest.
//! [`summarize`] derives the [`SummaryTable`] from a finished log.

use std::collections::BTreeMap;

use crate::{classifier::ClassifyError, error::FramemoodError};

/// Label under which failed frames are reported and counted.
pub const ERROR_LABEL: &str = "error";

/// The result of classifying one sampled frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The classifier's top label.
    Label(String),
    /// Classification failed; the reason is kept for diagnostics only.
    Failed(ClassifyError),
}

impl FrameOutcome {
    /// The label this outcome is displayed and counted under.
    pub fn label(&self) -> &str {
        match self {
            FrameOutcome::Label(label) => label,
            FrameOutcome::Failed(_) => ERROR_LABEL,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FrameOutcome::Failed(_))
    }
}

impl From<Result<String, ClassifyError>> for FrameOutcome {
    fn from(result: Result<String, ClassifyError>) -> Self {
        match result {
            Ok(label) => FrameOutcome::Label(label),
            Err(error) => FrameOutcome::Failed(error),
        }
    }
}

/// Ordered record of frame index → outcome for one run.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct EmotionLog {
    entries: Vec<(u64, FrameOutcome)>,
}

impl EmotionLog {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in increasing index order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &FrameOutcome)> {
        self.entries.iter().map(|(index, outcome)| (*index, outcome))
    }

    pub fn get(&self, index: u64) -> Option<&FrameOutcome> {
        self.entries
            .binary_search_by_key(&index, |(i, _)| *i)
            .ok()
            .map(|position| &self.entries[position].1)
    }

    pub fn indices(&self) -> Vec<u64> {
        self.entries.iter().map(|(index, _)| *index).collect()
    }

    pub fn failure_count(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_failure()).count()
    }

    /// The log as a JSON object mapping frame index to label.
    ///
    /// Keys keep increasing index order (`"0"`, `"10"`, ..., `"100"`), not
    /// string order.
    pub fn to_json(&self) -> serde_json::Value {
        index_label_object(self.iter().map(|(index, outcome)| (index, outcome.label())))
    }
}

/// Build an index → label JSON object in the order given.
pub(crate) fn index_label_object<'a>(
    entries: impl Iterator<Item = (u64, &'a str)>,
) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = entries
        .map(|(index, label)| (index.to_string(), label.into()))
        .collect();
    serde_json::Value::Object(map)
}

/// Accumulates outcomes into an [`EmotionLog`].
#[derive(Debug, Default)]
pub struct Aggregator {
    log: EmotionLog,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome for `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FramemoodError::OutOfOrderFrame`] if `index` is not greater
    /// than the last recorded index. The log is left unchanged.
    pub fn record(&mut self, index: u64, outcome: FrameOutcome) -> Result<(), FramemoodError> {
        if let Some(&(last, _)) = self.log.entries.last() {
            if index <= last {
                return Err(FramemoodError::OutOfOrderFrame { index, last });
            }
        }
        if let FrameOutcome::Failed(error) = &outcome {
            log::warn!("Frame {index} failed classification: {error}");
        }
        self.log.entries.push((index, outcome));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Close the run and hand back the log.
    pub fn finalize(self) -> EmotionLog {
        self.log
    }
}

/// Count of frames per label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct SummaryTable {
    counts: BTreeMap<String, u64>,
}

impl SummaryTable {
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Sum over all buckets; equals the number of log entries.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// `(label, count)` pairs ordered by label.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
    }

    /// The label with the highest count; ties go to the first label in order.
    pub fn dominant(&self) -> Option<(&str, u64)> {
        self.iter()
            .fold(None, |best: Option<(&str, u64)>, (label, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((label, count)),
            })
    }
}

/// Group a log's outcomes by label and count them.
pub fn summarize(log: &EmotionLog) -> SummaryTable {
    let mut counts = BTreeMap::new();
    for (_, outcome) in log.iter() {
        *counts.entry(outcome.label().to_string()).or_insert(0) += 1;
    }
    SummaryTable { counts }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(value: &str) -> FrameOutcome {
        FrameOutcome::Label(value.to_string())
    }

    fn failed() -> FrameOutcome {
        FrameOutcome::Failed(ClassifyError::NoPredictions)
    }

    #[test]
    fn records_in_order() {
        let mut aggregator = Aggregator::new();
        aggregator.record(0, label("joy")).unwrap();
        aggregator.record(10, failed()).unwrap();
        aggregator.record(20, label("sadness")).unwrap();

        let log = aggregator.finalize();
        assert_eq!(log.indices(), vec![0, 10, 20]);
        assert_eq!(log.get(10).map(FrameOutcome::label), Some(ERROR_LABEL));
        assert_eq!(log.failure_count(), 1);
        assert!(log.get(5).is_none());
    }

    #[test]
    fn rejects_repeated_or_earlier_indices() {
        let mut aggregator = Aggregator::new();
        aggregator.record(10, label("joy")).unwrap();
        assert!(matches!(
            aggregator.record(10, label("fear")),
            Err(FramemoodError::OutOfOrderFrame { index: 10, last: 10 })
        ));
        assert!(aggregator.record(0, label("fear")).is_err());
        assert_eq!(aggregator.len(), 1);
    }

    #[test]
    fn summary_counts_failures_as_their_own_bucket() {
        let mut aggregator = Aggregator::new();
        for (index, outcome) in [
            (0, label("joy")),
            (1, failed()),
            (2, label("joy")),
            (3, failed()),
            (4, label("anger")),
        ] {
            aggregator.record(index, outcome).unwrap();
        }
        let log = aggregator.finalize();
        let summary = summarize(&log);

        assert_eq!(summary.count("joy"), 2);
        assert_eq!(summary.count(ERROR_LABEL), 2);
        assert_eq!(summary.count("anger"), 1);
        assert_eq!(summary.total(), log.len() as u64);
        assert_eq!(summary.dominant(), Some(("error", 2)));
    }

    #[test]
    fn summary_order_is_deterministic() {
        let mut aggregator = Aggregator::new();
        aggregator.record(0, label("sadness")).unwrap();
        aggregator.record(1, label("anger")).unwrap();
        let summary = summarize(&aggregator.finalize());
        let labels: Vec<&str> = summary.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["anger", "sadness"]);
    }

    #[test]
    fn empty_log_summarizes_to_empty_table() {
        let summary = summarize(&EmotionLog::default());
        assert!(summary.is_empty());
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.dominant(), None);
    }

    #[test]
    fn dominant_ties_go_to_the_first_label() {
        let mut aggregator = Aggregator::new();
        aggregator.record(0, label("sadness")).unwrap();
        aggregator.record(10, label("joy")).unwrap();
        aggregator.record(20, label("sadness")).unwrap();
        aggregator.record(30, label("joy")).unwrap();
        let summary = summarize(&aggregator.finalize());
        assert_eq!(summary.dominant(), Some(("joy", 2)));
    }

    #[test]
    fn json_maps_index_to_label() {
        let mut aggregator = Aggregator::new();
        aggregator.record(0, label("joy")).unwrap();
        aggregator.record(10, failed()).unwrap();
        let json = aggregator.finalize().to_json();
        assert_eq!(json, serde_json::json!({ "0": "joy", "10": "error" }));
    }

    #[test]
    fn json_keys_follow_index_order() {
        let mut aggregator = Aggregator::new();
        for index in (0..=100).step_by(10) {
            aggregator.record(index, label("joy")).unwrap();
        }
        let json = aggregator.finalize().to_json();
        let keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec!["0", "10", "20", "30", "40", "50", "60", "70", "80", "90", "100"]
        );
    }
}
