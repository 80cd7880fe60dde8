//! Display-ready views of a finished run.
//!
//! [`Report`] flattens an [`EmotionLog`] into per-frame rows for a table and
//! `(label, count)` pairs for a bar chart. It performs no I/O; rendering is
//! left to the caller, with [`Display`] and [`Report::to_json`] as the two
//! stock renderings.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde_json::json;

use crate::aggregator::{EmotionLog, SummaryTable, index_label_object, summarize};

/// One row of the per-frame table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRow {
    /// Sequential frame index.
    pub index: u64,
    /// Emotion label, or `"error"` if the frame failed to classify.
    pub label: String,
}

/// One bar of the summary chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCount {
    /// Label shown as the bar's category.
    pub label: String,
    /// Number of frames carrying the label.
    pub count: u64,
}

/// Tabular view of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct Report {
    /// Per-frame rows in increasing index order.
    pub rows: Vec<FrameRow>,
    /// Per-label counts, ordered by label.
    pub summary: Vec<LabelCount>,
}

impl Report {
    /// Build rows and summary bars from a finished log.
    pub fn from_log(log: &EmotionLog) -> Self {
        let rows = log
            .iter()
            .map(|(index, outcome)| FrameRow {
                index,
                label: outcome.label().to_string(),
            })
            .collect();
        Self {
            rows,
            summary: summary_rows(&summarize(log)),
        }
    }

    /// Returns `true` if no frame was sampled.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of frames that were classified (including failures).
    pub fn frames_classified(&self) -> usize {
        self.rows.len()
    }

    /// Render as JSON with `frames_classified`, an index-ordered `log`
    /// object, per-frame `rows`, and `summary` bars.
    pub fn to_json(&self) -> serde_json::Value {
        let log = index_label_object(self.rows.iter().map(|row| (row.index, row.label.as_str())));
        json!({
            "frames_classified": self.rows.len(),
            "log": log,
            "rows": self.rows.iter().map(|row| json!({
                "frame": row.index,
                "emotion": row.label,
            })).collect::<Vec<_>>(),
            "summary": self.summary.iter().map(|entry| json!({
                "emotion": entry.label,
                "count": entry.count,
            })).collect::<Vec<_>>(),
        })
    }
}

/// Flatten a summary table into chart rows.
pub fn summary_rows(table: &SummaryTable) -> Vec<LabelCount> {
    table
        .iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

const BAR_WIDTH: u64 = 30;

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.rows.is_empty() {
            return writeln!(f, "No frames classified.");
        }

        writeln!(f, "{:>8}  Emotion", "Frame")?;
        for row in &self.rows {
            writeln!(f, "{:>8}  {}", row.index, row.label)?;
        }

        writeln!(f)?;
        let width = self
            .summary
            .iter()
            .map(|entry| entry.label.len())
            .max()
            .unwrap_or(0);
        let largest = self.summary.iter().map(|entry| entry.count).max().unwrap_or(1);
        for entry in &self.summary {
            let bar = (entry.count * BAR_WIDTH).div_ceil(largest.max(1)) as usize;
            writeln!(
                f,
                "{:<width$}  {:>4}  {}",
                entry.label,
                entry.count,
                "#".repeat(bar),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{Aggregator, FrameOutcome};
    use crate::classifier::ClassifyError;

    fn sample_log() -> EmotionLog {
        let mut aggregator = Aggregator::new();
        aggregator
            .record(0, FrameOutcome::Label("joy".into()))
            .unwrap();
        aggregator
            .record(10, FrameOutcome::Failed(ClassifyError::NoPredictions))
            .unwrap();
        aggregator
            .record(20, FrameOutcome::Label("joy".into()))
            .unwrap();
        aggregator.finalize()
    }

    #[test]
    fn rows_follow_log_order() {
        let report = Report::from_log(&sample_log());
        let indices: Vec<u64> = report.rows.iter().map(|row| row.index).collect();
        assert_eq!(indices, vec![0, 10, 20]);
        assert_eq!(report.rows[1].label, "error");
    }

    #[test]
    fn summary_matches_rows() {
        let report = Report::from_log(&sample_log());
        assert_eq!(
            report.summary,
            vec![
                LabelCount { label: "error".into(), count: 1 },
                LabelCount { label: "joy".into(), count: 2 },
            ]
        );
        let total: u64 = report.summary.iter().map(|entry| entry.count).sum();
        assert_eq!(total as usize, report.frames_classified());
    }

    #[test]
    fn empty_log_gives_empty_report() {
        let report = Report::from_log(&EmotionLog::default());
        assert!(report.is_empty());
        assert!(report.summary.is_empty());
        assert_eq!(report.to_string(), "No frames classified.\n");
        assert_eq!(report.to_json()["frames_classified"], 0);
    }

    #[test]
    fn json_carries_log_rows_and_summary() {
        let json = Report::from_log(&sample_log()).to_json();
        assert_eq!(json["log"]["10"], "error");
        assert_eq!(json["rows"][2]["frame"], 20);
        assert_eq!(json["summary"][1]["emotion"], "joy");
        assert_eq!(json["summary"][1]["count"], 2);
    }

    #[test]
    fn display_draws_bars() {
        let text = Report::from_log(&sample_log()).to_string();
        assert!(text.contains("joy"));
        assert!(text.contains(&"#".repeat(30)));
    }
}
