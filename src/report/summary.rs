//! Aggregate figures over a normalized batch.

use serde::Serialize;

use super::QuizRecord;

/// Leading integer of a percentage like `"90%"`; anything unparsable counts as zero.
fn leading_percent(text: &str) -> u32 {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub failed: usize,
    /// Mean percent correct over successful records, one decimal place.
    pub average: f64,
    pub best: u32,
}

impl BatchSummary {
    pub fn from_records(records: &[QuizRecord]) -> Self {
        let scores: Vec<u32> = records
            .iter()
            .filter_map(QuizRecord::as_report)
            .map(|report| leading_percent(&report.percent_correct))
            .collect();

        let average = if scores.is_empty() {
            0.0
        } else {
            let mean = scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64;
            (mean * 10.0).round() / 10.0
        };

        Self {
            total: records.len(),
            failed: records.len() - scores.len(),
            average,
            best: scores.iter().copied().max().unwrap_or(0),
        }
    }
}
