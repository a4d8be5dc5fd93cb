//! Per-row outcomes and the run summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What happened to one recipient row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SendOutcome {
    /// Delivered with this many attachments.
    Sent { attachments: usize },
    /// No document matched the row's key; nothing was composed.
    Skipped,
    /// Composition or delivery failed.
    Failed { detail: String },
}

/// Outcome of one row together with who it was for.
#[derive(Debug, Clone, Serialize)]
pub struct RowStatus {
    /// Zero-based position in the recipient table.
    pub row: usize,
    pub name: String,
    pub key: String,
    pub email: String,
    #[serde(flatten)]
    pub outcome: SendOutcome,
}

impl RowStatus {
    /// Human-readable status line.
    pub fn line(&self) -> String {
        match &self.outcome {
            SendOutcome::Sent { .. } => format!("Sent to {}", self.name),
            SendOutcome::Skipped => format!("SKIPPED: {} ({})", self.name, self.key),
            SendOutcome::Failed { detail } => format!("FAILED for {}: {}", self.name, detail),
        }
    }
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.line())
    }
}

/// Totals for one pass over the recipient table.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub total: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Row statuses in table order.
    pub statuses: Vec<RowStatus>,
}

impl Report {
    /// Start an empty report for a table of `total` rows.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            sent: 0,
            skipped: 0,
            failed: 0,
            started_at: Utc::now(),
            finished_at: None,
            statuses: Vec::with_capacity(total),
        }
    }

    /// Count a row's outcome and keep its status line.
    pub fn record(&mut self, status: RowStatus) -> &RowStatus {
        match status.outcome {
            SendOutcome::Sent { .. } => self.sent += 1,
            SendOutcome::Skipped => self.skipped += 1,
            SendOutcome::Failed { .. } => self.failed += 1,
        }
        self.statuses.push(status);
        &self.statuses[self.statuses.len() - 1]
    }

    /// Rows handled so far.
    pub fn processed(&self) -> usize {
        self.statuses.len()
    }

    /// Share of rows handled, in `0.0..=1.0`. An empty table counts as done.
    pub fn fraction_complete(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed() as f64 / self.total as f64
        }
    }

    /// `sent + skipped + failed == total`.
    pub fn is_consistent(&self) -> bool {
        self.sent + self.skipped + self.failed == self.total
    }

    /// Stamp the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Statuses of failed rows only.
    pub fn failures(&self) -> impl Iterator<Item = &RowStatus> {
        self.statuses
            .iter()
            .filter(|s| matches!(s.outcome, SendOutcome::Failed { .. }))
    }
}
