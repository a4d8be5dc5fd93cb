//! The batch run: one session, every row in order, one outcome per row.

use tracing::{debug, info, info_span, warn};

use super::session::{Connector, MailSession};
use super::throttle::Throttle;
use crate::compose::message::Composer;
use crate::error::Result;
use crate::index::reader::lookup;
use crate::index::AttachmentIndex;
use crate::model::recipient::{RecipientRow, RecipientTable};
use crate::report::{Report, RowStatus, SendOutcome};

/// Where a [`BatchSender`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No session opened yet, or opening it failed.
    Idle,
    /// Session open, rows being processed.
    SessionOpen,
    /// Every row processed and the session closed.
    SessionClosed,
}

/// Progress callback: `(status, rows processed, total rows)`.
pub type Progress<'a> = &'a dyn Fn(&RowStatus, usize, usize);

/// Sends one message per matched recipient through a single session.
#[derive(Debug)]
pub struct BatchSender {
    composer: Composer,
    throttle: Throttle,
    phase: Phase,
}

impl BatchSender {
    pub fn new(composer: Composer, throttle: Throttle) -> Self {
        Self {
            composer,
            throttle,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run the batch.
    ///
    /// A session error aborts before any row is touched and yields no
    /// report. After that, row errors are recorded and never stop the run,
    /// and the session is closed exactly once.
    pub fn run<C: Connector>(
        &mut self,
        connector: &C,
        table: &RecipientTable,
        index: &AttachmentIndex,
        progress: Option<Progress<'_>>,
    ) -> Result<Report> {
        let mut session = connector.connect()?;
        self.phase = Phase::SessionOpen;

        let total = table.len();
        let mut report = Report::new(total);
        info!(rows = total, documents = index.document_count(), "Starting batch");

        for (i, row) in table.iter().enumerate() {
            let _span = info_span!("row", index = i, key = %row.key).entered();
            let outcome = self.process_row(&mut session, row, index);
            let status = report.record(RowStatus {
                row: i,
                name: row.name.clone(),
                key: row.key.clone(),
                email: row.email.clone(),
                outcome,
            });
            if let Some(progress) = progress {
                progress(status, i + 1, total);
            }
            debug!(fraction = report.fraction_complete(), "Row done");
        }

        if let Err(e) = session.close() {
            warn!(error = %e, "Closing SMTP session failed");
        }
        self.phase = Phase::SessionClosed;
        report.finish();

        info!(
            sent = report.sent,
            skipped = report.skipped,
            failed = report.failed,
            "Batch finished"
        );
        Ok(report)
    }

    fn process_row<S: MailSession>(
        &mut self,
        session: &mut S,
        row: &RecipientRow,
        index: &AttachmentIndex,
    ) -> SendOutcome {
        let documents = lookup(index, &row.key);
        if documents.is_empty() {
            info!(name = %row.name, "No documents, skipping");
            return SendOutcome::Skipped;
        }

        let message = match self.composer.compose(row, documents) {
            Ok(message) => message,
            Err(e) => {
                warn!(name = %row.name, error = %e, "Composition failed");
                return SendOutcome::Failed {
                    detail: e.to_string(),
                };
            }
        };

        self.throttle.wait();
        match session.send(&message) {
            Ok(()) => {
                self.throttle.mark_sent();
                info!(name = %row.name, to = %row.email, attachments = documents.len(), "Sent");
                SendOutcome::Sent {
                    attachments: documents.len(),
                }
            }
            Err(e) => {
                warn!(name = %row.name, to = %row.email, error = %e, "Delivery failed");
                SendOutcome::Failed {
                    detail: e.to_string(),
                }
            }
        }
    }
}
