//! Wiring of a whole run: launch checks, input preparation, and the batch.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::compose::message::Composer;
use crate::config::Config;
use crate::error::{MailerError, Result};
use crate::index::builder::build_index;
use crate::index::reader::lookup;
use crate::index::AttachmentIndex;
use crate::input::{archive, sheet};
use crate::model::document::Document;
use crate::model::recipient::{RecipientRow, RecipientTable};
use crate::report::Report;
use crate::send::batch::{BatchSender, Progress};
use crate::send::session::{Connector, SmtpConnector};
use crate::send::throttle::Throttle;

/// Inputs loaded into memory and ready to send.
#[derive(Debug)]
pub struct Prepared {
    pub table: RecipientTable,
    pub index: AttachmentIndex,
}

/// A row paired with the documents it would receive.
#[derive(Debug)]
pub struct RowMatch<'a> {
    pub row: &'a RecipientRow,
    pub documents: &'a [Document],
}

/// Refuse to start without a sender, a password, or any archive.
pub fn validate_launch(sender: &str, password: Option<&str>, archives: &[PathBuf]) -> Result<()> {
    let password = password.unwrap_or_default();
    if sender.trim().is_empty() || password.is_empty() {
        return Err(MailerError::MissingCredentials);
    }
    if archives.is_empty() {
        return Err(MailerError::NoArchive);
    }
    Ok(())
}

/// Load the spreadsheet, extract every archive, and build the index.
///
/// Any failure here happens before a connection is attempted.
pub fn prepare(config: &Config, sheet_path: &Path, archives: &[PathBuf]) -> Result<Prepared> {
    let table = sheet::load_sheet(sheet_path, &sheet::Columns::from(&config.batch))?;
    let documents = archive::extract_all(archives, &config.batch.extension)?;
    let index = build_index(documents, config.batch.separator);

    info!(
        rows = table.len(),
        documents = index.document_count(),
        keys = index.key_count(),
        "Inputs prepared"
    );
    Ok(Prepared { table, index })
}

impl Prepared {
    /// Every row with its matched documents, in table order.
    pub fn matches(&self) -> Vec<RowMatch<'_>> {
        self.table
            .iter()
            .map(|row| RowMatch {
                row,
                documents: lookup(&self.index, &row.key),
            })
            .collect()
    }

    /// Send through any connector with the configured templates and pacing.
    pub fn send_with<C: Connector>(
        &self,
        config: &Config,
        connector: &C,
        progress: Option<Progress<'_>>,
    ) -> Result<Report> {
        let composer = Composer::new(&config.smtp.sender, &config.template, &config.batch)?;
        let mut sender = BatchSender::new(composer, Throttle::new(config.batch.throttle()));
        sender.run(connector, &self.table, &self.index, progress)
    }

    /// Send through the configured SMTP relay.
    pub fn send(
        &self,
        config: &Config,
        password: &str,
        progress: Option<Progress<'_>>,
    ) -> Result<Report> {
        let connector = SmtpConnector::new(&config.smtp, password);
        self.send_with(config, &connector, progress)
    }
}
