//! Build the outgoing message for one recipient.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;

use super::template::{Template, Vars};
use crate::config::{BatchConfig, TemplateConfig};
use crate::error::{MailerError, Result};
use crate::model::document::Document;
use crate::model::recipient::RecipientRow;

/// Content type of every attachment.
const ATTACHMENT_CONTENT_TYPE: &str = "application/octet-stream";

/// Composes one message per recipient from fixed templates.
///
/// Holds no connection; composing has no side effects.
#[derive(Debug, Clone)]
pub struct Composer {
    from: Mailbox,
    subject: Template,
    body: Template,
    attachment_type: ContentType,
    /// When set, attachment names lose everything up to the first separator.
    strip_key: Option<char>,
}

impl Composer {
    /// Validate the sender and parse both templates.
    pub fn new(sender: &str, templates: &TemplateConfig, batch: &BatchConfig) -> Result<Self> {
        let from: Mailbox = sender
            .trim()
            .parse()
            .map_err(|_| MailerError::InvalidSender(sender.to_string()))?;
        let attachment_type = ContentType::parse(ATTACHMENT_CONTENT_TYPE)
            .map_err(|e| MailerError::Compose(e.to_string()))?;

        Ok(Self {
            from,
            subject: Template::parse(&templates.subject)?,
            body: Template::parse(&templates.body)?,
            attachment_type,
            strip_key: batch
                .strip_key_from_filename
                .then_some(batch.separator),
        })
    }

    /// Build the message for `row` carrying `documents` as attachments.
    ///
    /// The row's address is used as-is; one lettre cannot parse yields a
    /// [`MailerError::Compose`] error for this row only.
    pub fn compose(&self, row: &RecipientRow, documents: &[Document]) -> Result<Message> {
        let to: Mailbox = row
            .email
            .trim()
            .parse()
            .map_err(|e| MailerError::Compose(format!("recipient '{}': {e}", row.email)))?;

        let vars = Vars {
            name: &row.name,
            key: &row.key,
        };

        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(self.body.render(&vars)));
        for doc in documents {
            parts = parts.singlepart(
                Attachment::new(self.attachment_name(doc).to_string())
                    .body(doc.content.clone(), self.attachment_type.clone()),
            );
        }

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(self.subject.render(&vars))
            .multipart(parts)
            .map_err(|e| MailerError::Compose(e.to_string()))
    }

    fn attachment_name<'a>(&self, doc: &'a Document) -> &'a str {
        match self.strip_key {
            Some(sep) => match doc.name.split_once(sep) {
                Some((_, rest)) if !rest.is_empty() => rest,
                _ => &doc.name,
            },
            None => &doc.name,
        }
    }
}
