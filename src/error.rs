//! Centralized error types for docmailer.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the docmailer library.
#[derive(Error, Debug)]
pub enum MailerError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified input file does not exist.
    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    /// The spreadsheet lacks one or more of the required columns.
    #[error("Spreadsheet must contain columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Sender address or credential was not supplied.
    #[error("Sender address and app password are required")]
    MissingCredentials,

    /// The sender address cannot be used as a From mailbox.
    #[error("Invalid sender address '{0}'")]
    InvalidSender(String),

    /// No archive input was given.
    #[error("At least one ZIP archive is required")]
    NoArchive,

    /// The spreadsheet could not be opened or has no readable sheet.
    #[error("Cannot read spreadsheet '{path}': {reason}")]
    Spreadsheet { path: PathBuf, reason: String },

    /// The archive is corrupt or not a ZIP file.
    #[error("Invalid archive '{name}': {source}")]
    InvalidArchive {
        name: String,
        source: zip::result::ZipError,
    },

    /// Connecting, upgrading to TLS, or authenticating against the relay failed.
    #[error("SMTP session error: {0}")]
    Session(String),

    /// A message template is malformed or references an unknown placeholder.
    #[error("Template error: {0}")]
    Template(String),

    /// The outgoing message could not be built.
    #[error("Cannot compose message: {0}")]
    Compose(String),

    /// The relay rejected the message or the connection broke mid-send.
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Convenience alias for `Result<T, MailerError>`.
pub type Result<T> = std::result::Result<T, MailerError>;

/// How far an error propagates through a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// Bad operator input; the batch never starts.
    Configuration,
    /// The relay session could not be established; no row is processed.
    Session,
    /// An archive could not be read; no row is processed.
    Archive,
    /// Confined to a single recipient row; the batch continues.
    Row,
}

impl MailerError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an `InvalidArchive` variant for the named archive input.
    pub fn archive(name: impl Into<String>, source: zip::result::ZipError) -> Self {
        Self::InvalidArchive {
            name: name.into(),
            source,
        }
    }

    /// Classify this error into its propagation scope.
    pub fn scope(&self) -> ErrorScope {
        match self {
            Self::Io { .. }
            | Self::FileNotFound(_)
            | Self::MissingColumns(_)
            | Self::MissingCredentials
            | Self::InvalidSender(_)
            | Self::NoArchive
            | Self::Spreadsheet { .. }
            | Self::Template(_) => ErrorScope::Configuration,
            Self::InvalidArchive { .. } => ErrorScope::Archive,
            Self::Session(_) => ErrorScope::Session,
            Self::Compose(_) | Self::Delivery(_) => ErrorScope::Row,
        }
    }

    /// `true` if the error only affects one recipient row.
    pub fn is_row_level(&self) -> bool {
        self.scope() == ErrorScope::Row
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (rare, prefer `MailerError::io`).
impl From<std::io::Error> for MailerError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_classification() {
        assert_eq!(MailerError::NoArchive.scope(), ErrorScope::Configuration);
        assert_eq!(
            MailerError::MissingColumns(vec!["PAN".into()]).scope(),
            ErrorScope::Configuration
        );
        assert_eq!(
            MailerError::Session("535 auth failed".into()).scope(),
            ErrorScope::Session
        );
        assert!(MailerError::Delivery("550".into()).is_row_level());
        assert!(MailerError::Compose("bad address".into()).is_row_level());
        assert!(!MailerError::Template("x".into()).is_row_level());
        assert!(!MailerError::MissingCredentials.is_row_level());
    }

    #[test]
    fn test_missing_columns_message() {
        let err = MailerError::MissingColumns(vec!["PAN".into(), "Mail".into()]);
        assert_eq!(err.to_string(), "Spreadsheet must contain columns: PAN, Mail");
    }
}
