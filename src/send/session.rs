//! Transport sessions.
//!
//! A run opens exactly one session, pushes every message through it, and
//! closes it once. The [`Connector`] / [`MailSession`] pair is the seam the
//! batch sender drives; [`SmtpConnector`] is the real relay.

use std::time::Duration;

use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{SmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::Message;
use tracing::{debug, info};

use crate::config::SmtpConfig;
use crate::error::{MailerError, Result};

/// An open, authenticated session that delivers messages.
pub trait MailSession {
    /// Deliver one message. Errors are [`MailerError::Delivery`].
    fn send(&mut self, message: &Message) -> Result<()>;

    /// End the session. Consumes it so it cannot be closed twice.
    fn close(self) -> Result<()>;
}

/// Opens a [`MailSession`].
pub trait Connector {
    type Session: MailSession;

    /// Connect, secure and authenticate. Errors are [`MailerError::Session`].
    fn connect(&self) -> Result<Self::Session>;
}

/// Connects to an SMTP relay with STARTTLS and login credentials.
#[derive(Clone)]
pub struct SmtpConnector {
    server: String,
    port: u16,
    login: String,
    password: String,
    hello_name: Option<String>,
    timeout: Duration,
}

impl std::fmt::Debug for SmtpConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConnector")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl SmtpConnector {
    /// Build a connector; the sender address doubles as the login.
    pub fn new(config: &SmtpConfig, password: impl Into<String>) -> Self {
        Self {
            server: config.server.clone(),
            port: config.port,
            login: config.sender.trim().to_string(),
            password: password.into(),
            hello_name: config.hello_name.clone(),
            timeout: config.timeout(),
        }
    }

    fn client_id(&self) -> ClientId {
        match &self.hello_name {
            Some(name) => ClientId::Domain(name.clone()),
            None => ClientId::default(),
        }
    }
}

impl Connector for SmtpConnector {
    type Session = SmtpSession;

    fn connect(&self) -> Result<SmtpSession> {
        let session_err = |stage: &str, e: lettre::transport::smtp::Error| {
            MailerError::Session(format!("{stage} {}:{}: {e}", self.server, self.port))
        };
        let hello = self.client_id();

        debug!(server = %self.server, port = self.port, "Connecting to relay");
        let mut conn = SmtpConnection::connect(
            (self.server.as_str(), self.port),
            Some(self.timeout),
            &hello,
            None,
            None,
        )
        .map_err(|e| session_err("connect to", e))?;

        if !conn.can_starttls() {
            conn.abort();
            return Err(MailerError::Session(format!(
                "{}:{} does not offer STARTTLS",
                self.server, self.port
            )));
        }
        let tls = TlsParameters::new(self.server.clone())
            .map_err(|e| session_err("TLS setup for", e))?;
        conn.starttls(&tls, &hello)
            .map_err(|e| session_err("STARTTLS with", e))?;

        let credentials = Credentials::new(self.login.clone(), self.password.clone());
        if let Err(e) = conn.auth(&[Mechanism::Plain, Mechanism::Login], &credentials) {
            conn.abort();
            return Err(session_err("login to", e));
        }

        info!(server = %self.server, login = %self.login, "SMTP session open");
        Ok(SmtpSession { conn })
    }
}

/// An authenticated SMTP connection.
pub struct SmtpSession {
    conn: SmtpConnection,
}

impl MailSession for SmtpSession {
    fn send(&mut self, message: &Message) -> Result<()> {
        let response = self
            .conn
            .send(message.envelope(), &message.formatted())
            .map_err(|e| MailerError::Delivery(e.to_string()))?;
        debug!(code = %response.code(), "Message accepted");
        Ok(())
    }

    fn close(mut self) -> Result<()> {
        self.conn
            .quit()
            .map(|_| ())
            .map_err(|e| MailerError::Session(format!("QUIT failed: {e}")))
    }
}
