//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$DOCMAILER_CONFIG` (environment variable)
//! 2. `~/.config/docmailer/config.toml` (Linux/macOS)
//!    `%APPDATA%\docmailer\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! The SMTP credential is never read from or written to this file.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Mail relay settings.
    pub smtp: SmtpConfig,
    /// Matching and pacing of the batch.
    pub batch: BatchConfig,
    /// Subject and body templates.
    pub template: TemplateConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Mail relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// Relay host name.
    pub server: String,
    /// Relay port (submission port, upgraded with STARTTLS).
    pub port: u16,
    /// From address, also used as the login identity.
    pub sender: String,
    /// Name announced in EHLO. Defaults to the local host name.
    pub hello_name: Option<String>,
    /// Socket timeout in seconds.
    pub timeout_secs: u64,
}

/// Matching and pacing of the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Document extension to pick out of archives, without the dot.
    pub extension: String,
    /// Character separating the key from the rest of a document name.
    pub separator: char,
    /// Drop the key and separator from attachment filenames
    /// (`ABC123_doc.pdf` is attached as `doc.pdf`).
    pub strip_key_from_filename: bool,
    /// Minimum pause after a successful send, in milliseconds.
    pub throttle_ms: u64,
    /// Column holding the matching key.
    pub key_column: String,
    /// Column holding the recipient name.
    pub name_column: String,
    /// Column holding the recipient address.
    pub mail_column: String,
}

/// Subject and body templates. Placeholders: `{Name}`, `{PAN}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub subject: String,
    pub body: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: "smtp.gmail.com".to_string(),
            port: 587,
            sender: String::new(),
            hello_name: None,
            timeout_secs: 60,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extension: "pdf".to_string(),
            separator: '_',
            strip_key_from_filename: false,
            throttle_ms: 1500,
            key_column: "PAN".to_string(),
            name_column: "Name".to_string(),
            mail_column: "Mail".to_string(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            subject: "Official Document(s) for {Name}".to_string(),
            body: DEFAULT_BODY.to_string(),
        }
    }
}

const DEFAULT_BODY: &str = "Dear {Name},

Please find attached the document(s) corresponding to your PAN: {PAN}.
If you have any questions, please reply to this email.

Best Regards,
Account Team
";

impl SmtpConfig {
    /// Socket timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl BatchConfig {
    /// Minimum interval between successful sends.
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("DOCMAILER_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("docmailer").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docmailer")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.smtp.server, "smtp.gmail.com");
        assert_eq!(cfg.smtp.port, 587);
        assert_eq!(cfg.batch.separator, '_');
        assert_eq!(cfg.batch.extension, "pdf");
        assert_eq!(cfg.batch.throttle(), Duration::from_millis(1500));
        assert!(cfg.template.body.contains("{PAN}"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[smtp]
server = "mail.example.org"
sender = "office@example.org"

[batch]
throttle_ms = 0
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.smtp.server, "mail.example.org");
        assert_eq!(cfg.smtp.sender, "office@example.org");
        assert_eq!(cfg.batch.throttle_ms, 0);
        // Other fields use defaults
        assert_eq!(cfg.smtp.port, 587);
        assert_eq!(cfg.batch.key_column, "PAN");
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.template.body, cfg.template.body);
        assert_eq!(parsed.batch.separator, cfg.batch.separator);
    }
}
