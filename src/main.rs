//! CLI entry point for `docmailer`.

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::error;

use docmailer::config::Config;
use docmailer::pipeline::{self, Prepared};
use docmailer::report::{Report, RowStatus};

#[derive(Parser)]
#[command(
    name = "docmailer",
    version,
    about = "Mail spreadsheet recipients the PDF documents that carry their key"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Spreadsheet and archives shared by `send` and `preview`.
#[derive(Args)]
struct Inputs {
    /// Spreadsheet with PAN, Name and Mail columns (xlsx, xls, ods)
    #[arg(short, long, value_name = "FILE")]
    sheet: PathBuf,

    /// ZIP archive holding the documents (repeatable)
    #[arg(short, long = "archive", value_name = "ZIP")]
    archives: Vec<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message per matched recipient
    Send {
        #[command(flatten)]
        inputs: Inputs,

        /// SMTP server (overrides config)
        #[arg(long)]
        server: Option<String>,

        /// SMTP port (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Sender address, also the login (overrides config)
        #[arg(long)]
        sender: Option<String>,

        /// App password for the sender account
        #[arg(long, env = "DOCMAILER_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Pause after each successful send, in milliseconds (overrides config)
        #[arg(long, value_name = "MS")]
        throttle_ms: Option<u64>,
    },
    /// Show which documents each recipient would get, without sending
    Preview {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = docmailer::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    setup_logging(&log_level, &config);

    match cli.command {
        Commands::Send {
            inputs,
            server,
            port,
            sender,
            password,
            throttle_ms,
        } => {
            if let Some(server) = server {
                config.smtp.server = server;
            }
            if let Some(port) = port {
                config.smtp.port = port;
            }
            if let Some(sender) = sender {
                config.smtp.sender = sender;
            }
            if let Some(ms) = throttle_ms {
                config.batch.throttle_ms = ms;
            }
            cmd_send(&config, &inputs, password.as_deref())
        }
        Commands::Preview { inputs } => cmd_preview(&config, &inputs),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = docmailer::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "docmailer.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "docmailer", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Validate, load inputs, and run the batch with a progress bar.
fn cmd_send(config: &Config, inputs: &Inputs, password: Option<&str>) -> anyhow::Result<()> {
    pipeline::validate_launch(&config.smtp.sender, password, &inputs.archives)?;
    let prepared = pipeline::prepare(config, &inputs.sheet, &inputs.archives)?;
    let password = password.unwrap_or_default();

    let pb = ProgressBar::new(prepared.table.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Sending [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let progress = |status: &RowStatus, done: usize, _total: usize| {
        if !inputs.json {
            pb.println(format!("  {}", status.line()));
        }
        pb.set_position(done as u64);
    };

    let result = prepared.send(config, password, Some(&progress));
    pb.finish_and_clear();
    let report =
        result.inspect_err(|e| error!(scope = ?e.scope(), error = %e, "Batch aborted"))?;

    if inputs.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

/// Load inputs and show the planned matches without connecting anywhere.
fn cmd_preview(config: &Config, inputs: &Inputs) -> anyhow::Result<()> {
    if inputs.archives.is_empty() {
        anyhow::bail!(docmailer::error::MailerError::NoArchive);
    }
    let prepared = pipeline::prepare(config, &inputs.sheet, &inputs.archives)?;

    if inputs.json {
        print_preview_json(&prepared)
    } else {
        print_preview_table(&prepared);
        Ok(())
    }
}

/// Print the final totals.
fn print_summary(report: &Report) {
    println!();
    println!("  Process completed");
    println!("  {:<20} {}", "Total recipients", report.total);
    println!("  {:<20} {}", "Sent", report.sent);
    println!("  {:<20} {}", "Skipped", report.skipped);
    println!("  {:<20} {}", "Failed", report.failed);

    if report.failed > 0 {
        println!();
        println!("  Failures:");
        for status in report.failures() {
            println!("    {status}");
        }
    }
    println!();
}

/// Print each row and its documents as a human-readable table.
fn print_preview_table(prepared: &Prepared) {
    use humansize::{format_size, BINARY};

    let matches = prepared.matches();
    let matched = matches.iter().filter(|m| !m.documents.is_empty()).count();

    println!();
    println!(
        "  {} recipient(s), {} with documents, {} document(s) indexed",
        matches.len(),
        matched,
        prepared.index.document_count()
    );
    println!();
    println!("  {:<4} {:<14} {:<24} {:<30} Documents", "#", "PAN", "Name", "Mail");
    println!("  {}", "-".repeat(98));

    for (i, m) in matches.iter().enumerate() {
        let name: String = m.row.name.chars().take(23).collect();
        let mail: String = m.row.email.chars().take(29).collect();
        let docs = if m.documents.is_empty() {
            "(none, will skip)".to_string()
        } else {
            m.documents
                .iter()
                .map(|d| format!("{} ({})", d.name, format_size(d.size(), BINARY)))
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "  {:<4} {:<14} {:<24} {:<30} {}",
            i + 1,
            m.row.key,
            name,
            mail,
            docs
        );
    }

    let unclaimed = docmailer::index::reader::unclaimed_keys(&prepared.index, &prepared.table);
    if !unclaimed.is_empty() {
        println!();
        println!("  Documents with no recipient: {}", unclaimed.join(", "));
    }
    println!();
}

/// Print the preview as JSON.
fn print_preview_json(prepared: &Prepared) -> anyhow::Result<()> {
    let rows: Vec<serde_json::Value> = prepared
        .matches()
        .iter()
        .map(|m| {
            serde_json::json!({
                "key": m.row.key,
                "name": m.row.name,
                "mail": m.row.email,
                "documents": m.documents.iter().map(|d| serde_json::json!({
                    "name": d.name,
                    "size": d.size(),
                })).collect::<Vec<_>>(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "recipient_count": prepared.table.len(),
        "matched_count": docmailer::index::reader::count_matched(&prepared.index, &prepared.table),
        "document_count": prepared.index.document_count(),
        "unclaimed_keys": docmailer::index::reader::unclaimed_keys(&prepared.index, &prepared.table),
        "rows": rows,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
