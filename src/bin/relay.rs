//! CLI binary for attachment-relay.
//!
//! Plays the chat host: mints a session, collects text and attachments from
//! flags or an interactive prompt, and prints every reply the relay produces.

use anyhow::{Context, Result};
use attachment_relay::{
    Attachment, InboundMessage, ProgressCallback, Relay, RelayConfig, TurnProgressCallback,
    TurnReport, TurnStatus,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one line per file and a spinner while the
/// webhook call is in flight.
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn spinner() -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }

    fn finish(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl TurnProgressCallback for CliProgressCallback {
    fn on_turn_start(&self, file_count: usize) {
        if file_count > 0 {
            eprintln!(
                "{} {}",
                cyan("◆"),
                bold(&format!("Normalising {file_count} attachment(s)…"))
            );
        }
    }

    fn on_file_accepted(&self, name: &str, size_bytes: usize) {
        eprintln!(
            "  {} {:<32}  {}",
            green("✓"),
            name,
            dim(&format!("{:.1} KiB", size_bytes as f64 / 1024.0)),
        );
    }

    fn on_file_rejected(&self, name: &str, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        eprintln!("  {} {:<32}  {}", red("✗"), name, red(&msg));
    }

    fn on_dispatch(&self, file_count: usize) {
        let bar = Self::spinner();
        bar.set_prefix("Sending");
        bar.set_message(format!("{file_count} file(s) to webhook"));
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn on_turn_complete(&self, _status: TurnStatus) {
        self.finish();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Send a text message
  relay --webhook-url https://hooks.example.com/chat -t "Hello"

  # Send files; text defaults to a placeholder
  relay -f invoice.pdf -f receipt.jpg

  # Interactive session (reads the URL from the environment)
  export RELAY_WEBHOOK_URL=https://hooks.example.com/chat
  relay

  # Machine-readable turn report
  relay -t "Status?" --json

INTERACTIVE COMMANDS:
  /attach <path>   stage a file for the next message
  /files           list staged files
  /clear           drop staged files
  /quit            end the session
  anything else    sent as a message together with the staged files

ACCEPTED FILES:
  PNG (sent as-is), JPEG (re-encoded as PNG), PDF (first page rendered
  to PNG). At most 10MB each after conversion.

ENVIRONMENT VARIABLES:
  RELAY_WEBHOOK_URL    Webhook endpoint
  PDFIUM_LIB_PATH      Path to libpdfium (file or directory) for PDF rendering
  RUST_LOG             Override log filter (e.g. attachment_relay=debug)

LOGGING:
  While the spinner is shown, logs are limited to errors and rejected files
  are reported as progress lines instead. Pass -v, --no-progress or set
  RUST_LOG=warn to see the per-file rejection warnings in the log.
"#;

/// Relay chat messages and attachments to a webhook.
#[derive(Parser, Debug)]
#[command(
    name = "relay",
    version,
    about = "Relay chat messages and attachments to a webhook",
    long_about = "Normalise attachments (PDF and JPEG become PNG, 10MB limit) and POST them \
with the message text to a webhook as JSON, then print the webhook's reply.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Webhook URL receiving each turn.
    #[arg(long, env = "RELAY_WEBHOOK_URL")]
    webhook_url: String,

    /// Message text (one-shot mode).
    #[arg(short, long)]
    text: Option<String>,

    /// Attach a file (repeatable).
    #[arg(short, long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Start an interactive session even when --text/--file are given.
    #[arg(short, long)]
    interactive: bool,

    /// Per-file size limit in bytes, after conversion.
    #[arg(long, env = "RELAY_MAX_FILE_SIZE", default_value_t = attachment_relay::DEFAULT_MAX_FILE_SIZE)]
    max_file_size: usize,

    /// Text sent when only files are attached.
    #[arg(long, env = "RELAY_PLACEHOLDER", default_value = attachment_relay::DEFAULT_PLACEHOLDER_TEXT)]
    placeholder: String,

    /// Webhook request timeout in seconds (default: none).
    #[arg(long, env = "RELAY_TIMEOUT")]
    timeout: Option<u64>,

    /// pdfium library file or directory.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Longest edge of a rendered PDF page in pixels.
    #[arg(long, default_value_t = 2000)]
    pdf_max_pixels: u32,

    /// Print each turn report as JSON instead of plain replies.
    #[arg(long)]
    json: bool,

    /// Disable per-file lines and the dispatch spinner; rejection warnings
    /// then go to the stderr log instead.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors and replies. Rejected files still
    /// appear as reply lines; their warnings need -v or RUST_LOG=warn.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build relay ──────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn TurnProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;
    let relay = Relay::new(config).context("Failed to set up webhook client")?;
    let session = relay.start_session();

    let one_shot = cli.text.is_some() || !cli.files.is_empty();

    if one_shot {
        let message = InboundMessage::new(cli.text.clone().unwrap_or_default())
            .with_attachments(cli.files.iter().map(Attachment::guess_from_path));
        let report = relay.handle_message(&session, message).await;
        print_report(&report, cli.json)?;

        if !cli.interactive {
            if report.is_success() {
                return Ok(());
            }
            std::process::exit(1);
        }
    }

    run_interactive(&relay, &session, &cli).await
}

/// Map CLI args to `RelayConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<RelayConfig> {
    let mut builder = RelayConfig::builder(cli.webhook_url.clone())
        .max_file_size(cli.max_file_size)
        .placeholder_text(cli.placeholder.clone())
        .pdf_max_pixels(cli.pdf_max_pixels);

    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(path.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Read lines from stdin until EOF or `/quit`, one turn per message line.
async fn run_interactive(
    relay: &Relay,
    session: &attachment_relay::SessionContext,
    cli: &Cli,
) -> Result<()> {
    if !cli.quiet && !cli.json {
        println!("{}", relay.greeting());
        eprintln!("{}", dim(&format!("session {}", session.session_id())));
    }

    let mut staged: Vec<Attachment> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let trimmed = line.trim();

        match parse_command(trimmed) {
            Command::Quit => break,
            Command::Attach(path) => {
                let attachment = Attachment::guess_from_path(path);
                eprintln!(
                    "{} staged {} {}",
                    cyan("+"),
                    bold(&attachment.name),
                    dim(&format!("({})", attachment.mime))
                );
                staged.push(attachment);
            }
            Command::AttachMissingPath => eprintln!("{}", red("usage: /attach <path>")),
            Command::ListFiles => {
                if staged.is_empty() {
                    eprintln!("{}", dim("no staged files"));
                }
                for a in &staged {
                    eprintln!("  {} {}", a.name, dim(&format!("({})", a.mime)));
                }
            }
            Command::Clear => {
                staged.clear();
                eprintln!("{}", dim("staged files cleared"));
            }
            Command::Send => {
                let message =
                    InboundMessage::new(line.clone()).with_attachments(staged.drain(..));
                let report = relay.handle_message(session, message).await;
                print_report(&report, cli.json)?;
            }
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Attach(&'a str),
    AttachMissingPath,
    ListFiles,
    Clear,
    Send,
}

fn parse_command(line: &str) -> Command<'_> {
    match line.split_once(char::is_whitespace) {
        Some(("/attach", rest)) if !rest.trim().is_empty() => Command::Attach(rest.trim()),
        _ => match line {
            "/quit" | "/exit" => Command::Quit,
            "/attach" => Command::AttachMissingPath,
            "/files" => Command::ListFiles,
            "/clear" => Command::Clear,
            _ => Command::Send,
        },
    }
}

fn print_report(report: &TurnReport, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
        println!("{out}");
        return Ok(());
    }

    for reply in &report.replies {
        println!("{reply}");
    }
    Ok(())
}
