//! CLI entry point for `autoblog`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use autoblog::config::Config;
use autoblog::mailbox::{Credentials, ImapConnector, MailboxDriver};

/// Turn unread mail into blog posts.
#[derive(Parser)]
#[command(name = "autoblog", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (defaults to $AUTOBLOG_CONFIG or the user config dir)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Mail account to log in with
    #[arg(long, env = "AUTOBLOG_EMAIL", hide_env_values = true)]
    email: Option<String>,

    /// Password or app password for the account
    #[arg(long, env = "AUTOBLOG_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// IMAP server hostname
    #[arg(long, value_name = "HOST")]
    server: Option<String>,

    /// IMAP server TLS port
    #[arg(long)]
    port: Option<u16>,

    /// Mailbox to poll
    #[arg(long)]
    mailbox: Option<String>,

    /// Directory receiving the posts
    #[arg(long, value_name = "DIR")]
    posts_dir: Option<PathBuf>,

    /// Directory receiving the attachments
    #[arg(long, value_name = "DIR")]
    attachments_dir: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the mailbox once (the default)
    Run,
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

    match &cli.command {
        Some(Commands::Completions { shell }) => return cmd_completions(*shell),
        Some(Commands::Manpage) => return cmd_manpage(),
        Some(Commands::Run) | None => {}
    }

    let mut config = autoblog::config::load_config(cli.config.as_deref());
    apply_overrides(&mut config, &cli);

    let log_level = match cli.verbose {
        0 => config.general.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    setup_logging(&log_level, &config);

    let credentials = Credentials::new(
        cli.email.unwrap_or_default(),
        cli.password.unwrap_or_default(),
    );

    let driver = MailboxDriver::new(config, ImapConnector);
    match driver.run(&credentials) {
        Ok(summary) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
        // Failures are reported through the log; the exit status stays 0.
        Err(e) => tracing::error!(error = %e, "Run aborted"),
    }
    Ok(())
}

/// Command-line flags win over the config file.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(host) = &cli.server {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(mailbox) = &cli.mailbox {
        config.server.mailbox = mailbox.clone();
    }
    if let Some(dir) = &cli.posts_dir {
        config.output.posts_dir = dir.clone();
        // Keep attachments under the posts unless told otherwise.
        if cli.attachments_dir.is_none() {
            config.output.attachments_dir = dir.join("attachments");
        }
    }
    if let Some(dir) = &cli.attachments_dir {
        config.output.attachments_dir = dir.clone();
    }
}

/// Set up tracing on stdout, plus a log file when one is configured.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    // Tracing is not up yet, so setup problems go to stderr.
    let file_layer = config.general.log_file.as_deref().and_then(|path| {
        match log_file_appender(path) {
            Ok(appender) => Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(appender),
            ),
            Err(e) => {
                eprintln!("warning: file logging disabled: {e:#}");
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

/// Open `path` for appending log lines, creating its directory if needed.
/// A bare file name is placed in the current directory.
fn log_file_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let name = path
        .file_name()
        .with_context(|| format!("log file '{}' has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory '{}'", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("cannot open log file '{}'", path.display()))
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "autoblog", &mut std::io::stdout());
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
