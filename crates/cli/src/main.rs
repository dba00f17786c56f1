//! Hostkit CLI - host maintenance toolkit
//! Runs commands under a deadline, samples system metrics, manipulates files

mod logging;
mod rotating;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

use hostkit_core::application::constants::{DEFAULT_MONITOR_INTERVAL, DEFAULT_MOUNT_POINT};
use hostkit_core::application::CommandService;
use hostkit_core::domain::{CommandResult, FailureKind};
use hostkit_core::port::{FileStore, MetricsSnapshot, SystemProbe};
use hostkit_infra_system::{LocalFileStore, SubprocessRunner, SystemProbeImpl, TracingLifecycleLogger};

use logging::{LogConfig, LogFormat};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_DIR: &str = "~/.hostkit/logs";

/// Exit codes for runner-level failures (shell conventions)
const EXIT_MALFORMED: i32 = 2;
const EXIT_UNEXPECTED: i32 = 1;
const EXIT_LAUNCH: i32 = 127;
const EXIT_TIMEOUT: i32 = 124;

#[derive(Parser)]
#[command(name = "hostkit")]
#[command(about = "Host maintenance toolkit", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory for the rotating log file
    #[arg(long, env = "HOSTKIT_LOG_DIR", default_value = DEFAULT_LOG_DIR, global = true)]
    log_dir: String,

    /// Console log style
    #[arg(long, env = "HOSTKIT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    /// Increase console verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command line (tokenized, never passed to a shell)
    Run {
        /// Command line, e.g. "uname -r"
        command: String,

        /// Timeout in seconds
        #[arg(short, long, env = "HOSTKIT_TIMEOUT_SECS", value_parser = parse_timeout, default_value = "30")]
        timeout: Duration,

        /// Let the child write straight to this terminal
        #[arg(long)]
        no_capture: bool,

        /// Use the async runner instead of a blocking thread
        #[arg(long)]
        concurrent: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Poll CPU, memory, disk and network usage
    Monitor {
        /// Seconds between samples
        #[arg(short, long, default_value_t = DEFAULT_MONITOR_INTERVAL.as_secs())]
        interval: u64,

        /// Mount point for disk usage
        #[arg(short, long, default_value = DEFAULT_MOUNT_POINT)]
        mount: String,

        /// Stop after this many samples (default: until Ctrl+C)
        #[arg(short = 'n', long)]
        count: Option<u64>,

        /// Print each sample as a JSON line
        #[arg(long)]
        json: bool,
    },

    /// File and directory helpers
    File {
        #[command(subcommand)]
        action: FileAction,
    },
}

#[derive(Subcommand)]
enum FileAction {
    /// Print a file
    Read { path: PathBuf },

    /// Write text to a file
    Write {
        path: PathBuf,
        content: String,

        /// Append instead of overwriting
        #[arg(long)]
        append: bool,
    },

    /// Pretty-print a JSON file
    ReadJson { path: PathBuf },

    /// Validate and write a JSON document
    WriteJson { path: PathBuf, json: String },

    /// Exit 0 if the path exists, 1 otherwise
    Exists { path: PathBuf },

    /// Delete a file
    Rm { path: PathBuf },

    /// Create a directory and its parents
    Mkdir { path: PathBuf },

    /// Delete a directory recursively
    Rmdir { path: PathBuf },
}

fn parse_timeout(s: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", s))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("timeout must be positive, got {}", s));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| format!("timeout {} is too large", s))
}

#[derive(Tabled)]
struct MetricsRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "CPU %")]
    cpu: String,
    #[tabled(rename = "Memory %")]
    memory: String,
    #[tabled(rename = "Disk %")]
    disk: String,
    #[tabled(rename = "Sent")]
    sent: u64,
    #[tabled(rename = "Received")]
    received: u64,
}

impl From<&MetricsSnapshot> for MetricsRow {
    fn from(s: &MetricsSnapshot) -> Self {
        Self {
            time: s.sampled_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            cpu: format!("{:.1}", s.cpu_usage_percent),
            memory: format!("{:.1}", s.memory_usage_percent),
            disk: format!("{:.1} ({})", s.disk_usage_percent, s.mount_point),
            sent: s.network.bytes_sent,
            received: s.network.bytes_recv,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    let log_config = LogConfig {
        dir: PathBuf::from(shellexpand::tilde(&cli.log_dir).into_owned()),
        format: cli.log_format,
        verbosity: cli.verbose,
    };
    let _log_guard = logging::init(&log_config)?;

    info!("Hostkit v{} starting...", VERSION);

    // 2. Dispatch
    let exit_code = match cli.command {
        Commands::Run {
            command,
            timeout,
            no_capture,
            concurrent,
            json,
        } => cmd_run(command, timeout, !no_capture, concurrent, json).await?,
        Commands::Monitor {
            interval,
            mount,
            count,
            json,
        } => cmd_monitor(Duration::from_secs(interval.max(1)), &mount, count, json).await?,
        Commands::File { action } => cmd_file(action)?,
    };

    if exit_code != 0 {
        // Flush buffered log lines before leaving
        drop(_log_guard);
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn cmd_run(
    command: String,
    timeout: Duration,
    capture_output: bool,
    concurrent: bool,
    json: bool,
) -> Result<i32> {
    let service = Arc::new(CommandService::new(
        Arc::new(SubprocessRunner::new()),
        Arc::new(TracingLifecycleLogger),
    ));

    let result = if concurrent {
        service.run_async(&command, timeout, capture_output).await
    } else {
        let service = Arc::clone(&service);
        tokio::task::spawn_blocking(move || service.run(&command, timeout, capture_output))
            .await
            .context("Blocking runner task failed")?
    };

    print_result(&result, json)?;
    Ok(exit_code_for(&result))
}

fn print_result(result: &CommandResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    if !result.stdout().is_empty() {
        println!("{}", result.stdout());
    }
    if !result.stderr().is_empty() {
        eprintln!("{}", result.stderr().yellow());
    }

    let status = match result.failure() {
        None if result.return_code() == 0 => "✓ exit 0".green().bold(),
        None => format!("✗ exit {}", result.return_code()).red().bold(),
        Some(kind) => format!("✗ {} failure", kind).red().bold(),
    };
    eprintln!("{} {}", status, format!("({} ms)", result.duration_ms()).dimmed());

    Ok(())
}

fn exit_code_for(result: &CommandResult) -> i32 {
    match result.failure() {
        Some(FailureKind::Malformed) => EXIT_MALFORMED,
        Some(FailureKind::Launch) => EXIT_LAUNCH,
        Some(FailureKind::Timeout) => EXIT_TIMEOUT,
        Some(FailureKind::Unexpected) => EXIT_UNEXPECTED,
        None => match result.return_code() {
            code @ 0..=255 => code,
            _ => EXIT_UNEXPECTED,
        },
    }
}

async fn cmd_monitor(
    interval: Duration,
    mount: &str,
    count: Option<u64>,
    json: bool,
) -> Result<i32> {
    let probe = SystemProbeImpl::new();
    let mut ticker = tokio::time::interval(interval);
    let mut taken = 0u64;

    info!(interval_secs = interval.as_secs(), mount = %mount, "Monitoring started");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                eprintln!("{}", "Monitoring stopped.".yellow());
                break;
            }
            _ = ticker.tick() => {
                let snapshot = probe
                    .snapshot(mount)
                    .await
                    .with_context(|| format!("Failed to sample metrics for {}", mount))?;

                if json {
                    println!("{}", serde_json::to_string(&snapshot)?);
                } else {
                    let table = Table::new([MetricsRow::from(&snapshot)])
                        .with(Style::rounded())
                        .to_string();
                    println!("{}", table);
                }

                taken += 1;
                if count.is_some_and(|limit| taken >= limit) {
                    break;
                }
            }
        }
    }

    Ok(0)
}

fn cmd_file(action: FileAction) -> Result<i32> {
    let store = LocalFileStore::new();

    match action {
        FileAction::Read { path } => {
            print!("{}", store.read_to_string(&path)?);
        }
        FileAction::Write {
            path,
            content,
            append,
        } => {
            if append {
                store.append_string(&path, &content)?;
            } else {
                store.write_string(&path, &content)?;
            }
            println!("{} {}", "✓ Written".green(), path.display());
        }
        FileAction::ReadJson { path } => {
            let value = store.read_json(&path)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        FileAction::WriteJson { path, json } => {
            let value: Value = serde_json::from_str(&json).context("Invalid JSON argument")?;
            store.write_json(&path, &value)?;
            println!("{} {}", "✓ Written".green(), path.display());
        }
        FileAction::Exists { path } => {
            let exists = store.exists(&path);
            println!("{}", exists);
            if !exists {
                return Ok(1);
            }
        }
        FileAction::Rm { path } => {
            store.delete_file(&path)?;
            println!("{} {}", "✓ Deleted".green(), path.display());
        }
        FileAction::Mkdir { path } => {
            store.create_dir_all(&path)?;
            println!("{} {}", "✓ Created".green(), path.display());
        }
        FileAction::Rmdir { path } => {
            if !path.is_dir() {
                bail!("{} is not a directory", path.display());
            }
            store.delete_dir_all(&path)?;
            println!("{} {}", "✓ Deleted".green(), path.display());
        }
    }

    Ok(0)
}
