//! Stallwatch command-line interface.
//!
//! Classifies issues from a tracker export, prints dashboard metrics, and
//! manages the stored configuration.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;

use stallwatch::config::{ConfigStore, ConfigValidator, StallConfig};
use stallwatch::dashboard::DashboardMetrics;
use stallwatch::notify::{format_dashboard, format_stall_message, StandardPhrasing};
use stallwatch::tracker::JsonTracker;
use stallwatch::{Severity, StallEngine, StallError, StallResult};

#[derive(Parser)]
#[command(name = "stallwatch")]
#[command(version)]
#[command(about = "Detect stalled issues and suggest next actions", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to the per-user config location)
    #[arg(short, long, global = true, env = "STALLWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify issues from a tracker export
    Classify {
        /// Tracker export (JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Only classify this issue key
        #[arg(short, long)]
        issue: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Evaluate as of this RFC 3339 time instead of now
        #[arg(long, value_name = "TIME")]
        at: Option<DateTime<Utc>>,
    },

    /// Aggregate dashboard metrics over a tracker export
    Dashboard {
        /// Tracker export (JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Evaluate as of this RFC 3339 time instead of now
        #[arg(long, value_name = "TIME")]
        at: Option<DateTime<Utc>>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the active configuration as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a configuration document and store it
    Import {
        /// Configuration document (JSON)
        file: PathBuf,
    },

    /// Validate a configuration file (defaults to the active one)
    Validate {
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "stallwatch=debug,info"
    } else {
        "stallwatch=info,warn"
    };

    // Logs go to stderr so JSON output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> stallwatch::Result<()> {
    let store = cli
        .config
        .map(ConfigStore::new)
        .unwrap_or_else(ConfigStore::user_default);

    match cli.command {
        Commands::Classify {
            data,
            issue,
            json,
            at,
        } => {
            let config = store.load()?;
            let now = at.unwrap_or_else(Utc::now);
            let tracker = JsonTracker::load(&data)?
                .with_terminal_statuses(config.settings.terminal_statuses.clone());
            let engine = StallEngine::new(tracker, config);

            let results = match issue {
                Some(key) => {
                    let snapshot = engine
                        .tracker()
                        .find(&key)
                        .cloned()
                        .ok_or(StallError::IssueNotFound { key })?;
                    vec![engine.classify_at(&snapshot, now).await?]
                }
                None => {
                    let issues = engine.open_issues().await?;
                    let results = engine.classify_all_at(&issues, now).await;
                    let skipped = issues.len() - results.len();
                    if skipped > 0 {
                        eprintln!(
                            "{} {} issue(s) could not be classified",
                            "Warning:".yellow().bold(),
                            skipped
                        );
                    }
                    results
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&results);
            }
        }

        Commands::Dashboard { data, json, at } => {
            let config = store.load()?;
            let now = at.unwrap_or_else(Utc::now);
            let tracker = JsonTracker::load(&data)?
                .with_terminal_statuses(config.settings.terminal_statuses.clone());
            let engine = StallEngine::new(tracker, config);
            let metrics = engine.aggregate_at(now).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                print_dashboard(&metrics);
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Export { output } => {
                let content = store.load()?.export_json()?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, content)?;
                        println!(
                            "{} Configuration written to {}",
                            "OK".green().bold(),
                            path.display()
                        );
                    }
                    None => println!("{}", content),
                }
            }

            ConfigAction::Import { file } => {
                let content = std::fs::read_to_string(&file).map_err(|e| {
                    StallError::config_with_path(e.to_string(), file.clone())
                })?;
                let config = StallConfig::import_json(&content)?;
                store.save(&config)?;
                println!(
                    "{} Configuration imported to {}",
                    "OK".green().bold(),
                    store.path().display()
                );
            }

            ConfigAction::Validate { file } => {
                let path = file.unwrap_or_else(|| store.path().to_path_buf());
                if !path.exists() {
                    println!(
                        "{} {} not found (using defaults)",
                        "Info:".blue(),
                        path.display()
                    );
                    return Ok(());
                }
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| StallError::config_with_path(e.to_string(), path.clone()))?;
                let config: StallConfig = serde_json::from_str(&content)
                    .map_err(|e| StallError::config_with_path(e.to_string(), path.clone()))?;
                let report = ConfigValidator::new().validate(&config);

                if report.is_valid() {
                    println!("{} {}", "OK".green().bold(), report.verbose_report());
                } else {
                    eprintln!("{} {}", "Error:".red().bold(), report.verbose_report());
                    std::process::exit(report.exit_code());
                }
            }
        },
    }

    Ok(())
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    let label = severity.to_string();
    match severity {
        Severity::Critical => label.red().bold(),
        Severity::High => label.yellow().bold(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.blue(),
    }
}

fn print_results(results: &[StallResult]) {
    let stalled = results.iter().filter(|r| r.is_stalled).count();
    println!(
        "\n{} {} issues, {} stalled",
        "Stallwatch:".cyan().bold(),
        results.len(),
        stalled
    );
    println!("{}", "─".repeat(40));

    for result in results {
        match result.severity {
            Some(severity) if result.is_stalled => {
                println!("\n[{}] {}", severity_label(severity), result.issue_key.bold());
                println!("{}", format_stall_message(result, &StandardPhrasing));
            }
            _ => println!("\n[{}] {}", "OK".green(), result.issue_key),
        }
    }
}

fn print_dashboard(metrics: &DashboardMetrics) {
    println!("\n{} Dashboard", "Stallwatch:".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}", format_dashboard(metrics));

    if !metrics.by_status.is_empty() {
        println!("\n{}", "By status".bold());
        for (status, counts) in &metrics.by_status {
            println!(
                "   {:<16} {:>3} total, {:>3} stalled",
                status, counts.total, counts.stalled
            );
        }
    }

    if !metrics.recently_stalled.is_empty() {
        println!("\n{}", "Recently stalled".bold());
        for notable in &metrics.recently_stalled {
            let label = notable
                .severity
                .map(severity_label)
                .unwrap_or_else(|| "-".normal());
            println!(
                "   {} [{}] {:.0}h - {}",
                notable.key, label, notable.hours_since_update, notable.summary
            );
        }
    }
}
