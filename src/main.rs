use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;

use mediasweep::config::settings::{ErrorPolicy, Settings};
use mediasweep::core::analyzer::Analyzer;
use mediasweep::core::events::{self, Event};
use mediasweep::core::session::Session;
use mediasweep::models::deletion::DeleteStatus;
use mediasweep::models::scan_result::{ScanOutcome, ScanReport};
use mediasweep::models::size::human_readable_size;

#[derive(Parser, Debug)]
#[command(
    name = "mediasweep",
    version,
    about = "Removes leftover archive, checksum and image files from a media library"
)]
struct Cli {
    /// Library directory to clean (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Follow symbolic links (directory cycles are detected and skipped)
    #[arg(long)]
    follow_symlinks: bool,

    /// Skip unreadable entries instead of aborting the scan
    #[arg(long)]
    continue_on_error: bool,

    /// Files between two progress updates
    #[arg(long)]
    progress_batch: Option<u64>,

    /// Directory for the log file
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log to stderr instead of a log file
    #[arg(long)]
    log_stderr: bool,

    /// Run without the terminal UI: scan, print the summary, and only delete with --yes
    #[arg(long)]
    headless: bool,

    /// Delete without asking (headless mode only)
    #[arg(short = 'y', long, requires = "headless")]
    yes: bool,

    /// Export the scan report as JSON to file
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Export the scan report as Markdown to file
    #[arg(long)]
    export_markdown: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Build settings
    let mut settings = match cli.config {
        Some(ref path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if cli.follow_symlinks {
        settings.follow_symlinks = true;
    }
    if cli.continue_on_error {
        settings.error_policy = ErrorPolicy::Continue;
    }
    if let Some(batch) = cli.progress_batch {
        settings.progress_batch = batch.max(1);
    }
    if let Some(ref dir) = cli.log_dir {
        settings.log_dir = dir.clone();
    }

    let log_path = init_logging(&settings, cli.log_stderr)?;

    // Resolve path
    let path = std::fs::canonicalize(&cli.path)?;
    tracing::info!(path = %path.display(), "mediasweep starting");

    if cli.headless {
        return run_headless(&cli, path, settings, log_path.as_deref()).await;
    }

    let mut app = mediasweep::app::App::new(path, settings);
    app.run().await?;
    if let Some(log_path) = log_path {
        println!("Log file: {}", log_path.display());
    }
    Ok(())
}

/// Installs the tracing subscriber and returns the log file path, if any.
fn init_logging(settings: &Settings, to_stderr: bool) -> anyhow::Result<Option<PathBuf>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    }

    std::fs::create_dir_all(&settings.log_dir)?;
    let log_path = settings.log_path(&chrono::Local::now());
    let file = std::fs::File::create(&log_path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(Some(log_path))
}

async fn run_headless(
    cli: &Cli,
    path: PathBuf,
    settings: Settings,
    log_path: Option<&Path>,
) -> anyhow::Result<()> {
    let (event_tx, mut event_rx) = events::create_event_channel();
    let session = std::sync::Arc::new(Session::new(settings, event_tx));

    // Ctrl+C cancels whichever phase is running; the phase still reports.
    let ctrl_c_session = std::sync::Arc::clone(&session);
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling...");
            ctrl_c_session.request_cancel();
        }
    });

    // Drain progress events into a single status line.
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                Event::ScanProgress { stats, .. } => {
                    eprint!(
                        "\rFiles scanned: {} | Directories scanned: {} | Unwanted files found: {} ({})",
                        stats.files_scanned,
                        stats.dirs_scanned,
                        stats.unwanted_file_count,
                        human_readable_size(stats.unwanted_total_size)
                    );
                }
                Event::DeleteProgress { processed, total, .. } => {
                    eprint!("\rDeleting: {}/{}", processed, total);
                }
                Event::ScanCompleted { .. } | Event::DeleteCompleted { .. } => eprintln!(),
                Event::ScanStarted { .. } | Event::DeleteStarted { .. } => {}
            }
            let _ = std::io::stderr().flush();
        }
    });

    let report = session.start_scan(path).await?;
    print_summary(&report);

    if let Some(ref export_path) = cli.export_json {
        mediasweep::export::json::export_json(&report, export_path)?;
        println!("Exported to: {}", export_path.display());
    }
    if let Some(ref export_path) = cli.export_markdown {
        mediasweep::export::markdown::export_markdown(&report, export_path)?;
        println!("Exported to: {}", export_path.display());
    }

    if report.outcome.is_completed() && !report.candidates.is_empty() {
        if cli.yes {
            let deletion = session.start_delete()?.await?;
            let outcome = deletion.outcome;
            let verb = match deletion.status {
                DeleteStatus::Completed => "Deleted",
                DeleteStatus::Cancelled => "Deletion cancelled. Deleted",
            };
            println!(
                "{} {} of {} files ({}), {} skipped",
                verb,
                outcome.deleted_count,
                deletion.total,
                human_readable_size(outcome.deleted_size_bytes),
                deletion.skipped()
            );
        } else {
            session.discard();
            println!("Dry run: pass --yes to delete these files.");
        }
    }

    drop(session);
    printer.abort();
    if let Some(log_path) = log_path {
        println!("Log file: {}", log_path.display());
    }

    if let ScanOutcome::Failed(err) = &report.outcome {
        anyhow::bail!("Failed to scan directory: {}", err);
    }
    Ok(())
}

fn print_summary(report: &ScanReport) {
    let stats = &report.statistics;
    match &report.outcome {
        ScanOutcome::Completed if stats.unwanted_file_count == 0 => {
            println!("No unwanted files found");
        }
        ScanOutcome::Completed => println!(
            "Found {} unwanted files ({})",
            stats.unwanted_file_count,
            human_readable_size(stats.unwanted_total_size)
        ),
        ScanOutcome::Cancelled => println!("Scan cancelled"),
        ScanOutcome::Failed(err) => println!("Scan failed: {}", err),
    }

    let rows = Analyzer::category_rows(stats);
    if rows.is_empty() {
        return;
    }
    println!();
    println!("{:<40}{:>10}{:>14}", "File Type", "Count", "Total Size");
    for row in rows {
        println!(
            "{:<40}{:>10}{:>14}",
            row.label,
            row.count,
            human_readable_size(row.size)
        );
    }
    if !report.errors.is_empty() {
        println!("\n{} unreadable entries were skipped (see log)", report.errors.len());
    }
}
