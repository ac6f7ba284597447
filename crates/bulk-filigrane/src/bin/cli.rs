//! Bulk watermarking CLI
//!
//! Run with: cargo run -p bulk-filigrane -- <FOLDER> [--aggregate]

use anyhow::Context;
use bulk_filigrane::ingestion::scan_folder;
use bulk_filigrane::{BulkConfig, DispatchMode, FiligraneClient, Scheduler};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Watermark every supported document (jpg, jpeg, png, heic, pdf) in a folder
#[derive(Parser, Debug)]
#[command(name = "bulk-filigrane", version, about)]
struct Cli {
    /// Folder containing the documents
    folder: PathBuf,

    /// Watermark text [default: from config]
    #[arg(short, long)]
    watermark: Option<String>,

    /// Output directory [default: <FOLDER>/filigrane]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Upload all files at once and produce a single aggregated PDF
    #[arg(long)]
    aggregate: bool,

    /// File name of the aggregated output [default: aggregated_filigrane_docs.pdf]
    #[arg(long)]
    aggregate_output: Option<String>,

    /// Number of files processed in parallel [default: 8]
    #[arg(long)]
    workers: Option<usize>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bulk_filigrane=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = BulkConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(workers) = cli.workers {
        config.processing.workers = workers;
    }
    config.validate()?;

    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| cli.folder.join(&config.output.output_subdir));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Cannot create output directory {}", output_dir.display()))?;

    println!("Scanning folder: {}", cli.folder.display());
    let scan = scan_folder(&cli.folder)
        .with_context(|| format!("Cannot read folder {}", cli.folder.display()))?;

    println!("➡️ Supported files:");
    for file in &scan.supported {
        println!("   • {}", file.file_name());
    }
    for path in &scan.skipped {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        println!("{}", style(format!("⚠️ Skipping unsupported file: {}", name)).yellow());
    }

    if scan.supported.is_empty() {
        println!("No supported files found.");
        return Ok(ExitCode::SUCCESS);
    }

    let watermark = cli
        .watermark
        .clone()
        .unwrap_or_else(|| config.output.default_watermark.clone());
    let total = scan.supported.len();

    let (mode, bar) = if cli.aggregate {
        let name = cli
            .aggregate_output
            .clone()
            .unwrap_or_else(|| config.output.aggregate_filename.clone());
        println!("➡️ Aggregated mode: uploading {} files…", total);

        let spinner = ProgressBar::new_spinner();
        spinner.set_message("Waiting for the watermarked document");
        spinner.enable_steady_tick(Duration::from_millis(120));

        (
            DispatchMode::Aggregate {
                output_path: output_dir.join(name),
            },
            spinner,
        )
    } else {
        println!("➡️ Processing {} files in parallel…", total);

        let bar = ProgressBar::new(total as u64);
        bar.set_style(ProgressStyle::with_template(
            "Processing files: {pos}/{len} [{bar:30}] {elapsed}",
        )?);

        (DispatchMode::PerFile { output_dir }, bar)
    };

    let client = FiligraneClient::new(&config.service)?;
    let scheduler = Scheduler::from_config(Arc::new(client), &config.processing);

    let report = scheduler
        .run_with_progress(scan.supported, &watermark, &mode, |progress| {
            bar.set_position(progress.completed as u64)
        })
        .await?;
    bar.finish_and_clear();

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        println!("\n📄 Results:");
        for outcome in &report.outcomes {
            let line = format!("  {}", outcome);
            if outcome.success {
                println!("{}", style(line).green());
            } else {
                println!("{}", style(line).red());
            }
        }
        println!(
            "\n{} succeeded, {} failed",
            style(report.succeeded()).green(),
            style(report.failed()).red()
        );
        println!("\n🎉 Done!");
    }

    Ok(if report.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
