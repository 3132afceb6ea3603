use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use will_data::app::{build_service, run_batch};
use will_data::logging::init_logging;
use will_data::{IntakeLoader, WillConfig};

/// Generate will documents for every applicant in a CSV file.
///
/// Column headers are form field names (`name`, `exec1_name`,
/// `beneficiary_1_share`, ...). Each row is validated step by step exactly
/// as the web form would, then rendered and logged.
#[derive(Parser, Debug)]
#[command(name = "will-generate")]
#[command(version, about, long_about = None)]
struct Args {
    /// CSV file with one applicant per row
    #[arg(short, long)]
    input: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for generated documents
    #[arg(long)]
    documents_dir: Option<PathBuf>,

    /// Submission log CSV
    #[arg(long)]
    log: Option<PathBuf>,

    /// Directory of `*.txt.tera` templates
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Continue with the next row after a failed submission
    #[arg(short, long, default_value_t = false)]
    keep_going: bool,
}

fn load_config(args: &Args) -> Result<WillConfig> {
    let mut config = match &args.config {
        Some(path) => WillConfig::load(path)?,
        None => WillConfig::default(),
    };
    if let Some(dir) = &args.documents_dir {
        config.storage.documents_dir = dir.clone();
    }
    if let Some(log) = &args.log {
        config.storage.submission_log = log.clone();
    }
    if let Some(dir) = &args.templates {
        config.storage.template_dir = Some(dir.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(&config.logging)?;
    debug!(?config, "configuration loaded");

    let service = build_service(&config).await?;
    let purged = service
        .purge_expired(config.sessions.ttl())
        .await
        .context("Failed to purge expired sessions")?;
    debug!(purged, "stale sessions removed");

    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open: {}", args.input.display()))?;
    let records = IntakeLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.input.display()))?;
    println!("Parsed {} applicants from {}", records.len(), args.input.display());

    let summary = run_batch(&service, &records, args.keep_going).await;

    println!(
        "Generated {} wills ({} mirror wills) into {}",
        summary.generated,
        summary.mirrors,
        config.storage.documents_dir.display()
    );
    for (row, error) in &summary.failed {
        println!("  row {}: {}", row, error);
    }
    if !summary.failed.is_empty() {
        anyhow::bail!("{} submissions failed", summary.failed.len());
    }
    Ok(())
}
