// src/main.rs
mod analysis;
mod extractors;
mod gradcafe;
mod pipeline;
mod storage;
mod utils;

use std::path::PathBuf;
use clap::Parser;
use analysis::Summary;
use gradcafe::GradCafeClient;
use pipeline::CleaningPipeline;
use storage::StorageManager;
use utils::config::ClientConfig;
use utils::AppError;

/// Cleans scraped GradCafe listing rows into normalized applicant records
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines file of raw entries ({"html_fragment", "detail_url"} per line)
    #[arg(short, long, required_unless_present = "records")]
    input: Option<PathBuf>,

    /// Summarize an already cleaned JSON-lines file instead of cleaning
    #[arg(long, conflicts_with = "input")]
    records: Option<PathBuf>,

    /// Output directory for cleaned records
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// File name for the cleaned JSON-lines output
    #[arg(long, default_value = "applicant_data.jsonl")]
    output_name: String,

    /// Do not fetch detail pages (GRE fields stay empty)
    #[arg(long)]
    skip_details: bool,

    /// User-Agent for detail requests (falls back to GRADCAFE_USER_AGENT)
    #[arg(long)]
    user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Delay before each detail request in milliseconds (falls back to GRADCAFE_REQUEST_DELAY_MS)
    #[arg(long)]
    request_delay_ms: Option<u64>,

    /// Compute aggregate statistics and save them as summary.json
    #[arg(short, long)]
    summary: bool,

    /// Start term the summary focuses on
    #[arg(long, default_value = analysis::DEFAULT_TERM)]
    term: String,

    /// Number of most common programs listed in the summary (1-100)
    #[arg(long, default_value_t = analysis::DEFAULT_TOP_PROGRAMS)]
    top_programs: usize,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting cleaning run for args: {:?}", args);

    if args.output_name.trim().is_empty() {
        return Err(AppError::Config("--output-name must not be empty".to_string()));
    }

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // Summary of an earlier run, no cleaning
    if let Some(records_path) = &args.records {
        let records = StorageManager::load_records(records_path)?;
        tracing::info!("Loaded {} cleaned records from {}", records.len(), records_path.display());
        let summary = Summary::compute(&records, &args.term, args.top_programs);
        log_summary(&summary);
        storage.save_summary(&summary)?;
        return Ok(());
    }

    // 4. Load raw entries
    let input = args.input.clone()
        .ok_or_else(|| AppError::Config("Either --input or --records is required".to_string()))?;
    let entries = StorageManager::load_raw_entries(&input)?;
    tracing::info!("Loaded {} raw entries from {}", entries.len(), input.display());

    if entries.is_empty() {
        return Err(AppError::Config(format!("No raw entries found in {}", input.display())));
    }

    // 5. Clean
    let batch = if args.skip_details {
        tracing::info!("Detail pages disabled, GRE fields will be empty");
        CleaningPipeline::<GradCafeClient>::without_details()
            .clean_batch(&entries)
            .await
    } else {
        let config = ClientConfig::resolve(
            args.user_agent.clone(),
            args.timeout_secs,
            args.request_delay_ms,
        );
        tracing::debug!("Client configuration: {:?}", config);
        let client = GradCafeClient::new(&config)?;
        CleaningPipeline::new(client).clean_batch(&entries).await
    };

    if batch.records.is_empty() {
        return Err(AppError::Processing(format!(
            "None of the {} entries contained a usable listing row",
            batch.stats.total
        )));
    }

    // 6. Save records and run metadata
    storage.save_records(&batch.records, &args.output_name)?;
    match storage.save_run_metadata(&batch.stats, &args.output_name, &input) {
        Ok(path) => tracing::info!("Saved run metadata to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save run metadata: {}", e),
    }

    // 7. Optional summary
    if args.summary {
        let summary = Summary::compute(&batch.records, &args.term, args.top_programs);
        log_summary(&summary);
        storage.save_summary(&summary)?;
    }

    tracing::info!(
        "Processing finished. Records: {}, filtered: {}, detail failures: {}. Output in {}",
        batch.stats.accepted,
        batch.stats.rejected,
        batch.stats.detail_failures,
        storage.base_dir().display()
    );

    Ok(())
}

fn log_summary(summary: &Summary) {
    tracing::info!(
        "{}: {} applicants, {:.2}% accepted; {:.2}% international overall",
        summary.term,
        summary.term_count,
        summary.term_acceptance_pct,
        summary.international_pct
    );
    for program in &summary.top_programs {
        tracing::info!("  {:>5}  {}", program.count, program.program);
    }
    tracing::info!(
        "JHU Masters CS applicants: {}, JHU rejections: {}, 2026 PhD CS acceptances at target schools: {}",
        summary.jhu_masters_cs_count,
        summary.jhu_rejections,
        summary.target_phd_cs_acceptances
    );
}
