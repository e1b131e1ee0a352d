//! Sentiflow runtime
//!
//! - Loads the sentiment lexicons and writes the matcher's pattern file
//! - Spawns the external matcher (or reads its output from stdin)
//! - Ingests match lines and reports every horizon every 5 seconds
//! - Writes one final report when the matcher's output ends
//!
//! Usage:
//!   sentiflow <input-path> <target-path>
//!
//! Environment variables (see `PipelineConfig::from_env`):
//!   SENTIFLOW_HORIZONS - Half-lives in seconds (default: 60,3600,28800,86400,604800)
//!   SENTIFLOW_MATCHER_BIN - Matcher executable (default: ./ocl_aho_grep)
//!   SENTIFLOW_MATCHER_SOURCE - process | stdin (default: process)
//!   SENTIFLOW_REPORT_FORMAT - text | jsonl (default: text)
//!   SENTIFLOW_REPORT_TZ - local | utc (default: local)
//!   RUST_LOG - Log filter (default: info), logs go to stderr

use dotenv::dotenv;
use log::{error, info, warn};
use sentiflow::catalog::PatternCatalog;
use sentiflow::error::SentiflowError;
use sentiflow::matcher::{self, LineSourceKind, MatcherCommand};
use sentiflow::pipeline::{IngestLoop, LineWriterSink, PipelineConfig, Reporter, WindowSet};
use std::env;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Duration;

#[tokio::main]
async fn main() -> Result<(), SentiflowError> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    info!("🚀 Sentiflow - decaying sentiment over pattern matches");

    let config = PipelineConfig::from_env()?;
    let args: Vec<String> = env::args().skip(1).collect();

    let matcher_command = match config.line_source {
        LineSourceKind::Process => Some(MatcherCommand::from_args(
            &config.matcher_bin,
            config.patterns_out.clone(),
            &args,
        )?),
        LineSourceKind::Stdin => {
            if !args.is_empty() {
                warn!("⚠️  Reading from stdin, ignoring {} positional arguments", args.len());
            }
            None
        }
    };

    info!("📊 Configuration:");
    info!("   ├─ Horizons: {:?}", config.horizons);
    info!("   ├─ Report interval: {}ms (first after {}ms)", config.report_interval_ms, config.first_report_ms);
    info!("   ├─ Top-K: {}", config.top_k);
    info!("   ├─ Report format: {:?} ({:?} time)", config.report_format, config.report_timezone);
    info!("   └─ Line source: {:?}", config.line_source);

    let catalog = PatternCatalog::load(&config.catalog)?;
    catalog.write_pattern_file(&config.patterns_out)?;
    let catalog = Arc::new(catalog);

    let windows = Arc::new(Mutex::new(WindowSet::new(&config.horizons)?));
    let reporter = Reporter::new(windows.clone(), catalog.clone(), config.top_k);
    let ingest = IngestLoop::new(
        windows,
        catalog,
        reporter,
        Duration::from_millis(config.first_report_ms),
        Duration::from_millis(config.report_interval_ms),
    );

    let (tx, rx) = mpsc::channel::<String>(config.channel_buffer);
    info!("✅ Line channel created (buffer: {})", config.channel_buffer);

    let source = tokio::spawn(async move {
        match matcher_command {
            Some(command) => matcher::run_matcher(&command, tx).await,
            None => matcher::run_stdin(tx).await,
        }
    });

    // CTRL+C stops the line source; the ingest loop then writes its final report
    let source_abort = source.abort_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️  Received CTRL+C, stopping line source...");
            source_abort.abort();
        }
    });

    let mut sink = LineWriterSink::stdout(config.report_format).with_timezone(config.report_timezone);
    let stats = ingest.run(rx, &mut sink).await?;

    match source.await {
        Ok(Ok(lines)) => info!("✅ Line source finished ({} lines)", lines),
        Ok(Err(e)) => error!("❌ Line source failed: {}", e),
        Err(e) if e.is_cancelled() => info!("✅ Line source stopped"),
        Err(e) => error!("❌ Line source task panicked: {}", e),
    }

    info!(
        "✅ Sentiflow stopped ({} matches, {} parse failures, {} reports)",
        stats.matches, stats.parse_failures, stats.reports
    );
    Ok(())
}
