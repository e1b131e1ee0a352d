//! Match ingestion - unified select loop over match lines and the report timer
//!
//! One task multiplexes two event sources:
//! 1. raw matcher lines from an mpsc channel, parsed and fanned out to every
//!    horizon
//! 2. the report timer (first tick after `first_report`, then every
//!    `report_interval`)
//!
//! Every mutation of the window set happens under its lock, so a line is
//! never applied halfway through a report pass. When the channel closes
//! (matcher exited or stdin ended) one final report is written before
//! returning.

use super::reporter::{ReportSink, Reporter};
use super::types::{MatchEvent, PatternId};
use super::windows::WindowSet;
use crate::catalog::PatternCatalog;
use crate::error::{ParseError, ReportError};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

/// First token of every match line
pub const MATCH_MARKER: &str = "Pattern";

/// Wall-clock source in Unix seconds
pub type Clock = Arc<dyn Fn() -> f64 + Send + Sync>;

pub fn wall_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0)
}

/// Extract the pattern id from one matcher line
///
/// - `Ok(None)`: not a match line (ignored)
/// - `Ok(Some(id))`: `Pattern #<id> ...`
/// - `Err(_)`: looked like a match line but the id token is missing or bad
pub fn parse_match_line(line: &str) -> Result<Option<PatternId>, ParseError> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some(MATCH_MARKER) {
        return Ok(None);
    }

    let token = tokens.next().ok_or(ParseError::MissingId)?;
    let digits = token
        .strip_prefix('#')
        .ok_or_else(|| ParseError::MissingHashPrefix(token.to_string()))?;

    digits
        .parse::<i64>()
        .map(|id| Some(PatternId(id)))
        .map_err(|_| ParseError::InvalidId(digits.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub lines: u64,
    pub matches: u64,
    pub parse_failures: u64,
    pub reports: u64,
}

pub struct IngestLoop {
    windows: Arc<Mutex<WindowSet>>,
    catalog: Arc<PatternCatalog>,
    reporter: Reporter,
    clock: Clock,
    first_report: Duration,
    report_interval: Duration,
}

impl IngestLoop {
    pub fn new(
        windows: Arc<Mutex<WindowSet>>,
        catalog: Arc<PatternCatalog>,
        reporter: Reporter,
        first_report: Duration,
        report_interval: Duration,
    ) -> Self {
        Self {
            windows,
            catalog,
            reporter,
            clock: wall_clock(),
            first_report,
            report_interval,
        }
    }

    /// Replace the wall clock (deterministic timestamps in tests)
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Weight and polarity for a matched id at `now`
    pub fn classify(&self, id: PatternId, now: f64) -> MatchEvent {
        MatchEvent::new(id, self.catalog.weight(id), now)
    }

    /// Parse one line and, if it is a match, apply it to every horizon
    pub async fn apply_line(&self, line: &str, now: f64) -> Result<Option<MatchEvent>, ParseError> {
        let Some(id) = parse_match_line(line)? else {
            return Ok(None);
        };

        let event = self.classify(id, now);
        self.windows.lock().await.observe(&event);
        Ok(Some(event))
    }

    /// Run until the line channel closes, then write the final report
    pub async fn run(
        self,
        mut rx: mpsc::Receiver<String>,
        sink: &mut dyn ReportSink,
    ) -> Result<IngestStats, ReportError> {
        log::info!("🚀 Starting match ingestion");
        log::info!("   ├─ First report after: {}ms", self.first_report.as_millis());
        log::info!("   └─ Report interval: {}ms", self.report_interval.as_millis());

        let mut report_timer = interval_at(Instant::now() + self.first_report, self.report_interval);
        report_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut stats = IngestStats::default();
        let mut window_lines = 0u64;
        let mut last_log_time = std::time::Instant::now();

        loop {
            tokio::select! {
                maybe_line = rx.recv() => {
                    let Some(line) = maybe_line else {
                        log::info!("📭 Line channel closed, stopping ingestion");
                        break;
                    };

                    stats.lines += 1;
                    window_lines += 1;

                    match self.apply_line(&line, (self.clock)()).await {
                        Ok(Some(_)) => stats.matches += 1,
                        Ok(None) => {}
                        Err(e) => {
                            stats.parse_failures += 1;
                            log::debug!("⚠️  Skipping line {:?}: {}", line, e);
                        }
                    }

                    // Log throughput every 10 seconds
                    if last_log_time.elapsed().as_secs() >= 10 {
                        let lines_per_sec = window_lines as f64 / last_log_time.elapsed().as_secs_f64();
                        log::info!(
                            "📊 Ingestion rate: {:.1} lines/sec (lines: {}, matches: {}, parse failures: {})",
                            lines_per_sec, stats.lines, stats.matches, stats.parse_failures
                        );
                        last_log_time = std::time::Instant::now();
                        window_lines = 0;
                    }
                }

                _ = report_timer.tick() => {
                    match self.reporter.report((self.clock)(), sink).await {
                        Ok(_) => stats.reports += 1,
                        Err(e) => log::error!("❌ Failed to write report: {}", e),
                    }
                }
            }
        }

        log::info!("🔄 Writing final report...");
        self.reporter.report((self.clock)(), sink).await?;
        stats.reports += 1;

        log::info!(
            "✅ Ingestion stopped (lines: {}, matches: {}, parse failures: {}, reports: {})",
            stats.lines,
            stats.matches,
            stats.parse_failures,
            stats.reports
        );
        Ok(stats)
    }
}
