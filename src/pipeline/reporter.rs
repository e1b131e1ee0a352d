//! Periodic sentiment and heavy-hitter reports
//!
//! A report pass locks the window set once, advances every horizon's polarity
//! counters to `now`, ranks the heavy hitters (which decays every tracked key
//! as well) and hands one [`HorizonReport`] per horizon to a [`ReportSink`].

use super::ranking::RankedKey;
use super::windows::WindowSet;
use crate::catalog::PatternCatalog;
use crate::error::ReportError;
use crate::pipeline::types::PatternId;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable line per horizon
    Text,
    /// One JSON object per horizon
    Jsonl,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "jsonl" | "json" => Ok(ReportFormat::Jsonl),
            other => Err(format!("unknown report format {:?} (expected text or jsonl)", other)),
        }
    }
}

/// Zone of the date printed on text report lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportTimezone {
    #[default]
    Local,
    Utc,
}

impl FromStr for ReportTimezone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(ReportTimezone::Local),
            "utc" => Ok(ReportTimezone::Utc),
            other => Err(format!("unknown report time zone {:?} (expected local or utc)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeavyHitter {
    pub id: PatternId,
    pub name: String,
    pub value: f64,
}

/// Report of a single horizon at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonReport {
    /// Unix seconds
    pub timestamp: f64,
    pub horizon_secs: f64,
    pub positive: f64,
    pub negative: f64,
    /// Positive share in percent, absent when there is no evidence
    pub score: Option<f64>,
    pub heavy_hitters: Vec<HeavyHitter>,
}

impl HorizonReport {
    pub fn render(&self, format: ReportFormat, timezone: ReportTimezone) -> Result<String, ReportError> {
        match format {
            ReportFormat::Text => Ok(self.render_text(timezone)),
            ReportFormat::Jsonl => Ok(serde_json::to_string(self)?),
        }
    }

    /// `<date> <epoch> <horizon> : Score: <pct> % [ <name> (<value>) ... ]`
    pub fn render_text(&self, timezone: ReportTimezone) -> String {
        let mut line = format!(
            "{} {:.1} {:>8} :",
            format_wall_clock(self.timestamp, timezone),
            self.timestamp,
            self.horizon_secs
        );

        if let Some(score) = self.score {
            let _ = write!(line, " Score: {:.1} %", score);

            if !self.heavy_hitters.is_empty() {
                line.push_str(" [");
                for hitter in &self.heavy_hitters {
                    let _ = write!(line, " {} ({:.1})", hitter.name, hitter.value);
                }
                line.push_str(" ]");
            }
        }

        line
    }
}

const DATE_FORMAT: &str = "%a, %d %B %Y %H:%M:%S";

fn format_wall_clock(timestamp: f64, timezone: ReportTimezone) -> String {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;
    let Some(at) = chrono::DateTime::from_timestamp(secs as i64, nanos) else {
        return "-".to_string();
    };

    match timezone {
        ReportTimezone::Local => at.with_timezone(&chrono::Local).format(DATE_FORMAT).to_string(),
        ReportTimezone::Utc => at.format(DATE_FORMAT).to_string(),
    }
}

/// Destination for horizon reports
#[async_trait]
pub trait ReportSink: Send {
    async fn write_report(&mut self, report: &HorizonReport) -> Result<(), ReportError>;

    /// Flush pending writes
    async fn flush(&mut self) -> Result<(), ReportError>;

    /// Sink type for logging
    fn sink_type(&self) -> &'static str;
}

/// Writes rendered report lines to any async writer (stdout in production)
pub struct LineWriterSink<W> {
    writer: W,
    format: ReportFormat,
    timezone: ReportTimezone,
}

impl<W> LineWriterSink<W> {
    pub fn new(writer: W, format: ReportFormat) -> Self {
        Self {
            writer,
            format,
            timezone: ReportTimezone::default(),
        }
    }

    pub fn with_timezone(mut self, timezone: ReportTimezone) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl LineWriterSink<tokio::io::Stdout> {
    pub fn stdout(format: ReportFormat) -> Self {
        Self::new(tokio::io::stdout(), format)
    }
}

#[async_trait]
impl<W> ReportSink for LineWriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_report(&mut self, report: &HorizonReport) -> Result<(), ReportError> {
        let mut line = report.render(self.format, self.timezone)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ReportError> {
        self.writer.flush().await?;
        Ok(())
    }

    fn sink_type(&self) -> &'static str {
        match self.format {
            ReportFormat::Text => "text",
            ReportFormat::Jsonl => "jsonl",
        }
    }
}

/// Builds per-horizon reports from the shared window set
#[derive(Clone)]
pub struct Reporter {
    windows: Arc<Mutex<WindowSet>>,
    catalog: Arc<PatternCatalog>,
    top_k: usize,
}

impl Reporter {
    pub fn new(windows: Arc<Mutex<WindowSet>>, catalog: Arc<PatternCatalog>, top_k: usize) -> Self {
        Self {
            windows,
            catalog,
            top_k,
        }
    }

    /// Snapshot and rank every horizon at `now`
    ///
    /// Holds the window lock for the whole pass so ingestion never interleaves
    /// with a half-decayed horizon.
    pub async fn build_reports(&self, now: f64) -> Vec<HorizonReport> {
        let mut windows = self.windows.lock().await;

        windows
            .aggregators_mut()
            .iter_mut()
            .map(|aggregator| {
                let snapshot = aggregator.snapshot(now);
                let score = snapshot.score();

                let heavy_hitters = match score {
                    Some(_) => aggregator
                        .heavy_hitters(now, self.top_k)
                        .into_iter()
                        .map(|ranked| self.name(ranked))
                        .collect(),
                    None => Vec::new(),
                };

                HorizonReport {
                    timestamp: now,
                    horizon_secs: aggregator.halflife(),
                    positive: snapshot.positive,
                    negative: snapshot.negative,
                    score,
                    heavy_hitters,
                }
            })
            .collect()
    }

    /// Build reports at `now` and write them all to `sink`
    pub async fn report(&self, now: f64, sink: &mut dyn ReportSink) -> Result<usize, ReportError> {
        let reports = self.build_reports(now).await;

        for report in &reports {
            sink.write_report(report).await?;
        }
        sink.flush().await?;

        log::debug!("📊 Wrote {} horizon reports to {} sink", reports.len(), sink.sink_type());
        Ok(reports.len())
    }

    fn name(&self, ranked: RankedKey) -> HeavyHitter {
        HeavyHitter {
            id: ranked.key,
            name: self.catalog.display_name(ranked.key),
            value: ranked.value,
        }
    }
}
