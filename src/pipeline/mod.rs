//! # Decaying Sentiment Pipeline
//!
//! Maintains exponentially time-decaying statistics over several horizons at
//! once and reports a sentiment score plus heavy hitters for each of them.
//!
//! ## Architecture
//!
//! ```text
//! matcher stdout ──► mpsc<String> ──► IngestLoop (parse + classify)
//!                                          │
//!                                          ▼
//!                                   WindowSet (Arc<Mutex<_>>)
//!                                   ├─ KeyedAggregator 60s
//!                                   ├─ KeyedAggregator 1h
//!                                   └─ ...
//!                                          ▲
//! report timer (1s, then every 5s) ──► Reporter ──► ReportSink (stdout)
//! ```
//!
//! The report pass is not a pure read: it decays the polarity counters and
//! every tracked key's frequency to the report instant.
//!
//! ## Module Organization
//!
//! - `decay` - `DecayCounter`, the half-life counter primitive
//! - `types` - `PatternId`, `Polarity`, `MatchEvent`
//! - `windows` - per-horizon `KeyedAggregator` and the `WindowSet`
//! - `ranking` - top-K extraction over decayed frequencies
//! - `ingestion` - match-line parsing and the unified select loop
//! - `reporter` - report records, rendering and sinks
//! - `config` - environment configuration

pub mod config;
pub mod decay;
pub mod ingestion;
pub mod ranking;
pub mod reporter;
pub mod types;
pub mod windows;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use decay::DecayCounter;
pub use ingestion::{parse_match_line, wall_clock, Clock, IngestLoop, IngestStats};
pub use ranking::{heavy_hitters, RankedKey};
pub use reporter::{
    HeavyHitter, HorizonReport, LineWriterSink, ReportFormat, ReportSink, ReportTimezone, Reporter,
};
pub use types::{MatchEvent, PatternId, Polarity};
pub use windows::{KeyedAggregator, PolaritySnapshot, WindowSet};
