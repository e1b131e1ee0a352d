//! Real-time sentiment over a stream of pattern matches
//!
//! An external matcher prints one line per lexicon hit; this crate turns those
//! lines into exponentially decaying positive/negative totals and per-pattern
//! frequencies over several half-lives, and reports them periodically.

pub mod catalog;
pub mod error;
pub mod matcher;
pub mod pipeline;

pub use catalog::PatternCatalog;
pub use error::{CatalogError, ConfigError, MatcherError, ParseError, ReportError, SentiflowError};
