//! Error taxonomy for the sentiment pipeline
//!
//! Configuration and catalog errors are fatal at startup. Parse errors are
//! skip-and-continue inside the ingest loop. Matcher errors end ingestion but
//! never prevent the final report.

use std::path::PathBuf;

/// Startup configuration errors (always fatal)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("half-life must be a positive finite number of seconds, got {0}")]
    InvalidHalfLife(f64),

    #[error("invalid value for {variable}: {reason}")]
    InvalidValue { variable: String, reason: String },

    #[error("at least one horizon must be configured")]
    NoHorizons,

    #[error("missing argument: {0}")]
    MissingArgument(String),
}

/// Lexicon loading and pattern-file writing errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read lexicon {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write pattern file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A match line that looked like a match but could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("match line has no pattern id token")]
    MissingId,

    #[error("pattern id token {0:?} lacks the '#' prefix")]
    MissingHashPrefix(String),

    #[error("pattern id {0:?} is not an integer")]
    InvalidId(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("failed to spawn matcher {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("matcher stdout was not captured")]
    MissingStdout,

    #[error("failed to read matcher output: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to wait for matcher: {0}")]
    Wait(#[source] std::io::Error),
}

/// Umbrella error returned by the runtime binary
#[derive(Debug, thiserror::Error)]
pub enum SentiflowError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Matcher(#[from] MatcherError),
}
