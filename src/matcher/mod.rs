//! External matcher integration
//!
//! The matcher is an external pattern-matching process. It reads the pattern
//! file written by the catalog and prints one `Pattern #<id> ...` line per
//! match; everything else it prints is ignored by the ingest loop.

pub mod config;
pub mod source;

pub use config::{LineSourceKind, MatcherCommand};
pub use source::{forward_lines, run_matcher, run_stdin};
