//! Lexicon file parsing
//!
//! Plain lexicons hold one pattern per line. The scored lexicon holds
//! `<pattern> <mean> <std>` per line.

use crate::error::CatalogError;
use std::path::{Path, PathBuf};

/// Lexicon files to build the catalog from; `None` skips a lexicon
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSources {
    pub negative: Option<PathBuf>,
    pub positive: Option<PathBuf>,
    pub scored: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredLine {
    pub pattern: String,
    pub mean: f64,
    pub std: f64,
}

pub fn read_lexicon(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Non-empty lines of a plain lexicon, line endings stripped
pub fn patterns(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
}

/// Parse one scored-lexicon line, `None` when malformed
pub fn parse_scored_line(line: &str) -> Option<ScoredLine> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return None;
    }

    let mean = fields[1].parse::<f64>().ok().filter(|v| v.is_finite())?;
    let std = fields[2].parse::<f64>().ok().filter(|v| v.is_finite())?;

    Some(ScoredLine {
        pattern: fields[0].to_string(),
        mean,
        std,
    })
}
