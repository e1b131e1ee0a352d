//! Pattern catalog - signed pattern ids, display names and scores
//!
//! The catalog is built once at startup from the sentiment lexicons and is
//! read-only afterwards. It serves two purposes:
//! - the pattern file handed to the external matcher (`<id> "<pattern>"`)
//! - weight and display-name lookups while ingesting and reporting
//!
//! Id assignment:
//! - negative lexicon: `-1, -2, ...` in file order
//! - positive lexicon: `1, 2, ...` in file order
//! - scored lexicon: reuses the id of a known pattern, otherwise extends the
//!   negative sequence when the mean score is negative, else the positive one

pub mod lexicon;

pub use lexicon::{CatalogSources, ScoredLine};

use crate::error::CatalogError;
use crate::pipeline::types::PatternId;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

/// Sentiment score attached by the scored lexicon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternScore {
    pub mean: f64,
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternEntry {
    pub id: PatternId,
    pub pattern: String,
    pub score: Option<PatternScore>,
}

#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    entries: HashMap<PatternId, PatternEntry>,
    ids_by_pattern: HashMap<String, PatternId>,
    /// Assignment order, used when writing the pattern file
    order: Vec<PatternId>,
    last_negative: i64,
    last_positive: i64,
}

impl PatternCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the catalog from the configured lexicon files
    pub fn load(sources: &CatalogSources) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();

        if let Some(path) = &sources.negative {
            let text = lexicon::read_lexicon(path)?;
            let added = catalog.extend_negative(lexicon::patterns(&text));
            log::info!("📖 Loaded {} negative patterns from {}", added, path.display());
        }

        if let Some(path) = &sources.positive {
            let text = lexicon::read_lexicon(path)?;
            let added = catalog.extend_positive(lexicon::patterns(&text));
            log::info!("📖 Loaded {} positive patterns from {}", added, path.display());
        }

        if let Some(path) = &sources.scored {
            let text = lexicon::read_lexicon(path)?;
            let mut scored = 0;
            for line in text.lines() {
                match lexicon::parse_scored_line(line) {
                    Some(entry) => {
                        catalog.add_scored(&entry.pattern, entry.mean, Some(entry.std));
                        scored += 1;
                    }
                    None if line.trim().is_empty() => {}
                    None => log::warn!("⚠️  Bad format in {}: {:?}", path.display(), line),
                }
            }
            log::info!("📖 Loaded {} scored patterns from {}", scored, path.display());
        }

        Ok(catalog)
    }

    pub fn add_negative(&mut self, pattern: &str) -> PatternId {
        self.last_negative -= 1;
        let id = PatternId(self.last_negative);
        self.insert(id, pattern, None);
        id
    }

    pub fn add_positive(&mut self, pattern: &str) -> PatternId {
        self.last_positive += 1;
        let id = PatternId(self.last_positive);
        self.insert(id, pattern, None);
        id
    }

    pub fn extend_negative<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>) -> usize {
        let mut added = 0;
        for pattern in patterns {
            self.add_negative(pattern);
            added += 1;
        }
        added
    }

    pub fn extend_positive<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>) -> usize {
        let mut added = 0;
        for pattern in patterns {
            self.add_positive(pattern);
            added += 1;
        }
        added
    }

    /// Attach a score to a known pattern, or add it under a new id
    pub fn add_scored(&mut self, pattern: &str, mean: f64, std: Option<f64>) -> PatternId {
        let score = PatternScore { mean, std };

        if let Some(&id) = self.ids_by_pattern.get(pattern) {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.score = Some(score);
            }
            return id;
        }

        let id = if mean < 0.0 {
            self.last_negative -= 1;
            PatternId(self.last_negative)
        } else {
            self.last_positive += 1;
            PatternId(self.last_positive)
        };
        self.insert(id, pattern, Some(score));
        id
    }

    fn insert(&mut self, id: PatternId, pattern: &str, score: Option<PatternScore>) {
        self.ids_by_pattern.insert(pattern.to_string(), id);
        self.entries.insert(
            id,
            PatternEntry {
                id,
                pattern: pattern.to_string(),
                score,
            },
        );
        self.order.push(id);
    }

    pub fn get(&self, id: PatternId) -> Option<&PatternEntry> {
        self.entries.get(&id)
    }

    pub fn id_of(&self, pattern: &str) -> Option<PatternId> {
        self.ids_by_pattern.get(pattern).copied()
    }

    /// Evidence weight of a match: `|mean score|` when scored, else 1
    pub fn weight(&self, id: PatternId) -> f64 {
        self.entries
            .get(&id)
            .and_then(|entry| entry.score)
            .map(|score| score.mean.abs())
            .unwrap_or(1.0)
    }

    /// Pattern text, or the numeric id for patterns the catalog never assigned
    pub fn display_name(&self, id: PatternId) -> String {
        match self.entries.get(&id) {
            Some(entry) => entry.pattern.clone(),
            None => id.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pattern file contents in assignment order
    pub fn render_pattern_file(&self) -> String {
        let mut out = String::new();
        for id in &self.order {
            if let Some(entry) = self.entries.get(id) {
                let _ = writeln!(out, "{} \"{}\"", id, entry.pattern);
            }
        }
        out
    }

    pub fn write_pattern_file(&self, path: &Path) -> Result<(), CatalogError> {
        std::fs::write(path, self.render_pattern_file()).map_err(|source| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("✅ Wrote {} patterns to {}", self.order.len(), path.display());
        Ok(())
    }
}
