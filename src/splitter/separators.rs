//! Boundary separators used when refining oversized chunks
//!
//! Separators are plain configuration data: a list of patterns plus a flag
//! saying whether they are regular expressions or literals. The refiner asks
//! the compiled set which kinds of boundary it may cut at.

use crate::error::ChunkingError;
use regex::Regex;

/// Default separators, most significant first: paragraph break, line break,
/// then CJK and Latin sentence terminators
pub fn default_separators() -> Vec<String> {
    ["\n\n", "\n", "。", "！", "？", "；", ". ", "! ", "? ", "; "]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Compiled separator list
#[derive(Debug, Clone)]
pub struct SeparatorSet {
    separators: Vec<Regex>,
}

impl SeparatorSet {
    /// Compile `patterns`; literals are escaped unless `is_regex` is set
    pub fn new(patterns: &[String], is_regex: bool) -> Result<Self, ChunkingError> {
        let mut separators = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            if pattern.is_empty() {
                return Err(ChunkingError::InvalidSeparator {
                    separator: pattern.clone(),
                    reason: "must not be empty".to_string(),
                });
            }
            let source = if is_regex {
                pattern.clone()
            } else {
                regex::escape(pattern)
            };
            let regex = Regex::new(&source).map_err(|e| ChunkingError::InvalidSeparator {
                separator: pattern.clone(),
                reason: e.to_string(),
            })?;
            separators.push(regex);
        }
        Ok(Self { separators })
    }

    /// Whether some separator spans exactly a blank-line paragraph break
    pub fn splits_paragraphs(&self) -> bool {
        self.matches_exactly("\n\n")
    }

    /// Whether some separator spans exactly a single line break
    pub fn splits_lines(&self) -> bool {
        self.matches_exactly("\n")
    }

    pub fn len(&self) -> usize {
        self.separators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.separators.is_empty()
    }

    fn matches_exactly(&self, sample: &str) -> bool {
        self.separators.iter().any(|sep| {
            sep.find(sample)
                .is_some_and(|m| m.start() == 0 && m.end() == sample.len())
        })
    }
}
