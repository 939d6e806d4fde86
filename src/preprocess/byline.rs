//! Trailing source and author block formatting
//!
//! Articles often end with lines like `撰稿人：张三` or `来源：某某`. The block of
//! such lines at the end of a document is moved under a `---` rule and quoted.

use crate::config::CleanConfig;
use crate::error::CleanError;
use regex::Regex;

/// Characters trimmed from a line before it is matched against the pattern
const MATCH_TRIM: &[char] = &['*', '-', ' ', '_'];
/// Characters trimmed from a line when it is quoted
const QUOTE_TRIM: &[char] = &['*', '-', ' '];

#[derive(Debug, Clone)]
pub struct BylineFormatter {
    pattern: Option<Regex>,
}

impl BylineFormatter {
    pub fn new(config: &CleanConfig) -> Result<Self, CleanError> {
        if config.byline_keys.is_empty() {
            return Ok(Self { pattern: None });
        }

        let keys = config
            .byline_keys
            .iter()
            .map(|key| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|");
        let source = format!(r"^\s*[*-]?\s*({keys})\s*[:：].*$");
        let pattern = Regex::new(&source).map_err(|e| CleanError::InvalidPattern {
            pattern: source.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Whether a single line is a source/author line
    pub fn is_byline(&self, line: &str) -> bool {
        let Some(pattern) = &self.pattern else {
            return false;
        };
        pattern.is_match(line.trim().trim_matches(MATCH_TRIM))
    }

    /// Quote the trailing byline block under a `---` rule; text without one is
    /// returned unchanged
    pub fn format(&self, text: &str) -> String {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();

        let mut start = None;
        for (i, line) in lines.iter().enumerate().rev() {
            if self.is_byline(line) {
                start = Some(i);
            } else if line.trim().is_empty() {
                // Blank lines only join a block that has already started
                if start.is_some() {
                    start = Some(i);
                }
            } else {
                break;
            }
        }

        let Some(start) = start else {
            return text.to_string();
        };

        let body: String = lines[..start].concat();
        let mut out = body.trim_end().to_string();
        out.push_str("\n\n---\n");
        for line in &lines[start..] {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            out.push_str("> ");
            out.push_str(line.trim_matches(QUOTE_TRIM));
            out.push('\n');
        }

        tracing::debug!("Formatted trailing byline block of {} lines", lines.len() - start);
        out
    }
}
