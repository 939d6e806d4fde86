//! Length measurement that ignores fenced code blocks

use crate::error::ChunkingError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Pluggable string measurer
pub type LengthFn = Arc<dyn Fn(&str) -> usize + Send + Sync>;

/// Non-greedy, multi-line fenced spans for either fence style
const FENCED_SPAN_PATTERN: &str = r"(?s)```.*?```|~~~.*?~~~";

/// Built-in units a chunk size can be expressed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Unicode scalar values
    #[default]
    Chars,
    /// UTF-8 bytes
    Bytes,
    /// Whitespace-separated words
    Words,
}

impl LengthUnit {
    pub fn measure(self, text: &str) -> usize {
        match self {
            LengthUnit::Chars => text.chars().count(),
            LengthUnit::Bytes => text.len(),
            LengthUnit::Words => text.split_whitespace().count(),
        }
    }

    /// Wrap this unit as a [`LengthFn`]
    pub fn length_fn(self) -> LengthFn {
        Arc::new(move |text: &str| self.measure(text))
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chars" | "characters" => Ok(LengthUnit::Chars),
            "bytes" => Ok(LengthUnit::Bytes),
            "words" => Ok(LengthUnit::Words),
            other => Err(format!(
                "unknown length unit '{other}', expected chars, bytes or words"
            )),
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LengthUnit::Chars => "chars",
            LengthUnit::Bytes => "bytes",
            LengthUnit::Words => "words",
        };
        f.write_str(name)
    }
}

/// Measures the non-code length of text
///
/// Every span between a fence token and the next occurrence of the same
/// token counts as zero, so code-heavy chunks are not split for their bulk.
/// An unterminated fence is measured like ordinary text.
#[derive(Clone)]
pub struct LengthCalculator {
    fenced_span: Regex,
    measure: LengthFn,
    /// Lines joined with `\n` measure as the sum of the lines and separators
    additive: bool,
}

impl LengthCalculator {
    /// Calculator for an arbitrary measurer; text is always measured whole
    pub fn new(measure: LengthFn) -> Result<Self, ChunkingError> {
        Self::build(measure, false)
    }

    /// Calculator for a built-in unit, whose lengths add up line by line
    pub fn for_unit(unit: LengthUnit) -> Result<Self, ChunkingError> {
        Self::build(unit.length_fn(), true)
    }

    fn build(measure: LengthFn, additive: bool) -> Result<Self, ChunkingError> {
        let fenced_span = Regex::new(FENCED_SPAN_PATTERN)
            .map_err(|e| ChunkingError::InvalidPattern(e.to_string()))?;
        Ok(Self {
            fenced_span,
            measure,
            additive,
        })
    }

    /// Length of `text` with fenced code spans excluded
    pub fn non_code_len(&self, text: &str) -> usize {
        if !text.contains("```") && !text.contains("~~~") {
            return (self.measure)(text);
        }
        let stripped = self.fenced_span.replace_all(text, "");
        (self.measure)(&stripped)
    }

    /// Length of `text` as measured by the configured function, code included
    pub fn raw_len(&self, text: &str) -> usize {
        (self.measure)(text)
    }

    /// Whether a running total over lines matches measuring them joined
    pub fn is_additive(&self) -> bool {
        self.additive
    }
}

impl fmt::Debug for LengthCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LengthCalculator")
            .field("fenced_span", &self.fenced_span.as_str())
            .field("additive", &self.additive)
            .finish_non_exhaustive()
    }
}
