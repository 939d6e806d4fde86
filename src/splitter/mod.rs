//! Header-aware Markdown splitter
//!
//! Splitting runs in layers: the scanner tracks code fences and the header
//! stack line by line, the aggregator merges lines sharing a header context
//! into chunks, and, when a chunk size is configured, the refiner cuts
//! oversized chunks at paragraph or line boundaries outside code fences.

mod aggregate;
pub mod chunk;
pub mod length;
mod refine;
pub mod scanner;
pub mod separators;

pub use chunk::{Chunk, ChunkMetadata, HeaderEntry, HeaderLevel, strip_front_matter};
pub use length::{LengthCalculator, LengthFn, LengthUnit};
pub use scanner::{
    Fence, FenceState, FenceTransition, HeaderMarker, LineRecord, build_header_markers,
    default_header_markers,
};
pub use separators::{SeparatorSet, default_separators};

use crate::config::SplitterConfig;
use crate::error::ChunkingError;
use indexmap::IndexMap;
use refine::ChunkRefiner;
use scanner::Scanner;
use std::fmt;

/// Construction options for [`MarkdownSplitter`]
#[derive(Clone)]
pub struct SplitterOptions {
    /// `(marker, name)` pairs such as `("##", "h2")`
    pub headers_to_split_on: Vec<(String, String)>,
    /// Leave header lines out of chunk content
    pub strip_headers: bool,
    /// Maximum non-code length of a chunk; `None` disables refinement
    pub chunk_size: Option<usize>,
    /// Unit chunk sizes are measured in
    pub length_unit: LengthUnit,
    /// Custom measurer; replaces `length_unit` when set
    pub length_function: Option<LengthFn>,
    pub separators: Vec<String>,
    pub is_separator_regex: bool,
}

impl Default for SplitterOptions {
    fn default() -> Self {
        Self {
            headers_to_split_on: default_header_pairs(),
            strip_headers: false,
            chunk_size: None,
            length_unit: LengthUnit::Chars,
            length_function: None,
            separators: default_separators(),
            is_separator_regex: false,
        }
    }
}

impl SplitterOptions {
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers_to_split_on = headers;
        self
    }

    pub fn with_strip_headers(mut self, strip: bool) -> Self {
        self.strip_headers = strip;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: Option<usize>) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_length_unit(mut self, unit: LengthUnit) -> Self {
        self.length_unit = unit;
        self
    }

    pub fn with_length_function(mut self, length_function: LengthFn) -> Self {
        self.length_function = Some(length_function);
        self
    }

    pub fn with_separators(mut self, separators: Vec<String>, is_regex: bool) -> Self {
        self.separators = separators;
        self.is_separator_regex = is_regex;
        self
    }
}

impl fmt::Debug for SplitterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitterOptions")
            .field("headers_to_split_on", &self.headers_to_split_on)
            .field("strip_headers", &self.strip_headers)
            .field("chunk_size", &self.chunk_size)
            .field("length_unit", &self.length_unit)
            .field("custom_length", &self.length_function.is_some())
            .field("separators", &self.separators)
            .field("is_separator_regex", &self.is_separator_regex)
            .finish_non_exhaustive()
    }
}

impl From<&SplitterConfig> for SplitterOptions {
    fn from(config: &SplitterConfig) -> Self {
        Self {
            headers_to_split_on: config.headers_to_split_on.clone(),
            strip_headers: config.strip_headers,
            chunk_size: config.chunk_size,
            length_unit: config.length_unit,
            length_function: None,
            separators: config.separators.clone(),
            is_separator_regex: config.is_separator_regex,
        }
    }
}

/// `("#", "h1")` through `("######", "h6")`
pub fn default_header_pairs() -> Vec<(String, String)> {
    HeaderLevel::ALL
        .iter()
        .map(|level| (level.marker(), level.default_name().to_string()))
        .collect()
}

/// Splits Markdown documents into header-scoped, optionally size-bounded chunks
///
/// Built once and reused; every call to [`split`](Self::split) owns its own
/// scan state, so a splitter can be shared across threads.
#[derive(Debug, Clone)]
pub struct MarkdownSplitter {
    markers: Vec<HeaderMarker>,
    strip_headers: bool,
    chunk_size: Option<usize>,
    length: LengthCalculator,
    separators: SeparatorSet,
}

impl MarkdownSplitter {
    /// Validate `options` and build a splitter
    pub fn new(options: SplitterOptions) -> Result<Self, ChunkingError> {
        if options.chunk_size == Some(0) {
            return Err(ChunkingError::InvalidChunkSize(
                "chunk size must be greater than 0".to_string(),
            ));
        }

        let markers = build_header_markers(&options.headers_to_split_on)?;
        let separators = SeparatorSet::new(&options.separators, options.is_separator_regex)?;
        let length = match options.length_function {
            Some(measure) => LengthCalculator::new(measure)?,
            None => LengthCalculator::for_unit(options.length_unit)?,
        };

        tracing::debug!(
            "Built Markdown splitter: {} header markers, {} separators, chunk size {:?}, strip headers {}",
            markers.len(),
            separators.len(),
            options.chunk_size,
            options.strip_headers
        );

        Ok(Self {
            markers,
            strip_headers: options.strip_headers,
            chunk_size: options.chunk_size,
            length,
            separators,
        })
    }

    pub fn from_config(config: &SplitterConfig) -> Result<Self, ChunkingError> {
        Self::new(SplitterOptions::from(config))
    }

    /// Split `text` into ordered chunks
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        self.split_with_metadata(text, &IndexMap::new())
    }

    /// Split `text`, attaching `base` tags under every chunk's heading metadata
    pub fn split_with_metadata(&self, text: &str, base: &IndexMap<String, String>) -> Vec<Chunk> {
        let records = self.scan(text);
        let chunks = aggregate::aggregate(records, base);

        let Some(limit) = self.chunk_size else {
            tracing::debug!("Split document into {} chunks", chunks.len());
            return chunks;
        };

        let refiner = ChunkRefiner::new(limit, &self.length, &self.separators);
        let before = chunks.len();
        let refined: Vec<Chunk> = chunks
            .into_iter()
            .flat_map(|chunk| refiner.refine(chunk))
            .collect();
        tracing::debug!(
            "Split document into {} chunks ({} before size refinement)",
            refined.len(),
            before
        );
        refined
    }

    /// Header-scoped line records before aggregation
    pub fn scan(&self, text: &str) -> Vec<LineRecord> {
        Scanner::new(&self.markers, self.strip_headers).scan(text)
    }

    /// Length of `text` with fenced code excluded, in the configured unit
    pub fn non_code_len(&self, text: &str) -> usize {
        self.length.non_code_len(text)
    }

    /// Markers in matching order, longest first
    pub fn markers(&self) -> &[HeaderMarker] {
        &self.markers
    }

    pub fn chunk_size(&self) -> Option<usize> {
        self.chunk_size
    }

    pub fn strip_headers(&self) -> bool {
        self.strip_headers
    }

    pub fn separators(&self) -> &SeparatorSet {
        &self.separators
    }
}

#[cfg(test)]
mod tests;
