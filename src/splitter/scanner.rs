//! Line scanner: code-fence tracking, header matching and the header stack
//!
//! A single pass over the document turns raw lines into [`LineRecord`]s, each
//! holding the content accumulated under one header context.

use super::chunk::{ChunkMetadata, HeaderEntry, HeaderLevel};
use crate::error::ChunkingError;

/// A recognized header marker such as `###`, with the metadata key it records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMarker {
    marker: String,
    name: String,
    level: HeaderLevel,
}

impl HeaderMarker {
    /// Create a marker; it must be 1 to 6 `#` characters and have a non-empty name
    pub fn new(marker: impl Into<String>, name: impl Into<String>) -> Result<Self, ChunkingError> {
        let marker = marker.into();
        let name = name.into();

        if marker.is_empty() || !marker.chars().all(|c| c == '#') {
            return Err(ChunkingError::InvalidHeaderMarker {
                marker,
                reason: "must consist of '#' characters only".to_string(),
            });
        }
        let Some(level) = HeaderLevel::from_depth(marker.len()) else {
            return Err(ChunkingError::InvalidHeaderMarker {
                marker,
                reason: "level must be between 1 and 6".to_string(),
            });
        };
        if name.trim().is_empty() {
            return Err(ChunkingError::InvalidHeaderMarker {
                marker,
                reason: "name must not be empty".to_string(),
            });
        }

        Ok(Self {
            marker,
            name,
            level,
        })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> HeaderLevel {
        self.level
    }

    /// Heading text if the trimmed line is a header for this marker
    ///
    /// The marker must be followed by end-of-line or a space, so `##` never
    /// matches `###` and `#` never matches `#hashtag`.
    pub fn match_line<'a>(&self, trimmed: &'a str) -> Option<&'a str> {
        let rest = trimmed.strip_prefix(self.marker.as_str())?;
        if rest.is_empty() {
            return Some("");
        }
        rest.strip_prefix(' ').map(str::trim)
    }
}

/// The six standard Markdown header levels, named `h1`..`h6`
pub fn default_header_markers() -> Vec<HeaderMarker> {
    HeaderLevel::ALL
        .iter()
        .map(|level| HeaderMarker {
            marker: level.marker(),
            name: level.default_name().to_string(),
            level: *level,
        })
        .collect()
}

/// Validate configured `(marker, name)` pairs and order them longest-first
pub fn build_header_markers(
    pairs: &[(String, String)],
) -> Result<Vec<HeaderMarker>, ChunkingError> {
    let mut markers = Vec::with_capacity(pairs.len());
    for (marker, name) in pairs {
        let parsed = HeaderMarker::new(marker.trim(), name.trim())?;
        if markers.iter().any(|m: &HeaderMarker| m.marker == parsed.marker) {
            return Err(ChunkingError::InvalidHeaderMarker {
                marker: parsed.marker,
                reason: "configured more than once".to_string(),
            });
        }
        markers.push(parsed);
    }
    sort_longest_first(&mut markers);
    Ok(markers)
}

fn sort_longest_first(markers: &mut [HeaderMarker]) {
    markers.sort_by(|a, b| b.marker.len().cmp(&a.marker.len()));
}

/// Supported code-fence styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fence {
    Backtick,
    Tilde,
}

impl Fence {
    pub fn token(self) -> &'static str {
        match self {
            Fence::Backtick => "```",
            Fence::Tilde => "~~~",
        }
    }

    /// Fence opened by a trimmed line: it must start with the token and
    /// contain it exactly once (an inline ```` ```code``` ```` span opens nothing)
    fn opened_by(trimmed: &str) -> Option<Self> {
        [Fence::Backtick, Fence::Tilde].into_iter().find(|fence| {
            let token = fence.token();
            trimmed.starts_with(token) && trimmed.matches(token).count() == 1
        })
    }
}

/// How one line relates to code fences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceTransition {
    /// Ordinary line outside any fence
    Outside,
    /// Line opens a fence
    Opened(Fence),
    /// Line lies inside an open fence
    Inside,
    /// Line closes the open fence
    Closed(Fence),
}

impl FenceTransition {
    /// Whether the line belongs to a fenced block, boundary lines included
    pub fn is_fenced(self) -> bool {
        !matches!(self, FenceTransition::Outside)
    }
}

/// Code-fence state carried from line to line
///
/// A fence opened with one style is only closed by a line starting with the
/// same token; an unterminated fence stays open to the end of input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FenceState {
    open: Option<Fence>,
}

impl FenceState {
    /// Feed the next line and report its transition
    pub fn advance(&mut self, line: &str) -> FenceTransition {
        let trimmed = line.trim();
        match self.open {
            Some(fence) if trimmed.starts_with(fence.token()) => {
                self.open = None;
                FenceTransition::Closed(fence)
            }
            Some(_) => FenceTransition::Inside,
            None => match Fence::opened_by(trimmed) {
                Some(fence) => {
                    self.open = Some(fence);
                    FenceTransition::Opened(fence)
                }
                None => FenceTransition::Outside,
            },
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

/// Currently open headings, strictly increasing in level from bottom to top
#[derive(Debug, Default)]
pub(crate) struct HeaderStack {
    entries: Vec<HeaderEntry>,
}

impl HeaderStack {
    /// Close every heading at or below the new level, then open it
    pub(crate) fn push(&mut self, entry: HeaderEntry) {
        while self
            .entries
            .last()
            .is_some_and(|top| top.level >= entry.level)
        {
            self.entries.pop();
        }
        self.entries.push(entry);
    }

    pub(crate) fn snapshot(&self) -> ChunkMetadata {
        ChunkMetadata::from_headers(self.entries.clone())
    }

    #[cfg(test)]
    pub(crate) fn levels(&self) -> Vec<HeaderLevel> {
        self.entries.iter().map(|e| e.level).collect()
    }
}

/// Content accumulated under a single header context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    /// Source lines joined with `\n`
    pub content: String,
    /// Header context active while the content was read
    pub metadata: ChunkMetadata,
}

/// Single-pass scanner producing [`LineRecord`]s
pub(crate) struct Scanner<'a> {
    markers: &'a [HeaderMarker],
    strip_headers: bool,
}

impl<'a> Scanner<'a> {
    /// `markers` must already be sorted longest-first
    pub(crate) fn new(markers: &'a [HeaderMarker], strip_headers: bool) -> Self {
        Self {
            markers,
            strip_headers,
        }
    }

    pub(crate) fn scan(&self, text: &str) -> Vec<LineRecord> {
        let mut records = Vec::new();
        let mut fence = FenceState::default();
        let mut stack = HeaderStack::default();
        let mut metadata = ChunkMetadata::default();
        let mut buffer: Vec<&str> = Vec::new();

        for line in text.split('\n') {
            if fence.advance(line).is_fenced() {
                buffer.push(line);
                continue;
            }

            let trimmed = line.trim();
            if let Some((marker, heading)) = self.match_header(trimmed) {
                flush(&mut buffer, &metadata, &mut records);
                stack.push(HeaderEntry {
                    level: marker.level,
                    name: marker.name.clone(),
                    text: heading.to_string(),
                });
                metadata = stack.snapshot();
                tracing::trace!("Header {} '{}'", marker.marker, heading);
                if !self.strip_headers {
                    buffer.push(line);
                }
                continue;
            }

            // Leading blank lines of a section carry nothing
            if trimmed.is_empty() && buffer.is_empty() {
                continue;
            }
            buffer.push(line);
        }

        if fence.is_open() {
            tracing::debug!("Unterminated code fence runs to end of document");
        }
        flush(&mut buffer, &metadata, &mut records);
        records
    }

    /// First marker matching the line; markers are ordered longest-first
    fn match_header<'l>(&self, trimmed: &'l str) -> Option<(&'a HeaderMarker, &'l str)> {
        self.markers
            .iter()
            .find_map(|marker| marker.match_line(trimmed).map(|text| (marker, text)))
    }
}

fn flush(buffer: &mut Vec<&str>, metadata: &ChunkMetadata, records: &mut Vec<LineRecord>) {
    if buffer.is_empty() {
        return;
    }
    records.push(LineRecord {
        content: buffer.join("\n"),
        metadata: metadata.clone(),
    });
    buffer.clear();
}
