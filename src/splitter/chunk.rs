//! Chunk and metadata types produced by the Markdown splitter

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};

/// Markdown heading depth, derived from the length of a `#` marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderLevel {
    H1 = 1,
    H2 = 2,
    H3 = 3,
    H4 = 4,
    H5 = 5,
    H6 = 6,
}

impl HeaderLevel {
    /// All levels, shallowest first
    pub const ALL: [HeaderLevel; 6] = [
        HeaderLevel::H1,
        HeaderLevel::H2,
        HeaderLevel::H3,
        HeaderLevel::H4,
        HeaderLevel::H5,
        HeaderLevel::H6,
    ];

    /// Level for a marker of `depth` characters, if it is a valid heading depth
    pub fn from_depth(depth: usize) -> Option<Self> {
        Self::ALL.get(depth.checked_sub(1)?).copied()
    }

    /// Number of `#` characters in the marker for this level
    pub fn depth(self) -> usize {
        self as usize
    }

    /// The `#` marker for this level
    pub fn marker(self) -> String {
        "#".repeat(self.depth())
    }

    /// Metadata key used by the default header configuration
    pub fn default_name(self) -> &'static str {
        match self {
            HeaderLevel::H1 => "h1",
            HeaderLevel::H2 => "h2",
            HeaderLevel::H3 => "h3",
            HeaderLevel::H4 => "h4",
            HeaderLevel::H5 => "h5",
            HeaderLevel::H6 => "h6",
        }
    }
}

/// One open heading on the header stack
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HeaderEntry {
    /// Heading depth
    pub level: HeaderLevel,
    /// Configured metadata key for this depth (e.g. "h2")
    pub name: String,
    /// Heading text with the marker stripped
    pub text: String,
}

/// Hierarchical context of a chunk: the open headings plus document-level tags
///
/// Headings are kept in stack order (strictly increasing level). Tags come from
/// the caller and are shadowed by a heading with the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkMetadata {
    headers: Vec<HeaderEntry>,
    tags: IndexMap<String, String>,
}

impl ChunkMetadata {
    /// Build metadata from an ordered list of open headings
    pub fn from_headers(headers: Vec<HeaderEntry>) -> Self {
        debug_assert!(headers.windows(2).all(|w| w[0].level < w[1].level));
        Self {
            headers,
            tags: IndexMap::new(),
        }
    }

    /// Attach document-level tags underneath the heading context
    pub fn with_tags(mut self, tags: &IndexMap<String, String>) -> Self {
        self.tags = tags.clone();
        self
    }

    /// Open headings, outermost first
    pub fn headers(&self) -> &[HeaderEntry] {
        &self.headers
    }

    /// Document-level tags supplied by the caller
    pub fn tags(&self) -> &IndexMap<String, String> {
        &self.tags
    }

    /// Look up a value by key; heading names take precedence over tags
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name == key)
            .map(|h| h.text.as_str())
            .or_else(|| self.tags.get(key).map(String::as_str))
    }

    /// Text of the open heading at `level`, if any
    pub fn header(&self, level: HeaderLevel) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.level == level)
            .map(|h| h.text.as_str())
    }

    /// Effective key/value pairs: headings in stack order, then unshadowed tags
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let headings = self
            .headers
            .iter()
            .map(|h| (h.name.as_str(), h.text.as_str()));
        let tags = self
            .tags
            .iter()
            .filter(|(key, _)| !self.headers.iter().any(|h| &h.name == *key))
            .map(|(k, v)| (k.as_str(), v.as_str()));
        headings.chain(tags)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.tags.is_empty()
    }
}

impl Serialize for ChunkMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// A piece of a Markdown document with its header context
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Chunk {
    /// Chunk text, possibly spanning several lines
    pub content: String,
    /// Header context and document tags
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Render the chunk as Markdown, optionally preceded by a front-matter block
    pub fn to_markdown(&self, include_metadata: bool) -> String {
        if !include_metadata || self.metadata.is_empty() {
            return self.content.clone();
        }

        let mut out = String::from("---\n");
        for (key, value) in self.metadata.iter() {
            // Front matter is line oriented
            let value = value.replace(['\r', '\n'], " ");
            out.push_str(&format!("{key}: {value}\n"));
        }
        out.push_str("---\n");
        out.push_str(&self.content);
        out
    }
}

/// Remove a leading `---` front-matter block written by [`Chunk::to_markdown`]
pub fn strip_front_matter(markdown: &str) -> &str {
    let Some(body) = markdown.strip_prefix("---\n") else {
        return markdown;
    };
    if let Some(rest) = body.strip_prefix("---\n") {
        return rest;
    }
    match body.find("\n---\n") {
        Some(end) => &body[end + "\n---\n".len()..],
        None => markdown,
    }
}
