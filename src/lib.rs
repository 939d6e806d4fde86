//! # docprep - Article Preparation and Header-Aware Markdown Chunking
//!
//! Turns raw scraped articles (Markdown with boilerplate, bylines and
//! promotional text) into clean, retrieval-ready chunks.
//!
//! ## Pipeline
//!
//! ```text
//! raw article
//!   -> BoilerplateCleaner   (titles, promo text, UI residue, blank runs)
//!   -> BylineFormatter      (trailing source/author block under `---`)
//!   -> ensure_title         (`# {file stem}`)
//!   -> Refiner (optional)   (LLM heading cleanup)
//!   -> MarkdownSplitter     (header-scoped, size-bounded chunks)
//! ```
//!
//! The splitter is the core: a single pass tracks code fences and the header
//! stack, adjacent lines sharing a header context are merged into chunks, and
//! with a chunk size configured, oversized chunks are cut at paragraph or line
//! boundaries without ever splitting a fenced code block.
//!
//! ## Modules
//!
//! - [`splitter`]: header-aware Markdown splitter
//! - [`preprocess`]: boilerplate cleanup, byline formatting, title insertion
//! - [`refine`]: LLM cleanup pass behind the [`refine::Refiner`] trait
//! - [`pipeline`]: per-document preparation combining the stages above
//! - [`config`]: configuration management with environment variable support
//! - [`error`]: error types
//! - [`paths`]: platform config locations
//!
//! ## Usage Example
//!
//! ```
//! use docprep::splitter::{MarkdownSplitter, SplitterOptions};
//!
//! let splitter = MarkdownSplitter::new(SplitterOptions::default()).unwrap();
//! let chunks = splitter.split("# Title\n\nIntro.\n\n## Section\n\nBody.\n");
//!
//! assert_eq!(chunks.len(), 2);
//! assert_eq!(chunks[1].metadata.get("h2"), Some("Section"));
//! ```

/// Configuration management with environment variable overrides
pub mod config;

/// Error types and utilities
pub mod error;

/// Platform-specific config file location
pub mod paths;

/// Per-document preparation pipeline
pub mod pipeline;

/// Article cleanup ahead of chunking
pub mod preprocess;

/// Optional LLM cleanup pass
pub mod refine;

/// Header-aware Markdown splitter
pub mod splitter;
