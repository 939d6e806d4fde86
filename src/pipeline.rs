//! Per-document preparation: clean, format the byline, add the title,
//! optionally refine with an LLM, then split into chunks.

use crate::config::Config;
use crate::error::PrepError;
use crate::preprocess::{BoilerplateCleaner, BylineFormatter, ensure_title, title_from_file_name};
use crate::refine::Refiner;
use crate::splitter::{Chunk, MarkdownSplitter};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// A document after the deterministic preprocessing stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanedDocument {
    pub name: String,
    pub title: String,
    /// Names found on author lines of the raw article
    pub authors: Vec<String>,
    pub markdown: String,
}

/// A fully prepared, chunked document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedDocument {
    pub name: String,
    pub title: String,
    pub authors: Vec<String>,
    /// SHA-256 of `markdown`, hex encoded
    pub hash: String,
    pub markdown: String,
    pub chunks: Vec<Chunk>,
}

pub struct Pipeline {
    cleaner: BoilerplateCleaner,
    byline: BylineFormatter,
    splitter: MarkdownSplitter,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self, PrepError> {
        Ok(Self {
            cleaner: BoilerplateCleaner::new(&config.clean)?,
            byline: BylineFormatter::new(&config.clean)?,
            splitter: MarkdownSplitter::from_config(&config.splitter)?,
        })
    }

    pub fn splitter(&self) -> &MarkdownSplitter {
        &self.splitter
    }

    /// Clean, format the byline and add the title; `None` when too little
    /// content survives cleaning
    pub fn preprocess(&self, name: &str, raw: &str) -> Option<CleanedDocument> {
        let authors = self.cleaner.extract_authors(raw);
        let cleaned = self.cleaner.clean(raw);

        if !self.cleaner.is_substantial(&cleaned) {
            tracing::info!(
                "Skipping {}: only {} characters after cleaning",
                name,
                cleaned.chars().count()
            );
            return None;
        }

        let title = title_from_file_name(Path::new(name)).unwrap_or_else(|| name.to_string());
        let formatted = self.byline.format(&cleaned);
        let markdown = ensure_title(&title, &formatted);

        Some(CleanedDocument {
            name: name.to_string(),
            title,
            authors,
            markdown,
        })
    }

    /// Prepare a document without the LLM pass
    pub fn prepare(&self, name: &str, raw: &str) -> Option<PreparedDocument> {
        let cleaned = self.preprocess(name, raw)?;
        Some(self.finish(cleaned))
    }

    /// Prepare a document, passing the preprocessed Markdown through `refiner`
    pub async fn prepare_with(
        &self,
        name: &str,
        raw: &str,
        refiner: &dyn Refiner,
    ) -> Result<Option<PreparedDocument>, PrepError> {
        let Some(mut cleaned) = self.preprocess(name, raw) else {
            return Ok(None);
        };

        cleaned.markdown = refiner.refine(&cleaned.markdown).await?;
        tracing::debug!("Refined {} ({} chars)", name, cleaned.markdown.len());
        Ok(Some(self.finish(cleaned)))
    }

    /// Prepare explicit files in parallel; unreadable files are logged and skipped
    pub fn prepare_files(&self, paths: &[PathBuf]) -> Vec<PreparedDocument> {
        paths
            .par_iter()
            .filter_map(|path| {
                let raw = match std::fs::read_to_string(path) {
                    Ok(raw) => raw,
                    Err(e) => {
                        tracing::warn!("Skipping {}: {}", path.display(), e);
                        return None;
                    }
                };
                self.prepare(&document_name(path), &raw)
            })
            .collect()
    }

    fn finish(&self, cleaned: CleanedDocument) -> PreparedDocument {
        let mut base = IndexMap::new();
        base.insert("source".to_string(), cleaned.name.clone());
        base.insert("title".to_string(), cleaned.title.clone());
        if !cleaned.authors.is_empty() {
            base.insert("authors".to_string(), cleaned.authors.join("、"));
        }

        let chunks = self.splitter.split_with_metadata(&cleaned.markdown, &base);
        tracing::info!("Prepared {}: {} chunks", cleaned.name, chunks.len());

        PreparedDocument {
            hash: calculate_hash(&cleaned.markdown),
            name: cleaned.name,
            title: cleaned.title,
            authors: cleaned.authors,
            markdown: cleaned.markdown,
            chunks,
        }
    }
}

/// File name used as the document name
pub fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn calculate_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
