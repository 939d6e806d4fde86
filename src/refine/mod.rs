//! Optional LLM cleanup pass over prepared Markdown
//!
//! The pass is an opaque text-to-text transformation. The pipeline only sees
//! the [`Refiner`] trait, so the HTTP client can be swapped for a no-op or a
//! test double.

mod client;
mod prompt;

pub use client::ChatCompletionRefiner;
pub use prompt::DEFAULT_SYSTEM_PROMPT;

use crate::error::RefineError;
use async_trait::async_trait;

/// Rewrites a whole Markdown document
#[async_trait]
pub trait Refiner: Send + Sync {
    async fn refine(&self, markdown: &str) -> Result<String, RefineError>;
}

/// Returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRefiner;

#[async_trait]
impl Refiner for NoopRefiner {
    async fn refine(&self, markdown: &str) -> Result<String, RefineError> {
        Ok(markdown.to_string())
    }
}
