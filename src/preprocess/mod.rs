//! Article preprocessing ahead of chunking
//!
//! Scraped articles carry a scraped title, promotional boilerplate and a
//! trailing byline. These helpers turn them into clean Markdown with a single
//! `#` title and a quoted source block.

pub mod byline;
pub mod clean;
pub mod paragraphs;
pub mod title;

pub use byline::BylineFormatter;
pub use clean::BoilerplateCleaner;
pub use paragraphs::split_paragraphs;
pub use title::{ensure_title, title_from_file_name};
