//! Merging of scanned line records into chunks

use super::chunk::Chunk;
use super::scanner::LineRecord;
use indexmap::IndexMap;

/// Merge adjacent records whose header context is identical
///
/// Contents are joined with `\n` in document order, and `base` tags are
/// attached underneath every chunk's own heading metadata.
pub(crate) fn aggregate(records: Vec<LineRecord>, base: &IndexMap<String, String>) -> Vec<Chunk> {
    let mut merged: Vec<LineRecord> = Vec::with_capacity(records.len());

    for record in records {
        if let Some(last) = merged.last_mut()
            && last.metadata == record.metadata
        {
            last.content.push('\n');
            last.content.push_str(&record.content);
            continue;
        }
        merged.push(record);
    }

    merged
        .into_iter()
        .map(|record| Chunk::new(record.content, record.metadata.with_tags(base)))
        .collect()
}
