//! Size-bounded refinement of header chunks
//!
//! Streams a chunk's lines into a buffer that keeps a running non-code
//! length, cutting whenever the next line would push it past the limit. Cuts
//! land on paragraph boundaries when possible, otherwise before the last
//! buffered line, and never inside a code fence. A buffer that cannot be cut
//! is emitted whole.

use super::chunk::Chunk;
use super::length::LengthCalculator;
use super::scanner::{FenceState, FenceTransition};
use super::separators::SeparatorSet;

/// Where a full buffer is cut; the index is the number of lines emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SplitPoint {
    /// After a blank line separating two non-blank lines
    Paragraph(usize),
    /// Between two lines, giving up the tail of the buffer
    Line(usize),
    /// No safe cut: the whole buffer is emitted as is
    Cutover,
}

#[derive(Debug, Clone, Copy)]
struct BufferedLine<'t> {
    text: &'t str,
    /// A fence is still open after this line
    open_after: bool,
    /// Non-code length of the line itself
    len: usize,
    /// Length of the `\n` before the line; zero when it sits inside a fence
    joint: usize,
}

/// Lines waiting to be emitted and their joined non-code length
#[derive(Debug, Default)]
struct LineBuffer<'t> {
    lines: Vec<BufferedLine<'t>>,
    size: usize,
}

impl<'t> LineBuffer<'t> {
    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn push(&mut self, line: BufferedLine<'t>) {
        self.size = self.size_with(&line);
        self.lines.push(line);
    }

    fn size_with(&self, line: &BufferedLine) -> usize {
        if self.lines.is_empty() {
            line.len
        } else {
            self.size + line.joint + line.len
        }
    }

    /// Remove the first `n` lines and join them
    fn take(&mut self, n: usize) -> String {
        let n = n.min(self.lines.len());
        let removed: usize = self.lines[..n]
            .iter()
            .enumerate()
            .map(|(i, l)| if i == 0 { l.len } else { l.joint + l.len })
            .sum::<usize>()
            + self.lines.get(n).map_or(0, |l| l.joint);

        self.size = self.size.saturating_sub(removed);
        let piece = join(&self.lines[..n]);
        self.lines.drain(..n);
        piece
    }

    fn take_all(&mut self) -> String {
        self.take(self.lines.len())
    }
}

pub(crate) struct ChunkRefiner<'a> {
    limit: usize,
    length: &'a LengthCalculator,
    separators: &'a SeparatorSet,
}

impl<'a> ChunkRefiner<'a> {
    pub(crate) fn new(
        limit: usize,
        length: &'a LengthCalculator,
        separators: &'a SeparatorSet,
    ) -> Self {
        Self {
            limit,
            length,
            separators,
        }
    }

    /// Split `chunk` into sub-chunks that inherit its metadata
    pub(crate) fn refine(&self, chunk: Chunk) -> Vec<Chunk> {
        let size = self.length.non_code_len(&chunk.content);
        if size <= self.limit {
            return vec![chunk];
        }

        let pieces = self.partition(&chunk.content);
        tracing::debug!(
            "Refined chunk of length {} into {} pieces (limit {})",
            size,
            pieces.len(),
            self.limit
        );

        pieces
            .into_iter()
            .filter(|piece| !piece.trim().is_empty())
            .map(|piece| Chunk::new(piece, chunk.metadata.clone()))
            .collect()
    }

    /// Cut `content` into line-aligned pieces; rejoining them with `\n`
    /// reproduces the input
    pub(crate) fn partition(&self, content: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut buffer = LineBuffer::default();

        for (transition, line) in self.lines(content) {
            match transition {
                // Fenced lines stay with their block whatever the length
                FenceTransition::Inside | FenceTransition::Closed(_) => {}
                // Cutting right before a fence opens is always safe
                FenceTransition::Opened(_) => {
                    while !buffer.is_empty() && self.size(&buffer) > self.limit {
                        pieces.push(self.cut(&mut buffer, line.text));
                    }
                }
                FenceTransition::Outside => {
                    if !buffer.is_empty() && self.size_with(&buffer, &line) > self.limit {
                        pieces.push(self.cut(&mut buffer, line.text));
                    }
                }
            }
            buffer.push(line);
        }

        if !buffer.is_empty() {
            pieces.push(buffer.take_all());
        }
        pieces
    }

    /// Lines of `content` with their fence transitions and lengths
    fn lines<'t>(
        &self,
        content: &'t str,
    ) -> impl Iterator<Item = (FenceTransition, BufferedLine<'t>)> {
        let joint = self.length.raw_len("\n");
        let mut fence = FenceState::default();

        content.split('\n').map(move |text| {
            let inside = fence.is_open();
            let transition = fence.advance(text);
            let line = BufferedLine {
                text,
                open_after: fence.is_open(),
                len: self.line_len(text, transition),
                joint: if inside { 0 } else { joint },
            };
            (transition, line)
        })
    }

    /// Non-code length of a single line; only opening and closing fence
    /// lines keep the text outside their token
    fn line_len(&self, text: &str, transition: FenceTransition) -> usize {
        if !self.length.is_additive() {
            return 0;
        }
        match transition {
            FenceTransition::Outside => self.length.non_code_len(text),
            FenceTransition::Inside => 0,
            FenceTransition::Opened(fence) => text
                .find(fence.token())
                .map_or(0, |at| self.length.raw_len(&text[..at])),
            FenceTransition::Closed(fence) => text
                .find(fence.token())
                .map_or(0, |at| self.length.raw_len(&text[at + fence.token().len()..])),
        }
    }

    fn size(&self, buffer: &LineBuffer) -> usize {
        if self.length.is_additive() {
            buffer.size
        } else {
            self.length.non_code_len(&join(&buffer.lines))
        }
    }

    fn size_with(&self, buffer: &LineBuffer, line: &BufferedLine) -> usize {
        if self.length.is_additive() {
            buffer.size_with(line)
        } else {
            self.length.non_code_len(&join_with(&buffer.lines, line.text))
        }
    }

    /// Emit the head of a full buffer about to receive `incoming`
    fn cut(&self, buffer: &mut LineBuffer, incoming: &str) -> String {
        let cut = self.split_point(&buffer.lines, incoming);
        tracing::trace!("Cutting buffer of {} lines at {:?}", buffer.lines.len(), cut);

        match cut {
            SplitPoint::Paragraph(n) | SplitPoint::Line(n) => buffer.take(n),
            SplitPoint::Cutover => buffer.take_all(),
        }
    }

    /// Best cut for a full buffer about to receive `incoming`
    fn split_point(&self, buffer: &[BufferedLine], incoming: &str) -> SplitPoint {
        if self.separators.splits_paragraphs() {
            for i in (1..buffer.len()).rev() {
                let line = buffer[i];
                if line.open_after || !is_blank(line.text) {
                    continue;
                }
                let next = buffer.get(i + 1).map_or(incoming, |l| l.text);
                if !is_blank(buffer[i - 1].text) && !is_blank(next) {
                    return SplitPoint::Paragraph(i + 1);
                }
            }
        }

        // Give up the last line, or the nearest earlier boundary outside a fence
        if self.separators.splits_lines() && buffer.len() > 1 {
            for n in (1..buffer.len()).rev() {
                if !buffer[n - 1].open_after {
                    return SplitPoint::Line(n);
                }
            }
        }

        SplitPoint::Cutover
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn join(lines: &[BufferedLine]) -> String {
    lines
        .iter()
        .map(|l| l.text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_with(lines: &[BufferedLine], next: &str) -> String {
    let mut joined = join(lines);
    joined.push('\n');
    joined.push_str(next);
    joined
}
