use super::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

const ARTICLE: &str = "# Title\n\nIntro para.\n\n## Sec\n\nBody line one.\nBody line two.\n";

fn splitter() -> MarkdownSplitter {
    MarkdownSplitter::new(SplitterOptions::default()).unwrap()
}

fn sized(chunk_size: usize) -> MarkdownSplitter {
    MarkdownSplitter::new(SplitterOptions::default().with_chunk_size(Some(chunk_size))).unwrap()
}

fn joined(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_header_split_example() {
    let chunks = splitter().split(ARTICLE);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].content, "# Title\n\nIntro para.\n");
    assert_eq!(chunks[0].metadata.get("h1"), Some("Title"));
    assert_eq!(chunks[0].metadata.len(), 1);

    assert_eq!(chunks[1].content, "## Sec\n\nBody line one.\nBody line two.\n");
    assert_eq!(chunks[1].metadata.get("h1"), Some("Title"));
    assert_eq!(chunks[1].metadata.get("h2"), Some("Sec"));
    assert!(chunks[1].content.contains("Body line one.\nBody line two."));
}

#[test]
fn test_size_refinement_example() {
    let chunks = sized(10).split(ARTICLE);

    let section: Vec<&Chunk> = chunks
        .iter()
        .filter(|c| c.metadata.get("h2") == Some("Sec"))
        .collect();
    assert!(section.len() >= 2);
    for chunk in &section {
        assert_eq!(chunk.metadata.get("h1"), Some("Title"));
    }

    let contents: Vec<&str> = section.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["## Sec\n", "Body line one.", "Body line two."]);
}

#[test]
fn test_reconstruction_without_chunk_size() {
    let inputs = [
        ARTICLE,
        "plain text\nwith no headers\n",
        "# A\ntext\n### C\n\n```\n# not a header\n```\n## B\nmore",
        "# 标题\n\n第一段。\n\n## 小节\n\n正文。\n",
        "intro before any header\n\n# H\nbody",
    ];

    for input in inputs {
        let chunks = splitter().split(input);
        assert_eq!(joined(&chunks), input, "input: {input:?}");
    }
}

#[test]
fn test_leading_blank_lines_dropped() {
    let chunks = splitter().split("\n\n# H\nbody");
    assert_eq!(joined(&chunks), "# H\nbody");
}

#[test]
fn test_strip_headers() {
    let splitter =
        MarkdownSplitter::new(SplitterOptions::default().with_strip_headers(true)).unwrap();
    let chunks = splitter.split(ARTICLE);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].content, "Intro para.\n");
    assert_eq!(chunks[1].content, "Body line one.\nBody line two.\n");
    assert_eq!(chunks[1].metadata.get("h2"), Some("Sec"));
    assert!(chunks.iter().all(|c| !c.content.contains('#')));
}

#[test]
fn test_headers_inside_fence_ignored() {
    let text = "# Real\n```bash\n# comment, not a header\n## neither\n```\nafter";
    let chunks = splitter().split(text);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].metadata.len(), 1);
    assert_eq!(chunks[0].metadata.get("h1"), Some("Real"));
}

#[test]
fn test_tilde_fence_not_closed_by_backticks() {
    let text = "# A\n~~~\n```\n# still code\n~~~\n## B\nx";
    let chunks = splitter().split(text);

    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].content.contains("# still code"));
    assert_eq!(chunks[1].metadata.get("h2"), Some("B"));
}

#[test]
fn test_unterminated_fence_runs_to_end() {
    let text = "# A\n```\ncode\n## not a header\nmore";
    let chunks = splitter().split(text);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].metadata.get("h2"), None);
    assert_eq!(chunks[0].content, text);
}

#[test]
fn test_marker_precedence() {
    let chunks = splitter().split("# Top\n###### Deep\ntext");

    let deep = chunks.last().unwrap();
    assert_eq!(deep.metadata.header(HeaderLevel::H6), Some("Deep"));
    assert_eq!(deep.metadata.get("h1"), Some("Top"));
    assert_eq!(deep.metadata.len(), 2);
}

#[test]
fn test_marker_needs_space() {
    let chunks = splitter().split("#hashtag\n#\nafter empty header");

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].content, "#hashtag");
    assert!(chunks[0].metadata.is_empty());
    assert_eq!(chunks[1].metadata.get("h1"), Some(""));
}

#[test]
fn test_nesting_pops_same_and_deeper() {
    let text = "# A\n## B\n### C\nc\n## D\nd\n# E\ne";
    let chunks = splitter().split(text);

    for chunk in &chunks {
        let levels: Vec<HeaderLevel> = chunk.metadata.headers().iter().map(|h| h.level).collect();
        assert!(levels.windows(2).all(|w| w[0] < w[1]), "{levels:?}");
    }

    let d = chunks.iter().find(|c| c.content.ends_with("\nd")).unwrap();
    assert_eq!(d.metadata.get("h2"), Some("D"));
    assert_eq!(d.metadata.get("h3"), None);

    let e = chunks.last().unwrap();
    assert_eq!(e.metadata.get("h1"), Some("E"));
    assert_eq!(e.metadata.len(), 1);
}

#[test]
fn test_custom_header_names() {
    let headers = vec![
        ("#".to_string(), "Header 1".to_string()),
        ("##".to_string(), "Header 2".to_string()),
    ];
    let splitter = MarkdownSplitter::new(SplitterOptions::default().with_headers(headers)).unwrap();
    let chunks = splitter.split("# Foo\n## Bar\nHi\n### Baz\nDeep");

    assert_eq!(chunks.len(), 2);
    let last = chunks.last().unwrap();
    assert_eq!(last.metadata.get("Header 1"), Some("Foo"));
    assert_eq!(last.metadata.get("Header 2"), Some("Bar"));
    assert!(last.content.contains("### Baz"));
}

#[test]
fn test_base_metadata_merged_under_headings() {
    let mut base = IndexMap::new();
    base.insert("source".to_string(), "article.md".to_string());
    base.insert("h1".to_string(), "overridden".to_string());

    let chunks = splitter().split_with_metadata(ARTICLE, &base);
    for chunk in &chunks {
        assert_eq!(chunk.metadata.get("source"), Some("article.md"));
        assert_eq!(chunk.metadata.get("h1"), Some("Title"));
    }
}

#[test]
fn test_idempotent_reaggregation() {
    let first = splitter().split(ARTICLE);
    let rendered: Vec<String> = first.iter().map(|c| c.to_markdown(true)).collect();
    let restored = rendered
        .iter()
        .map(|r| strip_front_matter(r))
        .collect::<Vec<_>>()
        .join("\n");

    let second = splitter().split(&restored);
    assert_eq!(first, second);
}

#[test]
fn test_no_split_inside_fence() {
    let text = "# Code\nshort intro line\n```rust\nfn one() {}\n\nfn two() {}\n\nfn three() {}\n```\ntrailing words here\nand more words";
    let splitter = sized(15);
    let chunks = splitter.split(text);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        let fences = chunk.content.lines().filter(|l| l.starts_with("```")).count();
        assert!(fences == 0 || fences == 2, "fence split: {:?}", chunk.content);
    }
}

#[test]
fn test_code_does_not_count_toward_size() {
    let code = "x".repeat(500);
    let text = format!("# H\n```\n{code}\n```\ntail");
    let chunks = sized(40).split(&text);
    assert_eq!(chunks.len(), 1);
}

#[test]
fn test_size_bound_on_paragraphs() {
    let paragraph = "0123456789\nabcdefghij\n";
    let text = format!("# H\n\n{}", paragraph.repeat(6).replace("j\n0", "j\n\n0"));
    let splitter = sized(30);
    let chunks = splitter.split(&text);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        let len = splitter.non_code_len(&chunk.content);
        let single_line = !chunk.content.trim().contains('\n');
        assert!(len <= 30 || single_line, "oversized chunk {:?}", chunk.content);
    }
}

#[test]
fn test_oversized_single_line_kept_whole() {
    let line = "word ".repeat(30);
    let chunks = sized(20).split(line.trim());

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content, line.trim());
}

#[test]
fn test_custom_length_function() {
    let words: LengthFn = Arc::new(|text: &str| text.split_whitespace().count());
    let splitter = MarkdownSplitter::new(
        SplitterOptions::default()
            .with_chunk_size(Some(4))
            .with_length_function(words),
    )
    .unwrap();

    let chunks = splitter.split("one two\nthree four\nfive six");
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].content, "one two");
    assert_eq!(chunks[1].content, "three four\nfive six");
}

#[test]
fn test_invalid_configuration() {
    let zero = SplitterOptions::default().with_chunk_size(Some(0));
    assert!(matches!(
        MarkdownSplitter::new(zero),
        Err(ChunkingError::InvalidChunkSize(_))
    ));

    let bad_marker = SplitterOptions::default().with_headers(vec![("=".into(), "h1".into())]);
    assert!(matches!(
        MarkdownSplitter::new(bad_marker),
        Err(ChunkingError::InvalidHeaderMarker { .. })
    ));

    let bad_sep = SplitterOptions::default().with_separators(vec!["[".into()], true);
    assert!(matches!(
        MarkdownSplitter::new(bad_sep),
        Err(ChunkingError::InvalidSeparator { .. })
    ));
}

#[test]
fn test_markers_checked_longest_first() {
    let splitter = splitter();
    let order: Vec<&str> = splitter.markers().iter().map(|m| m.marker()).collect();
    assert_eq!(order, vec!["######", "#####", "####", "###", "##", "#"]);
}

#[test]
fn test_empty_input() {
    assert!(splitter().split("").is_empty());
    assert!(sized(10).split("\n\n").is_empty());
}

#[test]
fn test_large_section_with_large_limit() {
    let line = "lorem ipsum dolor sit amet, consectetur adipiscing";
    let text = format!("# Big\n{}", vec![line; 40_000].join("\n"));
    let limit = 1_000_000;
    let splitter = sized(limit);

    let start = Instant::now();
    let chunks = splitter.split(&text);
    let elapsed = start.elapsed();

    assert!(elapsed < Duration::from_secs(10), "took {elapsed:?}");
    assert_eq!(chunks.len(), 3);
    assert_eq!(joined(&chunks), text);
    for chunk in &chunks {
        assert!(splitter.non_code_len(&chunk.content) <= limit);
    }
}

/// Deterministic document generator mixing headers, prose and fences
struct DocGen(u64);

impl DocGen {
    fn pick(&mut self, n: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % n
    }

    fn document(&mut self) -> String {
        const HEADERS: [&str; 4] = ["# Top", "## Same", "## Same", "### Deep"];
        const PROSE: [&str; 7] = [
            "",
            "",
            "x",
            "short",
            "a medium line of text",
            "a considerably longer line of text that goes on",
            "第二段的中文内容，长度适中。",
        ];
        const FENCES: [&[&str]; 3] = [
            &["```rust", "let a = 1;", "", "# not a header", "```"],
            &["~~~", "```", "inside tilde", "~~~"],
            &["```", "```"],
        ];

        let mut lines: Vec<&str> = Vec::new();
        for _ in 0..5 + self.pick(25) {
            match self.pick(10) {
                0 | 1 => lines.push(HEADERS[self.pick(HEADERS.len())]),
                2 => lines.extend_from_slice(FENCES[self.pick(FENCES.len())]),
                _ => lines.push(PROSE[self.pick(PROSE.len())]),
            }
        }
        lines.join("\n")
    }
}

fn is_fence_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

#[test]
fn test_generated_documents_keep_fences_and_size_bound() {
    let mut docs = DocGen(0x5eed);

    for _ in 0..400 {
        let text = docs.document();

        for limit in [5, 20, 40] {
            let splitter = sized(limit);
            let chunks = splitter.split(&text);

            // No chunk boundary falls inside a fenced block
            let mut fence = FenceState::default();
            for chunk in &chunks {
                for line in chunk.content.split('\n') {
                    fence.advance(line);
                }
                assert!(!fence.is_open(), "limit {limit}, fence split in {text:?}");
            }

            // Overruns only for one line, a fenced block or a section's last piece
            for (i, chunk) in chunks.iter().enumerate() {
                let last_of_section = chunks
                    .get(i + 1)
                    .is_none_or(|next| next.metadata != chunk.metadata);
                let single_line = chunk.content.trim().lines().count() <= 1;
                let fenced = chunk.content.lines().any(is_fence_line);

                assert!(
                    splitter.non_code_len(&chunk.content) <= limit
                        || single_line
                        || fenced
                        || last_of_section,
                    "limit {limit}, oversized {:?} from {text:?}",
                    chunk.content
                );
            }
        }
    }
}
