/// Benchmarks for Markdown splitting and document preparation
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use docprep::config::Config;
use docprep::pipeline::Pipeline;
use docprep::refine::NoopRefiner;
use docprep::splitter::{MarkdownSplitter, SplitterOptions};
use tempfile::TempDir;
use tokio::runtime::Runtime;

/// Helper to build a document with `sections` nested sections
fn create_document(sections: usize) -> String {
    let mut doc = String::from("# Benchmark Document\n\nIntroductory paragraph.\n\n");
    for i in 0..sections {
        doc.push_str(&format!(
            r#"## Section {i}

长宁区住房保障工作稳步推进，第{i}批旧住房成套改造项目顺利完成。
Residents in block {i} moved back after the renovation finished.

### Details {i}

```rust
fn section_{i}() -> usize {{
    {i} * 2
}}
```

Closing remarks for section {i}, followed by a blank line.

"#
        ));
    }
    doc
}

fn benchmark_splitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("splitting");

    for sections in [10, 100, 1000].iter() {
        let doc = create_document(*sections);

        let by_header = MarkdownSplitter::new(SplitterOptions::default()).unwrap();
        group.bench_with_input(
            BenchmarkId::new("headers_only", sections),
            &doc,
            |b, doc| b.iter(|| by_header.split(black_box(doc))),
        );

        let sized = MarkdownSplitter::new(SplitterOptions::default().with_chunk_size(Some(60)))
            .unwrap();
        group.bench_with_input(BenchmarkId::new("chunk_size_60", sections), &doc, |b, doc| {
            b.iter(|| sized.split(black_box(doc)))
        });
    }

    group.finish();
}

fn benchmark_preparation(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let pipeline = Pipeline::new(&Config::default()).unwrap();
    let mut group = c.benchmark_group("preparation");

    for file_count in [10, 50].iter() {
        let dir = TempDir::new().unwrap();
        let files: Vec<_> = (0..*file_count)
            .map(|i| {
                let path = dir.path().join(format!("article_{i}.md"));
                std::fs::write(&path, create_document(20)).unwrap();
                path
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("prepare_files", file_count),
            &files,
            |b, files| b.iter(|| pipeline.prepare_files(black_box(files))),
        );
    }

    let doc = create_document(50);
    let (pipeline, doc) = (&pipeline, doc.as_str());
    group.bench_function("prepare_with_noop_refiner", |b| {
        b.to_async(&rt).iter(|| async move {
            pipeline
                .prepare_with("article.md", black_box(doc), &NoopRefiner)
                .await
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_splitting, benchmark_preparation);
criterion_main!(benches);
