//! Command-line front end

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docprep::config::Config;
use docprep::paths::PlatformPaths;
use docprep::pipeline::{Pipeline, PreparedDocument, document_name};
use docprep::preprocess::{split_paragraphs, title_from_file_name};
use docprep::refine::ChatCompletionRefiner;
use docprep::splitter::{Chunk, MarkdownSplitter, SplitterOptions};
use std::path::{Path, PathBuf};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

/// Prepare scraped Markdown articles for retrieval
#[derive(Parser, Debug)]
#[command(name = "docprep", version, long_version = LONG_VERSION, about)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "DOCPREP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split one Markdown file into header-scoped chunks
    Split {
        file: PathBuf,

        /// Maximum non-code chunk length
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Leave header lines out of chunk content
        #[arg(long)]
        strip_headers: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Prefix Markdown chunks with their metadata as front matter
        #[arg(long)]
        front_matter: bool,
    },

    /// Clean articles and write the resulting Markdown
    Clean {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long)]
        out_dir: PathBuf,

        /// Rewrite outputs that already exist
        #[arg(long)]
        force: bool,
    },

    /// Clean, optionally refine, and chunk articles
    Prepare {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Run the LLM cleanup pass before chunking
        #[arg(long)]
        refine: bool,

        /// Write one JSON file per document instead of JSON lines on stdout
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Rewrite outputs in --out-dir that already exist
        #[arg(long)]
        force: bool,
    },

    /// Print the blank-line separated paragraphs of a file as JSON
    Paragraphs { file: PathBuf },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
}

pub async fn run(cli: Cli) -> Result<()> {
    if let Command::Config {
        action: ConfigAction::Init { force },
    } = &cli.command
    {
        return init_config(cli.config.as_deref(), *force);
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Split {
            file,
            chunk_size,
            strip_headers,
            format,
            front_matter,
        } => {
            let mut options = SplitterOptions::from(&config.splitter);
            if chunk_size.is_some() {
                options.chunk_size = chunk_size;
            }
            options.strip_headers |= strip_headers;
            let splitter = MarkdownSplitter::new(options).context("Invalid splitter options")?;

            let text = read(&file)?;
            let chunks = splitter.split(&text);
            print_chunks(&chunks, format, front_matter)?;
        }
        Command::Clean {
            files,
            out_dir,
            force,
        } => {
            let pipeline = Pipeline::new(&config)?;
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;

            let pending = pending_files(&files, force, |file| cleaned_target(&out_dir, file));
            for file in pending {
                let raw = match read(file) {
                    Ok(raw) => raw,
                    Err(e) => {
                        tracing::warn!("{:#}", e);
                        continue;
                    }
                };
                let name = document_name(file);
                if let Some(doc) = pipeline.preprocess(&name, &raw) {
                    let target = out_dir.join(&name);
                    std::fs::write(&target, doc.markdown)
                        .with_context(|| format!("Failed to write {}", target.display()))?;
                    tracing::info!("Cleaned {} -> {}", file.display(), target.display());
                }
            }
        }
        Command::Prepare {
            files,
            refine,
            out_dir,
            force,
        } => {
            let pipeline = Pipeline::new(&config)?;
            let pending = match &out_dir {
                Some(dir) => pending_files(&files, force, |file| prepared_target(dir, file)),
                None => files.iter().collect(),
            };
            let pending: Vec<PathBuf> = pending.into_iter().cloned().collect();
            let docs = if refine {
                prepare_refined(&pipeline, &config, &pending).await?
            } else {
                pipeline.prepare_files(&pending)
            };
            tracing::info!("Prepared {} of {} documents", docs.len(), files.len());
            write_documents(&docs, out_dir.as_deref())?;
        }
        Command::Paragraphs { file } => {
            let text = read(&file)?;
            println!("{}", serde_json::to_string_pretty(&split_paragraphs(&text))?);
        }
        Command::Config { action } => match action {
            ConfigAction::Show => print!("{}", toml::to_string_pretty(&config)?),
            ConfigAction::Init { .. } => {}
        },
    }

    Ok(())
}

/// Files whose output is not written yet; all of them with `force`
fn pending_files<'a>(
    files: &'a [PathBuf],
    force: bool,
    target: impl Fn(&Path) -> PathBuf,
) -> Vec<&'a PathBuf> {
    files
        .iter()
        .filter(|file| {
            let target = target(file.as_path());
            if force || !target.exists() {
                return true;
            }
            tracing::info!("Skipping {}: {} exists", file.display(), target.display());
            false
        })
        .collect()
}

fn cleaned_target(out_dir: &Path, file: &Path) -> PathBuf {
    out_dir.join(document_name(file))
}

fn prepared_target(out_dir: &Path, file: &Path) -> PathBuf {
    let name = document_name(file);
    let title = title_from_file_name(Path::new(&name)).unwrap_or(name);
    out_dir.join(format!("{title}.json"))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Config::new().context("Failed to load configuration");
    };
    let mut config = Config::from_file(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(PlatformPaths::default_config_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().save(&path)?;
    println!("{}", path.display());
    Ok(())
}

async fn prepare_refined(
    pipeline: &Pipeline,
    config: &Config,
    files: &[PathBuf],
) -> Result<Vec<PreparedDocument>> {
    let refiner = ChatCompletionRefiner::from_config(&config.refine)?;
    tracing::info!("Refining with model {}", refiner.model());

    let mut docs = Vec::with_capacity(files.len());
    for file in files {
        let raw = match read(file) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("{:#}", e);
                continue;
            }
        };
        match pipeline
            .prepare_with(&document_name(file), &raw, &refiner)
            .await
        {
            Ok(Some(doc)) => docs.push(doc),
            Ok(None) => {}
            Err(e) => tracing::warn!("Skipping {}: {}", file.display(), e),
        }
    }
    Ok(docs)
}

fn write_documents(docs: &[PreparedDocument], out_dir: Option<&Path>) -> Result<()> {
    let Some(out_dir) = out_dir else {
        for doc in docs {
            println!("{}", serde_json::to_string(doc)?);
        }
        return Ok(());
    };

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    for doc in docs {
        let target = out_dir.join(format!("{}.json", doc.title));
        std::fs::write(&target, serde_json::to_string_pretty(doc)?)
            .with_context(|| format!("Failed to write {}", target.display()))?;
    }
    Ok(())
}

fn print_chunks(chunks: &[Chunk], format: OutputFormat, front_matter: bool) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(chunks)?),
        OutputFormat::Markdown => {
            let rendered: Vec<String> = chunks.iter().map(|c| c.to_markdown(front_matter)).collect();
            println!("{}", rendered.join("\n\n"));
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
