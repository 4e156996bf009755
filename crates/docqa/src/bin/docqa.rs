//! docqa command-line interface
//!
//! - `docqa ask <QUESTION> --file <PATH>... | --folder <DIR>` - process documents, answer once
//! - `docqa chat [--file <PATH>...] [--folder <DIR>]` - interactive question loop
//! - `docqa extract <PATH>...` - extraction and chunking statistics, no backends

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docqa::ingestion::{FileExtractor, TextChunker};
use docqa::{Answer, Assistant, DocqaConfig, ProcessingReport, SourceExcerpt};

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about your PDF, Word and text documents")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/docqa/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Process documents and answer a single question
    Ask {
        /// Question to answer
        question: String,

        /// Document to process (repeatable)
        #[arg(long = "file", value_name = "PATH")]
        files: Vec<PathBuf>,

        /// Folder whose supported files are processed
        #[arg(long, value_name = "DIR")]
        folder: Option<PathBuf>,
    },

    /// Interactive session: every line is a question
    Chat {
        /// Document to process before the first question (repeatable)
        #[arg(long = "file", value_name = "PATH")]
        files: Vec<PathBuf>,

        /// Folder to process before the first question
        #[arg(long, value_name = "DIR")]
        folder: Option<PathBuf>,
    },

    /// Extract and chunk documents without contacting any backend
    Extract {
        /// Documents to extract
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[derive(Serialize)]
struct AnswerOutput<'a> {
    answer: &'a str,
    sources: Vec<SourceExcerpt>,
}

#[derive(Serialize)]
struct ExtractOutput {
    files: Vec<FileStats>,
    successful: usize,
    total: usize,
    characters: usize,
    chunks: usize,
    sha256: String,
}

#[derive(Serialize)]
struct FileStats {
    file: String,
    format: Option<&'static str>,
    characters: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "docqa=debug" } else { "docqa=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => DocqaConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DocqaConfig::load_default().context("Failed to load default config")?,
    };

    match cli.command {
        Commands::Ask {
            question,
            files,
            folder,
        } => {
            if files.is_empty() && folder.is_none() {
                anyhow::bail!("Nothing to process: pass --file <PATH> or --folder <DIR>");
            }
            let assistant = Assistant::from_config(config)?;
            process(&assistant, &files, folder.as_ref(), cli.format).await?;
            let answer = with_spinner("Thinking...", assistant.ask(&question)).await?;
            print_answer(&answer, assistant.config().retrieval.preview_chars, cli.format)?;
        }
        Commands::Chat { files, folder } => {
            let assistant = Assistant::from_config(config)?;
            if !files.is_empty() || folder.is_some() {
                process(&assistant, &files, folder.as_ref(), cli.format).await?;
            }
            chat(&assistant, cli.format).await?;
        }
        Commands::Extract { paths } => extract(&config, &paths, cli.format)?,
    }

    Ok(())
}

/// Run a processing request from `--file`/`--folder` arguments
async fn process(
    assistant: &Assistant,
    files: &[PathBuf],
    folder: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let report = match folder {
        Some(dir) if files.is_empty() => {
            with_spinner("Processing folder...", assistant.process_folder(dir)).await?
        }
        Some(dir) => {
            let mut paths = files.to_vec();
            paths.extend(docqa::ingestion::scan_folder(dir, &assistant.config().extraction)?);
            with_spinner("Processing documents...", assistant.process_files(&paths)).await?
        }
        None => with_spinner("Processing documents...", assistant.process_files(files)).await?,
    };
    if format == OutputFormat::Text {
        print_report(&report);
    }
    Ok(())
}

async fn chat(assistant: &Assistant, format: OutputFormat) -> Result<()> {
    println!(
        "{} Type a question, or :process <path>..., :folder <dir>, :files, :clear, :quit",
        style("docqa").cyan().bold()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut words = line.split_whitespace();
        let result = match words.next().unwrap_or_default() {
            ":quit" | ":q" => break,
            ":files" => {
                let files = assistant.processed_files().await;
                if files.is_empty() {
                    println!("No documents processed ({})", assistant.state());
                }
                for file in files {
                    println!("  {}", file);
                }
                Ok(())
            }
            ":clear" => {
                assistant.clear().await;
                println!("{} Documents cleared. You can process new ones.", style("✓").green());
                Ok(())
            }
            ":process" => {
                let paths: Vec<PathBuf> = words.map(PathBuf::from).collect();
                process(assistant, &paths, None, format).await
            }
            ":folder" => match words.next() {
                Some(dir) => process(assistant, &[], Some(&PathBuf::from(dir)), format).await,
                None => {
                    println!("Usage: :folder <dir>");
                    Ok(())
                }
            },
            _ => match with_spinner("Thinking...", assistant.ask(line)).await {
                Ok(answer) => print_answer(&answer, assistant.config().retrieval.preview_chars, format),
                Err(e) => Err(e.into()),
            },
        };

        if let Err(e) = result {
            report_error(&e);
        }
    }

    Ok(())
}

/// Warnings for invalid requests, errors for everything else
fn report_error(error: &anyhow::Error) {
    match error.downcast_ref::<docqa::Error>() {
        Some(e) if e.is_user_warning() => println!("{} {}", style("⚠").yellow(), e),
        _ => eprintln!("{} {:#}", style("✗").red().bold(), error),
    }
}

fn extract(config: &DocqaConfig, paths: &[PathBuf], format: OutputFormat) -> Result<()> {
    let extractor = FileExtractor::new(&config.extraction);
    let chunker = TextChunker::from_config(&config.chunking)?;

    let batch = extractor.extract_batch(paths);
    let chunks = chunker.split(&batch.text);

    let output = ExtractOutput {
        files: batch
            .outcomes
            .iter()
            .map(|outcome| FileStats {
                file: outcome.file.display_name(),
                format: outcome.file.format.map(|f| f.display_name()),
                characters: outcome.chars,
            })
            .collect(),
        successful: batch.successful(),
        total: batch.total(),
        characters: batch.text.chars().count(),
        chunks: chunks.len(),
        sha256: batch.content_hash(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Text => {
            for file in &output.files {
                let marker = if file.characters > 0 {
                    style("✓").green()
                } else {
                    style("✗").red()
                };
                println!(
                    "{} {} ({}, {} chars)",
                    marker,
                    file.file,
                    file.format.unwrap_or("unsupported"),
                    file.characters
                );
            }
            println!(
                "\nSuccessfully processed {} out of {} files: {} characters, {} chunks",
                output.successful, output.total, output.characters, output.chunks
            );
        }
    }
    Ok(())
}

fn print_report(report: &ProcessingReport) {
    println!(
        "{} Processed {} file(s), created {} chunks",
        style("✓").green(),
        report.files_selected,
        report.chunks
    );
    for file in &report.processed_files {
        println!("  {}", style(file).dim());
    }
}

fn print_answer(answer: &Answer, preview_chars: usize, format: OutputFormat) -> Result<()> {
    let sources = answer.excerpts(preview_chars);

    match format {
        OutputFormat::Json => {
            let output = AnswerOutput {
                answer: &answer.text,
                sources,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("\n{}\n{}\n", style("Answer").bold().underlined(), answer.text);
            if !sources.is_empty() {
                println!("{}", style("Sources").bold().underlined());
            }
            for source in sources {
                println!(
                    "{} {}\n{}\n",
                    style(format!("[{}]", source.rank)).cyan(),
                    style(format!("similarity {:.3}", source.similarity)).dim(),
                    source.preview
                );
            }
        }
    }
    Ok(())
}

/// Show a spinner on stderr while `future` runs
async fn with_spinner<T>(message: &'static str, future: impl Future<Output = T>) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let output = future.await;
    spinner.finish_and_clear();
    output
}
