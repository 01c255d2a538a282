use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use docsearch_core::{CorpusIndex, DirectorySource, IndexStats, Query, QueryEngine};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docsearch-indexer")]
#[command(about = "Index a directory of extracted document text and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Corpus {
    /// Directory containing extracted text files
    #[arg(long)]
    input: PathBuf,
    /// File extension of documents to index
    #[arg(long, default_value = "txt")]
    ext: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and print corpus statistics
    Stats {
        #[command(flatten)]
        corpus: Corpus,
        /// Number of vocabulary words to include in the report
        #[arg(long, default_value_t = 50)]
        sample: usize,
    },
    /// Rank documents by total occurrences of the query terms
    Search {
        #[command(flatten)]
        corpus: Corpus,
        #[arg(long)]
        query: String,
    },
    /// Rank documents by the number of distinct query terms they contain
    AltSearch {
        #[command(flatten)]
        corpus: Corpus,
        #[arg(long)]
        query: String,
    },
    /// List indexed n-grams starting with a prefix
    Autocomplete {
        #[command(flatten)]
        corpus: Corpus,
        #[arg(long)]
        prefix: String,
        /// Maximum number of suggestions
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Serialize)]
struct StatsReport<'a> {
    generated_at: String,
    input: String,
    #[serde(flatten)]
    stats: IndexStats,
    vocabulary_sample: Vec<&'a str>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { corpus, sample } => stats(&corpus, sample),
        Commands::Search { corpus, query } => search(&corpus, &query, false),
        Commands::AltSearch { corpus, query } => search(&corpus, &query, true),
        Commands::Autocomplete { corpus, prefix, limit } => autocomplete(&corpus, &prefix, limit),
    }
}

fn load(corpus: &Corpus) -> Result<(DirectorySource, CorpusIndex)> {
    let source = DirectorySource::new(&corpus.input, &corpus.ext);
    let index = CorpusIndex::from_source(&source)?;
    Ok((source, index))
}

fn stats(corpus: &Corpus, sample: usize) -> Result<()> {
    let (_, index) = load(corpus)?;
    let report = StatsReport {
        generated_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        input: corpus.input.display().to_string(),
        stats: index.stats(),
        vocabulary_sample: index.vocabulary_sample(sample),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn search(corpus: &Corpus, raw: &str, alternative: bool) -> Result<()> {
    // Reject blank queries before loading anything.
    let query = Query::parse(raw)?;
    let (source, index) = load(corpus)?;
    let engine = QueryEngine::new(&index, &source);
    let results = if alternative { engine.alternative_search(&query) } else { engine.search(&query) };
    tracing::info!(query = raw, hits = results.len(), "search complete");
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn autocomplete(corpus: &Corpus, prefix: &str, limit: Option<usize>) -> Result<()> {
    let (source, index) = load(corpus)?;
    let mut suggestions = QueryEngine::new(&index, &source).autocomplete(prefix);
    if let Some(limit) = limit {
        suggestions.truncate(limit);
    }
    println!("{}", serde_json::to_string_pretty(&suggestions)?);
    Ok(())
}
