mod ingest;

use anisearch_core::build::{build_first_index, build_second_index, build_vocabulary};
use anisearch_core::config::INDEX_VERSION;
use anisearch_core::persist::{
    load_documents, load_first_index, load_vocabulary, save_documents, save_first_index, save_meta,
    save_second_index, save_vocabulary, IndexPaths, MetaFile,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the vocabulary and inverted indexes of the anime corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every step: ingest, vocabulary, first index, second index
    Build {
        /// Input path (file or directory of .json/.jsonl records in chart order)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
    },
    /// Read input records into the document store
    Ingest {
        #[arg(long)]
        input: String,
        #[arg(long)]
        output: String,
    },
    /// Extract the vocabulary from the ingested documents
    Vocabulary {
        #[arg(long, default_value = "./index")]
        index: String,
    },
    /// Build the boolean index from documents and vocabulary
    FirstIndex {
        #[arg(long, default_value = "./index")]
        index: String,
    },
    /// Build the tf-idf index from documents, vocabulary and first index
    SecondIndex {
        #[arg(long, default_value = "./index")]
        index: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => {
            let paths = IndexPaths::new(&output);
            ingest_step(Path::new(&input), &paths)?;
            vocabulary_step(&paths)?;
            first_index_step(&paths)?;
            second_index_step(&paths)?;
            tracing::info!(output = %output, "index build complete");
            Ok(())
        }
        Commands::Ingest { input, output } => ingest_step(Path::new(&input), &IndexPaths::new(output)),
        Commands::Vocabulary { index } => vocabulary_step(&IndexPaths::new(index)),
        Commands::FirstIndex { index } => first_index_step(&IndexPaths::new(index)),
        Commands::SecondIndex { index } => second_index_step(&IndexPaths::new(index)),
    }
}

fn ingest_step(input: &Path, paths: &IndexPaths) -> Result<()> {
    let docs = ingest::read_corpus(input)?;
    save_documents(paths, &docs)?;
    tracing::info!(num_docs = docs.len(), "documents stored");
    Ok(())
}

fn vocabulary_step(paths: &IndexPaths) -> Result<()> {
    let docs = load_documents(paths)?;
    let vocabulary = build_vocabulary(&docs);
    save_vocabulary(paths, &vocabulary)?;
    tracing::info!(num_terms = vocabulary.len(), "the vocabulary contains {} words", vocabulary.len());
    Ok(())
}

fn first_index_step(paths: &IndexPaths) -> Result<()> {
    let docs = load_documents(paths)?;
    let vocabulary = load_vocabulary(paths)?;
    let first = build_first_index(&vocabulary, &docs);
    save_first_index(paths, &first)
}

fn second_index_step(paths: &IndexPaths) -> Result<()> {
    let docs = load_documents(paths)?;
    let vocabulary = load_vocabulary(paths)?;
    let first = load_first_index(paths, vocabulary.len(), docs.len())?;
    let second = build_second_index(&vocabulary, &first, &docs);
    save_second_index(paths, &second)?;

    let meta = MetaFile {
        num_docs: docs.len() as u32,
        num_terms: vocabulary.len() as u32,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .context("formatting index creation time")?,
        version: INDEX_VERSION,
    };
    save_meta(paths, &meta)
}
