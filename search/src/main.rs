use anisearch_core::config::DEFAULT_LIMIT;
use anisearch_core::persist::{load_meta, IndexPaths};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use search::{render_boolean, render_document, render_ranked, Searcher};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search", about = "Query the anime synopsis index", long_about = None)]
struct Args {
    /// Index directory path
    #[arg(long, env = "ANISEARCH_INDEX", default_value = "./index", global = true)]
    index: String,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    /// Stem query words and drop stopwords, as the fallback synopsis normalizer does
    #[arg(long, global = true)]
    normalize: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Titles whose synopsis contains every term
    Boolean { terms: Vec<String> },
    /// Titles ranked by tf-idf cosine similarity (at least two terms)
    Ranked {
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
        terms: Vec<String>,
    },
    /// Ranked query with an extra popularity dimension
    Popular {
        /// "popular" or "unpopular"
        #[arg(long, default_value = "popular")]
        mode: String,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
        terms: Vec<String>,
    },
    /// Print one stored document
    Doc { doc_id: u32 },
    /// Print build metadata of the index
    Info,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let open = || Searcher::open(&args.index, args.normalize).with_context(|| format!("loading index from {}", args.index));
    let out = match args.command {
        Command::Boolean { terms } => {
            let hits = open()?.boolean(&terms)?;
            if args.json { serde_json::to_string_pretty(&hits)? } else { render_boolean(&hits, &terms) }
        }
        Command::Ranked { limit, terms } => {
            let hits = open()?.ranked(&terms, limit)?;
            if args.json { serde_json::to_string_pretty(&hits)? } else { render_ranked(&hits, &terms) }
        }
        Command::Popular { mode, limit, terms } => {
            let hits = open()?.popularity(&terms, &mode, limit)?;
            if args.json { serde_json::to_string_pretty(&hits)? } else { render_ranked(&hits, &terms) }
        }
        Command::Doc { doc_id } => {
            let searcher = open()?;
            let doc = searcher.document(doc_id).with_context(|| format!("no document with id {doc_id}"))?;
            if args.json { serde_json::to_string_pretty(doc)? } else { render_document(doc_id, doc) }
        }
        Command::Info => serde_json::to_string_pretty(&load_meta(&IndexPaths::new(&args.index))?)?,
    };
    println!("{}", out.trim_end());
    Ok(())
}
