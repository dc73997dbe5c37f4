//! Reads parsed anime records (JSON, JSON array, or JSONL) into the corpus.

use anisearch_core::config::{DEFAULT_POPULARITY, PROGRESS_EVERY};
use anisearch_core::tokenizer::term_set;
use anisearch_core::Document;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One parsed page. Field aliases accept the column names of the scraped TSVs.
#[derive(Debug, Deserialize)]
struct InputDoc {
    #[serde(alias = "animeTitle")]
    title: String,
    #[serde(default, alias = "Url")]
    url: Option<String>,
    #[serde(default, alias = "animeDescription")]
    synopsis: Option<String>,
    /// Precomputed normalized terms. Derived from the synopsis when absent.
    #[serde(default)]
    terms: Option<Vec<String>>,
    /// Chart rank; a lower value is more popular.
    #[serde(default, alias = "animeRank")]
    popularity: Option<u32>,
}

impl From<InputDoc> for Document {
    fn from(doc: InputDoc) -> Self {
        let synopsis = doc.synopsis.unwrap_or_default();
        let terms: BTreeSet<String> = match doc.terms {
            // Index files hold one term per line.
            Some(terms) => terms
                .iter()
                .flat_map(|t| t.split(['\n', '\r']))
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            None => term_set(&synopsis),
        };
        Document {
            title: doc.title,
            url: doc.url.unwrap_or_default(),
            synopsis,
            terms,
            popularity: doc.popularity.unwrap_or(DEFAULT_POPULARITY),
        }
    }
}

/// Input files in sorted path order; a plain file path yields itself.
fn input_files(input: &Path) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }
    WalkDir::new(input)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")))
        .collect()
}

/// Load every record under `input`. Document ids follow the returned order,
/// so inputs must be laid out in chart order.
pub fn read_corpus(input: &Path) -> Result<Vec<Document>> {
    let files = input_files(input);
    if files.is_empty() {
        tracing::warn!(input = %input.display(), "no .json or .jsonl input found");
    }
    let mut docs = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    Ok(docs)
}

fn push(docs: &mut Vec<Document>, doc: InputDoc) {
    docs.push(doc.into());
    if docs.len() % PROGRESS_EVERY == 0 {
        tracing::info!(num_docs = docs.len(), "ingesting");
    }
}

fn read_jsonl(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    for (n, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line).with_context(|| format!("{}:{}", file.display(), n + 1))?;
        push(docs, doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                push(docs, serde_json::from_value(v).with_context(|| format!("record in {}", file.display()))?);
            }
        }
        serde_json::Value::Object(_) => {
            push(docs, serde_json::from_value(json).with_context(|| format!("record in {}", file.display()))?);
        }
        _ => anyhow::bail!("{}: expected a JSON object or array of objects", file.display()),
    }
    Ok(())
}
