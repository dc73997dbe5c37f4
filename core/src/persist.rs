//! On-disk layout of an index directory.
//!
//! The vocabulary and both inverted indexes are line-oriented UTF-8 text where
//! line `n` belongs to term id `n`. Documents are bincode, build metadata is
//! JSON. Every file is written next to its final path and renamed into place
//! once complete.

use crate::{DocId, Document, FirstIndex, FormatError, Posting, SecondIndex, TermId, Vocabulary};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

pub const DOCUMENTS_FILE: &str = "documents.bin";
pub const VOCABULARY_FILE: &str = "vocabulary.txt";
pub const FIRST_INDEX_FILE: &str = "first_index.txt";
pub const SECOND_INDEX_FILE: &str = "second_index.txt";
pub const META_FILE: &str = "meta.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn documents(&self) -> PathBuf { self.root.join(DOCUMENTS_FILE) }
    pub fn vocabulary(&self) -> PathBuf { self.root.join(VOCABULARY_FILE) }
    pub fn first_index(&self) -> PathBuf { self.root.join(FIRST_INDEX_FILE) }
    pub fn second_index(&self) -> PathBuf { self.root.join(SECOND_INDEX_FILE) }
    pub fn meta(&self) -> PathBuf { self.root.join(META_FILE) }
}

/// Write `bytes` to `<path>.tmp` and rename it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("renaming {} into place", tmp.display()))?;
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

// --- documents ---

pub fn save_documents(paths: &IndexPaths, docs: &[Document]) -> Result<()> {
    let bytes = bincode::serialize(docs)?;
    write_atomic(&paths.documents(), &bytes)
}

pub fn load_documents(paths: &IndexPaths) -> Result<Vec<Document>> {
    let path = paths.documents();
    let buf = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let docs = bincode::deserialize(&buf).with_context(|| format!("decoding {}", path.display()))?;
    Ok(docs)
}

// --- vocabulary ---

pub fn encode_vocabulary(vocabulary: &Vocabulary) -> String {
    let mut out = String::new();
    for term in vocabulary.terms() {
        out.push_str(term);
        out.push('\n');
    }
    out
}

pub fn parse_vocabulary(file: &str, text: &str) -> Result<Vocabulary, FormatError> {
    let mut vocabulary = Vocabulary::new();
    for (n, line) in text.lines().enumerate() {
        let term = line.trim();
        if term.is_empty() {
            return Err(FormatError::EmptyTerm { file: file.to_string(), line: n + 1 });
        }
        let id = vocabulary.insert(term);
        if id as usize != n {
            return Err(FormatError::DuplicateTerm { file: file.to_string(), line: n + 1, term: term.to_string(), first: id });
        }
    }
    Ok(vocabulary)
}

pub fn save_vocabulary(paths: &IndexPaths, vocabulary: &Vocabulary) -> Result<()> {
    write_atomic(&paths.vocabulary(), encode_vocabulary(vocabulary).as_bytes())
}

pub fn load_vocabulary(paths: &IndexPaths) -> Result<Vocabulary> {
    let path = paths.vocabulary();
    Ok(parse_vocabulary(VOCABULARY_FILE, &read_text(&path)?)?)
}

// --- first index ---

pub fn encode_first_index(index: &FirstIndex) -> String {
    let mut out = String::new();
    for postings in index.iter() {
        let line: Vec<String> = postings.iter().map(|d| d.to_string()).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

fn check_line_count(file: &str, text: &str, expected: usize) -> Result<(), FormatError> {
    let found = text.lines().count();
    if found != expected {
        return Err(FormatError::LineCount { file: file.to_string(), expected, found });
    }
    Ok(())
}

fn parse_doc_id(file: &str, n: usize, token: &str, num_docs: usize) -> Result<DocId, FormatError> {
    let malformed = |reason: String| FormatError::MalformedLine { file: file.to_string(), line: n + 1, term_id: n as TermId, reason };
    let doc_id: DocId = token.parse().map_err(|_| malformed(format!("invalid document id {token:?}")))?;
    if doc_id as usize >= num_docs {
        return Err(malformed(format!("document id {doc_id} out of range for {num_docs} documents")));
    }
    Ok(doc_id)
}

/// Parses a first index with one line per vocabulary term. Document ids must be
/// below `num_docs`.
pub fn parse_first_index(file: &str, text: &str, num_terms: usize, num_docs: usize) -> Result<FirstIndex, FormatError> {
    check_line_count(file, text, num_terms)?;
    let mut postings = Vec::with_capacity(num_terms);
    for (n, line) in text.lines().enumerate() {
        let ids = line
            .split_whitespace()
            .map(|tok| parse_doc_id(file, n, tok, num_docs))
            .collect::<Result<Vec<_>, _>>()?;
        postings.push(ids);
    }
    Ok(FirstIndex::from_postings(postings))
}

pub fn save_first_index(paths: &IndexPaths, index: &FirstIndex) -> Result<()> {
    write_atomic(&paths.first_index(), encode_first_index(index).as_bytes())
}

pub fn load_first_index(paths: &IndexPaths, num_terms: usize, num_docs: usize) -> Result<FirstIndex> {
    let text = read_text(&paths.first_index())?;
    Ok(parse_first_index(FIRST_INDEX_FILE, &text, num_terms, num_docs)?)
}

// --- second index ---

/// Alternating `doc_id score` tokens. Scores use the shortest representation
/// that parses back to the same `f64`.
pub fn encode_second_index(index: &SecondIndex) -> String {
    let mut out = String::new();
    for postings in index.iter() {
        for (i, p) in postings.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{} {}", p.doc_id, p.weight);
        }
        out.push('\n');
    }
    out
}

pub fn parse_second_index(file: &str, text: &str, num_terms: usize, num_docs: usize) -> Result<SecondIndex, FormatError> {
    check_line_count(file, text, num_terms)?;
    let mut postings = Vec::with_capacity(num_terms);
    for (n, line) in text.lines().enumerate() {
        let malformed = |reason: String| FormatError::MalformedLine { file: file.to_string(), line: n + 1, term_id: n as TermId, reason };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() % 2 != 0 {
            return Err(malformed(format!("odd token count {}, expected doc/score pairs", tokens.len())));
        }
        let mut row = Vec::with_capacity(tokens.len() / 2);
        for pair in tokens.chunks_exact(2) {
            let doc_id = parse_doc_id(file, n, pair[0], num_docs)?;
            let weight: f64 = pair[1].parse().map_err(|_| malformed(format!("invalid score {:?}", pair[1])))?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(malformed(format!("score {weight} is not a finite non-negative number")));
            }
            row.push(Posting { doc_id, weight });
        }
        postings.push(row);
    }
    Ok(SecondIndex::from_postings(postings))
}

pub fn save_second_index(paths: &IndexPaths, index: &SecondIndex) -> Result<()> {
    write_atomic(&paths.second_index(), encode_second_index(index).as_bytes())
}

pub fn load_second_index(paths: &IndexPaths, num_terms: usize, num_docs: usize) -> Result<SecondIndex> {
    let text = read_text(&paths.second_index())?;
    Ok(parse_second_index(SECOND_INDEX_FILE, &text, num_terms, num_docs)?)
}

// --- meta ---

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    let json = serde_json::to_string_pretty(meta)?;
    write_atomic(&paths.meta(), json.as_bytes())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let path = paths.meta();
    let meta: MetaFile = serde_json::from_str(&read_text(&path)?).with_context(|| format!("decoding {}", path.display()))?;
    Ok(meta)
}
