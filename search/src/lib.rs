use anisearch_core::persist::IndexPaths;
use anisearch_core::tokenizer::tokenize;
use anisearch_core::{BooleanHit, DocId, Document, DocumentStore, PopularityMode, QueryEngine, RankedHit};
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

const SNIPPET_BEFORE: usize = 100;
const SNIPPET_AFTER: usize = 200;

/// A loaded index plus the query-word handling of the command line.
pub struct Searcher {
    engine: QueryEngine,
    normalize: bool,
}

impl Searcher {
    /// `normalize` runs query words through the synopsis normalizer, for
    /// indexes whose terms were derived by it rather than supplied upstream.
    pub fn open<P: AsRef<Path>>(index_dir: P, normalize: bool) -> Result<Self> {
        let engine = QueryEngine::open(&IndexPaths::new(index_dir))?;
        Ok(Self { engine, normalize })
    }

    /// Splits raw arguments into query terms.
    pub fn query_terms(&self, words: &[String]) -> Vec<String> {
        if self.normalize {
            tokenize(&words.join(" "))
        } else {
            words.iter().flat_map(|w| w.split_whitespace()).map(str::to_string).collect()
        }
    }

    pub fn boolean(&self, words: &[String]) -> Result<Vec<BooleanHit>> {
        let terms = self.query_terms(words);
        Ok(self.engine.boolean_query(terms.as_slice())?)
    }

    pub fn ranked(&self, words: &[String], limit: usize) -> Result<Vec<RankedHit>> {
        let terms = self.query_terms(words);
        Ok(self.engine.ranked_query(terms.as_slice(), limit)?)
    }

    pub fn popularity(&self, words: &[String], mode: &str, limit: usize) -> Result<Vec<RankedHit>> {
        let mode: PopularityMode = mode.parse()?;
        let terms = self.query_terms(words);
        Ok(self.engine.popularity_query(terms.as_slice(), mode, limit)?)
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> { self.engine.store().get(doc_id) }
}

pub fn render_boolean(hits: &[BooleanHit], words: &[String]) -> String {
    let mut out = String::new();
    for hit in hits {
        let _ = writeln!(out, "[{}] {}\n    {}\n    {}", hit.doc_id, hit.title, hit.url, snippet(&hit.synopsis, words));
    }
    let _ = writeln!(out, "{} matching titles", hits.len());
    out
}

pub fn render_ranked(hits: &[RankedHit], words: &[String]) -> String {
    let mut out = String::new();
    for (rank, hit) in hits.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:.4}  [{}] {}\n    {}\n    {}",
            rank + 1,
            hit.score,
            hit.doc_id,
            hit.title,
            hit.url,
            snippet(&hit.synopsis, words)
        );
    }
    out
}

pub fn render_document(doc_id: DocId, doc: &Document) -> String {
    let terms: Vec<&str> = doc.terms.iter().map(String::as_str).collect();
    format!(
        "[{doc_id}] {}\nurl: {}\npopularity: {}\nterms: {}\n\n{}\n",
        doc.title,
        doc.url,
        doc.popularity,
        terms.join(" "),
        doc.synopsis
    )
}

/// Window of the synopsis around the first query word, with every query word
/// wrapped in `<em>`. Falls back to the opening of the synopsis.
pub fn snippet(text: &str, words: &[String]) -> String {
    if text.is_empty() {
        return String::new();
    }
    let first = words.iter().filter_map(|w| word_regex(w)).filter_map(|re| re.find(text).map(|m| m.start())).min();
    let snippet = match first {
        Some(idx) => {
            let start = floor_boundary(text, idx.saturating_sub(SNIPPET_BEFORE));
            let end = ceil_boundary(text, idx + SNIPPET_AFTER);
            &text[start..end]
        }
        None => &text[..ceil_boundary(text, SNIPPET_AFTER)],
    };
    highlight_terms(snippet, words)
}

fn word_regex(word: &str) -> Option<regex::Regex> {
    if word.trim().is_empty() {
        return None;
    }
    regex::RegexBuilder::new(&regex::escape(word.trim())).case_insensitive(true).build().ok()
}

fn highlight_terms(snippet: &str, words: &[String]) -> String {
    let mut s = snippet.to_string();
    for re in words.iter().filter_map(|w| word_regex(w)) {
        s = re.replace_all(&s, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string();
    }
    s
}

fn floor_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_boundary(s: &str, i: usize) -> usize {
    let mut i = i.min(s.len());
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
