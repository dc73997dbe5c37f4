//! Boolean, ranked and popularity-augmented queries over a loaded index.
//!
//! A `QueryEngine` is built once from persisted files (or in memory) and only
//! read afterwards, so it can be shared across threads.

use crate::build::{build_first_index, build_second_index, build_vocabulary};
use crate::config::MIN_RANKED_TERMS;
use crate::persist::{load_documents, load_first_index, load_second_index, load_vocabulary, IndexPaths};
use crate::{DocId, DocStore, Document, DocumentStore, FirstIndex, QueryError, SecondIndex, TermId, Vocabulary};
use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanHit {
    pub doc_id: DocId,
    pub title: String,
    pub synopsis: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedHit {
    pub doc_id: DocId,
    pub title: String,
    pub synopsis: String,
    pub url: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopularityMode {
    Popular,
    Unpopular,
}

impl PopularityMode {
    /// Value of the extra document dimension for a normalized popularity in `[0, 1]`.
    pub fn dimension(self, weighted: f64) -> f64 {
        match self {
            PopularityMode::Popular => weighted,
            PopularityMode::Unpopular => 1.0 - weighted,
        }
    }
}

impl FromStr for PopularityMode {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(PopularityMode::Popular),
            "unpopular" => Ok(PopularityMode::Unpopular),
            other => Err(QueryError::InvalidPopularityMode(other.to_string())),
        }
    }
}

/// `(popularity - min) / (max - min)`; 0 when every document shares the same popularity.
pub fn weighted_popularity(popularity: u32, (min, max): (u32, u32)) -> f64 {
    if max <= min {
        return 0.0;
    }
    popularity.saturating_sub(min) as f64 / (max - min) as f64
}

/// Cosine of the angle between `a` and `b`, or 0 when either has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

pub struct QueryEngine<S = DocStore> {
    vocabulary: Vocabulary,
    first: FirstIndex,
    second: SecondIndex,
    store: S,
    popularity_range: Option<(u32, u32)>,
}

impl<S: DocumentStore> QueryEngine<S> {
    pub fn new(vocabulary: Vocabulary, first: FirstIndex, second: SecondIndex, store: S) -> Self {
        let popularity_range = store.popularity_range();
        Self { vocabulary, first, second, store, popularity_range }
    }

    pub fn store(&self) -> &S { &self.store }

    /// Lower-cases each term and maps it to its id. `None` if any term is
    /// outside the vocabulary, in which case the query cannot match.
    fn resolve<T: AsRef<str>>(&self, terms: &[T]) -> Option<Vec<TermId>> {
        terms.iter().map(|t| self.vocabulary.get(&t.as_ref().trim().to_lowercase())).collect()
    }

    /// Documents containing every term, in id order.
    pub fn boolean_query<T: AsRef<str>>(&self, terms: &[T]) -> Result<Vec<BooleanHit>, QueryError> {
        if terms.is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        let Some(term_ids) = self.resolve(terms) else {
            return Ok(Vec::new());
        };
        let mut matches: BTreeSet<DocId> = self.first.postings(term_ids[0]).iter().copied().collect();
        for &tid in &term_ids[1..] {
            let other: HashSet<DocId> = self.first.postings(tid).iter().copied().collect();
            matches.retain(|d| other.contains(d));
        }
        let hits = matches
            .into_iter()
            .filter_map(|doc_id| {
                let doc = self.store.get(doc_id)?;
                Some(BooleanHit { doc_id, title: doc.title.clone(), synopsis: doc.synopsis.clone(), url: doc.url.clone() })
            })
            .collect();
        Ok(hits)
    }

    /// Top `limit` documents by cosine similarity between an all-ones query
    /// vector and each document's tf-idf weights for the query terms.
    pub fn ranked_query<T: AsRef<str>>(&self, terms: &[T], limit: usize) -> Result<Vec<RankedHit>, QueryError> {
        if terms.len() < MIN_RANKED_TERMS {
            return Err(QueryError::QueryTooShort { min: MIN_RANKED_TERMS, got: terms.len() });
        }
        if limit == 0 {
            return Err(QueryError::InvalidLimit);
        }
        Ok(match self.resolve(terms) {
            Some(term_ids) => self.rank(&term_ids, None, limit),
            None => Vec::new(),
        })
    }

    /// Like `ranked_query`, with one more dimension holding the document's
    /// normalized popularity (or its complement for `Unpopular`). Every
    /// document whose augmented vector is not all zero is a candidate, including
    /// documents that contain none of the terms.
    pub fn popularity_query<T: AsRef<str>>(&self, terms: &[T], mode: PopularityMode, limit: usize) -> Result<Vec<RankedHit>, QueryError> {
        if terms.is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        if limit == 0 {
            return Err(QueryError::InvalidLimit);
        }
        Ok(match self.resolve(terms) {
            Some(term_ids) => self.rank(&term_ids, Some(mode), limit),
            None => Vec::new(),
        })
    }

    fn rank(&self, term_ids: &[TermId], mode: Option<PopularityMode>, limit: usize) -> Vec<RankedHit> {
        let mut vectors: BTreeMap<DocId, Vec<f64>> = BTreeMap::new();
        for (dim, &tid) in term_ids.iter().enumerate() {
            for p in self.second.postings(tid) {
                vectors.entry(p.doc_id).or_insert_with(|| vec![0.0; term_ids.len()])[dim] = p.weight;
            }
        }

        // Without the popularity dimension only posting hits can be non-zero.
        // With it, every stored document carries a vector.
        let candidates: Vec<(DocId, Vec<f64>)> = match mode {
            None => vectors.into_iter().collect(),
            Some(_) => (0..self.store.len() as DocId)
                .map(|id| (id, vectors.remove(&id).unwrap_or_else(|| vec![0.0; term_ids.len()])))
                .collect(),
        };

        let dims = term_ids.len() + usize::from(mode.is_some());
        let query = vec![1.0; dims];
        let range = self.popularity_range.unwrap_or((0, 0));

        let mut scored: Vec<(DocId, f64)> = candidates
            .into_iter()
            .filter_map(|(doc_id, mut v)| {
                let doc = self.store.get(doc_id)?;
                if let Some(mode) = mode {
                    v.push(mode.dimension(weighted_popularity(doc.popularity, range)));
                }
                v.iter().any(|w| *w != 0.0).then(|| (doc_id, cosine_similarity(&query, &v)))
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(limit);

        tracing::debug!(terms = term_ids.len(), hits = scored.len(), popularity = mode.is_some(), "ranked query");
        scored
            .into_iter()
            .filter_map(|(doc_id, score)| {
                let doc = self.store.get(doc_id)?;
                Some(RankedHit { doc_id, title: doc.title.clone(), synopsis: doc.synopsis.clone(), url: doc.url.clone(), score })
            })
            .collect()
    }
}

impl QueryEngine<DocStore> {
    /// Load documents, vocabulary and both indexes from an index directory.
    pub fn open(paths: &IndexPaths) -> Result<Self> {
        let docs = load_documents(paths)?;
        let vocabulary = load_vocabulary(paths)?;
        let first = load_first_index(paths, vocabulary.len(), docs.len())?;
        let second = load_second_index(paths, vocabulary.len(), docs.len())?;
        tracing::info!(num_docs = docs.len(), num_terms = vocabulary.len(), root = %paths.root.display(), "index loaded");
        Ok(Self::new(vocabulary, first, second, DocStore::new(docs)))
    }

    /// Re-read the index directory. The current state is kept if loading fails.
    pub fn reload(&mut self, paths: &IndexPaths) -> Result<()> {
        *self = Self::open(paths)?;
        Ok(())
    }

    /// Build every structure in memory from an already ingested corpus.
    pub fn from_documents(docs: Vec<Document>) -> Self {
        let vocabulary = build_vocabulary(&docs);
        let first = build_first_index(&vocabulary, &docs);
        let second = build_second_index(&vocabulary, &first, &docs);
        Self::new(vocabulary, first, second, DocStore::new(docs))
    }
}
