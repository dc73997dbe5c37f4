//! Batch builders: documents -> vocabulary -> first index -> second index.

use crate::config::PROGRESS_EVERY;
use crate::{DocId, Document, FirstIndex, Posting, SecondIndex, Vocabulary};

/// Union of every document's term set. Ids are handed out in order of first
/// appearance, walking documents by id and each term set in sorted order.
pub fn build_vocabulary(docs: &[Document]) -> Vocabulary {
    let mut vocabulary = Vocabulary::new();
    for (i, doc) in docs.iter().enumerate() {
        for term in &doc.terms {
            vocabulary.insert(term);
        }
        log_progress("vocabulary", i, docs.len());
    }
    tracing::info!(num_terms = vocabulary.len(), "vocabulary built");
    vocabulary
}

pub fn build_first_index(vocabulary: &Vocabulary, docs: &[Document]) -> FirstIndex {
    let mut postings: Vec<Vec<DocId>> = vec![Vec::new(); vocabulary.len()];
    for (i, doc) in docs.iter().enumerate() {
        for term in &doc.terms {
            // Unknown terms can only appear if the vocabulary came from another corpus.
            if let Some(tid) = vocabulary.get(term) {
                postings[tid as usize].push(i as DocId);
            }
        }
        log_progress("first index", i, docs.len());
    }
    tracing::info!(num_terms = postings.len(), "first index built");
    FirstIndex::from_postings(postings)
}

/// Per-document term frequency: the reciprocal of the number of distinct
/// terms, so every term of a document gets the same value.
pub fn tf(distinct_terms: usize) -> f64 {
    if distinct_terms == 0 { 0.0 } else { 1.0 / distinct_terms as f64 }
}

/// Unsmoothed `ln(N / df)`. Zero when the term is in every document or in none.
pub fn idf(num_docs: usize, df: usize) -> f64 {
    if df == 0 || num_docs == 0 { 0.0 } else { (num_docs as f64 / df as f64).ln() }
}

pub fn build_second_index(vocabulary: &Vocabulary, first: &FirstIndex, docs: &[Document]) -> SecondIndex {
    let n = docs.len();
    let mut postings: Vec<Vec<Posting>> = vec![Vec::new(); vocabulary.len()];
    for (i, doc) in docs.iter().enumerate() {
        let tf = tf(doc.terms.len());
        for term in &doc.terms {
            if let Some(tid) = vocabulary.get(term) {
                let weight = tf * idf(n, first.df(tid));
                postings[tid as usize].push(Posting { doc_id: i as DocId, weight });
            }
        }
        log_progress("second index", i, docs.len());
    }
    tracing::info!(num_terms = postings.len(), num_docs = n, "second index built");
    SecondIndex::from_postings(postings)
}

fn log_progress(step: &'static str, i: usize, total: usize) {
    if i % PROGRESS_EVERY == 0 {
        tracing::info!(step, done = i, total, "progress");
    }
}
