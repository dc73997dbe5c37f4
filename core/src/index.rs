use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub type TermId = u32;
pub type DocId = u32;

/// One title of the corpus. Its id is its position in the ranked source list
/// and is not stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub url: String,
    pub synopsis: String,
    /// Normalized terms of the synopsis. Occurrence counts are already gone.
    pub terms: BTreeSet<String>,
    /// Rank in the popularity chart; smaller is more popular.
    pub popularity: u32,
}

/// Dense term -> id mapping. Ids follow insertion order, which is also the
/// line order of the persisted listing and of both index files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    ids: HashMap<String, TermId>,
}

impl Vocabulary {
    pub fn new() -> Self { Self::default() }

    /// Returns the id of `term`, assigning the next free id if it is new.
    pub fn insert(&mut self, term: &str) -> TermId {
        if let Some(&id) = self.ids.get(term) {
            return id;
        }
        let id = self.terms.len() as TermId;
        self.terms.push(term.to_string());
        self.ids.insert(term.to_string(), id);
        id
    }

    pub fn get(&self, term: &str) -> Option<TermId> { self.ids.get(term).copied() }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    /// Terms in id order.
    pub fn terms(&self) -> &[String] { &self.terms }
}

/// Boolean postings: slot `t` holds the ids of every document containing term `t`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstIndex {
    postings: Vec<Vec<DocId>>,
}

impl FirstIndex {
    pub fn from_postings(postings: Vec<Vec<DocId>>) -> Self { Self { postings } }

    pub fn postings(&self, term_id: TermId) -> &[DocId] {
        self.postings.get(term_id as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Document frequency of a term.
    pub fn df(&self, term_id: TermId) -> usize { self.postings(term_id).len() }

    pub fn len(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.postings.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &[DocId]> { self.postings.iter().map(Vec::as_slice) }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f64, // tf-idf
}

/// Weighted postings: slot `t` holds one (document, tf-idf) pair per document
/// containing term `t`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecondIndex {
    postings: Vec<Vec<Posting>>,
}

impl SecondIndex {
    pub fn from_postings(postings: Vec<Vec<Posting>>) -> Self { Self { postings } }

    pub fn postings(&self, term_id: TermId) -> &[Posting] {
        self.postings.get(term_id as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.postings.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &[Posting]> { self.postings.iter().map(Vec::as_slice) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_ids_are_dense_and_stable() {
        let mut v = Vocabulary::new();
        assert_eq!(v.insert("magic"), 0);
        assert_eq!(v.insert("alchemy"), 1);
        assert_eq!(v.insert("magic"), 0);
        assert_eq!(v.len(), 2);
        assert_eq!(v.get("alchemy"), Some(1));
        assert_eq!(v.terms()[0], "magic");
        assert_eq!(v.get("zzqqxx"), None);
    }

    #[test]
    fn out_of_range_term_has_no_postings() {
        let idx = FirstIndex::from_postings(vec![vec![0, 2]]);
        assert_eq!(idx.df(0), 2);
        assert!(idx.postings(7).is_empty());
    }
}
