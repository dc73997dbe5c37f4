use crate::{DocId, Document};

/// Random access to the documents an index was built from.
pub trait DocumentStore {
    fn get(&self, doc_id: DocId) -> Option<&Document>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool { self.len() == 0 }

    /// `(min, max)` popularity over all documents, `None` for an empty store.
    fn popularity_range(&self) -> Option<(u32, u32)> {
        (0..self.len() as DocId)
            .filter_map(|id| self.get(id))
            .map(|d| d.popularity)
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
            })
    }
}

/// In-memory store backed by the ingested corpus, indexed by document id.
#[derive(Debug, Clone, Default)]
pub struct DocStore {
    docs: Vec<Document>,
}

impl DocStore {
    pub fn new(docs: Vec<Document>) -> Self { Self { docs } }
}

impl DocumentStore for DocStore {
    fn get(&self, doc_id: DocId) -> Option<&Document> { self.docs.get(doc_id as usize) }

    fn len(&self) -> usize { self.docs.len() }
}
