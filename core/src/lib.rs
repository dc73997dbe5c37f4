pub mod build;
pub mod config;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod store;
pub mod tokenizer;

pub use error::{FormatError, QueryError};
pub use index::{DocId, Document, FirstIndex, Posting, SecondIndex, TermId, Vocabulary};
pub use query::{BooleanHit, PopularityMode, QueryEngine, RankedHit};
pub use store::{DocStore, DocumentStore};
