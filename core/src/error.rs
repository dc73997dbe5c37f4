use crate::TermId;
use thiserror::Error;

/// Rejected query requests. Unmatchable queries are not errors; they return
/// an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("empty query: supply at least one query term")]
    EmptyQuery,
    #[error("query too short: supply at least {min} query terms, got {got}")]
    QueryTooShort { min: usize, got: usize },
    #[error("invalid popularity mode {0:?}: expected \"popular\" or \"unpopular\"")]
    InvalidPopularityMode(String),
    #[error("result limit must be a positive integer")]
    InvalidLimit,
}

/// A persisted vocabulary or index file that does not match its encoding.
/// Loading stops at the first offending line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("{file}:{line}: empty term")]
    EmptyTerm { file: String, line: usize },
    #[error("{file}:{line}: duplicate term {term:?} (already term id {first})")]
    DuplicateTerm { file: String, line: usize, term: String, first: TermId },
    #[error("{file}: expected {expected} lines (one per vocabulary term), found {found}")]
    LineCount { file: String, expected: usize, found: usize },
    #[error("{file}:{line} (term id {term_id}): {reason}")]
    MalformedLine { file: String, line: usize, term_id: TermId, reason: String },
}
