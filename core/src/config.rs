//! Tunables shared by the build pipeline and the query engines.

/// Popularity assigned to documents whose rank is unknown. Roughly the middle
/// of a ~19k title ranking, so a missing value reads as "average".
pub const DEFAULT_POPULARITY: u32 = 10_000;

/// Builders log a progress event every this many documents.
pub const PROGRESS_EVERY: usize = 1000;

/// Ranked (non-augmented) queries need at least this many terms.
pub const MIN_RANKED_TERMS: usize = 2;

pub const DEFAULT_LIMIT: usize = 10;

/// Bumped whenever an on-disk encoding changes.
pub const INDEX_VERSION: u32 = 1;
