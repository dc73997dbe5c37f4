use anisearch_core::build::{build_first_index, build_second_index, build_vocabulary};
use anisearch_core::persist::{save_documents, save_first_index, save_second_index, save_vocabulary, IndexPaths};
use anisearch_core::tokenizer::term_set;
use anisearch_core::{Document, QueryError};
use search::{render_ranked, Searcher};
use tempfile::tempdir;

fn build_tiny_index(dir: &std::path::Path) {
    let paths = IndexPaths::new(dir);
    let mk = |title: &str, synopsis: &str, popularity: u32| Document {
        title: title.into(),
        url: format!("https://myanimelist.net/anime/{}", title.replace(' ', "_")),
        synopsis: synopsis.into(),
        terms: term_set(synopsis),
        popularity,
    };
    let docs = vec![
        mk("Fullmetal Alchemist", "Brothers Edward and Alphonse Elric use alchemy to restore their bodies.", 3),
        mk("Little Witch Academia", "A girl enrolls at a school of magic and studies witchcraft.", 640),
        mk("Magi", "A boy with a magic flute and his friend explore dungeons full of alchemy and magic.", 150),
        mk("Space Dandy", "A dandy alien hunter flies through space.", 1200),
    ];
    let v = build_vocabulary(&docs);
    let first = build_first_index(&v, &docs);
    let second = build_second_index(&v, &first, &docs);
    save_documents(&paths, &docs).unwrap();
    save_vocabulary(&paths, &v).unwrap();
    save_first_index(&paths, &first).unwrap();
    save_second_index(&paths, &second).unwrap();
}

fn words(ws: &[&str]) -> Vec<String> { ws.iter().map(|w| w.to_string()).collect() }

#[test]
fn boolean_search_with_normalized_words() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let searcher = Searcher::open(dir.path(), true).unwrap();

    let hits = searcher.boolean(&words(&["Alchemy", "magic"])).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Magi");
}

#[test]
fn ranked_search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let searcher = Searcher::open(dir.path(), true).unwrap();

    let hits = searcher.ranked(&words(&["alchemy magic"]), 2).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].title, "Magi");
    assert!(hits[0].score >= hits[1].score);

    let text = render_ranked(&hits, &words(&["alchemy", "magic"]));
    assert!(text.contains("  1. "));
    assert!(text.contains("<em>magic</em>"));
}

#[test]
fn raw_words_are_only_lowercased() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let searcher = Searcher::open(dir.path(), false).unwrap();

    // "brothers" is stored stemmed, so the raw word does not match.
    assert!(searcher.boolean(&words(&["brothers"])).unwrap().is_empty());
    assert_eq!(searcher.boolean(&words(&["BROTHER"])).unwrap().len(), 1);
}

#[test]
fn popularity_search_validates_mode() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let searcher = Searcher::open(dir.path(), true).unwrap();

    let err = searcher.popularity(&words(&["magic"]), "trending", 5).unwrap_err();
    assert_eq!(err.downcast_ref::<QueryError>(), Some(&QueryError::InvalidPopularityMode("trending".into())));

    // Fullmetal Alchemist holds the range minimum, so its unpopular dimension is 1
    // even without "magic". Space Dandy holds the maximum and has neither.
    let hits = searcher.popularity(&words(&["magic"]), "unpopular", 5).unwrap();
    let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles.len(), 3);
    assert!(titles.contains(&"Fullmetal Alchemist"));
    assert!(!titles.contains(&"Space Dandy"));
}

#[test]
fn stopword_only_query_is_rejected_as_empty() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let searcher = Searcher::open(dir.path(), true).unwrap();

    let err = searcher.boolean(&words(&["the", "and"])).unwrap_err();
    assert_eq!(err.downcast_ref::<QueryError>(), Some(&QueryError::EmptyQuery));
}

#[test]
fn document_lookup() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let searcher = Searcher::open(dir.path(), false).unwrap();
    assert_eq!(searcher.document(3).unwrap().title, "Space Dandy");
    assert!(searcher.document(4).is_none());
}
