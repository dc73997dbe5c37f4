use anisearch_core::build::{build_first_index, build_second_index, build_vocabulary};
use anisearch_core::persist::{
    load_first_index, load_meta, load_second_index, load_vocabulary, save_documents, save_first_index, save_meta, save_second_index,
    save_vocabulary, IndexPaths, MetaFile,
};
use anisearch_core::{Document, FormatError, PopularityMode, QueryEngine};
use std::fs;
use tempfile::tempdir;

fn corpus() -> Vec<Document> {
    let mk = |title: &str, synopsis: &str, terms: &[&str], popularity: u32| Document {
        title: title.into(),
        url: format!("https://myanimelist.net/anime/{title}"),
        synopsis: synopsis.into(),
        terms: terms.iter().map(|t| t.to_string()).collect(),
        popularity,
    };
    vec![
        mk("Fullmetal", "Two brothers study alchemy.", &["brother", "study", "alchemy"], 3),
        mk("Frieren", "An elf mage remembers her party and their magic.", &["elf", "mage", "party", "magic"], 120),
        mk("Witch", "A young witch studies magic and alchemy.", &["young", "witch", "study", "magic", "alchemy"], 900),
    ]
}

fn write_index(paths: &IndexPaths, docs: &[Document]) {
    let v = build_vocabulary(docs);
    let first = build_first_index(&v, docs);
    let second = build_second_index(&v, &first, docs);
    save_documents(paths, docs).unwrap();
    save_vocabulary(paths, &v).unwrap();
    save_first_index(paths, &first).unwrap();
    save_second_index(paths, &second).unwrap();
}

#[test]
fn open_answers_queries_from_disk() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    write_index(&paths, &corpus());

    let engine = QueryEngine::open(&paths).unwrap();
    let hits = engine.boolean_query(&["alchemy", "study"]).unwrap();
    let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles, vec!["Fullmetal", "Witch"]);
    assert_eq!(hits[0].synopsis, "Two brothers study alchemy.");

    let ranked = engine.ranked_query(&["magic", "alchemy"], 10).unwrap();
    assert_eq!(ranked[0].title, "Witch");

    let popular = engine.popularity_query(&["magic"], PopularityMode::Popular, 10).unwrap();
    assert_eq!(popular.len(), 2);
}

#[test]
fn loaded_index_matches_built_index() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let docs = corpus();
    write_index(&paths, &docs);

    let v = load_vocabulary(&paths).unwrap();
    assert_eq!(v, build_vocabulary(&docs));
    let first = load_first_index(&paths, v.len(), docs.len()).unwrap();
    assert_eq!(first, build_first_index(&v, &docs));
    let second = load_second_index(&paths, v.len(), docs.len()).unwrap();
    assert_eq!(second, build_second_index(&v, &first, &docs));
}

#[test]
fn rebuild_writes_identical_bytes_and_no_temp_files() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    write_index(&paths, &corpus());
    let before: Vec<Vec<u8>> = [paths.vocabulary(), paths.first_index(), paths.second_index()]
        .iter()
        .map(|p| fs::read(p).unwrap())
        .collect();
    write_index(&paths, &corpus());
    let after: Vec<Vec<u8>> = [paths.vocabulary(), paths.first_index(), paths.second_index()]
        .iter()
        .map(|p| fs::read(p).unwrap())
        .collect();
    assert_eq!(before, after);

    let leftovers = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn malformed_second_index_aborts_loading() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    write_index(&paths, &corpus());
    let text = fs::read_to_string(paths.second_index()).unwrap();
    let mut lines: Vec<String> = text.lines().map(String::from).collect();
    lines[1].push_str(" 2");
    fs::write(paths.second_index(), lines.join("\n") + "\n").unwrap();

    let err = QueryEngine::open(&paths).err().expect("malformed index must not load");
    match err.downcast_ref::<FormatError>() {
        Some(FormatError::MalformedLine { line, term_id, .. }) => {
            assert_eq!(*line, 2);
            assert_eq!(*term_id, 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn missing_files_fail_to_open() {
    let dir = tempdir().unwrap();
    assert!(QueryEngine::open(&IndexPaths::new(dir.path())).is_err());
}

#[test]
fn reload_picks_up_a_rebuilt_index() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let mut docs = corpus();
    write_index(&paths, &docs);
    let mut engine = QueryEngine::open(&paths).unwrap();
    assert!(engine.boolean_query(&["robot"]).unwrap().is_empty());

    docs[1].terms.insert("robot".into());
    write_index(&paths, &docs);
    engine.reload(&paths).unwrap();
    assert_eq!(engine.boolean_query(&["robot"]).unwrap()[0].title, "Frieren");

    fs::remove_file(paths.vocabulary()).unwrap();
    assert!(engine.reload(&paths).is_err());
    assert_eq!(engine.boolean_query(&["robot"]).unwrap().len(), 1);
}

#[test]
fn meta_round_trips_as_json() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let meta = MetaFile { num_docs: 3, num_terms: 10, created_at: "2024-01-01T00:00:00Z".into(), version: 1 };
    save_meta(&paths, &meta).unwrap();
    assert_eq!(load_meta(&paths).unwrap(), meta);
}
