use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use cookery_core::config::IndexConfig;
use cookery_core::traits::TextIndexer;
use cookery_core::types::{Document, SearchQuery};
use cookery_text::{load_index, Index};

const KNOWLEDGE_BASE: &str = "\
type,question,response
basic,How do I boil an egg,\"Boil water, add egg for 8 minutes\"
basic,How do I dice an onion,Cut onion in half...
baking,Why did my bread not rise,Check that the yeast is fresh and the water is warm
storage,How do I keep herbs fresh,Basil basil
basic,What can I cook tonight with garden basil leaves and tomatoes,Make a salad
";

fn fixture() -> (TempDir, Index) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cooking_knowledge.csv");
    fs::write(&path, KNOWLEDGE_BASE).unwrap();
    let index = load_index(&path, &IndexConfig::default()).expect("load index");
    (tmp, index)
}

fn ids(docs: &[Document]) -> Vec<usize> {
    docs.iter().map(|d| d.id).collect()
}

#[test]
fn csv_to_search_full_flow() {
    let (_tmp, index) = fixture();
    assert_eq!(index.len(), 5);

    let hits = index.search(&SearchQuery::new("boil egg").with_num_results(1)).unwrap();
    assert_eq!(ids(&hits), vec![0]);
    assert_eq!(hits[0].text("response"), "Boil water, add egg for 8 minutes");

    let hits = index.search(&SearchQuery::new("onion")).unwrap();
    assert_eq!(hits[0].id, 1);

    let hits = index.search(&SearchQuery::new("yeast")).unwrap();
    assert_eq!(ids(&hits), vec![2]);
}

#[test]
fn synthesized_id_is_filterable() {
    let (_tmp, index) = fixture();
    let hits = index.search(&SearchQuery::new("").with_filter("ID", 3)).unwrap();
    assert_eq!(ids(&hits), vec![3]);
    let hits = index.search(&SearchQuery::new("basil").with_filter("ID", 4)).unwrap();
    assert_eq!(ids(&hits), vec![4]);
}

#[test]
fn question_boost_reverses_response_only_match() {
    let (_tmp, index) = fixture();
    // doc 3 mentions basil only in `response`, doc 4 only once in a long `question`
    let plain = index.search(&SearchQuery::new("basil")).unwrap();
    assert_eq!(ids(&plain), vec![3, 4]);

    let boosted = index.search(&SearchQuery::new("basil").with_boost("question", 5.0)).unwrap();
    assert_eq!(ids(&boosted), vec![4, 3]);
}

#[test]
fn type_field_participates_in_scoring() {
    let (_tmp, index) = fixture();
    let hits = index.search(&SearchQuery::new("baking")).unwrap();
    assert_eq!(ids(&hits), vec![2]);
}

#[test]
fn empty_then_refit_replaces_state() {
    let index = Index::new(["type", "question", "response"], ["ID"]).unwrap();
    index.fit(Vec::new());
    assert!(index.search(&SearchQuery::new("")).unwrap().is_empty());

    let (_tmp, loaded) = fixture();
    let docs = loaded.search(&SearchQuery::new("").with_num_results(100)).unwrap();
    TextIndexer::index(&index, docs).unwrap();
    assert_eq!(index.len(), 5);
    assert_eq!(ids(&index.search(&SearchQuery::new("onion")).unwrap()), vec![1]);
}

#[test]
fn concurrent_searches_never_see_partial_rebuilds() {
    fn generation(tag: &str, n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| Document::new(i).with_field("question", format!("{tag} egg {i}")).with_field("ID", i))
            .collect()
    }

    let index = Arc::new(Index::new(["question"], ["ID"]).unwrap());
    index.fit(generation("old", 2));

    std::thread::scope(|s| {
        for _ in 0..4 {
            let index = Arc::clone(&index);
            s.spawn(move || {
                for _ in 0..200 {
                    let hits = index.search(&SearchQuery::new("egg").with_num_results(100)).unwrap();
                    let tags: Vec<String> = hits
                        .iter()
                        .map(|d| d.text("question").split(' ').next().unwrap_or("").to_string())
                        .collect();
                    match hits.len() {
                        2 => assert!(tags.iter().all(|t| t == "old")),
                        3 => assert!(tags.iter().all(|t| t == "new")),
                        n => panic!("unexpected hit count {n}"),
                    }
                }
            });
        }
        let writer = Arc::clone(&index);
        s.spawn(move || {
            for round in 0..50 {
                if round % 2 == 0 { writer.fit(generation("new", 3)) } else { writer.fit(generation("old", 2)) }
            }
        });
    });
}
