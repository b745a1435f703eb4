use std::fs;
use tempfile::TempDir;

use cookery_core::config::Config;
use cookery_core::data_processor::DataProcessor;
use serde_json::Value;

#[test]
fn process_csv_reads_quoted_multiline_cells() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("kb.csv");
    fs::write(
        &path,
        "type,question,response\nbasic,How do I boil an egg,\"Boil water, add egg\nfor 8 minutes\"\n",
    )
    .unwrap();

    let docs = DataProcessor::default().process_csv(&path).expect("process");

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].text("response"), "Boil water, add egg\nfor 8 minutes");
    assert_eq!(docs[0].get("ID"), Some(&Value::from(0)));
}

#[test]
fn process_csv_missing_file_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = DataProcessor::default().process_csv(&tmp.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, cookery_core::Error::NotFound(_)));
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn process_csv_missing_declared_column_still_loads() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("kb.csv");
    fs::write(&path, "question,response\nHow do I dice an onion,Cut onion in half\n").unwrap();

    let docs = DataProcessor::default().process_csv(&path).expect("process");

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].get("type"), None);
    assert_eq!(docs[0].text("type"), "");
}

#[test]
fn config_file_overrides_defaults() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        r#"
[data]
knowledge_base = "kb/recipes.csv"

[search]
num_results = 3
boost = { question = 2.5 }

[llm]
model = "gpt-4o"
"#,
    )
    .unwrap();

    let config = Config::load_from(tmp.path()).expect("load");
    let app = config.app().expect("app config");

    assert_eq!(app.search.num_results, 3);
    assert_eq!(app.search.boost.get("question"), Some(&2.5));
    assert_eq!(app.llm.model, "gpt-4o");
    // untouched sections keep their defaults
    assert_eq!(app.index.keyword_fields, ["ID"]);
    assert_eq!(app.knowledge_base_path(config.base_dir()), tmp.path().join("kb/recipes.csv"));
    assert_eq!(config.get::<String>("llm.model").unwrap(), "gpt-4o");
}

#[test]
fn config_without_files_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let app = Config::load_from(tmp.path()).unwrap().app().unwrap();
    assert_eq!(app.search.num_results, 10);
    assert_eq!(app.data.knowledge_base, "data/cooking_knowledge.csv");
}

#[test]
fn invalid_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[search]\nnum_results = 0\n").unwrap();
    let err = Config::load_from(tmp.path()).unwrap().app().unwrap_err();
    assert!(matches!(err, cookery_core::Error::InvalidConfig(_)));
}
