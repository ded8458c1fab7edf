use std::fs;

use nba_predictor::extract::extract_team_stats;
use nba_predictor::persist::{
    HistoryEntry, append_history, catalog_path, history_newest_first, history_path, load_catalog,
    load_history, save_catalog,
};
use nba_predictor::stats::{Metric, StatValue, initialize_catalog};

const ROWS: &str = "\
1 Boston Celtics 82 64 18 48.2 122.2 110.6 11.7 59.6 1.95 16.8 29.5 72.7 51.0 12.3 57.8 61.1 97.2 57.0 7998
8 Orlando Magic 82 47 35 48.4 112.8 110.8 2.0 62.5 1.63 16.9 29.0 71.8 50.4 14.9 53.8 57.2 97.6 49.8.1 8070
";

#[test]
fn catalog_round_trip_preserves_values_and_unknowns() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = catalog_path(dir.path());

    let mut catalog = extract_team_stats(ROWS);
    catalog.insert(
        "Utah Jazz".to_string(),
        initialize_catalog()["Utah Jazz"].clone(),
    );
    save_catalog(&path, &catalog).expect("save catalog");

    let loaded = load_catalog(&path);
    assert_eq!(loaded, catalog);
    assert!(loaded["Utah Jazz"].get(Metric::OffRtg).is_unknown());
    assert_eq!(
        loaded["Orlando Magic"].get(Metric::Pie),
        &StatValue::Text("49.8.1".to_string())
    );
}

#[test]
fn saved_catalog_uses_report_column_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = catalog_path(dir.path());
    save_catalog(&path, &initialize_catalog()).expect("save catalog");

    let raw = fs::read_to_string(&path).expect("read back");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    let hawks = value["Atlanta Hawks"].as_object().expect("team object");
    assert_eq!(hawks.len(), 19);
    assert!(hawks["AST Ratio"].is_null());
    assert!(hawks["eFG%"].is_null());
}

#[test]
fn missing_corrupt_or_empty_catalog_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = catalog_path(dir.path());
    assert_eq!(load_catalog(&path), initialize_catalog());

    fs::write(&path, "{ not json").expect("write corrupt file");
    assert_eq!(load_catalog(&path), initialize_catalog());

    fs::write(&path, "{}").expect("write empty catalog");
    assert_eq!(load_catalog(&path).len(), 30);
}

#[test]
fn history_appends_in_call_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = history_path(dir.path().join("nested").as_path());
    assert!(load_history(&path).is_empty());

    for (a, b) in [("Boston Celtics", "Miami Heat"), ("Denver Nuggets", "LA Clippers")] {
        append_history(
            &path,
            HistoryEntry {
                team1: a.to_string(),
                team2: b.to_string(),
                result: format!("{a} is projected to beat {b}!"),
            },
        )
        .expect("append history");
    }

    let history = load_history(&path);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].team1, "Boston Celtics");
    assert_eq!(history_newest_first(&history)[0].team1, "Denver Nuggets");

    let raw = fs::read_to_string(&path).expect("read back");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    let keys: Vec<&String> = value[0].as_object().expect("entry").keys().collect();
    assert_eq!(keys.len(), 3);
}

#[test]
fn corrupt_history_reads_as_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = history_path(dir.path());
    fs::write(&path, "[{\"team1\": 3}]").expect("write corrupt history");
    assert!(load_history(&path).is_empty());
}
