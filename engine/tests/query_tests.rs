use engine::query::normalize_query;
use engine::{InvertedIndex, QueryEngine, ThreadSafeIndex, WorkQueue};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn sample_index() -> Arc<ThreadSafeIndex> {
    let mut index = InvertedIndex::new();
    index.add_range(&["fox", "run", "fox", "dog"], "a.txt", 1);
    index.add_range(&["run", "runner", "cat"], "b.txt", 1);
    Arc::new(ThreadSafeIndex::from(index))
}

#[test]
fn normalizes_to_sorted_unique_stems() {
    assert_eq!(normalize_query("Running FOX  fox runs"), "fox run");
    assert_eq!(normalize_query(" 42 ?! "), "");
}

#[test]
fn processes_a_query_file() {
    let dir = tempdir().unwrap();
    let queries = dir.path().join("queries.txt");
    fs::write(&queries, "fox\nRunning\n\n!!!\nFOXES fox\nrun dog\n").unwrap();

    let queue = Arc::new(WorkQueue::new(4).unwrap());
    let engine = QueryEngine::new(sample_index(), Arc::clone(&queue), false);
    engine.process_file(&queries).unwrap();

    // "fox", "run", "fox" (FOXES stems to fox), "dog run"; blanks skipped
    assert_eq!(engine.view_queries(), vec!["dog run", "fox", "run"]);
    assert_eq!(engine.num_queries(), 3);
    assert!(engine.has_query("foxes"));
    assert_eq!(engine.num_results("fox"), 1);

    let results = engine.view_results("run   DOG");
    let locations: Vec<&str> = results.iter().map(|r| r.location()).collect();
    // a.txt: 2/4, b.txt: 1/3
    assert_eq!(locations, vec!["a.txt", "b.txt"]);
    assert_eq!(results[0].matches(), 2);
    queue.join();
}

#[test]
fn partial_queries_match_prefixes() {
    let queue = Arc::new(WorkQueue::new(2).unwrap());
    let engine = QueryEngine::new(sample_index(), Arc::clone(&queue), true);
    engine.process_line("run").unwrap();
    queue.finish();

    let results = engine.view_results("run");
    let locations: Vec<&str> = results.iter().map(|r| r.location()).collect();
    // b.txt: run + runner = 2/3, a.txt: 1/4
    assert_eq!(locations, vec!["b.txt", "a.txt"]);
    assert_eq!(results[0].matches(), 2);
    queue.join();
}

#[test]
fn search_line_caches_by_normalized_query() {
    let index = sample_index();
    let queue = Arc::new(WorkQueue::new(1).unwrap());
    let engine = QueryEngine::new(Arc::clone(&index), Arc::clone(&queue), false);

    let first = engine.search_line("Cats");
    index.add_one("cat", "c.txt", 1);
    let second = engine.search_line("cat");

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert!(engine.search_line("").is_empty());
    queue.join();
}

#[test]
fn writes_results_as_json() {
    let queue = Arc::new(WorkQueue::new(1).unwrap());
    let engine = QueryEngine::new(sample_index(), Arc::clone(&queue), false);
    engine.process_line("cat").unwrap();
    engine.process_line("zebra").unwrap();
    queue.finish();

    let mut out = Vec::new();
    engine.write_results(&mut out).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let cat = &json["cat"][0];
    assert_eq!(cat["where"], "b.txt");
    assert_eq!(cat["count"], 1);
    assert!((cat["score"].as_f64().unwrap() - 1.0 / 3.0).abs() < 1e-8);
    assert_eq!(json["zebra"], serde_json::json!([]));
    queue.join();
}
