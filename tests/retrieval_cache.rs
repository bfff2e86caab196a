//! Coverage for the question-bank cache lifecycle: a matching
//! fingerprint reuses the persisted vectors, and any change to corpus
//! content, row count, or model identifier forces a rebuild.

use recruit_ai::workflows::interview::{Embedder, HashEmbedder, QuestionBank};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts embed calls so tests can tell a cache hit from a rebuild.
struct CountingEmbedder {
    inner: HashEmbedder,
    model: String,
    calls: Arc<AtomicUsize>,
}

impl CountingEmbedder {
    fn new(model: &str, calls: Arc<AtomicUsize>) -> Self {
        Self {
            inner: HashEmbedder::new(32),
            model: model.to_string(),
            calls,
        }
    }
}

impl Embedder for CountingEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn embed(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, recruit_ai::workflows::interview::retrieval::EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(texts)
    }
}

fn write_bank(path: &Path, extra_row: bool) {
    let mut body = String::from("role,question\n");
    body.push_str("Backend,How do you design idempotent APIs?\n");
    body.push_str("Backend,Walk me through a production incident you led.\n");
    body.push_str("Data,Explain window functions in SQL.\n");
    if extra_row {
        body.push_str("Data,How would you backfill a year of data?\n");
    }
    fs::write(path, body).expect("bank written");
}

#[test]
fn identical_corpus_and_model_reuses_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bank_path = dir.path().join("bank.csv");
    let cache_dir = dir.path().join("cache");
    write_bank(&bank_path, false);

    let calls = Arc::new(AtomicUsize::new(0));

    let first = QuestionBank::open(
        &bank_path,
        &cache_dir,
        Arc::new(CountingEmbedder::new("model-a", calls.clone())),
    )
    .expect("first open");
    assert_eq!(first.len(), 3);
    let builds_after_first = calls.load(Ordering::SeqCst);
    assert_eq!(builds_after_first, 1);

    let second = QuestionBank::open(
        &bank_path,
        &cache_dir,
        Arc::new(CountingEmbedder::new("model-a", calls.clone())),
    )
    .expect("second open");
    assert_eq!(second.len(), 3);
    // cache hit: the corpus was not re-embedded
    assert_eq!(calls.load(Ordering::SeqCst), builds_after_first);
}

#[test]
fn corpus_change_rebuilds_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bank_path = dir.path().join("bank.csv");
    let cache_dir = dir.path().join("cache");
    write_bank(&bank_path, false);

    let calls = Arc::new(AtomicUsize::new(0));
    QuestionBank::open(
        &bank_path,
        &cache_dir,
        Arc::new(CountingEmbedder::new("model-a", calls.clone())),
    )
    .expect("first open");

    write_bank(&bank_path, true);
    let reopened = QuestionBank::open(
        &bank_path,
        &cache_dir,
        Arc::new(CountingEmbedder::new("model-a", calls.clone())),
    )
    .expect("reopen after edit");
    assert_eq!(reopened.len(), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn model_change_rebuilds_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bank_path = dir.path().join("bank.csv");
    let cache_dir = dir.path().join("cache");
    write_bank(&bank_path, false);

    let calls = Arc::new(AtomicUsize::new(0));
    QuestionBank::open(
        &bank_path,
        &cache_dir,
        Arc::new(CountingEmbedder::new("model-a", calls.clone())),
    )
    .expect("first open");

    QuestionBank::open(
        &bank_path,
        &cache_dir,
        Arc::new(CountingEmbedder::new("model-b", calls.clone())),
    )
    .expect("reopen under new model");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn missing_corpus_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = QuestionBank::open(
        &dir.path().join("absent.csv"),
        dir.path(),
        Arc::new(HashEmbedder::new(32)),
    )
    .expect_err("missing corpus rejected");
    assert!(err.to_string().contains("not found"));
}

#[test]
fn search_serves_results_from_reloaded_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bank_path = dir.path().join("bank.csv");
    let cache_dir = dir.path().join("cache");
    write_bank(&bank_path, false);

    let embedder = Arc::new(HashEmbedder::new(32));
    let first = QuestionBank::open(&bank_path, &cache_dir, embedder.clone()).expect("first");
    let fresh_hits = first.search("Backend :: APIs", 2).expect("search");

    let second = QuestionBank::open(&bank_path, &cache_dir, embedder).expect("cached");
    let cached_hits = second.search("Backend :: APIs", 2).expect("search");
    assert_eq!(fresh_hits, cached_hits);
}
