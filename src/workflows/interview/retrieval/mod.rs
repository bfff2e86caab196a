mod cache;
mod embedding;

pub use embedding::{Embedder, EmbeddingError, HashEmbedder};

use cache::{CacheFingerprint, VectorCache};
use embedding::cosine_similarity;
use serde::Deserialize;
use std::cmp::Ordering;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Immutable corpus row: a role tag and one interview question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalEntry {
    pub role: String,
    pub question: String,
}

#[derive(Debug, thiserror::Error)]
pub enum QuestionBankError {
    #[error("question bank not found at {0}")]
    MissingCorpus(PathBuf),
    #[error("question bank at {0} has no usable rows")]
    EmptyCorpus(PathBuf),
    #[error("unable to read question bank: {0}")]
    Csv(#[from] csv::Error),
    #[error("unable to persist question cache: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

/// Similarity index over the question corpus.
///
/// The corpus and its embedding cache are invalidated as a unit: on open the
/// fingerprint (corpus content, row count, model id, dimensionality) is
/// compared against the persisted metadata, and the vectors are rebuilt and
/// re-persisted only on mismatch.
pub struct QuestionBank {
    entries: Vec<RetrievalEntry>,
    vectors: Vec<Vec<f32>>,
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for QuestionBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionBank")
            .field("entries", &self.entries)
            .field("vectors", &self.vectors)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct CorpusRow {
    role: String,
    question: String,
}

impl QuestionBank {
    /// Open the corpus at `csv_path`, reusing the embedding cache under
    /// `cache_dir` when its fingerprint still matches.
    pub fn open(
        csv_path: &Path,
        cache_dir: &Path,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, QuestionBankError> {
        if !csv_path.exists() {
            return Err(QuestionBankError::MissingCorpus(csv_path.to_path_buf()));
        }
        let file = std::fs::File::open(csv_path)?;
        let entries = parse_corpus(file)?;
        if entries.is_empty() {
            return Err(QuestionBankError::EmptyCorpus(csv_path.to_path_buf()));
        }
        Self::from_entries(entries, cache_dir, embedder)
    }

    /// Build a bank from in-memory entries; used by `open` and by tests that
    /// do not want a CSV on disk.
    pub fn from_entries(
        entries: Vec<RetrievalEntry>,
        cache_dir: &Path,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, QuestionBankError> {
        let corpus: Vec<String> = entries
            .iter()
            .map(|entry| format!("{} :: {}", entry.role, entry.question))
            .collect();

        let fingerprint =
            CacheFingerprint::compute(&corpus, embedder.model_id(), embedder.dimension());
        let store = VectorCache::new(cache_dir);

        let vectors = match store.load_if_valid(&fingerprint) {
            Some(vectors) => {
                info!(rows = vectors.len(), "question cache hit");
                vectors
            }
            None => {
                let vectors = embedder.embed(&corpus)?;
                store.store(&fingerprint, &vectors)?;
                info!(rows = vectors.len(), "question cache rebuilt");
                vectors
            }
        };

        Ok(Self {
            entries,
            vectors,
            embedder,
        })
    }

    /// Top-`k` question texts by cosine similarity to `query`, ties broken by
    /// corpus order.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<String>, QuestionBankError> {
        if self.vectors.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = &self.embedder.embed(&[query.to_string()])?[0];
        let mut ranked: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(idx, vec)| (idx, cosine_similarity(vec, query_vec)))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        Ok(ranked
            .into_iter()
            .take(top_k)
            .map(|(idx, _)| self.entries[idx].question.clone())
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_corpus<R: Read>(reader: R) -> Result<Vec<RetrievalEntry>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut entries = Vec::new();

    for row in csv_reader.deserialize::<CorpusRow>() {
        let row = row?;
        if row.role.is_empty() || row.question.is_empty() {
            continue;
        }
        entries.push(RetrievalEntry {
            role: row.role,
            question: row.question,
        });
    }

    Ok(entries)
}
