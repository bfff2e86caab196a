use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Cache-validity key. Any field mismatch rejects the persisted vectors and
/// forces a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CacheFingerprint {
    pub model: String,
    pub corpus_sha256: String,
    pub rows: usize,
    pub dim: usize,
}

impl CacheFingerprint {
    pub(crate) fn compute(corpus: &[String], model: &str, dim: usize) -> Self {
        let mut hasher = Sha256::new();
        for (i, line) in corpus.iter().enumerate() {
            if i > 0 {
                hasher.update(b"\n");
            }
            hasher.update(line.as_bytes());
        }
        Self {
            model: model.to_string(),
            corpus_sha256: format!("{:x}", hasher.finalize()),
            rows: corpus.len(),
            dim,
        }
    }
}

/// What is actually persisted beside the vectors.
#[derive(Debug, Serialize, Deserialize)]
struct CacheMetadata {
    #[serde(flatten)]
    fingerprint: CacheFingerprint,
    built_at: DateTime<Utc>,
}

/// Persisted embedding store for the question corpus: a metadata record and a
/// serialized vector array, both under `dir`.
#[derive(Debug)]
pub(crate) struct VectorCache {
    dir: PathBuf,
}

impl VectorCache {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn meta_path(&self) -> PathBuf {
        self.dir.join("qbank_meta.json")
    }

    fn vectors_path(&self) -> PathBuf {
        self.dir.join("qbank_vectors.json")
    }

    /// Load cached vectors when the stored fingerprint matches `expected`.
    /// Unreadable or stale caches are treated as misses, never as errors.
    pub(crate) fn load_if_valid(&self, expected: &CacheFingerprint) -> Option<Vec<Vec<f32>>> {
        let meta_raw = fs::read_to_string(self.meta_path()).ok()?;
        let meta: CacheMetadata = match serde_json::from_str(&meta_raw) {
            Ok(meta) => meta,
            Err(err) => {
                warn!(%err, "discarding unreadable question cache metadata");
                return None;
            }
        };
        if meta.fingerprint != *expected {
            debug!("question cache fingerprint mismatch, rebuilding");
            return None;
        }

        let vec_raw = fs::read_to_string(self.vectors_path()).ok()?;
        let vectors: Vec<Vec<f32>> = serde_json::from_str(&vec_raw).ok()?;
        if vectors.len() != expected.rows {
            return None;
        }
        Some(vectors)
    }

    /// Persist vectors and metadata atomically: each file is written to a
    /// `.tmp` sibling and renamed into place, so a concurrent reader never
    /// sees a half-written index.
    pub(crate) fn store(
        &self,
        fingerprint: &CacheFingerprint,
        vectors: &[Vec<f32>],
    ) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let meta = CacheMetadata {
            fingerprint: fingerprint.clone(),
            built_at: Utc::now(),
        };
        write_atomic(
            &self.vectors_path(),
            &serde_json::to_vec(vectors).map_err(io::Error::other)?,
        )?;
        write_atomic(
            &self.meta_path(),
            &serde_json::to_vec_pretty(&meta).map_err(io::Error::other)?,
        )?;
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}
