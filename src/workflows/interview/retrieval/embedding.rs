use sha2::{Digest, Sha256};

/// Error surfaced by an embedding backend. Remote implementations map
/// transport failures and timeouts onto `Backend`.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding backend failed: {0}")]
    Backend(String),
    #[error("embedding returned {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Capability producing fixed-dimension embedding vectors for text.
///
/// The question bank depends on this but does not own it, so tests and
/// offline runs can inject a deterministic implementation.
pub trait Embedder: Send + Sync {
    /// Identifier baked into the cache fingerprint; changing it invalidates
    /// every cached vector.
    fn model_id(&self) -> &str;

    fn dimension(&self) -> usize;

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Offline embedder deriving each vector deterministically from the sha256
/// digest of the text. No semantic power, but stable across processes, which
/// is what the cache fingerprint and the tests need.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub const MODEL_ID: &'static str = "offline-hash-256";

    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(8),
        }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for HashEmbedder {
    fn model_id(&self) -> &str {
        Self::MODEL_ID
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts
            .iter()
            .map(|text| {
                let digest = Sha256::digest(text.as_bytes());
                let mut seed = u64::from_be_bytes(
                    digest[..8].try_into().expect("digest has at least 8 bytes"),
                );

                let mut vector: Vec<f32> = (0..self.dimension)
                    .map(|_| {
                        let bits = splitmix64(&mut seed);
                        // map the top 53 bits onto [-1, 1)
                        ((bits >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0) as f32
                    })
                    .collect();

                let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt() + 1e-9;
                for v in &mut vector {
                    *v /= norm;
                }
                vector
            })
            .collect())
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Cosine similarity between two vectors; zero-norm inputs score 0.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
