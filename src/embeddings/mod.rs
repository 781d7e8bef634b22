pub mod ollama;

pub use ollama::OllamaClient;

use crate::{IndexError, Result};

/// Maps chunk texts to fixed-dimension dense vectors.
///
/// Implementations must return one vector per input text, in input order,
/// with a dimension that is constant for the lifetime of the provider; every
/// chunk in a collection has to come from the same model to stay comparable.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, preserving order and length.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Verify the provider is usable before any record is processed.
    /// A failure here is fatal to the whole run.
    fn health_check(&self) -> Result<()>;
}

/// Deterministic embedding provider for tests and offline runs.
///
/// Vectors are derived purely from the text content, so identical inputs
/// always embed identically across runs.
#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    dimension: usize,
    /// Texts containing this marker fail to embed, for failure-path tests
    poison_marker: Option<String>,
    /// Drop the last vector of every non-empty batch, violating the
    /// same-length contract, for mismatch-guard tests
    truncate_batches: bool,
}

impl MockEmbeddingProvider {
    #[inline]
    pub fn new() -> Self {
        Self {
            dimension: 16,
            poison_marker: None,
            truncate_batches: false,
        }
    }

    #[inline]
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    #[inline]
    pub fn with_poison_marker(mut self, marker: impl Into<String>) -> Self {
        self.poison_marker = Some(marker.into());
        self
    }

    #[inline]
    pub fn with_truncated_batches(mut self) -> Self {
        self.truncate_batches = true;
        self
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        // FNV-style seed, then a small LCG per dimension
        let mut state = text
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |acc, byte| {
                (acc ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
            });

        let mut vector = Vec::with_capacity(self.dimension);
        for _ in 0..self.dimension {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let unit = (state >> 11) as f32 / (1u64 << 53) as f32;
            vector.push(unit.mul_add(2.0, -1.0));
        }
        vector
    }
}

impl Default for MockEmbeddingProvider {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingProvider for MockEmbeddingProvider {
    #[inline]
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = texts
            .iter()
            .map(|text| {
                if let Some(marker) = &self.poison_marker {
                    if text.contains(marker.as_str()) {
                        return Err(IndexError::Embedding(format!(
                            "mock provider refused text containing {:?}",
                            marker
                        )));
                    }
                }
                Ok(self.embed_one(text))
            })
            .collect::<Result<Vec<Vec<f32>>>>()?;

        if self.truncate_batches {
            vectors.pop();
        }

        Ok(vectors)
    }

    #[inline]
    fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
