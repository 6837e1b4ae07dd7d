//! The embedding provider abstraction.

use crate::error::Result;
use crate::types::Embedding;

/// Converts text into fixed-dimension vectors.
///
/// Implementations load their model once and are read-only afterwards, so a
/// single instance can be shared by reference across requests. Encoding must
/// be deterministic for a given model and input.
pub trait Embedder: Send + Sync {
    /// Encode several texts, returning one vector per text in input order.
    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Encode a single text.
    fn encode_one(&self, text: &str) -> Result<Embedding> {
        let mut vectors = self.encode(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| crate::Error::Embedding("model returned no vector".to_string()))
    }

    /// Length of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Identifier of the underlying model.
    fn model_name(&self) -> &str;
}

#[cfg(any(test, feature = "test-utils"))]
pub use keyword::KeywordEmbedder;

#[cfg(any(test, feature = "test-utils"))]
mod keyword {
    use super::Embedder;
    use crate::error::Result;
    use crate::types::Embedding;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    /// Bag-of-words embedder for tests.
    ///
    /// Each lowercase token is hashed (FNV-1a) into one of `dimension` slots,
    /// so texts sharing words score higher than texts that don't. A text
    /// always maps to the same vector, whatever was encoded before it.
    #[derive(Debug)]
    pub struct KeywordEmbedder {
        dimension: usize,
        calls: AtomicUsize,
    }

    impl KeywordEmbedder {
        pub fn new(dimension: usize) -> Self {
            Self {
                dimension: dimension.max(1),
                calls: AtomicUsize::new(0),
            }
        }

        /// Number of `encode` calls made so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn slot(&self, token: &str) -> usize {
            let hash = token
                .to_lowercase()
                .bytes()
                .fold(FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME));
            (hash % self.dimension as u64) as usize
        }

        fn vectorize(&self, text: &str) -> Embedding {
            let mut vector = vec![0.0; self.dimension];
            for token in text
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
            {
                vector[self.slot(token)] += 1.0;
            }
            vector
        }
    }

    impl Default for KeywordEmbedder {
        fn default() -> Self {
            Self::new(256)
        }
    }

    impl Embedder for KeywordEmbedder {
        fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|text| self.vectorize(text)).collect())
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn model_name(&self) -> &str {
            "keyword-test"
        }
    }
}
