//! fastembed-backed embedding provider.

use crate::model::{EmbedderConfig, ModelChoice};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use slideqa_core::{Embedder, Embedding, Error, Result};
use std::sync::Mutex;

impl ModelChoice {
    fn to_fastembed(self) -> EmbeddingModel {
        match self {
            ModelChoice::AllMpnetBaseV2 => EmbeddingModel::AllMpnetBaseV2,
            ModelChoice::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
            ModelChoice::BgeSmallEnV15 => EmbeddingModel::BGESmallENV15,
            ModelChoice::BgeBaseEnV15 => EmbeddingModel::BGEBaseENV15,
        }
    }
}

/// A sentence-embedding model running locally on the ONNX runtime.
///
/// Inference goes through a mutex, so one instance can be shared between
/// threads even though the session itself needs exclusive access.
pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
    choice: ModelChoice,
}

impl FastEmbedder {
    /// Load the configured model, downloading weights if they are not cached.
    pub fn load(config: &EmbedderConfig) -> Result<Self> {
        log::info!("Loading embedding model {}", config.model);

        let mut options = InitOptions::new(config.model.to_fastembed())
            .with_show_download_progress(config.show_download_progress);
        if let Some(dir) = &config.cache_dir {
            options = options.with_cache_dir(dir.clone());
        }

        let model = TextEmbedding::try_new(options)
            .map_err(|e| Error::ModelUnavailable(format!("{}: {}", config.model, e)))?;

        Ok(Self {
            model: Mutex::new(model),
            choice: config.model,
        })
    }
}

impl Embedder for FastEmbedder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut model = self
            .model
            .lock()
            .map_err(|_| Error::Embedding("model lock poisoned".to_string()))?;
        let vectors = model
            .embed(texts.to_vec(), None)
            .map_err(|e| Error::Embedding(e.to_string()))?;

        if let Some(v) = vectors.iter().find(|v| v.len() != self.choice.dimension()) {
            return Err(Error::DimensionMismatch {
                expected: self.choice.dimension(),
                actual: v.len(),
            });
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.choice.dimension()
    }

    fn model_name(&self) -> &str {
        self.choice.name()
    }
}
