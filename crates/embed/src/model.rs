//! Supported embedding models and loader configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// A pretrained sentence-embedding model the provider can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelChoice {
    /// sentence-transformers/all-mpnet-base-v2
    #[default]
    AllMpnetBaseV2,
    /// sentence-transformers/all-MiniLM-L6-v2
    AllMiniLmL6V2,
    /// BAAI/bge-small-en-v1.5
    BgeSmallEnV15,
    /// BAAI/bge-base-en-v1.5
    BgeBaseEnV15,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 4] = [
        ModelChoice::AllMpnetBaseV2,
        ModelChoice::AllMiniLmL6V2,
        ModelChoice::BgeSmallEnV15,
        ModelChoice::BgeBaseEnV15,
    ];

    /// Short model name, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            ModelChoice::AllMpnetBaseV2 => "all-mpnet-base-v2",
            ModelChoice::AllMiniLmL6V2 => "all-MiniLM-L6-v2",
            ModelChoice::BgeSmallEnV15 => "bge-small-en-v1.5",
            ModelChoice::BgeBaseEnV15 => "bge-base-en-v1.5",
        }
    }

    /// Length of the vectors this model produces.
    pub fn dimension(&self) -> usize {
        match self {
            ModelChoice::AllMpnetBaseV2 | ModelChoice::BgeBaseEnV15 => 768,
            ModelChoice::AllMiniLmL6V2 | ModelChoice::BgeSmallEnV15 => 384,
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A model name that is not in [`ModelChoice::ALL`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown embedding model '{0}' (expected one of: all-mpnet-base-v2, all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5)")]
pub struct UnknownModel(pub String);

impl FromStr for ModelChoice {
    type Err = UnknownModel;

    /// Accepts the short name or the hub id, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        let short = wanted.rsplit('/').next().unwrap_or(wanted);
        ModelChoice::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(short))
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

/// How to load the embedding model.
#[derive(Debug, Clone, Default)]
pub struct EmbedderConfig {
    /// Which pretrained model to load.
    pub model: ModelChoice,

    /// Where downloaded weights are cached. `None` uses the library default.
    pub cache_dir: Option<PathBuf>,

    /// Show a progress bar while weights download.
    pub show_download_progress: bool,
}

impl EmbedderConfig {
    pub fn new(model: ModelChoice) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with_download_progress(mut self, show: bool) -> Self {
        self.show_download_progress = show;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_mpnet() {
        let config = EmbedderConfig::default();
        assert_eq!(config.model, ModelChoice::AllMpnetBaseV2);
        assert_eq!(config.model.dimension(), 768);
        assert!(config.cache_dir.is_none());
    }

    #[test]
    fn test_parse_model_names() {
        assert_eq!("all-mpnet-base-v2".parse::<ModelChoice>(), Ok(ModelChoice::AllMpnetBaseV2));
        assert_eq!(
            "sentence-transformers/all-MiniLM-L6-v2".parse::<ModelChoice>(),
            Ok(ModelChoice::AllMiniLmL6V2)
        );
        assert_eq!("BAAI/BGE-small-en-v1.5".parse::<ModelChoice>(), Ok(ModelChoice::BgeSmallEnV15));
        assert_eq!(" bge-base-en-v1.5 ".parse::<ModelChoice>(), Ok(ModelChoice::BgeBaseEnV15));
        assert_eq!(
            "gpt-4".parse::<ModelChoice>(),
            Err(UnknownModel("gpt-4".to_string()))
        );
    }

    #[test]
    fn test_names_round_trip() {
        for model in ModelChoice::ALL {
            assert_eq!(model.to_string().parse::<ModelChoice>(), Ok(model));
        }
    }

    #[test]
    fn test_builder() {
        let config = EmbedderConfig::new(ModelChoice::BgeSmallEnV15)
            .with_cache_dir("/tmp/models")
            .with_download_progress(true);
        assert_eq!(config.model.dimension(), 384);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/models")));
        assert!(config.show_download_progress);
    }
}
