//! Core domain types, similarity scoring and the question-answering
//! pipeline for slide decks.

pub mod embed;
pub mod error;
pub mod pipeline;
pub mod score;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub use embed::KeywordEmbedder;
pub use embed::Embedder;
pub use error::{Error, ParseError, Result};
pub use pipeline::{QaEngine, SlideExtractor};
pub use score::{best_match, cosine_similarity, rank};
pub use types::{DeckFormat, Document, Embedding, MatchResult, SlideBlock};
