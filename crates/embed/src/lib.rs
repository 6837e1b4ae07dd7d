//! Sentence-embedding provider for slide question answering.
//!
//! The model is loaded once with [`FastEmbedder::load`] and then shared by
//! reference; loading failures are fatal and surface as
//! `Error::ModelUnavailable`.

pub mod model;

#[cfg(feature = "fastembed")]
pub mod local;

#[cfg(feature = "fastembed")]
pub use local::FastEmbedder;
pub use model::{EmbedderConfig, ModelChoice, UnknownModel};
