//! Tests against the real pretrained model.
//!
//! These download model weights on first run, so they are ignored by default:
//! `cargo test -p slideqa-embed -- --ignored`

#![cfg(feature = "fastembed")]

use slideqa_core::{
    cosine_similarity, DeckFormat, Document, Embedder, QaEngine, Result, SlideBlock, SlideExtractor,
};
use slideqa_embed::{EmbedderConfig, FastEmbedder, ModelChoice};

struct FixedExtractor(Document);

impl SlideExtractor for FixedExtractor {
    fn extract(&self, _bytes: &[u8], _filename: &str) -> Result<Document> {
        Ok(self.0.clone())
    }
}

fn revenue_deck() -> Document {
    let mut doc = Document::new("deck.pptx", DeckFormat::Pptx);
    doc.add_block(
        SlideBlock::from_parts(1, "Revenue Growth", "Revenue grew 20% year over year.").unwrap(),
    );
    doc.add_block(
        SlideBlock::from_parts(2, "Team Culture", "We value collaboration and trust.").unwrap(),
    );
    doc.slide_count = 2;
    doc
}

#[test]
#[ignore = "downloads all-mpnet-base-v2"]
fn test_revenue_question_matches_revenue_slide() {
    let embedder = FastEmbedder::load(&EmbedderConfig::default()).unwrap();
    let engine = QaEngine::new(FixedExtractor(revenue_deck()), &embedder);

    let result = engine
        .answer(b"deck", "How much did revenue increase?")
        .unwrap();
    assert_eq!(result.best_index, 0);
    assert!(result.slide_text.contains("Revenue grew 20%"));

    let question = embedder.encode_one("How much did revenue increase?").unwrap();
    let other = embedder
        .encode_one("Team Culture\nWe value collaboration and trust.")
        .unwrap();
    let other_score = cosine_similarity(&question, &other).unwrap();
    assert!(result.score > other_score);
}

#[test]
#[ignore = "downloads all-mpnet-base-v2"]
fn test_encoding_is_deterministic_and_sized() {
    let embedder = FastEmbedder::load(&EmbedderConfig::new(ModelChoice::AllMpnetBaseV2)).unwrap();
    let texts = vec!["Quarterly results".to_string(), "Hiring plan".to_string()];

    let first = embedder.encode(&texts).unwrap();
    let second = embedder.encode(&texts).unwrap();
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|v| v.len() == embedder.dimension()));
    assert_eq!(first, second);

    assert!(embedder.encode(&[]).unwrap().is_empty());
}
