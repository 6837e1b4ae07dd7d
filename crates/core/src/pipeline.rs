//! The extract, embed, score pipeline behind a single question.

use crate::embed::Embedder;
use crate::error::{Error, Result};
use crate::score;
use crate::types::{Document, MatchResult};

/// Parses a slide-deck container into a [`Document`].
pub trait SlideExtractor {
    /// Extract the text blocks of every slide, in order.
    fn extract(&self, bytes: &[u8], filename: &str) -> Result<Document>;

    /// Like [`extract`](Self::extract), but a zero-byte upload is
    /// [`Error::EmptyDocument`] instead of a parse failure.
    fn extract_checked(&self, bytes: &[u8], filename: &str) -> Result<Document> {
        if bytes.is_empty() {
            return Err(Error::EmptyDocument);
        }
        self.extract(bytes, filename)
    }
}

/// Answers free-text questions against one deck at a time.
///
/// Holds a borrowed embedder so the model is loaded once and shared by
/// every engine built on top of it.
pub struct QaEngine<'m, X, E: ?Sized> {
    extractor: X,
    embedder: &'m E,
}

impl<'m, X, E> QaEngine<'m, X, E>
where
    X: SlideExtractor,
    E: Embedder + ?Sized,
{
    pub fn new(extractor: X, embedder: &'m E) -> Self {
        Self {
            extractor,
            embedder,
        }
    }

    /// Extract the deck without embedding anything.
    pub fn extract(&self, bytes: &[u8], filename: &str) -> Result<Document> {
        self.extractor.extract_checked(bytes, filename)
    }

    /// Return the slide whose text is closest to `question`.
    pub fn answer(&self, bytes: &[u8], question: &str) -> Result<MatchResult> {
        let mut matches = self.answer_top(bytes, question, 1)?;
        matches.pop().ok_or(Error::EmptyCandidateSet)
    }

    /// Return up to `k` slides ordered from best to worst match.
    ///
    /// The first entry is always the one [`answer`](Self::answer) returns.
    pub fn answer_top(&self, bytes: &[u8], question: &str, k: usize) -> Result<Vec<MatchResult>> {
        if question.trim().is_empty() {
            return Err(Error::EmptyQuestion);
        }
        let document = self.extract(bytes, "upload")?;
        self.score_document(&document, question, k)
    }

    /// Embed an already extracted document and rank it against `question`.
    pub fn score_document(&self, document: &Document, question: &str, k: usize) -> Result<Vec<MatchResult>> {
        if question.trim().is_empty() {
            return Err(Error::EmptyQuestion);
        }
        if document.is_empty() {
            log::warn!(
                "{}: {} slides, none with text",
                document.filename,
                document.slide_count
            );
            return Err(Error::EmptyContent);
        }

        let texts = document.texts();
        log::debug!(
            "Encoding {} slide blocks with {}",
            texts.len(),
            self.embedder.model_name()
        );
        let slide_vectors = self.embedder.encode(&texts)?;
        if slide_vectors.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "expected {} vectors, model returned {}",
                texts.len(),
                slide_vectors.len()
            )));
        }
        let question_vector = self.embedder.encode_one(question)?;

        let ranked = if k <= 1 {
            vec![score::best_match(&question_vector, &slide_vectors)?]
        } else {
            score::rank(&question_vector, &slide_vectors)?
        };

        let results: Vec<MatchResult> = ranked
            .into_iter()
            .take(k.max(1))
            .filter_map(|(idx, score)| {
                document.get(idx).map(|block| MatchResult {
                    best_index: idx,
                    slide_number: block.number,
                    score,
                    slide_text: texts[idx].clone(),
                })
            })
            .collect();

        if let Some(best) = results.first() {
            log::debug!(
                "Best match: block {} (slide {}) score {:.4}",
                best.best_index,
                best.slide_number,
                best.score
            );
        }

        Ok(results)
    }
}
