//! Domain types for representing extracted slide text and match results.

use serde::{Deserialize, Serialize};

/// A fixed-length embedding vector produced by a sentence-embedding model.
pub type Embedding = Vec<f32>;

/// An ordered set of text blocks extracted from one slide deck.
///
/// Indices into `blocks` are dense: slides without any text are skipped and
/// do not leave gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Original filename (without path).
    pub filename: String,

    /// Detected format of the source file.
    pub format: DeckFormat,

    /// Text blocks in slide order.
    pub blocks: Vec<SlideBlock>,

    /// Number of slides in the source, including those that produced no block.
    pub slide_count: usize,
}

impl Document {
    /// Create an empty document with the given filename and format.
    pub fn new(filename: impl Into<String>, format: DeckFormat) -> Self {
        Self {
            filename: filename.into(),
            format,
            blocks: Vec::new(),
            slide_count: 0,
        }
    }

    /// Add a block to the document.
    pub fn add_block(&mut self, block: SlideBlock) {
        self.blocks.push(block);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SlideBlock> {
        self.blocks.get(index)
    }

    /// The embeddable text of every block, in order.
    pub fn texts(&self) -> Vec<String> {
        self.blocks.iter().map(SlideBlock::text).collect()
    }
}

/// The format of the source slide deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary).
    Ppt,
}

impl DeckFormat {
    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]) {
            return Some(Self::Ppt);
        }

        None
    }
}

/// The text of one slide: its title plus everything else on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideBlock {
    /// 1-based position of the source slide in the deck.
    pub number: usize,

    /// Title placeholder text, empty if the slide has none.
    pub title: String,

    /// Newline-joined text of the other text-bearing shapes.
    pub body: String,
}

impl SlideBlock {
    /// Build a block, or `None` if both title and body are blank.
    pub fn from_parts(number: usize, title: impl Into<String>, body: impl Into<String>) -> Option<Self> {
        let title = title.into();
        let body = body.into();
        if title.trim().is_empty() && body.trim().is_empty() {
            return None;
        }
        Some(Self { number, title, body })
    }

    /// The text that gets embedded and displayed: trimmed title, newline, trimmed body.
    pub fn text(&self) -> String {
        format!("{}\n{}", self.title.trim(), self.body.trim())
    }
}

/// The slide that best answers a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Index into `Document::blocks`.
    pub best_index: usize,

    /// 1-based number of the matching slide in the source deck.
    pub slide_number: usize,

    /// Cosine similarity between question and slide, in [-1, 1].
    pub score: f32,

    /// `SlideBlock::text` of the matching block.
    pub slide_text: String,
}

impl MatchResult {
    /// The score formatted to two decimal places.
    pub fn confidence(&self) -> String {
        format!("{:.2}", self.score)
    }
}
