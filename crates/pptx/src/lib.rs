//! PPTX (Office Open XML) slide text extractor.
//!
//! Parses .pptx files, which are ZIP archives containing XML documents, into
//! one title/body block per slide.

pub mod parser;

pub use parser::PptxParser;
