//! Terminal and JSON output.

use slideqa_core::{Document, MatchResult};
use std::fmt::Write;

/// Render matches for the terminal, best first.
pub fn render_matches(results: &[MatchResult]) -> String {
    let mut out = String::new();

    match results {
        [] => {}
        [only] => {
            let _ = writeln!(out, "Best matching answer found (slide {}):", only.slide_number);
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", only.slide_text);
            let _ = writeln!(out);
            let _ = writeln!(out, "Confidence Score: {}", only.confidence());
        }
        many => {
            for (rank, result) in many.iter().enumerate() {
                if rank > 0 {
                    out.push('\n');
                }
                let _ = writeln!(
                    out,
                    "#{} slide {} (Confidence Score: {})",
                    rank + 1,
                    result.slide_number,
                    result.confidence()
                );
                let _ = writeln!(out, "{}", result.slide_text);
            }
        }
    }

    out
}

/// Render matches as a pretty-printed JSON array.
pub fn render_json(results: &[MatchResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

/// Render the extracted blocks of a document, one per slide.
pub fn render_document(document: &Document) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} slides, {} with text",
        document.filename,
        document.slide_count,
        document.len()
    );

    for block in &document.blocks {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- slide {} ---", block.number);
        let _ = writeln!(out, "{}", block.text());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use slideqa_core::{DeckFormat, SlideBlock};

    fn result(index: usize, number: usize, score: f32, text: &str) -> MatchResult {
        MatchResult {
            best_index: index,
            slide_number: number,
            score,
            slide_text: text.to_string(),
        }
    }

    #[test]
    fn test_single_match() {
        let out = render_matches(&[result(0, 1, 0.7312, "Revenue Growth\nRevenue grew 20%")]);
        assert_eq!(
            out,
            "Best matching answer found (slide 1):\n\nRevenue Growth\nRevenue grew 20%\n\nConfidence Score: 0.73\n"
        );
    }

    #[test]
    fn test_low_score_still_rendered() {
        let out = render_matches(&[result(0, 2, -0.051, "Team\nTrust")]);
        assert!(out.contains("Confidence Score: -0.05"));
    }

    #[test]
    fn test_ranked_matches() {
        let out = render_matches(&[result(0, 1, 0.9, "A\na"), result(1, 3, 0.25, "C\nc")]);
        assert_eq!(
            out,
            "#1 slide 1 (Confidence Score: 0.90)\nA\na\n\n#2 slide 3 (Confidence Score: 0.25)\nC\nc\n"
        );
    }

    #[test]
    fn test_json_output() {
        let json = render_json(&[result(0, 1, 0.5, "A\na")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["best_index"], 0);
        assert_eq!(value[0]["slide_number"], 1);
        assert_eq!(value[0]["score"], 0.5);
        assert_eq!(value[0]["slide_text"], "A\na");
    }

    #[test]
    fn test_document_listing() {
        let mut doc = Document::new("deck.pptx", DeckFormat::Pptx);
        doc.add_block(SlideBlock::from_parts(2, "Agenda", "Plan").unwrap());
        doc.slide_count = 3;

        assert_eq!(
            render_document(&doc),
            "deck.pptx: 3 slides, 1 with text\n\n--- slide 2 ---\nAgenda\nPlan\n"
        );
    }
}
