//! Cosine similarity scoring of a query against candidate embeddings.

use crate::error::{Error, Result};

/// Cosine similarity between two vectors of equal length.
///
/// Returns `None` when either vector has zero magnitude, since the angle is
/// undefined. The result is clamped to [-1, 1] to absorb rounding drift.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}

/// Pick the candidate closest to `query`.
///
/// Ties go to the lowest index. Zero-magnitude candidates rank below every
/// defined score; if nothing has a defined score the first candidate wins
/// with a score of -1.0.
pub fn best_match(query: &[f32], candidates: &[Vec<f32>]) -> Result<(usize, f32)> {
    let scores = scores(query, candidates)?;

    let mut best: Option<(usize, f32)> = None;
    for (idx, score) in scores.iter().enumerate() {
        if let Some(score) = *score {
            match best {
                Some((_, current)) if score <= current => {}
                _ => best = Some((idx, score)),
            }
        }
    }

    Ok(best.unwrap_or((0, -1.0)))
}

/// Every candidate ordered by descending score, lowest index first on ties.
pub fn rank(query: &[f32], candidates: &[Vec<f32>]) -> Result<Vec<(usize, f32)>> {
    let scores = scores(query, candidates)?;

    let mut ranked: Vec<(usize, Option<f32>)> = scores.into_iter().enumerate().collect();
    // sort_by is stable, so equal scores keep index order
    ranked.sort_by(|a, b| match (a.1, b.1) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    Ok(ranked
        .into_iter()
        .map(|(idx, score)| (idx, score.unwrap_or(-1.0)))
        .collect())
}

fn scores(query: &[f32], candidates: &[Vec<f32>]) -> Result<Vec<Option<f32>>> {
    if candidates.is_empty() {
        return Err(Error::EmptyCandidateSet);
    }

    candidates
        .iter()
        .map(|candidate| {
            if candidate.len() != query.len() {
                return Err(Error::DimensionMismatch {
                    expected: query.len(),
                    actual: candidate.len(),
                });
            }
            Ok(cosine_similarity(query, candidate))
        })
        .collect()
}
