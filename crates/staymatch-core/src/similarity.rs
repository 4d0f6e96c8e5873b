//! Similarity scoring between feature vectors.
//!
//! Listings are compared to a user's preference vector with the absolute
//! cosine similarity, so every defined score lies in `[0.0, 1.0]`.

use thiserror::Error;

use crate::models::{Listing, ListingId};

/// Errors raised while comparing vectors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimilarityError {
    #[error("vectors must have the same length (got {left} and {right})")]
    LengthMismatch { left: usize, right: usize },
}

/// Compute `|u · v| / (‖u‖ · ‖v‖)`.
///
/// Returns:
/// - `1.0` for parallel or anti-parallel vectors
/// - `0.0` for orthogonal vectors
/// - `NaN` when either vector has zero norm
///
/// Fails with [`SimilarityError::LengthMismatch`] when the lengths differ;
/// vectors are never truncated.
///
/// # Example
///
/// ```rust
/// use staymatch_core::similarity::cosine_similarity;
///
/// let sim = cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]).unwrap();
/// assert!((sim - 1.0).abs() < 1e-12);
/// assert!(cosine_similarity(&[1.0], &[1.0, 2.0]).is_err());
/// ```
pub fn cosine_similarity(u: &[f64], v: &[f64]) -> Result<f64, SimilarityError> {
    if u.len() != v.len() {
        return Err(SimilarityError::LengthMismatch {
            left: u.len(),
            right: v.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_u = 0.0f64;
    let mut norm_v = 0.0f64;

    for (x, y) in u.iter().zip(v.iter()) {
        dot += x * y;
        norm_u += x * x;
        norm_v += y * y;
    }

    let score = (dot / (norm_u.sqrt() * norm_v.sqrt())).abs();
    // Rounding can push parallel vectors just past 1.0.
    if score.is_nan() {
        Ok(score)
    } else {
        Ok(score.min(1.0))
    }
}

/// Score candidates against a preference vector and keep the best `n`.
///
/// Undefined scores (zero-norm feature rows) are discarded. The sort is
/// stable, so equal scores keep candidate order.
pub fn rank<'a, I>(
    candidates: I,
    preference: &[f64],
    n: usize,
) -> Result<Vec<(ListingId, f64)>, SimilarityError>
where
    I: IntoIterator<Item = &'a Listing>,
{
    let mut scored = Vec::new();
    for listing in candidates {
        let score = cosine_similarity(preference, listing.feature_vector())?;
        if !score.is_nan() {
            scored.push((listing.id, score));
        }
    }

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(n);
    Ok(scored)
}
