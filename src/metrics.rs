use crate::tfidf::FeatureVector;

const EPSILON: f64 = 1e-12;

/// Cosine similarity of two non-negative sparse vectors, in `[0, 1]`.
/// Zero when either vector has zero norm.
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let na = a.norm();
    let nb = b.norm();
    if na < EPSILON || nb < EPSILON {
        return 0.0;
    }
    let cos = a.dot(b) / (na * nb);
    if cos.is_finite() {
        cos.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
