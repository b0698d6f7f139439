//! Direction-only distance between pose vectors.

/// Cosine similarity of two equal-length vectors.
///
/// Degenerate input (length mismatch, empty, zero magnitude, non-finite
/// result) yields 0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let cos = dot / (norm_a * norm_b).sqrt();
    if cos.is_finite() {
        // Rounding can push |cos| slightly past 1
        cos.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Chord distance on the unit hypersphere: `sqrt(2 * (1 - cos))`.
///
/// In `[0, 2]`; 0 means identical direction. Magnitude is ignored.
pub fn chord_distance(a: &[f64], b: &[f64]) -> f64 {
    (2.0 * (1.0 - cosine_similarity(a, b))).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    const SAMPLES: [&[f64]; 5] = [
        &[1.0, 0.0, 0.0, 1.0],
        &[0.3, -2.0, 5.5, 0.1],
        &[-1.0, -1.0, -1.0, -1.0],
        &[1e-3, 4.0, -7.0, 2.5],
        &[100.0, 0.5, 0.5, -30.0],
    ];

    #[test]
    fn test_identical_is_zero() {
        for a in SAMPLES {
            assert!(approx_eq(chord_distance(a, a), 0.0), "{a:?}");
        }
    }

    #[test]
    fn test_symmetric() {
        for a in SAMPLES {
            for b in SAMPLES {
                assert_eq!(chord_distance(a, b), chord_distance(b, a));
            }
        }
    }

    #[test]
    fn test_bounded() {
        for a in SAMPLES {
            for b in SAMPLES {
                let d = chord_distance(a, b);
                assert!((0.0..=2.0).contains(&d), "{d}");
            }
        }
    }

    #[test]
    fn test_opposite_is_two() {
        assert!(approx_eq(chord_distance(&[1.0, 2.0], &[-1.0, -2.0]), 2.0));
    }

    #[test]
    fn test_orthogonal() {
        assert!(approx_eq(chord_distance(&[1.0, 0.0], &[0.0, 1.0]), 2f64.sqrt()));
    }

    #[test]
    fn test_scale_invariant() {
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, 20.0, 30.0];
        assert!(approx_eq(chord_distance(&a, &b), 0.0));
    }

    #[test]
    fn test_zero_vector_treated_as_dissimilar() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!(approx_eq(chord_distance(&[0.0, 0.0], &[1.0, 0.0]), 2f64.sqrt()));
    }

    #[test]
    fn test_length_mismatch_is_zero_similarity() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
