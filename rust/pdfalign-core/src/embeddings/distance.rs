//! Vector similarity for ranking embedding windows

/// L2 norm
pub fn magnitude(v: &[f32]) -> f32 {
    let mut sum = 0.0;
    let mut chunks = v.chunks_exact(4);

    for c in &mut chunks {
        sum += c[0] * c[0] + c[1] * c[1] + c[2] * c[2] + c[3] * c[3];
    }
    for x in chunks.remainder() {
        sum += x * x;
    }

    sum.sqrt()
}

/// Cosine similarity. Pass precomputed magnitudes when the same vector is
/// compared many times (the quote against every window).
///
/// Vectors of different length are compared over the shorter prefix. A zero
/// vector has similarity 0 with everything.
pub fn cosine_similarity(a: &[f32], b: &[f32], mag_a: Option<f32>, mag_b: Option<f32>) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();

    let ma = mag_a.unwrap_or_else(|| magnitude(a));
    let mb = mag_b.unwrap_or_else(|| magnitude(b));

    if ma == 0.0 || mb == 0.0 {
        return 0.0;
    }

    dot / (ma * mb)
}
