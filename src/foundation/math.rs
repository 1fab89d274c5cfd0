/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Normalize `value` into `[0, 1]` relative to `[a, b]`, clamped.
///
/// A degenerate range (`a == b`) maps everything to `0`.
pub fn norm_clamped(value: f64, a: f64, b: f64) -> f64 {
    let span = b - a;
    if span == 0.0 || !span.is_finite() {
        return 0.0;
    }
    ((value - a) / span).clamp(0.0, 1.0)
}

/// Smallest and largest of `values`; `(inf, -inf)` when there are none.
pub fn bounds(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

/// Round half away from zero to the nearest non-negative integer.
pub fn round_ms(v: f64) -> u64 {
    if !v.is_finite() || v <= 0.0 {
        return 0;
    }
    v.round() as u64
}

/// Median of `values`, averaging the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Population standard deviation; `0` for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    var.sqrt()
}

pub fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

/// Deterministic SplitMix64 generator.
#[derive(Clone, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    /// Seed a new generator.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Derive an independent stream, e.g. one per k-means restart.
    pub fn fork(seed: u64, stream: u64) -> Self {
        Self::new(seed ^ stream.wrapping_mul(0xD6E8_FEB8_6659_FD93))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform `f64` in `[0, 1)`.
    pub fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform index in `[0, n)`; `n` must be > 0.
    pub fn next_index(&mut self, n: usize) -> usize {
        ((self.next_f64_01() * n as f64) as usize).min(n.saturating_sub(1))
    }

    /// Pick an index with probability proportional to its weight, given prefix sums from
    /// [`cumulative_weights`].
    ///
    /// Falls back to a uniform pick when every weight is zero.
    pub fn weighted_index(&mut self, cumulative: &[f64]) -> usize {
        let Some(&total) = cumulative.last() else {
            return 0;
        };
        if total <= 0.0 {
            return self.next_index(cumulative.len());
        }
        let target = self.next_f64_01() * total;
        cumulative
            .partition_point(|&c| c <= target)
            .min(cumulative.len() - 1)
    }
}

/// Prefix sums of `weights`, negative weights treated as zero.
pub fn cumulative_weights(weights: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    weights
        .iter()
        .map(|w| {
            acc += w.max(0.0);
            acc
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
