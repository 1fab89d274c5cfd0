use rayon::prelude::*;

use crate::foundation::error::{ClipgridError, ClipgridResult};
use crate::foundation::math::{Rng64, cumulative_weights};

/// k-means parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KMeansConfig {
    pub k: usize,
    /// Independent k-means++ initializations; the lowest-inertia run wins.
    pub restarts: usize,
    pub max_iter: usize,
    pub seed: u64,
}

/// Outcome of the best k-means run.
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansResult {
    pub labels: Vec<usize>,
    pub centers: Vec<[f64; 2]>,
    pub inertia: f64,
    pub iterations: usize,
    pub restart: usize,
}

impl KMeansResult {
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.centers.len()];
        for &l in &self.labels {
            sizes[l] += 1;
        }
        sizes
    }
}

/// Partition `points` into `cfg.k` clusters.
///
/// Restarts run in parallel and all of them finish before the lowest-inertia run is picked;
/// ties go to the lowest restart index. `k` must be in `1..=points.len()`.
#[tracing::instrument(skip(points, cfg), fields(n = points.len(), k = cfg.k, restarts = cfg.restarts))]
pub fn kmeans(points: &[[f64; 2]], cfg: &KMeansConfig) -> ClipgridResult<KMeansResult> {
    if cfg.k == 0 {
        return Err(ClipgridError::clustering("cluster count must be >= 1"));
    }
    if cfg.k > points.len() {
        return Err(ClipgridError::clustering(format!(
            "cannot form {} clusters from {} samples",
            cfg.k,
            points.len()
        )));
    }
    if cfg.restarts == 0 || cfg.max_iter == 0 {
        return Err(ClipgridError::clustering(
            "k-means needs at least one restart and one iteration",
        ));
    }
    if points.iter().flatten().any(|v| !v.is_finite()) {
        return Err(ClipgridError::clustering("embedding coordinates must be finite"));
    }

    let runs = (0..cfg.restarts)
        .into_par_iter()
        .map(|r| {
            let mut rng = Rng64::fork(cfg.seed, r as u64);
            lloyd(points, cfg.k, cfg.max_iter, &mut rng).map(|mut out| {
                out.restart = r;
                out
            })
        })
        .collect::<Vec<_>>();

    let mut best: Option<KMeansResult> = None;
    for run in runs {
        let run = run?;
        tracing::debug!(restart = run.restart, inertia = run.inertia, iterations = run.iterations);
        if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }
    best.ok_or_else(|| ClipgridError::clustering("k-means produced no result"))
}

fn sq_dist(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

fn nearest(p: [f64; 2], centers: &[[f64; 2]]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, &c) in centers.iter().enumerate() {
        let d = sq_dist(p, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn init_plus_plus(points: &[[f64; 2]], k: usize, rng: &mut Rng64) -> Vec<[f64; 2]> {
    let mut centers = Vec::with_capacity(k);
    centers.push(points[rng.next_index(points.len())]);
    while centers.len() < k {
        let d2: Vec<f64> = points.iter().map(|&p| nearest(p, &centers).1).collect();
        let idx = rng.weighted_index(&cumulative_weights(&d2));
        centers.push(points[idx]);
    }
    centers
}

/// Give every empty cluster the point farthest from its current center, taken from a cluster
/// that can spare one.
fn relocate_empty(points: &[[f64; 2]], centers: &[[f64; 2]], labels: &mut [usize]) {
    let k = centers.len();
    let mut sizes = vec![0usize; k];
    for &l in labels.iter() {
        sizes[l] += 1;
    }
    for c in 0..k {
        if sizes[c] > 0 {
            continue;
        }
        let far = (0..points.len())
            .filter(|&i| sizes[labels[i]] > 1)
            .map(|i| (i, sq_dist(points[i], centers[labels[i]])))
            .fold(None::<(usize, f64)>, |acc, cur| match acc {
                Some(a) if a.1 >= cur.1 => Some(a),
                _ => Some(cur),
            });
        if let Some((i, _)) = far {
            sizes[labels[i]] -= 1;
            labels[i] = c;
            sizes[c] = 1;
        }
    }
}

fn lloyd(
    points: &[[f64; 2]],
    k: usize,
    max_iter: usize,
    rng: &mut Rng64,
) -> ClipgridResult<KMeansResult> {
    let mut centers = init_plus_plus(points, k, rng);
    let mut labels = vec![usize::MAX; points.len()];

    for iter in 1..=max_iter {
        let mut next: Vec<usize> = points.iter().map(|&p| nearest(p, &centers).0).collect();
        relocate_empty(points, &centers, &mut next);
        let stable = next == labels;
        labels = next;

        let mut sums = vec![[0.0f64; 2]; k];
        let mut counts = vec![0usize; k];
        for (p, &l) in points.iter().zip(&labels) {
            sums[l][0] += p[0];
            sums[l][1] += p[1];
            counts[l] += 1;
        }
        for c in 0..k {
            if counts[c] > 0 {
                let n = counts[c] as f64;
                centers[c] = [sums[c][0] / n, sums[c][1] / n];
            }
        }

        if stable {
            let inertia = points
                .iter()
                .zip(&labels)
                .map(|(&p, &l)| sq_dist(p, centers[l]))
                .sum();
            return Ok(KMeansResult {
                labels,
                centers,
                inertia,
                iterations: iter,
                restart: 0,
            });
        }
    }

    Err(ClipgridError::clustering(format!(
        "k-means did not converge within {max_iter} iterations"
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/cluster/kmeans.rs"]
mod tests;
