use crate::animation::ease::Ease;
use crate::cluster::kmeans::{KMeansConfig, KMeansResult, kmeans};
use crate::foundation::core::ValueRange;
use crate::foundation::error::{ClipgridError, ClipgridResult};
use crate::foundation::math::{bounds, distance, median, norm_clamped, round_ms, std_dev};
use crate::model::sample::Sample;

/// Weights of the four ranking criteria.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RankWeights {
    /// Centroid distance from the embedding center, larger preferred.
    pub distance: f64,
    /// Member spread, smaller preferred.
    pub spread: f64,
    /// Median pitch, lower preferred.
    pub hz: f64,
    /// Median clarity, higher preferred.
    pub clarity: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            distance: 0.5,
            spread: 0.75,
            hz: 0.75,
            clarity: 1.0,
        }
    }
}

/// Clustering sequencer settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub clusters: usize,
    pub runs: usize,
    pub max_iter: usize,
    pub overlap_ms: u64,
    pub overlap_pct: f64,
    pub cluster_overlap_pct: f64,
    pub play_clusters: usize,
    pub volume_range: ValueRange,
    pub weights: RankWeights,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            clusters: 128,
            runs: 20,
            max_iter: 300,
            overlap_ms: 128,
            overlap_pct: 0.5,
            cluster_overlap_pct: 0.25,
            play_clusters: 16,
            volume_range: ValueRange { min: 0.4, max: 0.6 },
            weights: RankWeights::default(),
        }
    }
}

impl ClusterConfig {
    /// Check counts and percentages.
    pub fn validate(&self) -> ClipgridResult<()> {
        if self.clusters == 0 {
            return Err(ClipgridError::configuration("clusters must be >= 1"));
        }
        if self.runs == 0 {
            return Err(ClipgridError::configuration("runs must be >= 1"));
        }
        if self.max_iter == 0 {
            return Err(ClipgridError::configuration("max_iter must be >= 1"));
        }
        if self.play_clusters == 0 {
            return Err(ClipgridError::configuration("play_clusters must be >= 1"));
        }
        for (name, v) in [
            ("overlap_pct", self.overlap_pct),
            ("cluster_overlap_pct", self.cluster_overlap_pct),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(ClipgridError::configuration(format!(
                    "{name} must be within [0, 1], got {v}"
                )));
            }
        }
        let w = self.weights;
        if [w.distance, w.spread, w.hz, w.clarity]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(ClipgridError::configuration(
                "ranking weights must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// Aggregate statistics of one cluster.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClusterStats {
    pub label: usize,
    pub members: Vec<usize>,
    pub center: [f64; 2],
    pub dist_from_center: f64,
    pub spread: f64,
    pub median_hz: f64,
    pub median_clarity: f64,
}

/// One sample placed inside its cluster's run.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClusterMember {
    pub sample_index: usize,
    pub offset_ms: u64,
    pub volume: f64,
}

/// A selected cluster with its ordered members.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SequencedCluster {
    pub stats: ClusterStats,
    pub score: f64,
    pub members: Vec<ClusterMember>,
    pub duration_ms: u64,
    pub start_ms: u64,
}

/// Result of the clustering sequencer.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Sequence {
    pub labels: Vec<usize>,
    pub stats: Vec<ClusterStats>,
    pub clusters: Vec<SequencedCluster>,
    pub duration_ms: u64,
}

/// Compute per-cluster statistics from a k-means partition.
pub fn cluster_stats(samples: &[Sample], km: &KMeansResult) -> Vec<ClusterStats> {
    let (xmin, xmax) = bounds(samples.iter().map(|s| s.embedding_x));
    let (ymin, ymax) = bounds(samples.iter().map(|s| s.embedding_y));
    let normalize =
        |p: [f64; 2]| [norm_clamped(p[0], xmin, xmax), norm_clamped(p[1], ymin, ymax)];

    km.centers
        .iter()
        .enumerate()
        .map(|(label, &center)| {
            let members: Vec<usize> = (0..samples.len())
                .filter(|&i| km.labels[i] == label)
                .collect();
            let center = normalize(center);
            let dists: Vec<f64> = members
                .iter()
                .map(|&i| distance(normalize(samples[i].embedding()), center))
                .collect();
            let hz: Vec<f64> = members.iter().map(|&i| samples[i].hz).collect();
            let clarity: Vec<f64> = members.iter().map(|&i| samples[i].clarity).collect();
            ClusterStats {
                label,
                center,
                dist_from_center: distance(center, [0.5, 0.5]),
                spread: std_dev(&dists),
                median_hz: median(&hz).unwrap_or(0.0),
                median_clarity: median(&clarity).unwrap_or(0.0),
                members,
            }
        })
        .collect()
}

/// Composite score of every cluster, indexed like `stats`.
///
/// Each criterion is min-max normalized across clusters, flipped when smaller is preferred,
/// then weighted and summed.
pub fn score_clusters(stats: &[ClusterStats], weights: &RankWeights) -> Vec<f64> {
    let column = |get: fn(&ClusterStats) -> f64| stats.iter().map(get).collect::<Vec<f64>>();
    let criteria = [
        (column(|s| s.dist_from_center), true, weights.distance),
        (column(|s| s.spread), false, weights.spread),
        (column(|s| s.median_hz), false, weights.hz),
        (column(|s| s.median_clarity), true, weights.clarity),
    ];
    let mut scores = vec![0.0; stats.len()];
    for (values, descending, weight) in criteria {
        let (lo, hi) = bounds(values.iter().copied());
        for (score, v) in scores.iter_mut().zip(values) {
            let n = norm_clamped(v, lo, hi);
            *score += weight * if descending { n } else { 1.0 - n };
        }
    }
    scores
}

/// Pick the `take` best clusters and return their labels ordered by ascending median pitch.
pub fn select_clusters(stats: &[ClusterStats], scores: &[f64], take: usize) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..stats.len()).collect();
    ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    ranked.truncate(take);
    ranked.sort_by(|&a, &b| {
        stats[a]
            .median_hz
            .total_cmp(&stats[b].median_hz)
            .then(a.cmp(&b))
    });
    ranked
}

/// Order a cluster's members and assign their start offsets and volumes.
///
/// Members are sorted by sequencing key. Every member but the last steps the running offset by
/// its audio duration minus the overlap `min(overlap_ms, overlap_pct * duration)`; the last
/// member steps by its full duration. Returns the members and the cluster duration.
pub fn sequence_members(
    samples: &[Sample],
    members: &[usize],
    cfg: &ClusterConfig,
) -> (Vec<ClusterMember>, u64) {
    let mut order = members.to_vec();
    order.sort_by(|&a, &b| {
        samples[a]
            .sequencing_key
            .total_cmp(&samples[b].sequencing_key)
            .then(a.cmp(&b))
    });

    let count = order.len();
    let mut ms = 0u64;
    let mut out = Vec::with_capacity(count);
    for (j, &i) in order.iter().enumerate() {
        let n = if count > 1 {
            j as f64 / (count - 1) as f64
        } else {
            0.5
        };
        out.push(ClusterMember {
            sample_index: i,
            offset_ms: ms,
            volume: cfg.volume_range.lerp(Ease::SinBell.apply(n)),
        });
        let dur = samples[i].audio_dur;
        let step = if j + 1 == count {
            dur
        } else {
            let overlap = cfg
                .overlap_ms
                .min(round_ms(dur as f64 * cfg.overlap_pct));
            dur.saturating_sub(overlap)
        };
        ms += step;
    }
    (out, ms)
}

/// Run k-means, rank the clusters and lay the selected ones out on one timeline.
#[tracing::instrument(skip(samples, cfg), fields(samples = samples.len(), k = cfg.clusters))]
pub fn sequence(samples: &[Sample], cfg: &ClusterConfig, seed: u64) -> ClipgridResult<Sequence> {
    cfg.validate()?;
    let points: Vec<[f64; 2]> = samples.iter().map(Sample::embedding).collect();
    let km = kmeans(
        &points,
        &KMeansConfig {
            k: cfg.clusters,
            restarts: cfg.runs,
            max_iter: cfg.max_iter,
            seed,
        },
    )?;

    let stats = cluster_stats(samples, &km);
    let scores = score_clusters(&stats, &cfg.weights);
    let selected = select_clusters(&stats, &scores, cfg.play_clusters);
    tracing::info!(selected = ?selected, "selected clusters");

    let mut clusters: Vec<SequencedCluster> = selected
        .iter()
        .map(|&label| {
            let (members, duration_ms) = sequence_members(samples, &stats[label].members, cfg);
            SequencedCluster {
                stats: stats[label].clone(),
                score: scores[label],
                members,
                duration_ms,
                start_ms: 0,
            }
        })
        .collect();

    let mut ms = 0u64;
    for i in 0..clusters.len() {
        clusters[i].start_ms = ms;
        let dur = clusters[i].duration_ms;
        ms += match clusters.get(i + 1) {
            Some(next) => {
                let shorter = dur.min(next.duration_ms) as f64;
                dur.saturating_sub(round_ms(shorter * cfg.cluster_overlap_pct))
            }
            None => dur,
        };
    }

    Ok(Sequence {
        labels: km.labels,
        stats,
        clusters,
        duration_ms: ms,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/cluster/sequencer.rs"]
mod tests;
