use super::*;

fn cfg(k: usize) -> KMeansConfig {
    KMeansConfig {
        k,
        restarts: 4,
        max_iter: 300,
        seed: 42,
    }
}

fn blobs() -> Vec<[f64; 2]> {
    vec![
        [0.0, 0.0],
        [0.1, 0.2],
        [0.2, 0.1],
        [10.0, 10.0],
        [10.1, 9.9],
        [9.8, 10.2],
    ]
}

#[test]
fn separates_obvious_blobs() {
    let r = kmeans(&blobs(), &cfg(2)).unwrap();
    assert_eq!(r.labels.len(), 6);
    assert_eq!(r.labels[0], r.labels[1]);
    assert_eq!(r.labels[1], r.labels[2]);
    assert_eq!(r.labels[3], r.labels[4]);
    assert_eq!(r.labels[4], r.labels[5]);
    assert_ne!(r.labels[0], r.labels[3]);
    assert_eq!(r.sizes(), vec![3, 3]);
    assert!(r.inertia < 1.0);
}

#[test]
fn identical_seed_is_deterministic() {
    let a = kmeans(&blobs(), &cfg(3)).unwrap();
    let b = kmeans(&blobs(), &cfg(3)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn one_cluster_per_point_has_zero_inertia() {
    let r = kmeans(&blobs(), &cfg(6)).unwrap();
    assert_eq!(r.inertia, 0.0);
    assert!(r.sizes().iter().all(|&s| s == 1));
}

#[test]
fn duplicate_points_never_leave_a_cluster_empty() {
    let pts = vec![[1.0, 1.0]; 5];
    let r = kmeans(&pts, &cfg(3)).unwrap();
    let sizes = r.sizes();
    assert_eq!(sizes.iter().sum::<usize>(), 5);
    assert!(sizes.iter().all(|&s| s >= 1));
}

#[test]
fn rejects_invalid_cluster_counts() {
    for k in [0, 7] {
        let err = kmeans(&blobs(), &cfg(k)).unwrap_err();
        assert!(matches!(err, ClipgridError::Clustering(_)), "k={k}");
    }
    let err = kmeans(&[[f64::NAN, 0.0]], &cfg(1)).unwrap_err();
    assert!(matches!(err, ClipgridError::Clustering(_)));
}

#[test]
fn iteration_cap_is_a_clustering_error() {
    let capped = KMeansConfig {
        max_iter: 1,
        ..cfg(2)
    };
    assert!(matches!(
        kmeans(&blobs(), &capped),
        Err(ClipgridError::Clustering(_))
    ));
}
