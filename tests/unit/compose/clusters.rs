use super::*;
use crate::animation::tween::Property;
use crate::foundation::error::ClipgridError;
use crate::model::grid::GridSize;
use crate::model::sample::SampleDerived;
use crate::observe::RecordingObserver;

fn sample(col: u32, row: u32, x: f64, y: f64, dur: u64, hz: f64, key: f64) -> Sample {
    Sample {
        col,
        row,
        audio_start: 10,
        audio_dur: dur,
        hz,
        clarity: 0.5,
        power: 0.5,
        embedding_x: x,
        embedding_y: y,
        sequencing_key: key,
        derived: SampleDerived::default(),
    }
}

fn samples() -> Vec<Sample> {
    vec![
        sample(1, 1, 10.0, 10.1, 300, 100.0, 1.0),
        sample(0, 0, 0.0, 0.0, 100, 300.0, 0.0),
        sample(0, 1, 10.0, 10.0, 200, 100.0, 0.0),
        sample(1, 0, 0.0, 0.1, 150, 300.0, 1.0),
    ]
}

fn cfg() -> CompositionConfig {
    let mut cfg = CompositionConfig::default();
    cfg.canvas.width = 100;
    cfg.canvas.height = 100;
    cfg.canvas.pad_start_ms = 1000;
    cfg.grid.grid = GridSize::new(2, 2).unwrap();
    cfg.cluster.clusters = 2;
    cfg.cluster.runs = 3;
    cfg.cluster.overlap_pct = 0.0;
    cfg.cluster.cluster_overlap_pct = 0.0;
    cfg.cluster.play_clusters = 2;
    cfg
}

fn build(cfg: &CompositionConfig) -> ClipgridResult<Composition> {
    build_clusters(cfg, samples(), &mut RecordingObserver::default())
}

#[test]
fn low_cluster_plays_first_and_members_follow_their_key() {
    let comp = build(&cfg()).unwrap();
    let order: Vec<(usize, u64)> = comp
        .clips
        .iter()
        .map(|c| (c.sample_index(), c.plays()[0].start_ms))
        .collect();
    assert_eq!(order, vec![(2, 1000), (3, 1200), (0, 1500), (1, 1600)]);
    assert_eq!(comp.timeline.duration_ms, 1750);
    assert_eq!(comp.sequence.as_ref().map(|s| s.duration_ms), Some(750));
}

#[test]
fn every_play_is_centered_at_its_member_volume() {
    let comp = build(&cfg()).unwrap();
    let seq = comp.sequence.as_ref().unwrap();
    let volumes: Vec<f64> = seq
        .clusters
        .iter()
        .flat_map(|c| c.members.iter().map(|m| m.volume))
        .collect();
    for (clip, vol) in comp.clips.iter().zip(volumes) {
        assert_eq!(clip.plays().len(), 1);
        assert_eq!(clip.plays()[0].params.pan, 0.0);
        assert_eq!(clip.plays()[0].params.volume, vol);
    }
    let manifest = comp.manifest().unwrap();
    assert_eq!(manifest.len(), 4);
}

#[test]
fn dots_sit_at_their_embedding_and_flash_around_the_play() {
    let comp = build(&cfg()).unwrap();
    let first = &comp.clips[0];
    assert_eq!(first.props().width, 8.0);
    assert_eq!(first.props().height, 8.0);
    assert!((first.props().x - 96.0).abs() < 1e-12);
    assert!((first.props().y - (4.0 + 92.0 * 10.0 / 10.1)).abs() < 1e-9);
    assert_eq!(first.sample().derived.cluster, comp.clips[1].sample().derived.cluster);
    assert_ne!(first.sample().derived.cluster, comp.clips[2].sample().derived.cluster);

    assert_eq!(first.evaluate_property(Property::Alpha, 0.0), 0.0);
    assert_eq!(first.evaluate_property(Property::Alpha, 1000.0), 0.0);
    assert_eq!(first.evaluate_property(Property::Alpha, 1040.0), 1.0);
    assert_eq!(first.evaluate_property(Property::Alpha, 1200.0), 0.0);
}

#[test]
fn more_clusters_than_samples_fails() {
    let mut c = cfg();
    c.cluster.clusters = 5;
    let err = build(&c).unwrap_err();
    assert!(matches!(err, ClipgridError::Clustering(_)));
}
