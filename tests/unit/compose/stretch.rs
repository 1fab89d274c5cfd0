use super::*;
use crate::model::grid::GridSize;
use crate::model::sample::SampleDerived;
use crate::observe::RecordingObserver;

fn samples() -> Vec<Sample> {
    let mut out = Vec::new();
    for row in 0..3 {
        for col in 0..5 {
            out.push(Sample {
                col,
                row,
                audio_start: 0,
                audio_dur: 250,
                hz: 220.0,
                clarity: 0.5,
                power: 0.5,
                embedding_x: 0.0,
                embedding_y: 0.0,
                sequencing_key: 0.0,
                derived: SampleDerived::default(),
            });
        }
    }
    out
}

fn cfg() -> CompositionConfig {
    let mut cfg = CompositionConfig::default();
    cfg.canvas.width = 400;
    cfg.canvas.height = 200;
    cfg.canvas.pad_start_ms = 500;
    cfg.grid.grid = GridSize::new(5, 3).unwrap();
    cfg.stretch = StretchConfig {
        volume_range: ValueRange::new(0.25, 0.6).unwrap(),
        stretch_duration_ms: 1000,
        stretch_to_ms: 500,
        step_ms: 200,
        transition_back_at: 0.5,
    };
    cfg
}

fn build(cfg: &CompositionConfig) -> Composition {
    build_stretch(cfg, samples(), &mut RecordingObserver::default()).unwrap()
}

fn at<'a>(comp: &'a Composition, col: u32, row: u32) -> &'a Clip {
    &comp.clips[(row * 5 + col) as usize]
}

#[test]
fn center_clip_replays_with_growing_stretch() {
    let comp = build(&cfg());
    let clip = at(&comp, 2, 1);
    assert!(clip.state_flag(PLAYABLE));

    let starts: Vec<u64> = clip.plays().iter().map(|p| p.start_ms).collect();
    assert_eq!(starts, vec![500, 750, 1063, 1454]);
    let stretches: Vec<f64> = clip
        .plays()
        .iter()
        .map(|p| p.params.stretch.unwrap())
        .collect();
    assert_eq!(stretches[0], 1.0);
    assert!((stretches[1] - 1.25).abs() < 1e-12);
    assert!(stretches.windows(2).all(|w| w[0] < w[1]));

    let vols: Vec<f64> = clip.plays().iter().map(|p| p.params.volume).collect();
    assert!((vols[0] - 0.6).abs() < 1e-12);
    assert!(vols.windows(2).all(|w| w[0] > w[1]));

    assert_eq!(clip.evaluate_property(Property::Brightness, 550.0), 1.0);
    assert_eq!(clip.evaluate_property(Property::Brightness, 0.0), 0.2);
}

#[test]
fn outer_pair_starts_one_step_later_at_the_quietest_volume() {
    let comp = build(&cfg());
    for col in [1, 3] {
        let clip = at(&comp, col, 1);
        assert!(clip.state_flag(PLAYABLE));
        assert_eq!(clip.plays()[0].start_ms, 700);
        assert!(
            clip.plays()
                .iter()
                .all(|p| (p.params.volume - 0.25).abs() < 1e-12)
        );
    }
    for col in [0, 4] {
        let clip = at(&comp, col, 1);
        assert!(!clip.state_flag(PLAYABLE));
        assert!(clip.plays().is_empty());
    }
}

#[test]
fn stretched_clips_hold_then_revert() {
    let comp = build(&cfg());
    let clip = at(&comp, 2, 1);
    let scale_to = 267.0 / (200.0 / 3.0);
    assert_eq!(clip.evaluate_property(Property::ScaleY, 400.0), 1.0);
    assert!((clip.evaluate_property(Property::ScaleY, 1500.0) - scale_to).abs() < 1e-9);
    assert!((clip.evaluate_property(Property::ScaleY, 1550.0) - scale_to).abs() < 1e-9);
    assert_eq!(clip.evaluate_property(Property::ScaleY, 2600.0), 1.0);

    let outer = at(&comp, 1, 1);
    let scale = outer.tweens().events_for(&Property::ScaleY);
    assert_eq!(scale.len(), 2);
    assert_eq!((scale[1].start_ms, scale[1].dur_ms), (1700, 1000));
}

#[test]
fn other_clips_move_out_of_the_way() {
    let comp = build(&cfg());
    let delta = (267.0 - 200.0 / 3.0) * 0.5;

    let above = at(&comp, 2, 0);
    assert!((above.evaluate_property(Property::TranslateY, 1500.0) + delta).abs() < 1e-9);
    assert_eq!(above.evaluate_property(Property::TranslateY, 2600.0), 0.0);

    let below = at(&comp, 2, 2);
    assert!((below.evaluate_property(Property::TranslateY, 1500.0) - delta).abs() < 1e-9);

    let corner = at(&comp, 0, 0);
    let moves = corner.tweens().events_for(&Property::TranslateY);
    assert_eq!(moves[0].start_ms, 900);
    assert_eq!(moves.last().map(|t| t.end_ms()), Some(2900));
    assert_eq!(comp.timeline.duration_ms, 2900);
}

#[test]
fn container_zooms_from_the_start_grid() {
    let mut c = cfg();
    c.grid.start_grid = GridSize::new(1, 1).ok();
    let comp = build(&c);
    let scale = |t: f64| comp.scene.local_transform(comp.container, t).unwrap().scale.x;
    assert_eq!(scale(0.0), 5.0);
    assert_eq!(scale(1600.0), 1.0);
    assert_eq!(scale(2700.0), 1.0);
    assert!(scale(1000.0) < 5.0 && scale(1000.0) > 1.0);
}

#[test]
fn manifest_carries_stretch_factors() {
    let comp = build(&cfg());
    let m = comp.manifest().unwrap();
    assert_eq!(m.len(), 12);
    assert!(m.entries.iter().all(|e| e.stretch.is_some()));
}

fn grid_of(cols: u32, rows: u32) -> Vec<Sample> {
    let mut out = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            out.push(Sample {
                col,
                row,
                ..samples()[0].clone()
            });
        }
    }
    out
}

#[test]
fn odd_width_grids_stretch_the_center_column() {
    for (cols, rows) in [(1, 1), (3, 3), (5, 2)] {
        let mut c = cfg();
        c.grid.grid = GridSize::new(cols, rows).unwrap();
        let comp = build_stretch(&c, grid_of(cols, rows), &mut RecordingObserver::default())
            .unwrap();
        let center = comp
            .clips
            .iter()
            .find(|clip| clip.props().col == cols / 2 && clip.props().row == (rows - 1) / 2)
            .unwrap();
        assert!(center.state_flag(PLAYABLE), "{cols}x{rows}");
        assert_eq!(center.plays()[0].start_ms, 500, "{cols}x{rows}");
        assert_eq!(center.plays()[0].params.stretch, Some(1.0));
        assert!(center.evaluate_property(Property::ScaleY, 1500.0) > 1.0);
        assert!(center.tweens().events_for(&Property::TranslateY).is_empty());
    }
}
