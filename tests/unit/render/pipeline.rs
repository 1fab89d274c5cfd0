use super::*;
use crate::render::backend::{RayonWarp, SerialWarp};

struct Ramp {
    canvas: Canvas,
    bad_from: Option<u64>,
}

impl FrameSource for Ramp {
    fn frame(&self, idx: FrameIndex, _ms: f64) -> ClipgridResult<Frame> {
        let width = match self.bad_from {
            Some(b) if idx.0 >= b => self.canvas.width + 1,
            _ => self.canvas.width,
        };
        let len = (width * self.canvas.height * 3) as usize;
        let data = (0..len).map(|i| ((i as u64 * 13 + idx.0 * 29) % 256) as u8).collect();
        Frame::new(width, self.canvas.height, 3, data)
    }
}

fn job(parallel: bool) -> WarpRender {
    WarpRender {
        canvas: Canvas {
            width: 12,
            height: 6,
        },
        fps: Fps::new(10, 1).unwrap(),
        params: WarpParams {
            start_ms: 100.0,
            cycle_min_ms: 300.0,
            cycle_max_ms: 600.0,
            distance: 24.0,
        },
        threading: RenderThreading {
            parallel,
            chunk_size: 3,
            threads: Some(2),
        },
    }
}

fn range(start: u64, end: u64) -> FrameRange {
    FrameRange::new(FrameIndex(start), FrameIndex(end)).unwrap()
}

#[test]
fn frames_arrive_in_order_and_match_the_kernel() {
    let j = job(false);
    let src = Ramp {
        canvas: j.canvas,
        bad_from: None,
    };
    let mut sink = InMemorySink::new();
    let stats = j.render_range(&src, &SerialWarp, range(2, 9), &mut sink).unwrap();

    assert_eq!(stats.frames_total, 7);
    assert_eq!(stats.frames_rendered, 7);
    assert!(sink.is_finished());
    assert_eq!(sink.config().map(|c| (c.width, c.height)), Some((12, 6)));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, (2..9).collect::<Vec<_>>());

    let (i, frame) = &sink.frames()[3];
    let expected = crate::render::warp::warp_frame(
        &src.frame(*i, j.fps.frame_to_ms(*i)).unwrap(),
        &j.params,
        j.fps.frame_to_ms(*i),
    )
    .unwrap();
    assert_eq!(frame, &expected);
}

#[test]
fn parallel_render_matches_serial() {
    let canvas = job(false).canvas;
    let src = Ramp {
        canvas,
        bad_from: None,
    };
    let serial = job(false).render_frames(&src, &SerialWarp, range(0, 10)).unwrap();
    let parallel = job(true).render_frames(&src, &RayonWarp, range(0, 10)).unwrap();
    assert_eq!(serial, parallel);
}

#[test]
fn dimension_mismatch_halts_the_render() {
    for parallel in [false, true] {
        let j = job(parallel);
        let src = Ramp {
            canvas: j.canvas,
            bad_from: Some(4),
        };
        let mut sink = InMemorySink::new();
        let err = j
            .render_range(&src, &SerialWarp, range(0, 8), &mut sink)
            .unwrap_err();
        assert!(matches!(err, ClipgridError::Kernel(_)));
        assert_eq!(sink.frames().len(), 4);
        assert!(!sink.is_finished());
    }
}

#[test]
fn rejects_empty_range_and_zero_threads() {
    let j = job(true);
    let src = StillSource::new(Frame::black(12, 6, 3).unwrap());
    let mut sink = InMemorySink::new();
    assert!(matches!(
        j.render_range(&src, &SerialWarp, range(3, 3), &mut sink),
        Err(ClipgridError::Validation(_))
    ));

    let mut zero = job(true);
    zero.threading.threads = Some(0);
    assert!(matches!(
        zero.render_range(&src, &SerialWarp, range(0, 1), &mut sink),
        Err(ClipgridError::Configuration(_))
    ));
}
