use super::*;

fn gradient(width: u32, height: u32, channels: u8) -> Frame {
    let mut data = Vec::new();
    for y in 0..height {
        for x in 0..width {
            data.extend([(x * 30) as u8, (y * 40) as u8, ((x + y) * 7) as u8]);
            if channels == 4 {
                data.push(200);
            }
        }
    }
    Frame::new(width, height, channels, data).unwrap()
}

fn params() -> WarpParams {
    WarpParams {
        start_ms: 100.0,
        cycle_min_ms: 1000.0,
        cycle_max_ms: 2000.0,
        distance: 37.5,
    }
}

#[test]
fn identity_at_start() {
    for channels in [3, 4] {
        let src = gradient(7, 5, channels);
        let out = warp_frame(&src, &params(), 100.0).unwrap();
        assert_eq!(out, src);
    }
}

#[test]
fn identity_before_start() {
    let src = gradient(6, 3, 3);
    assert_eq!(warp_frame(&src, &params(), 0.0).unwrap(), src);
}

#[test]
fn every_row_is_still_at_start() {
    for y in 0..9 {
        let m = row_motion(&params(), y, 9, 100.0);
        assert_eq!(m.progress, 0.0);
        assert_eq!(m.offset, 0.0);
        assert_eq!(m.alpha, 1.0);
    }
}

#[test]
fn fully_black_after_longest_cycle() {
    let p = params();
    let rgb = warp_frame(&gradient(8, 6, 3), &p, p.end_ms()).unwrap();
    assert!(rgb.data.iter().all(|&b| b == 0));

    let rgba = warp_frame(&gradient(8, 6, 4), &p, p.end_ms() + 500.0).unwrap();
    assert!(
        rgba.data
            .chunks_exact(4)
            .all(|px| px == [0, 0, 0, 255])
    );
}

#[test]
fn center_rows_finish_first() {
    let p = params();
    let mid = row_motion(&p, 2, 5, 1100.0);
    let top = row_motion(&p, 0, 5, 1100.0);
    assert_eq!(mid.progress, 1.0);
    assert!(top.progress < 1.0);
    assert!(top.progress > 0.0);
}

#[test]
fn odd_rows_move_the_other_way() {
    let p = params();
    let even = row_motion(&p, 0, 4, 900.0);
    let odd = row_motion(&p, 1, 4, 900.0);
    assert!(even.offset > 0.0);
    assert!(odd.offset < 0.0);
}

#[test]
fn source_column_always_wraps_into_frame() {
    for width in [1u32, 3, 64] {
        for x in 0..width {
            for offset in [
                0.0, 0.5, -0.5, 1e-17, -1e-17, 63.9, -63.9, 1e6, -1e6, 12345.678,
            ] {
                let xf = source_column(x, offset, width);
                assert!((0.0..f64::from(width)).contains(&xf), "{x} {offset} {xf}");
            }
        }
    }
}

#[test]
fn half_progress_shifts_rows_by_whole_pixels() {
    let p = WarpParams {
        start_ms: 0.0,
        cycle_min_ms: 1000.0,
        cycle_max_ms: 1000.0,
        distance: 2.0,
    };
    let src = gradient(5, 2, 3);
    let out = warp_frame(&src, &p, 500.0).unwrap();
    for x in 0..5u32 {
        assert_eq!(out.pixel(x, 0), src.pixel((x + 1) % 5, 0));
        assert_eq!(out.pixel(x, 1), src.pixel((x + 4) % 5, 1));
    }
}

#[test]
fn right_edge_neighbor_is_transparent() {
    let src = gradient(4, 1, 3);
    let c = sample_bilinear(&src, 3.5, 0.0);
    let edge = src.pixel(3, 0);
    assert_eq!(
        [c[0], c[1], c[2]],
        [
            i32::from(edge[0]),
            i32::from(edge[1]),
            i32::from(edge[2])
        ]
    );
    assert_eq!(c[3], 128);
}

#[test]
fn single_row_frames_are_supported() {
    let src = gradient(4, 1, 3);
    let out = warp_frame(&src, &params(), 600.0).unwrap();
    assert!(out.same_shape(&src));
}

#[test]
fn rejects_bad_inputs() {
    let mut src = gradient(4, 2, 3);
    assert!(matches!(
        warp_frame(&src, &params(), f64::NAN),
        Err(ClipgridError::Kernel(_))
    ));

    let bad = WarpParams {
        cycle_min_ms: 0.0,
        ..params()
    };
    assert!(matches!(
        warp_frame(&src, &bad, 0.0),
        Err(ClipgridError::Configuration(_))
    ));

    src.data.pop();
    assert!(matches!(
        warp_frame(&src, &params(), 0.0),
        Err(ClipgridError::Kernel(_))
    ));
}
