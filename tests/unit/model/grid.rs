use super::*;
use crate::model::sample::SampleDerived;

fn sample(col: u32, row: u32) -> Sample {
    Sample {
        col,
        row,
        audio_start: 0,
        audio_dur: 100,
        hz: 220.0,
        clarity: 0.5,
        power: 0.5,
        embedding_x: 0.0,
        embedding_y: 0.0,
        sequencing_key: 0.0,
        derived: SampleDerived::default(),
    }
}

fn layout() -> GridLayout {
    GridLayout {
        canvas: Canvas {
            width: 200,
            height: 100,
        },
        grid: GridSize::new(2, 2).unwrap(),
        start: GridSize::new(1, 1).unwrap(),
        end: GridSize::new(2, 2).unwrap(),
    }
}

#[test]
fn parses_grid_strings() {
    assert_eq!("128x64".parse::<GridSize>().unwrap(), GridSize::new(128, 64).unwrap());
    assert_eq!(" 4 X 3 ".parse::<GridSize>().unwrap(), GridSize::new(4, 3).unwrap());
    for bad in ["", "128", "ax2", "0x4", "4x-1"] {
        let err = bad.parse::<GridSize>().unwrap_err();
        assert!(matches!(err, ClipgridError::Configuration(_)), "{bad}");
    }
}

#[test]
fn grid_size_deserializes_from_string_or_fields() {
    let a: GridSize = serde_json::from_str("\"8x4\"").unwrap();
    let b: GridSize = serde_json::from_str(r#"{"cols":8,"rows":4}"#).unwrap();
    assert_eq!(a, b);
    assert!(serde_json::from_str::<GridSize>("\"8by4\"").is_err());
}

#[test]
fn arrange_sorts_row_major() {
    let arranged = layout()
        .arrange(vec![sample(1, 1), sample(0, 1), sample(1, 0), sample(0, 0)])
        .unwrap();
    let pos: Vec<(u32, u32)> = arranged.iter().map(Sample::grid_pos).collect();
    assert_eq!(pos, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
}

#[test]
fn arrange_rejects_duplicates_and_out_of_bounds() {
    let dup = layout().arrange(vec![sample(0, 0), sample(0, 0)]);
    assert!(matches!(dup, Err(ClipgridError::Validation(_))));
    let oob = layout().arrange(vec![sample(2, 0)]);
    assert!(matches!(oob, Err(ClipgridError::Validation(_))));
}

#[test]
fn geometry_helpers() {
    let l = layout();
    assert_eq!(l.cell_size(), (100.0, 50.0));
    assert_eq!(l.cell_center(1, 0), (150.0, 25.0));
    assert_eq!(l.index_of(1, 1), 3);
    assert_eq!(l.zoom_scales(), (2.0, 1.0));
}
