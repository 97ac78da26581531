//! Array-style selection over a 10×10 canvas.

use termpix_render::{Canvas, CanvasConfig, CellStore, GridError, PixelGrid, Rgb, SliceSpec};

fn canvas() -> Canvas {
    Canvas::new(CanvasConfig::new(10, 10)).expect("10x10 canvas")
}

/// `(y, x)` of every cell a row-major selection yields.
fn block<S: CellStore>(grid: &PixelGrid<S>, rows: SliceSpec, cols: SliceSpec) -> Vec<Vec<(u16, u16)>> {
    grid.select(rows, cols)
        .expect("valid selection")
        .rows()
        .expect("two slices give rows")
        .map(|row| row.map(|cell| (cell.y(), cell.x())).collect())
        .collect()
}

#[test]
fn two_slices_nest_rows_then_columns() {
    let canvas = canvas();
    let got = block(canvas.grid(), SliceSpec::from(1..3), SliceSpec::from(7..));
    assert_eq!(
        got,
        [
            vec![(1, 7), (1, 8), (1, 9)],
            vec![(2, 7), (2, 8), (2, 9)]
        ]
    );
}

#[test]
fn stepped_and_reversed_slices() {
    let canvas = canvas();
    let got = block(
        canvas.grid(),
        SliceSpec::FULL.with_step(-4),
        SliceSpec::from(2..8).with_step(3),
    );
    assert_eq!(
        got,
        [
            vec![(9, 2), (9, 5)],
            vec![(5, 2), (5, 5)],
            vec![(1, 2), (1, 5)]
        ]
    );
}

#[test]
fn stepped_rows_with_full_columns() {
    let canvas = canvas();
    let got = block(canvas.grid(), SliceSpec::from(2..8).with_step(2), SliceSpec::FULL);
    let ys: Vec<u16> = got.iter().map(|row| row[0].0).collect();
    assert_eq!(ys, [2, 4, 6]);
    for (row, y) in got.iter().zip([2u16, 4, 6]) {
        let expected: Vec<(u16, u16)> = (0..10).map(|x| (y, x)).collect();
        assert_eq!(*row, expected);
    }
}

#[test]
fn stop_past_the_edge_is_clamped() {
    let canvas = canvas();
    let cells: Vec<_> = canvas
        .grid()
        .select(0, 8..50)
        .unwrap()
        .cells()
        .unwrap()
        .map(|c| c.x())
        .collect();
    assert_eq!(cells, [8, 9]);
}

#[test]
fn bare_index_and_bare_slice() {
    let canvas = canvas();
    let grid = canvas.grid();

    let row: Vec<_> = grid.index(-1).unwrap().cells().unwrap().map(|c| (c.y(), c.x())).collect();
    assert_eq!(row.len(), 10);
    assert!(row.iter().all(|&(y, _)| y == 9));

    let rows: Vec<usize> = grid
        .index(..2)
        .unwrap()
        .rows()
        .unwrap()
        .map(Iterator::count)
        .collect();
    assert_eq!(rows, [10, 10]);
}

#[test]
fn out_of_range_coordinates_fail() {
    let canvas = canvas();
    let grid = canvas.grid();
    assert!(matches!(
        grid.at(0, 10),
        Err(GridError::OutOfBounds { axis: "x", value: 10, bound: 10 })
    ));
    assert!(matches!(
        grid.at(-11, 0),
        Err(GridError::OutOfBounds { axis: "y", value: -11, bound: 10 })
    ));
    let corner = grid.at(-1, -1).unwrap();
    assert_eq!((corner.x(), corner.y()), (9, 9));
}

#[test]
fn zero_step_fails_before_iteration() {
    let canvas = canvas();
    assert_eq!(
        canvas.grid().select(SliceSpec::FULL.with_step(0), 0).err(),
        Some(GridError::ZeroStep)
    );
}

#[test]
fn column_writes_are_visible_in_rows() {
    let canvas = canvas();
    for cell in canvas.grid().column(3).unwrap() {
        cell.set_char('|');
        cell.set_bg_color(Rgb::new(0, 0, 255));
    }
    let row4: String = canvas.grid().row(4).unwrap().map(|c| c.char()).collect();
    assert_eq!(row4, "   |      ");
    let cell = canvas.grid().at(4, 3).unwrap();
    assert_eq!(cell.bg_color(), Some(Rgb::new(0, 0, 255)));
    assert_eq!(cell.fg_color(), None);
}

#[test]
fn clearing_foreground_keeps_background() {
    let canvas = canvas();
    let cell = canvas.grid().at(5, 5).unwrap();
    cell.set_fg_channels(&[200, 100, 50]).unwrap();
    cell.set_bg_channels(&[1, 2, 3]).unwrap();
    cell.set_fg_color(None);
    assert_eq!(cell.fg_color(), None);
    assert_eq!(cell.raw_fg_color(), -1);
    assert_eq!(cell.bg_color(), Some(Rgb::new(1, 2, 3)));
}

#[test]
fn store_reflects_view_writes() {
    let mut canvas = canvas();
    canvas.grid().at(0, 0).unwrap().set_char('a');
    assert_eq!(canvas.grid().store().char_at(0, 0), 'a');
    canvas.grid_mut().store_mut().clear();
    assert_eq!(canvas.grid().at(0, 0).unwrap().char(), ' ');
}
