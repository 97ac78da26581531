#![forbid(unsafe_code)]

//! Fixed-size addressable grid over a [`CellStore`].
//!
//! Rows are the first coordinate, columns the second, as in a 2-D array:
//!
//! | Call | Result |
//! |------|--------|
//! | `select(y, x)` | [`Selection::Cell`] |
//! | `select(y, a..b)` / `select(a..b, x)` | [`Selection::Cells`] along one row / column |
//! | `select(a..b, c..d)` | [`Selection::Rows`], each row a [`CellIter`] |
//! | `index(y)` | same as `select(y, ..)` |
//! | `index(a..b)` | same as `select(a..b, ..)` |
//!
//! Fixed coordinates are checked when the selection is made; slices never
//! produce out-of-range positions. The iterators are lazy and consumed once;
//! select again for a fresh pass.
//!
//! ```
//! use termpix_render::grid::PixelGrid;
//! use termpix_render::store::CanvasBuffer;
//! use termpix_render::ColorModel;
//!
//! let grid = PixelGrid::new(CanvasBuffer::new(10, 10, ColorModel::Truecolor)).unwrap();
//! for cell in grid.row(-1).unwrap() {
//!     cell.set_char('#');
//! }
//! let corner = grid.at(-1, -1).unwrap();
//! assert_eq!((corner.y(), corner.x(), corner.char()), (9, 9, '#'));
//! ```

use std::cell::{Ref, RefCell};
use std::fmt;

use crate::slice::{Axis, Positions, SliceSpec};
use crate::store::CellStore;
use crate::view::CellView;

/// Grid addressing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// A fixed coordinate is `>= bound` or `< -bound`.
    OutOfBounds {
        axis: &'static str,
        value: isize,
        bound: u16,
    },
    /// A slice step of 0.
    ZeroStep,
    /// The store has zero width or height.
    EmptyGrid,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { axis, value, bound } => write!(
                f,
                "{axis} coordinate {value} out of range for dimension {bound}"
            ),
            Self::ZeroStep => f.write_str("slice step cannot be zero"),
            Self::EmptyGrid => f.write_str("grid dimensions must be non-zero"),
        }
    }
}

impl std::error::Error for GridError {}

/// Wrap a possibly negative coordinate into `0..bound`.
pub(crate) fn normalize(axis: &'static str, value: isize, bound: u16) -> Result<u16, GridError> {
    let b = bound as isize;
    if value >= b || value < -b {
        return Err(GridError::OutOfBounds { axis, value, bound });
    }
    Ok(value.rem_euclid(b) as u16)
}

/// A grid of cells with array-style addressing.
///
/// The store sits in a [`RefCell`] so any number of [`CellView`]s can read and
/// write through shared references. The grid is therefore `!Sync`.
pub struct PixelGrid<S> {
    store: RefCell<S>,
    width: u16,
    height: u16,
}

impl<S: fmt::Debug> fmt::Debug for PixelGrid<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelGrid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("store", &self.store)
            .finish()
    }
}

impl<S: CellStore> PixelGrid<S> {
    /// Wrap a store. Its dimensions are fixed from here on.
    ///
    /// # Errors
    ///
    /// [`GridError::EmptyGrid`] if the store has no cells.
    pub fn new(store: S) -> Result<Self, GridError> {
        let (width, height) = (store.width(), store.height());
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid);
        }
        Ok(Self {
            store: RefCell::new(store),
            width,
            height,
        })
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The single cell at row `y`, column `x`.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] for coordinates outside `-dim..dim`.
    pub fn at(&self, y: isize, x: isize) -> Result<CellView<'_, S>, GridError> {
        CellView::new(self, x, y)
    }

    /// Select by `(row, column)` expression.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] for a bad fixed coordinate,
    /// [`GridError::ZeroStep`] for a zero slice step.
    pub fn select(
        &self,
        row: impl Into<Axis>,
        col: impl Into<Axis>,
    ) -> Result<Selection<'_, S>, GridError> {
        Ok(match (row.into(), col.into()) {
            (Axis::At(y), Axis::At(x)) => Selection::Cell(self.at(y, x)?),
            (Axis::At(y), Axis::Slice(cols)) => Selection::Cells(self.row_slice(y, cols)?),
            (Axis::Slice(rows), Axis::At(x)) => Selection::Cells(self.column_slice(rows, x)?),
            (Axis::Slice(rows), Axis::Slice(cols)) => Selection::Rows(self.block(rows, cols)?),
        })
    }

    /// Select with a single expression: an index picks one row, a slice
    /// picks rows.
    ///
    /// # Errors
    ///
    /// As [`select`](Self::select).
    pub fn index(&self, pos: impl Into<Axis>) -> Result<Selection<'_, S>, GridError> {
        self.select(pos, SliceSpec::FULL)
    }

    /// Every cell of row `y`.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] for a bad `y`.
    pub fn row(&self, y: isize) -> Result<CellIter<'_, S>, GridError> {
        self.row_slice(y, SliceSpec::FULL)
    }

    /// Every cell of column `x`, top to bottom.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] for a bad `x`.
    pub fn column(&self, x: isize) -> Result<CellIter<'_, S>, GridError> {
        self.column_slice(SliceSpec::FULL, x)
    }

    /// Full rows selected by `rows`.
    ///
    /// # Errors
    ///
    /// [`GridError::ZeroStep`] for a zero step.
    pub fn rows(&self, rows: impl Into<SliceSpec>) -> Result<RowIter<'_, S>, GridError> {
        self.block(rows.into(), SliceSpec::FULL)
    }

    /// All rows, each yielding all cells.
    #[must_use]
    pub fn cells(&self) -> RowIter<'_, S> {
        RowIter {
            grid: self,
            rows: full(self.height),
            cols: full(self.width),
        }
    }

    /// Borrow the store.
    ///
    /// # Panics
    ///
    /// Panics if a cell view is writing at the same moment (the grid is
    /// single-threaded, so this only happens re-entrantly).
    #[must_use]
    pub fn store(&self) -> Ref<'_, S> {
        self.store.borrow()
    }

    /// Exclusive access to the store. No views can be alive.
    pub fn store_mut(&mut self) -> &mut S {
        self.store.get_mut()
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store.into_inner()
    }

    pub(crate) fn store_cell(&self) -> &RefCell<S> {
        &self.store
    }

    fn row_slice(&self, y: isize, cols: SliceSpec) -> Result<CellIter<'_, S>, GridError> {
        let y = normalize("y", y, self.height)?;
        Ok(CellIter {
            grid: self,
            line: Line::Row(y),
            positions: cols.resolve(self.width)?,
        })
    }

    fn column_slice(&self, rows: SliceSpec, x: isize) -> Result<CellIter<'_, S>, GridError> {
        let x = normalize("x", x, self.width)?;
        Ok(CellIter {
            grid: self,
            line: Line::Column(x),
            positions: rows.resolve(self.height)?,
        })
    }

    fn block(&self, rows: SliceSpec, cols: SliceSpec) -> Result<RowIter<'_, S>, GridError> {
        Ok(RowIter {
            grid: self,
            rows: rows.resolve(self.height)?,
            cols: cols.resolve(self.width)?,
        })
    }
}

fn full(len: u16) -> Positions {
    // A unit step never fails to resolve.
    match SliceSpec::FULL.resolve(len) {
        Ok(positions) => positions,
        Err(_) => unreachable!("unit step"),
    }
}

/// Result of [`PixelGrid::select`].
pub enum Selection<'g, S> {
    Cell(CellView<'g, S>),
    Cells(CellIter<'g, S>),
    Rows(RowIter<'g, S>),
}

impl<'g, S> Selection<'g, S> {
    #[must_use]
    pub fn cell(self) -> Option<CellView<'g, S>> {
        match self {
            Self::Cell(view) => Some(view),
            _ => None,
        }
    }

    #[must_use]
    pub fn cells(self) -> Option<CellIter<'g, S>> {
        match self {
            Self::Cells(iter) => Some(iter),
            _ => None,
        }
    }

    #[must_use]
    pub fn rows(self) -> Option<RowIter<'g, S>> {
        match self {
            Self::Rows(iter) => Some(iter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Line {
    Row(u16),
    Column(u16),
}

/// Lazy views along one row or column.
pub struct CellIter<'g, S> {
    grid: &'g PixelGrid<S>,
    line: Line,
    positions: Positions,
}

impl<'g, S: CellStore> Iterator for CellIter<'g, S> {
    type Item = CellView<'g, S>;

    fn next(&mut self) -> Option<Self::Item> {
        let p = self.positions.next()?;
        Some(match self.line {
            Line::Row(y) => CellView::from_parts(self.grid, p, y),
            Line::Column(x) => CellView::from_parts(self.grid, x, p),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

/// Lazy rows, each a [`CellIter`] over the selected columns.
pub struct RowIter<'g, S> {
    grid: &'g PixelGrid<S>,
    rows: Positions,
    cols: Positions,
}

impl<'g, S: CellStore> Iterator for RowIter<'g, S> {
    type Item = CellIter<'g, S>;

    fn next(&mut self) -> Option<Self::Item> {
        let y = self.rows.next()?;
        Some(CellIter {
            grid: self.grid,
            line: Line::Row(y),
            positions: self.cols.clone(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CanvasBuffer;
    use termpix_core::resolve::ColorModel;

    fn grid(w: u16, h: u16) -> PixelGrid<CanvasBuffer> {
        PixelGrid::new(CanvasBuffer::new(w, h, ColorModel::Truecolor)).unwrap()
    }

    fn coords<S: CellStore>(iter: CellIter<'_, S>) -> Vec<(u16, u16)> {
        iter.map(|v| (v.y(), v.x())).collect()
    }

    #[test]
    fn normalize_wraps_and_rejects() {
        assert_eq!(normalize("x", -1, 10), Ok(9));
        assert_eq!(normalize("x", -10, 10), Ok(0));
        assert_eq!(normalize("x", 9, 10), Ok(9));
        assert!(normalize("x", 10, 10).is_err());
        assert!(normalize("x", -11, 10).is_err());
    }

    #[test]
    fn two_indices_give_one_cell() {
        let g = grid(10, 10);
        let view = g.select(2, 3).unwrap().cell().unwrap();
        assert_eq!((view.y(), view.x()), (2, 3));
    }

    #[test]
    fn bare_index_is_full_row() {
        let g = grid(4, 3);
        let cells = g.index(1).unwrap().cells().unwrap();
        assert_eq!(coords(cells), [(1, 0), (1, 1), (1, 2), (1, 3)]);
    }

    #[test]
    fn bare_slice_is_rows_of_full_rows() {
        let g = grid(3, 5);
        let rows: Vec<_> = g
            .index(1..3)
            .unwrap()
            .rows()
            .unwrap()
            .map(coords)
            .collect();
        assert_eq!(rows, [vec![(1, 0), (1, 1), (1, 2)], vec![(2, 0), (2, 1), (2, 2)]]);
    }

    #[test]
    fn slice_then_index_is_a_column() {
        let g = grid(4, 4);
        let cells = g.select(.., 2).unwrap().cells().unwrap();
        assert_eq!(coords(cells), [(0, 2), (1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn fixed_coordinate_checked_eagerly() {
        let g = grid(4, 4);
        assert!(matches!(
            g.select(4, ..),
            Err(GridError::OutOfBounds { axis: "y", .. })
        ));
        assert!(matches!(
            g.select(.., -5),
            Err(GridError::OutOfBounds { axis: "x", .. })
        ));
    }

    #[test]
    fn zero_step_rejected_at_select() {
        let g = grid(4, 4);
        assert!(matches!(
            g.select(0, SliceSpec::FULL.with_step(0)),
            Err(GridError::ZeroStep)
        ));
    }

    #[test]
    fn empty_store_is_rejected() {
        struct Nothing;
        impl CellStore for Nothing {
            fn width(&self) -> u16 {
                0
            }
            fn height(&self) -> u16 {
                3
            }
            fn char_at(&self, _: u16, _: u16) -> char {
                ' '
            }
            fn set_char_at(&mut self, _: u16, _: u16, _: char) {}
            fn colors_at(&self, _: u16, _: u16) -> (crate::PackedColor, crate::PackedColor) {
                (crate::PackedColor::TRANSPARENT, crate::PackedColor::TRANSPARENT)
            }
            fn set_colors_at(&mut self, _: u16, _: u16, _: crate::PackedColor, _: crate::PackedColor) {}
            fn raw_colors_at(&self, _: u16, _: u16) -> (crate::PackedColor, crate::PackedColor) {
                (crate::PackedColor::TRANSPARENT, crate::PackedColor::TRANSPARENT)
            }
            fn set_raw_colors_at(
                &mut self,
                _: u16,
                _: u16,
                _: crate::PackedColor,
                _: crate::PackedColor,
            ) {
            }
        }
        assert!(matches!(PixelGrid::new(Nothing), Err(GridError::EmptyGrid)));
    }

    #[test]
    fn cells_visits_everything_once() {
        let g = grid(3, 2);
        let count: usize = g.cells().map(Iterator::count).sum();
        assert_eq!(count, 6);
    }

    #[test]
    fn iterators_are_lazy_and_reselectable() {
        let g = grid(5, 1);
        let mut first = g.row(0).unwrap();
        first.next();
        assert_eq!(first.count(), 4);
        assert_eq!(g.row(0).unwrap().count(), 5);
    }
}
