#![forbid(unsafe_code)]

//! Read/write cursor onto one grid cell.
//!
//! A [`CellView`] is a position plus a shared reference to its grid. Every
//! accessor goes through the grid's store, so views never go stale and any
//! number of them may coexist.
//!
//! Colors are updated as a pair: setting the foreground reads the current
//! background slot and writes it back unchanged next to the new foreground.
//! In indexed models that keeps the counterpart's exact pen. The
//! read-then-write is not atomic with respect to other writers of the same
//! cell.

use std::fmt;

use crate::color::{ColorError, PackedColor, Rgb};
use crate::grid::{GridError, PixelGrid, normalize};
use crate::store::CellStore;

pub struct CellView<'g, S> {
    grid: &'g PixelGrid<S>,
    x: u16,
    y: u16,
}

impl<S> Clone for CellView<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for CellView<'_, S> {}

impl<S> fmt::Debug for CellView<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellView")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish_non_exhaustive()
    }
}

impl<'g, S: CellStore> CellView<'g, S> {
    /// View the cell at column `x`, row `y`. Negative values count from the
    /// far edge.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] if either coordinate is outside `-dim..dim`.
    pub fn new(grid: &'g PixelGrid<S>, x: isize, y: isize) -> Result<Self, GridError> {
        let x = normalize("x", x, grid.width())?;
        let y = normalize("y", y, grid.height())?;
        Ok(Self::from_parts(grid, x, y))
    }

    /// Coordinates already known to be in bounds.
    pub(crate) fn from_parts(grid: &'g PixelGrid<S>, x: u16, y: u16) -> Self {
        debug_assert!(x < grid.width() && y < grid.height());
        Self { grid, x, y }
    }

    #[inline]
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.x
    }

    #[inline]
    #[must_use]
    pub const fn y(&self) -> u16 {
        self.y
    }

    /// Move to another column. The view is unchanged on error.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`].
    pub fn set_x(&mut self, x: isize) -> Result<(), GridError> {
        self.x = normalize("x", x, self.grid.width())?;
        Ok(())
    }

    /// Move to another row. The view is unchanged on error.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`].
    pub fn set_y(&mut self, y: isize) -> Result<(), GridError> {
        self.y = normalize("y", y, self.grid.height())?;
        Ok(())
    }

    #[must_use]
    pub fn char(&self) -> char {
        self.grid.store_cell().borrow().char_at(self.x, self.y)
    }

    pub fn set_char(&self, ch: char) {
        self.grid
            .store_cell()
            .borrow_mut()
            .set_char_at(self.x, self.y, ch);
    }

    /// Foreground as RGB, `None` when transparent.
    #[must_use]
    pub fn fg_color(&self) -> Option<Rgb> {
        self.colors().0.unpack()
    }

    /// Background as RGB, `None` when transparent.
    #[must_use]
    pub fn bg_color(&self) -> Option<Rgb> {
        self.colors().1.unpack()
    }

    /// Set the foreground, keeping the background. `None` is
    /// [`remove_foreground`](Self::remove_foreground).
    pub fn set_fg_color(&self, color: impl Into<Option<Rgb>>) {
        match color.into() {
            Some(rgb) => {
                let mut store = self.grid.store_cell().borrow_mut();
                let (_, bg) = store.raw_colors_at(self.x, self.y);
                let fg = store.color_to_slot(PackedColor::pack(rgb));
                store.set_raw_colors_at(self.x, self.y, fg, bg);
            }
            None => self.remove_foreground(),
        }
    }

    /// Set the background, keeping the foreground. `None` is
    /// [`remove_background`](Self::remove_background).
    pub fn set_bg_color(&self, color: impl Into<Option<Rgb>>) {
        match color.into() {
            Some(rgb) => {
                let mut store = self.grid.store_cell().borrow_mut();
                let (fg, _) = store.raw_colors_at(self.x, self.y);
                let bg = store.color_to_slot(PackedColor::pack(rgb));
                store.set_raw_colors_at(self.x, self.y, fg, bg);
            }
            None => self.remove_background(),
        }
    }

    /// Set the foreground from an unvalidated channel list.
    ///
    /// # Errors
    ///
    /// [`ColorError`] if `channels` is not three values in `0..=255`. The cell
    /// is untouched on error.
    pub fn set_fg_channels(&self, channels: &[i64]) -> Result<(), ColorError> {
        let rgb = Rgb::from_channels(channels)?;
        self.set_fg_color(rgb);
        Ok(())
    }

    /// Background counterpart of [`set_fg_channels`](Self::set_fg_channels).
    ///
    /// # Errors
    ///
    /// As [`set_fg_channels`](Self::set_fg_channels).
    pub fn set_bg_channels(&self, channels: &[i64]) -> Result<(), ColorError> {
        let rgb = Rgb::from_channels(channels)?;
        self.set_bg_color(rgb);
        Ok(())
    }

    /// Foreground slot exactly as stored (`-1`, packed RGB, or a pen).
    #[must_use]
    pub fn raw_fg_color(&self) -> i32 {
        self.raw_colors().0.raw()
    }

    #[must_use]
    pub fn raw_bg_color(&self) -> i32 {
        self.raw_colors().1.raw()
    }

    /// # Errors
    ///
    /// [`ColorError::RawRange`] outside `-1..=0xFFFFFF`.
    pub fn set_raw_fg_color(&self, raw: i64) -> Result<(), ColorError> {
        let fg = PackedColor::from_raw(raw)?;
        let (_, bg) = self.raw_colors();
        self.set_raw_colors(fg, bg);
        Ok(())
    }

    /// # Errors
    ///
    /// [`ColorError::RawRange`] outside `-1..=0xFFFFFF`.
    pub fn set_raw_bg_color(&self, raw: i64) -> Result<(), ColorError> {
        let bg = PackedColor::from_raw(raw)?;
        let (fg, _) = self.raw_colors();
        self.set_raw_colors(fg, bg);
        Ok(())
    }

    /// Make the foreground transparent. The background slot is rewritten
    /// with its current raw value.
    pub fn remove_foreground(&self) {
        let (_, bg) = self.raw_colors();
        self.set_raw_colors(PackedColor::TRANSPARENT, bg);
    }

    pub fn remove_background(&self) {
        let (fg, _) = self.raw_colors();
        self.set_raw_colors(fg, PackedColor::TRANSPARENT);
    }

    fn colors(&self) -> (PackedColor, PackedColor) {
        self.grid.store_cell().borrow().colors_at(self.x, self.y)
    }

    fn raw_colors(&self) -> (PackedColor, PackedColor) {
        self.grid.store_cell().borrow().raw_colors_at(self.x, self.y)
    }

    fn set_raw_colors(&self, fg: PackedColor, bg: PackedColor) {
        self.grid
            .store_cell()
            .borrow_mut()
            .set_raw_colors_at(self.x, self.y, fg, bg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CanvasBuffer;
    use termpix_core::resolve::ColorModel;

    fn grid(model: ColorModel) -> PixelGrid<CanvasBuffer> {
        PixelGrid::new(CanvasBuffer::new(10, 10, model)).unwrap()
    }

    #[test]
    fn construction_wraps_negative_coordinates() {
        let g = grid(ColorModel::Truecolor);
        let v = CellView::new(&g, -1, -1).unwrap();
        assert_eq!((v.x(), v.y()), (9, 9));
        assert!(CellView::new(&g, 10, 0).is_err());
        assert!(CellView::new(&g, 0, -11).is_err());
    }

    #[test]
    fn moving_keeps_position_on_error() {
        let g = grid(ColorModel::Truecolor);
        let mut v = CellView::new(&g, 2, 3).unwrap();
        assert!(v.set_x(10).is_err());
        assert_eq!(v.x(), 2);
        v.set_y(-2).unwrap();
        assert_eq!(v.y(), 8);
    }

    #[test]
    fn removing_foreground_keeps_background() {
        let g = grid(ColorModel::Truecolor);
        let v = g.at(0, 0).unwrap();
        v.set_fg_color(Rgb::new(255, 0, 0));
        v.set_bg_color(Rgb::new(0, 0, 255));
        v.set_fg_color(None);
        assert_eq!(v.fg_color(), None);
        assert_eq!(v.bg_color(), Some(Rgb::new(0, 0, 255)));
    }

    #[test]
    fn pair_update_preserves_counterpart() {
        let g = grid(ColorModel::Truecolor);
        let v = g.at(4, 4).unwrap();
        v.set_bg_color(Rgb::new(1, 2, 3));
        v.set_fg_color(Rgb::new(9, 8, 7));
        assert_eq!(v.bg_color(), Some(Rgb::new(1, 2, 3)));
        v.set_bg_color(Rgb::new(4, 5, 6));
        assert_eq!(v.fg_color(), Some(Rgb::new(9, 8, 7)));
    }

    #[test]
    fn bad_channels_leave_cell_untouched() {
        let g = grid(ColorModel::Truecolor);
        let v = g.at(0, 0).unwrap();
        v.set_fg_channels(&[10, 20, 30]).unwrap();
        assert!(v.set_fg_channels(&[10, 20]).is_err());
        assert!(v.set_fg_channels(&[10, 20, 300]).is_err());
        assert_eq!(v.fg_color(), Some(Rgb::new(10, 20, 30)));
    }

    #[test]
    fn raw_accessors_validate_range() {
        let g = grid(ColorModel::Truecolor);
        let v = g.at(1, 1).unwrap();
        v.set_raw_fg_color(0x123456).unwrap();
        assert_eq!(v.raw_fg_color(), 0x123456);
        assert_eq!(v.fg_color(), Some(Rgb::new(0x12, 0x34, 0x56)));
        assert!(v.set_raw_fg_color(0x1000000).is_err());
        assert!(v.set_raw_bg_color(-2).is_err());
        assert_eq!(v.raw_bg_color(), -1);
    }

    #[test]
    fn views_share_the_cell() {
        let g = grid(ColorModel::Truecolor);
        let a = g.at(3, 3).unwrap();
        let b = g.at(-7, -7).unwrap();
        a.set_char('x');
        assert_eq!(b.char(), 'x');
    }

    #[test]
    fn indexed_pair_update_keeps_counterpart_pen() {
        let g = grid(ColorModel::Indexed256);
        let v = g.at(2, 2).unwrap();
        // 196 and 9 share an RGB value; the stored pen must survive.
        v.set_raw_bg_color(196).unwrap();
        v.set_fg_color(Rgb::new(0, 0, 255));
        assert_eq!(v.raw_bg_color(), 196);
        assert_eq!(v.raw_fg_color(), 21);

        v.set_raw_fg_color(231).unwrap();
        v.set_bg_color(Rgb::new(0, 0, 0));
        assert_eq!(v.raw_fg_color(), 231);
        assert_eq!(v.raw_bg_color(), 0);
    }

    #[test]
    fn indexed_model_reads_palette_colors() {
        let g = grid(ColorModel::Indexed256);
        let v = g.at(0, 0).unwrap();
        v.set_fg_color(Rgb::new(255, 0, 0));
        assert_eq!(v.raw_fg_color(), 9);
        assert_eq!(v.fg_color(), Some(Rgb::new(255, 0, 0)));
    }
}
