#![forbid(unsafe_code)]

//! Cell storage behind a [`PixelGrid`](crate::grid::PixelGrid).
//!
//! [`CellStore`] is the storage contract: per-cell glyph access plus *pair*
//! color updates. Colors are always written as a foreground/background pair;
//! updating one means reading the other first. Two pairs of accessors exist:
//!
//! - `colors_at` / `set_colors_at` speak packed RGB. Stores that keep palette
//!   pens translate on the way in and out.
//! - `raw_colors_at` / `set_raw_colors_at` expose whatever the slot holds,
//!   untranslated.
//!
//! [`CellStore::color_to_slot`] translates a single color the way
//! `set_colors_at` would, so one side of a pair can be replaced while the
//! other side's raw slot is written back untouched.
//!
//! [`CanvasBuffer`] is the in-memory implementation: a row-major `Vec<Cell>`.

use termpix_core::resolve::ColorModel;
use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, WIDE_CONTINUATION};
use crate::color::PackedColor;
use crate::palette;

/// Storage contract for a fixed-size cell grid.
///
/// Coordinates passed by [`PixelGrid`](crate::grid::PixelGrid) are always in
/// bounds. Implementations should ignore out-of-bounds writes and read
/// out-of-bounds cells as [`Cell::BLANK`].
pub trait CellStore {
    fn width(&self) -> u16;

    fn height(&self) -> u16;

    fn char_at(&self, x: u16, y: u16) -> char;

    fn set_char_at(&mut self, x: u16, y: u16, ch: char);

    /// Foreground and background as packed RGB (or transparent).
    fn colors_at(&self, x: u16, y: u16) -> (PackedColor, PackedColor);

    /// Set both colors from packed RGB (or transparent).
    fn set_colors_at(&mut self, x: u16, y: u16, fg: PackedColor, bg: PackedColor);

    /// Foreground and background exactly as stored.
    fn raw_colors_at(&self, x: u16, y: u16) -> (PackedColor, PackedColor);

    /// Set both slots without translation.
    fn set_raw_colors_at(&mut self, x: u16, y: u16, fg: PackedColor, bg: PackedColor);

    /// The slot value `set_colors_at` stores for `color`.
    fn color_to_slot(&self, color: PackedColor) -> PackedColor {
        color
    }
}

/// In-memory cell grid for one color model.
///
/// In indexed models (`Indexed256`, `Indexed240`, `Indexed16`) slots hold
/// palette pens: RGB writes pick the nearest pen the model allows and RGB
/// reads return the pen's xterm color. Other models store packed RGB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasBuffer {
    width: u16,
    height: u16,
    color_model: ColorModel,
    cells: Vec<Cell>,
}

impl CanvasBuffer {
    /// A blank buffer.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is 0.
    #[must_use]
    pub fn new(width: u16, height: u16, color_model: ColorModel) -> Self {
        assert!(width > 0, "buffer width must be > 0");
        assert!(height > 0, "buffer height must be > 0");
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            color_model,
            cells: vec![Cell::BLANK; size],
        }
    }

    #[must_use]
    pub const fn color_model(&self) -> ColorModel {
        self.color_model
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One row of cells.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        Some(&self.cells[start..start + self.width as usize])
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Reset every cell to [`Cell::BLANK`].
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    fn to_slot(&self, color: PackedColor) -> PackedColor {
        match (palette::pen_range(self.color_model), color.unpack()) {
            (Some(pens), Some(rgb)) => PackedColor::pen(palette::nearest_pen(rgb, pens)),
            _ => color,
        }
    }

    fn from_slot(&self, slot: PackedColor) -> PackedColor {
        if self.color_model.is_indexed() {
            if let Some(pen) = slot.as_pen() {
                return PackedColor::pack(palette::pen_to_rgb(pen));
            }
        }
        slot
    }
}

impl CellStore for CanvasBuffer {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn char_at(&self, x: u16, y: u16) -> char {
        self.get(x, y).map_or(Cell::BLANK.ch, |cell| cell.ch)
    }

    /// Double-width glyphs also overwrite the next cell with
    /// [`WIDE_CONTINUATION`] when it is on the same row.
    fn set_char_at(&mut self, x: u16, y: u16, ch: char) {
        let Some(cell) = self.get_mut(x, y) else {
            return;
        };
        cell.ch = ch;
        if ch.width() == Some(2) {
            if let Some(next) = x.checked_add(1).and_then(|nx| self.get_mut(nx, y)) {
                next.ch = WIDE_CONTINUATION;
            }
        }
    }

    fn colors_at(&self, x: u16, y: u16) -> (PackedColor, PackedColor) {
        let (fg, bg) = self.raw_colors_at(x, y);
        (self.from_slot(fg), self.from_slot(bg))
    }

    fn set_colors_at(&mut self, x: u16, y: u16, fg: PackedColor, bg: PackedColor) {
        let (fg, bg) = (self.to_slot(fg), self.to_slot(bg));
        self.set_raw_colors_at(x, y, fg, bg);
    }

    fn color_to_slot(&self, color: PackedColor) -> PackedColor {
        self.to_slot(color)
    }

    fn raw_colors_at(&self, x: u16, y: u16) -> (PackedColor, PackedColor) {
        self.get(x, y)
            .map_or((Cell::BLANK.fg, Cell::BLANK.bg), |cell| (cell.fg, cell.bg))
    }

    fn set_raw_colors_at(&mut self, x: u16, y: u16, fg: PackedColor, bg: PackedColor) {
        if let Some(cell) = self.get_mut(x, y) {
            cell.fg = fg;
            cell.bg = bg;
        }
    }
}
