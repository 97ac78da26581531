#![forbid(unsafe_code)]

//! One character cell: a glyph and its two color slots.

use crate::color::PackedColor;

/// Glyph stored in the cell to the right of a double-width glyph.
pub const WIDE_CONTINUATION: char = '\0';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: PackedColor,
    pub bg: PackedColor,
}

impl Cell {
    /// A space with both colors transparent.
    pub const BLANK: Self = Self {
        ch: ' ',
        fg: PackedColor::TRANSPARENT,
        bg: PackedColor::TRANSPARENT,
    };

    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            fg: PackedColor::TRANSPARENT,
            bg: PackedColor::TRANSPARENT,
        }
    }

    #[must_use]
    pub const fn with_fg(mut self, fg: PackedColor) -> Self {
        self.fg = fg;
        self
    }

    #[must_use]
    pub const fn with_bg(mut self, bg: PackedColor) -> Self {
        self.bg = bg;
        self
    }

    /// Whether this cell is covered by the glyph to its left.
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.ch == WIDE_CONTINUATION
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}
