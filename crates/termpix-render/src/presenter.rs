#![forbid(unsafe_code)]

//! Row printer: cells to terminal bytes.
//!
//! Each row is printed left to right. Before a cell whose colors differ from
//! the previous cell's, the printer resets attributes (when any are active)
//! and emits the color sequence the profile's color model calls for:
//!
//! | Model | Sequences |
//! |-------|-----------|
//! | `Truecolor` | `SetColor{Fgbg,Fg,Bg}Direct` |
//! | `Indexed256`, `Indexed240` | `SetColor{Fgbg,Fg,Bg}256` |
//! | `Indexed16` | `SetColor{Fgbg,Fg,Bg}16` |
//! | `FgBgBgFg` | `InvertColors` for cells with a background |
//! | `FgBg` | none |
//!
//! Every row ends with `ResetAttributes`. Rows are joined with `\n`; the last
//! row has no trailing newline. Continuation cells of wide glyphs print
//! nothing.

use std::borrow::Cow;

use termpix_core::resolve::ColorModel;
use termpix_core::sequences::{EncodeError, TermInfo, TermSeq};
use termpix_core::term_db::{DetectInputs, TermDb};

use crate::cell::WIDE_CONTINUATION;
use crate::color::{PackedColor, Rgb};
use crate::grid::PixelGrid;
use crate::palette;
use crate::store::CellStore;

/// Attribute state a cell needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attrs {
    Plain,
    Direct {
        fg: Option<Rgb>,
        bg: Option<Rgb>,
    },
    Pens {
        fg: Option<u8>,
        bg: Option<u8>,
    },
    Inverted,
}

impl Attrs {
    fn for_cell(model: ColorModel, fg: PackedColor, bg: PackedColor) -> Self {
        let state = match model {
            ColorModel::Truecolor => Self::Direct {
                fg: fg.unpack(),
                bg: bg.unpack(),
            },
            ColorModel::Indexed256 | ColorModel::Indexed240 | ColorModel::Indexed16 => {
                Self::Pens {
                    fg: slot_pen(model, fg),
                    bg: slot_pen(model, bg),
                }
            }
            ColorModel::FgBgBgFg if !bg.is_transparent() => Self::Inverted,
            ColorModel::FgBgBgFg | ColorModel::FgBg => Self::Plain,
        };
        match state {
            Self::Direct { fg: None, bg: None } | Self::Pens { fg: None, bg: None } => Self::Plain,
            other => other,
        }
    }
}

/// A raw slot as a pen the model can print. Slots holding packed RGB (or a
/// pen outside the model's range) are mapped to the nearest allowed pen.
fn slot_pen(model: ColorModel, slot: PackedColor) -> Option<u8> {
    if slot.is_transparent() {
        return None;
    }
    let pens = palette::pen_range(model)?;
    match slot.as_pen() {
        Some(pen) if pens.contains(&pen) => Some(pen),
        Some(pen) => Some(palette::nearest_pen(palette::pen_to_rgb(pen), pens)),
        None => slot
            .unpack()
            .map(|rgb| palette::nearest_pen(rgb, pens)),
    }
}

fn put(info: &TermInfo, seq: TermSeq, args: &[u32], out: &mut Vec<u8>) -> Result<(), EncodeError> {
    info.template(seq)
        .ok_or(EncodeError::Unsupported { seq })?
        .render_into(seq, args, out)
}

fn rgb_args(rgb: Rgb) -> [u32; 3] {
    [u32::from(rgb.r), u32::from(rgb.g), u32::from(rgb.b)]
}

fn emit_attrs(
    info: &TermInfo,
    model: ColorModel,
    attrs: Attrs,
    out: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    let sixteen = model == ColorModel::Indexed16;
    match attrs {
        Attrs::Plain => Ok(()),
        Attrs::Inverted => put(info, TermSeq::InvertColors, &[], out),
        Attrs::Direct {
            fg: Some(fg),
            bg: Some(bg),
        } => {
            let [r1, g1, b1] = rgb_args(fg);
            let [r2, g2, b2] = rgb_args(bg);
            put(info, TermSeq::SetColorFgbgDirect, &[r1, g1, b1, r2, g2, b2], out)
        }
        Attrs::Direct { fg: Some(fg), .. } => {
            put(info, TermSeq::SetColorFgDirect, &rgb_args(fg), out)
        }
        Attrs::Direct { bg: Some(bg), .. } => {
            put(info, TermSeq::SetColorBgDirect, &rgb_args(bg), out)
        }
        Attrs::Pens {
            fg: Some(fg),
            bg: Some(bg),
        } => {
            let seq = if sixteen {
                TermSeq::SetColorFgbg16
            } else {
                TermSeq::SetColorFgbg256
            };
            put(info, seq, &[u32::from(fg), u32::from(bg)], out)
        }
        Attrs::Pens { fg: Some(fg), .. } => {
            let seq = if sixteen {
                TermSeq::SetColorFg16
            } else {
                TermSeq::SetColorFg256
            };
            put(info, seq, &[u32::from(fg)], out)
        }
        Attrs::Pens { bg: Some(bg), .. } => {
            let seq = if sixteen {
                TermSeq::SetColorBg16
            } else {
                TermSeq::SetColorBg256
            };
            put(info, seq, &[u32::from(bg)], out)
        }
        Attrs::Direct { .. } | Attrs::Pens { .. } => Ok(()),
    }
}

/// Append row `y` of `store` to `out`, without a trailing newline.
///
/// # Errors
///
/// [`EncodeError::Unsupported`] if `info` lacks a sequence the row needs.
/// `out` may hold a partial row on error.
pub fn print_row<S: CellStore + ?Sized>(
    store: &S,
    y: u16,
    model: ColorModel,
    info: &TermInfo,
    out: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    let mut current = Attrs::Plain;
    let mut utf8 = [0u8; 4];
    for x in 0..store.width() {
        let ch = store.char_at(x, y);
        if ch == WIDE_CONTINUATION {
            continue;
        }
        let (fg, bg) = store.raw_colors_at(x, y);
        let wanted = Attrs::for_cell(model, fg, bg);
        if wanted != current {
            if current != Attrs::Plain {
                put(info, TermSeq::ResetAttributes, &[], out)?;
            }
            emit_attrs(info, model, wanted, out)?;
            current = wanted;
        }
        out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    }
    put(info, TermSeq::ResetAttributes, &[], out)
}

/// `info`, or a copy with gaps filled from the fallback table.
pub(crate) fn effective_info(info: Cow<'_, TermInfo>, fallback: bool) -> Cow<'_, TermInfo> {
    if !fallback {
        return info;
    }
    let mut merged = info.into_owned();
    let _added = merged.supplement(&TermDb::builtin().fallback_info());
    #[cfg(feature = "tracing")]
    tracing::debug!(term = merged.name(), added = _added, "supplemented print table");
    Cow::Owned(merged)
}

/// Lazy per-row output of a grid. Yields one `Vec<u8>` per row and stops
/// after the first error.
pub struct PrintRows<'g, 't, S> {
    grid: &'g PixelGrid<S>,
    info: Cow<'t, TermInfo>,
    model: ColorModel,
    next_row: u16,
}

impl<'g, 't, S: CellStore> PrintRows<'g, 't, S> {
    /// Without an explicit `info`, the table is detected from the process
    /// environment with [`TermDb::detect`].
    #[must_use]
    pub fn new(
        grid: &'g PixelGrid<S>,
        model: ColorModel,
        info: Option<&'t TermInfo>,
        fallback: bool,
    ) -> Self {
        let info = match info {
            Some(info) => Cow::Borrowed(info),
            None => Cow::Owned(TermDb::builtin().detect(&DetectInputs::from_env())),
        };
        Self {
            grid,
            info: effective_info(info, fallback),
            model,
            next_row: 0,
        }
    }

    /// Collect all rows joined with `\n`.
    ///
    /// # Errors
    ///
    /// The first row's [`EncodeError`].
    pub fn join(self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        for (i, row) in self.enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            out.extend_from_slice(&row?);
        }
        Ok(out)
    }
}

impl<S: CellStore> Iterator for PrintRows<'_, '_, S> {
    type Item = Result<Vec<u8>, EncodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let height = self.grid.height();
        if self.next_row >= height {
            return None;
        }
        let y = self.next_row;
        let mut out = Vec::with_capacity(self.grid.width() as usize * 4);
        let result = print_row(&*self.grid.store(), y, self.model, &self.info, &mut out);
        self.next_row = if result.is_ok() { y + 1 } else { height };
        Some(result.map(|()| out))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.grid.height() - self.next_row) as usize;
        (0, Some(left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CanvasBuffer;

    fn store(model: ColorModel) -> CanvasBuffer {
        CanvasBuffer::new(3, 1, model)
    }

    fn xterm_direct() -> TermInfo {
        TermDb::builtin()
            .lookup("xterm-direct")
            .unwrap_or_else(|| TermDb::builtin().fallback_info())
    }

    fn row(buf: &CanvasBuffer, model: ColorModel, info: &TermInfo) -> String {
        let mut out = Vec::new();
        print_row(buf, 0, model, info, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn blank_row_is_spaces_then_reset() {
        let buf = store(ColorModel::Truecolor);
        assert_eq!(row(&buf, ColorModel::Truecolor, &xterm_direct()), "   \x1b[0m");
    }

    #[test]
    fn truecolor_pairs_and_runs() {
        let mut buf = store(ColorModel::Truecolor);
        let red = PackedColor::pack(Rgb::new(255, 0, 0));
        let blue = PackedColor::pack(Rgb::new(0, 0, 255));
        buf.set_colors_at(0, 0, red, blue);
        buf.set_colors_at(1, 0, red, blue);
        buf.set_colors_at(2, 0, red, PackedColor::TRANSPARENT);
        assert_eq!(
            row(&buf, ColorModel::Truecolor, &xterm_direct()),
            "\x1b[38;2;255;0;0;48;2;0;0;255m  \x1b[0m\x1b[38;2;255;0;0m \x1b[0m"
        );
    }

    #[test]
    fn indexed_uses_pens() {
        let mut buf = store(ColorModel::Indexed240);
        buf.set_colors_at(0, 0, PackedColor::TRANSPARENT, PackedColor::pack(Rgb::new(255, 0, 0)));
        assert_eq!(
            row(&buf, ColorModel::Indexed240, &xterm_direct()),
            "\x1b[48;5;196m \x1b[0m  \x1b[0m"
        );
    }

    #[test]
    fn sixteen_colors_use_sgr_offsets() {
        let mut buf = store(ColorModel::Indexed16);
        buf.set_raw_colors_at(0, 0, PackedColor::pen(9), PackedColor::pen(4));
        let out = row(&buf, ColorModel::Indexed16, &xterm_direct());
        assert!(out.starts_with("\x1b[91;44m "), "{out:?}");
    }

    #[test]
    fn fgbg_bgfg_inverts_backgrounds() {
        let mut buf = store(ColorModel::FgBgBgFg);
        buf.set_raw_colors_at(1, 0, PackedColor::TRANSPARENT, PackedColor::pack(Rgb::new(1, 1, 1)));
        assert_eq!(
            row(&buf, ColorModel::FgBgBgFg, &xterm_direct()),
            " \x1b[7m \x1b[0m \x1b[0m"
        );
    }

    #[test]
    fn continuation_cells_print_nothing() {
        let mut buf = store(ColorModel::FgBg);
        buf.set_char_at(0, 0, '漢');
        assert_eq!(row(&buf, ColorModel::FgBg, &xterm_direct()), "漢 \x1b[0m");
    }

    #[test]
    fn missing_sequence_is_an_error() {
        let mut buf = store(ColorModel::Truecolor);
        buf.set_colors_at(0, 0, PackedColor::pack(Rgb::new(1, 2, 3)), PackedColor::TRANSPARENT);
        let info = TermInfo::with_seqs("bare", &[TermSeq::ResetAttributes]);
        let mut out = Vec::new();
        assert_eq!(
            print_row(&buf, 0, ColorModel::Truecolor, &info, &mut out),
            Err(EncodeError::Unsupported {
                seq: TermSeq::SetColorFgDirect
            })
        );
        assert!(effective_info(Cow::Borrowed(&info), true).have_seq(TermSeq::SetColorFgDirect));
        assert!(!effective_info(Cow::Borrowed(&info), false).have_seq(TermSeq::SetColorFgDirect));
    }
}
