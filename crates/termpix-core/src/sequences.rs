#![forbid(unsafe_code)]

//! Terminal control sequences and the per-terminal capability table.
//!
//! A [`TermSeq`] names a class of control sequence. A [`TermInfo`] records which
//! of them a given terminal understands and how each one is spelled, and acts
//! as the [`SequenceCapabilityOracle`] the resolver and the printer query.
//!
//! # Encoding
//!
//! Each sequence is described by a [`SeqTemplate`]: literal byte runs
//! interleaved with numbered argument slots. Arguments are validated (arity,
//! then per-slot range) before any bytes are produced, so a failed
//! [`encode`](SequenceCapabilityOracle::encode) never yields a partial sequence.
//!
//! ```
//! use termpix_core::sequences::{SequenceCapabilityOracle, TermInfo, TermSeq};
//!
//! let info = TermInfo::with_seqs("demo", &[TermSeq::CursorToPos]);
//! // Slots are zero-based on input, one-based on the wire, row first.
//! assert_eq!(info.encode(TermSeq::CursorToPos, &[4, 0]).unwrap(), b"\x1b[1;5H");
//! ```
//!
//! # Supplementing
//!
//! [`TermInfo::supplement`] copies sequences from a fallback table into gaps of
//! this one. Entries already present are never overwritten, even when the
//! fallback spells them differently.

use std::collections::BTreeMap;
use std::fmt;

/// Identifier for a class of terminal control sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TermSeq {
    ResetTerminalSoft,
    ResetTerminalHard,
    ResetAttributes,
    Clear,
    InvertColors,
    EnableBold,
    CursorToTopLeft,
    CursorToBottomLeft,
    /// Args: `x`, `y` (zero-based).
    CursorToPos,
    CursorUp1,
    /// Args: `n`.
    CursorUp,
    CursorDown1,
    /// Args: `n`.
    CursorDown,
    CursorLeft1,
    /// Args: `n`.
    CursorLeft,
    CursorRight1,
    /// Args: `n`.
    CursorRight,
    EnableCursor,
    DisableCursor,
    EnableEcho,
    DisableEcho,
    EnableInsert,
    DisableInsert,
    EnableWrap,
    DisableWrap,
    /// Args: `r`, `g`, `b`.
    SetColorFgDirect,
    /// Args: `r`, `g`, `b`.
    SetColorBgDirect,
    /// Args: fg `r`, `g`, `b`, bg `r`, `g`, `b`.
    SetColorFgbgDirect,
    /// Args: pen `0..=255`.
    SetColorFg256,
    /// Args: pen `0..=255`.
    SetColorBg256,
    /// Args: fg pen, bg pen.
    SetColorFgbg256,
    /// Args: pen `0..=15`.
    SetColorFg16,
    /// Args: pen `0..=15`.
    SetColorBg16,
    /// Args: fg pen, bg pen.
    SetColorFgbg16,
    ResetColorFg,
    ResetColorBg,
    /// Args: repeat count.
    RepeatChar,
    /// Args: aspect (`0..=9`), background mode (`0..=2`), grid size.
    BeginSixels,
    EndSixels,
    EnableSixelScrolling,
    DisableSixelScrolling,
    /// Args: bits per pixel, width, height, columns, rows.
    BeginKittyImmediateImageV1,
    EndKittyImage,
    BeginKittyImageChunk,
    EndKittyImageChunk,
    /// Args: width, height (cells).
    BeginIterm2Image,
    EndIterm2Image,
    BeginTmuxPassthrough,
    EndTmuxPassthrough,
}

impl TermSeq {
    /// Every sequence identifier, in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::ResetTerminalSoft,
        Self::ResetTerminalHard,
        Self::ResetAttributes,
        Self::Clear,
        Self::InvertColors,
        Self::EnableBold,
        Self::CursorToTopLeft,
        Self::CursorToBottomLeft,
        Self::CursorToPos,
        Self::CursorUp1,
        Self::CursorUp,
        Self::CursorDown1,
        Self::CursorDown,
        Self::CursorLeft1,
        Self::CursorLeft,
        Self::CursorRight1,
        Self::CursorRight,
        Self::EnableCursor,
        Self::DisableCursor,
        Self::EnableEcho,
        Self::DisableEcho,
        Self::EnableInsert,
        Self::DisableInsert,
        Self::EnableWrap,
        Self::DisableWrap,
        Self::SetColorFgDirect,
        Self::SetColorBgDirect,
        Self::SetColorFgbgDirect,
        Self::SetColorFg256,
        Self::SetColorBg256,
        Self::SetColorFgbg256,
        Self::SetColorFg16,
        Self::SetColorBg16,
        Self::SetColorFgbg16,
        Self::ResetColorFg,
        Self::ResetColorBg,
        Self::RepeatChar,
        Self::BeginSixels,
        Self::EndSixels,
        Self::EnableSixelScrolling,
        Self::DisableSixelScrolling,
        Self::BeginKittyImmediateImageV1,
        Self::EndKittyImage,
        Self::BeginKittyImageChunk,
        Self::EndKittyImageChunk,
        Self::BeginIterm2Image,
        Self::EndIterm2Image,
        Self::BeginTmuxPassthrough,
        Self::EndTmuxPassthrough,
    ];

    /// The xterm-compatible spelling of this sequence.
    #[must_use]
    pub const fn template(self) -> SeqTemplate {
        use templates as t;
        let pieces = match self {
            Self::ResetTerminalSoft => t::RESET_TERMINAL_SOFT,
            Self::ResetTerminalHard => t::RESET_TERMINAL_HARD,
            Self::ResetAttributes => t::RESET_ATTRIBUTES,
            Self::Clear => t::CLEAR,
            Self::InvertColors => t::INVERT_COLORS,
            Self::EnableBold => t::ENABLE_BOLD,
            Self::CursorToTopLeft => t::CURSOR_TO_TOP_LEFT,
            Self::CursorToBottomLeft => t::CURSOR_TO_BOTTOM_LEFT,
            Self::CursorToPos => t::CURSOR_TO_POS,
            Self::CursorUp1 => t::CURSOR_UP_1,
            Self::CursorUp => t::CURSOR_UP,
            Self::CursorDown1 => t::CURSOR_DOWN_1,
            Self::CursorDown => t::CURSOR_DOWN,
            Self::CursorLeft1 => t::CURSOR_LEFT_1,
            Self::CursorLeft => t::CURSOR_LEFT,
            Self::CursorRight1 => t::CURSOR_RIGHT_1,
            Self::CursorRight => t::CURSOR_RIGHT,
            Self::EnableCursor => t::ENABLE_CURSOR,
            Self::DisableCursor => t::DISABLE_CURSOR,
            Self::EnableEcho => t::ENABLE_ECHO,
            Self::DisableEcho => t::DISABLE_ECHO,
            Self::EnableInsert => t::ENABLE_INSERT,
            Self::DisableInsert => t::DISABLE_INSERT,
            Self::EnableWrap => t::ENABLE_WRAP,
            Self::DisableWrap => t::DISABLE_WRAP,
            Self::SetColorFgDirect => t::FG_DIRECT,
            Self::SetColorBgDirect => t::BG_DIRECT,
            Self::SetColorFgbgDirect => t::FGBG_DIRECT,
            Self::SetColorFg256 => t::FG_256,
            Self::SetColorBg256 => t::BG_256,
            Self::SetColorFgbg256 => t::FGBG_256,
            Self::SetColorFg16 => t::FG_16,
            Self::SetColorBg16 => t::BG_16,
            Self::SetColorFgbg16 => t::FGBG_16,
            Self::ResetColorFg => t::RESET_FG,
            Self::ResetColorBg => t::RESET_BG,
            Self::RepeatChar => t::REPEAT_CHAR,
            Self::BeginSixels => t::BEGIN_SIXELS,
            Self::EndSixels => t::STRING_TERMINATOR,
            Self::EnableSixelScrolling => t::ENABLE_SIXEL_SCROLLING,
            Self::DisableSixelScrolling => t::DISABLE_SIXEL_SCROLLING,
            Self::BeginKittyImmediateImageV1 => t::BEGIN_KITTY_IMMEDIATE_IMAGE_V1,
            Self::EndKittyImage => t::END_KITTY_IMAGE,
            Self::BeginKittyImageChunk => t::BEGIN_KITTY_IMAGE_CHUNK,
            Self::EndKittyImageChunk => t::STRING_TERMINATOR,
            Self::BeginIterm2Image => t::BEGIN_ITERM2_IMAGE,
            Self::EndIterm2Image => t::BEL,
            Self::BeginTmuxPassthrough => t::BEGIN_TMUX_PASSTHROUGH,
            Self::EndTmuxPassthrough => t::STRING_TERMINATOR,
        };
        SeqTemplate::new(pieces)
    }
}

impl fmt::Display for TermSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How an argument value is rendered into the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgFormat {
    /// Plain decimal.
    Decimal,
    /// Decimal of `value + 1` (zero-based input, one-based wire format).
    OneBased,
    /// SGR foreground pen: `30 + n` for `n < 8`, `90 + n - 8` otherwise.
    Fg16,
    /// SGR background pen: `40 + n` for `n < 8`, `100 + n - 8` otherwise.
    Bg16,
}

impl ArgFormat {
    const fn apply(self, value: u32) -> u32 {
        match self {
            Self::Decimal => value,
            Self::OneBased => value + 1,
            Self::Fg16 => {
                if value < 8 {
                    30 + value
                } else {
                    90 + value - 8
                }
            }
            Self::Bg16 => {
                if value < 8 {
                    40 + value
                } else {
                    100 + value - 8
                }
            }
        }
    }
}

/// One element of a [`SeqTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    /// Bytes copied verbatim.
    Lit(&'static str),
    /// Argument slot `slot`, accepting `0..=max`.
    Arg {
        slot: u8,
        format: ArgFormat,
        max: u32,
    },
}

/// Spelling of a control sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqTemplate {
    pieces: &'static [Piece],
}

impl SeqTemplate {
    /// Wrap a static piece list.
    #[must_use]
    pub const fn new(pieces: &'static [Piece]) -> Self {
        Self { pieces }
    }

    /// The template's pieces.
    #[must_use]
    pub const fn pieces(&self) -> &'static [Piece] {
        self.pieces
    }

    /// Number of arguments the template consumes.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.pieces
            .iter()
            .filter_map(|piece| match piece {
                Piece::Arg { slot, .. } => Some(*slot as usize + 1),
                Piece::Lit(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Render the template with `args`, appending to `out`.
    ///
    /// # Errors
    ///
    /// [`EncodeError::Arity`] if `args.len()` differs from [`arity`](Self::arity),
    /// [`EncodeError::ArgumentRange`] if any argument exceeds its slot's maximum.
    /// Nothing is appended on error.
    pub fn render_into(
        &self,
        seq: TermSeq,
        args: &[u32],
        out: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        let expected = self.arity();
        if args.len() != expected {
            return Err(EncodeError::Arity {
                seq,
                expected,
                got: args.len(),
            });
        }
        for piece in self.pieces {
            if let Piece::Arg { slot, max, .. } = *piece {
                let value = args[slot as usize];
                if value > max {
                    return Err(EncodeError::ArgumentRange {
                        seq,
                        slot,
                        value,
                        max,
                    });
                }
            }
        }

        for piece in self.pieces {
            match *piece {
                Piece::Lit(text) => out.extend_from_slice(text.as_bytes()),
                Piece::Arg { slot, format, .. } => {
                    let rendered = format.apply(args[slot as usize]);
                    out.extend_from_slice(rendered.to_string().as_bytes());
                }
            }
        }
        Ok(())
    }
}

/// Errors produced when encoding a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The terminal profile does not define the sequence.
    Unsupported { seq: TermSeq },
    /// Wrong number of arguments.
    Arity {
        seq: TermSeq,
        expected: usize,
        got: usize,
    },
    /// An argument is outside its slot's accepted range.
    ArgumentRange {
        seq: TermSeq,
        slot: u8,
        value: u32,
        max: u32,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported { seq } => {
                write!(f, "terminal does not appear to support sequence {seq}")
            }
            Self::Arity { seq, expected, got } => write!(
                f,
                "sequence {seq} takes {expected} argument(s), got {got}"
            ),
            Self::ArgumentRange {
                seq,
                slot,
                value,
                max,
            } => write!(
                f,
                "argument {slot} of sequence {seq} is {value}, maximum is {max}"
            ),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Query interface over a terminal's sequence table.
pub trait SequenceCapabilityOracle {
    /// Whether the profile can emit `seq`.
    fn has(&self, seq: TermSeq) -> bool;

    /// Render `seq` with `args` to its literal bytes.
    ///
    /// # Errors
    ///
    /// See [`EncodeError`].
    fn encode(&self, seq: TermSeq, args: &[u32]) -> Result<Vec<u8>, EncodeError>;
}

/// Sequence table for one terminal profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermInfo {
    name: String,
    seqs: BTreeMap<TermSeq, SeqTemplate>,
}

impl TermInfo {
    /// A table with no sequences.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seqs: BTreeMap::new(),
        }
    }

    /// A table holding the canonical spelling of each sequence in `seqs`.
    #[must_use]
    pub fn with_seqs(name: impl Into<String>, seqs: &[TermSeq]) -> Self {
        Self::builder(name).seqs(seqs).build()
    }

    /// Start building a table.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TermInfoBuilder {
        TermInfoBuilder {
            info: Self::empty(name),
        }
    }

    /// Profile name (usually the database entry it came from).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of defined sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    /// Whether no sequences are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    /// Whether `seq` is defined. Same as [`SequenceCapabilityOracle::has`].
    #[must_use]
    pub fn have_seq(&self, seq: TermSeq) -> bool {
        self.seqs.contains_key(&seq)
    }

    /// The spelling of `seq`, if defined.
    #[must_use]
    pub fn template(&self, seq: TermSeq) -> Option<SeqTemplate> {
        self.seqs.get(&seq).copied()
    }

    /// Defined sequence identifiers in declaration order.
    pub fn sequences(&self) -> impl Iterator<Item = TermSeq> + '_ {
        self.seqs.keys().copied()
    }

    /// Copy every sequence `source` defines and this table lacks.
    ///
    /// Existing entries always win. Returns the number of sequences added.
    pub fn supplement(&mut self, source: &TermInfo) -> usize {
        let mut added = 0;
        for (&seq, &template) in &source.seqs {
            if let std::collections::btree_map::Entry::Vacant(slot) = self.seqs.entry(seq) {
                slot.insert(template);
                added += 1;
            }
        }
        crate::debug!(
            table = %self.name,
            source = %source.name,
            added,
            "supplemented sequence table"
        );
        added
    }

    /// Encode `seq` with `args`. Same as [`SequenceCapabilityOracle::encode`].
    ///
    /// # Errors
    ///
    /// See [`EncodeError`].
    pub fn emit(&self, seq: TermSeq, args: &[u32]) -> Result<Vec<u8>, EncodeError> {
        let template = self
            .template(seq)
            .ok_or(EncodeError::Unsupported { seq })?;
        let mut out = Vec::with_capacity(16);
        template.render_into(seq, args, &mut out)?;
        Ok(out)
    }
}

impl SequenceCapabilityOracle for TermInfo {
    fn has(&self, seq: TermSeq) -> bool {
        self.have_seq(seq)
    }

    fn encode(&self, seq: TermSeq, args: &[u32]) -> Result<Vec<u8>, EncodeError> {
        self.emit(seq, args)
    }
}

/// Builder for custom [`TermInfo`] tables.
#[derive(Debug, Clone)]
pub struct TermInfoBuilder {
    info: TermInfo,
}

impl TermInfoBuilder {
    /// Add `seq` with its canonical spelling.
    #[must_use]
    pub fn seq(mut self, seq: TermSeq) -> Self {
        self.info.seqs.insert(seq, seq.template());
        self
    }

    /// Add each of `seqs` with its canonical spelling.
    #[must_use]
    pub fn seqs(mut self, seqs: &[TermSeq]) -> Self {
        for &seq in seqs {
            self.info.seqs.insert(seq, seq.template());
        }
        self
    }

    /// Add `seq` with a custom spelling.
    #[must_use]
    pub fn template(mut self, seq: TermSeq, template: SeqTemplate) -> Self {
        self.info.seqs.insert(seq, template);
        self
    }

    /// Remove `seq` if present.
    #[must_use]
    pub fn without(mut self, seq: TermSeq) -> Self {
        self.info.seqs.remove(&seq);
        self
    }

    /// Finish the table.
    #[must_use]
    pub fn build(self) -> TermInfo {
        self.info
    }
}

/// Canonical piece lists.
mod templates {
    use super::{ArgFormat, Piece};

    const U16_MAX: u32 = u16::MAX as u32;

    const fn lit(text: &'static str) -> Piece {
        Piece::Lit(text)
    }

    const fn dec(slot: u8, max: u32) -> Piece {
        Piece::Arg {
            slot,
            format: ArgFormat::Decimal,
            max,
        }
    }

    const fn one_based(slot: u8) -> Piece {
        Piece::Arg {
            slot,
            format: ArgFormat::OneBased,
            max: U16_MAX - 1,
        }
    }

    const fn pen16(slot: u8, format: ArgFormat) -> Piece {
        Piece::Arg {
            slot,
            format,
            max: 15,
        }
    }

    pub(super) const RESET_TERMINAL_SOFT: &[Piece] = &[lit("\x1b[!p")];
    pub(super) const RESET_TERMINAL_HARD: &[Piece] = &[lit("\x1bc")];
    pub(super) const RESET_ATTRIBUTES: &[Piece] = &[lit("\x1b[0m")];
    pub(super) const CLEAR: &[Piece] = &[lit("\x1b[H\x1b[2J")];
    pub(super) const INVERT_COLORS: &[Piece] = &[lit("\x1b[7m")];
    pub(super) const ENABLE_BOLD: &[Piece] = &[lit("\x1b[1m")];
    pub(super) const CURSOR_TO_TOP_LEFT: &[Piece] = &[lit("\x1b[0H")];
    pub(super) const CURSOR_TO_BOTTOM_LEFT: &[Piece] = &[lit("\x1b[9999;1H")];
    pub(super) const CURSOR_TO_POS: &[Piece] =
        &[lit("\x1b["), one_based(1), lit(";"), one_based(0), lit("H")];
    pub(super) const CURSOR_UP_1: &[Piece] = &[lit("\x1b[A")];
    pub(super) const CURSOR_UP: &[Piece] = &[lit("\x1b["), dec(0, U16_MAX), lit("A")];
    pub(super) const CURSOR_DOWN_1: &[Piece] = &[lit("\x1b[B")];
    pub(super) const CURSOR_DOWN: &[Piece] = &[lit("\x1b["), dec(0, U16_MAX), lit("B")];
    pub(super) const CURSOR_RIGHT_1: &[Piece] = &[lit("\x1b[C")];
    pub(super) const CURSOR_RIGHT: &[Piece] = &[lit("\x1b["), dec(0, U16_MAX), lit("C")];
    pub(super) const CURSOR_LEFT_1: &[Piece] = &[lit("\x1b[D")];
    pub(super) const CURSOR_LEFT: &[Piece] = &[lit("\x1b["), dec(0, U16_MAX), lit("D")];
    pub(super) const ENABLE_CURSOR: &[Piece] = &[lit("\x1b[?25h")];
    pub(super) const DISABLE_CURSOR: &[Piece] = &[lit("\x1b[?25l")];
    pub(super) const ENABLE_ECHO: &[Piece] = &[lit("\x1b[12l")];
    pub(super) const DISABLE_ECHO: &[Piece] = &[lit("\x1b[12h")];
    pub(super) const ENABLE_INSERT: &[Piece] = &[lit("\x1b[4h")];
    pub(super) const DISABLE_INSERT: &[Piece] = &[lit("\x1b[4l")];
    pub(super) const ENABLE_WRAP: &[Piece] = &[lit("\x1b[?7h")];
    pub(super) const DISABLE_WRAP: &[Piece] = &[lit("\x1b[?7l")];
    pub(super) const FG_DIRECT: &[Piece] = &[
        lit("\x1b[38;2;"),
        dec(0, 255),
        lit(";"),
        dec(1, 255),
        lit(";"),
        dec(2, 255),
        lit("m"),
    ];
    pub(super) const BG_DIRECT: &[Piece] = &[
        lit("\x1b[48;2;"),
        dec(0, 255),
        lit(";"),
        dec(1, 255),
        lit(";"),
        dec(2, 255),
        lit("m"),
    ];
    pub(super) const FGBG_DIRECT: &[Piece] = &[
        lit("\x1b[38;2;"),
        dec(0, 255),
        lit(";"),
        dec(1, 255),
        lit(";"),
        dec(2, 255),
        lit(";48;2;"),
        dec(3, 255),
        lit(";"),
        dec(4, 255),
        lit(";"),
        dec(5, 255),
        lit("m"),
    ];
    pub(super) const FG_256: &[Piece] = &[lit("\x1b[38;5;"), dec(0, 255), lit("m")];
    pub(super) const BG_256: &[Piece] = &[lit("\x1b[48;5;"), dec(0, 255), lit("m")];
    pub(super) const FGBG_256: &[Piece] = &[
        lit("\x1b[38;5;"),
        dec(0, 255),
        lit(";48;5;"),
        dec(1, 255),
        lit("m"),
    ];
    pub(super) const FG_16: &[Piece] = &[lit("\x1b["), pen16(0, ArgFormat::Fg16), lit("m")];
    pub(super) const BG_16: &[Piece] = &[lit("\x1b["), pen16(0, ArgFormat::Bg16), lit("m")];
    pub(super) const FGBG_16: &[Piece] = &[
        lit("\x1b["),
        pen16(0, ArgFormat::Fg16),
        lit(";"),
        pen16(1, ArgFormat::Bg16),
        lit("m"),
    ];
    pub(super) const RESET_FG: &[Piece] = &[lit("\x1b[39m")];
    pub(super) const RESET_BG: &[Piece] = &[lit("\x1b[49m")];
    pub(super) const REPEAT_CHAR: &[Piece] = &[lit("\x1b["), dec(0, U16_MAX), lit("b")];
    pub(super) const BEGIN_SIXELS: &[Piece] = &[
        lit("\x1bP"),
        dec(0, 9),
        lit(";"),
        dec(1, 2),
        lit(";"),
        dec(2, U16_MAX),
        lit("q"),
    ];
    pub(super) const STRING_TERMINATOR: &[Piece] = &[lit("\x1b\\")];
    pub(super) const ENABLE_SIXEL_SCROLLING: &[Piece] = &[lit("\x1b[?80l")];
    pub(super) const DISABLE_SIXEL_SCROLLING: &[Piece] = &[lit("\x1b[?80h")];
    pub(super) const BEGIN_KITTY_IMMEDIATE_IMAGE_V1: &[Piece] = &[
        lit("\x1b_Ga=T,f="),
        dec(0, 32),
        lit(",s="),
        dec(1, U16_MAX),
        lit(",v="),
        dec(2, U16_MAX),
        lit(",c="),
        dec(3, U16_MAX),
        lit(",r="),
        dec(4, U16_MAX),
        lit(",m=1\x1b\\"),
    ];
    pub(super) const END_KITTY_IMAGE: &[Piece] = &[lit("\x1b_Gm=0\x1b\\")];
    pub(super) const BEGIN_KITTY_IMAGE_CHUNK: &[Piece] = &[lit("\x1b_Gm=1;")];
    pub(super) const BEGIN_ITERM2_IMAGE: &[Piece] = &[
        lit("\x1b]1337;File=inline=1;width="),
        dec(0, U16_MAX),
        lit(";height="),
        dec(1, U16_MAX),
        lit(";preserveAspectRatio=0:"),
    ];
    pub(super) const BEL: &[Piece] = &[lit("\x07")];
    pub(super) const BEGIN_TMUX_PASSTHROUGH: &[Piece] = &[lit("\x1bPtmux;")];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> TermInfo {
        TermInfo::with_seqs("full", TermSeq::ALL)
    }

    #[test]
    fn all_lists_every_variant_once() {
        let mut seen = std::collections::BTreeSet::new();
        for &seq in TermSeq::ALL {
            assert!(seen.insert(seq), "{seq} listed twice");
        }
        assert_eq!(full().len(), TermSeq::ALL.len());
    }

    #[test]
    fn arity_counts_distinct_slots() {
        assert_eq!(TermSeq::Clear.template().arity(), 0);
        assert_eq!(TermSeq::CursorUp.template().arity(), 1);
        assert_eq!(TermSeq::CursorToPos.template().arity(), 2);
        assert_eq!(TermSeq::SetColorFgDirect.template().arity(), 3);
        assert_eq!(TermSeq::BeginKittyImmediateImageV1.template().arity(), 5);
        assert_eq!(TermSeq::SetColorFgbgDirect.template().arity(), 6);
    }

    #[test]
    fn encode_direct_color() {
        let out = full()
            .encode(TermSeq::SetColorFgDirect, &[255, 128, 0])
            .unwrap();
        assert_eq!(out, b"\x1b[38;2;255;128;0m");

        let out = full()
            .encode(TermSeq::SetColorFgbgDirect, &[1, 2, 3, 4, 5, 6])
            .unwrap();
        assert_eq!(out, b"\x1b[38;2;1;2;3;48;2;4;5;6m");
    }

    #[test]
    fn encode_sixteen_color_pens() {
        let info = full();
        assert_eq!(info.encode(TermSeq::SetColorFg16, &[1]).unwrap(), b"\x1b[31m");
        assert_eq!(info.encode(TermSeq::SetColorFg16, &[9]).unwrap(), b"\x1b[91m");
        assert_eq!(info.encode(TermSeq::SetColorBg16, &[0]).unwrap(), b"\x1b[40m");
        assert_eq!(
            info.encode(TermSeq::SetColorFgbg16, &[15, 8]).unwrap(),
            b"\x1b[97;100m"
        );
    }

    #[test]
    fn cursor_to_pos_is_row_first_and_one_based() {
        let out = full().encode(TermSeq::CursorToPos, &[9, 2]).unwrap();
        assert_eq!(out, b"\x1b[3;10H");
    }

    #[test]
    fn encode_unsupported_sequence_errors() {
        let info = TermInfo::with_seqs("tiny", &[TermSeq::Clear]);
        assert_eq!(
            info.encode(TermSeq::BeginSixels, &[0, 1, 0]),
            Err(EncodeError::Unsupported {
                seq: TermSeq::BeginSixels
            })
        );
    }

    #[test]
    fn encode_wrong_arity_errors() {
        let err = full().encode(TermSeq::SetColorFgDirect, &[1, 2]).unwrap_err();
        assert_eq!(
            err,
            EncodeError::Arity {
                seq: TermSeq::SetColorFgDirect,
                expected: 3,
                got: 2
            }
        );
        assert!(full().encode(TermSeq::Clear, &[1]).is_err());
    }

    #[test]
    fn encode_out_of_range_argument_errors() {
        let err = full().encode(TermSeq::SetColorFg256, &[256]).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::ArgumentRange {
                slot: 0,
                value: 256,
                max: 255,
                ..
            }
        ));
        assert!(full().encode(TermSeq::SetColorFg16, &[16]).is_err());
    }

    #[test]
    fn supplement_fills_gaps_only() {
        const CUSTOM_CLEAR: &[Piece] = &[Piece::Lit("\x1b[2J")];
        let mut primary = TermInfo::builder("primary")
            .template(TermSeq::Clear, SeqTemplate::new(CUSTOM_CLEAR))
            .build();
        let fallback = TermInfo::with_seqs("fallback", &[TermSeq::Clear, TermSeq::EnableCursor]);

        let added = primary.supplement(&fallback);

        assert_eq!(added, 1);
        assert!(primary.has(TermSeq::EnableCursor));
        assert_eq!(primary.encode(TermSeq::Clear, &[]).unwrap(), b"\x1b[2J");
    }

    #[test]
    fn supplement_is_idempotent() {
        let mut primary = TermInfo::empty("p");
        let fallback = full();
        assert_eq!(primary.supplement(&fallback), TermSeq::ALL.len());
        assert_eq!(primary.supplement(&fallback), 0);
    }

    #[test]
    fn builder_without_removes() {
        let info = TermInfo::builder("b")
            .seqs(&[TermSeq::Clear, TermSeq::InvertColors])
            .without(TermSeq::Clear)
            .build();
        assert!(!info.has(TermSeq::Clear));
        assert!(info.has(TermSeq::InvertColors));
    }

    #[test]
    fn error_messages_name_the_sequence() {
        let msg = EncodeError::Unsupported {
            seq: TermSeq::EndSixels,
        }
        .to_string();
        assert!(msg.contains("EndSixels"));
    }
}
