#![forbid(unsafe_code)]

//! Capability resolution: sequence table + DA1 reply -> color model and
//! graphics transport.
//!
//! [`resolve`] is pure and total. [`detect_capabilities`] adds the optional
//! DA1 probe in front of it.

use std::fmt;
use std::str::FromStr;

use crate::probe::{self, DeviceAttributes, ProbeConfig, RestoreError};
use crate::raw_mode::ProbeDevice;
use crate::sequences::{SequenceCapabilityOracle, TermSeq};
use crate::term_db::DetectInputs;

/// How cell colors are expressed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorModel {
    /// 24-bit direct color.
    #[default]
    Truecolor,
    /// Full 256-color palette.
    Indexed256,
    /// 256-color palette minus the 16 user-redefinable pens.
    Indexed240,
    /// The 16 ANSI pens.
    Indexed16,
    /// Two colors, using reverse video for the background.
    FgBgBgFg,
    /// Two colors, foreground only.
    FgBg,
}

/// How pixel data reaches the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GraphicsTransport {
    Kitty,
    Sixel,
    /// Character cells (block and braille glyphs).
    #[default]
    Symbols,
}

macro_rules! named_enum {
    ($ty:ident, $what:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseNameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| ParseNameError {
                        kind: $what,
                        input: s.to_string(),
                    })
            }
        }
    };
}

named_enum!(ColorModel, "color model", {
    Truecolor => "truecolor",
    Indexed256 => "indexed-256",
    Indexed240 => "indexed-240",
    Indexed16 => "indexed-16",
    FgBgBgFg => "fgbg-bgfg",
    FgBg => "fgbg",
});

named_enum!(GraphicsTransport, "graphics transport", {
    Kitty => "kitty",
    Sixel => "sixel",
    Symbols => "symbols",
});

impl ColorModel {
    /// Whether cell colors are palette pens rather than packed RGB.
    #[must_use]
    pub const fn is_indexed(self) -> bool {
        matches!(self, Self::Indexed256 | Self::Indexed240 | Self::Indexed16)
    }
}

/// A name that matches no variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNameError {
    kind: &'static str,
    input: String,
}

impl fmt::Display for ParseNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} {:?}", self.kind, self.input)
    }
}

impl std::error::Error for ParseNameError {}

/// Resolved output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilityProfile {
    pub color_model: ColorModel,
    pub graphics_transport: GraphicsTransport,
}

impl CapabilityProfile {
    #[must_use]
    pub const fn new(color_model: ColorModel, graphics_transport: GraphicsTransport) -> Self {
        Self {
            color_model,
            graphics_transport,
        }
    }
}

impl fmt::Display for CapabilityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.color_model, self.graphics_transport)
    }
}

const DIRECT_FAMILY: [TermSeq; 3] = [
    TermSeq::SetColorFgbgDirect,
    TermSeq::SetColorFgDirect,
    TermSeq::SetColorBgDirect,
];
const INDEXED_256_FAMILY: [TermSeq; 3] = [
    TermSeq::SetColorFgbg256,
    TermSeq::SetColorFg256,
    TermSeq::SetColorBg256,
];
const INDEXED_16_FAMILY: [TermSeq; 3] = [
    TermSeq::SetColorFgbg16,
    TermSeq::SetColorFg16,
    TermSeq::SetColorBg16,
];
const INVERT_PAIR: [TermSeq; 2] = [TermSeq::InvertColors, TermSeq::ResetAttributes];
const SIXEL_PAIR: [TermSeq; 2] = [TermSeq::BeginSixels, TermSeq::EndSixels];

fn has_all<O: SequenceCapabilityOracle + ?Sized>(oracle: &O, seqs: &[TermSeq]) -> bool {
    seqs.iter().all(|&seq| oracle.has(seq))
}

/// Pick the best color model and graphics transport.
///
/// Color: direct, then 256, then 16 (each needing its fg, bg and combined
/// sequence), then invert + reset, then plain two-color. Graphics: kitty if
/// its immediate-image sequence exists, sixel if both sixel delimiters exist
/// or the DA1 reply contains 4, otherwise symbols.
#[must_use]
pub fn resolve<O: SequenceCapabilityOracle + ?Sized>(
    oracle: &O,
    device_attrs: &DeviceAttributes,
) -> CapabilityProfile {
    let color_model = if has_all(oracle, &DIRECT_FAMILY) {
        ColorModel::Truecolor
    } else if has_all(oracle, &INDEXED_256_FAMILY) {
        ColorModel::Indexed256
    } else if has_all(oracle, &INDEXED_16_FAMILY) {
        ColorModel::Indexed16
    } else if has_all(oracle, &INVERT_PAIR) {
        ColorModel::FgBgBgFg
    } else {
        ColorModel::FgBg
    };

    let graphics_transport = if oracle.has(TermSeq::BeginKittyImmediateImageV1) {
        GraphicsTransport::Kitty
    } else if has_all(oracle, &SIXEL_PAIR) || device_attrs.supports_sixel() {
        GraphicsTransport::Sixel
    } else {
        GraphicsTransport::Symbols
    };

    CapabilityProfile {
        color_model,
        graphics_transport,
    }
}

/// Resolve capabilities, probing DA1 on `device` when the policy allows it.
///
/// # Errors
///
/// [`RestoreError`] if the probe could not restore the terminal mode.
pub fn detect_capabilities_with<O, D>(
    oracle: &O,
    inputs: &DetectInputs,
    config: &ProbeConfig,
    device: &mut D,
) -> Result<CapabilityProfile, RestoreError>
where
    O: SequenceCapabilityOracle + ?Sized,
    D: ProbeDevice,
{
    let attrs = if config.policy.should_probe(inputs) {
        probe::device_attributes_with(device, config)?
    } else {
        DeviceAttributes::default()
    };
    let profile = resolve(oracle, &attrs);
    crate::debug!(%profile, probed = !attrs.is_empty(), "resolved capabilities");
    Ok(profile)
}

/// Resolve capabilities for the controlling terminal.
///
/// # Errors
///
/// [`RestoreError`] if the probe could not restore the terminal mode.
pub fn detect_capabilities<O: SequenceCapabilityOracle + ?Sized>(
    oracle: &O,
    inputs: &DetectInputs,
    config: &ProbeConfig,
) -> Result<CapabilityProfile, RestoreError> {
    let attrs = if config.policy.should_probe(inputs) {
        probe::device_attributes(config)?
    } else {
        DeviceAttributes::default()
    };
    let profile = resolve(oracle, &attrs);
    crate::debug!(%profile, probed = !attrs.is_empty(), "resolved capabilities");
    Ok(profile)
}
