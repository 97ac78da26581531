#![forbid(unsafe_code)]

//! Channel colors and the packed cell-color representation.
//!
//! A cell stores each of its two colors as a [`PackedColor`]: a signed 32-bit
//! value that is either `-1` (transparent) or `r * 256² + g * 256 + b`. In
//! indexed color models the same slot holds a palette pen `0..=255` instead;
//! see [`CellStore`](crate::store::CellStore).

use std::fmt;

/// Opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Validate a channel list: exactly three values, each in `0..=255`.
    ///
    /// # Errors
    ///
    /// [`ColorError::ChannelCount`] or [`ColorError::ChannelRange`].
    pub fn from_channels(channels: &[i64]) -> Result<Self, ColorError> {
        let &[r, g, b] = channels else {
            return Err(ColorError::ChannelCount(channels.len()));
        };
        Ok(Self::new(channel(0, r)?, channel(1, g)?, channel(2, b)?))
    }

    #[must_use]
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

fn channel(index: usize, value: i64) -> Result<u8, ColorError> {
    u8::try_from(value).map_err(|_| ColorError::ChannelRange { index, value })
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for (u8, u8, u8) {
    fn from(rgb: Rgb) -> Self {
        (rgb.r, rgb.g, rgb.b)
    }
}

impl TryFrom<&[i64]> for Rgb {
    type Error = ColorError;

    fn try_from(channels: &[i64]) -> Result<Self, Self::Error> {
        Self::from_channels(channels)
    }
}

/// A cell color slot: `-1` for transparent, otherwise packed RGB or a pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedColor(i32);

impl PackedColor {
    pub const TRANSPARENT: Self = Self(-1);
    /// Largest raw value (`0xFFFFFF`, packed white).
    pub const MAX_RAW: i32 = 0x00FF_FFFF;

    /// Big-endian pack. Never produces `-1`.
    #[must_use]
    pub const fn pack(rgb: Rgb) -> Self {
        Self(((rgb.r as i32) << 16) | ((rgb.g as i32) << 8) | rgb.b as i32)
    }

    /// Inverse of [`pack`](Self::pack); `None` for transparent.
    #[must_use]
    pub const fn unpack(self) -> Option<Rgb> {
        if self.0 < 0 {
            return None;
        }
        Some(Rgb::new(
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        ))
    }

    /// Accept a raw slot value in `-1..=0xFFFFFF`.
    ///
    /// Indexed models only use `-1..=255`; the narrower bound is not checked
    /// here.
    ///
    /// # Errors
    ///
    /// [`ColorError::RawRange`] outside the accepted range.
    pub fn from_raw(raw: i64) -> Result<Self, ColorError> {
        if (-1..=i64::from(Self::MAX_RAW)).contains(&raw) {
            Ok(Self(raw as i32))
        } else {
            Err(ColorError::RawRange(raw))
        }
    }

    /// A palette pen.
    #[must_use]
    pub const fn pen(pen: u8) -> Self {
        Self(pen as i32)
    }

    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.0 < 0
    }

    /// The value as a palette pen, if it is one.
    #[must_use]
    pub fn as_pen(self) -> Option<u8> {
        u8::try_from(self.0).ok()
    }
}

impl Default for PackedColor {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl From<Rgb> for PackedColor {
    fn from(rgb: Rgb) -> Self {
        Self::pack(rgb)
    }
}

impl From<Option<Rgb>> for PackedColor {
    fn from(rgb: Option<Rgb>) -> Self {
        rgb.map_or(Self::TRANSPARENT, Self::pack)
    }
}

/// Invalid color input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorError {
    /// Channel list did not have exactly three entries.
    ChannelCount(usize),
    /// Channel `index` was outside `0..=255`.
    ChannelRange { index: usize, value: i64 },
    /// Raw slot value outside `-1..=0xFFFFFF`.
    RawRange(i64),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelCount(n) => write!(f, "color needs 3 channels, got {n}"),
            Self::ChannelRange { index, value } => {
                write!(f, "color channel {index} is {value}, must be in 0..=255")
            }
            Self::RawRange(raw) => {
                write!(f, "raw color {raw} is outside -1..=0xFFFFFF")
            }
        }
    }
}

impl std::error::Error for ColorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_is_big_endian() {
        assert_eq!(PackedColor::pack(Rgb::new(0x12, 0x34, 0x56)).raw(), 0x123456);
        assert_eq!(PackedColor::pack(Rgb::new(255, 255, 255)).raw(), 0xFFFFFF);
        assert_eq!(PackedColor::pack(Rgb::new(0, 0, 0)).raw(), 0);
    }

    #[test]
    fn transparent_unpacks_to_none() {
        assert_eq!(PackedColor::TRANSPARENT.unpack(), None);
        assert_eq!(PackedColor::from(None).raw(), -1);
    }

    #[test]
    fn channels_validated() {
        assert_eq!(Rgb::from_channels(&[1, 2, 3]), Ok(Rgb::new(1, 2, 3)));
        assert_eq!(Rgb::from_channels(&[1, 2]), Err(ColorError::ChannelCount(2)));
        assert_eq!(
            Rgb::from_channels(&[1, 2, 3, 4]),
            Err(ColorError::ChannelCount(4))
        );
        assert_eq!(
            Rgb::from_channels(&[0, 256, 0]),
            Err(ColorError::ChannelRange {
                index: 1,
                value: 256
            })
        );
        assert!(Rgb::from_channels(&[-1, 0, 0]).is_err());
    }

    #[test]
    fn raw_bounds() {
        assert!(PackedColor::from_raw(-1).is_ok());
        assert!(PackedColor::from_raw(0xFFFFFF).is_ok());
        assert_eq!(PackedColor::from_raw(-2), Err(ColorError::RawRange(-2)));
        assert!(PackedColor::from_raw(0x1000000).is_err());
    }

    #[test]
    fn pen_view() {
        assert_eq!(PackedColor::pen(200).as_pen(), Some(200));
        assert_eq!(PackedColor::TRANSPARENT.as_pen(), None);
        assert_eq!(PackedColor::pack(Rgb::new(1, 0, 0)).as_pen(), None);
    }
}
