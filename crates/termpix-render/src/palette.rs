#![forbid(unsafe_code)]

//! xterm 256-color palette and nearest-pen lookup.

use std::ops::RangeInclusive;

use termpix_core::resolve::ColorModel;

use crate::color::Rgb;

/// The 16 ANSI pens as xterm draws them.
pub const ANSI16_PALETTE: [Rgb; 16] = [
    Rgb::new(0, 0, 0),       // Black
    Rgb::new(205, 0, 0),     // Red
    Rgb::new(0, 205, 0),     // Green
    Rgb::new(205, 205, 0),   // Yellow
    Rgb::new(0, 0, 238),     // Blue
    Rgb::new(205, 0, 205),   // Magenta
    Rgb::new(0, 205, 205),   // Cyan
    Rgb::new(229, 229, 229), // White
    Rgb::new(127, 127, 127), // Bright Black
    Rgb::new(255, 0, 0),     // Bright Red
    Rgb::new(0, 255, 0),     // Bright Green
    Rgb::new(255, 255, 0),   // Bright Yellow
    Rgb::new(92, 92, 255),   // Bright Blue
    Rgb::new(255, 0, 255),   // Bright Magenta
    Rgb::new(0, 255, 255),   // Bright Cyan
    Rgb::new(255, 255, 255), // Bright White
];

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// RGB value of a 256-color pen.
#[must_use]
pub fn pen_to_rgb(pen: u8) -> Rgb {
    if pen < 16 {
        return ANSI16_PALETTE[pen as usize];
    }
    if pen >= 232 {
        let gray = 8 + 10 * (pen - 232);
        return Rgb::new(gray, gray, gray);
    }
    let idx = pen - 16;
    let r = idx / 36;
    let g = (idx / 6) % 6;
    let b = idx % 6;
    Rgb::new(
        CUBE_LEVELS[r as usize],
        CUBE_LEVELS[g as usize],
        CUBE_LEVELS[b as usize],
    )
}

/// Pens a color model may use, or `None` for models that store RGB.
#[must_use]
pub fn pen_range(model: ColorModel) -> Option<RangeInclusive<u8>> {
    match model {
        ColorModel::Indexed256 => Some(0..=255),
        ColorModel::Indexed240 => Some(16..=255),
        ColorModel::Indexed16 => Some(0..=15),
        ColorModel::Truecolor | ColorModel::FgBgBgFg | ColorModel::FgBg => None,
    }
}

/// Closest pen in `pens` by luma-weighted distance. Ties go to the lower pen,
/// so every exact palette color maps back to its first occurrence.
#[must_use]
pub fn nearest_pen(rgb: Rgb, pens: RangeInclusive<u8>) -> u8 {
    let mut best = *pens.start();
    let mut best_dist = u64::MAX;
    for pen in pens {
        let dist = weighted_distance(rgb, pen_to_rgb(pen));
        if dist < best_dist {
            best = pen;
            best_dist = dist;
            if dist == 0 {
                break;
            }
        }
    }
    best
}

fn weighted_distance(a: Rgb, b: Rgb) -> u64 {
    let dr = a.r as i32 - b.r as i32;
    let dg = a.g as i32 - b.g as i32;
    let db = a.b as i32 - b.b as i32;
    let dr2 = (dr * dr) as u64;
    let dg2 = (dg * dg) as u64;
    let db2 = (db * db) as u64;
    2126 * dr2 + 7152 * dg2 + 722 * db2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_and_gray_ramp() {
        assert_eq!(pen_to_rgb(16), Rgb::new(0, 0, 0));
        assert_eq!(pen_to_rgb(196), Rgb::new(255, 0, 0));
        assert_eq!(pen_to_rgb(231), Rgb::new(255, 255, 255));
        assert_eq!(pen_to_rgb(232), Rgb::new(8, 8, 8));
        assert_eq!(pen_to_rgb(255), Rgb::new(238, 238, 238));
    }

    #[test]
    fn exact_colors_map_to_first_pen() {
        assert_eq!(nearest_pen(Rgb::new(0, 0, 0), 0..=255), 0);
        assert_eq!(nearest_pen(Rgb::new(0, 0, 0), 16..=255), 16);
        assert_eq!(nearest_pen(Rgb::new(95, 95, 95), 16..=255), 59);
    }

    #[test]
    fn pen_round_trip_preserves_color() {
        for pen in 0..=255u8 {
            let rgb = pen_to_rgb(pen);
            assert_eq!(pen_to_rgb(nearest_pen(rgb, 0..=255)), rgb, "pen {pen}");
        }
    }

    #[test]
    fn sixteen_color_lookup() {
        assert_eq!(nearest_pen(Rgb::new(250, 10, 10), 0..=15), 9);
        assert_eq!(nearest_pen(Rgb::new(10, 10, 10), 0..=15), 0);
    }

    #[test]
    fn ranges_per_model() {
        assert_eq!(pen_range(ColorModel::Indexed240), Some(16..=255));
        assert_eq!(pen_range(ColorModel::Truecolor), None);
        assert_eq!(pen_range(ColorModel::FgBg), None);
    }
}
