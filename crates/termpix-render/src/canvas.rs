#![forbid(unsafe_code)]

//! Render target: a configured [`PixelGrid`] over a [`CanvasBuffer`].
//!
//! [`CanvasConfig`] holds what an engine needs besides the pixels: the
//! output profile, the pixel size of one cell, the default colors used for
//! blending and for transparent cells, whether only foreground colors may be
//! emitted, the alpha cut-off, how much effort to spend, and which
//! multiplexer to wrap graphics for.

use std::fmt;

use termpix_core::probe::CellGeometry;
use termpix_core::resolve::CapabilityProfile;
use termpix_core::sequences::{EncodeError, TermInfo};
use termpix_core::term_db::DetectInputs;

use crate::color::{ColorError, Rgb};
use crate::engine::{PixelSource, RenderEngine};
use crate::grid::{GridError, PixelGrid};
use crate::presenter::PrintRows;
use crate::store::CanvasBuffer;

/// Multiplexer that graphics escapes must be wrapped for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Passthrough {
    #[default]
    None,
    Screen,
    Tmux,
}

impl Passthrough {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Screen => "screen",
            Self::Tmux => "tmux",
        }
    }

    /// The multiplexer the environment says we run under. tmux wins when
    /// both are set.
    #[must_use]
    pub const fn detect(inputs: &DetectInputs) -> Self {
        if inputs.in_tmux {
            Self::Tmux
        } else if inputs.in_screen {
            Self::Screen
        } else {
            Self::None
        }
    }
}

impl fmt::Display for Passthrough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A [`CanvasConfig`] setter was given a value outside its domain. The
/// config is unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A size in cells or pixels was zero.
    ZeroDimension { field: &'static str },
    /// A pixel size does not fit the config's `u16` fields.
    Oversized { field: &'static str, value: u32 },
    /// A ratio was NaN or outside `0.0..=1.0`.
    OutOfUnitRange { field: &'static str, value: f32 },
    Color(ColorError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension { field } => write!(f, "{field} must be nonzero"),
            Self::Oversized { field, value } => {
                write!(f, "{field} of {value} exceeds {}", u16::MAX)
            }
            Self::OutOfUnitRange { field, value } => {
                write!(f, "{field} must be within 0.0..=1.0, got {value}")
            }
            Self::Color(err) => write!(f, "invalid color: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Color(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ColorError> for ConfigError {
    fn from(err: ColorError) -> Self {
        Self::Color(err)
    }
}

fn nonzero(field: &'static str, value: u16) -> Result<u16, ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroDimension { field });
    }
    Ok(value)
}

fn unit(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    // NaN fails `contains`.
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfUnitRange { field, value });
    }
    Ok(value)
}

fn pixel_dim(field: &'static str, value: u32) -> Result<u16, ConfigError> {
    let value = u16::try_from(value).map_err(|_| ConfigError::Oversized { field, value })?;
    nonzero(field, value)
}

/// Canvas size in cells plus everything an engine renders with.
///
/// Defaults: 80×24 cells of 8×8 pixels, default profile, white on black,
/// both colors allowed, transparency threshold and work factor 0.5, no
/// passthrough.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasConfig {
    width: u16,
    height: u16,
    profile: CapabilityProfile,
    cell_width: u16,
    cell_height: u16,
    fg_color: Rgb,
    bg_color: Rgb,
    fg_only: bool,
    transparency_threshold: f32,
    work_factor: f32,
    passthrough: Passthrough,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            profile: CapabilityProfile::default(),
            cell_width: 8,
            cell_height: 8,
            fg_color: Rgb::new(0xff, 0xff, 0xff),
            bg_color: Rgb::new(0, 0, 0),
            fg_only: false,
            transparency_threshold: 0.5,
            work_factor: 0.5,
            passthrough: Passthrough::None,
        }
    }
}

impl CanvasConfig {
    /// Default config with the given size in cells. A zero size is accepted
    /// here and rejected by [`Canvas::new`].
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_profile(mut self, profile: CapabilityProfile) -> Self {
        self.profile = profile;
        self
    }

    #[must_use]
    pub const fn with_passthrough(mut self, passthrough: Passthrough) -> Self {
        self.passthrough = passthrough;
        self
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

    /// # Errors
    ///
    /// [`ConfigError::ZeroDimension`] if either value is zero.
    pub fn set_geometry(&mut self, width: u16, height: u16) -> Result<(), ConfigError> {
        let width = nonzero("width", width)?;
        let height = nonzero("height", height)?;
        (self.width, self.height) = (width, height);
        Ok(())
    }

    #[must_use]
    pub const fn profile(&self) -> CapabilityProfile {
        self.profile
    }

    pub fn set_profile(&mut self, profile: CapabilityProfile) {
        self.profile = profile;
    }

    #[must_use]
    pub const fn cell_width(&self) -> u16 {
        self.cell_width
    }

    #[must_use]
    pub const fn cell_height(&self) -> u16 {
        self.cell_height
    }

    /// Pixel size of one cell.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroDimension`] if either value is zero.
    pub fn set_cell_geometry(&mut self, width: u16, height: u16) -> Result<(), ConfigError> {
        let width = nonzero("cell_width", width)?;
        let height = nonzero("cell_height", height)?;
        (self.cell_width, self.cell_height) = (width, height);
        Ok(())
    }

    /// Take the cell size reported by the terminal.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroDimension`] or [`ConfigError::Oversized`]. The
    /// config is unchanged on error.
    pub fn apply_cell_geometry(&mut self, geometry: CellGeometry) -> Result<(), ConfigError> {
        let width = pixel_dim("cell_width", geometry.width)?;
        let height = pixel_dim("cell_height", geometry.height)?;
        (self.cell_width, self.cell_height) = (width, height);
        Ok(())
    }

    /// Color assumed for foreground pixels when blending.
    #[must_use]
    pub const fn fg_color(&self) -> Rgb {
        self.fg_color
    }

    pub fn set_fg_color(&mut self, color: Rgb) {
        self.fg_color = color;
    }

    /// # Errors
    ///
    /// [`ConfigError::Color`] unless `channels` is three values in `0..=255`.
    pub fn set_fg_channels(&mut self, channels: &[i64]) -> Result<(), ConfigError> {
        self.fg_color = Rgb::from_channels(channels)?;
        Ok(())
    }

    /// Color of the terminal background, used under transparent pixels.
    #[must_use]
    pub const fn bg_color(&self) -> Rgb {
        self.bg_color
    }

    pub fn set_bg_color(&mut self, color: Rgb) {
        self.bg_color = color;
    }

    /// # Errors
    ///
    /// As [`set_fg_channels`](Self::set_fg_channels).
    pub fn set_bg_channels(&mut self, channels: &[i64]) -> Result<(), ConfigError> {
        self.bg_color = Rgb::from_channels(channels)?;
        Ok(())
    }

    /// Only foreground colors may be emitted; backgrounds stay the
    /// terminal's own.
    #[must_use]
    pub const fn fg_only(&self) -> bool {
        self.fg_only
    }

    pub fn set_fg_only(&mut self, fg_only: bool) {
        self.fg_only = fg_only;
    }

    /// Alpha below which a pixel counts as transparent.
    #[must_use]
    pub const fn transparency_threshold(&self) -> f32 {
        self.transparency_threshold
    }

    /// # Errors
    ///
    /// [`ConfigError::OutOfUnitRange`] for NaN or a value outside
    /// `0.0..=1.0`.
    pub fn set_transparency_threshold(&mut self, threshold: f32) -> Result<(), ConfigError> {
        self.transparency_threshold = unit("transparency_threshold", threshold)?;
        Ok(())
    }

    /// Effort the engine should spend, from 0.0 (fastest) to 1.0 (best).
    #[must_use]
    pub const fn work_factor(&self) -> f32 {
        self.work_factor
    }

    /// # Errors
    ///
    /// [`ConfigError::OutOfUnitRange`] for NaN or a value outside
    /// `0.0..=1.0`.
    pub fn set_work_factor(&mut self, work_factor: f32) -> Result<(), ConfigError> {
        self.work_factor = unit("work_factor", work_factor)?;
        Ok(())
    }

    #[must_use]
    pub const fn passthrough(&self) -> Passthrough {
        self.passthrough
    }

    pub fn set_passthrough(&mut self, passthrough: Passthrough) {
        self.passthrough = passthrough;
    }
}

#[derive(Debug)]
pub struct Canvas {
    config: CanvasConfig,
    grid: PixelGrid<CanvasBuffer>,
}

impl Canvas {
    /// A blank canvas.
    ///
    /// # Errors
    ///
    /// [`GridError::EmptyGrid`] for a zero width or height.
    pub fn new(config: CanvasConfig) -> Result<Self, GridError> {
        if config.width == 0 || config.height == 0 {
            return Err(GridError::EmptyGrid);
        }
        let buffer = CanvasBuffer::new(config.width, config.height, config.profile.color_model);
        Ok(Self {
            config,
            grid: PixelGrid::new(buffer)?,
        })
    }

    /// A blank canvas with the same configuration. Contents are not copied.
    #[must_use]
    pub fn new_similar(&self) -> Self {
        let buffer = CanvasBuffer::new(
            self.config.width,
            self.config.height,
            self.config.profile.color_model,
        );
        Self {
            config: self.config,
            // Same dimensions as an existing grid, so never empty.
            grid: match PixelGrid::new(buffer) {
                Ok(grid) => grid,
                Err(_) => unreachable!("dimensions already validated"),
            },
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Cell addressing; see [`PixelGrid`].
    #[must_use]
    pub const fn grid(&self) -> &PixelGrid<CanvasBuffer> {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut PixelGrid<CanvasBuffer> {
        &mut self.grid
    }

    /// Replace the canvas contents with `src` as drawn by `engine`.
    pub fn draw_all_pixels(&mut self, engine: &dyn RenderEngine, src: &PixelSource<'_>) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            width = src.width(),
            height = src.height(),
            profile = %self.config.profile,
            passthrough = %self.config.passthrough,
            "drawing pixels"
        );
        engine.draw_pixels(self.grid.store_mut(), &self.config, src);
    }

    /// Draw with the process-wide engine. Returns `false`, leaving the canvas
    /// untouched, when none is installed.
    pub fn draw_with_global(&mut self, src: &PixelSource<'_>) -> bool {
        match crate::engine::global() {
            Some(engine) => {
                self.draw_all_pixels(engine, src);
                true
            }
            None => false,
        }
    }

    /// The whole canvas as terminal output, rows joined with `\n`.
    ///
    /// `None` for `info` detects the table from the process environment
    /// (`TermDb::builtin().detect(&DetectInputs::from_env())`). With
    /// `fallback`, sequences missing from the table are taken from
    /// [`TermDb::fallback_info`](termpix_core::term_db::TermDb::fallback_info).
    ///
    /// # Errors
    ///
    /// [`EncodeError::Unsupported`] if a needed sequence is unavailable.
    pub fn print(&self, info: Option<&TermInfo>, fallback: bool) -> Result<Vec<u8>, EncodeError> {
        self.print_rows(info, fallback).join()
    }

    /// Lazy per-row variant of [`print`](Self::print).
    #[must_use]
    pub fn print_rows<'c, 't>(
        &'c self,
        info: Option<&'t TermInfo>,
        fallback: bool,
    ) -> PrintRows<'c, 't, CanvasBuffer> {
        PrintRows::new(&self.grid, self.config.profile.color_model, info, fallback)
    }
}
