#![forbid(unsafe_code)]

//! Pixel sources and the pluggable rendering engine.
//!
//! The engine that turns pixels into cells lives outside this crate. It is
//! reached through the [`RenderEngine`] trait, either passed explicitly or
//! installed once per process with [`install`] and fetched with [`global`].

use std::fmt;
use std::sync::OnceLock;

use crate::canvas::CanvasConfig;
use crate::store::CellStore;

/// Memory layout of one source pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    Rgba8Premultiplied,
    Bgra8Premultiplied,
    Argb8Premultiplied,
    Abgr8Premultiplied,
    Rgba8Unassociated,
    Bgra8Unassociated,
    Argb8Unassociated,
    Abgr8Unassociated,
    Rgb8,
    Bgr8,
}

impl PixelType {
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 | Self::Bgr8 => 3,
            _ => 4,
        }
    }

    #[must_use]
    pub const fn has_alpha(self) -> bool {
        self.bytes_per_pixel() == 4
    }
}

/// Invalid [`PixelSource`] geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelSourceError {
    ZeroDimension { width: u32, height: u32 },
    ZeroRowstride,
    /// A row is wider than the stride.
    RowstrideTooSmall { rowstride: usize, row_bytes: usize },
    /// The buffer ends before the last pixel.
    BufferTooSmall { len: usize, required: usize },
}

impl fmt::Display for PixelSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension { width, height } => {
                write!(f, "pixel source must be non-empty, got {width}x{height}")
            }
            Self::ZeroRowstride => f.write_str("rowstride must be greater than 0"),
            Self::RowstrideTooSmall {
                rowstride,
                row_bytes,
            } => write!(
                f,
                "rowstride {rowstride} is smaller than a row of {row_bytes} bytes"
            ),
            Self::BufferTooSmall { len, required } => {
                write!(f, "pixel buffer has {len} bytes, needs {required}")
            }
        }
    }
}

impl std::error::Error for PixelSourceError {}

/// A borrowed, validated image.
#[derive(Debug, Clone, Copy)]
pub struct PixelSource<'a> {
    pixel_type: PixelType,
    pixels: &'a [u8],
    width: u32,
    height: u32,
    rowstride: usize,
}

impl<'a> PixelSource<'a> {
    /// Validate geometry against the buffer. The final row only needs
    /// `width * bytes_per_pixel` bytes, not a full stride.
    ///
    /// # Errors
    ///
    /// See [`PixelSourceError`].
    pub fn new(
        pixel_type: PixelType,
        pixels: &'a [u8],
        width: u32,
        height: u32,
        rowstride: usize,
    ) -> Result<Self, PixelSourceError> {
        if width == 0 || height == 0 {
            return Err(PixelSourceError::ZeroDimension { width, height });
        }
        if rowstride == 0 {
            return Err(PixelSourceError::ZeroRowstride);
        }
        let row_bytes = (width as usize).saturating_mul(pixel_type.bytes_per_pixel());
        if rowstride < row_bytes {
            return Err(PixelSourceError::RowstrideTooSmall {
                rowstride,
                row_bytes,
            });
        }
        let required = rowstride
            .saturating_mul(height as usize - 1)
            .saturating_add(row_bytes);
        if pixels.len() < required {
            return Err(PixelSourceError::BufferTooSmall {
                len: pixels.len(),
                required,
            });
        }
        Ok(Self {
            pixel_type,
            pixels,
            width,
            height,
            rowstride,
        })
    }

    #[must_use]
    pub const fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    #[must_use]
    pub const fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn rowstride(&self) -> usize {
        self.rowstride
    }

    /// The pixel bytes of row `y`, without stride padding.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.rowstride;
        let len = self.width as usize * self.pixel_type.bytes_per_pixel();
        self.pixels.get(start..start + len)
    }
}

/// Turns pixels into cells for a given canvas configuration.
pub trait RenderEngine: Send + Sync {
    /// Draw `src` scaled over the whole of `target`.
    ///
    /// `config` carries the output profile along with the cell geometry,
    /// default colors, `fg_only`, the transparency threshold, the work
    /// factor and the passthrough wrapping the engine should honor.
    fn draw_pixels(
        &self,
        target: &mut dyn CellStore,
        config: &CanvasConfig,
        src: &PixelSource<'_>,
    );
}

/// [`install`] was called twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineAlreadyInstalled;

impl fmt::Display for EngineAlreadyInstalled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a render engine is already installed")
    }
}

impl std::error::Error for EngineAlreadyInstalled {}

static ENGINE: OnceLock<Box<dyn RenderEngine>> = OnceLock::new();

/// Install the process-wide engine. Only the first call succeeds.
///
/// # Errors
///
/// [`EngineAlreadyInstalled`] if an engine is already set; `engine` is dropped.
pub fn install(engine: impl RenderEngine + 'static) -> Result<(), EngineAlreadyInstalled> {
    ENGINE
        .set(Box::new(engine))
        .map_err(|_| EngineAlreadyInstalled)?;
    #[cfg(feature = "tracing")]
    tracing::debug!("render engine installed");
    Ok(())
}

/// The installed engine, if any.
#[must_use]
pub fn global() -> Option<&'static dyn RenderEngine> {
    ENGINE.get().map(|engine| &**engine)
}
