#![forbid(unsafe_code)]

//! Render: addressable pixel grids, packed cell colors, and ANSI output.
//!
//! A [`Canvas`] owns a fixed grid of [`Cell`]s. Cells are read and written
//! through [`CellView`]s obtained by array-style indexing on the canvas's
//! [`PixelGrid`]; output for a terminal is produced by [`Canvas::print`].

pub mod canvas;
pub mod cell;
pub mod color;
pub mod engine;
pub mod grid;
pub mod palette;
pub mod presenter;
pub mod slice;
pub mod store;
pub mod view;

pub use canvas::{Canvas, CanvasConfig, ConfigError, Passthrough};
pub use cell::Cell;
pub use color::{ColorError, PackedColor, Rgb};
pub use engine::{PixelSource, PixelSourceError, PixelType, RenderEngine};
pub use grid::{GridError, PixelGrid, Selection};
pub use slice::{Axis, SliceSpec};
pub use store::{CanvasBuffer, CellStore};
pub use view::CellView;

pub use termpix_core::resolve::{CapabilityProfile, ColorModel, GraphicsTransport};
