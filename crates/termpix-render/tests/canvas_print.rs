//! Drawing through an engine and printing the result.

use termpix_core::sequences::{TermInfo, TermSeq};
use termpix_core::term_db::TermDb;
use termpix_render::engine::{self, EngineAlreadyInstalled};
use termpix_render::{
    Canvas, CanvasConfig, CapabilityProfile, CellStore, ColorModel, GraphicsTransport, PackedColor,
    Passthrough, PixelSource, PixelType, RenderEngine, Rgb,
};

/// Paints every cell's background with the pixel under its center. With
/// `fg_only` the pixel goes to the foreground instead.
struct NearestEngine;

impl RenderEngine for NearestEngine {
    fn draw_pixels(
        &self,
        target: &mut dyn CellStore,
        config: &CanvasConfig,
        src: &PixelSource<'_>,
    ) {
        assert_eq!(config.profile().graphics_transport, GraphicsTransport::Symbols);
        let bpp = src.pixel_type().bytes_per_pixel();
        for y in 0..target.height() {
            let sy = (u32::from(y) * src.height()) / u32::from(target.height());
            let row = src.row(sy).expect("row in range");
            for x in 0..target.width() {
                let sx = (u32::from(x) * src.width()) / u32::from(target.width());
                let px = &row[sx as usize * bpp..sx as usize * bpp + 3];
                let color = PackedColor::pack(Rgb::new(px[0], px[1], px[2]));
                target.set_char_at(x, y, ' ');
                if config.fg_only() {
                    target.set_colors_at(x, y, color, PackedColor::TRANSPARENT);
                } else {
                    target.set_colors_at(x, y, PackedColor::TRANSPARENT, color);
                }
            }
        }
    }
}

fn two_by_one_rgb() -> Vec<u8> {
    vec![255, 0, 0, 0, 0, 255]
}

fn xterm_direct() -> TermInfo {
    TermDb::builtin().lookup("xterm-direct").expect("xterm-direct entry")
}

#[test]
fn truecolor_canvas_prints_backgrounds() {
    let pixels = two_by_one_rgb();
    let src = PixelSource::new(PixelType::Rgb8, &pixels, 2, 1, 6).unwrap();
    let mut canvas = Canvas::new(CanvasConfig::new(2, 2)).unwrap();
    canvas.draw_all_pixels(&NearestEngine, &src);

    let out = String::from_utf8(canvas.print(Some(&xterm_direct()), false).unwrap()).unwrap();
    let row = "\x1b[48;2;255;0;0m \x1b[0m\x1b[48;2;0;0;255m \x1b[0m";
    assert_eq!(out, format!("{row}\n{row}"));
}

#[test]
fn indexed_canvas_prints_pens() {
    let pixels = two_by_one_rgb();
    let src = PixelSource::new(PixelType::Rgb8, &pixels, 2, 1, 6).unwrap();
    let config = CanvasConfig::new(2, 1)
        .with_profile(CapabilityProfile::new(ColorModel::Indexed256, GraphicsTransport::Symbols));
    let mut canvas = Canvas::new(config).unwrap();
    canvas.draw_all_pixels(&NearestEngine, &src);

    let cell = canvas.grid().at(0, 1).unwrap();
    assert_eq!(cell.raw_bg_color(), 21);
    assert_eq!(cell.bg_color(), Some(Rgb::new(0, 0, 255)));

    let out = canvas.print(Some(&xterm_direct()), false).unwrap();
    assert_eq!(out, b"\x1b[48;5;9m \x1b[0m\x1b[48;5;21m \x1b[0m");
}

#[test]
fn engine_sees_canvas_options() {
    let pixels = two_by_one_rgb();
    let src = PixelSource::new(PixelType::Rgb8, &pixels, 2, 1, 6).unwrap();
    let mut config = CanvasConfig::new(2, 1).with_passthrough(Passthrough::Tmux);
    config.set_fg_only(true);
    let mut canvas = Canvas::new(config).unwrap();
    canvas.draw_all_pixels(&NearestEngine, &src);

    let cell = canvas.grid().at(1, 0).unwrap();
    assert_eq!(cell.fg_color(), Some(Rgb::new(0, 0, 255)));
    assert_eq!(cell.bg_color(), None);
    assert_eq!(canvas.config().passthrough(), Passthrough::Tmux);
}

#[test]
fn print_rows_is_lazy_per_row() {
    let canvas = Canvas::new(CanvasConfig::new(3, 4)).unwrap();
    canvas.grid().at(2, 0).unwrap().set_char('x');
    let rows: Vec<Vec<u8>> = canvas
        .print_rows(Some(&xterm_direct()), false)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[2], b"x  \x1b[0m");
}

#[test]
fn missing_sequences_need_fallback() {
    let mut canvas = Canvas::new(CanvasConfig::new(1, 1)).unwrap();
    let fg = PackedColor::pack(Rgb::new(1, 2, 3));
    canvas
        .grid_mut()
        .store_mut()
        .set_colors_at(0, 0, fg, PackedColor::TRANSPARENT);
    let bare = TermInfo::with_seqs("bare", &[TermSeq::ResetAttributes]);

    let mut rows = canvas.print_rows(Some(&bare), false);
    assert!(rows.next().expect("one row").is_err());
    assert!(rows.next().is_none());

    let out = canvas.print(Some(&bare), true).unwrap();
    assert_eq!(out, b"\x1b[38;2;1;2;3m \x1b[0m");
}

#[test]
fn global_engine_installs_once() {
    let pixels = two_by_one_rgb();
    let src = PixelSource::new(PixelType::Rgb8, &pixels, 2, 1, 6).unwrap();
    let mut canvas = Canvas::new(CanvasConfig::new(2, 1)).unwrap();

    engine::install(NearestEngine).unwrap();
    assert_eq!(engine::install(NearestEngine), Err(EngineAlreadyInstalled));
    assert!(engine::global().is_some());
    assert!(canvas.draw_with_global(&src));
    assert_eq!(canvas.grid().at(0, -1).unwrap().bg_color(), Some(Rgb::new(0, 0, 255)));
}
