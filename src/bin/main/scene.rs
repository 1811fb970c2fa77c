//! Demo tag layout used by `tagdraw render`.

use anyhow::{Result, anyhow};
use embedded_storage::ReadStorage;
use log::{info, warn};
use tagdraw_core::{
    AddError, AnyFont, Color, DrawList, FontRenderer, PIXEL_5X7, PlaneLayout, Rotation,
};
use tagdraw_storage::TagStorage;

const HEADER_HEIGHT: u16 = 24;
const FOOTER_HEIGHT: u16 = 10;

pub struct Scene<'s> {
    pub text: &'s str,
    pub rotation: Rotation,
    pub size: u8,
    /// Font descriptor in the mounted file table; built-in 5x7 otherwise.
    pub font: Option<&'s str>,
    /// Image file in the mounted file table. Names ending in `.z` are
    /// inflated while drawing.
    pub logo: Option<&'s str>,
}

/// Queues the demo layout: an outlined header holding the text, an
/// optional logo, and an accent footer labelled with the panel size.
pub fn compose<F, const N: usize>(
    list: &mut DrawList<'_, N>,
    storage: &mut TagStorage<F>,
    scene: &Scene<'_>,
) -> Result<()>
where
    F: ReadStorage,
    F::Error: core::fmt::Debug,
{
    let config = *list.config();
    let (width, height) = (config.width, config.height);
    let accent = match config.layout {
        PlaneLayout::BlackRed => Color::Red,
        PlaneLayout::Mono => Color::Black,
    };

    queued(
        "header",
        list.draw_rounded_rectangle(0, 0, width, HEADER_HEIGHT, Color::Black),
    );
    queued(
        "header mask",
        list.draw_mask(
            2,
            2,
            width.saturating_sub(4),
            HEADER_HEIGHT - 4,
            Color::Dual,
        ),
    );

    if let Some(name) = scene.logo {
        let y = HEADER_HEIGHT as i16 + 4;
        let result = if name.ends_with(".z") {
            list.add_compressed_fs_image(4, y, Rotation::Rotate0, name, storage)
        } else {
            list.add_fs_image(4, y, Color::Black, Rotation::Rotate0, name, storage)
        };
        queued("logo", result);
    }

    let font = match scene.font {
        Some(name) => {
            let (font, err) = AnyFont::open_or(&mut *storage, name, PIXEL_5X7);
            if let Some(err) = err {
                warn!("scene: font unavailable name={} err={:?}, using 5x7", name, err);
            }
            font
        }
        None => AnyFont::Memory(PIXEL_5X7),
    };
    let mut renderer = FontRenderer::new(font);
    renderer.set_size(scene.size);

    let (x, y) = match scene.rotation {
        Rotation::Rotate0 => (6, HEADER_HEIGHT as i16 - 5),
        _ => (width as i16 / 2, height as i16 / 2),
    };
    let report = renderer
        .print_str(list, x, y, Color::Black, scene.rotation, scene.text)
        .map_err(|err| anyhow!("text: {err:?}"))?;
    info!(
        "scene: text glyphs={} dropped={} end=({}, {})",
        report.glyphs, report.dropped, report.end_x, report.end_y
    );

    renderer.set_size(1);
    let footer_top = height.saturating_sub(FOOTER_HEIGHT + 2);
    renderer
        .print(
            list,
            4,
            footer_top as i16 - 3,
            accent,
            Rotation::Rotate0,
            format_args!("{width}x{height}"),
        )
        .map_err(|err| anyhow!("label: {err:?}"))?;
    drop(renderer);

    queued(
        "footer",
        list.draw_rounded_rectangle(
            2,
            footer_top as i16,
            width.saturating_sub(4),
            FOOTER_HEIGHT,
            accent,
        ),
    );
    Ok(())
}

/// Decorations that do not fit the panel are skipped, not fatal.
fn queued(what: &str, result: Result<(), AddError>) {
    if let Err(err) = result {
        warn!("scene: {} skipped err={:?}", what, err);
    }
}
