//! Text rasterization into per-glyph drawables.
//!
//! Each glyph with pixels becomes one owned FONT item exactly the size of
//! the scaled glyph. The `y` passed to [`FontRenderer::print`] is the
//! baseline of the first line; glyph offsets are relative to it.

use alloc::{vec, vec::Vec};
use core::fmt::{self, Write as _};

use log::{debug, warn};

use crate::{
    bits::{bytes_for_bits, fill_rect, get_bit},
    font::{FontError, FontStore, Glyph},
    item::{Color, DrawItem, Pixels, Rotation},
    list::ItemSink,
};

/// Longest formatted string `print` renders; longer output is truncated.
pub const MAX_TEXT_LEN: usize = 128;

/// Where a `print` call left the cursor and what it queued.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PrintReport {
    /// Physical cursor position after the last codepoint.
    pub end_x: i16,
    pub end_y: i16,
    /// Glyph items accepted by the target.
    pub glyphs: u16,
    /// Glyph items the target refused.
    pub dropped: u16,
}

/// Rasterizes text with a [`FontStore`] and queues one item per glyph.
#[derive(Debug)]
pub struct FontRenderer<F> {
    font: F,
    size: u8,
    bitmap: Vec<u8>,
}

impl<F: FontStore> FontRenderer<F> {
    pub fn new(font: F) -> Self {
        Self {
            font,
            size: 1,
            bitmap: Vec::new(),
        }
    }

    /// Swaps in `font`, returning the previous one.
    pub fn set_font(&mut self, font: F) -> F {
        core::mem::replace(&mut self.font, font)
    }

    pub fn font(&self) -> &F {
        &self.font
    }

    pub fn font_mut(&mut self) -> &mut F {
        &mut self.font
    }

    pub fn into_font(self) -> F {
        self.font
    }

    /// Sets the integer scale factor; zero is treated as one.
    pub fn set_size(&mut self, size: u8) {
        self.size = size.max(1);
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Scaled cursor advance of `c`.
    pub fn char_width(&mut self, c: char) -> Result<u16, FontError<F::IoError>> {
        let advance = match self.lookup(c)? {
            Some(glyph) => glyph.x_advance,
            None => self.font.blank_advance()?,
        };
        Ok(advance as u16 * self.size as u16)
    }

    /// Width of the widest line of `text`.
    pub fn string_width(&mut self, text: &str) -> Result<u16, FontError<F::IoError>> {
        let mut widest = 0u16;
        for line in text.split('\n') {
            let mut width = 0u16;
            for c in line.chars() {
                width = width.saturating_add(self.char_width(c)?);
            }
            widest = widest.max(width);
        }
        Ok(widest)
    }

    pub fn print_str<'a, T: ItemSink<'a>>(
        &mut self,
        target: &mut T,
        x: i16,
        y: i16,
        color: Color,
        rotation: Rotation,
        text: &str,
    ) -> Result<PrintReport, FontError<F::IoError>> {
        self.print(target, x, y, color, rotation, format_args!("{text}"))
    }

    /// Formats `args` and queues its glyphs into `target`.
    ///
    /// Text runs along the rotated x axis starting at the baseline origin
    /// `(x, y)`. Glyphs refused by `target` are counted and skipped; font
    /// I/O failures abort the call.
    pub fn print<'a, T: ItemSink<'a>>(
        &mut self,
        target: &mut T,
        x: i16,
        y: i16,
        color: Color,
        rotation: Rotation,
        args: fmt::Arguments<'_>,
    ) -> Result<PrintReport, FontError<F::IoError>> {
        let mut text = Truncating::default();
        if text.write_fmt(args).is_err() {
            warn!("font: formatting failed kept={}", text.buf.len());
        } else if text.truncated {
            warn!("font: text truncated max={} kept={}", MAX_TEXT_LEN, text.buf.len());
        }

        let size = self.size as i32;
        let line_advance = self.font.y_advance() as i32 * size;
        let (mut cursor_x, mut cursor_y) = (0i32, 0i32);
        let mut report = PrintReport::default();

        for c in text.buf.chars() {
            if c == '\n' {
                cursor_x = 0;
                cursor_y += line_advance;
                continue;
            }

            let Some(glyph) = self.lookup(c)? else {
                cursor_x += self.font.blank_advance()? as i32 * size;
                continue;
            };

            if !glyph.is_blank() {
                let (width, height, pixels) = self.rasterize(&glyph)?;
                let gx = cursor_x + glyph.x_offset as i32 * size;
                let gy = cursor_y + glyph.y_offset as i32 * size;
                let (px, py) = place(rotation, x, y, gx, gy, width as i32, height as i32);

                let item = DrawItem::glyph(Pixels::Owned(pixels), width, height)
                    .at(px, py)
                    .rotated(rotation)
                    .colored(color);
                match target.enqueue(item) {
                    Ok(()) => report.glyphs += 1,
                    Err(rejected) => {
                        report.dropped += 1;
                        debug!("font: glyph dropped char={:?} reason={:?}", c, rejected.reason);
                    }
                }
            }

            cursor_x += glyph.x_advance as i32 * size;
        }

        let (end_x, end_y) = place(rotation, x, y, cursor_x, cursor_y, 1, 1);
        report.end_x = end_x;
        report.end_y = end_y;

        if report.dropped > 0 {
            warn!(
                "font: print dropped glyphs dropped={} queued={}",
                report.dropped, report.glyphs
            );
        }
        Ok(report)
    }

    fn lookup(&mut self, c: char) -> Result<Option<Glyph>, FontError<F::IoError>> {
        match u16::try_from(c as u32) {
            Ok(codepoint) => self.font.glyph(codepoint),
            Err(_) => Ok(None),
        }
    }

    /// Expands the glyph's packed bit stream into a row-padded, scaled
    /// bitmap.
    fn rasterize(&mut self, glyph: &Glyph) -> Result<(u16, u16, Vec<u8>), FontError<F::IoError>> {
        let size = self.size as usize;
        let (w, h) = (glyph.width as usize, glyph.height as usize);
        let (width, height) = (w * size, h * size);
        let stride = bytes_for_bits(width);

        self.bitmap.clear();
        self.bitmap.resize(glyph.bitmap_len(), 0);
        self.font.read_bitmap(glyph, &mut self.bitmap)?;

        let mut out = vec![0u8; stride * height];
        for row in 0..h {
            let mut col = 0;
            while col < w {
                if !get_bit(&self.bitmap, row * w + col) {
                    col += 1;
                    continue;
                }
                let start = col;
                while col < w && get_bit(&self.bitmap, row * w + col) {
                    col += 1;
                }
                fill_rect(&mut out, stride, start * size, row * size, (col - start) * size, size);
            }
        }

        Ok((width as u16, height as u16, out))
    }
}

/// Bounded format target that keeps whole characters up to capacity.
#[derive(Default)]
pub(crate) struct Truncating {
    pub(crate) buf: heapless::String<MAX_TEXT_LEN>,
    pub(crate) truncated: bool,
}

impl fmt::Write for Truncating {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.buf.push(c).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}

/// Maps a `w` x `h` box at text-space offset `(gx, gy)` to the physical
/// top-left corner of its rotated footprint around origin `(x, y)`.
fn place(rotation: Rotation, x: i16, y: i16, gx: i32, gy: i32, w: i32, h: i32) -> (i16, i16) {
    let (x, y) = (x as i32, y as i32);
    let (px, py) = match rotation {
        Rotation::Rotate0 => (x + gx, y + gy),
        Rotation::Rotate90 => (x + gy, y - gx - w + 1),
        Rotation::Rotate180 => (x - gx - w + 1, y - gy - h + 1),
        Rotation::Rotate270 => (x - gy - h + 1, y + gx),
    };
    (clamp_coord(px), clamp_coord(py))
}

fn clamp_coord(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        capture::CaptureSink,
        config::{PanelConfig, PlaneLayout, Plane},
        font::{MemoryFont, PIXEL_5X7},
        item::Source,
        list::DrawList,
        font::{FileFont, FontHeader},
        store::NoStore,
        testutil::MemStore,
    };

    // 'A': 2x2 full block; 'B': 3x1 bar one pixel below the baseline.
    const GLYPHS: [Glyph; 2] = [Glyph::new(0, 2, 2, 3, 0, -2), Glyph::new(1, 3, 1, 4, 1, 0)];
    const BITMAP: [u8; 2] = [0b1111_0000, 0b1110_0000];

    fn tiny() -> MemoryFont<'static> {
        MemoryFont::new(&GLYPHS, &BITMAP, 0x41, 0x42, 4)
    }

    fn panel() -> PanelConfig {
        PanelConfig::new(32, 16, PlaneLayout::Mono)
    }

    #[test]
    fn glyph_items_sit_on_the_baseline() {
        let mut renderer = FontRenderer::new(tiny());
        let mut items = Vec::new();
        let report = renderer
            .print_str(&mut items, 4, 10, Color::Black, Rotation::Rotate0, "AB")
            .unwrap();

        assert_eq!(report.glyphs, 2);
        assert_eq!((report.end_x, report.end_y), (11, 10));
        assert_eq!((items[0].x, items[0].y), (4, 8));
        assert_eq!((items[0].width(), items[0].height()), (2, 2));
        assert_eq!((items[1].x, items[1].y), (8, 10));
    }

    #[test]
    fn size_scales_bitmaps_and_advances() {
        let mut renderer = FontRenderer::new(tiny());
        renderer.set_size(3);
        let mut items = Vec::new();
        let report = renderer
            .print_str(&mut items, 0, 6, Color::Black, Rotation::Rotate0, "A")
            .unwrap();

        assert_eq!(report.end_x, 9);
        assert_eq!((items[0].width(), items[0].height()), (6, 6));
        assert_eq!(items[0].y, 0);
        let Source::Font(pixels) = items[0].source() else {
            panic!("expected a glyph item");
        };
        assert_eq!(pixels.as_slice(), &[0xFC; 6]);
    }

    #[test]
    fn missing_codepoints_advance_by_the_blank_width() {
        let mut renderer = FontRenderer::new(tiny());
        let mut items = Vec::new();
        let report = renderer
            .print_str(&mut items, 0, 4, Color::Black, Rotation::Rotate0, "A?A")
            .unwrap();
        assert_eq!(report.glyphs, 2);
        assert_eq!(items[1].x, 5);
        assert_eq!(renderer.char_width('?').unwrap(), 2);
    }

    #[test]
    fn newline_resets_x_and_moves_down() {
        let mut renderer = FontRenderer::new(tiny());
        let mut items = Vec::new();
        let report = renderer
            .print(&mut items, 1, 2, Color::Red, Rotation::Rotate0, format_args!("A\n{}", "A"))
            .unwrap();
        assert_eq!((items[1].x, items[1].y), (1, 4));
        assert_eq!((report.end_x, report.end_y), (4, 6));
        assert_eq!(items[1].color, Color::Red);
    }

    #[test]
    fn string_width_matches_cursor_travel() {
        let mut renderer = FontRenderer::new(PIXEL_5X7);
        renderer.set_size(2);
        let text = "Hello, tag";
        let width = renderer.string_width(text).unwrap();

        let mut items = Vec::new();
        let report = renderer
            .print_str(&mut items, 3, 20, Color::Black, Rotation::Rotate0, text)
            .unwrap();
        assert_eq!(report.end_x - 3, width as i16);
        assert_eq!(renderer.string_width("AB\nABAB").unwrap(), 2 * renderer.string_width("AB").unwrap());
    }

    #[test]
    fn rotated_text_runs_down_the_panel() {
        let mut renderer = FontRenderer::new(tiny());
        let mut items = Vec::new();
        let report = renderer
            .print_str(&mut items, 10, 0, Color::Black, Rotation::Rotate270, "AA")
            .unwrap();

        // Text x runs down, text y (baseline offset) runs to the left.
        assert_eq!((items[0].x, items[0].y), (11, 0));
        assert_eq!((items[1].x, items[1].y), (11, 3));
        assert_eq!((report.end_x, report.end_y), (10, 6));
        assert!(items.iter().all(|item| item.rotation == Rotation::Rotate270));
    }

    #[test]
    fn glyph_pixels_reach_the_panel() {
        let config = panel();
        let mut list: DrawList<'_, 8> = DrawList::new(config);
        let mut renderer = FontRenderer::new(tiny());
        renderer
            .print_str(&mut list, 0, 2, Color::Black, Rotation::Rotate0, "AB")
            .unwrap();

        let mut sink = CaptureSink::new(config, 0);
        list.flush(&mut sink, &mut NoStore).unwrap();

        assert_eq!(sink.line(Plane::Black, 0)[0], 0b1100_0000);
        assert_eq!(sink.line(Plane::Black, 1)[0], 0b1100_0000);
        assert_eq!(sink.line(Plane::Black, 2)[0], 0b0000_1110);
        assert_eq!(sink.line(Plane::Black, 3)[0], 0);
    }

    #[test]
    fn full_list_drops_glyphs_without_failing() {
        let mut list: DrawList<'_, 1> = DrawList::new(panel());
        let mut renderer = FontRenderer::new(tiny());
        let report = renderer
            .print_str(&mut list, 0, 4, Color::Black, Rotation::Rotate0, "AAA")
            .unwrap();
        assert_eq!(report.glyphs, 1);
        assert_eq!(report.dropped, 2);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn overlong_text_is_truncated() {
        let mut renderer = FontRenderer::new(tiny());
        let mut items = Vec::new();
        let long = "A".repeat(MAX_TEXT_LEN + 10);
        let report = renderer
            .print_str(&mut items, 0, 4, Color::Black, Rotation::Rotate0, &long)
            .unwrap();
        assert_eq!(report.glyphs as usize, MAX_TEXT_LEN);
    }

    #[test]
    fn missing_bitmap_file_fails_without_queueing() {
        let header = FontHeader::new::<()>(0x41, 0x42, 4, "t.glyph", "t.bitmap").unwrap();
        let glyphs: Vec<u8> = GLYPHS.iter().flat_map(|g| g.to_record()).collect();
        let store = MemStore::default()
            .with_file("t.font", header.encode().to_vec())
            .with_file("t.glyph", glyphs);
        let mut renderer = FontRenderer::new(FileFont::open(store, "t.font").unwrap());

        let mut items = Vec::new();
        let result = renderer.print_str(&mut items, 0, 4, Color::Black, Rotation::Rotate0, "A");
        assert!(matches!(result, Err(FontError::Io(_))));
        assert!(items.is_empty());
    }

    /// Writes two glyphs, then fails like a broken `Display` impl.
    struct Failing;

    impl fmt::Display for Failing {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("AB")?;
            Err(fmt::Error)
        }
    }

    #[test]
    fn formatter_error_renders_what_was_written() {
        let mut renderer = FontRenderer::new(tiny());
        let mut items = Vec::new();
        let report = renderer
            .print(&mut items, 0, 4, Color::Black, Rotation::Rotate0, format_args!("{}", Failing))
            .unwrap();
        assert_eq!(report.glyphs, 2);
        assert_eq!(items.len(), 2);
    }
}
