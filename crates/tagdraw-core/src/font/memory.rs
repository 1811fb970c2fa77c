use core::convert::Infallible;

use super::{FontError, FontStore, Glyph};

/// Font whose glyph table and bitmap blob live in memory.
#[derive(Clone, Copy, Debug)]
pub struct MemoryFont<'a> {
    glyphs: &'a [Glyph],
    bitmap: &'a [u8],
    first: u16,
    last: u16,
    y_advance: u8,
}

impl<'a> MemoryFont<'a> {
    /// `glyphs[i]` describes codepoint `first + i`.
    pub const fn new(glyphs: &'a [Glyph], bitmap: &'a [u8], first: u16, last: u16, y_advance: u8) -> Self {
        Self {
            glyphs,
            bitmap,
            first,
            last,
            y_advance,
        }
    }
}

impl FontStore for MemoryFont<'_> {
    type IoError = Infallible;

    fn first(&self) -> u16 {
        self.first
    }

    fn last(&self) -> u16 {
        self.last
    }

    fn y_advance(&self) -> u8 {
        self.y_advance
    }

    fn glyph(&mut self, codepoint: u16) -> Result<Option<Glyph>, FontError<Infallible>> {
        if !self.contains(codepoint) {
            return Ok(None);
        }
        self.glyphs
            .get((codepoint - self.first) as usize)
            .copied()
            .map(Some)
            .ok_or(FontError::Corrupt)
    }

    fn read_bitmap(&mut self, glyph: &Glyph, out: &mut [u8]) -> Result<(), FontError<Infallible>> {
        let len = glyph.bitmap_len();
        let start = glyph.bitmap_offset as usize;
        let bits = self.bitmap.get(start..start + len).ok_or(FontError::Corrupt)?;
        out.get_mut(..len)
            .ok_or(FontError::Corrupt)?
            .copy_from_slice(bits);
        Ok(())
    }
}
