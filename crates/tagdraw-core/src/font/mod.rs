//! Glyph metrics and bitmap access for GFX-style fonts.
//!
//! Fonts are either resident in memory ([`MemoryFont`]) or read on demand
//! from the file store ([`FileFont`]). Both expose the same [`FontStore`]
//! interface, and [`AnyFont`] picks one at load time.

mod file;
mod memory;
mod pixel5x7;

use core::{convert::Infallible, fmt::Debug};

pub use file::{FILENAME_LENGTH, FileFont, FontHeader};
pub use memory::MemoryFont;
pub use pixel5x7::PIXEL_5X7;

use crate::store::FileStore;

/// Metrics of one glyph, as stored in the 7-byte glyph record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Glyph {
    /// Byte offset of the glyph bitmap in the font's bitmap blob.
    pub bitmap_offset: u16,
    pub width: u8,
    pub height: u8,
    /// Cursor advance after this glyph.
    pub x_advance: u8,
    /// Left edge relative to the cursor.
    pub x_offset: i8,
    /// Top edge relative to the baseline.
    pub y_offset: i8,
}

impl Glyph {
    pub const RECORD_LEN: usize = 7;

    pub const fn new(
        bitmap_offset: u16,
        width: u8,
        height: u8,
        x_advance: u8,
        x_offset: i8,
        y_offset: i8,
    ) -> Self {
        Self {
            bitmap_offset,
            width,
            height,
            x_advance,
            x_offset,
            y_offset,
        }
    }

    pub fn from_record(record: &[u8; Self::RECORD_LEN]) -> Self {
        Self {
            bitmap_offset: u16::from_le_bytes([record[0], record[1]]),
            width: record[2],
            height: record[3],
            x_advance: record[4],
            x_offset: record[5] as i8,
            y_offset: record[6] as i8,
        }
    }

    pub fn to_record(&self) -> [u8; Self::RECORD_LEN] {
        let [o0, o1] = self.bitmap_offset.to_le_bytes();
        [
            o0,
            o1,
            self.width,
            self.height,
            self.x_advance,
            self.x_offset as u8,
            self.y_offset as u8,
        ]
    }

    /// Bytes of the packed bitmap (`width * height` bits, rows unpadded).
    pub const fn bitmap_len(&self) -> usize {
        (self.width as usize * self.height as usize).div_ceil(8)
    }

    /// Whether the glyph has no pixels and only advances the cursor.
    pub const fn is_blank(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FontError<E> {
    /// The backing file store failed.
    Io(E),
    /// Descriptor, glyph table or bitmap is inconsistent.
    Corrupt,
    /// Resource name longer than [`FILENAME_LENGTH`].
    NameTooLong,
}

impl FontError<Infallible> {
    /// Widens an in-memory font error into any I/O error type.
    pub fn widen<E>(self) -> FontError<E> {
        match self {
            Self::Io(never) => match never {},
            Self::Corrupt => FontError::Corrupt,
            Self::NameTooLong => FontError::NameTooLong,
        }
    }
}

/// Source of glyph metrics and bitmaps.
pub trait FontStore {
    type IoError: Debug;

    /// First covered codepoint.
    fn first(&self) -> u16;

    /// Last covered codepoint, inclusive.
    fn last(&self) -> u16;

    /// Line advance in pixels.
    fn y_advance(&self) -> u8;

    /// Metrics for `codepoint`, or `None` outside `[first, last]`.
    fn glyph(&mut self, codepoint: u16) -> Result<Option<Glyph>, FontError<Self::IoError>>;

    /// Reads the packed bitmap of `glyph` into `out[..glyph.bitmap_len()]`.
    fn read_bitmap(&mut self, glyph: &Glyph, out: &mut [u8]) -> Result<(), FontError<Self::IoError>>;

    fn contains(&self, codepoint: u16) -> bool {
        (self.first()..=self.last()).contains(&codepoint)
    }

    /// Advance used for codepoints the font does not cover.
    fn blank_advance(&mut self) -> Result<u8, FontError<Self::IoError>> {
        match self.glyph(u16::from(b' '))? {
            Some(space) if space.x_advance > 0 => Ok(space.x_advance),
            _ => Ok(self.y_advance() / 2),
        }
    }
}

impl<T: FontStore + ?Sized> FontStore for &mut T {
    type IoError = T::IoError;

    fn first(&self) -> u16 {
        (**self).first()
    }

    fn last(&self) -> u16 {
        (**self).last()
    }

    fn y_advance(&self) -> u8 {
        (**self).y_advance()
    }

    fn glyph(&mut self, codepoint: u16) -> Result<Option<Glyph>, FontError<Self::IoError>> {
        (**self).glyph(codepoint)
    }

    fn read_bitmap(&mut self, glyph: &Glyph, out: &mut [u8]) -> Result<(), FontError<Self::IoError>> {
        (**self).read_bitmap(glyph, out)
    }

    fn blank_advance(&mut self) -> Result<u8, FontError<Self::IoError>> {
        (**self).blank_advance()
    }
}

/// Font chosen at load time: built into the image or read from files.
#[derive(Debug)]
pub enum AnyFont<'a, FS: FileStore> {
    Memory(MemoryFont<'a>),
    File(FileFont<FS>),
}

impl<'a, FS: FileStore> AnyFont<'a, FS> {
    /// Opens the named font from `fs`, falling back to `fallback` when the
    /// descriptor cannot be read.
    pub fn open_or(fs: FS, name: &str, fallback: MemoryFont<'a>) -> (Self, Option<FontError<FS::Error>>) {
        match FileFont::open(fs, name) {
            Ok(font) => (Self::File(font), None),
            Err(err) => (Self::Memory(fallback), Some(err)),
        }
    }
}

impl<FS: FileStore> FontStore for AnyFont<'_, FS> {
    type IoError = FS::Error;

    fn first(&self) -> u16 {
        match self {
            Self::Memory(font) => font.first(),
            Self::File(font) => font.first(),
        }
    }

    fn last(&self) -> u16 {
        match self {
            Self::Memory(font) => font.last(),
            Self::File(font) => font.last(),
        }
    }

    fn y_advance(&self) -> u8 {
        match self {
            Self::Memory(font) => font.y_advance(),
            Self::File(font) => font.y_advance(),
        }
    }

    fn glyph(&mut self, codepoint: u16) -> Result<Option<Glyph>, FontError<Self::IoError>> {
        match self {
            Self::Memory(font) => font.glyph(codepoint).map_err(|err| err.widen()),
            Self::File(font) => font.glyph(codepoint),
        }
    }

    fn read_bitmap(&mut self, glyph: &Glyph, out: &mut [u8]) -> Result<(), FontError<Self::IoError>> {
        match self {
            Self::Memory(font) => font.read_bitmap(glyph, out).map_err(|err| err.widen()),
            Self::File(font) => font.read_bitmap(glyph, out),
        }
    }
}
