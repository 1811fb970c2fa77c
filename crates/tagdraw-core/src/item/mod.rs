//! Drawable items and their geometry.

mod extract;

#[cfg(test)]
mod tests;

use alloc::vec::Vec;

use crate::{
    bits::bytes_for_bits,
    config::{PanelConfig, Plane},
    store::{BitDepth, FileId, Stored},
};

pub(crate) use extract::LineScratch;

/// Quarter-turn applied when mapping an item onto the panel.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Rotation {
    #[default]
    Rotate0,
    /// Top source row becomes the leftmost footprint column.
    Rotate90,
    Rotate180,
    /// Top source row becomes the rightmost footprint column.
    Rotate270,
}

impl Rotation {
    /// Whether source rows run along physical columns.
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Rotate90 | Self::Rotate270)
    }

    const fn quarter_turns(self) -> u8 {
        match self {
            Self::Rotate0 => 0,
            Self::Rotate90 => 1,
            Self::Rotate180 => 2,
            Self::Rotate270 => 3,
        }
    }

    const fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Self::Rotate0,
            1 => Self::Rotate90,
            2 => Self::Rotate180,
            _ => Self::Rotate270,
        }
    }

    /// Rotation equivalent to applying `self` and then `other`.
    pub const fn then(self, other: Rotation) -> Rotation {
        Self::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }
}

/// Planes an item paints into.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Color {
    #[default]
    Black,
    Red,
    /// Same bits merged independently into both planes.
    Dual,
}

impl Color {
    pub const fn targets(self, plane: Plane) -> bool {
        matches!(
            (self, plane),
            (Self::Dual, _) | (Self::Black, Plane::Black) | (Self::Red, Plane::Red)
        )
    }
}

/// How an item's bits combine with what is already on the line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Combine {
    #[default]
    Or,
    /// Overwrite exactly the item's visible pixels.
    Replace,
}

/// Pixel buffer of an in-memory drawable, tagged with its ownership.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Pixels<'a> {
    /// Released when the item is dropped.
    Owned(Vec<u8>),
    /// Kept alive by the caller for the list's lifetime.
    Borrowed(&'a [u8]),
}

impl Pixels<'_> {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Owned(bytes) => bytes,
            Self::Borrowed(bytes) => bytes,
        }
    }

    pub const fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

/// Where an item's pixels come from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source<'a> {
    /// Rasterized glyph.
    Font(Pixels<'a>),
    /// 1bpp bitmap in memory.
    Buffered(Pixels<'a>),
    /// Solid background rectangle.
    Mask,
    /// Raw image in external flash.
    Eeprom { address: u32, depth: BitDepth },
    /// zlib-compressed image in flash or in the file store.
    Compressed { at: Stored, depth: BitDepth },
    /// Raw image in the file store.
    File { file: FileId, depth: BitDepth },
}

/// Discriminant of [`Source`], matching the storage tiers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DrawType {
    Font,
    Buffered1bpp,
    Mask,
    Eeprom1bpp,
    Eeprom2bpp,
    Compressed,
    Filestore1bpp,
    Filestore2bpp,
}

impl Source<'_> {
    pub const fn draw_type(&self) -> DrawType {
        match self {
            Self::Font(_) => DrawType::Font,
            Self::Buffered(_) => DrawType::Buffered1bpp,
            Self::Mask => DrawType::Mask,
            Self::Eeprom {
                depth: BitDepth::One,
                ..
            } => DrawType::Eeprom1bpp,
            Self::Eeprom {
                depth: BitDepth::Two,
                ..
            } => DrawType::Eeprom2bpp,
            Self::Compressed { .. } => DrawType::Compressed,
            Self::File {
                depth: BitDepth::One,
                ..
            } => DrawType::Filestore1bpp,
            Self::File {
                depth: BitDepth::Two,
                ..
            } => DrawType::Filestore2bpp,
        }
    }

    const fn depth(&self) -> BitDepth {
        match self {
            Self::Eeprom { depth, .. } | Self::Compressed { depth, .. } | Self::File { depth, .. } => {
                *depth
            }
            Self::Font(_) | Self::Buffered(_) | Self::Mask => BitDepth::One,
        }
    }

    fn pixels(&self) -> Option<&Pixels<'_>> {
        match self {
            Self::Font(pixels) | Self::Buffered(pixels) => Some(pixels),
            _ => None,
        }
    }
}

/// Reasons an item is refused by the list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AddError {
    /// Width or height is zero.
    EmptyItem,
    /// In-memory buffer shorter than its declared geometry.
    BufferTooSmall { needed: usize, actual: usize },
    /// The list is at capacity.
    ListFull,
    /// Stored image header missing, unreadable or unsupported.
    BadHeader,
    /// Backing store or file could not be reached.
    SourceUnavailable,
    /// The symbol encoder could not fit the payload.
    Unencodable,
}

/// An item refused by the list, handed back to the caller with its buffer.
#[derive(Debug)]
pub struct Rejected<'a> {
    pub reason: AddError,
    pub item: DrawItem<'a>,
}

/// One queued drawable.
#[derive(Clone, Debug)]
pub struct DrawItem<'a> {
    source: Source<'a>,
    width: u16,
    height: u16,
    pub x: i16,
    pub y: i16,
    pub rotation: Rotation,
    pub color: Color,
    pub combine: Combine,
    pub mirror_h: bool,
    pub mirror_v: bool,
    pub inverted: bool,
    header_offset: u16,
    width_bytes: u16,
    drawn_width_bytes: u16,
}

impl<'a> DrawItem<'a> {
    /// Creates an item at the origin with default styling.
    pub fn new(source: Source<'a>, width: u16, height: u16) -> Self {
        Self {
            source,
            width,
            height,
            x: 0,
            y: 0,
            rotation: Rotation::Rotate0,
            color: Color::Black,
            combine: Combine::Or,
            mirror_h: false,
            mirror_v: false,
            inverted: false,
            header_offset: 0,
            width_bytes: bytes_for_bits(width as usize) as u16,
            drawn_width_bytes: 0,
        }
    }

    pub fn buffered(pixels: Pixels<'a>, width: u16, height: u16) -> Self {
        Self::new(Source::Buffered(pixels), width, height)
    }

    pub fn glyph(pixels: Pixels<'a>, width: u16, height: u16) -> Self {
        Self::new(Source::Font(pixels), width, height)
    }

    /// Background rectangle that overwrites whatever lies underneath.
    pub fn mask(width: u16, height: u16) -> Self {
        Self::new(Source::Mask, width, height).combined(Combine::Replace)
    }

    pub fn at(mut self, x: i16, y: i16) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn rotated(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn combined(mut self, combine: Combine) -> Self {
        self.combine = combine;
        self
    }

    pub fn mirrored(mut self, mirror_h: bool, mirror_v: bool) -> Self {
        self.mirror_h = mirror_h;
        self.mirror_v = mirror_v;
        self
    }

    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// Bytes to skip in front of the pixel data.
    pub fn with_header_offset(mut self, offset: u16) -> Self {
        self.header_offset = offset;
        self
    }

    pub fn source(&self) -> &Source<'a> {
        &self.source
    }

    pub const fn draw_type(&self) -> DrawType {
        self.source.draw_type()
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn header_offset(&self) -> u16 {
        self.header_offset
    }

    /// Source row stride in bytes.
    pub const fn width_bytes(&self) -> u16 {
        self.width_bytes
    }

    /// Bytes of panel line this item writes, after clipping.
    pub const fn drawn_width_bytes(&self) -> u16 {
        self.drawn_width_bytes
    }

    /// Whether the item owns (and will release) its buffer.
    pub fn owns_buffer(&self) -> bool {
        self.source.pixels().is_some_and(Pixels::is_owned)
    }

    /// Physical extent `(width, height)` after rotation.
    pub const fn footprint(&self) -> (u16, u16) {
        if self.rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Whether this item paints into `plane`.
    pub const fn targets(&self, plane: Plane) -> bool {
        match self.source.depth() {
            BitDepth::Two => true,
            BitDepth::One => self.color.targets(plane),
        }
    }

    /// Whether physical scanline `row` crosses the footprint.
    pub fn covers_row(&self, row: u16) -> bool {
        let top = self.y as i32;
        let bottom = top + self.footprint().1 as i32;
        (top..bottom).contains(&(row as i32))
    }

    /// Last physical scanline the footprint touches, if any is on-panel.
    pub(crate) fn last_row(&self) -> Option<u16> {
        let bottom = self.y as i32 + self.footprint().1 as i32 - 1;
        u16::try_from(bottom).ok()
    }

    /// Visible physical column range `[start, end)` on a panel `width` wide.
    pub(crate) fn visible_columns(&self, width: u16) -> Option<(usize, usize)> {
        let left = self.x as i32;
        let right = left + self.footprint().0 as i32;
        let start = left.max(0);
        let end = right.min(width as i32);
        (start < end).then_some((start as usize, end as usize))
    }

    /// Validates geometry and derives the clipped line span.
    pub fn check_bounds(&mut self, config: &PanelConfig) -> Result<(), AddError> {
        if self.width == 0 || self.height == 0 {
            return Err(AddError::EmptyItem);
        }

        self.width_bytes = bytes_for_bits(self.width as usize) as u16;
        if let Some(pixels) = self.source.pixels() {
            let needed = self.header_offset as usize
                + self.width_bytes as usize * self.height as usize;
            let actual = pixels.as_slice().len();
            if actual < needed {
                return Err(AddError::BufferTooSmall { needed, actual });
            }
        }

        self.drawn_width_bytes = match self.visible_columns(config.width) {
            Some((start, end)) => ((end - 1) / 8 - start / 8 + 1) as u16,
            None => 0,
        };
        debug_assert!(self.drawn_width_bytes as usize <= config.line_bytes());
        Ok(())
    }
}
