//! Public drawing operations on [`DrawList`].
//!
//! Each call builds one item from a caller-facing description (an image
//! location, a shape, a QR payload) and queues it. Stored images are
//! described by their [`ImageHeader`], read once here; pixel data is only
//! fetched line by line during flush.

use alloc::{vec, vec::Vec};
use core::fmt::{self, Write as _};

use log::{debug, warn};

use crate::{
    bits::{bytes_for_bits, draw_fast_hline, fill_rect, get_bit},
    item::{AddError, Color, Combine, DrawItem, Pixels, Rejected, Rotation, Source},
    list::DrawList,
    store::{BitDepth, Encoding, FileStore, ImageHeader, ImageStore, Stored},
    text::Truncating,
};

/// Largest QR symbol version.
pub const MAX_QR_VERSION: u8 = 40;

/// Produces QR module matrices; symbol encoding itself is not done here.
pub trait QrEncoder {
    /// Encodes `data` as a symbol of `version` into `modules` (packed
    /// MSB-first rows, each padded to a byte) and returns the side length
    /// in modules, or `None` when the payload does not fit.
    fn encode(&mut self, version: u8, data: &[u8], modules: &mut [u8]) -> Option<u16>;
}

/// Side length in modules of a QR symbol of `version`.
pub const fn qr_side(version: u8) -> u16 {
    17 + 4 * version as u16
}

fn header_offset() -> u16 {
    ImageHeader::LEN as u16
}

impl<'a, const N: usize> DrawList<'a, N> {
    /// Queues an in-memory 1bpp bitmap. With `mask` set, the bitmap
    /// overwrites what lies beneath it instead of adding to it.
    #[allow(clippy::too_many_arguments)]
    pub fn add_buffered_image(
        &mut self,
        x: i16,
        y: i16,
        color: Color,
        rotation: Rotation,
        pixels: Pixels<'a>,
        width: u16,
        height: u16,
        mask: bool,
    ) -> Result<(), Rejected<'a>> {
        let combine = if mask { Combine::Replace } else { Combine::Or };
        self.add(
            DrawItem::buffered(pixels, width, height)
                .at(x, y)
                .colored(color)
                .rotated(rotation)
                .combined(combine),
        )
    }

    /// Queues a header-prefixed 1bpp image resident in program memory.
    pub fn add_flash_image(
        &mut self,
        x: i16,
        y: i16,
        color: Color,
        rotation: Rotation,
        image: &'a [u8],
    ) -> Result<(), AddError> {
        let header = ImageHeader::parse(image).ok_or(AddError::BadHeader)?;
        if header.depth != BitDepth::One {
            return Err(AddError::BadHeader);
        }
        self.add(
            DrawItem::buffered(Pixels::Borrowed(image), header.width, header.height)
                .with_header_offset(header_offset())
                .at(x, y)
                .colored(color)
                .rotated(rotation),
        )
        .map_err(|rejected| rejected.reason)
    }

    /// Queues a raw image stored in external flash at `address`.
    pub fn add_eeprom_image<S: ImageStore>(
        &mut self,
        x: i16,
        y: i16,
        color: Color,
        rotation: Rotation,
        address: u32,
        store: &mut S,
    ) -> Result<(), AddError> {
        let header = read_header(store, Stored::Flash(address), Encoding::Raw)?;
        let source = Source::Eeprom {
            address,
            depth: header.depth,
        };
        self.add_stored(source, header, x, y, color, rotation)
    }

    /// Queues a zlib-compressed image stored in external flash at `address`.
    ///
    /// 1bpp images paint black; 2bpp images paint both planes.
    pub fn add_compressed_image<S: ImageStore>(
        &mut self,
        x: i16,
        y: i16,
        rotation: Rotation,
        address: u32,
        store: &mut S,
    ) -> Result<(), AddError> {
        let at = Stored::Flash(address);
        let header = read_header(store, at, Encoding::Deflate)?;
        let source = Source::Compressed {
            at,
            depth: header.depth,
        };
        self.add_stored(source, header, x, y, Color::Black, rotation)
    }

    /// Queues a raw image from the file store.
    pub fn add_fs_image<S: ImageStore + FileStore>(
        &mut self,
        x: i16,
        y: i16,
        color: Color,
        rotation: Rotation,
        name: &str,
        store: &mut S,
    ) -> Result<(), AddError> {
        let file = open_file(store, name)?;
        let header = read_header(store, Stored::File(file), Encoding::Raw)?;
        let source = Source::File {
            file,
            depth: header.depth,
        };
        self.add_stored(source, header, x, y, color, rotation)
    }

    /// Queues a zlib-compressed image from the file store.
    pub fn add_compressed_fs_image<S: ImageStore + FileStore>(
        &mut self,
        x: i16,
        y: i16,
        rotation: Rotation,
        name: &str,
        store: &mut S,
    ) -> Result<(), AddError> {
        let at = Stored::File(open_file(store, name)?);
        let header = read_header(store, at, Encoding::Deflate)?;
        let source = Source::Compressed {
            at,
            depth: header.depth,
        };
        self.add_stored(source, header, x, y, Color::Black, rotation)
    }

    /// Encodes the formatted payload as a QR symbol and queues it with each
    /// module drawn as a `scale` x `scale` square.
    #[allow(clippy::too_many_arguments)]
    pub fn add_qr<Q: QrEncoder>(
        &mut self,
        x: i16,
        y: i16,
        color: Color,
        version: u8,
        scale: u8,
        encoder: &mut Q,
        args: fmt::Arguments<'_>,
    ) -> Result<(), AddError> {
        if version == 0 || version > MAX_QR_VERSION || scale == 0 {
            return Err(AddError::EmptyItem);
        }

        let mut payload = Truncating::default();
        if payload.write_fmt(args).is_err() || payload.truncated {
            return Err(AddError::Unencodable);
        }

        let capacity = qr_side(version) as usize;
        let module_stride = bytes_for_bits(capacity);
        let mut modules = vec![0u8; module_stride * capacity];
        let side = encoder
            .encode(version, payload.buf.as_bytes(), &mut modules)
            .filter(|&side| side > 0 && side as usize <= capacity)
            .ok_or(AddError::Unencodable)? as usize;

        let scale = scale as usize;
        let extent = side * scale;
        let stride = bytes_for_bits(extent);
        let mut out = vec![0u8; stride * extent];
        for my in 0..side {
            for mx in 0..side {
                if get_bit(&modules, my * module_stride * 8 + mx) {
                    fill_rect(&mut out, stride, mx * scale, my * scale, scale, scale);
                }
            }
        }

        debug!(
            "draw: qr version={} side={} scale={} payload_len={}",
            version,
            side,
            scale,
            payload.buf.len()
        );
        let extent = u16::try_from(extent).map_err(|_| AddError::Unencodable)?;
        self.add(
            DrawItem::buffered(Pixels::Owned(out), extent, extent)
                .at(x, y)
                .colored(color),
        )
        .map_err(|rejected| rejected.reason)
    }

    /// Queues a filled rectangle with corners rounded by up to three pixels.
    pub fn draw_rounded_rectangle(
        &mut self,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        color: Color,
    ) -> Result<(), AddError> {
        if width == 0 || height == 0 {
            return Err(AddError::EmptyItem);
        }
        let (w, h) = (width as usize, height as usize);
        let radius = 3.min(w / 2).min(h / 2);
        let stride = bytes_for_bits(w);
        let mut out: Vec<u8> = vec![0u8; stride * h];

        for row in 0..h {
            let from_edge = row.min(h - 1 - row);
            let inset = if from_edge < radius {
                radius - 1 - from_edge
            } else {
                0
            };
            draw_fast_hline(&mut out, stride, inset, row, w - 2 * inset);
        }

        self.add(
            DrawItem::buffered(Pixels::Owned(out), width, height)
                .at(x, y)
                .colored(color),
        )
        .map_err(|rejected| rejected.reason)
    }

    /// Queues a rectangle that clears everything beneath it to background.
    pub fn draw_mask(
        &mut self,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        color: Color,
    ) -> Result<(), AddError> {
        self.add(DrawItem::mask(width, height).at(x, y).colored(color))
            .map_err(|rejected| rejected.reason)
    }

    fn add_stored(
        &mut self,
        source: Source<'a>,
        header: ImageHeader,
        x: i16,
        y: i16,
        color: Color,
        rotation: Rotation,
    ) -> Result<(), AddError> {
        self.add(
            DrawItem::new(source, header.width, header.height)
                .with_header_offset(header_offset())
                .at(x, y)
                .colored(color)
                .rotated(rotation),
        )
        .map_err(|rejected| rejected.reason)
    }
}

fn read_header<S: ImageStore>(store: &mut S, at: Stored, encoding: Encoding) -> Result<ImageHeader, AddError> {
    let mut raw = [0u8; ImageHeader::LEN];
    store.read(at, encoding, 0, &mut raw).map_err(|err| {
        warn!("draw: image header unreadable at={:?} err={:?}", at, err);
        AddError::SourceUnavailable
    })?;
    ImageHeader::parse(&raw).ok_or(AddError::BadHeader)
}

fn open_file<S: FileStore>(store: &mut S, name: &str) -> Result<crate::store::FileId, AddError> {
    store.open(name).map_err(|err| {
        warn!("draw: image file unavailable name={} err={:?}", name, err);
        AddError::SourceUnavailable
    })
}
