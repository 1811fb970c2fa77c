use heapless::{String, Vec};
use log::debug;

use super::{FontError, FontStore, Glyph};
use crate::store::{FileId, FileStore};

/// Maximum length of a font resource name.
pub const FILENAME_LENGTH: usize = 32;

/// Largest glyph bitmap kept in the bitmap cache.
const CACHED_BITMAP_BYTES: usize = 512;

/// Font descriptor file: codepoint range, line advance, resource names.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FontHeader {
    pub first: u16,
    pub last: u16,
    pub y_advance: u8,
    pub glyph_file: String<FILENAME_LENGTH>,
    pub bitmap_file: String<FILENAME_LENGTH>,
}

impl FontHeader {
    pub const LEN: usize = 5 + 2 * FILENAME_LENGTH;

    pub fn new<E>(
        first: u16,
        last: u16,
        y_advance: u8,
        glyph_file: &str,
        bitmap_file: &str,
    ) -> Result<Self, FontError<E>> {
        Ok(Self {
            first,
            last,
            y_advance,
            glyph_file: String::try_from(glyph_file).map_err(|_| FontError::NameTooLong)?,
            bitmap_file: String::try_from(bitmap_file).map_err(|_| FontError::NameTooLong)?,
        })
    }

    pub fn parse(bytes: &[u8; Self::LEN]) -> Option<Self> {
        let first = u16::from_le_bytes([bytes[0], bytes[1]]);
        let last = u16::from_le_bytes([bytes[2], bytes[3]]);
        if last < first {
            return None;
        }
        Some(Self {
            first,
            last,
            y_advance: bytes[4],
            glyph_file: parse_name(&bytes[5..5 + FILENAME_LENGTH])?,
            bitmap_file: parse_name(&bytes[5 + FILENAME_LENGTH..])?,
        })
    }

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..2].copy_from_slice(&self.first.to_le_bytes());
        out[2..4].copy_from_slice(&self.last.to_le_bytes());
        out[4] = self.y_advance;
        out[5..5 + self.glyph_file.len()].copy_from_slice(self.glyph_file.as_bytes());
        let bitmap_at = 5 + FILENAME_LENGTH;
        out[bitmap_at..bitmap_at + self.bitmap_file.len()].copy_from_slice(self.bitmap_file.as_bytes());
        out
    }
}

fn parse_name(raw: &[u8]) -> Option<String<FILENAME_LENGTH>> {
    let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let name = core::str::from_utf8(&raw[..len]).ok()?;
    String::try_from(name).ok()
}

/// Font read on demand from the file store.
///
/// The glyph and bitmap files are opened on first use and kept open for the
/// font's lifetime. Only the most recent glyph record and bitmap are cached.
#[derive(Debug)]
pub struct FileFont<FS: FileStore> {
    fs: FS,
    header: FontHeader,
    glyph_handle: Option<FileId>,
    bitmap_handle: Option<FileId>,
    last_glyph: Option<(u16, Glyph)>,
    last_bitmap: Option<u16>,
    bitmap_cache: Vec<u8, CACHED_BITMAP_BYTES>,
}

impl<FS: FileStore> FileFont<FS> {
    /// Reads the descriptor `name` from `fs`.
    pub fn open(mut fs: FS, name: &str) -> Result<Self, FontError<FS::Error>> {
        let descriptor = fs.open(name).map_err(FontError::Io)?;
        let mut raw = [0u8; FontHeader::LEN];
        fs.read_at(descriptor, 0, &mut raw).map_err(FontError::Io)?;
        let header = FontHeader::parse(&raw).ok_or(FontError::Corrupt)?;

        debug!(
            "font: opened name={} range=0x{:04X}..=0x{:04X} y_advance={}",
            name, header.first, header.last, header.y_advance
        );

        Ok(Self {
            fs,
            header,
            glyph_handle: None,
            bitmap_handle: None,
            last_glyph: None,
            last_bitmap: None,
            bitmap_cache: Vec::new(),
        })
    }

    pub fn header(&self) -> &FontHeader {
        &self.header
    }

    /// Hands the file store back, closing the font.
    pub fn into_inner(self) -> FS {
        self.fs
    }

    fn glyph_file(&mut self) -> Result<FileId, FontError<FS::Error>> {
        if let Some(handle) = self.glyph_handle {
            return Ok(handle);
        }
        let handle = self
            .fs
            .open(&self.header.glyph_file)
            .map_err(FontError::Io)?;
        self.glyph_handle = Some(handle);
        Ok(handle)
    }

    fn bitmap_file(&mut self) -> Result<FileId, FontError<FS::Error>> {
        if let Some(handle) = self.bitmap_handle {
            return Ok(handle);
        }
        let handle = self
            .fs
            .open(&self.header.bitmap_file)
            .map_err(FontError::Io)?;
        self.bitmap_handle = Some(handle);
        Ok(handle)
    }
}

impl<FS: FileStore> FontStore for FileFont<FS> {
    type IoError = FS::Error;

    fn first(&self) -> u16 {
        self.header.first
    }

    fn last(&self) -> u16 {
        self.header.last
    }

    fn y_advance(&self) -> u8 {
        self.header.y_advance
    }

    fn glyph(&mut self, codepoint: u16) -> Result<Option<Glyph>, FontError<FS::Error>> {
        if !self.contains(codepoint) {
            return Ok(None);
        }
        if let Some((cached, glyph)) = self.last_glyph {
            if cached == codepoint {
                return Ok(Some(glyph));
            }
        }

        let file = self.glyph_file()?;
        let offset = (codepoint - self.header.first) as u32 * Glyph::RECORD_LEN as u32;
        let mut record = [0u8; Glyph::RECORD_LEN];
        self.fs
            .read_at(file, offset, &mut record)
            .map_err(FontError::Io)?;

        let glyph = Glyph::from_record(&record);
        self.last_glyph = Some((codepoint, glyph));
        Ok(Some(glyph))
    }

    fn read_bitmap(&mut self, glyph: &Glyph, out: &mut [u8]) -> Result<(), FontError<FS::Error>> {
        let len = glyph.bitmap_len();
        let out = out.get_mut(..len).ok_or(FontError::Corrupt)?;

        if self.last_bitmap == Some(glyph.bitmap_offset) && self.bitmap_cache.len() == len {
            out.copy_from_slice(&self.bitmap_cache);
            return Ok(());
        }

        let file = self.bitmap_file()?;
        self.fs
            .read_at(file, glyph.bitmap_offset as u32, out)
            .map_err(FontError::Io)?;

        self.bitmap_cache.clear();
        if self.bitmap_cache.extend_from_slice(out).is_ok() {
            self.last_bitmap = Some(glyph.bitmap_offset);
        } else {
            self.bitmap_cache.clear();
            self.last_bitmap = None;
        }
        Ok(())
    }
}
