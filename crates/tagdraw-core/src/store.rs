//! Storage and filesystem collaborator interfaces.
//!
//! The compositor never touches flash or files directly; stored drawables
//! name a location and every byte is fetched through [`ImageStore`].

use core::fmt::Debug;

/// Handle of an opened file-store entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FileId(pub u16);

/// Where a stored image payload lives.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stored {
    /// Absolute address in external flash.
    Flash(u32),
    /// Entry of the file store.
    File(FileId),
}

/// How the payload bytes are encoded at their location.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Encoding {
    Raw,
    /// zlib stream; offsets address the inflated bytes.
    Deflate,
}

/// Random-access reader for stored image payloads.
pub trait ImageStore {
    type Error: Debug;

    /// Fills `buf` with payload bytes starting at `offset`.
    fn read(
        &mut self,
        at: Stored,
        encoding: Encoding,
        offset: u32,
        buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

impl<T: ImageStore + ?Sized> ImageStore for &mut T {
    type Error = T::Error;

    fn read(
        &mut self,
        at: Stored,
        encoding: Encoding,
        offset: u32,
        buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        (**self).read(at, encoding, offset, buf)
    }
}

/// Error returned by [`NoStore`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Unavailable;

/// Store for lists that only hold in-memory drawables.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStore;

impl ImageStore for NoStore {
    type Error = Unavailable;

    fn read(&mut self, _: Stored, _: Encoding, _: u32, _: &mut [u8]) -> Result<(), Self::Error> {
        Err(Unavailable)
    }
}

/// Named-file reader backing file fonts and file-store images.
pub trait FileStore {
    type Error: Debug;

    fn open(&mut self, name: &str) -> Result<FileId, Self::Error>;

    /// Fills `buf` from `offset`; a short file is an error.
    fn read_at(&mut self, file: FileId, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error>;
}

impl<T: FileStore + ?Sized> FileStore for &mut T {
    type Error = T::Error;

    fn open(&mut self, name: &str) -> Result<FileId, Self::Error> {
        (**self).open(name)
    }

    fn read_at(&mut self, file: FileId, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read_at(file, offset, buf)
    }
}

/// Bits per pixel of an image payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BitDepth {
    /// One bitplane.
    One,
    /// Black bitplane followed by red bitplane.
    Two,
}

/// Fixed header in front of every stored image payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ImageHeader {
    pub width: u16,
    pub height: u16,
    pub depth: BitDepth,
}

impl ImageHeader {
    pub const LEN: usize = 5;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; Self::LEN] = bytes.get(..Self::LEN)?.try_into().ok()?;
        let depth = match bytes[4] {
            1 => BitDepth::One,
            2 => BitDepth::Two,
            _ => return None,
        };

        Some(Self {
            width: u16::from_le_bytes([bytes[0], bytes[1]]),
            height: u16::from_le_bytes([bytes[2], bytes[3]]),
            depth,
        })
    }

    pub fn encode(&self) -> [u8; Self::LEN] {
        let [w0, w1] = self.width.to_le_bytes();
        let [h0, h1] = self.height.to_le_bytes();
        let bpp = match self.depth {
            BitDepth::One => 1,
            BitDepth::Two => 2,
        };
        [w0, w1, h0, h1, bpp]
    }
}
