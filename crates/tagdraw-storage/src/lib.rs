#![cfg_attr(not(test), no_std)]

//! External-flash backing for stored drawables and file fonts.
//!
//! [`TagStorage`] serves raw images by address, a flat file table for fonts
//! and images, and zlib-compressed images through a streaming inflater.

extern crate alloc;

mod inflate;
pub mod table;

use core::fmt::Debug;

use embedded_storage::ReadStorage;
use heapless::Vec;
use log::{debug, warn};
use tagdraw_core::{Encoding, FileId, FileStore, ImageStore, Stored};

use inflate::{InflateCursor, Stream};
pub use table::{FileEntry, MAX_FILES, TABLE_MAGIC, pack_files};

/// Inflate cursors kept alive at once; two covers both planes of a 2bpp
/// image.
const CURSORS: usize = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StorageError<E> {
    /// The flash device failed.
    Flash(E),
    /// No valid file table at the mount address.
    BadTable,
    /// No file of that name.
    NotFound,
    /// Read past the end of a file or the device.
    OutOfRange,
    /// Compressed stream ended before the requested bytes.
    Truncated,
    /// Compressed stream is malformed.
    Inflate,
    /// File handle does not belong to the mounted table.
    BadFile,
    /// Name longer than the table allows.
    NameTooLong,
}

/// Read outside a [`RamFlash`] image.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OutOfBounds;

/// In-memory flash image, for host tools and tests.
#[derive(Clone, Debug, Default)]
pub struct RamFlash<T>(pub T);

impl<T: AsRef<[u8]>> ReadStorage for RamFlash<T> {
    type Error = OutOfBounds;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let src = self
            .0
            .as_ref()
            .get(start..start + bytes.len())
            .ok_or(OutOfBounds)?;
        bytes.copy_from_slice(src);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.0.as_ref().len()
    }
}

/// Flash-backed image and file store.
#[derive(Debug)]
pub struct TagStorage<F> {
    flash: F,
    files: Vec<FileEntry, MAX_FILES>,
    cursors: Vec<InflateCursor, CURSORS>,
    clock: u32,
}

impl<F> TagStorage<F>
where
    F: ReadStorage,
    F::Error: Debug,
{
    pub fn new(flash: F) -> Self {
        Self {
            flash,
            files: Vec::new(),
            cursors: Vec::new(),
            clock: 0,
        }
    }

    /// Loads the file table at `base`, replacing any previous one.
    pub fn mount(&mut self, base: u32) -> Result<usize, StorageError<F::Error>> {
        self.files.clear();
        self.cursors.clear();

        let mut header = [0u8; table::HEADER_LEN];
        self.read_raw(base, &mut header)?;
        let count = table::parse_header(&header).ok_or(StorageError::BadTable)? as usize;
        if count > MAX_FILES {
            warn!("store: file table truncated count={} max={}", count, MAX_FILES);
        }

        for index in 0..count.min(MAX_FILES) {
            let mut raw = [0u8; table::ENTRY_LEN];
            let at = base + (table::HEADER_LEN + index * table::ENTRY_LEN) as u32;
            self.read_raw(at, &mut raw)?;
            let entry = table::FileEntry::parse(&raw, base).ok_or(StorageError::BadTable)?;
            if entry.address as usize + entry.len as usize > self.flash.capacity() {
                return Err(StorageError::BadTable);
            }
            let _ = self.files.push(entry);
        }

        debug!("store: mounted base=0x{:08X} files={}", base, self.files.len());
        Ok(self.files.len())
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn into_inner(self) -> F {
        self.flash
    }

    fn entry(&self, file: FileId) -> Result<&FileEntry, StorageError<F::Error>> {
        self.files.get(file.0 as usize).ok_or(StorageError::BadFile)
    }

    fn read_raw(&mut self, address: u32, buf: &mut [u8]) -> Result<(), StorageError<F::Error>> {
        let end = address as usize + buf.len();
        if end > self.flash.capacity() {
            return Err(StorageError::OutOfRange);
        }
        self.flash.read(address, buf).map_err(StorageError::Flash)
    }

    fn read_file(&mut self, file: FileId, offset: u32, buf: &mut [u8]) -> Result<(), StorageError<F::Error>> {
        let entry = self.entry(file)?;
        if offset as usize + buf.len() > entry.len as usize {
            return Err(StorageError::OutOfRange);
        }
        let address = entry.address + offset;
        self.read_raw(address, buf)
    }

    /// Compressed range behind `at`: a length-prefixed stream in flash, or a
    /// whole file.
    fn stream(&mut self, at: Stored) -> Result<Stream, StorageError<F::Error>> {
        match at {
            Stored::Flash(address) => {
                let mut len = [0u8; 4];
                self.read_raw(address, &mut len)?;
                Ok(Stream {
                    start: address + 4,
                    len: u32::from_le_bytes(len),
                })
            }
            Stored::File(file) => {
                let entry = self.entry(file)?;
                Ok(Stream {
                    start: entry.address,
                    len: entry.len,
                })
            }
        }
    }

    fn read_inflated(&mut self, at: Stored, offset: u32, buf: &mut [u8]) -> Result<(), StorageError<F::Error>> {
        let stream = self.stream(at)?;
        if stream.start as usize + stream.len as usize > self.flash.capacity() {
            return Err(StorageError::OutOfRange);
        }
        self.clock = self.clock.wrapping_add(1);

        let reusable = self
            .cursors
            .iter()
            .enumerate()
            .filter(|(_, cursor)| cursor.stream() == stream && cursor.position() <= offset)
            .max_by_key(|(_, cursor)| cursor.position())
            .map(|(index, _)| index);

        let index = match reusable {
            Some(index) => index,
            None if !self.cursors.is_full() => {
                let _ = self.cursors.push(InflateCursor::new(stream));
                self.cursors.len() - 1
            }
            None => {
                let (index, _) = self
                    .cursors
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, cursor)| cursor.last_used)
                    .ok_or(StorageError::Inflate)?;
                self.cursors[index].restart(stream);
                index
            }
        };

        let cursor = &mut self.cursors[index];
        cursor.last_used = self.clock;
        cursor.read(&mut self.flash, offset, buf)
    }
}

impl<F> ImageStore for TagStorage<F>
where
    F: ReadStorage,
    F::Error: Debug,
{
    type Error = StorageError<F::Error>;

    fn read(&mut self, at: Stored, encoding: Encoding, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        match (encoding, at) {
            (Encoding::Raw, Stored::Flash(address)) => {
                let address = address.checked_add(offset).ok_or(StorageError::OutOfRange)?;
                self.read_raw(address, buf)
            }
            (Encoding::Raw, Stored::File(file)) => self.read_file(file, offset, buf),
            (Encoding::Deflate, at) => self.read_inflated(at, offset, buf),
        }
    }
}

impl<F> FileStore for TagStorage<F>
where
    F: ReadStorage,
    F::Error: Debug,
{
    type Error = StorageError<F::Error>;

    fn open(&mut self, name: &str) -> Result<FileId, Self::Error> {
        self.files
            .iter()
            .position(|entry| entry.name.as_str() == name)
            .map(|index| FileId(index as u16))
            .ok_or(StorageError::NotFound)
    }

    fn read_at(&mut self, file: FileId, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.read_file(file, offset, buf)
    }
}
