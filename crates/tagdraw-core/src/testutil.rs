//! In-memory collaborators shared by unit tests.

use std::{string::String, vec::Vec};

use crate::store::{Encoding, FileId, FileStore, ImageStore, Stored};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MemError {
    OutOfRange,
    Missing,
    Broken,
}

/// Flash and files in RAM. Deflate payloads are stored inflated.
#[derive(Debug, Default)]
pub(crate) struct MemStore {
    pub(crate) flash: Vec<u8>,
    pub(crate) files: Vec<(String, Vec<u8>)>,
    pub(crate) reads: usize,
    /// Fail every read once this many have succeeded.
    pub(crate) fail_after: Option<usize>,
}

impl MemStore {
    pub(crate) fn with_flash(flash: Vec<u8>) -> Self {
        Self {
            flash,
            ..Self::default()
        }
    }

    pub(crate) fn with_file(mut self, name: &str, data: Vec<u8>) -> Self {
        self.files.push((name.into(), data));
        self
    }
}

impl ImageStore for MemStore {
    type Error = MemError;

    fn read(&mut self, at: Stored, _: Encoding, offset: u32, buf: &mut [u8]) -> Result<(), MemError> {
        if self.fail_after.is_some_and(|limit| self.reads >= limit) {
            return Err(MemError::Broken);
        }
        let (data, base) = match at {
            Stored::Flash(address) => (&self.flash, address as usize),
            Stored::File(file) => (&self.files.get(file.0 as usize).ok_or(MemError::Missing)?.1, 0),
        };
        let start = base + offset as usize;
        let src = data.get(start..start + buf.len()).ok_or(MemError::OutOfRange)?;
        buf.copy_from_slice(src);
        self.reads += 1;
        Ok(())
    }
}

impl FileStore for MemStore {
    type Error = MemError;

    fn open(&mut self, name: &str) -> Result<FileId, MemError> {
        self.files
            .iter()
            .position(|(n, _)| n == name)
            .map(|i| FileId(i as u16))
            .ok_or(MemError::Missing)
    }

    fn read_at(&mut self, file: FileId, offset: u32, buf: &mut [u8]) -> Result<(), MemError> {
        ImageStore::read(self, Stored::File(file), Encoding::Raw, offset, buf)
    }
}
