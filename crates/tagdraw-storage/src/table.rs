//! Flat file table ("TFS1") stored in external flash.
//!
//! Layout at the table base: `magic u32 LE`, `count u16 LE`, then `count`
//! entries of `name [u8; 32]` (NUL padded), `offset u32 LE` (relative to
//! the table base), `len u32 LE`. File data follows the entries.

use alloc::vec::Vec;

use heapless::String;

use crate::StorageError;

pub const TABLE_MAGIC: u32 = 0x3153_4654; // "TFS1"
pub const NAME_LEN: usize = 32;
pub const HEADER_LEN: usize = 6;
pub const ENTRY_LEN: usize = NAME_LEN + 8;
/// Entries kept after mounting.
pub const MAX_FILES: usize = 32;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileEntry {
    pub name: String<NAME_LEN>,
    /// Absolute flash address of the first data byte.
    pub address: u32,
    pub len: u32,
}

impl FileEntry {
    pub(crate) fn parse(raw: &[u8; ENTRY_LEN], base: u32) -> Option<Self> {
        let name_len = raw[..NAME_LEN]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_LEN);
        let name = core::str::from_utf8(&raw[..name_len]).ok()?;
        let offset = u32::from_le_bytes([raw[32], raw[33], raw[34], raw[35]]);
        let len = u32::from_le_bytes([raw[36], raw[37], raw[38], raw[39]]);
        let address = base.checked_add(offset)?;
        address.checked_add(len)?;

        Some(Self {
            name: String::try_from(name).ok()?,
            address,
            len,
        })
    }
}

pub(crate) fn parse_header(raw: &[u8; HEADER_LEN]) -> Option<u16> {
    let magic = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
    (magic == TABLE_MAGIC).then(|| u16::from_le_bytes([raw[4], raw[5]]))
}

/// Builds a table image holding `files` in order, ready to be placed at
/// any base address.
pub fn pack_files(files: &[(&str, &[u8])]) -> Result<Vec<u8>, StorageError<()>> {
    let count = u16::try_from(files.len()).map_err(|_| StorageError::BadTable)?;
    let data_start = HEADER_LEN + files.len() * ENTRY_LEN;
    let total = data_start + files.iter().map(|(_, data)| data.len()).sum::<usize>();
    u32::try_from(total).map_err(|_| StorageError::OutOfRange)?;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&TABLE_MAGIC.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());

    let mut offset = data_start as u32;
    for (name, data) in files {
        if name.len() > NAME_LEN {
            return Err(StorageError::NameTooLong);
        }
        let mut raw_name = [0u8; NAME_LEN];
        raw_name[..name.len()].copy_from_slice(name.as_bytes());
        out.extend_from_slice(&raw_name);
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        offset += data.len() as u32;
    }
    for (_, data) in files {
        out.extend_from_slice(data);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_table_has_expected_layout() {
        let image = pack_files(&[("a", &[1, 2]), ("bb", &[3])]).unwrap();
        assert_eq!(&image[..4], b"TFS1");
        assert_eq!(parse_header(&image[..HEADER_LEN].try_into().unwrap()), Some(2));
        assert_eq!(image.len(), HEADER_LEN + 2 * ENTRY_LEN + 3);

        let entry: &[u8; ENTRY_LEN] = image[HEADER_LEN + ENTRY_LEN..][..ENTRY_LEN]
            .try_into()
            .unwrap();
        let entry = FileEntry::parse(entry, 0x1000).unwrap();
        assert_eq!(entry.name.as_str(), "bb");
        assert_eq!(entry.address, 0x1000 + (HEADER_LEN + 2 * ENTRY_LEN + 2) as u32);
        assert_eq!(entry.len, 1);
    }

    #[test]
    fn long_names_and_bad_magic_are_rejected() {
        let name = "n".repeat(NAME_LEN + 1);
        assert_eq!(pack_files(&[(&name, &[])]), Err(StorageError::NameTooLong));
        assert_eq!(parse_header(&[0, 0, 0, 0, 1, 0]), None);
    }
}
