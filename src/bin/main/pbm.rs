//! Binary PBM (`P4`) files, the preview output and the input for image
//! conversion. Rows are packed MSB-first and padded to bytes, exactly like
//! panel lines, so planes are written without repacking.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bitmap {
    pub width: u16,
    pub height: u16,
    pub rows: Vec<u8>,
}

pub fn encode(width: u16, height: u16, rows: &[u8]) -> Vec<u8> {
    let mut out = format!("P4\n{width} {height}\n").into_bytes();
    out.extend_from_slice(rows);
    out
}

pub fn write(path: &Path, width: u16, height: u16, rows: &[u8]) -> Result<()> {
    fs::write(path, encode(width, height, rows))
        .with_context(|| format!("writing {}", path.display()))
}

pub fn read(path: &Path) -> Result<Bitmap> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse(&bytes).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse(bytes: &[u8]) -> Result<Bitmap> {
    let mut pos = 0usize;
    if !bytes.starts_with(b"P4") {
        bail!("not a binary PBM");
    }
    pos += 2;

    let width = header_number(bytes, &mut pos)?;
    let height = header_number(bytes, &mut pos)?;
    // Exactly one whitespace byte separates the header from the raster.
    pos += 1;

    let len = (width as usize).div_ceil(8) * height as usize;
    let Some(rows) = bytes.get(pos..pos + len) else {
        bail!("raster truncated: want {} bytes", len);
    };
    Ok(Bitmap {
        width,
        height,
        rows: rows.to_vec(),
    })
}

fn header_number(bytes: &[u8], pos: &mut usize) -> Result<u16> {
    loop {
        match bytes.get(*pos) {
            Some(b) if b.is_ascii_whitespace() => *pos += 1,
            Some(b'#') => {
                while bytes.get(*pos).is_some_and(|&b| b != b'\n') {
                    *pos += 1;
                }
            }
            _ => break,
        }
    }

    let start = *pos;
    while bytes.get(*pos).is_some_and(u8::is_ascii_digit) {
        *pos += 1;
    }
    let digits = std::str::from_utf8(&bytes[start..*pos])?;
    digits
        .parse()
        .with_context(|| format!("bad header number {digits:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_with_comment_parses() {
        let bitmap = parse(b"P4\n# made by hand\n10 2\n\xFF\xC0\x80\x00").unwrap();
        assert_eq!((bitmap.width, bitmap.height), (10, 2));
        assert_eq!(bitmap.rows, vec![0xFF, 0xC0, 0x80, 0x00]);
    }

    #[test]
    fn encoded_output_reads_back() {
        let bytes = encode(3, 1, &[0xA0]);
        assert_eq!(&bytes[..8], b"P4\n3 1\n\xA0");
        assert_eq!(parse(&bytes).unwrap().rows, vec![0xA0]);
    }

    #[test]
    fn short_raster_is_rejected() {
        assert!(parse(b"P4 16 2\n\x00\x00").is_err());
        assert!(parse(b"P1 1 1\n0").is_err());
    }
}
