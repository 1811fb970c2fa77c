//! Per-scanline extraction of an item's bits.
//!
//! 0° and 180° read one source row per scanline (X line); 90° and 270° read
//! one source column down every source row (Y line). Runs are built in
//! source order, mirrored end to end when the physical order is reversed,
//! then shifted so their first valid bit lands on the item's physical x.

use alloc::vec::Vec;

use log::debug;

use super::{Combine, DrawItem, Rotation, Source};
use crate::{
    bits::{
        bytes_for_bits, copy_with_byte_shift, mirror_run, set_bit, shift_bytes_right, span_mask,
    },
    config::Plane,
    store::{BitDepth, Encoding, ImageStore, Stored},
};

/// Scratch run reused by every contribution while a flush runs.
#[derive(Debug, Default)]
pub(crate) struct LineScratch {
    run: Vec<u8>,
}

impl LineScratch {
    pub(crate) const fn new() -> Self {
        Self { run: Vec::new() }
    }

    fn zeroed(&mut self, len: usize) -> &mut [u8] {
        self.run.clear();
        self.run.resize(len, 0);
        &mut self.run
    }
}

/// Storage read failure while extracting one line of one item.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ExtractFault;

/// Aligned bits of one item on one scanline.
#[derive(Debug)]
pub(crate) struct Contribution<'s> {
    /// `bytes[i]` lines up with physical byte `first_byte + i`.
    bytes: &'s [u8],
    first_byte: isize,
    /// Visible physical columns `[start, end)`.
    start: usize,
    end: usize,
}

impl Contribution<'_> {
    pub(crate) fn merge_into(&self, line: &mut [u8], combine: Combine) {
        for byte in self.start / 8..=(self.end - 1) / 8 {
            let Some(slot) = line.get_mut(byte) else {
                break;
            };

            let bits = usize::try_from(byte as isize - self.first_byte)
                .ok()
                .and_then(|index| self.bytes.get(index))
                .copied()
                .unwrap_or(0);
            let mask = span_mask(byte, self.start, self.end);

            match combine {
                Combine::Or => *slot |= bits & mask,
                Combine::Replace => *slot = (*slot & !mask) | (bits & mask),
            }
        }
    }
}

/// Source geometry shared by both extraction directions.
struct Layout {
    width: usize,
    height: usize,
    stride: usize,
    /// Byte offset of the requested plane's first row.
    base: usize,
}

impl Layout {
    fn row_offset(&self, row: usize) -> usize {
        self.base + row * self.stride
    }
}

impl DrawItem<'_> {
    /// Extracts this item's bits for physical scanline `row` of `plane`.
    ///
    /// `Ok(None)` means the item does not touch this line or plane.
    pub(crate) fn contribution<'s, S: ImageStore>(
        &self,
        row: u16,
        plane: Plane,
        panel_width: u16,
        store: &mut S,
        scratch: &'s mut LineScratch,
    ) -> Result<Option<Contribution<'s>>, ExtractFault> {
        if !self.targets(plane) || !self.covers_row(row) {
            return Ok(None);
        }
        let Some((start, end)) = self.visible_columns(panel_width) else {
            return Ok(None);
        };

        let local = (row as i32 - self.y as i32) as usize;
        let stride = self.width_bytes as usize;
        let plane_base = match self.source.depth() {
            BitDepth::One => 0,
            BitDepth::Two => plane.index() * stride * self.height as usize,
        };
        let layout = Layout {
            width: self.width as usize,
            height: self.height as usize,
            stride,
            base: self.header_offset as usize + plane_base,
        };

        let x_line = !self.rotation.swaps_axes();
        let (run_bits, flip) = if x_line {
            (
                layout.width,
                (self.rotation == Rotation::Rotate180) ^ self.mirror_h,
            )
        } else {
            (
                layout.height,
                (self.rotation == Rotation::Rotate270) ^ self.mirror_v,
            )
        };
        let len = bytes_for_bits(run_bits);
        let pad = if flip { len * 8 - run_bits } else { 0 };
        let origin = self.x as isize - pad as isize;
        let shift = origin.rem_euclid(8) as u8;
        let first_byte = origin.div_euclid(8);

        let buf = scratch.zeroed(len + 1);

        if x_line {
            let source_row = match self.rotation {
                Rotation::Rotate180 => layout.height - 1 - local,
                _ => local,
            };
            let source_row = if self.mirror_v {
                layout.height - 1 - source_row
            } else {
                source_row
            };

            if let Some(pixels) = self.source.pixels() {
                let offset = layout.row_offset(source_row);
                let Some(bits) = pixels.as_slice().get(offset..offset + stride) else {
                    return Err(ExtractFault);
                };

                if !flip && !self.inverted {
                    copy_with_byte_shift(buf, bits, shift);
                    return Ok(Some(Contribution {
                        bytes: buf,
                        first_byte,
                        start,
                        end,
                    }));
                }
                buf[..len].copy_from_slice(bits);
            } else if let Some((at, encoding)) = self.stored_location() {
                let offset = to_offset(layout.row_offset(source_row))?;
                store
                    .read(at, encoding, offset, &mut buf[..len])
                    .map_err(|err| fault(self, row, err))?;
            }
        } else {
            let column = match self.rotation {
                Rotation::Rotate90 => layout.width - 1 - local,
                _ => local,
            };
            let column = if self.mirror_h {
                layout.width - 1 - column
            } else {
                column
            };
            self.fill_column(&layout, column, row, store, &mut buf[..len])?;
        }

        if flip {
            mirror_run(&mut buf[..len]);
        }
        if self.inverted {
            for byte in &mut buf[..len] {
                *byte ^= 0xFF;
            }
        }
        shift_bytes_right(buf, shift);

        Ok(Some(Contribution {
            bytes: buf,
            first_byte,
            start,
            end,
        }))
    }

    /// Gathers source column `column` top to bottom into `run`.
    fn fill_column<S: ImageStore>(
        &self,
        layout: &Layout,
        column: usize,
        row: u16,
        store: &mut S,
        run: &mut [u8],
    ) -> Result<(), ExtractFault> {
        let mask = 0x80u8 >> (column % 8);

        if let Some(pixels) = self.source.pixels() {
            let data = pixels.as_slice();
            for source_row in 0..layout.height {
                let byte = data
                    .get(layout.row_offset(source_row) + column / 8)
                    .ok_or(ExtractFault)?;
                if byte & mask != 0 {
                    set_bit(run, source_row);
                }
            }
        } else if let Some((at, encoding)) = self.stored_location() {
            let mut byte = [0u8; 1];
            for source_row in 0..layout.height {
                let offset = to_offset(layout.row_offset(source_row) + column / 8)?;
                store
                    .read(at, encoding, offset, &mut byte)
                    .map_err(|err| fault(self, row, err))?;
                if byte[0] & mask != 0 {
                    set_bit(run, source_row);
                }
            }
        }

        Ok(())
    }

    fn stored_location(&self) -> Option<(Stored, Encoding)> {
        match self.source {
            Source::Eeprom { address, .. } => Some((Stored::Flash(address), Encoding::Raw)),
            Source::Compressed { at, .. } => Some((at, Encoding::Deflate)),
            Source::File { file, .. } => Some((Stored::File(file), Encoding::Raw)),
            Source::Font(_) | Source::Buffered(_) | Source::Mask => None,
        }
    }
}

fn to_offset(offset: usize) -> Result<u32, ExtractFault> {
    u32::try_from(offset).map_err(|_| ExtractFault)
}

fn fault<E: core::fmt::Debug>(item: &DrawItem<'_>, row: u16, err: E) -> ExtractFault {
    debug!(
        "draw: line fetch failed type={:?} row={} err={:?}",
        item.draw_type(),
        row,
        err
    );
    ExtractFault
}
