//! Bit and byte primitives shared by line extraction and glyph rendering.
//!
//! Bit mapping within a packed run: bit 7 of byte 0 is the first pixel.
//! None of these helpers allocate; callers size every buffer.

/// Reverses the bit order of one byte.
#[inline]
pub const fn bit_reverse(byte: u8) -> u8 {
    byte.reverse_bits()
}

/// Reverses the byte order of `buf` in place.
#[inline]
pub fn reverse_bytes(buf: &mut [u8]) {
    buf.reverse();
}

/// Mirrors a packed run end to end: byte order and the bits of every byte.
///
/// A run of `n` valid bits padded to whole bytes ends up with its valid
/// bits starting at bit `buf.len() * 8 - n`.
pub fn mirror_run(buf: &mut [u8]) {
    reverse_bytes(buf);
    for byte in buf.iter_mut() {
        *byte = bit_reverse(*byte);
    }
}

/// Shifts the whole buffer right by `shift` (0..=7) bits.
///
/// Bits carried out of byte `i` land in the top of byte `i + 1`; the carry
/// out of the last byte is discarded.
pub fn shift_bytes_right(buf: &mut [u8], shift: u8) {
    debug_assert!(shift < 8);
    if shift == 0 {
        return;
    }

    let mut carry = 0u8;
    for byte in buf.iter_mut() {
        let next = *byte << (8 - shift);
        *byte = (*byte >> shift) | carry;
        carry = next;
    }
}

/// Copies `src` into `dst` shifted right by `offset` (0..=7) bits.
///
/// `dst` must be exactly one byte longer than `src`; the extra byte takes
/// the bits shifted out of the last source byte.
pub fn copy_with_byte_shift(dst: &mut [u8], src: &[u8], offset: u8) {
    debug_assert!(offset < 8);
    debug_assert_eq!(dst.len(), src.len() + 1);

    let mut carry = 0u8;
    for (out, &byte) in dst.iter_mut().zip(src) {
        if offset == 0 {
            *out = byte;
        } else {
            *out = (byte >> offset) | carry;
            carry = byte << (8 - offset);
        }
    }

    if let Some(last) = dst.get_mut(src.len()) {
        *last = carry;
    }
}

/// Bytes needed to hold `bits` packed bits.
#[inline]
pub const fn bytes_for_bits(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Reads bit `index` of a packed run. Out-of-range bits read as unset.
#[inline]
pub fn get_bit(buf: &[u8], index: usize) -> bool {
    buf.get(index / 8)
        .is_some_and(|byte| byte & (0x80 >> (index % 8)) != 0)
}

/// Sets bit `index` of a packed run. Out-of-range bits are ignored.
#[inline]
pub fn set_bit(buf: &mut [u8], index: usize) {
    if let Some(byte) = buf.get_mut(index / 8) {
        *byte |= 0x80 >> (index % 8);
    }
}

/// Sets `w` pixels of row `y` starting at column `x` in a row-padded bitmap
/// with `stride` bytes per row.
pub fn draw_fast_hline(buf: &mut [u8], stride: usize, x: usize, y: usize, w: usize) {
    let row_start = y * stride * 8;
    let row_end = (x + w).min(stride * 8);
    for col in x..row_end {
        set_bit(buf, row_start + col);
    }
}

/// Fills a `w` x `h` rectangle in a row-padded bitmap.
pub fn fill_rect(buf: &mut [u8], stride: usize, x: usize, y: usize, w: usize, h: usize) {
    for row in y..y + h {
        draw_fast_hline(buf, stride, x, row, w);
    }
}

/// Mask of the bits of physical byte `byte` that fall in columns `[start, end)`.
#[inline]
pub(crate) fn span_mask(byte: usize, start: usize, end: usize) -> u8 {
    let byte_start = byte * 8;
    let mut mask = 0xFFu8;
    if start > byte_start {
        mask &= 0xFFu8.checked_shr((start - byte_start) as u32).unwrap_or(0);
    }
    if end < byte_start + 8 {
        let keep = end.saturating_sub(byte_start);
        mask &= if keep == 0 { 0 } else { 0xFF << (8 - keep) };
    }
    mask
}
