//! Command set and parameter encoding shared by SSD1675/SSD1680-class
//! e-paper controllers.

/// Gate count and scan direction.
pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
/// Deep sleep; parameter `0x01` keeps RAM contents.
pub const DEEP_SLEEP: u8 = 0x10;
/// Address counter direction after each RAM write.
pub const DATA_ENTRY_MODE: u8 = 0x11;
pub const SW_RESET: u8 = 0x12;
/// Runs the sequence selected by [`DISPLAY_UPDATE_CONTROL_2`].
pub const MASTER_ACTIVATION: u8 = 0x20;
pub const DISPLAY_UPDATE_CONTROL_2: u8 = 0x22;
/// Black/white RAM; a set bit is white.
pub const WRITE_BLACK_RAM: u8 = 0x24;
/// Red RAM; a set bit is red.
pub const WRITE_RED_RAM: u8 = 0x26;
pub const BORDER_WAVEFORM: u8 = 0x3C;
pub const RAM_X_RANGE: u8 = 0x44;
pub const RAM_Y_RANGE: u8 = 0x45;
pub const RAM_X_COUNTER: u8 = 0x4E;
pub const RAM_Y_COUNTER: u8 = 0x4F;

/// X increments, then Y increments.
pub const ENTRY_X_INC_Y_INC: u8 = 0x03;
/// Clock on, load temperature and LUT, full refresh, clock off.
pub const UPDATE_FULL: u8 = 0xF7;
/// Keep RAM while sleeping.
pub const SLEEP_MODE_1: u8 = 0x01;
/// Border follows the white LUT.
pub const BORDER_WHITE: u8 = 0x05;

/// Widest RAM window the X counter can address, in bytes.
pub const MAX_LINE_BYTES: usize = 256;
/// Tallest panel the 9-bit gate counter can address.
pub const MAX_HEIGHT: u16 = 512;

/// Bytes in one RAM row of `width` pixels.
pub const fn line_bytes(width: u16) -> usize {
    (width as usize).div_ceil(8)
}

/// `DRIVER_OUTPUT_CONTROL` parameters for `height` gate lines.
pub fn driver_output(height: u16) -> Option<[u8; 3]> {
    if height == 0 || height > MAX_HEIGHT {
        return None;
    }
    let [lo, hi] = (height - 1).to_le_bytes();
    Some([lo, hi, 0x00])
}

/// `RAM_X_RANGE` parameters covering `width` pixels from byte 0.
pub fn ram_x_range(width: u16) -> Option<[u8; 2]> {
    let bytes = line_bytes(width);
    if bytes == 0 || bytes > MAX_LINE_BYTES {
        return None;
    }
    Some([0x00, (bytes - 1) as u8])
}

/// `RAM_Y_RANGE` parameters covering `height` rows from row 0.
pub fn ram_y_range(height: u16) -> Option<[u8; 4]> {
    let [lo, hi, _] = driver_output(height)?;
    Some([0x00, 0x00, lo, hi])
}

/// `RAM_Y_COUNTER` parameters for `row`.
pub fn y_counter(row: u16) -> [u8; 2] {
    row.to_le_bytes()
}
