//! Built-in 5x7 pixel font covering ASCII `0x20..=0x7A`.

use super::{Glyph, MemoryFont};

/// Proportional 5x7 font; the baseline sits just under the bottom row.
pub static PIXEL_5X7: MemoryFont<'static> = MemoryFont::new(&GLYPHS, &BITMAP, 0x20, 0x7A, 9);

#[rustfmt::skip]
static BITMAP: [u8; 333] = [
    0xFA, 0x00, 0x14, 0x00, 0x01, 0xF0, 0x00, 0x00, 0x00, 0x3C, 0x00, 0x44,
    0x44, 0x40, 0x00, 0x74, 0x67, 0x5C, 0xC5, 0xC0, 0x59, 0x24, 0xB8, 0x74,
    0x42, 0x22, 0x23, 0xE0, 0xF8, 0x88, 0x20, 0xC5, 0xC0, 0x11, 0x95, 0x2F,
    0x88, 0x40, 0xFC, 0x3C, 0x10, 0xC5, 0xC0, 0x32, 0x21, 0xE8, 0xC5, 0xC0,
    0xF8, 0x44, 0x44, 0x21, 0x00, 0x74, 0x62, 0xE8, 0xC5, 0xC0, 0x74, 0x62,
    0xF0, 0x89, 0x80, 0x3C, 0xF0, 0x14, 0x14, 0x12, 0x48, 0x42, 0x10, 0x84,
    0x21, 0x24, 0x80, 0x74, 0x63, 0x1F, 0xC6, 0x20, 0xF4, 0x63, 0xE8, 0xC7,
    0xC0, 0x74, 0x61, 0x08, 0x45, 0xC0, 0xE4, 0xA3, 0x18, 0xCB, 0x80, 0xFC,
    0x21, 0xE8, 0x43, 0xE0, 0xFC, 0x21, 0xE8, 0x42, 0x00, 0x74, 0x61, 0x78,
    0xC5, 0xE0, 0x8C, 0x63, 0xF8, 0xC6, 0x20, 0xE9, 0x24, 0xB8, 0x38, 0x84,
    0x21, 0x49, 0x80, 0x8C, 0xA9, 0x8A, 0x4A, 0x20, 0x84, 0x21, 0x08, 0x43,
    0xE0, 0x8E, 0xEB, 0x58, 0xC6, 0x20, 0x8C, 0x73, 0x59, 0xC6, 0x20, 0x74,
    0x63, 0x18, 0xC5, 0xC0, 0xF4, 0x63, 0xE8, 0x42, 0x00, 0x74, 0x63, 0x1A,
    0xC9, 0xA0, 0xF4, 0x63, 0xEA, 0x4A, 0x20, 0x7C, 0x20, 0xE0, 0x87, 0xC0,
    0xF9, 0x08, 0x42, 0x10, 0x80, 0x8C, 0x63, 0x18, 0xC5, 0xC0, 0x8C, 0x63,
    0x18, 0xA8, 0x80, 0x8C, 0x63, 0x5A, 0xEE, 0x20, 0x8C, 0x54, 0x45, 0x46,
    0x20, 0x8C, 0x54, 0x42, 0x10, 0x80, 0xF8, 0x44, 0x44, 0x43, 0xE0, 0xF2,
    0x49, 0x38, 0xE4, 0x92, 0x78, 0x00, 0x1C, 0x17, 0xC5, 0xE0, 0x84, 0x2D,
    0x98, 0xC7, 0xC0, 0x00, 0x1D, 0x08, 0x45, 0xC0, 0x08, 0x5B, 0x38, 0xC5,
    0xE0, 0x00, 0x1D, 0x1F, 0xC1, 0xC0, 0x32, 0x51, 0xC4, 0x21, 0x00, 0x00,
    0x1F, 0x17, 0x84, 0xC0, 0x84, 0x2D, 0x98, 0xC6, 0x20, 0x43, 0x24, 0xB8,
    0x10, 0x31, 0x19, 0x60, 0x88, 0x9A, 0xCA, 0x90, 0xC9, 0x24, 0xB8, 0x00,
    0x35, 0x5A, 0xC6, 0x20, 0x00, 0x2D, 0x98, 0xC6, 0x20, 0x00, 0x1D, 0x18,
    0xC5, 0xC0, 0x00, 0x3D, 0x1F, 0x42, 0x00, 0x00, 0x1B, 0x37, 0x84, 0x20,
    0x00, 0x2D, 0x98, 0x42, 0x00, 0x00, 0x1D, 0x07, 0x07, 0xC0, 0x42, 0x38,
    0x84, 0x24, 0xC0, 0x00, 0x23, 0x18, 0xCD, 0xA0, 0x00, 0x23, 0x18, 0xA8,
    0x80, 0x00, 0x23, 0x1A, 0xD5, 0x40, 0x00, 0x22, 0xA2, 0x2A, 0x20, 0x00,
    0x23, 0x17, 0x85, 0xC0, 0x00, 0x3E, 0x22, 0x23, 0xE0,
];

#[rustfmt::skip]
static GLYPHS: [Glyph; 91] = [
    Glyph::new(0, 0, 0, 3, 0, 0), // ' '
    Glyph::new(0, 1, 7, 2, 0, -7), // '!'
    Glyph::new(1, 0, 0, 3, 0, 0), // '"'
    Glyph::new(1, 0, 0, 3, 0, 0), // '#'
    Glyph::new(1, 0, 0, 3, 0, 0), // '$'
    Glyph::new(1, 0, 0, 3, 0, 0), // '%'
    Glyph::new(1, 0, 0, 3, 0, 0), // '&'
    Glyph::new(1, 0, 0, 3, 0, 0), // '\''
    Glyph::new(1, 0, 0, 3, 0, 0), // '('
    Glyph::new(1, 0, 0, 3, 0, 0), // ')'
    Glyph::new(1, 0, 0, 3, 0, 0), // '*'
    Glyph::new(1, 0, 0, 3, 0, 0), // '+'
    Glyph::new(1, 2, 7, 3, 0, -7), // ','
    Glyph::new(3, 5, 7, 6, 0, -7), // '-'
    Glyph::new(8, 2, 7, 3, 0, -7), // '.'
    Glyph::new(10, 5, 7, 6, 0, -7), // '/'
    Glyph::new(15, 5, 7, 6, 0, -7), // '0'
    Glyph::new(20, 3, 7, 4, 0, -7), // '1'
    Glyph::new(23, 5, 7, 6, 0, -7), // '2'
    Glyph::new(28, 5, 7, 6, 0, -7), // '3'
    Glyph::new(33, 5, 7, 6, 0, -7), // '4'
    Glyph::new(38, 5, 7, 6, 0, -7), // '5'
    Glyph::new(43, 5, 7, 6, 0, -7), // '6'
    Glyph::new(48, 5, 7, 6, 0, -7), // '7'
    Glyph::new(53, 5, 7, 6, 0, -7), // '8'
    Glyph::new(58, 5, 7, 6, 0, -7), // '9'
    Glyph::new(63, 2, 7, 3, 0, -7), // ':'
    Glyph::new(65, 2, 7, 3, 0, -7), // ';'
    Glyph::new(67, 4, 7, 5, 0, -7), // '<'
    Glyph::new(71, 0, 0, 3, 0, 0), // '='
    Glyph::new(71, 4, 7, 5, 0, -7), // '>'
    Glyph::new(75, 0, 0, 3, 0, 0), // '?'
    Glyph::new(75, 0, 0, 3, 0, 0), // '@'
    Glyph::new(75, 5, 7, 6, 0, -7), // 'A'
    Glyph::new(80, 5, 7, 6, 0, -7), // 'B'
    Glyph::new(85, 5, 7, 6, 0, -7), // 'C'
    Glyph::new(90, 5, 7, 6, 0, -7), // 'D'
    Glyph::new(95, 5, 7, 6, 0, -7), // 'E'
    Glyph::new(100, 5, 7, 6, 0, -7), // 'F'
    Glyph::new(105, 5, 7, 6, 0, -7), // 'G'
    Glyph::new(110, 5, 7, 6, 0, -7), // 'H'
    Glyph::new(115, 3, 7, 4, 0, -7), // 'I'
    Glyph::new(118, 5, 7, 6, 0, -7), // 'J'
    Glyph::new(123, 5, 7, 6, 0, -7), // 'K'
    Glyph::new(128, 5, 7, 6, 0, -7), // 'L'
    Glyph::new(133, 5, 7, 6, 0, -7), // 'M'
    Glyph::new(138, 5, 7, 6, 0, -7), // 'N'
    Glyph::new(143, 5, 7, 6, 0, -7), // 'O'
    Glyph::new(148, 5, 7, 6, 0, -7), // 'P'
    Glyph::new(153, 5, 7, 6, 0, -7), // 'Q'
    Glyph::new(158, 5, 7, 6, 0, -7), // 'R'
    Glyph::new(163, 5, 7, 6, 0, -7), // 'S'
    Glyph::new(168, 5, 7, 6, 0, -7), // 'T'
    Glyph::new(173, 5, 7, 6, 0, -7), // 'U'
    Glyph::new(178, 5, 7, 6, 0, -7), // 'V'
    Glyph::new(183, 5, 7, 6, 0, -7), // 'W'
    Glyph::new(188, 5, 7, 6, 0, -7), // 'X'
    Glyph::new(193, 5, 7, 6, 0, -7), // 'Y'
    Glyph::new(198, 5, 7, 6, 0, -7), // 'Z'
    Glyph::new(203, 3, 7, 4, 0, -7), // '['
    Glyph::new(206, 0, 0, 3, 0, 0), // '\\'
    Glyph::new(206, 3, 7, 4, 0, -7), // ']'
    Glyph::new(209, 0, 0, 3, 0, 0), // '^'
    Glyph::new(209, 0, 0, 3, 0, 0), // '_'
    Glyph::new(209, 0, 0, 3, 0, 0), // '`'
    Glyph::new(209, 5, 7, 6, 0, -7), // 'a'
    Glyph::new(214, 5, 7, 6, 0, -7), // 'b'
    Glyph::new(219, 5, 7, 6, 0, -7), // 'c'
    Glyph::new(224, 5, 7, 6, 0, -7), // 'd'
    Glyph::new(229, 5, 7, 6, 0, -7), // 'e'
    Glyph::new(234, 5, 7, 6, 0, -7), // 'f'
    Glyph::new(239, 5, 7, 6, 0, -7), // 'g'
    Glyph::new(244, 5, 7, 6, 0, -7), // 'h'
    Glyph::new(249, 3, 7, 4, 0, -7), // 'i'
    Glyph::new(252, 4, 7, 5, 0, -7), // 'j'
    Glyph::new(256, 4, 7, 5, 0, -7), // 'k'
    Glyph::new(260, 3, 7, 4, 0, -7), // 'l'
    Glyph::new(263, 5, 7, 6, 0, -7), // 'm'
    Glyph::new(268, 5, 7, 6, 0, -7), // 'n'
    Glyph::new(273, 5, 7, 6, 0, -7), // 'o'
    Glyph::new(278, 5, 7, 6, 0, -7), // 'p'
    Glyph::new(283, 5, 7, 6, 0, -7), // 'q'
    Glyph::new(288, 5, 7, 6, 0, -7), // 'r'
    Glyph::new(293, 5, 7, 6, 0, -7), // 's'
    Glyph::new(298, 5, 7, 6, 0, -7), // 't'
    Glyph::new(303, 5, 7, 6, 0, -7), // 'u'
    Glyph::new(308, 5, 7, 6, 0, -7), // 'v'
    Glyph::new(313, 5, 7, 6, 0, -7), // 'w'
    Glyph::new(318, 5, 7, 6, 0, -7), // 'x'
    Glyph::new(323, 5, 7, 6, 0, -7), // 'y'
    Glyph::new(328, 5, 7, 6, 0, -7), // 'z'
];
