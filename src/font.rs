//! 8x8 bitmap font covering printable ASCII.
//!
//! Glyphs are stored as eight bytes, one per row, MSB is the leftmost pixel.
//! Codes outside 32..=126 (after masking to 7 bits) draw as blank.

/// Glyph width in pixels
pub const CHAR_WIDTH: usize = 8;

/// Glyph height in pixels
pub const CHAR_HEIGHT: usize = 8;

const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 126;
const CHAR_COUNT: usize = (LAST_CHAR - FIRST_CHAR + 1) as usize;

#[rustfmt::skip]
pub static FONT_DATA: [u8; CHAR_COUNT * CHAR_HEIGHT] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // space
    0x18, 0x18, 0x18, 0x18, 0x18, 0x00, 0x18, 0x00, // !
    0x6C, 0x6C, 0x24, 0x00, 0x00, 0x00, 0x00, 0x00, // "
    0x6C, 0x6C, 0xFE, 0x6C, 0xFE, 0x6C, 0x6C, 0x00, // #
    0x18, 0x7E, 0xC0, 0x7C, 0x06, 0xFC, 0x18, 0x00, // $
    0x00, 0xC6, 0xCC, 0x18, 0x30, 0x66, 0xC6, 0x00, // %
    0x38, 0x6C, 0x38, 0x76, 0xDC, 0xCC, 0x76, 0x00, // &
    0x18, 0x18, 0x30, 0x00, 0x00, 0x00, 0x00, 0x00, // '
    0x0C, 0x18, 0x30, 0x30, 0x30, 0x18, 0x0C, 0x00, // (
    0x30, 0x18, 0x0C, 0x0C, 0x0C, 0x18, 0x30, 0x00, // )
    0x00, 0x66, 0x3C, 0xFF, 0x3C, 0x66, 0x00, 0x00, // *
    0x00, 0x18, 0x18, 0x7E, 0x18, 0x18, 0x00, 0x00, // +
    0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x30, // ,
    0x00, 0x00, 0x00, 0x7E, 0x00, 0x00, 0x00, 0x00, // -
    0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x00, // .
    0x06, 0x0C, 0x18, 0x30, 0x60, 0xC0, 0x80, 0x00, // /
    0x7C, 0xCE, 0xDE, 0xF6, 0xE6, 0xC6, 0x7C, 0x00, // 0
    0x18, 0x38, 0x18, 0x18, 0x18, 0x18, 0x7E, 0x00, // 1
    0x7C, 0xC6, 0x06, 0x7C, 0xC0, 0xC0, 0xFE, 0x00, // 2
    0xFC, 0x06, 0x06, 0x3C, 0x06, 0x06, 0xFC, 0x00, // 3
    0x0C, 0xCC, 0xCC, 0xCC, 0xFE, 0x0C, 0x0C, 0x00, // 4
    0xFE, 0xC0, 0xFC, 0x06, 0x06, 0xC6, 0x7C, 0x00, // 5
    0x7C, 0xC0, 0xC0, 0xFC, 0xC6, 0xC6, 0x7C, 0x00, // 6
    0xFE, 0x06, 0x06, 0x0C, 0x18, 0x18, 0x18, 0x00, // 7
    0x7C, 0xC6, 0xC6, 0x7C, 0xC6, 0xC6, 0x7C, 0x00, // 8
    0x7C, 0xC6, 0xC6, 0x7E, 0x06, 0x06, 0x7C, 0x00, // 9
    0x00, 0x18, 0x18, 0x00, 0x00, 0x18, 0x18, 0x00, // :
    0x00, 0x18, 0x18, 0x00, 0x00, 0x18, 0x18, 0x30, // ;
    0x0C, 0x18, 0x30, 0x60, 0x30, 0x18, 0x0C, 0x00, // <
    0x00, 0x00, 0x7E, 0x00, 0x7E, 0x00, 0x00, 0x00, // =
    0x30, 0x18, 0x0C, 0x06, 0x0C, 0x18, 0x30, 0x00, // >
    0x3C, 0x66, 0x0C, 0x18, 0x18, 0x00, 0x18, 0x00, // ?
    0x7C, 0xC6, 0xDE, 0xDE, 0xDE, 0xC0, 0x7E, 0x00, // @
    0x38, 0x6C, 0xC6, 0xC6, 0xFE, 0xC6, 0xC6, 0x00, // A
    0xFC, 0xC6, 0xC6, 0xFC, 0xC6, 0xC6, 0xFC, 0x00, // B
    0x7C, 0xC6, 0xC0, 0xC0, 0xC0, 0xC6, 0x7C, 0x00, // C
    0xF8, 0xCC, 0xC6, 0xC6, 0xC6, 0xCC, 0xF8, 0x00, // D
    0xFE, 0xC0, 0xC0, 0xF8, 0xC0, 0xC0, 0xFE, 0x00, // E
    0xFE, 0xC0, 0xC0, 0xF8, 0xC0, 0xC0, 0xC0, 0x00, // F
    0x7C, 0xC6, 0xC0, 0xCE, 0xC6, 0xC6, 0x7C, 0x00, // G
    0xC6, 0xC6, 0xC6, 0xFE, 0xC6, 0xC6, 0xC6, 0x00, // H
    0x7E, 0x18, 0x18, 0x18, 0x18, 0x18, 0x7E, 0x00, // I
    0x06, 0x06, 0x06, 0x06, 0xC6, 0xC6, 0x7C, 0x00, // J
    0xC6, 0xCC, 0xD8, 0xF0, 0xD8, 0xCC, 0xC6, 0x00, // K
    0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xFE, 0x00, // L
    0xC6, 0xEE, 0xFE, 0xD6, 0xC6, 0xC6, 0xC6, 0x00, // M
    0xC6, 0xE6, 0xF6, 0xDE, 0xCE, 0xC6, 0xC6, 0x00, // N
    0x7C, 0xC6, 0xC6, 0xC6, 0xC6, 0xC6, 0x7C, 0x00, // O
    0xFC, 0xC6, 0xC6, 0xFC, 0xC0, 0xC0, 0xC0, 0x00, // P
    0x7C, 0xC6, 0xC6, 0xC6, 0xD6, 0xDE, 0x7C, 0x06, // Q
    0xFC, 0xC6, 0xC6, 0xFC, 0xD8, 0xCC, 0xC6, 0x00, // R
    0x7C, 0xC6, 0xC0, 0x7C, 0x06, 0xC6, 0x7C, 0x00, // S
    0x7E, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x00, // T
    0xC6, 0xC6, 0xC6, 0xC6, 0xC6, 0xC6, 0x7C, 0x00, // U
    0xC6, 0xC6, 0xC6, 0xC6, 0x6C, 0x38, 0x10, 0x00, // V
    0xC6, 0xC6, 0xC6, 0xD6, 0xFE, 0xEE, 0xC6, 0x00, // W
    0xC6, 0xC6, 0x6C, 0x38, 0x6C, 0xC6, 0xC6, 0x00, // X
    0x66, 0x66, 0x66, 0x3C, 0x18, 0x18, 0x18, 0x00, // Y
    0xFE, 0x06, 0x0C, 0x18, 0x30, 0x60, 0xFE, 0x00, // Z
    0x3C, 0x30, 0x30, 0x30, 0x30, 0x30, 0x3C, 0x00, // [
    0xC0, 0x60, 0x30, 0x18, 0x0C, 0x06, 0x02, 0x00, // \
    0x3C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x3C, 0x00, // ]
    0x10, 0x38, 0x6C, 0xC6, 0x00, 0x00, 0x00, 0x00, // ^
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFE, // _
    0x18, 0x18, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00, // `
    0x00, 0x00, 0x7C, 0x06, 0x7E, 0xC6, 0x7E, 0x00, // a
    0xC0, 0xC0, 0xFC, 0xC6, 0xC6, 0xC6, 0xFC, 0x00, // b
    0x00, 0x00, 0x7C, 0xC6, 0xC0, 0xC6, 0x7C, 0x00, // c
    0x06, 0x06, 0x7E, 0xC6, 0xC6, 0xC6, 0x7E, 0x00, // d
    0x00, 0x00, 0x7C, 0xC6, 0xFE, 0xC0, 0x7C, 0x00, // e
    0x1C, 0x30, 0x30, 0x7C, 0x30, 0x30, 0x30, 0x00, // f
    0x00, 0x00, 0x7E, 0xC6, 0xC6, 0x7E, 0x06, 0x7C, // g
    0xC0, 0xC0, 0xFC, 0xC6, 0xC6, 0xC6, 0xC6, 0x00, // h
    0x18, 0x00, 0x38, 0x18, 0x18, 0x18, 0x3C, 0x00, // i
    0x18, 0x00, 0x38, 0x18, 0x18, 0x18, 0x18, 0x70, // j
    0xC0, 0xC0, 0xC6, 0xCC, 0xF8, 0xCC, 0xC6, 0x00, // k
    0x38, 0x18, 0x18, 0x18, 0x18, 0x18, 0x3C, 0x00, // l
    0x00, 0x00, 0xEC, 0xFE, 0xD6, 0xC6, 0xC6, 0x00, // m
    0x00, 0x00, 0xFC, 0xC6, 0xC6, 0xC6, 0xC6, 0x00, // n
    0x00, 0x00, 0x7C, 0xC6, 0xC6, 0xC6, 0x7C, 0x00, // o
    0x00, 0x00, 0xFC, 0xC6, 0xC6, 0xFC, 0xC0, 0xC0, // p
    0x00, 0x00, 0x7E, 0xC6, 0xC6, 0x7E, 0x06, 0x06, // q
    0x00, 0x00, 0xDC, 0xE6, 0xC0, 0xC0, 0xC0, 0x00, // r
    0x00, 0x00, 0x7E, 0xC0, 0x7C, 0x06, 0xFC, 0x00, // s
    0x30, 0x30, 0x7C, 0x30, 0x30, 0x30, 0x1C, 0x00, // t
    0x00, 0x00, 0xC6, 0xC6, 0xC6, 0xC6, 0x7E, 0x00, // u
    0x00, 0x00, 0xC6, 0xC6, 0xC6, 0x6C, 0x38, 0x00, // v
    0x00, 0x00, 0xC6, 0xC6, 0xD6, 0xFE, 0x6C, 0x00, // w
    0x00, 0x00, 0xC6, 0x6C, 0x38, 0x6C, 0xC6, 0x00, // x
    0x00, 0x00, 0xC6, 0xC6, 0xC6, 0x7E, 0x06, 0x7C, // y
    0x00, 0x00, 0xFE, 0x0C, 0x38, 0x60, 0xFE, 0x00, // z
    0x0E, 0x18, 0x18, 0x70, 0x18, 0x18, 0x0E, 0x00, // {
    0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x00, // |
    0x70, 0x18, 0x18, 0x0E, 0x18, 0x18, 0x70, 0x00, // }
    0x72, 0x9C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // ~
];

/// Returns the eight row bytes for `c`.
pub fn glyph(c: u8) -> &'static [u8] {
    let c = c & 0x7f;
    let index = if (FIRST_CHAR..=LAST_CHAR).contains(&c) {
        (c - FIRST_CHAR) as usize
    } else {
        0
    };
    &FONT_DATA[index * CHAR_HEIGHT..(index + 1) * CHAR_HEIGHT]
}

/// Pixel width of `text` when drawn unstretched.
pub fn text_width(text: &str) -> i32 {
    (CHAR_WIDTH * text.len()) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_is_blank() {
        assert!(glyph(b' ').iter().all(|&b| b == 0));
    }

    #[test]
    fn control_codes_fall_back_to_blank() {
        assert_eq!(glyph(7), glyph(b' '));
        assert_eq!(glyph(0x80 | b'A'), glyph(b'A'));
    }

    #[test]
    fn width_counts_bytes() {
        assert_eq!(text_width("On"), 16);
        assert_eq!(text_width(""), 0);
    }
}
