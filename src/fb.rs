//! Indexed-colour offscreen buffers.
//!
//! Both the menu layer and the status bar draw into one of these; the
//! platform is handed the raw indices plus a palette when a frame is ready.

use crate::font::{self, CHAR_HEIGHT, CHAR_WIDTH};

#[derive(Clone, Debug)]
pub struct IndexedFb {
    width: i32,
    height: i32,
    pitch: i32,
    pixels: Vec<u8>,
}

impl IndexedFb {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        IndexedFb {
            width,
            height,
            pitch: width,
            pixels: vec![0; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn pitch(&self) -> i32 {
        self.pitch
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(x + y * self.pitch) as usize])
    }

    /// Reallocates when the dimensions change. Returns true if it did.
    pub fn resize(&mut self, width: i32, height: i32) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        *self = IndexedFb::new(width, height);
        true
    }

    pub fn clear(&mut self, color: u8) {
        self.pixels.fill(color);
    }

    fn put(&mut self, x: i32, y: i32, color: u8) {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            self.pixels[(x + y * self.pitch) as usize] = color;
        }
    }

    /// Filled or outlined rectangle. Pixels outside the buffer are dropped.
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u8, fill: bool) {
        let x2 = x + w;
        let y2 = y + h;
        for yy in y..y2 {
            for xx in x..x2 {
                if fill || yy == y || yy == y2 - 1 || xx == x || xx == x2 - 1 {
                    self.put(xx, yy, color);
                }
            }
        }
    }

    /// Draws one glyph. A glyph that would not fit entirely is skipped.
    pub fn draw_char(&mut self, c: u8, x: i32, y: i32, color: u8, stretch: i32) {
        let stretch = stretch.max(1);
        let span = CHAR_HEIGHT as i32 * stretch;
        if y < 0 || y > self.height - span {
            return;
        }
        if x < 0 || x > self.width - CHAR_WIDTH as i32 * stretch {
            return;
        }
        let rows = font::glyph(c);
        for yy in 0..span {
            let bits = rows[(yy / stretch) as usize];
            for col in 0..CHAR_WIDTH as i32 {
                if bits & (0x80 >> col) != 0 {
                    for s in 0..stretch {
                        self.put(x + col * stretch + s, y + yy, color);
                    }
                }
            }
        }
    }

    /// Draws a line of text. `\n` starts a new line at the original x.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, color: u8, stretch: i32) {
        let stretch = stretch.max(1);
        let advance = CHAR_WIDTH as i32 * stretch;
        let mut x2 = x;
        let mut y2 = y;
        for &b in text.as_bytes() {
            if b == b'\n' {
                y2 += CHAR_HEIGHT as i32 * stretch;
                x2 = x;
            } else {
                self.draw_char(b, x2, y2, color, stretch);
                x2 += advance;
            }
        }
    }

    /// Text with a one pixel outline in colour 0, returning the x after it.
    pub fn draw_shadow_text(&mut self, text: &str, x: i32, y: i32, color: u8) -> i32 {
        self.draw_text(text, x + 1, y, 0, 1);
        self.draw_text(text, x - 1, y, 0, 1);
        self.draw_text(text, x, y + 1, 0, 1);
        self.draw_text(text, x, y - 1, 0, 1);
        self.draw_text(text, x, y, color, 1);
        x + font::text_width(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_leaves_inside_untouched() {
        let mut fb = IndexedFb::new(10, 10);
        fb.draw_rect(1, 1, 5, 5, 3, false);
        assert_eq!(fb.pixel(1, 1), Some(3));
        assert_eq!(fb.pixel(5, 5), Some(3));
        assert_eq!(fb.pixel(3, 3), Some(0));
        assert_eq!(fb.pixel(6, 6), Some(0));
    }

    #[test]
    fn glyph_at_edge_is_clipped_whole() {
        let mut fb = IndexedFb::new(16, 16);
        fb.draw_char(b'#', 9, 0, 1, 1);
        assert!(fb.pixels().iter().all(|&p| p == 0));
        fb.draw_char(b'#', 8, 8, 1, 1);
        assert!(fb.pixels().iter().any(|&p| p == 1));
    }

    #[test]
    fn stretch_doubles_columns() {
        let mut fb = IndexedFb::new(32, 32);
        // '!' is 0x18 on the first row: columns 3 and 4
        fb.draw_char(b'!', 0, 0, 2, 2);
        assert_eq!(fb.pixel(6, 0), Some(2));
        assert_eq!(fb.pixel(9, 1), Some(2));
        assert_eq!(fb.pixel(5, 0), Some(0));
    }

    #[test]
    fn newline_resets_column() {
        let mut fb = IndexedFb::new(32, 32);
        fb.draw_text("!\n!", 0, 0, 4, 1);
        assert_eq!(fb.pixel(3, 0), Some(4));
        assert_eq!(fb.pixel(3, 8), Some(4));
    }
}
