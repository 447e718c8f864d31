//! On-screen keyboard drawn over the status layer.
//!
//! Navigation follows each key's neighbour indices, which are baked when
//! the layout is built. Nothing scans the grid at run time.

use crate::fb::IndexedFb;
use crate::keycodes::KeyCode;
use crate::overlay::{
    OVERLAY_HEIGHT, OVERLAY_WIDTH, GREEN_COLOR, LIGHT_GREEN_COLOR, TRANSPARENT_COLOR,
    VKBD_BG_COLOR, VKBD_FG_COLOR,
};

/// What pressing a key latches in the emulated keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VkbdLatch {
    Matrix { row: i32, col: i32 },
    Restore,
    ShiftLock,
    /// Shift + cursor down.
    CursorUp,
    /// Shift + cursor right.
    CursorLeft,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyLabel {
    Char(u8),
    Esc,
    Home,
    Del,
    F1,
    F3,
    F5,
    F7,
    Ctrl,
    Restore,
    RunStop,
    ShiftLock,
    Return,
    Commodore,
    LShift,
    RShift,
    CursUp,
    CursDown,
    CursLeft,
    CursRight,
}

impl KeyLabel {
    /// Text for keys without a glyph, with any modifier held or not.
    fn text(self, modified: bool) -> &'static str {
        match self {
            KeyLabel::Char(_) => "",
            KeyLabel::Esc => "ESC",
            KeyLabel::Home => if modified { "CLR" } else { "HOM" },
            KeyLabel::Del => if modified { "INS" } else { "DEL" },
            KeyLabel::F1 => if modified { "F2" } else { "F1" },
            KeyLabel::F3 => if modified { "F4" } else { "F3" },
            KeyLabel::F5 => if modified { "F6" } else { "F5" },
            KeyLabel::F7 => if modified { "F8" } else { "F7" },
            KeyLabel::Ctrl => "CTL",
            KeyLabel::Restore => "RES",
            KeyLabel::RunStop => "RST",
            KeyLabel::ShiftLock => "LCK",
            KeyLabel::Return => "RET",
            KeyLabel::Commodore => "C=",
            KeyLabel::LShift | KeyLabel::RShift => "SHF",
            KeyLabel::CursUp => "UP",
            KeyLabel::CursDown => "DWN",
            KeyLabel::CursLeft => "LFT",
            KeyLabel::CursRight => "RHT",
        }
    }
}

#[derive(Clone, Debug)]
pub struct VkbdKey {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub label: KeyLabel,
    pub shift_code: u8,
    pub comm_code: u8,
    pub latch: VkbdLatch,
    /// Latching keys flip on press and stay down until pressed again.
    pub toggle: bool,
    pub state: bool,
    pub up: usize,
    pub down: usize,
    pub left: usize,
    pub right: usize,
}

/// Key size in pixels; widths in the layout table are in half keys.
const KEY: i32 = 32;

struct KeyDef(KeyLabel, VkbdLatch, i32);

fn ch(c: u8, row: i32, col: i32) -> KeyDef {
    KeyDef(KeyLabel::Char(c), VkbdLatch::Matrix { row, col }, 2)
}

fn sp(label: KeyLabel, row: i32, col: i32, halves: i32) -> KeyDef {
    KeyDef(label, VkbdLatch::Matrix { row, col }, halves)
}

fn c64_rows() -> Vec<Vec<KeyDef>> {
    use KeyLabel::*;
    vec![
        vec![
            sp(Esc, 7, 1, 2),
            ch(b'1', 7, 0),
            ch(b'2', 7, 3),
            ch(b'3', 1, 0),
            ch(b'4', 1, 3),
            ch(b'5', 2, 0),
            ch(b'6', 2, 3),
            ch(b'7', 3, 0),
            ch(b'8', 3, 3),
            ch(b'9', 4, 0),
            ch(b'0', 4, 3),
            ch(b'+', 5, 0),
            ch(b'-', 5, 3),
            ch(b'#', 6, 0),
            sp(Home, 6, 3, 2),
            sp(Del, 0, 0, 2),
            sp(F1, 0, 4, 3),
        ],
        vec![
            sp(Ctrl, 7, 2, 3),
            ch(b'Q', 7, 6),
            ch(b'W', 1, 1),
            ch(b'E', 1, 6),
            ch(b'R', 2, 1),
            ch(b'T', 2, 6),
            ch(b'Y', 3, 1),
            ch(b'U', 3, 6),
            ch(b'I', 4, 1),
            ch(b'O', 4, 6),
            ch(b'P', 5, 1),
            ch(b'@', 5, 6),
            ch(b'*', 6, 1),
            ch(b'^', 6, 6),
            KeyDef(Restore, VkbdLatch::Restore, 3),
            sp(F3, 0, 5, 3),
        ],
        vec![
            sp(RunStop, 7, 7, 2),
            KeyDef(ShiftLock, VkbdLatch::ShiftLock, 2),
            ch(b'A', 1, 2),
            ch(b'S', 1, 5),
            ch(b'D', 2, 2),
            ch(b'F', 2, 5),
            ch(b'G', 3, 2),
            ch(b'H', 3, 5),
            ch(b'J', 4, 2),
            ch(b'K', 4, 5),
            ch(b'L', 5, 2),
            ch(b':', 5, 5),
            ch(b';', 6, 2),
            ch(b'=', 6, 5),
            sp(Return, 0, 1, 4),
            sp(F5, 0, 6, 3),
        ],
        vec![
            sp(Commodore, 7, 5, 2),
            sp(LShift, 1, 7, 3),
            ch(b'Z', 1, 4),
            ch(b'X', 2, 7),
            ch(b'C', 2, 4),
            ch(b'V', 3, 7),
            ch(b'B', 3, 4),
            ch(b'N', 4, 7),
            ch(b'M', 4, 4),
            ch(b',', 5, 7),
            ch(b'.', 5, 4),
            ch(b'/', 6, 7),
            sp(RShift, 6, 4, 3),
            sp(CursDown, 0, 7, 2),
            sp(CursRight, 0, 2, 2),
            sp(F7, 0, 3, 3),
        ],
        vec![
            KeyDef(Char(b' '), VkbdLatch::Matrix { row: 7, col: 4 }, 18),
            KeyDef(CursUp, VkbdLatch::CursorUp, 2),
            KeyDef(CursLeft, VkbdLatch::CursorLeft, 2),
        ],
    ]
}

fn shifted(c: u8) -> u8 {
    match c {
        b'A'..=b'Z' => c.to_ascii_lowercase(),
        b'1' => b'!',
        b'2' => b'"',
        b'3' => b'#',
        b'4' => b'$',
        b'5' => b'%',
        b'6' => b'&',
        b'7' => b'\'',
        b'8' => b'(',
        b'9' => b')',
        b',' => b'<',
        b'.' => b'>',
        b'/' => b'?',
        b':' => b'[',
        b';' => b']',
        other => other,
    }
}

#[derive(Clone, Debug)]
pub struct Vkbd {
    pub keys: Vec<VkbdKey>,
    pub cursor: usize,
    pub enabled: bool,
    pub lshift: bool,
    pub rshift: bool,
    pub commodore: bool,
    pub ctrl: bool,
    width: i32,
    height: i32,
}

impl Default for Vkbd {
    fn default() -> Self {
        Vkbd::c64()
    }
}

impl Vkbd {
    /// The C64 layout. The Commodore key row and column are the real
    /// keyboard matrix positions.
    pub fn c64() -> Self {
        let rows = c64_rows();
        let mut keys = Vec::new();
        let mut row_ranges = Vec::new();
        let mut width = 0;
        for (r, row) in rows.into_iter().enumerate() {
            let start = keys.len();
            let mut x = 0;
            for KeyDef(label, latch, halves) in row {
                let w = halves * KEY / 2;
                let (code, shift_code) = match label {
                    KeyLabel::Char(c) => (c, shifted(c)),
                    _ => (0, 0),
                };
                let toggle = matches!(
                    label,
                    KeyLabel::ShiftLock
                        | KeyLabel::LShift
                        | KeyLabel::RShift
                        | KeyLabel::Commodore
                        | KeyLabel::Ctrl
                );
                keys.push(VkbdKey {
                    x,
                    y: r as i32 * KEY,
                    w,
                    h: KEY,
                    label,
                    shift_code,
                    comm_code: code,
                    latch,
                    toggle,
                    state: false,
                    up: 0,
                    down: 0,
                    left: 0,
                    right: 0,
                });
                x += w;
            }
            width = width.max(x);
            row_ranges.push(start..keys.len());
        }
        let height = row_ranges.len() as i32 * KEY;

        let centre = |k: &VkbdKey| k.x + k.w / 2;
        let nearest = |keys: &[VkbdKey], range: &std::ops::Range<usize>, cx: i32| {
            range
                .clone()
                .min_by_key(|&i| (centre(&keys[i]) - cx).abs())
                .unwrap_or(range.start)
        };
        let n = row_ranges.len();
        for r in 0..n {
            let range = row_ranges[r].clone();
            for i in range.clone() {
                let cx = centre(&keys[i]);
                let up = nearest(&keys, &row_ranges[(r + n - 1) % n], cx);
                let down = nearest(&keys, &row_ranges[(r + 1) % n], cx);
                let key = &mut keys[i];
                key.left = if i == range.start { range.end - 1 } else { i - 1 };
                key.right = if i + 1 == range.end { range.start } else { i + 1 };
                key.up = up;
                key.down = down;
            }
        }

        Vkbd {
            keys,
            cursor: 0,
            enabled: false,
            lshift: false,
            rshift: false,
            commodore: false,
            ctrl: false,
            width,
            height,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn origin(&self) -> (i32, i32) {
        ((OVERLAY_WIDTH - self.width) / 2, (OVERLAY_HEIGHT - self.height) / 2)
    }

    pub fn nav_up(&mut self) {
        self.cursor = self.keys[self.cursor].up;
    }

    pub fn nav_down(&mut self) {
        self.cursor = self.keys[self.cursor].down;
    }

    pub fn nav_left(&mut self) {
        self.cursor = self.keys[self.cursor].left;
    }

    pub fn nav_right(&mut self) {
        self.cursor = self.keys[self.cursor].right;
    }

    /// Presses or releases the key under the cursor. Returns the latch to
    /// hand to the emulator, if any.
    pub fn press(&mut self, pressed: bool) -> Option<(VkbdLatch, bool)> {
        let key = self.keys.get_mut(self.cursor)?;
        if key.toggle {
            if !pressed {
                return None;
            }
            key.state = !key.state;
            let (label, state, latch) = (key.label, key.state, key.latch);
            match label {
                KeyLabel::LShift => self.lshift = state,
                KeyLabel::RShift => self.rshift = state,
                KeyLabel::Commodore => self.commodore = state,
                KeyLabel::Ctrl => self.ctrl = state,
                _ => {}
            }
            Some((latch, state))
        } else {
            key.state = pressed;
            Some((key.latch, pressed))
        }
    }

    /// Follows modifier keys pressed on a real keyboard while shown.
    pub fn sync_event(&mut self, key: KeyCode, pressed: bool, commodore_key: KeyCode, ctrl_key: KeyCode) {
        if key == KeyCode::LeftShift {
            self.lshift = pressed;
        } else if key == KeyCode::RightShift {
            self.rshift = pressed;
        } else if key == commodore_key {
            self.commodore = pressed;
        } else if key == ctrl_key {
            self.ctrl = pressed;
        }
    }

    pub fn clear(&self, fb: &mut IndexedFb) {
        let (cx, cy) = self.origin();
        fb.draw_rect(cx - 1, cy - 1, self.width + 2, self.height + 2, TRANSPARENT_COLOR, true);
    }

    pub fn draw(&self, fb: &mut IndexedFb) {
        let (cx, cy) = self.origin();
        fb.draw_rect(cx - 1, cy - 1, self.width + 2, self.height + 2, VKBD_BG_COLOR, true);

        let modified = self.lshift || self.rshift || self.commodore;
        for (i, key) in self.keys.iter().enumerate() {
            let colour = if i == self.cursor { LIGHT_GREEN_COLOR } else { VKBD_FG_COLOR };
            let (x, y) = (key.x + cx, key.y + cy);
            if key.state {
                fb.draw_rect(x, y, key.w, key.h, GREEN_COLOR, true);
            }
            fb.draw_rect(x, y, key.w, key.h, colour, false);
            if i == self.cursor {
                fb.draw_rect(x + 1, y + 1, key.w - 2, key.h - 2, colour, true);
            }

            let lx = x + key.w / 2;
            let ly = y + key.h / 2;
            match key.label {
                KeyLabel::Char(code) => {
                    let glyph = if self.lshift || self.rshift {
                        key.shift_code
                    } else if self.commodore {
                        key.comm_code
                    } else {
                        code
                    };
                    fb.draw_char(glyph, lx - 8, ly - 8, VKBD_FG_COLOR, 2);
                }
                label => {
                    let text = label.text(modified);
                    fb.draw_text(text, lx - text.len() as i32 * 4, ly - 4, VKBD_FG_COLOR, 1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(v: &Vkbd, label: KeyLabel) -> usize {
        v.keys.iter().position(|k| k.label == label).unwrap()
    }

    #[test]
    fn neighbours_wrap_within_a_row() {
        let mut v = Vkbd::c64();
        v.nav_left();
        assert_eq!(v.keys[v.cursor].label, KeyLabel::F1);
        v.nav_right();
        assert_eq!(v.cursor, 0);
    }

    #[test]
    fn down_then_up_returns_home() {
        let mut v = Vkbd::c64();
        v.cursor = v.keys.iter().position(|k| k.label == KeyLabel::Char(b'1')).unwrap();
        v.nav_down();
        assert_eq!(v.keys[v.cursor].label, KeyLabel::Char(b'Q'));
        v.nav_up();
        assert_eq!(v.keys[v.cursor].label, KeyLabel::Char(b'1'));
    }

    #[test]
    fn shift_latches_until_pressed_again() {
        let mut v = Vkbd::c64();
        v.cursor = find(&v, KeyLabel::LShift);
        assert_eq!(v.press(true), Some((VkbdLatch::Matrix { row: 1, col: 7 }, true)));
        assert!(v.lshift);
        assert_eq!(v.press(false), None);
        assert!(v.lshift);
        assert_eq!(v.press(true), Some((VkbdLatch::Matrix { row: 1, col: 7 }, false)));
        assert!(!v.lshift);
    }

    #[test]
    fn restore_is_not_a_matrix_key() {
        let mut v = Vkbd::c64();
        v.cursor = find(&v, KeyLabel::Restore);
        assert_eq!(v.press(true), Some((VkbdLatch::Restore, true)));
        assert!(v.keys[v.cursor].state);
        assert_eq!(v.press(false), Some((VkbdLatch::Restore, false)));
    }

    #[test]
    fn fits_in_the_overlay() {
        let v = Vkbd::c64();
        assert!(v.width() <= OVERLAY_WIDTH);
        assert!(v.height() <= OVERLAY_HEIGHT);
        let mut fb = IndexedFb::new(OVERLAY_WIDTH, OVERLAY_HEIGHT);
        v.draw(&mut fb);
        let (cx, cy) = v.origin();
        assert_eq!(fb.pixel(cx + 1, cy + 1), Some(LIGHT_GREEN_COLOR));
    }
}
