//! USB HID keyboard codes and the key names used in settings files.

use std::fmt;

/// A USB HID usage code as delivered by the keyboard driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct KeyCode(pub i32);

#[allow(non_upper_case_globals)]
impl KeyCode {
    pub const None: KeyCode = KeyCode(0);
    pub const a: KeyCode = KeyCode(4);
    pub const b: KeyCode = KeyCode(5);
    pub const c: KeyCode = KeyCode(6);
    pub const d: KeyCode = KeyCode(7);
    pub const e: KeyCode = KeyCode(8);
    pub const f: KeyCode = KeyCode(9);
    pub const g: KeyCode = KeyCode(10);
    pub const h: KeyCode = KeyCode(11);
    pub const i: KeyCode = KeyCode(12);
    pub const j: KeyCode = KeyCode(13);
    pub const k: KeyCode = KeyCode(14);
    pub const l: KeyCode = KeyCode(15);
    pub const m: KeyCode = KeyCode(16);
    pub const n: KeyCode = KeyCode(17);
    pub const o: KeyCode = KeyCode(18);
    pub const p: KeyCode = KeyCode(19);
    pub const q: KeyCode = KeyCode(20);
    pub const r: KeyCode = KeyCode(21);
    pub const s: KeyCode = KeyCode(22);
    pub const t: KeyCode = KeyCode(23);
    pub const u: KeyCode = KeyCode(24);
    pub const v: KeyCode = KeyCode(25);
    pub const w: KeyCode = KeyCode(26);
    pub const x: KeyCode = KeyCode(27);
    pub const y: KeyCode = KeyCode(28);
    pub const z: KeyCode = KeyCode(29);
    pub const N1: KeyCode = KeyCode(30);
    pub const N2: KeyCode = KeyCode(31);
    pub const N3: KeyCode = KeyCode(32);
    pub const N4: KeyCode = KeyCode(33);
    pub const N5: KeyCode = KeyCode(34);
    pub const N6: KeyCode = KeyCode(35);
    pub const N7: KeyCode = KeyCode(36);
    pub const N8: KeyCode = KeyCode(37);
    pub const N9: KeyCode = KeyCode(38);
    pub const N0: KeyCode = KeyCode(39);
    pub const Return: KeyCode = KeyCode(40);
    pub const Escape: KeyCode = KeyCode(41);
    pub const Backspace: KeyCode = KeyCode(42);
    pub const Tab: KeyCode = KeyCode(43);
    pub const Space: KeyCode = KeyCode(44);
    pub const Dash: KeyCode = KeyCode(45);
    pub const Equals: KeyCode = KeyCode(46);
    pub const LeftBracket: KeyCode = KeyCode(47);
    pub const RightBracket: KeyCode = KeyCode(48);
    pub const BackSlash: KeyCode = KeyCode(49);
    pub const Pound: KeyCode = KeyCode(50);
    pub const SemiColon: KeyCode = KeyCode(51);
    pub const SingleQuote: KeyCode = KeyCode(52);
    pub const BackQuote: KeyCode = KeyCode(53);
    pub const Comma: KeyCode = KeyCode(54);
    pub const Period: KeyCode = KeyCode(55);
    pub const Slash: KeyCode = KeyCode(56);
    pub const CapsLock: KeyCode = KeyCode(57);
    pub const F1: KeyCode = KeyCode(58);
    pub const F2: KeyCode = KeyCode(59);
    pub const F3: KeyCode = KeyCode(60);
    pub const F4: KeyCode = KeyCode(61);
    pub const F5: KeyCode = KeyCode(62);
    pub const F6: KeyCode = KeyCode(63);
    pub const F7: KeyCode = KeyCode(64);
    pub const F8: KeyCode = KeyCode(65);
    pub const F9: KeyCode = KeyCode(66);
    pub const F10: KeyCode = KeyCode(67);
    pub const F11: KeyCode = KeyCode(68);
    pub const F12: KeyCode = KeyCode(69);
    pub const ScrollLock: KeyCode = KeyCode(71);
    pub const Insert: KeyCode = KeyCode(73);
    pub const Home: KeyCode = KeyCode(74);
    pub const PageUp: KeyCode = KeyCode(75);
    pub const Delete: KeyCode = KeyCode(76);
    pub const End: KeyCode = KeyCode(77);
    pub const PageDown: KeyCode = KeyCode(78);
    pub const Right: KeyCode = KeyCode(79);
    pub const Left: KeyCode = KeyCode(80);
    pub const Down: KeyCode = KeyCode(81);
    pub const Up: KeyCode = KeyCode(82);
    pub const KP_Divide: KeyCode = KeyCode(84);
    pub const KP_Multiply: KeyCode = KeyCode(85);
    pub const KP_Subtract: KeyCode = KeyCode(86);
    pub const KP_Add: KeyCode = KeyCode(87);
    pub const KP_Enter: KeyCode = KeyCode(88);
    pub const KP1: KeyCode = KeyCode(89);
    pub const KP2: KeyCode = KeyCode(90);
    pub const KP3: KeyCode = KeyCode(91);
    pub const KP4: KeyCode = KeyCode(92);
    pub const KP5: KeyCode = KeyCode(93);
    pub const KP6: KeyCode = KeyCode(94);
    pub const KP7: KeyCode = KeyCode(95);
    pub const KP8: KeyCode = KeyCode(96);
    pub const KP9: KeyCode = KeyCode(97);
    pub const KP0: KeyCode = KeyCode(98);
    pub const KP_Decimal: KeyCode = KeyCode(99);
    pub const LeftControl: KeyCode = KeyCode(224);
    pub const LeftShift: KeyCode = KeyCode(225);
    pub const LeftAlt: KeyCode = KeyCode(226);
    pub const LeftSuper: KeyCode = KeyCode(227);
    pub const RightControl: KeyCode = KeyCode(228);
    pub const RightShift: KeyCode = KeyCode(229);
    pub const RightAlt: KeyCode = KeyCode(230);
    pub const RightSuper: KeyCode = KeyCode(231);

    pub fn is_letter(self) -> bool {
        (KeyCode::a.0..=KeyCode::z.0).contains(&self.0)
    }

    /// Lower case letter for a..z, None otherwise.
    pub fn letter(self) -> Option<char> {
        if self.is_letter() {
            Some((b'a' + (self.0 - KeyCode::a.0) as u8) as char)
        } else {
            None
        }
    }

    /// Digit for the top row 1..9,0 keys.
    pub fn digit(self) -> Option<char> {
        if (KeyCode::N1.0..=KeyCode::N9.0).contains(&self.0) {
            Some((b'1' + (self.0 - KeyCode::N1.0) as u8) as char)
        } else if self == KeyCode::N0 {
            Some('0')
        } else {
            None
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match keycode_to_keyname(*self) {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", self.0),
        }
    }
}

// Canonical names. Written back out by settings and shown in key pickers.
const NAMED: &[(&str, KeyCode)] = &[
    ("Return", KeyCode::Return),
    ("BackSpace", KeyCode::Backspace),
    ("PageUp", KeyCode::PageUp),
    ("PageDown", KeyCode::PageDown),
    ("CapsLock", KeyCode::CapsLock),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("Comma", KeyCode::Comma),
    ("Period", KeyCode::Period),
    ("Space", KeyCode::Space),
    ("RightBracket", KeyCode::RightBracket),
    ("Del", KeyCode::Delete),
    ("Shift_L", KeyCode::LeftShift),
    ("Shift_R", KeyCode::RightShift),
    ("Dash", KeyCode::Dash),
    ("BackQuote", KeyCode::BackQuote),
    ("Equals", KeyCode::Equals),
    ("SemiColon", KeyCode::SemiColon),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
    ("Slash", KeyCode::Slash),
    ("BackSlash", KeyCode::BackSlash),
    ("Pound", KeyCode::Pound),
    ("Insert", KeyCode::Insert),
    ("SingleQuote", KeyCode::SingleQuote),
    ("Tab", KeyCode::Tab),
    ("Control_L", KeyCode::LeftControl),
    ("Control_R", KeyCode::RightControl),
    ("Alt_L", KeyCode::LeftAlt),
    ("Alt_R", KeyCode::RightAlt),
    ("Super_L", KeyCode::LeftSuper),
    ("Super_R", KeyCode::RightSuper),
    ("Escape", KeyCode::Escape),
    ("LeftBracket", KeyCode::LeftBracket),
    ("F1", KeyCode::F1),
    ("F2", KeyCode::F2),
    ("F3", KeyCode::F3),
    ("F4", KeyCode::F4),
    ("F5", KeyCode::F5),
    ("F6", KeyCode::F6),
    ("F7", KeyCode::F7),
    ("F8", KeyCode::F8),
    ("F9", KeyCode::F9),
    ("F10", KeyCode::F10),
    ("F11", KeyCode::F11),
    ("F12", KeyCode::F12),
    ("ScrollLock", KeyCode::ScrollLock),
    ("KP_Divide", KeyCode::KP_Divide),
    ("KP_Decimal", KeyCode::KP_Decimal),
    ("KP_Multiply", KeyCode::KP_Multiply),
    ("KP_Subtract", KeyCode::KP_Subtract),
    ("KP_Add", KeyCode::KP_Add),
    ("KP_Enter", KeyCode::KP_Enter),
    ("KP_1", KeyCode::KP1),
    ("KP_2", KeyCode::KP2),
    ("KP_3", KeyCode::KP3),
    ("KP_4", KeyCode::KP4),
    ("KP_5", KeyCode::KP5),
    ("KP_6", KeyCode::KP6),
    ("KP_7", KeyCode::KP7),
    ("KP_8", KeyCode::KP8),
    ("KP_9", KeyCode::KP9),
    ("KP_0", KeyCode::KP0),
];

// Pre-2.5 keymap files used C64 key labels for some keys. "Delete" has to
// keep meaning PageUp.
const LEGACY: &[(&str, KeyCode)] = &[
    ("Delete", KeyCode::PageUp),
    ("comma", KeyCode::Comma),
    ("period", KeyCode::Period),
    ("space", KeyCode::Space),
    ("asterisk", KeyCode::RightBracket),
    ("arrowup", KeyCode::Delete),
    ("plus", KeyCode::Dash),
    ("arrowleft", KeyCode::BackQuote),
    ("minus", KeyCode::Equals),
    ("colon", KeyCode::SemiColon),
    ("slash", KeyCode::Slash),
    ("sterling", KeyCode::Insert),
    ("semicolon", KeyCode::SingleQuote),
    ("at", KeyCode::LeftBracket),
];

/// Maps a keymap/settings key name to its code. Unknown names map to
/// `KeyCode::None`.
pub fn keyname_to_keycode(name: &str) -> KeyCode {
    let bytes = name.as_bytes();
    if bytes.len() == 1 {
        let c = bytes[0];
        return match c {
            b'a'..=b'z' => KeyCode(KeyCode::a.0 + (c - b'a') as i32),
            b'1'..=b'9' => KeyCode(KeyCode::N1.0 + (c - b'1') as i32),
            b'0' => KeyCode::N0,
            _ => KeyCode::None,
        };
    }
    NAMED
        .iter()
        .chain(LEGACY.iter())
        .find(|(n, _)| *n == name)
        .map(|(_, k)| *k)
        .unwrap_or(KeyCode::None)
}

/// Canonical name for a code, if it has one.
pub fn keycode_to_keyname(code: KeyCode) -> Option<String> {
    if let Some(c) = code.letter().or_else(|| code.digit()) {
        return Some(c.to_string());
    }
    NAMED
        .iter()
        .find(|(_, k)| *k == code)
        .map(|(n, _)| n.to_string())
}

/// Label used by key pickers, e.g. `Key 44 (Space)`.
pub fn key_label(code: KeyCode) -> String {
    match keycode_to_keyname(code) {
        Some(name) => format!("Key {} ({})", code.0, name),
        None => format!("Key {}", code.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chars() {
        assert_eq!(keyname_to_keycode("a"), KeyCode::a);
        assert_eq!(keyname_to_keycode("z"), KeyCode::z);
        assert_eq!(keyname_to_keycode("1"), KeyCode::N1);
        assert_eq!(keyname_to_keycode("0"), KeyCode::N0);
        assert_eq!(keyname_to_keycode("#"), KeyCode::None);
    }

    #[test]
    fn legacy_names_still_resolve() {
        assert_eq!(keyname_to_keycode("Delete"), KeyCode::PageUp);
        assert_eq!(keyname_to_keycode("Del"), KeyCode::Delete);
        assert_eq!(keyname_to_keycode("arrowleft"), KeyCode::BackQuote);
        assert_eq!(keyname_to_keycode("at"), KeyCode::LeftBracket);
    }

    #[test]
    fn canonical_names_round_trip() {
        for (name, code) in NAMED {
            assert_eq!(keyname_to_keycode(name), *code);
            assert_eq!(keycode_to_keyname(*code).as_deref(), Some(*name));
        }
    }

    #[test]
    fn labels() {
        assert_eq!(key_label(KeyCode::Space), "Key 44 (Space)");
        assert_eq!(key_label(KeyCode(200)), "Key 200");
    }
}
