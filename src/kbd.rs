//! Decides where each physical key goes: a joystick latch, a hotkey combo,
//! the menu or the emulated keyboard.
//!
//! The router only returns `Route`s. Applying them to the input queue is
//! the runtime's job, which keeps this usable from an interrupt handler
//! and trivially testable.

use log::{debug, info};

use crate::ids::{ButtonFn, JoyDev};
use crate::joy::InputConfig;
use crate::keycodes::KeyCode;
use crate::platform::TICKS_PER_SECOND;
use crate::queue::PendingJoy;

pub const NUM_KEY_COMBOS: usize = 8;

const VIDEO_RESET_DELAY: u64 = 5 * TICKS_PER_SECOND;

/// Where an input event ends up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    UiKey(KeyCode, bool),
    EmuKey(KeyCode, bool),
    /// A synthetic key that still has to go through the router.
    Key(KeyCode, bool),
    Joy(PendingJoy),
    /// Open or close the menu after the emulator has seen the key up.
    Toggle,
    QuickFunc(ButtonFn),
    SafeVideoReset,
    /// Key released while a key listener is waiting for one.
    Raw(KeyCode),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Combo {
    second_key: KeyCode,
    function: ButtonFn,
    invoked: bool,
}

/// Slots 0..4 are Commodore + F1/F3/F5/F7, slots 4..8 Ctrl + the same.
pub const COMBO_KEYS: [KeyCode; 4] = [KeyCode::F1, KeyCode::F3, KeyCode::F5, KeyCode::F7];

#[derive(Clone, Debug)]
pub struct KeyRouter {
    pub commodore_key: KeyCode,
    pub ctrl_key: KeyCode,
    commodore_down: bool,
    ctrl_down: bool,
    f7_down: bool,
    video_reset_down: u64,
    combos: [Combo; NUM_KEY_COMBOS],
    /// A key listener (key binding or keyset menu) wants the next key.
    pub raw_listener: bool,
}

impl Default for KeyRouter {
    fn default() -> Self {
        let mut combos = [Combo {
            second_key: KeyCode::None,
            function: ButtonFn::Undef,
            invoked: false,
        }; NUM_KEY_COMBOS];
        for (slot, combo) in combos.iter_mut().enumerate() {
            combo.second_key = COMBO_KEYS[slot % 4];
        }
        KeyRouter {
            commodore_key: KeyCode::LeftControl,
            ctrl_key: KeyCode::Tab,
            commodore_down: false,
            ctrl_down: false,
            f7_down: false,
            video_reset_down: 0,
            combos,
            raw_listener: false,
        }
    }
}

fn is_keyboard_joy(dev: JoyDev) -> bool {
    matches!(
        dev,
        JoyDev::Nums1 | JoyDev::Nums2 | JoyDev::CursSp | JoyDev::CursLc | JoyDev::Keyset1 | JoyDev::Keyset2
    )
}

fn joy_routes(joy: &InputConfig, code: KeyCode, pressed: bool, ui_enabled: bool) -> Option<Vec<Route>> {
    (0..2)
        .filter(|&port| is_keyboard_joy(joy.ports[port]))
        .find_map(|port| joy.key_event(port, code, pressed, ui_enabled))
}

impl KeyRouter {
    pub fn set_hotkey(&mut self, slot: usize, function: ButtonFn) {
        if let Some(combo) = self.combos.get_mut(slot) {
            combo.second_key = COMBO_KEYS[slot % 4];
            combo.function = function;
            combo.invoked = false;
        }
    }

    pub fn hotkey(&self, slot: usize) -> ButtonFn {
        self.combos.get(slot).map(|c| c.function).unwrap_or(ButtonFn::Undef)
    }

    pub fn commodore_down(&self) -> bool {
        self.commodore_down
    }

    fn combo_press(&mut self, code: KeyCode) -> bool {
        let ranges = [(self.commodore_down, 0..4), (self.ctrl_down, 4..8)];
        for (down, range) in ranges {
            if !down {
                continue;
            }
            if let Some(combo) = self.combos[range].iter_mut().find(|c| c.second_key == code) {
                combo.invoked = true;
                return true;
            }
        }
        false
    }

    fn combo_release(&mut self, code: KeyCode) -> Option<Route> {
        let combo = self
            .combos
            .iter_mut()
            .find(|c| c.second_key == code && c.invoked)?;
        match combo.function {
            ButtonFn::Warp
            | ButtonFn::SwapPorts
            | ButtonFn::StatusToggle
            | ButtonFn::CartFreeze
            | ButtonFn::ActiveDisplay
            | ButtonFn::PipLocation
            | ButtonFn::PipSwap
            | ButtonFn::Column4080
            | ButtonFn::FlushDisk => {
                combo.invoked = false;
                Some(Route::QuickFunc(combo.function))
            }
            _ => None,
        }
    }

    /// Functions that must wait until the modifier itself is released so
    /// the emulator does not see it stuck down.
    fn combo_functions(&mut self) -> Vec<Route> {
        let mut out = Vec::new();
        for combo in self.combos.iter_mut().filter(|c| c.invoked) {
            combo.invoked = false;
            match combo.function {
                ButtonFn::Menu => out.push(Route::Toggle),
                ButtonFn::ResetMenu
                | ButtonFn::ResetHard
                | ButtonFn::ResetSoft
                | ButtonFn::TapeMenu
                | ButtonFn::CartMenu => out.push(Route::QuickFunc(combo.function)),
                _ => {}
            }
        }
        out
    }

    pub fn pressed(&mut self, code: KeyCode, now: u64, ui_enabled: bool, joy: &InputConfig) -> Vec<Route> {
        if self.raw_listener {
            return Vec::new();
        }
        if code == self.commodore_key {
            self.commodore_down = true;
        } else if code == self.ctrl_key {
            self.ctrl_down = true;
        } else if code == KeyCode::F7 {
            self.f7_down = true;
            if self.commodore_down {
                self.video_reset_down = now;
            }
        }

        if let Some(routes) = joy_routes(joy, code, true, ui_enabled) {
            return routes;
        }
        if self.combo_press(code) {
            debug!("hotkey combo armed by {}", code);
            return Vec::new();
        }
        if ui_enabled {
            vec![Route::UiKey(code, true)]
        } else {
            vec![Route::EmuKey(code, true)]
        }
    }

    pub fn released(&mut self, code: KeyCode, now: u64, ui_enabled: bool, joy: &InputConfig) -> Vec<Route> {
        if self.raw_listener {
            return vec![Route::Raw(code)];
        }
        let mut out = Vec::new();
        if code == self.commodore_key {
            self.commodore_down = false;
        } else if code == self.ctrl_key {
            self.ctrl_down = false;
        } else if code == KeyCode::F7 {
            self.f7_down = false;
            if self.commodore_down && now.wrapping_sub(self.video_reset_down) >= VIDEO_RESET_DELAY {
                info!("Commodore + F7 held, switching to safe video mode");
                out.push(Route::SafeVideoReset);
            }
        }

        if code == KeyCode::F12 {
            if ui_enabled {
                out.push(Route::UiKey(code, false));
            } else {
                out.push(Route::EmuKey(code, false));
                out.push(Route::Toggle);
            }
            return out;
        }

        if let Some(routes) = joy_routes(joy, code, false, ui_enabled) {
            out.extend(routes);
            return out;
        }
        if let Some(route) = self.combo_release(code) {
            out.push(route);
            return out;
        }

        if ui_enabled {
            out.push(Route::UiKey(code, false));
        } else {
            out.push(Route::EmuKey(code, false));
        }
        if code == self.commodore_key || code == self.ctrl_key {
            out.extend(self.combo_functions());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> (KeyRouter, InputConfig) {
        (KeyRouter::default(), InputConfig::default())
    }

    #[test]
    fn plain_keys_follow_the_menu_state() {
        let (mut r, joy) = router();
        assert_eq!(r.pressed(KeyCode::a, 0, false, &joy), vec![Route::EmuKey(KeyCode::a, true)]);
        assert_eq!(r.released(KeyCode::a, 0, true, &joy), vec![Route::UiKey(KeyCode::a, false)]);
    }

    #[test]
    fn f12_release_toggles_after_key_up() {
        let (mut r, joy) = router();
        r.pressed(KeyCode::F12, 0, false, &joy);
        assert_eq!(
            r.released(KeyCode::F12, 0, false, &joy),
            vec![Route::EmuKey(KeyCode::F12, false), Route::Toggle]
        );
    }

    #[test]
    fn warp_combo_fires_on_second_key_release() {
        let (mut r, joy) = router();
        r.set_hotkey(0, ButtonFn::Warp);
        r.pressed(KeyCode::LeftControl, 0, false, &joy);
        assert!(r.pressed(KeyCode::F1, 0, false, &joy).is_empty());
        assert_eq!(r.released(KeyCode::F1, 0, false, &joy), vec![Route::QuickFunc(ButtonFn::Warp)]);
        assert_eq!(
            r.released(KeyCode::LeftControl, 0, false, &joy),
            vec![Route::EmuKey(KeyCode::LeftControl, false)]
        );
    }

    #[test]
    fn menu_combo_waits_for_modifier_release() {
        let (mut r, joy) = router();
        r.set_hotkey(7, ButtonFn::Menu);
        r.pressed(KeyCode::Tab, 0, false, &joy);
        r.pressed(KeyCode::F7, 0, false, &joy);
        assert_eq!(r.released(KeyCode::F7, 0, false, &joy), vec![Route::EmuKey(KeyCode::F7, false)]);
        assert_eq!(
            r.released(KeyCode::Tab, 0, false, &joy),
            vec![Route::EmuKey(KeyCode::Tab, false), Route::Toggle]
        );
    }

    #[test]
    fn long_commodore_f7_resets_video() {
        let (mut r, joy) = router();
        r.pressed(KeyCode::LeftControl, 0, false, &joy);
        r.pressed(KeyCode::F7, 100, false, &joy);
        let routes = r.released(KeyCode::F7, 100 + VIDEO_RESET_DELAY, false, &joy);
        assert_eq!(routes[0], Route::SafeVideoReset);
    }

    #[test]
    fn joystick_keys_are_consumed() {
        let (mut r, mut joy) = router();
        joy.ports[1] = JoyDev::CursSp;
        let routes = r.pressed(KeyCode::Space, 0, false, &joy);
        assert!(matches!(routes[0], Route::Joy(PendingJoy { port: 1, .. })));
    }

    #[test]
    fn listener_swallows_presses_and_reports_releases() {
        let (mut r, joy) = router();
        r.raw_listener = true;
        assert!(r.pressed(KeyCode::q, 0, true, &joy).is_empty());
        assert_eq!(r.released(KeyCode::q, 0, true, &joy), vec![Route::Raw(KeyCode::q)]);
    }
}
