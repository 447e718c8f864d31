//! Joystick port assignment and the conversion of keyboard keys and USB
//! gamepad reports into joystick latch events.

use log::debug;

use crate::ids::{
    ButtonFn, JoyDev, MAX_JOY_PORTS, MAX_USB_AXES, MAX_USB_BUTTONS, MAX_USB_DEVICES,
    MAX_USB_HATS, NUM_GPIO_PINS, NUM_KEY_BINDINGS, USB_PREF_ANALOG, USB_PREF_PADDLES,
};
use crate::kbd::Route;
use crate::keycodes::KeyCode;
use crate::queue::{JoyKind, PendingJoy};

pub const JOY_UP: u32 = 0x01;
pub const JOY_DOWN: u32 = 0x02;
pub const JOY_LEFT: u32 = 0x04;
pub const JOY_RIGHT: u32 = 0x08;
pub const JOY_FIRE: u32 = 0x10;

const POTX_SHIFT: u32 = 5;
const POTY_SHIFT: u32 = 13;

/// Hat position (0 = up, clockwise in eighths) to direction bits.
const DPAD_TO_JOY: [u32; 8] = [
    JOY_UP,
    JOY_UP | JOY_RIGHT,
    JOY_RIGHT,
    JOY_DOWN | JOY_RIGHT,
    JOY_DOWN,
    JOY_DOWN | JOY_LEFT,
    JOY_LEFT,
    JOY_UP | JOY_LEFT,
];

const DIRS: [(u32, KeyCode); 4] = [
    (JOY_UP, KeyCode::Up),
    (JOY_DOWN, KeyCode::Down),
    (JOY_LEFT, KeyCode::Left),
    (JOY_RIGHT, KeyCode::Right),
];

/// Slots of a keyset, in settings order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeysetSlot {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
    Fire = 4,
    PotX = 5,
    PotY = 6,
}

impl KeysetSlot {
    pub const ALL: [KeysetSlot; 7] = [
        KeysetSlot::Up,
        KeysetSlot::Down,
        KeysetSlot::Left,
        KeysetSlot::Right,
        KeysetSlot::Fire,
        KeysetSlot::PotX,
        KeysetSlot::PotY,
    ];

    /// Suffix used in settings keys and the label shown in the keyset menu.
    pub fn name(self) -> &'static str {
        match self {
            KeysetSlot::Up => "up",
            KeysetSlot::Down => "down",
            KeysetSlot::Left => "left",
            KeysetSlot::Right => "right",
            KeysetSlot::Fire => "fire",
            KeysetSlot::PotX => "potx",
            KeysetSlot::PotY => "poty",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KeysetSlot::Up => "Up",
            KeysetSlot::Down => "Down",
            KeysetSlot::Left => "Left",
            KeysetSlot::Right => "Right",
            KeysetSlot::Fire => "Fire",
            KeysetSlot::PotX => "POT X",
            KeysetSlot::PotY => "POT Y",
        }
    }
}

pub type Keyset = [KeyCode; 7];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pots {
    pub x_high: i32,
    pub x_low: i32,
    pub y_high: i32,
    pub y_low: i32,
}

impl Default for Pots {
    fn default() -> Self {
        Pots {
            x_high: 192,
            x_low: 64,
            y_high: 192,
            y_low: 64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UsbConfig {
    pub pref: i32,
    pub x_axis: usize,
    pub y_axis: usize,
    /// Fraction of half the axis range.
    pub x_thresh: f32,
    pub y_thresh: f32,
    pub buttons: [ButtonFn; MAX_USB_BUTTONS],
}

impl Default for UsbConfig {
    fn default() -> Self {
        UsbConfig {
            pref: USB_PREF_ANALOG,
            x_axis: 0,
            y_axis: 1,
            x_thresh: 0.50,
            y_thresh: 0.50,
            buttons: {
                let mut b = [ButtonFn::Undef; MAX_USB_BUTTONS];
                b[0] = ButtonFn::Fire;
                b
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Axis {
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
}

/// One gamepad report as the USB driver delivers it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct GamepadReport {
    pub buttons: u32,
    pub hats: [i32; MAX_USB_HATS],
    pub axes: [Axis; MAX_USB_AXES],
}

#[derive(Clone, Copy, Debug, Default)]
struct GamepadState {
    last: Option<GamepadReport>,
    prev_buttons: u32,
    prev_ui_dirs: u32,
}

/// Everything that decides where joystick input goes.
#[derive(Clone, Debug)]
pub struct InputConfig {
    pub ports: [JoyDev; MAX_JOY_PORTS],
    pub joyswap: bool,
    pub keysets: [Keyset; 2],
    pub key_bindings: [KeyCode; NUM_KEY_BINDINGS],
    pub pots: Pots,
    pub usb: [UsbConfig; MAX_USB_DEVICES],
    pub custom_gpio: [i32; NUM_GPIO_PINS],
    gamepads: [GamepadState; MAX_USB_DEVICES],
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            ports: [JoyDev::None; MAX_JOY_PORTS],
            joyswap: false,
            keysets: [[KeyCode::None; 7]; 2],
            key_bindings: [KeyCode::None; NUM_KEY_BINDINGS],
            pots: Pots::default(),
            usb: [UsbConfig::default(); MAX_USB_DEVICES],
            custom_gpio: [0; NUM_GPIO_PINS],
            gamepads: [GamepadState::default(); MAX_USB_DEVICES],
        }
    }
}

fn latch(kind: JoyKind, port: usize, device: JoyDev, value: u32) -> Route {
    Route::Joy(PendingJoy {
        kind,
        port,
        device,
        value,
    })
}

fn bit_route(port: usize, device: JoyDev, bit: u32, pressed: bool) -> Route {
    if pressed {
        latch(JoyKind::Or, port, device, bit)
    } else {
        latch(JoyKind::And, port, device, !bit)
    }
}

/// Direction and fire bits for the fixed keyboard layouts.
fn fixed_layout(device: JoyDev, code: KeyCode) -> Option<u32> {
    let table: [KeyCode; 5] = match device {
        JoyDev::Nums1 => [KeyCode::KP8, KeyCode::KP2, KeyCode::KP4, KeyCode::KP6, KeyCode::KP5],
        JoyDev::Nums2 => [KeyCode::KP9, KeyCode::KP3, KeyCode::KP7, KeyCode::KP1, KeyCode::KP0],
        JoyDev::CursSp => [KeyCode::Up, KeyCode::Down, KeyCode::Left, KeyCode::Right, KeyCode::Space],
        JoyDev::CursLc => [
            KeyCode::Up,
            KeyCode::Down,
            KeyCode::Left,
            KeyCode::Right,
            KeyCode::LeftControl,
        ],
        _ => return None,
    };
    let bits = [JOY_UP, JOY_DOWN, JOY_LEFT, JOY_RIGHT, JOY_FIRE];
    table.iter().position(|&k| k == code).map(|i| bits[i])
}

impl InputConfig {
    /// Maps a keyboard key on one of the first two ports. `None` means the
    /// key is not a joystick key and carries on to the keyboard.
    pub fn key_event(&self, port: usize, code: KeyCode, pressed: bool, ui_active: bool) -> Option<Vec<Route>> {
        if port > 1 {
            return None;
        }
        let device = self.ports[port];

        if ui_active {
            // Only the keypad layouts drive the menu; the rest would steal
            // keys the menu needs.
            if !matches!(device, JoyDev::Nums1 | JoyDev::Nums2) {
                return None;
            }
            let bit = fixed_layout(device, code)?;
            let ui_key = match bit {
                JOY_UP => KeyCode::Up,
                JOY_DOWN => KeyCode::Down,
                JOY_LEFT => KeyCode::Left,
                JOY_RIGHT => KeyCode::Right,
                _ => KeyCode::Return,
            };
            return Some(vec![Route::UiKey(ui_key, pressed)]);
        }

        if let Some(bit) = fixed_layout(device, code) {
            return Some(vec![bit_route(port, device, bit, pressed)]);
        }

        let keyset = match device {
            JoyDev::Keyset1 => &self.keysets[0],
            JoyDev::Keyset2 => &self.keysets[1],
            _ => return None,
        };
        if code == KeyCode::None {
            return None;
        }
        let slot = keyset.iter().position(|&k| k == code)?;
        let routes = match KeysetSlot::ALL[slot] {
            KeysetSlot::Up => vec![bit_route(port, device, JOY_UP, pressed)],
            KeysetSlot::Down => vec![bit_route(port, device, JOY_DOWN, pressed)],
            KeysetSlot::Left => vec![bit_route(port, device, JOY_LEFT, pressed)],
            KeysetSlot::Right => vec![bit_route(port, device, JOY_RIGHT, pressed)],
            KeysetSlot::Fire => vec![bit_route(port, device, JOY_FIRE, pressed)],
            KeysetSlot::PotX => self.pot_routes(port, device, pressed, POTX_SHIFT, self.pots.x_high, self.pots.x_low),
            KeysetSlot::PotY => self.pot_routes(port, device, pressed, POTY_SHIFT, self.pots.y_high, self.pots.y_low),
        };
        Some(routes)
    }

    fn pot_routes(&self, port: usize, device: JoyDev, pressed: bool, shift: u32, high: i32, low: i32) -> Vec<Route> {
        let (high, low) = ((high as u32) << shift, (low as u32) << shift);
        let (clear, set) = if pressed { (high, low) } else { (low, high) };
        vec![
            latch(JoyKind::And, port, device, !clear),
            latch(JoyKind::Or, port, device, set),
        ]
    }

    /// Swaps the devices on ports 1 and 2. A mouse cannot follow the swap,
    /// so it is unplugged first; the unplugged ports are returned.
    pub fn swap_ports(&mut self) -> Vec<usize> {
        let mut cleared = Vec::new();
        for port in 0..2 {
            if self.ports[port] == JoyDev::Mouse {
                self.ports[port] = JoyDev::None;
                cleared.push(port);
            }
        }
        self.ports.swap(0, 1);
        self.joyswap = !self.joyswap;
        cleared
    }

    pub fn port_of(&self, device: JoyDev) -> Option<usize> {
        self.ports.iter().position(|&d| d == device)
    }

    fn directions(&self, dev: usize, report: &GamepadReport) -> u32 {
        let cfg = &self.usb[dev];
        if cfg.pref != USB_PREF_ANALOG {
            let dpad = report.hats[0];
            return usize::try_from(dpad)
                .ok()
                .and_then(|d| DPAD_TO_JOY.get(d))
                .copied()
                .unwrap_or(0);
        }
        let mut dirs = 0;
        let axis_dirs = |axis: usize, thresh: f32, neg: u32, pos: u32| {
            let Some(a) = report.axes.get(axis) else { return 0 };
            let t = (a.maximum - a.minimum) as f32 / 2.0 * thresh;
            let m = (a.maximum + a.minimum) as f32 / 2.0;
            let v = a.value as f32;
            if v < m - t {
                neg
            } else if v > m + t {
                pos
            } else {
                0
            }
        };
        dirs |= axis_dirs(cfg.x_axis, cfg.x_thresh, JOY_LEFT, JOY_RIGHT);
        dirs |= axis_dirs(cfg.y_axis, cfg.y_thresh, JOY_UP, JOY_DOWN);
        dirs
    }

    /// Pot and fire bits contributed by held buttons.
    pub fn add_button_values(&self, dev: usize, buttons: u32) -> u32 {
        let pots = &self.pots;
        let mut value = ((pots.x_high as u32) << POTX_SHIFT) | ((pots.y_high as u32) << POTY_SHIFT);
        for (j, func) in self.usb[dev].buttons.iter().enumerate() {
            if buttons & (1 << j) == 0 {
                continue;
            }
            match func {
                ButtonFn::Fire => value |= JOY_FIRE,
                ButtonFn::PotX => {
                    value &= !((pots.x_high as u32) << POTX_SHIFT);
                    value |= (pots.x_low as u32) << POTX_SHIFT;
                }
                ButtonFn::PotY => {
                    value &= !((pots.y_high as u32) << POTY_SHIFT);
                    value |= (pots.y_low as u32) << POTY_SHIFT;
                }
                ButtonFn::Up => value |= JOY_UP,
                ButtonFn::Down => value |= JOY_DOWN,
                ButtonFn::Left => value |= JOY_LEFT,
                ButtonFn::Right => value |= JOY_RIGHT,
                _ => {}
            }
        }
        value
    }

    fn button_functions(&self, dev: usize, buttons: u32, prev: u32, ui_active: bool) -> Vec<Route> {
        let mut out = Vec::new();
        for (j, &func) in self.usb[dev].buttons.iter().enumerate() {
            let bit = 1 << j;
            if (buttons ^ prev) & bit == 0 {
                continue;
            }
            let pressed = buttons & bit != 0;
            match func {
                ButtonFn::Menu => out.push(Route::Key(KeyCode::F12, pressed)),
                ButtonFn::Warp
                | ButtonFn::SwapPorts
                | ButtonFn::StatusToggle
                | ButtonFn::TapeMenu
                | ButtonFn::CartMenu
                | ButtonFn::CartFreeze
                | ButtonFn::ResetMenu
                | ButtonFn::ResetHard
                | ButtonFn::ResetSoft
                | ButtonFn::ActiveDisplay
                | ButtonFn::PipLocation
                | ButtonFn::PipSwap
                | ButtonFn::Column4080
                | ButtonFn::VkbdToggle
                | ButtonFn::FlushDisk => {
                    if pressed {
                        out.push(Route::QuickFunc(func));
                    }
                }
                ButtonFn::Fire if ui_active => out.push(Route::UiKey(KeyCode::Return, pressed)),
                ButtonFn::RunStopBack => {
                    if ui_active {
                        out.push(Route::UiKey(KeyCode::Escape, pressed));
                    } else {
                        out.push(Route::EmuKey(KeyCode::Escape, pressed));
                    }
                }
                ButtonFn::Up | ButtonFn::Down | ButtonFn::Left | ButtonFn::Right if ui_active => {
                    let code = match func {
                        ButtonFn::Up => KeyCode::Up,
                        ButtonFn::Down => KeyCode::Down,
                        ButtonFn::Left => KeyCode::Left,
                        _ => KeyCode::Right,
                    };
                    out.push(Route::UiKey(code, pressed));
                }
                other => {
                    if let Some(n) = other.custom_key_index() {
                        let code = self.key_bindings[n];
                        if code != KeyCode::None {
                            out.push(Route::Key(code, pressed));
                        }
                    }
                }
            }
        }
        out
    }

    /// Turns a gamepad report into routes. Reports identical to the last
    /// one from the same device produce nothing.
    pub fn usb_report(&mut self, dev: usize, report: &GamepadReport, ui_active: bool, vkbd_enabled: bool) -> Vec<Route> {
        if dev >= MAX_USB_DEVICES {
            return Vec::new();
        }
        if self.gamepads[dev].last.as_ref() == Some(report) {
            return Vec::new();
        }
        self.gamepads[dev].last = Some(*report);

        let dirs = self.directions(dev, report);
        let prev_buttons = self.gamepads[dev].prev_buttons;
        self.gamepads[dev].prev_buttons = report.buttons;

        if ui_active {
            let prev_dirs = self.gamepads[dev].prev_ui_dirs;
            self.gamepads[dev].prev_ui_dirs = dirs;
            let mut out: Vec<Route> = DIRS
                .iter()
                .filter(|(bit, _)| (dirs ^ prev_dirs) & bit != 0)
                .map(|&(bit, code)| Route::UiKey(code, dirs & bit != 0))
                .collect();
            out.extend(self.button_functions(dev, report.buttons, prev_buttons, true));
            return out;
        }
        self.gamepads[dev].prev_ui_dirs = 0;

        let mut out = self.button_functions(dev, report.buttons, prev_buttons, false);
        let value = dirs | self.add_button_values(dev, report.buttons);
        let Some(device) = JoyDev::usb(dev) else { return out };
        let port = match self.port_of(device) {
            Some(port) => Some(port),
            None if vkbd_enabled => Some(0),
            None => None,
        };
        if let Some(port) = port {
            out.push(latch(JoyKind::Absolute, port, device, value));
            if self.usb[dev].pref == USB_PREF_PADDLES {
                out.extend(self.paddle_routes(dev, port, device, report));
            }
        } else {
            debug!("usb gamepad {} is not assigned to a port", dev);
        }
        out
    }

    fn paddle_routes(&self, dev: usize, port: usize, device: JoyDev, report: &GamepadReport) -> Vec<Route> {
        let cfg = &self.usb[dev];
        let scale = |axis: usize| {
            let a = report.axes.get(axis).copied().unwrap_or_default();
            let span = (a.maximum - a.minimum).max(1);
            (((a.value - a.minimum).clamp(0, span) * 255) / span) as u32
        };
        vec![
            latch(JoyKind::PotX, port, device, scale(cfg.x_axis)),
            latch(JoyKind::PotY, port, device, scale(cfg.y_axis)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joy(kind: JoyKind, port: usize, device: JoyDev, value: u32) -> Route {
        latch(kind, port, device, value)
    }

    #[test]
    fn keypad_sets_and_clears_bits() {
        let mut cfg = InputConfig::default();
        cfg.ports[0] = JoyDev::Nums1;
        assert_eq!(
            cfg.key_event(0, KeyCode::KP8, true, false),
            Some(vec![joy(JoyKind::Or, 0, JoyDev::Nums1, JOY_UP)])
        );
        assert_eq!(
            cfg.key_event(0, KeyCode::KP5, false, false),
            Some(vec![joy(JoyKind::And, 0, JoyDev::Nums1, !JOY_FIRE)])
        );
        assert_eq!(cfg.key_event(0, KeyCode::a, true, false), None);
        assert_eq!(cfg.key_event(1, KeyCode::KP8, true, false), None);
    }

    #[test]
    fn keypad_drives_menu_but_cursor_keys_do_not() {
        let mut cfg = InputConfig::default();
        cfg.ports[0] = JoyDev::Nums2;
        cfg.ports[1] = JoyDev::CursSp;
        assert_eq!(
            cfg.key_event(0, KeyCode::KP0, true, true),
            Some(vec![Route::UiKey(KeyCode::Return, true)])
        );
        assert_eq!(cfg.key_event(1, KeyCode::Up, true, true), None);
    }

    #[test]
    fn keyset_pot_swaps_high_and_low() {
        let mut cfg = InputConfig::default();
        cfg.ports[1] = JoyDev::Keyset2;
        cfg.keysets[1][KeysetSlot::PotX as usize] = KeyCode::z;
        let routes = cfg.key_event(1, KeyCode::z, true, false).unwrap();
        assert_eq!(
            routes,
            vec![
                joy(JoyKind::And, 1, JoyDev::Keyset2, !(192 << 5)),
                joy(JoyKind::Or, 1, JoyDev::Keyset2, 64 << 5),
            ]
        );
        let routes = cfg.key_event(1, KeyCode::z, false, false).unwrap();
        assert_eq!(routes[1], joy(JoyKind::Or, 1, JoyDev::Keyset2, 192 << 5));
    }

    #[test]
    fn swap_unplugs_mouse() {
        let mut cfg = InputConfig::default();
        cfg.ports[0] = JoyDev::Mouse;
        cfg.ports[1] = JoyDev::Usb0;
        assert_eq!(cfg.swap_ports(), vec![0]);
        assert_eq!(cfg.ports[0], JoyDev::Usb0);
        assert_eq!(cfg.ports[1], JoyDev::None);
        assert!(cfg.joyswap);
    }

    fn analog(x: i32, y: i32) -> GamepadReport {
        let mut r = GamepadReport::default();
        r.axes[0] = Axis { value: x, minimum: 0, maximum: 255 };
        r.axes[1] = Axis { value: y, minimum: 0, maximum: 255 };
        r
    }

    #[test]
    fn analog_thresholds() {
        let mut cfg = InputConfig::default();
        cfg.ports[0] = JoyDev::Usb0;
        let base = cfg.add_button_values(0, 0);
        // centre 127.5, threshold 63.75
        let routes = cfg.usb_report(0, &analog(10, 127), false, false);
        assert_eq!(routes, vec![joy(JoyKind::Absolute, 0, JoyDev::Usb0, base | JOY_LEFT)]);
        let routes = cfg.usb_report(0, &analog(100, 250), false, false);
        assert_eq!(routes, vec![joy(JoyKind::Absolute, 0, JoyDev::Usb0, base | JOY_DOWN)]);
        assert!(cfg.usb_report(0, &analog(100, 250), false, false).is_empty());
    }

    #[test]
    fn hat_and_fire_button() {
        let mut cfg = InputConfig::default();
        cfg.ports[1] = JoyDev::Usb1;
        cfg.usb[1].pref = crate::ids::USB_PREF_HAT;
        let mut r = GamepadReport::default();
        r.hats[0] = 3;
        r.buttons = 1;
        let base = (192 << 5) | (192 << 13);
        assert_eq!(
            cfg.usb_report(1, &r, false, false),
            vec![joy(JoyKind::Absolute, 1, JoyDev::Usb1, base | JOY_FIRE | JOY_DOWN | JOY_RIGHT)]
        );
    }

    #[test]
    fn menu_mode_edges() {
        let mut cfg = InputConfig::default();
        cfg.usb[0].pref = crate::ids::USB_PREF_HAT;
        cfg.usb[0].buttons[1] = ButtonFn::Menu;
        let mut r = GamepadReport::default();
        r.hats[0] = 0;
        assert_eq!(cfg.usb_report(0, &r, true, false), vec![Route::UiKey(KeyCode::Up, true)]);
        r.hats[0] = 8;
        r.buttons = 0b11;
        assert_eq!(
            cfg.usb_report(0, &r, true, false),
            vec![
                Route::UiKey(KeyCode::Up, false),
                Route::UiKey(KeyCode::Return, true),
                Route::Key(KeyCode::F12, true),
            ]
        );
    }

    #[test]
    fn unassigned_gamepad_drives_vkbd_port() {
        let mut cfg = InputConfig::default();
        let r = analog(128, 128);
        assert!(cfg.usb_report(2, &r, false, false).is_empty());
        let r = analog(0, 128);
        let routes = cfg.usb_report(2, &r, false, true);
        assert!(matches!(routes[0], Route::Joy(PendingJoy { port: 0, device: JoyDev::Usb2, .. })));
    }

    #[test]
    fn quick_functions_fire_on_press_only() {
        let mut cfg = InputConfig::default();
        cfg.ports[0] = JoyDev::Usb0;
        cfg.usb[0].buttons[2] = ButtonFn::Warp;
        let mut r = analog(128, 128);
        r.buttons = 0b100;
        let routes = cfg.usb_report(0, &r, false, false);
        assert_eq!(routes[0], Route::QuickFunc(ButtonFn::Warp));
        r.buttons = 0;
        let routes = cfg.usb_report(0, &r, false, false);
        assert_eq!(routes.len(), 1);
    }
}
