//! The per-machine `key=value` settings file.
//!
//! `Settings` is a plain snapshot. The runtime gathers it from the menu
//! items before saving and pushes it back into them after loading, so this
//! module never touches the UI. Unknown keys are offered to the emulator
//! first; a handful of legacy keys are migrated on load.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info, warn};

use crate::error::Result;
use crate::ids::{
    ButtonFn, HOTKEY_CHOICE_MENU, HOTKEY_CHOICE_NONE, MAX_USB_BUTTONS, MAX_USB_DEVICES,
    NUM_BUTTON_ASSIGNMENTS, NUM_GPIO_PINS, NUM_KEY_BINDINGS, OVERLAY_ON_ACTIVITY,
};
use crate::joy::{Keyset, KeysetSlot, Pots, UsbConfig};
use crate::keycodes::KeyCode;
use crate::platform::MachineClass;

/// Shader keys in file order, with the menu id and default of each.
pub const SHADER_ITEMS: [(&str, i32, i32); 14] = [
    ("s_curvature", crate::ids::SHADER_CURVATURE, 0),
    ("s_curvature_x", crate::ids::SHADER_CURVATURE_X, 10),
    ("s_curvature_y", crate::ids::SHADER_CURVATURE_Y, 15),
    ("s_sharper", crate::ids::SHADER_SHARPER, 0),
    ("s_mask", crate::ids::SHADER_MASK, 0),
    ("s_mask_brightness", crate::ids::SHADER_MASK_BRIGHTNESS, 70),
    ("s_scanlines", crate::ids::SHADER_SCANLINES, 1),
    ("s_multisample", crate::ids::SHADER_MULTISAMPLE, 1),
    ("s_scanline_weight", crate::ids::SHADER_SCANLINE_WEIGHT, 60),
    ("s_scanline_gap_brightness", crate::ids::SHADER_SCANLINE_GAP_BRIGHTNESS, 12),
    ("s_bloom_factor", crate::ids::SHADER_BLOOM, 150),
    ("s_gamma", crate::ids::SHADER_GAMMA, 2),
    ("s_input_gamma", crate::ids::SHADER_INPUT_GAMMA, 240),
    ("s_output_gamma", crate::ids::SHADER_OUTPUT_GAMMA, 220),
];

const HOTKEY_NAMES: [&str; 8] = [
    "hotkey_cf1",
    "hotkey_cf3",
    "hotkey_cf5",
    "hotkey_cf7",
    "hotkey_tf1",
    "hotkey_tf3",
    "hotkey_tf5",
    "hotkey_tf7",
];

/// Geometry items of one display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplaySettings {
    pub h_center: i32,
    pub v_center: i32,
    pub h_border: i32,
    pub v_border: i32,
    pub h_stretch: i32,
    pub v_stretch: i32,
    pub use_int_scaling: i32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            h_center: 0,
            v_center: 0,
            h_border: 32,
            v_border: 35,
            h_stretch: 1200,
            v_stretch: 1000,
            use_int_scaling: 1,
        }
    }
}

/// Bounds the loader clamps and migrates against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadLimits {
    pub palettes: [usize; 2],
    /// Maximum h and v border of each display.
    pub max_border: [(i32, i32); 2],
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Choice index of each port item that exists on this machine.
    pub ports: Vec<i32>,
    pub usb: [UsbConfig; MAX_USB_DEVICES],
    pub palette: [i32; 2],
    /// Choice indices into `HOTKEY_CHOICES`, C= slots first.
    pub hotkeys: [i32; 8],
    pub overlay: i32,
    pub overlay_padding: i32,
    pub vkbd_trans: i32,
    pub tapereset: i32,
    pub reset_confirm: i32,
    pub scaling_interp: i32,
    /// Stored as the choice's backing integer, not its index.
    pub gpio_config: i32,
    pub display: [DisplaySettings; 2],
    pub drive_types: [i32; 4],
    pub pots: Pots,
    pub keysets: [Keyset; 2],
    pub key_bindings: [KeyCode; NUM_KEY_BINDINGS],
    pub volume: i32,
    pub dir_convention: i32,
    pub custom_gpio: [i32; NUM_GPIO_PINS],
    /// Values in `SHADER_ITEMS` order.
    pub shader: [i32; 14],
}

impl Default for Settings {
    fn default() -> Self {
        let mut hotkeys = [HOTKEY_CHOICE_NONE; 8];
        hotkeys[3] = HOTKEY_CHOICE_MENU;
        hotkeys[7] = HOTKEY_CHOICE_MENU;
        Settings {
            ports: Vec::new(),
            usb: [UsbConfig::default(); MAX_USB_DEVICES],
            palette: [0; 2],
            hotkeys,
            overlay: OVERLAY_ON_ACTIVITY,
            overlay_padding: 0,
            vkbd_trans: 0,
            tapereset: 1,
            reset_confirm: 1,
            scaling_interp: 1,
            gpio_config: 0,
            display: [DisplaySettings::default(); 2],
            drive_types: [1541, 0, 0, 0],
            pots: Pots::default(),
            keysets: [[KeyCode::None; 7]; 2],
            key_bindings: [KeyCode::None; NUM_KEY_BINDINGS],
            volume: 100,
            dir_convention: 0,
            custom_gpio: [0; NUM_GPIO_PINS],
            shader: SHADER_ITEMS.map(|(_, _, default)| default),
        }
    }
}

/// Settings file of each machine, relative to the SD root.
pub fn file_name(machine: MachineClass) -> &'static str {
    match machine {
        MachineClass::C64 => "settings.txt",
        MachineClass::C128 => "settings-c128.txt",
        MachineClass::Vic20 => "settings-vic20.txt",
        MachineClass::Plus4 => "settings-plus4.txt",
        MachineClass::Plus4Emu => "settings-plus4emu.txt",
        MachineClass::Pet => "settings-pet.txt",
    }
}

/// Leading integer of `s`, 0 if there is none.
fn atoi(s: &str) -> i32 {
    let s = s.trim_start();
    let (neg, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    let n = digits[..end]
        .bytes()
        .fold(0i64, |acc, d| (acc * 10 + i64::from(d - b'0')).min(i64::from(i32::MAX) + 1));
    let n = if neg { -n } else { n };
    n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn push(out: &mut String, key: impl std::fmt::Display, value: impl std::fmt::Display) {
    out.push_str(&format!("{}={}\n", key, value));
}

fn display_suffix(name: &str) -> Option<(&str, usize)> {
    name.strip_suffix("_0")
        .map(|base| (base, 0))
        .or_else(|| name.strip_suffix("_1").map(|base| (base, 1)))
}

impl Settings {
    /// Serializes in the order the firmware has always written.
    pub fn to_text(&self, machine: MachineClass) -> String {
        let c128 = machine == MachineClass::C128;
        let mut out = String::new();

        for (i, port) in self.ports.iter().enumerate() {
            push(&mut out, format_args!("port_{}", i + 1), port);
        }
        for (k, usb) in self.usb.iter().enumerate() {
            push(&mut out, format_args!("usb_{}", k), usb.pref);
            push(&mut out, format_args!("usb_x_{}", k), usb.x_axis);
            push(&mut out, format_args!("usb_y_{}", k), usb.y_axis);
            push(&mut out, format_args!("usb_x_t_{}", k), (usb.x_thresh * 100.0).round() as i32);
            push(&mut out, format_args!("usb_y_t_{}", k), (usb.y_thresh * 100.0).round() as i32);
        }
        push(&mut out, "palette", self.palette[0]);
        if c128 {
            push(&mut out, "palette2", self.palette[1]);
        }
        for (k, usb) in self.usb.iter().enumerate() {
            for func in usb.buttons.iter() {
                push(&mut out, format_args!("usb_btn_{}", k), func.as_i32());
            }
        }
        for (name, value) in HOTKEY_NAMES.iter().zip(self.hotkeys.iter()) {
            push(&mut out, name, value);
        }
        // The status bar keys kept their old overlay names.
        push(&mut out, "overlay", self.overlay);
        push(&mut out, "overlay_padding", self.overlay_padding);
        push(&mut out, "vkbd_trans", self.vkbd_trans);
        push(&mut out, "tapereset", self.tapereset);
        push(&mut out, "reset_confirm", self.reset_confirm);
        push(&mut out, "scaling_interp", self.scaling_interp);
        push(&mut out, "gpio_config", self.gpio_config);

        let displays = if c128 { 2 } else { 1 };
        for (n, d) in self.display.iter().enumerate().take(displays) {
            push(&mut out, format_args!("h_center_{}", n), d.h_center);
            push(&mut out, format_args!("v_center_{}", n), d.v_center);
            push(&mut out, format_args!("h_border_{}", n), d.h_border);
            push(&mut out, format_args!("v_border_{}", n), d.v_border);
            push(&mut out, format_args!("h_stretch_{}", n), d.h_stretch);
            push(&mut out, format_args!("v_stretch_{}", n), d.v_stretch);
        }

        for (i, t) in self.drive_types.iter().enumerate() {
            push(&mut out, format_args!("drive_type_{}", i + 8), t);
        }

        push(&mut out, "pot_x_high", self.pots.x_high);
        push(&mut out, "pot_x_low", self.pots.x_low);
        push(&mut out, "pot_y_high", self.pots.y_high);
        push(&mut out, "pot_y_low", self.pots.y_low);

        for (n, keyset) in self.keysets.iter().enumerate() {
            for slot in KeysetSlot::ALL {
                push(&mut out, format_args!("keyset_{}_{}", n + 1, slot.name()), keyset[slot as usize].0);
            }
        }
        for (i, code) in self.key_bindings.iter().enumerate() {
            push(&mut out, format_args!("key_binding_{}", i + 1), code.0);
        }

        push(&mut out, "volume", self.volume);
        push(&mut out, "dir_convention", self.dir_convention);
        for (n, d) in self.display.iter().enumerate().take(displays) {
            push(&mut out, format_args!("use_int_scaling_{}", n), d.use_int_scaling);
        }

        for (pin, binding) in self.custom_gpio.iter().enumerate() {
            push(&mut out, "custom_gpio", format_args!("{},{}", pin, binding));
        }
        for ((name, _, _), value) in SHADER_ITEMS.iter().zip(self.shader.iter()) {
            push(&mut out, name, value);
        }
        out
    }

    /// Applies a settings file on top of `self`. `claim` sees every line
    /// first and returns true for keys it consumed.
    pub fn apply_text(
        &mut self,
        text: &str,
        machine: MachineClass,
        limits: &LoadLimits,
        claim: &mut dyn FnMut(&str, &str) -> bool,
    ) {
        let c128 = machine == MachineClass::C128;
        let mut usb_btn_i = [0usize; MAX_USB_DEVICES];

        for line in text.lines() {
            let Some((name, value_str)) = line.split_once('=') else { continue };
            let (name, value_str) = (name.trim(), value_str.trim());
            if name.is_empty() || value_str.is_empty() {
                continue;
            }
            let value = atoi(value_str);

            if claim(name, value_str) {
                continue;
            }

            if let Some(port) = name.strip_prefix("port_") {
                let index = atoi(port) as usize;
                if (1..=self.ports.len()).contains(&index) {
                    self.ports[index - 1] = value;
                }
                continue;
            }

            if let Some(slot) = HOTKEY_NAMES.iter().position(|&h| h == name) {
                self.hotkeys[slot] = value;
                continue;
            }

            if let Some(i) = SHADER_ITEMS.iter().position(|(key, _, _)| *key == name) {
                self.shader[i] = value;
                continue;
            }

            if self.apply_display_key(name, value, c128, limits) {
                continue;
            }

            if self.apply_input_key(name, value, &mut usb_btn_i) {
                continue;
            }

            match name {
                "palette" => self.palette[0] = value.min(limits.palettes[0] as i32 - 1).max(0),
                "palette2" if c128 => self.palette[1] = value.min(limits.palettes[1] as i32 - 1).max(0),
                "alt_f12" => self.hotkeys[3] = HOTKEY_CHOICE_MENU,
                "overlay" => self.overlay = value,
                "overlay_padding" => self.overlay_padding = value,
                "vkbd_trans" => self.vkbd_trans = value,
                "tapereset" => self.tapereset = value,
                "reset_confirm" => self.reset_confirm = value,
                "scaling_interp" => self.scaling_interp = value,
                "gpio_config" => self.gpio_config = if (1..=5).contains(&value) { value } else { 0 },
                "volume" => self.volume = value,
                "dir_convention" => self.dir_convention = value,
                "custom_gpio" => {
                    let mut parts = value_str.split(',');
                    let pin = parts.next().map(atoi).unwrap_or(-1);
                    if let Some(slot) = usize::try_from(pin).ok().and_then(|p| self.custom_gpio.get_mut(p)) {
                        *slot = parts.next().map(atoi).unwrap_or(0);
                    }
                }
                _ => {
                    if let Some(unit) = name.strip_prefix("drive_type_") {
                        let unit = atoi(unit);
                        if (8..=11).contains(&unit) {
                            self.drive_types[(unit - 8) as usize] = value;
                            continue;
                        }
                    }
                    debug!("ignoring setting {}", name);
                }
            }
        }
    }

    fn apply_display_key(&mut self, name: &str, value: i32, c128: bool, limits: &LoadLimits) -> bool {
        let Some((base, n)) = display_suffix(name) else { return false };
        if n == 1 && !c128 {
            // Second display keys are only honoured on machines with one.
            return matches!(
                base,
                "h_center" | "v_center" | "h_border" | "v_border" | "h_stretch" | "v_stretch"
                    | "h_border_trim" | "v_border_trim" | "aspect" | "use_int_scaling"
            );
        }
        let d = &mut self.display[n];
        let (max_w, max_h) = limits.max_border[n];
        match base {
            "h_center" => d.h_center = value,
            "v_center" => d.v_center = value,
            "h_border" => d.h_border = value,
            "v_border" => d.v_border = value,
            "h_stretch" => d.h_stretch = value,
            "v_stretch" => d.v_stretch = value,
            "use_int_scaling" => d.use_int_scaling = value,
            "h_border_trim" => {
                d.h_border = (f64::from(max_w) * (1.0 - f64::from(value) / 100.0)) as i32;
                d.use_int_scaling = 0;
            }
            "v_border_trim" => {
                d.v_border = (f64::from(max_h) * (1.0 - f64::from(value) / 100.0)) as i32;
                d.use_int_scaling = 0;
            }
            "aspect" => d.h_stretch = value * 10,
            _ => return false,
        }
        true
    }

    fn apply_input_key(&mut self, name: &str, value: i32, usb_btn_i: &mut [usize; MAX_USB_DEVICES]) -> bool {
        match name {
            "pot_x_high" => self.pots.x_high = value,
            "pot_x_low" => self.pots.x_low = value,
            "pot_y_high" => self.pots.y_high = value,
            "pot_y_low" => self.pots.y_low = value,
            _ => {
                if let Some(rest) = name.strip_prefix("keyset_") {
                    return self.apply_keyset_key(rest, value);
                }
                if let Some(n) = name.strip_prefix("key_binding_") {
                    let n = atoi(n) as usize;
                    if (1..=NUM_KEY_BINDINGS).contains(&n) {
                        self.key_bindings[n - 1] = KeyCode(value);
                        return true;
                    }
                    return false;
                }
                return self.apply_usb_key(name, value, usb_btn_i);
            }
        }
        true
    }

    fn apply_keyset_key(&mut self, rest: &str, value: i32) -> bool {
        let Some((n, slot)) = rest.split_once('_') else { return false };
        let set = match n {
            "1" => 0,
            "2" => 1,
            _ => return false,
        };
        match KeysetSlot::ALL.iter().find(|s| s.name() == slot) {
            Some(&s) => {
                self.keysets[set][s as usize] = KeyCode(value);
                true
            }
            None => false,
        }
    }

    fn apply_usb_key(&mut self, name: &str, value: i32, usb_btn_i: &mut [usize; MAX_USB_DEVICES]) -> bool {
        let Some(rest) = name.strip_prefix("usb_") else { return false };
        let (field, dev) = rest.rsplit_once('_').unwrap_or(("", rest));
        let Ok(k) = dev.parse::<usize>() else { return false };
        let Some(usb) = self.usb.get_mut(k) else { return false };
        match field {
            "" => usb.pref = value,
            "x" => usb.x_axis = value.max(0) as usize,
            "y" => usb.y_axis = value.max(0) as usize,
            "x_t" => usb.x_thresh = value as f32 / 100.0,
            "y_t" => usb.y_thresh = value as f32 / 100.0,
            "btn" => {
                let v = value.clamp(0, NUM_BUTTON_ASSIGNMENTS as i32 - 1);
                usb.buttons[usb_btn_i[k]] = ButtonFn::from_i32(v).unwrap_or(ButtonFn::Undef);
                usb_btn_i[k] = (usb_btn_i[k] + 1) % MAX_USB_BUTTONS;
            }
            _ => return false,
        }
        true
    }
}

/// Reads a settings file. A missing file is not an error.
pub fn read(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => {
            info!("loaded settings from {}", path.display());
            Ok(Some(text))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("no settings file at {}", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Writes through a temporary file so a failed save keeps the old file.
pub fn write(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("txt.tmp");
    fs::write(&tmp, text.as_bytes())?;
    if let Err(e) = fs::rename(&tmp, path) {
        warn!("could not replace {}: {}", path.display(), e);
        return Err(e.into());
    }
    info!("saved settings to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: LoadLimits = LoadLimits {
        palettes: [4, 2],
        max_border: [(32, 40), (20, 10)],
    };

    fn load(text: &str, machine: MachineClass) -> Settings {
        let mut s = Settings {
            ports: vec![0; machine.num_joysticks()],
            ..Settings::default()
        };
        s.apply_text(text, machine, &LIMITS, &mut |_, _| false);
        s
    }

    #[test]
    fn atoi_takes_the_leading_number() {
        assert_eq!(atoi("42"), 42);
        assert_eq!(atoi("-7x"), -7);
        assert_eq!(atoi("abc"), 0);
        assert_eq!(atoi("3,9"), 3);
    }

    #[test]
    fn file_starts_with_ports_and_ends_with_shader() {
        let mut s = Settings::default();
        s.ports = vec![1, 5];
        let text = s.to_text(MachineClass::C64);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "port_1=1");
        assert_eq!(lines[1], "port_2=5");
        assert_eq!(lines[2], "usb_0=0");
        assert_eq!(lines[5], "usb_x_t_0=50");
        assert_eq!(*lines.last().unwrap(), "s_output_gamma=220");
        assert!(!text.contains("palette2"));
        assert!(!text.contains("h_center_1"));
        assert_eq!(text.matches("usb_btn_0=").count(), MAX_USB_BUTTONS);
        assert_eq!(text.matches("custom_gpio=").count(), NUM_GPIO_PINS);
    }

    #[test]
    fn c128_writes_second_display() {
        let text = Settings::default().to_text(MachineClass::C128);
        assert!(text.contains("palette2=0\n"));
        assert!(text.contains("v_stretch_1=1000\n"));
        assert!(text.contains("use_int_scaling_1=1\n"));
    }

    #[test]
    fn text_round_trips() {
        let mut s = Settings::default();
        s.ports = vec![3, 0];
        s.usb[2].buttons[5] = ButtonFn::Warp;
        s.usb[1].x_thresh = 0.25;
        s.keysets[1][KeysetSlot::Fire as usize] = KeyCode::Space;
        s.custom_gpio[19] = 0x0201;
        s.display[0].h_border = 12;
        s.shader[4] = 3;
        let text = s.to_text(MachineClass::C64);
        assert_eq!(load(&text, MachineClass::C64), s);
    }

    #[test]
    fn legacy_keys_migrate() {
        let s = load("alt_f12=1\nh_border_trim_0=50\naspect_0=145\n", MachineClass::C64);
        assert_eq!(s.hotkeys[3], HOTKEY_CHOICE_MENU);
        assert_eq!(s.display[0].h_border, 16);
        assert_eq!(s.display[0].use_int_scaling, 0);
        assert_eq!(s.display[0].h_stretch, 1450);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let s = load("palette=9\nusb_btn_0=99\ngpio_config=9\n", MachineClass::C64);
        assert_eq!(s.palette[0], 3);
        assert_eq!(s.usb[0].buttons[0], ButtonFn::from_i32(30).unwrap());
        assert_eq!(s.gpio_config, 0);
    }

    #[test]
    fn second_display_keys_need_a_c128() {
        let s = load("h_center_1=9\npalette2=1\n", MachineClass::C64);
        assert_eq!(s.display[1].h_center, 0);
        assert_eq!(s.palette[1], 0);
        let s = load("h_center_1=9\npalette2=1\n", MachineClass::C128);
        assert_eq!(s.display[1].h_center, 9);
        assert_eq!(s.palette[1], 1);
    }

    #[test]
    fn custom_gpio_lines() {
        let s = load("custom_gpio=3,258\ncustom_gpio=4\ncustom_gpio=40,1\n", MachineClass::C64);
        assert_eq!(s.custom_gpio[3], 258);
        assert_eq!(s.custom_gpio[4], 0);
    }

    #[test]
    fn button_lines_fill_slots_in_order() {
        let s = load("usb_btn_1=2\nusb_btn_1=3\n", MachineClass::C64);
        assert_eq!(s.usb[1].buttons[0], ButtonFn::Menu);
        assert_eq!(s.usb[1].buttons[1], ButtonFn::Warp);
    }

    #[test]
    fn claimed_and_blank_lines_are_skipped() {
        let mut s = Settings::default();
        let mut seen = Vec::new();
        s.apply_text(
            "volume=\n=3\nmachine_thing=7\nvolume=40\n",
            MachineClass::C64,
            &LIMITS,
            &mut |name, value| {
                seen.push(format!("{}={}", name, value));
                name == "machine_thing"
            },
        );
        assert_eq!(seen, vec!["machine_thing=7", "volume=40"]);
        assert_eq!(s.volume, 40);
    }

    #[test]
    fn write_then_read() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(file_name(MachineClass::Vic20));
        assert!(read(&path).unwrap().is_none());
        write(&path, "volume=10\n").unwrap();
        assert_eq!(read(&path).unwrap().as_deref(), Some("volume=10\n"));
        assert!(!path.with_extension("txt.tmp").exists());
    }
}
