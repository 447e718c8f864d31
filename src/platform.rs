//! The two call surfaces the menu runtime sits between: the emulator core
//! below it and the bare-metal platform (framebuffers, ticks, GPIO, USB)
//! above it. Neither is implemented here. `NullHost` records every call so
//! the runtime can be driven without either.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{MenuError, Result};
use crate::fb::IndexedFb;
use crate::ids::JoyDev;
use crate::keycodes::KeyCode;
use crate::queue::PendingJoy;
use crate::vkbd::VkbdLatch;

/// Platform tick rate.
pub const TICKS_PER_SECOND: u64 = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MachineClass {
    C64,
    C128,
    Vic20,
    Plus4,
    Plus4Emu,
    Pet,
}

impl MachineClass {
    pub fn name(self) -> &'static str {
        match self {
            MachineClass::C64 => "C64",
            MachineClass::C128 => "C128",
            MachineClass::Vic20 => "VIC20",
            MachineClass::Plus4 => "PLUS/4",
            MachineClass::Plus4Emu => "PLUS/4",
            MachineClass::Pet => "PET",
        }
    }

    /// Directory name used by the directory conventions.
    pub fn sub_dir(self) -> &'static str {
        match self {
            MachineClass::C64 => "/C64",
            MachineClass::C128 => "/C128",
            MachineClass::Vic20 => "/VIC20",
            MachineClass::Plus4 | MachineClass::Plus4Emu => "/PLUS4",
            MachineClass::Pet => "/PET",
        }
    }

    pub fn num_joysticks(self) -> usize {
        match self {
            MachineClass::Vic20 => 1,
            MachineClass::Pet => 0,
            _ => 2,
        }
    }

    pub fn is_plus4(self) -> bool {
        matches!(self, MachineClass::Plus4 | MachineClass::Plus4Emu)
    }
}

impl FromStr for MachineClass {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "c64" => Ok(MachineClass::C64),
            "c128" => Ok(MachineClass::C128),
            "vic20" => Ok(MachineClass::Vic20),
            "plus4" => Ok(MachineClass::Plus4),
            "plus4emu" => Ok(MachineClass::Plus4Emu),
            "pet" => Ok(MachineClass::Pet),
            _ => Err(MenuError::UnknownMachine(s.to_string())),
        }
    }
}

/// Integer resources of the emulator core the menu reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntSetting {
    AutostartWarp,
    TapeResetWithMachine,
    DriveSoundEmulation,
    DriveSoundEmulationVolume,
    C128ColumnKey,
    DriveType(i32),
    IecDevice(i32),
    ParallelCable(i32),
    VicRam3k,
    VicRam8k2000,
    VicRam8k4000,
    VicRam8k6000,
    VicRam8kA000,
}

/// Framebuffer layers managed by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FbLayer {
    Vic,
    Vdc,
    Status,
    Ui,
}

impl FbLayer {
    pub fn display(display: usize) -> FbLayer {
        if display == 1 {
            FbLayer::Vdc
        } else {
            FbLayer::Vic
        }
    }
}

/// Geometry of an emulated display as the core currently draws it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasState {
    /// Top left of the visible area within the layer.
    pub left: i32,
    pub top: i32,
    pub border_w: i32,
    pub gfx_w: i32,
    pub gfx_h: i32,
    pub max_border_w: i32,
    pub max_border_h: i32,
    pub first_displayed_line: i32,
    pub last_displayed_line: i32,
    pub extra_offscreen_border_left: i32,
    pub extra_offscreen_border_right: i32,
    pub raster_skip: i32,
    pub max_stretch_h: i32,
}

impl Default for CanvasState {
    fn default() -> Self {
        CanvasState {
            left: 0,
            top: 0,
            border_w: 32,
            gfx_w: 320,
            gfx_h: 200,
            max_border_w: 32,
            max_border_h: 35,
            first_displayed_line: 16,
            last_displayed_line: 287,
            extra_offscreen_border_left: 32,
            extra_offscreen_border_right: 32,
            raster_skip: 1,
            max_stretch_h: 1800,
        }
    }
}

/// Dimensions the platform reports for a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FbDims {
    pub display_w: i32,
    pub display_h: i32,
    pub fb_w: i32,
    pub fb_h: i32,
    pub src_w: i32,
    pub src_h: i32,
    pub dst_w: i32,
    pub dst_h: i32,
}

/// Placement of an emulated display on the physical screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct VideoGeometry {
    pub h_center: i32,
    pub v_center: i32,
    pub h_border: i32,
    pub v_border: i32,
    /// Thousandths of the display height. Negative fills width first.
    pub h_stretch: i32,
    pub v_stretch: i32,
    /// Exact scaled size in pixels, used when the matching flag is set.
    pub h_integer: i32,
    pub v_integer: i32,
    pub use_h_integer: bool,
    pub use_v_integer: bool,
    /// Left, right, top and bottom padding in hundredths of the screen.
    pub pad: [i32; 4],
    pub zlayer: i32,
}

/// Boot time scaling parameters for one display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ScalingParams {
    pub fbw: i32,
    pub fbh: i32,
    pub sx: i32,
    pub sy: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorAdj {
    Brightness,
    Contrast,
    Gamma,
    Tint,
    Saturation,
}

impl ColorAdj {
    pub const ALL: [ColorAdj; 5] = [
        ColorAdj::Brightness,
        ColorAdj::Contrast,
        ColorAdj::Gamma,
        ColorAdj::Tint,
        ColorAdj::Saturation,
    ];
}

/// CRT shader parameters. Fractional values are in hundredths, except
/// `scanline_weight` which is in tenths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ShaderParams {
    pub curvature: bool,
    pub curvature_x: i32,
    pub curvature_y: i32,
    pub mask: i32,
    pub mask_brightness: i32,
    pub gamma: bool,
    pub fake_gamma: bool,
    pub scanlines: bool,
    pub multisample: bool,
    pub scanline_weight: i32,
    pub scanline_gap_brightness: i32,
    pub bloom_factor: i32,
    pub input_gamma: i32,
    pub output_gamma: i32,
    pub sharper: bool,
    pub bilinear: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapeCommand {
    Stop,
    Play,
    Forward,
    Rewind,
    Record,
    Reset,
    ResetCounter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RomKind {
    Kernal,
    Basic,
    Chargen,
    Drive(usize),
}

/// Capabilities of an attached USB gamepad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct GamepadInfo {
    pub num_buttons: usize,
    pub num_hats: usize,
    pub num_axes: usize,
}

/// Calls into the emulator core.
pub trait Emulator {
    fn machine_class(&self) -> MachineClass;

    fn attach_disk(&mut self, unit: i32, path: &Path) -> Result<()>;
    fn detach_disk(&mut self, unit: i32);
    fn attach_tape(&mut self, path: &Path) -> Result<()>;
    fn detach_tape(&mut self);
    fn attach_cart(&mut self, menu_id: i32, path: &Path) -> Result<()>;
    fn detach_cart(&mut self, menu_id: i32);
    fn set_cart_default(&mut self);
    fn cart_freeze(&mut self);
    fn autostart(&mut self, path: &Path, warp: bool) -> Result<()>;
    fn load_prg(&mut self, path: &Path) -> Result<()>;
    fn save_state(&mut self, path: &Path) -> Result<()>;
    fn load_state(&mut self, path: &Path) -> Result<()>;
    fn create_disk(&mut self, path: &Path, kind: &str) -> Result<()>;
    fn create_tape(&mut self, path: &Path) -> Result<()>;
    fn load_rom(&mut self, kind: RomKind, path: &Path) -> Result<()>;
    fn flush_disks(&mut self);

    fn reset(&mut self, soft: bool);
    fn set_warp(&mut self, on: bool);
    fn warp(&self) -> bool;
    fn set_int(&mut self, setting: IntSetting, value: i32);
    fn get_int(&self, setting: IntSetting) -> i32;
    fn set_iec_dir(&mut self, unit: i32, dir: &str);
    fn iec_dir(&self, unit: i32) -> String;
    fn drive_models(&self, unit: i32) -> Vec<(String, i32)>;
    fn tape_control(&mut self, cmd: TapeCommand);

    fn set_joy_port_device(&mut self, port: usize, dev: JoyDev);
    fn joy_interrupt(&mut self, ev: PendingJoy);
    fn key_interrupt(&mut self, code: KeyCode, pressed: bool);
    fn vkbd_latch(&mut self, latch: VkbdLatch, pressed: bool);

    fn canvas(&self, display: usize) -> CanvasState;
    fn palette_names(&self, display: usize) -> Vec<String>;
    fn set_palette(&mut self, display: usize, index: i32);
    fn color(&self, display: usize, adj: ColorAdj) -> i32;
    fn set_color(&mut self, display: usize, adj: ColorAdj, value: i32);
    fn default_color(&self, display: usize, adj: ColorAdj) -> i32;

    /// Machine specific handling of a menu change. Returns true if handled.
    fn handle_menu_change(&mut self, _id: i32, _value: i32) -> bool {
        false
    }

    /// Machine specific quick function. Returns true if handled.
    fn handle_quick_func(&mut self, _func: crate::ids::ButtonFn) -> bool {
        false
    }

    /// Extra `key=value` lines appended to the settings file.
    fn save_additional_settings(&self, _out: &mut String) {}

    /// Claims a settings key the menu does not know. Returns true if used.
    fn handle_loaded_setting(&mut self, _name: &str, _value: &str) -> bool {
        false
    }

    fn load_settings_done(&mut self) {}
}

/// Calls into the platform layer.
pub trait Platform {
    fn ticks(&self) -> u64;

    fn alloc_fbl(&mut self, layer: FbLayer, width: i32, height: i32);
    fn show_fbl(&mut self, layer: FbLayer);
    fn hide_fbl(&mut self, layer: FbLayer);
    fn frames_ready_fbl(&mut self, layer: FbLayer, fb: &IndexedFb);
    fn set_palette_fbl(&mut self, layer: FbLayer, index: u8, argb: u32);
    fn fbl_dimensions(&self, layer: FbLayer) -> FbDims;
    fn set_overlay_padding(&mut self, padding: i32);

    /// Scaling parameters from the boot configuration, if any.
    fn scaling_params(&self, display: usize) -> Option<ScalingParams>;
    fn set_video_geometry(&mut self, layer: FbLayer, geom: &VideoGeometry);
    fn set_interpolation(&mut self, on: bool);
    fn allow_shader(&self) -> bool;
    fn set_shader(&mut self, params: &ShaderParams);
    fn realloc_fbl(&mut self, layer: FbLayer, shader: bool);
    fn set_display_layout(&mut self, active: i32, pip_location: i32, pip_swapped: bool);
    fn safe_video_reset(&mut self);

    fn set_volume(&mut self, volume: i32);

    fn gpio_enabled(&self) -> bool;
    fn gpio_outputs_enabled(&self) -> bool;
    fn reset_gpio(&mut self, config: i32);

    fn usb_volume_available(&self, index: usize) -> bool;
    fn gamepad_info(&self, dev: usize) -> Option<GamepadInfo>;
}

/// Everything the runtime needs from the outside world.
pub trait Host: Emulator + Platform {}

impl<T: Emulator + Platform> Host for T {}

/// A host that does nothing but remember what it was asked to do.
pub struct NullHost {
    pub machine: MachineClass,
    pub calls: Vec<String>,
    pub ints: HashMap<IntSetting, i32>,
    pub iec_dirs: HashMap<i32, String>,
    pub colors: HashMap<(usize, ColorAdj), i32>,
    pub now: u64,
    pub warp: bool,
    pub fail_attach: bool,
    pub allow_shader: bool,
    pub gpio: bool,
    pub usb_volumes: [bool; 3],
    pub gamepads: [Option<GamepadInfo>; 4],
    pub canvas: [CanvasState; 2],
    pub dims: FbDims,
    pub scaling: [Option<ScalingParams>; 2],
    pub frames: usize,
}

impl NullHost {
    pub fn new(machine: MachineClass) -> Self {
        NullHost {
            machine,
            calls: Vec::new(),
            ints: HashMap::new(),
            iec_dirs: HashMap::new(),
            colors: HashMap::new(),
            now: 0,
            warp: false,
            fail_attach: false,
            allow_shader: true,
            gpio: false,
            usb_volumes: [false; 3],
            gamepads: [None; 4],
            canvas: [CanvasState::default(); 2],
            dims: FbDims {
                display_w: 1280,
                display_h: 720,
                fb_w: 384,
                fb_h: 272,
                src_w: 384,
                src_h: 272,
                dst_w: 1280,
                dst_h: 720,
            },
            scaling: [None; 2],
            frames: 0,
        }
    }

    fn record(&mut self, call: impl fmt::Display) {
        self.calls.push(call.to_string());
    }

    /// True if a call starting with `prefix` was recorded.
    pub fn called(&self, prefix: &str) -> bool {
        self.calls.iter().any(|c| c.starts_with(prefix))
    }

    fn attach(&mut self, what: &str, path: &Path) -> Result<()> {
        self.record(format!("{} {}", what, path.display()));
        if self.fail_attach {
            Err(MenuError::Emulator(format!("could not attach {}", path.display())))
        } else {
            Ok(())
        }
    }
}

impl Emulator for NullHost {
    fn machine_class(&self) -> MachineClass {
        self.machine
    }

    fn attach_disk(&mut self, unit: i32, path: &Path) -> Result<()> {
        self.attach(&format!("attach_disk {}", unit), path)
    }

    fn detach_disk(&mut self, unit: i32) {
        self.record(format!("detach_disk {}", unit));
    }

    fn attach_tape(&mut self, path: &Path) -> Result<()> {
        self.attach("attach_tape", path)
    }

    fn detach_tape(&mut self) {
        self.record("detach_tape");
    }

    fn attach_cart(&mut self, menu_id: i32, path: &Path) -> Result<()> {
        self.attach(&format!("attach_cart {}", menu_id), path)
    }

    fn detach_cart(&mut self, menu_id: i32) {
        self.record(format!("detach_cart {}", menu_id));
    }

    fn set_cart_default(&mut self) {
        self.record("set_cart_default");
    }

    fn cart_freeze(&mut self) {
        self.record("cart_freeze");
    }

    fn autostart(&mut self, path: &Path, warp: bool) -> Result<()> {
        self.attach(&format!("autostart warp={}", warp), path)
    }

    fn load_prg(&mut self, path: &Path) -> Result<()> {
        self.attach("load_prg", path)
    }

    fn save_state(&mut self, path: &Path) -> Result<()> {
        self.attach("save_state", path)
    }

    fn load_state(&mut self, path: &Path) -> Result<()> {
        self.attach("load_state", path)
    }

    fn create_disk(&mut self, path: &Path, kind: &str) -> Result<()> {
        self.attach(&format!("create_disk {}", kind), path)
    }

    fn create_tape(&mut self, path: &Path) -> Result<()> {
        self.attach("create_tape", path)
    }

    fn load_rom(&mut self, kind: RomKind, path: &Path) -> Result<()> {
        self.attach(&format!("load_rom {:?}", kind), path)
    }

    fn flush_disks(&mut self) {
        self.record("flush_disks");
    }

    fn reset(&mut self, soft: bool) {
        self.record(if soft { "reset soft" } else { "reset hard" });
    }

    fn set_warp(&mut self, on: bool) {
        self.warp = on;
        self.record(format!("set_warp {}", on));
    }

    fn warp(&self) -> bool {
        self.warp
    }

    fn set_int(&mut self, setting: IntSetting, value: i32) {
        self.ints.insert(setting, value);
        self.record(format!("set_int {:?} {}", setting, value));
    }

    fn get_int(&self, setting: IntSetting) -> i32 {
        self.ints.get(&setting).copied().unwrap_or(0)
    }

    fn set_iec_dir(&mut self, unit: i32, dir: &str) {
        self.iec_dirs.insert(unit, dir.to_string());
        self.record(format!("set_iec_dir {} {}", unit, dir));
    }

    fn iec_dir(&self, unit: i32) -> String {
        self.iec_dirs.get(&unit).cloned().unwrap_or_else(|| "/".into())
    }

    fn drive_models(&self, _unit: i32) -> Vec<(String, i32)> {
        vec![
            ("None".into(), 0),
            ("1541".into(), 1541),
            ("1571".into(), 1571),
            ("1581".into(), 1581),
        ]
    }

    fn tape_control(&mut self, cmd: TapeCommand) {
        self.record(format!("tape_control {:?}", cmd));
    }

    fn set_joy_port_device(&mut self, port: usize, dev: JoyDev) {
        self.record(format!("set_joy_port_device {} {:?}", port, dev));
    }

    fn joy_interrupt(&mut self, ev: PendingJoy) {
        self.record(format!(
            "joy {:?} port={} value={:#x}",
            ev.kind, ev.port, ev.value
        ));
    }

    fn key_interrupt(&mut self, code: KeyCode, pressed: bool) {
        self.record(format!("key {} {}", code.0, pressed));
    }

    fn vkbd_latch(&mut self, latch: VkbdLatch, pressed: bool) {
        self.record(format!("vkbd_latch {:?} {}", latch, pressed));
    }

    fn canvas(&self, display: usize) -> CanvasState {
        self.canvas[display.min(1)]
    }

    fn palette_names(&self, _display: usize) -> Vec<String> {
        vec!["Default".into(), "Vice".into(), "C64hq".into(), "Pepto-Ntsc".into()]
    }

    fn set_palette(&mut self, display: usize, index: i32) {
        self.record(format!("set_palette {} {}", display, index));
    }

    fn color(&self, display: usize, adj: ColorAdj) -> i32 {
        self.colors
            .get(&(display, adj))
            .copied()
            .unwrap_or_else(|| self.default_color(display, adj))
    }

    fn set_color(&mut self, display: usize, adj: ColorAdj, value: i32) {
        self.colors.insert((display, adj), value);
        self.record(format!("set_color {} {:?} {}", display, adj, value));
    }

    fn default_color(&self, _display: usize, adj: ColorAdj) -> i32 {
        match adj {
            ColorAdj::Gamma => 2200,
            _ => 1000,
        }
    }
}

impl Platform for NullHost {
    fn ticks(&self) -> u64 {
        self.now
    }

    fn alloc_fbl(&mut self, layer: FbLayer, width: i32, height: i32) {
        self.record(format!("alloc_fbl {:?} {}x{}", layer, width, height));
    }

    fn show_fbl(&mut self, layer: FbLayer) {
        self.record(format!("show_fbl {:?}", layer));
    }

    fn hide_fbl(&mut self, layer: FbLayer) {
        self.record(format!("hide_fbl {:?}", layer));
    }

    fn frames_ready_fbl(&mut self, _layer: FbLayer, _fb: &IndexedFb) {
        self.frames += 1;
    }

    fn set_palette_fbl(&mut self, _layer: FbLayer, _index: u8, _argb: u32) {}

    fn fbl_dimensions(&self, _layer: FbLayer) -> FbDims {
        self.dims
    }

    fn set_overlay_padding(&mut self, padding: i32) {
        self.record(format!("set_overlay_padding {}", padding));
    }

    fn scaling_params(&self, display: usize) -> Option<ScalingParams> {
        self.scaling.get(display).copied().flatten()
    }

    fn set_video_geometry(&mut self, layer: FbLayer, geom: &VideoGeometry) {
        self.record(format!("set_video_geometry {:?} {:?}", layer, geom));
    }

    fn set_interpolation(&mut self, on: bool) {
        self.record(format!("set_interpolation {}", on));
    }

    fn allow_shader(&self) -> bool {
        self.allow_shader
    }

    fn set_shader(&mut self, params: &ShaderParams) {
        self.record(format!("set_shader {:?}", params));
    }

    fn realloc_fbl(&mut self, layer: FbLayer, shader: bool) {
        self.record(format!("realloc_fbl {:?} {}", layer, shader));
    }

    fn set_display_layout(&mut self, active: i32, pip_location: i32, pip_swapped: bool) {
        self.record(format!(
            "set_display_layout {} {} {}",
            active, pip_location, pip_swapped
        ));
    }

    fn safe_video_reset(&mut self) {
        self.record("safe_video_reset");
    }

    fn set_volume(&mut self, volume: i32) {
        self.record(format!("set_volume {}", volume));
    }

    fn gpio_enabled(&self) -> bool {
        self.gpio
    }

    fn gpio_outputs_enabled(&self) -> bool {
        false
    }

    fn reset_gpio(&mut self, config: i32) {
        self.record(format!("reset_gpio {}", config));
    }

    fn usb_volume_available(&self, index: usize) -> bool {
        self.usb_volumes.get(index).copied().unwrap_or(false)
    }

    fn gamepad_info(&self, dev: usize) -> Option<GamepadInfo> {
        self.gamepads.get(dev).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_names_parse() {
        assert_eq!("C128".parse::<MachineClass>().unwrap(), MachineClass::C128);
        assert!(matches!(
            "amiga".parse::<MachineClass>(),
            Err(MenuError::UnknownMachine(_))
        ));
    }

    #[test]
    fn null_host_records_and_fails_on_request() {
        let mut host = NullHost::new(MachineClass::C64);
        assert!(host.attach_disk(8, Path::new("/a.d64")).is_ok());
        host.fail_attach = true;
        assert!(host.attach_tape(Path::new("/b.tap")).is_err());
        assert!(host.called("attach_disk 8 /a.d64"));
        assert!(host.called("attach_tape"));
    }
}
