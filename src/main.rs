use sdl2::controller::{Axis as CAxis, Button as CButton, GameController};
use sdl2::event::Event;
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::rect::Rect;
use sdl2::render::BlendMode;

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use bmc64_menu::config::{load_config, user_config_path};
use bmc64_menu::fb::IndexedFb;
use bmc64_menu::ids::{JoyDev, MAX_USB_DEVICES};
use bmc64_menu::joy::{Axis, GamepadReport};
use bmc64_menu::keycodes::KeyCode;
use bmc64_menu::platform::{
    CanvasState, ColorAdj, Emulator, FbDims, FbLayer, GamepadInfo, IntSetting, MachineClass,
    NullHost, Platform, RomKind, ScalingParams, ShaderParams, TapeCommand, VideoGeometry,
};
use bmc64_menu::queue::PendingJoy;
use bmc64_menu::style::load_style;
use bmc64_menu::vkbd::VkbdLatch;
use bmc64_menu::{MenuRuntime, Result as MenuResult};

const FRAME: Duration = Duration::from_millis(20);

#[derive(Default)]
struct Layer {
    width: i32,
    height: i32,
    pixels: Vec<u8>,
    palette: HashMap<u8, u32>,
    visible: bool,
}

/// Shows the menu and status bar layers in a window. Everything the
/// emulator core would do is recorded by the wrapped `NullHost`.
struct DesktopHost {
    core: NullHost,
    start: Instant,
    layers: HashMap<FbLayer, Layer>,
}

impl DesktopHost {
    fn new(machine: MachineClass) -> Self {
        DesktopHost {
            core: NullHost::new(machine),
            start: Instant::now(),
            layers: HashMap::new(),
        }
    }

    fn layer(&mut self, layer: FbLayer) -> &mut Layer {
        self.layers.entry(layer).or_default()
    }

    /// ARGB pixels of a visible layer.
    fn argb(&self, layer: FbLayer) -> Option<(u32, u32, Vec<u8>)> {
        let l = self.layers.get(&layer)?;
        if !l.visible || l.pixels.is_empty() {
            return None;
        }
        let mut out = Vec::with_capacity(l.pixels.len() * 4);
        for &p in &l.pixels {
            let c = l.palette.get(&p).copied().unwrap_or(0);
            out.extend_from_slice(&c.to_ne_bytes());
        }
        Some((l.width as u32, l.height as u32, out))
    }
}

impl Emulator for DesktopHost {
    fn machine_class(&self) -> MachineClass {
        self.core.machine_class()
    }
    fn attach_disk(&mut self, unit: i32, path: &Path) -> MenuResult<()> {
        info!("attach disk {} to unit {}", path.display(), unit);
        self.core.attach_disk(unit, path)
    }
    fn detach_disk(&mut self, unit: i32) {
        self.core.detach_disk(unit)
    }
    fn attach_tape(&mut self, path: &Path) -> MenuResult<()> {
        info!("attach tape {}", path.display());
        self.core.attach_tape(path)
    }
    fn detach_tape(&mut self) {
        self.core.detach_tape()
    }
    fn attach_cart(&mut self, menu_id: i32, path: &Path) -> MenuResult<()> {
        info!("attach cartridge {}", path.display());
        self.core.attach_cart(menu_id, path)
    }
    fn detach_cart(&mut self, menu_id: i32) {
        self.core.detach_cart(menu_id)
    }
    fn set_cart_default(&mut self) {
        self.core.set_cart_default()
    }
    fn cart_freeze(&mut self) {
        self.core.cart_freeze()
    }
    fn autostart(&mut self, path: &Path, warp: bool) -> MenuResult<()> {
        info!("autostart {}", path.display());
        self.core.autostart(path, warp)
    }
    fn load_prg(&mut self, path: &Path) -> MenuResult<()> {
        self.core.load_prg(path)
    }
    fn save_state(&mut self, path: &Path) -> MenuResult<()> {
        self.core.save_state(path)
    }
    fn load_state(&mut self, path: &Path) -> MenuResult<()> {
        self.core.load_state(path)
    }
    fn create_disk(&mut self, path: &Path, kind: &str) -> MenuResult<()> {
        self.core.create_disk(path, kind)
    }
    fn create_tape(&mut self, path: &Path) -> MenuResult<()> {
        self.core.create_tape(path)
    }
    fn load_rom(&mut self, kind: RomKind, path: &Path) -> MenuResult<()> {
        self.core.load_rom(kind, path)
    }
    fn flush_disks(&mut self) {
        self.core.flush_disks()
    }
    fn reset(&mut self, soft: bool) {
        info!("{} reset", if soft { "soft" } else { "hard" });
        self.core.reset(soft)
    }
    fn set_warp(&mut self, on: bool) {
        self.core.set_warp(on)
    }
    fn warp(&self) -> bool {
        self.core.warp()
    }
    fn set_int(&mut self, setting: IntSetting, value: i32) {
        self.core.set_int(setting, value)
    }
    fn get_int(&self, setting: IntSetting) -> i32 {
        self.core.get_int(setting)
    }
    fn set_iec_dir(&mut self, unit: i32, dir: &str) {
        self.core.set_iec_dir(unit, dir)
    }
    fn iec_dir(&self, unit: i32) -> String {
        self.core.iec_dir(unit)
    }
    fn drive_models(&self, unit: i32) -> Vec<(String, i32)> {
        self.core.drive_models(unit)
    }
    fn tape_control(&mut self, cmd: TapeCommand) {
        self.core.tape_control(cmd)
    }
    fn set_joy_port_device(&mut self, port: usize, dev: JoyDev) {
        self.core.set_joy_port_device(port, dev)
    }
    fn joy_interrupt(&mut self, ev: PendingJoy) {
        debug!("joy {:?} port {} {:#x}", ev.kind, ev.port, ev.value);
        self.core.joy_interrupt(ev)
    }
    fn key_interrupt(&mut self, code: KeyCode, pressed: bool) {
        debug!("key {} {}", code.0, pressed);
        self.core.key_interrupt(code, pressed)
    }
    fn vkbd_latch(&mut self, latch: VkbdLatch, pressed: bool) {
        self.core.vkbd_latch(latch, pressed)
    }
    fn canvas(&self, display: usize) -> CanvasState {
        self.core.canvas(display)
    }
    fn palette_names(&self, display: usize) -> Vec<String> {
        self.core.palette_names(display)
    }
    fn set_palette(&mut self, display: usize, index: i32) {
        self.core.set_palette(display, index)
    }
    fn color(&self, display: usize, adj: ColorAdj) -> i32 {
        self.core.color(display, adj)
    }
    fn set_color(&mut self, display: usize, adj: ColorAdj, value: i32) {
        self.core.set_color(display, adj, value)
    }
    fn default_color(&self, display: usize, adj: ColorAdj) -> i32 {
        self.core.default_color(display, adj)
    }
}

impl Platform for DesktopHost {
    fn ticks(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    fn alloc_fbl(&mut self, layer: FbLayer, width: i32, height: i32) {
        let l = self.layer(layer);
        l.width = width;
        l.height = height;
        l.pixels.clear();
        self.core.alloc_fbl(layer, width, height)
    }
    fn show_fbl(&mut self, layer: FbLayer) {
        self.layer(layer).visible = true;
    }
    fn hide_fbl(&mut self, layer: FbLayer) {
        self.layer(layer).visible = false;
    }
    fn frames_ready_fbl(&mut self, layer: FbLayer, fb: &IndexedFb) {
        let l = self.layer(layer);
        l.width = fb.width();
        l.height = fb.height();
        l.pixels.clear();
        l.pixels.extend_from_slice(fb.pixels());
    }
    fn set_palette_fbl(&mut self, layer: FbLayer, index: u8, argb: u32) {
        self.layer(layer).palette.insert(index, argb);
    }
    fn fbl_dimensions(&self, layer: FbLayer) -> FbDims {
        self.core.fbl_dimensions(layer)
    }
    fn set_overlay_padding(&mut self, padding: i32) {
        self.core.set_overlay_padding(padding)
    }
    fn scaling_params(&self, display: usize) -> Option<ScalingParams> {
        self.core.scaling_params(display)
    }
    fn set_video_geometry(&mut self, layer: FbLayer, geom: &VideoGeometry) {
        self.core.set_video_geometry(layer, geom)
    }
    fn set_interpolation(&mut self, on: bool) {
        self.core.set_interpolation(on)
    }
    fn allow_shader(&self) -> bool {
        self.core.allow_shader()
    }
    fn set_shader(&mut self, params: &ShaderParams) {
        self.core.set_shader(params)
    }
    fn realloc_fbl(&mut self, layer: FbLayer, shader: bool) {
        self.core.realloc_fbl(layer, shader)
    }
    fn set_display_layout(&mut self, active: i32, pip_location: i32, pip_swapped: bool) {
        self.core.set_display_layout(active, pip_location, pip_swapped)
    }
    fn safe_video_reset(&mut self) {
        info!("safe video reset");
        self.core.safe_video_reset()
    }
    fn set_volume(&mut self, volume: i32) {
        self.core.set_volume(volume)
    }
    fn gpio_enabled(&self) -> bool {
        false
    }
    fn gpio_outputs_enabled(&self) -> bool {
        false
    }
    fn reset_gpio(&mut self, config: i32) {
        self.core.reset_gpio(config)
    }
    fn usb_volume_available(&self, index: usize) -> bool {
        self.core.usb_volume_available(index)
    }
    fn gamepad_info(&self, dev: usize) -> Option<GamepadInfo> {
        self.core.gamepad_info(dev)
    }
}

/// Hat position in the 0..8 encoding, 8 when centred.
fn dpad_hat(gc: &GameController) -> i32 {
    let up = gc.button(CButton::DPadUp);
    let down = gc.button(CButton::DPadDown);
    let left = gc.button(CButton::DPadLeft);
    let right = gc.button(CButton::DPadRight);
    match (up, down, left, right) {
        (true, _, false, false) => 0,
        (true, _, false, true) => 1,
        (false, false, _, true) => 2,
        (false, true, false, true) => 3,
        (false, true, false, false) => 4,
        (false, true, true, _) => 5,
        (false, false, true, _) => 6,
        (true, _, true, _) => 7,
        _ => 8,
    }
}

const REPORT_BUTTONS: [CButton; 11] = [
    CButton::A,
    CButton::B,
    CButton::X,
    CButton::Y,
    CButton::Back,
    CButton::Guide,
    CButton::Start,
    CButton::LeftStick,
    CButton::RightStick,
    CButton::LeftShoulder,
    CButton::RightShoulder,
];

const REPORT_AXES: [CAxis; 6] = [
    CAxis::LeftX,
    CAxis::LeftY,
    CAxis::RightX,
    CAxis::RightY,
    CAxis::TriggerLeft,
    CAxis::TriggerRight,
];

fn gamepad_report(gc: &GameController) -> GamepadReport {
    let mut r = GamepadReport::default();
    for (bit, b) in REPORT_BUTTONS.iter().enumerate() {
        if gc.button(*b) {
            r.buttons |= 1 << bit;
        }
    }
    r.hats = [dpad_hat(gc), 8];
    for (slot, a) in REPORT_AXES.iter().enumerate() {
        r.axes[slot] = Axis {
            value: i32::from(gc.axis(*a)),
            minimum: i32::from(i16::MIN),
            maximum: i32::from(i16::MAX),
        };
    }
    r
}

fn main() -> Result<(), String> {
    let config = load_config();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .init();
    if let Some(p) = user_config_path() {
        debug!("config at {}", p.display());
    }

    let machine = config.machine_class().map_err(|e| e.to_string())?;
    let sd_root = config.sd_root();
    let usb_roots = config.usb_roots();
    if !sd_root.is_dir() {
        warn!("SD root {} does not exist", sd_root.display());
    }

    let mut host = DesktopHost::new(machine);
    for (i, root) in usb_roots.iter().enumerate() {
        host.core.usb_volumes[i] = root.is_dir();
    }

    let sdl_ctx = sdl2::init()?;
    let video = sdl_ctx.video()?;
    let controller_subsystem = sdl_ctx.game_controller()?;

    // Keep opened controllers alive; a dropped controller stops sending events.
    let mut controllers: Vec<GameController> = Vec::new();
    for id in 0..sdl_ctx.joystick()?.num_joysticks()? {
        if controllers.len() == MAX_USB_DEVICES {
            break;
        }
        if controller_subsystem.is_game_controller(id) {
            match controller_subsystem.open(id) {
                Ok(gc) => {
                    info!("Opened controller: {}", gc.name());
                    host.core.gamepads[controllers.len()] = Some(GamepadInfo {
                        num_buttons: REPORT_BUTTONS.len(),
                        num_hats: 1,
                        num_axes: REPORT_AXES.len(),
                    });
                    controllers.push(gc);
                }
                Err(e) => warn!("Failed opening controller {}: {}", id, e),
            }
        }
    }

    let dims = host.core.dims;
    let mut rt = MenuRuntime::new(host, &sd_root, &usb_roots, config.timing())
        .map_err(|e| e.to_string())?;
    rt.apply_style(&load_style());

    let scale = config.scale();
    let window = video
        .window(
            &format!("BMC64 {}", machine.name()),
            dims.fb_w as u32 * scale,
            dims.fb_h as u32 * scale,
        )
        .position_centered()
        .build()
        .map_err(|e| e.to_string())?;
    let mut canvas = window.into_canvas().accelerated().present_vsync().build().map_err(|e| e.to_string())?;
    let texture_creator = canvas.texture_creator();
    let mut event_pump = sdl_ctx.event_pump()?;

    'running: loop {
        let frame_start = Instant::now();
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'running,
                Event::KeyDown { scancode: Some(sc), repeat: false, .. } => {
                    rt.key_pressed(KeyCode(sc as i32));
                }
                Event::KeyUp { scancode: Some(sc), .. } => {
                    rt.key_released(KeyCode(sc as i32));
                }
                Event::ControllerButtonDown { which, .. }
                | Event::ControllerButtonUp { which, .. }
                | Event::ControllerAxisMotion { which, .. } => {
                    let dev = controllers.iter().position(|gc| gc.instance_id() == which);
                    if let Some(dev) = dev {
                        let report = gamepad_report(&controllers[dev]);
                        rt.usb_report(dev, &report);
                    }
                }
                _ => {}
            }
        }

        rt.frame();

        let (w, h) = canvas.output_size()?;
        canvas.set_draw_color(Color::RGB(0x6C, 0x5E, 0xB5));
        canvas.clear();
        if !rt.menu_showing() || rt.ui.osd_active {
            canvas.set_draw_color(Color::RGB(0x35, 0x28, 0x79));
            let (bx, by) = (w / 10, h / 8);
            let _ = canvas.fill_rect(Rect::new(bx as i32, by as i32, w - 2 * bx, h - 2 * by));
        }
        for layer in [FbLayer::Status, FbLayer::Ui] {
            let Some((lw, lh, pixels)) = rt.host.argb(layer) else { continue };
            let mut tex = texture_creator
                .create_texture_streaming(PixelFormatEnum::ARGB8888, lw, lh)
                .map_err(|e| e.to_string())?;
            tex.set_blend_mode(BlendMode::Blend);
            tex.update(None, &pixels, lw as usize * 4).map_err(|e| e.to_string())?;
            canvas.copy(&tex, None, None)?;
        }
        canvas.present();

        if let Some(rest) = FRAME.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    info!("{} calls made into the emulator core", rt.host.core.calls.len());
    Ok(())
}
