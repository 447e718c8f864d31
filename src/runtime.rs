//! The menu runtime: owns the UI, the handlers and everything they act on,
//! and turns input and frame ticks into calls on the host.
//!
//! Input arrives from callbacks through `key_pressed`, `key_released` and
//! `usb_report`, which only route and enqueue. `frame` is called once per
//! emulated (or menu) frame and does the rest.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::actions::video::{self, VideoState};
use crate::actions::{self, input, media, osd, prefs};
use crate::browser::Browser;
use crate::dialog;
use crate::dispatch::{self, Dispatcher, Handler};
use crate::error::{MenuError, Result};
use crate::ids::{self, ButtonFn, JoyDev, JOY_PORT_CHOICES, MAX_JOY_PORTS};
use crate::item::ItemId;
use crate::joy::{GamepadReport, InputConfig, JOY_DOWN, JOY_FIRE, JOY_LEFT, JOY_RIGHT, JOY_UP};
use crate::kbd::{KeyRouter, Route};
use crate::keycodes::KeyCode;
use crate::menu::{build_menu, MenuHandles};
use crate::overlay::{OverlayPolicy, StatusOverlay, TapeControl};
use crate::platform::{CanvasState, FbLayer, Host, IntSetting, MachineClass};
use crate::queue::{InputQueue, JoyKind, PendingJoy};
use crate::render::Reveal;
use crate::settings::{self, DisplaySettings, LoadLimits, Settings};
use crate::stack::{CursorHook, LevelTag, PopHook};
use crate::style::StyleConfig;
use crate::ui::{Ui, UiEvent};
use crate::usb::{self, ListenTarget};
use crate::vkbd::Vkbd;

pub struct MenuRuntime<H: Host> {
    pub host: H,
    pub ui: Ui,
    pub handles: MenuHandles,
    pub browser: Browser,
    pub input: InputConfig,
    pub keys: KeyRouter,
    pub queue: Arc<InputQueue>,
    pub overlay: StatusOverlay,
    pub vkbd: Vkbd,
    pub video: VideoState,
    /// Drive unit the last unit specific item belonged to.
    pub(crate) unit: i32,
    /// USB device feeding the raw data monitor.
    pub(crate) raw_usb: Option<usize>,
    pub(crate) listen: Option<ListenTarget>,
    dispatcher: Dispatcher<H>,
    machine: MachineClass,
    settings_path: PathBuf,
    vkbd_joy: [u32; MAX_JOY_PORTS],
}

impl<H: Host> MenuRuntime<H> {
    /// Builds the main menu for the host's machine, applies the settings
    /// file under `sd_root` and pushes the result into the host.
    pub fn new(host: H, sd_root: &Path, usb_roots: &[PathBuf], timing: &str) -> Result<Self> {
        let machine = host.machine_class();
        let canvas = host.canvas(0);
        let mut ui = Ui::new(&canvas)?;
        let handles = {
            let level = ui.stack.level_mut(0).ok_or(MenuError::NoSuchItem(0))?;
            build_menu(&mut level.menu, &host, timing)?
        };
        ui.traverse();

        let mut browser = Browser::new(machine, 0);
        browser.set_volume_root(0, Some(sd_root.to_path_buf()));
        for (i, root) in usb_roots.iter().take(3).enumerate() {
            browser.set_volume_root(i + 1, Some(root.clone()));
        }

        let keys = KeyRouter::default();
        ui.commodore_key = keys.commodore_key;

        let mut dispatcher = Dispatcher::new();
        actions::register(&mut dispatcher);
        debug!("{} menu handlers registered", dispatcher.len());

        let mut rt = MenuRuntime {
            host,
            ui,
            handles,
            browser,
            input: InputConfig::default(),
            keys,
            queue: Arc::new(InputQueue::new()),
            overlay: StatusOverlay::new(machine),
            vkbd: Vkbd::c64(),
            video: VideoState::new(),
            unit: 8,
            raw_usb: None,
            listen: None,
            dispatcher,
            machine,
            settings_path: sd_root.join(settings::file_name(machine)),
            vkbd_joy: [0; MAX_JOY_PORTS],
        };

        let (w, h) = (rt.ui.fb.width(), rt.ui.fb.height());
        rt.host.alloc_fbl(FbLayer::Ui, w, h);
        rt.apply_style(&StyleConfig::default());

        if let Err(e) = rt.load_settings() {
            warn!("could not load {}: {}", rt.settings_path.display(), e);
        }
        rt.boot_init()?;
        info!("{} menu ready", machine.name());
        Ok(rt)
    }

    /// Uploads the menu and status bar colours.
    pub fn apply_style(&mut self, style: &StyleConfig) {
        for (i, argb) in style.ui_palette().iter().enumerate() {
            self.host.set_palette_fbl(FbLayer::Ui, i as u8, *argb);
        }
        style.apply_to_overlay(&mut self.overlay);
        self.overlay.init(&mut self.host);
    }

    pub fn machine(&self) -> MachineClass {
        self.machine
    }

    pub fn now(&self) -> u64 {
        self.host.ticks()
    }

    /// Canvas of the VIC display, which every popup is placed against.
    pub fn canvas(&self) -> CanvasState {
        self.host.canvas(0)
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Value of a main menu item, 0 if it is gone.
    pub fn value(&self, item: ItemId) -> i32 {
        self.ui.main_item(item).map_or(0, |i| i.value)
    }

    pub fn set_value(&mut self, item: ItemId, value: i32) {
        if let Some(it) = self.ui.main_item_mut(item) {
            it.value = value;
        }
    }

    fn choice_value(&self, item: ItemId) -> i32 {
        self.ui.main_item(item).map_or(0, |i| i.choice_value())
    }

    /// Lets display `n` show through the menu while it is adjusted.
    pub fn reveal(&mut self, n: usize) {
        let showing = self.video.showing.get(n).copied().unwrap_or(false);
        self.ui.canvas_reveal_temp(FbLayer::display(n), showing);
    }

    pub fn info(&mut self, text: &str) -> Result<()> {
        let canvas = self.canvas();
        dialog::info(&mut self.ui, &mut self.host, &canvas, text)
    }

    pub fn error(&mut self, text: &str) -> Result<()> {
        let canvas = self.canvas();
        dialog::error(&mut self.ui, &mut self.host, &canvas, text)
    }

    pub(crate) fn unit_slot(&self) -> usize {
        (self.unit - 8).clamp(0, 3) as usize
    }

    pub(crate) fn handler(&self, id: i32) -> Option<Handler<H>> {
        self.dispatcher.get(id)
    }

    pub fn menu_showing(&self) -> bool {
        self.ui.enabled
    }

    pub fn key_pressed(&mut self, code: KeyCode) {
        self.vkbd
            .sync_event(code, true, self.keys.commodore_key, self.keys.ctrl_key);
        let now = self.now();
        let routes = self.keys.pressed(code, now, self.ui.enabled, &self.input);
        self.apply_routes(routes);
    }

    pub fn key_released(&mut self, code: KeyCode) {
        self.vkbd
            .sync_event(code, false, self.keys.commodore_key, self.keys.ctrl_key);
        let now = self.now();
        let routes = self.keys.released(code, now, self.ui.enabled, &self.input);
        self.apply_routes(routes);
    }

    /// A report from USB gamepad `dev`. While its raw monitor is open the
    /// report only updates the monitor.
    pub fn usb_report(&mut self, dev: usize, report: &GamepadReport) {
        if self.raw_usb == Some(dev) {
            usb::update_raw_monitor(&mut self.ui, dev, report);
            return;
        }
        let routes = self
            .input
            .usb_report(dev, report, self.ui.enabled, self.vkbd.enabled);
        self.apply_routes(routes);
    }

    /// A latch from a joystick source the runtime does not route itself,
    /// such as the GPIO banks.
    pub fn joy_event(&self, ev: PendingJoy) {
        self.queue.enqueue_joy(ev);
    }

    fn apply_routes(&mut self, routes: Vec<Route>) {
        for route in routes {
            match route {
                Route::UiKey(code, pressed) => self.queue.enqueue_ui_key(code, pressed),
                Route::EmuKey(code, pressed) => self.queue.enqueue_emu_key(code, pressed),
                Route::Key(code, true) => self.key_pressed(code),
                Route::Key(code, false) => self.key_released(code),
                Route::Joy(ev) => self.queue.enqueue_joy(ev),
                Route::Toggle => self.queue.request_toggle(),
                Route::QuickFunc(f) => self.queue.request_quick_func(f),
                Route::SafeVideoReset => self.host.safe_video_reset(),
                Route::Raw(code) => {
                    if let Err(e) = input::key_listened(self, code) {
                        error!("storing listened key: {}", e);
                    }
                }
            }
        }
    }

    /// One frame of whichever loop is current.
    pub fn frame(&mut self) {
        if self.ui.enabled && !self.ui.osd_active {
            self.poll_frame();
        } else {
            self.emu_frame();
        }
    }

    /// A frame while the menu has the screen and emulation is paused.
    pub fn poll_frame(&mut self) {
        self.check_ui_keys();
        self.countdown();
        if self.ui.enabled {
            self.render();
        }
    }

    /// A frame of running emulation, with an OSD on top if one is up.
    pub fn emu_frame(&mut self) {
        if self.ui.osd_active {
            self.check_ui_keys();
            self.render();
        }
        let now = self.now();
        self.overlay.check(now);
        self.deliver_emu_input();
        self.countdown();
        self.video.showing = self.video.enabled;
        self.overlay.present(&mut self.host, self.vkbd.enabled);
    }

    fn check_ui_keys(&mut self) {
        for key in self.queue.drain_ui_keys() {
            if key.pressed {
                self.ui.key_pressed(key.code);
            } else {
                self.ui.key_released(key.code);
            }
            self.handle_events();
        }
        self.ui.action_frame();
        self.handle_events();
    }

    /// Acts on a toggle or quick function whose delay ran out.
    fn countdown(&mut self) {
        let countdown = self.queue.tick();
        if countdown.toggle {
            if self.ui.osd_active {
                dialog::dismiss_osd_if_active(&mut self.ui, &mut self.host);
            } else {
                self.ui.pop_all_and_toggle();
            }
        } else if let Some(f) = countdown.quick_func {
            if let Err(e) = self.quick_func(f) {
                self.report(e);
            }
        }
        self.handle_events();
    }

    fn deliver_emu_input(&mut self) {
        let (keys, joys) = self.queue.drain_emu();
        for key in keys {
            self.host.key_interrupt(key.code, key.pressed);
        }
        for ev in joys {
            if self.vkbd.enabled && !self.ui.enabled {
                self.vkbd_joy(ev);
            } else {
                self.host.joy_interrupt(ev);
            }
        }
    }

    /// Drives the virtual keyboard from a joystick latch.
    fn vkbd_joy(&mut self, ev: PendingJoy) {
        let port = ev.port.min(MAX_JOY_PORTS - 1);
        let prev = self.vkbd_joy[port];
        let now = match ev.kind {
            JoyKind::And => prev & ev.value,
            JoyKind::Or => prev | ev.value,
            JoyKind::Absolute => ev.value,
            JoyKind::PotX | JoyKind::PotY => return,
        };
        self.vkbd_joy[port] = now;
        let down = now & !prev;
        let up = prev & !now;
        if down & JOY_UP != 0 {
            self.vkbd.nav_up();
        }
        if down & JOY_DOWN != 0 {
            self.vkbd.nav_down();
        }
        if down & JOY_LEFT != 0 {
            self.vkbd.nav_left();
        }
        if down & JOY_RIGHT != 0 {
            self.vkbd.nav_right();
        }
        for (bit, pressed) in [(down, true), (up, false)] {
            if bit & JOY_FIRE != 0 {
                if let Some((latch, state)) = self.vkbd.press(pressed) {
                    self.host.vkbd_latch(latch, state);
                }
            }
        }
        if down | up != 0 {
            self.vkbd.draw(&mut self.overlay.fb);
            self.overlay.mark_dirty();
        }
    }

    fn render(&mut self) {
        let reveal = self.ui.transparent_layer.map(|layer| Reveal {
            ui: self.host.fbl_dimensions(FbLayer::Ui),
            layer: self.host.fbl_dimensions(layer),
            canvas: self.host.canvas(usize::from(layer == FbLayer::Vdc)),
        });
        self.ui.render_all(reveal.as_ref());
        self.host.frames_ready_fbl(FbLayer::Ui, &self.ui.fb);
    }

    /// Follows a change of the VIC layer's size.
    pub fn canvas_changed(&mut self) {
        let dims = self.host.fbl_dimensions(FbLayer::Vic);
        let canvas = self.canvas();
        if self.ui.geometry_changed(dims.fb_w, dims.fb_h, &canvas) {
            let (w, h) = (self.ui.fb.width(), self.ui.fb.height());
            self.host.alloc_fbl(FbLayer::Ui, w, h);
        }
    }

    /// Drive LED notification from the core. Drive 0 is unit 8.
    pub fn drive_led_changed(&mut self, drive: usize, pwm: i32, led_green: bool) {
        let now = self.now();
        self.overlay.drive_led_changed(now, drive, pwm, led_green);
    }

    pub fn tape_counter_changed(&mut self, counter: i32) {
        let now = self.now();
        self.overlay.tape_counter_changed(now, counter);
    }

    pub fn tape_control_changed(&mut self, control: TapeControl) {
        let now = self.now();
        self.overlay.tape_control_changed(now, control);
    }

    pub fn tape_motor_changed(&mut self, on: bool) {
        let now = self.now();
        self.overlay.tape_motor_changed(now, on);
    }

    /// Drains everything the UI queued.
    pub fn handle_events(&mut self) {
        while let Some(ev) = self.ui.next_event() {
            match ev {
                UiEvent::Changed(changed) => {
                    if let Err(e) = dispatch::dispatch(self, &changed) {
                        self.report(e);
                    }
                }
                UiEvent::CursorMoved {
                    hook: CursorHook::RememberDirPos(dir),
                    cursor,
                } => self.browser.remember_position(dir, cursor),
                UiEvent::Popped { off, to } => {
                    for hook in [off, to].into_iter().flatten() {
                        self.pop_hook(hook);
                    }
                }
                UiEvent::Toggled(on) => {
                    if on {
                        self.host.show_fbl(FbLayer::Ui);
                    } else {
                        self.host.hide_fbl(FbLayer::Ui);
                        self.ui.clear_reveal();
                    }
                    debug!("menu {}", if on { "opened" } else { "closed" });
                }
            }
        }
    }

    fn pop_hook(&mut self, hook: PopHook) {
        match hook {
            PopHook::DisableOsd => {
                dialog::disable_osd(&mut self.ui, &mut self.host);
                if self.ui.stack.depth() == 1 {
                    self.ui.enabled = false;
                }
            }
            PopHook::StopRawUsb(dev) => {
                if self.raw_usb == Some(dev) {
                    self.raw_usb = None;
                }
            }
            PopHook::RefreshKeyBindings(dev) => {
                let index = self
                    .ui
                    .stack
                    .levels()
                    .iter()
                    .position(|l| l.tag == LevelTag::UsbConfig(dev));
                if let Some(level) = index.and_then(|i| self.ui.stack.level_mut(i)) {
                    usb::refresh_key_bindings(level, &self.input);
                }
            }
        }
    }

    /// Caller bugs are only logged; anything else is shown to the user.
    fn report(&mut self, e: MenuError) {
        match e {
            MenuError::StackFull(_)
            | MenuError::PopRoot
            | MenuError::NotAFolder(_)
            | MenuError::NoSuchItem(_)
            | MenuError::WrongKind(_) => error!("menu: {}", e),
            other => {
                warn!("{}", other);
                if let Err(e) = self.error(&other.to_string()) {
                    error!("could not show error dialog: {}", e);
                }
            }
        }
    }

    /// Runs a hotkey or gamepad button function once its countdown is done.
    pub fn quick_func(&mut self, f: ButtonFn) -> Result<()> {
        if self.host.handle_quick_func(f) {
            return Ok(());
        }
        debug!("quick function {}", f);
        match f {
            ButtonFn::Warp => {
                let on = !self.host.warp();
                media::set_warp(self, on);
            }
            ButtonFn::SwapPorts => input::swap_ports(self),
            ButtonFn::StatusToggle => self.overlay.force_toggle(),
            ButtonFn::TapeMenu => osd::show_tape_osd(self)?,
            ButtonFn::CartMenu => osd::show_cart_osd(self)?,
            ButtonFn::ResetMenu => osd::show_reset_osd(self)?,
            ButtonFn::CartFreeze => self.host.cart_freeze(),
            ButtonFn::ResetHard | ButtonFn::ResetSoft => {
                let soft = f == ButtonFn::ResetSoft;
                if self.value(self.handles.reset_confirm) != 0 {
                    osd::show_confirm_osd(self, soft)?;
                } else {
                    media::reset_machine(self, soft);
                }
            }
            ButtonFn::ResetHard2 => media::reset_machine(self, false),
            ButtonFn::ResetSoft2 => media::reset_machine(self, true),
            ButtonFn::ActiveDisplay | ButtonFn::PipLocation | ButtonFn::PipSwap => {
                let item = match f {
                    ButtonFn::ActiveDisplay => self.handles.active_display,
                    ButtonFn::PipLocation => self.handles.pip_location,
                    _ => self.handles.pip_swapped,
                };
                let Some(item) = item else { return Ok(()) };
                let count = if f == ButtonFn::PipSwap { 2 } else { 4 };
                let next = (self.value(item) + 1) % count;
                self.set_value(item, next);
                video::apply_layout(self)?;
            }
            ButtonFn::Column4080 => {
                let Some(item) = self.handles.c40_80 else { return Ok(()) };
                let next = 1 - self.value(item).clamp(0, 1);
                self.set_value(item, next);
                prefs::set_columns(self, next);
            }
            ButtonFn::VkbdToggle => {
                self.vkbd.enabled = !self.vkbd.enabled;
                if self.vkbd.enabled {
                    self.vkbd.draw(&mut self.overlay.fb);
                } else {
                    self.vkbd.clear(&mut self.overlay.fb);
                    self.vkbd_joy = [0; MAX_JOY_PORTS];
                }
                self.overlay.mark_dirty();
            }
            ButtonFn::FlushDisk => self.host.flush_disks(),
            other => debug!("{} is not a quick function", other),
        }
        Ok(())
    }

    /// Snapshot of everything the settings file stores.
    pub fn gather_settings(&self) -> Settings {
        let h = &self.handles;
        let mut s = Settings {
            ports: h.ports.iter().map(|&i| self.value(i)).collect(),
            usb: self.input.usb,
            pots: self.input.pots,
            keysets: self.input.keysets,
            key_bindings: self.input.key_bindings,
            custom_gpio: self.input.custom_gpio,
            hotkeys: h.hotkeys.map(|i| self.value(i)),
            overlay: self.value(h.overlay),
            overlay_padding: self.value(h.overlay_padding),
            vkbd_trans: self.value(h.vkbd_trans),
            tapereset: self.value(h.tape_reset),
            reset_confirm: self.value(h.reset_confirm),
            scaling_interp: self.value(h.scaling_interp),
            gpio_config: self.choice_value(h.gpio_config),
            volume: self.value(h.volume),
            dir_convention: self.value(h.dir_convention),
            shader: h.shader.map(|i| self.value(i)),
            ..Settings::default()
        };
        for n in 0..2 {
            let Some(d) = h.display(n) else { continue };
            s.palette[n] = self.value(d.palette);
            s.display[n] = DisplaySettings {
                h_center: self.value(d.h_center),
                v_center: self.value(d.v_center),
                h_border: self.value(d.h_border),
                v_border: self.value(d.v_border),
                h_stretch: self.value(d.h_stretch),
                v_stretch: self.value(d.v_stretch),
                use_int_scaling: self.value(d.use_scaling_params),
            };
        }
        for (i, t) in s.drive_types.iter_mut().enumerate() {
            *t = self.host.get_int(IntSetting::DriveType(8 + i as i32));
        }
        s
    }

    /// Pushes a snapshot back into the items and the input state.
    fn apply_settings(&mut self, s: &Settings) {
        let h = self.handles.clone();
        for (port, (&item, &choice)) in h.ports.iter().zip(&s.ports).enumerate() {
            self.set_value(item, choice);
            let dev = usize::try_from(choice)
                .ok()
                .and_then(|c| JOY_PORT_CHOICES.get(c))
                .map_or(JoyDev::None, |(_, d)| *d);
            self.input.ports[port] = dev;
        }
        self.input.usb = s.usb;
        self.input.pots = s.pots;
        self.input.keysets = s.keysets;
        self.input.key_bindings = s.key_bindings;
        self.input.custom_gpio = s.custom_gpio;

        for (&item, &value) in h.hotkeys.iter().zip(&s.hotkeys) {
            self.set_value(item, value);
        }
        for (item, value) in [
            (h.overlay, s.overlay),
            (h.overlay_padding, s.overlay_padding),
            (h.vkbd_trans, s.vkbd_trans),
            (h.tape_reset, s.tapereset),
            (h.reset_confirm, s.reset_confirm),
            (h.scaling_interp, s.scaling_interp),
            (h.volume, s.volume),
            (h.dir_convention, s.dir_convention),
        ] {
            self.set_value(item, value);
        }
        if let Some(it) = self.ui.main_item_mut(h.gpio_config) {
            if !it.select_choice_value(s.gpio_config) {
                it.value = 0;
            }
        }
        for (&item, &value) in h.shader.iter().zip(&s.shader) {
            self.set_value(item, value);
        }
        for n in 0..2 {
            let Some(d) = h.display(n) else { continue };
            let ds = s.display[n];
            self.set_value(d.palette, s.palette[n]);
            for (item, value) in [
                (d.h_center, ds.h_center),
                (d.v_center, ds.v_center),
                (d.h_border, ds.h_border),
                (d.v_border, ds.v_border),
                (d.h_stretch, ds.h_stretch),
                (d.v_stretch, ds.v_stretch),
                (d.use_scaling_params, ds.use_int_scaling),
            ] {
                self.set_value(item, value);
            }
        }
        for (i, &t) in s.drive_types.iter().enumerate() {
            self.host.set_int(IntSetting::DriveType(8 + i as i32), t);
        }
    }

    fn load_limits(&self) -> LoadLimits {
        let border = |n: usize| {
            let c = self.host.canvas(n);
            (c.max_border_w, c.max_border_h)
        };
        LoadLimits {
            palettes: [
                self.host.palette_names(0).len().max(1),
                self.host.palette_names(1).len().max(1),
            ],
            max_border: [border(0), border(1)],
        }
    }

    /// Applies the machine's settings file, if there is one. Keys the
    /// emulator claims never reach the menu.
    pub fn load_settings(&mut self) -> Result<()> {
        let text = settings::read(&self.settings_path);
        if let Ok(Some(text)) = &text {
            let mut s = self.gather_settings();
            let limits = self.load_limits();
            let machine = self.machine;
            let host = &mut self.host;
            s.apply_text(text, machine, &limits, &mut |name, value| {
                host.handle_loaded_setting(name, value)
            });
            self.apply_settings(&s);
        }
        self.host.load_settings_done();
        text.map(|_| ())
    }

    pub fn save_settings(&self) -> Result<()> {
        let mut text = self.gather_settings().to_text(self.machine);
        self.host.save_additional_settings(&mut text);
        settings::write(&self.settings_path, &text)
    }

    /// Hands every loaded value to the host once at start up.
    fn boot_init(&mut self) -> Result<()> {
        let h = self.handles.clone();

        let policy = OverlayPolicy::from_i32(self.value(h.overlay));
        self.overlay.set_policy(policy);
        let padding = self.value(h.overlay_padding);
        self.overlay.set_padding(&mut self.host, padding);
        let trans = self.value(h.vkbd_trans);
        self.overlay.set_vkbd_transparency(&mut self.host, trans);

        let volume = self.value(h.volume);
        self.host.set_volume(volume);
        let tape_reset = self.value(h.tape_reset);
        self.host.set_int(IntSetting::TapeResetWithMachine, tape_reset);
        for n in 0..2 {
            if let Some(d) = h.display(n) {
                let palette = self.value(d.palette);
                self.host.set_palette(n, palette);
            }
        }
        for (slot, &item) in h.hotkeys.iter().enumerate() {
            let f = ButtonFn::from_i32(self.choice_value(item)).unwrap_or(ButtonFn::Undef);
            self.keys.set_hotkey(slot, f);
        }
        input::sync_ports(self);
        let gpio = self.choice_value(h.gpio_config);
        self.host.reset_gpio(gpio);
        let interp = self.value(h.scaling_interp) != 0;
        self.host.set_interpolation(interp);
        let convention = self.value(h.dir_convention);
        self.browser.set_dir_convention(convention);
        if let Some(item) = h.c40_80 {
            let columns = self.value(item);
            prefs::set_columns(self, columns);
        }

        for n in 0..2 {
            let Some(d) = h.display(n) else { continue };
            if self.value(d.use_scaling_params) != 0 && !video::use_int_scaling(self, n, true)? {
                self.set_value(d.use_scaling_params, 0);
            }
        }
        video::apply_layout(self)?;

        video::shader_sanity(self, ids::SHADER_ENABLE);
        let shader = self.host.allow_shader() && self.value(h.shader_enable) != 0;
        self.host.realloc_fbl(FbLayer::Vic, shader);
        video::set_shader(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Emulator, NullHost};

    fn runtime(machine: MachineClass) -> (MenuRuntime<NullHost>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let rt = MenuRuntime::new(NullHost::new(machine), dir.path(), &[], "PAL").unwrap();
        (rt, dir)
    }

    #[test]
    fn boot_pushes_defaults_into_the_host() {
        let (rt, _dir) = runtime(MachineClass::C64);
        assert!(rt.host.called("alloc_fbl Ui"));
        assert!(rt.host.called("set_volume 100"));
        assert!(rt.host.called("set_joy_port_device 0"));
        assert!(rt.host.called("set_shader"));
        assert_eq!(rt.keys.hotkey(3), ButtonFn::Menu);
        assert!(!rt.menu_showing());
    }

    #[test]
    fn unit_slot_is_clamped() {
        let (mut rt, _dir) = runtime(MachineClass::C64);
        rt.unit = 10;
        assert_eq!(rt.unit_slot(), 2);
        rt.unit = 3;
        assert_eq!(rt.unit_slot(), 0);
    }

    #[test]
    fn vkbd_moves_on_joystick_edges_only() {
        let (mut rt, _dir) = runtime(MachineClass::C64);
        rt.quick_func(ButtonFn::VkbdToggle).unwrap();
        assert!(rt.vkbd.enabled);
        let start = rt.vkbd.cursor;
        let right = |kind, value| PendingJoy {
            kind,
            port: 0,
            device: JoyDev::Usb0,
            value,
        };
        rt.vkbd_joy(right(JoyKind::Or, JOY_RIGHT));
        rt.vkbd_joy(right(JoyKind::Or, JOY_RIGHT));
        assert_eq!(rt.vkbd.cursor, rt.vkbd.keys[start].right);
        rt.vkbd_joy(right(JoyKind::And, !JOY_RIGHT));
        rt.vkbd_joy(right(JoyKind::Absolute, JOY_FIRE));
        assert!(rt.host.called("vkbd_latch"));
    }

    #[test]
    fn column_key_flips_the_item() {
        let (mut rt, _dir) = runtime(MachineClass::C128);
        let item = rt.handles.c40_80.unwrap();
        assert_eq!(rt.value(item), 1);
        rt.quick_func(ButtonFn::Column4080).unwrap();
        assert_eq!(rt.value(item), 0);
        assert_eq!(rt.host.get_int(IntSetting::C128ColumnKey), 0);
    }
}
