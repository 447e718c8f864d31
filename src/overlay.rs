//! The status bar along the bottom of the screen.
//!
//! Each field owns a fixed run of character cells in the template string and
//! is redrawn on its own when its value changes. The virtual keyboard draws
//! into the same buffer, so the layer is shown whenever either one wants it.

use log::debug;

use crate::fb::IndexedFb;
use crate::ids::{OVERLAY_ALWAYS, OVERLAY_NEVER};
use crate::platform::{FbLayer, MachineClass, Platform, TICKS_PER_SECOND};

pub const OVERLAY_WIDTH: i32 = 720;
pub const OVERLAY_HEIGHT: i32 = 480;

const SCALE_XY: i32 = 2;
const FONT_ADVANCE: i32 = 8 * SCALE_XY;
const STATUS_BAR_HEIGHT: i32 = FONT_ADVANCE + 2 * SCALE_XY;
const ACTIVITY_DELAY: u64 = 5 * TICKS_PER_SECOND;

pub const BG_COLOR: u8 = 0;
pub const FG_COLOR: u8 = 1;
pub const BLACK_COLOR: u8 = 2;
pub const RED_COLOR: u8 = 3;
pub const GREEN_COLOR: u8 = 4;
pub const LIGHT_RED_COLOR: u8 = 5;
pub const LIGHT_GREEN_COLOR: u8 = 6;
pub const TRANSPARENT_COLOR: u8 = 7;
pub const VKBD_FG_COLOR: u8 = 8;
pub const VKBD_BG_COLOR: u8 = 9;

pub const NUM_COLORS: usize = 10;

const DEFAULT_PALETTE: [u32; NUM_COLORS] = [
    0xFF6C5EB5, 0xFFFFFFFF, 0xFF000000, 0xFF68372B, 0xFF588D43, 0xFF9A6759, 0xFF9AD284,
    0x00000000, 0xFFFFFFFF, 0xFF303030,
];

// Character cells of each field within the template.
const DRIVE_CELLS: [i32; 4] = [2, 6, 11, 16];
const TAPE_COUNTER_CELL: i32 = 20;
const TAPE_CONTROL_CELL: i32 = 24;
const TAPE_MOTOR_CELL: i32 = 28;
const WARP_CELL: i32 = 32;
const JOYSWAP_CELL: i32 = 36;
const COLUMNS_CELL: i32 = 41;

/// When the status bar is on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayPolicy {
    Never,
    Always,
    OnActivity,
}

impl OverlayPolicy {
    pub fn from_i32(v: i32) -> OverlayPolicy {
        match v {
            OVERLAY_NEVER => OverlayPolicy::Never,
            OVERLAY_ALWAYS => OverlayPolicy::Always,
            _ => OverlayPolicy::OnActivity,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapeControl {
    Stop,
    Play,
    Forward,
    Rewind,
    Record,
}

impl TapeControl {
    fn label(self) -> (&'static str, u8) {
        match self {
            TapeControl::Stop => ("STP", FG_COLOR),
            TapeControl::Play => ("PLY", GREEN_COLOR),
            TapeControl::Forward => ("FWD", FG_COLOR),
            TapeControl::Rewind => ("REW", FG_COLOR),
            TapeControl::Record => ("REC", RED_COLOR),
        }
    }
}

fn template(machine: MachineClass) -> &'static str {
    match machine {
        MachineClass::Vic20 => "8:  9:  10:  11:  T:    STP   W:  J: ",
        MachineClass::C128 => "8:  9:  10:  11:  T:    STP   W:  J:   C:  ",
        _ => "8:  9:  10:  11:  T:    STP   W:  J:  ",
    }
}

pub struct StatusOverlay {
    pub fb: IndexedFb,
    machine: MachineClass,
    policy: OverlayPolicy,
    /// The status bar wants to be seen.
    pub enabled: bool,
    /// Shown by an explicit toggle; ignores the activity timeout.
    pub forced: bool,
    showing: bool,
    dirty: bool,
    activity_start: u64,
    palette: [u32; NUM_COLORS],
    inset_x: i32,
    inset_y: i32,
    drive_led: [(i32, bool); 4],
    tape_counter: i32,
    tape_control: TapeControl,
    tape_motor: bool,
    warp: bool,
    joyswap: bool,
    columns_80: bool,
}

impl StatusOverlay {
    pub fn new(machine: MachineClass) -> Self {
        let len = template(machine).len() as i32;
        StatusOverlay {
            fb: IndexedFb::new(OVERLAY_WIDTH, OVERLAY_HEIGHT),
            machine,
            policy: OverlayPolicy::OnActivity,
            enabled: false,
            forced: false,
            showing: false,
            dirty: false,
            activity_start: 0,
            palette: DEFAULT_PALETTE,
            inset_x: OVERLAY_WIDTH / 2 - len * FONT_ADVANCE / 2,
            inset_y: OVERLAY_HEIGHT - 1 - STATUS_BAR_HEIGHT + SCALE_XY,
            drive_led: [(0, false); 4],
            tape_counter: 0,
            tape_control: TapeControl::Stop,
            tape_motor: false,
            warp: false,
            joyswap: false,
            columns_80: false,
        }
    }

    pub fn policy(&self) -> OverlayPolicy {
        self.policy
    }

    pub fn showing(&self) -> bool {
        self.showing
    }

    /// Replaces one palette entry before `init` uploads the palette.
    pub fn set_color(&mut self, index: u8, argb: u32) {
        if let Some(entry) = self.palette.get_mut(index as usize) {
            *entry = argb;
        }
    }

    /// Allocates the layer, uploads the palette and draws every field.
    pub fn init(&mut self, host: &mut impl Platform) {
        host.alloc_fbl(FbLayer::Status, OVERLAY_WIDTH, OVERLAY_HEIGHT);
        for (i, argb) in self.palette.iter().enumerate() {
            host.set_palette_fbl(FbLayer::Status, i as u8, *argb);
        }
        self.redraw_all();
    }

    pub fn redraw_all(&mut self) {
        self.fb.clear(TRANSPARENT_COLOR);
        let text = template(self.machine);
        let width = text.len() as i32 * FONT_ADVANCE;
        self.fb.draw_rect(
            self.inset_x,
            self.inset_y - SCALE_XY,
            width,
            STATUS_BAR_HEIGHT,
            BG_COLOR,
            true,
        );
        self.fb.draw_text(text, self.inset_x, self.inset_y, FG_COLOR, SCALE_XY);
        for drive in 0..DRIVE_CELLS.len() {
            self.draw_drive(drive);
        }
        self.draw_tape_counter();
        self.draw_tape_control();
        self.draw_tape_motor();
        self.draw_warp();
        self.draw_joyswap();
        self.draw_columns();
        self.dirty = true;
    }

    pub fn set_policy(&mut self, policy: OverlayPolicy) {
        self.policy = policy;
        self.enabled = match policy {
            OverlayPolicy::Always => true,
            OverlayPolicy::Never => false,
            OverlayPolicy::OnActivity => self.forced,
        };
    }

    fn activity(&mut self, now: u64) {
        self.activity_start = now;
        if self.policy != OverlayPolicy::Never {
            self.enabled = true;
        }
        self.dirty = true;
    }

    /// Hides the bar once the activity window has passed.
    pub fn check(&mut self, now: u64) {
        if self.enabled
            && !self.forced
            && self.policy == OverlayPolicy::OnActivity
            && now.wrapping_sub(self.activity_start) >= ACTIVITY_DELAY
        {
            debug!("status bar timed out");
            self.dismiss();
        }
    }

    pub fn dismiss(&mut self) {
        if self.policy != OverlayPolicy::Always {
            self.enabled = false;
        }
    }

    /// The status toggle quick function.
    pub fn force_toggle(&mut self) {
        if self.policy == OverlayPolicy::Always {
            return;
        }
        if self.enabled || self.forced {
            self.forced = false;
            self.dismiss();
        } else {
            self.forced = true;
            self.enabled = true;
            self.dirty = true;
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Shows, hides or refreshes the layer. Called once per frame.
    pub fn present(&mut self, host: &mut impl Platform, vkbd_enabled: bool) {
        let want = self.enabled || vkbd_enabled;
        if want && !self.showing {
            host.show_fbl(FbLayer::Status);
            self.showing = true;
            self.dirty = true;
        } else if !want && self.showing {
            host.hide_fbl(FbLayer::Status);
            self.showing = false;
        }
        if self.dirty && self.showing {
            host.frames_ready_fbl(FbLayer::Status, &self.fb);
            self.dirty = false;
        }
    }

    pub fn set_padding(&mut self, host: &mut impl Platform, padding: i32) {
        host.hide_fbl(FbLayer::Status);
        self.showing = false;
        host.set_overlay_padding(padding);
    }

    /// Transparency of the keyboard colours in percent.
    pub fn set_vkbd_transparency(&mut self, host: &mut impl Platform, percent: i32) {
        let alpha = (255 * (100 - percent.clamp(0, 100)) / 100) as u32;
        for index in [VKBD_FG_COLOR, VKBD_BG_COLOR] {
            let argb = (alpha << 24) | (self.palette[index as usize] & 0x00FF_FFFF);
            self.palette[index as usize] = argb;
            host.set_palette_fbl(FbLayer::Status, index, argb);
        }
    }

    fn cell_x(&self, cell: i32) -> i32 {
        self.inset_x + cell * FONT_ADVANCE
    }

    fn clear_cells(&mut self, cell: i32, count: i32) {
        let x = self.cell_x(cell);
        self.fb.draw_rect(x, self.inset_y, count * FONT_ADVANCE, FONT_ADVANCE, BG_COLOR, true);
    }

    fn draw_drive(&mut self, drive: usize) {
        let cell = DRIVE_CELLS[drive];
        self.clear_cells(cell, 1);
        let (pwm, led_green) = self.drive_led[drive];
        let colour = if pwm < 333 {
            BLACK_COLOR
        } else if pwm < 666 {
            if led_green { GREEN_COLOR } else { RED_COLOR }
        } else if led_green {
            LIGHT_GREEN_COLOR
        } else {
            LIGHT_RED_COLOR
        };
        let x = self.cell_x(cell) + SCALE_XY;
        self.fb.draw_rect(x, self.inset_y + 4, 12, 8, colour, true);
    }

    fn draw_tape_counter(&mut self) {
        self.clear_cells(TAPE_COUNTER_CELL, 3);
        let text = format!("{:03}", self.tape_counter.rem_euclid(1000));
        let x = self.cell_x(TAPE_COUNTER_CELL);
        self.fb.draw_text(&text, x, self.inset_y, FG_COLOR, SCALE_XY);
    }

    fn draw_tape_control(&mut self) {
        self.clear_cells(TAPE_CONTROL_CELL, 3);
        let (text, colour) = self.tape_control.label();
        let x = self.cell_x(TAPE_CONTROL_CELL);
        self.fb.draw_text(text, x, self.inset_y, colour, SCALE_XY);
    }

    fn draw_tape_motor(&mut self) {
        self.clear_cells(TAPE_MOTOR_CELL, 1);
        let colour = if self.tape_motor { RED_COLOR } else { BG_COLOR };
        let x = self.cell_x(TAPE_MOTOR_CELL) + SCALE_XY;
        self.fb.draw_rect(x, self.inset_y + 4, 12, 8, colour, true);
    }

    fn draw_warp(&mut self) {
        self.clear_cells(WARP_CELL, 1);
        let x = self.cell_x(WARP_CELL);
        let text = if self.warp { "!" } else { "-" };
        self.fb.draw_text(text, x, self.inset_y, FG_COLOR, SCALE_XY);
    }

    fn draw_joyswap(&mut self) {
        self.clear_cells(JOYSWAP_CELL, 2);
        let x = self.cell_x(JOYSWAP_CELL);
        let text = if self.joyswap { "21" } else { "12" };
        self.fb.draw_text(text, x, self.inset_y, FG_COLOR, SCALE_XY);
    }

    fn draw_columns(&mut self) {
        if self.machine != MachineClass::C128 {
            return;
        }
        self.clear_cells(COLUMNS_CELL, 2);
        let x = self.cell_x(COLUMNS_CELL);
        let text = if self.columns_80 { "80" } else { "40" };
        self.fb.draw_text(text, x, self.inset_y, FG_COLOR, SCALE_XY);
    }

    /// `pwm` is the LED brightness in thousandths.
    pub fn drive_led_changed(&mut self, now: u64, drive: usize, pwm: i32, led_green: bool) {
        if drive >= DRIVE_CELLS.len() {
            return;
        }
        self.drive_led[drive] = (pwm, led_green);
        self.activity(now);
        self.draw_drive(drive);
    }

    pub fn tape_counter_changed(&mut self, now: u64, counter: i32) {
        self.tape_counter = counter;
        self.activity(now);
        self.draw_tape_counter();
    }

    pub fn tape_control_changed(&mut self, now: u64, control: TapeControl) {
        self.tape_control = control;
        self.activity(now);
        self.draw_tape_control();
    }

    pub fn tape_motor_changed(&mut self, now: u64, on: bool) {
        self.tape_motor = on;
        self.activity(now);
        self.draw_tape_motor();
    }

    pub fn warp_changed(&mut self, now: u64, on: bool) {
        self.warp = on;
        self.activity(now);
        self.draw_warp();
    }

    pub fn joyswap_changed(&mut self, now: u64, swapped: bool) {
        self.joyswap = swapped;
        self.activity(now);
        self.draw_joyswap();
    }

    pub fn columns_changed(&mut self, now: u64, eighty: bool) {
        self.columns_80 = eighty;
        self.activity(now);
        self.draw_columns();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::NullHost;

    #[test]
    fn activity_shows_then_times_out() {
        let mut host = NullHost::new(MachineClass::C64);
        let mut ov = StatusOverlay::new(MachineClass::C64);
        ov.init(&mut host);
        ov.warp_changed(100, true);
        ov.present(&mut host, false);
        assert!(host.called("show_fbl Status"));
        ov.check(100 + ACTIVITY_DELAY - 1);
        assert!(ov.enabled);
        ov.check(100 + ACTIVITY_DELAY);
        assert!(!ov.enabled);
        ov.present(&mut host, false);
        assert!(host.called("hide_fbl Status"));
    }

    #[test]
    fn timeout_survives_tick_rollover() {
        let mut ov = StatusOverlay::new(MachineClass::C64);
        let start = u64::MAX - 10;
        ov.tape_motor_changed(start, true);
        ov.check(5);
        assert!(ov.enabled);
        ov.check(start.wrapping_add(ACTIVITY_DELAY));
        assert!(!ov.enabled);
    }

    #[test]
    fn forced_show_ignores_timeout() {
        let mut ov = StatusOverlay::new(MachineClass::C64);
        ov.force_toggle();
        assert!(ov.enabled && ov.forced);
        ov.check(ACTIVITY_DELAY * 3);
        assert!(ov.enabled);
        ov.force_toggle();
        assert!(!ov.enabled && !ov.forced);
    }

    #[test]
    fn never_and_always() {
        let mut ov = StatusOverlay::new(MachineClass::C64);
        ov.set_policy(OverlayPolicy::Never);
        ov.warp_changed(0, true);
        assert!(!ov.enabled);
        ov.set_policy(OverlayPolicy::Always);
        ov.force_toggle();
        assert!(ov.enabled && !ov.forced);
        ov.check(ACTIVITY_DELAY * 2);
        ov.dismiss();
        assert!(ov.enabled);
    }

    #[test]
    fn led_colour_follows_pwm() {
        let mut ov = StatusOverlay::new(MachineClass::C64);
        ov.redraw_all();
        let (x, y) = (ov.cell_x(DRIVE_CELLS[0]) + SCALE_XY + 1, ov.inset_y + 5);
        assert_eq!(ov.fb.pixel(x, y), Some(BLACK_COLOR));
        ov.drive_led_changed(0, 0, 500, true);
        assert_eq!(ov.fb.pixel(x, y), Some(GREEN_COLOR));
        ov.drive_led_changed(0, 0, 900, false);
        assert_eq!(ov.fb.pixel(x, y), Some(LIGHT_RED_COLOR));
    }

    #[test]
    fn vkbd_keeps_layer_up() {
        let mut host = NullHost::new(MachineClass::C64);
        let mut ov = StatusOverlay::new(MachineClass::C64);
        ov.present(&mut host, true);
        assert!(ov.showing());
        assert_eq!(host.frames, 1);
        ov.present(&mut host, true);
        assert_eq!(host.frames, 1);
    }

    #[test]
    fn padding_hides_layer() {
        let mut host = NullHost::new(MachineClass::C64);
        let mut ov = StatusOverlay::new(MachineClass::C64);
        ov.present(&mut host, true);
        ov.set_padding(&mut host, 10);
        assert!(!ov.showing());
        assert!(host.called("set_overlay_padding 10"));
    }
}
