//! Preferences: status bar, keyboard transparency, sound, 40/80 column key
//! and where files are looked for.

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::ids;
use crate::overlay::OverlayPolicy;
use crate::platform::{Host, IntSetting};
use crate::runtime::MenuRuntime;
use crate::ui::Changed;

pub fn register<H: Host>(d: &mut Dispatcher<H>) {
    d.register(ids::OVERLAY, overlay_changed);
    d.register(ids::OVERLAY_PADDING, padding_changed);
    d.register(ids::VKBD_TRANSPARENCY, transparency_changed);
    d.register(ids::C40_80_COLUMN, columns_changed);
    d.register(ids::VOLUME, volume_changed);
    d.register(ids::DIR_CONVENTION, dir_convention_changed);
    d.register(ids::DRIVE_SOUND_EMULATION, drive_sound_changed);
    d.register(ids::DRIVE_SOUND_EMULATION_VOLUME, drive_sound_changed);
}

fn overlay_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    rt.overlay.forced = false;
    rt.overlay.set_policy(OverlayPolicy::from_i32(ev.value));
    Ok(())
}

fn padding_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    rt.overlay.set_padding(&mut rt.host, ev.value);
    Ok(())
}

fn transparency_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    rt.overlay.set_vkbd_transparency(&mut rt.host, ev.value);
    Ok(())
}

/// Applies the 40/80 column key position. 1 is up (40 columns).
pub fn set_columns<H: Host>(rt: &mut MenuRuntime<H>, value: i32) {
    rt.host.set_int(IntSetting::C128ColumnKey, value);
    let now = rt.now();
    rt.overlay.columns_changed(now, value == 0);
}

fn columns_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    set_columns(rt, ev.value);
    Ok(())
}

fn volume_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    rt.host.set_volume(ev.value);
    Ok(())
}

fn dir_convention_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    rt.browser.set_dir_convention(ev.value);
    Ok(())
}

fn drive_sound_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let setting = if ev.id == ids::DRIVE_SOUND_EMULATION {
        IntSetting::DriveSoundEmulation
    } else {
        IntSetting::DriveSoundEmulationVolume
    };
    rt.host.set_int(setting, ev.value);
    Ok(())
}
