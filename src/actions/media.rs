//! Drives, tape, cartridges, machine options, reset and the small
//! informational screens.

use log::info;

use crate::dialog::{self, confirm_wrapped, wrap_words};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::ids::{self, DRIVE_ROMS};
use crate::menu::{about_lines, VIC20_MEMORY};
use crate::platform::{Host, IntSetting, TapeCommand};
use crate::runtime::MenuRuntime;
use crate::ui::Changed;

const LICENSE_COLUMNS: usize = 38;

const LICENSE: &str = "This program is free software: you can redistribute it and/or modify \
it under the terms of the GNU General Public License as published by the Free Software \
Foundation, either version 3 of the License, or (at your option) any later version. \
This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; \
without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. \
See the GNU General Public License for more details. You should have received a copy of \
the GNU General Public License along with this program. If not, see \
https://www.gnu.org/licenses/";

pub fn register<H: Host>(d: &mut Dispatcher<H>) {
    d.register(ids::ABOUT, about);
    d.register(ids::LICENSE, license);
    d.register(ids::SAVE_SETTINGS, save_settings);
    d.register(ids::WARP_MODE, warp_changed);
    d.register(ids::AUTOSTART_WARP, autostart_warp_changed);

    d.register_range(ids::DETACH_DISK..ids::DETACH_DISK + 4, detach_disk);
    d.register_range(ids::IECDEVICE..ids::IECDEVICE + 4, iec_device_changed);
    d.register_range(ids::PARALLEL..ids::PARALLEL + 4, parallel_changed);
    d.register_range(ids::DRIVE_CHANGE_MODEL..ids::DRIVE_CHANGE_MODEL + 4, change_model);
    d.register(ids::DRIVE_MODEL_SELECT, model_selected);
    d.register(ids::DRIVE_CHANGE_ROM, change_rom);

    d.register(ids::DETACH_CART, detach_cart);
    d.register(ids::MAKE_CART_DEFAULT, cart_default);
    d.register(ids::CART_FREEZE, cart_freeze);

    d.register(ids::DETACH_TAPE, detach_tape);
    for id in [
        ids::TAPE_PLAY,
        ids::TAPE_STOP,
        ids::TAPE_REWIND,
        ids::TAPE_FASTFWD,
        ids::TAPE_RECORD,
        ids::TAPE_RESET,
        ids::TAPE_RESET_COUNTER,
    ] {
        d.register(id, tape_control);
    }
    d.register(ids::TAPE_RESET_WITH_MACHINE, tape_reset_changed);

    for (id, _, _) in VIC20_MEMORY {
        d.register(id, vic20_memory_changed);
    }

    d.register(ids::SOFT_RESET, soft_reset);
    d.register(ids::HARD_RESET, hard_reset);
    d.register(ids::CONFIRM_OK, confirm_ok);
    d.register(ids::CONFIRM_CANCEL, pop);
    d.register(ids::ERROR_DIALOG, pop);
    d.register(ids::INFO_DIALOG, pop);
}

/// Leaves the menu after an action that should return to the emulator.
/// An OSD is dismissed instead.
pub fn finish<H: Host>(rt: &mut MenuRuntime<H>) {
    if rt.ui.osd_active {
        dialog::dismiss_osd_if_active(&mut rt.ui, &mut rt.host);
    } else {
        rt.ui.pop_all_and_toggle();
    }
}

fn pop<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    rt.ui.pop_menu()
}

fn about<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    let canvas = rt.canvas();
    let lines = about_lines(rt.machine());
    let level = rt.ui.push_menu(32, 8, &canvas)?;
    let root = level.root();
    for line in &lines {
        level.menu.add_button(root, ids::TEXT, line)?;
    }
    level.menu.add_divider(root)?;
    level.menu.add_button(root, ids::TEXT, "https://github.com/")?;
    level.menu.add_button(root, ids::TEXT, "         randyrossi/bmc64")?;
    rt.ui.traverse();
    Ok(())
}

fn license<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    let canvas = rt.canvas();
    let level = rt.ui.push_menu(-1, -1, &canvas)?;
    let root = level.root();
    for line in wrap_words(LICENSE, LICENSE_COLUMNS) {
        level.menu.add_button(root, ids::TEXT, &line)?;
    }
    rt.ui.traverse();
    Ok(())
}

fn save_settings<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    match rt.save_settings() {
        Ok(()) => rt.info("Settings saved"),
        Err(e) => {
            log::warn!("saving settings: {}", e);
            rt.error("Problem saving")
        }
    }
}

/// Sets warp mode and keeps the menu item and status bar in step.
pub fn set_warp<H: Host>(rt: &mut MenuRuntime<H>, on: bool) {
    rt.host.set_warp(on);
    let item = rt.handles.warp;
    rt.set_value(item, on as i32);
    let now = rt.now();
    rt.overlay.warp_changed(now, on);
}

fn warp_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    set_warp(rt, ev.value != 0);
    Ok(())
}

fn autostart_warp_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    rt.host.set_int(IntSetting::AutostartWarp, ev.value);
    Ok(())
}

fn detach_disk<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    rt.info("Detaching...")?;
    let unit = rt.unit;
    rt.host.detach_disk(unit);
    let slot = rt.unit_slot();
    rt.browser.attached_disk[slot].clear();
    rt.ui.pop_all_and_toggle();
    Ok(())
}

fn iec_device_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let unit = rt.unit;
    rt.host.set_int(IntSetting::IecDevice(unit), ev.value);
    Ok(())
}

fn parallel_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let unit = rt.unit;
    rt.host.set_int(IntSetting::ParallelCable(unit), ev.value);
    Ok(())
}

fn change_model<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    let unit = rt.unit;
    let models = rt.host.drive_models(unit);
    let current = rt.host.get_int(IntSetting::DriveType(unit));
    let canvas = rt.canvas();
    let level = rt.ui.push_menu(16, 10, &canvas)?;
    let root = level.root();
    level.menu.add_button(root, ids::TEXT, &format!("Drive {} model", unit))?;
    level.menu.add_divider(root)?;
    for (name, model) in models {
        let item = level.menu.add_button(root, ids::DRIVE_MODEL_SELECT, &name)?;
        let it = level.menu.item_mut(item)?;
        it.value = model;
        if model == current {
            it.symbol = Some(b'*');
        }
    }
    rt.ui.traverse();
    Ok(())
}

fn model_selected<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let unit = rt.unit;
    info!("drive {} model {}", unit, ev.value);
    rt.host.set_int(IntSetting::DriveType(unit), ev.value);
    rt.ui.pop_all_and_toggle();
    Ok(())
}

fn change_rom<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    let canvas = rt.canvas();
    let level = rt.ui.push_menu(12, 8, &canvas)?;
    let root = level.root();
    for (i, label) in DRIVE_ROMS.iter().enumerate() {
        level.menu.add_button(root, ids::DRIVE_SELECT_ROM + i as i32, label)?;
    }
    rt.ui.traverse();
    Ok(())
}

fn detach_cart<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    rt.info("Detaching...")?;
    rt.host.detach_cart(0);
    finish(rt);
    Ok(())
}

fn cart_default<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    rt.host.set_cart_default();
    rt.info("Remember to save..")
}

fn cart_freeze<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    rt.host.cart_freeze();
    finish(rt);
    Ok(())
}

fn detach_tape<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    rt.info("Detaching...")?;
    rt.host.detach_tape();
    finish(rt);
    Ok(())
}

/// Datasette command of a tape control button.
pub fn tape_command(id: i32) -> Option<TapeCommand> {
    let cmd = match id {
        ids::TAPE_PLAY => TapeCommand::Play,
        ids::TAPE_STOP => TapeCommand::Stop,
        ids::TAPE_REWIND => TapeCommand::Rewind,
        ids::TAPE_FASTFWD => TapeCommand::Forward,
        ids::TAPE_RECORD => TapeCommand::Record,
        ids::TAPE_RESET => TapeCommand::Reset,
        ids::TAPE_RESET_COUNTER => TapeCommand::ResetCounter,
        _ => return None,
    };
    Some(cmd)
}

fn tape_control<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    if let Some(cmd) = tape_command(ev.id) {
        rt.host.tape_control(cmd);
    }
    finish(rt);
    Ok(())
}

fn tape_reset_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    rt.host.set_int(IntSetting::TapeResetWithMachine, ev.value);
    Ok(())
}

fn vic20_memory_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    if let Some((_, _, setting)) = VIC20_MEMORY.iter().find(|(id, _, _)| *id == ev.id) {
        rt.host.set_int(*setting, ev.value);
    }
    Ok(())
}

/// Resets the machine. The IEC dirs the emulated program may have moved
/// go back to the ones last picked in the menu.
pub fn reset_machine<H: Host>(rt: &mut MenuRuntime<H>, soft: bool) {
    for (slot, dir) in rt.browser.last_iec_dir.iter().enumerate() {
        rt.host.set_iec_dir(8 + slot as i32, dir);
    }
    info!("{} reset", if soft { "soft" } else { "hard" });
    rt.host.reset(soft);
}

fn soft_reset<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    reset_machine(rt, true);
    finish(rt);
    Ok(())
}

fn hard_reset<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    let canvas = rt.canvas();
    confirm_wrapped(
        &mut rt.ui,
        &mut rt.host,
        &canvas,
        "Hard Reset",
        "The machine will be power cycled. Anything not saved will be lost.",
        Some((0, ids::HARD_RESET)),
    )
}

fn confirm_ok<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    rt.ui.pop_menu()?;
    if ev.sub_id == ids::HARD_RESET {
        reset_machine(rt, false);
        finish(rt);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tape_buttons_map_to_commands() {
        assert_eq!(tape_command(ids::TAPE_FASTFWD), Some(TapeCommand::Forward));
        assert_eq!(tape_command(ids::TAPE_RESET_COUNTER), Some(TapeCommand::ResetCounter));
        assert_eq!(tape_command(ids::DETACH_TAPE), None);
    }

    #[test]
    fn license_fits_the_screen() {
        let lines = wrap_words(LICENSE, LICENSE_COLUMNS);
        assert!(lines.len() > 5);
        assert!(lines.iter().all(|l| l.len() <= LICENSE_COLUMNS));
    }
}
