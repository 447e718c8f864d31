//! Small menus shown over running emulation from a hotkey or gamepad
//! button: tape controls, cartridge, reset and the reset confirmation.

use crate::actions::media::{finish, reset_machine};
use crate::dialog;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::ids;
use crate::item::{ItemId, Menu};
use crate::platform::{Host, MachineClass};
use crate::runtime::MenuRuntime;
use crate::stack::{LevelTag, PopHook};
use crate::ui::Changed;

pub fn register<H: Host>(d: &mut Dispatcher<H>) {
    d.register(ids::OSD_RESET_SOFT, osd_reset);
    d.register(ids::OSD_RESET_HARD, osd_reset);
    d.register(ids::OSD_CONFIRM_YES, osd_confirmed);
    d.register(ids::OSD_CANCEL, osd_cancel);
}

/// Pushes an OSD level of `w` by `h` characters and fills it with `fill`.
/// Nothing happens while the menu is up.
fn show<H: Host>(
    rt: &mut MenuRuntime<H>,
    w: i32,
    h: i32,
    fill: impl FnOnce(&mut Menu, ItemId) -> Result<()>,
) -> Result<()> {
    if rt.ui.enabled {
        return Ok(());
    }
    let canvas = rt.canvas();
    let level = rt.ui.push_menu(w, h, &canvas)?;
    level.tag = LevelTag::Osd;
    level.on_popped_off = Some(PopHook::DisableOsd);
    let root = level.root();
    fill(&mut level.menu, root)?;
    rt.ui.traverse();
    dialog::enable_osd(&mut rt.ui, &mut rt.host);
    Ok(())
}

pub fn show_tape_osd<H: Host>(rt: &mut MenuRuntime<H>) -> Result<()> {
    show(rt, 12, 9, |menu, root| {
        for (id, label) in [
            (ids::TAPE_PLAY, "Play"),
            (ids::TAPE_STOP, "Stop"),
            (ids::TAPE_REWIND, "Rewind"),
            (ids::TAPE_FASTFWD, "FastFwd"),
            (ids::TAPE_RECORD, "Record"),
            (ids::TAPE_RESET, "Reset"),
            (ids::TAPE_RESET_COUNTER, "Zero Counter"),
        ] {
            menu.add_button(root, id, label)?;
        }
        Ok(())
    })
}

/// First attach button of each machine's cartridge folder.
fn cart_attach_id(machine: MachineClass) -> Option<i32> {
    match machine {
        MachineClass::C64 | MachineClass::C128 => Some(ids::ATTACH_CART),
        MachineClass::Vic20 => Some(ids::VIC20_ATTACH_CART_GENERIC),
        MachineClass::Plus4 | MachineClass::Plus4Emu => Some(ids::PLUS4_ATTACH_CART_C0LO),
        MachineClass::Pet => None,
    }
}

pub fn show_cart_osd<H: Host>(rt: &mut MenuRuntime<H>) -> Result<()> {
    let machine = rt.machine();
    let Some(attach) = cart_attach_id(machine) else { return Ok(()) };
    show(rt, 14, 5, |menu, root| {
        menu.add_button(root, attach, "Attach...")?;
        menu.add_button(root, ids::DETACH_CART, "Detach")?;
        if matches!(machine, MachineClass::C64 | MachineClass::C128) {
            menu.add_button(root, ids::CART_FREEZE, "Freeze")?;
        }
        menu.add_button(root, ids::OSD_CANCEL, "Cancel")?;
        Ok(())
    })
}

pub fn show_reset_osd<H: Host>(rt: &mut MenuRuntime<H>) -> Result<()> {
    show(rt, 12, 4, |menu, root| {
        menu.add_button(root, ids::OSD_RESET_SOFT, "Soft Reset")?;
        menu.add_button(root, ids::OSD_RESET_HARD, "Hard Reset")?;
        menu.add_button(root, ids::OSD_CANCEL, "Cancel")?;
        Ok(())
    })
}

/// Asks before a reset requested from the emulator side.
pub fn show_confirm_osd<H: Host>(rt: &mut MenuRuntime<H>, soft: bool) -> Result<()> {
    let title = if soft { "Soft Reset?" } else { "Hard Reset?" };
    show(rt, 12, 4, |menu, root| {
        menu.add_button(root, ids::TEXT, title)?;
        let yes = menu.add_button(root, ids::OSD_CONFIRM_YES, "Yes")?;
        menu.item_mut(yes)?.value = soft as i32;
        menu.add_button(root, ids::OSD_CANCEL, "No")?;
        Ok(())
    })
}

fn osd_reset<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    reset_machine(rt, ev.id == ids::OSD_RESET_SOFT);
    finish(rt);
    Ok(())
}

fn osd_confirmed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    reset_machine(rt, ev.value != 0);
    finish(rt);
    Ok(())
}

fn osd_cancel<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    finish(rt);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_has_no_cart_osd() {
        assert_eq!(cart_attach_id(MachineClass::Pet), None);
        assert_eq!(cart_attach_id(MachineClass::Plus4Emu), Some(ids::PLUS4_ATTACH_CART_C0LO));
    }
}
