//! File browser rows: opening a listing, moving around in it and acting
//! on the file or directory picked.

use std::path::PathBuf;

use log::{info, warn};

use crate::browser::{listing_for, MAX_FN_NAME, VOLUME_NAMES};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::ids::{self, DirType, DISK_KINDS, DRIVE_ROMS};
use crate::item::ItemKind;
use crate::platform::{Host, RomKind};
use crate::runtime::MenuRuntime;
use crate::stack::LevelTag;
use crate::ui::Changed;

const VOLUME_LABELS: [&str; 4] = ["SD", "USB1", "USB2", "USB3"];

pub fn register<H: Host>(d: &mut Dispatcher<H>) {
    for id in [
        ids::AUTOSTART,
        ids::LOADPRG,
        ids::CREATE_TAP,
        ids::ATTACH_TAPE,
        ids::LOAD_KERNAL,
        ids::LOAD_BASIC,
        ids::LOAD_CHARGEN,
        ids::LOAD_SNAP,
        ids::SAVE_SNAP,
    ] {
        d.register(id, browse);
    }
    d.register_range(ids::ATTACH_DISK..ids::ATTACH_DISK + 4, browse);
    d.register_range(ids::IECDIR..ids::IECDIR + 4, browse);
    d.register_range(ids::CREATE_DISK..ids::CREATE_DISK + DISK_KINDS.len() as i32, browse);
    d.register_range(ids::DRIVE_SELECT_ROM..ids::DRIVE_SELECT_ROM + DRIVE_ROMS.len() as i32, browse);
    d.register_range(ids::ATTACH_CART..ids::PLUS4_ATTACH_CART_C0HI + 1, browse);
}

/// The file id a browse button lists under.
pub fn file_id_for(button: i32) -> Option<i32> {
    let n_disks = DISK_KINDS.len() as i32;
    let n_roms = DRIVE_ROMS.len() as i32;
    let id = match button {
        ids::AUTOSTART => ids::AUTOSTART_FILE,
        ids::LOADPRG => ids::LOADPRG_FILE,
        ids::CREATE_TAP => ids::CREATE_TAP_FILE,
        ids::ATTACH_TAPE => ids::TAPE_FILE,
        ids::LOAD_KERNAL => ids::KERNAL_FILE,
        ids::LOAD_BASIC => ids::BASIC_FILE,
        ids::LOAD_CHARGEN => ids::CHARGEN_FILE,
        ids::LOAD_SNAP => ids::LOAD_SNAP_FILE,
        ids::SAVE_SNAP => ids::SAVE_SNAP_FILE,
        b if (ids::ATTACH_DISK..ids::ATTACH_DISK + 4).contains(&b) => ids::DISK_FILE,
        b if (ids::IECDIR..ids::IECDIR + 4).contains(&b) => ids::IEC_DIR,
        b if (ids::CREATE_DISK..ids::CREATE_DISK + n_disks).contains(&b) => {
            ids::CREATE_DISK_FILE + (b - ids::CREATE_DISK)
        }
        b if (ids::DRIVE_SELECT_ROM..ids::DRIVE_SELECT_ROM + n_roms).contains(&b) => {
            ids::DRIVE_ROM_FILE + (b - ids::DRIVE_SELECT_ROM)
        }
        // Cart file ids sit 20 above their browse buttons.
        b if (ids::ATTACH_CART..=ids::PLUS4_ATTACH_CART_C0HI).contains(&b) => b + 20,
        _ => return None,
    };
    Some(id)
}

fn browse<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let Some(file_id) = file_id_for(ev.id) else { return Ok(()) };
    let Some((dir, filter)) = listing_for(file_id) else { return Ok(()) };
    let canvas = rt.canvas();
    rt.browser.show_files(&mut rt.ui, &canvas, dir, filter, file_id, false)
}

/// Fallback for rows of a listing; `ev.id` is the file id of the listing.
pub fn file_event<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let Some((dir, _)) = listing_for(ev.id) else { return Ok(()) };
    match ev.sub_id {
        ids::SUB_PICK_FILE | ids::SUB_PICK_DIR => select_file(rt, ev, dir),
        ids::SUB_UP_DIR => {
            rt.browser.up_dir(dir);
            rt.ui.pop_menu()?;
            relist(rt, ev.id)
        }
        ids::SUB_ENTER_DIR => {
            rt.browser.enter_dir(dir, &ev.str_value);
            rt.ui.pop_menu()?;
            relist(rt, ev.id)
        }
        ids::SUB_SELECT_VOLUME => show_volumes(rt, ev.id),
        ids::SUB_CHANGE_VOLUME => {
            if !rt.browser.change_volume(ev.value) {
                return Ok(());
            }
            // The volume popup and the old listing.
            rt.ui.pop_menu()?;
            rt.ui.pop_menu()?;
            relist(rt, ev.id)
        }
        _ => Ok(()),
    }
}

fn relist<H: Host>(rt: &mut MenuRuntime<H>, file_id: i32) -> Result<()> {
    let canvas = rt.canvas();
    rt.browser.relist(&mut rt.ui, &canvas, file_id)
}

fn show_volumes<H: Host>(rt: &mut MenuRuntime<H>, file_id: i32) -> Result<()> {
    let available: Vec<bool> = (0..VOLUME_NAMES.len())
        .map(|v| v == 0 || rt.host.usb_volume_available(v - 1))
        .collect();
    let canvas = rt.canvas();
    let level = rt.ui.push_menu(12, 8, &canvas)?;
    level.tag = LevelTag::Volumes;
    let root = level.root();
    for (volume, label) in VOLUME_LABELS.iter().enumerate() {
        if !available[volume] {
            continue;
        }
        let item = level.menu.add_button_with_value(root, file_id, label, volume as i32, "", " ")?;
        let it = level.menu.item_mut(item)?;
        it.sub_id = ids::SUB_CHANGE_VOLUME;
    }
    rt.ui.traverse();
    Ok(())
}

/// Shows `busy`, runs `op` and either closes the menu or backs out to the
/// listing with `failed`. Returns whether `op` succeeded.
fn attempt<H: Host>(
    rt: &mut MenuRuntime<H>,
    busy: &str,
    failed: &str,
    op: impl FnOnce(&mut H) -> Result<()>,
) -> Result<bool> {
    rt.info(busy)?;
    match op(&mut rt.host) {
        Ok(()) => {
            rt.ui.pop_all_and_toggle();
            Ok(true)
        }
        Err(e) => {
            warn!("{}: {}", failed, e);
            rt.ui.pop_menu()?;
            rt.error(failed)?;
            Ok(false)
        }
    }
}

/// Name for a file about to be created: non-empty, short enough, and
/// given `ext` when it has no extension of its own.
pub fn new_file_name(name: &str, ext: &str) -> std::result::Result<String, String> {
    if name.is_empty() {
        return Err("Empty filename".into());
    }
    if name.len() > MAX_FN_NAME {
        return Err("Too long".into());
    }
    if name.contains('.') {
        return Ok(name.to_string());
    }
    if name.len() + ext.len() > MAX_FN_NAME {
        return Err("Too long".into());
    }
    Ok(format!("{}{}", name, ext))
}

fn select_file<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed, dir: DirType) -> Result<()> {
    let id = ev.id;
    let name = ev.str_value.as_str();
    let path = rt.browser.host_path(&rt.browser.fullpath(dir, name));
    let n_disks = DISK_KINDS.len() as i32;
    let n_roms = DRIVE_ROMS.len() as i32;

    match id {
        ids::IEC_DIR => {
            let unit = rt.unit;
            let here = rt.browser.host_path(&rt.browser.fullpath(DirType::Iec, ""));
            let here = here.to_string_lossy().into_owned();
            info!("drive {} IEC dir is now {}", unit, here);
            rt.host.set_iec_dir(unit, &here);
            rt.browser.last_iec_dir[rt.unit_slot()] = here;
            rt.ui.pop_menu()?;
        }
        ids::LOAD_SNAP_FILE => {
            attempt(rt, "Loading...", "Load snapshot failed", |h| h.load_state(&path))?;
        }
        ids::SAVE_SNAP_FILE => {
            let file = if ev.kind == ItemKind::TextField {
                match rt.browser.snapshot_name(name) {
                    Ok(file) => file,
                    Err(msg) => return rt.error(&msg),
                }
            } else {
                name.to_string()
            };
            let path = rt.browser.host_path(&rt.browser.fullpath(DirType::Snaps, &file));
            attempt(rt, "Saving...", "Save snapshot failed", |h| h.save_state(&path))?;
        }
        ids::DISK_FILE => {
            let (unit, slot) = (rt.unit, rt.unit_slot());
            let ok = attempt(rt, "Attaching...", "Failed to attach disk image", |h| {
                h.attach_disk(unit, &path)
            })?;
            rt.browser.attached_disk[slot] = if ok { name.to_string() } else { String::new() };
        }
        ids::TAPE_FILE => {
            attempt(rt, "Attaching...", "Failed to attach tape image", |h| h.attach_tape(&path))?;
        }
        ids::AUTOSTART_FILE => {
            let warp = rt.handles.autostart_warp.map_or(false, |item| rt.value(item) != 0);
            attempt(rt, "Starting...", "Failed to autostart file", |h| h.autostart(&path, warp))?;
        }
        ids::LOADPRG_FILE => {
            attempt(rt, "Loading...", "Failed to load file", |h| h.load_prg(&path))?;
        }
        ids::KERNAL_FILE | ids::BASIC_FILE | ids::CHARGEN_FILE => {
            let kind = match id {
                ids::KERNAL_FILE => RomKind::Kernal,
                ids::BASIC_FILE => RomKind::Basic,
                _ => RomKind::Chargen,
            };
            attempt(rt, "Loading...", "Failed to load ROM", |h| h.load_rom(kind, &path))?;
        }
        id if (ids::C64_CART_FILE..=ids::PLUS4_CART_C0HI_FILE).contains(&id) => {
            attempt(rt, "Attaching...", "Failed to attach cart", |h| h.attach_cart(id - 20, &path))?;
        }
        id if (ids::DRIVE_ROM_FILE..ids::DRIVE_ROM_FILE + n_roms).contains(&id) => {
            let kind = RomKind::Drive((id - ids::DRIVE_ROM_FILE) as usize);
            match rt.host.load_rom(kind, &path) {
                Ok(()) => {
                    // The listing and the ROM popup under it.
                    rt.ui.pop_menu()?;
                    rt.ui.pop_menu()?;
                }
                Err(e) => {
                    warn!("drive ROM {}: {}", path.display(), e);
                    rt.error("Failed to load ROM")?;
                }
            }
        }
        id if (ids::CREATE_DISK_FILE..ids::CREATE_DISK_FILE + n_disks).contains(&id) => {
            let (label, ext) = DISK_KINDS[(id - ids::CREATE_DISK_FILE) as usize];
            create(rt, ev, ext, "Problem creating disk image", |h, p| h.create_disk(p, label))?;
        }
        ids::CREATE_TAP_FILE => {
            create(rt, ev, ".tap", "Problem creating tape image", |h, p| h.create_tape(p))?;
        }
        _ => {}
    }
    Ok(())
}

fn create<H: Host>(
    rt: &mut MenuRuntime<H>,
    ev: &Changed,
    ext: &str,
    failed: &str,
    op: impl FnOnce(&mut H, &std::path::Path) -> Result<()>,
) -> Result<()> {
    // Only the name field creates; picking a listed file would overwrite it.
    if ev.kind != ItemKind::TextField {
        return rt.error("File already exists");
    }
    let Some((dir, _)) = listing_for(ev.id) else { return Ok(()) };
    let file = match new_file_name(&ev.str_value, ext) {
        Ok(file) => file,
        Err(msg) => return rt.error(&msg),
    };
    let path: PathBuf = rt.browser.host_path(&rt.browser.fullpath(dir, &file));
    match op(&mut rt.host, &path) {
        Ok(()) => {
            info!("created {}", path.display());
            rt.ui.pop_menu()?;
            rt.info(&format!("Created {}", file))
        }
        Err(e) => {
            warn!("{}: {}", failed, e);
            rt.error(failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browse_buttons_map_to_their_file_ids() {
        assert_eq!(file_id_for(ids::ATTACH_DISK + 3), Some(ids::DISK_FILE));
        assert_eq!(file_id_for(ids::IECDIR + 1), Some(ids::IEC_DIR));
        assert_eq!(file_id_for(ids::CREATE_DISK + 4), Some(ids::CREATE_DISK_FILE + 4));
        assert_eq!(file_id_for(ids::ATTACH_CART), Some(ids::C64_CART_FILE));
        assert_eq!(file_id_for(ids::PLUS4_ATTACH_CART_C0HI), Some(ids::PLUS4_CART_C0HI_FILE));
        assert_eq!(file_id_for(ids::DETACH_CART), None);
        for button in [ids::AUTOSTART, ids::LOADPRG, ids::SAVE_SNAP, ids::DRIVE_SELECT_ROM + 5] {
            let file = file_id_for(button).unwrap();
            assert!(listing_for(file).is_some(), "no listing for {}", file);
        }
    }

    #[test]
    fn created_names_get_an_extension() {
        assert_eq!(new_file_name("blank", ".d64").unwrap(), "blank.d64");
        assert_eq!(new_file_name("blank.D81", ".d64").unwrap(), "blank.D81");
        assert_eq!(new_file_name("", ".tap").unwrap_err(), "Empty filename");
        let long = "x".repeat(MAX_FN_NAME - 2);
        assert_eq!(new_file_name(&long, ".tap").unwrap_err(), "Too long");
    }
}
