//! File browser: one current directory per file type, listed into a
//! pushed level with directories first and files second.
//!
//! Paths handed around are volume-prefixed (`SD:/disks/game.d64`). On the
//! target that is the real path; on a desktop each volume maps to a host
//! directory from the config file.

use std::fs;
use std::path::PathBuf;

use log::{debug, warn};

use crate::error::Result;
use crate::ids::{self, DirType, Filter};
use crate::item::{ItemId, Menu};
use crate::platform::{CanvasState, MachineClass};
use crate::stack::{CursorHook, LevelTag};
use crate::ui::Ui;

pub const VOLUME_NAMES: [&str; 4] = ["SD:", "USB:", "USB2:", "USB3:"];

/// Longest snapshot name accepted from the name field.
pub const MAX_FN_NAME: usize = 60;

const DISK_EXT: [&str; 15] = [
    ".d64", ".d67", ".d71", ".d80", ".d81", ".d82", ".d1m", ".d2m", ".d4m", ".g64", ".g71",
    ".g41", ".p64", ".x64", ".dhd",
];
const TAPE_EXT: [&str; 2] = [".t64", ".tap"];
const CART_EXT: [&str; 2] = [".crt", ".bin"];
const PRG_EXT: [&str; 1] = [".prg"];

fn has_ext(name: &str, exts: &[&str]) -> bool {
    let len = name.len();
    len > 4
        && name.is_char_boundary(len - 4)
        && exts.iter().any(|e| name[len - 4..].eq_ignore_ascii_case(e))
}

/// Drops the last path component. The root stays `/`.
pub fn remove_dir(path: &mut String) {
    match path.rfind('/') {
        Some(i) if i > 0 => path.truncate(i),
        _ => {
            path.clear();
            path.push('/');
        }
    }
}

/// Directory type and filter used to list files for a file picking id.
pub fn listing_for(menu_id: i32) -> Option<(DirType, Filter)> {
    let listing = match menu_id {
        ids::LOAD_SNAP_FILE | ids::SAVE_SNAP_FILE => (DirType::Snaps, Filter::Snap),
        ids::DISK_FILE => (DirType::Disks, Filter::Disk),
        id if (ids::CREATE_DISK_FILE..ids::CREATE_DISK_FILE + ids::DISK_KINDS.len() as i32).contains(&id) => {
            (DirType::Disks, Filter::Disk)
        }
        ids::TAPE_FILE | ids::CREATE_TAP_FILE => (DirType::Tapes, Filter::Tape),
        ids::C64_CART_FILE => (DirType::Carts, Filter::Cart),
        id if (ids::C64_CART_8K_FILE..=ids::PLUS4_CART_C0HI_FILE).contains(&id) => (DirType::Carts, Filter::None),
        ids::KERNAL_FILE | ids::BASIC_FILE | ids::CHARGEN_FILE => (DirType::Roms, Filter::None),
        id if (ids::DRIVE_ROM_FILE..ids::DRIVE_ROM_FILE + ids::DRIVE_ROMS.len() as i32).contains(&id) => {
            (DirType::Roms, Filter::None)
        }
        ids::AUTOSTART_FILE => (DirType::Root, Filter::None),
        ids::LOADPRG_FILE => (DirType::Root, Filter::Prgs),
        ids::IEC_DIR => (DirType::Iec, Filter::Dirs),
        _ => return None,
    };
    Some(listing)
}

/// True for ids whose listing starts with a name field.
pub fn wants_name_field(menu_id: i32) -> bool {
    menu_id == ids::SAVE_SNAP_FILE
        || menu_id == ids::CREATE_TAP_FILE
        || (ids::CREATE_DISK_FILE..ids::CREATE_DISK_FILE + ids::DISK_KINDS.len() as i32).contains(&menu_id)
}

#[derive(Clone, Debug)]
pub struct Browser {
    volume: usize,
    roots: [Option<PathBuf>; 4],
    dirs: [String; 7],
    positions: [i32; 7],
    sub_dir: &'static str,
    snap_ext: &'static str,
    pub last_iec_dir: [String; 4],
    pub attached_disk: [String; 4],
}

impl Browser {
    pub fn new(machine: MachineClass, convention: i32) -> Self {
        let mut b = Browser {
            volume: 0,
            roots: Default::default(),
            dirs: Default::default(),
            positions: [0; 7],
            sub_dir: machine.sub_dir(),
            snap_ext: if machine == MachineClass::Plus4Emu { ".p4s" } else { ".vsf" },
            last_iec_dir: Default::default(),
            attached_disk: Default::default(),
        };
        b.set_dir_convention(convention);
        b
    }

    /// Host directory standing in for a volume.
    pub fn set_volume_root(&mut self, volume: usize, root: Option<PathBuf>) {
        if let Some(slot) = self.roots.get_mut(volume) {
            *slot = root;
        }
    }

    pub fn volume_name(&self) -> &'static str {
        VOLUME_NAMES[self.volume]
    }

    pub fn dir(&self, dir: DirType) -> &str {
        &self.dirs[dir.index()]
    }

    pub fn set_dir(&mut self, dir: DirType, path: &str) {
        self.dirs[dir.index()] = path.to_string();
    }

    pub fn position(&self, dir: DirType) -> i32 {
        self.positions[dir.index()]
    }

    pub fn remember_position(&mut self, dir: DirType, pos: i32) {
        self.positions[dir.index()] = pos;
    }

    pub fn snap_ext(&self) -> &'static str {
        self.snap_ext
    }

    /// Resets every directory for the `/dir/C64` or `/C64/dir` layout.
    pub fn set_dir_convention(&mut self, convention: i32) {
        for dir in DirType::ALL {
            self.dirs[dir.index()] = if convention == ids::DIR_CONVENTION_EMU_FOLDER {
                format!("{}{}", self.sub_dir, dir.default_name())
            } else {
                format!("{}{}", dir.default_name(), self.sub_dir)
            };
        }
        self.dirs[DirType::Root.index()] = if convention == ids::DIR_CONVENTION_EMU_FOLDER {
            self.sub_dir.to_string()
        } else {
            "/".to_string()
        };
        self.dirs[DirType::Roms.index()] = self.sub_dir.to_string();
        self.dirs[DirType::Iec.index()] = "/".to_string();
    }

    pub fn fullpath(&self, dir: DirType, name: &str) -> String {
        let d = &self.dirs[dir.index()];
        let sep = if d.ends_with('/') { "" } else { "/" };
        format!("{}{}{}{}", self.volume_name(), d, sep, name)
    }

    /// Where a volume-prefixed path lives on this machine.
    pub fn host_path(&self, path: &str) -> PathBuf {
        for (i, name) in VOLUME_NAMES.iter().enumerate() {
            if let Some(rest) = path.strip_prefix(name) {
                if let Some(root) = &self.roots[i] {
                    return root.join(rest.trim_start_matches('/'));
                }
            }
        }
        PathBuf::from(path)
    }

    pub fn up_dir(&mut self, dir: DirType) {
        remove_dir(&mut self.dirs[dir.index()]);
    }

    pub fn enter_dir(&mut self, dir: DirType, name: &str) {
        let d = &mut self.dirs[dir.index()];
        if !d.ends_with('/') {
            d.push('/');
        }
        d.push_str(name);
    }

    /// Switches volumes. Returns false for an unknown volume.
    pub fn change_volume(&mut self, volume: i32) -> bool {
        match usize::try_from(volume).ok().filter(|&v| v < VOLUME_NAMES.len()) {
            Some(v) => {
                self.volume = v;
                debug!("volume is now {}", VOLUME_NAMES[v]);
                true
            }
            None => false,
        }
    }

    fn include(&self, name: &str, filter: Filter) -> bool {
        match filter {
            Filter::None => true,
            Filter::Dirs => false,
            Filter::Disk => has_ext(name, &DISK_EXT),
            Filter::Tape => has_ext(name, &TAPE_EXT),
            Filter::Cart => has_ext(name, &CART_EXT),
            Filter::Snap => has_ext(name, &[self.snap_ext]),
            Filter::Prgs => has_ext(name, &PRG_EXT),
        }
    }

    fn open_dir(&mut self, dir: DirType) -> Option<fs::ReadDir> {
        // The machine sub directory may not exist; walk up at most twice.
        for attempt in 0..3 {
            let path = self.host_path(&self.fullpath(dir, ""));
            match fs::read_dir(&path) {
                Ok(rd) => return Some(rd),
                Err(e) => {
                    debug!("cannot list {}: {}", path.display(), e);
                    if attempt < 2 {
                        self.up_dir(dir);
                    }
                }
            }
        }
        warn!("no readable directory for {:?}", dir);
        None
    }

    /// Fills `parent` with the current directory of `dir`.
    pub fn list_files(&mut self, menu: &mut Menu, parent: ItemId, dir: DirType, filter: Filter, menu_id: i32) -> Result<()> {
        let Some(entries) = self.open_dir(dir) else { return Ok(()) };

        let here = self.fullpath(dir, "");
        let cur = menu.add_button(parent, menu_id, &here)?;
        {
            let item = menu.item_mut(cur)?;
            item.sub_id = ids::SUB_SELECT_VOLUME;
            item.symbol = Some(b'<');
        }
        menu.add_divider(parent)?;

        if filter == Filter::Dirs {
            let pick = menu.add_button(parent, menu_id, "(Use this dir)")?;
            menu.item_mut(pick)?.sub_id = ids::SUB_PICK_DIR;
            menu.add_divider(parent)?;
        }

        if here != format!("{}/", self.volume_name()) {
            let up = menu.add_button(parent, menu_id, "..")?;
            menu.item_mut(up)?.sub_id = ids::SUB_UP_DIR;
        }

        let dirs = menu.detached_folder();
        let files = menu.detached_folder();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                let id = menu.add_button_with_value(dirs, menu_id, &name, 0, &name, "(dir)")?;
                menu.item_mut(id)?.sub_id = ids::SUB_ENTER_DIR;
            } else if self.include(&name, filter) {
                let id = menu.add_button(files, menu_id, &name)?;
                let item = menu.item_mut(id)?;
                item.sub_id = ids::SUB_PICK_FILE;
                item.str_value = name;
            }
        }
        menu.sort_children(dirs)?;
        menu.sort_children(files)?;
        menu.add_all(dirs, parent)?;
        menu.add_all(files, parent)?;
        Ok(())
    }

    /// Pushes a file list for `menu_id`.
    pub fn show_files(
        &mut self,
        ui: &mut Ui,
        canvas: &CanvasState,
        dir: DirType,
        filter: Filter,
        menu_id: i32,
        reset_cur_pos: bool,
    ) -> Result<()> {
        let level = ui.push_menu(-1, -1, canvas)?;
        level.tag = LevelTag::Files(dir);
        level.cursor_listener = Some(CursorHook::RememberDirPos(dir));
        let root = level.root();
        if wants_name_field(menu_id) {
            let field = level.menu.add_text_field(root, menu_id, "Enter name:", "")?;
            level.menu.item_mut(field)?.sub_id = ids::SUB_PICK_FILE;
        }
        self.list_files(&mut level.menu, root, dir, filter, menu_id)?;

        if reset_cur_pos {
            self.positions[dir.index()] = 0;
        } else {
            ui.set_cur_pos(self.positions[dir.index()]);
        }
        Ok(())
    }

    /// Re-lists after a directory or volume change, cursor at the top.
    pub fn relist(&mut self, ui: &mut Ui, canvas: &CanvasState, menu_id: i32) -> Result<()> {
        match listing_for(menu_id) {
            Some((dir, filter)) => self.show_files(ui, canvas, dir, filter, menu_id, true),
            None => Ok(()),
        }
    }

    /// Checks a typed snapshot name, adding the extension if it has none.
    pub fn snapshot_name(&self, name: &str) -> std::result::Result<String, String> {
        if name.is_empty() {
            return Err("Empty filename".into());
        }
        if name.len() > MAX_FN_NAME {
            return Err("Too long".into());
        }
        match name.find('.') {
            None if name.len() + 4 <= MAX_FN_NAME => Ok(format!("{}{}", name, self.snap_ext)),
            None => Err("Too long".into()),
            Some(dot) if name[dot..].eq_ignore_ascii_case(self.snap_ext) => Ok(name.to_string()),
            Some(_) => Err(format!("Need {} extension", self.snap_ext.to_ascii_uppercase())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn conventions() {
        let b = Browser::new(MachineClass::C64, ids::DIR_CONVENTION_FOLDER_EMU);
        assert_eq!(b.dir(DirType::Disks), "/disks/C64");
        assert_eq!(b.dir(DirType::Root), "/");
        assert_eq!(b.dir(DirType::Roms), "/C64");
        let b = Browser::new(MachineClass::Vic20, ids::DIR_CONVENTION_EMU_FOLDER);
        assert_eq!(b.dir(DirType::Tapes), "/VIC20/tapes");
        assert_eq!(b.dir(DirType::Root), "/VIC20");
        assert_eq!(b.dir(DirType::Iec), "/");
    }

    #[test]
    fn fullpath_and_up() {
        let mut b = Browser::new(MachineClass::C64, ids::DIR_CONVENTION_FOLDER_EMU);
        assert_eq!(b.fullpath(DirType::Root, "x.prg"), "SD:/x.prg");
        assert_eq!(b.fullpath(DirType::Disks, ""), "SD:/disks/C64/");
        b.up_dir(DirType::Disks);
        b.up_dir(DirType::Disks);
        assert_eq!(b.dir(DirType::Disks), "/");
        b.enter_dir(DirType::Disks, "games");
        assert_eq!(b.dir(DirType::Disks), "/games");
    }

    #[test]
    fn filters_need_a_name_before_the_extension() {
        assert!(has_ext("game.D64", &DISK_EXT));
        assert!(!has_ext(".d64", &DISK_EXT));
        assert!(!has_ext("game.d64.txt", &DISK_EXT));
    }

    #[test]
    fn snapshot_names() {
        let b = Browser::new(MachineClass::C64, 0);
        assert_eq!(b.snapshot_name("save").unwrap(), "save.vsf");
        assert_eq!(b.snapshot_name("save.VSF").unwrap(), "save.VSF");
        assert_eq!(b.snapshot_name("save.p4s").unwrap_err(), "Need .VSF extension");
        assert_eq!(b.snapshot_name("").unwrap_err(), "Empty filename");
        let b = Browser::new(MachineClass::Plus4Emu, 0);
        assert_eq!(b.snapshot_name("s").unwrap(), "s.p4s");
    }

    #[test]
    fn listing_puts_dirs_first() {
        let tmp = tempfile::tempdir().unwrap();
        for d in ["z", "y"] {
            fs::create_dir(tmp.path().join(d)).unwrap();
        }
        for f in ["b.txt", "a.txt"] {
            File::create(tmp.path().join(f)).unwrap();
        }
        let mut b = Browser::new(MachineClass::C64, 0);
        b.set_volume_root(0, Some(tmp.path().to_path_buf()));

        let mut menu = Menu::new();
        let root = menu.root();
        b.list_files(&mut menu, root, DirType::Root, Filter::None, ids::AUTOSTART_FILE).unwrap();
        let names: Vec<String> = menu
            .children(root)
            .iter()
            .map(|&c| menu.get(c).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["SD:/", "", "y", "z", "a.txt", "b.txt"]);
        let a = menu.children(root)[4];
        assert_eq!(menu.get(a).unwrap().sub_id, ids::SUB_PICK_FILE);
        assert_eq!(menu.get(a).unwrap().str_value, "a.txt");
    }

    #[test]
    fn missing_machine_dir_falls_back() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("disks")).unwrap();
        File::create(tmp.path().join("disks").join("one.d64")).unwrap();
        File::create(tmp.path().join("disks").join("notes.txt")).unwrap();
        let mut b = Browser::new(MachineClass::C64, 0);
        b.set_volume_root(0, Some(tmp.path().to_path_buf()));

        let mut menu = Menu::new();
        let root = menu.root();
        b.list_files(&mut menu, root, DirType::Disks, Filter::Disk, ids::DISK_FILE).unwrap();
        assert_eq!(b.dir(DirType::Disks), "/disks");
        let names: Vec<String> = menu
            .children(root)
            .iter()
            .map(|&c| menu.get(c).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["SD:/disks/", "", "..", "one.d64"]);
    }
}
