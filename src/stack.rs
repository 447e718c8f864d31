//! The stack of independently scrolled menu screens.
//!
//! Level 0 is the main menu and lives for the life of the runtime.
//! Everything above it is a popup (file browser, dialog, sub menu, OSD)
//! that owns its own item arena and is dropped whole when popped.

use log::error;

use crate::error::{MenuError, Result};
use crate::ids::DirType;
use crate::item::{ItemId, Menu};
use crate::platform::CanvasState;

pub const NUM_MENU_ROOTS: usize = 5;
pub const MENU_WIDTH_CHARS: i32 = 40;
pub const MENU_HEIGHT_CHARS: i32 = 25;

/// How a pushed level is sized and placed on one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dim {
    /// Explicit size in characters, centred within the main menu.
    Chars(i32),
    /// Main menu size and position.
    Inherit,
    /// Main menu size, centred over the emulated display.
    Center,
}

impl From<i32> for Dim {
    fn from(v: i32) -> Dim {
        match v {
            -1 => Dim::Inherit,
            -2 => Dim::Center,
            n => Dim::Chars(n),
        }
    }
}

/// Fired when a level is popped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopHook {
    /// The level was shown as an OSD; hide the UI layer again.
    DisableOsd,
    /// Stop feeding raw USB data to the monitor of this device.
    StopRawUsb(usize),
    /// Key binding labels in the USB menu may be stale.
    RefreshKeyBindings(usize),
}

/// Fired when the cursor of a level moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorHook {
    RememberDirPos(DirType),
}

/// What a level is showing. Used to route raw input and rebuilds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LevelTag {
    #[default]
    Generic,
    Main,
    Files(DirType),
    Volumes,
    Dialog,
    Confirm,
    UsbConfig(usize),
    UsbMonitor(usize),
    KeyBindings(usize),
    /// Waiting for a key press to store in a keyset or binding slot.
    KeyListener,
    Keyset(usize),
    Gpio,
    Osd,
}

#[derive(Debug)]
pub struct Level {
    pub menu: Menu,
    pub tag: LevelTag,
    pub cursor: i32,
    pub window_top: i32,
    pub window_bottom: i32,
    /// Number of visible rows, counting expanded folders.
    pub max_index: i32,
    pub cursor_item: Option<ItemId>,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub on_popped_off: Option<PopHook>,
    pub on_popped_to: Option<PopHook>,
    pub cursor_listener: Option<CursorHook>,
}

impl Level {
    fn new(left: i32, top: i32, width: i32, height: i32, rows: i32) -> Self {
        Level {
            menu: Menu::new(),
            tag: LevelTag::Generic,
            cursor: 0,
            window_top: 0,
            window_bottom: rows,
            max_index: 0,
            cursor_item: None,
            left,
            top,
            width,
            height,
            on_popped_off: None,
            on_popped_to: None,
            cursor_listener: None,
        }
    }

    pub fn root(&self) -> ItemId {
        self.menu.root()
    }

    pub fn rows(&self) -> i32 {
        self.window_bottom - self.window_top
    }

    /// Recomputes `max_index` and the item under the cursor after the tree
    /// changed shape. Returns true if the cursor had to be pulled back.
    pub fn traverse(&mut self) -> bool {
        let visible = self.menu.visible();
        self.max_index = visible.len() as i32;
        let mut clamped = false;
        if self.cursor >= self.max_index {
            self.cursor = (self.max_index - 1).max(0);
            clamped = true;
        }
        if self.cursor < self.window_top {
            let rows = self.rows();
            self.window_top = self.cursor;
            self.window_bottom = self.cursor + rows;
        }
        self.cursor_item = visible.get(self.cursor as usize).map(|(id, _)| *id);
        clamped
    }
}

#[derive(Debug, Default)]
pub struct MenuStack {
    levels: Vec<Level>,
}

/// Left edge of a main-menu sized box centred over the graphics area.
pub fn centered_left(canvas: &CanvasState) -> i32 {
    canvas.left + canvas.border_w + canvas.gfx_w / 2 - MENU_WIDTH_CHARS * 8 / 2
}

/// Top edge of a main-menu sized box centred over the graphics area. The
/// UI layer is not line doubled, so raster skip divides the display lines.
pub fn centered_top(canvas: &CanvasState) -> i32 {
    let skip = canvas.raster_skip.max(1);
    let ui_top = canvas.first_displayed_line + canvas.max_border_h / skip;
    ui_top + canvas.gfx_h / 2 / skip - MENU_HEIGHT_CHARS * 8 / 2
}

impl MenuStack {
    pub fn new() -> Self {
        MenuStack { levels: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Index of the top level.
    pub fn current_index(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    pub fn current(&self) -> Option<&Level> {
        self.levels.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Level> {
        self.levels.last_mut()
    }

    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn level_mut(&mut self, index: usize) -> Option<&mut Level> {
        self.levels.get_mut(index)
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn push(&mut self, w: Dim, h: Dim, canvas: &CanvasState) -> Result<&mut Level> {
        if self.levels.len() >= NUM_MENU_ROOTS {
            error!("tried to push menu beyond {} levels", NUM_MENU_ROOTS);
            return Err(MenuError::StackFull(NUM_MENU_ROOTS));
        }
        let width = match w {
            Dim::Chars(n) => n * 8,
            _ => MENU_WIDTH_CHARS * 8,
        };
        let height = match h {
            Dim::Chars(n) => n * 8,
            _ => MENU_HEIGHT_CHARS * 8,
        };
        let (root_left, root_top, root_w, root_h) = match self.levels.first() {
            Some(r) => (r.left, r.top, r.width, r.height),
            None => (
                centered_left(canvas),
                centered_top(canvas),
                MENU_WIDTH_CHARS * 8,
                MENU_HEIGHT_CHARS * 8,
            ),
        };
        let left = match w {
            Dim::Center => centered_left(canvas),
            Dim::Inherit => root_left,
            Dim::Chars(_) => root_left + (root_w - width) / 2,
        };
        let top = match h {
            Dim::Center => centered_top(canvas),
            Dim::Inherit => root_top,
            Dim::Chars(_) => root_top + (root_h - height) / 2,
        };
        let rows = match h {
            Dim::Chars(n) => n,
            _ => MENU_HEIGHT_CHARS,
        };
        self.levels.push(Level::new(left, top, width, height, rows));
        let level = self.levels.len() - 1;
        Ok(&mut self.levels[level])
    }

    /// Removes the top level. The main menu cannot be popped.
    pub fn pop(&mut self) -> Result<Level> {
        if self.levels.len() <= 1 {
            error!("tried to pop the main menu");
            return Err(MenuError::PopRoot);
        }
        self.levels.pop().ok_or(MenuError::PopRoot)
    }

    /// Re-centres the main menu after the display geometry changed.
    pub fn reposition_root(&mut self, canvas: &CanvasState) {
        if let Some(root) = self.levels.first_mut() {
            root.left = centered_left(canvas);
            root.top = centered_top(canvas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_with_root() -> MenuStack {
        let mut s = MenuStack::new();
        s.push(Dim::Center, Dim::Center, &CanvasState::default()).unwrap();
        s
    }

    #[test]
    fn root_is_centred_over_gfx() {
        let s = stack_with_root();
        let root = s.level(0).unwrap();
        assert_eq!(root.left, 32 + 160 - 160);
        assert_eq!(root.top, 16 + 35 + 100 - 100);
        assert_eq!(root.rows(), MENU_HEIGHT_CHARS);
    }

    #[test]
    fn small_popup_centres_in_root() {
        let mut s = stack_with_root();
        let canvas = CanvasState::default();
        let lvl = s.push(Dim::Chars(30), Dim::Chars(4), &canvas).unwrap();
        assert_eq!(lvl.width, 240);
        assert_eq!(lvl.left, 32 + (320 - 240) / 2);
        assert_eq!(lvl.rows(), 4);
        let lvl = s.push(Dim::Inherit, Dim::Inherit, &canvas).unwrap();
        assert_eq!(lvl.left, 32);
    }

    #[test]
    fn depth_is_limited() {
        let mut s = stack_with_root();
        let canvas = CanvasState::default();
        for _ in 1..NUM_MENU_ROOTS {
            s.push(Dim::Inherit, Dim::Inherit, &canvas).unwrap();
        }
        assert!(matches!(
            s.push(Dim::Inherit, Dim::Inherit, &canvas),
            Err(MenuError::StackFull(5))
        ));
    }

    #[test]
    fn root_cannot_be_popped() {
        let mut s = stack_with_root();
        assert!(matches!(s.pop(), Err(MenuError::PopRoot)));
        assert_eq!(s.depth(), 1);
    }

    #[test]
    fn push_then_pop_leaves_parent_untouched() {
        let mut s = stack_with_root();
        let canvas = CanvasState::default();
        {
            let root = s.current_mut().unwrap();
            let r = root.root();
            for i in 0..30 {
                root.menu.add_button(r, i, "x").unwrap();
            }
            root.cursor = 22;
            root.window_top = 6;
            root.window_bottom = 6 + MENU_HEIGHT_CHARS;
            root.traverse();
        }
        let before = s.level(0).map(|l| (l.cursor, l.window_top, l.window_bottom, l.menu.len()));

        let lvl = s.push(Dim::Chars(30), Dim::Chars(10), &canvas).unwrap();
        let r = lvl.root();
        lvl.menu.add_button(r, 99, "child").unwrap();
        assert_eq!(s.depth(), 2);

        let popped = s.pop().unwrap();
        assert_eq!(popped.menu.len(), 2);
        assert_eq!(s.depth(), 1);
        let after = s.level(0).map(|l| (l.cursor, l.window_top, l.window_bottom, l.menu.len()));
        assert_eq!(before, after);
        assert!(s.current().unwrap().menu.find_by_id(99).is_none());
    }

    #[test]
    fn traverse_clamps_cursor() {
        let mut s = stack_with_root();
        let lvl = s.current_mut().unwrap();
        let root = lvl.root();
        lvl.menu.add_button(root, 1, "a").unwrap();
        lvl.menu.add_button(root, 2, "b").unwrap();
        lvl.cursor = 5;
        assert!(lvl.traverse());
        assert_eq!(lvl.cursor, 1);
        assert_eq!(lvl.max_index, 2);
        assert!(lvl.cursor_item.is_some());
    }
}
