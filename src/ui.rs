//! Menu UI state: the level stack, the UI layer's buffer and the flags
//! that decide how it is shown.
//!
//! The UI never calls out. Anything the rest of the runtime has to react
//! to (a value change, a pop, the menu opening or closing) is queued as a
//! `UiEvent` and drained by the runtime after each input.

use std::collections::VecDeque;

use crate::error::Result;
use crate::fb::IndexedFb;
use crate::item::{ItemId, ItemKind, MenuItem};
use crate::keycodes::KeyCode;
use crate::nav::KeyRepeat;
use crate::platform::{CanvasState, FbLayer};
use crate::stack::{CursorHook, Dim, Level, MenuStack, PopHook};

pub const BG_COLOR: u8 = 0;
pub const FG_COLOR: u8 = 1;
pub const HILITE_COLOR: u8 = 2;
pub const BORDER_COLOR: u8 = 3;
pub const DISABLED_COLOR: u8 = 11;
pub const TRANSPARENT_COLOR: u8 = 16;

/// A snapshot of the item whose value changed or that was activated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Changed {
    pub level: usize,
    pub item: ItemId,
    pub id: i32,
    pub sub_id: i32,
    pub kind: ItemKind,
    pub value: i32,
    pub str_value: String,
}

impl Changed {
    pub fn of(level: usize, item: ItemId, it: &MenuItem) -> Self {
        Changed {
            level,
            item,
            id: it.id,
            sub_id: it.sub_id,
            kind: it.kind,
            value: it.value,
            str_value: it.str_value.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    Changed(Changed),
    CursorMoved { hook: CursorHook, cursor: i32 },
    Popped { off: Option<PopHook>, to: Option<PopHook> },
    /// The menu was switched on (true) or off.
    Toggled(bool),
}

pub struct Ui {
    pub stack: MenuStack,
    pub fb: IndexedFb,
    pub enabled: bool,
    pub osd_active: bool,
    pub transparent: bool,
    pub transparent_layer: Option<FbLayer>,
    pub render_current_only: bool,
    pub commodore_down: bool,
    pub commodore_key: KeyCode,
    pub(crate) shift: u8,
    pub(crate) repeat: KeyRepeat,
    events: VecDeque<UiEvent>,
}

impl Ui {
    /// Creates the UI with the main menu level already pushed.
    pub fn new(canvas: &CanvasState) -> Result<Self> {
        let mut stack = MenuStack::new();
        let root = stack.push(Dim::Center, Dim::Center, canvas)?;
        root.tag = crate::stack::LevelTag::Main;
        let skip = canvas.raster_skip.max(1);
        let fb = IndexedFb::new(
            canvas.left * 2 + canvas.border_w * 2 + canvas.gfx_w,
            (canvas.first_displayed_line * 2 + canvas.max_border_h * 2 + canvas.gfx_h) / skip,
        );
        Ok(Ui {
            stack,
            fb,
            enabled: false,
            osd_active: false,
            transparent: false,
            transparent_layer: None,
            render_current_only: false,
            commodore_down: false,
            commodore_key: KeyCode::LeftControl,
            shift: 0,
            repeat: KeyRepeat::default(),
            events: VecDeque::new(),
        })
    }

    pub(crate) fn emit(&mut self, ev: UiEvent) {
        self.events.push_back(ev);
    }

    pub fn next_event(&mut self) -> Option<UiEvent> {
        self.events.pop_front()
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Pushes a level. Use `Dim::Center` on both axes only for the main menu.
    pub fn push_menu(&mut self, w: impl Into<Dim>, h: impl Into<Dim>, canvas: &CanvasState) -> Result<&mut Level> {
        self.stack.push(w.into(), h.into(), canvas)
    }

    /// Pops the top level and queues its hooks.
    pub fn pop_menu(&mut self) -> Result<()> {
        let popped = self.stack.pop()?;
        let to = self.stack.current().and_then(|l| l.on_popped_to);
        if popped.on_popped_off.is_some() || to.is_some() {
            self.emit(UiEvent::Popped {
                off: popped.on_popped_off,
                to,
            });
        }
        Ok(())
    }

    pub fn pop_all(&mut self) {
        while self.stack.depth() > 1 {
            if self.pop_menu().is_err() {
                break;
            }
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        let on = self.enabled;
        self.emit(UiEvent::Toggled(on));
    }

    /// Leaves the menu in a known state (main menu only) and flips it.
    pub fn pop_all_and_toggle(&mut self) {
        self.pop_all();
        self.toggle();
    }

    pub fn current_level(&self) -> usize {
        self.stack.current_index()
    }

    pub fn current_item(&self) -> Option<(usize, ItemId, &MenuItem)> {
        let index = self.stack.current_index();
        let level = self.stack.current()?;
        let id = level.cursor_item?;
        Some((index, id, level.menu.get(id)?))
    }

    /// Item at `id` on the main menu.
    pub fn main_item(&self, id: ItemId) -> Option<&MenuItem> {
        self.stack.level(0)?.menu.get(id)
    }

    pub fn main_item_mut(&mut self, id: ItemId) -> Option<&mut MenuItem> {
        self.stack.level_mut(0)?.menu.get_mut(id)
    }

    /// Makes the background see-through and draws only the cursor row
    /// until the user moves off it, so an adjustment to `layer` can be
    /// watched live.
    pub fn canvas_reveal_temp(&mut self, layer: FbLayer, layer_showing: bool) {
        if layer_showing {
            self.transparent = true;
            self.transparent_layer = Some(layer);
            self.render_current_only = true;
        }
    }

    pub(crate) fn clear_reveal(&mut self) {
        self.transparent = false;
        self.transparent_layer = None;
        self.render_current_only = false;
    }

    /// Resizes the UI buffer to follow the VIC layer and re-centres the main
    /// menu. Returns true if the buffer was reallocated.
    pub fn geometry_changed(&mut self, fb_w: i32, fb_h: i32, canvas: &CanvasState) -> bool {
        let fb_h = fb_h / canvas.raster_skip.max(1);
        let resized = self.fb.resize(fb_w, fb_h);
        self.stack.reposition_root(canvas);
        resized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_queues_hooks() {
        let canvas = CanvasState::default();
        let mut ui = Ui::new(&canvas).unwrap();
        let lvl = ui.push_menu(30, 4, &canvas).unwrap();
        lvl.on_popped_off = Some(PopHook::DisableOsd);
        ui.pop_menu().unwrap();
        assert_eq!(
            ui.next_event(),
            Some(UiEvent::Popped {
                off: Some(PopHook::DisableOsd),
                to: None
            })
        );
        assert_eq!(ui.next_event(), None);
    }

    #[test]
    fn pop_all_and_toggle_leaves_main_menu() {
        let canvas = CanvasState::default();
        let mut ui = Ui::new(&canvas).unwrap();
        ui.push_menu(-1, -1, &canvas).unwrap();
        ui.push_menu(-1, -1, &canvas).unwrap();
        ui.pop_all_and_toggle();
        assert_eq!(ui.stack.depth(), 1);
        assert!(ui.enabled);
        assert_eq!(ui.next_event(), Some(UiEvent::Toggled(true)));
    }

    #[test]
    fn reveal_needs_a_showing_layer() {
        let canvas = CanvasState::default();
        let mut ui = Ui::new(&canvas).unwrap();
        ui.canvas_reveal_temp(FbLayer::Vdc, false);
        assert!(!ui.transparent);
        ui.canvas_reveal_temp(FbLayer::Vic, true);
        assert!(ui.transparent && ui.render_current_only);
        assert_eq!(ui.transparent_layer, Some(FbLayer::Vic));
    }
}
