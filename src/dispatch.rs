//! Routes a changed or activated item to the code that applies it.
//!
//! Handlers are plain functions registered against a menu id (or a block
//! of ids) once, when the runtime is built. The order every change goes
//! through is fixed: the drive unit is picked from the id first, then the
//! emulator gets a chance to claim the change, then the gamepad popups,
//! then the registry and last the file browser.

use std::collections::HashMap;
use std::ops::Range;

use log::debug;

use crate::actions;
use crate::browser::listing_for;
use crate::error::Result;
use crate::ids;
use crate::item::ItemKind;
use crate::platform::Host;
use crate::runtime::MenuRuntime;
use crate::ui::Changed;
use crate::usb;

pub type Handler<H> = fn(&mut MenuRuntime<H>, &Changed) -> Result<()>;

pub struct Dispatcher<H: Host> {
    handlers: HashMap<i32, Handler<H>>,
}

impl<H: Host> Default for Dispatcher<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> Dispatcher<H> {
    pub fn new() -> Self {
        Dispatcher {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, id: i32, handler: Handler<H>) {
        if self.handlers.insert(id, handler).is_some() {
            debug!("handler for menu id {} replaced", id);
        }
    }

    pub fn register_range(&mut self, ids: Range<i32>, handler: Handler<H>) {
        for id in ids {
            self.register(id, handler);
        }
    }

    pub fn get(&self, id: i32) -> Option<Handler<H>> {
        self.handlers.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Applies one value change or activation.
pub fn dispatch<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    if matches!(ev.kind, ItemKind::Folder | ItemKind::Divider) {
        return Ok(());
    }
    if let Some((_, unit)) = ids::unit_of(ev.id) {
        rt.unit = unit;
    }
    if rt.host.handle_menu_change(ev.id, ev.value) {
        debug!("menu id {} handled by the emulator", ev.id);
        return Ok(());
    }
    if usb::usb_value_changed(&mut rt.input, ev) {
        return Ok(());
    }
    if let Some(handler) = rt.handler(ev.id) {
        return handler(rt, ev);
    }
    if listing_for(ev.id).is_some() {
        return actions::files::file_event(rt, ev);
    }
    debug!("nothing to do for menu id {} (value {})", ev.id, ev.value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::NullHost;

    fn noop(_: &mut MenuRuntime<NullHost>, _: &Changed) -> Result<()> {
        Ok(())
    }

    #[test]
    fn ranges_register_every_id() {
        let mut d: Dispatcher<NullHost> = Dispatcher::new();
        d.register_range(ids::ATTACH_DISK..ids::ATTACH_DISK + 4, noop);
        assert_eq!(d.len(), 4);
        assert!(d.get(ids::ATTACH_DISK + 3).is_some());
        assert!(d.get(ids::ATTACH_DISK + 4).is_none());
    }

    #[test]
    fn full_registry_covers_main_menu_buttons() {
        let mut d: Dispatcher<NullHost> = Dispatcher::new();
        actions::register(&mut d);
        for id in [
            ids::SAVE_SETTINGS,
            ids::WARP_MODE,
            ids::ATTACH_DISK + 2,
            ids::H_STRETCH_1,
            ids::SHADER_BLOOM,
            ids::JOYSTICK_PORT_1 + 1,
            ids::TAPE_PLAY,
            ids::CONFIRM_OK,
        ] {
            assert!(d.get(id).is_some(), "no handler for {}", id);
        }
        // File ids are left to the browser fallback.
        assert!(d.get(ids::DISK_FILE).is_none());
    }
}
