//! Error, info and confirmation popups, and the OSD switch that lets a
//! popup show over running emulation.

use log::{debug, warn};

use crate::error::Result;
use crate::ids;
use crate::platform::{CanvasState, FbLayer, Platform};
use crate::stack::{LevelTag, PopHook};
use crate::ui::Ui;

/// Width of wrapped confirmation text, in characters.
pub const WRAP_COLUMNS: usize = 30;
const MAX_TEXT: usize = 512;

/// Shows the UI layer over the emulated display without pausing it.
pub fn enable_osd<P: Platform + ?Sized>(ui: &mut Ui, host: &mut P) {
    ui.osd_active = true;
    ui.enabled = true;
    ui.make_transparent();
    host.frames_ready_fbl(FbLayer::Ui, &ui.fb);
    host.show_fbl(FbLayer::Ui);
}

/// Hides the UI layer. The caller decides whether the menu stays enabled.
pub fn disable_osd<P: Platform + ?Sized>(ui: &mut Ui, host: &mut P) {
    ui.osd_active = false;
    host.hide_fbl(FbLayer::Ui);
}

pub fn dismiss_osd_if_active<P: Platform + ?Sized>(ui: &mut Ui, host: &mut P) {
    if ui.osd_active {
        ui.pop_all_and_toggle();
        disable_osd(ui, host);
    }
}

/// Draws every level and hands the frame over at once. Used when a popup
/// appears while nothing else is painting the UI layer.
pub fn render_single_frame<P: Platform + ?Sized>(ui: &mut Ui, host: &mut P) {
    ui.render_all(None);
    host.frames_ready_fbl(FbLayer::Ui, &ui.fb);
}

fn message<P: Platform + ?Sized>(
    ui: &mut Ui,
    host: &mut P,
    canvas: &CanvasState,
    is_error: bool,
    text: &str,
) -> Result<()> {
    // Layer info would only clutter a message.
    ui.transparent_layer = None;
    let osd = !ui.enabled;
    let level = ui.push_menu(30, 4, canvas)?;
    level.tag = LevelTag::Dialog;
    let root = level.root();
    if is_error {
        level.menu.add_button(root, ids::ERROR_DIALOG, "Error")?;
    } else {
        level.menu.add_button(root, ids::INFO_DIALOG, "Info")?;
    }
    level.menu.add_divider(root)?;
    level.menu.add_button(root, ids::TEXT, text)?;
    if osd {
        level.on_popped_off = Some(PopHook::DisableOsd);
        enable_osd(ui, host);
    }
    ui.traverse();
    render_single_frame(ui, host);
    Ok(())
}

pub fn error<P: Platform + ?Sized>(ui: &mut Ui, host: &mut P, canvas: &CanvasState, text: &str) -> Result<()> {
    warn!("error dialog: {}", text);
    message(ui, host, canvas, true, text)
}

pub fn info<P: Platform + ?Sized>(ui: &mut Ui, host: &mut P, canvas: &CanvasState, text: &str) -> Result<()> {
    debug!("info dialog: {}", text);
    message(ui, host, canvas, false, text)
}

/// Breaks `text` on spaces into lines shorter than `columns`. Every word
/// keeps a trailing space, and input past 512 bytes is dropped.
pub fn wrap_words(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut used = 0;
    for word in text.split(' ').filter(|w| !w.is_empty()) {
        if used + word.len() >= MAX_TEXT {
            continue;
        }
        if line.len() + word.len() < columns {
            line.push_str(word);
            line.push(' ');
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line.push(' ');
        }
        used += word.len() + 1;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// A titled 30x10 popup of wrapped text. With a continuation, OK carries
/// `ok_value` and `ok_id` (as its sub id) back to the dispatcher.
pub fn confirm_wrapped<P: Platform + ?Sized>(
    ui: &mut Ui,
    host: &mut P,
    canvas: &CanvasState,
    title: &str,
    text: &str,
    continuation: Option<(i32, i32)>,
) -> Result<()> {
    let level = ui.push_menu(30, 10, canvas)?;
    level.tag = LevelTag::Confirm;
    let root = level.root();
    level.menu.add_button(root, ids::ERROR_DIALOG, title)?;
    if let Some((ok_value, ok_id)) = continuation {
        let ok = level.menu.add_button(root, ids::CONFIRM_OK, "OK")?;
        let item = level.menu.item_mut(ok)?;
        item.value = ok_value;
        item.sub_id = ok_id;
        level.menu.add_button(root, ids::CONFIRM_CANCEL, "CANCEL")?;
    }
    level.menu.add_divider(root)?;
    for line in wrap_words(text, WRAP_COLUMNS) {
        level.menu.add_button(root, ids::INFO_DIALOG, &line)?;
    }
    ui.traverse();
    render_single_frame(ui, host);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MachineClass, NullHost};
    use crate::ui::UiEvent;

    fn setup() -> (Ui, NullHost, CanvasState) {
        let canvas = CanvasState::default();
        (Ui::new(&canvas).unwrap(), NullHost::new(MachineClass::C64), canvas)
    }

    #[test]
    fn wrap_keeps_lines_short() {
        let lines = wrap_words("the quick brown fox jumps over the lazy dog again and again", 30);
        assert_eq!(lines[0], "the quick brown fox jumps ");
        assert!(lines.iter().all(|l| l.len() <= 30));
        assert_eq!(lines.concat().split_whitespace().count(), 12);
    }

    #[test]
    fn error_over_paused_menu_is_a_plain_popup() {
        let (mut ui, mut host, canvas) = setup();
        ui.enabled = true;
        error(&mut ui, &mut host, &canvas, "Failed to attach disk image").unwrap();
        assert_eq!(ui.stack.depth(), 2);
        assert!(!ui.osd_active);
        let level = ui.stack.current().unwrap();
        assert_eq!(level.tag, LevelTag::Dialog);
        assert_eq!(level.on_popped_off, None);
        assert_eq!(host.frames, 1);
    }

    #[test]
    fn error_while_emulating_becomes_an_osd() {
        let (mut ui, mut host, canvas) = setup();
        info(&mut ui, &mut host, &canvas, "Saving...").unwrap();
        assert!(ui.osd_active && ui.enabled);
        assert!(host.called("show_fbl Ui"));
        ui.pop_menu().unwrap();
        assert_eq!(
            ui.next_event(),
            Some(UiEvent::Popped {
                off: Some(PopHook::DisableOsd),
                to: None
            })
        );
    }

    #[test]
    fn confirm_carries_the_continuation() {
        let (mut ui, mut host, canvas) = setup();
        confirm_wrapped(&mut ui, &mut host, &canvas, "Reset", "Are you sure?", Some((16, 3))).unwrap();
        let level = ui.stack.current().unwrap();
        let ok = level.menu.find_by_id(ids::CONFIRM_OK).unwrap();
        let ok = level.menu.get(ok).unwrap();
        assert_eq!((ok.value, ok.sub_id), (16, 3));
        assert!(level.menu.find_by_id(ids::CONFIRM_CANCEL).is_some());
    }

    #[test]
    fn dismiss_only_acts_on_an_osd() {
        let (mut ui, mut host, canvas) = setup();
        dismiss_osd_if_active(&mut ui, &mut host);
        assert!(!host.called("hide_fbl"));
        info(&mut ui, &mut host, &canvas, "Starting...").unwrap();
        dismiss_osd_if_active(&mut ui, &mut host);
        assert_eq!(ui.stack.depth(), 1);
        assert!(!ui.osd_active);
        assert!(host.called("hide_fbl Ui"));
    }
}
