//! Input configuration popups: USB gamepads, the raw data monitor, custom
//! key bindings, keysets and custom GPIO pins.

use log::debug;

use crate::error::Result;
use crate::ids::{self, ButtonFn, MAX_USB_AXES, MAX_USB_BUTTONS, NUM_BUTTON_ASSIGNMENTS, NUM_KEY_BINDINGS};
use crate::item::{ItemKind, Menu};
use crate::joy::{GamepadReport, InputConfig, KeysetSlot};
use crate::keycodes::{key_label, KeyCode};
use crate::platform::{CanvasState, GamepadInfo, MachineClass};
use crate::stack::{Level, LevelTag, PopHook};
use crate::ui::{Changed, Ui};

/// Where a key picked in the listener popup is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenTarget {
    KeyBinding(usize),
    Keyset(usize, KeysetSlot),
}

/// Shown as the button index being pressed rather than the bit mask.
fn button_index(buttons: i32) -> i32 {
    if buttons == 0 {
        -1
    } else {
        31 - (buttons as u32).leading_zeros() as i32
    }
}

fn button_choice_labels(input: &InputConfig) -> Vec<String> {
    (0..NUM_BUTTON_ASSIGNMENTS as i32)
        .filter_map(ButtonFn::from_i32)
        .map(|f| match f.custom_key_index() {
            Some(n) => format!("Key {} ({})", n + 1, key_name(input.key_bindings[n])),
            None => f.label().to_string(),
        })
        .collect()
}

fn key_name(code: KeyCode) -> String {
    crate::keycodes::keycode_to_keyname(code).unwrap_or_else(|| "None".into())
}

fn disabled_functions(machine: MachineClass) -> Vec<ButtonFn> {
    let mut out = Vec::new();
    if machine == MachineClass::Vic20 {
        out.push(ButtonFn::SwapPorts);
    }
    if !matches!(machine, MachineClass::C64 | MachineClass::C128) {
        out.push(ButtonFn::CartFreeze);
    }
    if machine != MachineClass::C128 {
        out.extend([
            ButtonFn::ActiveDisplay,
            ButtonFn::PipLocation,
            ButtonFn::PipSwap,
            ButtonFn::Column4080,
        ]);
    }
    if machine == MachineClass::Pet {
        out.push(ButtonFn::VkbdToggle);
    }
    out
}

fn add_function_choices(menu: &mut Menu, item: crate::item::ItemId, input: &InputConfig, machine: MachineClass) -> Result<()> {
    let labels = button_choice_labels(input);
    let it = menu.item_mut(item)?;
    it.choices = labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| crate::item::Choice {
            label,
            value: i as i32,
            disabled: false,
        })
        .collect();
    for f in disabled_functions(machine) {
        it.set_choice_disabled(f.as_i32() as usize, true);
    }
    Ok(())
}

fn usb_description(dev: usize, info: Option<GamepadInfo>) -> String {
    match info {
        Some(info) => format!("USB {}:DETECTED {} hats, {} axes", dev + 1, info.num_hats, info.num_axes),
        None => format!("USB {}:NOT DETECTED", dev + 1),
    }
}

/// Pushes the configuration popup of USB gamepad `dev`.
pub fn build_usb_menu(
    ui: &mut Ui,
    canvas: &CanvasState,
    input: &InputConfig,
    machine: MachineClass,
    dev: usize,
    info: Option<GamepadInfo>,
) -> Result<()> {
    let cfg = input.usb[dev];
    let offset = dev as i32;
    let level = ui.push_menu(-1, -1, canvas)?;
    level.tag = LevelTag::UsbConfig(dev);
    let root = level.root();
    let menu = &mut level.menu;

    menu.add_button(root, ids::TEXT, &usb_description(dev, info))?;
    menu.add_divider(root)?;
    menu.add_multiple_choice(
        root,
        ids::USB_0_PREF + offset,
        &format!("USB {} Directions", dev + 1),
        &["Analog+POTX/Y Buttons", "Hat+POTX/Y Buttons", "Hat+POTX/Y Paddles"],
        cfg.pref,
    )?;
    let max_axis = MAX_USB_AXES as i32 - 1;
    menu.add_range(
        root,
        ids::USB_0_X_AXIS + offset,
        &format!("USB {} Analog X #", dev + 1),
        0,
        max_axis,
        1,
        cfg.x_axis as i32,
    )?;
    menu.add_range(
        root,
        ids::USB_0_Y_AXIS + offset,
        &format!("USB {} Analog Y #", dev + 1),
        0,
        max_axis,
        1,
        cfg.y_axis as i32,
    )?;
    menu.add_range(
        root,
        ids::USB_0_X_THRESH + offset,
        &format!("USB {} Analog X Threshold %", dev + 1),
        10,
        90,
        1,
        (cfg.x_thresh * 100.0).round() as i32,
    )?;
    menu.add_range(
        root,
        ids::USB_0_Y_THRESH + offset,
        &format!("USB {} Analog Y Threshold %", dev + 1),
        10,
        90,
        1,
        (cfg.y_thresh * 100.0).round() as i32,
    )?;
    menu.add_button(root, ids::USB_0_WATCH_RAW + offset, &format!("Monitor Raw USB {} data...", dev + 1))?;

    let buttons = info.map_or(0, |i| i.num_buttons.min(MAX_USB_BUTTONS));
    for j in 0..buttons {
        let item = menu.add_multiple_choice(
            root,
            ids::USB_0_BTN_ASSIGN + offset,
            &format!("Button {} Function", j),
            &[],
            cfg.buttons[j].as_i32(),
        )?;
        add_function_choices(menu, item, input, machine)?;
        menu.item_mut(item)?.sub_id = j as i32;
    }

    menu.add_divider(root)?;
    let bindings = menu.add_button(root, ids::CONFIGURE_KEY_BINDINGS, "Define Key Bindings")?;
    menu.item_mut(bindings)?.value = offset;

    menu.add_divider(root)?;
    let pots = input.pots;
    menu.add_range(root, ids::POTX_HIGH, "POT X Up Value", 0, 255, 1, pots.x_high)?;
    menu.add_range(root, ids::POTX_LOW, "POT X Down Value", 0, 255, 1, pots.x_low)?;
    menu.add_range(root, ids::POTY_HIGH, "POT Y Up Value", 0, 255, 1, pots.y_high)?;
    menu.add_range(root, ids::POTY_LOW, "POT Y Down Value", 0, 255, 1, pots.y_low)?;
    ui.traverse();
    Ok(())
}

fn device_of(id: i32, base: i32) -> Option<usize> {
    let dev = id - base;
    (0..ids::MAX_USB_DEVICES as i32).contains(&dev).then_some(dev as usize)
}

/// Applies a change made in a gamepad popup. Returns false for ids it
/// does not own.
pub fn usb_value_changed(input: &mut InputConfig, ev: &Changed) -> bool {
    let id = ev.id;
    if let Some(dev) = device_of(id, ids::USB_0_PREF) {
        input.usb[dev].pref = ev.value;
    } else if let Some(dev) = device_of(id, ids::USB_0_X_AXIS) {
        input.usb[dev].x_axis = ev.value.max(0) as usize;
    } else if let Some(dev) = device_of(id, ids::USB_0_Y_AXIS) {
        input.usb[dev].y_axis = ev.value.max(0) as usize;
    } else if let Some(dev) = device_of(id, ids::USB_0_X_THRESH) {
        input.usb[dev].x_thresh = ev.value as f32 / 100.0;
    } else if let Some(dev) = device_of(id, ids::USB_0_Y_THRESH) {
        input.usb[dev].y_thresh = ev.value as f32 / 100.0;
    } else if let Some(dev) = device_of(id, ids::USB_0_BTN_ASSIGN) {
        let Some(slot) = usize::try_from(ev.sub_id).ok().filter(|&s| s < MAX_USB_BUTTONS) else {
            return true;
        };
        input.usb[dev].buttons[slot] = ButtonFn::from_i32(ev.value).unwrap_or(ButtonFn::Undef);
        debug!("usb {} button {} is now {}", dev, slot, input.usb[dev].buttons[slot]);
    } else {
        match id {
            ids::POTX_HIGH => input.pots.x_high = ev.value,
            ids::POTX_LOW => input.pots.x_low = ev.value,
            ids::POTY_HIGH => input.pots.y_high = ev.value,
            ids::POTY_LOW => input.pots.y_low = ev.value,
            _ => return false,
        }
    }
    true
}

/// Pushes the raw data monitor for `dev`. Popping it stops the feed.
pub fn build_raw_monitor(ui: &mut Ui, canvas: &CanvasState, dev: usize, info: Option<GamepadInfo>) -> Result<()> {
    let level = ui.push_menu(-1, -1, canvas)?;
    level.tag = LevelTag::UsbMonitor(dev);
    level.on_popped_off = Some(PopHook::StopRawUsb(dev));
    let root = level.root();
    let buttons = level.menu.add_button_with_value(root, ids::TEXT, "Button #", 0, "", "")?;
    level.menu.item_mut(buttons)?.map_value = Some(button_index);
    let info = info.unwrap_or_default();
    for i in 0..info.num_hats.min(ids::MAX_USB_HATS) {
        level.menu.add_button_with_value(root, ids::TEXT, &format!("Hat {}", i), 0, "", "")?;
    }
    for i in 0..info.num_axes.min(MAX_USB_AXES) {
        level.menu.add_button_with_value(root, ids::TEXT, &format!("Axis {}", i), 0, "", "")?;
    }
    ui.traverse();
    Ok(())
}

/// Copies a report into the monitor of `dev`, if it is open.
pub fn update_raw_monitor(ui: &mut Ui, dev: usize, report: &GamepadReport) -> bool {
    let Some(level) = ui.stack.current_mut().filter(|l| l.tag == LevelTag::UsbMonitor(dev)) else {
        return false;
    };
    let rows: Vec<_> = level.menu.children(level.menu.root()).to_vec();
    let mut rows = rows.into_iter();
    if let Some(item) = rows.next().and_then(|id| level.menu.get_mut(id)) {
        item.value = report.buttons as i32;
    }
    for id in rows {
        let Some(item) = level.menu.get_mut(id) else { continue };
        let value = if let Some(i) = item.name.strip_prefix("Hat ") {
            i.parse::<usize>().ok().and_then(|i| report.hats.get(i).copied())
        } else if let Some(i) = item.name.strip_prefix("Axis ") {
            i.parse::<usize>().ok().and_then(|i| report.axes.get(i)).map(|a| a.value)
        } else {
            None
        };
        if let Some(value) = value {
            item.value = value;
        }
    }
    true
}

/// Pushes the list of custom key bindings. Each row opens the key
/// listener; popping the list refreshes the gamepad popup under it.
pub fn build_key_bindings(ui: &mut Ui, canvas: &CanvasState, input: &InputConfig, dev: usize) -> Result<()> {
    let level = ui.push_menu(-1, -1, canvas)?;
    level.tag = LevelTag::KeyBindings(dev);
    level.on_popped_off = Some(PopHook::RefreshKeyBindings(dev));
    let root = level.root();
    for (n, code) in input.key_bindings.iter().enumerate() {
        let item = level.menu.add_button_with_value(
            root,
            ids::KEY_BINDING,
            &format!("Custom Key {}", n + 1),
            code.0,
            "",
            &key_label(*code),
        )?;
        let it = level.menu.item_mut(item)?;
        it.sub_id = n as i32;
        it.prefer_str = true;
    }
    ui.traverse();
    Ok(())
}

/// Pushes the seven slots of keyset `set`.
pub fn build_keyset_menu(ui: &mut Ui, canvas: &CanvasState, input: &InputConfig, set: usize) -> Result<()> {
    let level = ui.push_menu(-1, -1, canvas)?;
    level.tag = LevelTag::Keyset(set);
    let root = level.root();
    level.menu.add_button(root, ids::TEXT, &format!("Keyset {}", set + 1))?;
    level.menu.add_divider(root)?;
    for slot in KeysetSlot::ALL {
        let code = input.keysets[set][slot as usize];
        let item = level
            .menu
            .add_button_with_value(root, ids::KEYSET_KEY, slot.label(), code.0, "", &key_label(code))?;
        let it = level.menu.item_mut(item)?;
        it.sub_id = slot as i32;
        it.prefer_str = true;
    }
    ui.traverse();
    Ok(())
}

/// Pushes a small "press a key" popup. The caller arms the key router.
pub fn build_key_listener(ui: &mut Ui, canvas: &CanvasState) -> Result<()> {
    let level = ui.push_menu(24, 4, canvas)?;
    level.tag = LevelTag::KeyListener;
    let root = level.root();
    level.menu.add_button(root, ids::TEXT, "Press a key...")?;
    level.menu.add_button(root, ids::TEXT, "(Esc to cancel)")?;
    ui.traverse();
    Ok(())
}

/// Updates the key shown on the row of `level` carrying `id` and `sub_id`.
pub fn show_key(level: &mut Level, id: i32, sub_id: i32, code: KeyCode) {
    let Some(item) = level
        .menu
        .find_by_id_sub(id, sub_id)
        .and_then(|i| level.menu.get_mut(i))
    else {
        return;
    };
    item.value = code.0;
    item.displayed_value = key_label(code);
}

/// Rewrites the custom key labels of every button row in a gamepad popup.
pub fn refresh_key_bindings(level: &mut Level, input: &InputConfig) {
    let labels = button_choice_labels(input);
    let rows: Vec<_> = level.menu.children(level.menu.root()).to_vec();
    for id in rows {
        let Some(item) = level.menu.get_mut(id) else { continue };
        if item.kind != ItemKind::MultipleChoice || device_of(item.id, ids::USB_0_BTN_ASSIGN).is_none() {
            continue;
        }
        for n in 0..NUM_KEY_BINDINGS {
            let index = ButtonFn::CustomKey1.as_i32() as usize + n;
            if let (Some(choice), Some(label)) = (item.choices.get_mut(index), labels.get(index)) {
                choice.label = label.clone();
            }
        }
    }
}

/// Pushes one row per GPIO pin, each selecting the function it triggers.
pub fn build_gpio_menu(ui: &mut Ui, canvas: &CanvasState, input: &InputConfig, machine: MachineClass) -> Result<()> {
    let level = ui.push_menu(-1, -1, canvas)?;
    level.tag = LevelTag::Gpio;
    let root = level.root();
    for (pin, binding) in input.custom_gpio.iter().enumerate() {
        let value = (*binding).clamp(0, NUM_BUTTON_ASSIGNMENTS as i32 - 1);
        let item = level
            .menu
            .add_multiple_choice(root, ids::GPIO_PIN, &format!("GPIO{:02}", pin), &[], value)?;
        add_function_choices(&mut level.menu, item, input, machine)?;
        level.menu.item_mut(item)?.sub_id = pin as i32;
    }
    ui.traverse();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joy::Axis;
    use crate::ui::UiEvent;

    fn ui() -> (Ui, CanvasState) {
        let canvas = CanvasState::default();
        (Ui::new(&canvas).unwrap(), canvas)
    }

    fn pad() -> Option<GamepadInfo> {
        Some(GamepadInfo {
            num_buttons: 4,
            num_hats: 1,
            num_axes: 2,
        })
    }

    #[test]
    fn usb_menu_lists_detected_buttons() {
        let (mut ui, canvas) = ui();
        build_usb_menu(&mut ui, &canvas, &InputConfig::default(), MachineClass::C64, 1, pad()).unwrap();
        let level = ui.stack.current().unwrap();
        assert_eq!(level.tag, LevelTag::UsbConfig(1));
        let first = level.menu.children(level.root())[0];
        assert_eq!(level.menu.get(first).unwrap().name, "USB 2:DETECTED 1 hats, 2 axes");
        let b3 = level.menu.find_by_id_sub(ids::USB_0_BTN_ASSIGN + 1, 3).unwrap();
        let b3 = level.menu.get(b3).unwrap();
        assert_eq!(b3.choices.len(), NUM_BUTTON_ASSIGNMENTS);
        assert!(b3.choices[ButtonFn::PipSwap.as_i32() as usize].disabled);
        assert!(!b3.choices[ButtonFn::CartFreeze.as_i32() as usize].disabled);
        assert!(level.menu.find_by_id_sub(ids::USB_0_BTN_ASSIGN + 1, 4).is_none());
    }

    #[test]
    fn undetected_pad_has_no_button_rows() {
        let (mut ui, canvas) = ui();
        build_usb_menu(&mut ui, &canvas, &InputConfig::default(), MachineClass::Vic20, 0, None).unwrap();
        let level = ui.stack.current().unwrap();
        assert!(level.menu.find_by_id(ids::USB_0_BTN_ASSIGN).is_none());
    }

    #[test]
    fn value_changes_reach_the_config() {
        let mut input = InputConfig::default();
        let mut ev = Changed {
            level: 1,
            item: crate::item::ItemId(1),
            id: ids::USB_0_X_THRESH + 2,
            sub_id: 0,
            kind: ItemKind::Range,
            value: 25,
            str_value: String::new(),
        };
        assert!(usb_value_changed(&mut input, &ev));
        assert_eq!(input.usb[2].x_thresh, 0.25);

        ev.id = ids::USB_0_BTN_ASSIGN + 3;
        ev.sub_id = 7;
        ev.value = ButtonFn::Warp.as_i32();
        assert!(usb_value_changed(&mut input, &ev));
        assert_eq!(input.usb[3].buttons[7], ButtonFn::Warp);

        ev.id = ids::POTY_LOW;
        ev.value = 12;
        assert!(usb_value_changed(&mut input, &ev));
        assert_eq!(input.pots.y_low, 12);

        ev.id = ids::VOLUME;
        assert!(!usb_value_changed(&mut input, &ev));
    }

    #[test]
    fn raw_monitor_shows_report_values() {
        let (mut ui, canvas) = ui();
        build_raw_monitor(&mut ui, &canvas, 0, pad()).unwrap();
        let mut report = GamepadReport::default();
        report.buttons = 0b1000;
        report.hats[0] = 4;
        report.axes[1] = Axis {
            value: -300,
            minimum: -512,
            maximum: 511,
        };
        assert!(update_raw_monitor(&mut ui, 0, &report));
        assert!(!update_raw_monitor(&mut ui, 1, &report));
        let level = ui.stack.current().unwrap();
        let rows: Vec<_> = level.menu.children(level.root()).iter().map(|i| level.menu.get(*i).unwrap()).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(crate::render::value_text(rows[0]).unwrap(), "3");
        assert_eq!(rows[1].value, 4);
        assert_eq!(rows[3].value, -300);

        ui.pop_menu().unwrap();
        assert_eq!(
            ui.next_event(),
            Some(UiEvent::Popped {
                off: Some(PopHook::StopRawUsb(0)),
                to: None
            })
        );
    }

    #[test]
    fn button_index_is_log2() {
        assert_eq!(button_index(0), -1);
        assert_eq!(button_index(1), 0);
        assert_eq!(button_index(0x8000), 15);
    }

    #[test]
    fn bindings_refresh_button_choices() {
        let (mut ui, canvas) = ui();
        let mut input = InputConfig::default();
        build_usb_menu(&mut ui, &canvas, &input, MachineClass::C64, 0, pad()).unwrap();
        input.key_bindings[1] = KeyCode::Space;
        refresh_key_bindings(ui.stack.current_mut().unwrap(), &input);
        let level = ui.stack.current().unwrap();
        let b0 = level.menu.get(level.menu.find_by_id(ids::USB_0_BTN_ASSIGN).unwrap()).unwrap();
        assert_eq!(b0.choices[ButtonFn::CustomKey2.as_i32() as usize].label, "Key 2 (Space)");
    }

    #[test]
    fn keyset_rows_show_their_keys() {
        let (mut ui, canvas) = ui();
        let mut input = InputConfig::default();
        input.keysets[1][KeysetSlot::Fire as usize] = KeyCode::Space;
        build_keyset_menu(&mut ui, &canvas, &input, 1).unwrap();
        let level = ui.stack.current_mut().unwrap();
        let fire = level.menu.find_by_id_sub(ids::KEYSET_KEY, KeysetSlot::Fire as i32).unwrap();
        assert_eq!(level.menu.get(fire).unwrap().displayed_value, "Key 44 (Space)");
        show_key(level, ids::KEYSET_KEY, KeysetSlot::Up as i32, KeyCode::a);
        let up = level.menu.find_by_id_sub(ids::KEYSET_KEY, KeysetSlot::Up as i32).unwrap();
        assert_eq!(level.menu.get(up).unwrap().value, KeyCode::a.0);
    }

    #[test]
    fn gpio_menu_has_a_row_per_pin() {
        let (mut ui, canvas) = ui();
        let mut input = InputConfig::default();
        input.custom_gpio[5] = ButtonFn::Menu.as_i32();
        build_gpio_menu(&mut ui, &canvas, &input, MachineClass::C64).unwrap();
        let level = ui.stack.current().unwrap();
        assert_eq!(level.menu.children(level.root()).len(), ids::NUM_GPIO_PINS);
        let pin5 = level.menu.get(level.menu.find_by_id_sub(ids::GPIO_PIN, 5).unwrap()).unwrap();
        assert_eq!(pin5.choice_label(), "Menu");
    }
}
