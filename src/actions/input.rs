//! Joystick ports, hotkeys and the popups that configure gamepads, keysets,
//! custom key bindings and GPIO pins.

use log::{debug, info};

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::ids::{self, ButtonFn, JoyDev, JOY_PORT_CHOICES, MAX_USB_DEVICES};
use crate::joy::KeysetSlot;
use crate::keycodes::KeyCode;
use crate::platform::Host;
use crate::runtime::MenuRuntime;
use crate::stack::LevelTag;
use crate::ui::Changed;
use crate::usb::{self, ListenTarget};

pub fn register<H: Host>(d: &mut Dispatcher<H>) {
    d.register_range(ids::HOTKEY_CF1..ids::HOTKEY_CF1 + 8, hotkey_changed);
    d.register(ids::SWAP_JOYSTICKS, swap_pressed);
    d.register_range(ids::JOYSTICK_PORT_1..ids::JOYSTICK_PORT_1 + ids::MAX_JOY_PORTS as i32, port_changed);
    d.register_range(ids::USB_0_CONFIGURE..ids::USB_0_CONFIGURE + MAX_USB_DEVICES as i32, configure_usb);
    d.register_range(ids::USB_0_WATCH_RAW..ids::USB_0_WATCH_RAW + MAX_USB_DEVICES as i32, watch_raw);
    d.register(ids::CONFIGURE_KEY_BINDINGS, configure_key_bindings);
    d.register(ids::KEY_BINDING, listen_for_binding);
    d.register(ids::CONFIGURE_KEYSET1, configure_keyset);
    d.register(ids::CONFIGURE_KEYSET2, configure_keyset);
    d.register(ids::KEYSET_KEY, listen_for_keyset);
    d.register(ids::GPIO_CONFIG, gpio_config_changed);
    d.register(ids::CONFIGURE_GPIO, configure_gpio);
    d.register(ids::GPIO_PIN, gpio_pin_changed);
}

/// Backing value of the choice a multiple choice item currently shows.
pub(crate) fn choice_value<H: Host>(rt: &MenuRuntime<H>, ev: &Changed) -> i32 {
    rt.ui
        .stack
        .level(ev.level)
        .and_then(|l| l.menu.get(ev.item))
        .map_or(ev.value, |it| it.choice_value())
}

fn hotkey_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let slot = (ev.id - ids::HOTKEY_CF1) as usize;
    let function = ButtonFn::from_i32(choice_value(rt, ev)).unwrap_or(ButtonFn::Undef);
    debug!("hotkey {} is now {}", slot, function);
    rt.keys.set_hotkey(slot, function);
    Ok(())
}

/// Choice index of `dev` in a port item.
pub fn port_choice(dev: JoyDev) -> i32 {
    JOY_PORT_CHOICES.iter().position(|(_, d)| *d == dev).unwrap_or(0) as i32
}

/// Pushes the device of every port into its item and the emulator.
pub fn sync_ports<H: Host>(rt: &mut MenuRuntime<H>) {
    for port in 0..rt.handles.ports.len() {
        let dev = rt.input.ports[port];
        let item = rt.handles.ports[port];
        rt.set_value(item, port_choice(dev));
        rt.host.set_joy_port_device(port, dev);
    }
}

/// Swaps the devices of ports 1 and 2. A mouse cannot follow the swap.
pub fn swap_ports<H: Host>(rt: &mut MenuRuntime<H>) {
    if rt.handles.ports.len() < 2 {
        return;
    }
    for port in rt.input.swap_ports() {
        info!("mouse removed from port {} by the swap", port + 1);
    }
    sync_ports(rt);
    let now = rt.now();
    let swapped = rt.input.joyswap;
    rt.overlay.joyswap_changed(now, swapped);
}

fn swap_pressed<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    swap_ports(rt);
    Ok(())
}

fn port_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let port = (ev.id - ids::JOYSTICK_PORT_1) as usize;
    let dev = JoyDev::from_i32(choice_value(rt, ev)).unwrap_or(JoyDev::None);
    // Only one port can have the mouse.
    if dev == JoyDev::Mouse {
        for other in 0..rt.handles.ports.len() {
            if other != port && rt.input.ports[other] == JoyDev::Mouse {
                rt.input.ports[other] = JoyDev::None;
                let item = rt.handles.ports[other];
                rt.set_value(item, port_choice(JoyDev::None));
                rt.host.set_joy_port_device(other, JoyDev::None);
            }
        }
    }
    if let Some(slot) = rt.input.ports.get_mut(port) {
        *slot = dev;
    }
    rt.host.set_joy_port_device(port, dev);
    Ok(())
}

fn configure_usb<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let dev = (ev.id - ids::USB_0_CONFIGURE) as usize;
    let canvas = rt.canvas();
    let gamepad = rt.host.gamepad_info(dev);
    let machine = rt.machine();
    usb::build_usb_menu(&mut rt.ui, &canvas, &rt.input, machine, dev, gamepad)
}

fn watch_raw<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let dev = (ev.id - ids::USB_0_WATCH_RAW) as usize;
    let canvas = rt.canvas();
    let gamepad = rt.host.gamepad_info(dev);
    usb::build_raw_monitor(&mut rt.ui, &canvas, dev, gamepad)?;
    rt.raw_usb = Some(dev);
    Ok(())
}

fn configure_key_bindings<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let canvas = rt.canvas();
    usb::build_key_bindings(&mut rt.ui, &canvas, &rt.input, ev.value.max(0) as usize)
}

fn listen<H: Host>(rt: &mut MenuRuntime<H>, target: ListenTarget) -> Result<()> {
    let canvas = rt.canvas();
    usb::build_key_listener(&mut rt.ui, &canvas)?;
    rt.listen = Some(target);
    rt.keys.raw_listener = true;
    Ok(())
}

fn listen_for_binding<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let n = ev.sub_id.max(0) as usize;
    if n >= rt.input.key_bindings.len() {
        return Ok(());
    }
    listen(rt, ListenTarget::KeyBinding(n))
}

fn listen_for_keyset<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let set = match rt.ui.stack.level(ev.level).map(|l| l.tag) {
        Some(LevelTag::Keyset(set)) => set,
        _ => return Ok(()),
    };
    let Some(slot) = usize::try_from(ev.sub_id).ok().and_then(|s| KeysetSlot::ALL.get(s).copied()) else {
        return Ok(());
    };
    listen(rt, ListenTarget::Keyset(set, slot))
}

/// Stores the key the listener popup was waiting for. Escape cancels.
pub fn key_listened<H: Host>(rt: &mut MenuRuntime<H>, code: KeyCode) -> Result<()> {
    rt.keys.raw_listener = false;
    let Some(target) = rt.listen.take() else { return Ok(()) };
    if rt.ui.stack.current().map(|l| l.tag) == Some(LevelTag::KeyListener) {
        rt.ui.pop_menu()?;
    }
    if code == KeyCode::Escape {
        return Ok(());
    }
    let (id, sub_id) = match target {
        ListenTarget::KeyBinding(n) => {
            rt.input.key_bindings[n] = code;
            (ids::KEY_BINDING, n as i32)
        }
        ListenTarget::Keyset(set, slot) => {
            rt.input.keysets[set][slot as usize] = code;
            (ids::KEYSET_KEY, slot as i32)
        }
    };
    debug!("{:?} bound to key {}", target, code.0);
    if let Some(level) = rt.ui.stack.current_mut() {
        usb::show_key(level, id, sub_id, code);
    }
    Ok(())
}

fn configure_keyset<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let set = if ev.id == ids::CONFIGURE_KEYSET1 { 0 } else { 1 };
    let canvas = rt.canvas();
    usb::build_keyset_menu(&mut rt.ui, &canvas, &rt.input, set)
}

fn gpio_config_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    let config = choice_value(rt, ev);
    info!("gpio config {}", config);
    rt.host.reset_gpio(config);
    Ok(())
}

fn configure_gpio<H: Host>(rt: &mut MenuRuntime<H>, _: &Changed) -> Result<()> {
    let canvas = rt.canvas();
    let machine = rt.machine();
    usb::build_gpio_menu(&mut rt.ui, &canvas, &rt.input, machine)
}

fn gpio_pin_changed<H: Host>(rt: &mut MenuRuntime<H>, ev: &Changed) -> Result<()> {
    if let Some(pin) = usize::try_from(ev.sub_id).ok().and_then(|p| rt.input.custom_gpio.get_mut(p)) {
        *pin = ev.value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_choices_find_their_devices() {
        assert_eq!(port_choice(JoyDev::None), 0);
        assert_eq!(port_choice(JoyDev::Mouse), ids::JOY_CHOICE_MOUSE as i32);
        assert_eq!(port_choice(JoyDev::Usb3), 13);
    }
}
