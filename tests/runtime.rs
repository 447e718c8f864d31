use bmc64_menu::ids::{ButtonFn, JoyDev};
use bmc64_menu::keycodes::KeyCode;
use bmc64_menu::overlay::{OverlayPolicy, TapeControl};
use bmc64_menu::platform::{CanvasState, TICKS_PER_SECOND};
use bmc64_menu::settings;
use bmc64_menu::{MachineClass, MenuRuntime, NullHost};

fn runtime_in(dir: &std::path::Path, machine: MachineClass) -> MenuRuntime<NullHost> {
    MenuRuntime::new(NullHost::new(machine), dir, &[], "PAL").unwrap()
}

fn tap(rt: &mut MenuRuntime<NullHost>, code: KeyCode) {
    rt.key_pressed(code);
    rt.key_released(code);
}

fn frames(rt: &mut MenuRuntime<NullHost>, n: usize) {
    for _ in 0..n {
        rt.frame();
    }
}

#[test]
fn f12_opens_and_closes_the_menu() {
    let dir = tempfile::tempdir().unwrap();
    let mut rt = runtime_in(dir.path(), MachineClass::C64);
    assert!(!rt.menu_showing());

    tap(&mut rt, KeyCode::F12);
    frames(&mut rt, 2);
    assert!(rt.menu_showing());
    assert!(rt.host.called("key 69 false"));
    assert!(rt.host.called("show_fbl Ui"));

    let drawn = rt.host.frames;
    frames(&mut rt, 1);
    assert!(rt.host.frames > drawn);

    tap(&mut rt, KeyCode::F12);
    frames(&mut rt, 1);
    assert!(!rt.menu_showing());
    assert!(rt.host.called("hide_fbl Ui"));
}

#[test]
fn menu_hotkey_closes_back_to_the_main_menu() {
    let dir = tempfile::tempdir().unwrap();
    let mut rt = runtime_in(dir.path(), MachineClass::C64);
    tap(&mut rt, KeyCode::F12);
    frames(&mut rt, 2);
    assert!(rt.menu_showing());

    rt.ui.push_menu(-1, -1, &CanvasState::default()).unwrap();
    assert_eq!(rt.ui.stack.depth(), 2);

    rt.key_pressed(KeyCode::LeftControl);
    tap(&mut rt, KeyCode::F7);
    rt.key_released(KeyCode::LeftControl);
    frames(&mut rt, 3);
    assert!(!rt.menu_showing());
    assert_eq!(rt.ui.stack.depth(), 1);

    tap(&mut rt, KeyCode::F12);
    frames(&mut rt, 2);
    assert!(rt.menu_showing());
    assert_eq!(rt.ui.stack.depth(), 1);
}

#[test]
fn warp_hotkey_runs_as_a_quick_function() {
    let dir = tempfile::tempdir().unwrap();
    let mut rt = runtime_in(dir.path(), MachineClass::C64);
    rt.keys.set_hotkey(0, ButtonFn::Warp);

    rt.key_pressed(KeyCode::LeftControl);
    tap(&mut rt, KeyCode::F1);
    rt.key_released(KeyCode::LeftControl);
    frames(&mut rt, 2);

    assert!(rt.host.warp);
    assert_eq!(rt.value(rt.handles.warp), 1);
    assert!(!rt.menu_showing());
}

#[test]
fn keyboard_joystick_reaches_the_core() {
    let dir = tempfile::tempdir().unwrap();
    let mut rt = runtime_in(dir.path(), MachineClass::C64);
    rt.input.ports[1] = JoyDev::CursSp;

    rt.key_pressed(KeyCode::Space);
    frames(&mut rt, 1);
    assert!(rt.host.called("joy "));
    assert!(!rt.host.called("key 44"));
}

#[test]
fn settings_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut rt = runtime_in(dir.path(), MachineClass::C64);
        let volume = rt.handles.volume;
        rt.set_value(volume, 40);
        rt.save_settings().unwrap();
    }
    assert!(dir.path().join(settings::file_name(MachineClass::C64)).exists());

    let rt = runtime_in(dir.path(), MachineClass::C64);
    assert_eq!(rt.value(rt.handles.volume), 40);
    assert!(rt.host.called("set_volume 40"));
}

#[test]
fn settings_file_only_touches_what_it_names() {
    let dir = tempfile::tempdir().unwrap();
    let fresh = runtime_in(dir.path(), MachineClass::C64);
    let overlay = fresh.value(fresh.handles.overlay);
    drop(fresh);

    std::fs::write(
        dir.path().join(settings::file_name(MachineClass::C64)),
        "volume=30\nnot_a_setting=1\n",
    )
    .unwrap();
    let rt = runtime_in(dir.path(), MachineClass::C64);
    assert_eq!(rt.value(rt.handles.volume), 30);
    assert_eq!(rt.value(rt.handles.overlay), overlay);
}

#[test]
fn reset_osd_resets_and_goes_away() {
    let dir = tempfile::tempdir().unwrap();
    let mut rt = runtime_in(dir.path(), MachineClass::C64);

    rt.quick_func(ButtonFn::ResetMenu).unwrap();
    assert!(rt.ui.osd_active);
    assert_eq!(rt.ui.stack.depth(), 2);

    tap(&mut rt, KeyCode::Return);
    frames(&mut rt, 1);

    assert!(rt.host.called("reset soft"));
    assert!(!rt.ui.osd_active);
    assert!(!rt.menu_showing());
    assert_eq!(rt.ui.stack.depth(), 1);
}

#[test]
fn confirmed_hard_reset_asks_first() {
    let dir = tempfile::tempdir().unwrap();
    let mut rt = runtime_in(dir.path(), MachineClass::C64);
    let confirm = rt.handles.reset_confirm;
    rt.set_value(confirm, 1);

    rt.quick_func(ButtonFn::ResetHard).unwrap();
    assert!(rt.ui.osd_active);
    assert!(!rt.host.called("reset hard"));

    tap(&mut rt, KeyCode::Down);
    tap(&mut rt, KeyCode::Return);
    frames(&mut rt, 1);
    assert!(rt.host.called("reset hard"));
    assert!(!rt.ui.osd_active);
}

#[test]
fn osd_is_not_shown_over_the_menu() {
    let dir = tempfile::tempdir().unwrap();
    let mut rt = runtime_in(dir.path(), MachineClass::C64);
    tap(&mut rt, KeyCode::F12);
    frames(&mut rt, 2);
    assert!(rt.menu_showing());

    rt.quick_func(ButtonFn::TapeMenu).unwrap();
    assert!(!rt.ui.osd_active);
    assert_eq!(rt.ui.stack.depth(), 1);
}

#[test]
fn drive_activity_shows_the_status_bar_until_it_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let mut rt = runtime_in(dir.path(), MachineClass::C64);
    rt.overlay.set_policy(OverlayPolicy::OnActivity);
    rt.host.now = 10 * TICKS_PER_SECOND;
    frames(&mut rt, 1);
    assert!(!rt.overlay.showing());

    let start = rt.host.calls.len();
    rt.drive_led_changed(0, 1000, true);
    frames(&mut rt, 1);
    assert!(rt.overlay.showing());
    assert!(rt.host.calls[start..].iter().any(|c| c.starts_with("show_fbl Status")));

    rt.host.now += 4 * TICKS_PER_SECOND;
    rt.tape_control_changed(TapeControl::Play);
    rt.tape_counter_changed(12);
    rt.host.now += 4 * TICKS_PER_SECOND;
    frames(&mut rt, 1);
    assert!(rt.overlay.showing());

    rt.host.now += TICKS_PER_SECOND;
    frames(&mut rt, 1);
    assert!(!rt.overlay.showing());
    assert!(rt.host.calls[start..].iter().any(|c| c.starts_with("hide_fbl Status")));
}
