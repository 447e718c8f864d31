use proptest::prelude::*;

use bmc64_menu::ids::ButtonFn;
use bmc64_menu::item::Menu;
use bmc64_menu::keycodes::KeyCode;
use bmc64_menu::nav::{step_choice, Action};
use bmc64_menu::platform::CanvasState;
use bmc64_menu::queue::{InputQueue, KEY_RING_SIZE};
use bmc64_menu::stack::MENU_HEIGHT_CHARS;
use bmc64_menu::ui::{Ui, UiEvent};

fn ui_with(build: impl FnOnce(&mut Menu)) -> Ui {
    let mut ui = Ui::new(&CanvasState::default()).unwrap();
    build(&mut ui.stack.current_mut().unwrap().menu);
    ui.traverse();
    ui
}

fn changed_values(ui: &mut Ui) -> Vec<i32> {
    let mut out = Vec::new();
    while let Some(ev) = ui.next_event() {
        if let UiEvent::Changed(c) = ev {
            out.push(c.value);
        }
    }
    out
}

fn adjust_action() -> impl Strategy<Value = Action> {
    prop::sample::select(vec![Action::Left, Action::Right, Action::MiniLeft, Action::MiniRight])
}

#[derive(Clone, Copy, Debug)]
enum Move {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
    Goto(i32),
    Find(char),
    /// Return on the cursor row; opens or closes a folder.
    Activate,
}

fn moves() -> impl Strategy<Value = Move> {
    prop_oneof![
        Just(Move::Up),
        Just(Move::Down),
        Just(Move::PageUp),
        Just(Move::PageDown),
        Just(Move::Top),
        Just(Move::Bottom),
        (0..120i32).prop_map(Move::Goto),
        prop::sample::select(vec!['a', 'b', 'q', 'z']).prop_map(Move::Find),
        Just(Move::Activate),
    ]
}

proptest! {
    #[test]
    fn range_stays_within_bounds(
        min in -200i32..200,
        span in 1i32..300,
        step in 1i32..60,
        start in 0i32..300,
        actions in prop::collection::vec(adjust_action(), 1..40),
    ) {
        let max = min + span;
        let start = min + start % (span + 1);
        let mut ui = ui_with(|m| {
            let r = m.root();
            m.add_range(r, 1, "range", min, max, step, start).unwrap();
        });
        let mut last = start;
        for a in actions {
            ui.action(a);
            let value = ui.current_item().unwrap().2.value;
            prop_assert!(value >= min && value <= max);
            let changes = changed_values(&mut ui);
            if value == last {
                prop_assert!(changes.is_empty());
            } else {
                prop_assert_eq!(changes, vec![value]);
            }
            last = value;
        }
    }

    #[test]
    fn multiple_choice_never_lands_on_a_disabled_choice(
        disabled in prop::collection::vec(any::<bool>(), 2..10),
        start in 0usize..10,
        actions in prop::collection::vec(prop::sample::select(vec![Action::Left, Action::Right]), 1..30),
    ) {
        let n = disabled.len();
        let start = start % n;
        let labels: Vec<String> = (0..n).map(|i| format!("c{}", i)).collect();
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        let mut ui = ui_with(|m| {
            let r = m.root();
            let id = m.add_multiple_choice(r, 1, "choice", &labels, start as i32).unwrap();
            let item = m.item_mut(id).unwrap();
            for (i, d) in disabled.iter().enumerate() {
                item.set_choice_disabled(i, *d);
            }
        });
        let others_enabled = disabled.iter().enumerate().any(|(i, d)| i != start && !d);
        let mut current = start;
        for a in actions {
            ui.action(a);
            let value = ui.current_item().unwrap().2.value as usize;
            prop_assert!(value < n);
            // Only a choice with nowhere else to go may stay disabled.
            prop_assert!(!disabled[value] || value == current);
            if !others_enabled {
                prop_assert_eq!(value, start);
            }
            current = value;
        }
    }

    #[test]
    fn step_choice_wraps_in_both_directions(n in 1usize..12, value in -30i32..30, dir in prop::sample::select(vec![-1i32, 1])) {
        let disabled = vec![false; n];
        let next = step_choice(&disabled, value, dir);
        prop_assert!(next >= 0 && (next as usize) < n);
        prop_assert_eq!(next, (value + dir).rem_euclid(n as i32));
    }

    #[test]
    fn cursor_stays_inside_the_window(
        rows in prop::collection::vec(prop::option::of(0usize..30), 0..60),
        script in prop::collection::vec(moves(), 1..60),
    ) {
        // `None` is a button, `Some(n)` a folder holding `n` buttons.
        let mut ui = ui_with(|m| {
            let r = m.root();
            for (i, row) in rows.iter().enumerate() {
                let name = format!("{}{}", ["alpha", "beta", "quux"][i % 3], i);
                match row {
                    None => {
                        m.add_button(r, 1000 + i as i32, &name).unwrap();
                    }
                    Some(n) => {
                        let folder = m.add_folder(r, &name).unwrap();
                        for j in 0..*n {
                            m.add_button(folder, 5000 + j as i32, &format!("b{}", j)).unwrap();
                        }
                    }
                }
            }
        });
        let height = {
            let level = ui.stack.current().unwrap();
            level.window_bottom - level.window_top
        };
        prop_assert_eq!(height, MENU_HEIGHT_CHARS);
        for mv in script {
            match mv {
                Move::Up => ui.action(Action::Up),
                Move::Down => ui.action(Action::Down),
                Move::PageUp => ui.page_up(),
                Move::PageDown => ui.page_down(),
                Move::Top => ui.to_top(),
                Move::Bottom => ui.to_bottom(),
                Move::Goto(pos) => ui.set_cur_pos(pos),
                Move::Find(c) => ui.find_first(c),
                Move::Activate => ui.action(Action::Return),
            }
            while ui.next_event().is_some() {}
            let level = ui.stack.current().unwrap();
            prop_assert_eq!(level.window_bottom - level.window_top, height);
            prop_assert!(level.window_top <= level.cursor);
            prop_assert!(level.cursor < level.window_bottom);
            prop_assert!(level.cursor < (level.max_index).max(1));
            prop_assert!(level.cursor >= 0);
            prop_assert_eq!(level.max_index as usize, level.menu.visible().len());
        }
    }

    #[test]
    fn key_queue_is_fifo_across_wraps(batches in prop::collection::vec(0usize..=KEY_RING_SIZE, 1..20)) {
        let q = InputQueue::new();
        let mut next = 0i32;
        for size in batches {
            let sent: Vec<(KeyCode, bool)> = (0..size)
                .map(|i| {
                    next += 1;
                    (KeyCode(next % 200), i % 2 == 0)
                })
                .collect();
            for &(code, pressed) in &sent {
                q.enqueue_ui_key(code, pressed);
            }
            let got: Vec<(KeyCode, bool)> = q.drain_ui_keys().iter().map(|k| (k.code, k.pressed)).collect();
            prop_assert_eq!(got, sent);
        }
    }

    #[test]
    fn key_queue_overrun_keeps_the_newest(extra in 1usize..40) {
        let q = InputQueue::new();
        let total = KEY_RING_SIZE + extra;
        for i in 0..total {
            q.enqueue_emu_key(KeyCode(i as i32), true);
        }
        let (keys, _) = q.drain_emu();
        let codes: Vec<i32> = keys.iter().map(|k| k.code.0).collect();
        let expected: Vec<i32> = (extra..total).map(|i| i as i32).collect();
        prop_assert_eq!(codes, expected);
    }

    #[test]
    fn quick_function_fires_once(extra_ticks in 0usize..5) {
        let q = InputQueue::new();
        q.request_quick_func(ButtonFn::SwapPorts);
        let mut fired = 0;
        for _ in 0..2 + extra_ticks {
            if q.tick().quick_func.is_some() {
                fired += 1;
            }
        }
        prop_assert_eq!(fired, 1);
    }
}
