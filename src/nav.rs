//! Cursor movement and value editing on the top level.

use crate::item::{ItemKind, MAX_STR_VAL_LEN};
use crate::keycodes::KeyCode;
use crate::stack::MENU_HEIGHT_CHARS;
use crate::ui::{Changed, Ui, UiEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
    MiniLeft,
    MiniRight,
    Return,
    Escape,
    Exit,
}

pub const INITIAL_ACTION_DELAY: i32 = 24;
pub const INITIAL_ACTION_REPEAT_DELAY: i32 = 8;

/// Hold-to-repeat state for directional keys. Counted in frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyRepeat {
    pub action: Action,
    ticks: i32,
    ticks_next: i32,
    repeats: i32,
    repeats_next: i32,
}

impl KeyRepeat {
    fn start(&mut self, action: Action) {
        self.action = action;
        self.ticks = INITIAL_ACTION_DELAY;
        self.ticks_next = INITIAL_ACTION_REPEAT_DELAY;
        self.repeats = 0;
        self.repeats_next = 8;
    }

    /// Advances one frame and returns the action to repeat, if it is due.
    pub fn frame(&mut self) -> Option<Action> {
        if self.action == Action::None {
            return None;
        }
        self.ticks -= 1;
        if self.ticks > 0 {
            return None;
        }
        self.ticks = self.ticks_next;
        self.repeats += 1;
        if self.repeats >= self.repeats_next {
            self.repeats_next *= 4;
            self.ticks_next = (self.ticks_next / 2).max(2);
        }
        Some(self.action)
    }
}

/// Steps a choice index by `dir`, wrapping and skipping disabled choices.
/// Gives up on the original index if every other choice is disabled.
pub fn step_choice(disabled: &[bool], value: i32, dir: i32) -> i32 {
    let n = disabled.len() as i32;
    if n == 0 {
        return value;
    }
    let orig = value.rem_euclid(n);
    let mut v = (orig + dir).rem_euclid(n);
    while disabled[v as usize] && v != orig {
        v = (v + dir).rem_euclid(n);
    }
    v
}

impl Ui {
    fn notify_cursor(&mut self) {
        if let Some(level) = self.stack.current() {
            if let Some(hook) = level.cursor_listener {
                let cursor = level.cursor;
                self.emit(UiEvent::CursorMoved { hook, cursor });
            }
        }
    }

    fn notify_changed(&mut self) {
        if let Some((level, id, item)) = self.current_item() {
            let ev = Changed::of(level, id, item);
            self.emit(UiEvent::Changed(ev));
        }
    }

    /// Recomputes the row count and cursor item of the top level.
    pub fn traverse(&mut self) {
        let clamped = self.stack.current_mut().map_or(false, |l| l.traverse());
        if clamped {
            self.notify_cursor();
        }
    }

    pub fn action(&mut self, action: Action) {
        self.traverse();
        match action {
            Action::None => {}
            Action::Up => {
                let Some(level) = self.stack.current_mut() else { return };
                if level.cursor > 0 {
                    level.cursor -= 1;
                }
                if level.cursor < level.window_top {
                    level.window_top -= 1;
                    level.window_bottom -= 1;
                }
                self.traverse();
                self.notify_cursor();
            }
            Action::Down => {
                let Some(level) = self.stack.current_mut() else { return };
                if level.cursor < level.max_index - 1 {
                    level.cursor += 1;
                }
                if level.cursor >= level.window_bottom {
                    level.window_top += 1;
                    level.window_bottom += 1;
                }
                self.traverse();
                self.notify_cursor();
            }
            Action::Left | Action::MiniLeft | Action::Right | Action::MiniRight => {
                self.adjust(action);
            }
            Action::Return => self.activate(),
            Action::Escape => {
                if self.stack.depth() > 1 {
                    if self.osd_active {
                        self.pop_all_and_toggle();
                    } else {
                        let _ = self.pop_menu();
                        self.traverse();
                    }
                } else {
                    self.toggle();
                }
            }
            Action::Exit => self.pop_all_and_toggle(),
        }
    }

    /// Left/right on the item under the cursor. A Range step that would
    /// cross `min` or `max` stops on the bound. A change is reported only
    /// when the stored value moved, so a step that lands on the bound
    /// reports it once and further pushes against that bound stay silent.
    fn adjust(&mut self, action: Action) {
        let Some(level) = self.stack.current_mut() else { return };
        let Some(cur) = level.cursor_item.and_then(|id| level.menu.get_mut(id)) else {
            return;
        };
        if cur.disabled {
            return;
        }
        let sign = match action {
            Action::Left | Action::MiniLeft => -1,
            _ => 1,
        };
        let changed = match cur.kind {
            ItemKind::Range => {
                let delta = match action {
                    Action::MiniLeft | Action::MiniRight => cur.ministep,
                    _ => cur.step,
                };
                let before = cur.value;
                cur.value = (cur.value + sign * delta).clamp(cur.min, cur.max);
                // Pinned at a bound: nothing to report.
                cur.value != before
            }
            ItemKind::MultipleChoice => {
                let disabled: Vec<bool> = cur.choices.iter().map(|c| c.disabled).collect();
                cur.value = step_choice(&disabled, cur.value, sign);
                true
            }
            ItemKind::Toggle => {
                cur.value = 1 - cur.value;
                true
            }
            ItemKind::TextField => {
                let len = cur.str_value.len() as i32;
                cur.value = (cur.value + sign).clamp(0, len);
                false
            }
            _ => false,
        };
        if changed {
            self.notify_changed();
        }
    }

    fn activate(&mut self) {
        let Some(level) = self.stack.current_mut() else { return };
        let Some(cur) = level.cursor_item.and_then(|id| level.menu.get_mut(id)) else {
            return;
        };
        if cur.disabled {
            return;
        }
        match cur.kind {
            ItemKind::Folder => cur.is_expanded = !cur.is_expanded,
            ItemKind::Checkbox | ItemKind::Toggle => cur.value = 1 - cur.value,
            ItemKind::MultipleChoice => {
                let disabled: Vec<bool> = cur.choices.iter().map(|c| c.disabled).collect();
                cur.value = step_choice(&disabled, cur.value, 1);
            }
            ItemKind::Button | ItemKind::TextField => {}
            ItemKind::Range | ItemKind::Divider => return,
        }
        self.notify_changed();
        self.traverse();
    }

    /// Edits a focused text field, or jumps to the next item starting with
    /// `ch` otherwise. `\u{8}` is backspace.
    pub fn type_char(&mut self, ch: char) {
        self.traverse();
        let Some(level) = self.stack.current_mut() else { return };
        let cur = level.cursor_item.and_then(|id| level.menu.get_mut(id));
        match cur {
            Some(cur) if cur.kind == ItemKind::TextField => {
                let pos = (cur.value.max(0) as usize).min(cur.str_value.len());
                if ch == '\u{8}' {
                    if pos > 0 {
                        cur.str_value.remove(pos - 1);
                        cur.value = pos as i32 - 1;
                    }
                } else if ch.is_ascii() && !ch.is_ascii_control() && cur.str_value.len() < MAX_STR_VAL_LEN {
                    cur.str_value.insert(pos, ch);
                    cur.value = pos as i32 + 1;
                }
            }
            _ => {
                if ch != '\u{8}' {
                    self.find_first(ch.to_ascii_lowercase());
                }
            }
        }
    }

    /// Moves down (wrapping) to the next row whose name starts with
    /// `letter`, stopping if it comes back to where it started.
    pub fn find_first(&mut self, letter: char) {
        self.traverse();
        let Some(start) = self.stack.current().map(|l| l.cursor) else { return };
        loop {
            let (cursor, max) = match self.stack.current() {
                Some(l) => (l.cursor, l.max_index),
                None => return,
            };
            if cursor >= max - 1 {
                self.to_top();
            } else {
                self.action(Action::Down);
            }
            let Some((_, _, item)) = self.current_item() else { return };
            let first = item.name.chars().next().map(|c| c.to_ascii_lowercase());
            let cursor = self.stack.current().map_or(start, |l| l.cursor);
            if cursor == start || first == Some(letter) {
                break;
            }
        }
    }

    pub fn page_down(&mut self) {
        for _ in 0..MENU_HEIGHT_CHARS {
            self.action(Action::Down);
        }
    }

    pub fn page_up(&mut self) {
        for _ in 0..MENU_HEIGHT_CHARS {
            self.action(Action::Up);
        }
    }

    pub fn to_top(&mut self) {
        while self.stack.current().map_or(false, |l| l.cursor > 0) {
            self.action(Action::Up);
        }
    }

    pub fn to_bottom(&mut self) {
        self.traverse();
        while self
            .stack
            .current()
            .map_or(false, |l| l.cursor < l.max_index - 1)
        {
            self.action(Action::Down);
        }
    }

    /// Moves the cursor down to `pos`, for use right after a push.
    pub fn set_cur_pos(&mut self, pos: i32) {
        self.traverse();
        while self
            .stack
            .current()
            .map_or(false, |l| l.cursor < pos && l.cursor < l.max_index - 1)
        {
            self.action(Action::Down);
        }
    }

    pub fn key_pressed(&mut self, key: KeyCode) {
        // Only left/right keep a reveal alive; it belongs to the item the
        // user was on.
        if key != KeyCode::Left && key != KeyCode::Right {
            self.clear_reveal();
        }
        if key == self.commodore_key {
            self.commodore_down = true;
            return;
        }
        let action = match key {
            KeyCode::Up => Action::Up,
            KeyCode::Down => Action::Down,
            KeyCode::Left => Action::Left,
            KeyCode::Right => Action::Right,
            KeyCode::Comma => Action::MiniLeft,
            KeyCode::Period => Action::MiniRight,
            _ => Action::None,
        };
        if action != Action::None {
            self.repeat.start(action);
            self.action(action);
            return;
        }
        match key {
            KeyCode::Escape => return,
            KeyCode::LeftShift => {
                self.shift |= 1;
                return;
            }
            KeyCode::RightShift => {
                self.shift |= 2;
                return;
            }
            _ => {}
        }
        if let Some(c) = key.letter() {
            let c = if self.shift != 0 { c.to_ascii_uppercase() } else { c };
            self.type_char(c);
        } else if let Some(d) = key.digit() {
            self.type_char(d);
        } else if key == KeyCode::Dash {
            self.type_char(if self.shift != 0 { '_' } else { '-' });
        } else if key == KeyCode::Backspace {
            self.type_char('\u{8}');
        }
    }

    pub fn key_released(&mut self, key: KeyCode) {
        if key == self.commodore_key {
            self.commodore_down = false;
            return;
        }
        match key {
            KeyCode::Up
            | KeyCode::Down
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Comma
            | KeyCode::Period => self.repeat.action = Action::None,
            KeyCode::Return => self.action(Action::Return),
            KeyCode::Escape | KeyCode::BackQuote => self.action(Action::Escape),
            KeyCode::F12 => self.action(Action::Exit),
            // Function keys double as hotkeys with the Commodore key held.
            KeyCode::Home | KeyCode::F1 if !self.commodore_down => self.to_top(),
            KeyCode::End | KeyCode::F7 if !self.commodore_down => self.to_bottom(),
            KeyCode::PageUp | KeyCode::F3 if !self.commodore_down => self.page_up(),
            KeyCode::PageDown | KeyCode::F5 if !self.commodore_down => self.page_down(),
            KeyCode::LeftShift => self.shift &= !1,
            KeyCode::RightShift => self.shift &= !2,
            _ => {}
        }
    }

    /// Per-frame key repeat.
    pub fn action_frame(&mut self) {
        if let Some(action) = self.repeat.frame() {
            self.action(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::CanvasState;

    fn ui_with(build: impl FnOnce(&mut crate::item::Menu)) -> Ui {
        let mut ui = Ui::new(&CanvasState::default()).unwrap();
        build(&mut ui.stack.current_mut().unwrap().menu);
        ui.traverse();
        ui
    }

    fn changes(ui: &mut Ui) -> Vec<i32> {
        let mut out = Vec::new();
        while let Some(ev) = ui.next_event() {
            if let UiEvent::Changed(c) = ev {
                out.push(c.value);
            }
        }
        out
    }

    #[test]
    fn range_pinned_at_max_does_not_fire() {
        let mut ui = ui_with(|m| {
            let r = m.root();
            m.add_range(r, 1, "r", 0, 100, 10, 95).unwrap();
        });
        ui.action(Action::Right);
        assert_eq!(changes(&mut ui), vec![100]);
        ui.action(Action::Right);
        assert!(changes(&mut ui).is_empty());
        ui.action(Action::MiniLeft);
        assert_eq!(changes(&mut ui), vec![99]);
    }

    #[test]
    fn range_pinned_at_min_does_not_fire() {
        let mut ui = ui_with(|m| {
            let r = m.root();
            m.add_range(r, 1, "r", -20, 20, 15, -10).unwrap();
        });
        ui.action(Action::Left);
        assert_eq!(changes(&mut ui), vec![-20]);
        ui.action(Action::Left);
        ui.action(Action::MiniLeft);
        assert!(changes(&mut ui).is_empty());
        assert_eq!(ui.current_item().unwrap().2.value, -20);
    }

    #[test]
    fn choice_skips_disabled() {
        let mut ui = ui_with(|m| {
            let r = m.root();
            let c = m.add_multiple_choice(r, 1, "c", &["A", "B", "C"], 0).unwrap();
            m.get_mut(c).unwrap().choices[1].disabled = true;
        });
        ui.action(Action::Right);
        assert_eq!(changes(&mut ui), vec![2]);
        ui.action(Action::Right);
        assert_eq!(changes(&mut ui), vec![0]);
        ui.action(Action::Left);
        assert_eq!(changes(&mut ui), vec![2]);
    }

    #[test]
    fn step_choice_all_disabled_stays_put() {
        assert_eq!(step_choice(&[false, true, true], 0, 1), 0);
        assert_eq!(step_choice(&[true, false], 1, -1), 1);
    }

    #[test]
    fn folder_return_expands_in_place() {
        let mut ui = ui_with(|m| {
            let r = m.root();
            let f = m.add_folder(r, "f").unwrap();
            m.add_button(f, 1, "inner").unwrap();
        });
        assert_eq!(ui.stack.current().unwrap().max_index, 1);
        ui.action(Action::Return);
        assert_eq!(ui.stack.current().unwrap().max_index, 2);
        assert_eq!(ui.stack.depth(), 1);
    }

    #[test]
    fn window_follows_cursor() {
        let mut ui = ui_with(|m| {
            let r = m.root();
            for i in 0..40 {
                m.add_button(r, i, &format!("item {}", i)).unwrap();
            }
        });
        ui.to_bottom();
        let l = ui.stack.current().unwrap();
        assert_eq!(l.cursor, 39);
        assert_eq!(l.window_bottom, 40);
        assert_eq!(l.window_bottom - l.window_top, MENU_HEIGHT_CHARS);
        ui.to_top();
        let l = ui.stack.current().unwrap();
        assert_eq!((l.cursor, l.window_top), (0, 0));
    }

    #[test]
    fn text_field_editing() {
        let mut ui = ui_with(|m| {
            let r = m.root();
            m.add_text_field(r, 1, "Name", "ab").unwrap();
        });
        ui.key_pressed(KeyCode::c);
        ui.key_pressed(KeyCode::Left);
        ui.key_pressed(KeyCode::Backspace);
        let (_, _, item) = ui.current_item().unwrap();
        assert_eq!(item.str_value, "ac");
        assert_eq!(item.value, 1);
    }

    #[test]
    fn text_field_keeps_to_ascii() {
        let mut ui = ui_with(|m| {
            let r = m.root();
            m.add_text_field(r, 1, "Name", "n\u{e9}\u{20ac}").unwrap();
        });
        assert_eq!(ui.current_item().unwrap().2.str_value, "n??");
        ui.key_pressed(KeyCode::Left);
        ui.type_char('\u{8}');
        ui.type_char('\u{e9}');
        ui.type_char('x');
        let (_, _, item) = ui.current_item().unwrap();
        assert_eq!(item.str_value, "nx?");
        assert_eq!(item.value, 2);
    }

    #[test]
    fn letter_jumps_to_matching_item() {
        let mut ui = ui_with(|m| {
            let r = m.root();
            for name in ["apple", "banana", "cherry", "blueberry"] {
                m.add_button(r, 0, name).unwrap();
            }
        });
        ui.key_pressed(KeyCode::b);
        assert_eq!(ui.stack.current().unwrap().cursor, 1);
        ui.key_pressed(KeyCode::b);
        assert_eq!(ui.stack.current().unwrap().cursor, 3);
        ui.key_pressed(KeyCode::z);
        assert_eq!(ui.stack.current().unwrap().cursor, 3);
    }

    #[test]
    fn repeat_accelerates() {
        let mut r = KeyRepeat::default();
        r.start(Action::Down);
        let mut fired = Vec::new();
        for frame in 0..200 {
            if r.frame().is_some() {
                fired.push(frame);
            }
        }
        assert_eq!(fired[0], 23);
        assert_eq!(fired[1] - fired[0], 8);
        assert_eq!(fired[9] - fired[8], 4);
    }

    #[test]
    fn escape_on_main_menu_toggles_off() {
        let mut ui = ui_with(|_| {});
        ui.enabled = true;
        ui.key_released(KeyCode::Escape);
        assert!(!ui.enabled);
        assert_eq!(ui.next_event(), Some(UiEvent::Toggled(false)));
    }
}
