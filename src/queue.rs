//! Interrupt to main loop handoff.
//!
//! Producers (keyboard, joystick and USB callbacks) only ever enqueue.
//! Consumers copy everything pending out while holding the lock and
//! process the copy after releasing it, so nothing dispatched from a
//! drained event runs with the lock held.
//!
//! The rings are masked, not bounded: a producer that laps the consumer
//! overwrites the oldest unread slots. Draining after an overrun yields the
//! newest `N` events in order.

use std::sync::{Mutex, MutexGuard};

use crate::ids::{ButtonFn, JoyDev};
use crate::keycodes::KeyCode;

pub const KEY_RING_SIZE: usize = 16;
pub const JOY_RING_SIZE: usize = 128;

/// Frames a toggle or quick function request waits before it is acted on.
pub const TOGGLE_DELAY_FRAMES: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PendingKey {
    pub code: KeyCode,
    pub pressed: bool,
}

/// How a joystick latch value combines with the port's current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JoyKind {
    #[default]
    And,
    Or,
    Absolute,
    PotX,
    PotY,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PendingJoy {
    pub kind: JoyKind,
    pub port: usize,
    pub device: JoyDev,
    pub value: u32,
}

#[derive(Debug)]
struct Ring<T, const N: usize> {
    slots: [T; N],
    head: u64,
    tail: u64,
}

impl<T: Copy + Default, const N: usize> Ring<T, N> {
    fn new() -> Self {
        Ring {
            slots: [T::default(); N],
            head: 0,
            tail: 0,
        }
    }

    fn push(&mut self, v: T) {
        self.slots[(self.tail % N as u64) as usize] = v;
        self.tail += 1;
    }

    fn drain_into(&mut self, out: &mut Vec<T>) {
        if self.tail - self.head > N as u64 {
            self.head = self.tail - N as u64;
        }
        while self.head < self.tail {
            out.push(self.slots[(self.head % N as u64) as usize]);
            self.head += 1;
        }
    }

    fn len(&self) -> usize {
        (self.tail - self.head).min(N as u64) as usize
    }
}

/// Everything guarded by the queue lock.
#[derive(Debug)]
pub struct QueueState {
    ui_keys: Ring<PendingKey, KEY_RING_SIZE>,
    emu_keys: Ring<PendingKey, KEY_RING_SIZE>,
    joy: Ring<PendingJoy, JOY_RING_SIZE>,
    toggle_pending: u8,
    quick_func_pending: u8,
    quick_func: Option<ButtonFn>,
}

impl QueueState {
    pub fn enqueue_ui_key_locked(&mut self, code: KeyCode, pressed: bool) {
        self.ui_keys.push(PendingKey { code, pressed });
    }

    pub fn enqueue_emu_key_locked(&mut self, code: KeyCode, pressed: bool) {
        self.emu_keys.push(PendingKey { code, pressed });
    }

    pub fn enqueue_joy_locked(&mut self, ev: PendingJoy) {
        self.joy.push(ev);
    }

    pub fn request_toggle_locked(&mut self) {
        self.toggle_pending = TOGGLE_DELAY_FRAMES;
    }

    pub fn request_quick_func_locked(&mut self, func: ButtonFn) {
        self.quick_func = Some(func);
        self.quick_func_pending = TOGGLE_DELAY_FRAMES;
    }
}

/// What a frame's countdown produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Countdown {
    pub toggle: bool,
    pub quick_func: Option<ButtonFn>,
}

#[derive(Debug)]
pub struct InputQueue {
    state: Mutex<QueueState>,
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InputQueue {
    pub fn new() -> Self {
        InputQueue {
            state: Mutex::new(QueueState {
                ui_keys: Ring::new(),
                emu_keys: Ring::new(),
                joy: Ring::new(),
                toggle_pending: 0,
                quick_func_pending: 0,
                quick_func: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // A panicking producer cannot leave the rings half written.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `f` with the lock held, for callers that enqueue several
    /// events at once.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut QueueState) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn enqueue_ui_key(&self, code: KeyCode, pressed: bool) {
        self.lock().enqueue_ui_key_locked(code, pressed);
    }

    pub fn enqueue_emu_key(&self, code: KeyCode, pressed: bool) {
        self.lock().enqueue_emu_key_locked(code, pressed);
    }

    pub fn enqueue_joy(&self, ev: PendingJoy) {
        self.lock().enqueue_joy_locked(ev);
    }

    pub fn request_toggle(&self) {
        self.lock().request_toggle_locked();
    }

    pub fn request_quick_func(&self, func: ButtonFn) {
        self.lock().request_quick_func_locked(func);
    }

    pub fn pending_ui_keys(&self) -> usize {
        self.lock().ui_keys.len()
    }

    pub fn drain_ui_keys(&self) -> Vec<PendingKey> {
        let mut out = Vec::with_capacity(KEY_RING_SIZE);
        self.lock().ui_keys.drain_into(&mut out);
        out
    }

    /// Emulator bound keys and joystick latches, in that order.
    pub fn drain_emu(&self) -> (Vec<PendingKey>, Vec<PendingJoy>) {
        let mut keys = Vec::with_capacity(KEY_RING_SIZE);
        let mut joys = Vec::new();
        let mut state = self.lock();
        state.emu_keys.drain_into(&mut keys);
        state.joy.drain_into(&mut joys);
        (keys, joys)
    }

    /// Advances the toggle countdown by one frame, or the quick function
    /// countdown when no toggle is pending. At most one of them fires.
    pub fn tick(&self) -> Countdown {
        let mut state = self.lock();
        let mut out = Countdown::default();
        if state.toggle_pending > 0 {
            state.toggle_pending -= 1;
            out.toggle = state.toggle_pending == 0;
        } else if state.quick_func_pending > 0 {
            state.quick_func_pending -= 1;
            if state.quick_func_pending == 0 {
                out.quick_func = state.quick_func.take();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_come_out_in_order() {
        let q = InputQueue::new();
        q.enqueue_ui_key(KeyCode::a, true);
        q.enqueue_ui_key(KeyCode::b, true);
        q.with_lock(|s| s.enqueue_ui_key_locked(KeyCode::c, false));
        let codes: Vec<_> = q.drain_ui_keys().iter().map(|k| k.code).collect();
        assert_eq!(codes, vec![KeyCode::a, KeyCode::b, KeyCode::c]);
        assert!(q.drain_ui_keys().is_empty());
    }

    #[test]
    fn overrun_keeps_newest() {
        let q = InputQueue::new();
        for i in 0..20 {
            q.enqueue_emu_key(KeyCode(i), true);
        }
        let (keys, joys) = q.drain_emu();
        assert!(joys.is_empty());
        assert_eq!(keys.len(), KEY_RING_SIZE);
        assert_eq!(keys[0].code, KeyCode(4));
        assert_eq!(keys[15].code, KeyCode(19));
    }

    #[test]
    fn toggle_waits_two_frames() {
        let q = InputQueue::new();
        q.request_toggle();
        assert!(!q.tick().toggle);
        assert!(q.tick().toggle);
        assert!(!q.tick().toggle);
    }

    #[test]
    fn quick_func_is_taken_once() {
        let q = InputQueue::new();
        q.request_quick_func(ButtonFn::Warp);
        assert_eq!(q.tick().quick_func, None);
        assert_eq!(q.tick().quick_func, Some(ButtonFn::Warp));
        assert_eq!(q.tick().quick_func, None);
    }

    #[test]
    fn toggle_holds_back_quick_func() {
        let q = InputQueue::new();
        q.request_toggle();
        q.request_quick_func(ButtonFn::Warp);
        let ticks: Vec<Countdown> = (0..5).map(|_| q.tick()).collect();
        assert!(ticks.iter().all(|t| !(t.toggle && t.quick_func.is_some())));
        assert!(ticks[1].toggle);
        assert_eq!(ticks[3].quick_func, Some(ButtonFn::Warp));
        assert_eq!(ticks.iter().filter(|t| t.quick_func.is_some()).count(), 1);
    }
}
