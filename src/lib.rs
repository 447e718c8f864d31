//! Menu and overlay runtime for an emulated Commodore machine: a
//! hierarchical on-screen menu, a status bar, a virtual keyboard, file
//! browsing and the input plumbing from keyboards, gamepads and GPIO
//! joysticks into the emulator core.

pub mod actions;
pub mod browser;
pub mod config;
pub mod dialog;
pub mod dispatch;
pub mod error;
pub mod fb;
pub mod font;
pub mod ids;
pub mod item;
pub mod joy;
pub mod kbd;
pub mod keycodes;
pub mod menu;
pub mod nav;
pub mod overlay;
pub mod platform;
pub mod queue;
pub mod render;
pub mod runtime;
pub mod settings;
pub mod stack;
pub mod style;
pub mod ui;
pub mod usb;
pub mod vkbd;

pub use error::{MenuError, Result};
pub use platform::{Emulator, Host, MachineClass, NullHost, Platform};
pub use runtime::MenuRuntime;
