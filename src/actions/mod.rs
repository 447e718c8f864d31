//! Handlers behind the menu ids, grouped by the part of the machine they
//! drive. Each module registers its own ids.

use crate::dispatch::Dispatcher;
use crate::platform::Host;

pub mod files;
pub mod input;
pub mod media;
pub mod osd;
pub mod prefs;
pub mod video;

pub fn register<H: Host>(d: &mut Dispatcher<H>) {
    files::register(d);
    media::register(d);
    video::register(d);
    input::register(d);
    prefs::register(d);
    osd::register(d);
}
