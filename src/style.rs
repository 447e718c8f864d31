use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;

use log::warn;

use crate::overlay::{self, StatusOverlay};
use crate::ui::{BG_COLOR, BORDER_COLOR, DISABLED_COLOR, FG_COLOR, HILITE_COLOR, TRANSPARENT_COLOR};

/// Entries in the UI layer's palette. The last one is transparent.
pub const UI_COLORS: usize = TRANSPARENT_COLOR as usize + 1;

// C64 colours, with the menu's own entries moved to the front.
const DEFAULT_UI_PALETTE: [u32; UI_COLORS] = [
    0xFF352879, 0xFF6C5EB5, 0xFFFFFFFF, 0xFF6C5EB5, 0xFF000000, 0xFF588D43, 0xFF68372B,
    0xFF70A4B2, 0xFF6F3D86, 0xFFB8C76F, 0xFF6F4F25, 0xFF444444, 0xFF433900, 0xFF9A6759,
    0xFF9AD284, 0xFF959595, 0x00000000,
];

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleConfig {
    pub menu_bg: Option<[u8; 3]>,
    pub menu_fg: Option<[u8; 3]>,
    pub menu_hilite: Option<[u8; 3]>,
    pub menu_border: Option<[u8; 3]>,
    pub menu_disabled: Option<[u8; 3]>,
    pub status_bg: Option<[u8; 3]>,
    pub status_fg: Option<[u8; 3]>,
    pub vkbd_fg: Option<[u8; 3]>,
    pub vkbd_bg: Option<[u8; 3]>,
}

fn argb(rgb: [u8; 3]) -> u32 {
    0xFF00_0000 | (u32::from(rgb[0]) << 16) | (u32::from(rgb[1]) << 8) | u32::from(rgb[2])
}

impl StyleConfig {
    /// The UI layer palette with the overrides applied.
    pub fn ui_palette(&self) -> [u32; UI_COLORS] {
        let mut p = DEFAULT_UI_PALETTE;
        for (index, rgb) in [
            (BG_COLOR, self.menu_bg),
            (FG_COLOR, self.menu_fg),
            (HILITE_COLOR, self.menu_hilite),
            (BORDER_COLOR, self.menu_border),
            (DISABLED_COLOR, self.menu_disabled),
        ] {
            if let Some(rgb) = rgb {
                p[index as usize] = argb(rgb);
            }
        }
        p
    }

    /// Overrides the status bar colours. Takes effect on the next `init`.
    pub fn apply_to_overlay(&self, status: &mut StatusOverlay) {
        for (index, rgb) in [
            (overlay::BG_COLOR, self.status_bg),
            (overlay::FG_COLOR, self.status_fg),
            (overlay::VKBD_FG_COLOR, self.vkbd_fg),
            (overlay::VKBD_BG_COLOR, self.vkbd_bg),
        ] {
            if let Some(rgb) = rgb {
                status.set_color(index, argb(rgb));
            }
        }
    }

    fn merge(&mut self, parsed: StyleConfig) {
        if parsed.menu_bg.is_some() {
            self.menu_bg = parsed.menu_bg;
        }
        if parsed.menu_fg.is_some() {
            self.menu_fg = parsed.menu_fg;
        }
        if parsed.menu_hilite.is_some() {
            self.menu_hilite = parsed.menu_hilite;
        }
        if parsed.menu_border.is_some() {
            self.menu_border = parsed.menu_border;
        }
        if parsed.menu_disabled.is_some() {
            self.menu_disabled = parsed.menu_disabled;
        }
        if parsed.status_bg.is_some() {
            self.status_bg = parsed.status_bg;
        }
        if parsed.status_fg.is_some() {
            self.status_fg = parsed.status_fg;
        }
        if parsed.vkbd_fg.is_some() {
            self.vkbd_fg = parsed.vkbd_fg;
        }
        if parsed.vkbd_bg.is_some() {
            self.vkbd_bg = parsed.vkbd_bg;
        }
    }
}

pub fn user_style_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let mut p = PathBuf::from(xdg);
        p.push("bmc64_menu");
        p.push("style.toml");
        Some(p)
    } else if let Some(home) = dirs::home_dir() {
        let mut p = home;
        p.push(".config/bmc64_menu/style.toml");
        Some(p)
    } else {
        None
    }
}

fn write_default_style(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let sample = include_str!("../style.sample.toml");
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, sample.as_bytes())?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads the style at `path`, creating it from the sample first if it is
/// missing. Anything unreadable leaves the defaults in place.
pub fn load_style_from(path: &Path) -> StyleConfig {
    let mut s = StyleConfig::default();
    if !path.exists() {
        if let Err(e) = write_default_style(path) {
            warn!("Failed to write default style: {}", e);
        }
    }
    if let Ok(contents) = std::fs::read_to_string(path) {
        match toml::from_str::<StyleConfig>(&contents) {
            Ok(parsed) => s.merge(parsed),
            Err(e) => warn!("Failed to parse style at {}: {}", path.display(), e),
        }
    }
    s
}

pub fn load_style() -> StyleConfig {
    match user_style_path() {
        Some(p) => load_style_from(&p),
        None => StyleConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_their_entry() {
        let style = StyleConfig {
            menu_hilite: Some([0x12, 0x34, 0x56]),
            ..StyleConfig::default()
        };
        let p = style.ui_palette();
        assert_eq!(p[HILITE_COLOR as usize], 0xFF123456);
        assert_eq!(p[BG_COLOR as usize], DEFAULT_UI_PALETTE[BG_COLOR as usize]);
        assert_eq!(p[TRANSPARENT_COLOR as usize] >> 24, 0);
    }

    #[test]
    fn missing_style_is_created_from_the_sample() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bmc64_menu").join("style.toml");
        let style = load_style_from(&path);
        assert!(path.exists());
        let sample: StyleConfig = toml::from_str(include_str!("../style.sample.toml")).unwrap();
        assert_eq!(style, sample);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("style.toml");
        std::fs::write(&path, "status_fg = [1, 2, 3]\n").unwrap();
        let style = load_style_from(&path);
        assert_eq!(style.status_fg, Some([1, 2, 3]));
        assert_eq!(style.menu_bg, None);
    }
}
