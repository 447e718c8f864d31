use serde::Deserialize;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::Result;
use crate::platform::MachineClass;

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ConfigFile {
    /// Host directory standing in for the SD card.
    pub sd_root: Option<String>,
    /// Host directories for USB1..USB3.
    pub usb_roots: Option<Vec<String>>,
    pub machine: Option<String>,
    pub timing: Option<String>,
    /// Window scale of the desktop harness.
    pub scale: Option<u32>,
    pub log_filter: Option<String>,
}

impl ConfigFile {
    pub fn machine_class(&self) -> Result<MachineClass> {
        self.machine.as_deref().unwrap_or("c64").parse()
    }

    pub fn sd_root(&self) -> PathBuf {
        match &self.sd_root {
            Some(p) => expand_home(p),
            None => dirs::home_dir().unwrap_or_default().join("bmc64"),
        }
    }

    pub fn usb_roots(&self) -> Vec<PathBuf> {
        self.usb_roots
            .iter()
            .flatten()
            .take(3)
            .map(|p| expand_home(p))
            .collect()
    }

    pub fn timing(&self) -> &str {
        self.timing.as_deref().unwrap_or("PAL")
    }

    pub fn scale(&self) -> u32 {
        self.scale.unwrap_or(2).clamp(1, 8)
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or("info")
    }

    fn merge(&mut self, parsed: ConfigFile) {
        if parsed.sd_root.is_some() {
            self.sd_root = parsed.sd_root;
        }
        if parsed.usb_roots.is_some() {
            self.usb_roots = parsed.usb_roots;
        }
        if parsed.machine.is_some() {
            self.machine = parsed.machine;
        }
        if parsed.timing.is_some() {
            self.timing = parsed.timing;
        }
        if parsed.scale.is_some() {
            self.scale = parsed.scale;
        }
        if parsed.log_filter.is_some() {
            self.log_filter = parsed.log_filter;
        }
    }
}

fn expand_home(p: &str) -> PathBuf {
    match (p.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(p),
    }
}

pub fn user_config_path() -> Option<std::path::PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let mut p = PathBuf::from(xdg);
        p.push("bmc64_menu");
        p.push("config.toml");
        Some(p)
    } else if let Some(home) = dirs::home_dir() {
        let mut p = home;
        p.push(".config/bmc64_menu/config.toml");
        Some(p)
    } else {
        None
    }
}

fn write_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let sample = include_str!("../config.sample.toml");
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, sample.as_bytes())?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads the config at `path`, writing the sample there first if nothing
/// exists yet. Parse errors are returned so the caller can say so before
/// falling back.
pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let mut cfg = ConfigFile::default();
    if !path.exists() {
        if let Err(e) = write_default_config(path) {
            warn!("Failed to write default config: {}", e);
        }
    }
    if let Ok(contents) = std::fs::read_to_string(path) {
        let parsed = toml::from_str::<ConfigFile>(&contents)?;
        cfg.merge(parsed);
    }
    Ok(cfg)
}

pub fn load_config() -> ConfigFile {
    let Some(p) = user_config_path() else { return ConfigFile::default() };
    match load_config_from(&p) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Failed to parse config at {}: {}", p.display(), e);
            ConfigFile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MenuError;

    #[test]
    fn sample_config_parses() {
        let cfg: ConfigFile = toml::from_str(include_str!("../config.sample.toml")).unwrap();
        assert_eq!(cfg.machine_class().unwrap(), MachineClass::C64);
        assert_eq!(cfg.log_filter(), "info");
    }

    #[test]
    fn missing_config_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bmc64_menu").join("config.toml");
        let cfg = load_config_from(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());
        assert_eq!(cfg.timing(), "PAL");
    }

    #[test]
    fn absent_fields_keep_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "machine = \"vic20\"\nusb_roots = [\"/a\", \"/b\", \"/c\", \"/d\"]\n").unwrap();
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.machine_class().unwrap(), MachineClass::Vic20);
        assert_eq!(cfg.usb_roots().len(), 3);
        assert_eq!(cfg.scale(), 2);
    }

    #[test]
    fn bad_machine_and_bad_toml_are_errors() {
        let cfg = ConfigFile {
            machine: Some("amiga".into()),
            ..ConfigFile::default()
        };
        assert!(matches!(cfg.machine_class(), Err(MenuError::UnknownMachine(_))));

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "scale = \"big\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(MenuError::Config(_))));
    }
}
