use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const ENV_CONFIG_PATH: &str = "BASS_SPECTRUM_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Capture,
    Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ui_fps: u32,
    pub source: SourceKind,
    /// Substring of the input device name to prefer; empty picks automatically.
    pub device: String,
    pub background: String,
    pub bar_color: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ui_fps: 60,
            source: SourceKind::Capture,
            device: String::new(),
            background: "#1b1825".to_string(),
            bar_color: "#ffffff".to_string(),
        }
    }
}

impl Config {
    /// Loads the user config, writing the defaults out on first run.
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            let config = Self::default();
            if let Err(e) = config.save_to(&path) {
                log::debug!("could not write default config to {}: {e:#}", path.display());
            }
            return Ok(config);
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
        match toml::from_str(&raw) {
            Ok(config) => Ok(config),
            Err(e) => {
                log::warn!("ignoring unparsable config {}: {e}", path.display());
                Ok(Self::default())
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create config dir: {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("write config: {}", path.display()))?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        if let Some(p) = std::env::var_os(ENV_CONFIG_PATH) {
            return PathBuf::from(p);
        }
        // Linux: ~/.config/bass-spectrum, macOS: ~/Library/Application Support/bass-spectrum
        BaseDirs::new()
            .map(|d| d.config_dir().join("bass-spectrum").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("bass-spectrum.toml"))
    }

    pub fn preferred_device(&self) -> Option<&str> {
        let name = self.device.trim();
        (!name.is_empty()).then_some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            ui_fps: 30,
            source: SourceKind::Tone,
            device: "Monitor".to_string(),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "source = \"tone\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.source, SourceKind::Tone);
        assert_eq!(config.ui_fps, 60);
        assert_eq!(config.background, "#1b1825");
        assert_eq!(config.preferred_device(), None);
    }

    #[test]
    fn garbage_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "ui_fps = [not toml").unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn blank_device_means_automatic() {
        let mut config = Config::default();
        config.device = "   ".to_string();
        assert_eq!(config.preferred_device(), None);
        config.device = " USB Loopback ".to_string();
        assert_eq!(config.preferred_device(), Some("USB Loopback"));
    }
}
