use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_FRAMES: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Raw value of input port 0 (active low).
    pub port0: u16,
    /// Raw value of input port 1, before the EEPROM bit is OR'd in.
    pub port1: u16,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            port0: 0xFFFF,
            port1: 0xFFFF,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Short name of the game, e.g. `esprade`.
    pub game: Option<String>,
    pub nvram_dir: Option<PathBuf>,
    pub frames: usize,
    pub inputs: InputConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            game: None,
            nvram_dir: None,
            frames: DEFAULT_FRAMES,
            inputs: InputConfig::default(),
        }
    }
}

fn config_root() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(appdata).join("cave-emu"));
        }
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg).join("cave-emu"));
    }

    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join("cave-emu"))
}

pub fn default_config_path() -> PathBuf {
    config_root()
        .map(|root| root.join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// NVRAM files live next to the config unless overridden.
pub fn default_nvram_dir() -> PathBuf {
    config_root()
        .map(|root| root.join("nvram"))
        .unwrap_or_else(|| PathBuf::from("nvram"))
}

pub fn load_from_file(path: &Path) -> CliConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return CliConfig::default(),
    };

    match toml::from_str::<CliConfig>(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse config {}: {e}; using defaults",
                path.display()
            );
            CliConfig::default()
        }
    }
}

pub fn save_to_file(path: &Path, cfg: &CliConfig) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let text = toml::to_string_pretty(cfg).map_err(std::io::Error::other)?;
    std::fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let cfg: CliConfig = toml::from_str(
            r#"
            game = "guwange"

            [inputs]
            port1 = 0xFF7F
            "#,
        )
        .unwrap();
        assert_eq!(cfg.game.as_deref(), Some("guwange"));
        assert_eq!(cfg.frames, DEFAULT_FRAMES);
        assert_eq!(cfg.inputs.port0, 0xFFFF);
        assert_eq!(cfg.inputs.port1, 0xFF7F);
        assert!(cfg.nvram_dir.is_none());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let cfg = load_from_file(&dir.path().join("absent.toml"));
        assert_eq!(cfg, CliConfig::default());
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "frames = \"lots\"").unwrap();
        assert_eq!(load_from_file(&path), CliConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let cfg = CliConfig {
            game: Some("ddonpach".into()),
            nvram_dir: Some(dir.path().join("nv")),
            frames: 600,
            inputs: InputConfig {
                port0: 0xFFFE,
                port1: 0xFFFF,
            },
        };
        save_to_file(&path, &cfg).unwrap();
        assert_eq!(load_from_file(&path), cfg);
    }

    #[test]
    fn nvram_dir_defaults_next_to_config() {
        let nvram = default_nvram_dir();
        let config = default_config_path();
        assert_eq!(nvram.file_name(), Some(std::ffi::OsStr::new("nvram")));
        assert_eq!(config.file_name(), Some(std::ffi::OsStr::new("config.toml")));
        assert_eq!(nvram.parent(), config.parent());
    }
}
