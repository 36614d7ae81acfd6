use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_true() -> bool {
    true
}
fn default_week_grid_days() -> u32 {
    7
}
fn default_list_limit() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub show_fertility_window: bool,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_fertility_window: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitConfig {
    /// Days shown in the completion grid on the stats screen.
    #[serde(default = "default_week_grid_days")]
    pub week_grid_days: u32,
}

impl HabitConfig {
    /// Grid length clamped to a year so date arithmetic stays in range.
    pub fn grid_days(&self) -> i64 {
        self.week_grid_days.clamp(1, 366) as i64
    }
}

impl Default for HabitConfig {
    fn default() -> Self {
        Self {
            week_grid_days: default_week_grid_days(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_list_limit")]
    pub default_list_limit: u32,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_list_limit: default_list_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub habits: HabitConfig,
    #[serde(default)]
    pub journal: JournalConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "bloom")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("bloom.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.cycle.show_fertility_window);
        assert_eq!(config.habits.week_grid_days, 7);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cycle]\nshow_fertility_window = false\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.cycle.enabled);
        assert!(!config.cycle.show_fertility_window);
        assert_eq!(config.journal.default_list_limit, 10);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.journal.enabled = false;
        config.habits.week_grid_days = 14;
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn oversized_grid_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[habits]\nweek_grid_days = 4294967295\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.habits.grid_days(), 366);

        let mut config = AppConfig::default();
        config.habits.week_grid_days = 0;
        assert_eq!(config.habits.grid_days(), 1);
    }

    #[test]
    fn bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cycle\nenabled = yes").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
