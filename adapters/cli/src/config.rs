use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_COLUMNS: u32 = 40;
const DEFAULT_ROWS: u32 = 30;
const DEFAULT_AGENTS: u32 = 10;
const DEFAULT_TICKS: u64 = 600;
const DEFAULT_TICK_RATE: u32 = 60;
const DEFAULT_VIEWPORT: [f32; 2] = [800.0, 600.0];

/// Failures raised while loading or validating run settings.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("viewport must be at least 1x1 pixels (received {width}x{height})")]
    Viewport { width: f32, height: f32 },
}

/// Contents of an `evacsim.toml` file. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) columns: Option<u32>,
    pub(crate) rows: Option<u32>,
    pub(crate) seed: Option<u64>,
    pub(crate) agents: Option<u32>,
    pub(crate) ticks: Option<u64>,
    pub(crate) tick_rate: Option<u32>,
    pub(crate) viewport: Option<[f32; 2]>,
}

impl FileConfig {
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

/// Fully resolved settings for a headless run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) seed: u64,
    pub(crate) agents: u32,
    pub(crate) ticks: u64,
    pub(crate) tick_rate: u32,
    pub(crate) viewport: [f32; 2],
}

impl Settings {
    /// Layers `overrides` on top of `file`, then fills the gaps with defaults.
    pub(crate) fn resolve(file: FileConfig, overrides: FileConfig) -> Result<Self, ConfigError> {
        let settings = Self {
            columns: overrides.columns.or(file.columns).unwrap_or(DEFAULT_COLUMNS),
            rows: overrides.rows.or(file.rows).unwrap_or(DEFAULT_ROWS),
            seed: overrides.seed.or(file.seed).unwrap_or_else(clock_seed),
            agents: overrides.agents.or(file.agents).unwrap_or(DEFAULT_AGENTS),
            ticks: overrides.ticks.or(file.ticks).unwrap_or(DEFAULT_TICKS),
            tick_rate: overrides
                .tick_rate
                .or(file.tick_rate)
                .unwrap_or(DEFAULT_TICK_RATE),
            viewport: overrides
                .viewport
                .or(file.viewport)
                .unwrap_or(DEFAULT_VIEWPORT),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 {
            return Err(ConfigError::Zero { field: "columns" });
        }
        if self.rows == 0 {
            return Err(ConfigError::Zero { field: "rows" });
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::Zero { field: "tick_rate" });
        }
        let [width, height] = self.viewport;
        if !(width >= 1.0 && height >= 1.0) {
            return Err(ConfigError::Viewport { width, height });
        }
        Ok(())
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let file = FileConfig::parse(
            "columns = 20\nrows = 15\nseed = 7\nagents = 50\n",
            Path::new("evacsim.toml"),
        )
        .expect("valid toml");
        let overrides = FileConfig {
            agents: Some(5),
            ..FileConfig::default()
        };

        let settings = Settings::resolve(file, overrides).expect("valid settings");
        assert_eq!(settings.columns, 20);
        assert_eq!(settings.rows, 15);
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.agents, 5);
        assert_eq!(settings.ticks, DEFAULT_TICKS);
        assert_eq!(settings.viewport, DEFAULT_VIEWPORT);
    }

    #[test]
    fn unknown_keys_are_reported() {
        let error = FileConfig::parse("colums = 3\n", Path::new("typo.toml"))
            .expect_err("unknown key must fail");
        assert!(matches!(error, ConfigError::Parse { .. }));
        assert_eq!(error.to_string(), "failed to parse config file typo.toml");
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let overrides = FileConfig {
            rows: Some(0),
            seed: Some(1),
            ..FileConfig::default()
        };
        let error = Settings::resolve(FileConfig::default(), overrides)
            .expect_err("zero rows must fail");
        assert_eq!(error.to_string(), "rows must be greater than zero");
    }

    #[test]
    fn degenerate_viewport_is_rejected() {
        let overrides = FileConfig {
            viewport: Some([0.0, 600.0]),
            seed: Some(1),
            ..FileConfig::default()
        };
        assert!(matches!(
            Settings::resolve(FileConfig::default(), overrides),
            Err(ConfigError::Viewport { .. })
        ));
    }
}
