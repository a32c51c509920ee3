//! Optional `robotrain.toml` configuration.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use robotrain_system_scheduler as scheduler;

const DEFAULT_UPDATE_INTERVAL_MS: u64 = 100;
const DEFAULT_FRAMES_PER_SECOND: u32 = 30;
const DEFAULT_MAX_TICKS: u64 = 10_000;
const DEFAULT_PROGRESS_FILE: &str = "robotrain-progress.toml";

/// Settings read from the configuration file, with defaults for missing keys.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) update_interval_ms: u64,
    pub(crate) frames_per_second: u32,
    pub(crate) max_ticks: u64,
    pub(crate) levels: Vec<PathBuf>,
    /// Where the level list remembers the level to play next.
    pub(crate) progress_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            max_ticks: DEFAULT_MAX_TICKS,
            levels: Vec::new(),
            progress_file: PathBuf::from(DEFAULT_PROGRESS_FILE),
        }
    }
}

impl Config {
    /// Loads the file at `path`, falling back to defaults when it does not exist.
    ///
    /// Level and progress paths are resolved relative to the file's directory.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        let mut config = Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for level in &mut config.levels {
            *level = base.join(&*level);
        }
        config.progress_file = base.join(&config.progress_file);
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse configuration toml contents")?;
        if config.update_interval_ms == 0 {
            bail!("update_interval_ms must be positive");
        }
        Ok(config)
    }

    /// Scheduler cadence described by the file.
    pub(crate) fn scheduler(&self) -> scheduler::Config {
        scheduler::Config::from_rates(
            Duration::from_millis(self.update_interval_ms),
            self.frames_per_second,
        )
    }
}
