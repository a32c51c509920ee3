//! Level index remembered between runs of the configured level list.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Contents of the progress file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Progress {
    pub(crate) level_index: usize,
}

impl Progress {
    /// Reads the progress file, starting from the first level when there is none.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read progress at {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("invalid progress file {}", path.display()))
    }

    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string(self).context("failed to encode progress")?;
        fs::write(path, contents)
            .with_context(|| format!("failed to write progress to {}", path.display()))
    }
}
