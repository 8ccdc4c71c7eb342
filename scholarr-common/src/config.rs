//! Configuration loading
//!
//! Engine settings resolve in priority order:
//! 1. Explicit path argument (highest priority)
//! 2. `SCHOLARR_CONFIG` environment variable
//! 3. OS config directory (`~/.config/scholarr/config.toml`)
//! 4. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunables for the release evaluation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether proper/repack revisions are preferred when comparing equal
    /// quality tiers
    pub prefer_propers_and_repacks: bool,
    /// Concurrent per-release evaluations in a batch
    pub evaluation_concurrency: usize,
    /// Minimum similarity for an inexact author match to be accepted
    pub author_match_threshold: f64,
    /// Minimum similarity for a fuzzy work-title match to be accepted
    pub work_match_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prefer_propers_and_repacks: true,
            evaluation_concurrency: 4,
            author_match_threshold: 0.8,
            work_match_threshold: 0.7,
        }
    }
}

impl EngineConfig {
    /// Load configuration following the resolution priority order
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var("SCHOLARR_CONFIG") {
            return Self::from_file(Path::new(&path));
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Parse configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.evaluation_concurrency == 0 {
            return Err(Error::Config(
                "evaluation_concurrency must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("author_match_threshold", self.author_match_threshold),
            ("work_match_threshold", self.work_match_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{} must be within 0.0-1.0", name)));
            }
        }
        Ok(())
    }
}

/// Default configuration file path for the platform
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scholarr").join("config.toml"))
}
