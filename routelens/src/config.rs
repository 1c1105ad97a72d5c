use anyhow::{Context, Result, bail};
use routelens_core::Language;
use routelens_core::report::ReportFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_DIR: &str = "~/.config/routelens/";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Operator preferences. Command-line flags take precedence over these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub language: Language,
    pub format: String,
    pub color: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            language: Language::Primary,
            format: "text".to_string(),
            color: true,
        }
    }
}

impl ConsoleConfig {
    /// Loads the config at `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.report_format()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("Failed to write config {}", path.display()))
    }

    pub fn report_format(&self) -> Result<ReportFormat> {
        match ReportFormat::from_str(&self.format) {
            Some(format) => Ok(format),
            None => bail!(
                "Unknown report format '{}' (expected text, json or markdown)",
                self.format
            ),
        }
    }
}

/// Expands `~` in a config directory argument.
pub fn expand_config_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub fn default_config_path() -> PathBuf {
    expand_config_dir(DEFAULT_CONFIG_DIR).join(CONFIG_FILE_NAME)
}
