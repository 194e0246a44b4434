use crate::error::{Result, ScvError};
use crate::labels::LabelTable;
use crate::model::CardKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";

/// Configuration for scv, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScvConfig {
    /// Kind of card `scv new` creates when none is given
    #[serde(default = "default_kind")]
    pub default_kind: CardKind,

    /// JSON label table overriding the built-in kind labels. Relative paths are
    /// resolved against the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels_file: Option<PathBuf>,
}

fn default_kind() -> CardKind {
    CardKind::Search
}

impl Default for ScvConfig {
    fn default() -> Self {
        Self {
            default_kind: default_kind(),
            labels_file: None,
        }
    }
}

impl ScvConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(ScvError::Io)?;
        let config: ScvConfig =
            serde_json::from_str(&content).map_err(ScvError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        let content = serde_json::to_string_pretty(self).map_err(ScvError::Serialization)?;
        crate::store::write_atomic(
            config_dir,
            &config_dir.join(CONFIG_FILENAME),
            &content,
            "config",
        )
    }

    /// Value of a config key as shown by `scv config <key>`
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "default-kind" => Ok(self.default_kind.to_string()),
            "labels-file" => Ok(self
                .labels_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()),
            other => Err(ScvError::Api(format!("Unknown config key: {}", other))),
        }
    }

    /// Set a config key from its string form. An empty `labels-file` clears it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default-kind" => {
                self.default_kind = value.parse().map_err(ScvError::Api)?;
            }
            "labels-file" => {
                let value = value.trim();
                self.labels_file = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            other => return Err(ScvError::Api(format!("Unknown config key: {}", other))),
        }
        Ok(())
    }

    /// The label table to title cards with.
    pub fn labels(&self, data_dir: &Path) -> Result<LabelTable> {
        match &self.labels_file {
            Some(path) => LabelTable::load(data_dir.join(path)),
            None => Ok(LabelTable::builtin()),
        }
    }
}
