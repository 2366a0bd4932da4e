use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One candidate pair (paslon). List order defines the vote index and the
/// digit key that records for it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Candidate {
    pub name: String,
    pub description: String,
    pub image_url: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_candidates")]
    pub candidates: Vec<Candidate>,

    #[serde(default = "default_undo_limit")]
    pub undo_limit: usize,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_celebration_secs")]
    pub celebration_secs: u64,

    #[serde(default = "default_audio_feedback")]
    pub audio_feedback: bool,

    #[serde(default = "default_vote_sound")]
    pub vote_sound_path: String,

    #[serde(default = "default_undo_sound")]
    pub undo_sound_path: String,

    #[serde(default = "default_finalize_sound")]
    pub finalize_sound_path: String,

    #[serde(default = "default_applause_sound")]
    pub applause_sound_path: String,

    /// Overrides the shared record location; both processes must agree.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

fn default_candidates() -> Vec<Candidate> {
    (1..=3)
        .map(|i| Candidate {
            name: format!("Paslon {}", i),
            description: format!("Pasangan calon nomor urut {}", i),
            image_url: format!("paslon{}.png", i),
        })
        .collect()
}

fn default_undo_limit() -> usize {
    500
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_celebration_secs() -> u64 {
    10
}

fn default_audio_feedback() -> bool {
    true
}

fn default_vote_sound() -> String {
    "vote.mp3".to_string()
}

fn default_undo_sound() -> String {
    "undo.mp3".to_string()
}

fn default_finalize_sound() -> String {
    "finalize.mp3".to_string()
}

fn default_applause_sound() -> String {
    "applause.mp3".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            undo_limit: default_undo_limit(),
            poll_interval_ms: default_poll_interval_ms(),
            celebration_secs: default_celebration_secs(),
            audio_feedback: default_audio_feedback(),
            vote_sound_path: default_vote_sound(),
            undo_sound_path: default_undo_sound(),
            finalize_sound_path: default_finalize_sound(),
            applause_sound_path: default_applause_sound(),
            store_path: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.config/rekap/config.json)
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!(
                "Config file not found at {:?}, creating default config",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        tracing::info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        tracing::info!("Saved config to {:?}", config_path);
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(dir)
        } else {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            PathBuf::from(home).join(".config")
        };

        Ok(config_dir.join("rekap").join("config.json"))
    }

    /// Where the shared record lives. Defaults to the fixed key under the
    /// user's data directory unless overridden.
    pub fn store_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }

        let data_dir = if let Ok(dir) = std::env::var("XDG_DATA_HOME") {
            PathBuf::from(dir)
        } else {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            PathBuf::from(home).join(".local").join("share")
        };

        Ok(data_dir
            .join("rekap")
            .join(format!("{}.json", crate::store::STORE_KEY)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.candidates.is_empty() {
            return Err(anyhow::anyhow!("candidates cannot be empty"));
        }

        // Digit keys 1..9 are the vote bindings.
        if self.candidates.len() > 9 {
            return Err(anyhow::anyhow!("at most 9 candidates are supported"));
        }

        if self.undo_limit == 0 {
            return Err(anyhow::anyhow!("undo_limit must be at least 1"));
        }

        if self.poll_interval_ms == 0 {
            return Err(anyhow::anyhow!("poll_interval_ms must be at least 1"));
        }

        if self.celebration_secs == 0 {
            return Err(anyhow::anyhow!("celebration_secs must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_empty_candidate_list() {
        let config = Config {
            candidates: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_more_candidates_than_digit_keys() {
        let config = Config {
            candidates: (1..=10)
                .map(|i| Candidate {
                    name: format!("Paslon {}", i),
                    description: String::new(),
                    image_url: String::new(),
                })
                .collect(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.candidates.len(), 3);
        assert_eq!(config.undo_limit, 500);
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.celebration_secs, 10);
    }
}
