//! API key storage.
//!
//! Keys resolve from the environment first, then from the keys file at
//! `~/.popart/keys.json`. `set`/`clear` rewrite the file; the
//! environment always wins at lookup time.

use crate::ServiceError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const NEBULA_KEY_ENV: &str = "POPART_NEBULA_API_KEY";
pub const REMOVE_BG_KEY_ENV: &str = "POPART_REMOVE_BG_API_KEY";
pub const REPLICATE_KEY_ENV: &str = "POPART_REPLICATE_API_KEY";

/// Which provider a key belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySlot {
    Nebula,
    RemoveBg,
    Replicate,
}

impl KeySlot {
    pub fn provider_name(self) -> &'static str {
        match self {
            Self::Nebula => "Nebula",
            Self::RemoveBg => "remove.bg",
            Self::Replicate => "Replicate",
        }
    }

    fn env_var(self) -> &'static str {
        match self {
            Self::Nebula => NEBULA_KEY_ENV,
            Self::RemoveBg => REMOVE_BG_KEY_ENV,
            Self::Replicate => REPLICATE_KEY_ENV,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct KeyFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nebula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remove_bg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    replicate: Option<String>,
}

impl KeyFile {
    fn slot(&self, slot: KeySlot) -> Option<&str> {
        match slot {
            KeySlot::Nebula => self.nebula.as_deref(),
            KeySlot::RemoveBg => self.remove_bg.as_deref(),
            KeySlot::Replicate => self.replicate.as_deref(),
        }
    }

    fn slot_mut(&mut self, slot: KeySlot) -> &mut Option<String> {
        match slot {
            KeySlot::Nebula => &mut self.nebula,
            KeySlot::RemoveBg => &mut self.remove_bg,
            KeySlot::Replicate => &mut self.replicate,
        }
    }
}

/// API keys for the three providers.
#[derive(Clone, Debug, Default)]
pub struct ApiKeys {
    file: KeyFile,
}

impl ApiKeys {
    /// Load the keys file if it exists; an unreadable file degrades to
    /// empty with a warning, since the environment may still have keys.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        let file = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(file) => file,
                Err(e) => {
                    log::warn!("ignoring malformed keys file {}: {}", path.display(), e);
                    KeyFile::default()
                }
            },
            Err(_) => KeyFile::default(),
        };
        Self { file }
    }

    /// Resolve the key for a provider, environment first.
    pub fn get(&self, slot: KeySlot) -> Result<String, ServiceError> {
        resolve(
            std::env::var(slot.env_var()).ok(),
            self.file.slot(slot),
        )
        .ok_or(ServiceError::MissingApiKey {
            provider: slot.provider_name(),
            env_var: slot.env_var(),
        })
    }

    /// Whether a key is configured for the provider.
    pub fn has(&self, slot: KeySlot) -> bool {
        self.get(slot).is_ok()
    }

    /// Store a key in the keys file.
    pub fn set(&mut self, slot: KeySlot, key: impl Into<String>) -> Result<(), ServiceError> {
        *self.file.slot_mut(slot) = Some(key.into());
        self.save()
    }

    /// Remove a key from the keys file.
    pub fn clear(&mut self, slot: KeySlot) -> Result<(), ServiceError> {
        *self.file.slot_mut(slot) = None;
        self.save()
    }

    fn save(&self) -> Result<(), ServiceError> {
        let Some(path) = Self::path() else {
            return Err(ServiceError::Io(std::io::Error::other(
                "could not determine home directory",
            )));
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.file)
            .map_err(|e| ServiceError::Io(std::io::Error::other(e)))?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".popart").join("keys.json"))
    }
}

/// Environment wins over the file; blank values count as absent.
fn resolve(env_value: Option<String>, file_value: Option<&str>) -> Option<String> {
    env_value
        .filter(|k| !k.trim().is_empty())
        .or_else(|| file_value.map(String::from))
        .filter(|k| !k.trim().is_empty())
}
