//! Profile Store - Two Convenience Strings
//!
//! Display name and region survive between sessions; nothing else does.
//! Single writer, last write wins.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::markup::escape_html;

pub const USER_NAME_KEY: &str = "trustbot_userName";
pub const USER_REGION_KEY: &str = "trustbot_userState";
pub const GUEST_NAME: &str = "Guest";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, rewritten on every `set`.
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        tracing::debug!(key, path = %self.path.display(), "store updated");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub region: Option<String>,
}

impl UserProfile {
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        Ok(Self {
            name: non_empty(store.get(USER_NAME_KEY)?),
            region: non_empty(store.get(USER_REGION_KEY)?),
        })
    }

    /// Writes only values that are non-empty after trimming.
    pub fn save(store: &mut dyn KeyValueStore, name: &str, region: &str) -> Result<(), StoreError> {
        let name = name.trim();
        let region = region.trim();
        if !name.is_empty() {
            store.set(USER_NAME_KEY, name)?;
        }
        if !region.is_empty() {
            store.set(USER_REGION_KEY, region)?;
        }
        Ok(())
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(GUEST_NAME)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Greeting plus a region-specific suggestion, as escaped markup.
pub fn recommendation(profile: &UserProfile) -> String {
    let mut msg = format!(
        "<strong>Hello {}</strong><br>",
        escape_html(profile.display_name())
    );

    match profile.region.as_deref() {
        Some("Florida") => msg.push_str(
            "We see you're in Florida. You may benefit from our \
             <em>Foreclosure Surplus Recovery</em> module.",
        ),
        Some(region) => msg.push_str(&format!(
            "We can tailor a trust strategy based on {} laws.",
            escape_html(region)
        )),
        None => msg.push_str("Start building your trust with our general strategy assistant."),
    }
    msg
}
