// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable storage for the Strava credential pair.
//!
//! Both tokens live under two fixed keys and are always written together.
//! There is no locking across processes: the last writer wins.

use crate::error::AppError;
use crate::models::CredentialPair;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "strava-access-token";
/// Key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "strava-refresh-token";

/// Storage backend for the credential pair.
pub trait CredentialStore: Send + Sync {
    /// Load the stored pair. Returns `None` unless both tokens are present.
    fn load(&self) -> Result<Option<CredentialPair>, AppError>;

    /// Replace the stored pair.
    fn save(&self, pair: &CredentialPair) -> Result<(), AppError>;

    /// Forget the stored pair.
    fn clear(&self) -> Result<(), AppError>;

    fn is_authenticated(&self) -> Result<bool, AppError> {
        Ok(self.load()?.is_some())
    }
}

/// On-disk layout: a flat JSON object keyed like browser local storage.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(rename = "strava-access-token", default)]
    access_token: Option<String>,
    #[serde(rename = "strava-refresh-token", default)]
    refresh_token: Option<String>,
}

impl StoredTokens {
    fn into_pair(self) -> Option<CredentialPair> {
        let pair = CredentialPair::new(self.access_token?, self.refresh_token?);
        pair.is_present().then_some(pair)
    }
}

/// JSON file store. Writes go to a sibling temp file and are renamed into
/// place, so readers never see one token without the other.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "tokens.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<CredentialPair>, AppError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let stored: StoredTokens = serde_json::from_str(&contents).map_err(|e| {
            AppError::Storage(format!("Corrupt token file {}: {}", self.path.display(), e))
        })?;

        Ok(stored.into_pair())
    }

    fn save(&self, pair: &CredentialPair) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let stored = StoredTokens {
            access_token: Some(pair.access_token.clone()),
            refresh_token: Some(pair.refresh_token.clone()),
        };
        let body = serde_json::to_vec_pretty(&stored)
            .map_err(|e| AppError::Storage(format!("Failed to serialize tokens: {}", e)))?;

        let tmp = self.temp_path();
        fs::write(&tmp, body)
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AppError::Storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(path = %self.path.display(), "Credential pair persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    pair: RwLock<Option<CredentialPair>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            pair: RwLock::new(Some(pair)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<CredentialPair>, AppError> {
        let guard = self
            .pair
            .read()
            .map_err(|_| AppError::Storage("Credential lock poisoned".to_string()))?;
        Ok(guard.clone().filter(CredentialPair::is_present))
    }

    fn save(&self, pair: &CredentialPair) -> Result<(), AppError> {
        let mut guard = self
            .pair
            .write()
            .map_err(|_| AppError::Storage("Credential lock poisoned".to_string()))?;
        *guard = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        let mut guard = self
            .pair
            .write()
            .map_err(|_| AppError::Storage("Credential lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}
