//! Session credential handling.
//!
//! The OAuth login itself happens elsewhere; it ends on a callback URL carrying
//! `accessToken` and `refreshToken`. [`SessionContext`] captures those, persists them through
//! a [`CredentialStore`], and hands the access credential to the API client for every request.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::error::{Context, SeatpickError};

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

// Tokens never end up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallbackQuery {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Persistent storage for the credential pair.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credentials>, SeatpickError>;
    fn save(&self, credentials: &Credentials) -> Result<(), SeatpickError>;
    fn clear(&self) -> Result<(), SeatpickError>;
}

/// Keeps the credentials in a JSON file.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, SeatpickError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), SeatpickError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.path, raw).with_context(|| format!("writing {}", self.path.display()))
    }

    fn clear(&self) -> Result<(), SeatpickError> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("removing {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Holds the current credentials and writes changes through to the store.
#[derive(Default)]
pub struct SessionContext {
    credentials: RwLock<Option<Credentials>>,
    store: Option<Arc<dyn CredentialStore>>,
}

impl SessionContext {
    /// A session that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A session restored from `store`.
    pub fn with_store(store: Arc<dyn CredentialStore>) -> Result<Self, SeatpickError> {
        let credentials = store.load()?;
        debug!("session restored, logged in: {}", credentials.is_some());
        Ok(Self {
            credentials: RwLock::new(credentials),
            store: Some(store),
        })
    }

    /// The bearer credential attached to outgoing requests, if any.
    pub fn access_token(&self) -> Option<String> {
        self.read().as_ref().map(|c| c.access_token.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.read().is_some()
    }

    /// Stores a freshly issued credential pair.
    pub fn capture(&self, credentials: Credentials) -> Result<(), SeatpickError> {
        if let Some(store) = &self.store {
            store.save(&credentials)?;
        }
        *self.write() = Some(credentials);
        info!("session credentials captured");
        Ok(())
    }

    /// Captures the credentials from an OAuth callback query string
    /// (`accessToken=...&refreshToken=...`, with or without the leading `?`).
    /// Both tokens must be present.
    pub fn capture_from_callback(&self, query: &str) -> Result<(), SeatpickError> {
        let query = query.trim_start_matches('?');
        let parsed: CallbackQuery = serde_urlencoded::from_str(query)
            .map_err(|e| SeatpickError::ParseError(format!("invalid callback query: {}", e)))?;

        match (parsed.access_token, parsed.refresh_token) {
            (Some(access_token), Some(refresh_token))
                if !access_token.is_empty() && !refresh_token.is_empty() =>
            {
                self.capture(Credentials {
                    access_token,
                    refresh_token,
                })
            }
            _ => Err(SeatpickError::AuthError(
                "login callback did not carry both tokens".to_string(),
            )),
        }
    }

    /// Forgets both credentials.
    pub fn clear(&self) -> Result<(), SeatpickError> {
        if let Some(store) = &self.store {
            store.clear()?;
        }
        *self.write() = None;
        info!("session cleared");
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Credentials>> {
        self.credentials.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Credentials>> {
        self.credentials.write().unwrap_or_else(|e| e.into_inner())
    }
}
