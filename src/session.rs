//! Session identity and its persistence
//!
//! The signed-in profile and the session token live in two persisted slots.
//! They are only meaningful together: restoring with one of them missing
//! (or with an unreadable profile) clears both. No local token validation
//! or expiry check is done; staleness is for the remote side to decide.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use directories::ProjectDirs;

use crate::error::{FairfareError, Result};
use crate::models::GoogleUser;

/// Slot holding the serialized profile
pub const USER_SLOT: &str = "fairfare-user";
/// Slot holding the opaque session token
pub const TOKEN_SLOT: &str = "session-token";

/// Minimal key-value persistence for session slots
pub trait SlotStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Slot store backed by an embedded sled database
pub struct SledSlotStore {
    db: sled::Db,
}

impl SledSlotStore {
    /// Open the store in the user's data directory.
    ///
    /// `FAIRFARE_SESSION_DB` overrides the location.
    pub fn open_default() -> Result<Self> {
        if let Ok(override_path) = std::env::var("FAIRFARE_SESSION_DB") {
            return Self::open(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "fairfare", "fairfare")
            .ok_or_else(|| FairfareError::Storage("Could not determine data directory".into()))?;
        Self::open(proj_dirs.data_dir().join("session"))
    }

    /// Open (or create) the store at `path`
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create session directory")
                .map_err(|e| FairfareError::Storage(e.to_string()))?;
        }
        let db = sled::open(&path)
            .with_context(|| format!("Failed to open session store at {}", path.display()))
            .map_err(|e| FairfareError::Storage(e.to_string()))?;
        tracing::debug!(path = %path.display(), "Opened session store");
        Ok(Self { db })
    }
}

impl SlotStore for SledSlotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(raw) = self.db.get(key)? else {
            return Ok(None);
        };
        let value = String::from_utf8(raw.to_vec())
            .map_err(|e| FairfareError::Storage(format!("slot {} is not UTF-8: {}", key, e)))?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db.insert(key, value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db.remove(key)?;
        self.db.flush()?;
        Ok(())
    }
}

/// Slot store kept in memory (tests, ephemeral runs)
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|_| FairfareError::Storage("slot store poisoned".to_string()).into())
    }
}

impl SlotStore for MemorySlotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// The signed-in identity, passed explicitly to whatever needs it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    profile: Option<GoogleUser>,
    token: Option<String>,
}

impl SessionContext {
    /// A signed-out session
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Restore the persisted session, failing closed.
    ///
    /// Both slots present and a readable profile restore the session.
    /// Anything else, including a slot that cannot be read, clears both
    /// slots and yields a signed-out session. Only a failure to clear is
    /// returned as an error.
    pub fn restore(store: &dyn SlotStore) -> Result<Self> {
        let stored_user = Self::read_slot(store, USER_SLOT);
        let stored_token = Self::read_slot(store, TOKEN_SLOT);

        match (stored_user, stored_token) {
            (Some(user_json), Some(token)) => {
                match serde_json::from_str::<GoogleUser>(&user_json) {
                    Ok(profile) => {
                        tracing::info!(user = %profile.name, "Restored session");
                        return Ok(Self {
                            profile: Some(profile),
                            token: Some(token),
                        });
                    }
                    Err(e) => {
                        tracing::warn!("Stored profile is unreadable, clearing session: {}", e);
                    }
                }
            }
            (None, None) => {}
            _ => tracing::warn!("Partial session found, clearing both slots"),
        }

        Self::clear_slots(store)?;
        Ok(Self::anonymous())
    }

    /// Persist a freshly verified identity and return the session
    pub fn establish(store: &dyn SlotStore, profile: GoogleUser, token: String) -> Result<Self> {
        let user_json = serde_json::to_string(&profile)?;
        store.set(USER_SLOT, &user_json)?;
        if let Err(e) = store.set(TOKEN_SLOT, &token) {
            // Never leave the profile behind without its token.
            Self::clear_slots(store)?;
            return Err(e);
        }
        tracing::info!(user = %profile.name, "Session established");
        Ok(Self {
            profile: Some(profile),
            token: Some(token),
        })
    }

    /// Sign out: forget the identity, then clear both slots.
    ///
    /// The in-memory session is signed out even when clearing fails.
    pub fn teardown(&mut self, store: &dyn SlotStore) -> Result<()> {
        let profile = self.profile.take();
        self.token = None;
        Self::clear_slots(store)?;
        if let Some(profile) = profile {
            tracing::info!(user = %profile.name, "Signed out");
        }
        Ok(())
    }

    fn read_slot(store: &dyn SlotStore, key: &str) -> Option<String> {
        store.get(key).unwrap_or_else(|e| {
            tracing::warn!(slot = key, "Unreadable session slot: {:#}", e);
            None
        })
    }

    fn clear_slots(store: &dyn SlotStore) -> Result<()> {
        let user = store.remove(USER_SLOT);
        let token = store.remove(TOKEN_SLOT);
        user.and(token)
    }

    pub fn profile(&self) -> Option<&GoogleUser> {
        self.profile.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.profile.is_some() && self.token.is_some()
    }

    /// Profile and token together, or an authentication error
    pub fn require(&self) -> Result<(&GoogleUser, &str)> {
        match (self.profile.as_ref(), self.token.as_deref()) {
            (Some(profile), Some(token)) => Ok((profile, token)),
            _ => Err(FairfareError::Authentication(
                "Authentication required to add a tip.".to_string(),
            )
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> GoogleUser {
        GoogleUser {
            name: "Priya".to_string(),
            email: "priya@example.com".to_string(),
            picture: "https://example.com/p.png".to_string(),
        }
    }

    #[test]
    fn test_restore_with_both_slots() {
        let store = MemorySlotStore::new();
        store
            .set(USER_SLOT, &serde_json::to_string(&profile()).unwrap())
            .unwrap();
        store.set(TOKEN_SLOT, "tok").unwrap();

        let session = SessionContext::restore(&store).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("tok"));
        assert_eq!(session.profile().unwrap().name, "Priya");
    }

    #[test]
    fn test_restore_with_only_profile_clears_both() {
        let store = MemorySlotStore::new();
        store
            .set(USER_SLOT, &serde_json::to_string(&profile()).unwrap())
            .unwrap();

        let session = SessionContext::restore(&store).unwrap();
        assert!(!session.is_authenticated());
        assert!(store.get(USER_SLOT).unwrap().is_none());
        assert!(store.get(TOKEN_SLOT).unwrap().is_none());
    }

    #[test]
    fn test_restore_with_only_token_clears_both() {
        let store = MemorySlotStore::new();
        store.set(TOKEN_SLOT, "tok").unwrap();

        let session = SessionContext::restore(&store).unwrap();
        assert_eq!(session, SessionContext::anonymous());
        assert!(store.get(TOKEN_SLOT).unwrap().is_none());
    }

    #[test]
    fn test_restore_with_garbled_profile_clears_both() {
        let store = MemorySlotStore::new();
        store.set(USER_SLOT, "{not json").unwrap();
        store.set(TOKEN_SLOT, "tok").unwrap();

        let session = SessionContext::restore(&store).unwrap();
        assert!(!session.is_authenticated());
        assert!(store.get(USER_SLOT).unwrap().is_none());
        assert!(store.get(TOKEN_SLOT).unwrap().is_none());
    }

    #[test]
    fn test_establish_then_teardown() {
        let store = MemorySlotStore::new();
        let mut session =
            SessionContext::establish(&store, profile(), "tok".to_string()).unwrap();
        assert!(store.get(TOKEN_SLOT).unwrap().is_some());

        session.teardown(&store).unwrap();
        assert!(!session.is_authenticated());
        assert!(store.get(USER_SLOT).unwrap().is_none());
    }

    #[test]
    fn test_require_fails_when_signed_out() {
        let err = SessionContext::anonymous().require().unwrap_err();
        assert!(err.to_string().contains("Authentication required"));
    }

    #[test]
    fn test_sled_store_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = SledSlotStore::open(dir.path().join("session")).unwrap();
        store.set(TOKEN_SLOT, "abc").unwrap();
        assert_eq!(store.get(TOKEN_SLOT).unwrap().as_deref(), Some("abc"));
        store.remove(TOKEN_SLOT).unwrap();
        assert!(store.get(TOKEN_SLOT).unwrap().is_none());
    }

    #[test]
    fn test_restore_with_unreadable_profile_slot_clears_both() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = SledSlotStore::open(dir.path().join("session")).unwrap();
        store.db.insert(USER_SLOT, &[0xff, 0xfe, 0x00][..]).unwrap();
        store.set(TOKEN_SLOT, "tok").unwrap();
        assert!(store.get(USER_SLOT).is_err());

        let session = SessionContext::restore(&store).unwrap();

        assert!(!session.is_authenticated());
        assert!(store.get(USER_SLOT).unwrap().is_none());
        assert!(store.get(TOKEN_SLOT).unwrap().is_none());
    }

    #[test]
    fn test_teardown_signs_out_even_when_store_fails() {
        let store = MemorySlotStore::new();
        let mut session =
            SessionContext::establish(&store, profile(), "tok".to_string()).unwrap();

        let failing = FailingSlotStore;
        assert!(session.teardown(&failing).is_err());
        assert!(!session.is_authenticated());
        assert!(session.profile().is_none());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_restore_reports_failure_to_clear() {
        assert!(SessionContext::restore(&FailingSlotStore).is_err());
    }

    struct FailingSlotStore;

    impl SlotStore for FailingSlotStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(FairfareError::Storage("disk unavailable".to_string()).into())
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(FairfareError::Storage("disk unavailable".to_string()).into())
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(FairfareError::Storage("disk unavailable".to_string()).into())
        }
    }
}
