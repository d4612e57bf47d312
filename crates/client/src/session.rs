//! Session store: token, role, display name.
//!
//! One injected provider owns the session fields instead of every view
//! reading durable storage on its own. Consumers either read
//! [`SessionStore::current`] (which always reflects the latest write) or
//! [`SessionStore::subscribe`] to observe changes, so two views can never
//! disagree about authentication state within one render pass.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use copperpot_core::Role;

use crate::storage::{SharedStorage, StorageError, keys};

/// An authenticated session.
///
/// Constructed only by [`SessionStore::login`]; absence of a session means
/// unauthenticated. The role has already been normalized at write time.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque credential presented as a bearer token.
    pub token: String,
    /// Normalized authorization role.
    pub role: Role,
    /// Display name, first part.
    pub first_name: String,
    /// Display name, last part.
    pub last_name: String,
}

impl Session {
    /// Full display name for greeting headers.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// The token is a credential; keep it out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("role", &self.role)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// Shared handle to the session state.
///
/// Cheap to clone; all clones observe the same storage and the same
/// revision channel.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    storage: SharedStorage,
    revision: watch::Sender<u64>,
}

impl SessionStore {
    /// Create a session store over the given storage backend.
    #[must_use]
    pub fn new(storage: SharedStorage) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(SessionStoreInner { storage, revision }),
        }
    }

    /// Write all session fields in one atomic storage write.
    ///
    /// The raw role string is normalized here - the single normalization
    /// point - so storage only ever contains `CUSTOMER` or `ADMIN`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing write fails.
    pub fn login(
        &self,
        token: &str,
        raw_role: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Session, StorageError> {
        let role = Role::normalize(raw_role);
        self.inner.storage.put_many(&[
            (keys::TOKEN, token),
            (keys::ROLE, role.as_str()),
            (keys::FIRSTNAME, first_name),
            (keys::LASTNAME, last_name),
        ])?;
        self.bump();
        tracing::debug!(%role, "session established");
        Ok(Session {
            token: token.to_owned(),
            role,
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
        })
    }

    /// Remove every session field in one atomic storage write.
    ///
    /// After this, [`current`](Self::current) returns `None` and the access
    /// gate treats the session as unauthenticated on its next evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing write fails.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.inner
            .storage
            .remove_many(&[keys::TOKEN, keys::ROLE, keys::FIRSTNAME, keys::LASTNAME])?;
        self.bump();
        tracing::debug!("session cleared");
        Ok(())
    }

    /// The current session, or `None` when unauthenticated.
    ///
    /// A stored role is re-normalized on read, so a hand-edited or legacy
    /// document still yields a closed-enum role.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        let token = self.inner.storage.get(keys::TOKEN)?;
        let role = self
            .inner
            .storage
            .get(keys::ROLE)
            .map(|raw| Role::normalize(&raw))
            .unwrap_or_default();
        Some(Session {
            token,
            role,
            first_name: self.inner.storage.get(keys::FIRSTNAME).unwrap_or_default(),
            last_name: self.inner.storage.get(keys::LASTNAME).unwrap_or_default(),
        })
    }

    /// Whether a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.storage.get(keys::TOKEN).is_some()
    }

    /// The bearer token for authenticated requests, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.storage.get(keys::TOKEN)
    }

    /// Subscribe to session changes.
    ///
    /// The receiver's value is a revision counter; it changes on every
    /// `login`/`logout`.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|r| *r += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_login_then_current() {
        let sessions = store();
        sessions.login("tok-1", "ADMIN", "Ada", "Lovelace").unwrap();

        let session = sessions.current().unwrap();
        assert_eq!(session.token, "tok-1");
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_legacy_user_role_normalized_at_write() {
        let sessions = store();
        sessions.login("tok-1", "USER", "Sam", "Shopper").unwrap();
        assert_eq!(sessions.current().unwrap().role, Role::Customer);
    }

    #[test]
    fn test_logout_clears_all_fields() {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());
        let sessions = SessionStore::new(Arc::clone(&storage));
        sessions.login("tok-1", "CUSTOMER", "Sam", "Shopper").unwrap();
        sessions.logout().unwrap();

        assert!(sessions.current().is_none());
        assert!(!sessions.is_authenticated());
        for key in [keys::TOKEN, keys::ROLE, keys::FIRSTNAME, keys::LASTNAME] {
            assert_eq!(storage.get(key), None, "{key} should be removed");
        }
    }

    #[test]
    fn test_subscribe_observes_changes() {
        let sessions = store();
        let rx = sessions.subscribe();
        let before = *rx.borrow();

        sessions.login("tok-1", "CUSTOMER", "Sam", "Shopper").unwrap();
        assert!(*rx.borrow() > before);

        let after_login = *rx.borrow();
        sessions.logout().unwrap();
        assert!(*rx.borrow() > after_login);
    }

    #[test]
    fn test_debug_redacts_token() {
        let sessions = store();
        let session = sessions.login("super-secret", "ADMIN", "Ada", "L").unwrap();
        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
