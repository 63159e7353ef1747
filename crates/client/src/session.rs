//! Session activation, deactivation, and deletion.
//!
//! All operations act on an explicit [`ClientSession`] context rather than
//! ambient state: at most one session is active per context, and only the
//! active session's cache is held in memory.

use tracing::debug;

use dirscope_local_store::cache::{self, CacheMap};
use dirscope_local_store::registry;
use dirscope_local_store::{KeyValueStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The per-client session context: the active session name (if any) and the
/// in-memory cache for exactly that session. Switching sessions replaces
/// the cache entirely.
#[derive(Debug, Default)]
pub struct ClientSession {
    active: Option<String>,
    pub(crate) cache: CacheMap,
}

impl ClientSession {
    /// A context with no active session.
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn cached_paths(&self) -> usize {
        self.cache.len()
    }
}

/// Composes the session registry and the per-session cache over one
/// key-value store.
pub struct SessionController<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> SessionController<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Registered session names, sorted.
    pub fn sessions(&self) -> Result<Vec<String>, StoreError> {
        registry::list_sessions(&self.kv)
    }

    /// Activate `name`: register it if new and load its cache. Never a
    /// no-op, even for the already-active name — activation doubles as the
    /// "load selected session" action and always reloads.
    ///
    /// Returns `true` when a corrupt persisted cache had to be discarded
    /// (in which case the session has also been unregistered).
    pub fn activate(
        &self,
        session: &mut ClientSession,
        name: &str,
    ) -> Result<bool, SessionError> {
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        registry::add_session(&self.kv, name)?;
        let loaded = cache::load_cache(&self.kv, name)?;
        debug!(
            "session '{name}' active with {} cached paths",
            loaded.map.len()
        );
        session.active = Some(name.to_string());
        session.cache = loaded.map;
        Ok(loaded.recovered_from_corruption)
    }

    /// Clear the active session and in-memory cache without touching
    /// persisted data.
    pub fn deactivate(&self, session: &mut ClientSession) {
        session.active = None;
        session.cache = CacheMap::new();
    }

    /// Delete a session's persisted cache and registry entry. Deactivates
    /// the context if it was the active session. Confirmation is the
    /// caller's responsibility.
    pub fn clear(&self, session: &mut ClientSession, name: &str) -> Result<(), SessionError> {
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        cache::delete_cache(&self.kv, name)?;
        registry::remove_session(&self.kv, name)?;
        if session.active_name() == Some(name) {
            self.deactivate(session);
        }
        Ok(())
    }
}
