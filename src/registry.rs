//! Registry of live game sessions.
//!
//! Two levels of locking: one `RwLock` over the id → session map, held only
//! while the map itself is read or changed, and one `Mutex` per session for
//! the game state. Lock order is session, then map; the map lock is never
//! held while waiting on a session.

use crate::{GameError, GameSession, SessionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

/// Shared handle to one session and its guard.
pub type SessionHandle = Arc<Mutex<GameSession>>;

/// Locks a session.
///
/// Session mutations either complete or return before writing, so a guard
/// poisoned by a panicking holder still protects consistent state.
pub fn lock_session(handle: &SessionHandle) -> MutexGuard<'_, GameSession> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Maps session ids to sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session registry");
        Self::default()
    }

    /// Registers a session under its own id and returns its handle.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidArgument`] if the id is already taken.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub fn create(&self, session: GameSession) -> Result<SessionHandle, GameError> {
        let id = session.id().to_string();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        if sessions.contains_key(&id) {
            warn!("Session already exists");
            return Err(GameError::InvalidArgument(format!(
                "game id {id} is already registered"
            )));
        }

        let handle = Arc::new(Mutex::new(session));
        sessions.insert(id, Arc::clone(&handle));
        info!(count = sessions.len(), "Registered session");
        Ok(handle)
    }

    /// Looks up a session.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        let handle = sessions.get(id).cloned();
        if handle.is_none() {
            debug!(session_id = id, "Session not found");
        }
        handle
    }

    /// Removes a session. Returns `false` if nothing was registered under `id`.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let removed = sessions.remove(id).is_some();
        if removed {
            info!(session_id = id, count = sessions.len(), "Removed session");
        } else {
            debug!(session_id = id, "Nothing to remove");
        }
        removed
    }

    /// Handles to every registered session, as of the moment of the call.
    ///
    /// The returned list is independent of the map, so callers may lock the
    /// sessions in it while other threads register or remove entries.
    #[instrument(skip(self))]
    pub fn list_all(&self) -> Vec<SessionHandle> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        let handles: Vec<_> = sessions.values().cloned().collect();
        debug!(count = handles.len(), "Listed sessions");
        handles
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
