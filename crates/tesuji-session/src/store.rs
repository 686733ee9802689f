//! The session store: the process-wide registry of live sessions.
//!
//! One store instance owns every live session, keyed by [`SessionKey`].
//! The store hands out per-session handles (`Arc<Mutex<Session>>`), so
//! every read-then-write on a session runs under that key's mutex and
//! never interleaves with another mutation of the same session.
//! Operations on different keys share only the brief registry lock and
//! never contend on each other's sessions.
//!
//! The store is an explicit object injected into whatever layer handles
//! requests. Tests instantiate as many independent stores as they like;
//! nothing here is ambient or process-global.

use std::collections::HashMap;
use std::sync::Arc;

use tesuji_protocol::{PlayerId, SessionKey, Side};
use tokio::sync::{Mutex, RwLock};

use crate::{Session, StoreError};

/// Shared handle to one session. Clone freely; lock to mutate.
pub type SessionHandle<B> = Arc<Mutex<Session<B>>>;

/// Registry state behind the store's lock. The two maps are kept in sync:
/// every session's players are bound in `players`, and every `players`
/// entry points at a live session.
struct Registry<B> {
    sessions: HashMap<SessionKey, SessionHandle<B>>,
    players: HashMap<PlayerId, SessionKey>,
}

/// In-memory registry of live sessions with per-key mutual exclusion.
pub struct SessionStore<B> {
    inner: RwLock<Registry<B>>,
}

impl<B> SessionStore<B> {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Registry {
                sessions: HashMap::new(),
                players: HashMap::new(),
            }),
        }
    }

    /// Registers a freshly accepted session.
    ///
    /// Enforces the store invariants: one session per key, and one live
    /// session per player.
    ///
    /// # Errors
    /// - [`StoreError::SelfPairing`] if both seats name the same player
    /// - [`StoreError::SessionExists`] if the key is already registered
    /// - [`StoreError::PlayerBusy`] if either player is in another session
    pub async fn create(
        &self,
        key: SessionKey,
        first_mover: Side,
        board: B,
    ) -> Result<SessionHandle<B>, StoreError> {
        let mut registry = self.inner.write().await;

        if key.host == key.guest {
            return Err(StoreError::SelfPairing(key.host));
        }
        if registry.sessions.contains_key(&key) {
            return Err(StoreError::SessionExists(key));
        }
        for player in [&key.host, &key.guest] {
            if let Some(existing) = registry.players.get(player) {
                return Err(StoreError::PlayerBusy(player.clone(), existing.clone()));
            }
        }

        let handle = Arc::new(Mutex::new(Session::new(key.clone(), first_mover, board)));
        registry.players.insert(key.host.clone(), key.clone());
        registry.players.insert(key.guest.clone(), key.clone());
        registry.sessions.insert(key.clone(), Arc::clone(&handle));

        tracing::info!(%key, %first_mover, "session registered");
        Ok(handle)
    }

    /// Installs a session, replacing any existing session under the same
    /// key. Used by snapshot resume, where the caller has already decided
    /// the replacement is legitimate.
    ///
    /// # Errors
    /// - [`StoreError::SelfPairing`] if both seats name the same player
    /// - [`StoreError::PlayerBusy`] if either player is bound to a
    ///   *different* key
    pub async fn install(&self, session: Session<B>) -> Result<SessionHandle<B>, StoreError> {
        let key = session.key.clone();
        let mut registry = self.inner.write().await;

        if key.host == key.guest {
            return Err(StoreError::SelfPairing(key.host));
        }
        for player in [&key.host, &key.guest] {
            if let Some(existing) = registry.players.get(player) {
                if *existing != key {
                    return Err(StoreError::PlayerBusy(player.clone(), existing.clone()));
                }
            }
        }

        let handle = Arc::new(Mutex::new(session));
        registry.players.insert(key.host.clone(), key.clone());
        registry.players.insert(key.guest.clone(), key.clone());
        registry.sessions.insert(key.clone(), Arc::clone(&handle));

        tracing::info!(%key, "session installed");
        Ok(handle)
    }

    /// Looks up the handle for a key.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no session exists.
    pub async fn get(&self, key: &SessionKey) -> Result<SessionHandle<B>, StoreError> {
        self.lookup(key)
            .await
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    /// Looks up the handle for a key, `None` if absent.
    pub async fn lookup(&self, key: &SessionKey) -> Option<SessionHandle<B>> {
        self.inner.read().await.sessions.get(key).map(Arc::clone)
    }

    /// Removes a session and releases both players.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no session exists.
    pub async fn remove(&self, key: &SessionKey) -> Result<(), StoreError> {
        let mut registry = self.inner.write().await;
        if registry.sessions.remove(key).is_none() {
            return Err(StoreError::NotFound(key.clone()));
        }
        registry.players.retain(|_, bound| bound != key);
        tracing::info!(%key, "session removed");
        Ok(())
    }

    /// Returns the key of the session a player is currently in, if any.
    pub async fn session_of(&self, player: &PlayerId) -> Option<SessionKey> {
        self.inner.read().await.players.get(player).cloned()
    }

    pub async fn contains(&self, key: &SessionKey) -> bool {
        self.inner.read().await.sessions.contains_key(key)
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.sessions.is_empty()
    }

    /// Keys of every live session, in no particular order.
    pub async fn keys(&self) -> Vec<SessionKey> {
        self.inner.read().await.sessions.keys().cloned().collect()
    }
}

impl<B> Default for SessionStore<B> {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Board state is opaque to the store; a bare integer will do.
    fn key(host: &str, guest: &str) -> SessionKey {
        SessionKey::new(host, guest)
    }

    async fn store_with(keys: &[(&str, &str)]) -> SessionStore<u8> {
        let store = SessionStore::new();
        for (host, guest) in keys {
            store
                .create(key(host, guest), Side::Host, 0)
                .await
                .expect("create should succeed");
        }
        store
    }

    // =====================================================================
    // create()
    // =====================================================================

    #[tokio::test]
    async fn test_create_registers_session_and_players() {
        let store = store_with(&[("alice", "bob")]).await;

        assert_eq!(store.len().await, 1);
        assert!(store.contains(&key("alice", "bob")).await);
        assert_eq!(
            store.session_of(&PlayerId::new("alice")).await,
            Some(key("alice", "bob"))
        );
        assert_eq!(
            store.session_of(&PlayerId::new("bob")).await,
            Some(key("alice", "bob"))
        );
    }

    #[tokio::test]
    async fn test_create_duplicate_key_returns_exists() {
        let store = store_with(&[("alice", "bob")]).await;

        let result = store.create(key("alice", "bob"), Side::Guest, 0).await;

        assert!(matches!(result, Err(StoreError::SessionExists(_))));
    }

    #[tokio::test]
    async fn test_create_busy_player_returns_player_busy() {
        // Alice is already playing Bob; pairing her with Carol must fail,
        // in either seat.
        let store = store_with(&[("alice", "bob")]).await;

        let result = store.create(key("alice", "carol"), Side::Host, 0).await;
        assert!(
            matches!(result, Err(StoreError::PlayerBusy(p, _)) if p == PlayerId::new("alice"))
        );

        let result = store.create(key("carol", "bob"), Side::Host, 0).await;
        assert!(matches!(result, Err(StoreError::PlayerBusy(p, _)) if p == PlayerId::new("bob")));
    }

    #[tokio::test]
    async fn test_create_self_pairing_rejected() {
        let store: SessionStore<u8> = SessionStore::new();

        let result = store.create(key("alice", "alice"), Side::Host, 0).await;

        assert!(matches!(result, Err(StoreError::SelfPairing(_))));
    }

    #[tokio::test]
    async fn test_create_independent_keys_coexist() {
        let store = store_with(&[("alice", "bob"), ("carol", "dave")]).await;

        assert_eq!(store.len().await, 2);
    }

    // =====================================================================
    // get() / lookup()
    // =====================================================================

    #[tokio::test]
    async fn test_get_unknown_key_returns_not_found() {
        let store: SessionStore<u8> = SessionStore::new();

        let result = store.get(&key("alice", "bob")).await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_returns_live_handle() {
        let store = store_with(&[("alice", "bob")]).await;

        let handle = store.get(&key("alice", "bob")).await.unwrap();
        handle.lock().await.last_comment = "hello".into();

        // Mutation through one handle is visible through another.
        let again = store.get(&key("alice", "bob")).await.unwrap();
        assert_eq!(again.lock().await.last_comment, "hello");
    }

    // =====================================================================
    // remove()
    // =====================================================================

    #[tokio::test]
    async fn test_remove_releases_both_players() {
        let store = store_with(&[("alice", "bob")]).await;

        store.remove(&key("alice", "bob")).await.unwrap();

        assert!(store.is_empty().await);
        assert_eq!(store.session_of(&PlayerId::new("alice")).await, None);
        // Both players are free to pair again.
        store
            .create(key("bob", "alice"), Side::Host, 0)
            .await
            .expect("players should be released");
    }

    #[tokio::test]
    async fn test_remove_unknown_key_returns_not_found() {
        let store: SessionStore<u8> = SessionStore::new();

        let result = store.remove(&key("alice", "bob")).await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    // =====================================================================
    // install()
    // =====================================================================

    #[tokio::test]
    async fn test_install_replaces_existing_session() {
        let store = store_with(&[("alice", "bob")]).await;

        let mut replacement = Session::new(key("alice", "bob"), Side::Guest, 7);
        replacement.reset_epoch = 3;
        store.install(replacement).await.unwrap();

        let handle = store.get(&key("alice", "bob")).await.unwrap();
        let session = handle.lock().await;
        assert_eq!(session.board, 7);
        assert_eq!(session.reset_epoch, 3);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_install_rejects_player_bound_elsewhere() {
        let store = store_with(&[("alice", "bob")]).await;

        let intruding = Session::new(key("alice", "carol"), Side::Host, 0);
        let result = store.install(intruding).await;

        assert!(matches!(result, Err(StoreError::PlayerBusy(_, _))));
    }

    #[tokio::test]
    async fn test_install_fresh_key_registers_players() {
        let store: SessionStore<u8> = SessionStore::new();

        store
            .install(Session::new(key("alice", "bob"), Side::Host, 0))
            .await
            .unwrap();

        assert_eq!(
            store.session_of(&PlayerId::new("bob")).await,
            Some(key("alice", "bob"))
        );
    }
}
