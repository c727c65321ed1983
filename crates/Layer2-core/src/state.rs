//! Connection state
//!
//! Owns everything one gateway session mirrors: the entity store, the event
//! emitter, and who "we" are (current user and application id).

use mirror_foundation::{MirrorConfig, Result, Snowflake, User};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::emitter::EventEmitter;
use crate::events;
use crate::store::EntityStore;

pub struct ConnectionState {
    config: MirrorConfig,
    cache: RwLock<EntityStore>,
    emitter: EventEmitter,
    user: RwLock<Option<Arc<User>>>,
    application_id: RwLock<Option<Snowflake>>,
    /// One dispatch materializes at a time
    dispatch_gate: tokio::sync::Mutex<()>,
}

impl ConnectionState {
    /// New state with every built-in event kind registered
    pub fn new(config: MirrorConfig) -> Arc<Self> {
        let state = Arc::new(Self {
            cache: RwLock::new(EntityStore::new(config.cache.clone())),
            emitter: EventEmitter::with_config(config.emitter.clone()),
            user: RwLock::new(None),
            application_id: RwLock::new(None),
            dispatch_gate: tokio::sync::Mutex::new(()),
            config,
        });
        events::register_builtin(&state.emitter);
        state
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    // ========================================================================
    // Store access
    // ========================================================================

    /// Shared store access; do not hold across `.await`
    pub fn cache(&self) -> RwLockReadGuard<'_, EntityStore> {
        self.cache.read()
    }

    /// Exclusive store access; do not hold across `.await`
    pub fn cache_mut(&self) -> RwLockWriteGuard<'_, EntityStore> {
        self.cache.write()
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    // ========================================================================
    // Session identity
    // ========================================================================

    pub fn user(&self) -> Option<Arc<User>> {
        self.user.read().clone()
    }

    pub fn set_user(&self, user: Arc<User>) {
        *self.user.write() = Some(user);
    }

    /// Whether `user_id` is the session's own user
    pub fn is_me(&self, user_id: Snowflake) -> bool {
        self.user.read().as_ref().is_some_and(|u| u.id == user_id)
    }

    pub fn application_id(&self) -> Option<Snowflake> {
        *self.application_id.read()
    }

    pub fn set_application_id(&self, id: Snowflake) {
        *self.application_id.write() = Some(id);
    }

    // ========================================================================
    // Feed
    // ========================================================================

    /// Feed one raw gateway event through the emitter
    ///
    /// Returns how many event kinds produced an event.
    pub async fn dispatch(self: &Arc<Self>, name: &str, data: Value) -> Result<usize> {
        let _gate = self.dispatch_gate.lock().await;
        self.emitter.dispatch(self, name, data).await
    }

    /// Drop mirrored state, e.g. before a fresh (non-resumed) session
    pub fn clear(&self, preserve_views: bool) {
        self.cache.write().clear(preserve_views);
        *self.user.write() = None;
        *self.application_id.write() = None;
        debug!(preserve_views, "Connection state cleared");
    }
}

impl std::fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionState")
            .field("application_id", &self.application_id())
            .field("stats", &self.cache().stats())
            .field("emitter", &self.emitter)
            .finish_non_exhaustive()
    }
}
