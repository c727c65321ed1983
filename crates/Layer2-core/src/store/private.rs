//! Private channel LRU with a by-peer-user index
//!
//! The index only ever points at channels still held by the LRU: every
//! eviction, removal or refresh drops the index entry it invalidates.

use mirror_foundation::{LruCache, PrivateChannel, Snowflake};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug)]
pub(crate) struct PrivateChannels {
    lru: LruCache<Snowflake, Arc<PrivateChannel>>,
    /// peer user id -> DM channel id
    by_user: HashMap<Snowflake, Snowflake>,
}

impl PrivateChannels {
    pub fn new(capacity: usize) -> Self {
        Self {
            lru: LruCache::new(capacity),
            by_user: HashMap::new(),
        }
    }

    /// Insert or refresh at the most recently used end
    pub fn insert(&mut self, channel: PrivateChannel) -> Arc<PrivateChannel> {
        let id = channel.id();
        let channel = Arc::new(channel);

        // a refreshed DM may have learned (or changed) its peer
        if let Some(previous) = self.lru.peek(&id).cloned() {
            self.unindex(id, &previous);
        }
        if let Some(peer) = channel.dm_peer_id() {
            self.by_user.insert(peer, id);
        }

        if let Some((evicted_id, evicted)) = self.lru.insert(id, Arc::clone(&channel)) {
            trace!(channel_id = %evicted_id, "Evicted private channel");
            self.unindex(evicted_id, &evicted);
        }
        channel
    }

    /// Lookup that marks the channel as recently used
    pub fn get(&mut self, id: Snowflake) -> Option<Arc<PrivateChannel>> {
        self.lru.get(&id).cloned()
    }

    pub fn peek(&self, id: Snowflake) -> Option<Arc<PrivateChannel>> {
        self.lru.peek(&id).cloned()
    }

    pub fn by_user(&self, user_id: Snowflake) -> Option<Arc<PrivateChannel>> {
        let channel_id = self.by_user.get(&user_id)?;
        self.lru.peek(channel_id).cloned()
    }

    pub fn remove(&mut self, id: Snowflake) -> Option<Arc<PrivateChannel>> {
        let removed = self.lru.remove(&id)?;
        self.unindex(id, &removed);
        Some(removed)
    }

    /// Least to most recently used
    pub fn values(&self) -> Vec<Arc<PrivateChannel>> {
        self.lru.values().into_iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lru.len()
    }

    #[cfg(test)]
    pub fn indexed_users(&self) -> usize {
        self.by_user.len()
    }

    fn unindex(&mut self, id: Snowflake, channel: &PrivateChannel) {
        if let Some(peer) = channel.dm_peer_id() {
            if self.by_user.get(&peer) == Some(&id) {
                self.by_user.remove(&peer);
            }
        }
    }
}
