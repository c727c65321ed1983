//! Entity Store - 게이트웨이 엔티티 인메모리 캐시
//!
//! Every entity kind gets its own index with its own capacity policy:
//!
//! | kind | index | policy |
//! |------|-------|--------|
//! | users, guilds, polls | `HashMap` by id | unbounded |
//! | emojis, stickers | per-owner lists | no duplicate ids |
//! | private channels | [`LruCache`] + by-peer-user index | `max_private_channels` |
//! | messages | [`RingBuffer`], newest last | `max_messages` or unbounded |
//! | views, modals | `HashMap` by string key | until removed |
//!
//! The store is synchronous and owned by
//! [`ConnectionState`](crate::state::ConnectionState); callers get `Arc`
//! handles which the store may replace or evict at any time. Updates are
//! copy-on-write: clone the cached value, change the clone, store it back.

mod lists;
mod private;

pub use lists::Owned;

use lists::OwnerLists;
use mirror_foundation::{
    CacheLimits, Emoji, EmojiOwner, Guild, GuildSticker, Message, MessagePayload, Modal, Poll,
    PrivateChannel, RingBuffer, Snowflake, User, View,
};
use private::PrivateChannels;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

// ============================================================================
// StoreStats
// ============================================================================

/// Entry counts per entity kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub users: usize,
    pub guilds: usize,
    pub emojis: usize,
    pub stickers: usize,
    pub polls: usize,
    pub private_channels: usize,
    pub messages: usize,
    pub views: usize,
    pub modals: usize,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "users={} guilds={} emojis={} stickers={} polls={} private_channels={} messages={} views={} modals={}",
            self.users,
            self.guilds,
            self.emojis,
            self.stickers,
            self.polls,
            self.private_channels,
            self.messages,
            self.views,
            self.modals
        )
    }
}

// ============================================================================
// EntityStore
// ============================================================================

#[derive(Debug)]
pub struct EntityStore {
    limits: CacheLimits,
    users: HashMap<Snowflake, Arc<User>>,
    guilds: HashMap<Snowflake, Arc<Guild>>,
    stickers: OwnerLists<GuildSticker>,
    emojis: OwnerLists<Emoji>,
    polls: HashMap<Snowflake, Arc<Poll>>,
    private_channels: PrivateChannels,
    messages: RingBuffer<Arc<Message>>,
    views: HashMap<String, Arc<View>>,
    modals: HashMap<String, Arc<Modal>>,
}

impl EntityStore {
    pub fn new(limits: CacheLimits) -> Self {
        Self {
            users: HashMap::new(),
            guilds: HashMap::new(),
            stickers: OwnerLists::new(),
            emojis: OwnerLists::new(),
            polls: HashMap::new(),
            private_channels: PrivateChannels::new(limits.max_private_channels),
            messages: RingBuffer::new(limits.max_messages),
            views: HashMap::new(),
            modals: HashMap::new(),
            limits,
        }
    }

    pub fn limits(&self) -> &CacheLimits {
        &self.limits
    }

    /// Reset every index; views survive when `preserve_views` is set
    pub fn clear(&mut self, preserve_views: bool) {
        let views = preserve_views.then(|| std::mem::take(&mut self.views));
        *self = Self::new(self.limits.clone());
        if let Some(views) = views {
            self.views = views;
        }
        debug!(preserve_views, "Entity store cleared");
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            users: self.users.len(),
            guilds: self.guilds.len(),
            emojis: self.emojis.len(),
            stickers: self.stickers.len(),
            polls: self.polls.len(),
            private_channels: self.private_channels.len(),
            messages: self.messages.len(),
            views: self.views.len(),
            modals: self.modals.len(),
        }
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub fn get_all_users(&self) -> Vec<Arc<User>> {
        self.users.values().cloned().collect()
    }

    pub fn get_user(&self, id: Snowflake) -> Option<Arc<User>> {
        self.users.get(&id).cloned()
    }

    /// Resolve a user through the cache
    ///
    /// An already cached user is returned as is. Users carrying the
    /// migration discriminator are built fresh on every call and never kept.
    pub fn store_user(&mut self, user: User) -> Arc<User> {
        if !user.is_cacheable() {
            return Arc::new(user);
        }
        Arc::clone(self.users.entry(user.id).or_insert_with(|| Arc::new(user)))
    }

    pub fn delete_user(&mut self, id: Snowflake) -> Option<Arc<User>> {
        self.users.remove(&id)
    }

    // ========================================================================
    // Guilds
    // ========================================================================

    pub fn get_all_guilds(&self) -> Vec<Arc<Guild>> {
        self.guilds.values().cloned().collect()
    }

    pub fn get_guild(&self, id: Snowflake) -> Option<Arc<Guild>> {
        self.guilds.get(&id).cloned()
    }

    /// Insert or replace
    pub fn add_guild(&mut self, guild: Guild) -> Arc<Guild> {
        let guild = Arc::new(guild);
        self.guilds.insert(guild.id, Arc::clone(&guild));
        guild
    }

    /// Remove a guild together with its emoji and sticker lists
    ///
    /// The lists are dropped even when the guild itself was never cached.
    pub fn delete_guild(&mut self, id: Snowflake) -> Option<Arc<Guild>> {
        let removed = self.guilds.remove(&id);
        let emojis = self.emojis.drop_owner(EmojiOwner::Guild(id));
        let stickers = self.stickers.drop_owner(id);
        trace!(guild_id = %id, cached = removed.is_some(), emojis, stickers, "Guild removed from store");
        removed
    }

    // ========================================================================
    // Stickers
    // ========================================================================

    pub fn get_all_stickers(&self) -> Vec<Arc<GuildSticker>> {
        self.stickers.all()
    }

    pub fn get_sticker(&self, id: Snowflake) -> Option<Arc<GuildSticker>> {
        self.stickers.get(id)
    }

    pub fn get_guild_stickers(&self, guild_id: Snowflake) -> Vec<Arc<GuildSticker>> {
        self.stickers.for_owner(guild_id)
    }

    /// File a sticker under `guild_id`, overriding whatever the payload said
    pub fn store_sticker(&mut self, guild_id: Snowflake, mut sticker: GuildSticker) -> Arc<GuildSticker> {
        sticker.guild_id = Some(guild_id);
        self.stickers.store(sticker)
    }

    pub fn delete_sticker(&mut self, id: Snowflake) -> Option<Arc<GuildSticker>> {
        self.stickers.remove(id)
    }

    // ========================================================================
    // Emojis
    // ========================================================================

    pub fn get_all_emojis(&self) -> Vec<Arc<Emoji>> {
        self.emojis.all()
    }

    pub fn get_emoji(&self, id: Snowflake) -> Option<Arc<Emoji>> {
        self.emojis.get(id)
    }

    pub fn get_guild_emojis(&self, guild_id: Snowflake) -> Vec<Arc<Emoji>> {
        self.emojis.for_owner(EmojiOwner::Guild(guild_id))
    }

    pub fn get_app_emojis(&self, application_id: Snowflake) -> Vec<Arc<Emoji>> {
        self.emojis.for_owner(EmojiOwner::Application(application_id))
    }

    /// Store into the owner list the variant names
    pub fn store_emoji(&mut self, emoji: Emoji) -> Arc<Emoji> {
        self.emojis.store(emoji)
    }

    /// Remove from the owner list the variant names; other lists are untouched
    pub fn delete_emoji(&mut self, emoji: &Emoji) -> Option<Arc<Emoji>> {
        self.emojis.remove_from(emoji.owner(), emoji.id())
    }

    // ========================================================================
    // Polls
    // ========================================================================

    pub fn get_all_polls(&self) -> Vec<Arc<Poll>> {
        self.polls.values().cloned().collect()
    }

    pub fn get_poll(&self, message_id: Snowflake) -> Option<Arc<Poll>> {
        self.polls.get(&message_id).cloned()
    }

    pub fn store_poll(&mut self, message_id: Snowflake, poll: Poll) -> Arc<Poll> {
        let poll = Arc::new(poll);
        self.polls.insert(message_id, Arc::clone(&poll));
        poll
    }

    pub fn delete_poll(&mut self, message_id: Snowflake) -> Option<Arc<Poll>> {
        self.polls.remove(&message_id)
    }

    // ========================================================================
    // Private channels
    // ========================================================================

    /// Least to most recently used
    pub fn get_private_channels(&self) -> Vec<Arc<PrivateChannel>> {
        self.private_channels.values()
    }

    /// Lookup that promotes the channel to most recently used
    pub fn get_private_channel(&mut self, id: Snowflake) -> Option<Arc<PrivateChannel>> {
        self.private_channels.get(id)
    }

    /// Lookup without touching recency (read lock friendly)
    pub fn peek_private_channel(&self, id: Snowflake) -> Option<Arc<PrivateChannel>> {
        self.private_channels.peek(id)
    }

    pub fn get_private_channel_by_user(&self, user_id: Snowflake) -> Option<Arc<PrivateChannel>> {
        self.private_channels.by_user(user_id)
    }

    pub fn store_private_channel(&mut self, channel: PrivateChannel) -> Arc<PrivateChannel> {
        self.private_channels.insert(channel)
    }

    pub fn remove_private_channel(&mut self, id: Snowflake) -> Option<Arc<PrivateChannel>> {
        self.private_channels.remove(id)
    }

    // ========================================================================
    // Messages
    // ========================================================================

    /// Oldest to newest
    pub fn get_all_messages(&self) -> Vec<Arc<Message>> {
        self.messages.iter().cloned().collect()
    }

    /// Newest entry with this id
    pub fn get_message(&self, id: Snowflake) -> Option<Arc<Message>> {
        self.messages.find_newest(|m| m.id == id).cloned()
    }

    /// Append as the newest entry; older entries with the same id stay
    /// behind it until they age out
    pub fn upsert_message(&mut self, message: Message) -> Arc<Message> {
        let message = Arc::new(message);
        if let Some(dropped) = self.messages.push(Arc::clone(&message)) {
            trace!(message_id = %dropped.id, "Message aged out of the ring buffer");
        }
        message
    }

    /// Build a message from its payload, resolving the author through the
    /// user cache and filing an attached poll
    pub fn store_message(&mut self, payload: MessagePayload) -> Arc<Message> {
        let author = self.store_user(payload.author.clone());
        if let Some(poll) = &payload.poll {
            self.store_poll(payload.id, poll.clone());
        }
        self.upsert_message(Message::from_payload(payload, author))
    }

    /// Remove every entry with this id
    pub fn delete_message(&mut self, id: Snowflake) -> usize {
        self.messages.retain(|m| m.id != id)
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn get_all_views(&self) -> Vec<Arc<View>> {
        self.views.values().cloned().collect()
    }

    pub fn get_view(&self, key: &str) -> Option<Arc<View>> {
        self.views.get(key).cloned()
    }

    /// Keyed by `message_id` when given (binding the view to it), otherwise
    /// by the view's own id
    pub fn store_view(&mut self, mut view: View, message_id: Option<Snowflake>) -> Arc<View> {
        if message_id.is_some() {
            view.message_id = message_id;
        }
        let key = view.store_key(None);
        let view = Arc::new(view);
        self.views.insert(key, Arc::clone(&view));
        view
    }

    pub fn delete_view(&mut self, key: &str) -> Option<Arc<View>> {
        self.views.remove(key)
    }

    /// Drop the view attached to a message
    pub fn delete_view_on(&mut self, message_id: Snowflake) -> Option<Arc<View>> {
        if let Some(view) = self.views.remove(&message_id.to_string()) {
            return Some(view);
        }
        let key = self
            .views
            .iter()
            .find(|(_, view)| view.message_id == Some(message_id))
            .map(|(key, _)| key.clone())?;
        self.views.remove(&key)
    }

    // ========================================================================
    // Modals
    // ========================================================================

    pub fn get_all_modals(&self) -> Vec<Arc<Modal>> {
        self.modals.values().cloned().collect()
    }

    pub fn get_modal(&self, custom_id: &str) -> Option<Arc<Modal>> {
        self.modals.get(custom_id).cloned()
    }

    pub fn store_modal(&mut self, modal: Modal) -> Arc<Modal> {
        let modal = Arc::new(modal);
        self.modals.insert(modal.custom_id.clone(), Arc::clone(&modal));
        modal
    }

    pub fn delete_modal(&mut self, custom_id: &str) -> Option<Arc<Modal>> {
        self.modals.remove(custom_id)
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new(CacheLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mirror_foundation::{EmojiPayload, Interaction, ModalHandler, ModalSubmission, ViewHandler, ViewItem};
    use serde_json::json;

    struct Noop;

    #[async_trait]
    impl ViewHandler for Noop {
        async fn on_interaction(&self, _: &ViewItem, _: &Interaction) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl ModalHandler for Noop {
        async fn on_submit(&self, _: &ModalSubmission, _: &Interaction) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn message(id: u64, content: &str) -> Message {
        let payload: MessagePayload = serde_json::from_value(json!({
            "id": id.to_string(),
            "channel_id": "1",
            "author": { "id": "7", "username": "ana" },
            "content": content,
        }))
        .unwrap();
        let author = Arc::new(payload.author.clone());
        Message::from_payload(payload, author)
    }

    fn emoji_payload(id: u64) -> EmojiPayload {
        serde_json::from_value(json!({ "id": id.to_string(), "name": "blob" })).unwrap()
    }

    #[test]
    fn test_store_user_is_idempotent() {
        let mut store = EntityStore::default();

        let first = store.store_user(User::new(1u64, "kim"));
        let second = store.store_user(User::new(1u64, "renamed"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.username, "kim");
        assert_eq!(store.get_all_users().len(), 1);
    }

    #[test]
    fn test_migration_marker_user_never_cached() {
        let mut store = EntityStore::default();
        let legacy = User::new(2u64, "old").with_discriminator("0000");

        let a = store.store_user(legacy.clone());
        let b = store.store_user(legacy);

        assert!(!Arc::ptr_eq(&a, &b));
        assert!(store.get_user(Snowflake(2)).is_none());
    }

    #[test]
    fn test_message_ring_drops_oldest() {
        let mut store = EntityStore::new(CacheLimits::default().with_max_messages(Some(3)));

        for id in 1..=4 {
            store.upsert_message(message(id, "x"));
        }

        assert!(store.get_message(Snowflake(1)).is_none());
        let ids: Vec<u64> = store.get_all_messages().iter().map(|m| m.id.get()).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_unbounded_messages() {
        let mut store = EntityStore::new(CacheLimits::unbounded());
        for id in 0..2000 {
            store.upsert_message(message(id, "x"));
        }
        assert_eq!(store.stats().messages, 2000);
    }

    #[test]
    fn test_get_message_returns_newest_copy() {
        let mut store = EntityStore::default();

        store.upsert_message(message(5, "old"));
        store.upsert_message(message(6, "other"));
        store.upsert_message(message(5, "new"));

        assert_eq!(store.get_message(Snowflake(5)).unwrap().content, "new");
        assert_eq!(store.delete_message(Snowflake(5)), 2);
        assert!(store.get_message(Snowflake(5)).is_none());
    }

    #[test]
    fn test_store_message_resolves_author_and_poll() {
        let mut store = EntityStore::default();
        let payload: MessagePayload = serde_json::from_value(json!({
            "id": "10",
            "channel_id": "1",
            "author": { "id": "7", "username": "ana" },
            "poll": {
                "question": { "text": "?" },
                "answers": [ { "answer_id": 1, "poll_media": { "text": "y" } } ]
            }
        }))
        .unwrap();

        let stored = store.store_message(payload);

        assert!(Arc::ptr_eq(&stored.author, &store.get_user(Snowflake(7)).unwrap()));
        assert!(store.get_poll(Snowflake(10)).is_some());
    }

    #[test]
    fn test_private_channel_capacity() {
        let mut store = EntityStore::new(CacheLimits::default().with_max_private_channels(128));

        for id in 1..=129u64 {
            let peer = Arc::new(User::new(1000 + id, "peer"));
            store.store_private_channel(PrivateChannel::dm(id, Some(peer)));
        }

        assert_eq!(store.stats().private_channels, 128);
        assert!(store.peek_private_channel(Snowflake(1)).is_none());
        assert!(store.get_private_channel_by_user(Snowflake(1001)).is_none());
        assert_eq!(
            store.get_private_channel_by_user(Snowflake(1129)).map(|c| c.id()),
            Some(Snowflake(129))
        );
    }

    #[test]
    fn test_private_channel_get_promotes() {
        let mut store = EntityStore::new(CacheLimits::default().with_max_private_channels(2));

        store.store_private_channel(PrivateChannel::dm(1u64, None));
        store.store_private_channel(PrivateChannel::dm(2u64, None));
        store.get_private_channel(Snowflake(1));
        store.store_private_channel(PrivateChannel::dm(3u64, None));

        assert!(store.peek_private_channel(Snowflake(1)).is_some());
        assert!(store.peek_private_channel(Snowflake(2)).is_none());
    }

    #[test]
    fn test_emoji_delete_respects_owner() {
        let mut store = EntityStore::default();

        store.store_emoji(Emoji::guild(Snowflake(10), emoji_payload(1)));
        store.store_emoji(Emoji::app(Snowflake(10), emoji_payload(1)));

        let removed = store.delete_emoji(&Emoji::app(Snowflake(10), emoji_payload(1)));
        assert!(matches!(removed.as_deref(), Some(Emoji::App(_))));
        assert_eq!(store.get_guild_emojis(Snowflake(10)).len(), 1);
        assert!(store.get_app_emojis(Snowflake(10)).is_empty());

        // Already gone from that list
        assert!(store.delete_emoji(&Emoji::app(Snowflake(10), emoji_payload(1))).is_none());
    }

    #[test]
    fn test_delete_guild_cascades() {
        let mut store = EntityStore::default();

        store.add_guild(Guild::new(10u64, "home"));
        store.store_emoji(Emoji::guild(Snowflake(10), emoji_payload(1)));
        store.store_sticker(Snowflake(10), GuildSticker::new(2u64, 99u64, "wave"));
        assert_eq!(store.get_guild_stickers(Snowflake(10)).len(), 1);

        assert!(store.delete_guild(Snowflake(10)).is_some());
        assert!(store.get_emoji(Snowflake(1)).is_none());
        assert!(store.get_sticker(Snowflake(2)).is_none());
        assert!(store.delete_guild(Snowflake(10)).is_none());
    }

    #[test]
    fn test_delete_uncached_guild_drops_lists() {
        let mut store = EntityStore::default();

        store.store_emoji(Emoji::guild(Snowflake(5), emoji_payload(1)));
        store.store_sticker(Snowflake(5), GuildSticker::new(2u64, 5u64, "wave"));

        assert!(store.delete_guild(Snowflake(5)).is_none());
        let stats = store.stats();
        assert_eq!((stats.emojis, stats.stickers), (0, 0));
    }

    #[test]
    fn test_views_keyed_by_message_or_id() {
        let mut store = EntityStore::default();

        let floating = store.store_view(View::new(Arc::new(Noop)).with_id("menu"), None);
        store.store_view(View::new(Arc::new(Noop)), Some(Snowflake(55)));

        assert!(store.get_view(&floating.id).is_some());
        assert!(store.get_view("55").is_some());

        assert!(store.delete_view_on(Snowflake(55)).is_some());
        assert!(store.get_view("55").is_none());
        assert!(store.delete_view_on(Snowflake(55)).is_none());
    }

    #[test]
    fn test_clear_preserves_views_on_request() {
        let mut store = EntityStore::default();

        store.store_user(User::new(1u64, "kim"));
        store.store_view(View::new(Arc::new(Noop)), Some(Snowflake(1)));
        store.store_modal(Modal::new("form", "Form", Arc::new(Noop)));

        store.clear(true);
        assert_eq!(
            store.stats(),
            StoreStats {
                views: 1,
                ..StoreStats::default()
            }
        );

        store.clear(false);
        assert_eq!(store.stats(), StoreStats::default());
    }
}
