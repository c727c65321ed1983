//! Guild events

use async_trait::async_trait;
use mirror_foundation::{Emoji, EmojiPayload, Guild, GuildSticker, Result, Snowflake};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::decode;
use crate::emitter::Event;
use crate::state::ConnectionState;

#[derive(Debug, Deserialize)]
struct GuildRef {
    id: Snowflake,
}

// ============================================================================
// GUILD_CREATE -> GUILD_JOIN | GUILD_AVAILABLE
// ============================================================================

#[derive(Debug, Deserialize)]
struct GuildCreatePayload {
    #[serde(flatten)]
    guild: Guild,

    #[serde(default)]
    emojis: Vec<EmojiPayload>,

    #[serde(default)]
    stickers: Vec<GuildSticker>,
}

/// A guild became available to the session
///
/// Before listeners see it, the loader re-dispatches `GUILD_JOIN` for a
/// guild the store did not know, or `GUILD_AVAILABLE` for one it did (e.g.
/// a stub from `READY`).
#[derive(Debug, Clone)]
pub struct GuildCreate {
    pub guild: Arc<Guild>,
    /// Whether this guild was new to the store
    pub joined: bool,
}

#[async_trait]
impl Event for GuildCreate {
    const NAME: &'static str = "GUILD_CREATE";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let payload: GuildCreatePayload = decode(Self::NAME, data)?;
        let guild_id = payload.guild.id;

        let (guild, joined) = {
            let mut cache = state.cache_mut();
            let known = cache.get_guild(guild_id).is_some();
            let guild = cache.add_guild(payload.guild);
            for emoji in payload.emojis {
                cache.store_emoji(Emoji::guild(guild_id, emoji));
            }
            for sticker in payload.stickers {
                cache.store_sticker(guild_id, sticker);
            }
            (guild, !known)
        };

        let follow_up = if joined { GuildJoin::NAME } else { GuildAvailable::NAME };
        debug!(guild_id = %guild_id, follow_up, "Guild created");
        state
            .emitter()
            .dispatch(&state, follow_up, json!({ "id": guild_id }))
            .await?;

        Ok(Some(Self { guild, joined }))
    }
}

/// The session joined a new guild
#[derive(Debug, Clone)]
pub struct GuildJoin {
    pub guild: Arc<Guild>,
}

#[async_trait]
impl Event for GuildJoin {
    const NAME: &'static str = "GUILD_JOIN";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let GuildRef { id } = decode(Self::NAME, data)?;
        let guild = state.cache().get_guild(id);
        Ok(guild.map(|guild| Self { guild }))
    }
}

/// A guild the session already knew became available
#[derive(Debug, Clone)]
pub struct GuildAvailable {
    pub guild: Arc<Guild>,
}

#[async_trait]
impl Event for GuildAvailable {
    const NAME: &'static str = "GUILD_AVAILABLE";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let GuildRef { id } = decode(Self::NAME, data)?;
        let guild = state.cache().get_guild(id);
        Ok(guild.map(|guild| Self { guild }))
    }
}

// ============================================================================
// GUILD_DELETE
// ============================================================================

#[derive(Debug, Deserialize)]
struct GuildDeletePayload {
    id: Snowflake,

    #[serde(default)]
    unavailable: bool,
}

/// The session left (or was removed from) a guild
///
/// An outage (`unavailable: true`) only marks the cached guild unavailable
/// and is not reported.
#[derive(Debug, Clone)]
pub struct GuildDelete {
    pub guild_id: Snowflake,
    /// Cached copy, if the store had one
    pub guild: Option<Arc<Guild>>,
}

#[async_trait]
impl Event for GuildDelete {
    const NAME: &'static str = "GUILD_DELETE";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let payload: GuildDeletePayload = decode(Self::NAME, data)?;
        let mut cache = state.cache_mut();

        if payload.unavailable {
            if let Some(cached) = cache.get_guild(payload.id) {
                let mut outage = Guild::clone(&cached);
                outage.unavailable = true;
                cache.add_guild(outage);
            }
            debug!(guild_id = %payload.id, "Guild unavailable");
            return Ok(None);
        }

        Ok(Some(Self {
            guild_id: payload.id,
            guild: cache.delete_guild(payload.id),
        }))
    }
}

// ============================================================================
// GUILD_EMOJIS_UPDATE / GUILD_STICKERS_UPDATE
// ============================================================================

#[derive(Debug, Deserialize)]
struct GuildEmojisPayload {
    guild_id: Snowflake,
    emojis: Vec<EmojiPayload>,
}

/// A guild's emoji list changed; the payload carries the full new list
#[derive(Debug, Clone)]
pub struct GuildEmojisUpdate {
    pub guild_id: Snowflake,
    pub before: Vec<Arc<Emoji>>,
    pub after: Vec<Arc<Emoji>>,
}

#[async_trait]
impl Event for GuildEmojisUpdate {
    const NAME: &'static str = "GUILD_EMOJIS_UPDATE";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let payload: GuildEmojisPayload = decode(Self::NAME, data)?;
        let guild_id = payload.guild_id;
        let mut cache = state.cache_mut();

        let before = cache.get_guild_emojis(guild_id);
        let keep: HashSet<Snowflake> = payload.emojis.iter().map(|e| e.id).collect();
        for stale in before.iter().filter(|e| !keep.contains(&e.id())) {
            cache.delete_emoji(stale);
        }
        let after = payload
            .emojis
            .into_iter()
            .map(|e| cache.store_emoji(Emoji::guild(guild_id, e)))
            .collect();

        Ok(Some(Self { guild_id, before, after }))
    }
}

#[derive(Debug, Deserialize)]
struct GuildStickersPayload {
    guild_id: Snowflake,
    stickers: Vec<GuildSticker>,
}

/// A guild's sticker list changed; the payload carries the full new list
#[derive(Debug, Clone)]
pub struct GuildStickersUpdate {
    pub guild_id: Snowflake,
    pub before: Vec<Arc<GuildSticker>>,
    pub after: Vec<Arc<GuildSticker>>,
}

#[async_trait]
impl Event for GuildStickersUpdate {
    const NAME: &'static str = "GUILD_STICKERS_UPDATE";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let payload: GuildStickersPayload = decode(Self::NAME, data)?;
        let guild_id = payload.guild_id;
        let mut cache = state.cache_mut();

        let before = cache.get_guild_stickers(guild_id);
        let keep: HashSet<Snowflake> = payload.stickers.iter().map(|s| s.id).collect();
        for stale in before.iter().filter(|s| !keep.contains(&s.id)) {
            cache.delete_sticker(stale.id);
        }
        let after = payload
            .stickers
            .into_iter()
            .map(|s| cache.store_sticker(guild_id, s))
            .collect();

        Ok(Some(Self { guild_id, before, after }))
    }
}
