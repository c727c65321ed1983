//! Message, reaction and poll vote events
//!
//! Cached messages are never edited in place: the loader clones the newest
//! cached copy, applies the change and appends the result to the ring buffer.
//! A message that already aged out is an eventual-consistency miss, not an
//! error.

use async_trait::async_trait;
use mirror_foundation::{
    Message, MessagePayload, MessageUpdatePayload, PartialEmoji, Poll, PollAnswer, Reaction,
    Result, Snowflake, User,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::decode;
use crate::emitter::Event;
use crate::state::ConnectionState;
use crate::store::EntityStore;

// ============================================================================
// MESSAGE_CREATE / MESSAGE_UPDATE
// ============================================================================

#[derive(Debug, Clone)]
pub struct MessageCreate {
    pub message: Arc<Message>,
}

#[async_trait]
impl Event for MessageCreate {
    const NAME: &'static str = "MESSAGE_CREATE";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let payload: MessagePayload = decode(Self::NAME, data)?;
        let message = state.cache_mut().store_message(payload);
        Ok(Some(Self { message }))
    }
}

/// An edit; `old`/`message` are only set when the message was cached
#[derive(Debug, Clone)]
pub struct MessageUpdate {
    pub raw: MessageUpdatePayload,
    pub old: Option<Arc<Message>>,
    pub message: Option<Arc<Message>>,
}

#[async_trait]
impl Event for MessageUpdate {
    const NAME: &'static str = "MESSAGE_UPDATE";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let raw: MessageUpdatePayload = decode(Self::NAME, data)?;
        let mut cache = state.cache_mut();

        if let Some(poll) = &raw.poll {
            cache.store_poll(raw.id, poll.clone());
        }

        let old = cache.get_message(raw.id);
        let message = old.as_ref().map(|old| {
            let mut updated = Message::clone(old);
            updated.apply_update(&raw);
            cache.upsert_message(updated)
        });

        Ok(Some(Self { raw, old, message }))
    }
}

// ============================================================================
// MESSAGE_DELETE / MESSAGE_DELETE_BULK
// ============================================================================

#[derive(Debug, Deserialize)]
struct MessageDeletePayload {
    id: Snowflake,
    channel_id: Snowflake,
    #[serde(default)]
    guild_id: Option<Snowflake>,
}

#[derive(Debug, Clone)]
pub struct MessageDelete {
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    /// Last cached copy, if any
    pub cached: Option<Arc<Message>>,
}

#[async_trait]
impl Event for MessageDelete {
    const NAME: &'static str = "MESSAGE_DELETE";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let payload: MessageDeletePayload = decode(Self::NAME, data)?;
        let mut cache = state.cache_mut();

        let cached = cache.get_message(payload.id);
        cache.delete_message(payload.id);
        cache.delete_view_on(payload.id);

        Ok(Some(Self {
            message_id: payload.id,
            channel_id: payload.channel_id,
            guild_id: payload.guild_id,
            cached,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct MessageDeleteBulkPayload {
    ids: Vec<Snowflake>,
    channel_id: Snowflake,
    #[serde(default)]
    guild_id: Option<Snowflake>,
}

#[derive(Debug, Clone)]
pub struct MessageDeleteBulk {
    pub message_ids: Vec<Snowflake>,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    /// Cached copies of the deleted messages that were still held
    pub messages: Vec<Arc<Message>>,
}

#[async_trait]
impl Event for MessageDeleteBulk {
    const NAME: &'static str = "MESSAGE_DELETE_BULK";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let payload: MessageDeleteBulkPayload = decode(Self::NAME, data)?;
        let mut cache = state.cache_mut();

        let mut messages = Vec::new();
        for id in &payload.ids {
            if let Some(message) = cache.get_message(*id) {
                messages.push(message);
            }
            cache.delete_message(*id);
            cache.delete_view_on(*id);
        }

        Ok(Some(Self {
            message_ids: payload.ids,
            channel_id: payload.channel_id,
            guild_id: payload.guild_id,
            messages,
        }))
    }
}

// ============================================================================
// Reactions
// ============================================================================

#[derive(Debug, Deserialize)]
struct ReactionMember {
    #[serde(default)]
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct ReactionPayload {
    user_id: Snowflake,
    channel_id: Snowflake,
    message_id: Snowflake,
    #[serde(default)]
    guild_id: Option<Snowflake>,
    emoji: PartialEmoji,
    #[serde(default)]
    member: Option<ReactionMember>,
}

impl ReactionPayload {
    /// Reacting user, preferring the member payload over the user cache
    fn resolve_user(&mut self, cache: &mut EntityStore) -> Option<Arc<User>> {
        match self.member.take().and_then(|m| m.user) {
            Some(user) => Some(cache.store_user(user)),
            None => cache.get_user(self.user_id),
        }
    }
}

/// A reaction was added
///
/// `message`/`reaction` are `None` when the message is not cached.
#[derive(Debug, Clone)]
pub struct ReactionAdd {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub emoji: PartialEmoji,
    pub user: Option<Arc<User>>,
    pub message: Option<Arc<Message>>,
    pub reaction: Option<Reaction>,
}

#[async_trait]
impl Event for ReactionAdd {
    const NAME: &'static str = "MESSAGE_REACTION_ADD";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let mut payload: ReactionPayload = decode(Self::NAME, data)?;
        let by_me = state.is_me(payload.user_id);
        let mut cache = state.cache_mut();
        let user = payload.resolve_user(&mut cache);

        let mut reaction = None;
        let message = cache.get_message(payload.message_id).map(|cached| {
            let mut updated = Message::clone(&cached);
            reaction = Some(updated.add_reaction(payload.emoji.clone(), by_me));
            cache.upsert_message(updated)
        });

        Ok(Some(Self {
            user_id: payload.user_id,
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
            emoji: payload.emoji,
            user,
            message,
            reaction,
        }))
    }
}

/// A reaction was removed
///
/// `message`/`reaction` are `None` when the message is not cached or the
/// reaction was never seen.
#[derive(Debug, Clone)]
pub struct ReactionRemove {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub emoji: PartialEmoji,
    pub user: Option<Arc<User>>,
    pub message: Option<Arc<Message>>,
    pub reaction: Option<Reaction>,
}

#[async_trait]
impl Event for ReactionRemove {
    const NAME: &'static str = "MESSAGE_REACTION_REMOVE";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let mut payload: ReactionPayload = decode(Self::NAME, data)?;
        let by_me = state.is_me(payload.user_id);
        let mut cache = state.cache_mut();
        let user = payload.resolve_user(&mut cache);

        let mut message = None;
        let mut reaction = None;
        if let Some(cached) = cache.get_message(payload.message_id) {
            let mut updated = Message::clone(&cached);
            if let Some(removed) = updated.remove_reaction(&payload.emoji, by_me) {
                reaction = Some(removed);
                message = Some(cache.upsert_message(updated));
            }
        }

        Ok(Some(Self {
            user_id: payload.user_id,
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
            emoji: payload.emoji,
            user,
            message,
            reaction,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ReactionClearPayload {
    channel_id: Snowflake,
    message_id: Snowflake,
    #[serde(default)]
    guild_id: Option<Snowflake>,
}

/// All reactions were removed from a message
#[derive(Debug, Clone)]
pub struct ReactionClear {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub message: Option<Arc<Message>>,
    pub old_reactions: Vec<Reaction>,
}

#[async_trait]
impl Event for ReactionClear {
    const NAME: &'static str = "MESSAGE_REACTION_REMOVE_ALL";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let payload: ReactionClearPayload = decode(Self::NAME, data)?;
        let mut cache = state.cache_mut();

        let mut old_reactions = Vec::new();
        let message = cache.get_message(payload.message_id).map(|cached| {
            let mut updated = Message::clone(&cached);
            old_reactions = updated.clear_reactions();
            cache.upsert_message(updated)
        });

        Ok(Some(Self {
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
            message,
            old_reactions,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ReactionEmojiPayload {
    channel_id: Snowflake,
    message_id: Snowflake,
    #[serde(default)]
    guild_id: Option<Snowflake>,
    emoji: PartialEmoji,
}

/// Every reaction with one emoji was removed; only reported for cached
/// messages that had that reaction
#[derive(Debug, Clone)]
pub struct ReactionRemoveEmoji {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub reaction: Reaction,
    pub message: Arc<Message>,
}

#[async_trait]
impl Event for ReactionRemoveEmoji {
    const NAME: &'static str = "MESSAGE_REACTION_REMOVE_EMOJI";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let payload: ReactionEmojiPayload = decode(Self::NAME, data)?;
        let mut cache = state.cache_mut();

        let Some(cached) = cache.get_message(payload.message_id) else {
            return Ok(None);
        };
        let mut updated = Message::clone(&cached);
        let Some(reaction) = updated.clear_emoji(&payload.emoji) else {
            return Ok(None);
        };

        Ok(Some(Self {
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
            reaction,
            message: cache.upsert_message(updated),
        }))
    }
}

// ============================================================================
// Poll votes
// ============================================================================

#[derive(Debug, Deserialize)]
struct PollVotePayload {
    user_id: Snowflake,
    channel_id: Snowflake,
    message_id: Snowflake,
    #[serde(default)]
    guild_id: Option<Snowflake>,
    answer_id: u32,
}

/// A vote was cast; only reported for known polls and answers
#[derive(Debug, Clone)]
pub struct PollVoteAdd {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub user: Option<Arc<User>>,
    pub poll: Arc<Poll>,
    pub answer: PollAnswer,
}

/// A vote was withdrawn; only reported for known polls and answers
#[derive(Debug, Clone)]
pub struct PollVoteRemove {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub user: Option<Arc<User>>,
    pub poll: Arc<Poll>,
    pub answer: PollAnswer,
}

/// Shared body of the two vote loaders; `None` when poll or answer is unknown
fn apply_vote(
    state: &ConnectionState,
    payload: &PollVotePayload,
    vote: impl FnOnce(&mut Poll, u32, bool) -> bool,
) -> Option<(Option<Arc<User>>, Arc<Poll>, PollAnswer)> {
    let by_me = state.is_me(payload.user_id);
    let mut cache = state.cache_mut();

    let mut poll = Poll::clone(&*cache.get_poll(payload.message_id)?);
    if !vote(&mut poll, payload.answer_id, by_me) {
        return None;
    }
    let answer = poll.get_answer(payload.answer_id)?.clone();
    let poll = cache.store_poll(payload.message_id, poll);
    Some((cache.get_user(payload.user_id), poll, answer))
}

#[async_trait]
impl Event for PollVoteAdd {
    const NAME: &'static str = "MESSAGE_POLL_VOTE_ADD";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let payload: PollVotePayload = decode(Self::NAME, data)?;
        let Some((user, poll, answer)) = apply_vote(&state, &payload, Poll::add_vote) else {
            return Ok(None);
        };
        Ok(Some(Self {
            user_id: payload.user_id,
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
            user,
            poll,
            answer,
        }))
    }
}

#[async_trait]
impl Event for PollVoteRemove {
    const NAME: &'static str = "MESSAGE_POLL_VOTE_REMOVE";

    async fn load(data: Value, state: Arc<ConnectionState>) -> Result<Option<Self>> {
        let payload: PollVotePayload = decode(Self::NAME, data)?;
        let Some((user, poll, answer)) = apply_vote(&state, &payload, Poll::remove_vote) else {
            return Ok(None);
        };
        Ok(Some(Self {
            user_id: payload.user_id,
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            guild_id: payload.guild_id,
            user,
            poll,
            answer,
        }))
    }
}
