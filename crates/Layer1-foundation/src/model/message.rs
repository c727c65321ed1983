//! Message model
//!
//! Messages are immutable once shared; reaction and edit events work on a
//! clone which the store then appends as the newest entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{PartialEmoji, Poll, Snowflake, User};

// ============================================================================
// Reaction
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: PartialEmoji,

    #[serde(default)]
    pub count: u32,

    /// Whether the current user reacted
    #[serde(default)]
    pub me: bool,
}

// ============================================================================
// Payloads
// ============================================================================

/// `MESSAGE_CREATE` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    pub id: Snowflake,

    pub channel_id: Snowflake,

    #[serde(default)]
    pub guild_id: Option<Snowflake>,

    pub author: User,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub pinned: bool,

    #[serde(default)]
    pub reactions: Vec<Reaction>,

    #[serde(default)]
    pub poll: Option<Poll>,
}

/// `MESSAGE_UPDATE` body; every field besides the ids may be missing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageUpdatePayload {
    pub id: Snowflake,

    pub channel_id: Snowflake,

    #[serde(default)]
    pub guild_id: Option<Snowflake>,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub pinned: Option<bool>,

    #[serde(default)]
    pub poll: Option<Poll>,
}

// ============================================================================
// Message
// ============================================================================

#[derive(Debug, Clone)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub author: Arc<User>,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub edited_timestamp: Option<DateTime<Utc>>,
    pub pinned: bool,
    pub reactions: Vec<Reaction>,
    pub poll: Option<Poll>,
}

impl Message {
    /// Build from a payload whose author was already resolved through the
    /// user cache
    pub fn from_payload(payload: MessagePayload, author: Arc<User>) -> Self {
        Self {
            id: payload.id,
            channel_id: payload.channel_id,
            guild_id: payload.guild_id,
            author,
            content: payload.content,
            timestamp: payload.timestamp,
            edited_timestamp: payload.edited_timestamp,
            pinned: payload.pinned,
            reactions: payload.reactions,
            poll: payload.poll,
        }
    }

    /// Apply the fields present in an edit
    pub fn apply_update(&mut self, update: &MessageUpdatePayload) {
        if let Some(content) = &update.content {
            self.content = content.clone();
        }
        if let Some(pinned) = update.pinned {
            self.pinned = pinned;
        }
        if update.edited_timestamp.is_some() {
            self.edited_timestamp = update.edited_timestamp;
        }
        if update.poll.is_some() {
            self.poll = update.poll.clone();
        }
    }

    pub fn reaction(&self, emoji: &PartialEmoji) -> Option<&Reaction> {
        self.reactions.iter().find(|r| r.emoji.same_as(emoji))
    }

    /// Count one more reaction with `emoji`, returning its new state
    pub fn add_reaction(&mut self, emoji: PartialEmoji, by_me: bool) -> Reaction {
        match self.reactions.iter_mut().find(|r| r.emoji.same_as(&emoji)) {
            Some(reaction) => {
                reaction.count += 1;
                reaction.me |= by_me;
                reaction.clone()
            }
            None => {
                let reaction = Reaction {
                    emoji,
                    count: 1,
                    me: by_me,
                };
                self.reactions.push(reaction.clone());
                reaction
            }
        }
    }

    /// Count one reaction less; `None` when no such reaction is known
    ///
    /// A reaction whose count drops to zero is removed from the list.
    pub fn remove_reaction(&mut self, emoji: &PartialEmoji, by_me: bool) -> Option<Reaction> {
        let index = self.reactions.iter().position(|r| r.emoji.same_as(emoji))?;
        let reaction = &mut self.reactions[index];
        reaction.count = reaction.count.saturating_sub(1);
        if by_me {
            reaction.me = false;
        }
        let snapshot = reaction.clone();
        if snapshot.count == 0 {
            self.reactions.remove(index);
        }
        Some(snapshot)
    }

    /// Drop every reaction for one emoji
    pub fn clear_emoji(&mut self, emoji: &PartialEmoji) -> Option<Reaction> {
        let index = self.reactions.iter().position(|r| r.emoji.same_as(emoji))?;
        Some(self.reactions.remove(index))
    }

    /// Drop all reactions, returning what was there
    pub fn clear_reactions(&mut self) -> Vec<Reaction> {
        std::mem::take(&mut self.reactions)
    }
}
