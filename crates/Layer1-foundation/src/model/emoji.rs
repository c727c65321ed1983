//! Emoji models
//!
//! Custom emoji are owned either by a guild or by the application itself.
//! The owner decides which per-owner list the entity store files them under,
//! so the variant is an explicit tag rather than something inferred later.

use serde::{Deserialize, Serialize};

use super::Snowflake;

/// Raw emoji object as delivered in guild and application payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiPayload {
    pub id: Snowflake,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub animated: bool,

    #[serde(default = "default_true")]
    pub available: bool,

    #[serde(default)]
    pub managed: bool,

    #[serde(default)]
    pub require_colons: bool,

    #[serde(default)]
    pub roles: Vec<Snowflake>,
}

fn default_true() -> bool {
    true
}

/// Emoji belonging to a guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildEmoji {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: Option<String>,
    pub animated: bool,
    pub available: bool,
    pub managed: bool,
    pub roles: Vec<Snowflake>,
}

/// Emoji uploaded to an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEmoji {
    pub id: Snowflake,
    pub application_id: Snowflake,
    pub name: Option<String>,
    pub animated: bool,
}

/// Which per-owner list an emoji lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmojiOwner {
    Guild(Snowflake),
    Application(Snowflake),
}

/// A cached custom emoji
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "owner", rename_all = "snake_case")]
pub enum Emoji {
    Guild(GuildEmoji),
    App(AppEmoji),
}

impl Emoji {
    pub fn guild(guild_id: Snowflake, payload: EmojiPayload) -> Self {
        Emoji::Guild(GuildEmoji {
            id: payload.id,
            guild_id,
            name: payload.name,
            animated: payload.animated,
            available: payload.available,
            managed: payload.managed,
            roles: payload.roles,
        })
    }

    pub fn app(application_id: Snowflake, payload: EmojiPayload) -> Self {
        Emoji::App(AppEmoji {
            id: payload.id,
            application_id,
            name: payload.name,
            animated: payload.animated,
        })
    }

    pub fn id(&self) -> Snowflake {
        match self {
            Emoji::Guild(e) => e.id,
            Emoji::App(e) => e.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Emoji::Guild(e) => e.name.as_deref(),
            Emoji::App(e) => e.name.as_deref(),
        }
    }

    pub fn owner(&self) -> EmojiOwner {
        match self {
            Emoji::Guild(e) => EmojiOwner::Guild(e.guild_id),
            Emoji::App(e) => EmojiOwner::Application(e.application_id),
        }
    }
}

/// Emoji reference carried by reactions; `id` is `None` for unicode emoji
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartialEmoji {
    #[serde(default)]
    pub id: Option<Snowflake>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub animated: bool,
}

impl PartialEmoji {
    pub fn unicode(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            animated: false,
        }
    }

    pub fn custom(id: impl Into<Snowflake>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            animated: false,
        }
    }

    /// Custom emoji compare by id, unicode emoji by name
    pub fn same_as(&self, other: &PartialEmoji) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.name == other.name,
            _ => false,
        }
    }
}
