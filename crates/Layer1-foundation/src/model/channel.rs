//! Private channel models
//!
//! Guild channels are not mirrored; only direct messages and group DMs are
//! kept, in the entity store's private-channel LRU.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Snowflake, User};

/// Channel type codes used on the wire
pub mod channel_type {
    pub const DM: u8 = 1;
    pub const GROUP_DM: u8 = 3;
}

/// Raw channel object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelPayload {
    pub id: Snowflake,

    #[serde(rename = "type")]
    pub kind: u8,

    #[serde(default)]
    pub guild_id: Option<Snowflake>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub owner_id: Option<Snowflake>,

    #[serde(default)]
    pub last_message_id: Option<Snowflake>,

    #[serde(default)]
    pub recipients: Vec<User>,
}

impl ChannelPayload {
    pub fn is_private(&self) -> bool {
        self.kind == channel_type::DM || self.kind == channel_type::GROUP_DM
    }
}

/// One-to-one conversation
#[derive(Debug, Clone)]
pub struct DmChannel {
    pub id: Snowflake,
    /// Peer user; unknown until the gateway tells us
    pub recipient: Option<Arc<User>>,
    pub last_message_id: Option<Snowflake>,
}

/// Group conversation
#[derive(Debug, Clone)]
pub struct GroupChannel {
    pub id: Snowflake,
    pub name: Option<String>,
    pub owner_id: Option<Snowflake>,
    pub recipients: Vec<Arc<User>>,
    pub last_message_id: Option<Snowflake>,
}

#[derive(Debug, Clone)]
pub enum PrivateChannel {
    Dm(DmChannel),
    Group(GroupChannel),
}

impl PrivateChannel {
    /// Build from a payload whose recipients were already resolved through
    /// the user cache. Returns `None` for guild channels.
    pub fn from_payload(payload: &ChannelPayload, recipients: Vec<Arc<User>>) -> Option<Self> {
        match payload.kind {
            channel_type::DM => Some(PrivateChannel::Dm(DmChannel {
                id: payload.id,
                recipient: recipients.into_iter().next(),
                last_message_id: payload.last_message_id,
            })),
            channel_type::GROUP_DM => Some(PrivateChannel::Group(GroupChannel {
                id: payload.id,
                name: payload.name.clone(),
                owner_id: payload.owner_id,
                recipients,
                last_message_id: payload.last_message_id,
            })),
            _ => None,
        }
    }

    pub fn dm(id: impl Into<Snowflake>, recipient: Option<Arc<User>>) -> Self {
        PrivateChannel::Dm(DmChannel {
            id: id.into(),
            recipient,
            last_message_id: None,
        })
    }

    pub fn group(id: impl Into<Snowflake>, recipients: Vec<Arc<User>>) -> Self {
        PrivateChannel::Group(GroupChannel {
            id: id.into(),
            name: None,
            owner_id: None,
            recipients,
            last_message_id: None,
        })
    }

    pub fn id(&self) -> Snowflake {
        match self {
            PrivateChannel::Dm(c) => c.id,
            PrivateChannel::Group(c) => c.id,
        }
    }

    /// Peer user id for DMs with a known recipient; this is what the
    /// by-user index is keyed on
    pub fn dm_peer_id(&self) -> Option<Snowflake> {
        match self {
            PrivateChannel::Dm(c) => c.recipient.as_ref().map(|u| u.id),
            PrivateChannel::Group(_) => None,
        }
    }
}
