//! Built-in gateway event kinds
//!
//! Each kind decodes its payload, keeps the entity store in step and hands
//! a typed event to listeners. [`register_builtin`] wires all of them into
//! an emitter; [`ConnectionState::new`](crate::state::ConnectionState::new)
//! calls it so the mirror is maintained even without application listeners.

use mirror_foundation::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::emitter::EventEmitter;

/// Decode a payload, tagging failures with the wire name
pub(crate) fn decode<T: DeserializeOwned>(event: &str, data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|e| Error::payload(event, e))
}

/// Event whose payload is a model as is, with no store effect
macro_rules! passthrough_event {
    ($(#[$meta:meta])* $name:ident, $wire:literal, $field:ident: $ty:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            pub $field: $ty,
        }

        #[async_trait::async_trait]
        impl $crate::emitter::Event for $name {
            const NAME: &'static str = $wire;

            async fn load(
                data: serde_json::Value,
                _state: std::sync::Arc<$crate::state::ConnectionState>,
            ) -> mirror_foundation::Result<Option<Self>> {
                Ok(Some(Self {
                    $field: $crate::events::decode(Self::NAME, data)?,
                }))
            }
        }
    };
}

mod automod;
mod channel;
mod entitlement;
mod gateway;
mod guild;
mod interaction;
mod message;

pub use automod::{AutoModActionExecution, AutoModRuleCreate, AutoModRuleDelete, AutoModRuleUpdate};
pub use channel::ChannelCreate;
pub use entitlement::{EntitlementCreate, EntitlementDelete, EntitlementUpdate};
pub use gateway::{ApplicationCommandPermission, ApplicationCommandPermissionsUpdate, Ready, Resumed};
pub use guild::{GuildAvailable, GuildCreate, GuildDelete, GuildEmojisUpdate, GuildJoin, GuildStickersUpdate};
pub use interaction::InteractionCreate;
pub use message::{
    MessageCreate, MessageDelete, MessageDeleteBulk, MessageUpdate, PollVoteAdd, PollVoteRemove,
    ReactionAdd, ReactionClear, ReactionRemove, ReactionRemoveEmoji,
};

/// Register every built-in kind
pub fn register_builtin(emitter: &EventEmitter) {
    // Gateway
    emitter.register_kind::<Ready>();
    emitter.register_kind::<Resumed>();
    emitter.register_kind::<ApplicationCommandPermissionsUpdate>();

    // Guilds
    emitter.register_kind::<GuildCreate>();
    emitter.register_kind::<GuildJoin>();
    emitter.register_kind::<GuildAvailable>();
    emitter.register_kind::<GuildDelete>();
    emitter.register_kind::<GuildEmojisUpdate>();
    emitter.register_kind::<GuildStickersUpdate>();

    // Channels
    emitter.register_kind::<ChannelCreate>();

    // Messages
    emitter.register_kind::<MessageCreate>();
    emitter.register_kind::<MessageUpdate>();
    emitter.register_kind::<MessageDelete>();
    emitter.register_kind::<MessageDeleteBulk>();
    emitter.register_kind::<ReactionAdd>();
    emitter.register_kind::<ReactionRemove>();
    emitter.register_kind::<ReactionClear>();
    emitter.register_kind::<ReactionRemoveEmoji>();
    emitter.register_kind::<PollVoteAdd>();
    emitter.register_kind::<PollVoteRemove>();

    // Interactions
    emitter.register_kind::<InteractionCreate>();

    // Monetization
    emitter.register_kind::<EntitlementCreate>();
    emitter.register_kind::<EntitlementUpdate>();
    emitter.register_kind::<EntitlementDelete>();

    // Auto moderation
    emitter.register_kind::<AutoModRuleCreate>();
    emitter.register_kind::<AutoModRuleUpdate>();
    emitter.register_kind::<AutoModRuleDelete>();
    emitter.register_kind::<AutoModActionExecution>();
}
